//! HTTP client for the booth backend.
//!
//! Every call takes an [`ApiScope`] so the same client serves room-scoped
//! kiosks and legacy single-room deployments.

use std::sync::Arc;

use booth_core::{
    encode_component, unique_by_slug, ApiScope, BoothConfig, GalleryImage, JobCreated,
    JobReference, JobStatus, PublicRoom, StylePrompt,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::photo::PhotoPayload;

/// Path listing the rooms a visitor may switch to.
pub const ROOMS_PATH: &str = "/api/rooms";

/// Asynchronous booth backend client.
#[derive(Clone)]
pub struct BoothClient {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    base: Url,
    config: Arc<BoothConfig>,
}

impl BoothClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// A path prefix on `base_url` (`https://host/booth`) is kept and every
    /// API path is appended to it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL is malformed.
    /// Returns [`ClientError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: impl AsRef<str>, config: Arc<BoothConfig>) -> ClientResult<Self> {
        let base =
            Url::parse(base_url.as_ref()).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{base} cannot be used as an API base"
            )));
        }

        let http = Client::builder()
            .user_agent(format!("booth-kiosk/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient { http, base, config }),
        })
    }

    /// Configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &BoothConfig {
        &self.inner.config
    }

    /// Base URL all API paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Submit a photo for generation with the chosen style.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status or malformed body becomes
    /// [`ClientError::Submission`].
    pub async fn submit(
        &self,
        scope: impl Into<ApiScope>,
        photo: PhotoPayload,
        style_id: u64,
    ) -> ClientResult<JobCreated> {
        let scope = scope.into();
        let created = self
            .create_job(&scope, photo, style_id)
            .await
            .map_err(|e| ClientError::Submission(e.to_string()))?;
        info!(room = %scope, job_id = created.id, style_id, "Generation job created");
        Ok(created)
    }

    async fn create_job(
        &self,
        scope: &ApiScope,
        photo: PhotoPayload,
        style_id: u64,
    ) -> ClientResult<JobCreated> {
        let path = scope.path("/jobs");
        let part = Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.mime)?;
        let form = Form::new()
            .part("photo", part)
            .text("prompt_id", style_id.to_string());

        let url = self.endpoint(&path)?;
        debug!(%url, "POST");
        let response = self.inner.http.post(url).multipart(form).send().await?;
        decode(&path, response).await
    }

    /// Fetch the current status of a job once.
    ///
    /// `job_ref` is tried as a job id first. If the backend answers 404 or 422
    /// the same reference is tried exactly once as a QR hash.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::StatusFetch`] if the id lookup fails with any
    /// other status, or if the hash lookup fails for any reason.
    pub async fn poll_once(
        &self,
        scope: impl Into<ApiScope>,
        job_ref: &JobReference,
    ) -> ClientResult<JobStatus> {
        let scope = scope.into();
        self.lookup_status(&scope, job_ref)
            .await
            .map_err(|e| ClientError::StatusFetch(e.to_string()))
    }

    async fn lookup_status(
        &self,
        scope: &ApiScope,
        job_ref: &JobReference,
    ) -> ClientResult<JobStatus> {
        let encoded = encode_component(job_ref.as_str());

        let by_id = scope.path(&format!("/jobs/{encoded}"));
        let response = self.get(&by_id).await?;
        let status = response.status();
        if status.is_success() {
            return decode(&by_id, response).await;
        }
        if status != StatusCode::NOT_FOUND && status != StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ClientError::UnexpectedStatus {
                path: by_id,
                status: status.as_u16(),
            });
        }

        debug!(job = %job_ref, status = status.as_u16(), "Id lookup missed, trying QR hash");
        let by_hash = scope.path(&format!("/jobs/hash/{encoded}"));
        self.get_json(&by_hash).await
    }

    /// Fetch the gallery images for a room.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Refresh`] on any transport, status or parse failure.
    pub async fn refresh(&self, scope: impl Into<ApiScope>) -> ClientResult<Vec<GalleryImage>> {
        let path = scope.into().path("/jobs/gallery");
        self.get_json(&path)
            .await
            .map_err(|e| ClientError::Refresh(e.to_string()))
    }

    /// Fetch the styles offered in a room.
    ///
    /// Never fails: any error yields the configured fallback styles.
    pub async fn list_styles(&self, scope: impl Into<ApiScope>) -> Vec<StylePrompt> {
        let scope = scope.into();
        let path = scope.path("/prompts");
        match self.get_json::<Vec<StylePrompt>>(&path).await {
            Ok(styles) => styles,
            Err(e) => {
                warn!(room = %scope, error = %e, "Style list unavailable, using fallback styles");
                self.inner.config.fallback_styles.clone()
            }
        }
    }

    /// Fetch the public room list, de-duplicated by slug.
    ///
    /// Never fails: any error yields an empty list.
    pub async fn list_rooms(&self) -> Vec<PublicRoom> {
        match self.get_json::<Vec<PublicRoom>>(ROOMS_PATH).await {
            Ok(rooms) => unique_by_slug(rooms),
            Err(e) => {
                warn!(error = %e, "Room list unavailable");
                Vec::new()
            }
        }
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let base = self.inner.base.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    async fn get(&self, path: &str) -> ClientResult<Response> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        Ok(self.inner.http.get(url).send().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.get(path).await?;
        decode(path, response).await
    }
}

impl std::fmt::Debug for BoothClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoothClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::UnexpectedStatus {
            path: path.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
