//! Generation jobs: wire types, the status state machine and poll sequencing.
//!
//! The server owns job state. The client only ever holds the most recent
//! snapshot for one poll session, replaced wholesale on each response.

use serde::{Deserialize, Serialize};

/// Message shown when a failed job carries no error text.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Generation failed";

/// Opaque token identifying a job: a primary id or a legacy content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobReference(String);

impl JobReference {
    /// Wrap a raw reference verbatim.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobReference {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<u64> for JobReference {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Server-reported job state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    /// Generation is still running.
    Processing,
    /// Generation finished successfully.
    Completed,
    /// Generation failed.
    Error,
    /// Any state this client does not know about.
    Other(String),
}

impl JobState {
    /// Wire representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for JobState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "error" => Self::Error,
            _ => Self::Other(raw),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement returned when a job is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCreated {
    /// Primary job id.
    pub id: u64,
    /// State at creation time, usually `processing`.
    #[serde(rename = "status")]
    pub initial_state: JobState,
}

impl JobCreated {
    /// Reference usable for status lookups.
    #[must_use]
    pub fn reference(&self) -> JobReference {
        JobReference::from(self.id)
    }
}

/// Snapshot of a job as reported by the status endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Primary job id.
    pub id: u64,
    /// Current state.
    #[serde(rename = "status")]
    pub state: JobState,
    /// URL of the generated image.
    #[serde(default)]
    pub result_url: Option<String>,
    /// URL the QR code points at for downloading.
    #[serde(default)]
    pub download_url: Option<String>,
    /// URL of the QR code image.
    #[serde(default)]
    pub qr_url: Option<String>,
    /// Failure description for `error` jobs.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobStatus {
    /// Map the snapshot onto what the result screen should show.
    ///
    /// A `completed` job without all three URLs is still loading, and an
    /// unknown state keeps the loading view as well.
    #[must_use]
    pub fn view(&self) -> ResultView {
        match &self.state {
            JobState::Completed => match (&self.result_url, &self.download_url, &self.qr_url) {
                (Some(result_url), Some(download_url), Some(qr_url))
                    if !result_url.is_empty() && !download_url.is_empty() && !qr_url.is_empty() =>
                {
                    ResultView::Completed {
                        result_url: result_url.clone(),
                        download_url: download_url.clone(),
                        qr_url: qr_url.clone(),
                    }
                }
                _ => ResultView::Loading,
            },
            JobState::Error => ResultView::Failed {
                message: self
                    .error_message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            },
            JobState::Processing | JobState::Other(_) => ResultView::Loading,
        }
    }
}

/// What the result screen renders for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ResultView {
    /// Still generating (or completed without every URL yet).
    Loading,
    /// Ready to show and download.
    Completed {
        /// Generated image URL.
        result_url: String,
        /// Download target URL.
        download_url: String,
        /// QR code image URL.
        qr_url: String,
    },
    /// Generation failed.
    Failed {
        /// Message to display.
        message: String,
    },
}

impl ResultView {
    /// Whether the job can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Sequence bookkeeping for one poll session.
///
/// Every request is tagged with a monotonic sequence number; a response is
/// applied only if it answers the latest issued request, so a slow reply
/// can never overwrite a newer one.
#[derive(Debug, Clone, Default)]
pub struct JobSession {
    issued: u64,
    snapshot: Option<JobStatus>,
}

impl JobSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the sequence number for a new request.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Latest issued sequence number (0 before the first request).
    #[must_use]
    pub const fn latest_issued(&self) -> u64 {
        self.issued
    }

    /// Apply a response tagged with `seq`.
    ///
    /// Returns the new view if accepted, `None` if the response is stale.
    pub fn accept(&mut self, seq: u64, status: JobStatus) -> Option<ResultView> {
        if seq != self.issued {
            tracing::debug!(seq, latest = self.issued, "Discarding stale job status");
            return None;
        }
        let view = status.view();
        self.snapshot = Some(status);
        Some(view)
    }

    /// Most recent accepted snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<&JobStatus> {
        self.snapshot.as_ref()
    }

    /// Current view; loading until the first snapshot arrives.
    #[must_use]
    pub fn view(&self) -> ResultView {
        self.snapshot
            .as_ref()
            .map_or(ResultView::Loading, JobStatus::view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completed(id: u64) -> JobStatus {
        JobStatus {
            id,
            state: JobState::Completed,
            result_url: Some("/media/results/a.jpg".into()),
            download_url: Some("/qr/abc".into()),
            qr_url: Some(format!("/api/jobs/{id}/qr")),
            error_message: None,
        }
    }

    #[test]
    fn parses_status_payload() {
        let status: JobStatus = serde_json::from_value(json!({
            "id": 77,
            "status": "completed",
            "result_url": "/qr/abc123",
            "download_url": "/qr/abc123",
            "qr_url": "/api/jobs/77/qr"
        }))
        .expect("status");
        assert_eq!(status.state, JobState::Completed);
        assert_eq!(status.error_message, None);
        assert!(matches!(status.view(), ResultView::Completed { .. }));
    }

    #[test]
    fn unknown_states_are_preserved() {
        let status: JobStatus =
            serde_json::from_value(json!({"id": 1, "status": "queued"})).expect("status");
        assert_eq!(status.state, JobState::Other("queued".into()));
        assert_eq!(status.view(), ResultView::Loading);
        assert_eq!(
            serde_json::to_value(&status.state).expect("json"),
            json!("queued")
        );
    }

    #[test]
    fn completed_without_every_url_is_still_loading() {
        let mut status = completed(3);
        status.qr_url = None;
        assert_eq!(status.view(), ResultView::Loading);

        let mut status = completed(3);
        status.download_url = Some(String::new());
        assert_eq!(status.view(), ResultView::Loading);
    }

    #[test]
    fn error_view_carries_message() {
        let mut status = completed(4);
        status.state = JobState::Error;
        status.error_message = Some("model timeout".into());
        assert_eq!(
            status.view(),
            ResultView::Failed {
                message: "model timeout".into()
            }
        );

        status.error_message = None;
        assert_eq!(
            status.view(),
            ResultView::Failed {
                message: DEFAULT_FAILURE_MESSAGE.into()
            }
        );
        assert!(status.view().is_terminal());
    }

    #[test]
    fn job_created_reads_status_field() {
        let created: JobCreated =
            serde_json::from_value(json!({"id": 12, "status": "processing"})).expect("created");
        assert_eq!(created.initial_state, JobState::Processing);
        assert_eq!(created.reference().as_str(), "12");
    }

    #[test]
    fn session_discards_stale_responses() {
        let mut session = JobSession::new();
        assert_eq!(session.view(), ResultView::Loading);

        let first = session.issue();
        let second = session.issue();

        let mut processing = completed(5);
        processing.state = JobState::Processing;

        assert!(session.accept(second, completed(5)).is_some());
        assert!(session.accept(first, processing).is_none());
        assert!(matches!(session.view(), ResultView::Completed { .. }));
        assert_eq!(session.latest_issued(), 2);
    }
}
