//! Photo payloads handed over by the capture collaborator.

use std::path::Path;

use crate::error::ClientResult;

/// File name used when the capture source does not provide one.
pub const DEFAULT_PHOTO_NAME: &str = "capture.jpg";

/// An encoded photo ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPayload {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: String,
    /// File name reported in the multipart upload.
    pub file_name: String,
}

impl PhotoPayload {
    /// Wrap captured bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            file_name: DEFAULT_PHOTO_NAME.to_string(),
        }
    }

    /// Override the reported file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Load a photo from disk, guessing the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`](crate::ClientError::Io) if the file cannot be read.
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_PHOTO_NAME);
        Ok(Self::new(bytes, mime_for(path)).with_file_name(file_name))
    }
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}
