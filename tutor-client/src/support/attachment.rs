//! Support attachments
//!
//! Uploads are additive and never change the Support record itself. Size and
//! type limits belong to the backend.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use shared::models::SupportFile;
use shared::validation::normalize_id;

use crate::{ClientError, ClientResult, HttpClient};

/// A file ready to be sent
#[derive(Debug, Clone)]
pub struct SupportUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SupportUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a local file, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string());

        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AttachmentHandler {
    http: HttpClient,
}

impl AttachmentHandler {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Attach a file to a Support
    ///
    /// Every failure, local or remote, comes back as [`ClientError::Upload`].
    pub async fn upload(&self, support_id: &str, file: SupportUpload) -> ClientResult<SupportFile> {
        let filename = file.filename.clone();
        let result = self.send(support_id, file).await;

        result.map_err(|e| {
            tracing::warn!(support_id, filename = %filename, error = %e, "Attachment upload failed");
            ClientError::Upload {
                support_id: support_id.trim().to_string(),
                filename,
                source: Box::new(e),
            }
        })
    }

    /// Read `path` and attach it to a Support
    pub async fn upload_path(
        &self,
        support_id: &str,
        path: impl AsRef<Path>,
    ) -> ClientResult<SupportFile> {
        let path = path.as_ref();
        match SupportUpload::from_path(path).await {
            Ok(file) => self.upload(support_id, file).await,
            Err(e) => Err(ClientError::Upload {
                support_id: support_id.trim().to_string(),
                filename: path.display().to_string(),
                source: Box::new(e),
            }),
        }
    }

    async fn send(&self, support_id: &str, file: SupportUpload) -> ClientResult<SupportFile> {
        let support_id = normalize_id(support_id, "support_id")?;
        let size = file.len();

        let mut part = Part::bytes(file.bytes).file_name(file.filename.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new()
            .text("support_id", support_id.to_string())
            .part("file", part);

        tracing::debug!(support_id, filename = %file.filename, size, "Uploading attachment");
        let uploaded: SupportFile = self.http.post_multipart("/supports/upload-file", form).await?;
        tracing::info!(support_id, file_id = %uploaded.id, "Attachment uploaded");
        Ok(uploaded)
    }
}
