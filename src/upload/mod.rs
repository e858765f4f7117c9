//! Segment upload
//!
//! Ships a rotated segment to the ingestion backend and removes the local
//! copy once the backend has accepted it. Failures are logged and the file
//! stays on disk; nothing is retried or queued here.

pub mod backend;

pub use backend::{HttpIngest, IngestBackend, UploadGrantRequest};

use crate::recorder::sink::RotatedSegment;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Backend refused upload destination (status {status}): {body}")]
    Denied { status: u16, body: String },

    #[error("Backend response has no upload_url")]
    MissingUploadUrl,

    #[error("Transfer rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened to a segment handed to [`Uploader::upload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file was already gone; nothing was sent.
    Missing,
    /// Transferred and deleted locally.
    Uploaded { bytes: usize },
    /// Not transferred; the file is left on disk.
    Retained,
}

pub struct Uploader {
    backend: Arc<dyn IngestBackend>,
}

impl Uploader {
    pub fn new(backend: Arc<dyn IngestBackend>) -> Self {
        Self { backend }
    }

    pub async fn upload(&self, segment: &RotatedSegment) -> UploadOutcome {
        match tokio::fs::try_exists(&segment.path).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("Segment {:?} already gone, skipping upload", segment.path);
                return UploadOutcome::Missing;
            }
            Err(e) => {
                tracing::warn!("Cannot check segment {:?}: {}", segment.path, e);
                return UploadOutcome::Retained;
            }
        }

        tracing::info!("Uploading {:?}", segment.path);

        match self.try_upload(segment).await {
            Ok(bytes) => {
                tracing::info!("Upload successful ({} bytes)", bytes);
                remove_segment(&segment.path).await;
                UploadOutcome::Uploaded { bytes }
            }
            Err(e) => {
                tracing::warn!("Upload of {:?} failed, keeping file: {}", segment.path, e);
                UploadOutcome::Retained
            }
        }
    }

    async fn try_upload(&self, segment: &RotatedSegment) -> Result<usize, UploadError> {
        let request = UploadGrantRequest {
            user_id: segment.username.clone(),
            session_id: segment.session_id.clone(),
        };
        let upload_url = self.backend.request_destination(&request).await?;
        tracing::debug!("Upload destination granted: {}", upload_url);

        let body = tokio::fs::read(&segment.path).await?;
        let bytes = body.len();
        self.backend.transfer(&upload_url, body).await?;
        Ok(bytes)
    }
}

async fn remove_segment(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Uploaded segment {:?} could not be deleted: {}", path, e);
    }
}
