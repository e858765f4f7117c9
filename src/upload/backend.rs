//! Ingestion backend handshake
//!
//! A segment is shipped in two requests: a `POST` asking the backend for a
//! destination URL, then a `PUT` of the raw segment bytes to that URL.

use super::UploadError;
use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of the destination request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadGrantRequest {
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct UploadGrant {
    upload_url: Option<String>,
}

#[async_trait]
pub trait IngestBackend: Send + Sync {
    /// Ask for a destination. Anything but an explicit grant is an error.
    async fn request_destination(&self, request: &UploadGrantRequest) -> Result<String, UploadError>;

    /// Send the whole segment to a granted destination.
    async fn transfer(&self, upload_url: &str, body: Vec<u8>) -> Result<(), UploadError>;
}

/// HTTP implementation of the handshake
pub struct HttpIngest {
    client: reqwest::Client,
    backend_url: String,
}

impl HttpIngest {
    pub fn new(backend_url: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, backend_url))
    }

    /// Use a preconfigured client (proxy, TLS or timeout settings).
    pub fn with_client(client: reqwest::Client, backend_url: impl Into<String>) -> Self {
        Self {
            client,
            backend_url: backend_url.into(),
        }
    }
}

async fn body_snippet(response: reqwest::Response) -> String {
    let mut text = response.text().await.unwrap_or_default();
    if text.len() > 512 {
        let mut cut = 512;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

#[async_trait]
impl IngestBackend for HttpIngest {
    async fn request_destination(&self, request: &UploadGrantRequest) -> Result<String, UploadError> {
        let response = self
            .client
            .post(&self.backend_url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UploadError::Denied {
                status: status.as_u16(),
                body: body_snippet(response).await,
            });
        }

        let grant: UploadGrant = response.json().await?;
        grant.upload_url.ok_or(UploadError::MissingUploadUrl)
    }

    async fn transfer(&self, upload_url: &str, body: Vec<u8>) -> Result<(), UploadError> {
        let length = body.len();
        let response = self
            .client
            .put(upload_url)
            .header(CONTENT_LENGTH, length)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body: body_snippet(response).await,
            });
        }

        Ok(())
    }
}
