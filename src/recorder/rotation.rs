//! Periodic segment rotation and hand-off to the uploader

use super::sink::SessionLog;
use crate::upload::Uploader;
use std::sync::Arc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

/// Rotate every `interval` and upload the detached segment.
///
/// The interval is measured from the end of the previous upload. Cancelling
/// exits at the next wait without a final rotation.
pub async fn rotation_loop(
    log: Arc<SessionLog>,
    uploader: Arc<Uploader>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    tracing::info!("Upload scheduler started (interval={:?})", interval);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        let segment = match log.rotate() {
            Ok(Some(segment)) => segment,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Segment rotation failed, keeping current segment: {}", e);
                continue;
            }
        };

        // Writers only contend with the swap above, never with the upload
        uploader.upload(&segment).await;
    }

    tracing::info!("Upload scheduler stopped");
}
