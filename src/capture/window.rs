//! Foreground window poller

use crate::capture::context::{SharedContext, WindowContext};
use crate::capture::traits::WindowSource;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Query the source once. Failures and "nothing focused" both map to an
/// all-null context so a stale window is never carried forward.
pub fn sample_window(source: &dyn WindowSource) -> WindowContext {
    match source.foreground_window() {
        Ok(Some(info)) => WindowContext::from(info),
        Ok(None) => WindowContext::default(),
        Err(e) => {
            tracing::debug!("Foreground window query failed: {}", e);
            WindowContext::default()
        }
    }
}

pub async fn window_poll_loop(
    source: Arc<dyn WindowSource>,
    context: Arc<SharedContext>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    tracing::info!("Window monitor started (interval={:?})", interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                let source = source.clone();
                match tokio::task::spawn_blocking(move || sample_window(source.as_ref())).await {
                    Ok(window) => context.set_window(window),
                    Err(e) => {
                        tracing::warn!("Window query worker join failed: {}", e);
                        context.set_window(WindowContext::default());
                    }
                }
            }
        }
    }

    tracing::info!("Window monitor stopped");
}
