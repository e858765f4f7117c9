use activity_observer::upload::HttpIngest;
use activity_observer::{Collaborators, Observer, ObserverConfig};
use anyhow::Context;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    activity_observer::init_tracing();

    tracing::info!("Starting Activity Observer v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args_os().nth(1) {
        Some(path) => ObserverConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.to_string_lossy()))?,
        None => ObserverConfig::from_env()?,
    };

    let backend = HttpIngest::new(config.backend_url.clone(), config.request_timeout())
        .context("building upload client")?;
    let observer = Observer::new(config, Collaborators::headless(Arc::new(backend)));

    let session = observer.start().await.context("starting observer")?;
    tracing::info!("Recording to {:?}", session.output_file);

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    if let Some(summary) = observer.stop().await {
        tracing::info!(
            "Session {} finished: {} events, {} segments rotated",
            summary.session_id,
            summary.event_count,
            summary.segments_rotated
        );
    }

    Ok(())
}
