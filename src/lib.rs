//! Activity Observer - background activity recording with segment upload.
//!
//! Input events and foreground-window context are appended to rotating JSONL
//! segments, screenshots are taken at random instants, and rotated segments
//! are shipped to an ingestion backend.

pub mod capture;
pub mod config;
pub mod recorder;
pub mod upload;

pub use config::ObserverConfig;
pub use recorder::{Collaborators, Observer, ObserverStats, SessionMetadata, SessionSummary, StartError};

use capture::unsupported::{UnsupportedHook, UnsupportedScreen, UnsupportedWindows};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload::IngestBackend;

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "activity_observer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

impl Collaborators {
    /// Placeholder capture sources with a real upload backend
    pub fn headless(backend: Arc<dyn IngestBackend>) -> Self {
        Self {
            window: Arc::new(UnsupportedWindows),
            screen: Arc::new(UnsupportedScreen),
            mouse: Arc::new(UnsupportedHook { kind: "mouse" }),
            keyboard: Arc::new(UnsupportedHook { kind: "keyboard" }),
            backend,
        }
    }
}
