//! Recording session management
//!
//! The [`Observer`] owns the session lifecycle: `start` opens the first log
//! segment and launches the window poller, the screenshot scheduler, the
//! rotation/upload loop and both input hooks; `stop` cancels them all and
//! closes the segment.

pub mod error;
pub mod event;
pub mod rotation;
pub mod session;
pub mod sink;

pub use error::StartError;
pub use event::{Event, EventData, Observation};
pub use session::{HostIdentity, SessionMetadata};
pub use sink::{LogStats, RotatedSegment, SessionLog, SessionSummary};

use crate::capture::context::SharedContext;
use crate::capture::input::InputRecorder;
use crate::capture::screenshot::{ScreenshotScheduler, ScreenshotTaker};
use crate::capture::traits::{InputHook, ScreenSource, WindowSource};
use crate::capture::window::window_poll_loop;
use crate::config::ObserverConfig;
use crate::upload::{IngestBackend, Uploader};
use parking_lot::Mutex as ParkingMutex;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// External sources the observer drives
#[derive(Clone)]
pub struct Collaborators {
    pub window: Arc<dyn WindowSource>,
    pub screen: Arc<dyn ScreenSource>,
    pub mouse: Arc<dyn InputHook>,
    pub keyboard: Arc<dyn InputHook>,
    pub backend: Arc<dyn IngestBackend>,
}

/// Snapshot of the current (or most recent) session
#[derive(Debug, Clone, Serialize)]
pub struct ObserverStats {
    pub recording: bool,
    pub event_count: u64,
    pub segments_rotated: u64,
    pub session: Option<SessionMetadata>,
}

struct ActiveSession {
    log: Arc<SessionLog>,
    cancel_token: CancellationToken,
    // Never joined: loops exit on their own at the next wait after cancel
    _tasks: Vec<JoinHandle<()>>,
}

pub struct Observer {
    config: ObserverConfig,
    sources: Collaborators,
    active: Mutex<Option<ActiveSession>>,
    last_log: ParkingMutex<Option<Arc<SessionLog>>>,
}

fn create_dir(path: &Path) -> Result<(), StartError> {
    std::fs::create_dir_all(path).map_err(|source| StartError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

impl Observer {
    pub fn new(config: ObserverConfig, sources: Collaborators) -> Self {
        Self {
            config,
            sources,
            active: Mutex::new(None),
            last_log: ParkingMutex::new(None),
        }
    }

    /// Begin a new session. Returns the running session's metadata if one is
    /// already active.
    pub async fn start(&self) -> Result<SessionMetadata, StartError> {
        let mut active = self.active.lock().await;
        if let Some(session) = active.as_ref() {
            return Ok(session.log.metadata());
        }

        create_dir(&self.config.logs_dir)?;
        create_dir(&self.config.screenshots_dir)?;

        let identity = HostIdentity::detect();
        tracing::info!(
            "Host identity: {} / {} / {}",
            identity.hostname,
            identity.username,
            identity.os
        );

        let metadata = SessionMetadata::new(&self.config.logs_dir, identity);
        let context = Arc::new(SharedContext::new());
        let log = Arc::new(SessionLog::open(
            &self.config.logs_dir,
            metadata.clone(),
            context.clone(),
        )?);

        let cancel_token = CancellationToken::new();
        let mut tasks = Vec::with_capacity(3);

        tasks.push(tokio::spawn(window_poll_loop(
            self.sources.window.clone(),
            context.clone(),
            self.config.window_poll_interval(),
            cancel_token.clone(),
        )));

        let shutter = Arc::new(ScreenshotTaker::new(
            self.sources.screen.clone(),
            context,
            self.config.screenshots_dir.clone(),
        ));
        let scheduler = ScreenshotScheduler::new(
            self.config.screenshot_window(),
            self.config.captures_per_window,
        );
        tasks.push(tokio::spawn(scheduler.run(shutter, cancel_token.clone())));

        let uploader = Arc::new(Uploader::new(self.sources.backend.clone()));
        tasks.push(tokio::spawn(rotation::rotation_loop(
            log.clone(),
            uploader,
            self.config.upload_interval(),
            cancel_token.clone(),
        )));

        let recorder = InputRecorder::new(log.clone(), self.config.mouse_throttle());
        for (name, hook) in [("mouse", &self.sources.mouse), ("keyboard", &self.sources.keyboard)] {
            if let Err(e) = hook.attach(recorder.clone()) {
                tracing::warn!("Failed to attach {} hook, continuing without it: {}", name, e);
            }
        }

        *self.last_log.lock() = Some(log.clone());
        *active = Some(ActiveSession {
            log,
            cancel_token,
            _tasks: tasks,
        });

        tracing::info!("Observer started. Session ID: {}", metadata.session_id);
        Ok(metadata)
    }

    /// End the current session. Returns `None` if nothing was recording.
    pub async fn stop(&self) -> Option<SessionSummary> {
        // Held until the hooks are detached so a concurrent start cannot
        // attach them to a new session in between
        let mut active = self.active.lock().await;
        let session = active.take()?;

        session.cancel_token.cancel();

        let mouse = self.sources.mouse.clone();
        let keyboard = self.sources.keyboard.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || {
            mouse.detach();
            keyboard.detach();
        })
        .await
        {
            tracing::warn!("Input hook detach failed: {}", e);
        }

        let summary = session.log.close()?;
        tracing::info!(
            "Observer stopped. Total events: {}, data stored in: {:?}",
            summary.event_count,
            summary.output_file
        );
        Some(summary)
    }

    pub fn is_recording(&self) -> bool {
        self.last_log
            .lock()
            .as_ref()
            .is_some_and(|log| log.is_recording())
    }

    pub fn stats(&self) -> ObserverStats {
        match self.last_log.lock().as_ref() {
            Some(log) => {
                let stats = log.stats();
                ObserverStats {
                    recording: stats.recording,
                    event_count: stats.event_count,
                    segments_rotated: stats.segments_rotated,
                    session: Some(log.metadata()),
                }
            }
            None => ObserverStats {
                recording: false,
                event_count: 0,
                segments_rotated: 0,
                session: None,
            },
        }
    }
}

impl Drop for Observer {
    // Dropping while recording ends the session: no loop or hook outlives
    // its owner.
    fn drop(&mut self) {
        let Some(session) = self.active.get_mut().take() else {
            return;
        };

        session.cancel_token.cancel();
        self.sources.mouse.detach();
        self.sources.keyboard.detach();

        if let Some(summary) = session.log.close() {
            tracing::info!(
                "Observer dropped while recording. Total events: {}, data stored in: {:?}",
                summary.event_count,
                summary.output_file
            );
        }
    }
}
