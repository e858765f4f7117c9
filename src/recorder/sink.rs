//! Log sink shared by every capture source of a session
//!
//! All writes and the rotation swap go through the same mutex, so the order
//! in which callers take the lock is the order of records on disk and a
//! record always lands whole in exactly one segment.

use super::error::StartError;
use super::event::{Event, Observation};
use super::session::{segment_path, SessionMetadata};
use crate::capture::context::SharedContext;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

enum Lifecycle {
    /// The open segment. Present exactly while recording.
    Recording(File),
    Stopped,
}

struct ObserverState {
    lifecycle: Lifecycle,
    event_count: u64,
    rotations: u64,
    metadata: SessionMetadata,
}

/// Segment detached by a rotation, ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedSegment {
    pub path: PathBuf,
    pub session_id: String,
    pub username: String,
}

/// Final counters of a stopped session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub event_count: u64,
    pub segments_rotated: u64,
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub recording: bool,
    pub event_count: u64,
    pub segments_rotated: u64,
}

pub struct SessionLog {
    logs_dir: PathBuf,
    context: Arc<SharedContext>,
    state: Mutex<ObserverState>,
}

fn open_segment(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Write one newline-terminated record unbuffered.
///
/// If the write fails after part of the record reached the file, the
/// fragment is terminated so the next record starts on its own line.
fn append_line<W: Write>(out: &mut W, line: &[u8]) -> io::Result<()> {
    let mut written = 0;
    let result = loop {
        if written == line.len() {
            break Ok(());
        }
        match out.write(&line[written..]) {
            Ok(0) => break Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => break Err(e),
        }
    };

    if result.is_err() && written > 0 {
        if let Err(e) = out.write_all(b"\n") {
            tracing::warn!("Failed to terminate partial record: {}", e);
        }
    }
    result
}

impl SessionLog {
    /// Open the session's first segment and enter the recording state.
    pub fn open(
        logs_dir: &Path,
        metadata: SessionMetadata,
        context: Arc<SharedContext>,
    ) -> Result<Self, StartError> {
        let writer =
            open_segment(&metadata.output_file).map_err(|source| StartError::OpenSegment {
                path: metadata.output_file.clone(),
                source,
            })?;

        tracing::debug!("Opened segment {:?}", metadata.output_file);

        Ok(Self {
            logs_dir: logs_dir.to_path_buf(),
            context,
            state: Mutex::new(ObserverState {
                lifecycle: Lifecycle::Recording(writer),
                event_count: 0,
                rotations: 0,
                metadata,
            }),
        })
    }

    pub fn context(&self) -> &Arc<SharedContext> {
        &self.context
    }

    /// Append one observation. Returns whether a record was written.
    ///
    /// A stopped log ignores the call. A failed append loses only this record.
    pub fn record(&self, observation: Observation) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Lifecycle::Recording(writer) = &mut state.lifecycle else {
            return false;
        };

        let event = Event {
            session_id: state.metadata.session_id.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            data: observation.enrich((*self.context.window()).clone()),
        };

        let line = match event.to_line() {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Dropping {} event: {}", event.data.event_type(), e);
                return false;
            }
        };

        if let Err(e) = append_line(writer, line.as_bytes()) {
            tracing::warn!(
                "Failed to append {} event to {:?}: {}",
                event.data.event_type(),
                state.metadata.output_file,
                e
            );
            return false;
        }

        state.event_count += 1;
        true
    }

    /// Swap the active segment for a fresh one.
    ///
    /// Returns `Ok(None)` when the log is stopped. The new file is opened
    /// before the old one is closed, so a failure leaves the current segment
    /// in place.
    pub fn rotate(&self) -> io::Result<Option<RotatedSegment>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Lifecycle::Recording(writer) = &mut state.lifecycle else {
            return Ok(None);
        };

        let new_path = segment_path(&self.logs_dir, &Uuid::new_v4().to_string());
        let old_file = std::mem::replace(writer, open_segment(&new_path)?);
        if let Err(e) = old_file.sync_data() {
            tracing::warn!("Failed to sync {:?}: {}", state.metadata.output_file, e);
        }
        drop(old_file);

        let old_path = std::mem::replace(&mut state.metadata.output_file, new_path);
        state.rotations += 1;

        tracing::info!(
            "Rotated segment {:?} -> {:?}",
            old_path,
            state.metadata.output_file
        );

        Ok(Some(RotatedSegment {
            path: old_path,
            session_id: state.metadata.session_id.clone(),
            username: state.metadata.username.clone(),
        }))
    }

    /// Flush and close the open segment. Only the first call returns a
    /// summary.
    pub fn close(&self) -> Option<SessionSummary> {
        let mut state = self.state.lock();

        let Lifecycle::Recording(file) =
            std::mem::replace(&mut state.lifecycle, Lifecycle::Stopped)
        else {
            return None;
        };

        if let Err(e) = file.sync_data() {
            tracing::warn!("Failed to sync {:?}: {}", state.metadata.output_file, e);
        }
        drop(file);

        Some(SessionSummary {
            session_id: state.metadata.session_id.clone(),
            event_count: state.event_count,
            segments_rotated: state.rotations,
            output_file: state.metadata.output_file.clone(),
        })
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state.lock().lifecycle, Lifecycle::Recording(_))
    }

    pub fn metadata(&self) -> SessionMetadata {
        self.state.lock().metadata.clone()
    }

    pub fn stats(&self) -> LogStats {
        let state = self.state.lock();
        LogStats {
            recording: matches!(state.lifecycle, Lifecycle::Recording(_)),
            event_count: state.event_count,
            segments_rotated: state.rotations,
        }
    }
}
