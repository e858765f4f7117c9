//! Errors that cross the observer boundary

use std::path::PathBuf;
use thiserror::Error;

/// Raised by [`Observer::start`](super::Observer::start). No session exists
/// after any of these.
#[derive(Error, Debug)]
pub enum StartError {
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log segment {path:?}: {source}")]
    OpenSegment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
