//! Collaborator seams for the platform capture sources
//!
//! The observer never talks to an OS API directly. Window queries, monitor
//! enumeration, pixel capture and input hooks are reached through the traits
//! below so each platform (or a test) can plug in its own implementation.

use crate::capture::input::InputRecorder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by capture collaborators.
///
/// These never end a session: the caller substitutes a null result and
/// carries on.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture source unavailable on this platform: {0}")]
    Unsupported(&'static str),

    #[error("No display available")]
    NoDisplay,

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Encoding error: {0}")]
    Encoding(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Foreground window as reported by the window query source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// Bounding rectangle of one display in global screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBounds {
    pub id: u32,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl DisplayBounds {
    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring display.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        let left = i64::from(self.left);
        let top = i64::from(self.top);
        x >= left
            && x < left + i64::from(self.width)
            && y >= top
            && y < top + i64::from(self.height)
    }
}

/// Frame produced by the pixel-capture primitive
#[derive(Debug)]
pub struct CapturedFrame {
    /// Tightly packed RGBA pixels, `width * height * 4` bytes
    pub data: Vec<u8>,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

/// Foreground-window query
pub trait WindowSource: Send + Sync {
    /// `Ok(None)` means the query worked but nothing is focused.
    fn foreground_window(&self) -> CaptureResult<Option<WindowInfo>>;
}

/// Monitor enumeration and pixel capture
pub trait ScreenSource: Send + Sync {
    fn displays(&self) -> CaptureResult<Vec<DisplayBounds>>;

    fn capture(&self, display: &DisplayBounds) -> CaptureResult<CapturedFrame>;
}

/// An input-hook source (mouse or keyboard)
///
/// The source delivers callbacks on its own thread by calling into the
/// [`InputRecorder`] it was attached with. `detach` must not return until no
/// further callbacks can be delivered.
pub trait InputHook: Send + Sync {
    fn attach(&self, recorder: InputRecorder) -> CaptureResult<()>;

    fn detach(&self);
}
