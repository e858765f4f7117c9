//! Capture sources and the background loops that drive them
//!
//! Platform access sits behind the traits in [`traits`]. The loops here only
//! schedule calls and decide what to do when a call fails.

pub mod context;
pub mod input;
pub mod screenshot;
pub mod traits;
pub mod unsupported;
pub mod window;

// Re-export traits
pub use traits::{
    CaptureError, CaptureResult, CapturedFrame, DisplayBounds, InputHook, ScreenSource,
    WindowInfo, WindowSource,
};

pub use context::{CursorPosition, SharedContext, WindowContext};
pub use input::InputRecorder;
