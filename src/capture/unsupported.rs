//! Placeholder sources for hosts without a native capture backend
//!
//! Every query reports [`CaptureError::Unsupported`], which the loops treat
//! like any other capture failure: null window context, no screenshot. Hooks
//! accept the attach and never deliver a callback.

use crate::capture::input::InputRecorder;
use crate::capture::traits::{
    CaptureError, CaptureResult, CapturedFrame, DisplayBounds, InputHook, ScreenSource,
    WindowInfo, WindowSource,
};

pub struct UnsupportedWindows;

impl WindowSource for UnsupportedWindows {
    fn foreground_window(&self) -> CaptureResult<Option<WindowInfo>> {
        Err(CaptureError::Unsupported("foreground window query"))
    }
}

pub struct UnsupportedScreen;

impl ScreenSource for UnsupportedScreen {
    fn displays(&self) -> CaptureResult<Vec<DisplayBounds>> {
        Err(CaptureError::Unsupported("display enumeration"))
    }

    fn capture(&self, _display: &DisplayBounds) -> CaptureResult<CapturedFrame> {
        Err(CaptureError::Unsupported("screen capture"))
    }
}

pub struct UnsupportedHook {
    pub kind: &'static str,
}

impl InputHook for UnsupportedHook {
    fn attach(&self, _recorder: InputRecorder) -> CaptureResult<()> {
        tracing::warn!("No {} hook available on this platform", self.kind);
        Ok(())
    }

    fn detach(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::window::sample_window;
    use crate::capture::WindowContext;

    #[test]
    fn unsupported_window_source_yields_null_context() {
        assert_eq!(sample_window(&UnsupportedWindows), WindowContext::default());
    }

    #[test]
    fn unsupported_screen_reports_error() {
        assert!(matches!(
            UnsupportedScreen.displays(),
            Err(CaptureError::Unsupported(_))
        ));
    }
}
