//! Replace-only snapshots shared between the pollers and the event writer

use crate::capture::traits::WindowInfo;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Most recent foreground-window sample, merged into every event's `data`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowContext {
    pub window_title: Option<String>,
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,
}

impl From<WindowInfo> for WindowContext {
    fn from(info: WindowInfo) -> Self {
        Self {
            window_title: Some(info.title),
            window_width: Some(info.width),
            window_height: Some(info.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}

/// Per-session snapshots. Each has one writer and any number of readers;
/// values are swapped whole, never edited in place.
#[derive(Debug, Default)]
pub struct SharedContext {
    window: RwLock<Arc<WindowContext>>,
    cursor: RwLock<Option<CursorPosition>>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(&self) -> Arc<WindowContext> {
        self.window.read().clone()
    }

    pub fn set_window(&self, context: WindowContext) {
        *self.window.write() = Arc::new(context);
    }

    pub fn cursor(&self) -> Option<CursorPosition> {
        *self.cursor.read()
    }

    pub fn set_cursor(&self, x: i32, y: i32) {
        *self.cursor.write() = Some(CursorPosition { x, y });
    }
}
