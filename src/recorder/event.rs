//! Event record model
//!
//! One [`Event`] is built per accepted observation, serialized to a single
//! JSON line and dropped.

use crate::capture::context::WindowContext;
use crate::capture::input::types::{KeyPress, MouseClick, MouseMove, MouseScroll};
use serde::{Deserialize, Serialize};

/// Raw observation handed to the log sink by an input adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    MouseMove(MouseMove),
    MouseClick(MouseClick),
    MouseScroll(MouseScroll),
    KeyPress(KeyPress),
}

impl Observation {
    /// Merge the observation's own fields with a window-context snapshot.
    pub fn enrich(self, window: WindowContext) -> EventData {
        match self {
            Observation::MouseMove(fields) => EventData::MouseMove(Enriched { fields, window }),
            Observation::MouseClick(fields) => EventData::MouseClick(Enriched { fields, window }),
            Observation::MouseScroll(fields) => {
                EventData::MouseScroll(Enriched { fields, window })
            }
            Observation::KeyPress(fields) => EventData::KeyPress(Enriched { fields, window }),
        }
    }
}

/// Event fields plus the window context, flattened into one JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enriched<T> {
    #[serde(flatten)]
    pub fields: T,
    #[serde(flatten)]
    pub window: WindowContext,
}

/// `event_type` tag and typed `data` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum EventData {
    MouseMove(Enriched<MouseMove>),
    MouseClick(Enriched<MouseClick>),
    MouseScroll(Enriched<MouseScroll>),
    KeyPress(Enriched<KeyPress>),
}

impl EventData {
    pub fn event_type(&self) -> &'static str {
        match self {
            EventData::MouseMove(_) => "mouse_move",
            EventData::MouseClick(_) => "mouse_click",
            EventData::MouseScroll(_) => "mouse_scroll",
            EventData::KeyPress(_) => "key_press",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub session_id: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub data: EventData,
}

impl Event {
    /// Serialize as one newline-terminated JSON line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
