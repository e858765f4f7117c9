//! Input hook adapters (mouse, keyboard)
//!
//! Hooks deliver raw callbacks into an [`InputRecorder`], which throttles
//! mouse movement, keeps the cursor snapshot current and appends records to
//! the session log.

pub mod channel;
pub mod types;

pub use channel::{InputRecorder, MoveThrottle};
pub use types::{ButtonAction, Key, KeyPress, MouseButton, MouseClick, MouseMove, MouseScroll, NamedKey};
