use crate::capture::input::types::{
    ButtonAction, Key, KeyPress, MouseButton, MouseClick, MouseMove, MouseScroll,
};
use crate::recorder::event::Observation;
use crate::recorder::sink::SessionLog;
use parking_lot::Mutex as ParkingMutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rate limit for mouse-move records
#[derive(Debug)]
pub struct MoveThrottle {
    min_interval: Duration,
    last_accepted: ParkingMutex<Option<Instant>>,
}

impl MoveThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: ParkingMutex::new(None),
        }
    }

    /// Whether a move seen at `now` should be written. Accepting a move
    /// restarts the interval; dropped moves do not.
    pub fn admit(&self, now: Instant) -> bool {
        let mut last = self.last_accepted.lock();
        match *last {
            Some(prev) if now.saturating_duration_since(prev) < self.min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

/// Handle given to input hooks for one session
///
/// Callbacks run on the hook's delivery thread. They update the cursor
/// snapshot, apply the move throttle and append to the session log; nothing
/// here waits on anything but the log mutex.
#[derive(Clone)]
pub struct InputRecorder {
    log: Arc<SessionLog>,
    throttle: Arc<MoveThrottle>,
}

impl InputRecorder {
    pub fn new(log: Arc<SessionLog>, mouse_throttle: Duration) -> Self {
        Self {
            log,
            throttle: Arc::new(MoveThrottle::new(mouse_throttle)),
        }
    }

    pub fn on_mouse_move(&self, x: i32, y: i32) {
        self.on_mouse_move_at(x, y, Instant::now());
    }

    pub(crate) fn on_mouse_move_at(&self, x: i32, y: i32, now: Instant) {
        // Cursor tracking sees every move, throttled or not
        self.log.context().set_cursor(x, y);

        if !self.throttle.admit(now) {
            return;
        }

        self.log.record(Observation::MouseMove(MouseMove { x, y }));
    }

    pub fn on_mouse_click(&self, x: i32, y: i32, button: MouseButton, pressed: bool) {
        self.log.record(Observation::MouseClick(MouseClick {
            x,
            y,
            button,
            action: ButtonAction::from(pressed),
        }));
    }

    pub fn on_mouse_scroll(&self, x: i32, y: i32, dx: i32, dy: i32) {
        self.log
            .record(Observation::MouseScroll(MouseScroll { x, y, dx, dy }));
    }

    pub fn on_key_press(&self, key: Key) {
        self.log
            .record(Observation::KeyPress(KeyPress { key: key.label() }));
    }
}
