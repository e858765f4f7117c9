use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseMove {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseClick {
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseScroll {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Pressed,
    Released,
}

impl From<bool> for ButtonAction {
    fn from(pressed: bool) -> Self {
        if pressed {
            ButtonAction::Pressed
        } else {
            ButtonAction::Released
        }
    }
}

/// Key identity as delivered by the keyboard hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Alt,
    AltGr,
    Backspace,
    CapsLock,
    Cmd,
    Ctrl,
    Delete,
    Down,
    End,
    Enter,
    Esc,
    F(u8),
    Home,
    Insert,
    Left,
    Menu,
    NumLock,
    PageDown,
    PageUp,
    Pause,
    PrintScreen,
    Right,
    ScrollLock,
    Shift,
    Space,
    Tab,
    Up,
    Unknown(u32),
}

impl NamedKey {
    fn name(&self) -> String {
        let name = match self {
            NamedKey::Alt => "alt",
            NamedKey::AltGr => "alt_gr",
            NamedKey::Backspace => "backspace",
            NamedKey::CapsLock => "caps_lock",
            NamedKey::Cmd => "cmd",
            NamedKey::Ctrl => "ctrl",
            NamedKey::Delete => "delete",
            NamedKey::Down => "down",
            NamedKey::End => "end",
            NamedKey::Enter => "enter",
            NamedKey::Esc => "esc",
            NamedKey::F(n) => return format!("f{n}"),
            NamedKey::Home => "home",
            NamedKey::Insert => "insert",
            NamedKey::Left => "left",
            NamedKey::Menu => "menu",
            NamedKey::NumLock => "num_lock",
            NamedKey::PageDown => "page_down",
            NamedKey::PageUp => "page_up",
            NamedKey::Pause => "pause",
            NamedKey::PrintScreen => "print_screen",
            NamedKey::Right => "right",
            NamedKey::ScrollLock => "scroll_lock",
            NamedKey::Shift => "shift",
            NamedKey::Space => "space",
            NamedKey::Tab => "tab",
            NamedKey::Up => "up",
            NamedKey::Unknown(code) => return format!("unknown_{code}"),
        };
        name.to_string()
    }
}

impl Key {
    /// Text written to the log for this key.
    ///
    /// Printable characters are written as themselves; everything else gets a
    /// `Key.<name>` label so it can never collide with a typed character.
    pub fn label(&self) -> String {
        match self {
            Key::Char(c) if !c.is_control() => c.to_string(),
            Key::Char(c) => format!("Key.u{:04x}", *c as u32),
            Key::Named(named) => format!("Key.{}", named.name()),
        }
    }
}
