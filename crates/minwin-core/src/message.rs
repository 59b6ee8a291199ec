use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a live on-screen window.
///
/// Stored as a `usize` so the core crate stays free of platform types;
/// platform crates convert to and from their native handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WindowHandle(pub usize);

impl WindowHandle {
    /// The null handle. Used as the target of thread messages such as QUIT.
    pub const NULL: Self = Self(0);
}

/// A numeric message code, using the Win32 values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageCode(pub u32);

impl MessageCode {
    pub const NULL: Self = Self(0x0000);
    pub const CREATE: Self = Self(0x0001);
    pub const DESTROY: Self = Self(0x0002);
    pub const MOVE: Self = Self(0x0003);
    pub const SIZE: Self = Self(0x0005);
    pub const ACTIVATE: Self = Self(0x0006);
    pub const PAINT: Self = Self(0x000F);
    pub const CLOSE: Self = Self(0x0010);
    pub const QUIT: Self = Self(0x0012);
    pub const KEYDOWN: Self = Self(0x0100);
    pub const KEYUP: Self = Self(0x0101);
    pub const CHAR: Self = Self(0x0102);
    pub const SYSKEYDOWN: Self = Self(0x0104);
    pub const SYSKEYUP: Self = Self(0x0105);
    pub const TIMER: Self = Self(0x0113);
    pub const MOUSEMOVE: Self = Self(0x0200);

    const NAMED: &[(&str, Self)] = &[
        ("NULL", Self::NULL),
        ("CREATE", Self::CREATE),
        ("DESTROY", Self::DESTROY),
        ("MOVE", Self::MOVE),
        ("SIZE", Self::SIZE),
        ("ACTIVATE", Self::ACTIVATE),
        ("PAINT", Self::PAINT),
        ("CLOSE", Self::CLOSE),
        ("QUIT", Self::QUIT),
        ("KEYDOWN", Self::KEYDOWN),
        ("KEYUP", Self::KEYUP),
        ("CHAR", Self::CHAR),
        ("SYSKEYDOWN", Self::SYSKEYDOWN),
        ("SYSKEYUP", Self::SYSKEYUP),
        ("TIMER", Self::TIMER),
        ("MOUSEMOVE", Self::MOUSEMOVE),
    ];

    /// Returns true for the codes that end the message pump.
    pub fn is_terminal(self) -> bool {
        self == Self::CLOSE || self == Self::QUIT
    }

    /// Returns true for key-down codes that translation turns into
    /// character messages.
    pub fn is_key_down(self) -> bool {
        self == Self::KEYDOWN || self == Self::SYSKEYDOWN
    }

    /// Returns the symbolic name (without the `WM_` prefix), if known.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, code)| *code == self)
            .map(|(name, _)| *name)
    }

    /// Parses a message code from a name or a number.
    ///
    /// Accepts `paint`, `WM_PAINT`, `0x000F` and `15`. Names are
    /// case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u32::from_str_radix(hex, 16).ok().map(Self);
        }
        if let Ok(n) = s.parse::<u32>() {
            return Some(Self(n));
        }

        let upper = s.to_ascii_uppercase();
        let name = upper.strip_prefix("WM_").unwrap_or(&upper);
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| *code)
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "WM_{name}"),
            None => write!(f, "{:#06x}", self.0),
        }
    }
}

/// A queued message retrieved from the thread's message queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub hwnd: WindowHandle,
    pub code: MessageCode,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    /// Creates a message with zeroed parameters.
    pub fn new(hwnd: WindowHandle, code: MessageCode) -> Self {
        Self {
            hwnd,
            code,
            wparam: 0,
            lparam: 0,
        }
    }

    /// Creates a thread message (no target window).
    pub fn thread(code: MessageCode) -> Self {
        Self::new(WindowHandle::NULL, code)
    }
}
