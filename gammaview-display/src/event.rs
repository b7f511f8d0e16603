//! Input events delivered by the host window.

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
    };
    pub const CONTROL: Self = Self {
        shift: false,
        control: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Press,
    Release,
}

/// Mouse buttons; the wheel arrives as button presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Return,
    Backspace,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingKind {
    Enter,
    Leave,
}

/// One window event; positions are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Motion {
        pos: (i32, i32),
        modifiers: Modifiers,
    },
    Button {
        kind: ButtonKind,
        button: MouseButton,
        pos: (i32, i32),
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        modifiers: Modifiers,
    },
    Crossing {
        kind: CrossingKind,
        pos: (i32, i32),
    },
}

impl Event {
    /// Pointer motion without modifiers.
    #[must_use]
    pub fn motion(x: i32, y: i32) -> Self {
        Event::Motion {
            pos: (x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Button press without modifiers.
    #[must_use]
    pub fn press(button: MouseButton, x: i32, y: i32) -> Self {
        Event::Button {
            kind: ButtonKind::Press,
            button,
            pos: (x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Button release without modifiers.
    #[must_use]
    pub fn release(button: MouseButton, x: i32, y: i32) -> Self {
        Event::Button {
            kind: ButtonKind::Release,
            button,
            pos: (x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Key press without modifiers.
    #[must_use]
    pub fn key(key: Key) -> Self {
        Event::Key {
            key,
            modifiers: Modifiers::NONE,
        }
    }
}
