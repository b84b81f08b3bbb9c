//! Platform input as delivered to a node by the input router.

use super::event::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Which family of event names a pointer input is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerSource {
    /// `mouseDown` / `mouseUp` / `mouseMove`
    Mouse,
    /// `pointerDown` / `pointerUp` / `pointerMove`
    #[default]
    Pointer,
}

impl PointerSource {
    pub fn down_event(self) -> EventKind {
        match self {
            PointerSource::Mouse => EventKind::MouseDown,
            PointerSource::Pointer => EventKind::PointerDown,
        }
    }

    pub fn up_event(self) -> EventKind {
        match self {
            PointerSource::Mouse => EventKind::MouseUp,
            PointerSource::Pointer => EventKind::PointerUp,
        }
    }

    pub fn move_event(self) -> EventKind {
        match self {
            PointerSource::Mouse => EventKind::MouseMove,
            PointerSource::Pointer => EventKind::PointerMove,
        }
    }
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub logo: bool,
}

/// Named keys for special keyboard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Character input
    Char(char),
}

impl Key {
    /// Keys that activate a focused node like a click
    pub fn is_activation(self) -> bool {
        matches!(self, Key::Enter | Key::Space | Key::Char(' '))
    }
}

/// One input event routed to a node.
///
/// Coordinates are in the same space as the node's `x`/`y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        button: MouseButton,
        source: PointerSource,
    },
    PointerUp {
        x: f32,
        y: f32,
        button: MouseButton,
        source: PointerSource,
    },
    PointerMove {
        x: f32,
        y: f32,
        source: PointerSource,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        modifiers: Modifiers,
    },
    Wheel {
        x: f32,
        y: f32,
        delta_x: f32,
        delta_y: f32,
    },
    Focus,
    Blur,
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        InputEvent::PointerDown {
            x,
            y,
            button: MouseButton::Left,
            source: PointerSource::Pointer,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        InputEvent::PointerUp {
            x,
            y,
            button: MouseButton::Left,
            source: PointerSource::Pointer,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        InputEvent::PointerMove {
            x,
            y,
            source: PointerSource::Pointer,
        }
    }

    pub fn mouse_down(x: f32, y: f32) -> Self {
        InputEvent::PointerDown {
            x,
            y,
            button: MouseButton::Left,
            source: PointerSource::Mouse,
        }
    }

    pub fn mouse_up(x: f32, y: f32) -> Self {
        InputEvent::PointerUp {
            x,
            y,
            button: MouseButton::Left,
            source: PointerSource::Mouse,
        }
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        InputEvent::PointerMove {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    pub fn key_down(key: Key) -> Self {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn key_up(key: Key) -> Self {
        InputEvent::KeyUp {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn wheel(x: f32, y: f32, delta_x: f32, delta_y: f32) -> Self {
        InputEvent::Wheel {
            x,
            y,
            delta_x,
            delta_y,
        }
    }
}
