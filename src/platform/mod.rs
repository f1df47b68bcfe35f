//! Platform input
//!
//! Raw pointer/keyboard handling stays with the host. Whatever it captures is
//! handed to the world as an `InputEvent` in surface pixel coordinates.

use glam::Vec2;

/// An input event already dispatched by the host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary pointer pressed (mouse button / touch start)
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    KeyDown { key: String },
}

impl InputEvent {
    /// Pointer position in surface pixels, if the event carries one
    pub fn pointer(&self) -> Option<Vec2> {
        match *self {
            InputEvent::PointerDown { x, y } | InputEvent::PointerMove { x, y } => {
                Some(Vec2::new(x, y))
            }
            InputEvent::KeyDown { .. } => None,
        }
    }
}
