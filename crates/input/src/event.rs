use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::key::Key;

/// A raw input event from the hosting surface.
///
/// Desktop hosts translate their native events into these; the session
/// queues them in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Relative mouse movement in pixels.
    LookDelta { dx: f32, dy: f32 },
    /// A key went down or up.
    KeyChange { key: Key, pressed: bool },
    /// Host granted or revoked exclusive pointer capture.
    PointerLockChanged { locked: bool },
    /// Host failed to grant pointer capture.
    PointerLockError { reason: String },
}

impl InputEvent {
    pub fn look(delta: Vec2) -> Self {
        Self::LookDelta {
            dx: delta.x,
            dy: delta.y,
        }
    }

    pub fn key_code(code: u32, pressed: bool) -> Self {
        Self::KeyChange {
            key: Key::from_code(code),
            pressed,
        }
    }
}
