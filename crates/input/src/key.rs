use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Platform key codes for the movement keys.
pub const KEY_W: u32 = 87;
pub const KEY_A: u32 = 65;
pub const KEY_S: u32 = 83;
pub const KEY_D: u32 = 68;

/// A physical key as seen by the first-person controller.
///
/// Anything that is not a movement key is carried as [`Key::Other`] so the
/// consumer can ignore it without the input layer dropping events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Other(u32),
}

impl Key {
    /// Map a platform key code (DOM `keyCode` numbering).
    pub fn from_code(code: u32) -> Self {
        match code {
            KEY_W => Self::W,
            KEY_A => Self::A,
            KEY_S => Self::S,
            KEY_D => Self::D,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::W => KEY_W,
            Self::A => KEY_A,
            Self::S => KEY_S,
            Self::D => KEY_D,
            Self::Other(code) => code,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized key name: {0:?}")]
pub struct KeyParseError(pub String);

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "W" => Ok(Self::W),
            "A" => Ok(Self::A),
            "S" => Ok(Self::S),
            "D" => Ok(Self::D),
            other => other
                .parse::<u32>()
                .map(Self::from_code)
                .map_err(|_| KeyParseError(s.to_owned())),
        }
    }
}

#[cfg(feature = "winit")]
impl From<winit::keyboard::KeyCode> for Key {
    fn from(code: winit::keyboard::KeyCode) -> Self {
        use winit::keyboard::KeyCode;
        match code {
            KeyCode::KeyW => Self::W,
            KeyCode::KeyA => Self::A,
            KeyCode::KeyS => Self::S,
            KeyCode::KeyD => Self::D,
            KeyCode::Space => Self::Other(32),
            KeyCode::Escape => Self::Other(27),
            // Remaining keys are not distinguished.
            _ => Self::Other(0),
        }
    }
}
