//! Input surface: key codes, mouse-look deltas and pointer capture.
//!
//! # Invariants
//! - Raw platform codes never leave this crate; consumers see [`Key`].
//! - Pointer capture errors leave the surface unlocked.

pub mod event;
pub mod key;
pub mod pointer;

pub use event::InputEvent;
pub use key::{Key, KeyParseError};
pub use pointer::{PointerLock, PointerLockMode};
