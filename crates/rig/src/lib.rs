//! Camera Rig: the local first-person viewpoint.
//!
//! The rig is a yaw carrier holding a pitch carrier holding the camera.
//! Yaw turns the whole rig, pitch turns only the head.
//!
//! # Invariants
//! - Pitch is clamped after every mutation; yaw is never clamped or wrapped.
//! - Movement follows yaw only, never pitch.
//! - Look input is applied only while the pointer is locked.

mod projection;
mod rig;

pub use projection::Projection;
pub use rig::{CameraRig, MoveIntents, RigConfig};
