//! Shared types used across the peerspace workspace.
//!
//! # Invariants
//! - Rotations are XYZ Euler angles in radians, the order remote clients use.
//! - Peer identifiers are opaque; nothing parses them.

pub mod types;

pub use types::{PeerId, Pose};
