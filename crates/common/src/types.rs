use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier the transport assigns to a remote client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Position plus XYZ Euler orientation of an object in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Euler angles in radians, applied in X, Y, Z order.
    pub rotation: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_default_is_identity() {
        let p = Pose::default();
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.rotation, Vec3::ZERO);
    }

    #[test]
    fn peer_id_is_transparent_on_the_wire() {
        let id = PeerId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(id.to_string(), "abc");
    }
}
