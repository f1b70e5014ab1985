use peerspace_common::{PeerId, Pose};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket identifying one outstanding representation acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AcquisitionId(pub u64);

impl fmt::Display for AcquisitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acq#{}", self.0)
    }
}

/// A visual stand-in for a peer in the local scene.
pub trait Representation {
    fn set_pose(&mut self, pose: Pose);
    fn pose(&self) -> Pose;
}

/// Source of representations.
///
/// `request` must not block: the result is picked up later through
/// `poll_completed`, possibly after more messages for the same peer arrived.
pub trait RepresentationLoader {
    type Output: Representation;

    /// Start acquiring a representation for `peer`.
    fn request(&mut self, peer: &PeerId, acquisition: AcquisitionId);

    /// Acquisitions that finished since the last poll, in completion order.
    fn poll_completed(&mut self) -> Vec<(AcquisitionId, Self::Output)>;

    /// Remove a representation from the scene and free it.
    fn release(&mut self, representation: Self::Output);
}
