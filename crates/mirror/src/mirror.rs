use glam::Vec3;
use peerspace_common::{PeerId, Pose};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;

use crate::loader::{AcquisitionId, Representation, RepresentationLoader};

/// What to do with messages for a peer whose representation is still loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionPolicy {
    /// One acquisition per peer; later messages only refresh the pose the
    /// representation receives when it arrives.
    #[default]
    Deduplicate,
    /// Every message for an unregistered peer starts another acquisition.
    /// The newest completion wins and earlier ones are released.
    PerMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Added to the vertical (Y) rotation of every inbound pose to account
    /// for how the avatar model was authored.
    pub yaw_offset: f32,
    pub policy: AcquisitionPolicy,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            yaw_offset: FRAC_PI_2,
            policy: AcquisitionPolicy::Deduplicate,
        }
    }
}

/// Result of applying one inbound peer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerUpdate {
    /// The registered representation was moved.
    Moved,
    /// A new acquisition was started.
    Acquiring(AcquisitionId),
    /// An acquisition is already outstanding; the pose was recorded.
    Deferred,
}

/// Result of feeding back a completed acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// First representation for this peer.
    Registered(PeerId),
    /// Duplicate acquisition finished; the older representation was released.
    Replaced(PeerId),
    /// Nobody wanted it any more (peer went offline); released.
    Discarded,
}

#[derive(Debug)]
enum Slot<R> {
    Pending { latest: Pose },
    Ready(R),
}

/// Mirror of remote peer state into local representations.
///
/// Owned by the session; mutated only through its operations, never shared.
/// Uses BTreeMap so peers iterate in a stable order.
pub struct RemotePlayerMirror<L: RepresentationLoader> {
    config: MirrorConfig,
    loader: L,
    peers: BTreeMap<PeerId, Slot<L::Output>>,
    in_flight: BTreeMap<AcquisitionId, PeerId>,
    next_acquisition: u64,
}

impl<L: RepresentationLoader> RemotePlayerMirror<L> {
    pub fn new(config: MirrorConfig, loader: L) -> Self {
        Self {
            config,
            loader,
            peers: BTreeMap::new(),
            in_flight: BTreeMap::new(),
            next_acquisition: 0,
        }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Apply an inbound `player` message.
    pub fn on_peer_state(&mut self, peer: &PeerId, position: Vec3, rotation: Vec3) -> PeerUpdate {
        let pose = Pose::new(position, rotation + Vec3::Y * self.config.yaw_offset);
        let policy = self.config.policy;

        match self.peers.get_mut(peer) {
            Some(Slot::Ready(repr)) => {
                repr.set_pose(pose);
                tracing::trace!(%peer, ?position, "peer moved");
                PeerUpdate::Moved
            }
            Some(Slot::Pending { latest }) => {
                *latest = pose;
                match policy {
                    AcquisitionPolicy::Deduplicate => PeerUpdate::Deferred,
                    AcquisitionPolicy::PerMessage => PeerUpdate::Acquiring(self.acquire(peer)),
                }
            }
            None => {
                self.peers
                    .insert(peer.clone(), Slot::Pending { latest: pose });
                PeerUpdate::Acquiring(self.acquire(peer))
            }
        }
    }

    /// Apply an inbound `offline` message. Returns true if the peer was known.
    pub fn on_peer_disconnect(&mut self, peer: &PeerId) -> bool {
        self.in_flight.retain(|_, p| *p != *peer);
        match self.peers.remove(peer) {
            Some(Slot::Ready(repr)) => {
                tracing::debug!(%peer, "peer offline, releasing representation");
                self.loader.release(repr);
                true
            }
            Some(Slot::Pending { .. }) => {
                tracing::debug!(%peer, "peer offline before its representation loaded");
                true
            }
            None => false,
        }
    }

    /// Feed back a finished acquisition.
    pub fn on_representation_ready(
        &mut self,
        acquisition: AcquisitionId,
        mut repr: L::Output,
    ) -> ReadyOutcome {
        let Some(peer) = self.in_flight.remove(&acquisition) else {
            tracing::debug!(%acquisition, "acquisition no longer wanted, releasing");
            self.loader.release(repr);
            return ReadyOutcome::Discarded;
        };

        match self.peers.remove(&peer) {
            Some(Slot::Pending { latest }) => {
                repr.set_pose(latest);
                tracing::debug!(%peer, %acquisition, "peer representation registered");
                self.peers.insert(peer.clone(), Slot::Ready(repr));
                ReadyOutcome::Registered(peer)
            }
            Some(Slot::Ready(old)) => {
                repr.set_pose(old.pose());
                tracing::debug!(%peer, %acquisition, "duplicate acquisition replaced representation");
                self.loader.release(old);
                self.peers.insert(peer.clone(), Slot::Ready(repr));
                ReadyOutcome::Replaced(peer)
            }
            None => {
                self.loader.release(repr);
                ReadyOutcome::Discarded
            }
        }
    }

    /// Completions the loader has finished since the last call.
    pub fn poll_loader(&mut self) -> Vec<(AcquisitionId, L::Output)> {
        self.loader.poll_completed()
    }

    /// Whether `peer` has a registered representation.
    pub fn contains(&self, peer: &PeerId) -> bool {
        matches!(self.peers.get(peer), Some(Slot::Ready(_)))
    }

    /// Whether `peer` is known but its representation is still loading.
    pub fn is_pending(&self, peer: &PeerId) -> bool {
        matches!(self.peers.get(peer), Some(Slot::Pending { .. }))
    }

    pub fn get(&self, peer: &PeerId) -> Option<&L::Output> {
        match self.peers.get(peer) {
            Some(Slot::Ready(repr)) => Some(repr),
            _ => None,
        }
    }

    /// Number of registered representations.
    pub fn len(&self) -> usize {
        self.peers
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of acquisitions whose results are still wanted.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Registered peers with their current poses, in id order.
    pub fn peers(&self) -> impl Iterator<Item = (&PeerId, Pose)> + '_ {
        self.peers.iter().filter_map(|(id, slot)| match slot {
            Slot::Ready(repr) => Some((id, repr.pose())),
            Slot::Pending { .. } => None,
        })
    }

    /// Release every representation and forget outstanding acquisitions.
    pub fn shutdown(&mut self) {
        self.in_flight.clear();
        let peers = std::mem::take(&mut self.peers);
        for (_, slot) in peers {
            if let Slot::Ready(repr) = slot {
                self.loader.release(repr);
            }
        }
    }

    fn acquire(&mut self, peer: &PeerId) -> AcquisitionId {
        let acquisition = AcquisitionId(self.next_acquisition);
        self.next_acquisition += 1;
        self.in_flight.insert(acquisition, peer.clone());
        tracing::debug!(%peer, %acquisition, "acquiring peer representation");
        self.loader.request(peer, acquisition);
        acquisition
    }
}
