use glam::Vec3;
use peerspace_common::{PeerId, Pose};
use peerspace_mirror::{AcquisitionId, Representation, RepresentationLoader};

use crate::store::{AssetError, AssetId, AssetStore};

/// One placed copy of a model standing in for a remote peer.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    pub model: AssetId,
    pub peer: PeerId,
    pub scale: Vec3,
    pub pose: Pose,
}

impl Representation for ModelInstance {
    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn pose(&self) -> Pose {
        self.pose
    }
}

#[derive(Debug)]
struct PendingLoad {
    peer: PeerId,
    acquisition: AcquisitionId,
    polls_left: u32,
}

/// Loader that instantiates one model per request after a fixed number of
/// polls, the way a background asset load finishes some frames later.
#[derive(Debug)]
pub struct DeferredModelLoader {
    model: AssetId,
    scale: Vec3,
    latency: u32,
    pending: Vec<PendingLoad>,
    live: usize,
    released: u64,
}

impl DeferredModelLoader {
    /// Loader for `model`, completing each request on the `latency`-th poll
    /// after it was made (zero and one both mean the next poll).
    pub fn new(store: &AssetStore, model: AssetId, latency: u32) -> Result<Self, AssetError> {
        let asset = store.get_model(model)?;
        Ok(Self {
            model,
            scale: asset.scale,
            latency: latency.max(1),
            pending: Vec::new(),
            live: 0,
            released: 0,
        })
    }

    /// Requests that have not completed yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Instances handed out and not yet released.
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn released(&self) -> u64 {
        self.released
    }
}

impl RepresentationLoader for DeferredModelLoader {
    type Output = ModelInstance;

    fn request(&mut self, peer: &PeerId, acquisition: AcquisitionId) {
        tracing::debug!(%peer, %acquisition, model = ?self.model, "model load started");
        self.pending.push(PendingLoad {
            peer: peer.clone(),
            acquisition,
            polls_left: self.latency,
        });
    }

    fn poll_completed(&mut self) -> Vec<(AcquisitionId, ModelInstance)> {
        let mut done = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut load in self.pending.drain(..) {
            load.polls_left -= 1;
            if load.polls_left == 0 {
                done.push((
                    load.acquisition,
                    ModelInstance {
                        model: self.model,
                        peer: load.peer,
                        scale: self.scale,
                        pose: Pose::default(),
                    },
                ));
            } else {
                still_pending.push(load);
            }
        }
        self.pending = still_pending;
        self.live += done.len();
        done
    }

    fn release(&mut self, representation: ModelInstance) {
        tracing::debug!(peer = %representation.peer, "model instance released");
        self.live = self.live.saturating_sub(1);
        self.released += 1;
    }
}
