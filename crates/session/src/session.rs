use glam::Vec3;
use peerspace_assets::{AssetError, AssetStore, DeferredModelLoader};
use peerspace_mirror::{AcquisitionId, RemotePlayerMirror, RepresentationLoader};
use peerspace_net::{PlayerState, Transport};
use peerspace_render::{FrameView, PeerView, SceneAssets};
use peerspace_rig::{CameraRig, Projection};
use std::collections::VecDeque;

use crate::config::SessionConfig;
use crate::event::SessionEvent;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Per-frame statistics for instrumentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub events_applied: usize,
    pub representations_ready: usize,
    pub translation: Vec3,
    pub published: bool,
}

enum Queued<R> {
    Event(SessionEvent),
    Ready(AcquisitionId, R),
}

/// One viewer session.
///
/// Owns the rig, the projection, the mirror and the transport for as long
/// as the session lives. Dropping the session releases every remote
/// representation.
pub struct Session<L: RepresentationLoader, T: Transport> {
    rig: CameraRig,
    projection: Projection,
    mirror: RemotePlayerMirror<L>,
    transport: T,
    queue: VecDeque<Queued<L::Output>>,
    frame: u64,
    stats: FrameStats,
}

impl<T: Transport> Session<DeferredModelLoader, T> {
    /// Session with the stock avatar loader, registering the scene's assets
    /// in `store`.
    pub fn with_scene(
        config: &SessionConfig,
        store: &mut AssetStore,
        transport: T,
    ) -> Result<(Self, SceneAssets), SessionError> {
        let assets = config.scene.register_assets(store);
        let loader = DeferredModelLoader::new(store, assets.avatar, config.load_latency)?;
        Ok((Self::new(config, loader, transport), assets))
    }
}

impl<L: RepresentationLoader, T: Transport> Session<L, T> {
    pub fn new(config: &SessionConfig, loader: L, transport: T) -> Self {
        tracing::info!(policy = ?config.mirror.policy, "session started");
        Self {
            rig: CameraRig::new(config.rig),
            projection: config.projection,
            mirror: RemotePlayerMirror::new(config.mirror, loader),
            transport,
            queue: VecDeque::new(),
            frame: 0,
            stats: FrameStats::default(),
        }
    }

    /// Queue an event. It takes effect on the next [`Session::frame`].
    pub fn push(&mut self, event: impl Into<SessionEvent>) {
        self.queue.push_back(Queued::Event(event.into()));
    }

    /// Events waiting for the next frame.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Run one frame: collect transport messages and finished loads, apply
    /// everything queued in order, integrate, publish.
    pub fn frame(&mut self, dt: f32) -> FrameView {
        let _span = tracing::debug_span!("frame", frame = self.frame + 1).entered();

        for message in self.transport.poll_inbound() {
            self.queue.push_back(Queued::Event(message.into()));
        }
        for (acquisition, repr) in self.mirror.poll_loader() {
            self.queue.push_back(Queued::Ready(acquisition, repr));
        }

        let mut events_applied = 0;
        let mut representations_ready = 0;
        while let Some(queued) = self.queue.pop_front() {
            match queued {
                Queued::Event(event) => {
                    self.apply(event);
                    events_applied += 1;
                }
                Queued::Ready(acquisition, repr) => {
                    self.mirror.on_representation_ready(acquisition, repr);
                    representations_ready += 1;
                }
            }
        }

        let translation = self.rig.integrate(dt);

        let state = PlayerState::from(self.rig.pose());
        let published = match self.transport.publish(&state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to publish player state: {e}");
                false
            }
        };

        self.frame += 1;
        self.stats = FrameStats {
            frame: self.frame,
            events_applied,
            representations_ready,
            translation,
            published,
        };
        tracing::trace!(
            events = events_applied,
            ready = representations_ready,
            peers = self.mirror.len(),
            "frame complete"
        );

        self.view()
    }

    /// Snapshot of the current state for a renderer.
    pub fn view(&self) -> FrameView {
        let peers = self
            .mirror
            .peers()
            .map(|(id, pose)| PeerView {
                id: id.clone(),
                pose,
            })
            .collect();
        FrameView::capture(self.frame, &self.rig, &self.projection, peers)
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn mirror(&self) -> &RemotePlayerMirror<L> {
        &self.mirror
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Frames completed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Release every remote representation, including finished loads still
    /// waiting in the queue. Called on drop as well.
    pub fn shutdown(&mut self) {
        self.mirror.shutdown();
        for queued in self.queue.drain(..) {
            if let Queued::Ready(acquisition, repr) = queued {
                self.mirror.on_representation_ready(acquisition, repr);
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LookDelta { dx, dy } => {
                self.rig.on_look_delta(dx, dy);
            }
            SessionEvent::KeyChange { key, pressed } => self.rig.on_key_change(key, pressed),
            SessionEvent::PointerLockChanged { locked } => self.rig.on_pointer_lock_change(locked),
            SessionEvent::PointerLockError { reason } => self.rig.on_pointer_lock_error(reason),
            SessionEvent::PeerState {
                peer,
                position,
                rotation,
            } => {
                self.mirror.on_peer_state(&peer, position, rotation);
            }
            SessionEvent::PeerDisconnect { peer } => {
                self.mirror.on_peer_disconnect(&peer);
            }
            SessionEvent::Resize { width, height } => self.projection.resize(width, height),
        }
    }
}

impl<L: RepresentationLoader, T: Transport> Drop for Session<L, T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerspace_common::{PeerId, Pose};
    use peerspace_input::{InputEvent, Key};
    use peerspace_mirror::{AcquisitionPolicy, MirrorConfig};
    use peerspace_net::{InboundMessage, MemoryTransport, OfflineMessage, PeerStateMessage};
    use std::f32::consts::FRAC_PI_2;

    fn session(config: SessionConfig) -> Session<DeferredModelLoader, MemoryTransport> {
        let mut store = AssetStore::new();
        let (session, _) = Session::with_scene(&config, &mut store, MemoryTransport::new()).unwrap();
        session
    }

    fn player(id: &str, position: Vec3, rotation: Vec3) -> InboundMessage {
        InboundMessage::Player(PeerStateMessage::new(id, Pose::new(position, rotation)))
    }

    fn offline(id: &str) -> InboundMessage {
        InboundMessage::Offline(OfflineMessage {
            socketid: PeerId::new(id),
        })
    }

    #[test]
    fn publishes_exactly_once_per_frame() {
        let mut s = session(SessionConfig::default());
        for _ in 0..5 {
            s.frame(1.0 / 60.0);
        }
        assert_eq!(s.transport().published().len(), 5);
        assert_eq!(s.frame_count(), 5);
        assert!(s.stats().published);
    }

    #[test]
    fn queued_input_applies_before_integration() {
        let mut s = session(SessionConfig::default());
        s.push(InputEvent::key_code(87, true));
        s.push(InputEvent::key_code(68, true));
        assert_eq!(s.pending_events(), 2);

        s.frame(0.5);
        let expected = Vec3::new(1.0, 0.0, -1.0).normalize() * 50.0;
        assert!(s.rig().position().abs_diff_eq(expected, 1e-3));

        let published = s.transport().last_published().unwrap();
        assert!((published.position.x - expected.x).abs() < 1e-3);
        assert!((published.position.z - expected.z).abs() < 1e-3);
        assert_eq!(s.stats().events_applied, 2);
    }

    #[test]
    fn events_apply_in_queue_order() {
        let mut s = session(SessionConfig::default());
        // Press then release within one frame: no movement.
        s.push(SessionEvent::KeyChange {
            key: Key::W,
            pressed: true,
        });
        s.push(SessionEvent::KeyChange {
            key: Key::W,
            pressed: false,
        });
        s.frame(1.0);
        assert_eq!(s.rig().position(), Vec3::ZERO);

        // Lock, then look: applied. Look, then lock: the look is dropped.
        s.push(SessionEvent::LookDelta { dx: 100.0, dy: 0.0 });
        s.push(SessionEvent::PointerLockChanged { locked: true });
        s.frame(0.0);
        assert_eq!(s.rig().yaw(), 0.0);
        s.push(SessionEvent::LookDelta { dx: 100.0, dy: 0.0 });
        s.frame(0.0);
        assert!((s.rig().yaw() - -0.2).abs() < 1e-6);
    }

    #[test]
    fn capture_error_leaves_look_disabled() {
        let mut s = session(SessionConfig::default());
        s.push(SessionEvent::PointerLockError {
            reason: "not allowed".into(),
        });
        s.push(SessionEvent::LookDelta { dx: 50.0, dy: 50.0 });
        s.frame(0.016);
        assert!(!s.rig().is_locked());
        assert_eq!(s.rig().pitch(), 0.0);
    }

    #[test]
    fn peer_join_move_leave_through_transport() {
        let mut s = session(SessionConfig::default());
        let abc = PeerId::new("abc");

        s.transport_mut()
            .deliver(player("abc", Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.1, 0.0)));
        let view = s.frame(0.016);
        assert!(view.peers.is_empty());
        assert!(s.mirror().is_pending(&abc));

        // Load completes on the next frame.
        let view = s.frame(0.016);
        assert_eq!(view.peers.len(), 1);
        assert_eq!(view.peers[0].pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((view.peers[0].pose.rotation.y - (0.1 + FRAC_PI_2)).abs() < 1e-6);

        s.transport_mut()
            .deliver(player("abc", Vec3::new(4.0, 5.0, 6.0), Vec3::new(0.0, 0.1, 0.0)));
        let view = s.frame(0.016);
        assert_eq!(view.peers[0].pose.position, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(s.mirror().loader().pending(), 0);

        s.transport_mut().deliver(offline("abc"));
        s.transport_mut().deliver(offline("abc"));
        let view = s.frame(0.016);
        assert!(view.peers.is_empty());
        assert!(!s.mirror().contains(&abc));
        assert_eq!(s.mirror().loader().released(), 1);
        assert_eq!(s.mirror().loader().live(), 0);
    }

    #[test]
    fn burst_for_new_peer_loads_once_by_default() {
        let mut config = SessionConfig::default();
        config.load_latency = 3;
        let mut s = session(config);

        for i in 0..3 {
            s.transport_mut()
                .deliver(player("p", Vec3::splat(i as f32), Vec3::ZERO));
            s.frame(0.016);
        }
        let view = s.frame(0.016);
        assert_eq!(view.peers.len(), 1);
        assert_eq!(view.peers[0].pose.position, Vec3::splat(2.0));
        assert_eq!(s.mirror().loader().released(), 0);
    }

    #[test]
    fn burst_for_new_peer_reproduces_duplicates_when_asked() {
        let mut config = SessionConfig::default();
        config.load_latency = 3;
        config.mirror = MirrorConfig {
            policy: AcquisitionPolicy::PerMessage,
            ..MirrorConfig::default()
        };
        let mut s = session(config);

        for i in 0..3 {
            s.transport_mut()
                .deliver(player("p", Vec3::splat(i as f32), Vec3::ZERO));
            s.frame(0.016);
        }
        for _ in 0..3 {
            s.frame(0.016);
        }
        assert_eq!(s.mirror().len(), 1);
        assert_eq!(s.mirror().loader().released(), 2);
        assert_eq!(s.mirror().loader().live(), 1);
    }

    #[test]
    fn offline_while_loading_releases_late_completion() {
        let mut config = SessionConfig::default();
        config.load_latency = 2;
        let mut s = session(config);

        s.transport_mut().deliver(player("gone", Vec3::ONE, Vec3::ZERO));
        s.frame(0.016);
        s.transport_mut().deliver(offline("gone"));
        s.frame(0.016);
        s.frame(0.016);

        assert!(s.mirror().is_empty());
        assert_eq!(s.mirror().in_flight(), 0);
        assert_eq!(s.mirror().loader().released(), 1);
        assert_eq!(s.mirror().loader().live(), 0);
    }

    #[test]
    fn resize_changes_aspect_only() {
        let mut s = session(SessionConfig::default());
        s.push(SessionEvent::PointerLockChanged { locked: true });
        s.push(SessionEvent::LookDelta { dx: 10.0, dy: 10.0 });
        s.push(SessionEvent::KeyChange {
            key: Key::A,
            pressed: true,
        });
        s.frame(0.1);
        let before = (s.rig().position(), s.rig().yaw(), s.rig().pitch());

        s.push(SessionEvent::Resize {
            width: 1000,
            height: 500,
        });
        s.frame(0.0);
        assert_eq!(s.projection().aspect, 2.0);
        assert_eq!((s.rig().position(), s.rig().yaw(), s.rig().pitch()), before);
    }

    #[test]
    fn drop_releases_representations() {
        let mut s = session(SessionConfig::default());
        s.transport_mut().deliver(player("a", Vec3::ZERO, Vec3::ZERO));
        s.frame(0.0);
        s.frame(0.0);
        assert_eq!(s.mirror().loader().live(), 1);
        s.shutdown();
        assert_eq!(s.mirror().loader().live(), 0);
        assert!(s.mirror().is_empty());
    }
}
