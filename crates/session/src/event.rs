use glam::Vec3;
use peerspace_common::PeerId;
use peerspace_input::{InputEvent, Key};
use peerspace_net::InboundMessage;
use serde::{Deserialize, Serialize};

/// Everything the session reacts to between frames.
///
/// Input and transport callbacks convert their native events into these and
/// push them onto the session queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    LookDelta { dx: f32, dy: f32 },
    KeyChange { key: Key, pressed: bool },
    PointerLockChanged { locked: bool },
    PointerLockError { reason: String },
    PeerState {
        peer: PeerId,
        position: Vec3,
        rotation: Vec3,
    },
    PeerDisconnect { peer: PeerId },
    Resize { width: u32, height: u32 },
}

impl From<InputEvent> for SessionEvent {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::LookDelta { dx, dy } => Self::LookDelta { dx, dy },
            InputEvent::KeyChange { key, pressed } => Self::KeyChange { key, pressed },
            InputEvent::PointerLockChanged { locked } => Self::PointerLockChanged { locked },
            InputEvent::PointerLockError { reason } => Self::PointerLockError { reason },
        }
    }
}

impl From<InboundMessage> for SessionEvent {
    fn from(message: InboundMessage) -> Self {
        match message {
            InboundMessage::Player(m) => Self::PeerState {
                peer: m.socketid,
                position: m.position.into(),
                rotation: m.rotation.into(),
            },
            InboundMessage::Offline(m) => Self::PeerDisconnect { peer: m.socketid },
        }
    }
}
