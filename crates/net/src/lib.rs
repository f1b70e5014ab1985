//! Peer state synchronization: wire messages and the transport seam.
//!
//! The real-time transport itself (connection lifecycle, delivery) lives
//! outside this workspace. Anything that can publish the local pose and hand
//! back inbound messages in delivery order implements [`Transport`].
//!
//! # Invariants
//! - Inbound messages are surfaced in delivery order, never reordered.
//! - Decoding tolerates the `_x/_y/_z` rotation spelling of web clients.

mod transport;
mod wire;

pub use transport::{JsonLinesTransport, MemoryTransport, Transport};
pub use wire::{
    Envelope, InboundMessage, NetError, OfflineMessage, PeerStateMessage, PlayerState, WireEuler,
    WireVec3, decode_envelope, decode_inbound,
};
