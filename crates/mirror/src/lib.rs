//! Remote Player Mirror: keeps one local representation per connected peer.
//!
//! Representations are acquired asynchronously through a
//! [`RepresentationLoader`]; completions are fed back in by the owner of the
//! event queue.
//!
//! # Invariants
//! - At most one registered representation per peer.
//! - A peer is registered from acquisition completion until `offline`.
//! - Every representation handed out by the loader is either registered or
//!   released; none are leaked.

mod loader;
mod mirror;

pub use loader::{AcquisitionId, Representation, RepresentationLoader};
pub use mirror::{AcquisitionPolicy, MirrorConfig, PeerUpdate, ReadyOutcome, RemotePlayerMirror};
