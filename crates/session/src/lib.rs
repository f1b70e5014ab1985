//! Session: the single-threaded actor that owns the camera rig and the
//! remote player mirror.
//!
//! Hosts push typed [`SessionEvent`]s as they arrive and call
//! [`Session::frame`] once per rendered frame.
//!
//! # Invariants
//! - Events are applied strictly in the order they were queued.
//! - Every event queued before a frame is applied before that frame integrates.
//! - The local pose is published exactly once per frame, after integration.
//! - No state crosses threads; nothing here locks.

mod config;
mod event;
mod session;

pub use config::{ConfigError, SessionConfig};
pub use event::SessionEvent;
pub use session::{FrameStats, Session, SessionError};
