//! Rendering Adapter: what a rendering engine needs to draw one frame.
//!
//! # Invariants
//! - Renderers never mutate session state; they read a [`FrameView`].
//! - The static scene (skybox, floor, light) is described once and handed to
//!   the engine as data.
//!
//! The rendering engine itself is an external collaborator. The
//! [`DebugTextRenderer`] stands in for it in the CLI, logs and tests.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, FrameView, PeerView, Renderer};
pub use scene::{Floor, SceneAssets, SceneDescription, Skybox};
