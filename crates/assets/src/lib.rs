//! Asset registry and avatar loading.
//!
//! Assets are identified by content-addressed hashes. Scene code and the
//! remote player mirror refer to assets by handle, never by raw file paths.
//! Decoding the files themselves is the rendering engine's job.

mod loader;
mod store;

pub use loader::{DeferredModelLoader, ModelInstance};
pub use store::{Asset, AssetError, AssetId, AssetStore, ModelAsset, TextureAsset};
