use glam::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Content-addressed asset ID computed from the asset description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// A model file instantiated once per remote peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAsset {
    pub name: String,
    pub path: String,
    /// Uniform scale applied to every instance.
    pub scale: Vec3,
}

impl ModelAsset {
    /// The duck avatar used for every remote player.
    pub fn avatar() -> Self {
        Self {
            name: "duck".into(),
            path: "assets/models/duck.glb".into(),
            scale: Vec3::splat(10.0),
        }
    }
}

/// A texture image, optionally tiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureAsset {
    pub path: String,
    /// Repeat count along U and V.
    pub repeat: [u32; 2],
}

impl TextureAsset {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            repeat: [1, 1],
        }
    }

    pub fn tiled(path: impl Into<String>, u: u32, v: u32) -> Self {
        Self {
            path: path.into(),
            repeat: [u, v],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Asset {
    Model(ModelAsset),
    Texture(TextureAsset),
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0:?}")]
    NotFound(AssetId),
    #[error("asset {0:?} is not a model")]
    NotAModel(AssetId),
}

/// Content-addressed asset registry.
///
/// Registering the same description twice yields the same handle.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_model(&mut self, model: ModelAsset) -> AssetId {
        let id = hash_parts(&[
            b"model".as_slice(),
            model.name.as_bytes(),
            model.path.as_bytes(),
            &vec3_bytes(model.scale),
        ]);
        self.insert(id, Asset::Model(model))
    }

    pub fn register_texture(&mut self, texture: TextureAsset) -> AssetId {
        let mut repeat = [0u8; 8];
        repeat[..4].copy_from_slice(&texture.repeat[0].to_le_bytes());
        repeat[4..].copy_from_slice(&texture.repeat[1].to_le_bytes());
        let id = hash_parts(&[b"texture".as_slice(), texture.path.as_bytes(), &repeat]);
        self.insert(id, Asset::Texture(texture))
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn get_model(&self, id: AssetId) -> Result<&ModelAsset, AssetError> {
        match self.assets.get(&id) {
            Some(Asset::Model(m)) => Ok(m),
            Some(_) => Err(AssetError::NotAModel(id)),
            None => Err(AssetError::NotFound(id)),
        }
    }

    pub fn get_texture(&self, id: AssetId) -> Option<&TextureAsset> {
        match self.assets.get(&id) {
            Some(Asset::Texture(t)) => Some(t),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn insert(&mut self, id: AssetId, asset: Asset) -> AssetId {
        if self.assets.insert(id, asset).is_none() {
            tracing::debug!(?id, "asset registered");
        }
        id
    }
}

fn vec3_bytes(v: Vec3) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[..4].copy_from_slice(&v.x.to_le_bytes());
    out[4..8].copy_from_slice(&v.y.to_le_bytes());
    out[8..].copy_from_slice(&v.z.to_le_bytes());
    out
}

fn hash_parts(parts: &[&[u8]]) -> AssetId {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}
