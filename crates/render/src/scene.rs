use peerspace_assets::{AssetId, AssetStore, ModelAsset, TextureAsset};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Textured cube around the world, seen from the inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skybox {
    /// Edge length of the cube.
    pub size: f32,
    /// Face textures in +X, -X, +Y, -Y, +Z, -Z order.
    pub faces: [String; 6],
}

impl Default for Skybox {
    fn default() -> Self {
        let face = |name: &str| format!("assets/textures/skybox/{name}.jpg");
        Self {
            size: 500.0,
            faces: [
                face("px"),
                face("nx"),
                face("py"),
                face("ny"),
                face("pz"),
                face("nz"),
            ],
        }
    }
}

/// Tiled ground plane, double sided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Floor {
    pub width: f32,
    pub depth: f32,
    pub segments: [u32; 2],
    pub texture: String,
    pub repeat: [u32; 2],
    pub height: f32,
    /// Rotation about X that lays the plane flat.
    pub rotation_x: f32,
}

impl Default for Floor {
    fn default() -> Self {
        Self {
            width: 500.0,
            depth: 500.0,
            segments: [5, 5],
            texture: "assets/textures/floor/FloorsCheckerboard_S_Diffuse.jpg".into(),
            repeat: [4, 4],
            height: 0.0,
            rotation_x: FRAC_PI_2,
        }
    }
}

/// Everything static about the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub skybox: Skybox,
    pub floor: Floor,
    /// Ambient light colour as 0xRRGGBB.
    pub ambient_light: u32,
    /// Model instantiated for every remote peer.
    pub avatar: ModelAsset,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            skybox: Skybox::default(),
            floor: Floor::default(),
            ambient_light: 0xaaaaaa,
            avatar: ModelAsset::avatar(),
        }
    }
}

/// Handles of the scene's assets after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneAssets {
    pub skybox: [AssetId; 6],
    pub floor: AssetId,
    pub avatar: AssetId,
}

impl SceneDescription {
    /// Register every texture and model the scene uses.
    pub fn register_assets(&self, store: &mut AssetStore) -> SceneAssets {
        let skybox = self
            .skybox
            .faces
            .clone()
            .map(|path| store.register_texture(TextureAsset::new(path)));
        let floor = store.register_texture(TextureAsset::tiled(
            self.floor.texture.clone(),
            self.floor.repeat[0],
            self.floor.repeat[1],
        ));
        let avatar = store.register_model(self.avatar.clone());
        tracing::debug!(assets = store.len(), "scene assets registered");
        SceneAssets {
            skybox,
            floor,
            avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_matches_viewer() {
        let scene = SceneDescription::default();
        assert_eq!(scene.skybox.size, 500.0);
        assert!(scene.skybox.faces[0].ends_with("px.jpg"));
        assert!(scene.skybox.faces[5].ends_with("nz.jpg"));
        assert_eq!(scene.floor.repeat, [4, 4]);
        assert_eq!(scene.floor.rotation_x, FRAC_PI_2);
        assert_eq!(scene.ambient_light, 0xaaaaaa);
    }

    #[test]
    fn registers_all_assets() {
        let scene = SceneDescription::default();
        let mut store = AssetStore::new();
        let assets = scene.register_assets(&mut store);
        // six faces + floor + avatar
        assert_eq!(store.len(), 8);
        assert_eq!(store.get_texture(assets.floor).unwrap().repeat, [4, 4]);
        assert!(store.get_model(assets.avatar).is_ok());
    }
}
