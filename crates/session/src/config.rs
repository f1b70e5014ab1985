use peerspace_mirror::MirrorConfig;
use peerspace_render::SceneDescription;
use peerspace_rig::{Projection, RigConfig};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Every tunable of a viewer session. Missing fields take their defaults, so
/// an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rig: RigConfig,
    pub projection: Projection,
    pub mirror: MirrorConfig,
    pub scene: SceneDescription,
    /// Frames an avatar load takes to complete.
    pub load_latency: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rig: RigConfig::default(),
            projection: Projection::default(),
            mirror: MirrorConfig::default(),
            scene: SceneDescription::default(),
            load_latency: 1,
        }
    }
}

impl SessionConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = self.rig.pitch_limit;
        if !(limit > 0.0 && limit <= FRAC_PI_2) {
            return Err(ConfigError::Invalid(format!(
                "rig.pitch_limit must be in (0, pi/2], got {limit}"
            )));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
