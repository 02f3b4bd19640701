//! Engine configuration loaded from JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::mesh::MeshEffects;
use crate::voxel::brush::Painter;
use crate::voxel::palette::Palette;

/// Mesh generation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub effects: MeshEffects,
    /// Export simplification factor, 0..=1
    pub simplify: f32,
    /// Mesh tiles on the rayon pool
    pub parallel: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            effects: MeshEffects::NONE,
            simplify: 0.0,
            parallel: true,
        }
    }
}

/// Top-level engine configuration. Every field is optional in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// env_logger filter, e.g. `"info"` or `"voxcore=debug"`
    pub log_filter: String,
    pub mesh: MeshConfig,
    /// Default brush preset
    pub painter: Painter,
    pub palette: Option<Palette>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            mesh: MeshConfig::default(),
            painter: Painter::default(),
            palette: None,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let simplify = self.mesh.simplify;
        if !(0.0..=1.0).contains(&simplify) {
            return Err(Error::InvalidConfig(format!(
                "mesh.simplify must be within 0..=1, got {simplify}"
            )));
        }
        let smoothness = self.painter.smoothness;
        if !smoothness.is_finite() || smoothness < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "painter.smoothness must be finite and non-negative, got {smoothness}"
            )));
        }
        if let Some(noise) = &self.painter.noise {
            if noise.coverage > 100 {
                return Err(Error::InvalidConfig(format!(
                    "painter.noise.coverage is a percentage, got {}",
                    noise.coverage
                )));
            }
        }
        Ok(())
    }
}
