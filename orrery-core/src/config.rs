/// TOML configuration for the demos.
///
/// Every section has defaults, so a partial file (or none at all) works.
/// Values are validated after parsing.
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry::MAX_SPHERE_SEGMENTS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub solar: SolarConfig,
    pub boxes: BoxesConfig,
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub target_fps: u32,
    /// Draw each mesh node's local axes on top of the geometry
    pub show_axes: bool,
    /// Shade each triangle with its face normal instead of interpolating
    pub flat_shading: bool,
    /// Height / width of one terminal cell
    pub cell_aspect: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            show_axes: false,
            flat_shading: false,
            cell_aspect: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { fov_degrees: 75.0 }
    }
}

/// Sun / earth / moon sizes, offsets and spin rates (radians per second)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarConfig {
    pub segments: u32,
    pub sun_radius: f32,
    pub earth_radius: f32,
    pub moon_radius: f32,
    pub earth_offset: f32,
    pub moon_offset: f32,
    pub sun_spin: f32,
    pub earth_spin: f32,
    pub moon_spin: f32,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            segments: 24,
            sun_radius: 2.0,
            earth_radius: 0.6,
            moon_radius: 0.3,
            earth_offset: 6.0,
            moon_offset: 2.0,
            sun_spin: 1.0,
            earth_spin: 4.0,
            moon_spin: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxesConfig {
    pub size: f32,
    pub spacing: f32,
    pub depth: f32,
    pub spin: f32,
}

impl Default for BoxesConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            spacing: 2.0,
            depth: -4.0,
            spin: 1.0,
        }
    }
}

impl OrreryConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("failed to serialize: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        let render = &self.render;
        if render.target_fps == 0 {
            return invalid("render.target_fps must be positive");
        }
        if !(render.cell_aspect > 0.0) {
            return invalid("render.cell_aspect must be positive");
        }

        let fov = self.camera.fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return invalid("camera.fov_degrees must be between 0 and 180");
        }

        let solar = &self.solar;
        if !(3..=MAX_SPHERE_SEGMENTS).contains(&solar.segments) {
            return Err(Error::Config(format!(
                "solar.segments must be between 3 and {MAX_SPHERE_SEGMENTS}"
            )));
        }
        for (name, radius) in [
            ("solar.sun_radius", solar.sun_radius),
            ("solar.earth_radius", solar.earth_radius),
            ("solar.moon_radius", solar.moon_radius),
            ("boxes.size", self.boxes.size),
        ] {
            if !(radius > 0.0) {
                return Err(Error::Config(format!("{name} must be positive")));
            }
        }

        Ok(())
    }
}

fn invalid(message: &str) -> Result<()> {
    Err(Error::Config(message.to_owned()))
}
