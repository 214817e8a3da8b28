//! Renderer Settings
//!
//! Configuration for the visibility core, grouped the way the frame is
//! processed: [`CullingSettings`] for the culler and [`ShadowSettings`] for
//! the shadow atlas.
//!
//! Every struct is `serde`-(de)serialisable with defaults for missing
//! fields, so a partial JSON document is a valid configuration:
//!
//! ```rust,ignore
//! use umbra::RendererSettings;
//!
//! let settings = RendererSettings::from_json_str(r#"{ "shadows": { "atlas_grid": 4 } }"#)?;
//! assert_eq!(settings.shadows.capacity(), 16);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Result, UmbraError};
use crate::renderer::shadow::utils::DEFAULT_SHADOW_NEAR;
use crate::renderer::uniforms::MAX_SHADOW_CASTERS;

// ---------------------------------------------------------------------------
// Culling
// ---------------------------------------------------------------------------

/// How `light_id`s are numbered during culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightIdPolicy {
    /// One counter across all lights, in entity order.
    #[default]
    Shared,
    /// Directional and non-directional lights count from zero independently.
    PerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingSettings {
    pub light_id_policy: LightIdPolicy,
    /// Range-test directional lights against `max_distance` like every other
    /// light. When `false`, directional lights reach every draw call.
    pub directional_range_test: bool,
}

impl Default for CullingSettings {
    fn default() -> Self {
        Self {
            light_id_policy: LightIdPolicy::Shared,
            directional_range_test: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Shadows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Side of the square depth atlas, in texels.
    pub atlas_resolution: u32,
    /// Tiles per atlas side; the atlas holds `atlas_grid²` shadow maps.
    pub atlas_grid: u32,
    pub depth_bias: f32,
    pub near_plane: f32,
    /// Texture unit the atlas is bound to for shading passes.
    pub texture_unit: u32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            atlas_resolution: 4096,
            atlas_grid: 3,
            depth_bias: 0.005,
            near_plane: DEFAULT_SHADOW_NEAR,
            texture_unit: 8,
        }
    }
}

impl ShadowSettings {
    /// Number of shadow casters the atlas can hold.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        (self.atlas_grid as usize).pow(2)
    }
}

// ---------------------------------------------------------------------------
// RendererSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub culling: CullingSettings,
    pub shadows: ShadowSettings,
}

impl RendererSettings {
    /// Parses and validates settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let shadows = &self.shadows;
        if shadows.atlas_grid == 0 {
            return Err(UmbraError::InvalidSettings(
                "shadows.atlas_grid must be at least 1".into(),
            ));
        }
        if shadows.capacity() > MAX_SHADOW_CASTERS {
            return Err(UmbraError::InvalidSettings(format!(
                "shadows.atlas_grid {} yields {} tiles, more than the {MAX_SHADOW_CASTERS} supported",
                shadows.atlas_grid,
                shadows.capacity()
            )));
        }
        if shadows.atlas_resolution < shadows.atlas_grid {
            return Err(UmbraError::InvalidSettings(format!(
                "shadows.atlas_resolution {} is smaller than the grid",
                shadows.atlas_resolution
            )));
        }
        if !(shadows.near_plane.is_finite() && shadows.near_plane > 0.0) {
            return Err(UmbraError::InvalidSettings(
                "shadows.near_plane must be positive".into(),
            ));
        }
        if !shadows.depth_bias.is_finite() {
            return Err(UmbraError::InvalidSettings(
                "shadows.depth_bias must be finite".into(),
            ));
        }
        Ok(())
    }
}
