use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::assets::TextureHandle;

/// How a material's alpha channel is interpreted.
///
/// Only [`AlphaMode::Blend`] routes a draw call to the translucent list,
/// which is sorted back-to-front. Masked materials stay opaque.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    /// Alpha-tested with the given cutoff.
    Mask(f32),
    Blend,
}

impl AlphaMode {
    /// Cutoff used by alpha-tested depth and color passes, `0.0` when not masked.
    #[inline]
    #[must_use]
    pub fn cutoff(self) -> f32 {
        match self {
            Self::Mask(cutoff) => cutoff,
            Self::Opaque | Self::Blend => 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_blended(self) -> bool {
        matches!(self, Self::Blend)
    }
}

/// Physically-based shading variant selected per prefab.
///
/// Uploaded to shading passes as `u_material_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PbrStructure {
    /// Separate metallic and roughness channels.
    #[default]
    MetallicRoughness,
    /// Occlusion / roughness / metallic packed in one texture.
    OcclusionRoughnessMetallic,
}

impl PbrStructure {
    #[inline]
    #[must_use]
    pub fn shader_tag(self) -> u32 {
        match self {
            Self::MetallicRoughness => 0,
            Self::OcclusionRoughnessMetallic => 1,
        }
    }
}

/// The material state the culling and shadow passes need.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub color: Vec4,
    pub alpha_mode: AlphaMode,
    pub two_sided: bool,
    /// Albedo texture, sampled by the shadow pass to honor the alpha cutoff.
    pub color_texture: Option<TextureHandle>,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Vec4::ONE,
            alpha_mode: AlphaMode::Opaque,
            two_sided: false,
            color_texture: None,
        }
    }

    #[must_use]
    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    #[must_use]
    pub fn with_color_texture(mut self, texture: TextureHandle) -> Self {
        self.color_texture = Some(texture);
        self
    }

    #[must_use]
    pub fn with_two_sided(mut self, two_sided: bool) -> Self {
        self.two_sided = two_sided;
        self
    }

    #[inline]
    #[must_use]
    pub fn alpha_cutoff(&self) -> f32 {
        self.alpha_mode.cutoff()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("Default")
    }
}
