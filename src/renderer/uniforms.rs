//! GPU uniform blocks
//!
//! `Pod` layouts of the per-frame light and shadow data, ready for
//! `bytemuck::bytes_of`. All blocks are multiples of 16 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::renderer::culling::SceneCullingResult;
use crate::renderer::draw_call::{DrawCall, LightSlot, MAX_LIGHT_NUM};
use crate::renderer::shadow::pass::ShadowBindings;

/// Size of the shadow view-projection array shading passes declare.
pub const MAX_SHADOW_CASTERS: usize = 16;

/// Shader-side marker for "no shadow map".
pub const NO_SHADOW: i32 = -1;

// ============================================================================
// Light table
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct GpuLightSlot {
    pub position: Vec3,
    pub light_type: u32,
    pub color: Vec3,
    pub intensity: f32,
    /// Unit vector from the lit surface towards the light (`u_light_direction`),
    /// the opposite of [`LightSlot::direction`].
    pub direction: Vec3,
    pub max_distance: f32,
    pub cone_angle: f32,
    pub cone_decay: f32,
    pub area_size: f32,
    pub shadow_id: i32,
}

impl From<&LightSlot> for GpuLightSlot {
    fn from(slot: &LightSlot) -> Self {
        Self {
            position: slot.position,
            light_type: slot.light_type.shader_tag(),
            color: slot.color,
            intensity: slot.intensity,
            direction: -slot.direction,
            max_distance: slot.max_distance,
            cone_angle: slot.cone_angle,
            cone_decay: slot.cone_exp_decay,
            area_size: slot.area_size,
            shadow_id: slot.shadow_id.map_or(NO_SHADOW, |id| id as i32),
        }
    }
}

/// Up to [`MAX_LIGHT_NUM`] lights plus their count (`u_num_lights`).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightTableUniforms {
    pub lights: [GpuLightSlot; MAX_LIGHT_NUM],
    count: u32,
    _pad: [u32; 3],
}

impl Default for LightTableUniforms {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl LightTableUniforms {
    fn from_slots<'a>(slots: impl IntoIterator<Item = &'a LightSlot>) -> Self {
        let mut uniforms = Self::default();
        for (dst, slot) in uniforms.lights.iter_mut().zip(slots) {
            *dst = GpuLightSlot::from(slot);
            uniforms.count += 1;
        }
        uniforms
    }

    /// Light table of one draw call, for forward and geometry passes.
    #[must_use]
    pub fn from_draw_call(draw_call: &DrawCall) -> Self {
        Self::from_slots(draw_call.lights())
    }

    /// Number of filled entries, uploaded as `u_num_lights`.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn active(&self) -> &[GpuLightSlot] {
        &self.lights[..(self.count as usize).min(MAX_LIGHT_NUM)]
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// All visible lights of a frame, for full-screen passes (deferred
/// lighting, volumetric light) that are not tied to one draw call.
#[derive(Debug, Clone, Copy)]
pub struct SceneLightBlock {
    pub uniforms: LightTableUniforms,
    pub ambient: Vec3,
    /// Visible lights beyond [`MAX_LIGHT_NUM`]
    pub dropped: u32,
}

impl SceneLightBlock {
    /// Directional lights first, then the rest, in entity order.
    #[must_use]
    pub fn gather(culling: &SceneCullingResult, ambient: Vec3) -> Self {
        let slots: Vec<LightSlot> = culling
            .directional_lights()
            .chain(culling.non_directional_lights())
            .map(LightSlot::from_instance)
            .collect();
        let uniforms = LightTableUniforms::from_slots(&slots);
        Self {
            uniforms,
            ambient,
            dropped: (slots.len() - uniforms.count() as usize) as u32,
        }
    }
}

// ============================================================================
// Shadows
// ============================================================================

/// The `bind_shadows` block: `u_shadow_vp`, atlas tiles, `u_shadow_count`
/// and `u_shadow_bias`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub view_projections: [Mat4; MAX_SHADOW_CASTERS],
    /// `(offset.x, offset.y, size, 0)` per tile
    pub tiles: [Vec4; MAX_SHADOW_CASTERS],
    pub count: u32,
    pub bias: f32,
    _pad: [u32; 2],
}

impl Default for ShadowUniforms {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl ShadowUniforms {
    #[must_use]
    pub fn from_bindings(bindings: &ShadowBindings) -> Self {
        let mut uniforms = Self {
            bias: bindings.depth_bias,
            ..Self::default()
        };
        for (dst, vp) in uniforms
            .view_projections
            .iter_mut()
            .zip(&bindings.view_projections)
        {
            *dst = *vp;
        }
        for (dst, tile) in uniforms.tiles.iter_mut().zip(&bindings.tiles) {
            *dst = tile.to_vec4();
        }
        uniforms.count = bindings.active_count.min(MAX_SHADOW_CASTERS as u32);
        uniforms
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
