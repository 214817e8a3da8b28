//! Deferred light volumes
//!
//! The deferred lighting pass shades point and spot lights by rasterising
//! a proxy mesh around each light's influence, with additive blending and
//! back faces only. This module builds the per-light proxy transforms from
//! a culling result. Directional lights are shaded by a full-screen quad
//! instead and get no volume.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::renderer::culling::{LightInstance, SceneCullingResult};
use crate::renderer::draw_call::LightSlot;
use crate::renderer::uniforms::GpuLightSlot;
use crate::scene::EntityKey;
use crate::scene::light::LightType;

/// Spot cones wider than this are clamped so the volume stays finite.
pub const MAX_VOLUME_CONE_ANGLE: f32 = 89.0;

/// Proxy mesh a [`LightVolume`] is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeShape {
    /// Unit sphere centered on the origin.
    Sphere,
    /// Unit cone, apex at the origin, opening along +Y to a base of
    /// radius 1 at `y = 1`.
    Cone,
}

/// One non-directional light and the transform of its proxy mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightVolume {
    pub key: EntityKey,
    pub shape: VolumeShape,
    /// Uploaded as `u_model`
    pub model: Mat4,
    pub light: LightSlot,
}

impl LightVolume {
    /// `None` for directional lights.
    ///
    /// Points get a sphere of radius `max_distance`. Spots get a cone of
    /// height `max_distance` along the light direction, with base radius
    /// `max_distance * tan(cone_angle)`.
    #[must_use]
    pub fn from_instance(instance: &LightInstance) -> Option<Self> {
        let light = instance.light();
        let range = light.max_distance;
        let (shape, scale, rotation) = match light.light_type {
            LightType::Point => (VolumeShape::Sphere, Vec3::splat(range), Quat::IDENTITY),
            LightType::Spot => {
                let angle = light.cone_angle.clamp(0.0, MAX_VOLUME_CONE_ANGLE);
                let radius = range * angle.to_radians().tan();
                (
                    VolumeShape::Cone,
                    Vec3::new(radius, range, radius),
                    Quat::from_rotation_arc(Vec3::Y, instance.forward()),
                )
            }
            LightType::Directional => return None,
        };

        Some(Self {
            key: instance.key,
            shape,
            model: Mat4::from_scale_rotation_translation(scale, rotation, instance.position()),
            light: LightSlot::from_instance(instance),
        })
    }

    #[must_use]
    pub fn uniforms(&self) -> LightVolumeUniforms {
        LightVolumeUniforms {
            model: self.model,
            light: GpuLightSlot::from(&self.light),
        }
    }
}

/// Per-volume block of the deferred lighting pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightVolumeUniforms {
    pub model: Mat4,
    pub light: GpuLightSlot,
}

/// Volumes for every non-directional light of `culling`, in entity order.
#[must_use]
pub fn light_volumes(culling: &SceneCullingResult) -> Vec<LightVolume> {
    culling
        .non_directional_lights()
        .filter_map(LightVolume::from_instance)
        .collect()
}
