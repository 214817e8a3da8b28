//! Draw calls and their fixed-capacity light tables.

use glam::{Affine3A, Vec3};
use smallvec::SmallVec;

use crate::assets::{MaterialHandle, MeshHandle};
use crate::renderer::culling::LightInstance;
use crate::resources::geometry::BoundingBox;
use crate::resources::material::PbrStructure;
use crate::scene::light::LightType;
use crate::scene::{EntityKey, NodeHandle};

/// Maximum number of lights a single draw call is shaded with.
pub const MAX_LIGHT_NUM: usize = 10;

/// One light's per-frame parameters as seen by a shading pass.
///
/// Type-specific fields keep their default value unless the light is of
/// that type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSlot {
    pub light_id: u32,
    pub light_type: LightType,
    pub position: Vec3,
    pub color: Vec3,
    pub max_distance: f32,
    pub intensity: f32,
    /// Direction the light shines in world space, the entity's +Z axis.
    /// GPU blocks upload the opposite vector, see
    /// [`GpuLightSlot::direction`](crate::renderer::uniforms::GpuLightSlot::direction).
    pub direction: Vec3,
    /// Spot: full cone angle, radians
    pub cone_angle: f32,
    pub cone_exp_decay: f32,
    /// Directional: side of the shadow volume
    pub area_size: f32,
    pub shadow_id: Option<u32>,
}

impl Default for LightSlot {
    fn default() -> Self {
        Self {
            light_id: 0,
            light_type: LightType::Point,
            position: Vec3::ZERO,
            color: Vec3::ZERO,
            max_distance: 0.0,
            intensity: 0.0,
            direction: Vec3::Z,
            cone_angle: 0.0,
            cone_exp_decay: 0.0,
            area_size: 0.0,
            shadow_id: None,
        }
    }
}

impl LightSlot {
    #[must_use]
    pub fn from_instance(instance: &LightInstance) -> Self {
        let light = instance.light();
        let mut slot = Self {
            light_id: instance.light_id,
            light_type: light.light_type,
            position: instance.position(),
            color: light.color,
            max_distance: light.max_distance,
            intensity: light.intensity,
            direction: instance.forward(),
            shadow_id: instance.shadow_id,
            ..Self::default()
        };

        match light.light_type {
            LightType::Spot => {
                slot.cone_angle = light.cone_angle.to_radians();
                slot.cone_exp_decay = light.cone_exp_decay;
            }
            LightType::Directional => {
                slot.area_size = light.area_size;
            }
            LightType::Point => {}
        }
        slot
    }
}

/// One visible mesh instance, built fresh by the culler every frame.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub entity: EntityKey,
    pub node: NodeHandle,
    pub model: Affine3A,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub pbr: PbrStructure,
    /// World-space bounds
    pub aabb: BoundingBox,
    /// Sort key, see [`BoundingBox::sort_distance`]
    pub camera_distance: f32,

    lights: SmallVec<[LightSlot; MAX_LIGHT_NUM]>,
    dropped_lights: u32,
}

impl DrawCall {
    #[must_use]
    pub fn new(
        entity: EntityKey,
        node: NodeHandle,
        model: Affine3A,
        mesh: MeshHandle,
        material: MaterialHandle,
        pbr: PbrStructure,
        aabb: BoundingBox,
        camera_distance: f32,
    ) -> Self {
        Self {
            entity,
            node,
            model,
            mesh,
            material,
            pbr,
            aabb,
            camera_distance,
            lights: SmallVec::new(),
            dropped_lights: 0,
        }
    }

    /// Appends `light` to the light table.
    ///
    /// Once [`MAX_LIGHT_NUM`] entries are stored further lights are refused,
    /// counted in [`dropped_lights`](Self::dropped_lights) and `false` is
    /// returned. Existing entries are never overwritten.
    pub fn add_light(&mut self, light: &LightInstance) -> bool {
        if self.lights.len() >= MAX_LIGHT_NUM {
            self.dropped_lights += 1;
            return false;
        }
        self.lights.push(LightSlot::from_instance(light));
        true
    }

    #[inline]
    #[must_use]
    pub fn lights(&self) -> &[LightSlot] {
        &self.lights
    }

    #[inline]
    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Lights that reached this draw call but did not fit in the table.
    #[inline]
    #[must_use]
    pub fn dropped_lights(&self) -> u32 {
        self.dropped_lights
    }

    #[must_use]
    pub fn has_light(&self, light_id: u32) -> bool {
        self.lights.iter().any(|slot| slot.light_id == light_id)
    }
}
