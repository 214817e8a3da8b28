use glam::{Affine3A, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::renderer::shadow::utils;
use crate::resources::geometry::BoundingBox;
use crate::scene::camera::Frustum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LightType {
    #[default]
    Point,
    Directional,
    Spot,
}

impl LightType {
    /// Value uploaded as `u_light_type`.
    #[inline]
    #[must_use]
    pub fn shader_tag(self) -> u32 {
        match self {
            Self::Point => 0,
            Self::Directional => 1,
            Self::Spot => 2,
        }
    }

    /// Directional and spot lights render into the shadow atlas; point
    /// lights never do.
    #[inline]
    #[must_use]
    pub fn supports_shadows(self) -> bool {
        matches!(self, Self::Directional | Self::Spot)
    }
}

/// Light parameters as authored in the scene.
///
/// The light's world transform is the owning entity's model matrix; its
/// local +Z axis is the direction it shines. Per-frame ids live in
/// [`LightInstance`](crate::LightInstance), never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightEntity {
    pub light_type: LightType,
    pub color: Vec3,
    pub intensity: f32,
    /// Range, also the far plane of the light's shadow frustum
    pub max_distance: f32,

    /// Spot only: full cone angle in degrees
    pub cone_angle: f32,
    /// Spot only
    pub cone_exp_decay: f32,

    /// Directional only: side of the orthographic shadow volume
    pub area_size: f32,

    pub cast_shadows: bool,
}

impl Default for LightEntity {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            color: Vec3::ONE,
            intensity: 1.0,
            max_distance: 10.0,
            cone_angle: 0.0,
            cone_exp_decay: 1.0,
            area_size: 1.0,
            cast_shadows: true,
        }
    }
}

impl LightEntity {
    #[must_use]
    pub fn point(color: Vec3, intensity: f32, max_distance: f32) -> Self {
        Self {
            light_type: LightType::Point,
            color,
            intensity,
            max_distance,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn spot(
        color: Vec3,
        intensity: f32,
        max_distance: f32,
        cone_angle: f32,
        cone_exp_decay: f32,
    ) -> Self {
        Self {
            light_type: LightType::Spot,
            color,
            intensity,
            max_distance,
            cone_angle,
            cone_exp_decay,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn directional(color: Vec3, intensity: f32, max_distance: f32, area_size: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            color,
            intensity,
            max_distance,
            area_size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cast_shadows(mut self, cast_shadows: bool) -> Self {
        self.cast_shadows = cast_shadows;
        self
    }

    /// Whether this light takes a tile in the shadow atlas.
    #[inline]
    #[must_use]
    pub fn casts_shadows(&self) -> bool {
        self.cast_shadows && self.light_type.supports_shadows()
    }

    /// World transform placing a light at `position` shining along `direction`.
    #[must_use]
    pub fn transform_facing(position: Vec3, direction: Vec3) -> Affine3A {
        let dir = direction.try_normalize().unwrap_or(Vec3::Z);
        Affine3A::from_rotation_translation(Quat::from_rotation_arc(Vec3::Z, dir), position)
    }

    #[inline]
    #[must_use]
    pub fn position(world: &Affine3A) -> Vec3 {
        Vec3::from(world.translation)
    }

    /// Direction the light shines in world space.
    #[inline]
    #[must_use]
    pub fn forward(world: &Affine3A) -> Vec3 {
        world
            .transform_vector3(Vec3::Z)
            .try_normalize()
            .unwrap_or(Vec3::Z)
    }

    /// Closest point of `aabb` is nearer than `max_distance`.
    ///
    /// Used for every light type, directional included.
    #[must_use]
    pub fn is_in_range(&self, world: &Affine3A, aabb: &BoundingBox) -> bool {
        aabb.distance_to_point(Self::position(world)) < self.max_distance
    }

    /// Light-space view-projection, `None` for point lights.
    #[must_use]
    pub fn view_projection(&self, world: &Affine3A, near: f32) -> Option<Mat4> {
        let position = Self::position(world);
        let forward = Self::forward(world);
        match self.light_type {
            LightType::Spot => Some(utils::build_spot_vp(
                position,
                forward,
                self.cone_angle,
                near,
                self.max_distance,
            )),
            LightType::Directional => Some(utils::build_directional_vp(
                position,
                forward,
                self.area_size,
                near,
                self.max_distance,
            )),
            LightType::Point => None,
        }
    }

    #[must_use]
    pub fn frustum(&self, world: &Affine3A, near: f32) -> Option<Frustum> {
        self.view_projection(world, near).map(Frustum::from_matrix)
    }

    /// `aabb` touches the light's shadow frustum with near plane `near`.
    /// Always `false` for point lights.
    #[must_use]
    pub fn is_in_light_frustum(&self, world: &Affine3A, near: f32, aabb: &BoundingBox) -> bool {
        self.frustum(world, near)
            .is_some_and(|frustum| frustum.intersects_aabb(aabb))
    }
}
