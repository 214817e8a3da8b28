//! Frustum Culling
//!
//! Walks the scene once per camera and produces a [`SceneCullingResult`]:
//!
//! 1. Lights are collected in entity order and numbered (`light_id`), then
//!    shadow casters get a dense `shadow_id` (directional first, then spot).
//! 2. Every visible prefab hierarchy is walked; renderable nodes whose world
//!    bounds touch the camera frustum become [`DrawCall`]s, split into the
//!    opaque and translucent lists by alpha mode.
//! 3. Non-directional, then directional lights are associated with every
//!    draw call they reach.
//! 4. Opaque draw calls are sorted near-to-far, translucent far-to-near.
//!
//! All ids live in the result's [`LightInstance`] table; scene lights are
//! never written to.

use glam::{Affine3A, Mat4, Vec3};
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::assets::AssetStore;
use crate::errors::{Result, UmbraError};
use crate::renderer::draw_call::DrawCall;
use crate::renderer::settings::{CullingSettings, LightIdPolicy, RendererSettings};
use crate::renderer::shadow::atlas::ShadowAtlasLayout;
use crate::renderer::uniforms::MAX_SHADOW_CASTERS;
use crate::resources::geometry::BoundingBox;
use crate::scene::camera::{Camera, Frustum, RenderCamera};
use crate::scene::light::{LightEntity, LightType};
use crate::scene::scene::{EntityKind, Scene};
use crate::scene::EntityKey;

// ============================================================================
// Per-frame light table
// ============================================================================

/// A visible light for one frame, with the ids culling assigned to it.
///
/// The light-space view-projection and frustum are built once, with the
/// shadow near plane the culler was configured with, and shared by every
/// light-frustum test of the frame.
#[derive(Debug, Clone)]
pub struct LightInstance {
    pub key: EntityKey,
    pub light_id: u32,
    /// Atlas tile index; `None` for point lights, lights with shadows
    /// disabled and casters beyond the atlas capacity.
    pub shadow_id: Option<u32>,

    light: LightEntity,
    world: Affine3A,
    shadow_near: f32,
    view_projection: Option<Mat4>,
    frustum: Option<Frustum>,
}

impl LightInstance {
    /// Snapshots `light` at `world`. `shadow_near` is the near plane of the
    /// light's shadow frustum.
    #[must_use]
    pub fn new(
        key: EntityKey,
        light: LightEntity,
        world: Affine3A,
        light_id: u32,
        shadow_near: f32,
    ) -> Self {
        let view_projection = light.view_projection(&world, shadow_near);
        Self {
            key,
            light_id,
            shadow_id: None,
            light,
            world,
            shadow_near,
            view_projection,
            frustum: view_projection.map(Frustum::from_matrix),
        }
    }

    /// Snapshot of the scene's light parameters.
    #[inline]
    #[must_use]
    pub fn light(&self) -> &LightEntity {
        &self.light
    }

    #[inline]
    #[must_use]
    pub fn world(&self) -> &Affine3A {
        &self.world
    }

    #[inline]
    #[must_use]
    pub fn light_type(&self) -> LightType {
        self.light.light_type
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        LightEntity::position(&self.world)
    }

    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        LightEntity::forward(&self.world)
    }

    #[inline]
    #[must_use]
    pub fn shadow_near(&self) -> f32 {
        self.shadow_near
    }

    #[inline]
    #[must_use]
    pub fn is_in_range(&self, aabb: &BoundingBox) -> bool {
        self.light.is_in_range(&self.world, aabb)
    }

    /// `aabb` touches the light's shadow frustum. Always `false` for point
    /// lights.
    #[inline]
    #[must_use]
    pub fn is_in_light_frustum(&self, aabb: &BoundingBox) -> bool {
        self.frustum
            .as_ref()
            .is_some_and(|frustum| frustum.intersects_aabb(aabb))
    }

    /// Light-space view-projection, `None` for point lights.
    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> Option<Mat4> {
        self.view_projection
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }
}

// ============================================================================
// Culling result
// ============================================================================

/// Counters for one culling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullingStats {
    pub visited_nodes: u32,
    pub frustum_culled: u32,
    /// Nodes whose mesh or material handle did not resolve
    pub missing_assets: u32,
    pub light_associations: u32,
    /// Associations refused by full light tables
    pub dropped_light_associations: u32,
    /// Shadow casters that did not fit in the atlas
    pub rejected_shadow_casters: u32,
}

/// Everything the shading and shadow passes need from one culling pass.
///
/// Reused across frames: [`FrustumCuller::cull`] clears it first, and
/// [`clear`](Self::clear) drops all per-frame state once consumed.
#[derive(Debug, Clone, Default)]
pub struct SceneCullingResult {
    /// Camera the draw calls were culled and sorted against
    pub camera: RenderCamera,
    pub opaque: Vec<DrawCall>,
    pub translucent: Vec<DrawCall>,
    /// Visible prefab entities, in entity order
    pub prefabs: Vec<EntityKey>,
    pub stats: CullingStats,

    lights: Vec<LightInstance>,
    directional: Vec<usize>,
    non_directional: Vec<usize>,
    shadow_casters: Vec<usize>,
    light_index: FxHashMap<EntityKey, usize>,
}

impl SceneCullingResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.opaque.clear();
        self.translucent.clear();
        self.prefabs.clear();
        self.lights.clear();
        self.directional.clear();
        self.non_directional.clear();
        self.shadow_casters.clear();
        self.light_index.clear();
        self.stats = CullingStats::default();
    }

    /// All visible lights in entity order.
    #[inline]
    #[must_use]
    pub fn lights(&self) -> &[LightInstance] {
        &self.lights
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = &LightInstance> {
        self.directional.iter().map(|&i| &self.lights[i])
    }

    pub fn non_directional_lights(&self) -> impl Iterator<Item = &LightInstance> {
        self.non_directional.iter().map(|&i| &self.lights[i])
    }

    /// Lights holding an atlas tile, in `shadow_id` order.
    pub fn shadow_casters(&self) -> impl Iterator<Item = &LightInstance> {
        self.shadow_casters.iter().map(|&i| &self.lights[i])
    }

    #[inline]
    #[must_use]
    pub fn shadow_caster_count(&self) -> usize {
        self.shadow_casters.len()
    }

    #[must_use]
    pub fn light(&self, key: EntityKey) -> Option<&LightInstance> {
        self.light_index.get(&key).map(|&i| &self.lights[i])
    }

    #[inline]
    #[must_use]
    pub fn draw_call_count(&self) -> usize {
        self.opaque.len() + self.translucent.len()
    }

    /// Opaque then translucent draw calls.
    pub fn draw_calls(&self) -> impl Iterator<Item = &DrawCall> {
        self.opaque.iter().chain(self.translucent.iter())
    }

    fn push_light(&mut self, instance: LightInstance) {
        let index = self.lights.len();
        if instance.light_type() == LightType::Directional {
            self.directional.push(index);
        } else {
            self.non_directional.push(index);
        }
        self.light_index.insert(instance.key, index);
        self.lights.push(instance);
    }
}

// ============================================================================
// Culler
// ============================================================================

/// Cube map faces as `(forward, up)`, in +X, -X, +Y, -Y, +Z, -Z order.
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

#[derive(Debug, Clone)]
pub struct FrustumCuller {
    settings: CullingSettings,
    shadow_capacity: usize,
    shadow_near: f32,
}

impl Default for FrustumCuller {
    fn default() -> Self {
        Self::new(&RendererSettings::default(), &ShadowAtlasLayout::default())
    }
}

impl FrustumCuller {
    /// Shadow ids are allocated against the tiles of `layout`, so every id
    /// handed to a draw call has a tile to render into.
    #[must_use]
    pub fn new(settings: &RendererSettings, layout: &ShadowAtlasLayout) -> Self {
        Self {
            settings: settings.culling.clone(),
            shadow_capacity: layout.capacity().min(MAX_SHADOW_CASTERS),
            shadow_near: settings.shadows.near_plane,
        }
    }

    /// Overrides the number of shadow ids handed out per frame, capped at
    /// [`MAX_SHADOW_CASTERS`].
    #[must_use]
    pub fn with_shadow_capacity(mut self, capacity: usize) -> Self {
        self.shadow_capacity = capacity.min(MAX_SHADOW_CASTERS);
        self
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &CullingSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn shadow_capacity(&self) -> usize {
        self.shadow_capacity
    }

    /// Near plane of every light frustum built by this culler.
    #[inline]
    #[must_use]
    pub fn shadow_near(&self) -> f32 {
        self.shadow_near
    }

    /// Culls `scene` against `camera` into `result`, replacing its contents.
    ///
    /// Fails only on an entity tagged as a prefab whose prefab is missing.
    pub fn cull(
        &self,
        scene: &Scene,
        assets: &AssetStore,
        camera: &Camera,
        result: &mut SceneCullingResult,
    ) -> Result<()> {
        result.clear();
        result.camera = camera.extract_render_camera();

        self.collect_entities(scene, result)?;
        self.assign_shadow_ids(result);
        Self::collect_draw_calls(scene, assets, camera.frustum(), camera.eye(), result)?;
        self.associate_lights(result);

        // Stable sorts keep entity order between equal keys.
        result
            .opaque
            .sort_by(|a, b| a.camera_distance.total_cmp(&b.camera_distance));
        result
            .translucent
            .sort_by(|a, b| b.camera_distance.total_cmp(&a.camera_distance));

        let stats = &result.stats;
        debug!(
            "Culled {} nodes: {} opaque, {} translucent, {} lights ({} shadow casters)",
            stats.visited_nodes,
            result.opaque.len(),
            result.translucent.len(),
            result.lights.len(),
            result.shadow_casters.len()
        );
        if stats.dropped_light_associations > 0 {
            warn!(
                "{} light associations dropped: draw call light tables are full",
                stats.dropped_light_associations
            );
        }
        if stats.rejected_shadow_casters > 0 {
            warn!(
                "{} shadow casters rejected: atlas holds {} tiles",
                stats.rejected_shadow_casters, self.shadow_capacity
            );
        }
        Ok(())
    }

    /// Culls the scene once per cube map face from `position`, with a 90°
    /// square camera, in [`CUBE_FACES`] order.
    pub fn cull_cubemap_faces(
        &self,
        scene: &Scene,
        assets: &AssetStore,
        position: Vec3,
        near: f32,
        far: f32,
    ) -> Result<Vec<SceneCullingResult>> {
        let mut camera = Camera::new_perspective(90.0, 1.0, near, far);
        CUBE_FACES
            .iter()
            .map(|&(forward, up)| {
                camera.look_at(position, position + forward, up);
                let mut result = SceneCullingResult::new();
                self.cull(scene, assets, &camera, &mut result)?;
                Ok(result)
            })
            .collect()
    }

    fn collect_entities(&self, scene: &Scene, result: &mut SceneCullingResult) -> Result<()> {
        let mut shared_id = 0u32;
        let mut directional_id = 0u32;
        let mut other_id = 0u32;

        for (key, entity) in scene.iter() {
            if !entity.visible {
                continue;
            }
            match &entity.kind {
                EntityKind::Prefab(prefab) => {
                    if prefab.prefab.is_none() {
                        return Err(UmbraError::MissingPrefab {
                            entity: key,
                            name: entity.name.clone(),
                        });
                    }
                    result.prefabs.push(key);
                }
                EntityKind::Light(light) => {
                    let counter = match self.settings.light_id_policy {
                        LightIdPolicy::Shared => &mut shared_id,
                        LightIdPolicy::PerKind if light.light_type == LightType::Directional => {
                            &mut directional_id
                        }
                        LightIdPolicy::PerKind => &mut other_id,
                    };
                    let light_id = *counter;
                    *counter += 1;

                    result.push_light(LightInstance::new(
                        key,
                        light.clone(),
                        entity.model,
                        light_id,
                        self.shadow_near,
                    ));
                }
            }
        }
        Ok(())
    }

    fn assign_shadow_ids(&self, result: &mut SceneCullingResult) {
        let candidates: Vec<usize> = result
            .directional
            .iter()
            .chain(result.non_directional.iter())
            .copied()
            .filter(|&i| result.lights[i].light().casts_shadows())
            .collect();

        for index in candidates {
            let next = result.shadow_casters.len();
            if next < self.shadow_capacity {
                result.lights[index].shadow_id = Some(next as u32);
                result.shadow_casters.push(index);
            } else {
                result.stats.rejected_shadow_casters += 1;
            }
        }
    }

    fn collect_draw_calls(
        scene: &Scene,
        assets: &AssetStore,
        frustum: &Frustum,
        eye: Vec3,
        result: &mut SceneCullingResult,
    ) -> Result<()> {
        for &key in &result.prefabs {
            let Some(entity) = scene.entity(key) else {
                continue;
            };
            let Some(prefab_entity) = entity.as_prefab() else {
                continue;
            };
            let prefab = prefab_entity
                .prefab
                .and_then(|handle| assets.prefab(handle))
                .ok_or(UmbraError::PrefabNotFound(key))?;

            for walked in prefab.walk(entity.model) {
                result.stats.visited_nodes += 1;

                let Some((mesh_handle, material_handle)) = walked.node.renderable() else {
                    continue;
                };
                let (Some(mesh), Some(material)) =
                    (assets.mesh(mesh_handle), assets.material(material_handle))
                else {
                    warn!(
                        "Node {:?} of {:?} references a missing mesh or material, skipped",
                        walked.node.name, entity.name
                    );
                    result.stats.missing_assets += 1;
                    continue;
                };

                let aabb = mesh.bounding_box.transform(&walked.world);
                if !frustum.intersects_aabb(&aabb) {
                    result.stats.frustum_culled += 1;
                    continue;
                }

                let draw_call = DrawCall::new(
                    key,
                    walked.handle,
                    walked.world,
                    mesh_handle,
                    material_handle,
                    prefab_entity.pbr,
                    aabb,
                    aabb.sort_distance(eye),
                );
                if material.alpha_mode.is_blended() {
                    result.translucent.push(draw_call);
                } else {
                    result.opaque.push(draw_call);
                }
            }
        }
        Ok(())
    }

    fn associate_lights(&self, result: &mut SceneCullingResult) {
        let SceneCullingResult {
            opaque,
            translucent,
            lights,
            directional,
            non_directional,
            stats,
            ..
        } = result;

        let mut associate = |light: &LightInstance, range_test: bool| {
            for draw_call in opaque.iter_mut().chain(translucent.iter_mut()) {
                if range_test && !light.is_in_range(&draw_call.aabb) {
                    continue;
                }
                if draw_call.add_light(light) {
                    stats.light_associations += 1;
                } else {
                    stats.dropped_light_associations += 1;
                }
            }
        };

        for &i in non_directional.iter() {
            associate(&lights[i], true);
        }
        for &i in directional.iter() {
            associate(&lights[i], self.settings.directional_range_test);
        }
    }
}
