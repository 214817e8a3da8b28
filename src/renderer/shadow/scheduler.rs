use glam::{Affine3A, Mat4};
use log::debug;

use crate::assets::{AssetStore, MeshHandle, TextureHandle};
use crate::renderer::culling::{LightInstance, SceneCullingResult};
use crate::scene::light::LightType;
use crate::scene::EntityKey;

/// One mesh instance to render into a light's shadow map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowInstance {
    pub model: Affine3A,
    pub mesh: MeshHandle,
    /// Sampled to discard texels below `alpha_cutoff`
    pub albedo: Option<TextureHandle>,
    pub alpha_cutoff: f32,
}

/// Per-light accumulator of shadow casters for one frame.
#[derive(Debug, Clone)]
pub struct ShadowDrawCall {
    pub shadow_id: u32,
    pub light: EntityKey,
    pub light_type: LightType,
    pub view_projection: Mat4,
    pub instances: Vec<ShadowInstance>,
}

impl ShadowDrawCall {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

/// Builds one [`ShadowDrawCall`] per shadow caster of a culling result.
///
/// The accumulators are indexed by `shadow_id` and live until
/// [`clear`](Self::clear), normally called by the shadow pass once they
/// have been rendered. Light frustums come from the culling result, so
/// their near plane is the one the culler was configured with.
#[derive(Debug, Clone, Default)]
pub struct ShadowScheduler {
    draw_calls: Vec<ShadowDrawCall>,
}

impl ShadowScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gathers, for every shadow caster, the opaque draw calls for which
    /// [`LightInstance::is_in_light_frustum`] holds. Replaces any previous
    /// schedule.
    pub fn schedule(
        &mut self,
        culling: &SceneCullingResult,
        assets: &AssetStore,
    ) -> &[ShadowDrawCall] {
        self.draw_calls.clear();

        let mut casters: Vec<&LightInstance> = Vec::with_capacity(culling.shadow_caster_count());
        for light in culling.shadow_casters() {
            let (Some(shadow_id), Some(view_projection)) =
                (light.shadow_id, light.view_projection())
            else {
                continue;
            };
            debug_assert_eq!(shadow_id as usize, self.draw_calls.len());

            casters.push(light);
            self.draw_calls.push(ShadowDrawCall {
                shadow_id,
                light: light.key,
                light_type: light.light_type(),
                view_projection,
                instances: Vec::new(),
            });
        }

        for draw_call in &culling.opaque {
            let material = assets.material(draw_call.material);
            let instance = ShadowInstance {
                model: draw_call.model,
                mesh: draw_call.mesh,
                albedo: material.and_then(|m| m.color_texture),
                alpha_cutoff: material.map_or(0.0, |m| m.alpha_cutoff()),
            };

            for (shadow, light) in self.draw_calls.iter_mut().zip(&casters) {
                if light.is_in_light_frustum(&draw_call.aabb) {
                    shadow.instances.push(instance);
                }
            }
        }

        debug!(
            "Scheduled {} shadow maps, {} caster instances",
            self.draw_calls.len(),
            self.instance_count()
        );
        &self.draw_calls
    }

    #[inline]
    #[must_use]
    pub fn draw_calls(&self) -> &[ShadowDrawCall] {
        &self.draw_calls
    }

    #[inline]
    #[must_use]
    pub fn draw_call(&self, shadow_id: u32) -> Option<&ShadowDrawCall> {
        self.draw_calls.get(shadow_id as usize)
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.draw_calls.iter().map(|dc| dc.instances.len()).sum()
    }

    /// Drops every accumulator.
    pub fn clear(&mut self) {
        self.draw_calls.clear();
    }
}
