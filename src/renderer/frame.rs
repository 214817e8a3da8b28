//! Frame orchestration
//!
//! [`FrameRenderer`] owns the per-frame scratch state and runs, in order:
//! culling, shadow scheduling and the shadow atlas pass. The culling result
//! is kept for the shading passes until [`FrameRenderer::end_frame`].

use log::debug;

use crate::assets::AssetStore;
use crate::errors::Result;
use crate::renderer::culling::{FrustumCuller, SceneCullingResult};
use crate::renderer::settings::RendererSettings;
use crate::renderer::shadow::atlas::ShadowAtlasLayout;
use crate::renderer::shadow::pass::{ShadowBindings, ShadowEncoder, ShadowPass};
use crate::renderer::shadow::scheduler::ShadowScheduler;
use crate::scene::camera::Camera;
use crate::scene::scene::Scene;

/// Counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub opaque_draw_calls: usize,
    pub translucent_draw_calls: usize,
    pub shadow_maps: u32,
    pub shadow_instances: usize,
    pub dropped_light_associations: u32,
    pub rejected_shadow_casters: u32,
}

/// Result of [`FrameRenderer::render_frame`], borrowed from the renderer.
#[derive(Debug)]
pub struct FrameOutput<'a> {
    pub culling: &'a SceneCullingResult,
    pub shadows: &'a ShadowBindings,
    pub stats: FrameStats,
}

pub struct FrameRenderer {
    settings: RendererSettings,
    culler: FrustumCuller,
    scheduler: ShadowScheduler,
    shadow_pass: ShadowPass,
    culling: SceneCullingResult,
    shadows: ShadowBindings,
}

impl FrameRenderer {
    /// Validates `settings` and builds the atlas layout from them.
    pub fn new(settings: RendererSettings) -> Result<Self> {
        settings.validate()?;
        let layout = ShadowAtlasLayout::from_settings(&settings.shadows)?;
        Ok(Self::with_layout(settings, layout))
    }

    /// Uses a custom tile table; shadow ids are allocated against its capacity.
    #[must_use]
    pub fn with_layout(settings: RendererSettings, layout: ShadowAtlasLayout) -> Self {
        let culler = FrustumCuller::new(&settings, &layout);
        Self {
            culler,
            scheduler: ShadowScheduler::new(),
            shadow_pass: ShadowPass::new(layout, &settings.shadows),
            culling: SceneCullingResult::new(),
            shadows: ShadowBindings::empty(&settings.shadows),
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ShadowAtlasLayout {
        self.shadow_pass.layout()
    }

    #[inline]
    #[must_use]
    pub fn culling(&self) -> &SceneCullingResult {
        &self.culling
    }

    #[inline]
    #[must_use]
    pub fn shadows(&self) -> &ShadowBindings {
        &self.shadows
    }

    /// Culls the scene, schedules shadow casters and renders the atlas.
    pub fn render_frame<E: ShadowEncoder + ?Sized>(
        &mut self,
        scene: &Scene,
        assets: &AssetStore,
        camera: &Camera,
        encoder: &mut E,
    ) -> Result<FrameOutput<'_>> {
        self.culler.cull(scene, assets, camera, &mut self.culling)?;

        self.scheduler.schedule(&self.culling, assets);
        let shadow_instances = self.scheduler.instance_count();
        self.shadows = self.shadow_pass.execute(&mut self.scheduler, encoder);

        let stats = FrameStats {
            opaque_draw_calls: self.culling.opaque.len(),
            translucent_draw_calls: self.culling.translucent.len(),
            shadow_maps: self.shadows.active_count,
            shadow_instances,
            dropped_light_associations: self.culling.stats.dropped_light_associations,
            rejected_shadow_casters: self.culling.stats.rejected_shadow_casters,
        };
        debug!("Frame: {stats:?}");

        Ok(FrameOutput {
            culling: &self.culling,
            shadows: &self.shadows,
            stats,
        })
    }

    /// Drops all per-frame state once the shading passes are done.
    pub fn end_frame(&mut self) {
        self.culling.clear();
        self.scheduler.clear();
        self.shadows = ShadowBindings::empty(&self.settings.shadows);
    }
}
