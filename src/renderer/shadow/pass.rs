//! Shadow atlas pass
//!
//! Renders every scheduled [`ShadowDrawCall`] into its atlas tile through a
//! [`ShadowEncoder`], then exposes the result to shading passes as
//! [`ShadowBindings`].
//!
//! Command sequence for one frame:
//!
//! ```text
//! color writes off → bind atlas → clear depth (once)
//!   for each light, in shadow_id order:
//!     viewport = tile[shadow_id] → depth-only draws
//! restore viewport → unbind atlas → color writes on
//! ```

use glam::Mat4;
use log::warn;

use crate::renderer::settings::ShadowSettings;
use crate::renderer::shadow::atlas::{AtlasTile, ShadowAtlasLayout, Viewport};
use crate::renderer::shadow::scheduler::{ShadowInstance, ShadowScheduler};

/// Backend hook for the atlas pass.
///
/// Implemented by GPU backends; [`CommandRecorder`] records the calls.
pub trait ShadowEncoder {
    fn set_color_writes(&mut self, enabled: bool);
    fn bind_atlas(&mut self);
    fn clear_depth(&mut self);
    fn set_viewport(&mut self, viewport: Viewport);
    /// Depth-only, alpha-tested draw of one instance.
    fn draw_depth(&mut self, view_projection: &Mat4, instance: &ShadowInstance);
    /// Back to the full render target.
    fn restore_viewport(&mut self);
    fn unbind_atlas(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShadowCommand {
    SetColorWrites(bool),
    BindAtlas,
    ClearDepth,
    SetViewport(Viewport),
    DrawDepth {
        view_projection: Mat4,
        instance: ShadowInstance,
    },
    RestoreViewport,
    UnbindAtlas,
}

/// [`ShadowEncoder`] that stores the command stream.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    pub commands: Vec<ShadowCommand>,
}

impl CommandRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, ShadowCommand::DrawDepth { .. }))
            .count()
    }

    /// Viewports set during the pass, in order.
    #[must_use]
    pub fn viewports(&self) -> Vec<Viewport> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                ShadowCommand::SetViewport(v) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

impl ShadowEncoder for CommandRecorder {
    fn set_color_writes(&mut self, enabled: bool) {
        self.commands.push(ShadowCommand::SetColorWrites(enabled));
    }

    fn bind_atlas(&mut self) {
        self.commands.push(ShadowCommand::BindAtlas);
    }

    fn clear_depth(&mut self) {
        self.commands.push(ShadowCommand::ClearDepth);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(ShadowCommand::SetViewport(viewport));
    }

    fn draw_depth(&mut self, view_projection: &Mat4, instance: &ShadowInstance) {
        self.commands.push(ShadowCommand::DrawDepth {
            view_projection: *view_projection,
            instance: *instance,
        });
    }

    fn restore_viewport(&mut self) {
        self.commands.push(ShadowCommand::RestoreViewport);
    }

    fn unbind_atlas(&mut self) {
        self.commands.push(ShadowCommand::UnbindAtlas);
    }
}

/// What shading passes bind after the atlas pass (`bind_shadows`).
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowBindings {
    /// Indexed by `shadow_id`
    pub view_projections: Vec<Mat4>,
    /// Indexed by `shadow_id`
    pub tiles: Vec<AtlasTile>,
    pub active_count: u32,
    /// Scheduled lights whose `shadow_id` has no tile in the layout; they
    /// were not rendered.
    pub skipped_casters: u32,
    pub depth_bias: f32,
    pub texture_unit: u32,
    pub atlas_resolution: u32,
}

impl ShadowBindings {
    #[must_use]
    pub fn empty(settings: &ShadowSettings) -> Self {
        Self {
            view_projections: Vec::new(),
            tiles: Vec::new(),
            active_count: 0,
            skipped_casters: 0,
            depth_bias: settings.depth_bias,
            texture_unit: settings.texture_unit,
            atlas_resolution: settings.atlas_resolution,
        }
    }

    #[must_use]
    pub fn view_projection(&self, shadow_id: u32) -> Option<&Mat4> {
        self.view_projections.get(shadow_id as usize)
    }
}

#[derive(Debug, Clone)]
pub struct ShadowPass {
    layout: ShadowAtlasLayout,
    depth_bias: f32,
    texture_unit: u32,
}

impl ShadowPass {
    #[must_use]
    pub fn new(layout: ShadowAtlasLayout, settings: &ShadowSettings) -> Self {
        Self {
            layout,
            depth_bias: settings.depth_bias,
            texture_unit: settings.texture_unit,
        }
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ShadowAtlasLayout {
        &self.layout
    }

    /// Renders all scheduled lights into the atlas and clears the
    /// scheduler's accumulators.
    ///
    /// Lights without a tile in the layout are skipped and counted in
    /// [`ShadowBindings::skipped_casters`].
    pub fn execute<E: ShadowEncoder + ?Sized>(
        &self,
        scheduler: &mut ShadowScheduler,
        encoder: &mut E,
    ) -> ShadowBindings {
        let mut bindings = ShadowBindings {
            view_projections: Vec::with_capacity(scheduler.draw_calls().len()),
            tiles: Vec::with_capacity(scheduler.draw_calls().len()),
            active_count: 0,
            skipped_casters: 0,
            depth_bias: self.depth_bias,
            texture_unit: self.texture_unit,
            atlas_resolution: self.layout.resolution(),
        };

        encoder.set_color_writes(false);
        encoder.bind_atlas();
        encoder.clear_depth();

        for draw_call in scheduler.draw_calls() {
            let Some(tile) = self.layout.tile(draw_call.shadow_id) else {
                bindings.skipped_casters += 1;
                continue;
            };
            encoder.set_viewport(tile.viewport(self.layout.resolution()));
            for instance in &draw_call.instances {
                encoder.draw_depth(&draw_call.view_projection, instance);
            }
            bindings.view_projections.push(draw_call.view_projection);
            bindings.tiles.push(*tile);
            bindings.active_count += 1;
        }

        encoder.restore_viewport();
        encoder.unbind_atlas();
        encoder.set_color_writes(true);

        if bindings.skipped_casters > 0 {
            warn!(
                "{} shadow casters skipped: atlas layout holds {} tiles",
                bindings.skipped_casters,
                self.layout.capacity()
            );
        }

        scheduler.clear();
        bindings
    }
}
