//! Forward multi-pass lighting plan.
//!
//! A forward-shaded draw call is rendered once per light in its table. The
//! first pass uses the material's own blending and adds ambient and
//! emissive light; the remaining passes are additive and light-only.
//! Unlit draw calls are not dropped: they get a single ambient pass.

use crate::renderer::draw_call::{DrawCall, LightSlot};
use crate::resources::material::Material;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassBlend {
    /// Whatever the material's alpha mode asks for
    Material,
    /// `src_alpha, one`
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPass {
    /// `None` for the ambient-only pass of an unlit draw call
    pub light: Option<LightSlot>,
    /// Index into the draw call's light table, uploaded as `u_light_id`
    pub light_index: usize,
    pub blend: PassBlend,
    pub apply_ambient: bool,
    pub apply_emissive: bool,
    pub alpha_cutoff: f32,
}

/// Passes needed to shade `draw_call` with `material`.
///
/// A draw call with an empty light table still gets one ambient and
/// emissive pass with the material's blending.
#[must_use]
pub fn light_passes(draw_call: &DrawCall, material: &Material) -> Vec<LightPass> {
    let alpha_cutoff = material.alpha_cutoff();
    let lights = draw_call.lights();

    if lights.is_empty() {
        return vec![LightPass {
            light: None,
            light_index: 0,
            blend: PassBlend::Material,
            apply_ambient: true,
            apply_emissive: true,
            alpha_cutoff,
        }];
    }

    lights
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let first = i == 0;
            LightPass {
                light: Some(*slot),
                light_index: i,
                blend: if first {
                    PassBlend::Material
                } else {
                    PassBlend::Additive
                },
                apply_ambient: first,
                apply_emissive: first,
                alpha_cutoff,
            }
        })
        .collect()
}
