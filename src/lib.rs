//! Scene visibility & shadow-atlas scheduling core.
//!
//! Frustum culling classifies scene geometry into opaque and translucent
//! draw calls, associates each draw call with the lights that reach it,
//! and a shadow scheduler packs every shadow-casting light into one shared
//! depth atlas. The shading passes that consume this output live outside
//! this crate.
//!
//! ```text
//! Scene + AssetStore + Camera
//!        │
//!        ▼
//! FrustumCuller ──► SceneCullingResult ──► ShadowScheduler ──► ShadowPass
//!                      (draw calls,          (per-light           (atlas tiles,
//!                       light tables)         caster lists)        VP matrices)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod assets;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use assets::{AssetStore, MaterialHandle, MeshHandle, PrefabHandle, TextureHandle};
pub use errors::{Result, UmbraError};
pub use renderer::culling::{FrustumCuller, LightInstance, SceneCullingResult};
pub use renderer::deferred::{LightVolume, VolumeShape, light_volumes};
pub use renderer::draw_call::{DrawCall, LightSlot, MAX_LIGHT_NUM};
pub use renderer::frame::{FrameOutput, FrameRenderer};
pub use renderer::probes::IrradianceProbeGrid;
pub use renderer::settings::RendererSettings;
pub use renderer::shadow::{ShadowAtlasLayout, ShadowDrawCall, ShadowScheduler};
pub use resources::{AlphaMode, BoundingBox, Material, Mesh, PbrStructure};
pub use scene::{Camera, LightEntity, LightType, Node, Prefab, Scene, Transform};
