//! Renderer core
//!
//! Per-frame visibility and shadow scheduling:
//!
//! - [`culling`]: camera frustum culling, light ids and light association
//! - [`draw_call`]: draw calls and their bounded light tables
//! - [`shadow`]: atlas layout, per-light caster lists and the atlas pass
//! - [`uniforms`]: `Pod` blocks for light tables and shadow bindings
//! - [`forward`]: per-light pass plan for forward shading
//! - [`deferred`]: light volume proxies for deferred shading
//! - [`probes`]: irradiance probe grid placement and per-probe culling
//! - [`frame`]: ties the stages together for one frame
//! - [`settings`]: serialisable configuration

pub mod culling;
pub mod deferred;
pub mod draw_call;
pub mod forward;
pub mod frame;
pub mod probes;
pub mod settings;
pub mod shadow;
pub mod uniforms;

pub use culling::{CullingStats, FrustumCuller, LightInstance, SceneCullingResult};
pub use draw_call::{DrawCall, LightSlot, MAX_LIGHT_NUM};
pub use frame::{FrameOutput, FrameRenderer, FrameStats};
pub use settings::{CullingSettings, LightIdPolicy, RendererSettings, ShadowSettings};
