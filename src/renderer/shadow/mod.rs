//! Shadow atlas scheduling
//!
//! - [`atlas`]: validated tile table, `shadow_id` → tile
//! - [`scheduler`]: per-light caster lists ([`ShadowDrawCall`])
//! - [`pass`]: atlas render sequence and the bindings handed to shading
//! - [`utils`]: light-space view-projection math

pub mod atlas;
pub mod pass;
pub mod scheduler;
pub mod utils;

pub use atlas::{AtlasTile, ShadowAtlasLayout, Viewport};
pub use pass::{CommandRecorder, ShadowBindings, ShadowCommand, ShadowEncoder, ShadowPass};
pub use scheduler::{ShadowDrawCall, ShadowInstance, ShadowScheduler};
