//! Resource definitions consumed by the visibility core.
//!
//! - [`BoundingBox`]: center/halfsize bounds and their world-space transform
//! - [`Mesh`]: local bounding volume of a renderable
//! - [`Material`]: alpha mode, cutoff and albedo texture

pub mod geometry;
pub mod material;

pub use geometry::{BoundingBox, Mesh};
pub use material::{AlphaMode, Material, PbrStructure};
