//! Scene model
//!
//! - [`Scene`]: flat, ordered list of prefab and light entities
//! - [`Prefab`]: node arena with parent-relative [`Transform`]s
//! - [`Camera`]: view/projection and the 6-plane [`Frustum`]
//! - [`LightEntity`]: authored light parameters and light-space tests

pub mod camera;
pub mod light;
pub mod node;
pub mod prefab;
pub mod scene;
pub mod transform;

pub use camera::{Camera, Frustum, ProjectionType, RenderCamera};
pub use light::{LightEntity, LightType};
pub use node::Node;
pub use prefab::{Prefab, PrefabWalk, WalkedNode};
pub use scene::{EntityKind, PrefabEntity, Scene, SceneEntity};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct EntityKey;
    pub struct NodeHandle;
}
