//! Asset storage
//!
//! Meshes, materials, textures and prefabs are owned here and referenced
//! everywhere else through slotmap handles.

pub mod server;

pub use server::{AssetStore, MaterialHandle, MeshHandle, PrefabHandle, TextureHandle, TextureInfo};
