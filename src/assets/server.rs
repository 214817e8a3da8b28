use slotmap::{SlotMap, new_key_type};

use crate::resources::geometry::Mesh;
use crate::resources::material::Material;
use crate::scene::prefab::Prefab;

// Strongly-typed handles
new_key_type! {
    pub struct MeshHandle;
    pub struct MaterialHandle;
    pub struct TextureHandle;
    pub struct PrefabHandle;
}

/// Texture metadata; pixel data lives in the rendering backend.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Arena storage for everything a scene references by handle.
///
/// Populated by external loaders (OBJ/glTF prefabs, JSON scenes) and read
/// by the culler and the shadow scheduler.
#[derive(Debug, Default)]
pub struct AssetStore {
    meshes: SlotMap<MeshHandle, Mesh>,
    materials: SlotMap<MaterialHandle, Material>,
    textures: SlotMap<TextureHandle, TextureInfo>,
    prefabs: SlotMap<PrefabHandle, Prefab>,
}

impl AssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.insert(mesh)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    pub fn add_texture(&mut self, texture: TextureInfo) -> TextureHandle {
        self.textures.insert(texture)
    }

    pub fn add_prefab(&mut self, prefab: Prefab) -> PrefabHandle {
        self.prefabs.insert(prefab)
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    #[inline]
    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    #[inline]
    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureInfo> {
        self.textures.get(handle)
    }

    #[inline]
    #[must_use]
    pub fn prefab(&self, handle: PrefabHandle) -> Option<&Prefab> {
        self.prefabs.get(handle)
    }

    #[inline]
    pub fn prefab_mut(&mut self, handle: PrefabHandle) -> Option<&mut Prefab> {
        self.prefabs.get_mut(handle)
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}
