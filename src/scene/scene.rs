use glam::{Affine3A, Vec3};
use slotmap::SlotMap;

use crate::assets::PrefabHandle;
use crate::resources::material::PbrStructure;
use crate::scene::EntityKey;
use crate::scene::light::LightEntity;

/// Prefab reference carried by a geometry entity.
///
/// `prefab == None` on an entity tagged as a prefab is a configuration
/// error reported by the culler.
#[derive(Debug, Clone, Default)]
pub struct PrefabEntity {
    pub prefab: Option<PrefabHandle>,
    pub pbr: PbrStructure,
}

#[derive(Debug, Clone)]
pub enum EntityKind {
    Prefab(PrefabEntity),
    Light(LightEntity),
}

/// Top-level scene entry.
///
/// `model` is the entity's world matrix: the base of a prefab hierarchy, or
/// a light's position and orientation.
#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub name: String,
    pub visible: bool,
    pub model: Affine3A,
    pub kind: EntityKind,
}

impl SceneEntity {
    #[must_use]
    pub fn new(name: impl Into<String>, model: Affine3A, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            visible: true,
            model,
            kind,
        }
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[inline]
    #[must_use]
    pub fn as_light(&self) -> Option<&LightEntity> {
        match &self.kind {
            EntityKind::Light(light) => Some(light),
            EntityKind::Prefab(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_prefab(&self) -> Option<&PrefabEntity> {
        match &self.kind {
            EntityKind::Prefab(prefab) => Some(prefab),
            EntityKind::Light(_) => None,
        }
    }
}

/// Flat entity list in authoring order.
///
/// Entities live in a slot map so keys stay valid across removals, while
/// `order` preserves the insertion sequence light ids are assigned in.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: SlotMap<EntityKey, SceneEntity>,
    order: Vec<EntityKey>,
    pub ambient_light: Vec3,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: SceneEntity) -> EntityKey {
        let key = self.entities.insert(entity);
        self.order.push(key);
        key
    }

    pub fn add_prefab_entity(
        &mut self,
        name: impl Into<String>,
        prefab: PrefabHandle,
        model: Affine3A,
    ) -> EntityKey {
        self.add_entity(SceneEntity::new(
            name,
            model,
            EntityKind::Prefab(PrefabEntity {
                prefab: Some(prefab),
                pbr: PbrStructure::default(),
            }),
        ))
    }

    /// `world` positions the light; its local +Z is the light direction.
    pub fn add_light(
        &mut self,
        name: impl Into<String>,
        light: LightEntity,
        world: Affine3A,
    ) -> EntityKey {
        self.add_entity(SceneEntity::new(name, world, EntityKind::Light(light)))
    }

    pub fn remove_entity(&mut self, key: EntityKey) -> Option<SceneEntity> {
        let entity = self.entities.remove(key)?;
        self.order.retain(|&k| k != key);
        Some(entity)
    }

    #[inline]
    #[must_use]
    pub fn entity(&self, key: EntityKey) -> Option<&SceneEntity> {
        self.entities.get(key)
    }

    #[inline]
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut SceneEntity> {
        self.entities.get_mut(key)
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &SceneEntity)> {
        self.order
            .iter()
            .filter_map(|&key| self.entities.get(key).map(|entity| (key, entity)))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
