//! Frustum Culling Tests
//!
//! Tests for:
//! - Opaque / translucent classification and sort order
//! - Light association against the influence test, with table truncation
//! - Light and shadow id allocation
//! - Visibility early-outs and configuration errors
//! - Cube map face culling

use glam::{Affine3A, Vec3};

use umbra::renderer::culling::CUBE_FACES;
use umbra::renderer::settings::{LightIdPolicy, RendererSettings};
use umbra::scene::scene::{EntityKind, PrefabEntity, SceneEntity};
use umbra::scene::EntityKey;
use umbra::{
    AlphaMode, AssetStore, BoundingBox, Camera, FrustumCuller, LightEntity, MAX_LIGHT_NUM,
    Material, MaterialHandle, Mesh, MeshHandle, Node, Prefab, Scene, SceneCullingResult,
    ShadowAtlasLayout, Transform, UmbraError,
};

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    assets: AssetStore,
    scene: Scene,
    cube: MeshHandle,
    opaque: MaterialHandle,
    masked: MaterialHandle,
    blend: MaterialHandle,
}

fn fixture() -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut assets = AssetStore::new();
    let cube = assets.add_mesh(Mesh::new("cube", BoundingBox::unit_cube(Vec3::ZERO)));
    let opaque = assets.add_material(Material::new("opaque"));
    let masked = assets.add_material(Material::new("masked").with_alpha_mode(AlphaMode::Mask(0.5)));
    let blend = assets.add_material(Material::new("glass").with_alpha_mode(AlphaMode::Blend));
    Fixture {
        assets,
        scene: Scene::new(),
        cube,
        opaque,
        masked,
        blend,
    }
}

impl Fixture {
    fn add_cube(&mut self, name: &str, position: Vec3, material: MaterialHandle) -> EntityKey {
        let root = Node::with_mesh(name, self.cube, material, Transform::IDENTITY);
        let prefab = self.assets.add_prefab(Prefab::with_root(name, root));
        self.scene
            .add_prefab_entity(name, prefab, Affine3A::from_translation(position))
    }

    fn cull_with(&self, culler: &FrustumCuller) -> SceneCullingResult {
        let mut result = SceneCullingResult::new();
        culler
            .cull(&self.scene, &self.assets, &camera(), &mut result)
            .unwrap();
        result
    }

    fn cull(&self) -> SceneCullingResult {
        self.cull_with(&FrustumCuller::default())
    }
}

/// At the origin looking down -Z.
fn camera() -> Camera {
    let mut camera = Camera::new_perspective(60.0, 1.0, 0.1, 1000.0);
    camera.look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
    camera
}

fn point_light(position: Vec3, range: f32) -> (LightEntity, Affine3A) {
    (
        LightEntity::point(Vec3::ONE, 1.0, range),
        Affine3A::from_translation(position),
    )
}

fn spot_light(position: Vec3, direction: Vec3) -> (LightEntity, Affine3A) {
    (
        LightEntity::spot(Vec3::ONE, 1.0, 100.0, 45.0, 1.0),
        LightEntity::transform_facing(position, direction),
    )
}

fn directional_light(position: Vec3, direction: Vec3, range: f32) -> (LightEntity, Affine3A) {
    (
        LightEntity::directional(Vec3::ONE, 1.0, range, 50.0),
        LightEntity::transform_facing(position, direction),
    )
}

// ============================================================================
// Classification & Ordering
// ============================================================================

#[test]
fn opaque_sorted_near_to_far_translucent_far_to_near() {
    let mut fx = fixture();
    for z in [30.0, 10.0, 20.0] {
        let material = fx.opaque;
        fx.add_cube("o", Vec3::new(0.0, 0.0, -z), material);
    }
    for z in [5.0, 25.0, 15.0] {
        let material = fx.blend;
        fx.add_cube("t", Vec3::new(0.0, 0.0, -z), material);
    }

    let result = fx.cull();
    assert_eq!(result.opaque.len(), 3);
    assert_eq!(result.translucent.len(), 3);

    for pair in result.opaque.windows(2) {
        assert!(pair[0].camera_distance <= pair[1].camera_distance);
    }
    for pair in result.translucent.windows(2) {
        assert!(pair[0].camera_distance >= pair[1].camera_distance);
    }
    assert!(result.opaque[0].aabb.center.z > -11.0);
    assert!(result.translucent[0].aabb.center.z < -24.0);
}

#[test]
fn masked_materials_stay_opaque() {
    let mut fx = fixture();
    let masked = fx.masked;
    fx.add_cube("leaves", Vec3::new(0.0, 0.0, -5.0), masked);

    let result = fx.cull();
    assert_eq!(result.opaque.len(), 1);
    assert!(result.translucent.is_empty());
}

#[test]
fn sort_key_is_min_of_center_and_corner_distances() {
    let mut fx = fixture();
    let opaque = fx.opaque;
    fx.add_cube("c", Vec3::new(0.0, 0.0, -10.0), opaque);

    let result = fx.cull();
    let dc = &result.opaque[0];
    let eye = Vec3::ZERO;
    let expected = [
        dc.aabb.center,
        dc.aabb.center + dc.aabb.halfsize,
        dc.aabb.center - dc.aabb.halfsize,
    ]
    .iter()
    .map(|p| p.distance(eye))
    .fold(f32::INFINITY, f32::min);
    assert!((dc.camera_distance - expected).abs() < 1e-5);
}

#[test]
fn objects_outside_the_frustum_are_culled() {
    let mut fx = fixture();
    let opaque = fx.opaque;
    fx.add_cube("front", Vec3::new(0.0, 0.0, -10.0), opaque);
    fx.add_cube("behind", Vec3::new(0.0, 0.0, 10.0), opaque);
    fx.add_cube("far_left", Vec3::new(-100.0, 0.0, -10.0), opaque);

    let result = fx.cull();
    assert_eq!(result.draw_call_count(), 1);
    assert_eq!(result.stats.frustum_culled, 2);
    assert_eq!(result.stats.visited_nodes, 3);
}

#[test]
fn world_bounds_follow_the_hierarchy() {
    let mut fx = fixture();
    let mut prefab = Prefab::new("group");
    let root = prefab.root();
    prefab
        .add_child(
            root,
            Node::with_mesh(
                "child",
                fx.cube,
                fx.opaque,
                Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            ),
        )
        .unwrap();
    let handle = fx.assets.add_prefab(prefab);
    fx.scene
        .add_prefab_entity("group", handle, Affine3A::from_translation(Vec3::new(0.0, 0.0, -10.0)));

    let result = fx.cull();
    assert_eq!(result.opaque.len(), 1);
    assert_eq!(result.opaque[0].aabb.center, Vec3::new(2.0, 0.0, -10.0));
}

#[test]
fn culling_is_idempotent() {
    let mut fx = fixture();
    for i in 0..8 {
        let material = if i % 3 == 0 { fx.blend } else { fx.opaque };
        fx.add_cube("c", Vec3::new(i as f32 - 4.0, 0.0, -5.0 - i as f32 * 2.0), material);
    }
    let (light, world) = point_light(Vec3::new(0.0, 0.0, -8.0), 10.0);
    fx.scene.add_light("p", light, world);

    let culler = FrustumCuller::default();
    let mut result = SceneCullingResult::new();
    culler.cull(&fx.scene, &fx.assets, &camera(), &mut result).unwrap();
    let first: Vec<_> = result
        .draw_calls()
        .map(|dc| (dc.entity, dc.node, dc.camera_distance, dc.light_count()))
        .collect();

    culler.cull(&fx.scene, &fx.assets, &camera(), &mut result).unwrap();
    let second: Vec<_> = result
        .draw_calls()
        .map(|dc| (dc.entity, dc.node, dc.camera_distance, dc.light_count()))
        .collect();

    assert_eq!(first, second);
    assert_eq!(result.lights().len(), 1);
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn invisible_prefab_root_hides_all_descendants() {
    let mut fx = fixture();
    let mut prefab = Prefab::with_root("tree", Node::new("root").with_visible(false));
    let root = prefab.root();
    let branch = prefab
        .add_child(root, Node::with_mesh("a", fx.cube, fx.opaque, Transform::IDENTITY))
        .unwrap();
    prefab
        .add_child(branch, Node::with_mesh("b", fx.cube, fx.blend, Transform::IDENTITY))
        .unwrap();
    let handle = fx.assets.add_prefab(prefab);
    fx.scene
        .add_prefab_entity("tree", handle, Affine3A::from_translation(Vec3::new(0.0, 0.0, -5.0)));

    let result = fx.cull();
    assert!(result.opaque.is_empty());
    assert!(result.translucent.is_empty());
}

#[test]
fn invisible_entities_are_skipped() {
    let mut fx = fixture();
    let opaque = fx.opaque;
    let cube = fx.add_cube("hidden", Vec3::new(0.0, 0.0, -5.0), opaque);
    fx.scene.entity_mut(cube).unwrap().visible = false;
    let (light, world) = point_light(Vec3::ZERO, 10.0);
    fx.scene
        .add_entity(SceneEntity::new("off", world, EntityKind::Light(light)).with_visible(false));

    let result = fx.cull();
    assert_eq!(result.draw_call_count(), 0);
    assert!(result.prefabs.is_empty());
    assert!(result.lights().is_empty());
}

#[test]
fn nodes_with_missing_assets_are_skipped() {
    let mut fx = fixture();
    let root = Node::with_mesh("ghost", MeshHandle::default(), fx.opaque, Transform::IDENTITY);
    let handle = fx.assets.add_prefab(Prefab::with_root("ghost", root));
    fx.scene
        .add_prefab_entity("ghost", handle, Affine3A::from_translation(Vec3::new(0.0, 0.0, -5.0)));

    let result = fx.cull();
    assert_eq!(result.draw_call_count(), 0);
    assert_eq!(result.stats.missing_assets, 1);
}

#[test]
fn prefab_entity_without_prefab_is_an_error() {
    let mut fx = fixture();
    let key = fx.scene.add_entity(SceneEntity::new(
        "broken",
        Affine3A::IDENTITY,
        EntityKind::Prefab(PrefabEntity::default()),
    ));

    let mut result = SceneCullingResult::new();
    let err = FrustumCuller::default()
        .cull(&fx.scene, &fx.assets, &camera(), &mut result)
        .unwrap_err();
    assert!(matches!(err, UmbraError::MissingPrefab { entity, .. } if entity == key));
}

// ============================================================================
// Light Association
// ============================================================================

#[test]
fn light_table_holds_exactly_the_lights_in_range() {
    let mut fx = fixture();
    for z in [10.0, 15.0, 20.0, 30.0] {
        let opaque = fx.opaque;
        fx.add_cube("c", Vec3::new(0.0, 0.0, -z), opaque);
    }
    let blend = fx.blend;
    fx.add_cube("glass", Vec3::new(1.0, 0.0, -12.0), blend);

    let lights = [
        point_light(Vec3::new(0.0, 0.0, -10.0), 6.0),
        point_light(Vec3::new(0.0, 0.0, -30.0), 3.0),
        spot_light(Vec3::new(0.0, 5.0, -20.0), Vec3::NEG_Y),
    ];
    for (i, (light, world)) in lights.into_iter().enumerate() {
        fx.scene.add_light(format!("l{i}"), light, world);
    }

    let result = fx.cull();
    assert_eq!(result.draw_call_count(), 5);
    for dc in result.draw_calls() {
        for light in result.lights() {
            assert_eq!(
                dc.has_light(light.light_id),
                light.is_in_range(&dc.aabb),
                "light {} vs box at {:?}",
                light.light_id,
                dc.aabb.center
            );
        }
        assert_eq!(dc.dropped_lights(), 0);
    }
}

#[test]
fn one_light_past_capacity_is_dropped() {
    let mut fx = fixture();
    let opaque = fx.opaque;
    fx.add_cube("c", Vec3::new(0.0, 0.0, -10.0), opaque);
    for i in 0..=MAX_LIGHT_NUM {
        let (light, world) = point_light(Vec3::new(i as f32 * 0.1, 0.0, -10.0), 100.0);
        fx.scene.add_light(format!("p{i}"), light, world);
    }

    let result = fx.cull();
    let dc = &result.opaque[0];
    assert_eq!(dc.light_count(), MAX_LIGHT_NUM);
    assert_eq!(dc.dropped_lights(), 1);
    for id in 0..MAX_LIGHT_NUM as u32 {
        assert!(dc.has_light(id), "light {id} should be kept");
    }
    assert!(!dc.has_light(MAX_LIGHT_NUM as u32));
    assert_eq!(result.stats.dropped_light_associations, 1);
    assert_eq!(result.stats.light_associations, MAX_LIGHT_NUM as u32);
}

#[test]
fn directional_lights_are_range_tested_unless_disabled() {
    let mut fx = fixture();
    let opaque = fx.opaque;
    fx.add_cube("c", Vec3::new(0.0, 0.0, -10.0), opaque);
    let (light, world) = directional_light(Vec3::new(0.0, 100.0, -10.0), Vec3::NEG_Y, 20.0);
    fx.scene.add_light("sun", light, world);

    let result = fx.cull();
    assert_eq!(result.opaque[0].light_count(), 0);

    let mut settings = RendererSettings::default();
    settings.culling.directional_range_test = false;
    let result = fx.cull_with(&FrustumCuller::new(&settings, &ShadowAtlasLayout::default()));
    assert_eq!(result.opaque[0].light_count(), 1);
}

#[test]
fn non_directional_lights_come_first_in_the_table() {
    let mut fx = fixture();
    let opaque = fx.opaque;
    fx.add_cube("c", Vec3::new(0.0, 0.0, -10.0), opaque);
    let (sun, sun_world) = directional_light(Vec3::new(0.0, 5.0, -10.0), Vec3::NEG_Y, 50.0);
    fx.scene.add_light("sun", sun, sun_world);
    let (lamp, lamp_world) = point_light(Vec3::new(0.0, 0.0, -8.0), 10.0);
    fx.scene.add_light("lamp", lamp, lamp_world);

    let result = fx.cull();
    let ids: Vec<u32> = result.opaque[0].lights().iter().map(|l| l.light_id).collect();
    assert_eq!(ids, [1, 0]);
}

// ============================================================================
// Light & Shadow Ids
// ============================================================================

#[test]
fn light_ids_follow_entity_order() {
    let mut fx = fixture();
    let lights = [
        point_light(Vec3::ZERO, 1.0),
        directional_light(Vec3::ZERO, Vec3::NEG_Y, 10.0),
        spot_light(Vec3::ZERO, Vec3::Z),
        directional_light(Vec3::ZERO, Vec3::NEG_Y, 10.0),
    ];
    for (i, (light, world)) in lights.into_iter().enumerate() {
        fx.scene.add_light(format!("l{i}"), light, world);
    }

    let shared = fx.cull();
    let ids: Vec<u32> = shared.lights().iter().map(|l| l.light_id).collect();
    assert_eq!(ids, [0, 1, 2, 3]);
    assert_eq!(shared.directional_lights().count(), 2);
    assert_eq!(shared.non_directional_lights().count(), 2);

    let mut settings = RendererSettings::default();
    settings.culling.light_id_policy = LightIdPolicy::PerKind;
    let per_kind = fx.cull_with(&FrustumCuller::new(&settings, &ShadowAtlasLayout::default()));
    let ids: Vec<u32> = per_kind.lights().iter().map(|l| l.light_id).collect();
    assert_eq!(ids, [0, 0, 1, 1]);
}

#[test]
fn shadow_ids_go_to_directional_then_spot_lights() {
    let mut fx = fixture();
    let spot_a = {
        let (l, w) = spot_light(Vec3::ZERO, Vec3::Z);
        fx.scene.add_light("spot_a", l, w)
    };
    let point = {
        let (l, w) = point_light(Vec3::ZERO, 5.0);
        fx.scene.add_light("point", l, w)
    };
    let sun = {
        let (l, w) = directional_light(Vec3::Y * 10.0, Vec3::NEG_Y, 50.0);
        fx.scene.add_light("sun", l, w)
    };
    let spot_b = {
        let (l, w) = spot_light(Vec3::X, Vec3::Z);
        fx.scene.add_light("spot_b", l, w)
    };
    let no_shadow = {
        let (l, w) = spot_light(Vec3::X, Vec3::Z);
        fx.scene.add_light("no_shadow", l.with_cast_shadows(false), w)
    };

    let result = fx.cull();
    let shadow_id = |key| result.light(key).unwrap().shadow_id;
    assert_eq!(shadow_id(sun), Some(0));
    assert_eq!(shadow_id(spot_a), Some(1));
    assert_eq!(shadow_id(spot_b), Some(2));
    assert_eq!(shadow_id(point), None);
    assert_eq!(shadow_id(no_shadow), None);

    let casters: Vec<_> = result.shadow_casters().map(|l| l.key).collect();
    assert_eq!(casters, [sun, spot_a, spot_b]);
}

#[test]
fn shadow_casters_beyond_capacity_are_rejected() {
    let mut fx = fixture();
    for i in 0..3 {
        let (l, w) = spot_light(Vec3::new(i as f32, 0.0, 0.0), Vec3::NEG_Z);
        fx.scene.add_light(format!("spot{i}"), l, w);
    }

    let culler = FrustumCuller::default().with_shadow_capacity(2);
    let result = fx.cull_with(&culler);
    let ids: Vec<_> = result.lights().iter().map(|l| l.shadow_id).collect();
    assert_eq!(ids, [Some(0), Some(1), None]);
    assert_eq!(result.stats.rejected_shadow_casters, 1);
    assert_eq!(result.shadow_caster_count(), 2);
}

#[test]
fn draw_call_light_tables_carry_final_shadow_ids() {
    let mut fx = fixture();
    let opaque = fx.opaque;
    fx.add_cube("c", Vec3::new(0.0, 0.0, -10.0), opaque);
    let (l, w) = spot_light(Vec3::new(0.0, 0.0, -2.0), Vec3::NEG_Z);
    fx.scene.add_light("spot", l, w);
    let (l, w) = directional_light(Vec3::new(0.0, 5.0, -10.0), Vec3::NEG_Y, 50.0);
    fx.scene.add_light("sun", l, w);

    let result = fx.cull();
    let slots = result.opaque[0].lights();
    assert_eq!(slots.len(), 2);
    for slot in slots {
        let light = result
            .lights()
            .iter()
            .find(|l| l.light_id == slot.light_id)
            .unwrap();
        assert_eq!(slot.shadow_id, light.shadow_id);
        assert!(slot.shadow_id.is_some());
    }
}

// ============================================================================
// Cube Map Faces
// ============================================================================

#[test]
fn cubemap_faces_each_see_their_own_side() {
    let mut fx = fixture();
    for (i, (forward, _)) in CUBE_FACES.iter().enumerate() {
        let opaque = fx.opaque;
        fx.add_cube(&format!("face{i}"), *forward * 10.0, opaque);
    }

    let faces = FrustumCuller::default()
        .cull_cubemap_faces(&fx.scene, &fx.assets, Vec3::ZERO, 0.1, 100.0)
        .unwrap();
    assert_eq!(faces.len(), 6);
    for (i, face) in faces.iter().enumerate() {
        assert_eq!(face.opaque.len(), 1, "face {i}");
        let expected = CUBE_FACES[i].0 * 10.0;
        assert!((face.opaque[0].aabb.center - expected).length() < 1e-4);
        assert!((face.camera.position - Vec3::ZERO).length() < 1e-6);
    }
}
