//! Renderer Settings Tests
//!
//! Tests for:
//! - Defaults
//! - Partial JSON documents
//! - Validation failures

use umbra::renderer::settings::{LightIdPolicy, RendererSettings, ShadowSettings};
use umbra::UmbraError;

#[test]
fn defaults_match_documented_values() {
    let settings = RendererSettings::default();
    assert_eq!(settings.shadows.atlas_resolution, 4096);
    assert_eq!(settings.shadows.atlas_grid, 3);
    assert_eq!(settings.shadows.capacity(), 9);
    assert_eq!(settings.shadows.texture_unit, 8);
    assert!((settings.shadows.depth_bias - 0.005).abs() < f32::EPSILON);
    assert!((settings.shadows.near_plane - 0.1).abs() < f32::EPSILON);
    assert_eq!(settings.culling.light_id_policy, LightIdPolicy::Shared);
    assert!(settings.culling.directional_range_test);
    assert!(settings.validate().is_ok());
}

#[test]
fn partial_json_fills_in_defaults() -> anyhow::Result<()> {
    let settings = RendererSettings::from_json_str(
        r#"{
            "culling": { "light_id_policy": "PerKind" },
            "shadows": { "atlas_grid": 4, "depth_bias": 0.01 }
        }"#,
    )?;
    assert_eq!(settings.culling.light_id_policy, LightIdPolicy::PerKind);
    assert!(settings.culling.directional_range_test);
    assert_eq!(settings.shadows.capacity(), 16);
    assert_eq!(settings.shadows.atlas_resolution, 4096);
    assert!((settings.shadows.depth_bias - 0.01).abs() < f32::EPSILON);
    Ok(())
}

#[test]
fn json_round_trip_preserves_settings() -> anyhow::Result<()> {
    let mut settings = RendererSettings::default();
    settings.shadows.atlas_grid = 2;
    settings.culling.directional_range_test = false;

    let json = settings.to_json_string()?;
    assert_eq!(RendererSettings::from_json_str(&json)?, settings);
    Ok(())
}

#[test]
fn invalid_json_is_a_json_error() {
    let err = RendererSettings::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, UmbraError::JsonError(_)));
}

#[test]
fn validation_rejects_unusable_atlases() {
    let cases = [
        ShadowSettings {
            atlas_grid: 0,
            ..ShadowSettings::default()
        },
        ShadowSettings {
            atlas_grid: 5,
            ..ShadowSettings::default()
        },
        ShadowSettings {
            atlas_resolution: 2,
            ..ShadowSettings::default()
        },
        ShadowSettings {
            near_plane: 0.0,
            ..ShadowSettings::default()
        },
        ShadowSettings {
            depth_bias: f32::NAN,
            ..ShadowSettings::default()
        },
    ];
    for shadows in cases {
        let settings = RendererSettings {
            shadows,
            ..RendererSettings::default()
        };
        assert!(
            matches!(settings.validate(), Err(UmbraError::InvalidSettings(_))),
            "{settings:?} should be rejected"
        );
    }
}
