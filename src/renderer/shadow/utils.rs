//! Shadow Utilities
//!
//! Pure math for light-space view-projection matrices, kept free of scene
//! and GPU state so it can be tested in isolation.

use glam::{Mat4, Vec3};

/// Default near plane of light frustums, see
/// [`ShadowSettings::near_plane`](crate::renderer::settings::ShadowSettings::near_plane).
pub const DEFAULT_SHADOW_NEAR: f32 = 0.1;

fn safe_direction(direction: Vec3) -> Vec3 {
    if direction.length_squared() > 1e-6 {
        direction.normalize()
    } else {
        Vec3::Z
    }
}

fn up_for(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    }
}

/// Light view looking from `position` along `direction`.
#[must_use]
pub fn light_view(position: Vec3, direction: Vec3) -> Mat4 {
    let dir = safe_direction(direction);
    Mat4::look_at_rh(position, position + dir, up_for(dir))
}

// ============================================================================
// Spot Light VP Matrix
// ============================================================================

/// Perspective VP for a spot light: `cone_angle` (degrees) is the vertical
/// field of view, aspect 1, `near..far`.
#[must_use]
pub fn build_spot_vp(position: Vec3, direction: Vec3, cone_angle: f32, near: f32, far: f32) -> Mat4 {
    let fov = cone_angle
        .to_radians()
        .clamp(0.1, std::f32::consts::PI - 0.01);
    let far = far.max(near + 1e-3);
    Mat4::perspective_rh(fov, 1.0, near, far) * light_view(position, direction)
}

// ============================================================================
// Directional Light VP Matrix
// ============================================================================

/// Orthographic VP for a directional light: a square of side `area_size`
/// centered on the light axis, `near..far` along `direction`.
#[must_use]
pub fn build_directional_vp(
    position: Vec3,
    direction: Vec3,
    area_size: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let half = area_size.abs() * 0.5;
    let far = far.max(near + 1e-3);
    Mat4::orthographic_rh(-half, half, -half, half, near, far) * light_view(position, direction)
}
