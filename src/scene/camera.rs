use glam::{Affine3A, Mat4, Vec3, Vec4};

use crate::resources::geometry::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// Scene camera.
///
/// Projection uses `[0, 1]` depth (`glam`'s `*_rh` constructors), which is
/// what [`Frustum::from_matrix`] expects.
#[derive(Debug, Clone)]
pub struct Camera {
    pub projection_type: ProjectionType,
    /// Vertical field of view, radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Half height of the orthographic volume
    pub ortho_size: f32,

    eye: Vec3,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// `fov` in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection_type: ProjectionType::Perspective,
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            ortho_size: 10.0,
            eye: Vec3::ZERO,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn new_orthographic(ortho_size: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self::new_perspective(60.0, aspect, near, far);
        cam.projection_type = ProjectionType::Orthographic;
        cam.ortho_size = ortho_size;
        cam.update_projection_matrix();
        cam
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection_type {
            ProjectionType::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => {
                let w = self.ortho_size * self.aspect;
                let h = self.ortho_size;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };
        self.update_view_projection();
    }

    /// Places the camera at `eye` looking towards `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.eye = eye;
        self.view_matrix = Mat4::look_at_rh(eye, target, up);
        self.update_view_projection();
    }

    /// Sets the camera from its world transform (view = world⁻¹).
    pub fn set_world_transform(&mut self, world: &Affine3A) {
        self.eye = Vec3::from(world.translation);
        self.view_matrix = Mat4::from(*world).inverse();
        self.update_view_projection();
    }

    fn update_view_projection(&mut self) {
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    #[inline]
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Box given by center + halfsize against the view frustum.
    #[inline]
    #[must_use]
    pub fn test_box_in_frustum(&self, center: Vec3, halfsize: Vec3) -> bool {
        self.frustum.test_box(center, halfsize)
    }

    /// Read-only snapshot handed to the shading passes with the draw calls.
    #[must_use]
    pub fn extract_render_camera(&self) -> RenderCamera {
        RenderCamera {
            view_matrix: self.view_matrix,
            projection_matrix: self.projection_matrix,
            view_projection_matrix: self.view_projection_matrix,
            position: self.eye,
            frustum: self.frustum,
            near: self.near,
            far: self.far,
        }
    }
}

/// The camera a [`SceneCullingResult`](crate::SceneCullingResult) was culled with.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderCamera {
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub view_projection_matrix: Mat4,
    pub position: Vec3,
    pub frustum: Frustum,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    /// Gribb-Hartmann plane extraction for a `[0, 1]` depth range.
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // Left
            rows[3] - rows[0], // Right
            rows[3] + rows[1], // Bottom
            rows[3] - rows[1], // Top
            rows[2],           // Near
            rows[3] - rows[2], // Far
        ];

        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }

    #[inline]
    #[must_use]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
    }

    /// Conservative box test: rejects only boxes fully behind one plane.
    #[must_use]
    pub fn test_box(&self, center: Vec3, halfsize: Vec3) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let radius = normal.abs().dot(halfsize);
            normal.dot(center) + plane.w >= -radius
        })
    }

    #[inline]
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &BoundingBox) -> bool {
        self.test_box(aabb.center, aabb.halfsize)
    }
}
