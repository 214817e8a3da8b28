use glam::{Affine3A, Vec3, Vec3A};

/// Axis-aligned bounding box stored as center + half extents.
///
/// `halfsize` components are always non-negative; constructors take the
/// absolute value of whatever they are given.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub center: Vec3,
    pub halfsize: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn new(center: Vec3, halfsize: Vec3) -> Self {
        Self {
            center,
            halfsize: halfsize.abs(),
        }
    }

    #[must_use]
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let lo = min.min(max);
        let hi = min.max(max);
        Self {
            center: (lo + hi) * 0.5,
            halfsize: (hi - lo) * 0.5,
        }
    }

    /// Unit cube (`halfsize = 0.5`) centered at `center`.
    #[must_use]
    pub fn unit_cube(center: Vec3) -> Self {
        Self::new(center, Vec3::splat(0.5))
    }

    #[inline]
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.halfsize
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.halfsize
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.halfsize * 2.0
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Transforms the box and re-encloses the result in a new axis-aligned box.
    ///
    /// The half extents go through the absolute value of the linear part, so a
    /// rotated box is fully covered (Arvo's method) rather than merely scaled.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let center = matrix.transform_point3(self.center);
        let m = matrix.matrix3;
        let h = Vec3A::from(self.halfsize);
        let halfsize = m.x_axis.abs() * h.x + m.y_axis.abs() * h.y + m.z_axis.abs() * h.z;

        Self {
            center,
            halfsize: Vec3::from(halfsize),
        }
    }

    /// Closest point inside (or on) the box to `point`.
    #[inline]
    #[must_use]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min(), self.max())
    }

    /// Distance from `point` to the box surface, `0.0` when inside.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.closest_point(point).distance(point)
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.cmple(self.halfsize).all()
    }

    /// Cheap camera sort key: the nearest of center, `center + halfsize` and
    /// `center - halfsize` to `eye`.
    ///
    /// Under-estimates the true nearest-point distance for some boxes but is
    /// monotonic enough for front-to-back / back-to-front ordering.
    #[must_use]
    pub fn sort_distance(&self, eye: Vec3) -> f32 {
        let d_center = self.center.distance(eye);
        let d_max = (self.center + self.halfsize).distance(eye);
        let d_min = (self.center - self.halfsize).distance(eye);
        d_center.min(d_max).min(d_min)
    }
}

/// Geometry as seen by the culling core: a name and a local-space bound.
///
/// Vertex data and GPU buffers belong to the rendering backend.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub bounding_box: BoundingBox,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            name: name.into(),
            bounding_box,
        }
    }
}
