//! Irradiance probe grid
//!
//! Probes sit on a regular 3D grid starting at `origin`. Probe `i` has grid
//! coordinates `(x, y, z)` with `i = x + y * dims.x + z * dims.x * dims.y`.
//! Each probe is captured by culling the scene once per cube map face from
//! its position.

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::assets::AssetStore;
use crate::errors::{Result, UmbraError};
use crate::renderer::culling::{FrustumCuller, SceneCullingResult};
use crate::scene::scene::Scene;

/// Near plane of the probe capture cameras.
pub const PROBE_NEAR: f32 = 0.1;
/// Far plane of the probe capture cameras.
pub const PROBE_FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrradianceProbeGrid {
    pub origin: Vec3,
    /// Probes along each axis
    pub dims: UVec3,
    /// Distance between neighbouring probes
    pub spacing: f32,
}

impl Default for IrradianceProbeGrid {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            dims: UVec3::ONE,
            spacing: 1.0,
        }
    }
}

impl IrradianceProbeGrid {
    #[must_use]
    pub fn new(origin: Vec3, dims: UVec3, spacing: f32) -> Self {
        Self {
            origin,
            dims,
            spacing,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dims.x as usize * self.dims.y as usize * self.dims.z as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of the probe at grid coordinates `coords`.
    #[must_use]
    pub fn index(&self, coords: UVec3) -> Option<usize> {
        if coords.cmpge(self.dims).any() {
            return None;
        }
        let (sx, sy) = (self.dims.x as usize, self.dims.y as usize);
        Some(coords.x as usize + coords.y as usize * sx + coords.z as usize * sx * sy)
    }

    /// Grid coordinates of probe `index`.
    #[must_use]
    pub fn coords(&self, index: usize) -> Option<UVec3> {
        if index >= self.len() {
            return None;
        }
        let (sx, sy) = (self.dims.x as usize, self.dims.y as usize);
        Some(UVec3::new(
            (index % sx) as u32,
            (index / sx % sy) as u32,
            (index / (sx * sy)) as u32,
        ))
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.coords(index)
            .map(|coords| self.origin + coords.as_vec3() * self.spacing)
    }

    /// Every probe position, in index order.
    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        (0..self.len()).filter_map(|i| self.position(i)).collect()
    }

    /// Culls the scene for the six cube faces of probe `index`.
    pub fn cull_probe(
        &self,
        culler: &FrustumCuller,
        scene: &Scene,
        assets: &AssetStore,
        index: usize,
    ) -> Result<Vec<SceneCullingResult>> {
        let position = self.position(index).ok_or(UmbraError::ProbeOutOfRange {
            index,
            count: self.len(),
        })?;
        culler.cull_cubemap_faces(scene, assets, position, PROBE_NEAR, PROBE_FAR)
    }

    /// [`cull_probe`](Self::cull_probe) for every probe, in index order.
    pub fn cull_all(
        &self,
        culler: &FrustumCuller,
        scene: &Scene,
        assets: &AssetStore,
    ) -> Result<Vec<Vec<SceneCullingResult>>> {
        (0..self.len())
            .map(|index| self.cull_probe(culler, scene, assets, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_coords_are_inverse() {
        let grid = IrradianceProbeGrid::new(Vec3::ZERO, UVec3::new(3, 2, 4), 1.0);
        for i in 0..grid.len() {
            let coords = grid.coords(i).unwrap();
            assert_eq!(grid.index(coords), Some(i));
        }
        assert_eq!(grid.coords(grid.len()), None);
        assert_eq!(grid.index(UVec3::new(3, 0, 0)), None);
    }
}
