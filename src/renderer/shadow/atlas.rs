//! Shadow atlas tile table.
//!
//! Tiles are UV-space squares inside one square depth texture. The tile
//! for a light is looked up by its `shadow_id`, so the table size caps the
//! number of shadow casters per frame.

use glam::{Vec2, Vec4};

use crate::errors::{Result, UmbraError};
use crate::renderer::settings::ShadowSettings;
use crate::renderer::uniforms::MAX_SHADOW_CASTERS;

const UV_EPSILON: f32 = 1e-6;

/// One shadow map's square inside the atlas, in UV units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasTile {
    pub offset: Vec2,
    pub size: f32,
}

impl AtlasTile {
    #[must_use]
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            size,
        }
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.offset + Vec2::splat(self.size)
    }

    /// Interiors intersect. Tiles sharing only an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &AtlasTile) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.offset.x < b_max.x - UV_EPSILON
            && other.offset.x < a_max.x - UV_EPSILON
            && self.offset.y < b_max.y - UV_EPSILON
            && other.offset.y < a_max.y - UV_EPSILON
    }

    fn is_inside_unit_square(&self) -> bool {
        self.size > 0.0
            && self.offset.min_element() >= -UV_EPSILON
            && self.max().max_element() <= 1.0 + UV_EPSILON
    }

    /// Texel rectangle of this tile in an atlas of `resolution²` texels.
    ///
    /// Edges are rounded independently so neighbouring tiles share an edge
    /// instead of overlapping by a texel.
    #[must_use]
    pub fn viewport(&self, resolution: u32) -> Viewport {
        let res = resolution as f32;
        let x0 = (self.offset.x * res).round() as u32;
        let y0 = (self.offset.y * res).round() as u32;
        let x1 = (self.max().x * res).round() as u32;
        let y1 = (self.max().y * res).round() as u32;
        Viewport {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    /// `(offset.x, offset.y, size, 0)`, as uploaded to shading passes.
    #[inline]
    #[must_use]
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.offset.x, self.offset.y, self.size, 0.0)
    }
}

/// Texel rectangle inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn overlaps(&self, other: &Viewport) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Validated, non-overlapping tile table.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowAtlasLayout {
    resolution: u32,
    tiles: Vec<AtlasTile>,
}

impl ShadowAtlasLayout {
    /// `grid × grid` equal tiles, row-major from the UV origin.
    pub fn grid(resolution: u32, grid: u32) -> Result<Self> {
        if grid == 0 {
            return Err(UmbraError::InvalidAtlasLayout(
                "grid must have at least one tile per side".into(),
            ));
        }
        Self::from_tiles(resolution, grid_tiles(grid))
    }

    pub fn from_settings(settings: &ShadowSettings) -> Result<Self> {
        Self::grid(settings.atlas_resolution, settings.atlas_grid)
    }

    /// Custom tile table. Rejects empty tables, tiles outside the unit
    /// square, overlapping tiles and more than [`MAX_SHADOW_CASTERS`] tiles.
    pub fn from_tiles(resolution: u32, tiles: Vec<AtlasTile>) -> Result<Self> {
        if resolution == 0 {
            return Err(UmbraError::InvalidAtlasLayout("resolution is zero".into()));
        }
        if tiles.is_empty() {
            return Err(UmbraError::InvalidAtlasLayout("no tiles".into()));
        }
        if tiles.len() > MAX_SHADOW_CASTERS {
            return Err(UmbraError::InvalidAtlasLayout(format!(
                "{} tiles exceed the limit of {MAX_SHADOW_CASTERS}",
                tiles.len()
            )));
        }
        for (i, tile) in tiles.iter().enumerate() {
            if !tile.is_inside_unit_square() {
                return Err(UmbraError::InvalidAtlasLayout(format!(
                    "tile {i} ({tile:?}) is outside the atlas"
                )));
            }
            if let Some(j) = tiles[..i].iter().position(|other| other.overlaps(tile)) {
                return Err(UmbraError::InvalidAtlasLayout(format!(
                    "tile {i} overlaps tile {j}"
                )));
            }
        }
        Ok(Self { resolution, tiles })
    }

    #[inline]
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Maximum number of shadow casters per frame.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[AtlasTile] {
        &self.tiles
    }

    #[inline]
    #[must_use]
    pub fn tile(&self, shadow_id: u32) -> Option<&AtlasTile> {
        self.tiles.get(shadow_id as usize)
    }

    #[must_use]
    pub fn viewport(&self, shadow_id: u32) -> Option<Viewport> {
        self.tile(shadow_id).map(|tile| tile.viewport(self.resolution))
    }
}

impl Default for ShadowAtlasLayout {
    fn default() -> Self {
        let settings = ShadowSettings::default();
        Self {
            resolution: settings.atlas_resolution,
            tiles: grid_tiles(settings.atlas_grid),
        }
    }
}

fn grid_tiles(grid: u32) -> Vec<AtlasTile> {
    let size = 1.0 / grid as f32;
    (0..grid * grid)
        .map(|i| AtlasTile::new((i % grid) as f32 * size, (i / grid) as f32 * size, size))
        .collect()
}
