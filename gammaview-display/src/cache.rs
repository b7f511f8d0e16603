//! Cache of rendered matrix tiles.
//!
//! Tiles are rendered on demand and kept until they leave the visible range
//! ([`TileCache::weed_tiles`]) or the cache is flushed. Every tile is
//! rendered with the parameters of a [`RenderContext`]; a request with
//! different parameters flushes the cache first, so a stale tile is never
//! returned.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use gammaview_core::{
    Colormap, CoordinateMapper, Error, MatrixSource, Result, TileId, TileRange, ZScale, TILE_SIZE,
};
use serde::Serialize;

use crate::marker::Marker;
use crate::overlay::{DisplayCut, OverlayRenderer};
use crate::raster::{Raster, BACKGROUND};
use crate::style::StyleRegistry;

/// Everything a tile render reads.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub mapper: CoordinateMapper,
    pub z_scale: ZScale,
    pub colormap: Colormap,
    pub source: Option<&'a dyn MatrixSource>,
    pub cuts: &'a [DisplayCut],
    pub markers: &'a [Marker],
    /// Drawn after `markers`.
    pub zoom_markers: &'a [Marker],
    pub styles: &'a StyleRegistry,
    /// Bumped by the owner whenever cuts or markers change.
    pub overlay_generation: u64,
}

impl RenderContext<'_> {
    fn key(&self) -> RenderKey {
        RenderKey {
            params: self.mapper.render_params(),
            z_scale: self.z_scale,
            colormap: self.colormap,
            overlay_generation: self.overlay_generation,
        }
    }
}

/// Parameters that determine tile contents.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderKey {
    params: [f64; 4],
    z_scale: ZScale,
    colormap: Colormap,
    overlay_generation: u64,
}

/// Counters of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Tiles rendered from the data source.
    pub renders: u64,
    /// Requests answered from the cache.
    pub hits: u64,
    /// Tiles dropped by [`TileCache::weed_tiles`].
    pub evictions: u64,
    /// Calls that emptied the whole cache.
    pub flushes: u64,
}

/// Rendered tiles keyed by [`TileId`].
#[derive(Debug, Default)]
pub struct TileCache {
    tiles: HashMap<TileId, Raster>,
    key: Option<RenderKey>,
    stats: CacheStats,
}

impl TileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return tile `(x, y)`, rendering it if it is not cached.
    ///
    /// # Errors
    ///
    /// Propagates render failures; nothing is cached for a failed tile.
    pub fn get_tile(&mut self, x: i32, y: i32, ctx: &RenderContext<'_>) -> Result<&Raster> {
        let key = ctx.key();
        if self.key != Some(key) {
            if !self.tiles.is_empty() {
                log::debug!("render parameters changed, dropping {} tiles", self.tiles.len());
                self.flush_tiles();
            }
            self.key = Some(key);
        }
        let id = TileId::new(x, y);
        match self.tiles.entry(id) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let raster = Self::render_tile(id, ctx)?;
                self.stats.renders += 1;
                Ok(entry.insert(raster))
            }
        }
    }

    /// Render one tile without touching any cache.
    ///
    /// Pixel `(px, py)` of the tile shows the bin containing the data point
    /// of tile-space pixel `(origin_x + px, -(origin_y + py))`. Pixels outside
    /// the matrix keep the background color. Overlays are drawn on top.
    ///
    /// # Errors
    ///
    /// - [`Error::DataSourceUnavailable`] without a source, with unusable
    ///   axes, or when a bin cannot be read.
    /// - [`Error::InvalidGeometry`] if the tile lies outside the `i32` grid.
    /// - [`Error::ResourceExhaustion`] if the raster cannot be allocated.
    pub fn render_tile(id: TileId, ctx: &RenderContext<'_>) -> Result<Raster> {
        let source = ctx
            .source
            .ok_or_else(|| Error::DataSourceUnavailable("no matrix attached".to_string()))?;
        let (x_axis, y_axis) = (source.x_axis(), source.y_axis());
        if !x_axis.is_valid() || !y_axis.is_valid() {
            return Err(Error::DataSourceUnavailable(
                "matrix axes are inconsistent".to_string(),
            ));
        }
        let (origin_x, origin_y) = id
            .origin()
            .ok_or_else(|| Error::InvalidGeometry(format!("tile {id} is out of range")))?;

        let mut raster = Raster::tile(BACKGROUND)?;
        let x_bins: Vec<Option<usize>> = (0..TILE_SIZE)
            .map(|px| x_axis.find_bin(ctx.mapper.x_tile_to_e(origin_x.saturating_add(px))))
            .collect();

        for py in 0..TILE_SIZE {
            let ty = origin_y.saturating_add(py).saturating_neg();
            let Some(by) = y_axis.find_bin(ctx.mapper.y_tile_to_e(ty)) else {
                continue;
            };
            for (px, bx) in (0_i64..).zip(&x_bins) {
                let Some(bx) = *bx else {
                    continue;
                };
                let counts = source.bin_content(bx, by)?;
                let color = ctx.colormap.rgba(ctx.z_scale.to_ramp(counts));
                raster.put_pixel(px, i64::from(py), color);
            }
        }

        OverlayRenderer::new(ctx.mapper, ctx.styles).render_tile_overlays(
            id,
            ctx.cuts,
            ctx.markers.iter().chain(ctx.zoom_markers),
            &mut raster,
        );
        log::debug!("rendered tile {id}");
        Ok(raster)
    }

    /// Drop every tile outside `visible`; returns the number dropped.
    pub fn weed_tiles(&mut self, visible: &TileRange) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(|id, _| visible.contains(*id));
        let removed = before - self.tiles.len();
        if removed > 0 {
            self.stats.evictions += removed as u64;
            log::debug!("weeded {removed} tiles, {} left", self.tiles.len());
        }
        removed
    }

    /// Drop all tiles; returns the number dropped.
    pub fn flush_tiles(&mut self) -> usize {
        let removed = self.tiles.len();
        self.tiles.clear();
        self.stats.flushes += 1;
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// Ids of all cached tiles, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<TileId> {
        let mut ids: Vec<TileId> = self.tiles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
