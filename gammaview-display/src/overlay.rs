//! Vector overlays (cuts and markers) drawn on top of raster tiles.

use gammaview_core::{
    BoundingBox, CoordinateMapper, Cut, LogicalPoint, PixelRect, TileId, TILE_SIZE,
};

use crate::marker::{Marker, MarkerAxis};
use crate::raster::DrawingSurface;
use crate::style::{StyleId, StyleRegistry};

/// Tile-local drawing area.
const TILE_RECT: PixelRect = PixelRect {
    x: 0,
    y: 0,
    width: TILE_SIZE,
    height: TILE_SIZE,
};

/// Identifier of a cut within one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CutId(pub usize);

impl std::fmt::Display for CutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cut together with its display style.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCut {
    pub id: CutId,
    pub cut: Cut,
    pub style: StyleId,
}

/// Draws overlays with the coordinate mapping of one viewport snapshot.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRenderer<'a> {
    mapper: CoordinateMapper,
    styles: &'a StyleRegistry,
}

impl<'a> OverlayRenderer<'a> {
    #[must_use]
    pub fn new(mapper: CoordinateMapper, styles: &'a StyleRegistry) -> Self {
        Self { mapper, styles }
    }

    /// Draw all cuts, then all markers, onto the raster of tile `id`.
    ///
    /// Cuts are drawn in slice order, so later cuts end up on top.
    pub fn render_tile_overlays<'m, M, S>(
        &self,
        id: TileId,
        cuts: &[DisplayCut],
        markers: M,
        target: &mut S,
    ) where
        M: IntoIterator<Item = &'m Marker>,
        S: DrawingSurface + ?Sized,
    {
        let Some((ox, oy)) = id.origin() else {
            return;
        };
        for cut in cuts {
            self.render_cut(cut, ox, oy, target);
        }
        for marker in markers {
            self.render_marker(marker, ox, oy, target);
        }
    }

    /// Draw one cut as a closed polyline in tile-local pixels.
    ///
    /// `tile_origin_x` is the tile-space column of the tile's left edge,
    /// `tile_origin_y` the negated tile-space row of its top edge. Returns
    /// false if the cut misses the tile.
    pub fn render_cut<S>(
        &self,
        cut: &DisplayCut,
        tile_origin_x: i32,
        tile_origin_y: i32,
        target: &mut S,
    ) -> bool
    where
        S: DrawingSurface + ?Sized,
    {
        if !self.touches_tile(&cut.cut.bounds(), tile_origin_x, tile_origin_y) {
            return false;
        }
        let Some(style) = self.styles.get(cut.style) else {
            log::warn!("cut {} refers to an unknown style", cut.id);
            return false;
        };
        let mut points: Vec<(i32, i32)> = cut
            .cut
            .display_vertices()
            .map(|p| self.to_local(p, tile_origin_x, tile_origin_y))
            .collect();
        if let Some(&first) = points.first() {
            points.push(first);
        }
        target.draw_polyline(&points, style, TILE_RECT);
        true
    }

    /// Draw the edges of a marker crossing the tile.
    pub fn render_marker<S>(
        &self,
        marker: &Marker,
        tile_origin_x: i32,
        tile_origin_y: i32,
        target: &mut S,
    ) where
        S: DrawingSurface + ?Sized,
    {
        for (position, style_id) in marker.edges() {
            let Some(style) = self.styles.get(style_id) else {
                continue;
            };
            match marker.axis() {
                MarkerAxis::X => {
                    let x = self
                        .mapper
                        .e_to_x_tile(position)
                        .saturating_sub(tile_origin_x);
                    if (0..TILE_SIZE).contains(&x) {
                        target.draw_polyline(&[(x, 0), (x, TILE_SIZE - 1)], style, TILE_RECT);
                    }
                }
                MarkerAxis::Y => {
                    let y = self
                        .mapper
                        .e_to_y_tile(position)
                        .saturating_neg()
                        .saturating_sub(tile_origin_y);
                    if (0..TILE_SIZE).contains(&y) {
                        target.draw_polyline(&[(0, y), (TILE_SIZE - 1, y)], style, TILE_RECT);
                    }
                }
            }
        }
    }

    /// Draw an open polyline in screen coordinates (cut drafts), restricted
    /// to `clip`.
    pub fn render_screen_polyline<S>(
        &self,
        vertices: &[LogicalPoint],
        style: StyleId,
        clip: PixelRect,
        target: &mut S,
    ) where
        S: DrawingSurface + ?Sized,
    {
        let Some(style) = self.styles.get(style) else {
            return;
        };
        let points: Vec<(i32, i32)> = vertices
            .iter()
            .map(|p| self.mapper.data_to_screen(*p))
            .collect();
        target.draw_polyline(&points, style, clip);
    }

    fn to_local(&self, p: LogicalPoint, ox: i32, oy: i32) -> (i32, i32) {
        let (tx, ty) = self.mapper.data_to_tile(p);
        (tx.saturating_sub(ox), ty.saturating_neg().saturating_sub(oy))
    }

    /// Bounding-box test of a cut against the tile footprint.
    fn touches_tile(&self, bounds: &BoundingBox, ox: i32, oy: i32) -> bool {
        let (left, top) = self.mapper.data_to_tile(LogicalPoint::new(bounds.x1, bounds.y2));
        let (right, bottom) = self.mapper.data_to_tile(LogicalPoint::new(bounds.x2, bounds.y1));
        let (down_top, down_bottom) = (top.saturating_neg(), bottom.saturating_neg());
        !(right < ox
            || left >= ox.saturating_add(TILE_SIZE)
            || down_bottom < oy
            || down_top >= oy.saturating_add(TILE_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::style::LineStyle;
    use gammaview_core::ViewportState;

    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn mapper() -> CoordinateMapper {
        // One pixel per data unit, data y = 127 on the top row of tile (0, 0).
        ViewportState {
            y_e_offset: 127.0,
            vp_width: 256,
            vp_height: 256,
            ..ViewportState::default()
        }
        .mapper()
    }

    fn cut(styles: &mut StyleRegistry, pairs: &[(f64, f64)], color: [u8; 4]) -> DisplayCut {
        DisplayCut {
            id: CutId(1),
            cut: Cut::from_pairs(pairs, false).unwrap(),
            style: styles.register(LineStyle::solid(color)),
        }
    }

    #[test]
    fn test_cut_outside_tile_is_skipped() {
        let mut styles = StyleRegistry::new();
        let c = cut(&mut styles, &[(500.0, 10.0), (600.0, 10.0), (600.0, 50.0)], [9, 9, 9, 255]);
        let renderer = OverlayRenderer::new(mapper(), &styles);
        let mut tile = Raster::tile(BLACK).unwrap();
        assert!(!renderer.render_cut(&c, 0, 0, &mut tile));
        assert!(renderer.render_cut(&c, 512, 0, &mut tile));
    }

    #[test]
    fn test_cut_vertex_lands_on_local_pixel() {
        let mut styles = StyleRegistry::new();
        let red = [255, 0, 0, 255];
        let c = cut(&mut styles, &[(10.0, 117.0), (20.0, 117.0), (20.0, 107.0)], red);
        let renderer = OverlayRenderer::new(mapper(), &styles);
        let mut tile = Raster::tile(BLACK).unwrap();
        renderer.render_cut(&c, 0, 0, &mut tile);
        // Data (10, 117) is tile-space (10, -10): ten rows below the top.
        assert_eq!(tile.pixel(10, 10), Some(red));
        assert_eq!(tile.pixel(20, 20), Some(red));
        assert_eq!(tile.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn test_marker_line() {
        let mut styles = StyleRegistry::new();
        let green = [0, 255, 0, 255];
        let marker = Marker::single(MarkerAxis::X, 140.0, styles.marker_styles(green)).unwrap();
        let renderer = OverlayRenderer::new(mapper(), &styles);
        let mut tile = Raster::tile(BLACK).unwrap();
        renderer.render_tile_overlays(TileId::new(1, 0), &[], &[marker.clone()], &mut tile);
        assert_eq!(tile.pixel(12, 0), Some(green));
        assert_eq!(tile.pixel(12, 127), Some(green));
        let mut other = Raster::tile(BLACK).unwrap();
        renderer.render_tile_overlays(TileId::new(0, 0), &[], &[marker], &mut other);
        assert_eq!(other, Raster::tile(BLACK).unwrap());
    }
}
