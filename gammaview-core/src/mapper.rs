//! Viewport state and coordinate conversion.
//!
//! Three coordinate spaces are involved:
//!
//! - data coordinates (`f64`, energies, y grows upwards),
//! - tile space (`i32` pixels relative to the logical origin, y upwards),
//! - screen space (`i32` pixels on the drawing surface, y downwards).
//!
//! Zoom and the logical offsets connect data and tile space; the integer
//! tile offsets connect tile and screen space. Panning by whole pixels only
//! touches the tile offsets, so rendered tiles stay valid.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colormap::ZScale;
use crate::error::{Error, Result};
use crate::geometry::{tile_id_of, LogicalPoint, PixelRect, TileId, TileRange};

/// Insets between the window edge and the matrix viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Borders {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Borders {
    /// Same inset on all four sides.
    #[must_use]
    pub fn uniform(width: i32) -> Self {
        Self {
            left: width,
            right: width,
            top: width,
            bottom: width,
        }
    }

    /// Returns true if no inset is negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.left >= 0 && self.right >= 0 && self.top >= 0 && self.bottom >= 0
    }
}

/// Complete mutable state of a matrix viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Pixels per data unit along x.
    pub x_zoom: f64,
    /// Pixels per data unit along y.
    pub y_zoom: f64,
    /// Logical x offset (negated data x at tile-space column 0).
    pub x_e_offset: f64,
    /// Logical y offset (data y at tile-space row 0).
    pub y_e_offset: f64,
    /// Screen column of tile-space column 0.
    pub x_tile_offset: i32,
    /// Screen row of tile-space row 0.
    pub y_tile_offset: i32,
    /// Count window for the color ramp.
    pub z_scale: ZScale,
    /// Viewport width in pixels (window minus borders).
    pub vp_width: i32,
    /// Viewport height in pixels (window minus borders).
    pub vp_height: i32,
    /// Window insets.
    pub borders: Borders,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            x_zoom: 1.0,
            y_zoom: 1.0,
            x_e_offset: 0.0,
            y_e_offset: 0.0,
            x_tile_offset: 0,
            y_tile_offset: 0,
            z_scale: ZScale::default(),
            vp_width: 1,
            vp_height: 1,
            borders: Borders::default(),
        }
    }
}

impl ViewportState {
    /// Check that every field can be used for coordinate conversion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(self.x_zoom.is_finite() && self.x_zoom > 0.0) {
            return Err(Error::geometry(format!("x zoom {} not positive", self.x_zoom)));
        }
        if !(self.y_zoom.is_finite() && self.y_zoom > 0.0) {
            return Err(Error::geometry(format!("y zoom {} not positive", self.y_zoom)));
        }
        if !self.x_e_offset.is_finite() || !self.y_e_offset.is_finite() {
            return Err(Error::geometry("logical offset is not finite"));
        }
        if self.vp_width <= 0 || self.vp_height <= 0 {
            return Err(Error::geometry(format!(
                "viewport {}x{} is empty",
                self.vp_width, self.vp_height
            )));
        }
        if !self.borders.is_valid() {
            return Err(Error::geometry("negative border inset"));
        }
        if !self.z_scale.is_valid() {
            return Err(Error::geometry(format!(
                "z window {} + {} is not usable",
                self.z_scale.offset, self.z_scale.visible_region
            )));
        }
        Ok(())
    }

    /// Snapshot of the conversion parameters.
    #[must_use]
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self)
    }

    /// Screen rectangle of the matrix viewport.
    #[must_use]
    pub fn viewport_rect(&self) -> PixelRect {
        PixelRect::new(
            self.borders.left,
            self.borders.top,
            self.vp_width,
            self.vp_height,
        )
    }

    /// Ids of all tiles intersecting the viewport.
    #[must_use]
    pub fn visible_tiles(&self) -> TileRange {
        self.mapper().tiles_covering(&self.viewport_rect())
    }
}

/// Coordinate conversions for one [`ViewportState`] snapshot.
///
/// The mapper is a copy; later changes of the state never leak into
/// conversions made with an existing mapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    x_zoom: f64,
    y_zoom: f64,
    x_e_offset: f64,
    y_e_offset: f64,
    x_tile_offset: i32,
    y_tile_offset: i32,
}

/// `ceil(v - 0.5)`: rounds halves down for both signs.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn ceil_half(v: f64) -> i32 {
    (v - 0.5).ceil() as i32
}

impl CoordinateMapper {
    #[must_use]
    pub fn new(state: &ViewportState) -> Self {
        Self {
            x_zoom: state.x_zoom,
            y_zoom: state.y_zoom,
            x_e_offset: state.x_e_offset,
            y_e_offset: state.y_e_offset,
            x_tile_offset: state.x_tile_offset,
            y_tile_offset: state.y_tile_offset,
        }
    }

    #[must_use]
    pub fn x_zoom(&self) -> f64 {
        self.x_zoom
    }

    #[must_use]
    pub fn y_zoom(&self) -> f64 {
        self.y_zoom
    }

    /// The parameters that determine tile contents.
    ///
    /// Tile offsets are excluded: an integer pan moves tiles on screen
    /// without changing what they show.
    #[must_use]
    pub fn render_params(&self) -> [f64; 4] {
        [self.x_zoom, self.y_zoom, self.x_e_offset, self.y_e_offset]
    }

    #[inline]
    #[must_use]
    pub fn e_to_x_tile(&self, e: f64) -> i32 {
        ceil_half((e + self.x_e_offset) * self.x_zoom)
    }

    #[inline]
    #[must_use]
    pub fn e_to_y_tile(&self, e: f64) -> i32 {
        ceil_half((e - self.y_e_offset) * self.y_zoom)
    }

    #[inline]
    #[must_use]
    pub fn x_tile_to_e(&self, x: i32) -> f64 {
        f64::from(x) / self.x_zoom - self.x_e_offset
    }

    #[inline]
    #[must_use]
    pub fn y_tile_to_e(&self, y: i32) -> f64 {
        f64::from(y) / self.y_zoom + self.y_e_offset
    }

    /// Data point to tile-space pixel.
    #[must_use]
    pub fn data_to_tile(&self, p: LogicalPoint) -> (i32, i32) {
        (self.e_to_x_tile(p.x), self.e_to_y_tile(p.y))
    }

    /// Tile-space pixel to data point.
    #[must_use]
    pub fn tile_to_data(&self, x: i32, y: i32) -> LogicalPoint {
        LogicalPoint::new(self.x_tile_to_e(x), self.y_tile_to_e(y))
    }

    /// Screen pixel to tile-space pixel (flips y).
    #[must_use]
    pub fn screen_to_tile(&self, sx: i32, sy: i32) -> (i32, i32) {
        (
            sx.wrapping_sub(self.x_tile_offset),
            self.y_tile_offset.wrapping_sub(sy),
        )
    }

    /// Tile-space pixel to screen pixel; inverse of [`Self::screen_to_tile`].
    #[must_use]
    pub fn tile_to_screen(&self, tx: i32, ty: i32) -> (i32, i32) {
        (
            tx.wrapping_add(self.x_tile_offset),
            self.y_tile_offset.wrapping_sub(ty),
        )
    }

    #[must_use]
    pub fn screen_to_data(&self, sx: i32, sy: i32) -> LogicalPoint {
        let (tx, ty) = self.screen_to_tile(sx, sy);
        self.tile_to_data(tx, ty)
    }

    #[must_use]
    pub fn data_to_screen(&self, p: LogicalPoint) -> (i32, i32) {
        let (tx, ty) = self.data_to_tile(p);
        self.tile_to_screen(tx, ty)
    }

    /// Screen position of the top-left pixel of a tile.
    ///
    /// Returns `None` if the position does not fit in `i32`.
    #[must_use]
    pub fn tile_screen_origin(&self, id: TileId) -> Option<(i32, i32)> {
        let (ox, oy) = id.origin()?;
        Some((
            ox.checked_add(self.x_tile_offset)?,
            oy.checked_add(self.y_tile_offset)?,
        ))
    }

    /// Ids of all tiles intersecting a screen rectangle.
    #[must_use]
    pub fn tiles_covering(&self, rect: &PixelRect) -> TileRange {
        if rect.is_empty() {
            return TileRange::empty();
        }
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        TileRange {
            x_first: tile_id_of(rect.x.saturating_sub(self.x_tile_offset)),
            x_last: tile_id_of(right.saturating_sub(self.x_tile_offset)),
            y_first: tile_id_of(rect.y.saturating_sub(self.y_tile_offset)),
            y_last: tile_id_of(bottom.saturating_sub(self.y_tile_offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state() -> ViewportState {
        ViewportState {
            x_zoom: 0.512,
            y_zoom: 0.512,
            x_e_offset: 0.0,
            y_e_offset: 1000.0,
            vp_width: 512,
            vp_height: 512,
            ..ViewportState::default()
        }
    }

    #[test]
    fn test_ceil_half_rounding() {
        assert_eq!(ceil_half(0.5), 0);
        assert_eq!(ceil_half(0.51), 1);
        assert_eq!(ceil_half(1.5), 1);
        assert_eq!(ceil_half(-0.5), -1);
        assert_eq!(ceil_half(-0.49), 0);
        assert_eq!(ceil_half(-1.5), -2);
    }

    #[test]
    fn test_y_axis_inverted() {
        let m = state().mapper();
        let top = m.screen_to_data(0, 0);
        let below = m.screen_to_data(0, 100);
        assert_relative_eq!(top.y, 1000.0);
        assert!(below.y < top.y);
    }

    #[test]
    fn test_data_tile_inverse_on_pixel_grid() {
        let m = state().mapper();
        for x in -300..300 {
            let p = m.tile_to_data(x, -x);
            assert_eq!(m.data_to_tile(p), (x, -x));
        }
    }

    #[test]
    fn test_validate_rejects_bad_zoom() {
        let mut s = state();
        s.x_zoom = 0.0;
        assert!(matches!(s.validate(), Err(Error::InvalidGeometry(_))));
        s.x_zoom = f64::NAN;
        assert!(s.validate().is_err());
        assert!(state().validate().is_ok());
    }

    #[test]
    fn test_visible_tiles() {
        let mut s = state();
        assert_eq!(
            s.visible_tiles(),
            TileRange {
                x_first: 0,
                x_last: 3,
                y_first: 0,
                y_last: 3
            }
        );
        s.x_tile_offset = 1;
        s.y_tile_offset = -1;
        let range = s.visible_tiles();
        assert_eq!((range.x_first, range.x_last), (-1, 3));
        assert_eq!((range.y_first, range.y_last), (0, 4));
    }
}
