//! RGBA raster buffers and the drawing-surface abstraction.
//!
//! Tiles and headless frame buffers are both [`Raster`]s. A raster owns its
//! pixel memory; dropping it releases the buffer.

use gammaview_core::{Error, PixelRect, Result, TILE_SIZE};
use image::{Rgba, RgbaImage};

use crate::style::{LineStyle, Rgba as Color};

/// Color of pixels not covered by any bin.
pub const BACKGROUND: Color = [0, 0, 0, 255];

/// Target for tile composition and overlay drawing.
pub trait DrawingSurface {
    /// Copy `tile` with its top-left corner at `(x, y)`, restricted to `clip`.
    fn draw_tile(&mut self, tile: &Raster, x: i32, y: i32, clip: PixelRect);

    /// Draw connected line segments through `points`, restricted to `clip`.
    fn draw_polyline(&mut self, points: &[(i32, i32)], style: &LineStyle, clip: PixelRect);
}

/// An owned RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Allocate a raster filled with `fill`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhaustion`] if the buffer cannot be
    /// allocated.
    pub fn try_new(width: u32, height: u32, fill: Color) -> Result<Self> {
        let exhausted = |bytes| Error::ResourceExhaustion {
            bytes,
            width,
            height,
        };
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| exhausted(usize::MAX))?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes)
            .map_err(|_| exhausted(bytes))?;
        buf.resize(bytes, 0);
        for px in buf.chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
        let image = RgbaImage::from_raw(width, height, buf).ok_or_else(|| exhausted(bytes))?;
        Ok(Self { image })
    }

    /// Allocate one `TILE_SIZE x TILE_SIZE` tile.
    ///
    /// # Errors
    ///
    /// Same as [`Raster::try_new`].
    #[allow(clippy::cast_sign_loss)]
    pub fn tile(fill: Color) -> Result<Self> {
        Self::try_new(TILE_SIZE as u32, TILE_SIZE as u32, fill)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The whole raster as a rectangle at the origin.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    /// Pixel at `(x, y)`, `None` outside the raster.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Set a pixel; coordinates outside the raster are ignored.
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Color) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x < self.width() && y < self.height() {
            self.image.put_pixel(x, y, Rgba(color));
        }
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, color: Color) {
        for px in self.image.pixels_mut() {
            *px = Rgba(color);
        }
    }

    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Rasterize one segment, restricted to `clip`.
    ///
    /// Pixel `k` of the segment depends only on its endpoints, never on the
    /// clip window, so pieces drawn into neighboring tiles join without
    /// seams. `phase` is the dash position of `a`; returns the phase after
    /// `b`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn draw_segment(
        &mut self,
        a: (i32, i32),
        b: (i32, i32),
        style: &LineStyle,
        phase: u64,
        skip_first: bool,
        clip: PixelRect,
    ) -> u64 {
        let (dx, dy) = (
            i64::from(b.0) - i64::from(a.0),
            i64::from(b.1) - i64::from(a.1),
        );
        let length = dx.abs().max(dy.abs());
        let end = phase + length as u64;

        let window = (
            f64::from(clip.x) - 1.0,
            f64::from(clip.right()),
            f64::from(clip.y) - 1.0,
            f64::from(clip.bottom()),
        );
        let from = (f64::from(a.0), f64::from(a.1));
        let to = (f64::from(b.0), f64::from(b.1));
        let Some((t0, t1)) = clip_segment(from, to, window) else {
            return end;
        };

        // One step of slack on each side covers rounding of t0 and t1.
        let first = ((t0 * length as f64).floor() as i64 - 1).max(0);
        let last = ((t1 * length as f64).ceil() as i64 + 1).min(length);
        for k in first..=last {
            if (skip_first && k == 0) || !style.pattern.is_on(phase + k as u64) {
                continue;
            }
            let (x, y) = segment_point(a, dx, dy, length, k);
            let inside = match (i32::try_from(x), i32::try_from(y)) {
                (Ok(x), Ok(y)) => clip.contains(x, y),
                _ => false,
            };
            if inside {
                self.put_pixel(x, y, style.color);
            }
        }
        end
    }
}

impl DrawingSurface for Raster {
    #[allow(clippy::cast_sign_loss)]
    fn draw_tile(&mut self, tile: &Raster, x: i32, y: i32, clip: PixelRect) {
        let placed = PixelRect::new(x, y, tile.bounds().width, tile.bounds().height);
        let dest = placed.intersect(&clip).intersect(&self.bounds());
        if dest.is_empty() {
            return;
        }
        let src_width = tile.width() as usize;
        let dst_width = self.width() as usize;
        let len = dest.width as usize * 4;
        let src: &[u8] = tile.image.as_raw();
        let dst: &mut [u8] = &mut self.image;
        for row in dest.y..dest.bottom() {
            let s = (((row - y) as usize) * src_width + (dest.x - x) as usize) * 4;
            let d = ((row as usize) * dst_width + dest.x as usize) * 4;
            dst[d..d + len].copy_from_slice(&src[s..s + len]);
        }
    }

    fn draw_polyline(&mut self, points: &[(i32, i32)], style: &LineStyle, clip: PixelRect) {
        let clip = clip.intersect(&self.bounds());
        if clip.is_empty() {
            return;
        }
        match points {
            [] => {}
            [p] => {
                if style.pattern.is_on(0) && clip.contains(p.0, p.1) {
                    self.put_pixel(i64::from(p.0), i64::from(p.1), style.color);
                }
            }
            _ => {
                let mut phase = 0;
                for (i, pair) in points.windows(2).enumerate() {
                    phase = self.draw_segment(pair[0], pair[1], style, phase, i > 0, clip);
                }
            }
        }
    }
}

/// Pixel `k` steps from `a` along the segment `a -> a + (dx, dy)`.
///
/// The major axis advances one pixel per step; the minor axis is the exact
/// rational position rounded half up.
#[allow(clippy::cast_possible_truncation)]
fn segment_point(a: (i32, i32), dx: i64, dy: i64, length: i64, k: i64) -> (i64, i64) {
    if length == 0 {
        return (i64::from(a.0), i64::from(a.1));
    }
    let n = i128::from(length);
    let offset = |d: i64| {
        let num = 2 * i128::from(k) * i128::from(d.abs()) + n;
        d.signum() * (num / (2 * n)) as i64
    };
    (i64::from(a.0) + offset(dx), i64::from(a.1) + offset(dy))
}

/// Liang-Barsky clipping of `p0 -> p1` against `(xmin, xmax, ymin, ymax)`.
///
/// Returns the parameter interval `[t0, t1]` inside the box.
fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    (xmin, xmax, ymin, ymax): (f64, f64, f64, f64),
) -> Option<(f64, f64)> {
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, p0.0 - xmin),
        (dx, xmax - p0.0),
        (-dy, p0.1 - ymin),
        (dy, ymax - p0.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];

    fn count(raster: &Raster, color: Color) -> usize {
        raster.as_image().pixels().filter(|p| p.0 == color).count()
    }

    #[test]
    fn test_tile_allocation() {
        let tile = Raster::tile(BACKGROUND).unwrap();
        assert_eq!((tile.width(), tile.height()), (128, 128));
        assert_eq!(tile.pixel(127, 127), Some(BACKGROUND));
        assert_eq!(tile.pixel(128, 0), None);
        assert_eq!(tile.pixel(-1, 0), None);
    }

    #[test]
    fn test_horizontal_line() {
        let mut r = Raster::try_new(10, 10, BACKGROUND).unwrap();
        r.draw_polyline(&[(1, 2), (8, 2)], &LineStyle::solid(RED), r.bounds());
        assert_eq!(count(&r, RED), 8);
        assert_eq!(r.pixel(1, 2), Some(RED));
        assert_eq!(r.pixel(8, 2), Some(RED));
    }

    #[test]
    fn test_far_segment_is_clipped() {
        let mut r = Raster::try_new(16, 16, BACKGROUND).unwrap();
        let all = r.bounds();
        r.draw_polyline(
            &[(-1_000_000_000, 5), (1_000_000_000, 5)],
            &LineStyle::solid(RED),
            all,
        );
        assert_eq!(count(&r, RED), 16);
        r.fill(BACKGROUND);
        r.draw_polyline(&[(-50, -50), (-10, -40)], &LineStyle::solid(RED), all);
        assert_eq!(count(&r, RED), 0);
    }

    #[test]
    fn test_dashed_line() {
        let mut r = Raster::try_new(16, 4, BACKGROUND).unwrap();
        let style = LineStyle {
            color: RED,
            pattern: crate::style::LinePattern::Dashed { on: 2, off: 2 },
        };
        r.draw_polyline(&[(0, 1), (15, 1)], &style, r.bounds());
        assert_eq!(count(&r, RED), 8);
        assert_eq!(r.pixel(0, 1), Some(RED));
        assert_eq!(r.pixel(2, 1), Some(BACKGROUND));
    }

    #[test]
    fn test_draw_tile_clipped() {
        let tile = Raster::try_new(4, 4, RED).unwrap();
        let mut frame = Raster::try_new(10, 10, BACKGROUND).unwrap();
        frame.draw_tile(&tile, -2, 8, PixelRect::new(0, 0, 10, 9));
        // Columns 0..2 of row 8 only.
        assert_eq!(count(&frame, RED), 2);
        assert_eq!(frame.pixel(1, 8), Some(RED));
        assert_eq!(frame.pixel(1, 9), Some(BACKGROUND));
    }

    #[test]
    fn test_polyline_respects_clip() {
        let mut r = Raster::try_new(10, 10, BACKGROUND).unwrap();
        r.draw_polyline(&[(0, 0), (9, 9)], &LineStyle::solid(RED), PixelRect::new(2, 2, 6, 6));
        assert_eq!(count(&r, RED), 6);
        assert_eq!(r.pixel(1, 1), Some(BACKGROUND));
        assert_eq!(r.pixel(2, 2), Some(RED));
        assert_eq!(r.pixel(8, 8), Some(BACKGROUND));
    }

    #[test]
    fn test_clipped_pieces_join_without_seams() {
        let style = LineStyle::solid(RED);
        let (a, b) = ((-500, 3), (700, 301));
        let mut full = Raster::try_new(2000, 400, BACKGROUND).unwrap();
        let all = full.bounds();
        full.draw_polyline(&[a, b], &style, all);

        for ox in (0..768).step_by(128) {
            let mut tile = Raster::try_new(128, 400, BACKGROUND).unwrap();
            let bounds = tile.bounds();
            tile.draw_polyline(&[(a.0 - ox, a.1), (b.0 - ox, b.1)], &style, bounds);
            for py in 0..400 {
                for px in 0..128 {
                    assert_eq!(
                        tile.pixel(px, py),
                        full.pixel(ox + px, py),
                        "tile at {ox}, pixel ({px}, {py})"
                    );
                }
            }
        }
    }
}
