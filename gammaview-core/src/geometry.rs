//! Points, tile keys and pixel rectangles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Edge length of a square raster tile, in pixels.
pub const TILE_SIZE: i32 = 128;

/// A point in data ("energy") coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogicalPoint {
    /// X coordinate (data units).
    pub x: f64,
    /// Y coordinate (data units).
    pub y: f64,
}

impl LogicalPoint {
    /// Creates a new logical point.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the point with x and y exchanged.
    #[inline]
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection of two rectangles; empty if they do not overlap.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Self {
            x,
            y,
            width: (right - x).max(0),
            height: (bottom - y).max(0),
        }
    }
}

/// Axis-aligned bounding box in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Creates a box from two corners in any order.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            x2: x1.max(x2),
            y1: y1.min(y2),
            y2: y1.max(y2),
        }
    }

    /// Smallest box enclosing all points; `None` for an empty iterator.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LogicalPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            x1: first.x,
            x2: first.x,
            y1: first.y,
            y2: first.y,
        };
        for p in iter {
            bounds.x1 = bounds.x1.min(p.x);
            bounds.x2 = bounds.x2.max(p.x);
            bounds.y1 = bounds.y1.min(p.y);
            bounds.y2 = bounds.y2.max(p.y);
        }
        Some(bounds)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    #[must_use]
    pub fn contains(&self, p: LogicalPoint) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }
}

/// Calculate `floor(pos / TILE_SIZE)`, also for negative positions.
#[inline]
#[must_use]
pub fn tile_id_of(pos: i32) -> i32 {
    pos.div_euclid(TILE_SIZE)
}

/// Packed (tile x, tile y) key of a cached tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u64);

impl TileId {
    /// Packs tile coordinates into a single key.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn new(x: i32, y: i32) -> Self {
        Self((u64::from(x as u32) << 32) | u64::from(y as u32))
    }

    /// Tile column.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn x(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    /// Tile row (grows downwards on screen).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn y(self) -> i32 {
        self.0 as u32 as i32
    }

    /// Raw packed key.
    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Tile-space column and "down" row of the tile's top-left pixel.
    ///
    /// Returns `None` if the origin does not fit in `i32`.
    #[must_use]
    pub fn origin(self) -> Option<(i32, i32)> {
        Some((
            self.x().checked_mul(TILE_SIZE)?,
            self.y().checked_mul(TILE_SIZE)?,
        ))
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

/// Inclusive rectangle of tile ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRange {
    pub x_first: i32,
    pub x_last: i32,
    pub y_first: i32,
    pub y_last: i32,
}

impl TileRange {
    /// An empty range (contains no tiles).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            x_first: 0,
            x_last: -1,
            y_first: 0,
            y_last: -1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_last < self.x_first || self.y_last < self.y_first
    }

    /// Number of tile columns.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn num_x(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (i64::from(self.x_last) - i64::from(self.x_first) + 1) as usize
        }
    }

    /// Number of tile rows.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn num_y(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (i64::from(self.y_last) - i64::from(self.y_first) + 1) as usize
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.num_x() * self.num_y()
    }

    #[must_use]
    pub fn contains(&self, id: TileId) -> bool {
        (self.x_first..=self.x_last).contains(&id.x())
            && (self.y_first..=self.y_last).contains(&id.y())
    }

    /// Iterates row by row over all ids in the range.
    pub fn iter(&self) -> impl Iterator<Item = TileId> {
        let (x_first, x_last) = (self.x_first, self.x_last);
        (self.y_first..=self.y_last)
            .flat_map(move |y| (x_first..=x_last).map(move |x| TileId::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_id_floor() {
        assert_eq!(tile_id_of(0), 0);
        assert_eq!(tile_id_of(127), 0);
        assert_eq!(tile_id_of(128), 1);
        assert_eq!(tile_id_of(-1), -1);
        assert_eq!(tile_id_of(-128), -1);
        assert_eq!(tile_id_of(-129), -2);
    }

    #[test]
    fn test_tile_id_packing() {
        for &(x, y) in &[(0, 0), (-1, 5), (7, -3), (i32::MIN, i32::MAX)] {
            let id = TileId::new(x, y);
            assert_eq!((id.x(), id.y()), (x, y));
        }
        assert_ne!(TileId::new(1, 0), TileId::new(0, 1));
    }

    #[test]
    fn test_tile_origin_overflow() {
        assert_eq!(TileId::new(-2, 3).origin(), Some((-256, 384)));
        assert_eq!(TileId::new(i32::MAX, 0).origin(), None);
    }

    #[test]
    fn test_tile_range_iter() {
        let range = TileRange {
            x_first: -1,
            x_last: 0,
            y_first: 2,
            y_last: 4,
        };
        assert_eq!(range.len(), 6);
        let ids: Vec<_> = range.iter().collect();
        assert_eq!(ids.len(), 6);
        assert!(ids.iter().all(|id| range.contains(*id)));
        assert!(!range.contains(TileId::new(1, 2)));
        assert!(TileRange::empty().is_empty());
        assert_eq!(TileRange::empty().iter().count(), 0);
    }

    #[test]
    fn test_rect_intersect() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, -5, 10, 10);
        assert_eq!(a.intersect(&b), PixelRect::new(5, 0, 5, 5));
        assert!(a.intersect(&PixelRect::new(20, 20, 2, 2)).is_empty());
    }

    #[test]
    fn test_bounding_box_enclosing() {
        let bounds = BoundingBox::enclosing([
            LogicalPoint::new(3.0, -1.0),
            LogicalPoint::new(-2.0, 4.0),
        ])
        .unwrap();
        assert_eq!(bounds, BoundingBox::new(-2.0, -1.0, 3.0, 4.0));
        assert!(BoundingBox::enclosing(std::iter::empty()).is_none());
    }
}
