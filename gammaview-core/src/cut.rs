//! Polygonal cuts (2D gates) in data coordinates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, LogicalPoint};

/// Minimum number of vertices of a cut polygon.
pub const MIN_CUT_VERTICES: usize = 3;

/// A polygonal region of interest.
///
/// With `invert_axes` set the polygon was defined on the transposed matrix:
/// every vertex is displayed with x and y exchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "CutDef", into = "CutDef")
)]
pub struct Cut {
    vertices: Vec<LogicalPoint>,
    invert_axes: bool,
    bounds: BoundingBox,
}

/// Serialized form of a [`Cut`]; the bounds are derived on load.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct CutDef {
    vertices: Vec<LogicalPoint>,
    #[serde(default)]
    invert_axes: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<CutDef> for Cut {
    type Error = Error;

    fn try_from(def: CutDef) -> Result<Self> {
        Cut::new(def.vertices, def.invert_axes)
    }
}

#[cfg(feature = "serde")]
impl From<Cut> for CutDef {
    fn from(cut: Cut) -> Self {
        CutDef {
            vertices: cut.vertices,
            invert_axes: cut.invert_axes,
        }
    }
}

impl Cut {
    /// Creates a cut from an already parsed polygon.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCut`] for fewer than three vertices or
    /// non-finite coordinates.
    pub fn new(vertices: Vec<LogicalPoint>, invert_axes: bool) -> Result<Self> {
        if vertices.len() < MIN_CUT_VERTICES {
            return Err(Error::InvalidCut(format!(
                "{} vertices, need at least {MIN_CUT_VERTICES}",
                vertices.len()
            )));
        }
        if let Some(p) = vertices.iter().find(|p| !p.is_finite()) {
            return Err(Error::InvalidCut(format!(
                "non-finite vertex ({}, {})",
                p.x, p.y
            )));
        }
        let display = vertices
            .iter()
            .map(|p| if invert_axes { p.swapped() } else { *p });
        let bounds = BoundingBox::enclosing(display)
            .ok_or_else(|| Error::InvalidCut("empty polygon".to_string()))?;
        Ok(Self {
            vertices,
            invert_axes,
            bounds,
        })
    }

    /// Creates a cut from `(x, y)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`Cut::new`].
    pub fn from_pairs(pairs: &[(f64, f64)], invert_axes: bool) -> Result<Self> {
        Self::new(
            pairs.iter().map(|&(x, y)| LogicalPoint::new(x, y)).collect(),
            invert_axes,
        )
    }

    /// Vertices as defined, before any axis inversion.
    #[must_use]
    pub fn vertices(&self) -> &[LogicalPoint] {
        &self.vertices
    }

    #[must_use]
    pub fn invert_axes(&self) -> bool {
        self.invert_axes
    }

    /// Vertices in display orientation.
    pub fn display_vertices(&self) -> impl Iterator<Item = LogicalPoint> + '_ {
        let invert = self.invert_axes;
        self.vertices
            .iter()
            .map(move |p| if invert { p.swapped() } else { *p })
    }

    /// Bounding box in display orientation.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Returns true if `point` (display orientation) lies inside the polygon.
    #[must_use]
    pub fn contains(&self, point: LogicalPoint) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        let vertices: Vec<LogicalPoint> = self.display_vertices().collect();
        point_in_polygon(point, &vertices)
    }

    /// Returns true if two non-adjacent edges of the polygon cross.
    #[must_use]
    pub fn self_intersects(&self) -> bool {
        polygon_self_intersects(&self.vertices)
    }
}

fn point_in_polygon(point: LogicalPoint, vertices: &[LogicalPoint]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (vertices[i], vertices[j]);
        let intersects = ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y + f64::EPSILON) + pi.x);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn polygon_self_intersects(vertices: &[LogicalPoint]) -> bool {
    let n = vertices.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a1 = vertices[i];
        let a2 = vertices[(i + 1) % n];
        for j in (i + 1)..n {
            if shares_endpoint(i, j, n) {
                continue;
            }
            let b1 = vertices[j];
            let b2 = vertices[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

fn shares_endpoint(i: usize, j: usize, n: usize) -> bool {
    i == j || i == (j + 1) % n || j == (i + 1) % n
}

fn segments_intersect(
    a1: LogicalPoint,
    a2: LogicalPoint,
    b1: LogicalPoint,
    b2: LogicalPoint,
) -> bool {
    let d1 = direction(a1, a2, b1);
    let d2 = direction(a1, a2, b2);
    let d3 = direction(b1, b2, a1);
    let d4 = direction(b1, b2, a2);

    if (d1 > 0.0 && d2 < 0.0 || d1 < 0.0 && d2 > 0.0)
        && (d3 > 0.0 && d4 < 0.0 || d3 < 0.0 && d4 > 0.0)
    {
        return true;
    }

    (d1.abs() <= f64::EPSILON && on_segment(a1, a2, b1))
        || (d2.abs() <= f64::EPSILON && on_segment(a1, a2, b2))
        || (d3.abs() <= f64::EPSILON && on_segment(b1, b2, a1))
        || (d4.abs() <= f64::EPSILON && on_segment(b1, b2, a2))
}

fn direction(a: LogicalPoint, b: LogicalPoint, c: LogicalPoint) -> f64 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

fn on_segment(a: LogicalPoint, b: LogicalPoint, c: LogicalPoint) -> bool {
    let min_x = a.x.min(b.x) - f64::EPSILON;
    let max_x = a.x.max(b.x) + f64::EPSILON;
    let min_y = a.y.min(b.y) - f64::EPSILON;
    let max_y = a.y.max(b.y) + f64::EPSILON;
    c.x >= min_x && c.x <= max_x && c.y >= min_y && c.y <= max_y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Cut {
        Cut::from_pairs(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)], false).unwrap()
    }

    #[test]
    fn test_cut_requires_three_vertices() {
        let err = Cut::from_pairs(&[(0.0, 0.0), (1.0, 1.0)], false).unwrap_err();
        assert!(matches!(err, Error::InvalidCut(_)));
        assert!(Cut::from_pairs(&[(0.0, 0.0), (1.0, f64::NAN), (2.0, 0.0)], false).is_err());
    }

    #[test]
    fn test_contains() {
        let cut = square();
        assert!(cut.contains(LogicalPoint::new(5.0, 5.0)));
        assert!(!cut.contains(LogicalPoint::new(15.0, 5.0)));
        assert!(!cut.contains(LogicalPoint::new(5.0, -1.0)));
    }

    #[test]
    fn test_invert_axes_bounds() {
        let cut = Cut::from_pairs(&[(0.0, 100.0), (10.0, 100.0), (10.0, 200.0)], true).unwrap();
        assert_eq!(cut.bounds(), BoundingBox::new(100.0, 0.0, 200.0, 10.0));
        assert!(cut.contains(LogicalPoint::new(150.0, 8.0)));
        assert!(!cut.contains(LogicalPoint::new(8.0, 150.0)));
        assert_eq!(cut.vertices()[0], LogicalPoint::new(0.0, 100.0));
    }

    #[test]
    fn test_self_intersection() {
        assert!(!square().self_intersects());
        let bowtie =
            Cut::from_pairs(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)], false).unwrap();
        assert!(bowtie.self_intersects());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let cut: Cut = serde_json::from_str(
            r#"{ "vertices": [{"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 10, "y": 10}, {"x": 0, "y": 10}],
                 "bounds": {"x1": 500, "y1": 500, "x2": 501, "y2": 501} }"#,
        )
        .unwrap();
        assert_eq!(cut, square());
        assert!(cut.contains(LogicalPoint::new(5.0, 5.0)));

        assert!(serde_json::from_str::<Cut>(r#"{ "vertices": [] }"#).is_err());
        assert!(serde_json::from_str::<Cut>(
            r#"{ "vertices": [{"x": 0, "y": 0}, {"x": 1, "y": 1}] }"#
        )
        .is_err());

        let json = serde_json::to_string(&square()).unwrap();
        assert!(!json.contains("bounds"));
        assert_eq!(serde_json::from_str::<Cut>(&json).unwrap(), square());
    }
}
