//! Position markers drawn across the matrix.

use gammaview_core::{Error, Result};

use crate::style::{MarkerStyles, StyleId};

/// Axis a marker position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAxis {
    /// Vertical line(s) at data x positions.
    X,
    /// Horizontal line(s) at data y positions.
    Y,
}

/// A single position or a region between two positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    axis: MarkerAxis,
    p1: f64,
    p2: Option<f64>,
    dash1: bool,
    dash2: bool,
    styles: MarkerStyles,
}

impl Marker {
    /// Creates a marker at `p1`, or a region from `p1` to `p2`.
    ///
    /// Two positions are stored ordered so that `p1 <= p2`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for a non-finite position.
    pub fn new(axis: MarkerAxis, p1: f64, p2: Option<f64>, styles: MarkerStyles) -> Result<Self> {
        if let Some(p) = std::iter::once(p1).chain(p2).find(|p| !p.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "marker position {p} is not finite"
            )));
        }
        let (p1, p2) = match p2 {
            Some(p2) if p2 < p1 => (p2, Some(p1)),
            _ => (p1, p2),
        };
        Ok(Self {
            axis,
            p1,
            p2,
            dash1: false,
            dash2: false,
            styles,
        })
    }

    /// Single-position marker.
    ///
    /// # Errors
    ///
    /// Same as [`Marker::new`].
    pub fn single(axis: MarkerAxis, p: f64, styles: MarkerStyles) -> Result<Self> {
        Self::new(axis, p, None, styles)
    }

    /// Region marker between two positions.
    ///
    /// # Errors
    ///
    /// Same as [`Marker::new`].
    pub fn region(axis: MarkerAxis, p1: f64, p2: f64, styles: MarkerStyles) -> Result<Self> {
        Self::new(axis, p1, Some(p2), styles)
    }

    /// Select dashed lines for the first and second edge.
    #[must_use]
    pub fn with_dash(mut self, dash1: bool, dash2: bool) -> Self {
        self.dash1 = dash1;
        self.dash2 = dash2;
        self
    }

    #[must_use]
    pub fn axis(&self) -> MarkerAxis {
        self.axis
    }

    #[must_use]
    pub fn p1(&self) -> f64 {
        self.p1
    }

    /// Second position of a region marker.
    #[must_use]
    pub fn p2(&self) -> Option<f64> {
        self.p2
    }

    /// Positions with the style to draw each of them in.
    #[must_use]
    pub fn edges(&self) -> Vec<(f64, StyleId)> {
        let style = |dash: bool| {
            if dash {
                self.styles.dashed
            } else {
                self.styles.solid
            }
        };
        let mut edges = vec![(self.p1, style(self.dash1))];
        if let Some(p2) = self.p2 {
            edges.push((p2, style(self.dash2)));
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleRegistry;

    fn green() -> MarkerStyles {
        StyleRegistry::new().marker_styles([0, 255, 0, 255])
    }

    #[test]
    fn test_region_is_ordered() {
        let m = Marker::region(MarkerAxis::X, 20.0, 10.0, green()).unwrap();
        assert_eq!((m.p1(), m.p2()), (10.0, Some(20.0)));
        let single = Marker::single(MarkerAxis::Y, 20.0, green()).unwrap();
        assert_eq!((single.p1(), single.p2()), (20.0, None));
        assert_eq!(single.edges().len(), 1);
    }

    #[test]
    fn test_edges_use_dash_styles() {
        let styles = green();
        let m = Marker::region(MarkerAxis::X, 1.0, 2.0, styles)
            .unwrap()
            .with_dash(false, true);
        assert_eq!(m.edges(), vec![(1.0, styles.solid), (2.0, styles.dashed)]);
    }

    #[test]
    fn test_non_finite_position_rejected() {
        for p in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Marker::single(MarkerAxis::X, p, green()).unwrap_err();
            assert!(matches!(err, Error::InvalidGeometry(_)));
            assert!(Marker::region(MarkerAxis::Y, 1.0, p, green()).is_err());
        }
    }
}
