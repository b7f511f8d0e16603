//! 2D histogram data sources.
//!
//! The display only needs bin lookup by index, the axis binning and the
//! maximum content. [`DenseMatrix`] is a row-major in-memory implementation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, LogicalPoint};
use crate::util::{f64_to_usize_bounded, usize_to_f64};

/// Equidistant binning of one matrix axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Axis {
    min: f64,
    max: f64,
    bins: usize,
}

impl Axis {
    /// Creates an axis with `bins` bins covering `[min, max)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSourceUnavailable`] for zero bins or an empty or
    /// non-finite range.
    pub fn new(min: f64, max: f64, bins: usize) -> Result<Self> {
        let axis = Self { min, max, bins };
        if axis.is_valid() {
            Ok(axis)
        } else {
            Err(Error::DataSourceUnavailable(format!(
                "invalid axis: {bins} bins over [{min}, {max})"
            )))
        }
    }

    /// Returns true if the axis has bins and a finite, non-empty range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.bins > 0 && self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    #[must_use]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / usize_to_f64(self.bins)
    }

    /// Bin containing `e`, or `None` outside the axis range.
    #[must_use]
    pub fn find_bin(&self, e: f64) -> Option<usize> {
        f64_to_usize_bounded((e - self.min) / self.bin_width(), self.bins)
    }

    /// Center of bin `bin` in data units.
    #[must_use]
    pub fn bin_center(&self, bin: usize) -> f64 {
        self.min + (usize_to_f64(bin) + 0.5) * self.bin_width()
    }
}

/// A 2D histogram queryable by bin coordinate.
pub trait MatrixSource {
    /// Binning along x.
    fn x_axis(&self) -> Axis;

    /// Binning along y.
    fn y_axis(&self) -> Axis;

    /// Content of bin `(bx, by)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSourceUnavailable`] if the bin cannot be read.
    fn bin_content(&self, bx: usize, by: usize) -> Result<f64>;

    /// Largest bin content, used for the default z-range.
    fn maximum(&self) -> f64;

    /// Data-coordinate rectangle covered by the matrix.
    fn domain(&self) -> BoundingBox {
        let (x, y) = (self.x_axis(), self.y_axis());
        BoundingBox::new(x.min(), y.min(), x.max(), y.max())
    }

    /// Content of the bin containing `p`, or `None` outside the matrix.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`MatrixSource::bin_content`].
    fn value_at(&self, p: LogicalPoint) -> Result<Option<f64>> {
        match (self.x_axis().find_bin(p.x), self.y_axis().find_bin(p.y)) {
            (Some(bx), Some(by)) => self.bin_content(bx, by).map(Some),
            _ => Ok(None),
        }
    }
}

/// A 2D histogram storing bin contents in row-major order.
///
/// Data is stored as `data[by * x_bins + bx]`.
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    data: Vec<f64>,
    x_axis: Axis,
    y_axis: Axis,
}

impl DenseMatrix {
    /// Create an empty matrix with the given binning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSourceUnavailable`] if an axis is invalid.
    pub fn new(x_axis: Axis, y_axis: Axis) -> Result<Self> {
        if !x_axis.is_valid() || !y_axis.is_valid() {
            return Err(Error::DataSourceUnavailable(
                "matrix axes must have bins and a finite range".to_string(),
            ));
        }
        let len = x_axis
            .bins()
            .checked_mul(y_axis.bins())
            .ok_or_else(|| Error::DataSourceUnavailable("matrix too large".to_string()))?;
        Ok(Self {
            data: vec![0.0; len],
            x_axis,
            y_axis,
        })
    }

    /// Build a matrix by evaluating `f` at every bin center.
    ///
    /// # Errors
    ///
    /// Same as [`DenseMatrix::new`].
    pub fn from_fn<F>(x_axis: Axis, y_axis: Axis, mut f: F) -> Result<Self>
    where
        F: FnMut(f64, f64) -> f64,
    {
        let mut matrix = Self::new(x_axis, y_axis)?;
        for by in 0..y_axis.bins() {
            let ey = y_axis.bin_center(by);
            for bx in 0..x_axis.bins() {
                matrix.data[by * x_axis.bins() + bx] = f(x_axis.bin_center(bx), ey);
            }
        }
        Ok(matrix)
    }

    /// Get the content of a bin.
    #[must_use]
    #[inline]
    pub fn get(&self, bx: usize, by: usize) -> Option<f64> {
        if bx < self.x_axis.bins() && by < self.y_axis.bins() {
            Some(self.data[by * self.x_axis.bins() + bx])
        } else {
            None
        }
    }

    /// Sum of all bin contents.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

impl MatrixSource for DenseMatrix {
    fn x_axis(&self) -> Axis {
        self.x_axis
    }

    fn y_axis(&self) -> Axis {
        self.y_axis
    }

    fn bin_content(&self, bx: usize, by: usize) -> Result<f64> {
        self.get(bx, by).ok_or_else(|| {
            Error::DataSourceUnavailable(format!("bin ({bx}, {by}) outside matrix"))
        })
    }

    fn maximum(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }
}
