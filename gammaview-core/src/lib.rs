//! gammaview-core: Core types for tiled 2D gamma-gamma matrix display.
//!
//! This crate provides the coordinate mapping between data, tile and screen
//! space, the color ramps, polygonal cuts and the histogram source
//! abstraction used by the display crate.
//!

pub mod colormap;
pub mod cut;
pub mod error;
pub mod geometry;
pub mod mapper;
pub mod matrix;
pub mod util;

pub use colormap::{log_compress, Colormap, ZScale, Z_COLOR_RANGE};
pub use cut::{Cut, MIN_CUT_VERTICES};
pub use error::{Error, Result};
pub use geometry::{
    tile_id_of, BoundingBox, LogicalPoint, PixelRect, TileId, TileRange, TILE_SIZE,
};
pub use mapper::{Borders, CoordinateMapper, ViewportState};
pub use matrix::{Axis, DenseMatrix, MatrixSource};
