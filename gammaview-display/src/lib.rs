//! gammaview-display: Tiled display of 2D gamma-gamma matrices.
//!
//! Rendered tiles are cached per [`TileId`](gammaview_core::TileId) and
//! composited onto any [`DrawingSurface`]. Cuts and markers are drawn into
//! the tiles; the cut being edited is drawn on the surface. [`View2D`] ties
//! the controller, cache and overlays together.
//!

pub mod cache;
pub mod config;
pub mod controller;
pub mod event;
pub mod marker;
pub mod overlay;
pub mod raster;
pub mod status;
pub mod style;
pub mod view;

pub use cache::{CacheStats, RenderContext, TileCache};
pub use config::ViewConfig;
pub use controller::{CutEdit, Response, ViewChange, ViewportController, ZoomMarker};
pub use event::{ButtonKind, CrossingKind, Event, Key, Modifiers, MouseButton};
pub use marker::{Marker, MarkerAxis};
pub use overlay::{CutId, DisplayCut, OverlayRenderer};
pub use raster::{DrawingSurface, Raster, BACKGROUND};
pub use status::{Readout, StatusLine, StatusSink};
pub use style::{palette_color, LinePattern, LineStyle, MarkerStyles, Rgba, StyleId, StyleRegistry};
pub use view::{RedrawStats, View2D};
