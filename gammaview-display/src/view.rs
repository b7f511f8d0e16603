//! The matrix view: controller, tile cache and overlays behind one facade.

use gammaview_core::{
    Colormap, CoordinateMapper, Cut, Error, MatrixSource, Result, TileRange, ZScale,
};

use crate::cache::{CacheStats, RenderContext, TileCache};
use crate::config::ViewConfig;
use crate::controller::{CutEdit, Response, ViewChange, ViewportController};
use crate::event::Event;
use crate::marker::{Marker, MarkerAxis};
use crate::overlay::{CutId, DisplayCut, OverlayRenderer};
use crate::raster::{DrawingSurface, Raster};
use crate::status::{Readout, StatusSink};
use crate::style::{palette_color, LineStyle, MarkerStyles, Rgba, StyleId, StyleRegistry};

/// Shown in place of a tile that failed to render.
const PLACEHOLDER: Rgba = [48, 48, 48, 255];

/// Render inputs other than the viewport state.
struct Scene {
    source: Option<Box<dyn MatrixSource>>,
    cuts: Vec<DisplayCut>,
    markers: Vec<Marker>,
    zoom_markers: Vec<Marker>,
    styles: StyleRegistry,
    colormap: Colormap,
    overlay_generation: u64,
    next_cut: usize,
}

impl Scene {
    fn context(&self, mapper: CoordinateMapper, z_scale: ZScale) -> RenderContext<'_> {
        RenderContext {
            mapper,
            z_scale,
            colormap: self.colormap,
            source: self.source.as_deref(),
            cuts: &self.cuts,
            markers: &self.markers,
            zoom_markers: &self.zoom_markers,
            styles: &self.styles,
            overlay_generation: self.overlay_generation,
        }
    }

    fn touch_overlays(&mut self) {
        self.overlay_generation = self.overlay_generation.wrapping_add(1);
    }
}

/// Tiles drawn by one [`View2D::do_redraw`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawStats {
    pub tiles: usize,
    /// Tiles replaced by the placeholder after a render failure.
    pub placeholders: usize,
}

/// A tiled, zoomable view of one matrix.
pub struct View2D {
    config: ViewConfig,
    controller: ViewportController,
    cache: TileCache,
    scene: Scene,
    draft_style: StyleId,
    marker_styles: MarkerStyles,
    zoom_marker_styles: MarkerStyles,
    status: Option<Box<dyn StatusSink>>,
}

impl View2D {
    /// Create a view without data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `config` does not validate.
    pub fn new(config: ViewConfig) -> Result<Self> {
        config.validate()?;
        let mut styles = StyleRegistry::new();
        let draft_style = styles.register(config.draft_style);
        let marker_styles = styles.marker_styles(config.marker_color);
        let zoom_marker_styles = styles.marker_styles(config.zoom_marker_color);
        Ok(Self {
            controller: ViewportController::new(&config),
            cache: TileCache::new(),
            scene: Scene {
                source: None,
                cuts: Vec::new(),
                markers: Vec::new(),
                zoom_markers: Vec::new(),
                styles,
                colormap: config.colormap,
                overlay_generation: 0,
                next_cut: 0,
            },
            draft_style,
            marker_styles,
            zoom_marker_styles,
            status: None,
            config,
        })
    }

    pub fn set_status_sink(&mut self, sink: Box<dyn StatusSink>) {
        self.status = Some(sink);
    }

    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    #[must_use]
    pub fn mapper(&self) -> CoordinateMapper {
        self.controller.mapper()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of cached tiles.
    #[must_use]
    pub fn cached_tiles(&self) -> usize {
        self.cache.len()
    }

    /// Attach a matrix, fit it into the viewport and scale to its maximum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSourceUnavailable`] or
    /// [`Error::InvalidGeometry`] for unusable axes; the previous matrix is
    /// kept in that case.
    pub fn set_matrix(&mut self, source: Box<dyn MatrixSource>) -> Result<()> {
        let (x, y) = (source.x_axis(), source.y_axis());
        if !x.is_valid() || !y.is_valid() {
            return Err(Error::DataSourceUnavailable(
                "matrix axes are inconsistent".to_string(),
            ));
        }
        let mut controller = self.controller.clone();
        controller.set_domain(source.domain())?;
        controller.auto_z_range(source.maximum())?;
        controller.zoom_full()?;
        self.controller = controller;
        log::info!(
            "attached {}x{} matrix, maximum {}",
            x.bins(),
            y.bins(),
            source.maximum()
        );
        self.scene.source = Some(source);
        self.flush_tiles();
        Ok(())
    }

    /// Resize for a window of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if the borders leave no viewport.
    pub fn layout(&mut self, width: i32, height: i32) -> Result<ViewChange> {
        let change = self.controller.layout(width, height)?;
        self.apply(change);
        Ok(change)
    }

    /// Drop tiles that left the viewport and refresh the status line.
    pub fn update(&mut self) -> TileRange {
        let visible = self.controller.visible_tiles();
        self.cache.weed_tiles(&visible);
        self.update_status_bar();
        visible
    }

    /// # Errors
    ///
    /// See [`ViewportController::zoom_full`].
    pub fn zoom_full(&mut self) -> Result<ViewChange> {
        let change = self.controller.zoom_full()?;
        self.apply(change);
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::zoom_around_cursor`].
    pub fn zoom_around_cursor(&mut self, fx: f64, fy: f64) -> Result<ViewChange> {
        let change = self.controller.zoom_around_cursor(fx, fy)?;
        self.apply(change);
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::shift_offset`].
    pub fn shift_offset(&mut self, dx: i32, dy: i32) -> Result<ViewChange> {
        let change = self.controller.shift_offset(dx, dy)?;
        self.apply(change);
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::view_region`].
    pub fn view_region(&mut self, axis: MarkerAxis, start: f64, end: f64) -> Result<ViewChange> {
        let change = self.controller.view_region(axis, start, end)?;
        self.apply(change);
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::center_on`].
    pub fn center_on(&mut self, axis: MarkerAxis, pos: f64) -> Result<ViewChange> {
        let change = self.controller.center_on(axis, pos)?;
        self.apply(change);
        Ok(change)
    }

    /// Show `go_to_width` data units along `axis` centered on `pos`.
    ///
    /// # Errors
    ///
    /// See [`ViewportController::go_to`].
    pub fn go_to(&mut self, axis: MarkerAxis, pos: f64) -> Result<ViewChange> {
        let change = self.controller.go_to(axis, pos, self.config.go_to_width)?;
        self.apply(change);
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::set_zoom_marker`].
    pub fn set_zoom_marker(&mut self, axis: MarkerAxis, pos: f64) -> Result<()> {
        self.controller.set_zoom_marker(axis, pos)?;
        self.sync_zoom_markers();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ViewportController::expand`].
    pub fn expand(&mut self, axis: MarkerAxis) -> Result<ViewChange> {
        let change = self.controller.expand(axis)?;
        self.apply(change);
        self.sync_zoom_markers();
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::expand_all`].
    pub fn expand_all(&mut self) -> Result<ViewChange> {
        let change = self.controller.expand_all()?;
        self.apply(change);
        self.sync_zoom_markers();
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::set_log_scale`].
    pub fn set_log_scale(&mut self, log_scale: bool) -> Result<ViewChange> {
        let change = self.controller.set_log_scale(log_scale)?;
        self.apply(change);
        Ok(change)
    }

    /// # Errors
    ///
    /// See [`ViewportController::set_z_range`].
    pub fn set_z_range(&mut self, offset: f64, visible: f64) -> Result<ViewChange> {
        let change = self.controller.set_z_range(offset, visible)?;
        self.apply(change);
        Ok(change)
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        if self.scene.colormap != colormap {
            self.scene.colormap = colormap;
            self.flush_tiles();
        }
    }

    /// Add a cut drawn with the configured style, or the next palette color.
    pub fn add_cut(&mut self, cut: Cut) -> CutId {
        let style = self
            .config
            .cut_style
            .unwrap_or_else(|| LineStyle::solid(palette_color(self.scene.next_cut)));
        self.add_cut_with_style(cut, style)
    }

    pub fn add_cut_with_style(&mut self, cut: Cut, style: LineStyle) -> CutId {
        let id = CutId(self.scene.next_cut);
        self.scene.next_cut += 1;
        let style = self.scene.styles.register(style);
        log::info!("added cut {id} with {} vertices", cut.vertices().len());
        self.scene.cuts.push(DisplayCut { id, cut, style });
        self.scene.touch_overlays();
        id
    }

    /// Remove one cut; returns false for an unknown id.
    pub fn remove_cut(&mut self, id: CutId) -> bool {
        let before = self.scene.cuts.len();
        self.scene.cuts.retain(|c| c.id != id);
        let removed = self.scene.cuts.len() != before;
        if removed {
            self.scene.touch_overlays();
        }
        removed
    }

    /// Remove all cuts; returns how many there were.
    pub fn delete_all_cuts(&mut self) -> usize {
        let n = self.scene.cuts.len();
        if n > 0 {
            self.scene.cuts.clear();
            self.scene.touch_overlays();
        }
        n
    }

    #[must_use]
    pub fn cuts(&self) -> &[DisplayCut] {
        &self.scene.cuts
    }

    /// Add a marker in the configured marker color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for a non-finite position; no
    /// marker is added then.
    pub fn add_marker(&mut self, axis: MarkerAxis, p1: f64, p2: Option<f64>) -> Result<()> {
        let marker = Marker::new(axis, p1, p2, self.marker_styles)?;
        self.push_marker(marker);
        Ok(())
    }

    /// Add a marker with its own styles.
    pub fn push_marker(&mut self, marker: Marker) {
        self.scene.markers.push(marker);
        self.scene.touch_overlays();
    }

    /// Solid and dashed styles of one color, for [`Self::push_marker`].
    pub fn marker_styles(&mut self, color: Rgba) -> MarkerStyles {
        self.scene.styles.marker_styles(color)
    }

    pub fn clear_markers(&mut self) {
        if !self.scene.markers.is_empty() {
            self.scene.markers.clear();
            self.scene.touch_overlays();
        }
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.scene.markers
    }

    /// Tile `(x, y)` as currently rendered.
    ///
    /// # Errors
    ///
    /// See [`TileCache::get_tile`].
    pub fn get_tile(&mut self, x: i32, y: i32) -> Result<&Raster> {
        let ctx = self
            .scene
            .context(self.controller.mapper(), self.controller.state().z_scale);
        self.cache.get_tile(x, y, &ctx)
    }

    pub fn flush_tiles(&mut self) -> usize {
        self.cache.flush_tiles()
    }

    pub fn weed_tiles(&mut self) -> usize {
        let visible = self.controller.visible_tiles();
        self.cache.weed_tiles(&visible)
    }

    /// Compose the visible tiles and the cut draft onto `surface`.
    ///
    /// A tile that fails to render is logged and shown as a placeholder; the
    /// failure is not cached.
    pub fn do_redraw<S>(&mut self, surface: &mut S) -> RedrawStats
    where
        S: DrawingSurface + ?Sized,
    {
        let mapper = self.controller.mapper();
        let state = *self.controller.state();
        let clip = state.viewport_rect();
        let visible = self.controller.visible_tiles();
        self.cache.weed_tiles(&visible);

        let ctx = self.scene.context(mapper, state.z_scale);
        let mut stats = RedrawStats::default();
        let mut placeholder: Option<Raster> = None;
        for id in visible.iter() {
            let Some((sx, sy)) = mapper.tile_screen_origin(id) else {
                continue;
            };
            match self.cache.get_tile(id.x(), id.y(), &ctx) {
                Ok(tile) => {
                    surface.draw_tile(tile, sx, sy, clip);
                    stats.tiles += 1;
                }
                Err(e) => {
                    log::warn!("tile {id} failed to render: {e}");
                    if placeholder.is_none() {
                        placeholder = Raster::tile(PLACEHOLDER).ok();
                    }
                    if let Some(tile) = &placeholder {
                        surface.draw_tile(tile, sx, sy, clip);
                    }
                    stats.placeholders += 1;
                }
            }
        }

        if self.controller.cut_mode() && !self.controller.draft().is_empty() {
            let mut vertices = self.controller.draft().to_vec();
            if let Some((cx, cy)) = self.controller.cursor() {
                vertices.push(mapper.screen_to_data(cx, cy));
            }
            OverlayRenderer::new(mapper, &self.scene.styles).render_screen_polyline(
                &vertices,
                self.draft_style,
                clip,
                surface,
            );
        }
        stats
    }

    /// Feed one window event; returns true if the view needs a redraw.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let response = self.controller.handle_event(event);
        let redraw = match response {
            Response::Ignored | Response::Consumed | Response::Rejected(_) => false,
            Response::View(change) => {
                self.apply(change);
                change != ViewChange::Unchanged
            }
            Response::Cut(CutEdit::Committed(cut)) => {
                self.add_cut(cut);
                true
            }
            Response::Cut(CutEdit::DraftChanged | CutEdit::Cancelled) => true,
        };
        let redraw = self.sync_zoom_markers() || redraw;
        self.update_status_bar();
        redraw
    }

    /// Bin content under screen pixel `(sx, sy)`, `None` outside the matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSourceUnavailable`] without a matrix or if the
    /// bin cannot be read.
    pub fn value_at_pixel(&self, sx: i32, sy: i32) -> Result<Option<f64>> {
        let source = self
            .scene
            .source
            .as_deref()
            .ok_or_else(|| Error::DataSourceUnavailable("no matrix attached".to_string()))?;
        source.value_at(self.mapper().screen_to_data(sx, sy))
    }

    /// Data under the cursor; `None` while the pointer is outside the view.
    #[must_use]
    pub fn readout(&self) -> Option<Readout> {
        let (sx, sy) = self.controller.cursor()?;
        let point = self.mapper().screen_to_data(sx, sy);
        let value = self.value_at_pixel(sx, sy).ok().flatten();
        let cuts = self
            .scene
            .cuts
            .iter()
            .filter(|c| c.cut.contains(point))
            .map(|c| c.id)
            .collect();
        Some(Readout { point, value, cuts })
    }

    /// Push the current readout (or an empty line) to the status sink.
    pub fn update_status_bar(&mut self) {
        let text = self.readout().map(|r| r.to_string()).unwrap_or_default();
        if let Some(sink) = self.status.as_mut() {
            sink.set_status(&text);
        }
    }

    /// Mirror the controller's zoom markers into the overlays; returns true
    /// if they changed.
    fn sync_zoom_markers(&mut self) -> bool {
        let styles = self.zoom_marker_styles;
        let markers: Vec<Marker> = [MarkerAxis::X, MarkerAxis::Y]
            .into_iter()
            .filter_map(|axis| {
                let zm = self.controller.zoom_marker(axis)?;
                Marker::new(axis, zm.p1, zm.p2, styles)
                    .ok()
                    .map(|m| m.with_dash(true, true))
            })
            .collect();
        if markers == self.scene.zoom_markers {
            return false;
        }
        self.scene.zoom_markers = markers;
        self.scene.touch_overlays();
        true
    }

    fn apply(&mut self, change: ViewChange) {
        match change {
            ViewChange::Unchanged => {}
            ViewChange::Panned | ViewChange::Resized => {
                self.weed_tiles();
            }
            ViewChange::Rescaled | ViewChange::ZScale => {
                self.flush_tiles();
            }
        }
    }
}

impl std::fmt::Debug for View2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View2D")
            .field("state", self.controller.state())
            .field("cached_tiles", &self.cache.len())
            .field("cuts", &self.scene.cuts.len())
            .field("markers", &self.scene.markers.len())
            .finish_non_exhaustive()
    }
}
