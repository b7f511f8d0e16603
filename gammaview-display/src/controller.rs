//! Viewport state transitions: layout, zoom, pan, z-range and events.
//!
//! Every operation builds a candidate [`ViewportState`], validates it and
//! only then replaces the current state. A rejected operation leaves the
//! view exactly as it was.

use gammaview_core::{
    BoundingBox, CoordinateMapper, Cut, Error, LogicalPoint, Result, TileRange, ViewportState,
    ZScale,
};

use crate::config::ViewConfig;
use crate::event::{ButtonKind, CrossingKind, Event, Key, Modifiers, MouseButton};
use crate::marker::MarkerAxis;

/// What an accepted operation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    Unchanged,
    /// Tile offsets moved; cached tiles stay valid.
    Panned,
    /// Zoom or logical offsets changed; all tiles are stale.
    Rescaled,
    /// Viewport size changed.
    Resized,
    /// Count window or log scale changed; all tiles are stale.
    ZScale,
}

/// Progress of the interactive cut polygon.
#[derive(Debug, Clone, PartialEq)]
pub enum CutEdit {
    DraftChanged,
    Committed(Cut),
    Cancelled,
}

/// Outcome of [`ViewportController::handle_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ignored,
    /// Handled without changing the view (cursor moved, mode toggled).
    Consumed,
    View(ViewChange),
    Cut(CutEdit),
    Rejected(Error),
}

/// Zoom region along one axis: pending until the second position is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomMarker {
    pub p1: f64,
    pub p2: Option<f64>,
}

/// Owner of the viewport state and the interaction state around it.
#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    visible: TileRange,
    domain: Option<BoundingBox>,
    z_maximum: Option<f64>,
    zoom_step: f64,
    wheel_zoom_step: f64,
    pan_fraction: f64,
    cursor: Option<(i32, i32)>,
    drag: Option<(i32, i32)>,
    cut_mode: bool,
    draft: Vec<LogicalPoint>,
    x_zoom_marker: Option<ZoomMarker>,
    y_zoom_marker: Option<ZoomMarker>,
}

impl ViewportController {
    #[must_use]
    pub fn new(config: &ViewConfig) -> Self {
        let state = ViewportState {
            borders: config.borders,
            x_tile_offset: config.borders.left,
            y_tile_offset: config.borders.top,
            z_scale: ZScale {
                log_scale: config.log_scale,
                ..ZScale::default()
            },
            ..ViewportState::default()
        };
        Self {
            visible: state.visible_tiles(),
            state,
            domain: None,
            z_maximum: None,
            zoom_step: config.zoom_step,
            wheel_zoom_step: config.wheel_zoom_step,
            pan_fraction: config.pan_fraction,
            cursor: None,
            drag: None,
            cut_mode: false,
            draft: Vec::new(),
            x_zoom_marker: None,
            y_zoom_marker: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Conversion snapshot of the current state.
    #[must_use]
    pub fn mapper(&self) -> CoordinateMapper {
        self.state.mapper()
    }

    /// Tiles intersecting the viewport, derived from the current state.
    #[must_use]
    pub fn visible_tiles(&self) -> TileRange {
        self.visible
    }

    #[must_use]
    pub fn domain(&self) -> Option<BoundingBox> {
        self.domain
    }

    /// Last pointer position inside the view.
    #[must_use]
    pub fn cursor(&self) -> Option<(i32, i32)> {
        self.cursor
    }

    #[must_use]
    pub fn cut_mode(&self) -> bool {
        self.cut_mode
    }

    /// Vertices of the cut being drawn.
    #[must_use]
    pub fn draft(&self) -> &[LogicalPoint] {
        &self.draft
    }

    #[must_use]
    pub fn zoom_marker(&self, axis: MarkerAxis) -> Option<ZoomMarker> {
        match axis {
            MarkerAxis::X => self.x_zoom_marker,
            MarkerAxis::Y => self.y_zoom_marker,
        }
    }

    fn zoom_marker_mut(&mut self, axis: MarkerAxis) -> &mut Option<ZoomMarker> {
        match axis {
            MarkerAxis::X => &mut self.x_zoom_marker,
            MarkerAxis::Y => &mut self.y_zoom_marker,
        }
    }

    /// Replace the state after validation and recompute derived values.
    fn commit(&mut self, candidate: ViewportState, change: ViewChange) -> Result<ViewChange> {
        if candidate == self.state {
            return Ok(ViewChange::Unchanged);
        }
        candidate.validate()?;
        self.state = candidate;
        self.visible = candidate.visible_tiles();
        Ok(change)
    }

    /// Size the viewport for a window of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if the borders leave no viewport.
    pub fn layout(&mut self, width: i32, height: i32) -> Result<ViewChange> {
        let b = self.state.borders;
        let candidate = ViewportState {
            vp_width: width.saturating_sub(b.left).saturating_sub(b.right),
            vp_height: height.saturating_sub(b.top).saturating_sub(b.bottom),
            ..self.state
        };
        self.commit(candidate, ViewChange::Resized)
    }

    /// Set the data rectangle used by [`Self::zoom_full`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for an empty or non-finite domain.
    pub fn set_domain(&mut self, domain: BoundingBox) -> Result<()> {
        let finite = [domain.x1, domain.x2, domain.y1, domain.y2]
            .iter()
            .all(|v| v.is_finite());
        if !finite || domain.width() <= 0.0 || domain.height() <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "domain {}x{} is empty",
                domain.width(),
                domain.height()
            )));
        }
        self.domain = Some(domain);
        Ok(())
    }

    /// Fit the domain exactly into the viewport.
    ///
    /// The domain corner `(xmin, ymax)` lands on the top-left viewport pixel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSourceUnavailable`] without a domain and
    /// [`Error::InvalidGeometry`] if the result is unusable.
    pub fn zoom_full(&mut self) -> Result<ViewChange> {
        let domain = self
            .domain
            .ok_or_else(|| Error::DataSourceUnavailable("no matrix domain set".to_string()))?;
        let candidate = ViewportState {
            x_zoom: f64::from(self.state.vp_width) / domain.width(),
            y_zoom: f64::from(self.state.vp_height) / domain.height(),
            x_e_offset: -domain.x1,
            y_e_offset: domain.y2,
            x_tile_offset: self.state.borders.left,
            y_tile_offset: self.state.borders.top,
            ..self.state
        };
        self.commit(candidate, ViewChange::Rescaled)
    }

    /// Multiply the zoom by `(fx, fy)` keeping the data point under screen
    /// position `at` in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for non-positive or non-finite
    /// factors and for a resulting zoom that cannot be represented.
    pub fn zoom_around(&mut self, at: (i32, i32), fx: f64, fy: f64) -> Result<ViewChange> {
        if !(fx.is_finite() && fx > 0.0 && fy.is_finite() && fy > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "zoom factors ({fx}, {fy}) must be positive"
            )));
        }
        let anchor = self.mapper().screen_to_data(at.0, at.1);
        let (tx, ty) = self.mapper().screen_to_tile(at.0, at.1);
        let x_zoom = self.state.x_zoom * fx;
        let y_zoom = self.state.y_zoom * fy;
        let candidate = ViewportState {
            x_zoom,
            y_zoom,
            x_e_offset: f64::from(tx) / x_zoom - anchor.x,
            y_e_offset: anchor.y - f64::from(ty) / y_zoom,
            ..self.state
        };
        self.commit(candidate, ViewChange::Rescaled)
    }

    /// [`Self::zoom_around`] the last pointer position, or the viewport
    /// center if the pointer is outside.
    ///
    /// # Errors
    ///
    /// Same as [`Self::zoom_around`].
    pub fn zoom_around_cursor(&mut self, fx: f64, fy: f64) -> Result<ViewChange> {
        let at = self.cursor.unwrap_or_else(|| {
            let rect = self.state.viewport_rect();
            (rect.x + rect.width / 2, rect.y + rect.height / 2)
        });
        self.zoom_around(at, fx, fy)
    }

    /// Move the image by `(dx, dy)` screen pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if a tile offset would overflow.
    pub fn shift_offset(&mut self, dx: i32, dy: i32) -> Result<ViewChange> {
        let overflow = || Error::InvalidGeometry(format!("pan by ({dx}, {dy}) overflows"));
        let candidate = ViewportState {
            x_tile_offset: self.state.x_tile_offset.checked_add(dx).ok_or_else(overflow)?,
            y_tile_offset: self.state.y_tile_offset.checked_add(dy).ok_or_else(overflow)?,
            ..self.state
        };
        self.commit(candidate, ViewChange::Panned)
    }

    /// Fit the data range `[start, end]` along `axis` into the viewport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for a non-finite or empty range.
    pub fn view_region(&mut self, axis: MarkerAxis, start: f64, end: f64) -> Result<ViewChange> {
        let (lo, hi) = (start.min(end), start.max(end));
        let width = hi - lo;
        if !(start.is_finite() && end.is_finite() && width > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "region [{start}, {end}] is empty"
            )));
        }
        let candidate = match axis {
            MarkerAxis::X => ViewportState {
                x_zoom: f64::from(self.state.vp_width) / width,
                x_e_offset: -lo,
                x_tile_offset: self.state.borders.left,
                ..self.state
            },
            MarkerAxis::Y => ViewportState {
                y_zoom: f64::from(self.state.vp_height) / width,
                y_e_offset: hi,
                y_tile_offset: self.state.borders.top,
                ..self.state
            },
        };
        self.commit(candidate, ViewChange::Rescaled)
    }

    /// Pan so that data `pos` lies at the viewport center along `axis`.
    ///
    /// The zoom is kept, so cached tiles stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for a non-finite position or a
    /// pan that overflows.
    pub fn center_on(&mut self, axis: MarkerAxis, pos: f64) -> Result<ViewChange> {
        if !pos.is_finite() {
            return Err(Error::InvalidGeometry(format!("position {pos} is not finite")));
        }
        let mapper = self.mapper();
        let rect = self.state.viewport_rect();
        match axis {
            MarkerAxis::X => {
                let (sx, _) = mapper.tile_to_screen(mapper.e_to_x_tile(pos), 0);
                let center = rect.x + rect.width / 2;
                self.shift_offset(center.saturating_sub(sx), 0)
            }
            MarkerAxis::Y => {
                let (_, sy) = mapper.tile_to_screen(0, mapper.e_to_y_tile(pos));
                let center = rect.y + rect.height / 2;
                self.shift_offset(0, center.saturating_sub(sy))
            }
        }
    }

    /// Show `width` data units along `axis` centered on `pos`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::view_region`].
    pub fn go_to(&mut self, axis: MarkerAxis, pos: f64, width: f64) -> Result<ViewChange> {
        self.view_region(axis, pos - width / 2.0, pos + width / 2.0)
    }

    /// Start a zoom region at `pos`, or complete the pending one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for a non-finite position.
    pub fn set_zoom_marker(&mut self, axis: MarkerAxis, pos: f64) -> Result<()> {
        if !pos.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "zoom marker {pos} is not finite"
            )));
        }
        let slot = self.zoom_marker_mut(axis);
        *slot = match *slot {
            Some(ZoomMarker { p1, p2: None }) => Some(ZoomMarker { p1, p2: Some(pos) }),
            _ => Some(ZoomMarker { p1: pos, p2: None }),
        };
        Ok(())
    }

    /// View the zoom marker region along `axis` and remove the marker, or
    /// fit the whole domain along `axis` if there is none.
    ///
    /// A pending marker expands from 0 to its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for an empty region, or
    /// [`Error::DataSourceUnavailable`] without marker and domain. The
    /// marker is kept on error.
    pub fn expand(&mut self, axis: MarkerAxis) -> Result<ViewChange> {
        if let Some(marker) = self.zoom_marker(axis) {
            let change = self.view_region(axis, marker.p1, marker.p2.unwrap_or(0.0))?;
            *self.zoom_marker_mut(axis) = None;
            return Ok(change);
        }
        let domain = self
            .domain
            .ok_or_else(|| Error::DataSourceUnavailable("no matrix domain set".to_string()))?;
        match axis {
            MarkerAxis::X => self.view_region(axis, domain.x1, domain.x2),
            MarkerAxis::Y => self.view_region(axis, domain.y1, domain.y2),
        }
    }

    /// [`Self::expand`] both axes; nothing changes if either fails.
    ///
    /// # Errors
    ///
    /// Same as [`Self::expand`].
    pub fn expand_all(&mut self) -> Result<ViewChange> {
        let mut next = self.clone();
        let x = next.expand(MarkerAxis::X)?;
        let y = next.expand(MarkerAxis::Y)?;
        *self = next;
        Ok(if x == ViewChange::Unchanged { y } else { x })
    }

    /// Show counts from `offset` to `offset + visible` (log-compressed
    /// units in log mode).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for a non-finite or empty window.
    pub fn set_z_range(&mut self, offset: f64, visible: f64) -> Result<ViewChange> {
        let candidate = ViewportState {
            z_scale: ZScale {
                offset,
                visible_region: visible,
                ..self.state.z_scale
            },
            ..self.state
        };
        self.commit(candidate, ViewChange::ZScale)
    }

    /// Switch log scaling; the window follows the matrix maximum if known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if the resulting window is
    /// unusable.
    pub fn set_log_scale(&mut self, log_scale: bool) -> Result<ViewChange> {
        let z_scale = match self.z_maximum {
            Some(maximum) => ZScale::for_maximum(maximum, log_scale),
            None => ZScale {
                log_scale,
                ..self.state.z_scale
            },
        };
        let candidate = ViewportState {
            z_scale,
            ..self.state
        };
        self.commit(candidate, ViewChange::ZScale)
    }

    /// Fit the count window to `[0, maximum]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if the resulting window is
    /// unusable.
    pub fn auto_z_range(&mut self, maximum: f64) -> Result<ViewChange> {
        let candidate = ViewportState {
            z_scale: ZScale::for_maximum(maximum, self.state.z_scale.log_scale),
            ..self.state
        };
        let change = self.commit(candidate, ViewChange::ZScale)?;
        self.z_maximum = Some(maximum);
        Ok(change)
    }

    /// Translate one window event into a state transition.
    pub fn handle_event(&mut self, event: &Event) -> Response {
        match *event {
            Event::Motion { pos, .. } => self.on_motion(pos),
            Event::Button {
                kind,
                button,
                pos,
                ..
            } => self.on_button(kind, button, pos),
            Event::Key { key, modifiers } => self.on_key(key, modifiers),
            Event::Crossing { kind, pos } => {
                match kind {
                    CrossingKind::Enter => self.cursor = Some(pos),
                    CrossingKind::Leave => {
                        self.cursor = None;
                        self.drag = None;
                    }
                }
                Response::Consumed
            }
        }
    }

    fn on_motion(&mut self, pos: (i32, i32)) -> Response {
        self.cursor = Some(pos);
        if let Some(last) = self.drag {
            self.drag = Some(pos);
            let (dx, dy) = (pos.0.saturating_sub(last.0), pos.1.saturating_sub(last.1));
            return view_response(self.shift_offset(dx, dy));
        }
        if self.cut_mode && !self.draft.is_empty() {
            return Response::Cut(CutEdit::DraftChanged);
        }
        Response::Consumed
    }

    fn on_button(&mut self, kind: ButtonKind, button: MouseButton, pos: (i32, i32)) -> Response {
        self.cursor = Some(pos);
        match (kind, button) {
            (ButtonKind::Press, MouseButton::Left) if self.cut_mode => {
                let p = self.mapper().screen_to_data(pos.0, pos.1);
                self.draft.push(p);
                Response::Cut(CutEdit::DraftChanged)
            }
            (ButtonKind::Press, MouseButton::Left) => {
                self.drag = Some(pos);
                Response::Consumed
            }
            (ButtonKind::Release, MouseButton::Left) if self.drag.is_some() => {
                self.drag = None;
                Response::Consumed
            }
            (ButtonKind::Press, MouseButton::Right) if self.cut_mode => self.commit_draft(),
            (ButtonKind::Press, MouseButton::WheelUp) => {
                let f = self.wheel_zoom_step;
                view_response(self.zoom_around(pos, f, f))
            }
            (ButtonKind::Press, MouseButton::WheelDown) => {
                let f = 1.0 / self.wheel_zoom_step;
                view_response(self.zoom_around(pos, f, f))
            }
            _ => Response::Ignored,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn on_key(&mut self, key: Key, modifiers: Modifiers) -> Response {
        let page = |size: i32| {
            if modifiers.control {
                size
            } else {
                ((f64::from(size) * self.pan_fraction).round() as i32).max(1)
            }
        };
        let (step_x, step_y) = (page(self.state.vp_width), page(self.state.vp_height));
        let zoom = self.zoom_step;
        match key {
            // Arrows move the view window, so the image moves the other way.
            Key::Left => view_response(self.shift_offset(step_x, 0)),
            Key::Right => view_response(self.shift_offset(-step_x, 0)),
            Key::Up => view_response(self.shift_offset(0, step_y)),
            Key::Down => view_response(self.shift_offset(0, -step_y)),
            Key::Escape if self.cut_mode => {
                self.cut_mode = false;
                self.draft.clear();
                Response::Cut(CutEdit::Cancelled)
            }
            Key::Return if self.cut_mode => self.commit_draft(),
            Key::Backspace if self.cut_mode => {
                if self.draft.pop().is_some() {
                    Response::Cut(CutEdit::DraftChanged)
                } else {
                    Response::Consumed
                }
            }
            Key::Char(c) => match c {
                '+' | '=' => view_response(self.zoom_around_cursor(zoom, zoom)),
                '-' => view_response(self.zoom_around_cursor(1.0 / zoom, 1.0 / zoom)),
                '1' => view_response(self.zoom_around_cursor(zoom, 1.0)),
                '0' => view_response(self.zoom_around_cursor(1.0 / zoom, 1.0)),
                'Z' => view_response(self.zoom_around_cursor(1.0, zoom)),
                'X' => view_response(self.zoom_around_cursor(1.0, 1.0 / zoom)),
                ' ' => self.zoom_marker_at_cursor(MarkerAxis::X),
                'h' => self.zoom_marker_at_cursor(MarkerAxis::Y),
                'x' => view_response(self.expand(MarkerAxis::X)),
                'y' => view_response(self.expand(MarkerAxis::Y)),
                'e' => view_response(self.expand_all()),
                '|' => match self.cursor_data() {
                    Some(p) => view_response(self.center_on(MarkerAxis::X, p.x)),
                    None => Response::Ignored,
                },
                'f' => view_response(self.zoom_full()),
                'l' => {
                    let log_scale = !self.state.z_scale.log_scale;
                    view_response(self.set_log_scale(log_scale))
                }
                'c' => self.toggle_cut_mode(),
                _ => Response::Ignored,
            },
            _ => Response::Ignored,
        }
    }

    fn cursor_data(&self) -> Option<LogicalPoint> {
        let (sx, sy) = self.cursor?;
        Some(self.mapper().screen_to_data(sx, sy))
    }

    fn zoom_marker_at_cursor(&mut self, axis: MarkerAxis) -> Response {
        let Some(p) = self.cursor_data() else {
            return Response::Ignored;
        };
        let pos = match axis {
            MarkerAxis::X => p.x,
            MarkerAxis::Y => p.y,
        };
        match self.set_zoom_marker(axis, pos) {
            Ok(()) => Response::Consumed,
            Err(e) => Response::Rejected(e),
        }
    }

    fn toggle_cut_mode(&mut self) -> Response {
        self.cut_mode = !self.cut_mode;
        self.drag = None;
        if !self.cut_mode && !self.draft.is_empty() {
            self.draft.clear();
            return Response::Cut(CutEdit::Cancelled);
        }
        Response::Consumed
    }

    /// Turn the draft into a cut; a rejected draft stays editable.
    fn commit_draft(&mut self) -> Response {
        let cut = match Cut::new(self.draft.clone(), false) {
            Ok(cut) if cut.self_intersects() => {
                Err(Error::InvalidCut("polygon intersects itself".to_string()))
            }
            other => other,
        };
        match cut {
            Ok(cut) => {
                self.draft.clear();
                self.cut_mode = false;
                Response::Cut(CutEdit::Committed(cut))
            }
            Err(e) => {
                log::warn!("cut rejected: {e}");
                Response::Rejected(e)
            }
        }
    }
}

fn view_response(result: Result<ViewChange>) -> Response {
    match result {
        Ok(change) => Response::View(change),
        Err(e) => {
            log::warn!("view operation rejected: {e}");
            Response::Rejected(e)
        }
    }
}
