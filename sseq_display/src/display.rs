// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::time::Duration;

use kurbo::{Point, Vec2};
use serde_json::Value;
use sseq_chart::{
    Chart, ChartCommand, ChartError, ChartHistory, ClassId, CommandError, ElementKey, PageRange,
    PageState, apply_with_history,
};
use sseq_event::bus::EventBus;
use sseq_event::drag::{DragOutcome, DragState};
use sseq_event::hover::HoverEvent;
use sseq_imaging::Surface;
use sseq_imaging_svg::SvgSurface;
use sseq_undo::UndoLogEntry;
use sseq_view::{ChartViewport, DomainConfig, SeekTick};

use crate::config::{ConfigError, DisplayConfig};
use crate::event::{ClickEvent, DisplayEvent, FrameInfo};
use crate::hit::{
    HitTester, HoverChanges, find_hovered_bidegree, find_hovered_class, nearest_bidegree,
};
use crate::pipeline::{RenderError, layout_frame, paint_frame};
use crate::schedule::{FrameScheduler, RedrawQueue};

/// Wheel delta units per halving of the zoom factor.
const WHEEL_UNITS_PER_OCTAVE: f64 = 500.0;

/// Viewport domain limits for `chart`.
#[must_use]
pub fn domain_config(chart: &Chart, config: &DisplayConfig) -> DomainConfig {
    let s = chart.settings();
    let f = |[a, b]: [i64; 2]| [a as f64, b as f64];
    DomainConfig {
        x_range: s.x_range.map(f),
        y_range: s.y_range.map(f),
        initial_x_range: f(s.initial_x_range),
        initial_y_range: f(s.initial_y_range),
        domain_offset: config.domain_offset,
    }
}

/// An interactive chart display.
///
/// `Display` composes the chart model, its undo history, the page cursor,
/// the viewport, hit testing and an [`EventBus`] of [`DisplayEvent`]s. It
/// draws into a host [`Surface`] and defers work through a host
/// [`FrameScheduler`]; it holds no other handle to the host.
///
/// The host forwards input (`pointer_*`, [`Display::wheel`]), remote
/// commands ([`Display::apply_command`]) and its callbacks
/// ([`Display::on_animation_frame`], [`Display::on_seek_step`]).
pub struct Display<S, F> {
    chart: Chart,
    history: ChartHistory,
    pages: PageState,
    viewport: ChartViewport,
    config: DisplayConfig,
    surface: S,
    scheduler: F,
    redraw: RedrawQueue,
    hit: HitTester,
    drag: DragState,
    visible: Vec<ClassId>,
    last_error: Option<RenderError>,
    frames: u64,
    events: EventBus<DisplayEvent>,
}

impl<S, F> fmt::Debug for Display<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("page", &self.pages.current_range())
            .field("viewport", &self.viewport)
            .field("redraw", &self.redraw)
            .field("hovered", &self.hit.hovered_class())
            .field("frames", &self.frames)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<S: Surface, F: FrameScheduler> Display<S, F> {
    /// Creates a display for `chart`; call [`Display::initialize`] with the canvas size.
    pub fn new(
        chart: Chart,
        config: DisplayConfig,
        surface: S,
        scheduler: F,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut viewport =
            ChartViewport::new(config.view_margins(), domain_config(&chart, &config));
        viewport.set_zoom_extent(config.zoom_extent[0], config.zoom_extent[1]);
        let pages = PageState::new(chart.page_list().to_vec(), chart.settings().min_page_idx);
        Ok(Self {
            chart,
            history: ChartHistory::new(),
            pages,
            viewport,
            drag: DragState::new(config.drag_slop),
            config,
            surface,
            scheduler,
            redraw: RedrawQueue::new(),
            hit: HitTester::new(),
            visible: Vec::new(),
            last_error: None,
            frames: 0,
            events: EventBus::new(),
        })
    }

    /// Sizes the canvas, resets the zoom and draws the first frame.
    pub fn initialize(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        self.viewport.initialize(width, height);
        self.draw()
    }

    /// Resizes the canvas, keeping the zoom, and schedules a frame.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.request_batched();
    }

    /// Subscribe here to receive [`DisplayEvent`]s.
    pub fn events(&mut self) -> &mut EventBus<DisplayEvent> {
        &mut self.events
    }

    /// The chart being displayed.
    #[must_use]
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// The viewport.
    #[must_use]
    pub fn viewport(&self) -> &ChartViewport {
        &self.viewport
    }

    /// The page cursor.
    #[must_use]
    pub fn pages(&self) -> &PageState {
        &self.pages
    }

    /// The undo history.
    #[must_use]
    pub fn history(&self) -> &ChartHistory {
        &self.history
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// The host surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the host surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The host scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// Mutable access to the host scheduler.
    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// Number of frames painted so far.
    #[must_use]
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    /// Error of the last frame, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    /// Class under the pointer.
    #[must_use]
    pub fn hovered_class(&self) -> Option<ClassId> {
        self.hit.hovered_class()
    }

    /// Bidegree near the pointer.
    #[must_use]
    pub fn hovered_bidegree(&self) -> Option<(i64, i64)> {
        self.hit.hovered_bidegree()
    }

    /// Classes drawn by the last frame, in draw order.
    #[must_use]
    pub fn visible_classes(&self) -> &[ClassId] {
        &self.visible
    }

    // -------------------------------------------------------------------------
    // Redraw
    // -------------------------------------------------------------------------

    /// Requests a redraw.
    ///
    /// Batched requests are coalesced into one paint on a later frame
    /// callback. An unbatched request paints right away.
    pub fn request_redraw(&mut self, batched: bool) -> Result<(), RenderError> {
        if batched {
            self.request_batched();
            Ok(())
        } else {
            self.draw()
        }
    }

    fn request_batched(&mut self) {
        self.redraw.request();
        self.scheduler.request_frame();
    }

    /// Host frame callback. Returns whether a frame was painted.
    pub fn on_animation_frame(&mut self) -> Result<bool, RenderError> {
        if !self.redraw.on_frame() {
            return Ok(false);
        }
        self.draw()?;
        Ok(true)
    }

    fn hover_threshold(&self) -> f64 {
        self.config.bidegree_distance_threshold
            * self.chart.settings().bidegree_distance_scale.unwrap_or(1.0)
    }

    fn current_page(&self) -> PageRange {
        self.pages
            .current_range()
            .unwrap_or(PageRange::Page(self.chart.base_page()))
    }

    /// Paints one frame into the host surface.
    pub fn draw(&mut self) -> Result<(), RenderError> {
        let page = self.current_page();
        self.viewport.recompute();
        let layout = match layout_frame(&mut self.chart, &self.viewport, page, &self.config) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::error!(%err, "frame aborted");
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        self.visible.clone_from(&layout.visible.classes);
        let changes = self.test_hover();
        paint_frame(
            &mut self.surface,
            &self.chart,
            &self.viewport,
            &layout,
            &self.config,
            self.hit.hovered_class(),
        );
        self.last_error = None;
        self.frames += 1;
        self.events.emit(&DisplayEvent::FrameDrawn(FrameInfo {
            page,
            classes: layout.visible.classes.len(),
            edges: layout.edges.len(),
        }));
        self.emit_hover(changes);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Hit testing
    // -------------------------------------------------------------------------

    fn test_hover(&mut self) -> HoverChanges {
        let threshold = self.hover_threshold();
        self.hit
            .update(&self.chart, &self.viewport, &self.visible, threshold)
    }

    fn emit_hover(&mut self, changes: HoverChanges) {
        for t in changes.class {
            self.events.emit(&match t {
                HoverEvent::Leave(id) => DisplayEvent::MouseoutClass(id),
                HoverEvent::Enter(id) => DisplayEvent::MouseoverClass(id),
            });
        }
        for t in changes.bidegree {
            self.events.emit(&match t {
                HoverEvent::Leave(b) => DisplayEvent::MouseoutBidegree(b),
                HoverEvent::Enter(b) => DisplayEvent::MouseoverBidegree(b),
            });
        }
    }

    /// Re-tests hover at the stored pointer, redrawing at once if the hovered
    /// class changed.
    fn refresh_hover(&mut self) -> Result<(), RenderError> {
        let changes = self.test_hover();
        let redraw = changes.class_changed();
        self.emit_hover(changes);
        if redraw {
            return self.draw();
        }
        Ok(())
    }

    /// Pointer moved over the canvas.
    ///
    /// While a press is being dragged the plot pans and a batched frame is
    /// requested; otherwise hover is updated.
    pub fn pointer_move(&mut self, pos: Point) -> Result<(), RenderError> {
        self.hit.set_pointer(Some(pos));
        if self.drag.is_pressed() {
            if let Some(delta) = self.drag.update(pos) {
                self.pan(delta);
                return Ok(());
            }
            if self.drag.is_dragging() {
                return Ok(());
            }
        }
        self.refresh_hover()
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) -> Result<(), RenderError> {
        self.hit.set_pointer(None);
        self.refresh_hover()
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, pos: Point) {
        self.hit.set_pointer(Some(pos));
        self.drag.start(pos);
    }

    /// Pointer released. Returns the click if the press did not drag.
    pub fn pointer_up(&mut self, pos: Point) -> Option<ClickEvent> {
        if let Some(delta) = self.drag.update(pos) {
            self.pan(delta);
        }
        match self.drag.end()? {
            DragOutcome::Click(at) => Some(self.on_click(at)),
            DragOutcome::Drag(offset) => {
                tracing::trace!(dx = offset.x, dy = offset.y, "drag ended");
                None
            }
        }
    }

    fn pan(&mut self, delta: Vec2) {
        self.viewport.translate_by(delta);
        self.request_batched();
    }

    /// Describes what lies under `pos` and emits it as a click.
    pub fn on_click(&mut self, pos: Point) -> ClickEvent {
        let real = self.viewport.to_domain(pos);
        let ((x, y), _) = nearest_bidegree(&self.viewport, pos);
        let click = ClickEvent {
            real_x: real.x,
            real_y: real.y,
            x,
            y,
            distance: (real.x - x as f64).hypot(real.y - y as f64),
            class: find_hovered_class(&self.chart, &self.visible, self.hit.hovered_class(), pos),
            bidegree: find_hovered_bidegree(
                &self.viewport,
                pos,
                self.hover_threshold(),
                self.hit.hovered_bidegree(),
            ),
        };
        tracing::debug!(x, y, class = ?click.class, "click");
        self.events.emit(&DisplayEvent::Click(click.clone()));
        click
    }

    /// Wheel zoom about `anchor`; positive `delta_y` zooms out.
    pub fn wheel(&mut self, delta_y: f64, anchor: Point) {
        let factor = (-delta_y / WHEEL_UNITS_PER_OCTAVE).exp2();
        self.viewport.zoom_by(factor, anchor);
        if self.viewport.take_zoom_changed() {
            self.request_batched();
        }
    }

    // -------------------------------------------------------------------------
    // Pages
    // -------------------------------------------------------------------------

    /// Moves to page `index`; an invalid index falls back to the first page.
    pub fn set_page(&mut self, index: usize) {
        let before = self.pages.index();
        self.pages.set_page(Some(index));
        self.page_moved(before);
    }

    /// Steps to the next page. Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        let before = self.pages.index();
        self.pages.next();
        self.page_moved(before)
    }

    /// Steps to the previous page. Returns whether the page changed.
    pub fn previous_page(&mut self) -> bool {
        let before = self.pages.index();
        self.pages.previous();
        self.page_moved(before)
    }

    fn page_moved(&mut self, before: usize) -> bool {
        let index = self.pages.index();
        if index == before {
            return false;
        }
        if let Some(range) = self.pages.current_range() {
            tracing::debug!(index, page = %self.pages.describe(range), "page changed");
            self.events.emit(&DisplayEvent::PageChanged { index, range });
        }
        self.request_batched();
        true
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Decodes and applies a remote command message.
    pub fn apply_message(&mut self, message: &str) -> Result<(), CommandError> {
        let command = ChartCommand::from_json_str(message).inspect_err(|err| {
            tracing::warn!(%err, "rejected remote command");
        })?;
        self.apply_command(command)?;
        Ok(())
    }

    /// Applies `command` as one undo step and schedules one frame.
    ///
    /// A batch is applied in order and still schedules a single frame. On
    /// error nothing changes.
    pub fn apply_command(&mut self, command: ChartCommand) -> Result<(), ChartError> {
        apply_with_history(&mut self.chart, &mut self.history, command)?;
        self.chart_changed();
        Ok(())
    }

    /// Sets one property of a class, an edge or the settings as its own
    /// undo step.
    pub fn set_value(
        &mut self,
        key: ElementKey,
        prop: &str,
        value: Value,
    ) -> Result<(), ChartError> {
        let before = self.chart.field(&key, prop)?;
        self.chart.set_field(&key, prop, value.clone())?;
        self.history
            .record_value_change(key, prop, before, value, None);
        self.chart_changed();
        Ok(())
    }

    /// Undoes the last step. Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.chart);
        if done {
            self.chart_changed();
            self.events.emit(&DisplayEvent::ChartChanged);
        }
        done
    }

    /// Redoes the last undone step. Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.chart);
        if done {
            self.chart_changed();
            self.events.emit(&DisplayEvent::ChartChanged);
        }
        done
    }

    /// The undo history as a persistable log.
    #[must_use]
    pub fn undo_log(&self) -> Vec<UndoLogEntry<Chart>> {
        self.history.to_log()
    }

    /// Replaces the undo history with one rebuilt from a persisted log.
    pub fn restore_undo_log(&mut self, log: Vec<UndoLogEntry<Chart>>) {
        self.history = ChartHistory::from_log(log, &self.chart);
    }

    fn chart_changed(&mut self) {
        self.pages
            .sync(self.chart.page_list(), self.chart.settings().min_page_idx);
        self.viewport
            .set_domain(domain_config(&self.chart, &self.config));
        self.request_batched();
    }

    // -------------------------------------------------------------------------
    // Seek
    // -------------------------------------------------------------------------

    /// Starts panning the plot center to `target` over the configured steps.
    ///
    /// A seek already in flight is cancelled.
    pub fn seek(&mut self, target: Point) {
        let (id, cancelled) = self.viewport.seek(target, self.config.seek_steps);
        if let Some(end) = cancelled {
            tracing::debug!(?end, new = id.0, "seek superseded");
        }
        self.scheduler
            .start_step_timer(Duration::from_millis(self.config.seek_interval_ms));
    }

    /// Host step timer callback for the seek animation.
    pub fn on_seek_step(&mut self) -> Result<(), RenderError> {
        match self.viewport.advance_seek() {
            SeekTick::Idle => {
                self.scheduler.stop_step_timer();
                Ok(())
            }
            SeekTick::Stepped => self.draw(),
            SeekTick::Finished(id) => {
                self.scheduler.stop_step_timer();
                let drawn = self.draw();
                self.events.emit(&DisplayEvent::SeekFinished(id));
                drawn
            }
        }
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Renders the current view as an SVG document.
    ///
    /// The frame is laid out and painted exactly like an on-screen frame, but
    /// into a vector surface; the host surface is not touched.
    pub fn export_svg(&mut self) -> Result<String, RenderError> {
        let page = self.current_page();
        self.viewport.recompute();
        let layout = layout_frame(&mut self.chart, &self.viewport, page, &self.config)?;
        let mut svg = SvgSurface::default();
        paint_frame(
            &mut svg,
            &self.chart,
            &self.viewport,
            &layout,
            &self.config,
            None,
        );
        let (w, h) = self.viewport.size();
        Ok(svg.to_svg(pixel_size(w), pixel_size(h)))
    }
}

fn pixel_size(v: f64) -> u32 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "canvas sizes are small and non-negative; casts saturate"
    )]
    let px = v.ceil() as u32;
    px
}
