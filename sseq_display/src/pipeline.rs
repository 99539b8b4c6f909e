// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One frame of the chart, in two passes.
//!
//! [`layout_frame`] culls the chart to the visible bidegree box, places every
//! visible class in pixels (stored back on the class for hit testing) and
//! builds the edge geometry. [`paint_frame`] then emits the frame to a
//! [`Surface`] back to front: background, grid, highlights, edges, classes,
//! overlay, axes.
//!
//! Layout is where a frame can fail. An unknown grid style or an edge whose
//! endpoint no longer exists aborts that frame with a [`RenderError`]; nothing
//! has been painted yet and the viewport is left as it was.

use kurbo::{BezPath, Circle, Line, Point, Rect, Stroke, Vec2};
use peniko::Color;
use sseq_chart::{
    Chart, Class, ClassCanvas, ClassId, EdgeId, ElementsToDraw, OverlaySource, PageRange,
};
use sseq_imaging::{
    DrawOp, ImageId, OverlayImage, StateOp, Surface, SurfaceExt, TextAnchor, TextBaseline,
    TextStyle,
};
use sseq_view::ChartViewport;
use thiserror::Error;

use crate::config::DisplayConfig;
use crate::ticks::{AxisTicks, axis_ticks};

/// Control-point distance of bent edges when the edge sets none.
pub const DEFAULT_LOOSENESS: f64 = 0.4;

/// Chess cells smaller than this many pixels are not painted.
const MIN_CHESS_CELL_PX: f64 = 4.0;

/// Why a frame could not be drawn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The chart names a grid style the renderer does not know.
    #[error("unknown grid style {0:?}")]
    UnknownGridStyle(String),
    /// A visible edge refers to a class that does not exist.
    #[error("{edge} refers to missing {class}")]
    MissingEndpoint {
        /// The edge being drawn.
        edge: EdgeId,
        /// The endpoint that was not found.
        class: ClassId,
    },
}

/// How grid lines are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GridStyle {
    /// Lines through the integer points.
    #[default]
    Go,
    /// Alternating filled unit cells.
    Chess,
}

impl GridStyle {
    /// Parses a chart's grid style name; `None` is the default style.
    pub fn parse(name: Option<&str>) -> Result<Self, RenderError> {
        match name {
            None | Some("go") => Ok(Self::Go),
            Some("chess") => Ok(Self::Chess),
            Some(other) => Err(RenderError::UnknownGridStyle(other.to_owned())),
        }
    }
}

/// A positioned edge.
#[derive(Clone, Debug)]
pub struct EdgeShape {
    /// The edge.
    pub id: EdgeId,
    /// Pixel path from source to target.
    pub path: BezPath,
    /// Stroke color.
    pub color: [u8; 4],
    /// Stroke geometry.
    pub stroke: Stroke,
}

/// Everything [`paint_frame`] needs besides the chart.
#[derive(Clone, Debug)]
pub struct FrameLayout {
    /// Page range the frame shows.
    pub page: PageRange,
    /// Visible elements, in draw order.
    pub visible: ElementsToDraw,
    /// Horizontal ticks.
    pub x_ticks: AxisTicks,
    /// Vertical ticks.
    pub y_ticks: AxisTicks,
    /// Grid style.
    pub grid: GridStyle,
    /// Edge geometry, in draw order.
    pub edges: Vec<EdgeShape>,
    /// Plot area in pixels.
    pub plot: Rect,
}

/// Pixel radius of a class of `size` at the current zoom.
///
/// The base diameter is the smaller pixel length of one domain unit, clamped
/// to the configured class size range.
#[must_use]
pub fn class_radius(
    viewport: &ChartViewport,
    config: &DisplayConfig,
    class_scale: f64,
    size: f64,
) -> f64 {
    let unit = viewport
        .x_scale()
        .unit_span()
        .min(viewport.y_scale().unit_span());
    unit.clamp(config.min_class_size, config.max_class_size) * class_scale * size / 2.0
}

fn place(class: &Class, viewport: &ChartViewport, unit_radius: f64) -> ClassCanvas {
    ClassCanvas {
        center: viewport.to_pixel(class.bidegree()) + class.offset(),
        radius: unit_radius * class.size,
    }
}

/// Culls and positions the chart for `page`.
///
/// The viewport must already be recomputed for this frame.
pub fn layout_frame(
    chart: &mut Chart,
    viewport: &ChartViewport,
    page: PageRange,
    config: &DisplayConfig,
) -> Result<FrameLayout, RenderError> {
    let grid = GridStyle::parse(chart.settings().grid_style.as_deref())?;
    let (x_ticks, y_ticks) = axis_ticks(viewport.x_scale(), viewport.y_scale(), config);
    let b = viewport.bounds();
    let visible = chart.elements_to_draw(page, b.x_min - 1, b.x_max + 1, b.y_min - 1, b.y_max + 1);

    let unit_radius = class_radius(viewport, config, chart.settings().class_scale, 1.0);
    let mut edges = Vec::with_capacity(visible.edges.len());
    for &id in &visible.edges {
        let Some(edge) = chart.edge(id) else {
            continue;
        };
        let endpoint = |class_id: ClassId| {
            chart
                .class(class_id)
                .map(|c| place(c, viewport, unit_radius))
                .ok_or(RenderError::MissingEndpoint {
                    edge: id,
                    class: class_id,
                })
        };
        let source = endpoint(edge.source)?;
        let target = endpoint(edge.target)?;
        let [sx, sy] = edge.source_offset;
        let [tx, ty] = edge.target_offset;
        let p0 = source.center + Vec2::new(sx, sy);
        let p1 = target.center + Vec2::new(tx, ty);
        edges.push(EdgeShape {
            id,
            path: edge_path(p0, p1, edge.bend, edge.looseness.unwrap_or(DEFAULT_LOOSENESS)),
            color: edge.color,
            stroke: Stroke::new(edge.line_width).with_dashes(0.0, edge.dash.iter().copied()),
        });
    }

    for &id in &visible.classes {
        let canvas = chart.class(id).map(|c| place(c, viewport, unit_radius));
        chart.set_canvas(id, canvas);
    }

    tracing::trace!(
        classes = visible.classes.len(),
        edges = visible.edges.len(),
        x_step = x_ticks.tick_step,
        y_step = y_ticks.tick_step,
        "frame laid out"
    );
    Ok(FrameLayout {
        page,
        visible,
        x_ticks,
        y_ticks,
        grid,
        edges,
        plot: viewport.plot_rect(),
    })
}

/// Path of an edge from `p0` to `p1`.
///
/// An unset or zero bend is a straight segment. Otherwise the curve leaves `p0` turned
/// by `bend` degrees from the chord and enters `p1` mirrored, with both
/// control points `looseness` chord lengths from their ends.
#[must_use]
pub fn edge_path(p0: Point, p1: Point, bend: Option<f64>, looseness: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(p0);
    let Some(bend) = bend.filter(|b| *b != 0.0) else {
        path.line_to(p1);
        return path;
    };
    let chord = p1 - p0;
    let reach = chord.hypot() * looseness;
    let angle = chord.atan2();
    let turn = bend.to_radians();
    let c1 = p0 + Vec2::from_angle(angle - turn) * reach;
    let c2 = p1 - Vec2::from_angle(angle + turn) * reach;
    path.curve_to(c1, c2, p1);
    path
}

fn rgba(c: [u8; 4]) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], c[3])
}

/// Paints a laid-out frame.
///
/// `hovered` gets an outline ring.
pub fn paint_frame<S: Surface + ?Sized>(
    surface: &mut S,
    chart: &Chart,
    viewport: &ChartViewport,
    layout: &FrameLayout,
    config: &DisplayConfig,
    hovered: Option<ClassId>,
) {
    surface.draw(DrawOp::Clear(rgba(config.background)));
    surface.with_clip(layout.plot, |s| {
        paint_grid(s, viewport, layout, config);
        paint_highlights(s, chart, layout, config);
        for shape in &layout.edges {
            s.state(StateOp::SetStrokePaint(rgba(shape.color)));
            s.state(StateOp::SetStroke(shape.stroke.clone()));
            s.draw(DrawOp::StrokePath(shape.path.clone()));
        }
        paint_classes(s, chart, layout, config, hovered);
        if let Some(overlay) = &chart.settings().overlay {
            let a = viewport.to_pixel(Point::new(overlay.x_range[0], overlay.y_range[1]));
            let b = viewport.to_pixel(Point::new(overlay.x_range[1], overlay.y_range[0]));
            let image = match &overlay.source {
                OverlaySource::Svg { markup } => OverlayImage::Svg(markup.as_str().into()),
                OverlaySource::Raster { id, width, height } => OverlayImage::Raster {
                    id: ImageId(*id),
                    width: *width,
                    height: *height,
                },
            };
            s.draw(DrawOp::DrawImage {
                image,
                dst: Rect::from_points(a, b),
            });
        }
    });
    paint_axes(surface, viewport, layout, config);
}

fn paint_grid<S: Surface + ?Sized>(
    s: &mut S,
    viewport: &ChartViewport,
    layout: &FrameLayout,
    config: &DisplayConfig,
) {
    let b = viewport.bounds();
    let plot = layout.plot;
    match layout.grid {
        GridStyle::Go => {
            s.set_solid_stroke(rgba(config.grid_color), 0.5);
            let (xs, ys) = (layout.x_ticks.grid_step, layout.y_ticks.grid_step);
            for x in multiples(b.x_min - 1, b.x_max + 1, xs) {
                let px = viewport.x_scale().apply(x as f64);
                s.draw(DrawOp::StrokeLine(Line::new((px, plot.y0), (px, plot.y1))));
            }
            for y in multiples(b.y_min - 1, b.y_max + 1, ys) {
                let py = viewport.y_scale().apply(y as f64);
                s.draw(DrawOp::StrokeLine(Line::new((plot.x0, py), (plot.x1, py))));
            }
        }
        GridStyle::Chess => {
            let cell = viewport.x_scale().unit_span().min(viewport.y_scale().unit_span());
            if cell < MIN_CHESS_CELL_PX {
                return;
            }
            s.state(StateOp::SetFill(rgba(config.grid_color)));
            for x in b.x_min - 1..=b.x_max + 1 {
                for y in (b.y_min - 1..=b.y_max + 1).filter(|y| (x + y).rem_euclid(2) == 0) {
                    let (xf, yf) = (x as f64, y as f64);
                    let a = viewport.to_pixel(Point::new(xf - 0.5, yf - 0.5));
                    let c = viewport.to_pixel(Point::new(xf + 0.5, yf + 0.5));
                    s.draw(DrawOp::FillRect(Rect::from_points(a, c)));
                }
            }
        }
    }
}

/// Multiples of `step` in `[lo, hi]`.
fn multiples(lo: i64, hi: i64, step: i64) -> impl Iterator<Item = i64> {
    let step = step.max(1);
    let first = lo.div_euclid(step) * step;
    let first = if first < lo { first + step } else { first };
    (first..=hi).step_by(usize::try_from(step).unwrap_or(usize::MAX))
}

fn paint_highlights<S: Surface + ?Sized>(
    s: &mut S,
    chart: &Chart,
    layout: &FrameLayout,
    config: &DisplayConfig,
) {
    let mut set = false;
    for class in layout.visible.classes.iter().filter_map(|&id| chart.class(id)) {
        if let Some(canvas) = class.canvas.filter(|_| class.highlight) {
            if !set {
                s.state(StateOp::SetFill(rgba(config.highlight_color)));
                set = true;
            }
            s.draw(DrawOp::FillCircle(Circle::new(canvas.center, canvas.radius * 1.6)));
        }
    }
}

fn paint_classes<S: Surface + ?Sized>(
    s: &mut S,
    chart: &Chart,
    layout: &FrameLayout,
    config: &DisplayConfig,
    hovered: Option<ClassId>,
) {
    for &id in &layout.visible.classes {
        let Some((class, canvas)) = chart.class(id).and_then(|c| c.canvas.map(|cv| (c, cv)))
        else {
            continue;
        };
        s.state(StateOp::SetFill(rgba(class.color)));
        s.draw(DrawOp::FillCircle(canvas.disc()));
        if hovered == Some(id) {
            s.set_solid_stroke(rgba(config.hover_color), 1.5);
            s.draw(DrawOp::StrokeCircle(canvas.disc()));
        }
    }
}

fn paint_axes<S: Surface + ?Sized>(
    s: &mut S,
    viewport: &ChartViewport,
    layout: &FrameLayout,
    config: &DisplayConfig,
) {
    let plot = layout.plot;
    let color = rgba(config.axis_color);
    s.set_solid_stroke(color, 1.0);
    s.draw(DrawOp::StrokeLine(Line::new((plot.x0, plot.y1), (plot.x1, plot.y1))));
    s.draw(DrawOp::StrokeLine(Line::new((plot.x0, plot.y0), (plot.x0, plot.y1))));

    s.state(StateOp::SetFill(color));
    s.state(StateOp::SetTextStyle(TextStyle {
        size: config.label_font_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
    }));
    for &x in &layout.x_ticks.ticks {
        let px = viewport.x_scale().apply(x as f64);
        if (plot.x0..=plot.x1).contains(&px) {
            s.draw(DrawOp::StrokeLine(Line::new((px, plot.y1), (px, plot.y1 + 4.0))));
            s.draw(DrawOp::Text {
                origin: Point::new(px, plot.y1 + 6.0),
                text: x.to_string(),
            });
        }
    }
    s.state(StateOp::SetTextStyle(TextStyle {
        size: config.label_font_size,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Middle,
    }));
    for &y in &layout.y_ticks.ticks {
        let py = viewport.y_scale().apply(y as f64);
        if (plot.y0..=plot.y1).contains(&py) {
            s.draw(DrawOp::StrokeLine(Line::new((plot.x0 - 4.0, py), (plot.x0, py))));
            s.draw(DrawOp::Text {
                origin: Point::new(plot.x0 - 6.0, py),
                text: y.to_string(),
            });
        }
    }
}
