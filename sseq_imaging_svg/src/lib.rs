// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG export surface for the sseq imaging IR.
//!
//! [`SvgSurface`] records imaging ops and serializes them as a standalone SVG
//! document. It is what chart export draws into.
//!
//! The output is meant to be faithful for the ops the chart renderer emits:
//! - Solid fill and stroke paints, stroke widths, dashes, caps and joins.
//! - Rectangular clips become `<clipPath>` definitions.
//! - Inline SVG overlays are nested as `<svg>` elements; raster overlays are
//!   represented by a placeholder rectangle, since pixels are host-owned.

use std::fmt::Write as _;

use kurbo::{Affine, BezPath, Cap, Join, PathEl, Rect};
use peniko::Color;
use sseq_imaging::{
    DrawOp, ImagingOp, OverlayImage, StateOp, StrokeStyle, Surface, TextAnchor, TextBaseline,
    TextStyle,
};

#[derive(Clone, Debug)]
struct SvgState {
    transform: Affine,
    fill: Option<Color>,
    stroke_paint: Option<Color>,
    stroke: Option<StrokeStyle>,
    text: TextStyle,
}

impl Default for SvgState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: None,
            stroke_paint: None,
            stroke: None,
            text: TextStyle::default(),
        }
    }
}

#[derive(Copy, Clone)]
enum PaintKind {
    Fill,
    Stroke,
}

/// A recording SVG surface.
#[derive(Default, Debug)]
pub struct SvgSurface {
    ops: Vec<ImagingOp>,
}

impl SvgSurface {
    /// Returns the recorded imaging ops.
    #[must_use]
    pub fn ops(&self) -> &[ImagingOp] {
        &self.ops
    }

    /// Serializes the recorded ops as an SVG document of the given pixel size.
    #[must_use]
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        render_svg_document(width, height, &self.ops)
    }
}

impl Surface for SvgSurface {
    fn state(&mut self, op: StateOp) {
        self.ops.push(ImagingOp::State(op));
    }

    fn draw(&mut self, op: DrawOp) {
        self.ops.push(ImagingOp::Draw(op));
    }
}

fn render_svg_document(width: u32, height: u32, ops: &[ImagingOp]) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let mut clip_depth: usize = 0;
    let mut clip_counter: u64 = 0;
    let mut state = SvgState::default();

    for op in ops {
        match op {
            ImagingOp::State(state_op) => match state_op {
                StateOp::SetTransform(xf) => state.transform = *xf,
                StateOp::SetFill(c) => state.fill = Some(*c),
                StateOp::SetStrokePaint(c) => state.stroke_paint = Some(*c),
                StateOp::SetStroke(style) => state.stroke = Some(style.clone()),
                StateOp::SetTextStyle(style) => state.text = *style,
                StateOp::PushClip(rect) => {
                    clip_counter += 1;
                    let clip_id = format!("clip{clip_counter}");
                    let _ = write!(defs, "<clipPath id=\"{clip_id}\">");
                    write_rect(&mut defs, *rect, state.transform, "");
                    defs.push_str("</clipPath>");
                    let _ = write!(body, "<g clip-path=\"url(#{clip_id})\">");
                    clip_depth += 1;
                }
                StateOp::PopClip => {
                    if clip_depth > 0 {
                        clip_depth -= 1;
                        body.push_str("</g>");
                    }
                }
            },
            ImagingOp::Draw(draw_op) => write_draw_op(&mut body, draw_op, &state),
        }
    }

    for _ in 0..clip_depth {
        body.push_str("</g>");
    }

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    if !defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

fn write_rect(out: &mut String, rect: Rect, transform: Affine, style: &str) {
    let _ = write!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}{style}/>",
        fmt_f64_to_f32(rect.x0),
        fmt_f64_to_f32(rect.y0),
        fmt_f64_to_f32(rect.width()),
        fmt_f64_to_f32(rect.height()),
        svg_transform_attr(transform),
    );
}

fn write_draw_op(out: &mut String, op: &DrawOp, state: &SvgState) {
    let xf = svg_transform_attr(state.transform);
    match op {
        DrawOp::Clear(color) => {
            let (rgb, a) = color_to_svg(*color);
            let _ = write!(out, "<rect width=\"100%\" height=\"100%\" fill=\"{rgb}\"");
            if a < 1.0 {
                let _ = write!(out, " fill-opacity=\"{}\"", fmt_f32(a));
            }
            out.push_str("/>");
        }
        DrawOp::FillRect(rect) => {
            write_rect(out, *rect, state.transform, &style_for_paint(state, PaintKind::Fill));
        }
        DrawOp::StrokeLine(line) => {
            let style = style_for_paint(state, PaintKind::Stroke);
            let _ = write!(
                out,
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{xf}{style}/>",
                fmt_f64_to_f32(line.p0.x),
                fmt_f64_to_f32(line.p0.y),
                fmt_f64_to_f32(line.p1.x),
                fmt_f64_to_f32(line.p1.y),
            );
        }
        DrawOp::StrokePath(path) => {
            let style = style_for_paint(state, PaintKind::Stroke);
            let _ = write!(out, "<path d=\"{}\"{xf}{style}/>", bez_path_to_svg_d(path));
        }
        DrawOp::FillPath(path) => {
            let style = style_for_paint(state, PaintKind::Fill);
            let _ = write!(out, "<path d=\"{}\"{xf}{style}/>", bez_path_to_svg_d(path));
        }
        DrawOp::FillCircle(circle) | DrawOp::StrokeCircle(circle) => {
            let kind = if matches!(op, DrawOp::FillCircle(_)) {
                PaintKind::Fill
            } else {
                PaintKind::Stroke
            };
            let style = style_for_paint(state, kind);
            let _ = write!(
                out,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{xf}{style}/>",
                fmt_f64_to_f32(circle.center.x),
                fmt_f64_to_f32(circle.center.y),
                fmt_f64_to_f32(circle.radius),
            );
        }
        DrawOp::Text { origin, text } => {
            let (rgb, a) = color_to_svg(state.fill.unwrap_or(Color::BLACK));
            let _ = write!(
                out,
                "<text x=\"{}\" y=\"{}\"{xf} font-size=\"{}\" text-anchor=\"{}\" dominant-baseline=\"{}\" fill=\"{rgb}\"",
                fmt_f64_to_f32(origin.x),
                fmt_f64_to_f32(origin.y),
                fmt_f32(state.text.size),
                text_anchor_svg(state.text.anchor),
                text_baseline_svg(state.text.baseline),
            );
            if a < 1.0 {
                let _ = write!(out, " fill-opacity=\"{}\"", fmt_f32(a));
            }
            let _ = write!(out, ">{}</text>", escape_xml(text));
        }
        DrawOp::DrawImage { image, dst } => match image {
            OverlayImage::Svg(markup) => {
                let _ = write!(
                    out,
                    "<g{xf}><svg x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\">{markup}</svg></g>",
                    fmt_f64_to_f32(dst.x0),
                    fmt_f64_to_f32(dst.y0),
                    fmt_f64_to_f32(dst.width()),
                    fmt_f64_to_f32(dst.height()),
                );
            }
            OverlayImage::Raster { id, .. } => {
                // Placeholder: pixels are owned by the host.
                let _ = write!(out, "<g{xf}>");
                write_rect(
                    out,
                    *dst,
                    Affine::IDENTITY,
                    " fill=\"#ff00ff\" fill-opacity=\"0.25\" stroke=\"#ff00ff\" stroke-width=\"1\"",
                );
                let _ = write!(
                    out,
                    "<text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#ff00ff\">image#{}</text>",
                    fmt_f64_to_f32(dst.x0 + 4.0),
                    fmt_f64_to_f32(dst.y0 + 14.0),
                    id.0
                );
                out.push_str("</g>");
            }
        },
    }
}

fn style_for_paint(state: &SvgState, kind: PaintKind) -> String {
    let mut out = String::new();
    let (attr, other, paint) = match kind {
        PaintKind::Fill => ("fill", "stroke", state.fill),
        PaintKind::Stroke => ("stroke", "fill", state.stroke_paint),
    };
    let (rgb, a) = color_to_svg(paint.unwrap_or(Color::BLACK));
    let _ = write!(out, " {other}=\"none\" {attr}=\"{rgb}\"");
    if a < 1.0 {
        let _ = write!(out, " {attr}-opacity=\"{}\"", fmt_f32(a));
    }

    if let PaintKind::Stroke = kind
        && let Some(stroke) = state.stroke.as_ref()
    {
        let _ = write!(out, " stroke-width=\"{}\"", fmt_f64_to_f32(stroke.width));
        // SVG has a single linecap; use the start cap.
        let _ = write!(
            out,
            " stroke-linecap=\"{}\"",
            stroke_cap_svg(stroke.start_cap)
        );
        let _ = write!(out, " stroke-linejoin=\"{}\"", stroke_join_svg(stroke.join));
        if !stroke.dash_pattern.is_empty() {
            let dashes: Vec<String> = stroke
                .dash_pattern
                .iter()
                .map(|v| fmt_f64_to_f32(*v))
                .collect();
            let _ = write!(out, " stroke-dasharray=\"{}\"", dashes.join(","));
        }
        if stroke.dash_offset != 0.0 {
            let _ = write!(
                out,
                " stroke-dashoffset=\"{}\"",
                fmt_f64_to_f32(stroke.dash_offset)
            );
        }
    }

    out
}

fn svg_transform_attr(transform: Affine) -> String {
    let mut attrs = String::new();
    if transform != Affine::IDENTITY {
        let _ = write!(attrs, " transform=\"{}\"", affine_to_svg_matrix(transform));
    }
    attrs
}

fn bez_path_to_svg_d(path: &BezPath) -> String {
    let mut d = String::new();
    for el in path.iter() {
        match el {
            PathEl::MoveTo(p) => {
                let _ = write!(d, "M{} {}", fmt_f64_to_f32(p.x), fmt_f64_to_f32(p.y));
            }
            PathEl::LineTo(p) => {
                let _ = write!(d, "L{} {}", fmt_f64_to_f32(p.x), fmt_f64_to_f32(p.y));
            }
            PathEl::QuadTo(p1, p2) => {
                let _ = write!(
                    d,
                    "Q{} {} {} {}",
                    fmt_f64_to_f32(p1.x),
                    fmt_f64_to_f32(p1.y),
                    fmt_f64_to_f32(p2.x),
                    fmt_f64_to_f32(p2.y)
                );
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {}",
                    fmt_f64_to_f32(p1.x),
                    fmt_f64_to_f32(p1.y),
                    fmt_f64_to_f32(p2.x),
                    fmt_f64_to_f32(p2.y),
                    fmt_f64_to_f32(p3.x),
                    fmt_f64_to_f32(p3.y)
                );
            }
            PathEl::ClosePath => d.push('Z'),
        }
    }
    d
}

fn stroke_cap_svg(cap: Cap) -> &'static str {
    match cap {
        Cap::Butt => "butt",
        Cap::Round => "round",
        Cap::Square => "square",
    }
}

fn stroke_join_svg(join: Join) -> &'static str {
    match join {
        Join::Miter => "miter",
        Join::Round => "round",
        Join::Bevel => "bevel",
    }
}

fn text_anchor_svg(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn text_baseline_svg(baseline: TextBaseline) -> &'static str {
    match baseline {
        TextBaseline::Alphabetic => "alphabetic",
        TextBaseline::Middle => "middle",
        TextBaseline::Hanging => "hanging",
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn color_to_svg(color: Color) -> (String, f32) {
    let rgba = color.to_rgba8();
    let a = f32::from(rgba.a) / 255.0;
    (format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b), a)
}

fn affine_to_svg_matrix(xf: Affine) -> String {
    // [a b c d e f] maps to
    // [ a c e ]
    // [ b d f ]
    let c = xf.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_f64_to_f32(c[0]),
        fmt_f64_to_f32(c[1]),
        fmt_f64_to_f32(c[2]),
        fmt_f64_to_f32(c[3]),
        fmt_f64_to_f32(c[4]),
        fmt_f64_to_f32(c[5]),
    )
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "SVG uses f32-like scalar formatting"
)]
fn fmt_f64_to_f32(v: f64) -> String {
    fmt_f32(v as f32)
}

fn fmt_f32(v: f32) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "best-effort pretty formatting"
    )]
    let i = v as i32;
    let diff = (i as f32) - v;
    if diff > -1e-6 && diff < 1e-6 {
        return format!("{i}");
    }

    let mut s = format!("{v:.3}");
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Circle, Line};
    use sseq_imaging::{ImageId, SurfaceExt};

    #[test]
    fn exports_filled_circle() {
        let mut surface = SvgSurface::default();
        surface.state(StateOp::SetFill(Color::from_rgba8(255, 0, 0, 255)));
        surface.draw(DrawOp::FillCircle(Circle::new((10.0, 20.0), 2.5)));
        let svg = surface.to_svg(100, 80);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<circle cx=\"10\" cy=\"20\" r=\"2.5\" stroke=\"none\" fill=\"#ff0000\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn dashed_stroke_attributes() {
        let mut surface = SvgSurface::default();
        surface.state(StateOp::SetStrokePaint(Color::from_rgba8(0, 0, 255, 128)));
        surface.state(StateOp::SetStroke(
            StrokeStyle::new(1.5).with_dashes(0.0, [4.0, 2.0]),
        ));
        surface.draw(DrawOp::StrokeLine(Line::new((0.0, 0.0), (5.0, 5.0))));
        let svg = surface.to_svg(10, 10);
        assert!(svg.contains("stroke=\"#0000ff\""));
        assert!(svg.contains("stroke-opacity=\"0.502\""));
        assert!(svg.contains("stroke-width=\"1.5\""));
        assert!(svg.contains("stroke-dasharray=\"4,2\""));
    }

    #[test]
    fn clips_become_clip_paths() {
        let mut surface = SvgSurface::default();
        surface.with_clip(Rect::new(0.0, 0.0, 50.0, 40.0), |s| {
            s.draw(DrawOp::FillRect(Rect::new(1.0, 1.0, 2.0, 2.0)));
        });
        let svg = surface.to_svg(100, 80);
        assert!(svg.contains("<clipPath id=\"clip1\"><rect x=\"0\" y=\"0\" width=\"50\" height=\"40\"/></clipPath>"));
        assert!(svg.contains("<g clip-path=\"url(#clip1)\"><rect"));
    }

    #[test]
    fn text_is_escaped_and_anchored() {
        let mut surface = SvgSurface::default();
        surface.state(StateOp::SetTextStyle(TextStyle {
            size: 10.0,
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Hanging,
        }));
        surface.draw(DrawOp::Text {
            origin: (3.0, 4.0).into(),
            text: "a<b & c".into(),
        });
        let svg = surface.to_svg(10, 10);
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("dominant-baseline=\"hanging\""));
        assert!(svg.contains(">a&lt;b &amp; c</text>"));
    }

    #[test]
    fn raster_overlay_is_a_placeholder() {
        let mut surface = SvgSurface::default();
        surface.draw(DrawOp::DrawImage {
            image: OverlayImage::Raster {
                id: ImageId(7),
                width: 4,
                height: 4,
            },
            dst: Rect::new(0.0, 0.0, 20.0, 20.0),
        });
        assert!(surface.to_svg(20, 20).contains("image#7"));
    }

    #[test]
    fn fmt_trims_trailing_zeros() {
        assert_eq!(fmt_f32(3.0), "3");
        assert_eq!(fmt_f32(0.25), "0.25");
        assert_eq!(fmt_f32(-1.5), "-1.5");
    }
}
