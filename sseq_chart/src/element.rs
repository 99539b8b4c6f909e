// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart elements: classes, edges and the overlay image.

use kurbo::{Circle, Point, Vec2};
use serde::{Deserialize, Serialize};
use sseq_undo::{Mementoable, PlainRecord};

use crate::arena::ClassId;
use crate::page::{INFINITY, PageView};

/// Opaque black.
pub const BLACK: [u8; 4] = [0, 0, 0, 255];

fn one() -> f64 {
    1.0
}

fn black() -> [u8; 4] {
    BLACK
}

/// Pixel placement of a class, derived on every frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClassCanvas {
    /// Center in pixels.
    pub center: Point,
    /// Radius in pixels.
    pub radius: f64,
}

impl ClassCanvas {
    /// The disc drawn for the class; also its hit region.
    #[must_use]
    pub fn disc(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }

    /// Whether `point` lies inside the disc.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (point - self.center).hypot2() <= self.radius * self.radius
    }
}

/// A node on the integer grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Horizontal bidegree.
    pub x: i64,
    /// Vertical bidegree.
    pub y: i64,
    /// Label shown to the user.
    #[serde(default)]
    pub name: String,
    /// Size multiplier.
    #[serde(default = "one")]
    pub size: f64,
    /// Horizontal pixel offset from the grid point.
    #[serde(default)]
    pub x_offset: f64,
    /// Vertical pixel offset from the grid point.
    #[serde(default)]
    pub y_offset: f64,
    /// Whether to draw a highlight ring under the class.
    #[serde(default)]
    pub highlight: bool,
    /// Fill color as RGBA8.
    #[serde(default = "black")]
    pub color: [u8; 4],
    /// Last page on which the class is alive; `None` for every page.
    #[serde(default)]
    pub max_page: Option<i64>,
    /// Pixel placement from the last frame.
    #[serde(skip)]
    pub canvas: Option<ClassCanvas>,
}

impl Class {
    /// A class at `(x, y)` with default styling.
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            name: String::new(),
            size: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
            highlight: false,
            color: BLACK,
            max_page: None,
            canvas: None,
        }
    }

    /// Bidegree as a domain point.
    #[must_use]
    pub fn bidegree(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Pixel offset from the grid point.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x_offset, self.y_offset)
    }

    /// Whether the class survives to `page`.
    #[must_use]
    pub fn alive_on(&self, page: i64) -> bool {
        self.max_page.is_none_or(|max| page <= max)
    }

    /// Whether the bidegree lies in the inclusive box.
    #[must_use]
    pub fn in_range(&self, x_min: i64, x_max: i64, y_min: i64, y_max: i64) -> bool {
        (x_min..=x_max).contains(&self.x) && (y_min..=y_max).contains(&self.y)
    }
}

impl Mementoable for Class {
    type Memento = Self;

    fn memento(&self) -> Self {
        Self {
            canvas: None,
            ..self.clone()
        }
    }

    fn restore_from_memento(&mut self, memento: &Self) {
        self.clone_from(memento);
        // Placement is stale until the next frame.
        self.canvas = None;
    }
}

/// What an edge means.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// A differential, drawn only on the pages it acts on.
    Differential,
    /// A structure line, drawn over a span of pages.
    Structline,
}

bitflags::bitflags! {
    /// Edge flags controlling whether an edge is drawn.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EdgeFlags: u8 {
        /// Edge is mathematically valid.
        const VALID   = 0b0000_0001;
        /// Edge is visible.
        const VISIBLE = 0b0000_0010;
    }
}

impl Default for EdgeFlags {
    fn default() -> Self {
        Self::VALID | Self::VISIBLE
    }
}

/// A typed connection between two classes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgeRecord", into = "EdgeRecord")]
pub struct Edge {
    /// Source class.
    pub source: ClassId,
    /// Target class.
    pub target: ClassId,
    /// Differential or structline.
    pub kind: EdgeKind,
    /// Validity and visibility.
    pub flags: EdgeFlags,
    /// Bend in degrees; unset or zero draws a straight line.
    pub bend: Option<f64>,
    /// Control-point distance as a fraction of the edge length.
    pub looseness: Option<f64>,
    /// Stroke color as RGBA8.
    pub color: [u8; 4],
    /// Stroke width in pixels.
    pub line_width: f64,
    /// Dash pattern in pixels; empty for solid.
    pub dash: Vec<f64>,
    /// Pixel offset applied at the source end.
    pub source_offset: [f64; 2],
    /// Pixel offset applied at the target end.
    pub target_offset: [f64; 2],
    /// For a differential, the page it acts on.
    pub page: i64,
    /// For a structline, the first page it is shown on.
    pub page_min: i64,
    /// For a structline, the last page it is shown on.
    pub page_max: i64,
    /// Structline multiplier label, checked against the chart's hidden set.
    pub mult: Option<String>,
}

impl PlainRecord for Edge {}

impl Edge {
    /// A differential on `page` from `source` to `target`.
    #[must_use]
    pub fn differential(source: ClassId, target: ClassId, page: i64) -> Self {
        let mut edge = Self::structline(source, target);
        edge.kind = EdgeKind::Differential;
        edge.page = page;
        edge
    }

    /// A structline from `source` to `target` shown on every page.
    #[must_use]
    pub fn structline(source: ClassId, target: ClassId) -> Self {
        Self {
            source,
            target,
            kind: EdgeKind::Structline,
            flags: EdgeFlags::default(),
            bend: None,
            looseness: None,
            color: BLACK,
            line_width: 1.0,
            dash: Vec::new(),
            source_offset: [0.0; 2],
            target_offset: [0.0; 2],
            page: 0,
            page_min: 0,
            page_max: INFINITY,
            mult: None,
        }
    }

    /// Whether the edge should be drawn at all.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.flags.contains(EdgeFlags::VALID | EdgeFlags::VISIBLE)
    }

    /// Whether the page view shows this edge.
    #[must_use]
    pub fn shown_on(&self, view: &PageView) -> bool {
        match self.kind {
            EdgeKind::Differential => view
                .differentials
                .is_some_and(|(lo, hi)| (lo..=hi).contains(&self.page)),
            EdgeKind::Structline => (self.page_min..=self.page_max).contains(&view.page),
        }
    }
}

fn max_page() -> i64 {
    INFINITY
}

fn yes() -> bool {
    true
}

/// Wire form of [`Edge`]: flags travel as two booleans.
#[derive(Clone, Serialize, Deserialize)]
struct EdgeRecord {
    source: ClassId,
    target: ClassId,
    kind: EdgeKind,
    #[serde(default = "yes")]
    valid: bool,
    #[serde(default = "yes")]
    visible: bool,
    #[serde(default)]
    bend: Option<f64>,
    #[serde(default)]
    looseness: Option<f64>,
    #[serde(default = "black")]
    color: [u8; 4],
    #[serde(default = "one")]
    line_width: f64,
    #[serde(default)]
    dash: Vec<f64>,
    #[serde(default)]
    source_offset: [f64; 2],
    #[serde(default)]
    target_offset: [f64; 2],
    #[serde(default)]
    page: i64,
    #[serde(default)]
    page_min: i64,
    #[serde(default = "max_page")]
    page_max: i64,
    #[serde(default)]
    mult: Option<String>,
}

impl From<EdgeRecord> for Edge {
    fn from(r: EdgeRecord) -> Self {
        let mut flags = EdgeFlags::empty();
        flags.set(EdgeFlags::VALID, r.valid);
        flags.set(EdgeFlags::VISIBLE, r.visible);
        Self {
            source: r.source,
            target: r.target,
            kind: r.kind,
            flags,
            bend: r.bend,
            looseness: r.looseness,
            color: r.color,
            line_width: r.line_width,
            dash: r.dash,
            source_offset: r.source_offset,
            target_offset: r.target_offset,
            page: r.page,
            page_min: r.page_min,
            page_max: r.page_max,
            mult: r.mult,
        }
    }
}

impl From<Edge> for EdgeRecord {
    fn from(e: Edge) -> Self {
        Self {
            source: e.source,
            target: e.target,
            kind: e.kind,
            valid: e.flags.contains(EdgeFlags::VALID),
            visible: e.flags.contains(EdgeFlags::VISIBLE),
            bend: e.bend,
            looseness: e.looseness,
            color: e.color,
            line_width: e.line_width,
            dash: e.dash,
            source_offset: e.source_offset,
            target_offset: e.target_offset,
            page: e.page,
            page_min: e.page_min,
            page_max: e.page_max,
            mult: e.mult,
        }
    }
}

/// Where overlay pixels come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlaySource {
    /// Inline SVG markup.
    Svg {
        /// The markup.
        markup: String,
    },
    /// A host raster image.
    Raster {
        /// Host image id.
        id: u32,
        /// Intrinsic width in pixels.
        width: u32,
        /// Intrinsic height in pixels.
        height: u32,
    },
}

/// An image drawn over the chart, stretched over a domain rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Image source.
    pub source: OverlaySource,
    /// Domain x extent `[left, right]`.
    pub x_range: [f64; 2],
    /// Domain y extent `[bottom, top]`.
    pub y_range: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageRange;

    #[test]
    fn class_memento_drops_canvas() {
        let mut c = Class::new(1, 2);
        c.canvas = Some(ClassCanvas {
            center: Point::new(5.0, 5.0),
            radius: 3.0,
        });
        let saved = c.memento();
        assert!(saved.canvas.is_none());
        c.name = "h_0".into();
        c.restore_from_memento(&saved);
        assert_eq!(c, Class::new(1, 2));
    }

    #[test]
    fn disc_contains_boundary() {
        let canvas = ClassCanvas {
            center: Point::new(0.0, 0.0),
            radius: 2.0,
        };
        assert!(canvas.contains(Point::new(2.0, 0.0)));
        assert!(!canvas.contains(Point::new(1.5, 1.5)));
    }

    #[test]
    fn differentials_follow_the_page_view() {
        let d = Edge::differential(ClassId(0), ClassId(1), 3);
        assert!(d.shown_on(&PageRange::Span(3, 3).view(2)));
        assert!(d.shown_on(&PageRange::Span(2, INFINITY).view(2)));
        assert!(!d.shown_on(&PageRange::Span(4, 4).view(2)));
        assert!(!d.shown_on(&PageRange::Page(1).view(2)));
    }

    #[test]
    fn structlines_follow_their_page_span() {
        let mut s = Edge::structline(ClassId(0), ClassId(1));
        s.page_max = 3;
        assert!(s.shown_on(&PageRange::Span(2, INFINITY).view(2)));
        assert!(!s.shown_on(&PageRange::Span(4, 4).view(2)));
    }

    #[test]
    fn edge_flags_travel_as_booleans() {
        let json = r#"{"source": 0, "target": 1, "kind": "structline", "visible": false}"#;
        let e: Edge = serde_json::from_str(json).unwrap();
        assert_eq!(e.flags, EdgeFlags::VALID);
        assert!(!e.is_drawable());
        let back = serde_json::to_value(&e).unwrap();
        assert_eq!(back["visible"], false);
        assert_eq!(back["valid"], true);
        assert_eq!(back["page_max"], INFINITY);
    }

    #[test]
    fn null_bend_is_straight() {
        let json = r#"{"source": 0, "target": 1, "kind": "structline", "bend": null}"#;
        let e: Edge = serde_json::from_str(json).unwrap();
        assert_eq!(e.bend, None);
        let e: Edge =
            serde_json::from_str(r#"{"source": 0, "target": 1, "kind": "structline", "bend": 25}"#)
                .unwrap();
        assert_eq!(e.bend, Some(25.0));
    }

    #[test]
    fn class_defaults() {
        let c: Class = serde_json::from_str(r#"{"x": 3, "y": 1}"#).unwrap();
        assert_eq!(c, Class::new(3, 1));
        assert!(c.alive_on(INFINITY));
    }
}
