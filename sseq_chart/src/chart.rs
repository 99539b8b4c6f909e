// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sseq_undo::{Mementoable, UndoTarget};

use crate::arena::{Arena, ClassId, EdgeId};
use crate::element::{Class, ClassCanvas, Edge, EdgeKind, Overlay};
use crate::error::ChartError;
use crate::page::{INFINITY, PageRange, base_page, normalize_page_list};

/// Chart-wide settings: everything that is not a class or an edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Ordered pages the user can step through.
    pub page_list: Vec<PageRange>,
    /// Lowest page index reachable with "previous".
    pub min_page_idx: usize,
    /// Horizontal clamp range; `None` leaves x unbounded.
    pub x_range: Option<[i64; 2]>,
    /// Vertical clamp range; `None` leaves y unbounded.
    pub y_range: Option<[i64; 2]>,
    /// Horizontal extent of the initial viewport.
    pub initial_x_range: [i64; 2],
    /// Vertical extent of the initial viewport.
    pub initial_y_range: [i64; 2],
    /// Grid style name, validated when drawing.
    pub grid_style: Option<String>,
    /// Structline multipliers that are not drawn.
    pub hidden_structlines: BTreeSet<String>,
    /// Multiplier for the bidegree hover threshold.
    pub bidegree_distance_scale: Option<f64>,
    /// Global class size multiplier.
    pub class_scale: f64,
    /// Image drawn over the chart.
    pub overlay: Option<Overlay>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            page_list: vec![
                PageRange::Span(2, INFINITY),
                PageRange::Span(INFINITY, INFINITY),
            ],
            min_page_idx: 0,
            x_range: Some([0, 20]),
            y_range: Some([0, 20]),
            initial_x_range: [0, 20],
            initial_y_range: [0, 20],
            grid_style: None,
            hidden_structlines: BTreeSet::new(),
            bidegree_distance_scale: None,
            class_scale: 1.0,
            overlay: None,
        }
    }
}

/// Ids of the elements a frame has to draw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementsToDraw {
    /// Visible classes, in id order.
    pub classes: Vec<ClassId>,
    /// Visible edges, in id order.
    pub edges: Vec<EdgeId>,
}

/// A chart: settings plus the class and edge arenas.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(flatten)]
    settings: ChartSettings,
    #[serde(default)]
    classes: Arena<ClassId, Class>,
    #[serde(default)]
    edges: Arena<EdgeId, Edge>,
}

impl Chart {
    /// An empty chart with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a chart snapshot.
    ///
    /// The page list is completed with the base and infinity pages if the
    /// snapshot omits them.
    pub fn from_json_str(json: &str) -> Result<Self, ChartError> {
        let chart: Self = serde_json::from_str(json).map_err(ChartError::Snapshot)?;
        Ok(chart.normalized())
    }

    /// Loads a chart snapshot from an already parsed JSON value.
    pub fn from_json_value(json: Value) -> Result<Self, ChartError> {
        let chart: Self = serde_json::from_value(json).map_err(ChartError::Snapshot)?;
        Ok(chart.normalized())
    }

    /// Serializes the chart as a snapshot.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn normalized(mut self) -> Self {
        normalize_page_list(&mut self.settings.page_list);
        tracing::debug!(
            classes = self.classes.len(),
            edges = self.edges.len(),
            pages = self.settings.page_list.len(),
            "chart loaded"
        );
        self
    }

    /// Chart-wide settings.
    #[must_use]
    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Replaces the settings, re-completing the page list.
    pub fn set_settings(&mut self, settings: ChartSettings) {
        self.settings = settings;
        normalize_page_list(&mut self.settings.page_list);
    }

    /// The page list.
    #[must_use]
    pub fn page_list(&self) -> &[PageRange] {
        &self.settings.page_list
    }

    /// The base page: 1 if the page list has literal page 1, else 2.
    #[must_use]
    pub fn base_page(&self) -> i64 {
        base_page(&self.settings.page_list)
    }

    /// All classes.
    #[must_use]
    pub fn classes(&self) -> &Arena<ClassId, Class> {
        &self.classes
    }

    /// All edges.
    #[must_use]
    pub fn edges(&self) -> &Arena<EdgeId, Edge> {
        &self.edges
    }

    /// The class with this id, if alive.
    #[must_use]
    pub fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(id)
    }

    /// The edge with this id, if alive.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Stores the pixel placement of a class for this frame.
    pub fn set_canvas(&mut self, id: ClassId, canvas: Option<ClassCanvas>) {
        if let Some(class) = self.classes.get_mut(id) {
            class.canvas = canvas;
        }
    }

    /// Elements to draw for `page_range` within the inclusive bidegree box.
    ///
    /// Classes must be alive on the page and inside the box. Edges must be
    /// valid, visible, shown on the page range, not carry a hidden
    /// multiplier, and have a live endpoint inside the box. Edges with a
    /// missing endpoint are returned so the renderer can report them.
    #[must_use]
    pub fn elements_to_draw(
        &self,
        page_range: PageRange,
        x_min: i64,
        x_max: i64,
        y_min: i64,
        y_max: i64,
    ) -> ElementsToDraw {
        let view = page_range.view(self.base_page());
        let shown = |c: &Class| c.alive_on(view.page) && c.in_range(x_min, x_max, y_min, y_max);

        let classes = self
            .classes
            .iter()
            .filter(|(_, c)| shown(c))
            .map(|(id, _)| id)
            .collect();

        let edges = self
            .edges
            .iter()
            .filter(|(_, e)| {
                if !e.is_drawable() || !e.shown_on(&view) {
                    return false;
                }
                if e.kind == EdgeKind::Structline
                    && e.mult
                        .as_ref()
                        .is_some_and(|m| self.settings.hidden_structlines.contains(m))
                {
                    return false;
                }
                match (self.classes.get(e.source), self.classes.get(e.target)) {
                    (Some(s), Some(t)) => {
                        s.alive_on(view.page)
                            && t.alive_on(view.page)
                            && (shown(s) || shown(t))
                    }
                    _ => true,
                }
            })
            .map(|(id, _)| id)
            .collect();

        ElementsToDraw { classes, edges }
    }

    /// Adds a class.
    pub fn add_class(&mut self, class: Class) -> ClassId {
        self.classes.insert(class)
    }

    /// Applies a partial update, `{field: value}`, to a class.
    pub fn update_class(&mut self, id: ClassId, patch: &Map<String, Value>) -> Result<(), ChartError> {
        let class = self.classes.get_mut(id).ok_or(ChartError::UnknownClass(id))?;
        let canvas = class.canvas;
        *class = patched(class, patch)?;
        class.canvas = canvas;
        Ok(())
    }

    /// Deletes a class and every edge touching it.
    ///
    /// Returns the ids of the deleted edges.
    pub fn delete_class(&mut self, id: ClassId) -> Result<Vec<EdgeId>, ChartError> {
        self.classes.remove(id).ok_or(ChartError::UnknownClass(id))?;
        let touching = self.edges_touching(id);
        for edge in &touching {
            self.edges.remove(*edge);
        }
        Ok(touching)
    }

    /// Ids of the edges with `id` as an endpoint.
    #[must_use]
    pub fn edges_touching(&self, id: ClassId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.source == id || e.target == id)
            .map(|(eid, _)| eid)
            .collect()
    }

    /// Adds an edge between two live classes.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, ChartError> {
        for end in [edge.source, edge.target] {
            if !self.classes.contains(end) {
                return Err(ChartError::UnknownClass(end));
            }
        }
        Ok(self.edges.insert(edge))
    }

    /// Applies a partial update, `{field: value}`, to an edge.
    pub fn update_edge(&mut self, id: EdgeId, patch: &Map<String, Value>) -> Result<(), ChartError> {
        let edge = self.edges.get_mut(id).ok_or(ChartError::UnknownEdge(id))?;
        *edge = patched(edge, patch)?;
        Ok(())
    }

    /// Deletes an edge.
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<Edge, ChartError> {
        self.edges.remove(id).ok_or(ChartError::UnknownEdge(id))
    }

    /// Inserts a page range at `index` (clamped to the end of the list).
    pub fn insert_page_range(&mut self, range: PageRange, index: usize) {
        let list = &mut self.settings.page_list;
        let index = index.min(list.len());
        list.insert(index, range);
        normalize_page_list(list);
    }

    /// Sets or clears the horizontal clamp range.
    pub fn set_x_range(&mut self, range: Option<[i64; 2]>) {
        self.settings.x_range = range;
    }

    /// Sets or clears the vertical clamp range.
    pub fn set_y_range(&mut self, range: Option<[i64; 2]>) {
        self.settings.y_range = range;
    }

    /// Sets the horizontal extent of the initial viewport.
    pub fn set_initial_x_range(&mut self, range: [i64; 2]) {
        self.settings.initial_x_range = range;
    }

    /// Sets the vertical extent of the initial viewport.
    pub fn set_initial_y_range(&mut self, range: [i64; 2]) {
        self.settings.initial_y_range = range;
    }

    /// Reads one serialized property of the part named by `key`.
    pub fn field(&self, key: &ElementKey, prop: &str) -> Result<Value, ChartError> {
        let json = match *key {
            ElementKey::Class(id) => {
                serde_json::to_value(self.class(id).ok_or(ChartError::UnknownClass(id))?)
            }
            ElementKey::Edge(id) => {
                serde_json::to_value(self.edge(id).ok_or(ChartError::UnknownEdge(id))?)
            }
            ElementKey::Settings => serde_json::to_value(&self.settings),
        }
        .map_err(ChartError::InvalidField)?;
        json.get(prop)
            .cloned()
            .ok_or_else(|| ChartError::UnknownField(prop.to_owned()))
    }

    /// Sets one serialized property of the part named by `key`.
    pub fn set_field(
        &mut self,
        key: &ElementKey,
        prop: &str,
        value: Value,
    ) -> Result<(), ChartError> {
        let mut patch = Map::new();
        patch.insert(prop.to_owned(), value);
        match *key {
            ElementKey::Class(id) => self.update_class(id, &patch),
            ElementKey::Edge(id) => self.update_edge(id, &patch),
            ElementKey::Settings => {
                let settings = patched(&self.settings, &patch)?;
                self.set_settings(settings);
                Ok(())
            }
        }
    }
}

/// Re-deserializes `value` with some fields replaced.
fn patched<T: Serialize + DeserializeOwned>(
    value: &T,
    patch: &Map<String, Value>,
) -> Result<T, ChartError> {
    let mut json = serde_json::to_value(value).map_err(ChartError::InvalidField)?;
    if let Some(fields) = json.as_object_mut() {
        for (name, v) in patch {
            let slot = fields
                .get_mut(name)
                .ok_or_else(|| ChartError::UnknownField(name.clone()))?;
            *slot = v.clone();
        }
    }
    serde_json::from_value(json).map_err(ChartError::InvalidField)
}

/// Names one undoable part of a chart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ElementKey {
    /// A class slot.
    Class(ClassId),
    /// An edge slot.
    Edge(EdgeId),
    /// The chart settings.
    Settings,
}

/// Captured state of one [`ElementKey`]; `None` means the slot was empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "lowercase")]
pub enum ElementMemento {
    /// A class slot.
    Class(Option<Class>),
    /// An edge slot.
    Edge(Option<Edge>),
    /// The chart settings.
    Settings(Box<ChartSettings>),
}

impl UndoTarget for Chart {
    type Key = ElementKey;
    type Memento = ElementMemento;
    type Value = Value;

    fn capture(&self, key: &ElementKey) -> ElementMemento {
        match *key {
            ElementKey::Class(id) => ElementMemento::Class(self.classes.get(id).map(Class::memento)),
            ElementKey::Edge(id) => ElementMemento::Edge(self.edges.get(id).map(Edge::memento)),
            ElementKey::Settings => ElementMemento::Settings(Box::new(self.settings.clone())),
        }
    }

    fn restore(&mut self, key: &ElementKey, memento: &ElementMemento) {
        match (*key, memento) {
            (ElementKey::Class(id), ElementMemento::Class(state)) => {
                match (self.classes.get_mut(id), state) {
                    (Some(live), Some(saved)) => live.restore_from_memento(saved),
                    (_, saved) => self.classes.put(id, saved.clone()),
                }
            }
            (ElementKey::Edge(id), ElementMemento::Edge(state)) => {
                match (self.edges.get_mut(id), state) {
                    (Some(live), Some(saved)) => live.restore_from_memento(saved),
                    (_, saved) => self.edges.put(id, saved.clone()),
                }
            }
            (ElementKey::Settings, ElementMemento::Settings(saved)) => {
                self.settings.clone_from(saved);
            }
            (key, memento) => {
                tracing::warn!(?key, ?memento, "memento does not match its key, ignored");
            }
        }
    }

    fn set_value(&mut self, key: &ElementKey, prop: &str, value: &Value) {
        if let Err(err) = self.set_field(key, prop, value.clone()) {
            tracing::warn!(?key, prop, %err, "value change could not be applied");
        }
    }
}
