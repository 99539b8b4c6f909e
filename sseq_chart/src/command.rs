// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Remote edit commands.
//!
//! A command arrives as an envelope `{"cmd": [...], "args": [...], "kwargs": {...}}`
//! where `cmd` is a path such as `["chart", "class", "add"]`. The special path
//! `["batched"]` carries a list of envelopes in `args[0]`, applied in order.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::arena::{ClassId, EdgeId};
use crate::chart::{Chart, ElementKey};
use crate::element::{Class, Edge};
use crate::error::{ChartError, CommandError};
use crate::page::PageRange;

/// The raw command envelope.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Envelope {
    /// Command path.
    pub cmd: Vec<String>,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// A decoded chart command.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartCommand {
    /// Replace the whole chart with a snapshot.
    Reset(Box<Chart>),
    /// Add a class.
    AddClass(Class),
    /// Update some fields of a class.
    UpdateClass(ClassId, Map<String, Value>),
    /// Delete a class and its edges.
    DeleteClass(ClassId),
    /// Add an edge.
    AddEdge(Edge),
    /// Update some fields of an edge.
    UpdateEdge(EdgeId, Map<String, Value>),
    /// Delete an edge.
    DeleteEdge(EdgeId),
    /// Insert a page range at an index.
    InsertPageRange {
        /// The range.
        range: PageRange,
        /// Position in the page list.
        index: usize,
    },
    /// Set or clear the horizontal clamp range.
    SetXRange(Option<[i64; 2]>),
    /// Set or clear the vertical clamp range.
    SetYRange(Option<[i64; 2]>),
    /// Set the initial horizontal extent.
    SetInitialXRange([i64; 2]),
    /// Set the initial vertical extent.
    SetInitialYRange([i64; 2]),
    /// Several commands applied in order.
    Batched(Vec<ChartCommand>),
}

impl ChartCommand {
    /// Decodes a JSON message.
    pub fn from_json_str(message: &str) -> Result<Self, CommandError> {
        let value: Value = serde_json::from_str(message)
            .map_err(|e| CommandError::InvalidCommand(format!("malformed JSON: {e}")))?;
        Self::decode(value)
    }

    /// Decodes a parsed envelope.
    pub fn decode(message: Value) -> Result<Self, CommandError> {
        let envelope: Envelope = serde_json::from_value(message)
            .map_err(|e| CommandError::InvalidCommand(format!("malformed envelope: {e}")))?;
        Self::from_envelope(envelope)
    }

    /// Decodes an envelope.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, CommandError> {
        let Envelope { cmd, args, kwargs } = envelope;
        let path: Vec<&str> = cmd.iter().map(String::as_str).collect();
        let name = cmd.join(".");
        let mut args = Args {
            name: &name,
            values: args.into_iter(),
        };

        let command = match path.as_slice() {
            ["batched"] => {
                let items: Vec<Value> = args.next()?;
                let commands = items
                    .into_iter()
                    .map(Self::decode)
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Batched(commands)
            }
            ["chart", "reset"] => {
                let snapshot: Value = args.next()?;
                let chart = Chart::from_json_value(snapshot)
                    .map_err(|e| CommandError::InvalidCommand(format!("{name}: {e}")))?;
                Self::Reset(Box::new(chart))
            }
            ["chart", "class", "add"] => Self::AddClass(args.next()?),
            ["chart", "class", "update"] => Self::UpdateClass(args.next()?, kwargs),
            ["chart", "class", "delete"] => Self::DeleteClass(args.next()?),
            ["chart", "edge", "add"] => Self::AddEdge(args.next()?),
            ["chart", "edge", "update"] => Self::UpdateEdge(args.next()?, kwargs),
            ["chart", "edge", "delete"] => Self::DeleteEdge(args.next()?),
            ["chart", "page_range", "insert"] => Self::InsertPageRange {
                range: args.next()?,
                index: args.next()?,
            },
            ["chart", "x_range", "set"] => Self::SetXRange(args.next()?),
            ["chart", "y_range", "set"] => Self::SetYRange(args.next()?),
            ["chart", "initial_x_range", "set"] => Self::SetInitialXRange(args.next()?),
            ["chart", "initial_y_range", "set"] => Self::SetInitialYRange(args.next()?),
            _ => return Err(CommandError::UnknownCommand(name)),
        };
        Ok(command)
    }

    /// Whether this command replaces the chart wholesale.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        match self {
            Self::Reset(_) => true,
            Self::Batched(items) => items.iter().any(Self::is_reset),
            _ => false,
        }
    }

    /// The parts of `chart` this (non-batched) command would touch if applied
    /// now. Empty for resets and batches.
    #[must_use]
    pub fn affected_keys(&self, chart: &Chart) -> Vec<ElementKey> {
        match self {
            Self::Reset(_) | Self::Batched(_) => Vec::new(),
            Self::AddClass(_) => vec![ElementKey::Class(chart.classes().next_id())],
            Self::UpdateClass(id, _) => vec![ElementKey::Class(*id)],
            Self::DeleteClass(id) => core::iter::once(ElementKey::Class(*id))
                .chain(chart.edges_touching(*id).into_iter().map(ElementKey::Edge))
                .collect(),
            Self::AddEdge(_) => vec![ElementKey::Edge(chart.edges().next_id())],
            Self::UpdateEdge(id, _) | Self::DeleteEdge(id) => vec![ElementKey::Edge(*id)],
            Self::InsertPageRange { .. }
            | Self::SetXRange(_)
            | Self::SetYRange(_)
            | Self::SetInitialXRange(_)
            | Self::SetInitialYRange(_) => vec![ElementKey::Settings],
        }
    }
}

struct Args<'a> {
    name: &'a str,
    values: std::vec::IntoIter<Value>,
}

impl Args<'_> {
    fn next<T: DeserializeOwned>(&mut self) -> Result<T, CommandError> {
        let value = self.values.next().ok_or_else(|| {
            CommandError::InvalidCommand(format!("{}: missing argument", self.name))
        })?;
        serde_json::from_value(value)
            .map_err(|e| CommandError::InvalidCommand(format!("{}: {e}", self.name)))
    }
}

impl Chart {
    /// Applies a command.
    ///
    /// A batch stops at the first failing command; the commands before it stay
    /// applied.
    pub fn apply(&mut self, command: ChartCommand) -> Result<(), ChartError> {
        match command {
            ChartCommand::Reset(chart) => *self = *chart,
            ChartCommand::AddClass(class) => {
                self.add_class(class);
            }
            ChartCommand::UpdateClass(id, patch) => self.update_class(id, &patch)?,
            ChartCommand::DeleteClass(id) => {
                self.delete_class(id)?;
            }
            ChartCommand::AddEdge(edge) => {
                self.add_edge(edge)?;
            }
            ChartCommand::UpdateEdge(id, patch) => self.update_edge(id, &patch)?,
            ChartCommand::DeleteEdge(id) => {
                self.delete_edge(id)?;
            }
            ChartCommand::InsertPageRange { range, index } => self.insert_page_range(range, index),
            ChartCommand::SetXRange(range) => self.set_x_range(range),
            ChartCommand::SetYRange(range) => self.set_y_range(range),
            ChartCommand::SetInitialXRange(range) => self.set_initial_x_range(range),
            ChartCommand::SetInitialYRange(range) => self.set_initial_y_range(range),
            ChartCommand::Batched(commands) => {
                for command in commands {
                    self.apply(command)?;
                }
            }
        }
        Ok(())
    }
}
