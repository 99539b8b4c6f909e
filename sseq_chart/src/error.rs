// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::arena::{ClassId, EdgeId};

/// Errors raised by chart mutations and snapshot loading.
#[derive(Error, Debug)]
pub enum ChartError {
    /// The snapshot is not a valid chart.
    #[error("invalid chart snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
    /// No live class has this id.
    #[error("unknown class {0}")]
    UnknownClass(ClassId),
    /// No live edge has this id.
    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),
    /// An update names a field the element does not have.
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// An update gives a field a value of the wrong shape.
    #[error("invalid field value: {0}")]
    InvalidField(#[source] serde_json::Error),
}

/// Errors raised while decoding or applying a remote command.
///
/// These are reported back to the transport; they never reach the render loop.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The message is not a well-formed command envelope, or its arguments
    /// do not fit the command.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    /// The command path is not one this chart understands.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// The command was well formed but the chart rejected it.
    #[error(transparent)]
    Chart(#[from] ChartError),
}
