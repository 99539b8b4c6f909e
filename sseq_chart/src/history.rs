// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applying commands as undoable edits.

use sseq_undo::{UndoManager, UndoTarget};

use crate::chart::Chart;
use crate::command::ChartCommand;
use crate::error::ChartError;

/// Undo history of a chart.
pub type ChartHistory = UndoManager<Chart>;

/// Applies `command` as one undo step.
///
/// Every element the command touches is captured before and after, inside a
/// single transaction; a batch becomes one step. If any part fails, the parts
/// already applied are rolled back and nothing is recorded.
///
/// A reset cannot be undone: it is applied and the history is cleared. A
/// batch holding a reset is applied to a copy first, so a failure leaves both
/// the chart and the history as they were.
pub fn apply_with_history(
    chart: &mut Chart,
    history: &mut ChartHistory,
    command: ChartCommand,
) -> Result<(), ChartError> {
    if command.is_reset() {
        let mut staged = chart.clone();
        staged.apply(command)?;
        history.abort_transaction();
        *chart = staged;
        history.clear();
        tracing::debug!("chart reset, undo history cleared");
        return Ok(());
    }

    let nested = history.is_open();
    history.begin_transaction();
    if let Err(err) = apply_recorded(chart, history, command) {
        if !nested && let Some(partial) = history.abort_transaction() {
            for m in partial.mutations().iter().rev() {
                chart.restore(&m.key, &m.before);
            }
        }
        return Err(err);
    }
    if !nested {
        history.commit_transaction();
    }
    Ok(())
}

fn apply_recorded(
    chart: &mut Chart,
    history: &mut ChartHistory,
    command: ChartCommand,
) -> Result<(), ChartError> {
    if let ChartCommand::Batched(commands) = command {
        for command in commands {
            apply_recorded(chart, history, command)?;
        }
        return Ok(());
    }
    let keys = command.affected_keys(chart);
    let before: Vec<_> = keys.iter().map(|k| chart.capture(k)).collect();
    chart.apply(command)?;
    for (key, before) in keys.into_iter().zip(before) {
        let after = chart.capture(&key);
        history.record_mutation(key, before, after);
    }
    Ok(())
}
