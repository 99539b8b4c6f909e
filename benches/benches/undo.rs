// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use sseq_chart::{Chart, ChartCommand, ChartHistory, Class, ClassId, Edge, apply_with_history};
use sseq_undo::UndoLogEntry;

fn edit_script(n: usize) -> Vec<ChartCommand> {
    let mut script = Vec::with_capacity(n);
    for i in 0..n {
        let x = i64::try_from(i % 40).unwrap_or(0);
        let y = i64::try_from(i / 40).unwrap_or(0);
        let id = ClassId(u32::try_from(i).unwrap_or(0));
        if i == 0 {
            script.push(ChartCommand::AddClass(Class::new(x, y)));
        } else {
            script.push(ChartCommand::Batched(vec![
                ChartCommand::AddClass(Class::new(x, y)),
                ChartCommand::AddEdge(Edge::structline(ClassId(id.0 - 1), id)),
            ]));
        }
    }
    script
}

fn edited(n: usize) -> (Chart, ChartHistory) {
    let mut chart = Chart::new();
    let mut history = ChartHistory::new();
    for cmd in edit_script(n) {
        apply_with_history(&mut chart, &mut history, cmd).expect("script applies");
    }
    (chart, history)
}

fn bench_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("sseq_undo");

    for &n in &[64_usize, 1_024_usize] {
        group.bench_function(format!("apply_with_history(n={n})"), |b| {
            b.iter_batched(
                || edit_script(n),
                |script| {
                    let mut chart = Chart::new();
                    let mut history = ChartHistory::new();
                    for cmd in script {
                        apply_with_history(&mut chart, &mut history, cmd).expect("script applies");
                    }
                    black_box(history.undo_len());
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("undo_redo_all(n={n})"), |b| {
            b.iter_batched(
                || edited(n),
                |(mut chart, mut history)| {
                    while history.undo(&mut chart) {}
                    while history.redo(&mut chart) {}
                    black_box(chart);
                },
                BatchSize::LargeInput,
            );
        });

        let (chart, history) = edited(n);
        let text = serde_json::to_string(&history.to_log()).expect("log serializes");
        group.bench_function(format!("log_round_trip(n={n})"), |b| {
            b.iter(|| {
                let log: Vec<UndoLogEntry<Chart>> =
                    serde_json::from_str(&text).expect("log parses");
                black_box(ChartHistory::from_log(log, &chart));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_undo);
criterion_main!(benches);
