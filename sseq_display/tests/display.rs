// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driving a `Display` the way a host does: input, frame callbacks, remote
//! commands, and export.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Vec2};
use serde_json::json;
use sseq_chart::{Chart, ClassId, EdgeId, ElementKey, PageRange};
use sseq_display::{
    ClickEvent, Display, DisplayConfig, DisplayEvent, ManualScheduler, RenderError,
};
use sseq_imaging::RecordingSurface;

const SNAPSHOT: &str = r#"{
    "page_list": [[2, 10000], [3, 3], [10000, 10000]],
    "x_range": [0, 10],
    "y_range": [0, 10],
    "initial_x_range": [0, 10],
    "initial_y_range": [0, 10],
    "classes": [
        {"x": 1, "y": 1, "name": "a"},
        {"x": 2, "y": 2, "name": "b"},
        {"x": 3, "y": 1, "name": "c", "highlight": true, "max_page": 2}
    ],
    "edges": [
        {"source": 0, "target": 1, "kind": "structline"}
    ]
}"#;

type TestDisplay = Display<RecordingSurface, ManualScheduler>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn display_for(snapshot: &str) -> TestDisplay {
    init_tracing();
    let chart = Chart::from_json_str(snapshot).unwrap();
    Display::new(
        chart,
        DisplayConfig::default(),
        RecordingSurface::default(),
        ManualScheduler::new(),
    )
    .unwrap()
}

fn display() -> TestDisplay {
    let mut d = display_for(SNAPSHOT);
    d.initialize(660.0, 560.0).unwrap();
    d
}

fn record(d: &mut TestDisplay) -> Rc<RefCell<Vec<DisplayEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    d.events()
        .subscribe(move |e: &DisplayEvent| sink.borrow_mut().push(e.clone()));
    log
}

fn pixel(d: &TestDisplay, x: f64, y: f64) -> Point {
    d.viewport().to_pixel(Point::new(x, y))
}

/// Runs every outstanding frame callback; returns how many painted.
fn run_frames(d: &mut TestDisplay) -> usize {
    let n = d.scheduler_mut().take_frames();
    (0..n).filter(|_| d.on_animation_frame().unwrap()).count()
}

fn add_class(x: i64, y: i64) -> String {
    json!({"cmd": ["chart", "class", "add"], "args": [{"x": x, "y": y}]}).to_string()
}

#[test]
fn batched_requests_paint_once() {
    let mut d = display();
    assert_eq!(d.frames_drawn(), 1);

    for i in 0..5 {
        d.apply_message(&add_class(i, 5)).unwrap();
    }
    assert_eq!(d.scheduler().frames, 5);
    assert_eq!(run_frames(&mut d), 1);
    assert_eq!(d.frames_drawn(), 2);
    assert_eq!(d.visible_classes().len(), 8);

    // A callback with nothing pending is a no-op.
    assert!(!d.on_animation_frame().unwrap());
}

#[test]
fn batched_envelope_is_one_frame_and_one_undo_step() {
    let mut d = display();
    let batch = json!({"cmd": ["batched"], "args": [[
        {"cmd": ["chart", "class", "add"], "args": [{"x": 4, "y": 4}]},
        {"cmd": ["chart", "class", "add"], "args": [{"x": 5, "y": 4}]},
        {"cmd": ["chart", "edge", "add"], "args": [{"source": 3, "target": 4, "kind": "structline"}]},
    ]]});
    d.apply_message(&batch.to_string()).unwrap();
    assert_eq!(d.scheduler_mut().take_frames(), 1);
    assert_eq!(d.history().undo_len(), 1);
    assert_eq!(d.chart().classes().len(), 5);

    assert!(d.undo());
    assert_eq!(d.chart().classes().len(), 3);
}

#[test]
fn bad_messages_are_rejected_without_side_effects() {
    let mut d = display();
    let before = d.chart().clone();
    let unknown = json!({"cmd": ["chart", "class", "explode"], "args": []}).to_string();
    assert!(d.apply_message(&unknown).is_err());
    assert!(d.apply_message("{\"cmd\": 7}").is_err());
    let missing = json!({"cmd": ["chart", "edge", "delete"], "args": [9]}).to_string();
    assert!(d.apply_message(&missing).is_err());
    assert_eq!(d.chart(), &before);
    assert_eq!(d.scheduler().frames, 0);
    assert!(!d.history().can_undo());
}

#[test]
fn hover_events_fire_on_change_only() {
    let mut d = display();
    let log = record(&mut d);
    let frames = d.frames_drawn();

    d.pointer_move(pixel(&d, 1.0, 1.0)).unwrap();
    assert_eq!(
        log.borrow()[..2],
        [
            DisplayEvent::MouseoverClass(ClassId(0)),
            DisplayEvent::MouseoverBidegree((1, 1)),
        ]
    );
    // The hover redraw is synchronous.
    assert_eq!(d.frames_drawn(), frames + 1);
    assert!(matches!(log.borrow()[2], DisplayEvent::FrameDrawn(_)));

    log.borrow_mut().clear();
    d.pointer_move(pixel(&d, 1.0, 1.0) + Vec2::new(3.0, 2.0)).unwrap();
    assert!(log.borrow().is_empty());
    assert_eq!(d.frames_drawn(), frames + 1);

    d.pointer_move(pixel(&d, 6.0, 6.0)).unwrap();
    let events = log.borrow().clone();
    assert_eq!(
        events[..3],
        [
            DisplayEvent::MouseoutClass(ClassId(0)),
            DisplayEvent::MouseoutBidegree((1, 1)),
            DisplayEvent::MouseoverBidegree((6, 6)),
        ]
    );
    assert_eq!(d.hovered_class(), None);

    log.borrow_mut().clear();
    d.pointer_leave().unwrap();
    assert_eq!(log.borrow()[0], DisplayEvent::MouseoutBidegree((6, 6)));
    assert_eq!(d.hovered_bidegree(), None);
}

#[test]
fn bidegree_threshold_scales_with_chart() {
    let mut d = display();
    let near_miss = pixel(&d, 7.0, 7.0) + Vec2::new(20.0, 0.0);
    d.pointer_move(near_miss).unwrap();
    assert_eq!(d.hovered_bidegree(), None);

    d.set_value(ElementKey::Settings, "bidegree_distance_scale", json!(2.0))
        .unwrap();
    run_frames(&mut d);
    assert_eq!(d.hovered_bidegree(), Some((7, 7)));
}

#[test]
fn click_describes_what_is_under_the_pointer() {
    let mut d = display();
    let log = record(&mut d);

    let at = pixel(&d, 2.0, 2.0) + Vec2::new(10.0, 0.0);
    d.pointer_move(at).unwrap();
    d.pointer_down(at);
    let click = d.pointer_up(at).unwrap();
    assert_eq!((click.x, click.y), (2, 2));
    assert_eq!(click.class, Some(ClassId(1)));
    assert_eq!(click.bidegree, Some((2, 2)));
    // Distances are in domain units, not pixels.
    let unit = d.viewport().x_scale().unit_span();
    assert!(
        (click.distance - 10.0 / unit).abs() < 1e-9,
        "distance {} for a 10px offset at {unit}px per unit",
        click.distance
    );
    assert!(click.distance < 0.5, "within half a unit of the bidegree");
    assert!((click.real_x - 2.0).abs() < 0.3);

    let clicks: Vec<ClickEvent> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            DisplayEvent::Click(c) => Some(c.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(clicks, [click]);

    // Empty space still reports the nearest bidegree.
    let far = pixel(&d, 8.4, 3.4);
    let click = d.on_click(far);
    assert_eq!((click.x, click.y), (8, 3));
    assert_eq!(click.class, None);
    assert_eq!(click.bidegree, None);
}

#[test]
fn click_reports_the_bidegree_already_hovered() {
    let mut d = display();
    d.set_value(ElementKey::Settings, "bidegree_distance_scale", json!(3.0))
        .unwrap();
    run_frames(&mut d);

    d.pointer_move(pixel(&d, 2.1, 2.0)).unwrap();
    assert_eq!(d.hovered_bidegree(), Some((2, 2)));

    // (3, 2) is nearer, but (2, 2) is hovered and still within range.
    let click = d.on_click(pixel(&d, 2.6, 2.0));
    assert_eq!((click.x, click.y), (3, 2));
    assert_eq!(click.bidegree, Some((2, 2)));
}

#[test]
fn dragging_pans_instead_of_clicking() {
    let mut d = display();
    let center = d.viewport().plot_rect().center();
    d.wheel(-500.0, center);
    assert_eq!(run_frames(&mut d), 1);

    let before = d.viewport().to_domain(center);
    d.pointer_down(center);
    d.pointer_move(center + Vec2::new(1.0, 0.0)).unwrap();
    assert_eq!(d.viewport().to_domain(center), before);
    d.pointer_move(center + Vec2::new(40.0, 0.0)).unwrap();
    assert!(d.pointer_up(center + Vec2::new(60.0, 0.0)).is_none());

    let after = d.viewport().to_domain(center);
    assert!(after.x < before.x);
    assert!((after.y - before.y).abs() < 1e-9);
    assert_eq!(run_frames(&mut d), 1);
}

#[test]
fn seek_recenters_and_cancels_the_previous_one() {
    let mut d = display();
    let log = record(&mut d);
    let center = d.viewport().plot_rect().center();
    d.wheel(-500.0, center);
    run_frames(&mut d);

    d.seek(Point::new(3.0, 3.0));
    assert!(d.scheduler().step_timer.is_some());
    d.on_seek_step().unwrap();
    d.seek(Point::new(6.0, 6.0));

    let mut steps = 0;
    while d.scheduler().step_timer.is_some() {
        d.on_seek_step().unwrap();
        steps += 1;
        assert!(steps <= d.config().seek_steps);
    }
    let reached = d.viewport().to_domain(center);
    assert!((reached.x - 6.0).abs() < 1e-6);
    assert!((reached.y - 6.0).abs() < 1e-6);

    let finished = log
        .borrow()
        .iter()
        .filter(|e| matches!(e, DisplayEvent::SeekFinished(_)))
        .count();
    assert_eq!(finished, 1);
}

#[test]
fn unknown_grid_style_fails_the_frame_only() {
    let mut d = display();
    let transform = d.viewport().transform();
    d.set_value(ElementKey::Settings, "grid_style", json!("hex"))
        .unwrap();

    d.scheduler_mut().take_frames();
    assert_eq!(
        d.on_animation_frame(),
        Err(RenderError::UnknownGridStyle("hex".into()))
    );
    assert!(d.last_error().is_some());
    assert_eq!(d.viewport().transform(), transform);
    assert_eq!(d.history().undo_len(), 1);

    assert!(d.undo());
    assert_eq!(run_frames(&mut d), 1);
    assert!(d.last_error().is_none());

    d.set_value(ElementKey::Settings, "grid_style", json!("chess"))
        .unwrap();
    assert_eq!(run_frames(&mut d), 1);
}

#[test]
fn missing_endpoint_fails_until_the_edge_is_removed() {
    let mut d = display_for(
        r#"{"classes": [{"x": 1, "y": 1}], "edges": [{"source": 0, "target": 7, "kind": "structline"}]}"#,
    );
    assert_eq!(
        d.initialize(660.0, 560.0),
        Err(RenderError::MissingEndpoint {
            edge: EdgeId(0),
            class: ClassId(7),
        })
    );
    assert_eq!(d.frames_drawn(), 0);

    let delete = json!({"cmd": ["chart", "edge", "delete"], "args": [0]}).to_string();
    d.apply_message(&delete).unwrap();
    assert_eq!(run_frames(&mut d), 1);
    assert_eq!(d.visible_classes(), [ClassId(0)]);
}

#[test]
fn paging_filters_classes_and_reports_changes() {
    let mut d = display();
    let log = record(&mut d);

    assert!(d.next_page());
    assert_eq!(
        log.borrow()[0],
        DisplayEvent::PageChanged {
            index: 1,
            range: PageRange::Span(3, 3),
        }
    );
    run_frames(&mut d);
    assert_eq!(d.visible_classes(), [ClassId(0), ClassId(1)]);

    d.set_page(99);
    assert_eq!(d.pages().index(), 0);
    assert!(!d.previous_page());
    run_frames(&mut d);
    assert_eq!(d.visible_classes().len(), 3);
}

#[test]
fn value_edits_undo_and_survive_the_log() {
    let mut d = display();
    d.set_value(ElementKey::Class(ClassId(0)), "name", json!("h_0"))
        .unwrap();
    d.apply_message(&add_class(9, 9)).unwrap();
    assert_eq!(d.chart().class(ClassId(0)).unwrap().name, "h_0");

    let log = serde_json::to_string(&d.undo_log()).unwrap();
    let mut restored = display_for(SNAPSHOT);
    for msg in [
        json!({"cmd": ["chart", "class", "update"], "args": [0], "kwargs": {"name": "h_0"}}),
        serde_json::from_str(&add_class(9, 9)).unwrap(),
    ] {
        restored.apply_message(&msg.to_string()).unwrap();
    }
    restored.restore_undo_log(serde_json::from_str(&log).unwrap());
    assert_eq!(restored.history().undo_len(), 2);

    assert!(restored.undo() && restored.undo());
    assert!(!restored.undo());
    assert_eq!(restored.chart(), &Chart::from_json_str(SNAPSHOT).unwrap());
    assert!(restored.redo());
    assert_eq!(restored.chart().class(ClassId(0)).unwrap().name, "h_0");
}

#[test]
fn export_draws_the_visible_classes() {
    let mut d = display();
    let painted = d.surface().draw_count();
    let svg = d.export_svg().unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("width=\"660\" height=\"560\""));
    // Three classes plus the highlight halo under `c`.
    assert_eq!(svg.matches("<circle").count(), 4);
    assert!(svg.contains("fill=\"#000000\""));
    assert!(svg.contains("<path"));
    assert_eq!(d.surface().draw_count(), painted);
}
