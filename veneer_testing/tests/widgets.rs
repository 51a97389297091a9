// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Widget lifecycle, thread affinity, and remote event dispatch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use veneer::app::DisplayOptions;
use veneer::core::{Error, EventType, Rect, Style};
use veneer::widgets::{
    Button, Canvas, Composite, Container, Control, Label, ProgressBar, Shell, TabFolder, TabItem,
    Text, Widget,
};
use veneer_testing::{DrawOp, TestHarness};

#[test]
fn widget_calls_fail_off_the_display_thread() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();

    std::thread::scope(|scope| {
        let button_ref = &button;
        let shell_ref = &shell;
        scope
            .spawn(move || {
                assert_matches!(
                    button_ref.set_text("nope"),
                    Err(Error::ThreadInvalidAccess)
                );
                assert_matches!(button_ref.bounds(), Err(Error::ThreadInvalidAccess));
                assert_matches!(shell_ref.dispose(), Err(Error::ThreadInvalidAccess));
                // is_disposed is the one cross-thread query.
                assert!(!button_ref.is_disposed());
            })
            .join()
            .unwrap();
    });

    // Nothing changed: the label is still the model default.
    assert_eq!(harness.remote_label(&button).unwrap(), "");
}

#[test]
fn disposal_is_terminal_and_idempotent() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();
    let button_peer = harness.peer_of(&button);

    let dispose_events = Arc::new(AtomicUsize::new(0));
    let counter = dispose_events.clone();
    button
        .add_listener(EventType::Dispose, Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    button.dispose().unwrap();
    assert!(button.is_disposed());
    assert_eq!(dispose_events.load(Ordering::SeqCst), 1);
    assert_eq!(harness.backend().peer_disposed(button_peer), None);

    // Second dispose must not raise; anything else must.
    button.dispose().unwrap();
    assert_eq!(dispose_events.load(Ordering::SeqCst), 1);
    assert_matches!(button.set_text("x"), Err(Error::WidgetDisposed));
    assert_matches!(button.bounds(), Err(Error::WidgetDisposed));

    // The identity mapping is gone: injected events no longer dispatch.
    harness.backend().press(button_peer);
    harness.pump();
}

#[test]
fn disposing_a_shell_disposes_its_subtree() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    let button = Button::new(&composite, Style::PUSH).unwrap();

    shell.dispose().unwrap();
    assert!(shell.is_disposed());
    assert!(composite.is_disposed());
    assert!(button.is_disposed());
    assert!(harness.display().shells().unwrap().is_empty());
}

#[test]
fn child_construction_requires_a_live_parent() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    shell.dispose().unwrap();
    assert_matches!(
        Button::new(&shell, Style::PUSH),
        Err(Error::WidgetDisposed)
    );
}

#[test]
fn button_label_and_shell_visibility_round_trip() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();

    button.set_text("OK").unwrap();
    shell.open().unwrap();
    harness.pump();

    // Remote state is the source of truth for both assertions.
    assert_eq!(harness.remote_label(&button).unwrap(), "OK");
    assert_eq!(harness.remote_visible(&shell), Some(true));
    assert_eq!(button.text().unwrap(), "OK");
    assert!(shell.is_open().unwrap());
}

#[test]
fn geometry_is_read_modify_write_against_the_peer() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();

    button.set_bounds(Rect::new(10, 20, 120, 40)).unwrap();
    assert_eq!(harness.remote_bounds(&button).unwrap(), Rect::new(10, 20, 120, 40));

    button.set_location(30, 40).unwrap();
    assert_eq!(harness.remote_bounds(&button).unwrap(), Rect::new(30, 40, 120, 40));

    button.set_size(200, 60).unwrap();
    assert_eq!(harness.remote_bounds(&button).unwrap(), Rect::new(30, 40, 200, 60));
    assert_eq!(button.bounds().unwrap(), Rect::new(30, 40, 200, 60));
}

#[test]
fn selection_events_are_marshaled_to_the_display_thread() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();

    let selections = Arc::new(AtomicUsize::new(0));
    let counter = selections.clone();
    button
        .add_selection_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    // With marshaling (the default), the callback is queued, not delivered
    // inline by the backend.
    harness.backend().press(harness.peer_of(&button));
    assert_eq!(selections.load(Ordering::SeqCst), 0);
    harness.pump();
    assert_eq!(selections.load(Ordering::SeqCst), 1);
}

#[test]
fn unmarshaled_callbacks_run_inline() {
    let harness = TestHarness::with_options(DisplayOptions {
        marshal_remote_callbacks: false,
    });
    let shell = Shell::new(harness.display()).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();

    let selections = Arc::new(AtomicUsize::new(0));
    let counter = selections.clone();
    button
        .add_selection_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    harness.backend().press(harness.peer_of(&button));
    assert_eq!(selections.load(Ordering::SeqCst), 1);
}

#[test]
fn window_manager_close_disposes_the_shell_unless_vetoed() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    shell.open().unwrap();
    harness.pump();

    let vetoed = Shell::new_with_style(harness.display(), Style::SHELL_TRIM).unwrap();
    vetoed.open().unwrap();
    vetoed
        .add_listener(EventType::Close, Arc::new(|event| {
            event.doit = false;
        }))
        .unwrap();
    harness.pump();

    harness.request_close(&vetoed);
    assert!(!vetoed.is_disposed());

    harness.request_close(&shell);
    assert!(shell.is_disposed());
}

#[test]
fn labels_and_text_fields_round_trip_their_content() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();

    let label = Label::new(&shell, Style::LEFT).unwrap();
    label.set_text("status:").unwrap();
    assert_eq!(label.text().unwrap(), "status:");
    assert_eq!(label.alignment().unwrap(), Style::LEFT);

    let text = Text::new(&shell, Style::SINGLE).unwrap();
    text.set_text("New Text!").unwrap();
    text.append(" more").unwrap();
    assert_eq!(text.text().unwrap(), "New Text! more");

    // The edit model carries a font descriptor from construction.
    let font = text.font().unwrap();
    assert!(!font.name.is_empty());
}

#[test]
fn progress_bar_range_and_selection() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let bar = ProgressBar::new(&shell, Style::HORIZONTAL).unwrap();

    assert_eq!(bar.minimum().unwrap(), 0);
    assert_eq!(bar.maximum().unwrap(), 100);

    bar.set_maximum(10).unwrap();
    bar.set_selection(7).unwrap();
    assert_eq!(bar.selection().unwrap(), 7);

    // Out-of-range selections clamp; degenerate ranges are ignored.
    bar.set_selection(42).unwrap();
    assert_eq!(bar.selection().unwrap(), 10);
    bar.set_minimum(10).unwrap();
    assert_eq!(bar.minimum().unwrap(), 0);
}

#[test]
fn enablement_lives_on_the_model() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();

    assert!(button.is_enabled().unwrap());
    button.set_enabled(false).unwrap();
    assert!(!button.is_enabled().unwrap());

    // Window-backed widgets have no model to carry enablement.
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    assert_matches!(composite.set_enabled(false), Err(Error::Unsupported(_)));
}

#[test]
fn canvas_paints_through_the_remote_graphics_context() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let canvas = Canvas::new(&shell, Style::NONE).unwrap();

    let paints = Arc::new(AtomicUsize::new(0));
    let counter = paints.clone();
    canvas
        .add_listener(EventType::Paint, Arc::new(move |event| {
            assert_eq!((event.width, event.height), (50, 50));
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    harness.request_paint(&canvas, Rect::new(0, 0, 50, 50));
    assert_eq!(paints.load(Ordering::SeqCst), 1);

    let graphics = canvas.graphics().unwrap();
    graphics
        .set_line_color(veneer::remote::value::Color::from_rgb(0, 0, 0xff))
        .unwrap();
    graphics.draw_rect(Rect::new(0, 0, 20, 20)).unwrap();

    let ops = harness.draw_ops(&canvas);
    assert!(ops.contains(&DrawOp::Rect(0, 0, 20, 20)));
}

#[test]
fn tab_folder_switches_the_visible_control() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let folder = TabFolder::new(&shell, Style::NONE).unwrap();

    let first_page = Composite::new(&folder, Style::NONE).unwrap();
    let second_page = Composite::new(&folder, Style::NONE).unwrap();

    let first = TabItem::new(&folder, Style::NONE).unwrap();
    first.set_text("First").unwrap();
    first.set_control(&first_page).unwrap();
    let second = TabItem::new(&folder, Style::NONE).unwrap();
    second.set_text("Second").unwrap();
    second.set_control(&second_page).unwrap();

    assert_eq!(folder.item_count().unwrap(), 2);
    assert_eq!(folder.selection_index().unwrap(), 0);
    assert_eq!(harness.remote_visible(&first_page), Some(true));
    assert_eq!(harness.remote_visible(&second_page), Some(false));

    let selections = Arc::new(AtomicUsize::new(0));
    let counter = selections.clone();
    folder
        .add_listener(EventType::Selection, Arc::new(move |event| {
            assert!(event.item.is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    folder.set_selection(1).unwrap();
    assert_eq!(folder.selection_index().unwrap(), 1);
    assert_eq!(harness.remote_visible(&first_page), Some(false));
    assert_eq!(harness.remote_visible(&second_page), Some(true));
    assert_eq!(selections.load(Ordering::SeqCst), 1);

    // Out-of-range selection is ignored.
    folder.set_selection(5).unwrap();
    assert_eq!(folder.selection_index().unwrap(), 1);

    // An item cannot present a control from outside its folder.
    let stranger = Composite::new(&shell, Style::NONE).unwrap();
    assert_matches!(second.set_control(&stranger), Err(Error::InvalidParent));
}

#[test]
fn parent_and_shell_navigation() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    let button = Button::new(&composite, Style::PUSH).unwrap();

    assert_eq!(button.parent().unwrap().unwrap().id(), composite.id());
    assert_eq!(button.shell().unwrap().id(), shell.id());
    assert_eq!(shell.parent().unwrap().map(|p| p.id()), None);

    let children = composite.children().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id(), button.id());
}
