// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Deferred-layout batching and the stock layouts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use veneer::core::{
    FillLayout, Layout, LayoutFlags, Orientation, Rect, Result, RowLayout, Size, Style,
};
use veneer::widgets::{Button, Composite, Container, Control, Shell};
use veneer_testing::TestHarness;

/// Records every layout pass it runs.
struct CountingLayout {
    calls: Arc<AtomicUsize>,
    last_changed: Arc<AtomicBool>,
}

impl CountingLayout {
    fn new() -> (Box<Self>, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_changed = Arc::new(AtomicBool::new(false));
        (
            Box::new(Self {
                calls: calls.clone(),
                last_changed: last_changed.clone(),
            }),
            calls,
            last_changed,
        )
    }
}

impl Layout for CountingLayout {
    fn compute_size(
        &mut self,
        _composite: &dyn Container,
        w_hint: Option<i32>,
        h_hint: Option<i32>,
        _flush_cache: bool,
    ) -> Result<Size> {
        Ok(Size::new(w_hint.unwrap_or(0), h_hint.unwrap_or(0)))
    }

    fn layout(&mut self, _composite: &dyn Container, flush_cache: bool) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_changed.store(flush_cache, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn deferred_layout_batches_to_one_pass() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    let (layout, calls, last_changed) = CountingLayout::new();
    composite.set_layout(layout).unwrap();

    // Nest the deferral twice.
    composite.set_layout_deferred(true).unwrap();
    composite.set_layout_deferred(true).unwrap();
    assert!(composite.layout_deferred().unwrap());
    assert!(composite.is_layout_deferred().unwrap());

    let children = [
        Button::new(&composite, Style::PUSH).unwrap(),
        Button::new(&composite, Style::PUSH).unwrap(),
        Button::new(&composite, Style::PUSH).unwrap(),
    ];
    let geometry_before: Vec<u64> = children
        .iter()
        .map(|child| harness.backend().pos_size_calls(harness.peer_of(child)))
        .collect();

    // Layout requests while deferred only mark state.
    composite.layout().unwrap();
    composite.layout().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let geometry_during: Vec<u64> = children
        .iter()
        .map(|child| harness.backend().pos_size_calls(harness.peer_of(child)))
        .collect();
    assert_eq!(geometry_before, geometry_during);

    // The scope is still open after one of the two closes.
    composite.set_layout_deferred(false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Closing the outer scope flushes exactly one pass, with the
    // accumulated dirty state.
    composite.set_layout_deferred(false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(last_changed.load(Ordering::SeqCst));

    // Nothing left to flush.
    composite.layout_with(false, false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn defer_flag_schedules_the_flush_on_the_next_tick() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    let (layout, calls, _) = CountingLayout::new();
    composite.set_layout(layout).unwrap();
    let _button = Button::new(&composite, Style::PUSH).unwrap();

    composite
        .layout_flags(LayoutFlags::CHANGED | LayoutFlags::DEFER)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // The display's deferred-layout stage ends the scope.
    harness.pump();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn scoped_layout_marks_only_the_ancestor_path() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let (shell_layout, shell_calls, _) = CountingLayout::new();
    shell.set_layout(shell_layout).unwrap();

    let on_path = Composite::new(&shell, Style::NONE).unwrap();
    let (on_path_layout, on_path_calls, _) = CountingLayout::new();
    on_path.set_layout(on_path_layout).unwrap();

    let off_path = Composite::new(&shell, Style::NONE).unwrap();
    let (off_path_layout, off_path_calls, _) = CountingLayout::new();
    off_path.set_layout(off_path_layout).unwrap();

    let button = Button::new(&on_path, Style::PUSH).unwrap();

    shell
        .layout_controls(&[&button as &dyn Control], LayoutFlags::empty())
        .unwrap();

    assert_eq!(shell_calls.load(Ordering::SeqCst), 1);
    assert_eq!(on_path_calls.load(Ordering::SeqCst), 1);
    assert_eq!(off_path_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scoped_layout_rejects_foreign_controls() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let other_shell = Shell::new(harness.display()).unwrap();
    let foreign = Button::new(&other_shell, Style::PUSH).unwrap();

    let result = shell.layout_controls(&[&foreign as &dyn Control], LayoutFlags::empty());
    assert!(matches!(result, Err(veneer::core::Error::InvalidParent)));
}

#[test]
fn fill_layout_tiles_the_client_area() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    composite.set_bounds(Rect::new(0, 0, 400, 200)).unwrap();
    composite
        .set_layout(Box::new(FillLayout::new(Orientation::Horizontal)))
        .unwrap();

    let left = Button::new(&composite, Style::PUSH).unwrap();
    let right = Button::new(&composite, Style::PUSH).unwrap();

    composite.layout().unwrap();

    assert_eq!(harness.remote_bounds(&left).unwrap(), Rect::new(0, 0, 200, 200));
    assert_eq!(
        harness.remote_bounds(&right).unwrap(),
        Rect::new(200, 0, 200, 200)
    );
}

#[test]
fn fill_layout_computes_a_preferred_size() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    let first = Button::new(&composite, Style::PUSH).unwrap();
    let second = Button::new(&composite, Style::PUSH).unwrap();
    first.set_size(120, 30).unwrap();
    second.set_size(80, 40).unwrap();

    let mut layout = FillLayout::new(Orientation::Vertical);
    let size = layout.compute_size(&composite, None, None, true).unwrap();
    assert_eq!(size, Size::new(120, 80));
}

#[test]
fn row_layout_wraps_at_the_client_edge() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let composite = Composite::new(&shell, Style::NONE).unwrap();
    composite.set_bounds(Rect::new(0, 0, 120, 200)).unwrap();

    let mut layout = RowLayout::new();
    layout.margin_width = 0;
    layout.margin_height = 0;
    layout.spacing = 10;
    composite.set_layout(Box::new(layout)).unwrap();

    let first = Button::new(&composite, Style::PUSH).unwrap();
    let second = Button::new(&composite, Style::PUSH).unwrap();
    first.set_size(60, 20).unwrap();
    second.set_size(60, 30).unwrap();

    composite.layout().unwrap();

    // 60 + 10 + 60 exceeds the 120-wide client area: the second child wraps
    // below the first row.
    assert_eq!(harness.remote_bounds(&first).unwrap(), Rect::new(0, 0, 60, 20));
    assert_eq!(
        harness.remote_bounds(&second).unwrap(),
        Rect::new(0, 30, 60, 30)
    );
}

#[test]
fn request_layout_defers_to_the_next_tick() {
    let harness = TestHarness::new();
    let shell = Shell::new(harness.display()).unwrap();
    let (shell_layout, shell_calls, _) = CountingLayout::new();
    shell.set_layout(shell_layout).unwrap();
    let button = Button::new(&shell, Style::PUSH).unwrap();

    button.request_layout().unwrap();
    assert_eq!(shell_calls.load(Ordering::SeqCst), 0);
    harness.pump();
    assert_eq!(shell_calls.load(Ordering::SeqCst), 1);
}
