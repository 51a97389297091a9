// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Cross-thread execution, ordering, timers and wakeups.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use veneer::app::Display;
use veneer::core::Error;
use veneer_testing::TestHarness;

fn pump_until(harness: &TestHarness, done: &AtomicBool) {
    for _ in 0..10_000 {
        if done.load(Ordering::SeqCst) {
            return;
        }
        if !harness.display().read_and_dispatch().unwrap() {
            harness.display().sleep().unwrap();
        }
    }
    panic!("condition never became true");
}

#[test]
fn one_display_per_thread() {
    let harness = TestHarness::new();
    let session = harness.session().clone();
    assert_matches!(Display::new(session), Err(Error::ThreadInvalidAccess));
}

#[test]
fn async_exec_preserves_fifo_order() {
    let harness = TestHarness::new();
    let display = harness.display().clone();
    let order = Arc::new(Mutex::new(Vec::new()));
    let done = Arc::new(AtomicBool::new(false));

    std::thread::scope(|scope| {
        let order_a = order.clone();
        let order_b = order.clone();
        let done_flag = done.clone();
        let display_ref = &display;
        scope
            .spawn(move || {
                display_ref
                    .async_exec(move || order_a.lock().unwrap().push(1))
                    .unwrap();
                display_ref
                    .async_exec(move || order_b.lock().unwrap().push(2))
                    .unwrap();
                display_ref
                    .async_exec(move || done_flag.store(true, Ordering::SeqCst))
                    .unwrap();
            })
            .join()
            .unwrap();
        pump_until(&harness, &done);
    });

    assert_eq!(*order.lock().unwrap(), vec![1, 2]);
}

#[test]
fn sync_exec_blocks_until_the_runnable_ran() {
    let harness = TestHarness::new();
    let display = harness.display().clone();
    let ran = Arc::new(AtomicBool::new(false));
    let observed = Arc::new(AtomicBool::new(false));
    let done = Arc::new(AtomicBool::new(false));

    std::thread::scope(|scope| {
        let ran_in_runnable = ran.clone();
        let ran_after_return = ran.clone();
        let observed_flag = observed.clone();
        let done_flag = done.clone();
        let display_ref = &display;
        scope.spawn(move || {
            display_ref
                .sync_exec(move || {
                    ran_in_runnable.store(true, Ordering::SeqCst);
                })
                .unwrap();
            // The runnable has fully executed by the time sync_exec returns.
            observed_flag.store(ran_after_return.load(Ordering::SeqCst), Ordering::SeqCst);
            done_flag.store(true, Ordering::SeqCst);
        });
        pump_until(&harness, &done);
    });

    assert!(observed.load(Ordering::SeqCst));
}

#[test]
fn sync_exec_propagates_panics_to_the_caller() {
    let harness = TestHarness::new();
    let display = harness.display().clone();
    let done = Arc::new(AtomicBool::new(false));
    let caller_saw_panic = Arc::new(AtomicBool::new(false));

    std::thread::scope(|scope| {
        let done_flag = done.clone();
        let saw_panic = caller_saw_panic.clone();
        let display_ref = &display;
        scope.spawn(move || {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                display_ref.sync_exec(|| panic!("listener exploded")).unwrap();
            }));
            saw_panic.store(outcome.is_err(), Ordering::SeqCst);
            done_flag.store(true, Ordering::SeqCst);
        });
        pump_until(&harness, &done);
    });

    assert!(caller_saw_panic.load(Ordering::SeqCst));
}

#[test]
fn sync_exec_runs_immediately_on_the_display_thread() {
    let harness = TestHarness::new();
    let ran = Arc::new(AtomicBool::new(false));
    let ran_inner = ran.clone();
    harness
        .display()
        .sync_exec(move || ran_inner.store(true, Ordering::SeqCst))
        .unwrap();
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn timer_exec_fires_after_the_delay() {
    let harness = TestHarness::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_inner = fired.clone();
    harness
        .display()
        .timer_exec(Duration::from_millis(5), move || {
            fired_inner.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    harness.pump();
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    std::thread::sleep(Duration::from_millis(10));
    harness.pump();
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // One-shot: it does not fire again.
    std::thread::sleep(Duration::from_millis(10));
    harness.pump();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn wake_unblocks_sleep() {
    let harness = TestHarness::new();
    let display = harness.display().clone();

    std::thread::scope(|scope| {
        let display_ref = &display;
        scope.spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            display_ref.wake().unwrap();
        });
        // Returns (rather than hanging) once the other thread wakes us.
        assert!(display.sleep().unwrap());
    });
}

#[test]
fn skin_pass_runs_once_per_new_widget() {
    use veneer::core::{EventType, Style};
    use veneer::widgets::{Button, Shell};

    let harness = TestHarness::new();
    let skinned = Arc::new(AtomicUsize::new(0));
    let counter = skinned.clone();
    harness
        .display()
        .add_listener(EventType::Skin, Arc::new(move |event| {
            assert!(event.widget.is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    let shell = Shell::new(harness.display()).unwrap();
    let _button = Button::new(&shell, Style::PUSH).unwrap();

    harness.pump();
    assert_eq!(skinned.load(Ordering::SeqCst), 2);

    // Already-skinned widgets are not revisited.
    harness.pump();
    assert_eq!(skinned.load(Ordering::SeqCst), 2);
}

#[test]
fn execute_runs_on_the_display_thread_either_way() {
    let harness = TestHarness::new();
    let display = harness.display().clone();
    let ran = Arc::new(AtomicUsize::new(0));

    let counter = ran.clone();
    display
        .execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    // Immediate when called from the display thread.
    assert_eq!(ran.load(Ordering::SeqCst), 1);

    let done = Arc::new(AtomicBool::new(false));
    std::thread::scope(|scope| {
        let counter = ran.clone();
        let done_flag = done.clone();
        let display_ref = &display;
        scope
            .spawn(move || {
                display_ref
                    .execute(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
                done_flag.store(true, Ordering::SeqCst);
            })
            .join()
            .unwrap();
        // Queued when called from elsewhere.
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    });
    harness.pump();
    assert_eq!(ran.load(Ordering::SeqCst), 2);
}

#[test]
fn disposed_display_rejects_work() {
    let harness = TestHarness::new();
    let display = harness.display().clone();
    display.dispose().unwrap();
    assert!(display.is_disposed());
    assert_matches!(display.async_exec(|| {}), Err(Error::DeviceDisposed));
    assert_matches!(display.read_and_dispatch(), Err(Error::DeviceDisposed));
}
