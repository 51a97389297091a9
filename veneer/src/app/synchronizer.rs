// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The cross-thread runnable queue.
//!
//! Non-display threads hand work to the display thread through this queue.
//! It is one of only two data structures shared across threads (the other is
//! the widget/peer identity map), and it is the wake source for
//! [`Display::sleep`](crate::app::Display::sleep).

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

type Task = Box<dyn FnOnce() + Send>;

pub(crate) struct Synchronizer {
    messages: Mutex<VecDeque<Task>>,
    work_available: Condvar,
}

impl Synchronizer {
    pub(crate) fn new() -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            work_available: Condvar::new(),
        }
    }

    /// Appends a task; FIFO order is preserved per enqueueing thread.
    pub(crate) fn async_exec(&self, task: Task) {
        self.messages.lock().unwrap().push_back(task);
        self.work_available.notify_all();
    }

    /// Enqueues `task` and blocks until the display thread has run it.
    ///
    /// A panic raised by the task is captured on the display thread and
    /// resumed here, on the calling thread.
    pub(crate) fn sync_exec(&self, task: Task) {
        enum SyncState {
            Pending,
            Done,
            Panicked(Box<dyn std::any::Any + Send>),
        }

        let state = std::sync::Arc::new((Mutex::new(SyncState::Pending), Condvar::new()));
        let state_for_task = state.clone();
        self.async_exec(Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(task));
            let (lock, signal) = &*state_for_task;
            let mut slot = lock.lock().unwrap();
            *slot = match outcome {
                Ok(()) => SyncState::Done,
                Err(payload) => SyncState::Panicked(payload),
            };
            signal.notify_all();
        }));

        let (lock, signal) = &*state;
        let mut slot = lock.lock().unwrap();
        loop {
            match std::mem::replace(&mut *slot, SyncState::Pending) {
                SyncState::Pending => {
                    slot = signal.wait(slot).unwrap();
                }
                SyncState::Done => return,
                SyncState::Panicked(payload) => {
                    drop(slot);
                    resume_unwind(payload);
                }
            }
        }
    }

    /// Runs queued messages on the calling thread.
    ///
    /// With `all = false` at most one message runs (one per event-loop tick);
    /// with `all = true` the queue is drained, including messages enqueued
    /// while draining.
    pub(crate) fn run_async_messages(&self, all: bool) -> bool {
        let mut ran = false;
        loop {
            let task = self.messages.lock().unwrap().pop_front();
            let Some(task) = task else {
                return ran;
            };
            task();
            ran = true;
            if !all {
                return true;
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.messages.lock().unwrap().is_empty()
    }

    /// Wakes a thread blocked in [`wait`](Self::wait).
    pub(crate) fn wake(&self) {
        self.work_available.notify_all();
    }

    /// Blocks until a message is available, `timeout` elapses, or
    /// [`wake`](Self::wake) is called.
    pub(crate) fn wait(&self, timeout: Option<Duration>) {
        let guard = self.messages.lock().unwrap();
        if !guard.is_empty() {
            return;
        }
        match timeout {
            Some(timeout) => {
                let _unused = self.work_available.wait_timeout(guard, timeout).unwrap();
            }
            None => {
                let _unused = self.work_available.wait(guard).unwrap();
            }
        }
    }
}
