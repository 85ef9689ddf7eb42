//! A UI-thread task queue for hosts that do not bring their own dispatcher.
//!
//! The queue is bound to one thread (the "UI thread"). Any thread may post;
//! only the bound thread drains. Tasks run in posting order, which gives the
//! per-thread FIFO guarantee the marshal relies on.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use parking_lot::{Condvar, Mutex};

use super::{UiDispatcher, UiTask};

struct ScheduledTask {
    seq: u64,
    task: UiTask,
}

#[derive(Default)]
struct QueueState {
    tasks: VecDeque<ScheduledTask>,
    next_seq: u64,
    closed: bool,
}

pub struct UiThreadQueue {
    ui_thread: Mutex<Option<ThreadId>>,
    state: Mutex<QueueState>,
    condvar: Condvar,
}

impl fmt::Debug for UiThreadQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiThreadQueue")
            .field("ui_thread", &*self.ui_thread.lock())
            .field("pending", &self.pending())
            .finish()
    }
}

impl UiThreadQueue {
    /// Creates a queue with no UI thread yet; call `bind_current_thread` from
    /// the thread that will drain it.
    pub fn unbound() -> Arc<Self> {
        Arc::new(Self {
            ui_thread: Mutex::new(None),
            state: Mutex::new(QueueState::default()),
            condvar: Condvar::new(),
        })
    }

    /// Creates a queue whose UI thread is the calling thread.
    pub fn bound_to_current_thread() -> Arc<Self> {
        let queue = Self::unbound();
        queue.bind_current_thread();
        queue
    }

    pub fn bind_current_thread(&self) {
        let id = thread::current().id();
        let previous = self.ui_thread.lock().replace(id);
        if let Some(previous) = previous.filter(|p| *p != id) {
            warn!("[UiQueue] Rebinding UI thread from {:?} to {:?}", previous, id);
        } else {
            debug!("[UiQueue] Bound to UI thread {:?}", id);
        }
    }

    pub fn ui_thread(&self) -> Option<ThreadId> {
        *self.ui_thread.lock()
    }

    pub fn pending(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Runs every queued task, including tasks queued while draining.
    /// Returns how many ran. Does nothing off the UI thread.
    pub fn run_pending(&self) -> usize {
        if !self.is_current_thread_ui() {
            warn!(
                "[UiQueue] run_pending called from non-UI thread {:?}; ignoring",
                thread::current().id()
            );
            return 0;
        }

        let mut ran = 0;
        loop {
            // The lock must be released before the task runs: tasks may post.
            let next = self.state.lock().tasks.pop_front();
            match next {
                Some(scheduled) => {
                    trace!("[UiQueue] Running task #{}", scheduled.seq);
                    (scheduled.task)();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    /// Waits up to `timeout` for work to arrive, then drains the queue.
    pub fn wait_and_run(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        {
            let mut state = self.state.lock();
            while state.tasks.is_empty() && !state.closed {
                if self.condvar.wait_until(&mut state, deadline).timed_out() {
                    break;
                }
            }
        }
        self.run_pending()
    }

    /// Keeps draining until `done` holds or `timeout` elapses.
    /// Returns whether `done` was reached.
    pub fn run_until<F>(&self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait_and_run((deadline - now).min(Duration::from_millis(10)));
        }
    }

    /// Tears the queue down. Queued tasks are dropped without running and
    /// later posts are discarded.
    pub fn close(&self) {
        let dropped = {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.tasks)
        };
        self.condvar.notify_all();
        info!("[UiQueue] Closed with {} pending task(s) dropped", dropped.len());
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl UiDispatcher for UiThreadQueue {
    fn is_current_thread_ui(&self) -> bool {
        match *self.ui_thread.lock() {
            Some(id) => id == thread::current().id(),
            None => false,
        }
    }

    fn post_async(&self, task: UiTask) {
        let mut state = self.state.lock();
        if state.closed {
            debug!("[UiQueue] Discarding task posted after close");
            return;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.tasks.push_back(ScheduledTask { seq, task });
        drop(state);
        trace!("[UiQueue] Queued task #{}", seq);
        self.condvar.notify_one();
    }
}
