//! Deferred one-shot task queue.
//!
//! Provides the time-deferral primitive behind batch coalescing: a component
//! arms a one-shot task with a deadline, the host loop periodically drains
//! due tasks with [`DeferredQueue::run_due`], and callers that must observe
//! up-to-date state force a pending task early with
//! [`DeferredQueue::run_now`].
//!
//! The queue never spawns threads and never blocks; tasks run synchronously
//! on whichever thread drains them. Cancelled entries are skipped lazily
//! when they surface at the head of the deadline heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, SchedulerError};

new_key_type! {
    /// A unique identifier for a deferred task.
    pub struct TaskId;
}

type Task = Box<dyn FnOnce() + Send>;

struct TaskEntry {
    deadline: Instant,
    task: Task,
}

/// An entry in the deadline queue (min-heap by deadline).
#[derive(Clone, Copy)]
struct QueueEntry {
    id: TaskId,
    deadline: Instant,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.deadline.cmp(&self.deadline)
    }
}

struct QueueState {
    tasks: SlotMap<TaskId, TaskEntry>,
    heap: BinaryHeap<QueueEntry>,
}

/// A host-driven queue of deferred one-shot tasks.
///
/// Tasks fire at most once. [`cancel`](Self::cancel) after a task has fired
/// is a safe no-op, as is cancelling twice.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
/// use vesper_core::DeferredQueue;
///
/// let queue = DeferredQueue::new();
/// let fired = Arc::new(AtomicBool::new(false));
///
/// let fired_clone = fired.clone();
/// let id = queue.defer(Duration::from_secs(60), move || {
///     fired_clone.store(true, Ordering::SeqCst);
/// });
///
/// // Deadline far away: nothing is due yet.
/// assert_eq!(queue.run_due(), 0);
///
/// // A caller that needs the result now forces the task early.
/// assert!(queue.run_now(id));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
pub struct DeferredQueue {
    state: Mutex<QueueState>,
}

impl Default for DeferredQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: SlotMap::with_key(),
                heap: BinaryHeap::new(),
            }),
        }
    }

    /// Schedule `task` to run once `delay` has elapsed.
    ///
    /// Returns the task ID, usable with [`cancel`](Self::cancel) and
    /// [`run_now`](Self::run_now).
    pub fn defer<F>(&self, delay: Duration, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + delay;
        let mut state = self.state.lock();
        let id = state.tasks.insert(TaskEntry {
            deadline,
            task: Box::new(task),
        });
        state.heap.push(QueueEntry { id, deadline });
        tracing::trace!(target: "vesper_core::scheduler", ?id, ?delay, "task deferred");
        id
    }

    /// Cancel a pending task.
    ///
    /// Returns `true` if the task was still pending. The heap entry is left
    /// behind and skipped lazily.
    pub fn cancel(&self, id: TaskId) -> bool {
        let removed = self.state.lock().tasks.remove(id).is_some();
        if removed {
            tracing::trace!(target: "vesper_core::scheduler", ?id, "task cancelled");
        }
        removed
    }

    /// Cancel a pending task, reporting an error for unknown ids.
    pub fn try_cancel(&self, id: TaskId) -> Result<()> {
        if self.cancel(id) {
            Ok(())
        } else {
            Err(SchedulerError::InvalidTaskId.into())
        }
    }

    /// Whether the task is still pending.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.state.lock().tasks.contains_key(id)
    }

    /// Number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Duration until the next pending task is due, if any.
    ///
    /// Returns `Duration::ZERO` for overdue tasks.
    pub fn time_until_next(&self) -> Option<Duration> {
        let mut state = self.state.lock();
        // Drop cancelled entries from the front of the heap.
        while let Some(entry) = state.heap.peek() {
            if state.tasks.contains_key(entry.id) {
                break;
            }
            state.heap.pop();
        }

        state
            .heap
            .peek()
            .map(|entry| entry.deadline.saturating_duration_since(Instant::now()))
    }

    /// Run every task whose deadline has passed, in deadline order.
    ///
    /// Tasks execute after the queue lock is released, so a task may defer
    /// further work without deadlocking. Returns the number of tasks run.
    pub fn run_due(&self) -> usize {
        let now = Instant::now();
        let due: Vec<Task> = {
            let mut state = self.state.lock();
            let mut due = Vec::new();
            while let Some(entry) = state.heap.peek().copied() {
                if entry.deadline > now {
                    break;
                }
                state.heap.pop();
                // Cancelled or force-run entries are skipped here.
                if let Some(task_entry) = state.tasks.remove(entry.id) {
                    due.push(task_entry.task);
                }
            }
            due
        };

        let count = due.len();
        for task in due {
            task();
        }
        if count > 0 {
            tracing::trace!(target: "vesper_core::scheduler", count, "deferred tasks ran");
        }
        count
    }

    /// Run a pending task immediately, ahead of its deadline.
    ///
    /// Returns `false` if the task has already run or been cancelled. The
    /// task executes after the queue lock is released.
    pub fn run_now(&self, id: TaskId) -> bool {
        let entry = self.state.lock().tasks.remove(id);
        match entry {
            Some(task_entry) => {
                tracing::trace!(target: "vesper_core::scheduler", ?id, "task forced");
                (task_entry.task)();
                true
            }
            None => false,
        }
    }
}

static_assertions::assert_impl_all!(DeferredQueue: Send, Sync);
