//! Core systems for Vesper.
//!
//! This crate provides the foundational components the Vesper launcher is
//! built on:
//!
//! - **Signal/Slot System**: Type-safe notification between components
//! - **Data Hooks**: One-shot invalidation tokens backing the
//!   snapshot-or-subscribe read pattern used by every engine getter
//! - **Property System**: Change-detected reactive value cells
//! - **Deferred Queue**: A host-driven one-shot task queue used to coalesce
//!   bursts of mutations into single batch flushes
//!
//! The engine is single-threaded and cooperative: nothing in this crate
//! spawns threads or blocks. The only asynchrony is time-deferred work that
//! the host loop drains through [`DeferredQueue::run_due`].
//!
//! # Signal/Slot Example
//!
//! ```
//! use vesper_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Deferred Queue Example
//!
//! ```
//! use std::time::Duration;
//! use vesper_core::DeferredQueue;
//!
//! let queue = DeferredQueue::new();
//! let id = queue.defer(Duration::from_millis(100), || {
//!     println!("flush!");
//! });
//!
//! // The host loop periodically drains due tasks:
//! queue.run_due();
//!
//! // ...or forces one to run ahead of its deadline:
//! queue.run_now(id);
//! ```

mod error;
pub mod hook;
pub mod logging;
pub mod property;
mod scheduler;
pub mod signal;

pub use error::{CoreError, Result, SchedulerError};
pub use hook::{DataHook, HookId, HookRegistry};
pub use logging::PerfSpan;
pub use property::Property;
pub use scheduler::{DeferredQueue, TaskId};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
