//! The Vesper menu engine.
//!
//! This crate provides the prioritized, categorized, incrementally-updated
//! item collection that backs every list-like surface in the Vesper
//! launcher: search results, settings trees, context menus, pickers. It
//! separates item data from display logic, so a rendering layer can drive
//! any surface from the same read contract:
//!
//! - Items are opaque handles ([`MenuItem`]) with a capability set
//!   ([`ItemBehavior`]) for category resolution, selectability, and state
//!   notifications
//! - Items group into category buckets; the flattened display list
//!   interleaves category headers with their items
//! - A single cursor and a multi-item selection are continuously
//!   re-validated as the underlying set changes
//! - Every getter supports snapshot-or-subscribe reads through
//!   [`DataHook`](vesper_core::DataHook) tokens
//!
//! # Menu Variants
//!
//! - [`Menu`]: synchronous — mutations apply immediately
//! - [`PrioritizedMenu`]: priority-ordered, capacity-bounded buckets with
//!   mutations coalesced into periodic batch flushes
//! - [`ProxiedMenu`]: keeps a wrapped menu synchronized with a reactive
//!   item array by set-difference reconciliation
//! - [`SearchBinding`]: routes a search executor's contributions through a
//!   prioritized menu
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vesper_core::DeferredQueue;
//! use vesper_menu::{MenuContext, MenuItem, Priority, PrioritizedMenu};
//!
//! let cx = MenuContext::new(Arc::new(DeferredQueue::new()));
//! let menu = PrioritizedMenu::new(cx);
//!
//! menu.add_item(MenuItem::labeled("Open Terminal").with_priority(Priority::HIGH));
//! menu.add_item(MenuItem::labeled("Lock Screen").with_priority(Priority::LOW));
//!
//! menu.flush_now();
//! let items = menu.items(None);
//! assert_eq!(items[0].view_as::<String>().map(String::as_str), Some("Open Terminal"));
//!
//! menu.set_cursor(Some(items[0].clone()));
//! assert_eq!(menu.cursor(None), Some(items[0].clone()));
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐    add/remove     ┌───────────────┐
//! │  Producers   │──────────────────>│ Pending batch │
//! │ (search, …)  │                   │  per bucket   │
//! └──────────────┘                   └───────┬───────┘
//!                                            │ coalesced flush
//!                                            v
//! ┌──────────────┐    snapshots      ┌───────────────┐
//! │  Rendering   │<──────────────────│ Flattened list│
//! │    layer     │    + DataHooks    │ + cursor/sel. │
//! └──────────────┘                   └───────────────┘
//! ```
//!
//! Consumers only ever observe fully-consistent snapshots: a flush applies
//! every pending per-bucket batch, rebuilds the flattened list, and
//! re-validates cursor and selection atomically with respect to readers.

mod category;
mod config;
mod context;
mod controller;
mod error;
mod item;
mod menu;
pub mod ordered_list;
mod prioritized;
mod proxied;
mod search;
mod signals;
mod traits;

pub use category::{
    creation_order_sort, items_first_sort, Category, CategorySort, CategoryView,
};
pub use config::{MenuConfig, DEFAULT_BATCH_INTERVAL, DEFAULT_MAX_CATEGORY_ITEMS};
pub use context::MenuContext;
pub use error::{MenuError, Result};
pub use item::{DefaultBehavior, ItemBehavior, ItemId, MenuItem, Priority, StaticBehavior};
pub use menu::Menu;
pub use ordered_list::{ItemListener, ListDelta, OrderPredicate, OrderedCapacityList};
pub use prioritized::PrioritizedMenu;
pub use proxied::{ItemSource, ProxiedMenu};
pub use search::{SearchBinding, SearchContribution, SearchSink};
pub use signals::MenuSignals;
pub use traits::MenuLike;
