//! The search-executor integration point.
//!
//! A fan-out search executor produces asynchronous batches of priority-
//! tagged contributions and retractions, keyed by an executor-assigned
//! identity. [`SearchBinding`] routes both through a
//! [`PrioritizedMenu`]'s batching path, so search results inherit every
//! coalescing, ordering and capacity guarantee the menu provides. The
//! engine imposes no further protocol: a valid item, a nonzero priority,
//! and a stable identity for reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::item::{ItemId, MenuItem};
use crate::prioritized::PrioritizedMenu;

/// One search result: an item stamped with the executor's identity key.
///
/// Re-contributing the same key supersedes the previous contribution
/// (last write wins); the item's priority travels on its handle.
#[derive(Clone, Debug)]
pub struct SearchContribution {
    item: MenuItem,
}

impl SearchContribution {
    /// Stamp `item` with the executor-assigned identity `id`.
    pub fn new(id: impl Into<ItemId>, item: MenuItem) -> Self {
        Self {
            item: item.with_identity(id),
        }
    }

    /// The contributed item (identity included).
    pub fn item(&self) -> &MenuItem {
        &self.item
    }

    /// The contribution's identity key.
    pub fn id(&self) -> &ItemId {
        self.item
            .identity()
            .expect("SearchContribution always carries an identity")
    }
}

/// The sink a search executor feeds.
///
/// Implementations must tolerate out-of-order and duplicate calls — an
/// executor's sub-searches settle at arbitrary times.
pub trait SearchSink: Send + Sync {
    /// Contribute (or re-contribute) a batch of results.
    fn contribute(&self, batch: Vec<SearchContribution>);

    /// Retract previously contributed results by identity.
    fn retract(&self, ids: &[ItemId]);

    /// Report whether the executor is still producing contributions.
    fn set_loading(&self, loading: bool);
}

/// Connects a search executor to a [`PrioritizedMenu`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vesper_core::DeferredQueue;
/// use vesper_menu::{
///     MenuContext, MenuItem, Priority, PrioritizedMenu, SearchBinding, SearchContribution,
///     SearchSink,
/// };
///
/// let cx = MenuContext::new(Arc::new(DeferredQueue::new()));
/// let menu = PrioritizedMenu::new(cx);
/// let binding = SearchBinding::new(menu.clone());
///
/// binding.contribute(vec![SearchContribution::new(
///     "calc:42",
///     MenuItem::labeled("42").with_priority(Priority::HIGH),
/// )]);
/// binding.set_loading(true);
///
/// menu.flush_now();
/// assert_eq!(menu.items(None).len(), 1);
/// assert!(menu.is_loading(None));
/// ```
pub struct SearchBinding {
    menu: Arc<PrioritizedMenu>,
    live: Mutex<HashMap<ItemId, MenuItem>>,
}

impl SearchBinding {
    /// Bind to `menu`.
    pub fn new(menu: Arc<PrioritizedMenu>) -> Self {
        Self {
            menu,
            live: Mutex::new(HashMap::new()),
        }
    }

    /// The bound menu.
    pub fn menu(&self) -> &Arc<PrioritizedMenu> {
        &self.menu
    }

    /// Number of currently live contributions.
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Retract every live contribution and clear the loading flag.
    ///
    /// Used when a query is cancelled or replaced wholesale.
    pub fn detach(&self) {
        let drained: Vec<MenuItem> = self.live.lock().drain().map(|(_, item)| item).collect();
        tracing::debug!(
            target: "vesper_menu::search",
            retracted = drained.len(),
            "search binding detached"
        );
        for item in drained {
            self.menu.remove_item(&item);
        }
        self.menu.set_loading(false);
    }
}

impl SearchSink for SearchBinding {
    fn contribute(&self, batch: Vec<SearchContribution>) {
        for contribution in batch {
            let item = contribution.item.clone();
            // A zero-priority contribution is dropped by the menu; don't
            // track what was never admitted.
            if self.menu.add_item(item.clone()) {
                let id = contribution.id().clone();
                self.live.lock().insert(id, item);
            }
        }
    }

    fn retract(&self, ids: &[ItemId]) {
        for id in ids {
            let item = self.live.lock().remove(id);
            if let Some(item) = item {
                self.menu.remove_item(&item);
            }
        }
    }

    fn set_loading(&self, loading: bool) {
        self.menu.set_loading(loading);
    }
}

static_assertions::assert_impl_all!(SearchBinding: Send, Sync);
