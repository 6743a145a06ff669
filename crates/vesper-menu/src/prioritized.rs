//! The prioritized, batch-flushed menu.
//!
//! [`PrioritizedMenu`] shares the read contract of [`Menu`](crate::Menu)
//! but is built for bursty, asynchronous producers (a fan-out search):
//! items carry a [`Priority`](crate::Priority), each category bucket is an
//! [`OrderedCapacityList`] ordered higher-priority-first, and mutations
//! only touch a per-bucket *pending batch*. A single deferred task applies
//! every pending batch at once — an arbitrary burst of `add_item` /
//! `remove_item` calls within one batch interval produces exactly one
//! rebuild of the flattened list.
//!
//! Consumers never observe a partially-applied batch: reads return the
//! last flushed snapshot, and `set_cursor` / `set_selected` / `destroy`
//! force a flush first so they always act on up-to-date state.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use vesper_core::{ConnectionId, DataHook, HookRegistry, PerfSpan, Property, TaskId};

use crate::category::{flatten_ordered, items_first_sort, reorder, Category, CategorySort, CategoryView};
use crate::config::MenuConfig;
use crate::context::MenuContext;
use crate::controller::{deliver_update, ItemNotice, SelectionController, UpdateSnapshot};
use crate::error::Result;
use crate::item::MenuItem;
use crate::ordered_list::{OrderPredicate, OrderedCapacityList};
use crate::signals::MenuSignals;
use crate::traits::MenuLike;

/// Mutations awaiting the next flush, per bucket.
#[derive(Default)]
struct PendingBatch {
    add: Vec<MenuItem>,
    remove: Vec<MenuItem>,
    clear: bool,
}

struct PrioBucket {
    category: Option<Category>,
    list: OrderedCapacityList<MenuItem>,
    batch: Option<PendingBatch>,
}

struct PrioState {
    /// Buckets in creation order; `[0]` is the default (no-category) group.
    /// Flushes process buckets in this order.
    buckets: Vec<PrioBucket>,
    /// Bucket views in display order, for the `categories()` getter.
    ordered_views: Vec<CategoryView>,
    /// The flattened display list, rebuilt atomically per flush.
    flattened: Vec<MenuItem>,
    controller: SelectionController,
    /// Category-change subscriptions for visible items.
    watches: HashMap<MenuItem, ConnectionId>,
    /// The armed coalescing task, if any.
    armed: Option<TaskId>,
}

/// Items sort higher-or-equal priority first; ties keep arrival order.
fn priority_order() -> OrderPredicate<MenuItem> {
    Arc::new(|a: &MenuItem, b: &MenuItem| a.priority().value() >= b.priority().value())
}

/// A categorized menu whose mutations are coalesced into periodic batch
/// flushes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vesper_core::DeferredQueue;
/// use vesper_menu::{MenuContext, MenuItem, Priority, PrioritizedMenu};
///
/// let cx = MenuContext::new(Arc::new(DeferredQueue::new()));
/// let menu = PrioritizedMenu::new(cx);
///
/// menu.add_item(MenuItem::labeled("slow result").with_priority(Priority::LOW));
/// menu.add_item(MenuItem::labeled("best match").with_priority(Priority::HIGH));
///
/// // Mutations are pending until the batch flushes.
/// assert!(menu.items(None).is_empty());
/// menu.flush_now();
/// assert_eq!(menu.items(None).len(), 2);
/// ```
pub struct PrioritizedMenu {
    cx: MenuContext,
    config: MenuConfig,
    sort: CategorySort,
    order: OrderPredicate<MenuItem>,
    state: Mutex<PrioState>,
    loading: Property<bool>,
    signals: MenuSignals,
    hooks: HookRegistry,
    weak: Weak<PrioritizedMenu>,
}

impl PrioritizedMenu {
    /// Create an empty menu with the context's default configuration.
    pub fn new(cx: MenuContext) -> Arc<Self> {
        let config = cx.default_config().clone();
        Self::build(cx, config)
    }

    /// Create an empty menu with an explicit configuration.
    pub fn with_config(cx: MenuContext, config: MenuConfig) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Self::build(cx, config))
    }

    fn build(cx: MenuContext, config: MenuConfig) -> Arc<Self> {
        let sort = config
            .sort_categories
            .clone()
            .unwrap_or_else(items_first_sort);
        let order = priority_order();
        Arc::new_cyclic(|weak| Self {
            cx,
            config,
            sort,
            order: order.clone(),
            state: Mutex::new(PrioState {
                buckets: vec![PrioBucket {
                    category: None,
                    list: OrderedCapacityList::new(order),
                    batch: None,
                }],
                ordered_views: vec![CategoryView {
                    category: None,
                    items: Vec::new(),
                }],
                flattened: Vec::new(),
                controller: SelectionController::new(),
                watches: HashMap::new(),
                armed: None,
            }),
            loading: Property::new(false),
            signals: MenuSignals::new(),
            hooks: HookRegistry::new(),
            weak: weak.clone(),
        })
    }

    /// This menu's configuration.
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Queue `item` for addition at the next flush.
    ///
    /// Items with [`Priority::NONE`](crate::Priority::NONE) are silently
    /// dropped. A pending entry with the same stable identity (or the same
    /// handle) is superseded — last write wins within one batch interval.
    /// Returns whether the item was queued.
    pub fn add_item(&self, item: MenuItem) -> bool {
        if item.priority().is_none() {
            tracing::trace!(
                target: "vesper_menu::prioritized",
                item = ?item,
                "invisible priority, item dropped"
            );
            return false;
        }
        let category = item.behavior().category(&self.cx);

        let mut state = self.state.lock();
        if state.controller.is_destroyed() {
            return false;
        }

        // A re-contribution may land in a different bucket than its
        // predecessor: supersede matching pending adds everywhere, and
        // queue removal of matching visible entries outside the target.
        let target = Self::bucket_index(&mut state, category, &self.order);
        for (idx, bucket) in state.buckets.iter_mut().enumerate() {
            if let Some(batch) = &mut bucket.batch {
                batch
                    .add
                    .retain(|pending| pending != &item && !pending.same_identity(&item));
            }
            if idx != target {
                let stale: Vec<MenuItem> = bucket
                    .list
                    .get()
                    .iter()
                    .filter(|existing| *existing == &item || existing.same_identity(&item))
                    .cloned()
                    .collect();
                if !stale.is_empty() {
                    let batch = bucket.batch.get_or_insert_with(PendingBatch::default);
                    for entry in stale {
                        if !batch.remove.contains(&entry) {
                            batch.remove.push(entry);
                        }
                    }
                }
            }
        }

        let batch = state.buckets[target]
            .batch
            .get_or_insert_with(PendingBatch::default);
        batch
            .remove
            .retain(|pending| pending != &item && !pending.same_identity(&item));
        batch.add.push(item);

        self.schedule_update_locked(&mut state);
        true
    }

    /// Queue removal of `item` (and anything sharing its stable identity)
    /// at the next flush.
    ///
    /// A not-yet-flushed addition of the same item simply cancels out.
    /// Returns whether anything matched.
    pub fn remove_item(&self, item: &MenuItem) -> bool {
        let mut state = self.state.lock();
        if state.controller.is_destroyed() {
            return false;
        }

        let mut found = false;
        for bucket in &mut state.buckets {
            if let Some(batch) = &mut bucket.batch {
                let before = batch.add.len();
                batch
                    .add
                    .retain(|pending| pending != item && !pending.same_identity(item));
                if batch.add.len() != before {
                    found = true;
                }
            }

            let visible: Vec<MenuItem> = bucket
                .list
                .get()
                .iter()
                .filter(|existing| *existing == item || existing.same_identity(item))
                .cloned()
                .collect();
            if !visible.is_empty() {
                let batch = bucket.batch.get_or_insert_with(PendingBatch::default);
                for entry in visible {
                    if !batch.remove.contains(&entry) {
                        batch.remove.push(entry);
                    }
                }
                found = true;
            }
        }

        if found {
            self.schedule_update_locked(&mut state);
        }
        found
    }

    /// Queue a wipe of every bucket at the next flush.
    ///
    /// Additions already pending (and any made afterwards) still apply
    /// after the wipe.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        if state.controller.is_destroyed() {
            return;
        }
        for bucket in &mut state.buckets {
            bucket.batch.get_or_insert_with(PendingBatch::default).clear = true;
        }
        self.schedule_update_locked(&mut state);
    }

    /// Apply all pending batches immediately instead of waiting for the
    /// armed interval task.
    pub fn flush_now(&self) {
        let armed = self.state.lock().armed;
        if let Some(id) = armed {
            if self.cx.scheduler().run_now(id) {
                return;
            }
        }
        self.flush_batch();
    }

    /// The flattened display list, as of the last flush.
    pub fn items(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.hooks.register_opt(hook);
        self.state.lock().flattened.clone()
    }

    /// The category buckets in display order, as of the last flush.
    pub fn categories(&self, hook: Option<&DataHook>) -> Vec<CategoryView> {
        self.hooks.register_opt(hook);
        self.state.lock().ordered_views.clone()
    }

    /// The current cursor. Forces no flush; pair with
    /// [`set_cursor`](Self::set_cursor) for writes.
    pub fn cursor(&self, hook: Option<&DataHook>) -> Option<MenuItem> {
        self.hooks.register_opt(hook);
        self.state.lock().controller.cursor()
    }

    /// Move the cursor, flushing pending batches first so the operation
    /// never acts on stale state.
    pub fn set_cursor(&self, item: Option<MenuItem>) -> bool {
        self.flush_now();
        let mut notices = Vec::new();
        let (changed, snapshot) = {
            let mut state = self.state.lock();
            let PrioState {
                controller,
                flattened,
                ..
            } = &mut *state;
            let changed = controller.set_cursor(&self.cx, flattened, item, &mut notices);
            (
                changed,
                UpdateSnapshot {
                    cursor: controller.cursor(),
                    selection: controller.selected(),
                },
            )
        };
        if changed {
            deliver_update(&self.cx, &self.signals, &self.hooks, snapshot, notices, false);
        }
        changed
    }

    /// The selected items.
    pub fn selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.hooks.register_opt(hook);
        self.state.lock().controller.selected()
    }

    /// Select or deselect `item`, flushing pending batches first.
    pub fn set_selected(&self, item: &MenuItem, selected: bool) -> bool {
        self.flush_now();
        let mut notices = Vec::new();
        let (changed, snapshot) = {
            let mut state = self.state.lock();
            let PrioState {
                controller,
                flattened,
                ..
            } = &mut *state;
            let changed = controller.set_selected(&self.cx, flattened, item, selected, &mut notices);
            (
                changed,
                UpdateSnapshot {
                    cursor: controller.cursor(),
                    selection: controller.selected(),
                },
            )
        };
        if changed {
            deliver_update(&self.cx, &self.signals, &self.hooks, snapshot, notices, false);
        }
        changed
    }

    /// Selection ∪ {cursor}.
    pub fn all_selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.hooks.register_opt(hook);
        self.state.lock().controller.all_selected()
    }

    /// This menu's change-notification signals.
    pub fn signals(&self) -> &MenuSignals {
        &self.signals
    }

    /// Whether this list is still receiving asynchronous contributions.
    ///
    /// Orthogonal to the flush mechanism: a loading menu may have nothing
    /// pending, and a settled one may still have batches queued.
    pub fn is_loading(&self, hook: Option<&DataHook>) -> bool {
        self.hooks.register_opt(hook);
        self.loading.get()
    }

    /// Update the loading indicator (supplied by the producer side).
    pub fn set_loading(&self, loading: bool) {
        if self.loading.set(loading) {
            self.signals.loading_changed.emit(loading);
            self.hooks.invalidate_all();
        }
    }

    /// Whether the menu has been destroyed.
    pub fn is_destroyed(&self, hook: Option<&DataHook>) -> bool {
        self.hooks.register_opt(hook);
        self.state.lock().controller.is_destroyed()
    }

    /// Destroy the menu, flushing pending batches first.
    ///
    /// Returns `false` when already destroyed. A coalescing task that
    /// fires afterwards is a safe no-op.
    pub fn destroy(&self) -> bool {
        self.flush_now();
        let mut notices = Vec::new();
        let snapshot = {
            let mut state = self.state.lock();
            if !state.controller.destroy(&mut notices) {
                tracing::debug!(target: "vesper_menu::prioritized", "destroy on already-destroyed menu");
                return false;
            }
            for item in &state.flattened {
                notices.push(ItemNotice::Membership {
                    item: item.clone(),
                    added: false,
                });
            }
            for (item, id) in std::mem::take(&mut state.watches) {
                if let Some(signal) = item.behavior().category_changed() {
                    signal.disconnect(id);
                }
            }
            state.buckets = vec![PrioBucket {
                category: None,
                list: OrderedCapacityList::new(self.order.clone()),
                batch: None,
            }];
            state.ordered_views = vec![CategoryView {
                category: None,
                items: Vec::new(),
            }];
            state.flattened.clear();
            UpdateSnapshot {
                cursor: None,
                selection: Vec::new(),
            }
        };
        tracing::debug!(target: "vesper_menu::prioritized", "menu destroyed");
        deliver_update(&self.cx, &self.signals, &self.hooks, snapshot, notices, true);
        self.signals.destroyed.emit(());
        true
    }

    /// Index of the bucket for `category`, creating it on first use.
    fn bucket_index(
        state: &mut PrioState,
        category: Option<Category>,
        order: &OrderPredicate<MenuItem>,
    ) -> usize {
        match state.buckets.iter().position(|b| b.category == category) {
            Some(idx) => idx,
            None => {
                state.buckets.push(PrioBucket {
                    category,
                    list: OrderedCapacityList::new(order.clone()),
                    batch: None,
                });
                state.buckets.len() - 1
            }
        }
    }

    /// Arm the coalescing task; no-op while one is already armed.
    fn schedule_update_locked(&self, state: &mut PrioState) {
        if state.armed.is_some() {
            return;
        }
        let weak = self.weak.clone();
        let id = self.cx.scheduler().defer(self.config.batch_interval, move || {
            if let Some(menu) = weak.upgrade() {
                menu.flush_batch();
            }
        });
        state.armed = Some(id);
        tracing::trace!(
            target: "vesper_menu::prioritized",
            interval = ?self.config.batch_interval,
            "batch flush armed"
        );
    }

    /// Apply every pending batch and rebuild the flattened list.
    ///
    /// Supersession rule: an existing entry is stripped when the batch
    /// touches its stable identity (preferred) or its exact handle;
    /// identity matching never falls back to scanning unidentified
    /// entries. An item that both enters and leaves within one flush was
    /// never observable and produces no membership events.
    fn flush_batch(&self) {
        let _span = PerfSpan::new("flush_batch");
        let mut notices = Vec::new();
        let snapshot = {
            let mut state = self.state.lock();
            // A task firing after destroy must not touch any bucket.
            if state.controller.is_destroyed() {
                return;
            }
            if let Some(id) = state.armed.take() {
                self.cx.scheduler().cancel(id);
            }
            if state.buckets.iter().all(|b| b.batch.is_none()) {
                return;
            }

            let max = self.config.max_category_item_count;
            let mut added = Vec::new();
            let mut removed = Vec::new();

            for bucket in &mut state.buckets {
                let Some(batch) = bucket.batch.take() else {
                    continue;
                };
                if batch.clear {
                    removed.extend(bucket.list.clear());
                }

                let stripped = bucket.list.retain(|existing| {
                    !batch
                        .add
                        .iter()
                        .chain(batch.remove.iter())
                        .any(|touched| touched == existing || touched.same_identity(existing))
                });
                removed.extend(stripped);

                let delta = bucket.list.add(&batch.add, max);
                added.extend(delta.added);
                removed.extend(delta.removed);
            }

            state
                .buckets
                .retain(|b| b.category.is_none() || !b.list.is_empty());

            let added = dedup_by_handle(added);
            let removed = dedup_by_handle(removed);
            let net_added: Vec<MenuItem> = added
                .iter()
                .filter(|item| !removed.contains(*item))
                .cloned()
                .collect();
            let net_removed: Vec<MenuItem> = removed
                .iter()
                .filter(|item| !added.contains(*item))
                .cloned()
                .collect();

            for item in &net_removed {
                if let Some(id) = state.watches.remove(item) {
                    if let Some(signal) = item.behavior().category_changed() {
                        signal.disconnect(id);
                    }
                }
            }
            for item in &net_added {
                self.watch_category(&mut state, item.clone());
            }

            tracing::trace!(
                target: "vesper_menu::prioritized",
                added = net_added.len(),
                removed = net_removed.len(),
                "batch flushed"
            );

            let views: Vec<CategoryView> = state
                .buckets
                .iter()
                .map(|b| CategoryView {
                    category: b.category.clone(),
                    items: b.list.get().to_vec(),
                })
                .collect();
            let order = (self.sort)(&views);
            state.ordered_views = reorder(views, &order);
            state.flattened = flatten_ordered(&state.ordered_views);

            for item in net_added {
                notices.push(ItemNotice::Membership { item, added: true });
            }
            for item in net_removed {
                notices.push(ItemNotice::Membership { item, added: false });
            }

            let PrioState {
                controller,
                flattened,
                ..
            } = &mut *state;
            controller.revalidate(&self.cx, flattened, &mut notices);

            UpdateSnapshot {
                cursor: controller.cursor(),
                selection: controller.selected(),
            }
        };
        deliver_update(&self.cx, &self.signals, &self.hooks, snapshot, notices, true);
    }

    /// Subscribe to a visible item's category-change signal.
    fn watch_category(&self, state: &mut PrioState, item: MenuItem) {
        if let Some(signal) = item.behavior().category_changed() {
            let weak = self.weak.clone();
            let subject = item.clone();
            let id = signal.connect(move |_| {
                if let Some(menu) = weak.upgrade() {
                    menu.recheck_category(&subject);
                }
            });
            state.watches.insert(item, id);
        }
    }

    /// A visible item's category was recomputed: queue a move between
    /// buckets for the next flush.
    fn recheck_category(&self, item: &MenuItem) {
        let new_category = item.behavior().category(&self.cx);
        let mut state = self.state.lock();
        if state.controller.is_destroyed() {
            return;
        }
        let Some(current) = state
            .buckets
            .iter()
            .position(|b| b.list.find(item).is_some())
        else {
            return;
        };
        if state.buckets[current].category == new_category {
            return;
        }
        tracing::debug!(
            target: "vesper_menu::prioritized",
            category = new_category.as_ref().map(Category::name),
            "queuing category move"
        );

        {
            let batch = state.buckets[current]
                .batch
                .get_or_insert_with(PendingBatch::default);
            if !batch.remove.contains(item) {
                batch.remove.push(item.clone());
            }
        }
        let target = Self::bucket_index(&mut state, new_category, &self.order);
        let batch = state.buckets[target]
            .batch
            .get_or_insert_with(PendingBatch::default);
        batch
            .add
            .retain(|pending| pending != item && !pending.same_identity(item));
        batch.add.push(item.clone());

        self.schedule_update_locked(&mut state);
    }
}

fn dedup_by_handle(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut out: Vec<MenuItem> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl MenuLike for PrioritizedMenu {
    fn context(&self) -> &MenuContext {
        &self.cx
    }

    fn add_item(&self, item: MenuItem) -> bool {
        PrioritizedMenu::add_item(self, item)
    }

    fn remove_item(&self, item: &MenuItem) -> bool {
        PrioritizedMenu::remove_item(self, item)
    }

    fn items(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        PrioritizedMenu::items(self, hook)
    }

    fn categories(&self, hook: Option<&DataHook>) -> Vec<CategoryView> {
        PrioritizedMenu::categories(self, hook)
    }

    fn cursor(&self, hook: Option<&DataHook>) -> Option<MenuItem> {
        PrioritizedMenu::cursor(self, hook)
    }

    fn set_cursor(&self, item: Option<MenuItem>) -> bool {
        PrioritizedMenu::set_cursor(self, item)
    }

    fn selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        PrioritizedMenu::selected(self, hook)
    }

    fn set_selected(&self, item: &MenuItem, selected: bool) -> bool {
        PrioritizedMenu::set_selected(self, item, selected)
    }

    fn all_selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        PrioritizedMenu::all_selected(self, hook)
    }

    fn signals(&self) -> &MenuSignals {
        &self.signals
    }

    fn is_destroyed(&self, hook: Option<&DataHook>) -> bool {
        PrioritizedMenu::is_destroyed(self, hook)
    }

    fn destroy(&self) -> bool {
        PrioritizedMenu::destroy(self)
    }
}

static_assertions::assert_impl_all!(PrioritizedMenu: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use parking_lot::Mutex as PlMutex;

    use vesper_core::DeferredQueue;

    use crate::item::{Priority, StaticBehavior};

    fn cx() -> MenuContext {
        MenuContext::new(Arc::new(DeferredQueue::new()))
    }

    fn prio(label: &str, priority: f64) -> MenuItem {
        MenuItem::labeled(label).with_priority(Priority::new(priority))
    }

    #[test]
    fn mutations_are_invisible_until_flush() {
        let menu = PrioritizedMenu::new(cx());
        menu.add_item(prio("a", 1.0));

        assert!(menu.items(None).is_empty());
        menu.flush_now();
        assert_eq!(menu.items(None).len(), 1);
    }

    #[test]
    fn priority_zero_is_dropped() {
        let menu = PrioritizedMenu::new(cx());
        assert!(!menu.add_item(MenuItem::labeled("ghost").with_priority(Priority::NONE)));

        menu.flush_now();
        assert!(menu.items(None).is_empty());
    }

    #[test]
    fn items_order_by_priority_with_arrival_ties() {
        let menu = PrioritizedMenu::new(cx());
        let low = prio("low", 1.0);
        let high = prio("high", 3.0);
        let mid_first = prio("mid_first", 2.0);
        let mid_second = prio("mid_second", 2.0);

        menu.add_item(low.clone());
        menu.add_item(mid_first.clone());
        menu.add_item(high.clone());
        menu.add_item(mid_second.clone());
        menu.flush_now();

        assert_eq!(menu.items(None), vec![high, mid_first, mid_second, low]);
    }

    #[test]
    fn burst_produces_single_flush() {
        let scheduler = Arc::new(DeferredQueue::new());
        let cx = MenuContext::new(scheduler.clone());
        let menu = PrioritizedMenu::new(cx);

        for i in 0..10 {
            menu.add_item(prio(&format!("item-{i}"), 1.0));
        }
        // The burst armed exactly one coalescing task.
        assert_eq!(scheduler.pending_count(), 1);

        menu.flush_now();
        assert_eq!(menu.items(None).len(), 10);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn identity_supersession_last_write_wins() {
        let menu = PrioritizedMenu::new(cx());
        let added_events = Arc::new(PlMutex::new(Vec::new()));

        let added_clone = added_events.clone();
        menu.signals().item_added.connect(move |item| {
            added_clone.lock().push(item.clone());
        });

        let v1 = prio("a", 1.0).with_identity("a");
        let v2 = prio("a", 2.0).with_identity("a");

        menu.add_item(v1.clone());
        menu.remove_item(&v1);
        menu.add_item(v2.clone());
        menu.flush_now();

        let items = menu.items(None);
        assert_eq!(items, vec![v2.clone()]);
        assert_eq!(items[0].priority(), Priority::new(2.0));
        // Exactly one added event, not three.
        assert_eq!(*added_events.lock(), vec![v2]);
    }

    #[test]
    fn recontribution_replaces_visible_predecessor() {
        let menu = PrioritizedMenu::new(cx());
        let v1 = prio("result", 1.0).with_identity("r");
        menu.add_item(v1.clone());
        menu.flush_now();
        assert_eq!(menu.items(None), vec![v1]);

        let v2 = prio("result (updated)", 5.0).with_identity("r");
        menu.add_item(v2.clone());
        menu.flush_now();

        assert_eq!(menu.items(None), vec![v2]);
    }

    #[test]
    fn capacity_drops_lowest_priority() {
        let config = MenuConfig::new().with_max_category_item_count(2);
        let menu = PrioritizedMenu::with_config(cx(), config).unwrap();

        menu.add_item(prio("one", 1.0).with_identity("1"));
        menu.add_item(prio("two", 3.0).with_identity("2"));
        menu.add_item(prio("three", 2.0).with_identity("3"));
        menu.flush_now();

        let labels: Vec<String> = menu
            .items(None)
            .iter()
            .map(|i| i.view_as::<String>().cloned().unwrap_or_default())
            .collect();
        assert_eq!(labels, vec!["two", "three"]);
    }

    #[test]
    fn remove_before_flush_cancels_add() {
        let menu = PrioritizedMenu::new(cx());
        let events = Arc::new(PlMutex::new(0usize));

        let events_clone = events.clone();
        menu.signals().item_added.connect(move |_| {
            *events_clone.lock() += 1;
        });

        let a = prio("a", 1.0);
        menu.add_item(a.clone());
        menu.remove_item(&a);
        menu.flush_now();

        assert!(menu.items(None).is_empty());
        assert_eq!(*events.lock(), 0);
    }

    #[test]
    fn set_cursor_forces_flush_first() {
        let menu = PrioritizedMenu::new(cx());
        let a = prio("a", 1.0);

        menu.add_item(a.clone());
        // No explicit flush: the cursor operation must observe the item.
        assert!(menu.set_cursor(Some(a.clone())));
        assert_eq!(menu.cursor(None), Some(a));
    }

    #[test]
    fn interval_task_flushes_via_scheduler() {
        let scheduler = Arc::new(DeferredQueue::new());
        let cx = MenuContext::new(scheduler.clone());
        let config = MenuConfig::new().with_batch_interval(Duration::from_millis(5));
        let menu = PrioritizedMenu::with_config(cx, config).unwrap();

        menu.add_item(prio("a", 1.0));
        assert!(menu.items(None).is_empty());

        std::thread::sleep(Duration::from_millis(10));
        scheduler.run_due();

        assert_eq!(menu.items(None).len(), 1);
    }

    #[test]
    fn flush_after_destroy_is_noop() {
        let scheduler = Arc::new(DeferredQueue::new());
        let cx = MenuContext::new(scheduler.clone());
        let menu = PrioritizedMenu::new(cx);

        menu.add_item(prio("a", 1.0));
        assert!(menu.destroy());

        // Whatever fires later must not resurrect anything or panic.
        scheduler.run_due();
        menu.flush_batch();
        assert!(menu.items(None).is_empty());
        assert!(menu.is_destroyed(None));
    }

    #[test]
    fn destroy_flushes_then_notifies() {
        let menu = PrioritizedMenu::new(cx());
        let removed = Arc::new(PlMutex::new(Vec::new()));

        let removed_clone = removed.clone();
        menu.signals().item_removed.connect(move |item| {
            removed_clone.lock().push(item.clone());
        });

        let a = prio("a", 1.0);
        menu.add_item(a.clone());
        assert!(menu.destroy());
        assert!(!menu.destroy());

        // The pending addition was flushed, then the item left on destroy.
        assert_eq!(*removed.lock(), vec![a]);
        assert!(menu.items(None).is_empty());
    }

    #[test]
    fn categories_with_items_sort_first_by_default() {
        let menu = PrioritizedMenu::new(cx());
        let apps = Category::labeled("Apps");
        let in_apps = MenuItem::new(
            "app".to_string(),
            Arc::new(StaticBehavior::in_category(apps.clone())),
        )
        .with_priority(Priority::MEDIUM);

        menu.add_item(in_apps);
        menu.flush_now();

        let views = menu.categories(None);
        assert_eq!(views[0].category, Some(apps));
    }

    #[test]
    fn loading_indicator_is_independent_of_flushes() {
        let menu = PrioritizedMenu::new(cx());
        let seen = Arc::new(PlMutex::new(Vec::new()));

        let seen_clone = seen.clone();
        menu.signals().loading_changed.connect(move |&loading| {
            seen_clone.lock().push(loading);
        });

        assert!(!menu.is_loading(None));
        menu.set_loading(true);
        menu.set_loading(true); // unchanged: no signal
        menu.set_loading(false);

        assert!(!menu.is_loading(None));
        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[test]
    fn empty_categories_prune_after_flush() {
        let menu = PrioritizedMenu::new(cx());
        let apps = Category::labeled("Apps");
        let item = MenuItem::new(
            "app".to_string(),
            Arc::new(StaticBehavior::in_category(apps.clone())),
        )
        .with_priority(Priority::MEDIUM);

        menu.add_item(item.clone());
        menu.flush_now();
        assert_eq!(menu.categories(None).len(), 2);

        menu.remove_item(&item);
        menu.flush_now();
        let views = menu.categories(None);
        assert_eq!(views.len(), 1);
        assert!(views[0].category.is_none());
    }
}
