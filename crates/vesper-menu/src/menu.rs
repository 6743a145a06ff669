//! The synchronous categorized menu.
//!
//! [`Menu`] applies every mutation immediately: items are grouped into
//! category buckets, category order is recomputed through the pluggable
//! sort function, and the flattened display list is rebuilt on every
//! structural change. [`Menu::add_items`] is the one amortization this
//! variant offers — a whole batch of insertions with a single rebuild.
//!
//! For bursty, asynchronous producers use
//! [`PrioritizedMenu`](crate::PrioritizedMenu), which shares the read
//! contract but coalesces mutations into periodic flushes.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use vesper_core::{ConnectionId, DataHook, HookRegistry};

use crate::category::{
    creation_order_sort, flatten_ordered, reorder, Category, CategorySort, CategoryView,
};
use crate::config::MenuConfig;
use crate::context::MenuContext;
use crate::controller::{deliver_update, ItemNotice, SelectionController, UpdateSnapshot};
use crate::error::Result;
use crate::item::MenuItem;
use crate::signals::MenuSignals;
use crate::traits::MenuLike;

struct SimpleBucket {
    category: Option<Category>,
    items: Vec<MenuItem>,
}

struct MenuState {
    /// Buckets in creation order; `[0]` is the default (no-category) group.
    buckets: Vec<SimpleBucket>,
    /// Bucket views in display order, for the `categories()` getter.
    ordered_views: Vec<CategoryView>,
    /// The flattened display list.
    flattened: Vec<MenuItem>,
    controller: SelectionController,
    /// Category-change subscriptions owned by this menu, disposed when the
    /// item leaves.
    watches: HashMap<MenuItem, ConnectionId>,
}

/// A synchronous, categorized item collection.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vesper_core::DeferredQueue;
/// use vesper_menu::{Menu, MenuContext, MenuItem};
///
/// let cx = MenuContext::new(Arc::new(DeferredQueue::new()));
/// let menu = Menu::new(cx);
///
/// let open = MenuItem::labeled("Open Terminal");
/// assert!(menu.add_item(open.clone()));
/// assert_eq!(menu.items(None), vec![open]);
/// ```
pub struct Menu {
    cx: MenuContext,
    config: MenuConfig,
    sort: CategorySort,
    state: Mutex<MenuState>,
    signals: MenuSignals,
    hooks: HookRegistry,
    weak: Weak<Menu>,
}

impl Menu {
    /// Create an empty menu with the context's default configuration.
    pub fn new(cx: MenuContext) -> Arc<Self> {
        let config = cx.default_config().clone();
        Self::build(cx, config)
    }

    /// Create an empty menu with an explicit configuration.
    ///
    /// Fails fast on degenerate configurations rather than corrupting
    /// state later.
    pub fn with_config(cx: MenuContext, config: MenuConfig) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Self::build(cx, config))
    }

    /// Create a menu pre-populated with `items`.
    pub fn from_items(cx: MenuContext, items: Vec<MenuItem>) -> Arc<Self> {
        let menu = Self::new(cx);
        menu.add_items(&items);
        menu
    }

    fn build(cx: MenuContext, config: MenuConfig) -> Arc<Self> {
        let sort = config
            .sort_categories
            .clone()
            .unwrap_or_else(creation_order_sort);
        Arc::new_cyclic(|weak| Self {
            cx,
            config,
            sort,
            state: Mutex::new(MenuState {
                buckets: vec![SimpleBucket {
                    category: None,
                    items: Vec::new(),
                }],
                ordered_views: vec![CategoryView {
                    category: None,
                    items: Vec::new(),
                }],
                flattened: Vec::new(),
                controller: SelectionController::new(),
                watches: HashMap::new(),
            }),
            signals: MenuSignals::new(),
            hooks: HookRegistry::new(),
            weak: weak.clone(),
        })
    }

    /// This menu's configuration.
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Add `item` at the end of its category.
    ///
    /// Returns `false` when the menu is destroyed, the item is already
    /// present, or its bucket is at capacity.
    pub fn add_item(&self, item: MenuItem) -> bool {
        self.add_item_at(item, usize::MAX)
    }

    /// Add `item` at `index` within its category (clamped to the bucket
    /// length).
    pub fn add_item_at(&self, item: MenuItem, index: usize) -> bool {
        let category = item.behavior().category(&self.cx);
        let mut notices = Vec::new();
        let snapshot = {
            let mut state = self.state.lock();
            if !self.insert_locked(&mut state, item.clone(), category, index) {
                return false;
            }
            notices.push(ItemNotice::Membership {
                item,
                added: true,
            });
            self.rebuild_locked(&mut state, &mut notices)
        };
        self.finish_update(snapshot, notices, true);
        true
    }

    /// Add a batch of items, rebuilding the flattened list once.
    ///
    /// Returns the number of items accepted. A rejected item (duplicate or
    /// bucket at capacity) does not abort the rest of the batch.
    pub fn add_items(&self, items: &[MenuItem]) -> usize {
        let resolved: Vec<(MenuItem, Option<Category>)> = items
            .iter()
            .map(|item| (item.clone(), item.behavior().category(&self.cx)))
            .collect();

        let mut notices = Vec::new();
        let mut accepted = 0;
        let snapshot = {
            let mut state = self.state.lock();
            if state.controller.is_destroyed() {
                return 0;
            }
            for (item, category) in resolved {
                if self.insert_locked(&mut state, item.clone(), category, usize::MAX) {
                    notices.push(ItemNotice::Membership { item, added: true });
                    accepted += 1;
                }
            }
            if accepted == 0 {
                return 0;
            }
            self.rebuild_locked(&mut state, &mut notices)
        };
        self.finish_update(snapshot, notices, true);
        accepted
    }

    /// Remove `item` from whichever bucket holds it.
    ///
    /// Empty non-default buckets are pruned, and the menu's
    /// category-change subscription for the item is disposed.
    pub fn remove_item(&self, item: &MenuItem) -> bool {
        let mut notices = Vec::new();
        let snapshot = {
            let mut state = self.state.lock();
            if state.controller.is_destroyed() || !self.extract_locked(&mut state, item) {
                return false;
            }
            notices.push(ItemNotice::Membership {
                item: item.clone(),
                added: false,
            });
            self.rebuild_locked(&mut state, &mut notices)
        };
        self.finish_update(snapshot, notices, true);
        true
    }

    /// Remove a batch of items, rebuilding the flattened list once.
    ///
    /// Returns the number of items actually removed.
    pub fn remove_items(&self, items: &[MenuItem]) -> usize {
        let mut notices = Vec::new();
        let mut removed = 0;
        let snapshot = {
            let mut state = self.state.lock();
            if state.controller.is_destroyed() {
                return 0;
            }
            for item in items {
                if self.extract_locked(&mut state, item) {
                    notices.push(ItemNotice::Membership {
                        item: item.clone(),
                        added: false,
                    });
                    removed += 1;
                }
            }
            if removed == 0 {
                return 0;
            }
            self.rebuild_locked(&mut state, &mut notices)
        };
        self.finish_update(snapshot, notices, true);
        removed
    }

    /// The flattened display list.
    pub fn items(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.hooks.register_opt(hook);
        self.state.lock().flattened.clone()
    }

    /// The category buckets in display order.
    pub fn categories(&self, hook: Option<&DataHook>) -> Vec<CategoryView> {
        self.hooks.register_opt(hook);
        self.state.lock().ordered_views.clone()
    }

    /// The current cursor.
    pub fn cursor(&self, hook: Option<&DataHook>) -> Option<MenuItem> {
        self.hooks.register_opt(hook);
        self.state.lock().controller.cursor()
    }

    /// Move the cursor; see [`MenuLike::set_cursor`].
    pub fn set_cursor(&self, item: Option<MenuItem>) -> bool {
        let mut notices = Vec::new();
        let (changed, snapshot) = {
            let mut state = self.state.lock();
            let MenuState {
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
            self.finish_update(snapshot, notices, false);
        }
        changed
    }

    /// The selected items.
    pub fn selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.hooks.register_opt(hook);
        self.state.lock().controller.selected()
    }

    /// Select or deselect `item`; see [`MenuLike::set_selected`].
    pub fn set_selected(&self, item: &MenuItem, selected: bool) -> bool {
        let mut notices = Vec::new();
        let (changed, snapshot) = {
            let mut state = self.state.lock();
            let MenuState {
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
            self.finish_update(snapshot, notices, false);
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

    /// Whether the menu has been destroyed.
    pub fn is_destroyed(&self, hook: Option<&DataHook>) -> bool {
        self.hooks.register_opt(hook);
        self.state.lock().controller.is_destroyed()
    }

    /// Destroy the menu: deselect everything, clear the cursor, notify all
    /// current items that they left, and enter the terminal state in which
    /// mutations are no-ops and reads return the empty snapshot.
    ///
    /// Returns `false` when already destroyed.
    pub fn destroy(&self) -> bool {
        let mut notices = Vec::new();
        let snapshot = {
            let mut state = self.state.lock();
            if !state.controller.destroy(&mut notices) {
                tracing::debug!(target: "vesper_menu::menu", "destroy on already-destroyed menu");
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
            state.buckets = vec![SimpleBucket {
                category: None,
                items: Vec::new(),
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
        tracing::debug!(target: "vesper_menu::menu", "menu destroyed");
        self.finish_update(snapshot, notices, true);
        self.signals.destroyed.emit(());
        true
    }

    /// Place `item` in its bucket; `false` when rejected.
    fn insert_locked(
        &self,
        state: &mut MenuState,
        item: MenuItem,
        category: Option<Category>,
        index: usize,
    ) -> bool {
        if state.controller.is_destroyed() {
            return false;
        }
        if state.buckets.iter().any(|b| b.items.contains(&item)) {
            return false;
        }

        let bucket_idx = match state.buckets.iter().position(|b| b.category == category) {
            Some(idx) => idx,
            None => {
                state.buckets.push(SimpleBucket {
                    category: category.clone(),
                    items: Vec::new(),
                });
                state.buckets.len() - 1
            }
        };

        let bucket = &mut state.buckets[bucket_idx];
        if bucket.items.len() >= self.config.max_category_item_count {
            tracing::trace!(
                target: "vesper_menu::menu",
                category = category.as_ref().map(Category::name),
                "bucket at capacity, item rejected"
            );
            return false;
        }
        let index = index.min(bucket.items.len());
        bucket.items.insert(index, item.clone());

        self.watch_category(state, item);
        true
    }

    /// Subscribe to the item's category-change signal, if it has one.
    fn watch_category(&self, state: &mut MenuState, item: MenuItem) {
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

    /// Remove `item` from its bucket, pruning and disposing the watch.
    fn extract_locked(&self, state: &mut MenuState, item: &MenuItem) -> bool {
        let Some(bucket_idx) = state
            .buckets
            .iter()
            .position(|b| b.items.contains(item))
        else {
            return false;
        };

        state.buckets[bucket_idx].items.retain(|x| x != item);
        if state.buckets[bucket_idx].category.is_some() && state.buckets[bucket_idx].items.is_empty()
        {
            state.buckets.remove(bucket_idx);
        }

        if let Some(id) = state.watches.remove(item) {
            if let Some(signal) = item.behavior().category_changed() {
                signal.disconnect(id);
            }
        }
        true
    }

    /// An item's category was recomputed: move it between buckets.
    ///
    /// If the target bucket is at capacity the item drops out of the menu
    /// entirely, exactly as if the move were a remove followed by a
    /// rejected add.
    fn recheck_category(&self, item: &MenuItem) {
        let new_category = item.behavior().category(&self.cx);
        let mut notices = Vec::new();
        let snapshot = {
            let mut state = self.state.lock();
            if state.controller.is_destroyed() {
                return;
            }
            let Some(current_idx) = state
                .buckets
                .iter()
                .position(|b| b.items.contains(item))
            else {
                return;
            };
            if state.buckets[current_idx].category == new_category {
                return;
            }
            tracing::debug!(
                target: "vesper_menu::menu",
                category = new_category.as_ref().map(Category::name),
                "item moved between categories"
            );

            state.buckets[current_idx].items.retain(|x| x != item);
            if state.buckets[current_idx].category.is_some()
                && state.buckets[current_idx].items.is_empty()
            {
                state.buckets.remove(current_idx);
            }

            let bucket_idx = match state
                .buckets
                .iter()
                .position(|b| b.category == new_category)
            {
                Some(idx) => idx,
                None => {
                    state.buckets.push(SimpleBucket {
                        category: new_category,
                        items: Vec::new(),
                    });
                    state.buckets.len() - 1
                }
            };
            let bucket = &mut state.buckets[bucket_idx];
            if bucket.items.len() < self.config.max_category_item_count {
                bucket.items.push(item.clone());
            } else {
                // Target bucket is full: the item leaves the menu.
                if let Some(id) = state.watches.remove(item) {
                    if let Some(signal) = item.behavior().category_changed() {
                        signal.disconnect(id);
                    }
                }
                notices.push(ItemNotice::Membership {
                    item: item.clone(),
                    added: false,
                });
            }
            self.rebuild_locked(&mut state, &mut notices)
        };
        self.finish_update(snapshot, notices, true);
    }

    /// Re-sort categories, rebuild the flattened list, and re-validate the
    /// cursor and selection.
    fn rebuild_locked(
        &self,
        state: &mut MenuState,
        notices: &mut Vec<ItemNotice>,
    ) -> UpdateSnapshot {
        let views: Vec<CategoryView> = state
            .buckets
            .iter()
            .map(|b| CategoryView {
                category: b.category.clone(),
                items: b.items.clone(),
            })
            .collect();
        let order = (self.sort)(&views);
        state.ordered_views = reorder(views, &order);
        state.flattened = flatten_ordered(&state.ordered_views);

        let MenuState {
            controller,
            flattened,
            ..
        } = &mut *state;
        controller.revalidate(&self.cx, flattened, notices);

        UpdateSnapshot {
            cursor: controller.cursor(),
            selection: controller.selected(),
        }
    }

    /// Deliver notices and emit signals after the lock is released.
    fn finish_update(&self, snapshot: UpdateSnapshot, notices: Vec<ItemNotice>, structural: bool) {
        deliver_update(&self.cx, &self.signals, &self.hooks, snapshot, notices, structural);
    }
}

impl MenuLike for Menu {
    fn context(&self) -> &MenuContext {
        &self.cx
    }

    fn add_item(&self, item: MenuItem) -> bool {
        Menu::add_item(self, item)
    }

    fn remove_item(&self, item: &MenuItem) -> bool {
        Menu::remove_item(self, item)
    }

    fn items(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        Menu::items(self, hook)
    }

    fn categories(&self, hook: Option<&DataHook>) -> Vec<CategoryView> {
        Menu::categories(self, hook)
    }

    fn cursor(&self, hook: Option<&DataHook>) -> Option<MenuItem> {
        Menu::cursor(self, hook)
    }

    fn set_cursor(&self, item: Option<MenuItem>) -> bool {
        Menu::set_cursor(self, item)
    }

    fn selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        Menu::selected(self, hook)
    }

    fn set_selected(&self, item: &MenuItem, selected: bool) -> bool {
        Menu::set_selected(self, item, selected)
    }

    fn all_selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        Menu::all_selected(self, hook)
    }

    fn signals(&self) -> &MenuSignals {
        &self.signals
    }

    fn is_destroyed(&self, hook: Option<&DataHook>) -> bool {
        Menu::is_destroyed(self, hook)
    }

    fn destroy(&self) -> bool {
        Menu::destroy(self)
    }
}

static_assertions::assert_impl_all!(Menu: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex as PlMutex;

    use vesper_core::{DeferredQueue, Signal};

    use crate::item::{ItemBehavior, StaticBehavior};

    fn cx() -> MenuContext {
        MenuContext::new(Arc::new(DeferredQueue::new()))
    }

    fn item_in(category: &Category, label: &str) -> MenuItem {
        MenuItem::new(
            label.to_string(),
            Arc::new(StaticBehavior::in_category(category.clone())),
        )
    }

    /// Behavior whose category can be switched at runtime.
    struct SwitchableCategory {
        category: PlMutex<Option<Category>>,
        changed: Signal<()>,
    }

    impl SwitchableCategory {
        fn new(category: Option<Category>) -> Self {
            Self {
                category: PlMutex::new(category),
                changed: Signal::new(),
            }
        }

        fn switch(&self, category: Option<Category>) {
            *self.category.lock() = category;
            self.changed.emit(());
        }
    }

    impl ItemBehavior for SwitchableCategory {
        fn category(&self, _cx: &MenuContext) -> Option<Category> {
            self.category.lock().clone()
        }

        fn category_changed(&self) -> Option<&Signal<()>> {
            Some(&self.changed)
        }
    }

    #[test]
    fn items_flatten_with_headers() {
        let menu = Menu::new(cx());
        let apps = Category::labeled("Apps");
        let plain = MenuItem::labeled("plain");
        let a = item_in(&apps, "a");

        menu.add_item(plain.clone());
        menu.add_item(a.clone());

        let items = menu.items(None);
        assert_eq!(items, vec![plain, apps.header().clone(), a]);
    }

    #[test]
    fn add_item_at_index_within_category() {
        let menu = Menu::new(cx());
        let a = MenuItem::labeled("a");
        let b = MenuItem::labeled("b");
        let c = MenuItem::labeled("c");

        menu.add_item(a.clone());
        menu.add_item(b.clone());
        menu.add_item_at(c.clone(), 1);

        assert_eq!(menu.items(None), vec![a, c, b]);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let menu = Menu::new(cx());
        let a = MenuItem::labeled("a");

        assert!(menu.add_item(a.clone()));
        assert!(!menu.add_item(a.clone()));
        assert_eq!(menu.items(None).len(), 1);
    }

    #[test]
    fn capacity_rejects_at_add_time() {
        let config = MenuConfig::new().with_max_category_item_count(2);
        let menu = Menu::with_config(cx(), config).unwrap();

        assert!(menu.add_item(MenuItem::labeled("a")));
        assert!(menu.add_item(MenuItem::labeled("b")));
        assert!(!menu.add_item(MenuItem::labeled("c")));
        assert_eq!(menu.items(None).len(), 2);
    }

    #[test]
    fn add_items_rebuilds_once() {
        let menu = Menu::new(cx());
        let rebuilds = Arc::new(PlMutex::new(0));

        let rebuilds_clone = rebuilds.clone();
        menu.signals().items_changed.connect(move |_| {
            *rebuilds_clone.lock() += 1;
        });

        let accepted = menu.add_items(&[
            MenuItem::labeled("a"),
            MenuItem::labeled("b"),
            MenuItem::labeled("c"),
        ]);

        assert_eq!(accepted, 3);
        assert_eq!(*rebuilds.lock(), 1);
    }

    #[test]
    fn removing_last_item_prunes_category() {
        let menu = Menu::new(cx());
        let apps = Category::labeled("Apps");
        let a = item_in(&apps, "a");

        menu.add_item(a.clone());
        assert_eq!(menu.categories(None).len(), 2);

        menu.remove_item(&a);
        let views = menu.categories(None);
        assert_eq!(views.len(), 1);
        assert!(views[0].category.is_none());
    }

    #[test]
    fn default_bucket_is_never_pruned() {
        let menu = Menu::new(cx());
        let a = MenuItem::labeled("a");

        menu.add_item(a.clone());
        menu.remove_item(&a);

        let views = menu.categories(None);
        assert_eq!(views.len(), 1);
        assert!(views[0].items.is_empty());
    }

    #[test]
    fn category_change_moves_item() {
        let menu = Menu::new(cx());
        let behavior = Arc::new(SwitchableCategory::new(None));
        let item = MenuItem::new("movable".to_string(), behavior.clone());

        menu.add_item(item.clone());
        assert!(menu.categories(None)[0].items.contains(&item));

        let target = Category::labeled("Target");
        behavior.switch(Some(target.clone()));

        let views = menu.categories(None);
        let bucket = views
            .iter()
            .find(|v| v.category.as_ref() == Some(&target))
            .expect("target bucket exists");
        assert!(bucket.items.contains(&item));
        let default_bucket = views
            .iter()
            .find(|v| v.category.is_none())
            .expect("default bucket exists");
        assert!(!default_bucket.items.contains(&item));
    }

    #[test]
    fn category_watch_is_disposed_on_removal() {
        let menu = Menu::new(cx());
        let behavior = Arc::new(SwitchableCategory::new(None));
        let item = MenuItem::new("watched".to_string(), behavior.clone());

        menu.add_item(item.clone());
        assert_eq!(behavior.changed.connection_count(), 1);

        menu.remove_item(&item);
        assert_eq!(behavior.changed.connection_count(), 0);
    }

    #[test]
    fn cursor_reseats_when_cursor_item_removed() {
        let menu = Menu::new(cx());
        let x = MenuItem::labeled("x");
        let y = MenuItem::labeled("y");

        menu.add_item(x.clone());
        menu.add_item(y.clone());
        menu.set_cursor(Some(x.clone()));

        menu.remove_item(&x);
        assert_eq!(menu.cursor(None), Some(y));
    }

    #[test]
    fn selection_prunes_on_removal() {
        let menu = Menu::new(cx());
        let x = MenuItem::labeled("x");
        let y = MenuItem::labeled("y");

        menu.add_item(x.clone());
        menu.add_item(y.clone());
        menu.set_selected(&x, true);
        menu.set_selected(&y, true);

        menu.remove_item(&y);
        assert_eq!(menu.selected(None), vec![x]);
    }

    #[test]
    fn destroy_is_idempotent_and_terminal() {
        let menu = Menu::new(cx());
        let a = MenuItem::labeled("a");
        menu.add_item(a.clone());
        menu.set_cursor(Some(a.clone()));

        assert!(menu.destroy());
        assert!(!menu.destroy());

        assert!(menu.is_destroyed(None));
        assert!(menu.items(None).is_empty());
        assert_eq!(menu.cursor(None), None);
        assert!(!menu.add_item(MenuItem::labeled("late")));
        assert!(!menu.set_cursor(Some(a)));
    }

    #[test]
    fn destroy_notifies_items_and_signal() {
        let menu = Menu::new(cx());
        let removed = Arc::new(PlMutex::new(Vec::new()));
        let destroyed = Arc::new(PlMutex::new(false));

        let a = MenuItem::labeled("a");
        menu.add_item(a.clone());

        let removed_clone = removed.clone();
        menu.signals().item_removed.connect(move |item| {
            removed_clone.lock().push(item.clone());
        });
        let destroyed_clone = destroyed.clone();
        menu.signals().destroyed.connect(move |_| {
            *destroyed_clone.lock() = true;
        });

        menu.destroy();
        assert_eq!(*removed.lock(), vec![a]);
        assert!(*destroyed.lock());
    }

    #[test]
    fn hooks_invalidate_on_change() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let menu = Menu::new(cx());
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_clone = fired.clone();
        let hook = DataHook::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        menu.items(Some(&hook));
        menu.add_item(MenuItem::labeled("a"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // One-shot: a further change without re-reading stays silent.
        menu.add_item(MenuItem::labeled("b"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        menu.items(Some(&hook));
        menu.add_item(MenuItem::labeled("c"));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn from_items_populates() {
        let items = vec![MenuItem::labeled("a"), MenuItem::labeled("b")];
        let menu = Menu::from_items(cx(), items.clone());
        assert_eq!(menu.items(None), items);
    }
}
