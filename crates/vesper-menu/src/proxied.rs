//! Source-synced menus.
//!
//! [`ProxiedMenu`] wraps any [`MenuLike`] and keeps its contents
//! synchronized with an externally supplied, reactively-read item array:
//! a folder listing, a dynamically computed submenu, any getter that can
//! report "I changed". Reconciliation is set-difference by handle — items
//! present in both the old and new snapshot are never touched, so their
//! cursor/selection state survives source updates.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use vesper_core::DataHook;

use crate::category::CategoryView;
use crate::context::MenuContext;
use crate::error::{MenuError, Result};
use crate::item::MenuItem;
use crate::signals::MenuSignals;
use crate::traits::MenuLike;

/// A reactive item-array getter.
///
/// Like every engine getter: `None` reads a plain snapshot, `Some(hook)`
/// additionally registers for a notification on the next change.
pub type ItemSource = Arc<dyn Fn(Option<&DataHook>) -> Vec<MenuItem> + Send + Sync>;

struct ProxyState {
    previous: Vec<MenuItem>,
    destroyed: bool,
}

/// An adapter that drives a wrapped menu from a reactive item array.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::RwLock;
/// use vesper_core::DeferredQueue;
/// use vesper_menu::{ItemSource, Menu, MenuContext, MenuItem, MenuLike, ProxiedMenu};
///
/// let cx = MenuContext::new(Arc::new(DeferredQueue::new()));
/// let items = Arc::new(RwLock::new(vec![MenuItem::labeled("a")]));
///
/// let items_clone = items.clone();
/// let source: ItemSource = Arc::new(move |_hook| items_clone.read().clone());
///
/// let proxied = ProxiedMenu::new(Menu::new(cx), source).unwrap();
/// assert_eq!(proxied.items(None).len(), 1);
///
/// items.write().push(MenuItem::labeled("b"));
/// proxied.resync(); // normally triggered by the source's change hook
/// assert_eq!(proxied.items(None).len(), 2);
/// ```
pub struct ProxiedMenu {
    inner: Arc<dyn MenuLike>,
    source: ItemSource,
    state: Mutex<ProxyState>,
    hook: DataHook,
}

impl ProxiedMenu {
    /// Wrap `inner` and populate it from `source`.
    ///
    /// Fails fast when handed an already-destroyed menu — wiring a dead
    /// menu to a live source is an integration bug, not a runtime race.
    pub fn new(inner: Arc<impl MenuLike + 'static>, source: ItemSource) -> Result<Arc<Self>> {
        Self::new_dyn(inner, source)
    }

    /// Type-erased constructor; see [`new`](Self::new).
    pub fn new_dyn(inner: Arc<dyn MenuLike>, source: ItemSource) -> Result<Arc<Self>> {
        if inner.is_destroyed(None) {
            return Err(MenuError::DestroyedMenu);
        }
        let proxied = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let hook = DataHook::new(move || {
                if let Some(proxied) = weak.upgrade() {
                    proxied.resync();
                }
            });
            Self {
                inner,
                source,
                state: Mutex::new(ProxyState {
                    previous: Vec::new(),
                    destroyed: false,
                }),
                hook,
            }
        });
        proxied.resync();
        Ok(proxied)
    }

    /// The wrapped menu.
    pub fn inner(&self) -> &Arc<dyn MenuLike> {
        &self.inner
    }

    /// Re-read the source and reconcile the wrapped menu.
    ///
    /// `added = source ∖ previous` items are forwarded to `add_item`,
    /// `removed = previous ∖ source` to `remove_item`; everything else is
    /// left untouched. Re-arms the source hook for the next change.
    pub fn resync(&self) {
        if self.state.lock().destroyed {
            return;
        }
        let current = (self.source)(Some(&self.hook));

        let (added, removed) = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            let added: Vec<MenuItem> = current
                .iter()
                .filter(|item| !state.previous.contains(*item))
                .cloned()
                .collect();
            let removed: Vec<MenuItem> = state
                .previous
                .iter()
                .filter(|item| !current.contains(*item))
                .cloned()
                .collect();
            state.previous = current;
            (added, removed)
        };

        if added.is_empty() && removed.is_empty() {
            return;
        }
        tracing::trace!(
            target: "vesper_menu::proxied",
            added = added.len(),
            removed = removed.len(),
            "source reconciled"
        );
        for item in &removed {
            self.inner.remove_item(item);
        }
        for item in added {
            self.inner.add_item(item);
        }
    }
}

impl MenuLike for ProxiedMenu {
    fn context(&self) -> &MenuContext {
        self.inner.context()
    }

    fn add_item(&self, item: MenuItem) -> bool {
        self.inner.add_item(item)
    }

    fn remove_item(&self, item: &MenuItem) -> bool {
        self.inner.remove_item(item)
    }

    fn items(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.inner.items(hook)
    }

    fn categories(&self, hook: Option<&DataHook>) -> Vec<CategoryView> {
        self.inner.categories(hook)
    }

    fn cursor(&self, hook: Option<&DataHook>) -> Option<MenuItem> {
        self.inner.cursor(hook)
    }

    fn set_cursor(&self, item: Option<MenuItem>) -> bool {
        self.inner.set_cursor(item)
    }

    fn selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.inner.selected(hook)
    }

    fn set_selected(&self, item: &MenuItem, selected: bool) -> bool {
        self.inner.set_selected(item, selected)
    }

    fn all_selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem> {
        self.inner.all_selected(hook)
    }

    fn signals(&self) -> &MenuSignals {
        self.inner.signals()
    }

    fn is_destroyed(&self, hook: Option<&DataHook>) -> bool {
        self.inner.is_destroyed(hook)
    }

    /// Tear down the source subscription in addition to destroying the
    /// wrapped menu.
    fn destroy(&self) -> bool {
        self.state.lock().destroyed = true;
        self.inner.destroy()
    }
}

static_assertions::assert_impl_all!(ProxiedMenu: Send, Sync);
