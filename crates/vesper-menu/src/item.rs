//! Menu items and their capability set.
//!
//! A [`MenuItem`] is an opaque, cheap-to-clone handle. The engine never
//! interprets the item's *view* (the payload a rendering layer displays);
//! it is passed through unchanged. Everything the engine needs to know
//! about an item — its category, whether it can be selected, how to notify
//! it of state changes — goes through the [`ItemBehavior`] capability
//! trait, keeping the engine independent of any concrete item type.
//!
//! Two items are the same item exactly when their handles share an
//! allocation (`PartialEq` is pointer identity). An optional [`ItemId`]
//! provides the *stable identity* used by the prioritized menu to
//! recognize "the same logical item, updated" across batches.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use vesper_core::Signal;

use crate::category::Category;
use crate::context::MenuContext;

/// An item's contribution weight in a prioritized menu.
///
/// Higher priorities sort earlier within a category. [`Priority::NONE`]
/// (zero) marks an item invisible: prioritized menus silently drop it.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct Priority(f64);

impl Priority {
    /// The invisible priority; items carrying it are never admitted.
    pub const NONE: Priority = Priority(0.0);
    /// Background-noise results.
    pub const LOW: Priority = Priority(1.0);
    /// The ordinary priority band.
    pub const MEDIUM: Priority = Priority(2.0);
    /// Results that should beat the ordinary band.
    pub const HIGH: Priority = Priority(3.0);

    /// Create an arbitrary priority value.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The raw weight.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whether this is the invisible priority.
    pub fn is_none(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl From<f64> for Priority {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// A caller-assigned stable identity for batch reconciliation.
///
/// Items that carry the same `ItemId` are treated as versions of one
/// logical item: a later contribution supersedes an earlier one instead of
/// duplicating it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ItemId(Arc<str>);

impl ItemId {
    /// The identity key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(Arc::from(value.as_str()))
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemId").field(&self.as_str()).finish()
    }
}

/// The capability set consulted by menus an item participates in.
///
/// All methods have permissive defaults so simple items need no
/// implementation at all.
///
/// Capability *queries* (`category`, `selectable`) are invoked while the
/// owning menu's internal lock is held and must not call back into that
/// menu. The shared IO context may be read freely but must not mutate
/// menu-local state. Capability *notifications* (`select_changed`,
/// `cursor_changed`, `menu_changed`) run after the menu has released its
/// lock and may freely operate on menus.
pub trait ItemBehavior: Send + Sync {
    /// Resolve the category this item belongs to, if any.
    fn category(&self, _cx: &MenuContext) -> Option<Category> {
        None
    }

    /// A signal emitting when this item's category should be re-resolved.
    ///
    /// Menus that display the item connect to this signal and move the item
    /// between buckets when it fires. The menu owns the connection and
    /// disconnects it when the item leaves the menu.
    fn category_changed(&self) -> Option<&Signal<()>> {
        None
    }

    /// Whether the item can hold the cursor or be selected.
    fn selectable(&self, _cx: &MenuContext) -> bool {
        true
    }

    /// Notification: the item's selected state in a menu changed.
    fn select_changed(&self, _cx: &MenuContext, _selected: bool) {}

    /// Notification: the item gained or lost the cursor in a menu.
    fn cursor_changed(&self, _cx: &MenuContext, _is_cursor: bool) {}

    /// Notification: the item entered (`true`) or left (`false`) a menu.
    fn menu_changed(&self, _cx: &MenuContext, _added: bool) {}
}

/// Behavior for plain items: uncategorized, selectable, no notifications.
pub struct DefaultBehavior;

impl ItemBehavior for DefaultBehavior {}

/// Behavior with a fixed category and selectability.
///
/// Covers the common case where an item's capabilities are known up front:
/// category headers, static entries, separators.
#[derive(Default)]
pub struct StaticBehavior {
    /// The category the item always resolves to.
    pub category: Option<Category>,
    /// Whether the item can hold the cursor / be selected. `None` = yes.
    pub unselectable: bool,
}

impl StaticBehavior {
    /// A permanently unselectable behavior (headers, separators).
    pub fn unselectable() -> Self {
        Self {
            category: None,
            unselectable: true,
        }
    }

    /// A behavior pinned to one category.
    pub fn in_category(category: Category) -> Self {
        Self {
            category: Some(category),
            unselectable: false,
        }
    }
}

impl ItemBehavior for StaticBehavior {
    fn category(&self, _cx: &MenuContext) -> Option<Category> {
        self.category.clone()
    }

    fn selectable(&self, _cx: &MenuContext) -> bool {
        !self.unselectable
    }
}

struct ItemInner {
    view: Arc<dyn Any + Send + Sync>,
    priority: Priority,
    identity: Option<ItemId>,
    behavior: Arc<dyn ItemBehavior>,
}

/// An opaque handle to an item participating in menus.
///
/// Handles are cheap to clone and compare by pointer identity: two clones
/// of one handle are equal, two separately constructed items never are.
/// The builder-style `with_*` methods produce a *new* handle and are meant
/// to be chained at construction time, before the handle is shared.
///
/// # Example
///
/// ```
/// use vesper_menu::{MenuItem, Priority};
///
/// let item = MenuItem::labeled("Open Terminal")
///     .with_priority(Priority::HIGH)
///     .with_identity("app:terminal");
///
/// assert_eq!(item.view_as::<String>().map(String::as_str), Some("Open Terminal"));
/// assert_eq!(item.priority(), Priority::HIGH);
/// ```
#[derive(Clone)]
pub struct MenuItem {
    inner: Arc<ItemInner>,
}

impl MenuItem {
    /// Create an item from a view payload and a behavior.
    pub fn new<V>(view: V, behavior: Arc<dyn ItemBehavior>) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            inner: Arc::new(ItemInner {
                view: Arc::new(view),
                priority: Priority::default(),
                identity: None,
                behavior,
            }),
        }
    }

    /// Create a plain selectable item with a string label as its view.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self::new(label.into(), Arc::new(DefaultBehavior))
    }

    /// Create an unselectable item, suitable as a category header row.
    pub fn header(label: impl Into<String>) -> Self {
        Self::new(label.into(), Arc::new(StaticBehavior::unselectable()))
    }

    /// Derive a new handle carrying the given priority.
    pub fn with_priority(&self, priority: Priority) -> Self {
        Self {
            inner: Arc::new(ItemInner {
                view: self.inner.view.clone(),
                priority,
                identity: self.inner.identity.clone(),
                behavior: self.inner.behavior.clone(),
            }),
        }
    }

    /// Derive a new handle carrying the given stable identity.
    pub fn with_identity(&self, identity: impl Into<ItemId>) -> Self {
        Self {
            inner: Arc::new(ItemInner {
                view: self.inner.view.clone(),
                priority: self.inner.priority,
                identity: Some(identity.into()),
                behavior: self.inner.behavior.clone(),
            }),
        }
    }

    /// The opaque view payload, untouched by the engine.
    pub fn view(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.inner.view
    }

    /// Downcast the view payload to a concrete type.
    pub fn view_as<T: Any>(&self) -> Option<&T> {
        self.inner.view.downcast_ref::<T>()
    }

    /// The item's priority (meaningful in prioritized menus).
    pub fn priority(&self) -> Priority {
        self.inner.priority
    }

    /// The item's stable identity, if it has one.
    pub fn identity(&self) -> Option<&ItemId> {
        self.inner.identity.as_ref()
    }

    /// The item's capability set.
    pub fn behavior(&self) -> &Arc<dyn ItemBehavior> {
        &self.inner.behavior
    }

    /// Whether two handles share a stable identity.
    pub(crate) fn same_identity(&self, other: &MenuItem) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for MenuItem {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MenuItem {}

impl Hash for MenuItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("ptr", &Arc::as_ptr(&self.inner))
            .field("priority", &self.inner.priority)
            .field("identity", &self.inner.identity.as_ref().map(|id| id.as_str()))
            .finish()
    }
}

static_assertions::assert_impl_all!(MenuItem: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_are_equal_distinct_items_are_not() {
        let a = MenuItem::labeled("a");
        let a2 = a.clone();
        let b = MenuItem::labeled("a");

        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn with_methods_derive_new_handles() {
        let base = MenuItem::labeled("x");
        let derived = base.with_priority(Priority::HIGH).with_identity("x");

        assert_ne!(base, derived);
        assert_eq!(derived.priority(), Priority::HIGH);
        assert_eq!(derived.identity().map(ItemId::as_str), Some("x"));
        assert_eq!(base.identity(), None);
    }

    #[test]
    fn same_identity_requires_ids_on_both_sides() {
        let a = MenuItem::labeled("a").with_identity("k");
        let b = MenuItem::labeled("b").with_identity("k");
        let c = MenuItem::labeled("c");

        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
        assert!(!c.same_identity(&c.clone()));
    }

    #[test]
    fn view_downcast() {
        let item = MenuItem::labeled("hello");
        assert_eq!(item.view_as::<String>().map(String::as_str), Some("hello"));
        assert!(item.view_as::<i32>().is_none());
    }

    #[test]
    fn priority_none_is_invisible() {
        assert!(Priority::NONE.is_none());
        assert!(!Priority::LOW.is_none());
        assert!(Priority::new(0.0).is_none());
    }

    #[test]
    fn header_items_are_unselectable() {
        use std::sync::Arc as StdArc;
        use vesper_core::DeferredQueue;

        let cx = MenuContext::new(StdArc::new(DeferredQueue::new()));
        let header = MenuItem::header("Apps");
        assert!(!header.behavior().selectable(&cx));
    }
}
