//! The object-safe menu contract.
//!
//! [`MenuLike`] is the read/write surface shared by every menu variant.
//! Adapters ([`crate::ProxiedMenu`]) and rendering layers program against
//! this trait so any variant — synchronous, prioritized, or wrapped — can
//! back any list surface.

use vesper_core::DataHook;

use crate::category::CategoryView;
use crate::context::MenuContext;
use crate::item::MenuItem;
use crate::signals::MenuSignals;

/// The common contract of all menu variants.
///
/// Every getter takes an optional [`DataHook`]: omitting it performs a
/// plain snapshot read; supplying one registers the caller for a
/// notification the next time the underlying value changes.
///
/// Mutating operations on a destroyed menu are silent no-ops; read
/// operations keep returning a stable (empty) snapshot.
pub trait MenuLike: Send + Sync {
    /// The IO/action context this menu is bound to.
    fn context(&self) -> &MenuContext;

    /// Add an item. Returns whether the item was accepted.
    fn add_item(&self, item: MenuItem) -> bool;

    /// Remove an item. Returns whether the item was found.
    fn remove_item(&self, item: &MenuItem) -> bool;

    /// The flattened display list: category headers interleaved with items.
    fn items(&self, hook: Option<&DataHook>) -> Vec<MenuItem>;

    /// The current category buckets in display order.
    fn categories(&self, hook: Option<&DataHook>) -> Vec<CategoryView>;

    /// The current cursor item.
    fn cursor(&self, hook: Option<&DataHook>) -> Option<MenuItem>;

    /// Move the cursor. Returns whether the cursor actually changed.
    fn set_cursor(&self, item: Option<MenuItem>) -> bool;

    /// The selected items in selection order.
    fn selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem>;

    /// Select or deselect an item. Returns whether the state changed.
    fn set_selected(&self, item: &MenuItem, selected: bool) -> bool;

    /// Selection ∪ {cursor}: the set multi-item actions operate on.
    fn all_selected(&self, hook: Option<&DataHook>) -> Vec<MenuItem>;

    /// This menu's change-notification signals.
    fn signals(&self) -> &MenuSignals;

    /// Whether the menu has been destroyed.
    fn is_destroyed(&self, hook: Option<&DataHook>) -> bool;

    /// Destroy the menu. Returns `false` when already destroyed.
    fn destroy(&self) -> bool;
}
