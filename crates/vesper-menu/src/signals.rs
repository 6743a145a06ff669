//! Change-notification signals emitted by menus.
//!
//! Views and integration code connect to these to stay synchronized with a
//! menu. All signals fire after a structural change is fully applied —
//! consumers always observe the new, consistent snapshot when reading back.

use vesper_core::Signal;

use crate::item::MenuItem;

/// Collection of signals emitted by menu instances.
pub struct MenuSignals {
    /// Emitted once per structural change, after the flattened list has
    /// been rebuilt.
    pub items_changed: Signal<()>,

    /// Emitted for each item that entered the menu (at most once per item
    /// per flush).
    pub item_added: Signal<MenuItem>,

    /// Emitted for each item that left the menu (at most once per item per
    /// flush).
    pub item_removed: Signal<MenuItem>,

    /// Emitted when the cursor moved. Args: the new cursor.
    pub cursor_changed: Signal<Option<MenuItem>>,

    /// Emitted when the selection changed. Args: the new selection.
    pub selection_changed: Signal<Vec<MenuItem>>,

    /// Emitted when the loading indicator changed (prioritized menus).
    pub loading_changed: Signal<bool>,

    /// Emitted exactly once, when the menu is destroyed.
    pub destroyed: Signal<()>,
}

impl Default for MenuSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuSignals {
    /// Creates a new set of menu signals.
    pub fn new() -> Self {
        Self {
            items_changed: Signal::new(),
            item_added: Signal::new(),
            item_removed: Signal::new(),
            cursor_changed: Signal::new(),
            selection_changed: Signal::new(),
            loading_changed: Signal::new(),
            destroyed: Signal::new(),
        }
    }
}
