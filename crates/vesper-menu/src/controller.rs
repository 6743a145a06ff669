//! Cursor and selection state machine.
//!
//! [`SelectionController`] owns the single-cursor / multi-selection state
//! shared by every menu variant, independent of how items are stored. It
//! never fires item notifications itself: mutations return a list of
//! [`ItemNotice`]s that the owning menu delivers *after* releasing its
//! internal lock, so notification handlers may freely re-enter the menu.

use vesper_core::HookRegistry;

use crate::context::MenuContext;
use crate::item::MenuItem;
use crate::signals::MenuSignals;

/// A pending item notification produced under the menu lock and delivered
/// after it is released.
#[derive(Debug, Clone)]
pub(crate) enum ItemNotice {
    /// The item's selected state changed.
    Select { item: MenuItem, selected: bool },
    /// The item gained or lost the cursor.
    Cursor { item: MenuItem, is_cursor: bool },
    /// The item entered or left the menu.
    Membership { item: MenuItem, added: bool },
}

impl ItemNotice {
    /// Deliver this notice to the item's behavior.
    pub(crate) fn deliver(&self, cx: &MenuContext) {
        match self {
            Self::Select { item, selected } => item.behavior().select_changed(cx, *selected),
            Self::Cursor { item, is_cursor } => item.behavior().cursor_changed(cx, *is_cursor),
            Self::Membership { item, added } => item.behavior().menu_changed(cx, *added),
        }
    }
}

/// Cursor/selection snapshot captured under the menu lock, used for signal
/// payloads after it is released.
pub(crate) struct UpdateSnapshot {
    pub(crate) cursor: Option<MenuItem>,
    pub(crate) selection: Vec<MenuItem>,
}

/// Deliver the notices of one structural update and emit the matching
/// menu signals. Must be called after the menu's internal lock has been
/// released: notification handlers may re-enter the menu.
pub(crate) fn deliver_update(
    cx: &MenuContext,
    signals: &MenuSignals,
    hooks: &HookRegistry,
    snapshot: UpdateSnapshot,
    notices: Vec<ItemNotice>,
    structural: bool,
) {
    let mut cursor_changed = false;
    let mut selection_changed = false;

    for notice in &notices {
        notice.deliver(cx);
    }
    for notice in &notices {
        match notice {
            ItemNotice::Membership { item, added: true } => {
                signals.item_added.emit(item.clone());
            }
            ItemNotice::Membership { item, added: false } => {
                signals.item_removed.emit(item.clone());
            }
            ItemNotice::Cursor { .. } => cursor_changed = true,
            ItemNotice::Select { .. } => selection_changed = true,
        }
    }

    if structural {
        signals.items_changed.emit(());
    }
    if cursor_changed {
        signals.cursor_changed.emit(snapshot.cursor);
    }
    if selection_changed {
        signals.selection_changed.emit(snapshot.selection);
    }
    hooks.invalidate_all();
}

/// The cursor / selection state of one menu.
pub(crate) struct SelectionController {
    cursor: Option<MenuItem>,
    selected: Vec<MenuItem>,
    destroyed: bool,
}

impl SelectionController {
    pub(crate) fn new() -> Self {
        Self {
            cursor: None,
            selected: Vec::new(),
            destroyed: false,
        }
    }

    pub(crate) fn cursor(&self) -> Option<MenuItem> {
        self.cursor.clone()
    }

    pub(crate) fn selected(&self) -> Vec<MenuItem> {
        self.selected.clone()
    }

    /// The canonical set driving multi-item actions: selection ∪ {cursor}.
    pub(crate) fn all_selected(&self) -> Vec<MenuItem> {
        let mut all = self.selected.clone();
        if let Some(cursor) = &self.cursor {
            if !all.contains(cursor) {
                all.push(cursor.clone());
            }
        }
        all
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Toggle an item's membership in the selection.
    ///
    /// No-op (empty notices, `false`) when the menu is destroyed, the item
    /// is not in `list`, the select would target an unselectable item, or
    /// the state already matches.
    pub(crate) fn set_selected(
        &mut self,
        cx: &MenuContext,
        list: &[MenuItem],
        item: &MenuItem,
        selected: bool,
        notices: &mut Vec<ItemNotice>,
    ) -> bool {
        if self.destroyed || !list.contains(item) {
            return false;
        }

        let currently = self.selected.contains(item);
        if selected {
            if currently || !item.behavior().selectable(cx) {
                return false;
            }
            self.selected.push(item.clone());
        } else {
            if !currently {
                return false;
            }
            self.selected.retain(|s| s != item);
        }

        notices.push(ItemNotice::Select {
            item: item.clone(),
            selected,
        });
        true
    }

    /// Move the cursor.
    ///
    /// `None` always clears. A `Some` target must be a member of `list`
    /// and pass the selectability check. Fires the old item's de-cursor
    /// notice before the new item's cursor notice, only on actual change.
    pub(crate) fn set_cursor(
        &mut self,
        cx: &MenuContext,
        list: &[MenuItem],
        item: Option<MenuItem>,
        notices: &mut Vec<ItemNotice>,
    ) -> bool {
        if self.destroyed {
            return false;
        }
        if let Some(target) = &item {
            if !list.contains(target) || !target.behavior().selectable(cx) {
                return false;
            }
        }
        if self.cursor == item {
            return false;
        }

        if let Some(old) = self.cursor.take() {
            notices.push(ItemNotice::Cursor {
                item: old,
                is_cursor: false,
            });
        }
        if let Some(new) = &item {
            notices.push(ItemNotice::Cursor {
                item: new.clone(),
                is_cursor: true,
            });
        }
        self.cursor = item;
        true
    }

    /// Re-validate cursor and selection against a freshly rebuilt
    /// flattened list.
    ///
    /// Items that left the list are pruned from the selection; a cursor
    /// that left the list or became unselectable is re-seated onto the
    /// first selectable item, or cleared when none exists. Returns whether
    /// the cursor moved.
    pub(crate) fn revalidate(
        &mut self,
        cx: &MenuContext,
        list: &[MenuItem],
        notices: &mut Vec<ItemNotice>,
    ) -> bool {
        if self.destroyed {
            return false;
        }

        let mut pruned = Vec::new();
        self.selected.retain(|item| {
            let keep = list.contains(item);
            if !keep {
                pruned.push(item.clone());
            }
            keep
        });
        for item in pruned {
            notices.push(ItemNotice::Select {
                item,
                selected: false,
            });
        }

        let cursor_valid = match &self.cursor {
            Some(cursor) => list.contains(cursor) && cursor.behavior().selectable(cx),
            None => true,
        };
        if cursor_valid {
            return false;
        }

        if let Some(old) = self.cursor.take() {
            notices.push(ItemNotice::Cursor {
                item: old,
                is_cursor: false,
            });
        }
        let replacement = list
            .iter()
            .find(|item| item.behavior().selectable(cx))
            .cloned();
        if let Some(new) = &replacement {
            notices.push(ItemNotice::Cursor {
                item: new.clone(),
                is_cursor: true,
            });
        }
        self.cursor = replacement;
        true
    }

    /// Tear down: deselect everything, clear the cursor, enter the
    /// terminal destroyed state.
    ///
    /// Returns `false` (and no notices) when already destroyed.
    pub(crate) fn destroy(&mut self, notices: &mut Vec<ItemNotice>) -> bool {
        if self.destroyed {
            return false;
        }

        for item in self.selected.drain(..) {
            notices.push(ItemNotice::Select {
                item,
                selected: false,
            });
        }
        if let Some(cursor) = self.cursor.take() {
            notices.push(ItemNotice::Cursor {
                item: cursor,
                is_cursor: false,
            });
        }
        self.destroyed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use vesper_core::DeferredQueue;

    use crate::item::{MenuItem, StaticBehavior};

    fn cx() -> MenuContext {
        MenuContext::new(Arc::new(DeferredQueue::new()))
    }

    fn unselectable(label: &str) -> MenuItem {
        MenuItem::new(label.to_string(), Arc::new(StaticBehavior::unselectable()))
    }

    #[test]
    fn select_requires_membership() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let inside = MenuItem::labeled("in");
        let outside = MenuItem::labeled("out");
        let list = vec![inside.clone()];
        let mut notices = Vec::new();

        assert!(!controller.set_selected(&cx, &list, &outside, true, &mut notices));
        assert!(controller.set_selected(&cx, &list, &inside, true, &mut notices));
        assert_eq!(controller.selected(), vec![inside]);
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn redundant_toggles_are_silent() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let item = MenuItem::labeled("a");
        let list = vec![item.clone()];
        let mut notices = Vec::new();

        assert!(controller.set_selected(&cx, &list, &item, true, &mut notices));
        assert!(!controller.set_selected(&cx, &list, &item, true, &mut notices));
        assert!(controller.set_selected(&cx, &list, &item, false, &mut notices));
        assert!(!controller.set_selected(&cx, &list, &item, false, &mut notices));
        assert_eq!(notices.len(), 2);
    }

    #[test]
    fn cursor_rejects_unselectable() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let header = unselectable("header");
        let list = vec![header.clone()];
        let mut notices = Vec::new();

        assert!(!controller.set_cursor(&cx, &list, Some(header), &mut notices));
        assert!(notices.is_empty());
    }

    #[test]
    fn cursor_move_fires_old_then_new() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let a = MenuItem::labeled("a");
        let b = MenuItem::labeled("b");
        let list = vec![a.clone(), b.clone()];
        let mut notices = Vec::new();

        controller.set_cursor(&cx, &list, Some(a.clone()), &mut notices);
        notices.clear();
        controller.set_cursor(&cx, &list, Some(b.clone()), &mut notices);

        match &notices[..] {
            [ItemNotice::Cursor {
                item: old,
                is_cursor: false,
            }, ItemNotice::Cursor {
                item: new,
                is_cursor: true,
            }] => {
                assert_eq!(*old, a);
                assert_eq!(*new, b);
            }
            other => panic!("unexpected notices: {other:?}"),
        }
    }

    #[test]
    fn revalidate_reseats_cursor_on_first_selectable() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let x = MenuItem::labeled("x");
        let y = MenuItem::labeled("y");
        let header = unselectable("header");
        let mut notices = Vec::new();

        controller.set_cursor(&cx, &[x.clone(), y.clone()], Some(x.clone()), &mut notices);

        // x was removed; the header cannot take the cursor.
        let moved = controller.revalidate(&cx, &[header, y.clone()], &mut notices);
        assert!(moved);
        assert_eq!(controller.cursor(), Some(y));
    }

    #[test]
    fn revalidate_clears_cursor_when_nothing_selectable() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let x = MenuItem::labeled("x");
        let mut notices = Vec::new();

        controller.set_cursor(&cx, &[x.clone()], Some(x), &mut notices);
        controller.revalidate(&cx, &[unselectable("h")], &mut notices);
        assert_eq!(controller.cursor(), None);
    }

    #[test]
    fn revalidate_prunes_vanished_selection() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let x = MenuItem::labeled("x");
        let y = MenuItem::labeled("y");
        let list = vec![x.clone(), y.clone()];
        let mut notices = Vec::new();

        controller.set_selected(&cx, &list, &x, true, &mut notices);
        controller.set_selected(&cx, &list, &y, true, &mut notices);
        controller.revalidate(&cx, &[x.clone()], &mut notices);

        assert_eq!(controller.selected(), vec![x]);
    }

    #[test]
    fn all_selected_includes_cursor_once() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let a = MenuItem::labeled("a");
        let b = MenuItem::labeled("b");
        let list = vec![a.clone(), b.clone()];
        let mut notices = Vec::new();

        controller.set_selected(&cx, &list, &a, true, &mut notices);
        controller.set_cursor(&cx, &list, Some(b.clone()), &mut notices);
        assert_eq!(controller.all_selected(), vec![a.clone(), b.clone()]);

        // Cursor already in the selection: no duplicate.
        controller.set_cursor(&cx, &list, Some(a.clone()), &mut notices);
        assert_eq!(controller.all_selected(), vec![a]);
    }

    #[test]
    fn destroy_is_idempotent() {
        let cx = cx();
        let mut controller = SelectionController::new();
        let a = MenuItem::labeled("a");
        let list = vec![a.clone()];
        let mut notices = Vec::new();

        controller.set_selected(&cx, &list, &a, true, &mut notices);
        controller.set_cursor(&cx, &list, Some(a.clone()), &mut notices);
        notices.clear();

        assert!(controller.destroy(&mut notices));
        // Deselect then de-cursor.
        assert_eq!(notices.len(), 2);
        assert!(!controller.destroy(&mut notices));
        assert_eq!(notices.len(), 2);

        // Terminal state: every mutation is a silent no-op.
        assert!(!controller.set_selected(&cx, &list, &a, true, &mut notices));
        assert!(!controller.set_cursor(&cx, &list, Some(a), &mut notices));
    }
}
