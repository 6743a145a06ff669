//! Categories: optional grouping keys for menu items.
//!
//! A [`Category`] groups items under a header row. Category values compare
//! by pointer identity, so the same `Category` handle must be used for
//! every item meant to land in one bucket. Every menu additionally owns a
//! "no category" group for items that resolve to `None`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::item::MenuItem;

struct CategoryInner {
    name: String,
    description: Option<String>,
    header: MenuItem,
}

/// A grouping key with its own header item and sort participation.
///
/// # Example
///
/// ```
/// use vesper_menu::Category;
///
/// let apps = Category::labeled("Applications");
/// assert_eq!(apps.name(), "Applications");
/// assert_eq!(apps, apps.clone());
/// assert_ne!(apps, Category::labeled("Applications")); // distinct handle
/// ```
#[derive(Clone)]
pub struct Category {
    inner: Arc<CategoryInner>,
}

impl Category {
    /// Create a category with an explicit header item.
    pub fn new(name: impl Into<String>, header: MenuItem) -> Self {
        Self {
            inner: Arc::new(CategoryInner {
                name: name.into(),
                description: None,
                header,
            }),
        }
    }

    /// Create a category whose header row is an unselectable item showing
    /// the category name.
    pub fn labeled(name: impl Into<String>) -> Self {
        let name = name.into();
        let header = MenuItem::header(name.clone());
        Self::new(name, header)
    }

    /// Attach a human-readable description (shown by some renderers).
    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let header = MenuItem::header(name.clone());
        Self {
            inner: Arc::new(CategoryInner {
                name,
                description: Some(description.into()),
                header,
            }),
        }
    }

    /// The category's display name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The category's description, if any.
    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// The header item rendered above the category's items.
    pub fn header(&self) -> &MenuItem {
        &self.inner.header
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.inner.name)
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

/// A read snapshot of one category bucket.
#[derive(Clone, Debug)]
pub struct CategoryView {
    /// The bucket's category; `None` is the menu-level "no category" group.
    pub category: Option<Category>,
    /// The bucket's items in display order.
    pub items: Vec<MenuItem>,
}

/// Pluggable category ordering.
///
/// Receives the current buckets and returns the categories in display
/// order. Buckets omitted from the result are appended in creation order,
/// so a sort function can never make items vanish from the flattened list.
pub type CategorySort = Arc<dyn Fn(&[CategoryView]) -> Vec<Option<Category>> + Send + Sync>;

/// Keep categories in the order they were first created.
pub fn creation_order_sort() -> CategorySort {
    Arc::new(|views| views.iter().map(|v| v.category.clone()).collect())
}

/// Favor categories that currently have items, preserving creation order
/// within each group. The default for prioritized menus.
pub fn items_first_sort() -> CategorySort {
    Arc::new(|views| {
        let mut order: Vec<Option<Category>> = views
            .iter()
            .filter(|v| !v.items.is_empty())
            .map(|v| v.category.clone())
            .collect();
        order.extend(
            views
                .iter()
                .filter(|v| v.items.is_empty())
                .map(|v| v.category.clone()),
        );
        order
    })
}

/// Rearrange bucket views into the display order chosen by a sort
/// function. Views the sort omitted are appended in creation order.
pub(crate) fn reorder(views: Vec<CategoryView>, order: &[Option<Category>]) -> Vec<CategoryView> {
    let mut ordered = Vec::with_capacity(views.len());
    let mut remaining: Vec<Option<CategoryView>> = views.into_iter().map(Some).collect();

    for key in order {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|v| v.category == *key))
        {
            if let Some(view) = slot.take() {
                ordered.push(view);
            }
        }
    }
    ordered.extend(remaining.into_iter().flatten());
    ordered
}

/// Build the flattened display list from views already in display order:
/// category headers interleaved with their items. Empty buckets contribute
/// nothing, including their header.
pub(crate) fn flatten_ordered(views: &[CategoryView]) -> Vec<MenuItem> {
    let mut flattened = Vec::new();
    for view in views {
        if view.items.is_empty() {
            continue;
        }
        if let Some(category) = &view.category {
            flattened.push(category.header().clone());
        }
        flattened.extend(view.items.iter().cloned());
    }
    flattened
}


#[cfg(test)]
mod tests {
    use super::*;

    fn view(category: Option<Category>, labels: &[&str]) -> CategoryView {
        CategoryView {
            category,
            items: labels.iter().map(|l| MenuItem::labeled(*l)).collect(),
        }
    }

    #[test]
    fn flatten_interleaves_headers() {
        let cat = Category::labeled("Apps");
        let views = vec![
            view(None, &["x"]),
            view(Some(cat.clone()), &["a", "b"]),
        ];
        let order = creation_order_sort()(&views);

        let flat = flatten_ordered(&reorder(views, &order));
        assert_eq!(flat.len(), 4); // x, header, a, b
        assert_eq!(flat[1], *cat.header());
    }

    #[test]
    fn flatten_skips_empty_buckets() {
        let cat = Category::labeled("Empty");
        let views = vec![view(None, &["x"]), view(Some(cat), &[])];
        let order = creation_order_sort()(&views);

        let flat = flatten_ordered(&reorder(views, &order));
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn reorder_appends_buckets_omitted_by_sort() {
        let cat = Category::labeled("Apps");
        let views = vec![view(None, &["x"]), view(Some(cat), &["a"])];
        // A sort that forgets every bucket still renders everything.
        let order: Vec<Option<Category>> = Vec::new();

        let flat = flatten_ordered(&reorder(views, &order));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn items_first_sort_prefers_populated_buckets() {
        let empty = Category::labeled("Empty");
        let full = Category::labeled("Full");
        let views = vec![
            view(None, &[]),
            view(Some(empty.clone()), &[]),
            view(Some(full.clone()), &["a"]),
        ];

        let order = items_first_sort()(&views);
        assert_eq!(order[0], Some(full));
        assert_eq!(order[1], None);
        assert_eq!(order[2], Some(empty));
    }
}
