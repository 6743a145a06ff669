//! Menu configuration.
//!
//! Configuration is injected explicitly at construction: a menu resolves
//! its settings exactly once and never consults ambient state inside
//! mutation paths. Degenerate configurations are rejected up front rather
//! than allowed to corrupt state later.

use std::fmt;
use std::time::Duration;

use crate::category::CategorySort;
use crate::error::MenuError;

/// Default cap on items per category bucket.
pub const DEFAULT_MAX_CATEGORY_ITEMS: usize = 100;

/// Default batch-coalescing interval for prioritized menus.
pub const DEFAULT_BATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Per-menu configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use vesper_menu::MenuConfig;
///
/// let config = MenuConfig::new()
///     .with_max_category_item_count(25)
///     .with_batch_interval(Duration::from_millis(50));
/// assert!(config.validate().is_ok());
///
/// let broken = MenuConfig::new().with_max_category_item_count(0);
/// assert!(broken.validate().is_err());
/// ```
#[derive(Clone)]
pub struct MenuConfig {
    /// Maximum number of items a single category bucket may hold.
    pub max_category_item_count: usize,
    /// How long bursts of mutations are coalesced before a flush.
    pub batch_interval: Duration,
    /// Category display ordering. `None` uses the menu variant's default:
    /// creation order for [`Menu`](crate::Menu), populated-buckets-first
    /// for [`PrioritizedMenu`](crate::PrioritizedMenu).
    pub sort_categories: Option<CategorySort>,
}

impl MenuConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-category capacity.
    pub fn with_max_category_item_count(mut self, count: usize) -> Self {
        self.max_category_item_count = count;
        self
    }

    /// Set the batch-coalescing interval.
    pub fn with_batch_interval(mut self, interval: Duration) -> Self {
        self.batch_interval = interval;
        self
    }

    /// Set the category ordering function.
    pub fn with_sort_categories(mut self, sort: CategorySort) -> Self {
        self.sort_categories = Some(sort);
        self
    }

    /// Reject degenerate configurations.
    ///
    /// A zero capacity would silently discard every item; a zero interval
    /// defeats coalescing entirely. Both indicate integration bugs.
    pub fn validate(&self) -> Result<(), MenuError> {
        if self.max_category_item_count == 0 {
            return Err(MenuError::InvalidConfig(
                "max_category_item_count must be at least 1",
            ));
        }
        if self.batch_interval.is_zero() {
            return Err(MenuError::InvalidConfig("batch_interval must be non-zero"));
        }
        Ok(())
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            max_category_item_count: DEFAULT_MAX_CATEGORY_ITEMS,
            batch_interval: DEFAULT_BATCH_INTERVAL,
            sort_categories: None,
        }
    }
}

impl fmt::Debug for MenuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuConfig")
            .field("max_category_item_count", &self.max_category_item_count)
            .field("batch_interval", &self.batch_interval)
            .finish_non_exhaustive()
    }
}
