//! The IO/action context menus are bound to.
//!
//! A [`MenuContext`] bundles the services every menu needs: the shared
//! deferred-task queue that batch flushes are scheduled on, and the
//! resolved default configuration. It is shared read-only — many menus
//! hold the same context, and nothing reached through it mutates
//! menu-local state.

use std::sync::Arc;

use vesper_core::DeferredQueue;

use crate::config::MenuConfig;
use crate::error::Result;

struct ContextInner {
    scheduler: Arc<DeferredQueue>,
    default_config: MenuConfig,
}

/// Shared, read-only context bound to every menu at construction.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vesper_core::DeferredQueue;
/// use vesper_menu::MenuContext;
///
/// let cx = MenuContext::new(Arc::new(DeferredQueue::new()));
/// assert_eq!(cx.scheduler().pending_count(), 0);
/// ```
#[derive(Clone)]
pub struct MenuContext {
    inner: Arc<ContextInner>,
}

impl MenuContext {
    /// Create a context with the default menu configuration.
    pub fn new(scheduler: Arc<DeferredQueue>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                scheduler,
                default_config: MenuConfig::default(),
            }),
        }
    }

    /// Create a context with an explicit default configuration.
    ///
    /// Ambient settings are collapsed into this one value here, at
    /// construction time; menus never read settings ad hoc later.
    pub fn with_default_config(
        scheduler: Arc<DeferredQueue>,
        default_config: MenuConfig,
    ) -> Result<Self> {
        default_config.validate()?;
        Ok(Self {
            inner: Arc::new(ContextInner {
                scheduler,
                default_config,
            }),
        })
    }

    /// The shared deferred-task queue.
    pub fn scheduler(&self) -> &Arc<DeferredQueue> {
        &self.inner.scheduler
    }

    /// The configuration menus fall back to when given none.
    pub fn default_config(&self) -> &MenuConfig {
        &self.inner.default_config
    }
}
