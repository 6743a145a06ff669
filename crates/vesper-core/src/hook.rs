//! Data hooks: one-shot invalidation tokens for reactive reads.
//!
//! Every public getter in the menu engine accepts an optional [`DataHook`].
//! Omitting it performs a plain snapshot read with no registration overhead.
//! Supplying one registers the caller for a single notification the next
//! time the underlying value changes; the hook must then be re-armed by
//! reading again. This poll-with-invalidation pattern keeps consumers
//! (typically a rendering layer) decoupled from the engine's internal
//! change granularity.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use vesper_core::{DataHook, HookRegistry};
//!
//! let registry = HookRegistry::new();
//! let dirty = Arc::new(AtomicBool::new(false));
//!
//! let dirty_clone = dirty.clone();
//! let hook = DataHook::new(move || {
//!     dirty_clone.store(true, Ordering::SeqCst);
//! });
//!
//! // A getter arms the hook...
//! registry.register(&hook);
//!
//! // ...and the next change notifies it exactly once.
//! registry.invalidate_all();
//! registry.invalidate_all();
//! assert!(dirty.load(Ordering::SeqCst));
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A unique identifier for an armed hook within a [`HookRegistry`].
    pub struct HookId;
}

struct HookInner {
    callback: Box<dyn Fn() + Send + Sync>,
}

/// A caller-owned subscription token for reactive reads.
///
/// The wrapped callback is invoked when the value observed through this hook
/// changes. Hooks are one-shot per registration: after a notification the
/// hook is disarmed and must be re-armed by performing the read again.
///
/// Dropping a `DataHook` implicitly unsubscribes it — registries hold only
/// weak references.
#[derive(Clone)]
pub struct DataHook {
    inner: Arc<HookInner>,
}

impl DataHook {
    /// Create a hook around an invalidation callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(HookInner {
                callback: Box::new(callback),
            }),
        }
    }
}

/// A per-owner set of armed hooks.
///
/// Owners (menus, properties) keep one registry per logical value or value
/// group and call [`invalidate_all`](Self::invalidate_all) after every
/// change. Registration is idempotent: arming the same hook twice between
/// invalidations yields a single notification.
pub struct HookRegistry {
    hooks: Mutex<SlotMap<HookId, Weak<HookInner>>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            hooks: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Arm `hook` for the next invalidation.
    ///
    /// No-op if this hook is already armed here.
    pub fn register(&self, hook: &DataHook) {
        let mut hooks = self.hooks.lock();
        let already = hooks
            .values()
            .any(|weak| weak.upgrade().is_some_and(|h| Arc::ptr_eq(&h, &hook.inner)));
        if !already {
            hooks.insert(Arc::downgrade(&hook.inner));
        }
    }

    /// Convenience for getters: arm the hook if one was supplied.
    pub fn register_opt(&self, hook: Option<&DataHook>) {
        if let Some(hook) = hook {
            self.register(hook);
        }
    }

    /// Notify and disarm every armed hook.
    ///
    /// Returns the number of live hooks notified; hooks whose owners have
    /// been dropped are pruned silently.
    pub fn invalidate_all(&self) -> usize {
        let drained: Vec<Weak<HookInner>> = {
            let mut hooks = self.hooks.lock();
            let drained = hooks.values().cloned().collect();
            hooks.clear();
            drained
        };

        let mut notified = 0;
        for weak in drained {
            if let Some(inner) = weak.upgrade() {
                (inner.callback)();
                notified += 1;
            }
        }
        tracing::trace!(target: "vesper_core::hook", notified, "hooks invalidated");
        notified
    }

    /// Number of currently armed hooks (live or not yet pruned).
    pub fn armed_count(&self) -> usize {
        self.hooks.lock().len()
    }
}

static_assertions::assert_impl_all!(HookRegistry: Send, Sync);
static_assertions::assert_impl_all!(DataHook: Send, Sync);
