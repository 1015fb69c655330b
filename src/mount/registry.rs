//! Target registry: one [`Ledger`] per target.
//!
//! [`MountRegistry`] can be owned explicitly; the free functions in this
//! module operate on a thread-local default instance, which is what
//! [`StyleModule::mount`](crate::module::StyleModule::mount) uses.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::module::{ClassMap, StyleModule};
use crate::mount::ledger::Ledger;
use crate::mount::priority::IntoPriority;
use crate::mount::target::{Target, TargetId};
use crate::mount::MountError;

/// Maps target ids to their ledgers.
#[derive(Debug, Default)]
pub struct MountRegistry {
    ledgers: HashMap<TargetId, Ledger>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `modules` on `target` at `priority`.
    ///
    /// The target's sink is opened on its first mount. The priority is
    /// validated before anything is touched.
    pub fn mount(
        &mut self,
        target: &dyn Target,
        modules: &[Arc<StyleModule>],
        priority: impl IntoPriority,
    ) -> Result<ClassMap, MountError> {
        let priority = priority.into_priority()?;
        let id = target.target_id();
        let ledger = self.ledgers.entry(id).or_insert_with(|| {
            debug!(target_id = ?id, "opening sink for new target");
            Ledger::new(id, target.open_sink())
        });
        Ok(ledger.mount(modules, priority))
    }

    /// The ledger of a target that has been mounted on.
    pub fn ledger(&self, id: TargetId) -> Option<&Ledger> {
        self.ledgers.get(&id)
    }

    /// Unmount everything from a target and forget its ledger and sink.
    ///
    /// The mounted rules are removed from the sink first, so mounting on the
    /// target again starts from an empty sheet as well as an empty ledger.
    pub fn discard(&mut self, id: TargetId) -> bool {
        match self.ledgers.remove(&id) {
            Some(mut ledger) => {
                ledger.clear();
                debug!(target_id = ?id, "discarded target ledger");
                true
            }
            None => false,
        }
    }

    /// Number of known targets.
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}

thread_local! {
    static REGISTRY: RefCell<MountRegistry> = RefCell::new(MountRegistry::new());
}

/// Mount `modules` on `target` through the thread's default registry.
///
/// Sinks must not mount from inside their own write callbacks.
pub fn mount(
    target: &dyn Target,
    modules: &[Arc<StyleModule>],
    priority: impl IntoPriority,
) -> Result<ClassMap, MountError> {
    REGISTRY.with(|registry| registry.borrow_mut().mount(target, modules, priority))
}

/// Run `f` with read access to the thread's default registry.
pub fn with_registry<R>(f: impl FnOnce(&MountRegistry) -> R) -> R {
    REGISTRY.with(|registry| f(&registry.borrow()))
}

/// Forget a target in the thread's default registry.
pub fn discard(id: TargetId) -> bool {
    REGISTRY.with(|registry| registry.borrow_mut().discard(id))
}

/// Drop every ledger in the thread's default registry.
#[cfg(any(test, feature = "test-util"))]
pub fn reset_registry() {
    REGISTRY.with(|registry| *registry.borrow_mut() = MountRegistry::new());
}
