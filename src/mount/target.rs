//! Style targets: the things modules are mounted on.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::mount::sink::{MemorySheet, RuleSink, SheetKind};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a style target (a document, a shadow tree, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// Allocate a fresh, process-unique id.
    pub fn fresh() -> Self {
        TargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A style-bearing context.
///
/// The registry calls [`Target::open_sink`] once, on the first mount for the
/// target's id, and keeps the sink for the target's lifetime.
pub trait Target {
    /// Stable identity of this target.
    fn target_id(&self) -> TargetId;

    /// Create the sink that will hold this target's rules.
    fn open_sink(&self) -> Box<dyn RuleSink>;
}

/// A target backed by an in-memory [`MemorySheet`].
///
/// Useful for rendering the final CSS text without a host document (server
/// side rendering) and for tests.
#[derive(Debug, Clone)]
pub struct MemoryTarget {
    id: TargetId,
    sheet: MemorySheet,
}

impl MemoryTarget {
    /// A target whose sheet supports targeted rule insertion.
    pub fn live() -> Self {
        Self::new(SheetKind::Live)
    }

    /// A target whose sheet can only be replaced wholesale.
    pub fn text() -> Self {
        Self::new(SheetKind::Text)
    }

    /// A target with the given sheet kind.
    pub fn new(kind: SheetKind) -> Self {
        Self {
            id: TargetId::fresh(),
            sheet: MemorySheet::new(kind),
        }
    }

    /// Handle to the target's sheet.
    pub fn sheet(&self) -> &MemorySheet {
        &self.sheet
    }
}

impl Target for MemoryTarget {
    fn target_id(&self) -> TargetId {
        self.id
    }

    fn open_sink(&self) -> Box<dyn RuleSink> {
        Box::new(self.sheet.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(TargetId::fresh(), TargetId::fresh());
    }

    #[test]
    fn sink_shares_the_target_sheet() {
        let target = MemoryTarget::live();
        let mut sink = target.open_sink();
        sink.as_rule_list().unwrap().insert_rule(0, "a {}");
        assert_eq!(target.sheet().rules(), vec!["a {}"]);
    }

    #[test]
    fn clones_keep_identity() {
        let target = MemoryTarget::text();
        let copy = target.clone();
        assert_eq!(target.target_id(), copy.target_id());
    }
}
