//! Pilot: scripted mounting against an in-memory target.
//!
//! The `Pilot` owns its own name allocator, registry and [`MemoryTarget`], so
//! generated class names start at `ͼ1` and nothing leaks between tests.

use std::sync::Arc;

use crate::css::compiler::{CompileOptions, StyleError};
use crate::css::model::Style;
use crate::module::{ClassMap, NameAllocator, StyleModule};
use crate::mount::{IntoPriority, Ledger, MemoryTarget, MountError, MountRegistry, Target};
use crate::testing::snapshot::ledger_to_string;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless mount driver for testing.
///
/// # Examples
///
/// ```
/// use style_module::css::model::Style;
/// use style_module::mount::Priority;
/// use style_module::testing::Pilot;
///
/// let mut pilot = Pilot::live();
/// let module = pilot
///     .module(&Style::new().with("box", Style::new().with("color", "red")))
///     .unwrap();
/// let classes = pilot.mount(&[module], Priority::NORMAL).unwrap();
/// assert_eq!(classes["box"], "ͼ1");
/// assert_eq!(pilot.css(), ".ͼ1 {color: red;}\n");
/// ```
#[derive(Debug)]
pub struct Pilot {
    names: NameAllocator,
    options: CompileOptions,
    registry: MountRegistry,
    target: MemoryTarget,
}

impl Pilot {
    /// A pilot whose target supports incremental rule insertion.
    pub fn live() -> Self {
        Self::with_target(MemoryTarget::live())
    }

    /// A pilot whose target only accepts full text replacement.
    pub fn text() -> Self {
        Self::with_target(MemoryTarget::text())
    }

    /// A pilot driving the given target.
    pub fn with_target(target: MemoryTarget) -> Self {
        Self {
            names: NameAllocator::new(),
            options: CompileOptions::default(),
            registry: MountRegistry::new(),
            target,
        }
    }

    /// Use these compile options for modules built from now on.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    // ── Building ─────────────────────────────────────────────────────

    /// Build a class module with the pilot's allocator.
    pub fn module(&self, classes: &Style) -> Result<Arc<StyleModule>, StyleError> {
        StyleModule::new_with(&self.names, classes, &self.options)
    }

    /// Extend `parent` with the pilot's allocator.
    pub fn extend(
        &self,
        parent: &Arc<StyleModule>,
        classes: &Style,
    ) -> Result<Arc<StyleModule>, StyleError> {
        parent.extend_with(&self.names, classes, &self.options)
    }

    /// Build a selector-sheet module.
    pub fn sheet(&self, sheet: &Style) -> Result<Arc<StyleModule>, StyleError> {
        StyleModule::from_sheet(sheet, &self.options)
    }

    // ── Mounting ─────────────────────────────────────────────────────

    /// Mount `modules` on the pilot's target.
    pub fn mount(
        &mut self,
        modules: &[Arc<StyleModule>],
        priority: impl IntoPriority,
    ) -> Result<ClassMap, MountError> {
        self.registry.mount(&self.target, modules, priority)
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// The target being driven.
    pub fn target(&self) -> &MemoryTarget {
        &self.target
    }

    /// The target's ledger, once something has been mounted.
    pub fn ledger(&self) -> Option<&Ledger> {
        self.registry.ledger(self.target.target_id())
    }

    /// The sheet's CSS text.
    pub fn css(&self) -> String {
        self.target.sheet().css_text()
    }

    /// The sheet's rules (empty for text targets).
    pub fn rules(&self) -> Vec<String> {
        self.target.sheet().rules()
    }

    /// Number of sink mutations so far.
    pub fn writes(&self) -> usize {
        self.target.sheet().writes()
    }

    /// The ledger rendered by band, or an empty string before any mount.
    pub fn snapshot(&self) -> String {
        self.ledger().map(ledger_to_string).unwrap_or_default()
    }
}
