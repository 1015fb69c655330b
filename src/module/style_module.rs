//! [`StyleModule`]: an immutable, pre-compiled set of CSS rules plus a
//! name → class mapping.
//!
//! Modules are meant to be created once (at setup) and kept around: every
//! construction allocates fresh class names, so re-creating a module per
//! render would keep adding rules to every target it is mounted on.

use std::slice;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::css::compiler::{compile_class, compile_sheet, CompileOptions, StyleError};
use crate::css::model::Style;
use crate::module::names::NameAllocator;
use crate::mount::priority::IntoPriority;
use crate::mount::registry;
use crate::mount::target::Target;
use crate::mount::MountError;

/// Logical class name → space-separated generated class tokens.
pub type ClassMap = IndexMap<String, String>;

static NEXT_MODULE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique module identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u64);

impl ModuleId {
    fn next() -> Self {
        ModuleId(NEXT_MODULE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A compiled style module.
#[derive(Debug)]
pub struct StyleModule {
    id: ModuleId,
    rules: Vec<String>,
    classes: ClassMap,
    parent: Option<Arc<StyleModule>>,
}

impl StyleModule {
    /// Build a module from a mapping of logical class names to styles, using
    /// the process-wide name allocator.
    ///
    /// Every top-level value of `classes` must be a nested style.
    pub fn new(classes: &Style) -> Result<Arc<Self>, StyleError> {
        Self::new_with(NameAllocator::global(), classes, &CompileOptions::default())
    }

    /// [`StyleModule::new`] with an explicit name allocator.
    pub fn new_in(names: &NameAllocator, classes: &Style) -> Result<Arc<Self>, StyleError> {
        Self::new_with(names, classes, &CompileOptions::default())
    }

    /// [`StyleModule::new`] with an explicit name allocator and options.
    pub fn new_with(
        names: &NameAllocator,
        classes: &Style,
        options: &CompileOptions,
    ) -> Result<Arc<Self>, StyleError> {
        Ok(Arc::new(Self::build(names, classes, options)?))
    }

    /// Build a class-less module from a selector sheet such as
    /// `{"h1, h2": {...}, "@media print": {"nav": {...}}}`.
    pub fn from_sheet(sheet: &Style, options: &CompileOptions) -> Result<Arc<Self>, StyleError> {
        let rules = compile_sheet(sheet, options)?;
        let module = StyleModule {
            id: ModuleId::next(),
            rules,
            classes: ClassMap::new(),
            parent: None,
        };
        debug!(module = ?module.id, rules = module.rules.len(), "built sheet module");
        Ok(Arc::new(module))
    }

    /// Generate a fresh class name from the process-wide allocator.
    pub fn new_name() -> String {
        NameAllocator::global().next_name()
    }

    fn build(
        names: &NameAllocator,
        classes: &Style,
        options: &CompileOptions,
    ) -> Result<Self, StyleError> {
        let mut rules = Vec::new();
        let mut class_map = ClassMap::new();

        for (name, value) in classes.iter() {
            let style = value.as_style().ok_or_else(|| {
                StyleError::shape(
                    name,
                    format!(
                        "a class must map to a nested style, got {}",
                        value.shape_name()
                    ),
                )
            })?;
            let token = names.next_name();
            let compiled = compile_class(&token, style, options).map_err(|e| e.within(name))?;
            rules.extend(compiled.rules);
            class_map.insert(name.to_string(), compiled.class_name);
        }

        let module = StyleModule {
            id: ModuleId::next(),
            rules,
            classes: class_map,
            parent: None,
        };
        debug!(
            module = ?module.id,
            classes = module.classes.len(),
            rules = module.rules.len(),
            "built style module"
        );
        Ok(module)
    }

    /// Create a child module that adds to this one.
    ///
    /// The child's class for a name this module also defines is this module's
    /// class followed by the child's own tokens, so applying it carries both
    /// rule sets and the child's (later) rules win by cascade order. Names the
    /// child does not redefine keep this module's class. `self` is untouched.
    pub fn extend(self: &Arc<Self>, classes: &Style) -> Result<Arc<Self>, StyleError> {
        self.extend_with(NameAllocator::global(), classes, &CompileOptions::default())
    }

    /// [`StyleModule::extend`] with an explicit name allocator and options.
    pub fn extend_with(
        self: &Arc<Self>,
        names: &NameAllocator,
        classes: &Style,
        options: &CompileOptions,
    ) -> Result<Arc<Self>, StyleError> {
        let mut child = Self::build(names, classes, options)?;

        let mut merged = ClassMap::new();
        for (name, inherited) in &self.classes {
            let class = match child.classes.get(name) {
                Some(own) => format!("{inherited} {own}"),
                None => inherited.clone(),
            };
            merged.insert(name.clone(), class);
        }
        for (name, own) in child.classes {
            merged.entry(name).or_insert(own);
        }

        child.classes = merged;
        child.parent = Some(Arc::clone(self));
        Ok(Arc::new(child))
    }

    /// Module identity.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// The compiled rules, in order.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// All logical class names and their generated classes, in definition order.
    pub fn classes(&self) -> &ClassMap {
        &self.classes
    }

    /// The generated class (possibly several tokens) for a logical name.
    pub fn class_of(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(String::as_str)
    }

    /// The module this one extends, if any.
    pub fn parent(&self) -> Option<&Arc<StyleModule>> {
        self.parent.as_ref()
    }

    /// Ancestors from the root down to the direct parent.
    pub fn ancestors(&self) -> Vec<Arc<StyleModule>> {
        let mut chain = Vec::new();
        let mut current = self.parent.as_ref();
        while let Some(module) = current {
            chain.push(Arc::clone(module));
            current = module.parent.as_ref();
        }
        chain.reverse();
        chain
    }

    /// Mount this module (and its ancestors) on `target` through the
    /// thread's default registry.
    pub fn mount(
        self: &Arc<Self>,
        target: &dyn Target,
        priority: impl IntoPriority,
    ) -> Result<ClassMap, MountError> {
        registry::mount(target, slice::from_ref(self), priority)
    }
}
