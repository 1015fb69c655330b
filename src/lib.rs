//! # style-module
//!
//! Compile nested style specs into CSS rule strings and mount them into style
//! targets in a deterministic order.
//!
//! A [`StyleModule`] maps logical class names to generated, collision-free
//! class tokens and owns the CSS rules for them. Mounting modules on a
//! [`Target`] keeps that target's rule stream ordered: modules requested
//! together appear in request order, later priority bands follow earlier ones,
//! and repeated mounts are free.
//!
//! ## Core Systems
//!
//! - **[`css`]**: style model, key tokenizer, property normalization and the rule compiler
//! - **[`module`]**: class-name allocation, style modules and extension
//! - **[`mount`]**: priorities, rule sinks, targets, the per-target ledger and the registry
//! - **[`testing`]**: pilot and snapshot helpers for deterministic tests
//!
//! ## Example
//!
//! ```
//! use style_module::{MemoryTarget, Priority, Style, StyleModule};
//!
//! let module = StyleModule::new(
//!     &Style::new().with(
//!         "button",
//!         Style::new()
//!             .with("backgroundColor", "navy")
//!             .with("&:hover", Style::new().with("color", "white")),
//!     ),
//! )
//! .unwrap();
//!
//! let target = MemoryTarget::live();
//! let classes = module.mount(&target, Priority::NORMAL).unwrap();
//! assert!(classes["button"].starts_with('ͼ'));
//! assert_eq!(target.sheet().rules().len(), 2);
//! ```

// Style compilation
pub mod css;

// Modules and mounting
pub mod module;
pub mod mount;

// Test support
pub mod testing;

pub use css::compiler::{compile, compile_sheet, CompileOptions, StyleError};
pub use css::model::{Style, StyleValue};
pub use module::{ClassMap, ModuleId, NameAllocator, StyleModule};
pub use mount::{
    mount, IntoPriority, MemorySheet, MemoryTarget, MountError, MountRegistry, Priority, RuleList,
    RuleSink, SheetKind, Target, TargetId,
};

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use style_module_macros::style;
