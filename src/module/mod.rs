//! Compiled style modules and class-name allocation.

pub mod names;
pub mod style_module;

pub use names::NameAllocator;
pub use style_module::{ClassMap, ModuleId, StyleModule};
