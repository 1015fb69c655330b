//! Mounting modules on targets.
//!
//! - [`priority`]: validated priority bands
//! - [`sink`]: rule storage traits and the in-memory sheet
//! - [`target`]: target identity and the in-memory target
//! - [`ledger`]: per-target ordering engine
//! - [`registry`]: target to ledger map and the thread-local default

pub mod ledger;
pub mod priority;
pub mod registry;
pub mod sink;
pub mod target;

pub use ledger::Ledger;
pub use priority::{IntoPriority, Priority};
pub use registry::{mount, MountRegistry};
pub use sink::{MemorySheet, RuleList, RuleSink, SheetKind};
pub use target::{MemoryTarget, Target, TargetId};

/// Errors produced when mounting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MountError {
    #[error("invalid priority `{0}`: expected low, normal, high or a number in 0..=2")]
    InvalidPriority(String),
}
