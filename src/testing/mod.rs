//! Headless testing helpers: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to build and mount modules against an in-memory target
//! with deterministic class names. Use [`normalize_class_names`] and the other
//! snapshot helpers to turn rules and ledgers into stable text.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{ledger_to_string, module_to_string, normalize_class_names, rules_to_string};
