//! Snapshot rendering helpers.
//!
//! Functions for turning compiled rules, modules and ledgers into plain-text
//! strings suitable for snapshot testing and assertions.

use indexmap::IndexMap;

use crate::module::names::MARKER;
use crate::module::StyleModule;
use crate::mount::Ledger;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// One rule per line, no trailing newline.
pub fn rules_to_string(rules: &[String]) -> String {
    rules.join("\n")
}

/// Render a module's class map followed by its rules.
///
/// ```text
/// button -> ͼ1
/// ---
/// .ͼ1 {color: red;}
/// ```
pub fn module_to_string(module: &StyleModule) -> String {
    let mut out: Vec<String> = module
        .classes()
        .iter()
        .map(|(name, class)| format!("{name} -> {class}"))
        .collect();
    out.push("---".to_owned());
    out.extend(module.rules().iter().cloned());
    out.join("\n")
}

/// Render a ledger's rules grouped by priority band.
///
/// Each band starts with a `[priority]` header line.
pub fn ledger_to_string(ledger: &Ledger) -> String {
    let mut lines = Vec::new();
    let mut start = 0;
    let rules: Vec<&str> = ledger.rules().collect();
    for (priority, end) in ledger.tier_boundaries() {
        lines.push(format!("[{priority}]"));
        lines.extend(rules[start..end].iter().map(|r| (*r).to_owned()));
        start = end;
    }
    lines.join("\n")
}

/// Replace generated class tokens with `c1`, `c2`, ... in order of first
/// appearance, so snapshots don't depend on the allocator's state.
///
/// Specificity markers (`ͼ_`, `ͼ_1`, ...) are kept as they are.
pub fn normalize_class_names(css: &str) -> String {
    let mut seen: IndexMap<String, usize> = IndexMap::new();
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != MARKER || chars.peek() == Some(&'_') {
            out.push(ch);
            continue;
        }
        let mut token = String::new();
        while let Some(&next) = chars.peek() {
            if !(next.is_ascii_digit() || next.is_ascii_lowercase()) {
                break;
            }
            token.push(next);
            chars.next();
        }
        if token.is_empty() {
            out.push(ch);
            continue;
        }
        let next_index = seen.len() + 1;
        let index = *seen.entry(token).or_insert(next_index);
        out.push_str(&format!("c{index}"));
    }

    out
}
