//! Specificity markers.
//!
//! A class style may carry `specificity: N`. The compiler then appends N
//! redundant marker classes to the rendered selector and to the public class
//! name, so the rule outranks rules with fewer classes regardless of source
//! order:
//!
//! ```text
//! specificity: 0   .ͼ1              class "ͼ1"
//! specificity: 1   .ͼ1.ͼ_           class "ͼ1 ͼ_"
//! specificity: 2   .ͼ2.ͼ_.ͼ_1       class "ͼ2 ͼ_ ͼ_1"
//! ```
//!
//! Markers are shared by every class: they carry no meaning of their own.

use crate::module::names::{to_base36, MARKER};

/// Largest accepted `specificity` value.
pub const MAX_SPECIFICITY: usize = 32;

/// The `index`-th marker class token (0-based).
pub fn marker(index: usize) -> String {
    if index == 0 {
        format!("{MARKER}_")
    } else {
        format!("{MARKER}_{}", to_base36(index as u64))
    }
}

/// The first `count` marker class tokens.
pub fn markers(count: usize) -> Vec<String> {
    (0..count).map(marker).collect()
}

/// Build the rendered selector for `token` with `count` markers:
/// `.token.m0.m1...`.
pub fn class_selector(token: &str, count: usize) -> String {
    let mut selector = format!(".{token}");
    for m in markers(count) {
        selector.push('.');
        selector.push_str(&m);
    }
    selector
}

/// Build the public class name for `token` with `count` markers:
/// `token m0 m1 ...`.
pub fn class_name(token: &str, count: usize) -> String {
    let mut name = token.to_string();
    for m in markers(count) {
        name.push(' ');
        name.push_str(&m);
    }
    name
}
