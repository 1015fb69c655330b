//! Rule sinks: where a target's CSS actually lives.
//!
//! A sink either exposes a live, indexable rule list (the cheap path: only new
//! rules are inserted, existing rules keep their identity) or only accepts a
//! full replacement of its text (the fallback: the whole mounted stylesheet is
//! re-serialized). The ledger asks [`RuleSink::as_rule_list`] to decide.

use std::cell::RefCell;
use std::rc::Rc;

/// A live list of CSS rules supporting targeted insertion.
pub trait RuleList {
    /// Number of rules currently held.
    fn len(&self) -> usize;

    /// Returns `true` if the list holds no rules.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `rule` so that it ends up at `index`.
    fn insert_rule(&mut self, index: usize, rule: &str);

    /// Remove the rule at `index`.
    fn delete_rule(&mut self, index: usize);
}

/// The storage behind a target.
pub trait RuleSink {
    /// The live rule list, when the sink supports targeted insertion.
    fn as_rule_list(&mut self) -> Option<&mut dyn RuleList> {
        None
    }

    /// Replace the sink's entire CSS text.
    fn replace_text(&mut self, css: &str);
}

/// Which access path an in-memory sheet offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    /// Indexable rule list with insert/delete.
    Live,
    /// Text container that can only be replaced wholesale.
    Text,
}

#[derive(Debug, Default)]
struct SheetState {
    rules: Vec<String>,
    text: String,
    writes: usize,
}

/// An in-memory stylesheet, shared between a target and its sink.
///
/// Cloning yields another handle to the same sheet.
#[derive(Debug, Clone)]
pub struct MemorySheet {
    kind: SheetKind,
    state: Rc<RefCell<SheetState>>,
}

impl MemorySheet {
    /// Create an empty sheet.
    pub fn new(kind: SheetKind) -> Self {
        Self {
            kind,
            state: Rc::new(RefCell::new(SheetState::default())),
        }
    }

    /// The access path this sheet offers.
    pub fn kind(&self) -> SheetKind {
        self.kind
    }

    /// The rules held by a live sheet, in order. Empty for text sheets.
    pub fn rules(&self) -> Vec<String> {
        self.state.borrow().rules.clone()
    }

    /// The sheet's CSS text: the last replacement for text sheets, one rule
    /// per line for live sheets.
    pub fn css_text(&self) -> String {
        let state = self.state.borrow();
        match self.kind {
            SheetKind::Text => state.text.clone(),
            SheetKind::Live => state.rules.iter().map(|r| format!("{r}\n")).collect(),
        }
    }

    /// Number of mutations applied so far (insertions, deletions, replacements).
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }
}

impl RuleList for MemorySheet {
    fn len(&self) -> usize {
        self.state.borrow().rules.len()
    }

    fn insert_rule(&mut self, index: usize, rule: &str) {
        let mut state = self.state.borrow_mut();
        let index = index.min(state.rules.len());
        state.rules.insert(index, rule.to_string());
        state.writes += 1;
    }

    fn delete_rule(&mut self, index: usize) {
        let mut state = self.state.borrow_mut();
        if index < state.rules.len() {
            state.rules.remove(index);
            state.writes += 1;
        }
    }
}

impl RuleSink for MemorySheet {
    fn as_rule_list(&mut self) -> Option<&mut dyn RuleList> {
        match self.kind {
            SheetKind::Live => Some(self),
            SheetKind::Text => None,
        }
    }

    fn replace_text(&mut self, css: &str) {
        let mut state = self.state.borrow_mut();
        if self.kind == SheetKind::Live {
            state.rules = split_rules(css);
        }
        state.text = css.to_string();
        state.writes += 1;
    }
}

/// Split stylesheet text into top-level rules.
///
/// A rule ends at its closing brace, or at `;` for a bodiless at-rule.
/// Braces and semicolons inside quoted strings don't count.
fn split_rules(css: &str) -> Vec<String> {
    let mut rules = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in css.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        let end = match c {
            '"' | '\'' => {
                quote = Some(c);
                false
            }
            '{' => {
                depth += 1;
                false
            }
            '}' => {
                depth = depth.saturating_sub(1);
                depth == 0
            }
            ';' => depth == 0,
            _ => false,
        };
        if end {
            let rule = css[start..=i].trim();
            if !rule.is_empty() {
                rules.push(rule.to_string());
            }
            start = i + c.len_utf8();
        }
    }

    let rest = css[start..].trim();
    if !rest.is_empty() {
        rules.push(rest.to_string());
    }
    rules
}
