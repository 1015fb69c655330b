//! Per-target ledger: the ordering engine.
//!
//! A [`Ledger`] records which modules are mounted on one target, in which
//! order and at which priority, and keeps the target's [`RuleSink`] equal to
//! the concatenation of those modules' rules.
//!
//! # Merge
//!
//! A mount request is merged into the requested priority band in a single
//! pass, with `pos` the running rule offset and `j` a cursor into the band's
//! module list. For each requested module:
//!
//! - not mounted yet: inserted at `j`, its rules inserted at `pos`;
//! - mounted at or after `j`: the rules of the modules in between are skipped
//!   and the cursor moves past it;
//! - mounted before `j` (the caller now wants it later than a module it
//!   previously preceded): its rules are deleted and it is re-inserted as new.
//!   The most recent explicit order wins and no rule set is ever held twice.
//!
//! A module that is not yet mounted and is requested without any already
//! mounted module ahead of it lands at the start of its band.
//!
//! Bands are contiguous and ordered by priority; a band's base offset is the
//! number of rules in all lower bands, so insertions never cross a band edge.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::module::{ClassMap, ModuleId, StyleModule};
use crate::mount::priority::Priority;
use crate::mount::sink::RuleSink;
use crate::mount::target::TargetId;

/// One priority band.
#[derive(Debug)]
struct Tier {
    priority: Priority,
    modules: Vec<Arc<StyleModule>>,
    /// Total rules of `modules`.
    rule_count: usize,
}

impl Tier {
    fn new(priority: Priority) -> Self {
        Self {
            priority,
            modules: Vec::new(),
            rule_count: 0,
        }
    }

    fn position(&self, id: ModuleId) -> Option<usize> {
        self.modules.iter().position(|m| m.id() == id)
    }

    fn rules_before(&self, index: usize) -> usize {
        self.modules[..index].iter().map(|m| m.rules().len()).sum()
    }
}

/// A single sink mutation, in application order.
#[derive(Debug)]
enum SinkOp {
    Insert {
        index: usize,
        module: Arc<StyleModule>,
        rule: usize,
    },
    Delete {
        index: usize,
    },
}

/// The most recent request and its result.
#[derive(Debug)]
struct LastMount {
    request: Vec<ModuleId>,
    priority: Priority,
    classes: ClassMap,
}

/// Mount bookkeeping for one target.
pub struct Ledger {
    target: TargetId,
    tiers: Vec<Tier>,
    sink: Box<dyn RuleSink>,
    last: Option<LastMount>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("target", &self.target)
            .field("tiers", &self.tiers)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create an empty ledger writing to `sink`.
    pub fn new(target: TargetId, sink: Box<dyn RuleSink>) -> Self {
        Self {
            target,
            tiers: Vec::new(),
            sink,
            last: None,
        }
    }

    /// The target this ledger belongs to.
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Mount `modules` (each preceded by its not-yet-listed ancestors) at
    /// `priority`, apply the resulting changes to the sink and return the
    /// merged class map of the requested modules.
    ///
    /// Repeating the previous request returns its class map without touching
    /// the sink.
    pub fn mount(&mut self, modules: &[Arc<StyleModule>], priority: Priority) -> ClassMap {
        let request: Vec<ModuleId> = modules.iter().map(|m| m.id()).collect();
        if let Some(last) = &self.last {
            if last.priority == priority && last.request == request {
                trace!(target_id = ?self.target, "repeated mount request");
                return last.classes.clone();
            }
        }

        let expanded = with_ancestors(modules);
        let ops = self.merge(&expanded, priority);
        debug!(
            target_id = ?self.target,
            requested = modules.len(),
            ops = ops.len(),
            %priority,
            "merged mount request"
        );
        self.apply(&ops);

        let classes = merged_classes(modules);
        self.last = Some(LastMount {
            request,
            priority,
            classes: classes.clone(),
        });
        classes
    }

    /// Find the band for `priority`, creating an empty one in order if needed.
    fn tier_index(&mut self, priority: Priority) -> usize {
        match self.tiers.binary_search_by(|t| t.priority.cmp(&priority)) {
            Ok(index) => index,
            Err(index) => {
                self.tiers.insert(index, Tier::new(priority));
                index
            }
        }
    }

    /// Reconcile `modules` with the mounted state, returning the sink
    /// operations that bring the sink along.
    fn merge(&mut self, modules: &[Arc<StyleModule>], priority: Priority) -> Vec<SinkOp> {
        let tier_index = self.tier_index(priority);
        let base: usize = self.tiers[..tier_index].iter().map(|t| t.rule_count).sum();
        let mut ops = Vec::new();
        let mut pos = base;
        let mut j = 0;

        for module in modules {
            let id = module.id();
            let elsewhere = self
                .tiers
                .iter()
                .enumerate()
                .find(|(i, t)| *i != tier_index && t.position(id).is_some())
                .map(|(_, t)| t.priority);
            if let Some(mounted) = elsewhere {
                warn!(
                    module = ?id,
                    %mounted,
                    requested = %priority,
                    "module already mounted at another priority; keeping its position"
                );
                continue;
            }

            let tier = &mut self.tiers[tier_index];
            let count = module.rules().len();
            let mut found = tier.position(id);

            if let Some(index) = found.filter(|&index| index < j) {
                let offset = base + tier.rules_before(index);
                debug!(module = ?id, from = index, "ordering conflict; re-inserting module");
                ops.extend((0..count).map(|_| SinkOp::Delete { index: offset }));
                tier.modules.remove(index);
                tier.rule_count -= count;
                pos -= count;
                j -= 1;
                found = None;
            }

            match found {
                None => {
                    tier.modules.insert(j, Arc::clone(module));
                    j += 1;
                    for rule in 0..count {
                        ops.push(SinkOp::Insert {
                            index: pos,
                            module: Arc::clone(module),
                            rule,
                        });
                        pos += 1;
                    }
                    tier.rule_count += count;
                }
                Some(index) => {
                    while j < index {
                        pos += tier.modules[j].rules().len();
                        j += 1;
                    }
                    pos += count;
                    j += 1;
                }
            }
        }

        self.tiers.retain(|t| !t.modules.is_empty());
        ops
    }

    /// Push `ops` to the sink: one by one when it has a live rule list,
    /// otherwise as a full text replacement.
    fn apply(&mut self, ops: &[SinkOp]) {
        if ops.is_empty() {
            return;
        }

        if let Some(list) = self.sink.as_rule_list() {
            for op in ops {
                match op {
                    SinkOp::Insert {
                        index,
                        module,
                        rule,
                    } => {
                        if let Some(text) = module.rules().get(*rule) {
                            trace!(index, rule = %text, "insert rule");
                            list.insert_rule(*index, text);
                        }
                    }
                    SinkOp::Delete { index } => {
                        trace!(index, "delete rule");
                        list.delete_rule(*index);
                    }
                }
            }
            return;
        }

        let css = self.css_text();
        trace!(bytes = css.len(), "replace sink text");
        self.sink.replace_text(&css);
    }

    /// Mounted modules in final order.
    pub fn modules(&self) -> impl Iterator<Item = &Arc<StyleModule>> {
        self.tiers.iter().flat_map(|t| t.modules.iter())
    }

    /// Ids of the mounted modules in final order.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules().map(|m| m.id()).collect()
    }

    /// Returns `true` if the module is mounted here.
    pub fn contains(&self, id: ModuleId) -> bool {
        self.priority_of(id).is_some()
    }

    /// The priority a module is mounted at.
    pub fn priority_of(&self, id: ModuleId) -> Option<Priority> {
        self.tiers
            .iter()
            .find(|t| t.position(id).is_some())
            .map(|t| t.priority)
    }

    /// Every mounted rule, in final order. This is what the sink holds.
    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.modules()
            .flat_map(|m| m.rules().iter().map(String::as_str))
    }

    /// Total number of mounted rules.
    pub fn rule_count(&self) -> usize {
        self.tiers.iter().map(|t| t.rule_count).sum()
    }

    /// Each band's priority with the rule offset at which it ends.
    pub fn tier_boundaries(&self) -> Vec<(Priority, usize)> {
        let mut end = 0;
        self.tiers
            .iter()
            .map(|t| {
                end += t.rule_count;
                (t.priority, end)
            })
            .collect()
    }

    /// Full text serialization: each module's rules one per line.
    pub fn css_text(&self) -> String {
        let mut css = String::new();
        for module in self.modules().filter(|m| !m.rules().is_empty()) {
            css.push_str(&module.rules().join("\n"));
            css.push('\n');
        }
        css
    }

    /// Unmount everything: remove every mounted rule from the sink and forget
    /// the bands and the last request.
    pub fn clear(&mut self) {
        let count = self.rule_count();
        let mounted = self.modules().next().is_some();
        if let Some(list) = self.sink.as_rule_list() {
            for _ in 0..count {
                list.delete_rule(0);
            }
        } else if mounted {
            self.sink.replace_text("");
        }
        debug!(target_id = ?self.target, rules = count, "cleared ledger");
        self.tiers.clear();
        self.last = None;
    }
}

/// Expand a request so that each module is preceded by any ancestor not
/// already listed before it.
///
/// A module that was pulled in as an ancestor is not listed again when the
/// request names it later, so a parent never ends up after its child.
fn with_ancestors(modules: &[Arc<StyleModule>]) -> Vec<Arc<StyleModule>> {
    let mut expanded: Vec<Arc<StyleModule>> = Vec::with_capacity(modules.len());
    let mut implied: Vec<ModuleId> = Vec::new();
    for module in modules {
        if implied.contains(&module.id()) {
            continue;
        }
        for ancestor in module.ancestors() {
            if !expanded.iter().any(|m| m.id() == ancestor.id()) {
                implied.push(ancestor.id());
                expanded.push(ancestor);
            }
        }
        expanded.push(Arc::clone(module));
    }
    expanded
}

/// Class maps of the requested modules, later modules winning on clashes.
fn merged_classes(modules: &[Arc<StyleModule>]) -> ClassMap {
    let mut classes = ClassMap::new();
    for module in modules {
        for (name, class) in module.classes() {
            classes.insert(name.clone(), class.clone());
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::compiler::CompileOptions;
    use crate::css::model::Style;
    use crate::module::NameAllocator;
    use crate::mount::sink::{MemorySheet, SheetKind};
    use pretty_assertions::assert_eq;

    /// A class-less module with `count` rules `{label}0 {color: red;}`, ...
    fn sheet_module(label: &str, count: usize) -> Arc<StyleModule> {
        let spec: Style = (0..count)
            .map(|i| (format!("{label}{i}"), Style::new().with("color", "red")))
            .collect();
        StyleModule::from_sheet(&spec, &CompileOptions::default()).unwrap()
    }

    fn rule(label: &str, i: usize) -> String {
        format!("{label}{i} {{color: red;}}")
    }

    fn ledger(kind: SheetKind) -> (Ledger, MemorySheet) {
        let sheet = MemorySheet::new(kind);
        let ledger = Ledger::new(TargetId::fresh(), Box::new(sheet.clone()));
        (ledger, sheet)
    }

    fn assert_in_sync(ledger: &Ledger, sheet: &MemorySheet) {
        let expected: Vec<&str> = ledger.rules().collect();
        assert_eq!(sheet.rules(), expected);
        assert_eq!(ledger.rule_count(), expected.len());
    }

    // ── Basic insertion ──────────────────────────────────────────────

    #[test]
    fn mount_inserts_rules_in_request_order() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 2);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);

        assert_eq!(sheet.rules(), vec![rule("a", 0), rule("a", 1), rule("b", 0)]);
        assert_eq!(ledger.module_ids(), vec![a.id(), b.id()]);
        assert_in_sync(&ledger, &sheet);
    }

    #[test]
    fn empty_request_is_a_no_op() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let classes = ledger.mount(&[], Priority::NORMAL);
        assert!(classes.is_empty());
        assert_eq!(sheet.writes(), 0);
        assert!(ledger.tier_boundaries().is_empty());
    }

    #[test]
    fn unrelated_mount_lands_at_start_of_band() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 1);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone()], Priority::NORMAL);
        ledger.mount(&[b.clone()], Priority::NORMAL);

        assert_eq!(ledger.module_ids(), vec![b.id(), a.id()]);
        assert_in_sync(&ledger, &sheet);
    }

    #[test]
    fn new_module_follows_known_predecessor() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 1);
        let b = sheet_module("b", 2);
        let c = sheet_module("c", 1);
        ledger.mount(&[a.clone(), c.clone()], Priority::NORMAL);
        ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);

        assert_eq!(ledger.module_ids(), vec![a.id(), b.id(), c.id()]);
        assert_eq!(
            sheet.rules(),
            vec![rule("a", 0), rule("b", 0), rule("b", 1), rule("c", 0)]
        );
    }

    // ── Idempotence ──────────────────────────────────────────────────

    #[test]
    fn repeated_mount_does_not_touch_sink() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 2);
        let b = sheet_module("b", 1);
        let first = ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);
        let writes = sheet.writes();
        let second = ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);

        assert_eq!(first, second);
        assert_eq!(sheet.writes(), writes);
    }

    #[test]
    fn subset_mount_does_not_move_or_duplicate() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 2);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);
        let writes = sheet.writes();
        ledger.mount(&[a.clone()], Priority::NORMAL);
        ledger.mount(&[b.clone()], Priority::NORMAL);

        assert_eq!(sheet.writes(), writes);
        assert_eq!(ledger.module_ids(), vec![a.id(), b.id()]);
        assert_in_sync(&ledger, &sheet);
    }

    #[test]
    fn duplicate_in_one_request_is_mounted_once() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 1);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone(), b.clone(), a.clone()], Priority::NORMAL);

        assert_eq!(ledger.module_ids(), vec![b.id(), a.id()]);
        assert_eq!(sheet.rules(), vec![rule("b", 0), rule("a", 0)]);
    }

    // ── Reordering ───────────────────────────────────────────────────

    #[test]
    fn reversed_request_moves_module_without_duplicating() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 2);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);
        ledger.mount(&[b.clone(), a.clone()], Priority::NORMAL);

        assert_eq!(ledger.module_ids(), vec![b.id(), a.id()]);
        assert_eq!(sheet.rules(), vec![rule("b", 0), rule("a", 0), rule("a", 1)]);
        assert!(ledger.contains(a.id()));
        assert_in_sync(&ledger, &sheet);
    }

    #[test]
    fn reorder_in_the_middle_of_a_band() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 1);
        let b = sheet_module("b", 2);
        let c = sheet_module("c", 1);
        let d = sheet_module("d", 1);
        ledger.mount(&[a.clone(), b.clone(), c.clone(), d.clone()], Priority::NORMAL);
        ledger.mount(&[c.clone(), b.clone()], Priority::NORMAL);

        assert_eq!(ledger.module_ids(), vec![a.id(), c.id(), b.id(), d.id()]);
        assert_in_sync(&ledger, &sheet);
    }

    // ── Priority bands ───────────────────────────────────────────────

    #[test]
    fn bands_order_rules_regardless_of_call_order() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let high = sheet_module("h", 1);
        let normal = sheet_module("n", 1);
        let low = sheet_module("l", 1);
        ledger.mount(&[high.clone()], Priority::HIGH);
        ledger.mount(&[normal.clone()], Priority::NORMAL);
        ledger.mount(&[low.clone()], Priority::LOW);

        assert_eq!(sheet.rules(), vec![rule("l", 0), rule("n", 0), rule("h", 0)]);
        assert_eq!(
            ledger.tier_boundaries(),
            vec![(Priority::LOW, 1), (Priority::NORMAL, 2), (Priority::HIGH, 3)]
        );
    }

    #[test]
    fn insertion_stays_inside_its_band() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let low = sheet_module("l", 2);
        let normal = sheet_module("n", 1);
        let high = sheet_module("h", 1);
        let late = sheet_module("x", 1);
        ledger.mount(&[low.clone()], Priority::LOW);
        ledger.mount(&[high.clone()], Priority::HIGH);
        ledger.mount(&[normal.clone()], Priority::NORMAL);
        ledger.mount(&[normal.clone(), late.clone()], Priority::NORMAL);

        assert_eq!(
            sheet.rules(),
            vec![
                rule("l", 0),
                rule("l", 1),
                rule("n", 0),
                rule("x", 0),
                rule("h", 0)
            ]
        );
        assert_in_sync(&ledger, &sheet);
    }

    #[test]
    fn fractional_priorities_form_their_own_bands() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 1);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone()], Priority::new(1.5).unwrap());
        ledger.mount(&[b.clone()], Priority::NORMAL);

        assert_eq!(sheet.rules(), vec![rule("b", 0), rule("a", 0)]);
        assert_eq!(ledger.priority_of(a.id()), Some(Priority::new(1.5).unwrap()));
    }

    #[test]
    fn module_stays_in_its_first_band() {
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let a = sheet_module("a", 1);
        ledger.mount(&[a.clone()], Priority::NORMAL);
        let writes = sheet.writes();
        ledger.mount(&[a.clone()], Priority::HIGH);

        assert_eq!(ledger.priority_of(a.id()), Some(Priority::NORMAL));
        assert_eq!(sheet.writes(), writes);
        assert_eq!(ledger.tier_boundaries(), vec![(Priority::NORMAL, 1)]);
    }

    // ── Extension ────────────────────────────────────────────────────

    #[test]
    fn mounting_child_mounts_parent_first() {
        let names = NameAllocator::new();
        let parent = StyleModule::new_in(
            &names,
            &Style::new().with("one", Style::new().with("color", "blue")),
        )
        .unwrap();
        let child = parent
            .extend_with(
                &names,
                &Style::new().with("one", Style::new().with("color", "red")),
                &CompileOptions::default(),
            )
            .unwrap();
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        let classes = ledger.mount(&[child.clone()], Priority::NORMAL);

        assert_eq!(sheet.rules(), vec![".ͼ1 {color: blue;}", ".ͼ2 {color: red;}"]);
        assert_eq!(ledger.module_ids(), vec![parent.id(), child.id()]);
        assert_eq!(classes.get("one").map(String::as_str), Some("ͼ1 ͼ2"));
    }

    #[test]
    fn parent_listed_after_child_keeps_cascade_order() {
        let names = NameAllocator::new();
        let parent = StyleModule::new_in(
            &names,
            &Style::new().with("one", Style::new().with("color", "blue")),
        )
        .unwrap();
        let child = parent
            .extend_with(
                &names,
                &Style::new().with("one", Style::new().with("color", "red")),
                &CompileOptions::default(),
            )
            .unwrap();
        let (mut ledger, sheet) = ledger(SheetKind::Live);
        ledger.mount(&[child.clone(), parent.clone()], Priority::NORMAL);

        assert_eq!(sheet.rules(), vec![".ͼ1 {color: blue;}", ".ͼ2 {color: red;}"]);
        assert_eq!(ledger.module_ids(), vec![parent.id(), child.id()]);

        let writes = sheet.writes();
        ledger.mount(&[child.clone()], Priority::NORMAL);
        ledger.mount(&[child, parent], Priority::NORMAL);
        assert_eq!(sheet.writes(), writes);
        assert_in_sync(&ledger, &sheet);
    }

    #[test]
    fn class_map_prefers_later_modules() {
        let names = NameAllocator::new();
        let first =
            StyleModule::new_in(&names, &Style::new().with("btn", Style::new())).unwrap();
        let second =
            StyleModule::new_in(&names, &Style::new().with("btn", Style::new())).unwrap();
        let (mut ledger, _sheet) = ledger(SheetKind::Live);
        let classes = ledger.mount(&[first, second], Priority::NORMAL);
        assert_eq!(classes.get("btn").map(String::as_str), Some("ͼ2"));
    }

    // ── Text sinks ───────────────────────────────────────────────────

    #[test]
    fn text_sink_receives_full_serialization() {
        let (mut ledger, sheet) = ledger(SheetKind::Text);
        let a = sheet_module("a", 2);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);

        assert_eq!(
            sheet.css_text(),
            format!("{}\n{}\n{}\n", rule("a", 0), rule("a", 1), rule("b", 0))
        );
        assert_eq!(sheet.writes(), 1);
        assert_eq!(ledger.css_text(), sheet.css_text());
    }

    #[test]
    fn text_sink_is_not_rewritten_without_changes() {
        let (mut ledger, sheet) = ledger(SheetKind::Text);
        let a = sheet_module("a", 1);
        let b = sheet_module("b", 1);
        ledger.mount(&[a.clone(), b.clone()], Priority::NORMAL);
        ledger.mount(&[b.clone()], Priority::NORMAL);
        assert_eq!(sheet.writes(), 1);

        ledger.mount(&[b.clone(), a.clone()], Priority::NORMAL);
        assert_eq!(sheet.writes(), 2);
        assert_eq!(sheet.css_text(), format!("{}\n{}\n", rule("b", 0), rule("a", 0)));
    }

    #[test]
    fn modules_without_rules_are_tracked_but_not_serialized() {
        let (mut ledger, sheet) = ledger(SheetKind::Text);
        let empty = sheet_module("e", 0);
        let a = sheet_module("a", 1);
        ledger.mount(&[empty.clone(), a.clone()], Priority::NORMAL);

        assert!(ledger.contains(empty.id()));
        assert_eq!(sheet.css_text(), format!("{}\n", rule("a", 0)));
    }
}
