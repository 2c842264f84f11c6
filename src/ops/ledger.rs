//! User-chosen display order for the two sections of today's board.
//!
//! The ledger only knows task IDs. It never checks whether a task still
//! exists or is still due today; the board reconciles that when reading.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::section::Section;
use crate::model::task::Task;

/// One ordered, duplicate-free ID sequence per section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLedger {
    #[serde(default)]
    pub important: Vec<String>,
    #[serde(default)]
    pub extra: Vec<String>,
}

impl OrderLedger {
    pub fn sequence(&self, section: Section) -> &[String] {
        match section {
            Section::Important => &self.important,
            Section::Extra => &self.extra,
        }
    }

    fn sequence_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::Important => &mut self.important,
            Section::Extra => &mut self.extra,
        }
    }

    pub fn position(&self, section: Section, id: &str) -> Option<usize> {
        self.sequence(section).iter().position(|x| x == id)
    }

    pub fn contains(&self, section: Section, id: &str) -> bool {
        self.position(section, id).is_some()
    }

    /// Append `id` to the section. No-op if it is already there.
    ///
    /// Does not look at the other section: evict with [`remove`](Self::remove)
    /// before moving an ID across.
    pub fn insert(&mut self, section: Section, id: &str) -> bool {
        let seq = self.sequence_mut(section);
        if seq.iter().any(|x| x == id) {
            return false;
        }
        seq.push(id.to_string());
        true
    }

    /// Drop `id` from both sections. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.important.len() + self.extra.len();
        self.important.retain(|x| x != id);
        self.extra.retain(|x| x != id);
        before != self.important.len() + self.extra.len()
    }

    /// Move (or insert) `id` to `target_index` within the section.
    /// The index is clamped to the sequence length after removal.
    pub fn reposition(&mut self, section: Section, id: &str, target_index: usize) {
        let seq = self.sequence_mut(section);
        if let Some(current) = seq.iter().position(|x| x == id) {
            seq.remove(current);
        }
        let index = target_index.min(seq.len());
        seq.insert(index, id.to_string());
    }

    /// Make the front of the section's sequence match `rendered`, the IDs as
    /// currently displayed. Entries not on screen keep their relative order
    /// behind them, and rendered IDs are dropped from the other section.
    ///
    /// Afterwards an index into the rendered list is an index into the ledger.
    pub fn adopt(&mut self, section: Section, rendered: &[&str]) {
        let other = match section {
            Section::Important => Section::Extra,
            Section::Extra => Section::Important,
        };
        self.sequence_mut(other)
            .retain(|x| !rendered.contains(&x.as_str()));

        let seq = self.sequence_mut(section);
        let mut adopted: Vec<String> = rendered.iter().map(|id| id.to_string()).collect();
        adopted.extend(
            seq.iter()
                .filter(|x| !rendered.contains(&x.as_str()))
                .cloned(),
        );
        *seq = adopted;
    }

    /// Keep only IDs for which `keep` returns true, in both sections
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> bool {
        let before = self.important.len() + self.extra.len();
        self.important.retain(|x| keep(x.as_str()));
        self.extra.retain(|x| keep(x.as_str()));
        before != self.important.len() + self.extra.len()
    }
}

/// Stable-sort tasks by their position in `order`.
///
/// IDs absent from `order` go after all known ones, keeping their input
/// order, so newly classified tasks show up at the end.
pub fn sort_by_ledger<'a>(mut tasks: Vec<&'a Task>, order: &[String]) -> Vec<&'a Task> {
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    tasks.sort_by_key(|t| rank.get(t.id.as_str()).copied().unwrap_or(usize::MAX));
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger(important: &[&str], extra: &[&str]) -> OrderLedger {
        OrderLedger {
            important: important.iter().map(|s| s.to_string()).collect(),
            extra: extra.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn insert_appends_once() {
        let mut l = OrderLedger::default();
        assert!(l.insert(Section::Important, "a"));
        assert!(l.insert(Section::Important, "b"));
        let once = l.clone();
        assert!(!l.insert(Section::Important, "b"));
        assert_eq!(l, once);
        assert_eq!(l.important, vec!["a", "b"]);
    }

    #[test]
    fn insert_does_not_touch_other_section() {
        let mut l = ledger(&["a"], &[]);
        l.insert(Section::Extra, "a");
        assert_eq!(l, ledger(&["a"], &["a"]));
    }

    #[test]
    fn remove_evicts_from_both_sections() {
        let mut l = ledger(&["a", "b"], &["c", "a"]);
        assert!(l.remove("a"));
        assert_eq!(l, ledger(&["b"], &["c"]));
        assert!(!l.remove("a"));
    }

    #[test]
    fn reposition_moves_and_keeps_others_in_order() {
        let mut l = ledger(&["a", "b", "c", "d"], &[]);
        l.reposition(Section::Important, "d", 1);
        assert_eq!(l.important, vec!["a", "d", "b", "c"]);
        l.reposition(Section::Important, "a", 2);
        assert_eq!(l.important, vec!["d", "b", "a", "c"]);
        assert_eq!(l.position(Section::Important, "a"), Some(2));
    }

    #[test]
    fn reposition_clamps_index() {
        let mut l = ledger(&["a", "b"], &[]);
        l.reposition(Section::Important, "a", 99);
        assert_eq!(l.important, vec!["b", "a"]);
        l.reposition(Section::Important, "new", 99);
        assert_eq!(l.important, vec!["b", "a", "new"]);
    }

    #[test]
    fn reposition_inserts_unknown_id() {
        let mut l = ledger(&[], &["x", "y"]);
        l.reposition(Section::Extra, "z", 0);
        assert_eq!(l.extra, vec!["z", "x", "y"]);
    }

    #[test]
    fn adopt_puts_rendered_first_and_keeps_offscreen_tail() {
        let mut l = ledger(&["gone", "b"], &["a"]);
        l.adopt(Section::Important, &["a", "b", "c"]);
        assert_eq!(l, ledger(&["a", "b", "c", "gone"], &[]));
    }

    #[test]
    fn sort_places_unknown_ids_last_in_input_order() {
        let tasks: Vec<Task> = ["u1", "k2", "u2", "k1", "u3"]
            .iter()
            .map(|id| Task::new(*id, *id))
            .collect();
        let refs: Vec<&Task> = tasks.iter().collect();
        let order = vec!["k1".to_string(), "k2".to_string(), "absent".to_string()];
        let sorted: Vec<&str> = sort_by_ledger(refs, &order)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(sorted, vec!["k1", "k2", "u1", "u2", "u3"]);
    }
}
