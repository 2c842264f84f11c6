use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::section::Section;

/// Explicit section choices for triaged tasks, keyed by task ID.
///
/// Only tasks the user placed have an entry. Entries for tasks that are no
/// longer due today stay until evicted; reads only consult the map for
/// tasks that are due today, so a stale entry is never shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap(IndexMap<String, Section>);

impl SectionMap {
    /// Upsert the section for `id`
    pub fn assign(&mut self, id: &str, section: Section) -> bool {
        self.0.insert(id.to_string(), section) != Some(section)
    }

    /// Remove the entry for `id`; no-op if absent
    pub fn unassign(&mut self, id: &str) -> bool {
        self.0.shift_remove(id).is_some()
    }

    /// The explicit assignment, if any
    pub fn get(&self, id: &str) -> Option<Section> {
        self.0.get(id).copied()
    }

    /// Section a due-today task renders in: the assignment, or Extra.
    pub fn section_of(&self, id: &str) -> Section {
        self.get(id).unwrap_or(Section::Extra)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> bool {
        let before = self.0.len();
        self.0.retain(|id, _| keep(id.as_str()));
        before != self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Section)> {
        self.0.iter().map(|(id, s)| (id.as_str(), *s))
    }
}
