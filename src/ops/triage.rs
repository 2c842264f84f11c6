//! The daily triage board.
//!
//! Combines the latest task snapshot from the store with local placement
//! state (section assignments, per-section order, expanded tasks) and
//! exposes the only sanctioned ways to change either.
//!
//! Remote-touching operations call the store first and only touch local
//! state once the call succeeded. The one exception is `NotFound`: the ID
//! can no longer exist, so it is evicted from local state before the error
//! is returned. Local-only operations never fail.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::io::store::{StoreError, TaskStore};
use crate::model::category::{Category, CategoryPatch, DEFAULT_COLOR, NewCategory};
use crate::model::section::{DropOrigin, Section};
use crate::model::task::{DEFAULT_CATEGORY, NewTask, Subtask, SubtaskPatch, Task, TaskPatch};
use crate::ops::classify;
use crate::ops::ledger::{OrderLedger, sort_by_ledger};
use crate::ops::sections::SectionMap;

/// Error type for board operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("task not found: {0}")]
    UnknownTask(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Local placement state. Persisted between runs; never sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageState {
    #[serde(default)]
    pub sections: SectionMap,
    #[serde(default)]
    pub order: OrderLedger,
    #[serde(default)]
    pub expanded: BTreeSet<String>,
}

impl TriageState {
    /// Forget everything about `id`. Returns whether anything changed.
    pub fn evict(&mut self, id: &str) -> bool {
        let unassigned = self.sections.unassign(id);
        let removed = self.order.remove(id);
        let collapsed = self.expanded.remove(id);
        unassigned || removed || collapsed
    }
}

/// Outcome of a reorder request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reorder {
    Moved { index: usize },
    /// Dragged across sections; use a drop instead
    CrossSection,
    /// Target (or dragged task) is not shown in the section
    NotShown,
}

pub struct TriageBoard<S> {
    store: S,
    today: NaiveDate,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    state: TriageState,
}

impl<S: TaskStore> TriageBoard<S> {
    /// Build a board over an empty snapshot. Call [`refresh`](Self::refresh)
    /// to load tasks.
    pub fn new(store: S, state: TriageState, today: NaiveDate) -> Self {
        TriageBoard {
            store,
            today,
            tasks: Vec::new(),
            categories: Vec::new(),
            state,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn state(&self) -> &TriageState {
        &self.state
    }

    pub fn into_state(self) -> TriageState {
        self.state
    }

    /// The last fetched task collection
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Replace the snapshot with the store's full task list.
    ///
    /// Placement entries for tasks that no longer exist are dropped here.
    /// Entries for tasks that exist but are not due today are kept.
    pub fn refresh(&mut self) -> Result<(), TriageError> {
        self.tasks = self.store.list_tasks()?;
        let tasks = &self.tasks;
        let exists = |id: &str| tasks.iter().any(|t| t.id == id);
        let pruned_sections = self.state.sections.retain(exists);
        let pruned_order = self.state.order.retain(exists);
        self.state.expanded.retain(|id| exists(id.as_str()));
        if pruned_sections || pruned_order {
            log::debug!("pruned placement entries for deleted tasks");
        }
        Ok(())
    }

    pub fn refresh_categories(&mut self) -> Result<(), TriageError> {
        self.categories = self.store.list_categories()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    /// Due-today tasks rendered in `section`, in ledger order
    pub fn section_list(&self, section: Section) -> Vec<&Task> {
        let members: Vec<&Task> = classify::due_today(&self.tasks, self.today)
            .into_iter()
            .filter(|t| self.state.sections.section_of(&t.id) == section)
            .collect();
        sort_by_ledger(members, self.state.order.sequence(section))
    }

    pub fn important_list(&self) -> Vec<&Task> {
        self.section_list(Section::Important)
    }

    pub fn extra_list(&self) -> Vec<&Task> {
        self.section_list(Section::Extra)
    }

    /// Where a task renders today, or `None` if it is not due today
    pub fn section_of(&self, id: &str) -> Option<Section> {
        self.task(id)
            .filter(|t| t.is_due_on(self.today))
            .map(|t| self.state.sections.section_of(&t.id))
    }

    /// Unscheduled pool for one category
    pub fn by_category(&self, category_id: &str) -> Vec<&Task> {
        classify::by_category(&self.tasks, category_id, self.today)
    }

    pub fn available(&self) -> Vec<&Task> {
        classify::available(&self.tasks, self.today)
    }

    pub fn category_color(&self, category_id: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.color.as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    // -----------------------------------------------------------------------
    // Triage transitions
    // -----------------------------------------------------------------------

    /// Place a task in a section of today's board.
    ///
    /// From a category list the task is first scheduled for today on the
    /// server; from the today list only local placement changes.
    pub fn drop_on_section(
        &mut self,
        id: &str,
        section: Section,
        origin: DropOrigin,
    ) -> Result<(), TriageError> {
        if origin == DropOrigin::CategoryList {
            let result = self.store.update_task(id, &TaskPatch::schedule(self.today));
            self.checked(id, result)?;
        }
        self.place(id, section);
        log::debug!("placed {} in {} (from {})", id, section, origin);
        if origin == DropOrigin::CategoryList {
            self.refresh()?;
        }
        Ok(())
    }

    pub fn drop_on_important(&mut self, id: &str, origin: DropOrigin) -> Result<(), TriageError> {
        self.drop_on_section(id, Section::Important, origin)
    }

    pub fn drop_on_extra(&mut self, id: &str, origin: DropOrigin) -> Result<(), TriageError> {
        self.drop_on_section(id, Section::Extra, origin)
    }

    /// Take a task off today's board and file it under `category_id`
    pub fn drop_back_to_category(&mut self, id: &str, category_id: &str) -> Result<(), TriageError> {
        let result = self
            .store
            .update_task(id, &TaskPatch::unschedule_into(category_id));
        self.checked(id, result)?;
        self.state.sections.unassign(id);
        self.state.order.remove(id);
        log::debug!("returned {} to category {}", id, category_id);
        self.refresh()
    }

    /// Move `id` to the rendered position of `target_id`.
    ///
    /// Only applies when the drag started in the section it is dropped in;
    /// anything else leaves the ledger as it was.
    pub fn reorder_within_section(
        &mut self,
        id: &str,
        target_id: &str,
        origin: Section,
        section: Section,
    ) -> Reorder {
        if origin != section {
            log::debug!("ignored reorder of {} across sections", id);
            return Reorder::CrossSection;
        }
        let rendered: Vec<String> = self
            .section_list(section)
            .iter()
            .map(|t| t.id.clone())
            .collect();
        let Some(index) = rendered.iter().position(|x| x == target_id) else {
            return Reorder::NotShown;
        };
        if !rendered.iter().any(|x| x == id) {
            return Reorder::NotShown;
        }
        let rendered: Vec<&str> = rendered.iter().map(String::as_str).collect();
        self.state.order.adopt(section, &rendered);
        self.state.order.reposition(section, id, index);
        log::debug!("moved {} to position {} in {}", id, index, section);
        Reorder::Moved { index }
    }

    /// Delete a task on the server and forget its placement
    pub fn delete_task(&mut self, id: &str) -> Result<(), TriageError> {
        let result = self.store.delete_task(id);
        self.checked(id, result)?;
        self.state.evict(id);
        self.refresh()
    }

    // -----------------------------------------------------------------------
    // Task CRUD
    // -----------------------------------------------------------------------

    /// Create a task and return it as the server stored it
    pub fn create_task(&mut self, mut draft: NewTask) -> Result<Task, TriageError> {
        draft.title = validate_title(&draft.title)?;
        if draft.category.as_deref().is_none_or(str::is_empty) {
            draft.category = Some(DEFAULT_CATEGORY.to_string());
        }
        let task = self.store.create_task(&draft)?;
        log::debug!("created task {}", task.id);
        self.refresh()?;
        Ok(task)
    }

    /// Create a task scheduled for today and place it in `section`.
    ///
    /// Placement uses the ID returned by the create call.
    pub fn create_in_section(&mut self, mut draft: NewTask, section: Section) -> Result<Task, TriageError> {
        draft.do_date = Some(self.today);
        draft.title = validate_title(&draft.title)?;
        if draft.category.as_deref().is_none_or(str::is_empty) {
            draft.category = Some(DEFAULT_CATEGORY.to_string());
        }
        let task = self.store.create_task(&draft)?;
        self.place(&task.id, section);
        log::debug!("created task {} in {}", task.id, section);
        self.refresh()?;
        Ok(task)
    }

    /// Flip a task's completed flag
    pub fn toggle_task(&mut self, id: &str) -> Result<Task, TriageError> {
        let completed = self
            .task(id)
            .map(|t| t.completed)
            .ok_or_else(|| TriageError::UnknownTask(id.to_string()))?;
        let patch = TaskPatch {
            completed: Some(!completed),
            ..Default::default()
        };
        self.edit_task(id, &patch)
    }

    pub fn rename_task(&mut self, id: &str, title: &str) -> Result<Task, TriageError> {
        let patch = TaskPatch {
            title: Some(validate_title(title)?),
            ..Default::default()
        };
        self.edit_task(id, &patch)
    }

    /// General partial update. An empty title in the patch is rejected.
    pub fn edit_task(&mut self, id: &str, patch: &TaskPatch) -> Result<Task, TriageError> {
        if let Some(ref title) = patch.title
            && title.trim().is_empty()
        {
            return Err(TriageError::Validation("title cannot be empty".into()));
        }
        let result = self.store.update_task(id, patch);
        let task = self.checked(id, result)?;
        self.refresh()?;
        Ok(task)
    }

    pub fn add_subtask(&mut self, task_id: &str, title: &str) -> Result<Subtask, TriageError> {
        let title = validate_title(title)?;
        let result = self.store.add_subtask(task_id, &title);
        let subtask = self.checked(task_id, result)?;
        self.refresh()?;
        Ok(subtask)
    }

    /// Flip a subtask's completed flag
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<Subtask, TriageError> {
        let completed = self
            .task(task_id)
            .and_then(|t| t.subtasks.iter().find(|s| s.id == subtask_id))
            .map(|s| s.completed)
            .ok_or_else(|| TriageError::UnknownTask(format!("{}/{}", task_id, subtask_id)))?;
        let patch = SubtaskPatch {
            completed: Some(!completed),
            ..Default::default()
        };
        let subtask = self.store.update_subtask(subtask_id, &patch)?;
        self.refresh()?;
        Ok(subtask)
    }

    // -----------------------------------------------------------------------
    // Expansion
    // -----------------------------------------------------------------------

    /// Toggle whether a task shows its subtasks. Returns the new state.
    pub fn toggle_expanded(&mut self, id: &str) -> bool {
        if self.state.expanded.remove(id) {
            false
        } else {
            self.state.expanded.insert(id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.state.expanded.contains(id)
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn add_category(&mut self, name: &str, color: Option<&str>) -> Result<Category, TriageError> {
        let draft = NewCategory {
            name: validate_title(name)?,
            color: color.unwrap_or(DEFAULT_COLOR).to_string(),
        };
        let category = self.store.create_category(&draft)?;
        self.refresh_categories()?;
        Ok(category)
    }

    pub fn rename_category(&mut self, id: &str, name: &str) -> Result<Category, TriageError> {
        let patch = CategoryPatch {
            name: Some(validate_title(name)?),
            color: None,
        };
        let category = self.store.update_category(id, &patch)?;
        self.refresh_categories()?;
        Ok(category)
    }

    /// Delete a category. Its tasks move to the default category on the
    /// server, so tasks are refetched too.
    pub fn delete_category(&mut self, id: &str) -> Result<(), TriageError> {
        self.store.delete_category(id)?;
        self.refresh_categories()?;
        self.refresh()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Record `id` in `section`, moving it out of the other one if needed
    fn place(&mut self, id: &str, section: Section) {
        self.state.sections.assign(id, section);
        if !self.state.order.contains(section, id) {
            self.state.order.remove(id);
            self.state.order.insert(section, id);
        }
    }

    /// Pass a store result through, evicting `id` locally on `NotFound`
    fn checked<T>(&mut self, id: &str, result: Result<T, StoreError>) -> Result<T, TriageError> {
        result.map_err(|err| {
            if let StoreError::NotFound(_) = err {
                log::warn!("{} no longer exists on the server, forgetting it", id);
                self.state.evict(id);
            }
            TriageError::Store(err)
        })
    }
}

/// Trimmed title, or a validation error if nothing is left
pub fn validate_title(title: &str) -> Result<String, TriageError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TriageError::Validation("title cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}
