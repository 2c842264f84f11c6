//! In-process task store with server semantics, for tests and offline demos.
//!
//! Records every call it receives and can be primed to fail the next one.

use std::cell::RefCell;

use crate::io::store::{StoreError, TaskStore};
use crate::model::category::{Category, CategoryPatch, NewCategory};
use crate::model::task::{DEFAULT_CATEGORY, NewTask, Subtask, SubtaskPatch, Task, TaskPatch};

/// A call received by [`MemoryStore`], with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListTasks,
    CreateTask(NewTask),
    UpdateTask(String, TaskPatch),
    DeleteTask(String),
    AddSubtask(String, String),
    UpdateSubtask(String, SubtaskPatch),
    ListCategories,
    CreateCategory(NewCategory),
    UpdateCategory(String, CategoryPatch),
    DeleteCategory(String),
    Health,
}

impl StoreCall {
    /// Whether the call changes server state
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            StoreCall::ListTasks | StoreCall::ListCategories | StoreCall::Health
        )
    }
}

#[derive(Debug, Default)]
struct Inner {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    calls: Vec<StoreCall>,
    fail_next: Option<StoreError>,
    next_id: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().tasks = tasks;
        store
    }

    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        self.inner.borrow_mut().categories = categories;
        self
    }

    /// Make the next call (of any kind) fail with `err`
    pub fn fail_next(&self, err: StoreError) {
        self.inner.borrow_mut().fail_next = Some(err);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls().into_iter().filter(|c| c.is_mutation()).collect()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.inner.borrow().tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Change a task behind the board's back, as another client would
    pub fn edit_task(&self, id: &str, edit: impl FnOnce(&mut Task)) {
        if let Some(task) = self.inner.borrow_mut().tasks.iter_mut().find(|t| t.id == id) {
            edit(task);
        }
    }

    /// Remove a task behind the board's back
    pub fn remove_task(&self, id: &str) {
        self.inner.borrow_mut().tasks.retain(|t| t.id != id);
    }

    fn begin(&self, call: StoreCall) -> Result<std::cell::RefMut<'_, Inner>, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(call);
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(inner),
        }
    }
}

impl Inner {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Unknown or empty categories land in the default one, as on the server
    fn resolve_category(&self, requested: Option<&str>) -> String {
        match requested {
            Some(id) if self.categories.iter().any(|c| c.id == id) => id.to_string(),
            Some(id) if self.categories.is_empty() && !id.is_empty() => id.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        }
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("task {}", id)))
    }
}

impl TaskStore for MemoryStore {
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let inner = self.begin(StoreCall::ListTasks)?;
        Ok(inner.tasks.clone())
    }

    fn create_task(&self, draft: &NewTask) -> Result<Task, StoreError> {
        let mut inner = self.begin(StoreCall::CreateTask(draft.clone()))?;
        let id = inner.fresh_id("task");
        let mut task = Task::new(id, draft.title.clone());
        task.category = Some(inner.resolve_category(draft.category.as_deref()));
        task.description = draft.description.clone();
        task.due_date = draft.due_date;
        task.do_date = draft.do_date;
        task.is_ephemeral = draft.is_ephemeral;
        task.notes = draft.notes.clone();
        inner.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        let mut inner = self.begin(StoreCall::UpdateTask(id.to_string(), patch.clone()))?;
        let mut patch = patch.clone();
        if let Some(requested) = patch.category.take() {
            patch.category = Some(inner.resolve_category(Some(&requested)));
        }
        let task = inner.task_mut(id)?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::DeleteTask(id.to_string()))?;
        inner.task_mut(id)?;
        inner.tasks.retain(|t| t.id != id);
        Ok(())
    }

    fn add_subtask(&self, task_id: &str, title: &str) -> Result<Subtask, StoreError> {
        let mut inner =
            self.begin(StoreCall::AddSubtask(task_id.to_string(), title.to_string()))?;
        let id = inner.fresh_id("sub");
        let subtask = Subtask {
            id,
            title: title.to_string(),
            completed: false,
        };
        inner.task_mut(task_id)?.subtasks.push(subtask.clone());
        Ok(subtask)
    }

    fn update_subtask(&self, id: &str, patch: &SubtaskPatch) -> Result<Subtask, StoreError> {
        let mut inner = self.begin(StoreCall::UpdateSubtask(id.to_string(), patch.clone()))?;
        let subtask = inner
            .tasks
            .iter_mut()
            .flat_map(|t| t.subtasks.iter_mut())
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("subtask {}", id)))?;
        patch.apply_to(subtask);
        Ok(subtask.clone())
    }

    fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let inner = self.begin(StoreCall::ListCategories)?;
        Ok(inner.categories.clone())
    }

    fn create_category(&self, draft: &NewCategory) -> Result<Category, StoreError> {
        let mut inner = self.begin(StoreCall::CreateCategory(draft.clone()))?;
        let category = Category {
            id: inner.fresh_id("cat"),
            name: draft.name.clone(),
            color: draft.color.clone(),
        };
        inner.categories.push(category.clone());
        Ok(category)
    }

    fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, StoreError> {
        let mut inner = self.begin(StoreCall::UpdateCategory(id.to_string(), patch.clone()))?;
        let category = inner
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("category {}", id)))?;
        if let Some(ref name) = patch.name {
            category.name = name.clone();
        }
        if let Some(ref color) = patch.color {
            category.color = color.clone();
        }
        Ok(category.clone())
    }

    fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::DeleteCategory(id.to_string()))?;
        if !inner.categories.iter().any(|c| c.id == id) {
            return Err(StoreError::NotFound(format!("category {}", id)));
        }
        if !inner.categories.iter().any(|c| c.id == DEFAULT_CATEGORY) {
            inner
                .categories
                .push(Category::new(DEFAULT_CATEGORY, "General"));
        }
        for task in inner.tasks.iter_mut().filter(|t| t.in_category(id)) {
            task.category = Some(DEFAULT_CATEGORY.to_string());
        }
        inner.categories.retain(|c| c.id != id);
        Ok(())
    }

    fn health(&self) -> Result<(), StoreError> {
        self.begin(StoreCall::Health)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_ids_and_default_category() {
        let store = MemoryStore::new().with_categories(vec![Category::new("work", "Work")]);
        let a = store.create_task(&NewTask::titled("A")).unwrap();
        let mut draft = NewTask::titled("B");
        draft.category = Some("work".into());
        let b = store.create_task(&draft).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.category.as_deref(), Some(DEFAULT_CATEGORY));
        assert_eq!(b.category.as_deref(), Some("work"));
        assert_eq!(store.list_tasks().unwrap().len(), 2);
    }

    #[test]
    fn update_unknown_task_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_task("nope", &TaskPatch::default()).unwrap_err();
        assert_eq!(err, StoreError::NotFound("task nope".into()));
    }

    #[test]
    fn primed_failure_applies_to_one_call() {
        let store = MemoryStore::with_tasks(vec![Task::new("a", "A")]);
        store.fail_next(StoreError::Network("down".into()));
        assert!(store.list_tasks().is_err());
        assert_eq!(store.list_tasks().unwrap().len(), 1);
        assert_eq!(store.calls(), vec![StoreCall::ListTasks, StoreCall::ListTasks]);
    }

    #[test]
    fn failed_call_leaves_data_untouched() {
        let store = MemoryStore::with_tasks(vec![Task::new("a", "A")]);
        store.fail_next(StoreError::Server {
            status: 500,
            body: String::new(),
        });
        assert!(store.delete_task("a").is_err());
        assert!(store.task("a").is_some());
    }

    #[test]
    fn delete_category_moves_tasks_to_default() {
        let mut t = Task::new("a", "A");
        t.category = Some("work".into());
        let store = MemoryStore::with_tasks(vec![t]).with_categories(vec![Category::new("work", "Work")]);
        store.delete_category("work").unwrap();
        assert!(store.task("a").unwrap().in_category(DEFAULT_CATEGORY));
        let ids: Vec<String> = store.list_categories().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![DEFAULT_CATEGORY]);
    }

    #[test]
    fn subtasks_are_scoped_to_parent() {
        let store = MemoryStore::with_tasks(vec![Task::new("a", "A")]);
        let sub = store.add_subtask("a", "step").unwrap();
        let done = store
            .update_subtask(
                &sub.id,
                &SubtaskPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(done.completed);
        assert!(store.task("a").unwrap().subtasks[0].completed);
        assert!(store.add_subtask("missing", "x").is_err());
    }
}
