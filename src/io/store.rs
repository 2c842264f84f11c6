use crate::model::category::{Category, CategoryPatch, NewCategory};
use crate::model::task::{NewTask, Subtask, SubtaskPatch, Task, TaskPatch};

/// Error type for remote store calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("could not reach task server: {0}")]
    Network(String),
    #[error("task server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("could not decode server response: {0}")]
    Decode(String),
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

impl StoreError {
    /// Map a non-2xx status to an error. `what` names the resource asked for.
    pub fn from_status(status: u16, what: &str, body: String) -> StoreError {
        if status == 404 {
            StoreError::NotFound(what.to_string())
        } else {
            StoreError::Server { status, body }
        }
    }
}

/// The remote task/category collection.
///
/// Implementations are thin and stateless: no caching, no merging. Callers
/// refetch the full list after every mutation.
pub trait TaskStore {
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;
    fn create_task(&self, draft: &NewTask) -> Result<Task, StoreError>;
    /// Fails with `NotFound` for an unknown ID
    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError>;
    /// Deletes the task and its subtasks
    fn delete_task(&self, id: &str) -> Result<(), StoreError>;
    fn add_subtask(&self, task_id: &str, title: &str) -> Result<Subtask, StoreError>;
    fn update_subtask(&self, id: &str, patch: &SubtaskPatch) -> Result<Subtask, StoreError>;

    fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    fn create_category(&self, draft: &NewCategory) -> Result<Category, StoreError>;
    fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, StoreError>;
    /// The server moves the category's tasks to the default category
    fn delete_category(&self, id: &str) -> Result<(), StoreError>;

    fn health(&self) -> Result<(), StoreError>;
}
