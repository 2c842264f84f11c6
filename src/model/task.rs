use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category the server falls back to when a task has none (or an unknown one)
pub const DEFAULT_CATEGORY: &str = "default";

/// A checklist item owned by a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// A task as served by the remote store.
///
/// Snapshots are never edited locally; every change goes through the store
/// and comes back with the next full list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Category ID
    #[serde(default)]
    pub category: Option<String>,
    /// Server-side priority label (informational only, triage ignores it)
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// The day the task is scheduled for action
    #[serde(default)]
    pub do_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    /// Discarded server-side if still open after its do date
    #[serde(default)]
    pub is_ephemeral: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// IDs of tasks that must be completed first
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Task {
    /// Create an open, unscheduled task in the default category
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            description: None,
            category: Some(DEFAULT_CATEGORY.to_string()),
            priority: None,
            due_date: None,
            do_date: None,
            completed: false,
            is_ephemeral: false,
            notes: None,
            subtasks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Open and scheduled for `day`
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        !self.completed && self.do_date == Some(day)
    }

    pub fn in_category(&self, category_id: &str) -> bool {
        self.category.as_deref() == Some(category_id)
    }

    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }
}

/// Body of a create call. Absent fields are left to server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_ephemeral: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update for a task. Only `Some` fields go on the wire.
///
/// Dates are doubly optional: `Some(None)` serializes as `null` and clears
/// the date on the server, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ephemeral: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskPatch {
    /// Put the task on the schedule for `day`
    pub fn schedule(day: NaiveDate) -> Self {
        TaskPatch {
            do_date: Some(Some(day)),
            ..Default::default()
        }
    }

    /// Clear the do date and file the task under `category_id`
    pub fn unschedule_into(category_id: &str) -> Self {
        TaskPatch {
            do_date: Some(None),
            category: Some(category_id.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Apply the patch the way the server does (used by in-memory stores)
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = Some(description.clone());
        }
        if let Some(ref category) = self.category {
            task.category = Some(category.clone());
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(day) = self.do_date {
            task.do_date = day;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(ephemeral) = self.is_ephemeral {
            task.is_ephemeral = ephemeral;
        }
        if let Some(ref notes) = self.notes {
            task.notes = Some(notes.clone());
        }
    }
}

/// Partial update for a subtask
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubtaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl SubtaskPatch {
    pub fn apply_to(&self, subtask: &mut Subtask) {
        if let Some(ref title) = self.title {
            subtask.title = title.clone();
        }
        if let Some(completed) = self.completed {
            subtask.completed = completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn deserializes_server_payload() {
        let json = r##"{
            "id": "a1",
            "title": "Write report",
            "description": "",
            "category": "work",
            "priority": "extra",
            "dueDate": "2025-06-02",
            "doDate": null,
            "completed": false,
            "isEphemeral": true,
            "notes": "",
            "subtasks": [{"id": "s1", "title": "Outline", "completed": true}],
            "dependencies": [],
            "recurring": null
        }"##;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "a1");
        assert_eq!(task.category.as_deref(), Some("work"));
        assert_eq!(task.due_date, Some(day("2025-06-02")));
        assert_eq!(task.do_date, None);
        assert!(task.is_ephemeral);
        assert_eq!(task.completed_subtasks(), 1);
    }

    #[test]
    fn deserializes_minimal_payload() {
        let task: Task = serde_json::from_str(r#"{"id":"x","title":"t"}"#).unwrap();
        assert!(!task.completed);
        assert!(task.subtasks.is_empty());
        assert!(task.dependencies.is_empty());
    }

    #[test]
    fn due_requires_open_and_same_day() {
        let today = day("2025-06-01");
        let mut task = Task::new("a", "A");
        assert!(!task.is_due_on(today));
        task.do_date = Some(today);
        assert!(task.is_due_on(today));
        task.completed = true;
        assert!(!task.is_due_on(today));
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = TaskPatch::schedule(day("2025-06-01"));
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"doDate":"2025-06-01"}"#
        );
    }

    #[test]
    fn patch_clears_date_with_explicit_null() {
        let patch = TaskPatch::unschedule_into("work");
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"category":"work","doDate":null}"#
        );
    }

    #[test]
    fn patch_apply_clears_and_sets() {
        let mut task = Task::new("a", "A");
        task.do_date = Some(day("2025-06-01"));
        TaskPatch::unschedule_into("home").apply_to(&mut task);
        assert_eq!(task.do_date, None);
        assert!(task.in_category("home"));
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn new_task_omits_empty_fields() {
        let draft = NewTask::titled("Buy milk");
        assert_eq!(
            serde_json::to_string(&draft).unwrap(),
            r#"{"title":"Buy milk","isEphemeral":false}"#
        );
    }
}
