use chrono::NaiveDate;
use serde::Serialize;

use crate::model::category::Category;
use crate::model::section::Section;
use crate::model::task::{Subtask, Task};
use crate::util::unicode::fit_to_width;

/// Column width for titles in list output
const TITLE_WIDTH: usize = 48;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ephemeral: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskJson>,
}

#[derive(Serialize)]
pub struct SubtaskJson {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct TodayJson {
    pub date: NaiveDate,
    pub important: Vec<TaskJson>,
    pub extra: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct CategoryJson {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Open, unscheduled tasks in the category
    pub pending: usize,
}

#[derive(Serialize)]
pub struct CategoryListingJson {
    pub category: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct PlacementJson {
    pub id: String,
    pub section: Section,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        category: task.category.clone(),
        completed: task.completed,
        due_date: task.due_date,
        do_date: task.do_date,
        ephemeral: task.is_ephemeral,
        description: task.description.clone(),
        notes: task.notes.clone(),
        dependencies: task.dependencies.clone(),
        subtasks: task.subtasks.iter().map(subtask_to_json).collect(),
    }
}

pub fn subtask_to_json(subtask: &Subtask) -> SubtaskJson {
    SubtaskJson {
        id: subtask.id.clone(),
        title: subtask.title.clone(),
        completed: subtask.completed,
    }
}

pub fn category_to_json(category: &Category, pending: usize) -> CategoryJson {
    CategoryJson {
        id: category.id.clone(),
        name: category.name.clone(),
        color: category.color.clone(),
        pending,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn check_char(completed: bool) -> char {
    if completed { 'x' } else { ' ' }
}

/// One-line summary: checkbox, ID, padded title, subtask progress
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {}",
        check_char(task.completed),
        task.id,
        fit_to_width(&task.title, TITLE_WIDTH)
    );
    if !task.subtasks.is_empty() {
        line.push_str(&format!(
            " {}/{}",
            task.completed_subtasks(),
            task.subtasks.len()
        ));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", due));
    }
    line.trim_end().to_string()
}

pub fn format_subtask_line(subtask: &Subtask, indent: usize) -> String {
    format!(
        "{}[{}] {} {}",
        "  ".repeat(indent),
        check_char(subtask.completed),
        subtask.id,
        subtask.title
    )
}

/// Today's board: Important then Extra, subtasks under expanded tasks
pub fn format_today(
    date: NaiveDate,
    sections: &[(Section, Vec<&Task>)],
    is_expanded: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut lines = vec![format!("== Today ({}) ==", date)];
    for (section, tasks) in sections {
        lines.push(String::new());
        lines.push(format!("-- {} --", section.title()));
        if tasks.is_empty() {
            lines.push("  (nothing)".to_string());
            continue;
        }
        for task in tasks {
            lines.push(format!("  {}", format_task_line(task)));
            if is_expanded(&task.id) {
                for sub in &task.subtasks {
                    lines.push(format_subtask_line(sub, 3));
                }
            }
        }
    }
    lines
}

/// A category's unscheduled pool
pub fn format_category_listing(name: &str, category_id: &str, tasks: &[&Task]) -> Vec<String> {
    let mut lines = vec![format!("== {} ({}) ==", name, category_id)];
    for task in tasks {
        lines.push(format_task_line(task));
    }
    lines
}

/// Detailed task view
pub fn format_task_detail(task: &Task, section: Option<Section>) -> Vec<String> {
    let mut lines = vec![format!(
        "[{}] {} {}",
        check_char(task.completed),
        task.id,
        task.title
    )];

    if let Some(ref category) = task.category {
        lines.push(format!("category: {}", category));
    }
    if let Some(section) = section {
        lines.push(format!("today: {}", section));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("due: {}", due));
    }
    if let Some(day) = task.do_date {
        lines.push(format!("do: {}", day));
    }
    if task.is_ephemeral {
        lines.push("ephemeral: yes".to_string());
    }
    if let Some(ref priority) = task.priority {
        lines.push(format!("priority: {}", priority));
    }
    if !task.dependencies.is_empty() {
        lines.push(format!("dep: {}", task.dependencies.join(", ")));
    }
    if let Some(ref description) = task.description {
        lines.push("description:".to_string());
        for line in description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    if let Some(ref notes) = task.notes {
        lines.push("notes:".to_string());
        for line in notes.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if !task.subtasks.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "subtasks ({}/{}):",
            task.completed_subtasks(),
            task.subtasks.len()
        ));
        for sub in &task.subtasks {
            lines.push(format_subtask_line(sub, 1));
        }
    }

    lines
}

pub fn format_category_line(category: &Category, pending: usize) -> String {
    format!(
        "  {} ({}) {}  {} pending",
        category.name, category.id, category.color, pending
    )
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}
