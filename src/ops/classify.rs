//! Pure filters over a task snapshot. No I/O, no triage state.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::task::Task;

/// Open tasks scheduled for `today`, in snapshot order.
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_due_on(today)).collect()
}

/// Open tasks of one category that are not on today's board.
///
/// A task scheduled for another day stays in its category pool; only
/// `do_date == today` takes it out.
pub fn by_category<'a>(tasks: &'a [Task], category_id: &str, today: NaiveDate) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !t.completed && t.in_category(category_id) && t.do_date != Some(today))
        .collect()
}

/// Open tasks not scheduled for today whose dependencies are all completed.
///
/// A dependency ID missing from the snapshot counts as unsatisfied.
pub fn available(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let completed: HashMap<&str, bool> = tasks
        .iter()
        .map(|t| (t.id.as_str(), t.completed))
        .collect();
    tasks
        .iter()
        .filter(|t| !t.completed && t.do_date != Some(today))
        .filter(|t| {
            t.dependencies
                .iter()
                .all(|dep| completed.get(dep.as_str()).copied().unwrap_or(false))
        })
        .collect()
}
