/// In-memory mirror of the current user's tasks
///
/// One ordered `Vec<Task>`; positions are what the list view shows.

use crate::db::Task;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// What the list view has to redraw after a mirror change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// Everything changed, redraw the whole list
    Reset,
    /// One row disappeared at this position
    Removed { index: usize },
}

/// Actions offered on long-press of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    ShowTime,
    Delete,
}

impl ContextAction {
    pub const ALL: &'static [ContextAction] = &[ContextAction::ShowTime, ContextAction::Delete];

    pub fn label(&self) -> &str {
        match self {
            ContextAction::ShowTime => "Show time",
            ContextAction::Delete => "Delete",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throw away the mirror and take the store's rows as-is
    pub fn replace(&mut self, tasks: Vec<Task>) -> ListChange {
        self.tasks = tasks;
        ListChange::Reset
    }

    pub fn clear(&mut self) -> ListChange {
        self.replace(Vec::new())
    }

    /// Remove the task at `index`
    ///
    /// Out of range leaves the list untouched and returns `None`.
    pub fn remove_at(&mut self, index: usize) -> Option<(Task, ListChange)> {
        if index >= self.tasks.len() {
            return None;
        }
        let task = self.tasks.remove(index);
        Some((task, ListChange::Removed { index }))
    }

    pub fn position_of(&self, task_id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }
}

/// Everything the edit screen needs to show one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub id: i64,
    #[serde(rename = "task")]
    pub title: String,
    pub priority: String,
    pub time: String,
    pub schedule_date: String,
    pub schedule_time: String,
}

impl EditRequest {
    /// Flat key/value form handed across screens
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.to_string()),
            ("task", self.title.clone()),
            ("priority", self.priority.clone()),
            ("time", self.time.clone()),
            ("scheduleDate", self.schedule_date.clone()),
            ("scheduleTime", self.schedule_time.clone()),
        ]
    }

    /// The same bag as a JSON object, keys as in `to_params`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<&Task> for EditRequest {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            priority: task.priority.clone(),
            time: task.time.clone(),
            schedule_date: task.schedule_date.clone(),
            schedule_time: task.schedule_time.clone(),
        }
    }
}
