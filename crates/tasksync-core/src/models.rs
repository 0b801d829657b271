//! Data models for tasksync
//!
//! Defines the task representation exchanged with the task API and the
//! small summaries derived from a task list snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier assigned to a task by the task API
pub type TaskId = i64;

/// A to-do item as returned by the task API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier (assigned by the API, never changes)
    pub id: TaskId,
    /// Display text
    pub title: String,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
    /// Fields the API returns that this client does not interpret.
    ///
    /// Kept so a full-representation update sends them back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Create a task with the given id and title
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            extra: Map::new(),
        }
    }

    /// Builder-style completion flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Copy of this task with the completion flag inverted
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this task with a new title
    pub fn retitled(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// Request body for creating a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub completed: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

/// Counters shown above the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// Number of tasks in the snapshot
    pub total: usize,
    /// Number of completed tasks in the snapshot
    pub completed: usize,
}

impl TaskCounts {
    /// Count tasks in a snapshot
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks.iter().filter(|t| t.completed).count(),
        }
    }
}

impl std::fmt::Display for TaskCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} completed", self.completed, self.total)
    }
}
