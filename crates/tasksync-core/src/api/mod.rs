//! Task API client
//!
//! The controller talks to the task server only through the [`TaskApi`]
//! trait. [`HttpTaskApi`] is the production implementation.
//!
//! ## Endpoints
//!
//! | Operation | Request                    |
//! |-----------|----------------------------|
//! | List      | `GET /api/tasks`           |
//! | Create    | `POST /api/tasks`          |
//! | Delete    | `DELETE /api/tasks/{id}`   |
//! | Update    | `PUT /api/tasks/edit/{id}` |

mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpTaskApi;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{NewTask, Task, TaskId};

/// Path of the task collection
pub const TASKS_PATH: &str = "/api/tasks";

/// Path of a single task (used for delete)
pub fn task_path(id: TaskId) -> String {
    format!("{}/{}", TASKS_PATH, id)
}

/// Path used to update a task
pub fn edit_path(id: TaskId) -> String {
    format!("{}/edit/{}", TASKS_PATH, id)
}

/// CRUD operations exposed by the task server
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetch every task, in server order
    async fn list_tasks(&self) -> ApiResult<Vec<Task>>;

    /// Create a task
    async fn create_task(&self, task: &NewTask) -> ApiResult<()>;

    /// Replace a task with the given full representation
    async fn update_task(&self, task: &Task) -> ApiResult<()>;

    /// Delete a task by id
    async fn delete_task(&self, id: TaskId) -> ApiResult<()>;
}
