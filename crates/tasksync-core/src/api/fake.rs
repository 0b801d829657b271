//! In-memory task API used by controller tests

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{edit_path, task_path, TaskApi};
use crate::error::{ApiError, ApiResult};
use crate::models::{NewTask, Task, TaskId};

/// A request the fake received
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    List,
    Create(NewTask),
    Update(Task),
    Delete(TaskId),
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    next_id: TaskId,
    requests: Vec<Request>,
    list_failures: VecDeque<ApiError>,
    mutation_failures: VecDeque<ApiError>,
    list_gates: VecDeque<oneshot::Receiver<()>>,
}

/// Server stand-in that behaves like the real task API
#[derive(Default)]
pub struct FakeTaskApi {
    state: Mutex<State>,
}

impl FakeTaskApi {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(State {
                tasks,
                next_id,
                ..State::default()
            }),
        }
    }

    /// Server-side tasks
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// Replace server-side tasks (simulates another client)
    pub fn set_tasks(&self, tasks: Vec<Task>) {
        self.state.lock().tasks = tasks;
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    /// Number of list requests received
    pub fn list_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, Request::List))
            .count()
    }

    /// Mutation requests received, in order
    pub fn mutations(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| !matches!(r, Request::List))
            .collect()
    }

    /// Fail the next list request with `error`
    pub fn fail_next_list(&self, error: ApiError) {
        self.state.lock().list_failures.push_back(error);
    }

    /// Fail the next create/update/delete request with `error`
    pub fn fail_next_mutation(&self, error: ApiError) {
        self.state.lock().mutation_failures.push_back(error);
    }

    /// Hold the response of the next list request until the returned sender fires.
    ///
    /// The response content is captured when the request arrives.
    pub fn gate_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().list_gates.push_back(rx);
        tx
    }

    pub fn network_error(method: &'static str, path: &str) -> ApiError {
        ApiError::Network {
            method,
            path: path.to_string(),
            details: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl TaskApi for FakeTaskApi {
    async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let (result, gate) = {
            let mut state = self.state.lock();
            state.requests.push(Request::List);
            let result = match state.list_failures.pop_front() {
                Some(err) => Err(err),
                None => Ok(state.tasks.clone()),
            };
            (result, state.list_gates.pop_front())
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result
    }

    async fn create_task(&self, task: &NewTask) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.requests.push(Request::Create(task.clone()));
        if let Some(err) = state.mutation_failures.pop_front() {
            return Err(err);
        }
        let id = state.next_id;
        state.next_id += 1;
        state
            .tasks
            .push(Task::new(id, task.title.clone()).with_completed(task.completed));
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.requests.push(Request::Update(task.clone()));
        if let Some(err) = state.mutation_failures.pop_front() {
            return Err(err);
        }
        match state.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(())
            }
            None => Err(ApiError::Rejected {
                method: "PUT",
                path: edit_path(task.id),
                status: 404,
            }),
        }
    }

    async fn delete_task(&self, id: TaskId) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.requests.push(Request::Delete(id));
        if let Some(err) = state.mutation_failures.pop_front() {
            return Err(err);
        }
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(ApiError::Rejected {
                method: "DELETE",
                path: task_path(id),
                status: 404,
            });
        }
        Ok(())
    }
}
