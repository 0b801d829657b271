//! List synchronization controller
//!
//! Keeps a local snapshot of the server's task list and turns user intents
//! into API calls followed by an explicit refresh.
//!
//! ## Consistency rules
//!
//! - The snapshot is replaced wholesale by fetch results and never edited in
//!   place. Every visible change waits for a round trip.
//! - Each fetch takes a monotonically increasing sequence number; a response
//!   is applied only if it is newer than the one currently shown
//!   (take-latest). Older responses are discarded.
//! - Updates to the same task are serialized, so an update computes its new
//!   representation from a snapshot that already reflects the previous one.
//! - Only list fetches are retried, and only on transport failures.
//!
//! ## Usage
//!
//! ```ignore
//! let controller = TaskListController::new(Arc::new(api), SyncOptions::default());
//! let mut view = controller.subscribe();
//! controller.start().await?;
//! controller.toggle_task_completion(1).await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{watch, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::api::TaskApi;
use crate::error::{ApiError, Operation, SyncError, SyncFailure, SyncResult};
use crate::models::{NewTask, Task, TaskId};
use crate::notice::{NoticeKind, NoticeTimer};
use crate::view::TaskListView;

/// Timing and retry settings for the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// How long the "Task deleted" notice stays visible
    pub delete_notice: Duration,
    /// How long the update-confirmed flag stays set
    pub update_notice: Duration,
    /// Total attempts for a list fetch (1 = no retry)
    pub fetch_attempts: u32,
    /// Delay before the first fetch retry
    pub retry_initial_delay: Duration,
    /// Upper bound for the fetch retry delay
    pub retry_max_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            delete_notice: Duration::from_millis(3000),
            update_notice: Duration::from_millis(1000),
            fetch_attempts: 3,
            retry_initial_delay: Duration::from_millis(250),
            retry_max_delay: Duration::from_secs(4),
        }
    }
}

/// Result of a list fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the snapshot
    Applied { revision: u64, count: usize },
    /// A newer fetch had already been applied; the response was discarded
    Superseded { revision: u64 },
}

/// Result of a toggle or edit
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The update was accepted; carries the representation that was sent
    Sent(Task),
    /// The task is not in the current snapshot; nothing was sent
    NotFound,
}

struct Inner {
    api: Arc<dyn TaskApi>,
    options: SyncOptions,
    view: Arc<watch::Sender<TaskListView>>,
    /// Last sequence number handed out to a fetch
    next_seq: AtomicU64,
    /// Serializes updates per task
    task_locks: TaskLocks,
    deleted_notice: NoticeTimer,
    updated_notice: NoticeTimer,
}

/// Owns the task list snapshot and the notification state
///
/// Cloning is cheap; clones share state, so intents can be spawned onto the
/// runtime while the UI keeps rendering. Pending notification timers are
/// cancelled when the last clone is dropped.
#[derive(Clone)]
pub struct TaskListController {
    inner: Arc<Inner>,
}

impl TaskListController {
    /// Create a controller with an empty snapshot
    pub fn new(api: Arc<dyn TaskApi>, options: SyncOptions) -> Self {
        let (tx, _rx) = watch::channel(TaskListView::default());
        let view = Arc::new(tx);

        let deleted_notice =
            NoticeTimer::new(NoticeKind::Deleted, options.delete_notice, Arc::clone(&view));
        let updated_notice =
            NoticeTimer::new(NoticeKind::Updated, options.update_notice, Arc::clone(&view));

        Self {
            inner: Arc::new(Inner {
                api,
                options,
                view,
                next_seq: AtomicU64::new(0),
                task_locks: Mutex::new(HashMap::new()),
                deleted_notice,
                updated_notice,
            }),
        }
    }

    /// Controller settings
    pub fn options(&self) -> &SyncOptions {
        &self.inner.options
    }

    /// Subscribe to view changes
    pub fn subscribe(&self) -> watch::Receiver<TaskListView> {
        self.inner.view.subscribe()
    }

    /// Copy of the current view
    pub fn view(&self) -> TaskListView {
        self.inner.view.borrow().clone()
    }

    /// Initial load, performed when the list is first shown
    pub async fn start(&self) -> SyncResult<LoadOutcome> {
        debug!("Starting task list controller");
        self.load_tasks().await
    }

    /// Re-fetch the list on request
    pub async fn refresh(&self) -> SyncResult<LoadOutcome> {
        self.load_tasks().await
    }

    /// Fetch the task list and apply it if nothing newer has been applied
    pub async fn load_tasks(&self) -> SyncResult<LoadOutcome> {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Fetching tasks (seq {})", seq);
        self.inner.view.send_modify(|v| v.in_flight += 1);

        let result = self.fetch_with_retry().await;

        match result {
            Ok(tasks) => {
                let count = tasks.len();
                let mut superseded_by = None;
                self.inner.view.send_modify(|v| {
                    v.in_flight = v.in_flight.saturating_sub(1);
                    if seq > v.revision {
                        v.tasks = tasks;
                        v.revision = seq;
                        v.loaded = true;
                        // Mutation failures stay until dismissed
                        if v.error.as_ref().is_some_and(|e| e.operation == Operation::Load) {
                            v.error = None;
                        }
                    } else {
                        superseded_by = Some(v.revision);
                    }
                });

                match superseded_by {
                    None => {
                        info!("Applied task list: {} task(s) (seq {})", count, seq);
                        Ok(LoadOutcome::Applied {
                            revision: seq,
                            count,
                        })
                    }
                    Some(revision) => {
                        debug!("Discarded task list (seq {}, showing seq {})", seq, revision);
                        Ok(LoadOutcome::Superseded { revision })
                    }
                }
            }
            Err(e) => {
                let err = SyncError::from(e);
                warn!("Loading tasks failed (seq {}): {}", seq, err);
                let failure = SyncFailure::new(Operation::Load, &err);
                self.inner.view.send_modify(|v| {
                    v.in_flight = v.in_flight.saturating_sub(1);
                    if seq > v.revision {
                        v.error = Some(failure);
                    }
                });
                Err(err)
            }
        }
    }

    /// Delete a task, show the "deleted" notice, and refresh
    ///
    /// The notice is shown only when the server confirms the delete.
    pub async fn delete_task(&self, task: &Task) -> SyncResult<()> {
        info!("Deleting task {}", task.id);

        if let Err(e) = self.inner.api.delete_task(task.id).await {
            return Err(self.mutation_failed(Operation::Delete, e));
        }

        self.inner.deleted_notice.show();
        self.refresh_after(Operation::Delete).await;
        Ok(())
    }

    /// Invert the completion flag of a task in the current snapshot
    ///
    /// Does nothing (and sends nothing) if the id is not in the snapshot.
    pub async fn toggle_task_completion(&self, task_id: TaskId) -> SyncResult<UpdateOutcome> {
        self.update_with(task_id, Task::toggled).await
    }

    /// Change the title of a task in the current snapshot
    pub async fn edit_task(&self, task_id: TaskId, title: &str) -> SyncResult<UpdateOutcome> {
        let title = self.validate_title(Operation::Update, title)?;
        self.update_with(task_id, move |task| task.retitled(title))
            .await
    }

    /// Create a task and refresh
    pub async fn create_task(&self, title: &str) -> SyncResult<()> {
        let title = self.validate_title(Operation::Create, title)?;
        info!("Creating task '{}'", title);

        if let Err(e) = self.inner.api.create_task(&NewTask::new(title)).await {
            return Err(self.mutation_failed(Operation::Create, e));
        }

        self.refresh_after(Operation::Create).await;
        Ok(())
    }

    /// Dismiss the current error
    pub fn clear_error(&self) {
        self.inner.view.send_if_modified(|v| v.error.take().is_some());
    }

    /// Serialized read-modify-write of one task
    async fn update_with<F>(&self, task_id: TaskId, change: F) -> SyncResult<UpdateOutcome>
    where
        F: FnOnce(&Task) -> Task + Send,
    {
        let _slot = self.lock_task(task_id).await;

        let current = self.inner.view.borrow().find(task_id).cloned();
        let Some(current) = current else {
            debug!("Task {} not in snapshot, skipping update", task_id);
            return Ok(UpdateOutcome::NotFound);
        };

        let updated = change(&current);
        info!(
            "Updating task {} (completed: {} -> {})",
            task_id, current.completed, updated.completed
        );

        if let Err(e) = self.inner.api.update_task(&updated).await {
            return Err(self.mutation_failed(Operation::Update, e));
        }

        self.inner.updated_notice.show();
        self.refresh_after(Operation::Update).await;
        Ok(UpdateOutcome::Sent(updated))
    }

    /// List fetch with exponential backoff on transport failures
    async fn fetch_with_retry(&self) -> Result<Vec<Task>, ApiError> {
        let options = &self.inner.options;
        let attempts = options.fetch_attempts.max(1);
        let mut delay = options.retry_initial_delay;
        let mut attempt = 1;

        loop {
            match self.inner.api.list_tasks().await {
                Ok(tasks) => return Ok(tasks),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(
                        "Fetching tasks failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt, attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_retry_delay(delay, options.retry_max_delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Refresh following a confirmed mutation
    ///
    /// A failed refresh is already recorded in the view, so the mutation
    /// itself still reports success.
    async fn refresh_after(&self, operation: Operation) {
        if let Err(e) = self.load_tasks().await {
            warn!("Refresh after {} failed: {}", operation, e);
        }
    }

    fn mutation_failed(&self, operation: Operation, error: ApiError) -> SyncError {
        let err = SyncError::from(error);
        warn!("Failed to {}: {}", operation, err);
        self.record_failure(operation, &err);
        err
    }

    fn record_failure(&self, operation: Operation, err: &SyncError) {
        let failure = SyncFailure::new(operation, err);
        self.inner.view.send_modify(|v| v.error = Some(failure));
    }

    fn validate_title(&self, operation: Operation, title: &str) -> SyncResult<String> {
        let title = title.trim();
        if title.is_empty() {
            let err = SyncError::InvalidInput("title must not be empty".to_string());
            self.record_failure(operation, &err);
            return Err(err);
        }
        Ok(title.to_string())
    }

    /// Wait for exclusive update access to one task
    async fn lock_task(&self, task_id: TaskId) -> TaskSlot<'_> {
        let lock = Arc::clone(self.inner.task_locks.lock().entry(task_id).or_default());
        let guard = lock.lock_owned().await;
        TaskSlot {
            locks: &self.inner.task_locks,
            task_id,
            guard: Some(guard),
        }
    }

    /// Number of tasks with a live update lock
    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.inner.task_locks.lock().len()
    }
}

type TaskLocks = Mutex<HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive update access to one task
///
/// Releasing the last holder removes the task's entry from the lock map.
struct TaskSlot<'a> {
    locks: &'a TaskLocks,
    task_id: TaskId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TaskSlot<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Waiters clone the Arc under this lock, so a count of 1 means nobody is queued
        let mut locks = self.locks.lock();
        if locks
            .get(&self.task_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.task_id);
        }
    }
}

/// Double the retry delay, capped at `max`
fn next_retry_delay(delay: Duration, max: Duration) -> Duration {
    delay.saturating_mul(2).min(max)
}

impl std::fmt::Debug for TaskListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskListController")
            .field("options", &self.inner.options)
            .field("view", &*self.inner.view.borrow())
            .finish()
    }
}
