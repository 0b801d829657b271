//! Transient notification timers
//!
//! Each notification kind owns one [`NoticeTimer`]. Showing a notice sets its
//! flag in the published view and schedules a single dismissal. Showing it
//! again before the dismissal fires cancels the pending one and starts a new
//! window. Dropping the timer cancels any pending dismissal.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::view::TaskListView;

/// Kinds of transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A task was deleted
    Deleted,
    /// A task update was confirmed
    Updated,
}

#[derive(Default)]
struct Pending {
    /// Bumped on every show; a dismissal only applies to its own generation
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Cancellable dismissal timer for one notification kind
pub(crate) struct NoticeTimer {
    kind: NoticeKind,
    duration: Duration,
    view: Arc<watch::Sender<TaskListView>>,
    pending: Arc<Mutex<Pending>>,
}

impl NoticeTimer {
    pub(crate) fn new(
        kind: NoticeKind,
        duration: Duration,
        view: Arc<watch::Sender<TaskListView>>,
    ) -> Self {
        Self {
            kind,
            duration,
            view,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Show the notice and (re)start its dismissal window
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn show(&self) {
        let mut pending = self.pending.lock();
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
        pending.generation += 1;

        let kind = self.kind;
        self.view.send_modify(|v| v.set_notice(kind, true));

        let generation = pending.generation;
        let deadline = tokio::time::Instant::now() + self.duration;
        let view = Arc::clone(&self.view);
        let shared = Arc::clone(&self.pending);

        pending.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let mut pending = shared.lock();
            if pending.generation == generation {
                view.send_modify(|v| v.set_notice(kind, false));
                pending.handle = None;
                debug!("{:?} notice dismissed", kind);
            }
        }));
    }

    /// Whether a dismissal is scheduled
    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.lock().handle.is_some()
    }
}

impl Drop for NoticeTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.lock().handle.take() {
            handle.abort();
        }
    }
}
