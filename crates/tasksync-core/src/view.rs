//! Snapshot published to the presentation layer

use crate::error::SyncFailure;
use crate::models::{Task, TaskCounts, TaskId};
use crate::notice::NoticeKind;

/// Everything the presentation layer renders
///
/// `tasks` is always the verbatim result of the most recently applied
/// fetch; nothing edits it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListView {
    /// Current snapshot, in server order
    pub tasks: Vec<Task>,
    /// Sequence number of the fetch that produced `tasks` (0 before the first load)
    pub revision: u64,
    /// Whether any fetch has been applied yet
    pub loaded: bool,
    /// "Task deleted" notification is visible
    pub deleting: bool,
    /// An update was confirmed recently
    pub updating: bool,
    /// Fetches currently waiting for a response
    pub in_flight: usize,
    /// Most recent failure, until dismissed (load failures also clear on the next applied load)
    pub error: Option<SyncFailure>,
}

impl TaskListView {
    /// Counters for the header
    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(&self.tasks)
    }

    /// Whether there are no tasks to show
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether a fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Look up a task by id
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn set_notice(&mut self, kind: NoticeKind, visible: bool) {
        match kind {
            NoticeKind::Deleted => self.deleting = visible,
            NoticeKind::Updated => self.updating = visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_is_empty() {
        let view = TaskListView::default();
        assert!(view.is_empty());
        assert!(!view.loaded);
        assert!(!view.is_loading());
        assert!(!view.deleting);
        assert_eq!(view.revision, 0);
        assert_eq!(view.counts().total, 0);
    }

    #[test]
    fn test_find_and_counts() {
        let view = TaskListView {
            tasks: vec![Task::new(1, "a"), Task::new(2, "b").with_completed(true)],
            ..TaskListView::default()
        };
        assert_eq!(view.find(2).map(|t| t.title.as_str()), Some("b"));
        assert!(view.find(3).is_none());
        assert_eq!(view.counts().completed, 1);
    }

    #[test]
    fn test_set_notice() {
        let mut view = TaskListView::default();
        view.set_notice(NoticeKind::Deleted, true);
        assert!(view.deleting);
        assert!(!view.updating);
        view.set_notice(NoticeKind::Updated, true);
        view.set_notice(NoticeKind::Deleted, false);
        assert!(!view.deleting);
        assert!(view.updating);
    }
}
