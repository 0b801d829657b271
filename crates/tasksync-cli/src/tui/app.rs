//! Application state and logic

use std::time::{Duration, Instant};

use tasksync_core::{Task, TaskId, TaskListView};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Title input mode (after pressing a or e)
    Command,
}

/// What the title being typed will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Create a new task
    Create,
    /// Retitle an existing task
    Edit(TaskId),
}

/// Work handed to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Refresh,
    Toggle(TaskId),
    Delete(Task),
    Create(String),
    Edit(TaskId, String),
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Where a submitted title goes
    pub edit_target: Option<EditTarget>,
    /// Title input buffer
    pub command_input: String,
    /// Cursor position in the input, in characters
    pub command_cursor: usize,
    /// Latest view published by the controller
    pub view: TaskListView,
    /// Currently selected task index
    pub task_index: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Pending 'g' keypress for gg sequence (with timestamp)
    pub pending_g: Option<Instant>,
}

impl App {
    pub fn new(view: TaskListView) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            edit_target: None,
            command_input: String::new(),
            command_cursor: 0,
            view,
            task_index: 0,
            status_message: None,
            status_message_time: None,
            show_help: false,
            pending_g: None,
        }
    }

    /// Take a new view, keeping the selection on the same task when it survives
    pub fn apply_view(&mut self, view: TaskListView) {
        let selected = self.current_task().map(|t| t.id);
        self.view = view;

        self.task_index = selected
            .and_then(|id| self.view.tasks.iter().position(|t| t.id == id))
            .unwrap_or_else(|| self.task_index.min(self.view.tasks.len().saturating_sub(1)));
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Whether the error modal is showing
    pub fn has_error(&self) -> bool {
        self.view.error.is_some()
    }

    /// Get the currently selected task
    pub fn current_task(&self) -> Option<&Task> {
        self.view.tasks.get(self.task_index)
    }

    pub fn move_up(&mut self) {
        self.task_index = self.task_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.task_index < self.view.tasks.len().saturating_sub(1) {
            self.task_index += 1;
        }
    }

    /// Move selection to first task (vim 'gg')
    pub fn move_to_first(&mut self) {
        self.task_index = 0;
    }

    /// Move selection to last task (vim 'G')
    pub fn move_to_last(&mut self) {
        self.task_index = self.view.tasks.len().saturating_sub(1);
    }

    /// Toggle the selected task
    pub fn toggle_current(&self) -> Option<Intent> {
        self.current_task().map(|t| Intent::Toggle(t.id))
    }

    /// Delete the selected task
    pub fn delete_current(&self) -> Option<Intent> {
        self.current_task().cloned().map(Intent::Delete)
    }

    /// Enter title input for `target`
    ///
    /// Editing pre-fills the current title. Returns false if the task to edit
    /// is no longer in the view.
    pub fn enter_command_mode(&mut self, target: EditTarget) -> bool {
        let initial = match target {
            EditTarget::Create => String::new(),
            EditTarget::Edit(id) => match self.view.find(id) {
                Some(task) => task.title.clone(),
                None => return false,
            },
        };

        self.input_mode = InputMode::Command;
        self.edit_target = Some(target);
        self.command_cursor = initial.chars().count();
        self.command_input = initial;
        true
    }

    /// Exit title input
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.edit_target = None;
        self.command_input.clear();
        self.command_cursor = 0;
    }

    /// Finish title input, producing the intent for the current target
    pub fn submit_input(&mut self) -> Option<Intent> {
        let target = self.edit_target?;
        let title = self.command_input.trim().to_string();
        self.exit_input_mode();

        if title.is_empty() {
            self.set_status("Cancelled: title is empty");
            return None;
        }

        match target {
            EditTarget::Create => Some(Intent::Create(title)),
            EditTarget::Edit(id) => {
                if self.view.find(id).is_some_and(|t| t.title == title) {
                    return None;
                }
                Some(Intent::Edit(id, title))
            }
        }
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let at = self.cursor_byte_index();
        self.command_input.insert(at, c);
        self.command_cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.command_cursor > 0 {
            self.command_cursor -= 1;
            let at = self.cursor_byte_index();
            self.command_input.remove(at);
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.command_cursor = self.command_cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.command_cursor < self.command_input.chars().count() {
            self.command_cursor += 1;
        }
    }

    fn cursor_byte_index(&self) -> usize {
        self.command_input
            .char_indices()
            .nth(self.command_cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.command_input.len())
    }
}
