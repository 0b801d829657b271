//! tasks TUI
//!
//! Terminal user interface for the task list.
//!
//! ## Layout
//!
//! - Top: counters (tasks created, completed)
//! - Middle: task list, or the empty state
//! - Bottom: status bar / title input
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move selection up/down
//! - gg / G: Jump to first / last task
//! - space or x: Toggle done
//! - a: Add task
//! - e: Edit title
//! - d: Delete task
//! - r: Refresh
//! - ?: Help
//! - q: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tasksync_core::{Config, TaskListController, TaskListView};
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use app::{App, EditTarget, InputMode, Intent};

/// Run the TUI application
pub async fn run(controller: TaskListController) -> Result<()> {
    let mut view_rx = controller.subscribe();
    let mut app = App::new(view_rx.borrow_and_update().clone());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Mount-time load; the result arrives through the view channel
    let loader = controller.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.start().await {
            debug!("Initial load failed: {}", e);
        }
    });

    let result = run_app(&mut terminal, &mut app, &controller, &mut view_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    controller: &TaskListController,
    view_rx: &mut watch::Receiver<TaskListView>,
) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                app.apply_view(view);
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // If error modal is showing, any key dismisses it
                        if app.has_error() {
                            controller.clear_error();
                            continue;
                        }

                        // If help is showing, any key dismisses it
                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        let intent = match app.input_mode {
                            InputMode::Normal => handle_normal_mode(app, key.code, key.modifiers),
                            InputMode::Command => handle_command_mode(app, key.code),
                        };

                        if let Some(intent) = intent {
                            dispatch(controller, intent);
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Intent> {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Char('g')
            | KeyCode::Char('G')
    ) {
        app.status_message = None;
    }

    // Clear pending 'g' if timeout expired (500ms)
    if let Some(time) = app.pending_g {
        if time.elapsed() > Duration::from_millis(500) {
            app.pending_g = None;
        }
    }

    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),

        // gg: jump to first
        KeyCode::Char('g') => {
            if app.pending_g.take().is_some() {
                app.move_to_first();
            } else {
                app.pending_g = Some(std::time::Instant::now());
            }
        }
        KeyCode::Char('G') => app.move_to_last(),

        KeyCode::Char(' ') | KeyCode::Char('x') => return app.toggle_current(),
        KeyCode::Char('d') => return app.delete_current(),
        KeyCode::Char('r') => {
            app.set_status("Refreshing...");
            return Some(Intent::Refresh);
        }

        KeyCode::Char('a') => {
            app.enter_command_mode(EditTarget::Create);
        }
        KeyCode::Char('e') => {
            if let Some(id) = app.current_task().map(|t| t.id) {
                app.enter_command_mode(EditTarget::Edit(id));
            }
        }

        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc => {
            app.status_message = None;
        }
        _ => {}
    }

    None
}

/// Handle key events in title input mode
fn handle_command_mode(app: &mut App, code: KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Esc => app.exit_input_mode(),
        KeyCode::Enter => return app.submit_input(),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
    None
}

/// Run an intent in the background
///
/// Outcomes reach the screen through the view channel, failures included.
fn dispatch(controller: &TaskListController, intent: Intent) {
    let controller = controller.clone();
    tokio::spawn(async move {
        let result = match intent {
            Intent::Refresh => controller.refresh().await.map(|_| ()),
            Intent::Toggle(id) => controller.toggle_task_completion(id).await.map(|_| ()),
            Intent::Delete(task) => controller.delete_task(&task).await,
            Intent::Create(title) => controller.create_task(&title).await,
            Intent::Edit(id, title) => controller.edit_task(id, &title).await.map(|_| ()),
        };
        if let Err(e) = result {
            debug!("Task action failed: {}", e);
        }
    });
}

/// Initialize logging for TUI mode
///
/// Only initializes if TASKS_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_local_dir}/tasksync/debug.log).
pub fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("TASKS_LOG") else {
        return;
    };

    let log_path = config.log_file_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "tasksync_core={},tasksync_cli={}",
        log_level, log_level
    ));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
