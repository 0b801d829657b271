//! tasks CLI
//!
//! Command-line and terminal interface for a remote to-do list.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tasksync_core::{Config, HttpTaskApi, TaskId, TaskListController};

mod commands;
mod editor;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "tasks")]
#[command(about = "Keep a to-do list in sync with a task server")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Task server base URL (overrides config and TASKS_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List all tasks
    #[command(alias = "ls")]
    List,
    /// Create a new task
    #[command(alias = "create")]
    Add {
        /// Task title
        title: String,
    },
    /// Change a task's title
    Edit {
        /// Task ID
        id: TaskId,
        /// New title (opens editor if not provided)
        title: Option<String>,
    },
    /// Toggle a task between done and not done
    Toggle {
        /// Task ID
        id: TaskId,
    },
    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task ID
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, delete_notice_ms, update_notice_ms, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need a server
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = Some(url);
    }

    let is_tui = matches!(&cli.command, Some(Commands::Tui) | None);
    if is_tui {
        tui::init_tui_logging(&config);
    } else {
        init_cli_logging();
    }

    let controller = build_controller(&config)?;

    match cli.command {
        None | Some(Commands::Tui) => tui::run(controller).await,
        Some(Commands::List) => commands::task::list(&controller, &output).await,
        Some(Commands::Add { title }) => commands::task::add(&controller, title, &output).await,
        Some(Commands::Edit { id, title }) => {
            commands::task::edit(&controller, id, title, &output).await
        }
        Some(Commands::Toggle { id }) => commands::task::toggle(&controller, id, &output).await,
        Some(Commands::Delete { id, force }) => {
            commands::task::delete(&controller, id, force, &output).await
        }
        Some(Commands::Config { .. }) => unreachable!(), // Handled above
    }
}

fn build_controller(config: &Config) -> Result<TaskListController> {
    let api = HttpTaskApi::new(config.require_api_url()?, config.request_timeout())?;
    Ok(TaskListController::new(Arc::new(api), config.sync_options()))
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging for one-shot commands
///
/// Only initializes if TASKS_LOG environment variable is set. Logs go to
/// stderr so they never mix with command output.
fn init_cli_logging() {
    let Ok(log_level) = std::env::var("TASKS_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "tasksync_core={},tasksync_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
