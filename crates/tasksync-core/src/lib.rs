//! tasksync Core Library
//!
//! This crate keeps a local, displayable copy of a to-do list in step with a
//! REST task API.
//!
//! # Architecture
//!
//! - **Task API**: source of truth. The client only holds snapshots.
//! - **Controller**: fetches snapshots, sends mutations, refreshes after each
//!   confirmed mutation, and publishes a [`TaskListView`] over a watch channel.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let api = HttpTaskApi::new(config.require_api_url()?, config.request_timeout())?;
//! let controller = TaskListController::new(Arc::new(api), config.sync_options());
//!
//! controller.start().await?;
//! controller.toggle_task_completion(1).await?;
//! let view = controller.view();
//! ```
//!
//! # Modules
//!
//! - `controller`: List synchronization controller (main entry point)
//! - `api`: Task API trait and HTTP client
//! - `models`: Task data structures
//! - `view`: Snapshot published to the presentation layer
//! - `notice`: Transient notification timers
//! - `error`: Typed errors and failure taxonomy
//! - `config`: Application configuration

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod notice;
pub mod view;

pub use api::{HttpTaskApi, TaskApi};
pub use config::Config;
pub use controller::{LoadOutcome, SyncOptions, TaskListController, UpdateOutcome};
pub use error::{ApiError, FailureKind, Operation, SyncError, SyncFailure};
pub use models::{NewTask, Task, TaskCounts, TaskId};
pub use notice::NoticeKind;
pub use view::TaskListView;
