//! Task command handlers

use anyhow::{bail, Context, Result};

use tasksync_core::{Task, TaskId, TaskListController, UpdateOutcome};

use crate::editor::{confirm, edit_title};
use crate::output::Output;

/// List all tasks in server order
pub async fn list(controller: &TaskListController, output: &Output) -> Result<()> {
    load(controller).await?;
    output.print_tasks(&controller.view().tasks);
    Ok(())
}

/// Create a new task
pub async fn add(controller: &TaskListController, title: String, output: &Output) -> Result<()> {
    controller
        .create_task(&title)
        .await
        .context("Failed to create task")?;

    output.success(&format!("Created task: {}", title.trim()));
    warn_stale(controller, output);
    output.print_tasks(&controller.view().tasks);

    Ok(())
}

/// Flip a task between done and not done
pub async fn toggle(controller: &TaskListController, id: TaskId, output: &Output) -> Result<()> {
    load(controller).await?;

    let outcome = controller
        .toggle_task_completion(id)
        .await
        .context("Failed to update task")?;

    match outcome {
        UpdateOutcome::Sent(task) => {
            let state = if task.completed { "done" } else { "not done" };
            output.success(&format!("Marked task {} as {}", id, state));
            warn_stale(controller, output);
            output.print_task(&task);
            Ok(())
        }
        UpdateOutcome::NotFound => bail!("Task not found: {}", id),
    }
}

/// Retitle a task, opening $EDITOR when no title is given
pub async fn edit(
    controller: &TaskListController,
    id: TaskId,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    load(controller).await?;
    let task = find(controller, id)?;

    let title = match title {
        Some(title) => title,
        None => match edit_title(&task.title)? {
            Some(title) => title,
            None => {
                output.message("Edit cancelled.");
                return Ok(());
            }
        },
    };

    if title.trim() == task.title {
        output.message("Title unchanged.");
        return Ok(());
    }

    let outcome = controller
        .edit_task(id, &title)
        .await
        .context("Failed to update task")?;

    match outcome {
        UpdateOutcome::Sent(task) => {
            output.success(&format!("Updated task {}", id));
            warn_stale(controller, output);
            output.print_task(&task);
            Ok(())
        }
        UpdateOutcome::NotFound => bail!("Task not found: {}", id),
    }
}

/// Delete a task
pub async fn delete(
    controller: &TaskListController,
    id: TaskId,
    force: bool,
    output: &Output,
) -> Result<()> {
    load(controller).await?;
    let task = find(controller, id)?;

    if output.should_prompt() && !force {
        println!("Delete task: {} - {}", task.id, task.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    controller
        .delete_task(&task)
        .await
        .context("Failed to delete task")?;

    output.success(&format!("Deleted task: {}", id));
    warn_stale(controller, output);

    Ok(())
}

async fn load(controller: &TaskListController) -> Result<()> {
    controller.start().await.context("Failed to load tasks")?;
    Ok(())
}

fn find(controller: &TaskListController, id: TaskId) -> Result<Task> {
    controller
        .view()
        .find(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
}

/// The mutation went through but the follow-up refresh did not
fn warn_stale(controller: &TaskListController, output: &Output) {
    if let Some(failure) = controller.view().error {
        if !output.is_quiet() {
            eprintln!("⚠ {}", failure.summary());
        }
    }
}
