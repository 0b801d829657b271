//! Interactive editing support
//!
//! Opens $EDITOR for retitling tasks and asks for confirmation before deletes.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::process::Command;

const EDIT_INSTRUCTIONS: &str = "\n\
# Enter the new task title on the first line.\n\
# Lines starting with '#' are ignored. An empty title aborts the edit.\n";

/// Open a task title in the user's preferred editor
///
/// Returns `None` when the buffer is left without a title.
pub fn edit_title(current: &str) -> Result<Option<String>> {
    let editor = find_editor()?;

    let temp_path = env::temp_dir().join(format!("tasks_edit_{}.txt", std::process::id()));
    fs::write(&temp_path, format!("{}\n{}", current, EDIT_INSTRUCTIONS))
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let status = Command::new(&editor)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        let _ = fs::remove_file(&temp_path);
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    let content = fs::read_to_string(&temp_path)
        .with_context(|| format!("Failed to read edited file: {:?}", temp_path))?;
    let _ = fs::remove_file(&temp_path);

    Ok(title_from_buffer(&content))
}

/// First non-comment, non-blank line of an editor buffer
fn title_from_buffer(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// Find the user's preferred editor
fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.is_empty() {
                return Ok(editor);
            }
        }
    }

    for editor in ["nano", "vim", "vi", "emacs"] {
        if command_exists(editor) {
            return Ok(editor.to_string());
        }
    }

    bail!(
        "No editor found. Set $EDITOR or pass the title on the command line.\n\
         Example: tasks edit 3 \"Buy oat milk\""
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_buffer() {
        let buffer = format!("Buy oat milk\n{}", EDIT_INSTRUCTIONS);
        assert_eq!(title_from_buffer(&buffer), Some("Buy oat milk".to_string()));

        // Leading blank lines and comments are skipped
        assert_eq!(
            title_from_buffer("\n# note\n   Walk dog  \nextra"),
            Some("Walk dog".to_string())
        );

        assert_eq!(title_from_buffer(EDIT_INSTRUCTIONS), None);
        assert_eq!(title_from_buffer(""), None);
    }

    #[test]
    fn test_command_exists() {
        #[cfg(unix)]
        assert!(command_exists("ls"));

        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }
}
