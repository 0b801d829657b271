//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthStr;

use super::app::{App, EditTarget, InputMode};
use crate::output::{EMPTY_HINT, EMPTY_TITLE};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_tasks(frame, app, chunks[1]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, chunks[2]),
        InputMode::Command => draw_command_input(frame, app, chunks[2]),
    }

    if app.view.deleting {
        draw_deleted_popup(frame, chunks[1]);
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(failure) = &app.view.error {
        draw_error_modal(frame, &failure.summary(), failure.kind.recovery_suggestion());
    }
}

/// Counters above the list
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let counts = app.view.counts();

    let line = Line::from(vec![
        Span::styled("Tasks created ", Style::default().fg(Color::Cyan)),
        Span::styled(
            counts.total.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("    "),
        Span::styled("Completed ", Style::default().fg(Color::Magenta)),
        Span::styled(
            format!("{} of {}", counts.completed, counts.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);

    let block = Block::default().title(" tasks ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Task rows, or the empty state
fn draw_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL);

    if !app.view.loaded && app.view.is_loading() {
        let paragraph = Paragraph::new("Loading tasks...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    if app.view.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                EMPTY_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                EMPTY_HINT,
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .view
        .tasks
        .iter()
        .map(|task| {
            let (mark, title_style) = if task.completed {
                (
                    Span::styled("(●) ", Style::default().fg(Color::Magenta)),
                    Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM),
                )
            } else {
                (
                    Span::styled("( ) ", Style::default().fg(Color::Cyan)),
                    Style::default(),
                )
            };

            ListItem::new(Line::from(vec![
                mark,
                Span::styled(task.title.clone(), title_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.task_index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (content, style) = if let Some(msg) = &app.status_message {
        (msg.clone(), Style::default().add_modifier(Modifier::DIM))
    } else if app.view.updating {
        ("✓ Saved".to_string(), Style::default().fg(Color::Green))
    } else if app.view.loaded && app.view.is_loading() {
        (
            "Refreshing...".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )
    } else {
        (
            "a:add  e:edit  space:toggle  d:del  r:refresh  ?:help  q:quit".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )
    };

    frame.render_widget(Paragraph::new(content).style(style), area);
}

/// Draw title input at the bottom
fn draw_command_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = match app.edit_target {
        Some(EditTarget::Edit(_)) => "Edit task: ",
        _ => "New task: ",
    };

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Yellow)),
        Span::raw(app.command_input.as_str()),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    let cursor_x = cursor_column(area, prefix, &app.command_input, app.command_cursor);
    frame.set_cursor_position((cursor_x, area.y));
}

/// Screen column of the input cursor, kept inside `area`
fn cursor_column(area: Rect, prefix: &str, input: &str, cursor: usize) -> u16 {
    let before: String = input.chars().take(cursor).collect();
    let offset = u16::try_from(prefix.width() + before.width()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(offset)
        .min(area.right().saturating_sub(1))
}

/// "Task deleted" notice in the bottom-right corner of the list
fn draw_deleted_popup(frame: &mut Frame, area: Rect) {
    let width = 18.min(area.width);
    let height = 3.min(area.height);
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    );

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let paragraph = Paragraph::new("Task deleted")
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Draw the error modal
fn draw_error_modal(frame: &mut Frame, summary: &str, suggestion: Option<&str>) {
    let popup_area = centered(frame.area(), 60, 8);
    frame.render_widget(Clear, popup_area);

    let mut text = vec![Line::from(summary.to_string()), Line::from("")];
    if let Some(suggestion) = suggestion {
        text.push(Line::from(Span::styled(
            suggestion.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    text.push(Line::from(Span::styled(
        "Press any key to dismiss",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 44, 18);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  gg          Jump to first task"),
        Line::from("  G           Jump to last task"),
        Line::from(""),
        Line::from("Commands:"),
        Line::from("  a           Add task"),
        Line::from("  e           Edit title"),
        Line::from("  space, x    Toggle done"),
        Line::from("  d           Delete task"),
        Line::from("  r           Refresh"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}
