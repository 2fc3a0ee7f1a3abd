use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::api::ExpiryState;
use crate::tui::app::{App, ConfirmAction, Mode, View};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = left_spans(app);
    let hint = right_hint(app);

    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hint_width: usize = hint.iter().map(|s| s.content.chars().count()).sum();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
    }
    spans.extend(hint);

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Left side: confirm prompt, move hint, transient message, or board counts.
fn left_spans(app: &App) -> Vec<Span<'static>> {
    let bg = app.theme.background;

    if app.mode == Mode::Confirm {
        if let Some(action) = &app.confirm {
            let prompt = match action {
                ConfirmAction::DeleteTask { title, .. } => {
                    format!(" delete task '{title}'? ")
                }
                ConfirmAction::DeleteRef { kind, name, .. } => {
                    format!(" delete {} '{name}'? ", kind.singular())
                }
                ConfirmAction::DeleteNote { .. } => " delete note? ".to_string(),
            };
            return vec![
                Span::styled(
                    prompt,
                    Style::default()
                        .fg(app.theme.text_bright)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("y/N", Style::default().fg(app.theme.yellow).bg(bg)),
            ];
        }
    }

    if app.mode == Mode::Move {
        let title = app
            .drag
            .dragging()
            .and_then(|(task_id, _)| app.tasks.get(task_id))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        return vec![
            Span::styled(" moving ", Style::default().fg(app.theme.highlight).bg(bg)),
            Span::styled(
                format!("'{title}'"),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
        ];
    }

    if let Some(message) = &app.status_message {
        let fg = if app.status_is_error {
            app.theme.red
        } else {
            app.theme.text
        };
        return vec![Span::styled(
            format!(" {message}"),
            Style::default().fg(fg).bg(bg),
        )];
    }

    if app.view == View::Board && app.mode == Mode::Navigate {
        let (visible, board) = app.board();
        let total = app.tasks.tasks().len();
        let shown = visible.len();
        let mut text = format!(" {shown}/{total} tasks");
        if board.off_board > 0 {
            text.push_str(&format!(", {} off board", board.off_board));
        }
        return vec![Span::styled(
            text,
            Style::default().fg(app.theme.dim).bg(bg),
        )];
    }

    Vec::new()
}

/// Right side: expiry countdown takes priority over key hints.
fn right_hint(app: &App) -> Vec<Span<'static>> {
    let bg = app.theme.background;

    if app.view != View::Login {
        if let Some(session) = app.client.session() {
            if let ExpiryState::Warning { remaining_secs } =
                session.expiry_state(Utc::now(), app.config.expiry_warning_secs)
            {
                return vec![Span::styled(
                    format!("session expires in {remaining_secs}s — press g to renew "),
                    Style::default()
                        .fg(app.theme.yellow)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                )];
            }
        }
    }

    let hint = match app.mode {
        Mode::Navigate => match app.view {
            View::Login => "",
            View::Board => "m move  f filter  v by-assignee  ? help ",
            View::Notes => "n new  e edit  d delete  ? help ",
            View::Admin(_) => "h/l kind  n new  e edit  d delete  ? help ",
        },
        Mode::EditTask => "Ctrl-S save  Ctrl-N subtask  Esc cancel ",
        Mode::EditRef | Mode::EditNote => "Ctrl-S save  Esc cancel ",
        Mode::Filter => "Tab dimension  Space toggle  c clear  Esc close ",
        Mode::Move => "h/l pick column  Enter drop  Esc cancel ",
        Mode::Confirm => "",
        Mode::Login => "Tab next field  Enter submit  Ctrl-Q quit ",
    };
    if hint.is_empty() {
        return Vec::new();
    }
    vec![Span::styled(
        hint.to_string(),
        Style::default().fg(app.theme.dim).bg(bg),
    )]
}
