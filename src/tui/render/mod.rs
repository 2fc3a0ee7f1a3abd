pub mod admin_view;
pub mod board_view;
pub mod filter_panel;
pub mod help_overlay;
pub mod login_view;
pub mod notes_view;
pub mod status_row;
pub mod tab_bar;
pub mod task_form;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;

use super::app::{App, Mode, View};
use super::theme::Theme;

/// Top-level render: layout, view dispatch, overlays, status row last.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);

    match app.view {
        View::Login => login_view::render_login_view(frame, app, chunks[1]),
        View::Board => board_view::render_board_view(frame, app, chunks[1]),
        View::Notes => notes_view::render_notes_view(frame, app, chunks[1]),
        View::Admin(kind) => admin_view::render_admin_view(frame, app, kind, chunks[1]),
    }

    // Editing overlays sit on top of the content area
    match app.mode {
        Mode::EditTask => task_form::render_task_form(frame, app, chunks[1]),
        Mode::EditRef => admin_view::render_ref_form(frame, app, chunks[1]),
        Mode::EditNote => notes_view::render_note_form(frame, app, chunks[1]),
        Mode::Filter => filter_panel::render_filter_panel(frame, app, chunks[1]),
        _ => {}
    }

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

/// Create a centered rectangle of the given percentage of the parent
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Spans for a single-line edit buffer. When focused, the grapheme under
/// the cursor renders inverted; a cursor at the end renders as an inverted
/// space.
pub(super) fn input_spans(
    value: &str,
    cursor: usize,
    focused: bool,
    text_style: Style,
    theme: &Theme,
) -> Vec<Span<'static>> {
    let mut spans: Vec<Span> = Vec::new();
    if !focused {
        if !value.is_empty() {
            spans.push(Span::styled(value.to_string(), text_style));
        }
        return spans;
    }

    let cursor_style = Style::default()
        .fg(theme.background)
        .bg(theme.text_bright);
    let pos = cursor.min(value.len());
    let before = &value[..pos];
    if !before.is_empty() {
        spans.push(Span::styled(before.to_string(), text_style));
    }
    match crate::util::text::next_boundary(value, pos) {
        Some(end) => {
            spans.push(Span::styled(value[pos..end].to_string(), cursor_style));
            let after = &value[end..];
            if !after.is_empty() {
                spans.push(Span::styled(after.to_string(), text_style));
            }
        }
        None => spans.push(Span::styled(" ".to_string(), cursor_style)),
    }
    spans
}

/// Pad spans to fill `target_width` with background.
pub(super) fn pad_spans(spans: &mut Vec<Span<'_>>, target_width: usize, pad_style: Style) {
    let total_used: usize = spans
        .iter()
        .map(|s| crate::util::text::display_width(&s.content))
        .sum();
    if total_used < target_width {
        spans.push(Span::styled(
            " ".repeat(target_width - total_used),
            pad_style,
        ));
    }
}
