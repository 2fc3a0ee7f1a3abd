use chrono::{Local, NaiveDate};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Task;
use crate::ops::board::{Column, ViewMode};
use crate::tui::app::{App, Mode};
use crate::util::text::truncate_to_width;

/// Lines per card: title, meta, tags, one blank separator.
const CARD_STRIDE: usize = 4;

/// Render the board content area: one equal-width column per status or
/// assignee, cards stacked inside.
pub fn render_board_view(frame: &mut Frame, app: &App, area: Rect) {
    let (visible, board) = app.board();

    if board.columns.is_empty() {
        let msg = match app.view_mode {
            ViewMode::ByStatus => " No statuses yet: create one in the admin view",
            ViewMode::ByAssignee => " No assigned tasks",
        };
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    if visible.is_empty() && !app.tasks.filter.is_empty() {
        let msg = " no matching tasks ";
        let bg = app.theme.background;
        let padding = (area.width as usize).saturating_sub(msg.len() + 1);
        let warn_style = Style::default()
            .fg(app.theme.text_bright)
            .bg(Color::Rgb(0x8D, 0x0B, 0x0B))
            .add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled(" ".repeat(padding), Style::default().bg(bg)),
            Span::styled(msg, warn_style),
        ]);
        let empty = Paragraph::new(line).style(Style::default().bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let today = Local::now().date_naive();
    let count = board.columns.len() as u32;
    let constraints: Vec<Constraint> = board
        .columns
        .iter()
        .map(|_| Constraint::Ratio(1, count))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let dragged_id = app.drag.dragging().map(|(task_id, _)| task_id);
    for (col_idx, column) in board.columns.iter().enumerate() {
        render_column(
            frame,
            app,
            &visible,
            column,
            col_idx,
            dragged_id,
            today,
            chunks[col_idx],
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn render_column(
    frame: &mut Frame,
    app: &App,
    visible: &[&Task],
    column: &Column,
    col_idx: usize,
    dragged_id: Option<&str>,
    today: NaiveDate,
    area: Rect,
) {
    let bg = app.theme.background;
    let width = area.width as usize;
    // One-cell right gutter keeps adjacent columns apart
    let content_width = width.saturating_sub(1);
    let is_cursor_col = col_idx == app.board_column;

    // Header: column title + card count, underline below
    let header_style = if app.mode == Mode::Move && is_cursor_col {
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else if is_cursor_col {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(bg)
    };
    let title = format!(" {} ({})", column.title, column.cards.len());
    let header = Line::from(Span::styled(
        truncate_to_width(&title, content_width),
        header_style,
    ));
    let underline_color = if app.mode == Mode::Move && is_cursor_col {
        app.theme.highlight
    } else {
        app.theme.dim
    };
    let underline = Line::from(Span::styled(
        "\u{2500}".repeat(content_width),
        Style::default().fg(underline_color).bg(bg),
    ));
    let header_area = Rect { height: 2.min(area.height), ..area };
    frame.render_widget(
        Paragraph::new(vec![header, underline]).style(Style::default().bg(bg)),
        header_area,
    );

    if area.height <= 2 {
        return;
    }
    let cards_area = Rect {
        y: area.y + 2,
        height: area.height - 2,
        ..area
    };
    let rows_visible = ((cards_area.height as usize) / CARD_STRIDE).max(1);
    let scroll = if is_cursor_col && app.board_row >= rows_visible {
        app.board_row + 1 - rows_visible
    } else {
        0
    };

    let mut lines: Vec<Line> = Vec::with_capacity(cards_area.height as usize);
    let end = column.cards.len().min(scroll + rows_visible);
    for row in scroll..end {
        let Some(task) = column.cards.get(row).and_then(|&i| visible.get(i)) else {
            continue;
        };
        let is_cursor = is_cursor_col && row == app.board_row && app.mode != Mode::Move;
        let is_dragged = task.id.as_deref().is_some_and(|id| Some(id) == dragged_id);
        lines.extend(card_lines(
            app,
            task,
            is_cursor,
            is_dragged,
            today,
            content_width,
        ));
        lines.push(Line::from(Span::styled(" ", Style::default().bg(bg))));
    }
    if scroll + rows_visible < column.cards.len() {
        let more = column.cards.len() - (scroll + rows_visible);
        lines.pop();
        lines.push(Line::from(Span::styled(
            format!(" \u{2193} {more} more"),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(bg)),
        cards_area,
    );
}

/// The three lines of one card: title, meta (priority / due / progress),
/// tags. Empty slots stay as blank styled lines so every card is the same
/// height and the cursor row math stays simple.
fn card_lines<'a>(
    app: &'a App,
    task: &Task,
    is_cursor: bool,
    is_dragged: bool,
    today: NaiveDate,
    width: usize,
) -> Vec<Line<'a>> {
    let bg = app.theme.background;
    let row_bg = if is_cursor { app.theme.selection_bg } else { bg };

    let border = if is_cursor {
        Span::styled(
            "\u{258E}",
            Style::default().fg(app.theme.selection_border).bg(row_bg),
        )
    } else if is_dragged {
        Span::styled(
            "\u{258E}",
            Style::default().fg(app.theme.highlight).bg(row_bg),
        )
    } else {
        Span::styled(" ", Style::default().bg(row_bg))
    };
    let pad = |spans: &mut Vec<Span>| {
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        if used < width {
            spans.push(Span::styled(
                " ".repeat(width - used),
                Style::default().bg(row_bg),
            ));
        }
    };

    let title_fg = if is_dragged {
        app.theme.dim
    } else {
        app.theme.text_bright
    };
    let mut title_spans = vec![
        border.clone(),
        Span::styled(
            truncate_to_width(&task.title, width.saturating_sub(2)),
            Style::default()
                .fg(title_fg)
                .bg(row_bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    pad(&mut title_spans);

    let mut meta_spans = vec![border.clone()];
    if let Some(priority) = task.priority.as_deref() {
        meta_spans.push(Span::styled(
            priority.to_string(),
            Style::default()
                .fg(app.theme.priority_color(priority))
                .bg(row_bg),
        ));
        meta_spans.push(Span::styled(" ", Style::default().bg(row_bg)));
    }
    if let Some(due) = task.due_day() {
        meta_spans.push(Span::styled(
            due.format("%Y-%m-%d").to_string(),
            Style::default().fg(app.theme.due_color(due, today)).bg(row_bg),
        ));
        meta_spans.push(Span::styled(" ", Style::default().bg(row_bg)));
    }
    let (done, total) = task.subtask_progress();
    if total > 0 {
        let progress_fg = if done == total {
            app.theme.green
        } else {
            app.theme.cyan
        };
        meta_spans.push(Span::styled(
            format!("[{done}/{total}]"),
            Style::default().fg(progress_fg).bg(row_bg),
        ));
    }
    pad(&mut meta_spans);

    let mut tag_spans = vec![border];
    for (i, tag) in task.tags.iter().enumerate() {
        if i > 0 {
            tag_spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        }
        tag_spans.push(Span::styled(
            format!("#{tag}"),
            Style::default().fg(app.theme.tag_color(tag)).bg(row_bg),
        ));
    }
    // Clients ride on the tag line, right after the tags
    for name in &task.client {
        tag_spans.push(Span::styled(
            format!(" @{name}"),
            Style::default().fg(app.theme.dim).bg(row_bg),
        ));
    }
    truncate_card_line(&mut tag_spans, width);
    pad(&mut tag_spans);

    vec![
        Line::from(title_spans),
        Line::from(meta_spans),
        Line::from(tag_spans),
    ]
}

/// Clip a card line's spans to the column width.
fn truncate_card_line(spans: &mut Vec<Span<'_>>, max_width: usize) {
    let mut total = 0usize;
    for (i, span) in spans.iter().enumerate() {
        let span_width = span.content.chars().count();
        if total + span_width > max_width {
            let remaining = max_width.saturating_sub(total);
            if remaining > 0 {
                let truncated: String = span.content.chars().take(remaining).collect();
                spans[i] = Span::styled(truncated, span.style);
                spans.truncate(i + 1);
            } else {
                spans.truncate(i);
            }
            return;
        }
        total += span_width;
    }
}
