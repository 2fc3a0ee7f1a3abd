use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::form::{InputField, MultiSelectField, SelectField, TaskField};
use crate::tui::theme::Theme;
use crate::util::text::display_width;

use super::{input_spans, pad_spans};

const LABEL_WIDTH: usize = 12;

/// Render the task editor as a centered popup over the board.
pub fn render_task_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = match &app.task_form {
        Some(f) => f,
        None => return,
    };
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);

    let target_w = (area.width as f32 * 0.8) as u16;
    let popup_w = target_w.clamp(56, 100).min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    let mut focus_line = 0usize;
    let focused = form.focused();

    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));

    let mut push = |line: Line<'static>, is_focused: bool, lines: &mut Vec<Line<'static>>| {
        if is_focused {
            focus_line = lines.len();
        }
        lines.push(line);
    };

    push(
        text_line(theme, inner_w, "Title", &form.title, focused == TaskField::Title, None),
        focused == TaskField::Title,
        &mut lines,
    );
    push(
        text_line(
            theme,
            inner_w,
            "Description",
            &form.description,
            focused == TaskField::Description,
            None,
        ),
        focused == TaskField::Description,
        &mut lines,
    );
    push(
        select_line(theme, inner_w, "Status", &form.status, focused == TaskField::Status),
        focused == TaskField::Status,
        &mut lines,
    );
    push(
        text_line(
            theme,
            inner_w,
            "Priority",
            &form.priority,
            focused == TaskField::Priority,
            None,
        ),
        focused == TaskField::Priority,
        &mut lines,
    );
    push(
        text_line(
            theme,
            inner_w,
            "Due",
            &form.due,
            focused == TaskField::Due,
            Some("YYYY-MM-DD"),
        ),
        focused == TaskField::Due,
        &mut lines,
    );

    let multis: [(&str, &MultiSelectField, TaskField); 5] = [
        ("Clients", &form.clients, TaskField::Clients),
        ("Projects", &form.projects, TaskField::Projects),
        ("Products", &form.products, TaskField::Products),
        ("Tags", &form.tags, TaskField::Tags),
        ("Assignees", &form.assignees, TaskField::Assignees),
    ];
    for (label, field, tf) in multis {
        push(
            multi_line(theme, inner_w, label, field, focused == tf),
            focused == tf,
            &mut lines,
        );
    }

    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));

    let (done, total) = form
        .subtasks
        .iter()
        .fold((0usize, 0usize), |(d, t), row| (d + row.done as usize, t + 1));
    lines.push(Line::from(Span::styled(
        format!(" Subtasks ({done}/{total})"),
        Style::default().fg(theme.dim).bg(bg),
    )));
    for (i, row) in form.subtasks.iter().enumerate() {
        let is_focused = focused == TaskField::Subtask(i);
        push(
            subtask_line(theme, inner_w, row, is_focused),
            is_focused,
            &mut lines,
        );
    }

    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));

    let hint_style = Style::default().fg(theme.dim).bg(bg);
    if form.submitting {
        lines.push(Line::from(Span::styled(
            " saving\u{2026}",
            Style::default()
                .fg(theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Tab next  Space toggle  Ctrl-S save  Esc cancel",
            hint_style,
        )));
        lines.push(Line::from(Span::styled(
            " Ctrl-N add subtask  Ctrl-T toggle done  Ctrl-X remove",
            hint_style,
        )));
    }

    let max_h = area.height.saturating_sub(2);
    let popup_h = ((lines.len() as u16) + 2).min(max_h);
    let x = area.x + area.width.saturating_sub(popup_w) / 2;
    let y = area.y + area.height.saturating_sub(popup_h) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let title = if form.id.is_none() { " New task " } else { " Edit task " };
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.text).bg(bg))
        .style(bg_style);

    // Keep the focused row inside the visible window
    let visible = popup_h.saturating_sub(2) as usize;
    let scroll = focus_line.saturating_sub(visible.saturating_sub(2)).min(lines.len());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll as u16, 0))
        .style(bg_style);
    frame.render_widget(paragraph, popup_area);
}

/// Marker + fixed-width label column.
fn label_spans(theme: &Theme, label: &str, focused: bool, row_bg: ratatui::style::Color) -> Vec<Span<'static>> {
    let marker = if focused { " \u{25B6} " } else { "   " };
    let marker_style = Style::default().fg(theme.highlight).bg(row_bg);
    let label_style = if focused {
        Style::default()
            .fg(theme.text_bright)
            .bg(row_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text).bg(row_bg)
    };
    let padded = format!("{:<width$}", label, width = LABEL_WIDTH);
    vec![
        Span::styled(marker, marker_style),
        Span::styled(padded, label_style),
    ]
}

fn row_bg(theme: &Theme, focused: bool) -> ratatui::style::Color {
    if focused { theme.selection_bg } else { theme.background }
}

fn text_line(
    theme: &Theme,
    inner_w: usize,
    label: &str,
    field: &InputField,
    focused: bool,
    placeholder: Option<&str>,
) -> Line<'static> {
    let row_bg = row_bg(theme, focused);
    let mut spans = label_spans(theme, label, focused, row_bg);
    let text_style = Style::default().fg(theme.text_bright).bg(row_bg);
    if field.value.is_empty() && !focused {
        if let Some(hint) = placeholder {
            spans.push(Span::styled(
                hint.to_string(),
                Style::default().fg(theme.dim).bg(row_bg),
            ));
        }
    } else {
        spans.extend(input_spans(&field.value, field.cursor, focused, text_style, theme));
    }
    pad_spans(&mut spans, inner_w, Style::default().bg(row_bg));
    Line::from(spans)
}

fn select_line(
    theme: &Theme,
    inner_w: usize,
    label: &str,
    field: &SelectField,
    focused: bool,
) -> Line<'static> {
    let row_bg = row_bg(theme, focused);
    let mut spans = label_spans(theme, label, focused, row_bg);
    let chosen = field.chosen_label().unwrap_or("(none)");
    if focused {
        spans.push(Span::styled(
            "\u{25C0} ",
            Style::default().fg(theme.dim).bg(row_bg),
        ));
        spans.push(Span::styled(
            chosen.to_string(),
            Style::default()
                .fg(theme.text_bright)
                .bg(row_bg)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            " \u{25B6}",
            Style::default().fg(theme.dim).bg(row_bg),
        ));
    } else {
        spans.push(Span::styled(
            chosen.to_string(),
            Style::default().fg(theme.text_bright).bg(row_bg),
        ));
    }
    pad_spans(&mut spans, inner_w, Style::default().bg(row_bg));
    Line::from(spans)
}

fn multi_line(
    theme: &Theme,
    inner_w: usize,
    label: &str,
    field: &MultiSelectField,
    focused: bool,
) -> Line<'static> {
    let row_bg = row_bg(theme, focused);
    let mut spans = label_spans(theme, label, focused, row_bg);

    if field.options.is_empty() {
        spans.push(Span::styled(
            "(none)".to_string(),
            Style::default().fg(theme.dim).bg(row_bg),
        ));
    }
    for (i, (_, name)) in field.options.iter().enumerate() {
        let on = field.selected.get(i).copied().unwrap_or(false);
        let is_cursor = focused && i == field.cursor;
        let box_style = Style::default()
            .fg(if on { theme.green } else { theme.dim })
            .bg(row_bg);
        let mut name_style = Style::default()
            .fg(if on { theme.text_bright } else { theme.text })
            .bg(row_bg);
        if is_cursor {
            name_style = name_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(if on { "[x] " } else { "[ ] " }, box_style));
        spans.push(Span::styled(name.clone(), name_style));
        spans.push(Span::styled("  ", Style::default().bg(row_bg)));
    }
    clip_spans(&mut spans, inner_w);
    pad_spans(&mut spans, inner_w, Style::default().bg(row_bg));
    Line::from(spans)
}

fn subtask_line(
    theme: &Theme,
    inner_w: usize,
    row: &crate::tui::form::SubtaskRow,
    focused: bool,
) -> Line<'static> {
    let row_bg = row_bg(theme, focused);
    let marker = if focused { " \u{25B6} " } else { "   " };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(theme.highlight).bg(row_bg)),
        Span::styled(
            if row.done { "[x] " } else { "[ ] " },
            Style::default()
                .fg(if row.done { theme.green } else { theme.dim })
                .bg(row_bg),
        ),
    ];
    let text_style = Style::default()
        .fg(if row.done { theme.dim } else { theme.text_bright })
        .bg(row_bg);
    spans.extend(input_spans(
        &row.title.value,
        row.title.cursor,
        focused,
        text_style,
        theme,
    ));
    pad_spans(&mut spans, inner_w, Style::default().bg(row_bg));
    Line::from(spans)
}

/// Clip spans to the popup's inner width.
fn clip_spans(spans: &mut Vec<Span<'_>>, max_width: usize) {
    let mut total = 0usize;
    for (i, span) in spans.iter().enumerate() {
        let span_width = display_width(&span.content);
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
