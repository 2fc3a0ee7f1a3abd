use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, FilterPanel};

use super::{input_spans, pad_spans};

/// Render the filter panel popup: one tab per dimension, checkboxes for
/// the values of the current one, a date input for the due dimension.
pub fn render_filter_panel(frame: &mut Frame, app: &App, area: Rect) {
    let panel = match &app.filter_panel {
        Some(p) => p,
        None => return,
    };
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);

    let target_w = (area.width as f32 * 0.6) as u16;
    let popup_w = target_w.clamp(48, 80).min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    let mut focus_line = 0usize;
    let on_due = panel.dimension == FilterPanel::DUE;

    // Dimension tabs
    let mut tab_spans: Vec<Span> = vec![Span::styled(" ", bg_style)];
    for (i, name) in FilterPanel::DIMENSIONS.iter().enumerate() {
        let style = if i == panel.dimension {
            Style::default()
                .fg(theme.text_bright)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text).bg(bg)
        };
        tab_spans.push(Span::styled(format!(" {name} "), style));
    }
    pad_spans(&mut tab_spans, inner_w, bg_style);
    lines.push(Line::from(tab_spans));
    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));

    if on_due {
        let mut spans = vec![Span::styled(
            " due day: ",
            Style::default().fg(theme.text).bg(bg),
        )];
        spans.extend(input_spans(
            &panel.due_input.value,
            panel.due_input.cursor,
            true,
            Style::default().fg(theme.text_bright).bg(bg),
            theme,
        ));
        pad_spans(&mut spans, inner_w, bg_style);
        focus_line = lines.len();
        lines.push(Line::from(spans));

        let status = match app.tasks.filter.due_day {
            Some(day) => Line::from(Span::styled(
                format!(" showing tasks due {day}"),
                Style::default().fg(theme.green).bg(bg),
            )),
            None => Line::from(Span::styled(
                " YYYY-MM-DD, blank for any day",
                Style::default().fg(theme.dim).bg(bg),
            )),
        };
        lines.push(status);
    } else {
        let options = app.filter_options(panel.dimension);
        let active = active_values(app, panel.dimension);
        if options.is_empty() {
            lines.push(Line::from(Span::styled(
                " nothing to filter on",
                Style::default().fg(theme.dim).bg(bg),
            )));
        }
        for (i, (key, label)) in options.iter().enumerate() {
            let is_cursor = i == panel.row;
            let on = active.contains(key);
            let row_bg = if is_cursor { theme.selection_bg } else { bg };
            let marker = if is_cursor { " \u{25B6} " } else { "   " };
            let mut spans = vec![
                Span::styled(marker, Style::default().fg(theme.highlight).bg(row_bg)),
                Span::styled(
                    if on { "[x] " } else { "[ ] " },
                    Style::default()
                        .fg(if on { theme.green } else { theme.dim })
                        .bg(row_bg),
                ),
                Span::styled(
                    label.clone(),
                    Style::default()
                        .fg(if on { theme.text_bright } else { theme.text })
                        .bg(row_bg),
                ),
            ];
            pad_spans(&mut spans, inner_w, Style::default().bg(row_bg));
            if is_cursor {
                focus_line = lines.len();
            }
            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));
    let hint = if on_due {
        " Tab dimension  Enter apply  Esc close"
    } else {
        " h/l dimension  j/k move  Space toggle  c clear all  Esc close"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(theme.dim).bg(bg),
    )));

    let max_h = ((area.height as f32) * 0.7) as u16;
    let popup_h = ((lines.len() as u16) + 2)
        .min(max_h.max(6))
        .min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(popup_w) / 2;
    let y = area.y + area.height.saturating_sub(popup_h) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(
            " Filter ",
            Style::default()
                .fg(theme.text)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.text).bg(bg))
        .style(bg_style);

    let visible = popup_h.saturating_sub(2) as usize;
    let scroll = focus_line.saturating_sub(visible.saturating_sub(2));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll as u16, 0))
        .style(bg_style);
    frame.render_widget(paragraph, popup_area);
}

/// The filter values already active for a dimension.
fn active_values<'a>(app: &'a App, dimension: usize) -> &'a [String] {
    let filter = &app.tasks.filter;
    match dimension {
        0 => &filter.clients,
        1 => &filter.projects,
        2 => &filter.products,
        3 => &filter.assignees,
        4 => &filter.tags,
        5 => &filter.priorities,
        _ => &[],
    }
}
