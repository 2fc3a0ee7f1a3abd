use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::text::truncate_to_width;

use super::{input_spans, pad_spans};

/// Render the sticky-notes list.
pub fn render_notes_view(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let width = area.width as usize;
    let notes = app.notes.notes();

    if notes.is_empty() {
        let empty = Paragraph::new(" No notes (n creates one)")
            .style(Style::default().fg(theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let visible = (area.height as usize).max(1);
    let cursor = app.notes_cursor.min(notes.len() - 1);
    let scroll = cursor.saturating_sub(visible.saturating_sub(1));

    let mut lines: Vec<Line> = Vec::with_capacity(visible);
    for (i, note) in notes.iter().enumerate().skip(scroll).take(visible) {
        let is_cursor = i == cursor;
        let row_bg = if is_cursor { theme.selection_bg } else { bg };
        let mut spans: Vec<Span> = Vec::new();
        if is_cursor {
            spans.push(Span::styled(
                "\u{258E}",
                Style::default().fg(theme.selection_border).bg(row_bg),
            ));
        } else {
            spans.push(Span::styled(" ", Style::default().bg(bg)));
        }
        let summary = truncate_to_width(note.summary(), width.saturating_sub(3));
        let style = if is_cursor {
            Style::default()
                .fg(theme.text_bright)
                .bg(row_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_bright).bg(row_bg)
        };
        spans.push(Span::styled(format!(" {summary}"), style));
        if is_cursor {
            pad_spans(&mut spans, width, Style::default().bg(row_bg));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Render the single-field note editor popup.
pub fn render_note_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = match &app.note_form {
        Some(f) => f,
        None => return,
    };
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);

    let target_w = (area.width as f32 * 0.6) as u16;
    let popup_w = target_w.clamp(44, 90).min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));

    let mut spans = vec![Span::styled(" ", bg_style)];
    spans.extend(input_spans(
        &form.content.value,
        form.content.cursor,
        true,
        Style::default().fg(theme.text_bright).bg(bg),
        theme,
    ));
    pad_spans(&mut spans, inner_w, bg_style);
    lines.push(Line::from(spans));

    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));
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
            " Ctrl-S save  Esc cancel",
            Style::default().fg(theme.dim).bg(bg),
        )));
    }

    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(popup_w) / 2;
    let y = area.y + area.height.saturating_sub(popup_h) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let title = if form.id.is_none() { " New note " } else { " Edit note " };
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

    let paragraph = Paragraph::new(lines).block(block).style(bg_style);
    frame.render_widget(paragraph, popup_area);
}
