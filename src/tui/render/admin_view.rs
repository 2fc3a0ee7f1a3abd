use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::RefKind;
use crate::tui::app::App;

use super::{input_spans, pad_spans};

/// Render the reference-entity management view for one kind.
pub fn render_admin_view(frame: &mut Frame, app: &App, kind: RefKind, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let width = area.width as usize;

    let mut lines: Vec<Line> = Vec::new();

    // Kind tabs
    let mut tab_spans: Vec<Span> = vec![Span::styled(" ", Style::default().bg(bg))];
    for k in RefKind::ALL {
        let locked = k.admin_only() && !app.viewer_is_admin();
        let style = if k == kind {
            Style::default()
                .fg(theme.text_bright)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else if locked {
            Style::default().fg(theme.dim).bg(bg)
        } else {
            Style::default().fg(theme.text).bg(bg)
        };
        tab_spans.push(Span::styled(format!(" {} ", k.label()), style));
    }
    lines.push(Line::from(tab_spans));
    lines.push(Line::from(Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(theme.dim).bg(bg),
    )));

    if kind.admin_only() && !app.viewer_is_admin() {
        lines.push(Line::from(Span::styled(
            " read-only: user management needs an admin account",
            Style::default().fg(theme.yellow).bg(bg),
        )));
        lines.push(Line::from(Span::styled(" ", Style::default().bg(bg))));
    }

    let entities = app.refs.list(kind);
    if entities.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" No {} yet (n creates one)", kind.label().to_lowercase()),
            Style::default().fg(theme.dim).bg(bg),
        )));
    }

    // Scroll the list so the cursor stays visible below the header rows
    let header_rows = lines.len();
    let visible = (area.height as usize).saturating_sub(header_rows).max(1);
    let cursor = app.admin_cursor.min(entities.len().saturating_sub(1));
    let scroll = cursor.saturating_sub(visible.saturating_sub(1));

    for (i, entity) in entities.iter().enumerate().skip(scroll).take(visible) {
        let is_cursor = i == cursor && !entities.is_empty();
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

        let name_style = if is_cursor {
            Style::default()
                .fg(theme.text_bright)
                .bg(row_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_bright).bg(row_bg)
        };
        spans.push(Span::styled(format!(" {}", entity.name), name_style));

        if entity.admin() {
            spans.push(Span::styled(
                " \u{2605}",
                Style::default().fg(theme.yellow).bg(row_bg),
            ));
        }
        if let Some(email) = entity.email.as_deref() {
            spans.push(Span::styled(
                format!("  {email}"),
                Style::default().fg(theme.dim).bg(row_bg),
            ));
        }
        if kind.has_image() && entity.image.is_some() {
            spans.push(Span::styled(
                "  \u{25A3}",
                Style::default().fg(theme.cyan).bg(row_bg),
            ));
        }

        if is_cursor {
            pad_spans(&mut spans, width, Style::default().bg(row_bg));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Render the name/image editor popup for a reference entity.
pub fn render_ref_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = match &app.ref_form {
        Some(f) => f,
        None => return,
    };
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);

    let target_w = (area.width as f32 * 0.5) as u16;
    let popup_w = target_w.clamp(40, 68).min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));

    let fields: [(&str, &crate::tui::form::InputField, bool); 2] = [
        ("Name", &form.name, form.focus == 0),
        ("Image path", &form.image_path, form.focus == 1),
    ];
    let field_count = form.field_count();
    for (label, field, is_focused) in fields.into_iter().take(field_count) {
        let row_bg = if is_focused { theme.selection_bg } else { bg };
        let marker = if is_focused { " \u{25B6} " } else { "   " };
        let mut spans = vec![
            Span::styled(marker, Style::default().fg(theme.highlight).bg(row_bg)),
            Span::styled(
                format!("{:<11}", label),
                Style::default().fg(theme.text).bg(row_bg),
            ),
        ];
        spans.extend(input_spans(
            &field.value,
            field.cursor,
            is_focused,
            Style::default().fg(theme.text_bright).bg(row_bg),
            theme,
        ));
        pad_spans(&mut spans, inner_w, Style::default().bg(row_bg));
        lines.push(Line::from(spans));
    }

    if form.kind.has_image() {
        lines.push(Line::from(Span::styled(
            " image: local file path, uploaded on save",
            Style::default().fg(theme.dim).bg(bg),
        )));
    }

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

    let title = if form.id.is_none() {
        format!(" New {} ", form.kind.singular())
    } else {
        format!(" Edit {} ", form.kind.singular())
    };
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
