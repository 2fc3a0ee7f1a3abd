use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::App;
use crate::tui::form::InputField;
use crate::tui::theme::Theme;

use super::{input_spans, pad_spans};

/// Render the login view: a centered email/password box.
pub fn render_login_view(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);
    let form = &app.login_form;

    let popup_w = 46u16.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));

    lines.push(field_line(
        theme,
        inner_w,
        "Email",
        &form.email,
        form.focus == 0,
        false,
    ));
    lines.push(field_line(
        theme,
        inner_w,
        "Password",
        &form.password,
        form.focus == 1,
        true,
    ));

    lines.push(Line::from(Span::styled(" ".repeat(inner_w), bg_style)));
    if form.submitting {
        lines.push(Line::from(Span::styled(
            " signing in\u{2026}",
            Style::default()
                .fg(theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Enter submit  Tab switch field",
            Style::default().fg(theme.dim).bg(bg),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!(" server: {}", app.config.api_url),
        Style::default().fg(theme.dim).bg(bg),
    )));

    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(popup_w) / 2;
    let y = area.y + area.height.saturating_sub(popup_h) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    let block = Block::default()
        .title(Span::styled(
            " Sign in ",
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

fn field_line(
    theme: &Theme,
    inner_w: usize,
    label: &str,
    field: &InputField,
    focused: bool,
    mask: bool,
) -> Line<'static> {
    let row_bg = if focused { theme.selection_bg } else { theme.background };
    let marker = if focused { " \u{25B6} " } else { "   " };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(theme.highlight).bg(row_bg)),
        Span::styled(
            format!("{:<9}", label),
            Style::default().fg(theme.text).bg(row_bg),
        ),
    ];
    let text_style = Style::default().fg(theme.text_bright).bg(row_bg);
    if mask {
        // One dot per character; the dot is 3 bytes, so remap the cursor
        let dot = '\u{2022}';
        let masked: String = field.value.chars().map(|_| dot).collect();
        let chars_before = field.value[..field.cursor.min(field.value.len())]
            .chars()
            .count();
        let mask_cursor = chars_before * dot.len_utf8();
        spans.extend(input_spans(&masked, mask_cursor, focused, text_style, theme));
    } else {
        spans.extend(input_spans(
            &field.value,
            field.cursor,
            focused,
            text_style,
            theme,
        ));
    }
    pad_spans(&mut spans, inner_w, Style::default().bg(row_bg));
    Line::from(spans)
}
