use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, View};

use super::centered_rect;

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(60, 80, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let text_color = app.theme.text;
    let bright = app.theme.text_bright;
    let highlight = app.theme.highlight;
    let dim = app.theme.dim;

    let key_style = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(text_color).bg(bg);
    let header_style = Style::default()
        .fg(bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    // Context-sensitive help
    match &app.view {
        View::Login => {
            lines.push(Line::from(Span::styled(" Login", header_style)));
            add_binding(
                &mut lines,
                " Tab/\u{2191}\u{2193}",
                "Switch field",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " Enter", "Submit", key_style, desc_style);
            lines.push(Line::from(""));
        }
        View::Board => {
            lines.push(Line::from(Span::styled(" Board", header_style)));
            add_binding(
                &mut lines,
                " \u{2190}\u{2192}/hl",
                "Move between columns",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " \u{2191}\u{2193}/jk",
                "Move between cards",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " v", "Toggle by-status / by-assignee", key_style, desc_style);
            add_binding(&mut lines, " f", "Filter panel", key_style, desc_style);
            add_binding(&mut lines, " m", "Pick up card (move)", key_style, desc_style);
            add_binding(&mut lines, " n", "New task", key_style, desc_style);
            add_binding(&mut lines, " e/Enter", "Edit task", key_style, desc_style);
            add_binding(&mut lines, " d", "Delete task", key_style, desc_style);
            lines.push(Line::from(""));

            lines.push(Line::from(Span::styled(" Move mode", header_style)));
            add_binding(
                &mut lines,
                " \u{2190}\u{2192}/hl",
                "Pick destination column",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " Enter", "Drop the card", key_style, desc_style);
            add_binding(&mut lines, " Esc", "Cancel", key_style, desc_style);
            lines.push(Line::from(""));
        }
        View::Notes => {
            lines.push(Line::from(Span::styled(" Notes", header_style)));
            add_binding(
                &mut lines,
                " \u{2191}\u{2193}/jk",
                "Move cursor",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " n", "New note", key_style, desc_style);
            add_binding(&mut lines, " e/Enter", "Edit note", key_style, desc_style);
            add_binding(&mut lines, " d", "Delete note", key_style, desc_style);
            lines.push(Line::from(""));
        }
        View::Admin(_) => {
            lines.push(Line::from(Span::styled(" Admin", header_style)));
            add_binding(
                &mut lines,
                " \u{2190}\u{2192}/hl",
                "Switch entity kind",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " \u{2191}\u{2193}/jk",
                "Move cursor",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " n", "New entity", key_style, desc_style);
            add_binding(&mut lines, " e/Enter", "Rename / edit", key_style, desc_style);
            add_binding(&mut lines, " d", "Delete entity", key_style, desc_style);
            lines.push(Line::from(""));
        }
    }

    // Global keys
    lines.push(Line::from(Span::styled(" Global", header_style)));
    add_binding(&mut lines, " ?", "Toggle this help", key_style, desc_style);
    if app.view != View::Login {
        add_binding(&mut lines, " Tab/S-Tab", "Next/previous view", key_style, desc_style);
        add_binding(&mut lines, " 1/2/3", "Board / Notes / Admin", key_style, desc_style);
        add_binding(&mut lines, " R", "Refresh from server", key_style, desc_style);
        add_binding(&mut lines, " g", "Renew session", key_style, desc_style);
        add_binding(&mut lines, " q", "Quit", key_style, desc_style);
    }
    add_binding(&mut lines, " Ctrl+Q", "Quit (immediate)", key_style, desc_style);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}
