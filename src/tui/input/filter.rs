use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::filter::FilterSet;
use crate::model::task::parse_due_day;
use crate::tui::app::{App, FilterPanel, Mode};
use crate::tui::form::InputField;

use super::edit::field_key;

/// Handle keys in Filter mode.
///
/// Tab/BackTab switch dimension; within a list dimension j/k move and
/// Space/Enter toggle the option; the due dimension is a text field.
/// `c` clears every filter (list dimensions only; on the due field it
/// types). Esc commits the due date and closes the panel.
pub(super) fn handle_filter(app: &mut App, key: KeyEvent) {
    let Some(panel) = &app.filter_panel else {
        app.mode = Mode::Navigate;
        return;
    };
    let dim = panel.dimension;
    let on_due = dim == FilterPanel::DUE;

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            if commit_due(app) {
                app.filter_panel = None;
                app.mode = Mode::Navigate;
                app.clamp_board_cursor();
            }
        }

        (KeyModifiers::NONE, KeyCode::Tab) => switch_dimension(app, 1),
        (KeyModifiers::SHIFT, KeyCode::BackTab) => {
            switch_dimension(app, FilterPanel::DIMENSIONS.len() - 1)
        }

        // List dimensions: move and toggle
        (KeyModifiers::NONE, KeyCode::Char('h') | KeyCode::Left) if !on_due => {
            switch_dimension(app, FilterPanel::DIMENSIONS.len() - 1)
        }
        (KeyModifiers::NONE, KeyCode::Char('l') | KeyCode::Right) if !on_due => {
            switch_dimension(app, 1)
        }
        (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) if !on_due => {
            let count = app.filter_options(dim).len();
            if let Some(panel) = app.filter_panel.as_mut() {
                if panel.row + 1 < count {
                    panel.row += 1;
                }
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) if !on_due => {
            if let Some(panel) = app.filter_panel.as_mut() {
                panel.row = panel.row.saturating_sub(1);
            }
        }
        (KeyModifiers::NONE, KeyCode::Char(' ') | KeyCode::Enter) if !on_due => {
            toggle_option(app, dim);
        }
        (KeyModifiers::NONE, KeyCode::Char('c')) if !on_due => {
            app.tasks.filter.clear();
            if let Some(panel) = app.filter_panel.as_mut() {
                panel.due_input = InputField::default();
            }
            app.clamp_board_cursor();
            app.status_message = Some("filters cleared".to_string());
            app.status_is_error = false;
        }

        // Due dimension: Enter commits in place, everything else edits
        (_, KeyCode::Enter) if on_due => {
            commit_due(app);
        }
        _ if on_due => {
            if let Some(panel) = app.filter_panel.as_mut() {
                field_key(&mut panel.due_input, &key);
            }
        }

        _ => {}
    }
}

fn switch_dimension(app: &mut App, delta: usize) {
    if let Some(panel) = app.filter_panel.as_mut() {
        panel.dimension = (panel.dimension + delta) % FilterPanel::DIMENSIONS.len();
        panel.row = 0;
    }
}

/// Toggle membership of the option under the cursor in its dimension's
/// selection. Works on the shared filter the CLI uses too.
fn toggle_option(app: &mut App, dim: usize) {
    let row = match &app.filter_panel {
        Some(p) => p.row,
        None => return,
    };
    let value = match app.filter_options(dim).into_iter().nth(row) {
        Some((key, _)) => key,
        None => return,
    };
    let filter = &mut app.tasks.filter;
    let selection = match dim {
        0 => &mut filter.clients,
        1 => &mut filter.projects,
        2 => &mut filter.products,
        3 => &mut filter.assignees,
        4 => &mut filter.tags,
        5 => &mut filter.priorities,
        _ => return,
    };
    FilterSet::toggle(selection, &value);
    app.clamp_board_cursor();
}

/// Parse the due filter field into the filter set. Returns false when the
/// text is present but not a date; the panel stays open so it can be fixed.
fn commit_due(app: &mut App) -> bool {
    let raw = match &app.filter_panel {
        Some(p) => p.due_input.value.trim().to_string(),
        None => return true,
    };
    if raw.is_empty() {
        app.tasks.filter.due_day = None;
        return true;
    }
    match parse_due_day(&raw) {
        Some(day) => {
            app.tasks.filter.due_day = Some(day);
            app.clamp_board_cursor();
            true
        }
        None => {
            app.status_message = Some(format!("invalid due date: {raw} (use YYYY-MM-DD)"));
            app.status_is_error = true;
            false
        }
    }
}
