use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, ConfirmAction, Mode};

/// Handle keys in Confirm mode: y runs the pending delete, anything
/// else walks away. The endpoint is only reached from the y arm.
pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    let confirmed = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => true,
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') => false,
        _ => return,
    };

    let action = app.confirm.take();
    app.mode = Mode::Navigate;
    if !confirmed {
        return;
    }
    let Some(action) = action else { return };

    match action {
        ConfirmAction::DeleteTask { id, title } => {
            match app.tasks.remove(&mut app.client, &id) {
                Ok(()) => {
                    app.status_message = Some(format!("deleted '{title}'"));
                    app.status_is_error = false;
                    app.clamp_board_cursor();
                }
                Err(e) => app.report_failure(e.to_string()),
            }
        }
        ConfirmAction::DeleteRef { kind, id, name } => {
            match app.refs.remove(&mut app.client, kind, &id) {
                Ok(()) => {
                    app.status_message = Some(format!("deleted {} '{}'", kind.singular(), name));
                    app.status_is_error = false;
                    let count = app.refs.list(kind).len();
                    if app.admin_cursor >= count {
                        app.admin_cursor = count.saturating_sub(1);
                    }
                }
                Err(e) => app.report_failure(e.to_string()),
            }
        }
        ConfirmAction::DeleteNote { id } => match app.notes.remove(&mut app.client, &id) {
            Ok(()) => {
                app.status_message = Some("note deleted".to_string());
                app.status_is_error = false;
                let count = app.notes.notes().len();
                if app.notes_cursor >= count {
                    app.notes_cursor = count.saturating_sub(1);
                }
            }
            Err(e) => app.report_failure(e.to_string()),
        },
    }
}
