use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::refdata::RefKind;
use crate::model::task::Task;
use crate::tui::app::{App, ConfirmAction, FilterPanel, Mode, View};
use crate::tui::form::{NoteForm, RefForm};

/// Handle keys in Navigate mode
pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay swallows input until dismissed
    if app.show_help {
        if matches!(
            key.code,
            KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')
        ) {
            app.show_help = false;
        }
        return;
    }

    // Clear any transient status message on keypress
    app.status_message = None;
    app.status_is_error = false;

    match (key.modifiers, key.code) {
        // Quit
        (m, KeyCode::Char('q')) if m.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        (KeyModifiers::NONE, KeyCode::Char('q')) => {
            app.should_quit = true;
        }

        (KeyModifiers::NONE, KeyCode::Char('?')) => {
            app.show_help = true;
        }

        // View switching
        (KeyModifiers::NONE, KeyCode::Tab) => {
            app.view = next_view(app.view);
        }
        (KeyModifiers::SHIFT, KeyCode::BackTab) => {
            app.view = prev_view(app.view);
        }
        (KeyModifiers::NONE, KeyCode::Char('1')) => {
            app.view = View::Board;
        }
        (KeyModifiers::NONE, KeyCode::Char('2')) => {
            app.view = View::Notes;
        }
        (KeyModifiers::NONE, KeyCode::Char('3')) => {
            app.view = View::Admin(RefKind::Client);
        }

        // Manual refetch of everything
        (KeyModifiers::SHIFT, KeyCode::Char('R')) => {
            app.sync_all();
            if !app.status_is_error {
                app.status_message = Some("refreshed".to_string());
            }
        }

        // Renew the session ahead of expiry
        (KeyModifiers::NONE, KeyCode::Char('g')) => match app.client.renew() {
            Ok(()) => app.status_message = Some("session renewed".to_string()),
            Err(e) => app.report_failure(e.to_string()),
        },

        _ => match app.view {
            View::Board => handle_board_key(app, key),
            View::Notes => handle_notes_key(app, key),
            View::Admin(kind) => handle_admin_key(app, kind, key),
            // Navigate mode never runs on the login view
            View::Login => {}
        },
    }
}

fn next_view(view: View) -> View {
    match view {
        View::Board => View::Notes,
        View::Notes => View::Admin(RefKind::Client),
        View::Admin(_) | View::Login => View::Board,
    }
}

fn prev_view(view: View) -> View {
    match view {
        View::Board | View::Login => View::Admin(RefKind::Client),
        View::Notes => View::Board,
        View::Admin(_) => View::Notes,
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

fn handle_board_key(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('h') | KeyCode::Left) => {
            if app.board_column > 0 {
                app.board_column -= 1;
            }
            app.clamp_board_cursor();
        }
        (KeyModifiers::NONE, KeyCode::Char('l') | KeyCode::Right) => {
            app.board_column += 1;
            app.clamp_board_cursor();
        }
        (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
            app.board_row += 1;
            app.clamp_board_cursor();
        }
        (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
            app.board_row = app.board_row.saturating_sub(1);
        }

        // Toggle by-status / by-assignee grouping
        (KeyModifiers::NONE, KeyCode::Char('v')) => {
            app.view_mode = app.view_mode.toggle();
            app.board_column = 0;
            app.board_row = 0;
        }

        // Filter panel
        (KeyModifiers::NONE, KeyCode::Char('f')) => {
            app.filter_panel = Some(FilterPanel::new(app.tasks.filter.due_day));
            app.mode = Mode::Filter;
        }

        // Pick up the card under the cursor
        (KeyModifiers::NONE, KeyCode::Char('m')) => {
            let picked = {
                let (visible, board) = app.board();
                board
                    .card_at(app.board_column, app.board_row)
                    .and_then(|idx| {
                        let id = visible.get(idx).and_then(|t| t.id.clone())?;
                        let from = board.column_key(app.board_column)?.to_string();
                        Some((id, from))
                    })
            };
            if let Some((id, from)) = picked {
                app.drag.start(id, from);
                app.mode = Mode::Move;
            }
        }

        // New task
        (KeyModifiers::NONE, KeyCode::Char('n')) => {
            let Some(status) = app.default_status() else {
                app.status_message = Some("no status list loaded".to_string());
                app.status_is_error = true;
                return;
            };
            let task = Task::new("", status);
            app.open_task_form(&task);
        }

        // Edit the selected task
        (KeyModifiers::NONE, KeyCode::Char('e') | KeyCode::Enter) => {
            let task = app
                .selected_task_id()
                .and_then(|id| app.tasks.get(&id).cloned());
            if let Some(task) = task {
                app.open_task_form(&task);
            }
        }

        // Delete the selected task (after confirmation)
        (KeyModifiers::NONE, KeyCode::Char('d')) => {
            let target = {
                let (visible, board) = app.board();
                board
                    .card_at(app.board_column, app.board_row)
                    .and_then(|idx| visible.get(idx).copied())
                    .and_then(|t| Some((t.id.clone()?, t.title.clone())))
            };
            if let Some((id, title)) = target {
                app.confirm = Some(ConfirmAction::DeleteTask { id, title });
                app.mode = Mode::Confirm;
            }
        }

        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

fn handle_notes_key(app: &mut App, key: KeyEvent) {
    let count = app.notes.notes().len();
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
            if app.notes_cursor + 1 < count {
                app.notes_cursor += 1;
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
            app.notes_cursor = app.notes_cursor.saturating_sub(1);
        }
        (KeyModifiers::NONE, KeyCode::Char('n')) => {
            app.note_form = Some(NoteForm::new());
            app.mode = Mode::EditNote;
        }
        (KeyModifiers::NONE, KeyCode::Char('e') | KeyCode::Enter) => {
            let form = app
                .notes
                .notes()
                .get(app.notes_cursor)
                .map(NoteForm::from_note);
            if let Some(form) = form {
                app.note_form = Some(form);
                app.mode = Mode::EditNote;
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('d')) => {
            let id = app
                .notes
                .notes()
                .get(app.notes_cursor)
                .and_then(|n| n.id.clone());
            if let Some(id) = id {
                app.confirm = Some(ConfirmAction::DeleteNote { id });
                app.mode = Mode::Confirm;
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

fn handle_admin_key(app: &mut App, kind: RefKind, key: KeyEvent) {
    // The Users tab is a notice-only screen for non-admins
    let locked = kind.admin_only() && !app.viewer_is_admin();

    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('h') | KeyCode::Left) => {
            app.view = View::Admin(prev_kind(kind));
            app.admin_cursor = 0;
        }
        (KeyModifiers::NONE, KeyCode::Char('l') | KeyCode::Right) => {
            app.view = View::Admin(next_kind(kind));
            app.admin_cursor = 0;
        }
        (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
            if app.admin_cursor + 1 < app.refs.list(kind).len() {
                app.admin_cursor += 1;
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
            app.admin_cursor = app.admin_cursor.saturating_sub(1);
        }

        (KeyModifiers::NONE, KeyCode::Char('n')) if !locked => {
            app.ref_form = Some(RefForm::new(kind));
            app.mode = Mode::EditRef;
        }
        (KeyModifiers::NONE, KeyCode::Char('e') | KeyCode::Enter) if !locked => {
            let form = app
                .refs
                .list(kind)
                .get(app.admin_cursor)
                .map(|e| RefForm::from_entity(kind, e));
            if let Some(form) = form {
                app.ref_form = Some(form);
                app.mode = Mode::EditRef;
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('d')) if !locked => {
            let target = app
                .refs
                .list(kind)
                .get(app.admin_cursor)
                .and_then(|e| Some((e.id.clone()?, e.name.clone())));
            if let Some((id, name)) = target {
                app.confirm = Some(ConfirmAction::DeleteRef { kind, id, name });
                app.mode = Mode::Confirm;
            }
        }

        (KeyModifiers::NONE, KeyCode::Char('n' | 'e' | 'd')) if locked => {
            app.status_message = Some("user management is admin-only".to_string());
            app.status_is_error = true;
        }

        _ => {}
    }
}

fn next_kind(kind: RefKind) -> RefKind {
    let idx = RefKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
    RefKind::ALL[(idx + 1) % RefKind::ALL.len()]
}

fn prev_kind(kind: RefKind) -> RefKind {
    let idx = RefKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
    RefKind::ALL[(idx + RefKind::ALL.len() - 1) % RefKind::ALL.len()]
}
