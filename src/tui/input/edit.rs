use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::note::Note;
use crate::model::refdata::RefEntity;
use crate::tui::app::{App, Mode};
use crate::tui::form::{InputField, TaskField};

/// Apply a key to a text field. Returns false for keys the field does
/// not consume.
pub(super) fn field_key(field: &mut InputField, key: &KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key.code {
        KeyCode::Char(c) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        _ => return false,
    }
    true
}

// ---------------------------------------------------------------------------
// Task form
// ---------------------------------------------------------------------------

/// Handle keys in EditTask mode.
///
/// Ctrl-S submits, Esc cancels, Tab/Down and BackTab/Up move focus.
/// Subtask rows: Ctrl-N adds one, Ctrl-T toggles done, Ctrl-X removes.
/// On picker fields Left/Right move and Space/Enter toggles.
pub(super) fn handle_edit_task(app: &mut App, key: KeyEvent) {
    if app.task_form.is_none() {
        app.mode = Mode::Navigate;
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => submit_task_form(app),
            KeyCode::Char('n') => {
                if let Some(form) = app.task_form.as_mut() {
                    form.add_subtask();
                }
            }
            KeyCode::Char('t') => {
                if let Some(form) = app.task_form.as_mut() {
                    form.toggle_subtask();
                }
            }
            KeyCode::Char('x') => {
                if let Some(form) = app.task_form.as_mut() {
                    form.remove_subtask();
                }
            }
            _ => {}
        }
        return;
    }

    if key.code == KeyCode::Esc {
        app.task_form = None;
        app.mode = Mode::Navigate;
        return;
    }

    let Some(form) = app.task_form.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        _ => match form.focused() {
            TaskField::Status => match key.code {
                KeyCode::Left | KeyCode::Char('h') => form.status.prev(),
                KeyCode::Right | KeyCode::Char('l') => form.status.next(),
                _ => {}
            },
            TaskField::Clients
            | TaskField::Projects
            | TaskField::Products
            | TaskField::Tags
            | TaskField::Assignees => {
                let Some(multi) = form.focused_multi() else {
                    return;
                };
                match key.code {
                    KeyCode::Left | KeyCode::Char('h') => multi.prev(),
                    KeyCode::Right | KeyCode::Char('l') => multi.next(),
                    KeyCode::Char(' ') | KeyCode::Enter => multi.toggle(),
                    _ => {}
                }
            }
            _ => {
                if key.code == KeyCode::Enter {
                    form.focus_next();
                } else if let Some(field) = form.focused_input() {
                    field_key(field, &key);
                }
            }
        },
    }
}

/// Submit the task form: create or update, then refetch. The in-flight
/// flag keeps a queued second Ctrl-S from submitting twice.
fn submit_task_form(app: &mut App) {
    let task = {
        let Some(form) = app.task_form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        match form.to_task() {
            Ok(task) => {
                form.submitting = true;
                task
            }
            Err(msg) => {
                app.status_message = Some(msg);
                app.status_is_error = true;
                return;
            }
        }
    };

    match app.tasks.submit(&mut app.client, task) {
        Ok(saved) => {
            app.task_form = None;
            app.mode = Mode::Navigate;
            app.clamp_board_cursor();
            app.status_message = Some(format!("saved '{}'", saved.title));
            app.status_is_error = false;
        }
        Err(e) => {
            if let Some(form) = app.task_form.as_mut() {
                form.submitting = false;
            }
            app.report_failure(e.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Reference form
// ---------------------------------------------------------------------------

pub(super) fn handle_edit_ref(app: &mut App, key: KeyEvent) {
    if app.ref_form.is_none() {
        app.mode = Mode::Navigate;
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            submit_ref_form(app);
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.ref_form = None;
            app.mode = Mode::Navigate;
        }
        // Two fields at most, so every focus move is a toggle
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up | KeyCode::Enter => {
            if let Some(form) = app.ref_form.as_mut() {
                form.focus_next();
            }
        }
        _ => {
            if let Some(form) = app.ref_form.as_mut() {
                field_key(form.focused_input(), &key);
            }
        }
    }
}

fn submit_ref_form(app: &mut App) {
    let (kind, entity, image) = {
        let Some(form) = app.ref_form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        form.submitting = true;

        // Start from the cached entity so fields the form does not edit
        // (email, admin flag, an existing image URL) survive the update
        let mut entity = form
            .id
            .as_deref()
            .and_then(|id| app.refs.get(form.kind, id))
            .cloned()
            .unwrap_or_else(|| RefEntity::named(""));
        entity.id = form.id.clone();
        entity.name = form.name.value.trim().to_string();
        let image = form.image_path.opt().map(PathBuf::from);
        (form.kind, entity, image)
    };

    match app.refs.submit(&mut app.client, kind, entity, image.as_deref()) {
        Ok(saved) => {
            app.ref_form = None;
            app.mode = Mode::Navigate;
            app.status_message = Some(format!("saved {} '{}'", kind.singular(), saved.name));
            app.status_is_error = false;
        }
        Err(e) => {
            if let Some(form) = app.ref_form.as_mut() {
                form.submitting = false;
            }
            app.report_failure(e.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Note form
// ---------------------------------------------------------------------------

pub(super) fn handle_edit_note(app: &mut App, key: KeyEvent) {
    if app.note_form.is_none() {
        app.mode = Mode::Navigate;
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            submit_note_form(app);
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.note_form = None;
            app.mode = Mode::Navigate;
        }
        _ => {
            if let Some(form) = app.note_form.as_mut() {
                field_key(&mut form.content, &key);
            }
        }
    }
}

fn submit_note_form(app: &mut App) {
    let note = {
        let Some(form) = app.note_form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        if form.content.is_empty() {
            app.status_message = Some("note is empty".to_string());
            app.status_is_error = true;
            return;
        }
        form.submitting = true;
        Note {
            id: form.id.clone(),
            content: form.content.value.trim().to_string(),
        }
    };

    match app.notes.submit(&mut app.client, note) {
        Ok(_) => {
            app.note_form = None;
            app.mode = Mode::Navigate;
            app.status_message = Some("note saved".to_string());
            app.status_is_error = false;
        }
        Err(e) => {
            if let Some(form) = app.note_form.as_mut() {
                form.submitting = false;
            }
            app.report_failure(e.to_string());
        }
    }
}
