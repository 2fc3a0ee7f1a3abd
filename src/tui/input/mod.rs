mod confirm;
mod edit;
mod filter;
mod login;
mod move_mode;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, FilterPanel, Mode};

// Import all submodule functions into this module's namespace
// so that submodules can access cross-module functions via `use super::*;`
#[allow(unused_imports)]
use confirm::*;
#[allow(unused_imports)]
use edit::*;
#[allow(unused_imports)]
use filter::*;
#[allow(unused_imports)]
use login::*;
#[allow(unused_imports)]
use move_mode::*;
#[allow(unused_imports)]
use navigate::*;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::EditTask => handle_edit_task(app, key),
        Mode::EditRef => handle_edit_ref(app, key),
        Mode::EditNote => handle_edit_note(app, key),
        Mode::Filter => handle_filter(app, key),
        Mode::Move => handle_move(app, key),
        Mode::Confirm => handle_confirm(app, key),
        Mode::Login => handle_login(app, key),
    }
}

/// Handle a bracketed paste event: route the text into whichever text
/// field currently has focus.
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    let field = match app.mode {
        Mode::EditTask => app.task_form.as_mut().and_then(|f| f.focused_input()),
        Mode::EditRef => app.ref_form.as_mut().map(|f| f.focused_input()),
        Mode::EditNote => app.note_form.as_mut().map(|f| &mut f.content),
        Mode::Login => Some(app.login_form.focused_input()),
        Mode::Filter => app
            .filter_panel
            .as_mut()
            .filter(|p| p.dimension == FilterPanel::DUE)
            .map(|p| &mut p.due_input),
        _ => return,
    };
    if let Some(field) = field {
        field.insert_str(text);
    }
}
