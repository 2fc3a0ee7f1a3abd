use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode, View};
use crate::tui::form::{InputField, LoginForm};

use super::edit::field_key;

/// Handle keys in Login mode: email and password fields, Enter on the
/// password submits. Ctrl-Q quits (plain q has to type into the fields).
pub(super) fn handle_login(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            app.login_form.focus_next();
        }
        KeyCode::Enter => {
            if app.login_form.focus == 0 {
                app.login_form.focus_next();
            } else {
                submit_login(app);
            }
        }
        _ => {
            field_key(app.login_form.focused_input(), &key);
        }
    }
}

fn submit_login(app: &mut App) {
    let email = app.login_form.email.value.trim().to_string();
    let password = app.login_form.password.value.clone();
    if email.is_empty() || password.is_empty() {
        app.status_message = Some("email and password are required".to_string());
        app.status_is_error = true;
        return;
    }
    if app.login_form.submitting {
        return;
    }
    app.login_form.submitting = true;

    match app.client.login(&email, &password) {
        Ok(session) => {
            let who = if session.claims.name.is_empty() {
                email
            } else {
                session.claims.name.clone()
            };
            app.login_form = LoginForm::default();
            app.view = View::Board;
            app.mode = Mode::Navigate;
            app.sync_all();
            if !app.status_is_error {
                app.status_message = Some(format!("logged in as {who}"));
            }
        }
        Err(e) => {
            app.login_form.submitting = false;
            app.login_form.password = InputField::default();
            app.status_message = Some(e.to_string());
            app.status_is_error = true;
        }
    }
}
