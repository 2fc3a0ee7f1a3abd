use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::board::{DropAction, resolve_drop};
use crate::tui::app::{App, Mode};

/// Handle keys in Move mode: a card is picked up, h/l retarget the
/// destination column, Enter drops it, Esc puts it back.
pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.drag.cancel();
            app.mode = Mode::Navigate;
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if app.board_column > 0 {
                app.board_column -= 1;
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let columns = app.board().1.columns.len();
            if app.board_column + 1 < columns {
                app.board_column += 1;
            }
        }
        KeyCode::Enter => drop_card(app),
        _ => {}
    }
}

/// Complete the drop: resolve it against the current grouping and, when
/// it lands on a different column, persist with one update + one refetch.
fn drop_card(app: &mut App) {
    let dest = {
        let board = app.board().1;
        board.column_key(app.board_column).map(str::to_string)
    };
    let action = dest.and_then(|dest| resolve_drop(&app.drag, app.view_mode, &dest));
    app.drag.cancel();
    app.mode = Mode::Navigate;

    // No action: dropped back where it came from
    let Some(action) = action else { return };

    let result = match &action {
        DropAction::SetStatus { task_id, status } => {
            app.tasks.set_status(&mut app.client, task_id, status)
        }
        DropAction::Reassign { task_id, from, to } => {
            app.tasks.reassign(&mut app.client, task_id, from, to)
        }
    };
    match result {
        Ok(()) => {
            app.status_message = Some("moved".to_string());
            app.status_is_error = false;
            app.clamp_board_cursor();
        }
        Err(e) => app.report_failure(e.to_string()),
    }
}
