//! Board projection and the drag state machine. Pure data in, columns out;
//! persistence stays in the task store.

use std::collections::BTreeMap;

use crate::model::{RefEntity, Task};

/// Which axis the board groups by. Persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    ByStatus,
    ByAssignee,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::ByStatus => ViewMode::ByAssignee,
            ViewMode::ByAssignee => ViewMode::ByStatus,
        }
    }

    /// Stable name for the state file.
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::ByStatus => "status",
            ViewMode::ByAssignee => "assignee",
        }
    }

    /// Anything unrecognized falls back to by-status.
    pub fn from_state(s: &str) -> Self {
        match s {
            "assignee" => ViewMode::ByAssignee,
            _ => ViewMode::ByStatus,
        }
    }
}

/// One board column: a status or an assignee, plus its cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Status id in by-status view, assignee user id in by-assignee view.
    pub key: String,
    pub title: String,
    /// Indices into the task slice the board was projected from.
    pub cards: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    pub columns: Vec<Column>,
    /// Visible tasks that landed in no column: status id not in the live
    /// status list, or no assignees in by-assignee view. Surfaced in the
    /// status row, never silently lost from the store.
    pub off_board: usize,
}

impl Board {
    /// Task index under a (column, row) cursor position.
    pub fn card_at(&self, column: usize, row: usize) -> Option<usize> {
        self.columns.get(column)?.cards.get(row).copied()
    }

    pub fn column_key(&self, column: usize) -> Option<&str> {
        self.columns.get(column).map(|c| c.key.as_str())
    }
}

/// Project visible tasks into columns.
pub fn project_columns(
    tasks: &[&Task],
    mode: ViewMode,
    statuses: &[RefEntity],
    users: &[RefEntity],
) -> Board {
    match mode {
        ViewMode::ByStatus => by_status(tasks, statuses),
        ViewMode::ByAssignee => by_assignee(tasks, users),
    }
}

/// One column per live status, in the order the server lists them. A task
/// belongs to exactly one column; a status id the list doesn't know leaves
/// the task off the board.
fn by_status(tasks: &[&Task], statuses: &[RefEntity]) -> Board {
    let mut columns: Vec<Column> = statuses
        .iter()
        .filter_map(|s| {
            let key = s.id.clone()?;
            Some(Column {
                key,
                title: s.name.clone(),
                cards: Vec::new(),
            })
        })
        .collect();

    let mut off_board = 0;
    for (i, task) in tasks.iter().enumerate() {
        match columns.iter_mut().find(|c| c.key == task.status) {
            Some(column) => column.cards.push(i),
            None => off_board += 1,
        }
    }
    Board { columns, off_board }
}

/// One column per assignee with at least one visible task, ordered by
/// display name. A task fans out into every assignee's column; unassigned
/// tasks appear in none.
fn by_assignee(tasks: &[&Task], users: &[RefEntity]) -> Board {
    let mut by_user: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    let mut off_board = 0;

    for (i, task) in tasks.iter().enumerate() {
        if task.assigned_to.is_empty() {
            off_board += 1;
            continue;
        }
        let mut seen: Vec<&str> = Vec::new();
        for user_id in &task.assigned_to {
            if seen.contains(&user_id.as_str()) {
                continue;
            }
            seen.push(user_id);
            let name = crate::model::user_display_name(users, user_id).to_string();
            by_user.entry((name, user_id.clone())).or_default().push(i);
        }
    }

    let columns = by_user
        .into_iter()
        .map(|((title, key), cards)| Column { key, title, cards })
        .collect();
    Board { columns, off_board }
}

// ---------------------------------------------------------------------------
// Drag session
// ---------------------------------------------------------------------------

/// At most one card is in flight at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        task_id: String,
        /// Column key the card was picked up from.
        from: String,
    },
}

impl DragSession {
    pub fn start(&mut self, task_id: impl Into<String>, from: impl Into<String>) {
        *self = DragSession::Dragging {
            task_id: task_id.into(),
            from: from.into(),
        };
    }

    pub fn cancel(&mut self) {
        *self = DragSession::Idle;
    }

    pub fn dragging(&self) -> Option<(&str, &str)> {
        match self {
            DragSession::Idle => None,
            DragSession::Dragging { task_id, from } => Some((task_id, from)),
        }
    }
}

/// What a completed drop asks the server for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    /// By-status view: the card moves to another status column.
    SetStatus { task_id: String, status: String },
    /// By-assignee view: the destination assignee replaces the source one.
    Reassign {
        task_id: String,
        from: String,
        to: String,
    },
}

/// Resolve a drop onto `dest`. `None` means nothing to persist: no drag in
/// progress, or the card came back to the column it left.
pub fn resolve_drop(drag: &DragSession, mode: ViewMode, dest: &str) -> Option<DropAction> {
    let (task_id, from) = drag.dragging()?;
    if from == dest {
        return None;
    }
    Some(match mode {
        ViewMode::ByStatus => DropAction::SetStatus {
            task_id: task_id.to_string(),
            status: dest.to_string(),
        },
        ViewMode::ByAssignee => DropAction::Reassign {
            task_id: task_id.to_string(),
            from: from.to_string(),
            to: dest.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entity(id: &str, name: &str) -> RefEntity {
        RefEntity {
            id: Some(id.into()),
            ..RefEntity::named(name)
        }
    }

    fn task(id: &str, status_id: &str, assignees: &[&str]) -> Task {
        let mut t = Task::new(id, status_id);
        t.id = Some(id.into());
        t.assigned_to = assignees.iter().map(|s| s.to_string()).collect();
        t
    }

    fn refs(tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().collect()
    }

    // ── by-status projection ───────────────────────────────────────

    #[test]
    fn status_columns_follow_server_order() {
        let statuses = vec![entity("s2", "Doing"), entity("s1", "Todo")];
        let tasks = vec![task("a", "s1", &[]), task("b", "s2", &[])];
        let board = project_columns(&refs(&tasks), ViewMode::ByStatus, &statuses, &[]);

        let titles: Vec<_> = board.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Doing", "Todo"]);
        assert_eq!(board.columns[0].cards, vec![1]);
        assert_eq!(board.columns[1].cards, vec![0]);
        assert_eq!(board.off_board, 0);
    }

    #[test]
    fn unknown_status_leaves_task_off_board() {
        let statuses = vec![entity("s1", "Todo")];
        let tasks = vec![task("a", "s1", &[]), task("b", "s-gone", &[])];
        let board = project_columns(&refs(&tasks), ViewMode::ByStatus, &statuses, &[]);

        assert_eq!(board.columns[0].cards, vec![0]);
        assert_eq!(board.off_board, 1);
    }

    #[test]
    fn empty_status_still_gets_a_column() {
        let statuses = vec![entity("s1", "Todo"), entity("s2", "Done")];
        let tasks = vec![task("a", "s1", &[])];
        let board = project_columns(&refs(&tasks), ViewMode::ByStatus, &statuses, &[]);
        assert_eq!(board.columns.len(), 2);
        assert!(board.columns[1].cards.is_empty());
    }

    // ── by-assignee projection ─────────────────────────────────────

    #[test]
    fn task_fans_out_to_every_assignee() {
        let users = vec![entity("u1", "Ana"), entity("u2", "Bruno")];
        let tasks = vec![task("a", "s", &["u1", "u2"]), task("b", "s", &["u2"])];
        let board = project_columns(&refs(&tasks), ViewMode::ByAssignee, &[], &users);

        assert_eq!(board.columns.len(), 2);
        assert_eq!(board.columns[0].title, "Ana");
        assert_eq!(board.columns[0].cards, vec![0]);
        assert_eq!(board.columns[1].title, "Bruno");
        assert_eq!(board.columns[1].cards, vec![0, 1]);
    }

    #[test]
    fn unassigned_tasks_stay_off_board() {
        let tasks = vec![task("a", "s", &[]), task("b", "s", &["u1"])];
        let board = project_columns(&refs(&tasks), ViewMode::ByAssignee, &[], &[]);
        assert_eq!(board.columns.len(), 1);
        assert_eq!(board.off_board, 1);
    }

    #[test]
    fn assignee_columns_sort_by_display_name_with_id_fallback() {
        // u9 is not in the user list, so it sorts under its raw id.
        let users = vec![entity("u1", "Zeca")];
        let tasks = vec![task("a", "s", &["u1"]), task("b", "s", &["u9"])];
        let board = project_columns(&refs(&tasks), ViewMode::ByAssignee, &[], &users);

        let titles: Vec<_> = board.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["u9", "Zeca"]);
        assert_eq!(board.columns[1].key, "u1");
    }

    #[test]
    fn duplicate_assignee_entries_produce_one_card() {
        let tasks = vec![task("a", "s", &["u1", "u1"])];
        let board = project_columns(&refs(&tasks), ViewMode::ByAssignee, &[], &[]);
        assert_eq!(board.columns[0].cards, vec![0]);
    }

    // ── drag and drop ──────────────────────────────────────────────

    #[test]
    fn drop_on_source_column_is_a_no_op() {
        let mut drag = DragSession::default();
        drag.start("t1", "s1");
        assert_eq!(resolve_drop(&drag, ViewMode::ByStatus, "s1"), None);
    }

    #[test]
    fn drop_without_drag_is_a_no_op() {
        assert_eq!(resolve_drop(&DragSession::Idle, ViewMode::ByStatus, "s2"), None);
    }

    #[test]
    fn status_drop_moves_the_card() {
        let mut drag = DragSession::default();
        drag.start("t1", "s1");
        assert_eq!(
            resolve_drop(&drag, ViewMode::ByStatus, "s2"),
            Some(DropAction::SetStatus {
                task_id: "t1".into(),
                status: "s2".into(),
            })
        );
    }

    #[test]
    fn assignee_drop_replaces_source_with_destination() {
        let mut drag = DragSession::default();
        drag.start("t1", "u1");
        assert_eq!(
            resolve_drop(&drag, ViewMode::ByAssignee, "u2"),
            Some(DropAction::Reassign {
                task_id: "t1".into(),
                from: "u1".into(),
                to: "u2".into(),
            })
        );
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut drag = DragSession::default();
        drag.start("t1", "s1");
        assert!(drag.dragging().is_some());
        drag.cancel();
        assert_eq!(drag, DragSession::Idle);
    }

    #[test]
    fn view_mode_round_trips_through_state_string() {
        assert_eq!(ViewMode::from_state(ViewMode::ByAssignee.as_str()), ViewMode::ByAssignee);
        assert_eq!(ViewMode::from_state(ViewMode::ByStatus.as_str()), ViewMode::ByStatus);
        assert_eq!(ViewMode::from_state("garbage"), ViewMode::ByStatus);
    }
}
