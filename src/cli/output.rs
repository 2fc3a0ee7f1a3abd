use serde::Serialize;

use crate::model::{Note, RefEntity, Task};
use crate::ops::board::Board;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Status id as stored on the wire.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Assignee display names, ids where the user list has no entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskJson>,
}

#[derive(Serialize)]
pub struct SubtaskJson {
    pub id: Option<String>,
    pub title: String,
    pub done: bool,
}

#[derive(Serialize)]
pub struct BoardJson {
    pub mode: String,
    pub columns: Vec<ColumnJson>,
    pub off_board: usize,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub key: String,
    pub title: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct RefEntityJson {
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct NoteJson {
    pub index: usize,
    pub id: Option<String>,
    pub text: String,
}

#[derive(Serialize)]
pub struct WhoamiJson {
    pub id: String,
    pub name: String,
    pub email: String,
    pub admin: bool,
    /// Unix timestamp the access token expires at.
    pub expires_at: i64,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, statuses: &[RefEntity], users: &[RefEntity]) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        status: task.status.clone(),
        status_name: status_name(statuses, &task.status).map(str::to_string),
        priority: task.priority.clone(),
        due: task.due_day().map(|d| d.format("%Y-%m-%d").to_string()),
        clients: task.client.clone(),
        projects: task.project.clone(),
        products: task.product.clone(),
        tags: task.tags.clone(),
        assignees: task
            .assigned_to
            .iter()
            .map(|id| crate::model::user_display_name(users, id).to_string())
            .collect(),
        subtasks: task
            .sub_tasks
            .iter()
            .map(|s| SubtaskJson {
                id: s.id.clone(),
                title: s.title.clone(),
                done: s.done,
            })
            .collect(),
    }
}

pub fn ref_to_json(entity: &RefEntity) -> RefEntityJson {
    RefEntityJson {
        id: entity.id.clone(),
        name: entity.name.clone(),
        email: entity.email.clone(),
        admin: entity.is_admin,
        image: entity.image.clone(),
    }
}

pub fn note_to_json(index: usize, note: &Note) -> NoteJson {
    NoteJson {
        index,
        id: note.id.clone(),
        text: note.content.clone(),
    }
}

/// Status display name for a status id, None when the list doesn't know it.
pub fn status_name<'a>(statuses: &'a [RefEntity], status_id: &str) -> Option<&'a str> {
    statuses
        .iter()
        .find(|s| s.id.as_deref() == Some(status_id))
        .map(|s| s.name.as_str())
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task, statuses: &[RefEntity]) -> String {
    let id_str = task
        .id
        .as_deref()
        .map(|id| format!("{}  ", id))
        .unwrap_or_default();
    let status = status_name(statuses, &task.status).unwrap_or(task.status.as_str());
    let priority_str = task
        .priority
        .as_deref()
        .map(|p| format!("  !{}", p))
        .unwrap_or_default();
    let due_str = task
        .due_day()
        .map(|d| format!("  due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    let (done, total) = task.subtask_progress();
    let progress_str = if total > 0 {
        format!("  [{}/{}]", done, total)
    } else {
        String::new()
    };
    let tags_str = if task.tags.is_empty() {
        String::new()
    } else {
        format!(
            "  {}",
            task.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };
    format!(
        "{}[{}] {}{}{}{}{}",
        id_str, status, task.title, priority_str, due_str, progress_str, tags_str
    )
}

/// Format detailed task view
pub fn format_task_detail(task: &Task, statuses: &[RefEntity], users: &[RefEntity]) -> Vec<String> {
    let mut lines = Vec::new();

    let status = status_name(statuses, &task.status).unwrap_or(task.status.as_str());
    let id_str = task
        .id
        .as_deref()
        .map(|id| format!("{}  ", id))
        .unwrap_or_default();
    lines.push(format!("{}[{}] {}", id_str, status, task.title));

    if let Some(desc) = task.description.as_deref() {
        if !desc.is_empty() {
            for line in desc.lines() {
                lines.push(format!("  {}", line));
            }
        }
    }
    if let Some(priority) = task.priority.as_deref() {
        lines.push(format!("priority: {}", priority));
    }
    if let Some(due) = task.due_day() {
        lines.push(format!("due: {}", due.format("%Y-%m-%d")));
    }
    for (label, names) in [
        ("clients", &task.client),
        ("projects", &task.project),
        ("products", &task.product),
    ] {
        if !names.is_empty() {
            lines.push(format!("{}: {}", label, names.join(", ")));
        }
    }
    if !task.tags.is_empty() {
        lines.push(format!(
            "tags: {}",
            task.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    if !task.assigned_to.is_empty() {
        let names: Vec<&str> = task
            .assigned_to
            .iter()
            .map(|id| crate::model::user_display_name(users, id))
            .collect();
        lines.push(format!("assigned: {}", names.join(", ")));
    }

    if !task.sub_tasks.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        for sub in &task.sub_tasks {
            let mark = if sub.done { 'x' } else { ' ' };
            lines.push(format!("  [{}] {}", mark, sub.title));
        }
    }

    lines
}

/// Format the board as sectioned columns, one header per column.
pub fn format_board(board: &Board, visible: &[&Task], statuses: &[RefEntity]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut first = true;
    for column in &board.columns {
        if !first {
            lines.push(String::new());
        }
        first = false;
        lines.push(format!("== {} ({}) ==", column.title, column.cards.len()));
        for &card in &column.cards {
            if let Some(task) = visible.get(card) {
                lines.push(format_task_line(task, statuses));
            }
        }
    }
    if board.off_board > 0 {
        if !first {
            lines.push(String::new());
        }
        lines.push(format!("{} task(s) off board", board.off_board));
    }
    lines
}

/// Format a reference entity as a one-line summary
pub fn format_ref_line(entity: &RefEntity) -> String {
    let mut line = entity.name.clone();
    if entity.admin() {
        line.push_str("  [admin]");
    }
    if let Some(email) = entity.email.as_deref() {
        line.push_str(&format!("  <{}>", email));
    }
    if entity.image.is_some() {
        line.push_str("  [image]");
    }
    line
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

    #[test]
    fn task_line_resolves_status_and_decorations() {
        let statuses = vec![entity("s1", "Doing")];
        let mut task = Task::new("Ship it", "s1");
        task.id = Some("t1".into());
        task.priority = Some("Alta".into());
        task.due_date = Some("2024-05-01T12:00:00Z".into());
        task.tags = vec!["backend".into()];

        assert_eq!(
            format_task_line(&task, &statuses),
            "t1  [Doing] Ship it  !Alta  due 2024-05-01  #backend"
        );
    }

    #[test]
    fn task_line_falls_back_to_raw_status_id() {
        let task = Task::new("Orphan", "s-gone");
        assert_eq!(format_task_line(&task, &[]), "[s-gone] Orphan");
    }

    #[test]
    fn task_json_resolves_names() {
        let statuses = vec![entity("s1", "Todo")];
        let users = vec![entity("u1", "Ana")];
        let mut task = Task::new("x", "s1");
        task.assigned_to = vec!["u1".into(), "u9".into()];

        let json = task_to_json(&task, &statuses, &users);
        assert_eq!(json.status_name.as_deref(), Some("Todo"));
        assert_eq!(json.assignees, vec!["Ana", "u9"]);
    }

    #[test]
    fn ref_line_carries_user_decorations() {
        let mut user = entity("u1", "Ana");
        user.email = Some("ana@x.io".into());
        user.is_admin = Some(true);
        assert_eq!(format_ref_line(&user), "Ana  [admin]  <ana@x.io>");
    }
}
