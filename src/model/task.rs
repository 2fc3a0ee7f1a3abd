use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A task as the board API exchanges it.
///
/// Field names mirror the wire format exactly. Reference entities are
/// denormalized: `client`/`project`/`product`/`tags` hold display *names*,
/// while `assigned_to` and `status` hold ids. Renaming a client on the
/// server does not rewrite tasks that captured the old name, and this
/// client preserves that behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned id; absent until the task has been created.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of an entry in the live status list.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_status: Option<String>,
    /// Server-owned vocabulary; treated as an opaque label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Client names (not ids) this task is tied to.
    #[serde(default)]
    pub client: Vec<String>,
    #[serde(default)]
    pub project: Vec<String>,
    #[serde(default)]
    pub product: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creator user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Assignee user ids.
    #[serde(default)]
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub sub_tasks: Vec<Subtask>,
    /// RFC3339 timestamp or bare `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A checklist entry nested inside a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub assigned_to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Task {
    /// A fresh unsaved task with the given title and status id.
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Task {
            id: None,
            title: title.into(),
            description: None,
            status: status.into(),
            evaluation_status: None,
            priority: None,
            client: Vec::new(),
            project: Vec::new(),
            product: Vec::new(),
            tags: Vec::new(),
            created_by: None,
            assigned_to: Vec::new(),
            sub_tasks: Vec::new(),
            due_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Calendar day of the due date, ignoring any time-of-day component.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_due_day)
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_to.iter().any(|a| a == user_id)
    }

    /// Drop subtasks with blank or whitespace-only titles. Applied before
    /// every submission so placeholder rows never reach the server.
    pub fn prune_blank_subtasks(&mut self) {
        self.sub_tasks.retain(|s| !s.title.trim().is_empty());
    }

    /// Completed/total subtask counts for card badges.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.sub_tasks.iter().filter(|s| s.done).count();
        (done, self.sub_tasks.len())
    }
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Subtask {
            id: None,
            title: title.into(),
            done: false,
            assigned_to: Vec::new(),
            due_date: None,
        }
    }
}

/// Parse the calendar day out of a due-date string.
///
/// Accepts full RFC3339 stamps (the date is taken in the stamp's own
/// offset, never converted to local time) and bare `YYYY-MM-DD`.
pub fn parse_due_day(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_round_trip_preserves_names_and_ids() {
        let json = r#"{
            "_id": "t1",
            "title": "Ship the thing",
            "status": "s-doing",
            "priority": "Alta",
            "client": ["Acme"],
            "tags": ["backend"],
            "assignedTo": ["u1", "u2"],
            "subTasks": [{"title": "Write docs", "done": true}],
            "dueDate": "2024-05-01T03:00:00.000Z",
            "createdAt": "2024-04-20T12:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id.as_deref(), Some("t1"));
        assert_eq!(task.status, "s-doing");
        assert_eq!(task.client, vec!["Acme"]);
        assert_eq!(task.assigned_to, vec!["u1", "u2"]);
        assert!(task.sub_tasks[0].done);

        let out = serde_json::to_value(&task).unwrap();
        assert_eq!(out["_id"], "t1");
        assert_eq!(out["assignedTo"][1], "u2");
        assert_eq!(out["subTasks"][0]["title"], "Write docs");
    }

    #[test]
    fn new_task_serializes_without_id() {
        let task = Task::new("Draft", "s-todo");
        let out = serde_json::to_value(&task).unwrap();
        assert!(out.get("_id").is_none());
        assert_eq!(out["title"], "Draft");
    }

    #[test]
    fn due_day_ignores_time_of_day() {
        let mut task = Task::new("x", "s");
        task.due_date = Some("2024-05-01T23:59:00.000Z".into());
        assert_eq!(task.due_day(), NaiveDate::from_ymd_opt(2024, 5, 1));

        task.due_date = Some("2024-05-01".into());
        assert_eq!(task.due_day(), NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn due_day_keeps_date_in_original_offset() {
        // 23:00 -05:00 is already May 2nd in UTC; the written day wins.
        assert_eq!(
            parse_due_day("2024-05-01T23:00:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn due_day_rejects_garbage() {
        assert_eq!(parse_due_day("next tuesday"), None);
        assert_eq!(parse_due_day(""), None);
    }

    #[test]
    fn prune_drops_blank_and_whitespace_subtasks() {
        let mut task = Task::new("x", "s");
        task.sub_tasks = vec![
            Subtask::new("  "),
            Subtask::new("Ship"),
            Subtask::new(""),
            Subtask::new("\t"),
        ];
        task.prune_blank_subtasks();
        let titles: Vec<&str> = task.sub_tasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Ship"]);
    }

    #[test]
    fn subtask_progress_counts_done() {
        let mut task = Task::new("x", "s");
        task.sub_tasks = vec![
            Subtask {
                done: true,
                ..Subtask::new("a")
            },
            Subtask::new("b"),
        ];
        assert_eq!(task.subtask_progress(), (1, 2));
    }
}
