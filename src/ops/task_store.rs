use crate::api::session::Claims;
use crate::api::{ApiClient, ApiError};
use crate::model::{FilterSet, Subtask, Task, apply};

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Client-side cache of the task list plus the active display filter.
///
/// The server's copy is the truth: every mutation is a write followed by a
/// full refetch, never a local merge. The UI shows the previous snapshot
/// until the refetch lands.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    pub filter: FilterSet,
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore::default()
    }

    /// Refetch the task list. Non-admin viewers keep only tasks assigned
    /// to them; that is display scoping, the server returns the full list
    /// either way.
    pub fn refresh(&mut self, client: &mut ApiClient) -> Result<(), TaskStoreError> {
        let mut tasks = client.list_tasks()?;
        if let Some(session) = client.session() {
            scope_to_viewer(&mut tasks, &session.claims);
        }
        self.tasks = tasks;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id.as_deref() == Some(id))
    }

    /// Tasks passing the active filter, in server order.
    pub fn filtered(&self) -> Vec<&Task> {
        apply(&self.tasks, &self.filter)
    }

    /// Create or update depending on id presence, then refetch. Blank
    /// subtasks never reach the server.
    pub fn submit(&mut self, client: &mut ApiClient, mut task: Task) -> Result<Task, TaskStoreError> {
        if task.title.trim().is_empty() {
            return Err(TaskStoreError::EmptyTitle);
        }
        task.prune_blank_subtasks();
        let saved = match task.id.clone() {
            Some(id) => client.update_task(&id, &task)?,
            None => client.create_task(&task)?,
        };
        self.refresh(client)?;
        Ok(saved)
    }

    /// Delete on the server, then drop the local copy. No refetch; the next
    /// refresh reconciles anyway.
    pub fn remove(&mut self, client: &mut ApiClient, id: &str) -> Result<(), TaskStoreError> {
        client.delete_task(id)?;
        self.tasks.retain(|t| t.id.as_deref() != Some(id));
        Ok(())
    }

    /// Status change from a board drop: one update, then one refetch.
    pub fn set_status(
        &mut self,
        client: &mut ApiClient,
        id: &str,
        status: &str,
    ) -> Result<(), TaskStoreError> {
        let mut task = self
            .get(id)
            .cloned()
            .ok_or_else(|| TaskStoreError::NotFound(id.to_string()))?;
        task.status = status.to_string();
        client.update_task(id, &task)?;
        self.refresh(client)
    }

    /// Assignee change from a board drop in by-assignee view: the
    /// destination assignee replaces the source one. One update, one refetch.
    pub fn reassign(
        &mut self,
        client: &mut ApiClient,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<(), TaskStoreError> {
        let mut task = self
            .get(id)
            .cloned()
            .ok_or_else(|| TaskStoreError::NotFound(id.to_string()))?;
        task.assigned_to = replace_assignee(&task.assigned_to, from, to);
        client.update_task(id, &task)?;
        self.refresh(client)
    }

    /// Append a subtask through the nested route, then refetch.
    pub fn add_subtask(
        &mut self,
        client: &mut ApiClient,
        task_id: &str,
        title: &str,
    ) -> Result<(), TaskStoreError> {
        if title.trim().is_empty() {
            return Err(TaskStoreError::EmptyTitle);
        }
        client.add_subtask(task_id, &Subtask::new(title))?;
        self.refresh(client)
    }

    /// Flip one subtask's done flag without resubmitting the whole task.
    pub fn set_subtask_done(
        &mut self,
        client: &mut ApiClient,
        task_id: &str,
        subtask_id: &str,
        done: bool,
    ) -> Result<(), TaskStoreError> {
        let mut subtask = self
            .get(task_id)
            .ok_or_else(|| TaskStoreError::NotFound(task_id.to_string()))?
            .sub_tasks
            .iter()
            .find(|s| s.id.as_deref() == Some(subtask_id))
            .cloned()
            .ok_or_else(|| TaskStoreError::NotFound(subtask_id.to_string()))?;
        subtask.done = done;
        client.update_subtask(task_id, subtask_id, &subtask)?;
        self.refresh(client)
    }

    /// Delete one subtask through the nested route, then refetch.
    pub fn remove_subtask(
        &mut self,
        client: &mut ApiClient,
        task_id: &str,
        subtask_id: &str,
    ) -> Result<(), TaskStoreError> {
        client.delete_subtask(task_id, subtask_id)?;
        self.refresh(client)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Narrow the list for non-admin viewers: only tasks they are assigned to.
fn scope_to_viewer(tasks: &mut Vec<Task>, claims: &Claims) {
    if !claims.is_admin {
        tasks.retain(|t| t.is_assigned_to(&claims.id));
    }
}

/// Swap `from` for `to` in an assignee list. If `to` was already present
/// the source entry just disappears; nothing is ever listed twice.
fn replace_assignee(assigned: &[String], from: &str, to: &str) -> Vec<String> {
    let mut next: Vec<String> = Vec::with_capacity(assigned.len());
    for a in assigned {
        let a = if a == from { to } else { a.as_str() };
        if !next.iter().any(|n| n == a) {
            next.push(a.to_string());
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn claims(id: &str, admin: bool) -> Claims {
        Claims {
            id: id.into(),
            name: String::new(),
            email: String::new(),
            is_admin: admin,
            exp: 0,
        }
    }

    fn task(id: &str, assignees: &[&str]) -> Task {
        let mut t = Task::new(id, "s-todo");
        t.id = Some(id.into());
        t.assigned_to = assignees.iter().map(|s| s.to_string()).collect();
        t
    }

    #[test]
    fn admin_sees_everything() {
        let mut tasks = vec![task("a", &["u1"]), task("b", &[])];
        scope_to_viewer(&mut tasks, &claims("u9", true));
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn non_admin_sees_only_assigned_tasks() {
        let mut tasks = vec![task("a", &["u1"]), task("b", &["u2"]), task("c", &["u2", "u1"])];
        scope_to_viewer(&mut tasks, &claims("u1", false));
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn replace_assignee_swaps_in_place() {
        let out = replace_assignee(&["u1".into(), "u2".into()], "u1", "u3");
        assert_eq!(out, vec!["u3", "u2"]);
    }

    #[test]
    fn replace_assignee_dedups_when_target_present() {
        let out = replace_assignee(&["u1".into(), "u2".into()], "u1", "u2");
        assert_eq!(out, vec!["u2"]);
    }

    #[test]
    fn replace_assignee_without_source_changes_nothing() {
        let out = replace_assignee(&["u2".into()], "u1", "u3");
        assert_eq!(out, vec!["u2"]);
    }
}
