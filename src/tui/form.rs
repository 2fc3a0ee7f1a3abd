use crate::model::note::Note;
use crate::model::refdata::{RefEntity, RefKind};
use crate::model::task::{Subtask, Task, parse_due_day};
use crate::util::text::{next_boundary, prev_boundary, scrub};

// ---------------------------------------------------------------------------
// Field primitives
// ---------------------------------------------------------------------------

/// A single-line text buffer with a byte-offset cursor.
///
/// The cursor always sits on a grapheme boundary; movement goes through
/// `util::text` so multi-byte input behaves.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        InputField { value, cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert pasted text at the cursor, flattening control characters.
    pub fn insert_str(&mut self, s: &str) {
        let clean = scrub(s);
        self.value.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = prev_boundary(&self.value, self.cursor) {
            self.value.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = next_boundary(&self.value, self.cursor) {
            self.value.replace_range(self.cursor..next, "");
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = prev_boundary(&self.value, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = next_boundary(&self.value, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Trimmed value, or None when blank.
    pub fn opt(&self) -> Option<String> {
        let v = self.value.trim();
        if v.is_empty() { None } else { Some(v.to_string()) }
    }
}

/// Single-choice picker over `(key, label)` options.
#[derive(Debug, Clone, Default)]
pub struct SelectField {
    pub options: Vec<(String, String)>,
    pub chosen: usize,
}

impl SelectField {
    /// Build from options, pre-selecting the entry whose key matches.
    /// An unknown key keeps index 0 so the picker never points nowhere.
    pub fn new(options: Vec<(String, String)>, chosen_key: &str) -> Self {
        let chosen = options
            .iter()
            .position(|(key, _)| key == chosen_key)
            .unwrap_or(0);
        SelectField { options, chosen }
    }

    pub fn next(&mut self) {
        if !self.options.is_empty() {
            self.chosen = (self.chosen + 1) % self.options.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.options.is_empty() {
            self.chosen = (self.chosen + self.options.len() - 1) % self.options.len();
        }
    }

    pub fn chosen_key(&self) -> Option<&str> {
        self.options.get(self.chosen).map(|(key, _)| key.as_str())
    }

    pub fn chosen_label(&self) -> Option<&str> {
        self.options.get(self.chosen).map(|(_, label)| label.as_str())
    }
}

/// Multi-choice picker: a cursor over `(key, label)` options with a
/// toggled-membership bit per option.
#[derive(Debug, Clone, Default)]
pub struct MultiSelectField {
    pub options: Vec<(String, String)>,
    pub selected: Vec<bool>,
    pub cursor: usize,
}

impl MultiSelectField {
    pub fn new(options: Vec<(String, String)>, selected_keys: &[String]) -> Self {
        let selected = options
            .iter()
            .map(|(key, _)| selected_keys.iter().any(|k| k == key))
            .collect();
        MultiSelectField {
            options,
            selected,
            cursor: 0,
        }
    }

    pub fn next(&mut self) {
        if !self.options.is_empty() {
            self.cursor = (self.cursor + 1) % self.options.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.options.is_empty() {
            self.cursor = (self.cursor + self.options.len() - 1) % self.options.len();
        }
    }

    pub fn toggle(&mut self) {
        if let Some(flag) = self.selected.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    /// Keys of the selected options, in option order.
    pub fn selected_keys(&self) -> Vec<String> {
        self.options
            .iter()
            .zip(&self.selected)
            .filter(|(_, on)| **on)
            .map(|((key, _), _)| key.clone())
            .collect()
    }

    pub fn selected_labels(&self) -> Vec<&str> {
        self.options
            .iter()
            .zip(&self.selected)
            .filter(|(_, on)| **on)
            .map(|((_, label), _)| label.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Task form
// ---------------------------------------------------------------------------

/// One editable subtask row.
#[derive(Debug, Clone)]
pub struct SubtaskRow {
    pub id: Option<String>,
    pub title: InputField,
    pub done: bool,
}

/// Fields of the task form, in focus order. `Subtask(i)` rows follow
/// the fixed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Status,
    Priority,
    Due,
    Clients,
    Projects,
    Products,
    Tags,
    Assignees,
    Subtask(usize),
}

/// Number of fields before the subtask rows.
const FIXED_FIELDS: usize = 10;

/// Editor state for creating or updating a task.
///
/// Option lists are snapshotted from the reference caches when the form
/// opens; names picked here are written back onto the task the way the
/// wire format stores them (names for client/project/product/tag,
/// user ids for assignees, a status id for the column).
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub id: Option<String>,
    pub title: InputField,
    pub description: InputField,
    pub status: SelectField,
    pub priority: InputField,
    pub due: InputField,
    pub clients: MultiSelectField,
    pub projects: MultiSelectField,
    pub products: MultiSelectField,
    pub tags: MultiSelectField,
    pub assignees: MultiSelectField,
    pub subtasks: Vec<SubtaskRow>,
    pub focus: usize,
    pub submitting: bool,
}

/// `(name, name)` option pairs for the dimensions the wire format stores
/// by display name.
fn name_options(entities: &[RefEntity]) -> Vec<(String, String)> {
    entities
        .iter()
        .map(|e| (e.name.clone(), e.name.clone()))
        .collect()
}

/// `(id, name)` option pairs; entities the server never assigned an id
/// are skipped since they cannot be referenced.
fn id_options(entities: &[RefEntity]) -> Vec<(String, String)> {
    entities
        .iter()
        .filter_map(|e| Some((e.id.clone()?, e.name.clone())))
        .collect()
}

impl TaskForm {
    pub fn from_task(
        task: &Task,
        statuses: &[RefEntity],
        users: &[RefEntity],
        clients: &[RefEntity],
        projects: &[RefEntity],
        products: &[RefEntity],
        tags: &[RefEntity],
    ) -> Self {
        TaskForm {
            id: task.id.clone(),
            title: InputField::new(&task.title),
            description: InputField::new(task.description.clone().unwrap_or_default()),
            status: SelectField::new(id_options(statuses), &task.status),
            priority: InputField::new(task.priority.clone().unwrap_or_default()),
            due: InputField::new(
                task.due_day().map(|d| d.to_string()).unwrap_or_default(),
            ),
            clients: MultiSelectField::new(name_options(clients), &task.client),
            projects: MultiSelectField::new(name_options(projects), &task.project),
            products: MultiSelectField::new(name_options(products), &task.product),
            tags: MultiSelectField::new(name_options(tags), &task.tags),
            assignees: MultiSelectField::new(id_options(users), &task.assigned_to),
            subtasks: task
                .sub_tasks
                .iter()
                .map(|s| SubtaskRow {
                    id: s.id.clone(),
                    title: InputField::new(&s.title),
                    done: s.done,
                })
                .collect(),
            focus: 0,
            submitting: false,
        }
    }

    pub fn field_count(&self) -> usize {
        FIXED_FIELDS + self.subtasks.len()
    }

    pub fn focused(&self) -> TaskField {
        match self.focus {
            0 => TaskField::Title,
            1 => TaskField::Description,
            2 => TaskField::Status,
            3 => TaskField::Priority,
            4 => TaskField::Due,
            5 => TaskField::Clients,
            6 => TaskField::Projects,
            7 => TaskField::Products,
            8 => TaskField::Tags,
            9 => TaskField::Assignees,
            n => TaskField::Subtask(n - FIXED_FIELDS),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.field_count();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.field_count() - 1) % self.field_count();
    }

    /// The text field under focus, if the focused field is one.
    pub fn focused_input(&mut self) -> Option<&mut InputField> {
        match self.focused() {
            TaskField::Title => Some(&mut self.title),
            TaskField::Description => Some(&mut self.description),
            TaskField::Priority => Some(&mut self.priority),
            TaskField::Due => Some(&mut self.due),
            TaskField::Subtask(i) => self.subtasks.get_mut(i).map(|row| &mut row.title),
            _ => None,
        }
    }

    /// The multi-select under focus, if the focused field is one.
    pub fn focused_multi(&mut self) -> Option<&mut MultiSelectField> {
        match self.focused() {
            TaskField::Clients => Some(&mut self.clients),
            TaskField::Projects => Some(&mut self.projects),
            TaskField::Products => Some(&mut self.products),
            TaskField::Tags => Some(&mut self.tags),
            TaskField::Assignees => Some(&mut self.assignees),
            _ => None,
        }
    }

    /// Append an empty subtask row and focus it.
    pub fn add_subtask(&mut self) {
        self.subtasks.push(SubtaskRow {
            id: None,
            title: InputField::default(),
            done: false,
        });
        self.focus = FIXED_FIELDS + self.subtasks.len() - 1;
    }

    /// Remove the focused subtask row, if focus is on one.
    pub fn remove_subtask(&mut self) {
        if let TaskField::Subtask(i) = self.focused() {
            self.subtasks.remove(i);
            if self.focus >= self.field_count() {
                self.focus = self.field_count() - 1;
            }
        }
    }

    /// Toggle done on the focused subtask row, if focus is on one.
    pub fn toggle_subtask(&mut self) {
        if let TaskField::Subtask(i) = self.focused() {
            if let Some(row) = self.subtasks.get_mut(i) {
                row.done = !row.done;
            }
        }
    }

    /// Build the task to submit. The due date is validated here so a
    /// malformed one never reaches the server.
    pub fn to_task(&self) -> Result<Task, String> {
        let due_date = match self.due.opt() {
            Some(raw) => {
                if parse_due_day(&raw).is_none() {
                    return Err(format!("invalid due date: {raw} (use YYYY-MM-DD)"));
                }
                Some(raw)
            }
            None => None,
        };
        let status = self
            .status
            .chosen_key()
            .ok_or_else(|| "no status list loaded".to_string())?
            .to_string();

        Ok(Task {
            id: self.id.clone(),
            title: self.title.value.trim().to_string(),
            description: self.description.opt(),
            status,
            evaluation_status: None,
            priority: self.priority.opt(),
            client: self.clients.selected_keys(),
            project: self.projects.selected_keys(),
            product: self.products.selected_keys(),
            tags: self.tags.selected_keys(),
            created_by: None,
            assigned_to: self.assignees.selected_keys(),
            sub_tasks: self
                .subtasks
                .iter()
                .map(|row| Subtask {
                    id: row.id.clone(),
                    title: row.title.value.trim().to_string(),
                    done: row.done,
                    assigned_to: Vec::new(),
                    due_date: None,
                })
                .collect(),
            due_date,
            created_at: None,
            updated_at: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Reference, note and login forms
// ---------------------------------------------------------------------------

/// Editor state for a reference entity (admin view).
#[derive(Debug, Clone)]
pub struct RefForm {
    pub kind: RefKind,
    pub id: Option<String>,
    pub name: InputField,
    /// Local path of an image to upload; only shown for image-bearing kinds.
    pub image_path: InputField,
    pub focus: usize,
    pub submitting: bool,
}

impl RefForm {
    pub fn new(kind: RefKind) -> Self {
        RefForm {
            kind,
            id: None,
            name: InputField::default(),
            image_path: InputField::default(),
            focus: 0,
            submitting: false,
        }
    }

    pub fn from_entity(kind: RefKind, entity: &RefEntity) -> Self {
        RefForm {
            kind,
            id: entity.id.clone(),
            name: InputField::new(&entity.name),
            image_path: InputField::default(),
            focus: 0,
            submitting: false,
        }
    }

    pub fn field_count(&self) -> usize {
        if self.kind.has_image() { 2 } else { 1 }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.field_count();
    }

    pub fn focused_input(&mut self) -> &mut InputField {
        if self.focus == 1 {
            &mut self.image_path
        } else {
            &mut self.name
        }
    }
}

/// Editor state for a sticky note.
#[derive(Debug, Clone)]
pub struct NoteForm {
    pub id: Option<String>,
    pub content: InputField,
    pub submitting: bool,
}

impl NoteForm {
    pub fn new() -> Self {
        NoteForm {
            id: None,
            content: InputField::default(),
            submitting: false,
        }
    }

    pub fn from_note(note: &Note) -> Self {
        NoteForm {
            id: note.id.clone(),
            content: InputField::new(&note.content),
            submitting: false,
        }
    }
}

/// Email/password prompt shown when no session is present.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: InputField,
    pub password: InputField,
    pub focus: usize,
    pub submitting: bool,
}

impl LoginForm {
    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % 2;
    }

    pub fn focused_input(&mut self) -> &mut InputField {
        if self.focus == 1 {
            &mut self.password
        } else {
            &mut self.email
        }
    }
}
