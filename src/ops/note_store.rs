use crate::api::{ApiClient, ApiResult};
use crate::model::Note;

/// Cached sticky notes. Same write-then-refetch discipline as tasks; no
/// client-side validation, a note can say anything.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        NoteStore::default()
    }

    pub fn refresh(&mut self, client: &mut ApiClient) -> ApiResult<()> {
        self.notes = client.list_notes()?;
        Ok(())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id.as_deref() == Some(id))
    }

    /// Create or update depending on id presence, then refetch.
    pub fn submit(&mut self, client: &mut ApiClient, note: Note) -> ApiResult<Note> {
        let saved = match note.id.clone() {
            Some(id) => client.update_note(&id, &note)?,
            None => client.create_note(&note)?,
        };
        self.refresh(client)?;
        Ok(saved)
    }

    /// Delete on the server, then drop the local copy.
    pub fn remove(&mut self, client: &mut ApiClient, id: &str) -> ApiResult<()> {
        client.delete_note(id)?;
        self.notes.retain(|n| n.id.as_deref() != Some(id));
        Ok(())
    }
}
