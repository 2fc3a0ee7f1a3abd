use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::api::{ApiClient, ApiError};
use crate::model::{RefEntity, RefKind};

/// Error type for reference-entity operations
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("no {0} with id {1}")]
    NotFound(&'static str, String),
    #[error("could not read image {path}: {source}")]
    Image {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Cached reference lists, one slot per kind. All seven management screens
/// and the filter panel read from here; the task form's pickers too.
#[derive(Debug, Default)]
pub struct RefStore {
    lists: HashMap<RefKind, Vec<RefEntity>>,
}

impl RefStore {
    pub fn new() -> Self {
        RefStore::default()
    }

    /// Refetch one kind's list.
    pub fn load(&mut self, client: &mut ApiClient, kind: RefKind) -> Result<(), RefError> {
        let list = client.list_refs(kind)?;
        self.lists.insert(kind, list);
        Ok(())
    }

    /// Everything the board, pickers, and filter panel need in one go.
    pub fn load_all(&mut self, client: &mut ApiClient) -> Result<(), RefError> {
        for kind in RefKind::ALL {
            self.load(client, kind)?;
        }
        Ok(())
    }

    /// Kinds never loaded read as empty.
    pub fn list(&self, kind: RefKind) -> &[RefEntity] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn statuses(&self) -> &[RefEntity] {
        self.list(RefKind::Status)
    }

    pub fn users(&self) -> &[RefEntity] {
        self.list(RefKind::User)
    }

    pub fn get(&self, kind: RefKind, id: &str) -> Option<&RefEntity> {
        self.list(kind).iter().find(|e| e.id.as_deref() == Some(id))
    }

    pub fn find_by_name(&self, kind: RefKind, name: &str) -> Option<&RefEntity> {
        self.list(kind).iter().find(|e| e.name == name)
    }

    /// Display name for a user id, searching users then collaborators,
    /// falling back to the raw id.
    pub fn display_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        for kind in [RefKind::User, RefKind::Collaborator] {
            if let Some(user) = self
                .list(kind)
                .iter()
                .find(|u| u.id.as_deref() == Some(user_id))
            {
                return &user.name;
            }
        }
        user_id
    }

    /// Create or update depending on id presence, then refetch the list.
    /// For image-bearing kinds an image file is uploaded first and the
    /// returned URL lands in the payload; a replaced upload is deleted
    /// once the update has gone through.
    pub fn submit(
        &mut self,
        client: &mut ApiClient,
        kind: RefKind,
        mut entity: RefEntity,
        image: Option<&Path>,
    ) -> Result<RefEntity, RefError> {
        if entity.name.trim().is_empty() {
            return Err(RefError::EmptyName);
        }
        let previous_image = entity
            .id
            .as_deref()
            .and_then(|id| self.get(kind, id))
            .and_then(|prev| prev.image.clone());
        let mut uploaded = false;
        if let Some(path) = image {
            if kind.has_image() {
                entity.image = Some(upload_image(client, path)?);
                uploaded = true;
            }
        }
        let saved = match entity.id.clone() {
            Some(id) => client.update_ref(kind, &id, &entity)?,
            None => client.create_ref(kind, &entity)?,
        };
        if uploaded {
            if let Some(old) = previous_image {
                if saved.image.as_deref() != Some(old.as_str()) {
                    drop_upload(client, &old);
                }
            }
        }
        self.load(client, kind)?;
        Ok(saved)
    }

    pub fn rename(
        &mut self,
        client: &mut ApiClient,
        kind: RefKind,
        id: &str,
        new_name: &str,
    ) -> Result<RefEntity, RefError> {
        let mut entity = self
            .get(kind, id)
            .cloned()
            .ok_or_else(|| RefError::NotFound(kind.singular(), id.to_string()))?;
        entity.name = new_name.trim().to_string();
        self.submit(client, kind, entity, None)
    }

    /// Execute a delete. The confirm step lives with the caller; by the
    /// time this runs the decision is made. The entity's upload, if any,
    /// goes with it.
    pub fn remove(
        &mut self,
        client: &mut ApiClient,
        kind: RefKind,
        id: &str,
    ) -> Result<(), RefError> {
        let image = self.get(kind, id).and_then(|e| e.image.clone());
        client.delete_ref(kind, id)?;
        if let Some(url) = image {
            drop_upload(client, &url);
        }
        if let Some(list) = self.lists.get_mut(&kind) {
            list.retain(|e| e.id.as_deref() != Some(id));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn seed(&mut self, kind: RefKind, list: Vec<RefEntity>) {
        self.lists.insert(kind, list);
    }
}

fn upload_image(client: &mut ApiClient, path: &Path) -> Result<String, RefError> {
    let bytes = std::fs::read(path).map_err(|e| RefError::Image {
        path: path.to_path_buf(),
        source: e,
    })?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.bin");
    let mime = crate::api::client::guess_mime(filename);
    let resp = client.upload(filename, mime, &bytes)?;
    Ok(resp.file.url)
}

/// Drop an upload by its URL, best effort. Only called once nothing
/// points at the file any more.
fn drop_upload(client: &mut ApiClient, url: &str) {
    if let Some(filename) = url.rsplit('/').next().filter(|s| !s.is_empty()) {
        let _ = client.delete_upload(filename);
    }
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
    fn unloaded_kind_reads_empty() {
        let store = RefStore::new();
        assert!(store.list(RefKind::Client).is_empty());
    }

    #[test]
    fn display_name_checks_users_then_collaborators() {
        let mut store = RefStore::new();
        store.seed(RefKind::User, vec![entity("u1", "Ana")]);
        store.seed(RefKind::Collaborator, vec![entity("c1", "Bruno")]);

        assert_eq!(store.display_name("u1"), "Ana");
        assert_eq!(store.display_name("c1"), "Bruno");
        assert_eq!(store.display_name("nobody"), "nobody");
    }

    #[test]
    fn lookup_by_id_and_name() {
        let mut store = RefStore::new();
        store.seed(RefKind::Tag, vec![entity("t1", "backend"), entity("t2", "ui")]);

        assert_eq!(store.get(RefKind::Tag, "t2").unwrap().name, "ui");
        assert_eq!(
            store.find_by_name(RefKind::Tag, "backend").unwrap().id.as_deref(),
            Some("t1")
        );
        assert!(store.get(RefKind::Client, "t1").is_none());
    }
}
