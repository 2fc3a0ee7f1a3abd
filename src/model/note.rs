use serde::{Deserialize, Serialize};

/// A sticky-note annotation. Free-floating text, unrelated to any task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
}

impl Note {
    pub fn new(content: impl Into<String>) -> Self {
        Note {
            id: None,
            content: content.into(),
        }
    }

    /// First line, for list rows.
    pub fn summary(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape() {
        let note: Note = serde_json::from_str(r#"{"_id":"n1","content":"call Bob\nabout Q3"}"#)
            .unwrap();
        assert_eq!(note.id.as_deref(), Some("n1"));
        assert_eq!(note.summary(), "call Bob");

        let fresh = Note::new("hi");
        let out = serde_json::to_value(&fresh).unwrap();
        assert!(out.get("_id").is_none());
    }
}
