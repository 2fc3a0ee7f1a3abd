use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Persisted TUI state (written to state.json in the config dir)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Which view is showing ("board", "notes", "admin")
    pub view: String,
    /// Board view mode ("status", "assignee")
    #[serde(default)]
    pub view_mode: String,
    /// Which reference list the admin view last showed ("clients", ...)
    #[serde(default)]
    pub admin_tab: String,
    /// Cursor column on the board
    #[serde(default)]
    pub board_column: usize,
    /// Cursor row on the board
    #[serde(default)]
    pub board_row: usize,
}

/// Read state.json from the given directory
pub fn read_ui_state(dir: &Path) -> Option<UiState> {
    let path = dir.join("state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write state.json to the given directory
pub fn write_ui_state(dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = dir.join("state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let state = UiState {
            view: "board".into(),
            view_mode: "assignee".into(),
            admin_tab: "clients".into(),
            board_column: 2,
            board_row: 7,
        };

        write_ui_state(dir.path(), &state).unwrap();
        let loaded = read_ui_state(dir.path()).unwrap();

        assert_eq!(loaded.view, "board");
        assert_eq!(loaded.view_mode, "assignee");
        assert_eq!(loaded.admin_tab, "clients");
        assert_eq!(loaded.board_column, 2);
        assert_eq!(loaded.board_row, 7);
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("state.json"), "not json {{{").unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_minimal_object() {
        // `view` is required (no #[serde(default)]), other fields have defaults
        let state: UiState = serde_json::from_str(r#"{"view":"board"}"#).unwrap();
        assert_eq!(state.view, "board");
        assert_eq!(state.view_mode, "");
        assert_eq!(state.admin_tab, "");
        assert_eq!(state.board_column, 0);
        assert_eq!(state.board_row, 0);
    }
}
