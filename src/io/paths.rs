use std::path::PathBuf;

/// Plank's config directory, respecting XDG_CONFIG_HOME.
///
/// Everything durable lives here: `config.toml` (connection settings),
/// `session.json` (token pair), `state.json` (UI preferences).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("plank")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

pub fn state_path() -> PathBuf {
    config_dir().join("state.json")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_override_wins() {
        // Env vars are process-global; restore what we clobber.
        let saved = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-test") };
        assert_eq!(config_dir(), PathBuf::from("/tmp/xdg-test/plank"));
        assert!(config_path().ends_with("plank/config.toml"));
        match saved {
            Some(v) => unsafe { std::env::set_var("XDG_CONFIG_HOME", v) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
    }
}
