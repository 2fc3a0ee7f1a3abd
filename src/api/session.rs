//! Token session: who is logged in, and for how much longer.
//!
//! The server hands back a JWT on login. We never verify its signature
//! (that is the server's job) but we do decode the payload segment to get
//! the user's identity and the `exp` claim that drives the expiry countdown.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token is not a JWT")]
    NotAJwt,
    #[error("could not decode token payload: {0}")]
    Payload(String),
}

/// Identity claims carried in the access token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Where the session stands relative to its `exp` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    Active,
    /// Inside the warning window; countdown shown in the status row.
    Warning { remaining_secs: i64 },
    Expired,
}

/// A logged-in session: the raw tokens plus the decoded claims.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub refresh_token: String,
    pub claims: Claims,
}

impl Session {
    /// Build a session from the tokens returned by login or renewal.
    pub fn from_tokens(
        token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Session, SessionError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Session {
            token,
            refresh_token: refresh_token.into(),
            claims,
        })
    }

    pub fn expiry_state(&self, now: DateTime<Utc>, warn_secs: u64) -> ExpiryState {
        let remaining = self.claims.exp - now.timestamp();
        if remaining <= 0 {
            ExpiryState::Expired
        } else if remaining <= warn_secs as i64 {
            ExpiryState::Warning {
                remaining_secs: remaining,
            }
        } else {
            ExpiryState::Active
        }
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next()) {
        (Some(_header), Some(payload)) => payload,
        _ => return Err(SessionError::NotAJwt),
    };
    // Some issuers pad their base64url; the decoder here does not want it.
    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| SessionError::Payload(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| SessionError::Payload(e.to_string()))
}

// On-disk shape matches the wire: camelCase keys.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFile {
    token: String,
    refresh_token: String,
}

/// Read session.json; None if absent, unreadable, or its token no longer decodes.
pub fn load_session(path: &Path) -> Option<Session> {
    let content = fs::read_to_string(path).ok()?;
    let file: SessionFile = serde_json::from_str(&content).ok()?;
    Session::from_tokens(file.token, file.refresh_token).ok()
}

/// Write session.json, creating the parent dir if needed.
pub fn save_session(path: &Path, session: &Session) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = SessionFile {
        token: session.token.clone(),
        refresh_token: session.refresh_token.clone(),
    };
    let content = serde_json::to_string_pretty(&file)?;
    fs::write(path, content)
}

/// Remove session.json. Missing file is fine.
pub fn clear_session(path: &Path) {
    let _ = fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fake_token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{header}.{payload}.fakesig")
    }

    #[test]
    fn decodes_identity_claims() {
        let token = fake_token(&serde_json::json!({
            "id": "u1",
            "name": "Ana",
            "email": "ana@example.com",
            "isAdmin": true,
            "exp": 1_900_000_000i64,
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.id, "u1");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.email, "ana@example.com");
        assert!(claims.is_admin);
        assert_eq!(claims.exp, 1_900_000_000);
    }

    #[test]
    fn accepts_underscore_id_key() {
        let token = fake_token(&serde_json::json!({
            "_id": "u2",
            "exp": 1_900_000_000i64,
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.id, "u2");
        assert!(!claims.is_admin);
        assert_eq!(claims.name, "");
    }

    #[test]
    fn rejects_non_jwt() {
        assert!(matches!(decode_claims("nodots"), Err(SessionError::NotAJwt)));
    }

    #[test]
    fn rejects_garbage_payload() {
        let err = decode_claims("aGVhZGVy.!!!.sig").unwrap_err();
        assert!(matches!(err, SessionError::Payload(_)));
    }

    #[test]
    fn tolerates_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE
            .encode(serde_json::to_vec(&serde_json::json!({"id": "u3", "exp": 5i64})).unwrap());
        let token = format!("h.{payload}.s");
        assert_eq!(decode_claims(&token).unwrap().id, "u3");
    }

    #[test]
    fn expiry_states_around_threshold() {
        let token = fake_token(&serde_json::json!({"id": "u1", "exp": 1_000i64}));
        let session = Session::from_tokens(token, "r").unwrap();
        let at = |secs: i64| Utc.timestamp_opt(secs, 0).unwrap();

        assert_eq!(session.expiry_state(at(900), 20), ExpiryState::Active);
        assert_eq!(
            session.expiry_state(at(980), 20),
            ExpiryState::Warning { remaining_secs: 20 }
        );
        assert_eq!(
            session.expiry_state(at(999), 20),
            ExpiryState::Warning { remaining_secs: 1 }
        );
        assert_eq!(session.expiry_state(at(1_000), 20), ExpiryState::Expired);
        assert_eq!(session.expiry_state(at(2_000), 20), ExpiryState::Expired);
    }

    #[test]
    fn session_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let token = fake_token(&serde_json::json!({"id": "u1", "name": "Ana", "exp": 99i64}));
        let session = Session::from_tokens(token, "refresh-1").unwrap();

        save_session(&path, &session).unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.token, session.token);
        assert_eq!(loaded.refresh_token, "refresh-1");
        assert_eq!(loaded.claims.name, "Ana");

        clear_session(&path);
        assert!(load_session(&path).is_none());
        // Clearing twice must not blow up.
        clear_session(&path);
    }

    #[test]
    fn load_rejects_undecodable_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{"token": "not-a-jwt", "refreshToken": "r"}"#,
        )
        .unwrap();
        assert!(load_session(&path).is_none());
    }
}
