//! HTTP gateway to the board API.
//!
//! Every authenticated request carries a bearer token. On a 401 the client
//! renews the token once and replays the request; a second 401 (or a failed
//! renewal) clears the session so the caller lands back on login. At most
//! one renewal happens per logical request.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::session::{self, Session};
use crate::model::{Note, RefEntity, RefKind, Subtask, Task};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not logged in — run `pk login`")]
    Unauthorized,
    #[error("server said {status}: {message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response from server: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

// Body of /login and /refresh-token responses.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UploadResponse {
    pub file: UploadedFile,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UploadedFile {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
    session: Option<Session>,
    /// When set, login/renew/logout keep this file in sync.
    session_path: Option<PathBuf>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(15))
            .build();
        ApiClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
            session: None,
            session_path: None,
        }
    }

    /// Load any saved session from `path` and keep the file in sync from
    /// here on.
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session = session::load_session(&path);
        self.session_path = Some(path);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    fn install_session(&mut self, session: Session) {
        if let Some(path) = &self.session_path {
            let _ = session::save_session(path, &session);
        }
        self.session = Some(session);
    }

    fn forget_session(&mut self) {
        if let Some(path) = &self.session_path {
            session::clear_session(path);
        }
        self.session = None;
    }

    fn force_logout<T>(&mut self) -> ApiResult<T> {
        self.forget_session();
        Err(ApiError::Unauthorized)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // -----------------------------------------------------------------------
    // Auth (no bearer token on these)
    // -----------------------------------------------------------------------

    pub fn login(&mut self, email: &str, password: &str) -> ApiResult<Session> {
        let url = self.url("/login");
        let resp = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({ "email": email, "password": password }))
            .map_err(map_ureq)?;
        let body: TokenResponse = parse_json(resp)?;
        let session = Session::from_tokens(body.token, body.refresh_token.unwrap_or_default())
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.install_session(session.clone());
        Ok(session)
    }

    /// Log out locally. The server keeps no session state to tear down.
    pub fn logout(&mut self) {
        self.forget_session();
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<()> {
        let url = self.url("/register");
        let resp = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .map_err(map_ureq)?;
        drain(resp)
    }

    /// The reset route predates the rest of the API's English naming;
    /// its path and field names stay as the server defines them.
    pub fn reset_password(&self, email: &str, new_password: &str) -> ApiResult<()> {
        let url = self.url("/reset-senha");
        let resp = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({ "email": email, "novaSenha": new_password }))
            .map_err(map_ureq)?;
        drain(resp)
    }

    /// Trade the refresh token for a fresh access token. Any failure here
    /// clears the session; there is nothing else to fall back to.
    pub fn renew(&mut self) -> ApiResult<()> {
        let refresh = match &self.session {
            Some(s) if !s.refresh_token.is_empty() => s.refresh_token.clone(),
            _ => return self.force_logout(),
        };
        let url = self.url("/refresh-token");
        let resp = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({ "refreshToken": refresh }));
        let resp = match resp {
            Ok(r) => r,
            Err(_) => return self.force_logout(),
        };
        let body: TokenResponse = match parse_json(resp) {
            Ok(b) => b,
            Err(_) => return self.force_logout(),
        };
        // The server may rotate the refresh token; keep the old one if not.
        let refresh = body.refresh_token.unwrap_or(refresh);
        match Session::from_tokens(body.token, refresh) {
            Ok(s) => {
                self.install_session(s);
                Ok(())
            }
            Err(_) => self.force_logout(),
        }
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// Send an authenticated request. On 401: renew once, replay once.
    fn with_retry<F>(&mut self, send: F) -> ApiResult<ureq::Response>
    where
        F: Fn(&ureq::Agent, &str) -> Result<ureq::Response, ureq::Error>,
    {
        let token = self.require_token()?;
        match send(&self.agent, &token) {
            Ok(resp) => Ok(resp),
            Err(ureq::Error::Status(401, _)) => {
                self.renew()?;
                let token = self.require_token()?;
                match send(&self.agent, &token) {
                    Ok(resp) => Ok(resp),
                    Err(ureq::Error::Status(401, _)) => self.force_logout(),
                    Err(e) => Err(map_ureq(e)),
                }
            }
            Err(e) => Err(map_ureq(e)),
        }
    }

    fn require_token(&self) -> ApiResult<String> {
        self.session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(ApiError::Unauthorized)
    }

    fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        let resp = self.with_retry(|agent, token| {
            agent
                .get(&url)
                .set("Authorization", &bearer(token))
                .call()
        })?;
        parse_json(resp)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&mut self, path: &str, body: &B) -> ApiResult<T> {
        let url = self.url(path);
        let resp = self.with_retry(|agent, token| {
            agent
                .post(&url)
                .set("Authorization", &bearer(token))
                .send_json(body)
        })?;
        parse_json(resp)
    }

    fn put_json<B: Serialize, T: DeserializeOwned>(&mut self, path: &str, body: &B) -> ApiResult<T> {
        let url = self.url(path);
        let resp = self.with_retry(|agent, token| {
            agent
                .put(&url)
                .set("Authorization", &bearer(token))
                .send_json(body)
        })?;
        parse_json(resp)
    }

    fn delete(&mut self, path: &str) -> ApiResult<()> {
        let url = self.url(path);
        let resp = self.with_retry(|agent, token| {
            agent
                .delete(&url)
                .set("Authorization", &bearer(token))
                .call()
        })?;
        drain(resp)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn list_tasks(&mut self) -> ApiResult<Vec<Task>> {
        self.get_json("/tasks")
    }

    pub fn create_task(&mut self, task: &Task) -> ApiResult<Task> {
        self.post_json("/tasks", task)
    }

    pub fn update_task(&mut self, id: &str, task: &Task) -> ApiResult<Task> {
        self.put_json(&format!("/tasks/{id}"), task)
    }

    pub fn delete_task(&mut self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/tasks/{id}"))
    }

    pub fn add_subtask(&mut self, task_id: &str, subtask: &Subtask) -> ApiResult<Task> {
        self.post_json(&format!("/tasks/{task_id}/subtasks"), subtask)
    }

    pub fn update_subtask(
        &mut self,
        task_id: &str,
        subtask_id: &str,
        subtask: &Subtask,
    ) -> ApiResult<Task> {
        self.put_json(&format!("/tasks/{task_id}/subtasks/{subtask_id}"), subtask)
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> ApiResult<()> {
        self.delete(&format!("/tasks/{task_id}/subtasks/{subtask_id}"))
    }

    // -----------------------------------------------------------------------
    // Reference entities (one endpoint per kind)
    // -----------------------------------------------------------------------

    pub fn list_refs(&mut self, kind: RefKind) -> ApiResult<Vec<RefEntity>> {
        self.get_json(kind.endpoint())
    }

    pub fn create_ref(&mut self, kind: RefKind, entity: &RefEntity) -> ApiResult<RefEntity> {
        self.post_json(kind.endpoint(), entity)
    }

    pub fn update_ref(&mut self, kind: RefKind, id: &str, entity: &RefEntity) -> ApiResult<RefEntity> {
        self.put_json(&format!("{}/{id}", kind.endpoint()), entity)
    }

    pub fn delete_ref(&mut self, kind: RefKind, id: &str) -> ApiResult<()> {
        self.delete(&format!("{}/{id}", kind.endpoint()))
    }

    // -----------------------------------------------------------------------
    // Notes
    // -----------------------------------------------------------------------

    pub fn list_notes(&mut self) -> ApiResult<Vec<Note>> {
        self.get_json("/notes")
    }

    pub fn create_note(&mut self, note: &Note) -> ApiResult<Note> {
        self.post_json("/notes", note)
    }

    pub fn update_note(&mut self, id: &str, note: &Note) -> ApiResult<Note> {
        self.put_json(&format!("/notes/{id}"), note)
    }

    pub fn delete_note(&mut self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/notes/{id}"))
    }

    // -----------------------------------------------------------------------
    // Uploads
    // -----------------------------------------------------------------------

    /// Upload one file as multipart/form-data under the field name `file`.
    /// The body is built by hand; the HTTP layer has no multipart support.
    pub fn upload(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> ApiResult<UploadResponse> {
        let url = self.url("/upload");
        let boundary = multipart_boundary();
        let body = multipart_body(&boundary, filename, mime, bytes);
        let content_type = format!("multipart/form-data; boundary={boundary}");
        let resp = self.with_retry(|agent, token| {
            agent
                .post(&url)
                .set("Authorization", &bearer(token))
                .set("Content-Type", &content_type)
                .send_bytes(&body)
        })?;
        parse_json(resp)
    }

    pub fn delete_upload(&mut self, filename: &str) -> ApiResult<()> {
        self.delete(&format!("/uploads/{filename}"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn parse_json<T: DeserializeOwned>(resp: ureq::Response) -> ApiResult<T> {
    resp.into_json()
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Read and discard a body. Some routes answer 200 with nothing useful.
fn drain(resp: ureq::Response) -> ApiResult<()> {
    let _ = resp.into_string();
    Ok(())
}

fn map_ureq(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, resp) => {
            let text = resp.into_string().unwrap_or_default();
            ApiError::Api {
                status,
                message: error_message(&text),
            }
        }
        ureq::Error::Transport(t) => ApiError::Transport(t.to_string()),
    }
}

/// Pull a human-readable message out of an error body, JSON or not.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request failed".to_string()
    } else {
        trimmed.chars().take(120).collect()
    }
}

fn multipart_boundary() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("----plank-{:x}-{nanos:x}", std::process::id())
}

fn multipart_body(boundary: &str, filename: &str, mime: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Content type from a filename extension; uploads are images in practice.
pub fn guess_mime(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── error bodies ───────────────────────────────────────────────

    #[test]
    fn error_message_prefers_json_message_field() {
        assert_eq!(error_message(r#"{"message": "task not found"}"#), "task not found");
        assert_eq!(error_message(r#"{"error": "bad id"}"#), "bad id");
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        assert_eq!(error_message("Internal Server Error"), "Internal Server Error");
        assert_eq!(error_message("   "), "request failed");
        assert_eq!(error_message(r#"{"unrelated": 1}"#), "request failed");
    }

    // ── multipart framing ──────────────────────────────────────────

    #[test]
    fn multipart_body_is_well_formed() {
        let body = multipart_body("XYZ", "logo.png", "image/png", b"\x89PNG");
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with("--XYZ\r\n"));
        assert!(text.contains("Content-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n"));
        assert!(text.contains("Content-Type: image/png\r\n\r\n"));
        assert!(text.ends_with("\r\n--XYZ--\r\n"));
    }

    #[test]
    fn boundary_is_header_safe() {
        let boundary = multipart_boundary();
        assert!(boundary.starts_with("----plank-"));
        assert!(!boundary.contains(' '));
    }

    // ── mime guessing ──────────────────────────────────────────────

    #[test]
    fn mime_from_extension() {
        assert_eq!(guess_mime("logo.PNG"), "image/png");
        assert_eq!(guess_mime("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_mime("no-extension"), "application/octet-stream");
    }
}
