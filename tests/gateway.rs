//! Gateway behavior against a live socket: bearer auth, the single
//! renew-and-replay on 401, and forced logout when renewal cannot help.

mod common;

use common::{StubServer, fake_jwt, far_exp};
use plank::api::{ApiClient, ApiError};
use plank::model::RefKind;
use plank::ops::ref_store::RefStore;
use plank::ops::task_store::TaskStore;

fn token_response(token: &str, refresh: &str) -> String {
    serde_json::json!({ "token": token, "refreshToken": refresh }).to_string()
}

// ---------------------------------------------------------------------------
// Login and session persistence
// ---------------------------------------------------------------------------

#[test]
fn login_stores_session_and_writes_the_file() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let body = token_response(&token, "r1");
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, body.clone()),
        _ => (404, "{}".into()),
    });

    let dir = tempfile::TempDir::new().unwrap();
    let session_file = dir.path().join("session.json");
    let mut client =
        ApiClient::new(&server.base_url).with_session_file(session_file.clone());
    assert!(!client.is_logged_in());

    let session = client.login("ana@test.io", "pw").unwrap();
    assert_eq!(session.claims.name, "Ana");
    assert!(session.claims.is_admin);
    assert!(client.is_logged_in());
    assert!(session_file.exists());
    assert_eq!(server.requests(), vec!["POST /login"]);

    // A second client picks the session up from disk.
    let reloaded = ApiClient::new(&server.base_url).with_session_file(session_file);
    assert_eq!(reloaded.session().unwrap().token, token);
}

#[test]
fn login_failure_is_not_retried() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (401, r#"{"message":"wrong password"}"#.into()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    let err = client.login("ana@test.io", "nope").unwrap_err();
    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "wrong password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!client.is_logged_in());
    // No renewal attempt for a credentials failure.
    assert_eq!(server.requests(), vec!["POST /login"]);
}

#[test]
fn no_request_without_a_session() {
    let server = StubServer::start(|_| (200, "[]".into()));
    let mut client = ApiClient::new(&server.base_url);

    let err = client.list_tasks().unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(server.requests().is_empty());
}

// ---------------------------------------------------------------------------
// The 401 renew-and-replay cycle
// ---------------------------------------------------------------------------

#[test]
fn renews_once_and_replays_after_401() {
    let stale = fake_jwt("u1", "Ana", true, far_exp());
    let fresh = fake_jwt("u1", "Ana", true, far_exp() + 99);

    let login_body = token_response(&stale, "r1");
    let renew_body = token_response(&fresh, "r2");
    let accepted = fresh.clone();
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("POST", "/refresh-token") => (200, renew_body.clone()),
        ("GET", "/tasks") => {
            if req.bearer.as_deref() == Some(accepted.as_str()) {
                (200, "[]".into())
            } else {
                (401, "{}".into())
            }
        }
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    let tasks = client.list_tasks().unwrap();
    assert!(tasks.is_empty());
    assert_eq!(
        server.requests(),
        vec![
            "POST /login",
            "GET /tasks",
            "POST /refresh-token",
            "GET /tasks",
        ]
    );
    // The renewed token replaced the stale one.
    assert_eq!(client.session().unwrap().token, fresh);
    assert_eq!(client.session().unwrap().refresh_token, "r2");
}

#[test]
fn failed_renewal_clears_the_session() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("POST", "/refresh-token") => (401, "{}".into()),
        ("GET", "/tasks") => (401, "{}".into()),
        _ => (404, "{}".into()),
    });

    let dir = tempfile::TempDir::new().unwrap();
    let session_file = dir.path().join("session.json");
    let mut client =
        ApiClient::new(&server.base_url).with_session_file(session_file.clone());
    client.login("ana@test.io", "pw").unwrap();
    assert!(session_file.exists());

    let err = client.list_tasks().unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!client.is_logged_in());
    assert!(!session_file.exists());
    assert_eq!(
        server.requests(),
        vec!["POST /login", "GET /tasks", "POST /refresh-token"]
    );
}

#[test]
fn second_401_after_renewal_gives_up() {
    let stale = fake_jwt("u1", "Ana", true, far_exp());
    let fresh = fake_jwt("u1", "Ana", true, far_exp() + 99);

    let login_body = token_response(&stale, "r1");
    let renew_body = token_response(&fresh, "r2");
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("POST", "/refresh-token") => (200, renew_body.clone()),
        // The server rejects even the renewed token.
        ("GET", "/tasks") => (401, "{}".into()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    let err = client.list_tasks().unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!client.is_logged_in());
    // Exactly one replay, never a loop.
    assert_eq!(
        server.requests(),
        vec![
            "POST /login",
            "GET /tasks",
            "POST /refresh-token",
            "GET /tasks",
        ]
    );
}

// ---------------------------------------------------------------------------
// Request shape
// ---------------------------------------------------------------------------

#[test]
fn bearer_rides_every_data_request() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let expected = token.clone();
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("GET", "/tasks") | ("GET", "/notes") | ("GET", "/status") => {
            if req.bearer.as_deref() == Some(expected.as_str()) {
                (200, "[]".into())
            } else {
                (401, "{}".into())
            }
        }
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    client.list_tasks().unwrap();
    client.list_notes().unwrap();
    client.list_refs(RefKind::Status).unwrap();
    assert_eq!(
        server.requests(),
        vec!["POST /login", "GET /tasks", "GET /notes", "GET /status"]
    );
}

#[test]
fn error_bodies_surface_their_message() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("GET", "/tasks") => (500, r#"{"message":"database on fire"}"#.into()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    match client.list_tasks().unwrap_err() {
        ApiError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database on fire");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Store write patterns over the wire
// ---------------------------------------------------------------------------

#[test]
fn status_move_is_one_update_one_refetch() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let task_list = r#"[{"_id":"t1","title":"Ship it","status":"s-todo"}]"#;
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("GET", "/tasks") => (200, task_list.into()),
        // Echo the update back the way the server does.
        ("PUT", "/tasks/t1") => (200, req.body.clone()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    let mut store = TaskStore::new();
    store.refresh(&mut client).unwrap();
    store.set_status(&mut client, "t1", "s-doing").unwrap();

    assert_eq!(
        server.requests(),
        vec![
            "POST /login",
            "GET /tasks",
            "PUT /tasks/t1",
            "GET /tasks",
        ]
    );
}

#[test]
fn delete_skips_the_refetch() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let task_list = r#"[{"_id":"t1","title":"Ship it","status":"s-todo"}]"#;
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("GET", "/tasks") => (200, task_list.into()),
        ("DELETE", "/tasks/t1") => (200, "{}".into()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    let mut store = TaskStore::new();
    store.refresh(&mut client).unwrap();
    store.remove(&mut client, "t1").unwrap();

    assert!(store.get("t1").is_none());
    assert_eq!(
        server.requests(),
        vec!["POST /login", "GET /tasks", "DELETE /tasks/t1"]
    );
}

#[test]
fn subtask_edits_ride_the_nested_routes() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let task_list = r#"[{"_id":"t1","title":"Ship it","status":"s-todo",
        "subTasks":[{"_id":"st1","title":"Docs","done":false}]}]"#;
    let task_echo = r#"{"_id":"t1","title":"Ship it","status":"s-todo"}"#;
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("GET", "/tasks") => (200, task_list.into()),
        ("POST", "/tasks/t1/subtasks") => (200, task_echo.into()),
        ("PUT", "/tasks/t1/subtasks/st1") => (200, task_echo.into()),
        ("DELETE", "/tasks/t1/subtasks/st1") => (200, "{}".into()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    let mut store = TaskStore::new();
    store.refresh(&mut client).unwrap();
    store.add_subtask(&mut client, "t1", "Tests").unwrap();
    store.set_subtask_done(&mut client, "t1", "st1", true).unwrap();
    store.remove_subtask(&mut client, "t1", "st1").unwrap();

    assert_eq!(
        server.requests(),
        vec![
            "POST /login",
            "GET /tasks",
            "POST /tasks/t1/subtasks",
            "GET /tasks",
            "PUT /tasks/t1/subtasks/st1",
            "GET /tasks",
            "DELETE /tasks/t1/subtasks/st1",
            "GET /tasks",
        ]
    );
}

// ---------------------------------------------------------------------------
// Upload lifecycle
// ---------------------------------------------------------------------------

#[test]
fn replacing_an_image_drops_the_old_upload() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let clients = r#"[{"_id":"c1","name":"Acme","image":"http://files.test/uploads/old.png"}]"#;
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("GET", "/clients") => (200, clients.into()),
        ("POST", "/upload") => (
            200,
            r#"{"file":{"url":"http://files.test/uploads/new.png"}}"#.into(),
        ),
        ("PUT", "/clients/c1") => (
            200,
            r#"{"_id":"c1","name":"Acme","image":"http://files.test/uploads/new.png"}"#.into(),
        ),
        ("DELETE", "/uploads/old.png") => (200, "{}".into()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let image = dir.path().join("logo.png");
    std::fs::write(&image, b"png bytes").unwrap();

    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Client).unwrap();
    let entity = refs.get(RefKind::Client, "c1").unwrap().clone();
    refs.submit(&mut client, RefKind::Client, entity, Some(&image))
        .unwrap();

    assert_eq!(
        server.requests(),
        vec![
            "POST /login",
            "GET /clients",
            "POST /upload",
            "PUT /clients/c1",
            "DELETE /uploads/old.png",
            "GET /clients",
        ]
    );
}

#[test]
fn deleting_an_entity_drops_its_upload() {
    let token = fake_jwt("u1", "Ana", true, far_exp());
    let login_body = token_response(&token, "r1");
    let clients = r#"[{"_id":"c1","name":"Acme","image":"http://files.test/uploads/logo.png"}]"#;
    let server = StubServer::start(move |req| match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/login") => (200, login_body.clone()),
        ("GET", "/clients") => (200, clients.into()),
        ("DELETE", "/clients/c1") => (200, "{}".into()),
        ("DELETE", "/uploads/logo.png") => (200, "{}".into()),
        _ => (404, "{}".into()),
    });

    let mut client = ApiClient::new(&server.base_url);
    client.login("ana@test.io", "pw").unwrap();

    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Client).unwrap();
    refs.remove(&mut client, RefKind::Client, "c1").unwrap();

    assert!(refs.get(RefKind::Client, "c1").is_none());
    assert_eq!(
        server.requests(),
        vec![
            "POST /login",
            "GET /clients",
            "DELETE /clients/c1",
            "DELETE /uploads/logo.png",
        ]
    );
}
