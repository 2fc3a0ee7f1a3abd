//! In-process HTTP stub standing in for the board server. Single-threaded
//! accept loop, one request per connection, scripted by a handler closure.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

pub struct Request {
    pub method: String,
    pub path: String,
    /// Token from an `Authorization: Bearer ...` header, if any.
    pub bearer: Option<String>,
    pub body: String,
}

pub struct StubServer {
    pub base_url: String,
    addr: std::net::SocketAddr,
    log: Arc<Mutex<Vec<String>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Start a server answering every request through `handler`, which
    /// returns `(status, json_body)`.
    pub fn start<H>(handler: H) -> StubServer
    where
        H: Fn(&Request) -> (u16, String) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let log = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let thread_log = Arc::clone(&log);
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            for stream in listener.incoming() {
                if thread_stop.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(stream) = stream else { break };
                if let Some(request) = read_request(&stream) {
                    thread_log
                        .lock()
                        .unwrap()
                        .push(format!("{} {}", request.method, request.path));
                    let (status, body) = handler(&request);
                    write_response(&stream, status, &body);
                }
            }
        });

        StubServer {
            base_url: format!("http://{}", addr),
            addr,
            log,
            stop,
            handle: Some(handle),
        }
    }

    /// Every request seen so far, as "METHOD /path" lines in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // Unblock the accept loop.
        let _ = TcpStream::connect(self.addr);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_request(stream: &TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut bearer = None;
    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "authorization" => bearer = value.strip_prefix("Bearer ").map(str::to_string),
                "content-length" => content_length = value.parse().unwrap_or(0),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some(Request {
        method,
        path,
        bearer,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn write_response(mut stream: &TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// An unsigned JWT whose payload carries the given identity claims. The
/// client never verifies signatures, so "sig" passes.
pub fn fake_jwt(user_id: &str, name: &str, admin: bool, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({
            "_id": user_id,
            "name": name,
            "email": format!("{}@test.io", name.to_lowercase()),
            "isAdmin": admin,
            "exp": exp,
        })
        .to_string(),
    );
    format!("{}.{}.sig", header, payload)
}

/// An expiry far enough out that nothing renews during the test.
pub fn far_exp() -> i64 {
    chrono::Utc::now().timestamp() + 3600
}
