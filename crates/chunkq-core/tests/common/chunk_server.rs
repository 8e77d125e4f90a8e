//! Minimal HTTP/1.1 server for integration tests: `POST /chunk` and `GET /chunks`.
//!
//! Records every chunk POST (identifiers as strings), tracks how many POSTs
//! are being handled at once, and answers through a caller-supplied closure.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Decides the response for a chunk POST: (ids, attempt number for the first id) -> (status, body).
pub type Responder = Box<dyn Fn(&[String], usize) -> (u16, String) + Send + Sync>;

pub struct ServerOptions {
    /// Response to `GET /chunks`; None answers 404.
    pub chunk_list: Option<(u16, String)>,
    /// Time each request is held before answering.
    pub delay: Duration,
    pub respond: Responder,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            chunk_list: None,
            delay: Duration::from_millis(10),
            respond: Box::new(|ids, _| (200, format!("{{\"received\":{}}}", ids.len()))),
        }
    }
}

struct State {
    opts: ServerOptions,
    active: AtomicUsize,
    max_active: AtomicUsize,
    posts: Mutex<Vec<Vec<String>>>,
    attempts: Mutex<HashMap<String, usize>>,
    list_requests: AtomicUsize,
}

pub struct ChunkServer {
    base: String,
    state: Arc<State>,
}

impl ChunkServer {
    pub fn post_url(&self) -> String {
        format!("{}chunk", self.base)
    }

    pub fn list_url(&self) -> String {
        format!("{}chunks", self.base)
    }

    /// Highest number of POSTs handled simultaneously.
    pub fn max_active(&self) -> usize {
        self.state.max_active.load(Ordering::SeqCst)
    }

    /// Every POST received, in arrival order.
    pub fn posts(&self) -> Vec<Vec<String>> {
        self.state.posts.lock().unwrap().clone()
    }

    pub fn list_requests(&self) -> usize {
        self.state.list_requests.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(opts: ServerOptions) -> ChunkServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(State {
        opts,
        active: AtomicUsize::new(0),
        max_active: AtomicUsize::new(0),
        posts: Mutex::new(Vec::new()),
        attempts: Mutex::new(HashMap::new()),
        list_requests: AtomicUsize::new(0),
    });
    let accept_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&accept_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    ChunkServer {
        base: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

/// A URL on which nothing listens (connection refused).
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/chunk", port)
}

struct Request {
    method: String,
    path: String,
    content_type: String,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let mut content_length = 0usize;
    let mut content_type = String::new();
    let mut expect_continue = false;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("content-type") {
                content_type = value.to_string();
            } else if name.eq_ignore_ascii_case("expect") {
                expect_continue = value.eq_ignore_ascii_case("100-continue");
            }
        }
    }
    let mut body = buf[header_end..].to_vec();
    if expect_continue && body.len() < content_length {
        stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").ok()?;
    }
    while body.len() < content_length {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }
    Some(Request {
        method,
        path,
        content_type,
        body,
    })
}

fn chunk_ids(req: &Request) -> Vec<String> {
    if req.content_type.starts_with("application/json") {
        let v: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
        v.get("chunk")
            .and_then(|c| c.as_array())
            .map(|ids| {
                ids.iter()
                    .map(|id| match id {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    } else {
        url::form_urlencoded::parse(&req.body)
            .filter(|(k, _)| k == "chunk[]")
            .map(|(_, v)| v.into_owned())
            .collect()
    }
}

fn respond(stream: &mut TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    if req.method.eq_ignore_ascii_case("GET") && req.path == "/chunks" {
        state.list_requests.fetch_add(1, Ordering::SeqCst);
        thread::sleep(state.opts.delay);
        match &state.opts.chunk_list {
            Some((status, body)) => respond(&mut stream, *status, body),
            None => respond(&mut stream, 404, "{}"),
        }
        return;
    }

    if req.method.eq_ignore_ascii_case("POST") && req.path == "/chunk" {
        let now = state.active.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_active.fetch_max(now, Ordering::SeqCst);

        let ids = chunk_ids(&req);
        state.posts.lock().unwrap().push(ids.clone());
        let attempt = {
            let mut attempts = state.attempts.lock().unwrap();
            let key = ids.first().cloned().unwrap_or_default();
            let n = attempts.entry(key).or_insert(0);
            *n += 1;
            *n
        };
        thread::sleep(state.opts.delay);
        let (status, body) = (state.opts.respond)(&ids, attempt);

        state.active.fetch_sub(1, Ordering::SeqCst);
        respond(&mut stream, status, &body);
        return;
    }

    respond(&mut stream, 405, "{}");
}
