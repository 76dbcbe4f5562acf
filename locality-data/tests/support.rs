//! In-process HTTP stub standing in for the Firestore REST endpoint.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How the stub answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer `200 OK` with one write result per submitted write.
    Accept,
    /// Answer `200 OK` with the given body verbatim.
    Acknowledge(String),
    /// Answer with `status` and the given JSON body.
    Fail {
        /// HTTP status code to send.
        status: u16,
        /// JSON body to send.
        body: String,
    },
    /// Hold the connection open for the given duration before closing it.
    Stall(Duration),
}

/// A request captured by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request line, e.g. `POST /v1/... HTTP/1.1`.
    pub request_line: String,
    /// Lowercased header names with their values.
    pub headers: Vec<(String, String)>,
    /// Parsed JSON body.
    pub body: serde_json::Value,
}

impl RecordedRequest {
    /// Value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        let wanted = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == wanted)
            .map(|(_, value)| value.as_str())
    }

    /// Writes carried by the commit body.
    pub fn writes(&self) -> Vec<serde_json::Value> {
        self.body
            .get("writes")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// Stub server answering one connection per scripted reply.
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Bind to an ephemeral port and answer `replies` in order.
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for reply in replies {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                serve(stream, &reply, &recorded);
            }
        });
        Self { addr, requests }
    }

    /// Base URL to configure the client with.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn serve(stream: TcpStream, reply: &Reply, recorded: &Mutex<Vec<RecordedRequest>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stub stream"));
    let Some(request) = read_request(&mut reader) else {
        return;
    };
    let writes = request.writes().len();
    recorded.lock().expect("requests lock").push(request);

    let (status, body) = match reply {
        Reply::Accept => {
            let results: Vec<_> = (0..writes)
                .map(|_| serde_json::json!({"updateTime": "2024-01-01T00:00:00Z"}))
                .collect();
            let body = serde_json::json!({
                "writeResults": results,
                "commitTime": "2024-01-01T00:00:00Z",
            });
            (200, body.to_string())
        }
        Reply::Acknowledge(body) => (200, body.clone()),
        Reply::Fail { status, body } => (*status, body.clone()),
        Reply::Stall(duration) => {
            thread::sleep(*duration);
            return;
        }
    };
    respond(stream, status, &body);
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<RecordedRequest> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
        }
    }
    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or_default();
    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok()?;
    Some(RecordedRequest {
        request_line: request_line.trim_end().to_owned(),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    })
}

fn respond(mut stream: TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {status} STUB\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(response.as_bytes())
        .expect("write stub response");
    stream.flush().expect("flush stub response");
}
