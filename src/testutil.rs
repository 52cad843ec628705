//! Shared test helpers: a canned-response HTTP server for exercising the B2
//! client without a network.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// Request head (request line + headers) and body captured by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// First line of the request, e.g. `POST /b2api/v2/b2_finish_large_file HTTP/1.1`.
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            if k.eq_ignore_ascii_case(name) {
                Some(v.trim())
            } else {
                None
            }
        })
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not valid JSON")
    }
}

/// Build a 200 response carrying a JSON body.
pub fn json_response(body: &str) -> String {
    response_with_status(200, "OK", body)
}

/// Build an error response with a JSON body.
pub fn error_response(status: u16, body: &str) -> String {
    response_with_status(status, "Error", body)
}

fn response_with_status(status: u16, reason: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Spin up a TCP listener that serves the canned responses in order, one per
/// request (connections are closed after each response). Returns the server's
/// base URL and a handle yielding every recorded request once all responses
/// have been served.
pub fn mock_api_server(responses: Vec<String>) -> (String, JoinHandle<Vec<RecordedRequest>>) {
    mock_api_server_with(|_| responses)
}

/// Like [`mock_api_server`], but the responses may embed the server's own
/// base URL (needed for part-upload targets that point back at the mock).
pub fn mock_api_server_with<F>(make_responses: F) -> (String, JoinHandle<Vec<RecordedRequest>>)
where
    F: FnOnce(&str) -> Vec<String>,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{port}");
    let responses = make_responses(&url);

    let handle = std::thread::spawn(move || {
        let mut recorded = Vec::with_capacity(responses.len());
        for response in &responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            // Read the request head
            let mut head = String::new();
            let mut line = String::new();
            loop {
                line.clear();
                reader.read_line(&mut line).unwrap();
                if line.trim().is_empty() {
                    break;
                }
                head.push_str(&line);
            }

            // Read exactly the declared body length
            let content_length: usize = head
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("content-length")
                        .then(|| v.trim().parse().ok())?
                })
                .unwrap_or(0);
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            recorded.push(RecordedRequest { head, body });

            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        recorded
    });

    (url, handle)
}
