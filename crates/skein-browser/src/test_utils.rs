//! Shared test fixtures: a scripted loopback HTTP server and canned
//! gzip payloads.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread::JoinHandle;
use std::time::Duration;

/// `<html><body>Hello, gzip!</body></html>` as a single gzip member
/// (no optional header fields).
pub const GZIP_HELLO: &[u8] = &[
    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, 0xb3, 0xc9, 0x28, 0xc9, 0xcd,
    0xb1, 0xb3, 0x49, 0xca, 0x4f, 0xa9, 0xb4, 0xf3, 0x48, 0xcd, 0xc9, 0xc9, 0xd7, 0x51, 0x48,
    0xaf, 0xca, 0x2c, 0x50, 0xb4, 0xd1, 0x07, 0x0b, 0xd9, 0xe8, 0x83, 0xe5, 0x01, 0xd0, 0x89,
    0x51, 0x0f, 0x26, 0x00, 0x00, 0x00,
];

/// Decompressed form of [`GZIP_HELLO`].
pub const GZIP_HELLO_PLAIN: &[u8] = b"<html><body>Hello, gzip!</body></html>";

const SERVER_TIMEOUT: Duration = Duration::from_secs(5);

/// What the server saw on one connection.
#[derive(Debug, Clone)]
pub struct ServedRequest {
    /// Request head, up to and including the blank line.
    pub request: String,
    /// Whether the client closed its side after the response.
    pub closed_by_client: bool,
}

/// Loopback server answering one connection per scripted response, in
/// order. Each response is written whole and followed by a write
/// shutdown.
pub struct TestServer {
    pub port: u16,
    handle: JoinHandle<Vec<ServedRequest>>,
}

impl TestServer {
    pub fn serve(responses: Vec<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            responses
                .into_iter()
                .map(|response| {
                    let (stream, _) = listener.accept().unwrap();
                    serve_one(stream, &response)
                })
                .collect()
        });
        Self { port, handle }
    }

    /// Wait for every scripted response to be served.
    pub fn finish(self) -> Vec<ServedRequest> {
        self.handle.join().unwrap()
    }
}

fn serve_one(mut stream: TcpStream, response: &[u8]) -> ServedRequest {
    stream.set_read_timeout(Some(SERVER_TIMEOUT)).unwrap();

    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    stream.write_all(response).unwrap();
    stream.flush().unwrap();
    let _ = stream.shutdown(Shutdown::Write);

    let closed_by_client = loop {
        match stream.read(&mut buf) {
            Ok(0) => break true,
            Ok(_) => continue,
            Err(_) => break false,
        }
    };

    ServedRequest {
        request: String::from_utf8_lossy(&head).into_owned(),
        closed_by_client,
    }
}
