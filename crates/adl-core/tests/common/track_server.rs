//! Minimal HTTP/1.1 server for integration tests: one HTML page linking to
//! numbered MP3 tracks, plus the tracks themselves.
//!
//! - `GET /book/` lists `tracks/<i>.mp3` links named `Chapter <i+1>`
//!   (or all named `link_text`)
//! - `GET /empty/` is a page without links
//! - `GET /book/tracks/<i>.mp3` serves `body(i)`, or 404 for failing ordinals

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct TrackServerOptions {
    pub tracks: usize,
    /// Ordinals answered with 404.
    pub failing: Vec<usize>,
    /// Delay before each track response.
    pub delay: Duration,
    /// Same text on every link instead of `Chapter <i+1>`.
    pub link_text: Option<String>,
}

/// Deterministic body of track `i`.
pub fn body(i: usize) -> Vec<u8> {
    (0..(4096 + i * 997)).map(|b| ((b * 31 + i * 7) % 251) as u8).collect()
}

/// Starts the server on a background thread. Returns the base URL
/// (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start(opts: TrackServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = Arc::clone(&opts);
            thread::spawn(move || handle(stream, &opts));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn page(opts: &TrackServerOptions) -> String {
    let mut html = String::from("<html><head><title>Book</title></head><body><ol>\n");
    for i in 0..opts.tracks {
        let text = match &opts.link_text {
            Some(text) => text.clone(),
            None => format!("Chapter {}", i + 1),
        };
        html.push_str(&format!("<li><a href=\"tracks/{}.mp3\">{}</a></li>\n", i, text));
    }
    html.push_str("</ol></body></html>\n");
    html
}

fn respond(stream: &mut std::net::TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn handle(mut stream: std::net::TcpStream, opts: &TrackServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    match path {
        "/book/" => respond(&mut stream, "200 OK", "text/html", page(opts).as_bytes()),
        "/empty/" => {
            let empty = b"<html><body>Nothing here</body></html>";
            respond(&mut stream, "200 OK", "text/html", empty)
        }
        _ => {
            let ordinal = path
                .strip_prefix("/book/tracks/")
                .and_then(|p| p.strip_suffix(".mp3"))
                .and_then(|i| i.parse::<usize>().ok())
                .filter(|i| *i < opts.tracks);
            match ordinal {
                Some(i) if !opts.failing.contains(&i) => {
                    thread::sleep(opts.delay);
                    respond(&mut stream, "200 OK", "audio/mpeg", &body(i));
                }
                _ => respond(&mut stream, "404 Not Found", "text/plain", b"not found"),
            }
        }
    }
}
