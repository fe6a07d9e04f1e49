#![allow(dead_code)]

use filtered_stream::events::StreamEvent;
use filtered_stream::{ApiRequest, Config, Error, Result, Transport};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Read};
use std::path::Path;

/// What `open_stream` hands back on each call.
pub enum StreamReply {
    Body(Vec<u8>),
    /// Yields `prefix`, then fails the read.
    Broken(Vec<u8>),
    Refused,
}

/// In-memory `Transport` that records requests and replays canned replies.
#[derive(Default)]
pub struct FakeTransport {
    replies: RefCell<VecDeque<Vec<u8>>>,
    streams: RefCell<VecDeque<StreamReply>>,
    pub requests: RefCell<Vec<ApiRequest>>,
    pub stream_opens: RefCell<Vec<(String, String)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, body: &str) -> Self {
        self.replies.borrow_mut().push_back(body.as_bytes().to_vec());
        self
    }

    pub fn stream(self, reply: StreamReply) -> Self {
        self.streams.borrow_mut().push_back(reply);
        self
    }

    pub fn request(&self, n: usize) -> ApiRequest {
        self.requests.borrow()[n].clone()
    }

    pub fn request_json(&self, n: usize) -> serde_json::Value {
        serde_json::from_slice(&self.request(n).body).expect("request body is JSON")
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self
            .replies
            .borrow_mut()
            .pop_front()
            .expect("unexpected request"))
    }

    fn open_stream(&self, url: &str, token: &str) -> Result<Box<dyn Read>> {
        self.stream_opens
            .borrow_mut()
            .push((url.to_string(), token.to_string()));
        match self.streams.borrow_mut().pop_front() {
            Some(StreamReply::Body(bytes)) => Ok(Box::new(Cursor::new(bytes))),
            Some(StreamReply::Broken(prefix)) => Ok(Box::new(Cursor::new(prefix).chain(BrokenPipe))),
            Some(StreamReply::Refused) | None => Err(Error::Status {
                url: url.to_string(),
                status: 503,
                body: "unavailable".into(),
            }),
        }
    }
}

struct BrokenPipe;

impl Read for BrokenPipe {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ))
    }
}

pub fn config_with(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

pub fn event_line(id: &str, text: &str) -> String {
    format!(r#"{{"data":{{"id":"{}","text":"{}"}}}}"#, id, text)
}

pub fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn saved_seqs(events: &[StreamEvent]) -> Vec<u64> {
    let mut seqs: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::RecordSaved { seq, .. } => Some(*seq),
            _ => None,
        })
        .collect();
    seqs.sort();
    seqs
}

/// Cloneable in-memory writer for capturing console output.
#[derive(Clone, Default)]
pub struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}
