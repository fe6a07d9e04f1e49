use crate::config::StreamSettings;
use crate::error::{Error, Result};
use crate::events::{EventSink, StreamEvent};
use crate::http::Transport;
use crate::store::ArtifactStore;
use crate::workers::PersistPool;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::thread;

/// Totals for one `run_stream` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSummary {
    /// Non-empty lines read from the stream.
    pub received: u64,
    pub saved: u64,
    pub dropped: u64,
}

/// Longest record accepted from the stream, excluding its line terminator.
pub const MAX_RECORD_BYTES: usize = 64 * 1024;

/// How a single connection's read loop ended.
#[derive(Debug)]
pub enum StreamEnd {
    /// The server closed the body.
    Closed,
    Failed(io::Error),
}

/// Connect to the stream and store every event until the connection ends.
///
/// Reconnects according to `settings.reconnect`. Every queued record has been
/// written (or dropped) by the time this returns.
pub fn run_stream(
    transport: &dyn Transport,
    stream_url: &str,
    token: &str,
    settings: &StreamSettings,
    sink: Arc<dyn EventSink>,
) -> Result<StreamSummary> {
    let store = Arc::new(ArtifactStore::open(&settings.output_dir)?);
    let pool = PersistPool::start(
        settings.workers,
        settings.queue_capacity,
        store,
        sink.clone(),
    );

    let mut seq = 0u64;
    let mut attempt = 0u32;
    let outcome = loop {
        sink.send(StreamEvent::Connecting {
            url: stream_url.to_string(),
        });

        let failure = match transport.open_stream(stream_url, token) {
            Ok(body) => {
                attempt = 0;
                sink.send(StreamEvent::Connected);
                match ingest(BufReader::new(body), &pool, &mut seq) {
                    StreamEnd::Closed => {
                        sink.send(StreamEvent::Disconnected { reason: None });
                        None
                    }
                    StreamEnd::Failed(e) => {
                        sink.send(StreamEvent::Disconnected {
                            reason: Some(e.to_string()),
                        });
                        Some(Error::from(e))
                    }
                }
            }
            Err(e) => {
                sink.send(StreamEvent::Disconnected {
                    reason: Some(e.to_string()),
                });
                Some(e)
            }
        };

        attempt += 1;
        match settings.reconnect.delay_for(attempt) {
            Some(delay) => {
                sink.send(StreamEvent::Reconnecting { attempt, delay });
                thread::sleep(delay);
            }
            None => break failure,
        }
    };

    let (saved, dropped) = pool.finish();
    let summary = StreamSummary {
        received: seq,
        saved,
        dropped,
    };
    sink.send(StreamEvent::Finished {
        received: summary.received,
        saved,
        dropped,
    });

    match outcome {
        Some(e) => Err(e),
        None => Ok(summary),
    }
}

/// Read newline-delimited records from `reader` and hand each non-empty one
/// to `pool`, numbering them from `*seq + 1`.
///
/// Blank lines are keep-alives and are skipped without being counted. A line
/// longer than `MAX_RECORD_BYTES` ends the read loop with an error.
pub fn ingest<R: BufRead>(mut reader: R, pool: &PersistPool, seq: &mut u64) -> StreamEnd {
    // Room for the record plus "\r\n".
    let limit = (MAX_RECORD_BYTES + 2) as u64;
    let mut line = Vec::with_capacity(8 * 1024);
    loop {
        line.clear();
        match (&mut reader).take(limit).read_until(b'\n', &mut line) {
            Ok(0) => return StreamEnd::Closed,
            Ok(n) if n as u64 == limit && !line.ends_with(b"\n") => {
                return StreamEnd::Failed(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("record exceeds {} bytes", MAX_RECORD_BYTES),
                ));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return StreamEnd::Failed(e),
        }

        let record = trim_line_end(&line);
        if record.is_empty() {
            continue;
        }
        *seq += 1;
        pool.dispatch(*seq, record.to_vec());
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
