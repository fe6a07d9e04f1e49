use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

// ── Events from the pipeline ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Log(String),

    Connecting { url: String },
    Connected,

    /// A record was written. `seq` is its arrival number on the stream.
    RecordSaved { seq: u64, path: PathBuf },
    /// A record was discarded. Not shown on the console.
    RecordDropped { seq: u64, reason: String },

    Disconnected { reason: Option<String> },
    Reconnecting { attempt: u32, delay: Duration },

    Finished { received: u64, saved: u64, dropped: u64 },
}

// ── EventSink trait ─────────────────────────────────────────────────────────

/// Receiver for pipeline events. Called from the read loop and from persist workers.
pub trait EventSink: Send + Sync {
    fn send(&self, event: StreamEvent);
}

// ── Console sink ────────────────────────────────────────────────────────────

/// Human-readable progress for the CLI.
///
/// Every line goes to one writer (stderr by default), so stdout stays free
/// for response bodies. While connected a spinner shows running counts;
/// lines are written with the spinner suspended, and still written when the
/// spinner is hidden because stderr is not a terminal.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
    show_spinner: bool,
    pb: Mutex<Option<ProgressBar>>,
    counts: Mutex<(u64, u64)>,
}

impl ConsoleSink {
    pub fn new() -> Arc<Self> {
        Self::build(Box::new(io::stderr()), true)
    }

    /// Write log lines to `out` instead of stderr, without a spinner.
    pub fn with_writer(out: Box<dyn Write + Send>) -> Arc<Self> {
        Self::build(out, false)
    }

    fn build(out: Box<dyn Write + Send>, show_spinner: bool) -> Arc<Self> {
        Arc::new(Self {
            out: Mutex::new(out),
            show_spinner,
            pb: Mutex::new(None),
            counts: Mutex::new((0, 0)),
        })
    }

    fn make_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    fn write_line(&self, msg: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", msg);
            let _ = out.flush();
        }
    }

    fn println(&self, msg: String) {
        let pb = self.pb.lock().ok().and_then(|guard| guard.clone());
        match pb {
            Some(pb) => pb.suspend(|| self.write_line(&msg)),
            None => self.write_line(&msg),
        }
    }

    fn bump(&self, saved: u64, dropped: u64) {
        let (s, d) = match self.counts.lock() {
            Ok(mut counts) => {
                counts.0 += saved;
                counts.1 += dropped;
                *counts
            }
            Err(_) => return,
        };
        if let Ok(guard) = self.pb.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(format!("{} saved, {} dropped", s, d));
            }
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.pb.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl EventSink for ConsoleSink {
    fn send(&self, event: StreamEvent) {
        match event {
            StreamEvent::Log(msg) => self.println(msg),

            StreamEvent::Connecting { url } => self.println(format!("Connecting to {}", url)),
            StreamEvent::Connected => {
                if !self.show_spinner {
                    return;
                }
                if let Ok(mut guard) = self.pb.lock() {
                    if guard.is_none() {
                        let pb = Self::make_spinner();
                        pb.set_message("waiting for events...");
                        *guard = Some(pb);
                    }
                }
            }

            StreamEvent::RecordSaved { seq, path } => {
                self.println(format!("[{}] {} saved", seq, path.display()));
                self.bump(1, 0);
            }
            StreamEvent::RecordDropped { .. } => self.bump(0, 1),

            StreamEvent::Disconnected { reason } => {
                self.finish_spinner();
                match reason {
                    Some(reason) => self.println(format!("  Stream disconnected: {}", reason)),
                    None => self.println("  Stream closed by server".into()),
                }
            }
            StreamEvent::Reconnecting { attempt, delay } => {
                self.println(format!(
                    "  Reconnecting in {:.1}s (attempt {})",
                    delay.as_secs_f64(),
                    attempt
                ));
            }

            StreamEvent::Finished {
                received,
                saved,
                dropped,
            } => {
                self.finish_spinner();
                self.println(format!(
                    "  {} records received, {} saved, {} dropped",
                    received, saved, dropped
                ));
            }
        }
    }
}

// ── Channel sink ────────────────────────────────────────────────────────────

/// Forwards every event to a channel, for embedding and tests.
pub struct ChannelSink {
    tx: mpsc::Sender<StreamEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<StreamEvent>) -> Arc<Self> {
        Arc::new(Self { tx })
    }
}

impl EventSink for ChannelSink {
    fn send(&self, event: StreamEvent) {
        let _ = self.tx.send(event);
    }
}
