use crate::events::{EventSink, StreamEvent};
use crate::record::{self, RejectReason};
use crate::store::ArtifactStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// One received line, owned by whichever worker picks it up.
struct Job {
    seq: u64,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Tally {
    saved: AtomicU64,
    dropped: AtomicU64,
}

/// Fixed set of threads that decode and persist records.
///
/// Jobs queue in a bounded channel; `dispatch` blocks while it is full.
pub struct PersistPool {
    tx: Option<SyncSender<Job>>,
    workers: Vec<JoinHandle<()>>,
    tally: Arc<Tally>,
}

impl PersistPool {
    pub fn start(
        workers: usize,
        queue_capacity: usize,
        store: Arc<ArtifactStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (tx, rx) = mpsc::sync_channel::<Job>(queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let tally = Arc::new(Tally::default());

        let workers = (0..workers.max(1))
            .map(|_| {
                let rx = Arc::clone(&rx);
                let store = Arc::clone(&store);
                let sink = Arc::clone(&sink);
                let tally = Arc::clone(&tally);
                thread::spawn(move || worker_loop(&rx, &store, &*sink, &tally))
            })
            .collect();

        Self {
            tx: Some(tx),
            workers,
            tally,
        }
    }

    /// Queue a record. Blocks while every worker is busy and the queue is full.
    pub fn dispatch(&self, seq: u64, bytes: Vec<u8>) {
        if let Some(tx) = &self.tx {
            // Only fails if every worker has exited, and they run until the sender drops.
            let _ = tx.send(Job { seq, bytes });
        }
    }

    pub fn saved(&self) -> u64 {
        self.tally.saved.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> u64 {
        self.tally.dropped.load(Ordering::SeqCst)
    }

    /// Let the workers drain the queue, then wait for them.
    pub fn finish(mut self) -> (u64, u64) {
        self.join_workers();
        (self.saved(), self.dropped())
    }

    fn join_workers(&mut self) {
        self.tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for PersistPool {
    fn drop(&mut self) {
        self.join_workers();
    }
}

fn worker_loop(
    rx: &Mutex<Receiver<Job>>,
    store: &ArtifactStore,
    sink: &dyn EventSink,
    tally: &Tally,
) {
    loop {
        let job = match rx.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => return,
        };
        let Ok(job) = job else {
            return;
        };

        match persist(store, &job.bytes) {
            Ok(path) => {
                tally.saved.fetch_add(1, Ordering::SeqCst);
                sink.send(StreamEvent::RecordSaved { seq: job.seq, path });
            }
            Err(reason) => {
                tally.dropped.fetch_add(1, Ordering::SeqCst);
                sink.send(StreamEvent::RecordDropped {
                    seq: job.seq,
                    reason: reason.to_string(),
                });
            }
        }
    }
}

fn persist(store: &ArtifactStore, raw: &[u8]) -> Result<std::path::PathBuf, RejectReason> {
    let id = record::event_id(raw)?;
    store
        .put(&id, raw)
        .map_err(|e| RejectReason::WriteFailed(e.to_string()))
}
