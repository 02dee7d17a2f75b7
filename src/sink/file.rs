//! Asynchronous file sink.
//!
//! A fixed pool of worker threads drains one shared FIFO task queue, writing
//! one uniquely named file per bulk. An outstanding-task counter doubles as
//! the drain barrier behind `wait`.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Utc;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::sink::BulkSink;
use crate::types::Bulk;

/// A bulk bound to its destination file, consumed exactly once by a worker.
struct WriteTask {
    bulk: Bulk,
    path: PathBuf,
}

/// Outstanding-write counter with a wake signal fired on every completion.
#[derive(Default)]
struct PendingWrites {
    count: Mutex<usize>,
    drained: Condvar,
}

impl PendingWrites {
    fn add(&self) {
        *self.count.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn wait_drained(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.drained.wait(&mut count);
        }
    }
}

/// Per-sink write totals, readable without stopping the pool.
#[derive(Default)]
struct WriteCounters {
    written: AtomicU64,
    failed: AtomicU64,
}

/// Shared fixed pool of worker threads draining one FIFO task queue.
///
/// The producer enqueues a context's tasks strictly in sequence order, so
/// FIFO draining keeps per-context file writes in non-decreasing sequence
/// order; completion order across contexts is unconstrained.
pub struct AsyncFileSink {
    sender: Mutex<Option<Sender<WriteTask>>>,
    workers: Vec<JoinHandle<()>>,
    pending: Arc<PendingWrites>,
    counters: Arc<WriteCounters>,
    output_dir: PathBuf,
}

impl AsyncFileSink {
    /// Spawn `workers` threads writing into `output_dir`.
    ///
    /// At least two workers are always started so writes for different
    /// contexts genuinely proceed concurrently.
    pub fn new(output_dir: impl Into<PathBuf>, workers: usize) -> Self {
        let output_dir = output_dir.into();
        let worker_count = workers.max(2);
        let (sender, receiver) = channel::<WriteTask>();
        let receiver = Arc::new(Mutex::new(receiver));
        let pending = Arc::new(PendingWrites::default());
        let counters = Arc::new(WriteCounters::default());

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let receiver = Arc::clone(&receiver);
            let pending = Arc::clone(&pending);
            let counters = Arc::clone(&counters);
            handles.push(thread::spawn(move || {
                worker_loop(worker_id, &receiver, &pending, &counters);
            }));
        }
        info!(
            worker_count,
            output_dir = %output_dir.display(),
            "file sink workers started"
        );

        Self {
            sender: Mutex::new(Some(sender)),
            workers: handles,
            pending,
            counters,
            output_dir,
        }
    }

    /// Queue one bulk for writing.
    ///
    /// Never blocks on I/O and never drops a task. The pending count is
    /// raised before the send so a concurrent `wait` cannot miss the task.
    pub fn enqueue(&self, bulk: Bulk) {
        let path = self.output_dir.join(file_name(&bulk));
        self.pending.add();
        debug!(
            context_id = bulk.context_id,
            sequence = bulk.sequence,
            path = %path.display(),
            "bulk enqueued"
        );
        let guard = self.sender.lock();
        let sent = match guard.as_ref() {
            Some(sender) => sender.send(WriteTask { bulk, path }).is_ok(),
            None => false,
        };
        if !sent {
            // Queue already closed; balance the counter so wait() drains.
            self.pending.done();
            warn!("file sink queue closed, bulk not written");
        }
    }

    /// Block until every write enqueued so far has completed.
    pub fn wait(&self) {
        self.pending.wait_drained();
    }

    /// Totals of (files written, write failures) so far.
    pub fn totals(&self) -> (u64, u64) {
        (
            self.counters.written.load(Ordering::Relaxed),
            self.counters.failed.load(Ordering::Relaxed),
        )
    }
}

impl BulkSink for AsyncFileSink {
    fn submit(&self, bulk: &Bulk) {
        self.enqueue(bulk.clone());
    }
}

impl Drop for AsyncFileSink {
    fn drop(&mut self) {
        // Closing the channel lets each worker drain what remains and exit;
        // queued tasks always run to completion, never cancelled.
        self.sender.lock().take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        info!("file sink workers stopped");
    }
}

fn worker_loop(
    worker_id: usize,
    receiver: &Mutex<Receiver<WriteTask>>,
    pending: &PendingWrites,
    counters: &WriteCounters,
) {
    debug!(worker_id, "file sink worker started");
    loop {
        // Hold the receiver lock only while popping; the write itself runs
        // unlocked so workers overlap on I/O.
        let task = {
            let guard = receiver.lock();
            guard.recv()
        };
        let Ok(task) = task else {
            break;
        };
        match fs::write(&task.path, task.bulk.format_line()) {
            Ok(()) => {
                counters.written.fetch_add(1, Ordering::Relaxed);
                debug!(
                    worker_id,
                    context_id = task.bulk.context_id,
                    sequence = task.bulk.sequence,
                    path = %task.path.display(),
                    "bulk written"
                );
            }
            Err(error) => {
                // Best-effort sink: the failure is logged and the task still
                // counts as completed so the barrier never hangs.
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    worker_id,
                    %error,
                    path = %task.path.display(),
                    "bulk file write failed"
                );
            }
        }
        pending.done();
    }
    debug!(worker_id, "file sink worker stopped");
}

/// `<context_id>-bulk<timestamp>-<sequence>.log`.
///
/// Uniqueness comes from the `(context_id, sequence)` pair alone; the
/// timestamp is enqueue wall-clock seconds, kept for human readability.
fn file_name(bulk: &Bulk) -> String {
    format!(
        "{}-bulk{}-{}.log",
        bulk.context_id,
        Utc::now().timestamp(),
        bulk.sequence
    )
}
