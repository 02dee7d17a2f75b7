//! Handle-based dispatch API.
//!
//! `Dispatcher` composes the connection registry with the console and file
//! sinks. The free functions expose the same surface on one lazily created
//! process-global instance for embedding hosts.

use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::config::DispatcherConfig;
use crate::error::{ConfigError, RegistryError};
use crate::registry::{ConnectionRegistry, Handle};
use crate::sink::{AsyncFileSink, BulkSink, ConsoleSink};
use crate::types::Bulk;

/// Snapshot of dispatch activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Contexts opened since creation
    pub contexts_opened: u64,
    /// Bulks handed to the sinks
    pub bulks_emitted: u64,
    /// Bulk files written successfully
    pub files_written: u64,
    /// Bulk file writes that failed (logged, not retried)
    pub write_failures: u64,
}

/// Batching engine: connection registry plus console and file sinks.
pub struct Dispatcher {
    registry: ConnectionRegistry,
    console: ConsoleSink,
    file: AsyncFileSink,
    contexts_opened: AtomicU64,
    bulks_emitted: AtomicU64,
}

impl Dispatcher {
    /// Build a dispatcher, creating the output directory if needed.
    pub fn new(config: DispatcherConfig) -> Result<Self, ConfigError> {
        std::fs::create_dir_all(&config.output_dir)?;
        Ok(Self {
            registry: ConnectionRegistry::new(),
            console: ConsoleSink::new(),
            file: AsyncFileSink::new(config.output_dir, config.workers),
            contexts_opened: AtomicU64::new(0),
            bulks_emitted: AtomicU64::new(0),
        })
    }

    /// Open a new context grouping commands into bulks of `bulk_size`.
    pub fn connect(&self, bulk_size: usize) -> Result<Handle, RegistryError> {
        let handle = self.registry.connect(bulk_size)?;
        self.contexts_opened.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Close a context, flushing or discarding its tail per the end-of-stream
    /// rule. Enqueued file writes belonging to the context are not awaited
    /// and never cancelled.
    pub fn disconnect(&self, handle: Handle) -> Result<(), RegistryError> {
        let context = self.registry.remove(handle)?;
        let mut guard = context.lock();
        for bulk in guard.finalize() {
            self.dispatch(bulk);
        }
        Ok(())
    }

    /// Feed raw bytes to a context. Unknown handles are a silent no-op.
    ///
    /// Bulks are dispatched while the per-context lock is held, so one
    /// context's file tasks enter the queue strictly in sequence order even
    /// when caller threads share a handle.
    pub fn receive(&self, handle: Handle, data: &[u8]) {
        let Some(context) = self.registry.get(handle) else {
            debug!(?handle, "receive on unknown handle ignored");
            return;
        };
        let mut guard = context.lock();
        for bulk in guard.feed(data) {
            self.dispatch(bulk);
        }
    }

    /// Block until every file write enqueued so far has landed.
    ///
    /// Not a shutdown: contexts can keep being created and fed afterwards,
    /// and a call with nothing outstanding returns immediately.
    pub fn wait(&self) {
        self.file.wait();
    }

    /// Snapshot the activity counters.
    pub fn stats(&self) -> DispatchStats {
        let (files_written, write_failures) = self.file.totals();
        DispatchStats {
            contexts_opened: self.contexts_opened.load(Ordering::Relaxed),
            bulks_emitted: self.bulks_emitted.load(Ordering::Relaxed),
            files_written,
            write_failures,
        }
    }

    /// Fan one completed bulk out to both sinks: console first on this call
    /// stack, then a value copy to the asynchronous file queue.
    fn dispatch(&self, bulk: Bulk) {
        self.bulks_emitted.fetch_add(1, Ordering::Relaxed);
        self.console.submit(&bulk);
        self.file.submit(&bulk);
    }
}

static GLOBAL: Lazy<Dispatcher> = Lazy::new(|| {
    Dispatcher::new(DispatcherConfig::from_env())
        .expect("failed to initialize global bulk dispatcher")
});

/// Open a context on the process-global dispatcher.
pub fn connect(bulk_size: usize) -> Result<Handle, RegistryError> {
    GLOBAL.connect(bulk_size)
}

/// Close a context on the process-global dispatcher.
pub fn disconnect(handle: Handle) -> Result<(), RegistryError> {
    GLOBAL.disconnect(handle)
}

/// Feed bytes to a context on the process-global dispatcher.
pub fn receive(handle: Handle, data: &[u8]) {
    GLOBAL.receive(handle, data)
}

/// Drain the process-global dispatcher's outstanding file writes.
pub fn wait() {
    GLOBAL.wait()
}
