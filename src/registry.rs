//! Connection registry: opaque handles to owned batching contexts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::accumulator::BulkAccumulator;
use crate::assembler::LineAssembler;
use crate::error::RegistryError;
use crate::types::{Bulk, ContextId};

/// Opaque per-process token naming one connected context.
///
/// A generated key into an owned table, never a raw address: a stale or
/// forged handle fails lookup instead of dereferencing invalid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

/// One logical connection: line assembly plus bulk accumulation state.
#[derive(Debug)]
pub struct Context {
    context_id: ContextId,
    assembler: LineAssembler,
    accumulator: BulkAccumulator,
}

impl Context {
    fn new(context_id: ContextId, bulk_size: usize) -> Self {
        Self {
            context_id,
            assembler: LineAssembler::new(),
            accumulator: BulkAccumulator::new(context_id, bulk_size),
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    /// Feed one byte chunk through line assembly and accumulation.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Bulk> {
        self.assembler
            .feed(data)
            .into_iter()
            .filter_map(|token| self.accumulator.push(token))
            .collect()
    }

    /// Apply the end-of-stream rule: the unterminated residual line becomes
    /// one last token, then the accumulator flushes or discards its buffer.
    pub fn finalize(&mut self) -> Vec<Bulk> {
        let mut bulks = Vec::new();
        if let Some(token) = self.assembler.finish() {
            if let Some(bulk) = self.accumulator.push(token) {
                bulks.push(bulk);
            }
        }
        if let Some(bulk) = self.accumulator.finalize() {
            bulks.push(bulk);
        }
        bulks
    }
}

/// Handle-to-context table guarding context lifetime.
///
/// Context identities are strictly increasing in connect call order starting
/// at 1 and are never reused, independent of the order in which contexts are
/// later fed or disconnected.
pub struct ConnectionRegistry {
    contexts: RwLock<HashMap<Handle, Arc<Mutex<Context>>>>,
    next_handle: AtomicU64,
    next_context_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            contexts: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            next_context_id: AtomicU64::new(1),
        }
    }

    /// Register a new context and return its handle.
    pub fn connect(&self, bulk_size: usize) -> Result<Handle, RegistryError> {
        if bulk_size == 0 {
            return Err(RegistryError::ZeroBulkSize);
        }
        let context_id = self.next_context_id.fetch_add(1, Ordering::Relaxed);
        let handle = Handle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let context = Arc::new(Mutex::new(Context::new(context_id, bulk_size)));
        self.contexts.write().insert(handle, context);
        debug!(context_id, bulk_size, "context connected");
        Ok(handle)
    }

    /// Resolve a handle to its context.
    ///
    /// The registry lock is released before the caller takes the per-context
    /// lock, so unrelated contexts never contend.
    pub fn get(&self, handle: Handle) -> Option<Arc<Mutex<Context>>> {
        self.contexts.read().get(&handle).cloned()
    }

    /// Remove a context, returning it for finalization.
    pub fn remove(&self, handle: Handle) -> Result<Arc<Mutex<Context>>, RegistryError> {
        let removed = self.contexts.write().remove(&handle);
        match removed {
            Some(context) => {
                debug!(context_id = context.lock().context_id(), "context disconnected");
                Ok(context)
            }
            None => Err(RegistryError::UnknownHandle(handle)),
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
