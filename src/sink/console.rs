//! Synchronous console echo sink.

use std::io::Write;

use tracing::warn;

use crate::sink::BulkSink;
use crate::types::Bulk;

/// Writes each completed bulk to process stdout on the producing call stack.
///
/// No cross-context lock is taken beyond stdout's own, so interleaving
/// across contexts is unspecified; within one context the echo order matches
/// completion order.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl BulkSink for ConsoleSink {
    fn submit(&self, bulk: &Bulk) {
        let line = bulk.format_line();
        let mut out = std::io::stdout().lock();
        if let Err(error) = out.write_all(line.as_bytes()) {
            warn!(%error, "console write failed");
        }
    }
}
