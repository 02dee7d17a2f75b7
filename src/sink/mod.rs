//! Bulk sinks: destinations consuming completed bulks.

mod console;
mod file;

pub use console::ConsoleSink;
pub use file::AsyncFileSink;

use crate::types::Bulk;

/// A destination for completed bulks.
///
/// Implementations must not block the caller on I/O when the write itself is
/// deferred; the console sink writes on the producing call stack, the file
/// sink only queues.
pub trait BulkSink {
    fn submit(&self, bulk: &Bulk);
}
