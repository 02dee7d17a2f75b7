//! Bulk accumulation state machine.
//!
//! Classifies command tokens into brace controls and plain commands and
//! decides when the buffered set becomes a completed bulk. Static mode groups
//! commands by a fixed count; a brace-delimited dynamic region, however
//! deeply nested, always forms exactly one bulk of its own.

use crate::types::{Bulk, ContextId, Sequence};

const OPEN_MARKER: &str = "{";
const CLOSE_MARKER: &str = "}";

/// Per-context batching state.
///
/// `depth == 0` is static mode; `depth >= 1` means inside a dynamic region.
/// Depth never goes negative: a close marker at depth 0 is ordinary command
/// text.
#[derive(Debug)]
pub struct BulkAccumulator {
    context_id: ContextId,
    bulk_size: usize,
    depth: usize,
    pending: Vec<String>,
    next_sequence: Sequence,
}

impl BulkAccumulator {
    pub fn new(context_id: ContextId, bulk_size: usize) -> Self {
        Self {
            context_id,
            bulk_size,
            depth: 0,
            pending: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Process one token, returning a completed bulk when one finishes.
    pub fn push(&mut self, token: String) -> Option<Bulk> {
        match token.as_str() {
            OPEN_MARKER => {
                // Entering a region completes the static block in progress;
                // the region's contents form their own bulk. Deeper opens
                // only track nesting.
                let flushed = if self.depth == 0 { self.emit() } else { None };
                self.depth += 1;
                flushed
            }
            CLOSE_MARKER if self.depth > 0 => {
                self.depth -= 1;
                if self.depth == 0 {
                    self.emit()
                } else {
                    None
                }
            }
            _ => {
                self.pending.push(token);
                if self.depth == 0 && self.pending.len() >= self.bulk_size {
                    self.emit()
                } else {
                    None
                }
            }
        }
    }

    /// Apply the end-of-stream rule, called exactly once at disconnect.
    ///
    /// A static-mode remainder is always salvaged as one undersized bulk. An
    /// unterminated dynamic region is abandoned: nothing is emitted and no
    /// sequence number is consumed.
    pub fn finalize(&mut self) -> Option<Bulk> {
        if self.depth > 0 {
            self.pending.clear();
            return None;
        }
        self.emit()
    }

    fn emit(&mut self) -> Option<Bulk> {
        if self.pending.is_empty() {
            return None;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Some(Bulk {
            context_id: self.context_id,
            sequence,
            commands: std::mem::take(&mut self.pending),
        })
    }
}
