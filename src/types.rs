//! Core value types shared across the batching pipeline.

/// Identity of one logical connection, assigned once at connect time.
///
/// Strictly increasing in connect call order starting at 1, never reused.
pub type ContextId = u64;

/// Per-context bulk sequence number, starting at 1 and gap-free among
/// emitted bulks.
pub type Sequence = u64;

/// A completed, ordered, non-empty batch of commands.
///
/// Immutable once constructed. The file sink receives its own copy, so the
/// two sinks never share mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bulk {
    /// Owning context identity
    pub context_id: ContextId,
    /// Position in the context's emission order
    pub sequence: Sequence,
    /// Commands in arrival order
    pub commands: Vec<String>,
}

impl Bulk {
    /// Render the bulk as its single output line.
    ///
    /// The console echo and the log file body are this exact string.
    pub fn format_line(&self) -> String {
        format!("bulk: {}\n", self.commands.join(", "))
    }
}
