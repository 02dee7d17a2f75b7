//! Incremental line assembly over an unaligned byte stream.

/// Turns arbitrary byte chunks delivered over time into complete command
/// tokens, retaining the partial tail across calls.
///
/// Chunk boundaries carry no alignment guarantee: a token may span any number
/// of `feed` calls, and only a newline terminates it. Bytes are opaque
/// content; embedded NUL bytes pass through and invalid UTF-8 is replaced
/// lossily rather than rejected.
#[derive(Debug, Default)]
pub struct LineAssembler {
    residual: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` and drain every newline-terminated token.
    ///
    /// One carriage return immediately preceding the newline is stripped.
    /// Anything after the last newline stays buffered for the next call.
    pub fn feed(&mut self, data: &[u8]) -> Vec<String> {
        self.residual.extend_from_slice(data);
        let mut tokens = Vec::new();
        while let Some(pos) = self.residual.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.residual.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            tokens.push(String::from_utf8_lossy(&line).into_owned());
        }
        tokens
    }

    /// Drain the unterminated residual as one final token, if any.
    ///
    /// Called once at disconnect time; an empty residual yields nothing.
    pub fn finish(&mut self) -> Option<String> {
        if self.residual.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.residual);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}
