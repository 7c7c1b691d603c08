//! Byte-level line splitting for streamed response bodies.
//!
//! Network chunks can end inside a line, and inside a multi-byte character.
//! Bytes are held until a full line arrives, and only whole lines are decoded.

/// Accumulates raw bytes and yields complete, decoded lines.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append the bytes of one network chunk.
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Remove and return the next complete line, without its line ending.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=pos).collect();
        Some(decode(&line[..pos]))
    }

    /// Take whatever follows the last newline; used once the body has ended.
    pub(crate) fn take_rest(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode(&rest))
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
