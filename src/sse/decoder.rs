//! Incremental SSE decoder
//!
//! Network reads never line up with records, lines, or even UTF-8 code
//! points. The decoder keeps one rolling text buffer plus the undecoded tail
//! of the last read, and only hands out records once their blank-line
//! terminator has arrived.

use crate::sse::record::{parse_record, SseRecord};

/// Stateful decoder turning arbitrary byte slices into [`SseRecord`]s.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Decoded text not yet terminated by a blank line
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending: Vec<u8>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network read and collect every record it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseRecord> {
        self.append_bytes(chunk);
        self.drain_records()
    }

    /// Feed already-decoded text.
    pub fn push_str(&mut self, text: &str) -> Vec<SseRecord> {
        self.push(text.as_bytes())
    }

    /// Bytes held back waiting for a terminator or the rest of a code point.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.pending.len()
    }

    /// End of stream. An unterminated trailing record is discarded rather
    /// than guessed complete; returns how many bytes were dropped.
    pub fn finish(self) -> usize {
        self.buffer.trim().len() + self.pending.len()
    }

    fn append_bytes(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        // Sequence cut off by the read boundary: wait for more
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(bad) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }

        // A CR may arrive in one read and its LF in the next, so normalize
        // the whole buffer rather than the incoming slice.
        if self.buffer.contains("\r\n") {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }
    }

    fn drain_records(&mut self) -> Vec<SseRecord> {
        let mut records = Vec::new();

        while let Some(end) = self.buffer.find("\n\n") {
            let block: String = self.buffer.drain(..end + 2).collect();
            if let Some(record) = parse_record(&block[..end]) {
                records.push(record);
            }
        }

        records
    }
}
