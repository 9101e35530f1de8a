//! Incremental line reassembly and frame parsing.

use crate::error::{KulturarvError, Result};
use crate::types::StreamEvent;

const DATA_PREFIX: &str = "data:";

/// Reassembles a chunked byte stream into complete lines.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte
/// character or a line terminator. Only `\n` terminates a line; a preceding
/// `\r` is left on the line and removed by [`parse_frame`]'s trimming.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    /// Text after the last line terminator seen so far.
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the lines it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode_utf8(chunk);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);
        complete
            .strip_suffix('\n')
            .unwrap_or(complete.as_str())
            .split('\n')
            .map(str::to_owned)
            .collect()
    }

    /// Flush at end of stream, returning the unterminated final line if any.
    ///
    /// Undecodable trailing bytes become U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    /// Text currently held back waiting for a line terminator.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    fn decode_utf8(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let mut consumed = 0;

        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    self.buffer.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(err) => {
                    let valid_end = consumed + err.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&self.pending[consumed..valid_end]) {
                        self.buffer.push_str(valid);
                    }
                    match err.error_len() {
                        Some(invalid_len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + invalid_len;
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more bytes.
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
    }
}

/// Parse one complete line into an event.
///
/// Returns `None` for lines that carry no event: blank separators, `event:`
/// name lines (the `type` field in the payload is authoritative), SSE
/// comments and `data:` lines with an empty payload. Returns a
/// [`KulturarvError::Protocol`] for malformed JSON or an unknown `type`.
pub fn parse_frame(line: &str) -> Option<Result<StreamEvent>> {
    let line = line.trim();
    let payload = line.strip_prefix(DATA_PREFIX)?.trim_start();
    if payload.is_empty() {
        return None;
    }

    Some(serde_json::from_str(payload).map_err(|e| {
        KulturarvError::Protocol(format!("undecodable frame ({e}): {}", preview(payload)))
    }))
}

fn preview(payload: &str) -> &str {
    const MAX: usize = 120;
    if payload.len() <= MAX {
        return payload;
    }
    let mut end = MAX;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    &payload[..end]
}
