//! Incremental line splitting for the Flipper Zero CLI stream.
//!
//! The CLI talks newline-terminated ASCII in both directions. Serial
//! reads arrive in arbitrary chunks, so the decoder buffers bytes and
//! hands back one complete line at a time:
//! ```text
//! ┌───────────────────┬──────┐
//! │  line content     │ \r\n │
//! └───────────────────┴──────┘
//! ```

use bytes::{Buf, BytesMut};

/// Buffers raw serial bytes and splits them into complete lines.
///
/// Handles partial data across feeds. Output lines are decoded with
/// lossy UTF-8 and trimmed of surrounding whitespace, including the
/// CR left behind by CRLF terminators.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: BytesMut,
}

impl LineDecoder {
    /// Creates a new line decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Feeds data into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Returns the next complete line, or `None` if no line terminator
    /// has been buffered yet.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line = self.buffer.split_to(pos);
        self.buffer.advance(1); // consume the terminator
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
