//! Stream accumulation
//!
//! Collects streamed model output into a growing buffer. Nothing is parsed
//! here; extraction runs over the whole buffer after each append.

/// Append-only buffer of streamed text deltas
#[derive(Debug, Default, Clone)]
pub struct StreamAssembler {
    buffer: String,
    deltas: usize,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta exactly as received
    pub fn append(&mut self, delta: &str) {
        self.buffer.push_str(delta);
        self.deltas += 1;
    }

    /// The full buffer received so far
    pub fn current(&self) -> &str {
        &self.buffer
    }

    /// Number of deltas appended since the last reset
    pub fn delta_count(&self) -> usize {
        self.deltas
    }

    /// Drop the buffer for a new review run
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.deltas = 0;
    }
}

/// Incremental UTF-8 decoder for byte chunks
///
/// Network bodies arrive in arbitrary byte chunks that may split a
/// multi-byte character. Incomplete trailing bytes are held back until the
/// next chunk completes them; invalid sequences are replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Deltas {
    pending: Vec<u8>,
}

impl Utf8Deltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` as forms complete characters
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::new();
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[bad..];
                        }
                        None => {
                            rest = tail;
                            break;
                        }
                    }
                }
            }
        }

        let remainder = rest.to_vec();
        self.pending = remainder;
        out
    }

    /// Flush any bytes still held back at end of stream
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_exact_text() {
        let mut assembler = StreamAssembler::new();
        assembler.append("[{\"excerpt\":");
        assembler.append("\"foo\"}]");
        assert_eq!(assembler.current(), "[{\"excerpt\":\"foo\"}]");
        assert_eq!(assembler.delta_count(), 2);
    }

    #[test]
    fn test_reset_clears_buffer() {
        let mut assembler = StreamAssembler::new();
        assembler.append("partial");
        assembler.reset();
        assert_eq!(assembler.current(), "");
        assert_eq!(assembler.delta_count(), 0);
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let bytes = "誤字".as_bytes();
        let mut decoder = Utf8Deltas::new();

        let first = decoder.decode(&bytes[..2]);
        assert_eq!(first, "");
        let second = decoder.decode(&bytes[2..4]);
        assert_eq!(second, "誤");
        let third = decoder.decode(&bytes[4..]);
        assert_eq!(third, "字");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_utf8_invalid_bytes_replaced() {
        let mut decoder = Utf8Deltas::new();
        let out = decoder.decode(&[b'a', 0xff, b'b']);
        assert_eq!(out, "a\u{fffd}b");
    }

    #[test]
    fn test_utf8_truncated_tail_flushed_lossy() {
        let mut decoder = Utf8Deltas::new();
        let bytes = "é".as_bytes();
        assert_eq!(decoder.decode(&bytes[..1]), "");
        assert_eq!(decoder.finish(), "\u{fffd}");
    }
}
