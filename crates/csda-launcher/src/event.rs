//! Output events read from the analyzer process

use futures::io::AsyncRead;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Size of a single read from a child pipe
const CHUNK_SIZE: usize = 8 * 1024;

/// A chunk of output from the analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    /// Which stream the chunk came from
    pub source: OutputSource,
    /// The chunk, decoded as UTF-8
    pub data: String,
}

impl OutputEvent {
    /// Create a new output event
    pub fn new(source: OutputSource, data: String) -> Self {
        Self { source, data }
    }
}

/// Source of an output chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// Reads raw chunks from a pipe and yields them as UTF-8 text
///
/// A multi-byte character split across two reads is held back until its
/// remaining bytes arrive. Invalid sequences are replaced lossily.
pub(crate) struct ChunkReader<R> {
    reader: R,
    buf: Box<[u8]>,
    pending: Vec<u8>,
    done: bool,
}

impl<R> ChunkReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0; CHUNK_SIZE].into_boxed_slice(),
            pending: Vec::new(),
            done: false,
        }
    }

    /// Take the longest decodable prefix of `pending`
    fn take_decoded(&mut self) -> Option<String> {
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            // Invalid bytes, not a truncated character
            Err(_) => self.pending.len(),
        };
        if valid == 0 {
            return None;
        }
        let rest = self.pending.split_off(valid);
        let chunk = std::mem::replace(&mut self.pending, rest);
        Some(String::from_utf8_lossy(&chunk).into_owned())
    }

    fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let chunk = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&chunk).into_owned())
    }
}

impl<R: AsyncRead + Unpin> Stream for ChunkReader<R> {
    type Item = std::io::Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if this.done {
                return Poll::Ready(this.flush().map(Ok));
            }

            match Pin::new(&mut this.reader).poll_read(cx, &mut this.buf) {
                Poll::Ready(Ok(0)) => this.done = true,
                Poll::Ready(Ok(n)) => {
                    this.pending.extend_from_slice(&this.buf[..n]);
                    if let Some(chunk) = this.take_decoded() {
                        return Poll::Ready(Some(Ok(chunk)));
                    }
                    // Only part of a character so far, read more
                }
                Poll::Ready(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Poll::Ready(Err(e)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::io::Cursor;

    /// Yields the given byte slices one read at a time
    struct Pieces(Vec<Vec<u8>>);

    impl AsyncRead for Pieces {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<std::io::Result<usize>> {
            if self.0.is_empty() {
                return Poll::Ready(Ok(0));
            }
            let piece = self.0.remove(0);
            buf[..piece.len()].copy_from_slice(&piece);
            Poll::Ready(Ok(piece.len()))
        }
    }

    #[test]
    fn test_events_compare_by_content() {
        let a = OutputEvent::new(OutputSource::Stdout, "line\n".to_string());
        let b = OutputEvent::new(OutputSource::Stdout, "line\n".to_string());
        assert_eq!(a, b);
        assert_ne!(a, OutputEvent::new(OutputSource::Stderr, "line\n".to_string()));
    }

    #[test]
    fn test_reads_whole_input() {
        futures::executor::block_on(async {
            let chunks: Vec<String> = ChunkReader::new(Cursor::new(b"hello\nworld\n".to_vec()))
                .map(|c| c.unwrap())
                .collect()
                .await;
            assert_eq!(chunks.concat(), "hello\nworld\n");
        });
    }

    #[test]
    fn test_split_character_is_carried_over() {
        futures::executor::block_on(async {
            let e_acute = "é".as_bytes();
            let reader = Pieces(vec![
                vec![b'a', e_acute[0]],
                vec![e_acute[1], b'b'],
            ]);
            let chunks: Vec<String> = ChunkReader::new(reader)
                .map(|c| c.unwrap())
                .collect()
                .await;
            assert_eq!(chunks, vec!["a".to_string(), "éb".to_string()]);
        });
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        futures::executor::block_on(async {
            let reader = Pieces(vec![vec![b'x', 0xff, b'y']]);
            let chunks: Vec<String> = ChunkReader::new(reader)
                .map(|c| c.unwrap())
                .collect()
                .await;
            assert_eq!(chunks, vec!["x\u{fffd}y".to_string()]);
        });
    }

    #[test]
    fn test_truncated_tail_is_flushed_at_eof() {
        futures::executor::block_on(async {
            let reader = Pieces(vec![vec![b'z', 0xc3]]);
            let chunks: Vec<String> = ChunkReader::new(reader)
                .map(|c| c.unwrap())
                .collect()
                .await;
            assert_eq!(chunks, vec!["z".to_string(), "\u{fffd}".to_string()]);
        });
    }
}
