//! # Chunked Writes
//!
//! The write characteristic of a wireless printer accepts only small
//! payloads per transmission unit. [`ChunkedWriter`] splits a buffer into
//! consecutive chunks of at most `max_chunk` bytes and sends them strictly
//! sequentially: chunk *i+1* is issued only after the channel acknowledged
//! chunk *i*. The receiving printer interprets a single byte stream, so
//! chunks are never reordered or sent in parallel.
//!
//! ## Failure
//!
//! A failed chunk aborts the call with `TransportError::WriteFailed`. Nothing
//! is retried; earlier chunks may already have been printed.
//!
//! ## Cancellation
//!
//! [`ChunkedWriter::write_cancellable`] checks its token before each chunk,
//! never mid-chunk. The printer protocol has no cancel command, so none is
//! sent.

use std::num::NonZeroUsize;
use std::slice::Chunks;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{ChannelError, DriverError, StateError, TransportError};
use crate::printer::Connection;

/// Conservative default ceiling: the smallest ATT payload every BLE stack
/// supports (23-byte MTU minus 3 bytes of header).
pub const DEFAULT_MAX_CHUNK: usize = 20;

/// Split `buf` into consecutive chunks of `size` bytes; the last one may be
/// shorter. Concatenating the chunks yields `buf`.
pub fn chunk(buf: &[u8], size: NonZeroUsize) -> Chunks<'_, u8> {
    buf.chunks(size.get())
}

/// Result of a write that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every chunk was acknowledged.
    Complete { chunks: usize },
    /// Stopped by cancellation after `chunks_sent` chunks.
    Cancelled { chunks_sent: usize },
}

/// Sequential chunked writer.
#[derive(Debug, Clone)]
pub struct ChunkedWriter {
    max_chunk: NonZeroUsize,
    write_timeout: Option<Duration>,
}

impl Default for ChunkedWriter {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_MAX_CHUNK).unwrap_or(NonZeroUsize::MIN))
    }
}

impl ChunkedWriter {
    pub fn new(max_chunk: NonZeroUsize) -> Self {
        Self {
            max_chunk,
            write_timeout: None,
        }
    }

    /// Limit how long a single chunk may wait for acknowledgement.
    ///
    /// `None` (the default) waits indefinitely; stall behaviour differs
    /// between printers, so there is no built-in default.
    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn max_chunk(&self) -> NonZeroUsize {
        self.max_chunk
    }

    /// Chunk size used on `connection`: the configured ceiling, lowered to
    /// the link's own limit when it reports a smaller one.
    pub fn effective_chunk(&self, connection: &Connection) -> NonZeroUsize {
        connection
            .max_write()
            .and_then(NonZeroUsize::new)
            .map_or(self.max_chunk, |link| link.min(self.max_chunk))
    }

    /// Write `buf` to `connection`.
    pub async fn write(&self, connection: &Connection, buf: &[u8]) -> Result<usize, DriverError> {
        let never = CancellationToken::new();
        match self.write_cancellable(connection, buf, &never).await? {
            WriteOutcome::Complete { chunks } | WriteOutcome::Cancelled { chunks_sent: chunks } => {
                Ok(chunks)
            }
        }
    }

    /// Write `buf` to `connection`, stopping between chunks once `cancel`
    /// fires.
    ///
    /// Returns `StateError::NotConnected` if the connection was already
    /// invalidated when the call started, and `TransportError::WriteFailed`
    /// if it is invalidated while chunks are in flight.
    pub async fn write_cancellable(
        &self,
        connection: &Connection,
        buf: &[u8],
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, DriverError> {
        // Single-writer section: one chunk stream per connection at a time.
        let _writer = connection.lock_writer().await;

        if !connection.is_valid() {
            return Err(StateError::NotConnected.into());
        }

        let size = self.effective_chunk(connection);
        let mut sent = 0;
        for (index, piece) in chunk(buf, size).enumerate() {
            if cancel.is_cancelled() {
                debug!(chunks_sent = sent, "write cancelled between chunks");
                return Ok(WriteOutcome::Cancelled { chunks_sent: sent });
            }
            if !connection.is_valid() {
                return Err(failed(index, ChannelError::Disconnected));
            }

            trace!(chunk = index, len = piece.len(), "writing chunk");
            let result = match self.write_timeout {
                Some(limit) => tokio::time::timeout(limit, connection.channel().write(piece))
                    .await
                    .unwrap_or(Err(ChannelError::TimedOut)),
                None => connection.channel().write(piece).await,
            };
            result.map_err(|source| failed(index, source))?;

            // A disconnect that raced this write wins: the chunk may not
            // have reached the printer.
            if !connection.is_valid() {
                return Err(failed(index, ChannelError::Disconnected));
            }
            sent += 1;
        }

        Ok(WriteOutcome::Complete { chunks: sent })
    }
}

fn failed(chunk: usize, source: ChannelError) -> DriverError {
    TransportError::WriteFailed { chunk, source }.into()
}
