//! # Error Types
//!
//! This module defines the error taxonomy used throughout the struk driver.
//! Each failure family has its own enum so callers can match on exactly the
//! stage that failed; [`DriverError`] wraps them all for `?` propagation.
//!
//! Nothing in this crate retries. Printing is not idempotent, so every
//! failure is handed back to the caller as a typed result.

use thiserror::Error;

/// Failure while scanning for a printer.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The scan finished without a device matching the service filter
    /// and selection policy.
    #[error("no printer found advertising service {service}")]
    NoDevice { service: String },

    /// The scan did not finish within the configured timeout.
    #[error("discovery timed out after {0} ms")]
    Timeout(u64),

    /// The radio itself reported an error.
    #[error("radio error during discovery: {0}")]
    Radio(#[from] RadioError),
}

/// Failure while negotiating a channel with a discovered printer.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Channel negotiation failed or the write characteristic was missing.
    #[error("channel negotiation with {device} failed: {source}")]
    Negotiation {
        device: String,
        #[source]
        source: RadioError,
    },

    /// Negotiation did not finish within the configured timeout.
    #[error("connect timed out after {0} ms")]
    Timeout(u64),

    /// A disconnect was requested while the attempt was still in flight.
    #[error("connect attempt aborted by disconnect")]
    Aborted,
}

/// Failure while streaming bytes to the printer.
///
/// Partial delivery is possible: the printer may have received (and printed)
/// the chunks before `chunk`. Treat the print job state as unknown.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("write of chunk {chunk} failed: {source}")]
    WriteFailed {
        /// Zero-based index of the chunk that failed within its write call.
        chunk: usize,
        #[source]
        source: ChannelError,
    },
}

/// Failure while encoding a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// QR data does not fit the 2-byte length field of the store frame.
    #[error("QR payload of {len} bytes exceeds the maximum of {max}")]
    PayloadTooLarge { len: usize, max: usize },
}

/// Operation attempted in the wrong connection state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("printer is not connected")]
    NotConnected,

    /// A discovery or connect attempt is already running.
    #[error("a connect attempt is already in progress")]
    Busy,
}

/// Invalid transaction data handed to the receipt builder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("receipt has no line items")]
    EmptyItems,

    #[error("line item {name:?} has zero quantity")]
    ZeroQuantity { name: String },

    #[error("amount overflow while computing {what}")]
    AmountOverflow { what: String },

    /// The caller-supplied total disagrees with the sum of line subtotals.
    #[error("total mismatch: caller supplied {expected}, items sum to {computed}")]
    TotalMismatch { expected: u64, computed: u64 },
}

/// Invalid driver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_chunk must be at least 1 byte")]
    ZeroChunk,

    #[error("printer profile {0:?} has zero columns")]
    ZeroColumns(String),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error reported by a [`Channel`](crate::transport::Channel) write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The peer or platform stack rejected the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The link is gone.
    #[error("link disconnected")]
    Disconnected,

    /// The write was not acknowledged within the caller-supplied timeout.
    #[error("write not acknowledged in time")]
    TimedOut,
}

/// Error reported by a [`Radio`](crate::transport::Radio) collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RadioError {
    #[error("radio unavailable")]
    Unavailable,

    #[error("write characteristic not found")]
    CharacteristicNotFound,

    #[error("{0}")]
    Failed(String),
}

/// Main error type for driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DriverError {
    /// True when bytes may have reached the printer before the failure,
    /// meaning the physical print outcome is unknown.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, DriverError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failed_message_names_chunk() {
        let err = TransportError::WriteFailed {
            chunk: 3,
            source: ChannelError::Disconnected,
        };
        assert_eq!(err.to_string(), "write of chunk 3 failed: link disconnected");
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let err: DriverError = StateError::NotConnected.into();
        assert_eq!(err.to_string(), "printer is not connected");
        assert!(!err.is_outcome_unknown());
    }

    #[test]
    fn test_transport_failure_marks_outcome_unknown() {
        let err: DriverError = TransportError::WriteFailed {
            chunk: 0,
            source: ChannelError::TimedOut,
        }
        .into();
        assert!(err.is_outcome_unknown());
    }
}
