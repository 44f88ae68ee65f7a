//! # Printer Transport Layer
//!
//! The driver does not talk to a radio stack directly. It consumes two
//! small capability traits supplied by the host platform:
//!
//! - [`Radio`]: scan for devices advertising a service, and connect to one
//! - [`Channel`]: the negotiated write path to the printer
//!
//! A successful [`Radio::connect`] yields a [`Link`]: the channel, an
//! optional per-write size limit reported by the stack, and a one-shot
//! notice fired when the peer drops the link.
//!
//! ## Available Backends
//!
//! - [`memory`]: in-process loopback that records every chunk
//!
//! ## Writing
//!
//! [`writer::ChunkedWriter`] splits command bytes into chunks no larger than
//! the configured ceiling and sends them strictly one after another.

pub mod memory;
pub mod writer;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::{ChannelError, RadioError};

pub use memory::{MemoryChannel, MemoryRadio};
pub use writer::{ChunkedWriter, WriteOutcome, chunk};

/// Service identifier commonly advertised by generic BLE receipt printers.
pub const DEFAULT_SERVICE: &str = "000018f0-0000-1000-8000-00805f9b34fb";

/// Advertised service identifier used to filter scan results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceFilter(String);

impl ServiceFilter {
    pub fn new(service: impl Into<String>) -> Self {
        Self(service.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ServiceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl fmt::Display for ServiceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discovered peripheral.
///
/// `id` is opaque to the driver (a MAC address, a platform UUID, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceHandle {
    pub id: String,
    pub name: String,
}

impl DeviceHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Resolves (with either `Ok` or `Err`) once the peer has dropped the
/// link. A dropped sender counts as a disconnect.
pub type DisconnectNotice = oneshot::Receiver<()>;

/// A negotiated link to a printer.
pub struct Link {
    /// Write path to the resolved write characteristic.
    pub channel: Arc<dyn Channel>,
    /// Largest payload a single write may carry, when the stack knows it.
    pub max_write: Option<usize>,
    /// Peer-disconnect notification.
    pub disconnected: DisconnectNotice,
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("max_write", &self.max_write)
            .finish_non_exhaustive()
    }
}

/// Write path to a connected printer.
///
/// `write` must resolve only once the stack has acknowledged the chunk.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn write(&self, chunk: &[u8]) -> Result<(), ChannelError>;

    /// Release the link. Called once on explicit disconnect.
    async fn close(&self) {}
}

/// Platform radio: device enumeration and connection.
#[async_trait]
pub trait Radio: Send + Sync {
    /// Enumerate devices advertising `service`.
    async fn scan(&self, service: &ServiceFilter) -> Result<Vec<DeviceHandle>, RadioError>;

    /// Connect to `device`, negotiate the channel and resolve the write
    /// characteristic.
    async fn connect(&self, device: &DeviceHandle) -> Result<Link, RadioError>;
}

#[async_trait]
impl<R: Radio + ?Sized> Radio for Arc<R> {
    async fn scan(&self, service: &ServiceFilter) -> Result<Vec<DeviceHandle>, RadioError> {
        (**self).scan(service).await
    }

    async fn connect(&self, device: &DeviceHandle) -> Result<Link, RadioError> {
        (**self).connect(device).await
    }
}
