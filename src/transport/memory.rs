//! # In-Memory Transport
//!
//! A loopback [`Radio`] whose channels record every acknowledged chunk.
//! Used by the test suite, and by host applications that want to exercise
//! the print path without hardware. Failure modes (rejected writes, peer
//! disconnects, slow acknowledgements, failed negotiation) can be scripted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::debug;

use super::{Channel, DeviceHandle, Link, Radio, ServiceFilter};
use crate::error::{ChannelError, RadioError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted behaviour for channels created by a [`MemoryRadio`].
#[derive(Debug, Clone, Default)]
pub struct ChannelScript {
    /// Reject the write of this chunk (zero-based, counted per channel).
    pub fail_at: Option<usize>,
    /// Drop the link from the peer side after this many acknowledged chunks.
    pub disconnect_after: Option<usize>,
    /// Delay before each acknowledgement.
    pub write_delay: Option<Duration>,
}

/// Channel that appends each acknowledged chunk to an in-memory log.
pub struct MemoryChannel {
    script: ChannelScript,
    chunks: Mutex<Vec<Vec<u8>>>,
    attempts: Mutex<usize>,
    linked: AtomicBool,
    closed: AtomicBool,
    peer: Mutex<Option<oneshot::Sender<()>>>,
}

impl MemoryChannel {
    /// Create a channel and the disconnect notice its peer will fire.
    pub fn new(script: ChannelScript) -> (Arc<Self>, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let channel = Arc::new(Self {
            script,
            chunks: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            linked: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            peer: Mutex::new(Some(tx)),
        });
        (channel, rx)
    }

    /// Simulate the printer dropping the link (power off, out of range).
    pub fn peer_disconnect(&self) {
        self.linked.store(false, Ordering::Release);
        if let Some(tx) = lock(&self.peer).take() {
            debug!("memory channel: peer disconnect");
            let _ = tx.send(());
        }
    }

    /// Acknowledged chunks, in delivery order.
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        lock(&self.chunks).clone()
    }

    /// All acknowledged bytes concatenated.
    pub fn bytes(&self) -> Vec<u8> {
        lock(&self.chunks).concat()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn write(&self, chunk: &[u8]) -> Result<(), ChannelError> {
        let index = {
            let mut attempts = lock(&self.attempts);
            let index = *attempts;
            *attempts += 1;
            index
        };

        if let Some(delay) = self.script.write_delay {
            tokio::time::sleep(delay).await;
        }
        if !self.linked.load(Ordering::Acquire) || self.is_closed() {
            return Err(ChannelError::Disconnected);
        }
        if self.script.fail_at == Some(index) {
            return Err(ChannelError::Rejected(format!("chunk {index} rejected")));
        }

        let delivered = {
            let mut chunks = lock(&self.chunks);
            chunks.push(chunk.to_vec());
            chunks.len()
        };
        if self.script.disconnect_after == Some(delivered) {
            self.peer_disconnect();
        }
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.linked.store(false, Ordering::Release);
    }
}

/// Loopback radio with a fixed set of advertised devices.
#[derive(Default)]
pub struct MemoryRadio {
    devices: Vec<(DeviceHandle, ServiceFilter)>,
    script: ChannelScript,
    max_write: Option<usize>,
    scan_delay: Option<Duration>,
    connect_delay: Option<Duration>,
    connect_error: Option<RadioError>,
    channels: Mutex<Vec<Arc<MemoryChannel>>>,
    connects: Mutex<Vec<DeviceHandle>>,
}

impl MemoryRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `device` under `service`.
    pub fn with_device(mut self, device: DeviceHandle, service: ServiceFilter) -> Self {
        self.devices.push((device, service));
        self
    }

    pub fn with_script(mut self, script: ChannelScript) -> Self {
        self.script = script;
        self
    }

    /// Per-write limit reported on every link.
    pub fn with_max_write(mut self, max_write: usize) -> Self {
        self.max_write = Some(max_write);
        self
    }

    pub fn with_scan_delay(mut self, delay: Duration) -> Self {
        self.scan_delay = Some(delay);
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Fail every negotiation with `error`.
    pub fn with_connect_error(mut self, error: RadioError) -> Self {
        self.connect_error = Some(error);
        self
    }

    /// Channels handed out so far, oldest first.
    pub fn channels(&self) -> Vec<Arc<MemoryChannel>> {
        lock(&self.channels).clone()
    }

    /// Most recently created channel.
    pub fn last_channel(&self) -> Option<Arc<MemoryChannel>> {
        lock(&self.channels).last().cloned()
    }

    /// Devices passed to `connect`, in call order.
    pub fn connect_calls(&self) -> Vec<DeviceHandle> {
        lock(&self.connects).clone()
    }
}

#[async_trait]
impl Radio for MemoryRadio {
    async fn scan(&self, service: &ServiceFilter) -> Result<Vec<DeviceHandle>, RadioError> {
        if let Some(delay) = self.scan_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .devices
            .iter()
            .filter(|(_, advertised)| advertised == service)
            .map(|(device, _)| device.clone())
            .collect())
    }

    async fn connect(&self, device: &DeviceHandle) -> Result<Link, RadioError> {
        lock(&self.connects).push(device.clone());
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.connect_error {
            return Err(error.clone());
        }

        let (channel, disconnected) = MemoryChannel::new(self.script.clone());
        lock(&self.channels).push(channel.clone());
        Ok(Link {
            channel,
            max_write: self.max_write,
            disconnected,
        })
    }
}
