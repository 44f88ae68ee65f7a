//! # Connection Lifecycle
//!
//! [`ConnectionManager`] owns the wireless link of one driver instance.
//!
//! ```text
//!  Disconnected ──► Discovering ──► Connecting ──► Connected
//!       ▲                │               │              │
//!       └────────────────┴───────────────┴──────────────┘
//!        timeout / failure / disconnect() / peer disconnect
//! ```
//!
//! ## Epochs
//!
//! Validity of a handed-out [`Connection`] is an epoch comparison rather
//! than a shared boolean. The manager keeps a monotonically increasing
//! counter; a `Connection` remembers the value current when it was created.
//! Every transition out of a live attempt (explicit disconnect, peer
//! disconnect) increments the counter while the state lock is held, so the
//! state change and the invalidation of every outstanding handle happen
//! together. Only the manager writes the counter; writers only read it.
//!
//! Reconnection is never automatic. After any disconnect the caller must
//! call `connect` again.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::config::DriverConfig;
use crate::error::{ConnectError, DiscoveryError, DriverError, StateError};
use crate::transport::{Channel, DeviceHandle, Link, Radio};

/// Lifecycle state of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No device reference held.
    #[default]
    Disconnected,
    /// Scanning for a device advertising the printer service.
    Discovering,
    /// Negotiating the channel with the selected device.
    Connecting,
    /// Write capability resolved and handed out.
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// True while a connect attempt is running.
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Discovering | Self::Connecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Discovering => "discovering",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}

struct LinkInner {
    device: DeviceHandle,
    channel: Arc<dyn Channel>,
    max_write: Option<usize>,
    writer: AsyncMutex<()>,
    current_epoch: Arc<AtomicU64>,
}

/// Handle to a live link.
///
/// Cheap to clone. Becomes invalid the instant the manager records a
/// disconnect; it never becomes valid again.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<LinkInner>,
    epoch: u64,
}

impl Connection {
    pub fn device(&self) -> &DeviceHandle {
        &self.inner.device
    }

    /// Epoch this handle was issued under.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Still the current link?
    pub fn is_valid(&self) -> bool {
        self.inner.current_epoch.load(Ordering::Acquire) == self.epoch
    }

    /// Per-write limit reported by the link, if any.
    pub fn max_write(&self) -> Option<usize> {
        self.inner.max_write
    }

    pub(crate) fn channel(&self) -> &dyn Channel {
        self.inner.channel.as_ref()
    }

    /// Enter the single-writer section of this link.
    pub(crate) async fn lock_writer(&self) -> AsyncMutexGuard<'_, ()> {
        self.inner.writer.lock().await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("device", &self.inner.device)
            .field("epoch", &self.epoch)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    active: Option<Connection>,
    watcher: Option<JoinHandle<()>>,
}

struct Shared {
    epoch: Arc<AtomicU64>,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Leave a failed attempt. A disconnect that already ended the attempt
    /// has moved the epoch on, in which case there is nothing to undo.
    fn abandon(&self, attempt: u64) {
        let mut inner = self.lock();
        if self.current_epoch() == attempt && inner.state.is_transitioning() {
            inner.state = ConnectionState::Disconnected;
        }
    }

    /// Record a disconnect: bump the epoch and clear the link atomically.
    fn invalidate(&self, inner: &mut Inner) -> Option<Connection> {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        inner.state = ConnectionState::Disconnected;
        inner.active.take()
    }

    fn on_peer_disconnect(&self, epoch: u64) {
        let dropped = {
            let mut inner = self.lock();
            if self.current_epoch() != epoch || !inner.state.is_connected() {
                // stale notice from an earlier link
                return;
            }
            inner.watcher = None;
            self.invalidate(&mut inner)
        };
        if let Some(connection) = dropped {
            warn!(device = %connection.device(), epoch, "printer dropped the link");
        }
    }
}

/// Returns the state to `Disconnected` when a connect attempt ends without
/// a link, including when the caller drops the `connect` future.
struct AttemptGuard<'a> {
    shared: &'a Shared,
    attempt: u64,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.shared.abandon(self.attempt);
    }
}

/// Owner of the link lifecycle for one driver instance.
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                epoch: Arc::new(AtomicU64::new(0)),
                inner: Mutex::new(Inner::default()),
            }),
        }
    }

    /// Current state. Pure query; never probes the device.
    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// The live connection, if any.
    pub fn current(&self) -> Result<Connection, StateError> {
        let inner = self.shared.lock();
        match &inner.active {
            Some(connection) if inner.state.is_connected() && connection.is_valid() => {
                Ok(connection.clone())
            }
            _ => Err(StateError::NotConnected),
        }
    }

    /// Discover and connect to a printer.
    ///
    /// Returns the existing connection when already connected, and
    /// `StateError::Busy` while another attempt is running. On any failure
    /// or timeout the state returns to `Disconnected`.
    pub async fn connect<R>(&self, radio: &R, config: &DriverConfig) -> Result<Connection, DriverError>
    where
        R: Radio + ?Sized,
    {
        let attempt = {
            let mut inner = self.shared.lock();
            match inner.state {
                ConnectionState::Connected => {
                    if let Some(connection) = inner.active.clone() {
                        return Ok(connection);
                    }
                }
                ConnectionState::Discovering | ConnectionState::Connecting => {
                    return Err(StateError::Busy.into());
                }
                ConnectionState::Disconnected => {}
            }
            inner.state = ConnectionState::Discovering;
            self.shared.current_epoch()
        };

        // Abandons the attempt on failure and when this future is dropped
        // mid-attempt. A no-op once the attempt reached `Connected`.
        let _attempt = AttemptGuard {
            shared: &self.shared,
            attempt,
        };
        self.establish(radio, config, attempt).await
    }

    async fn establish<R>(
        &self,
        radio: &R,
        config: &DriverConfig,
        attempt: u64,
    ) -> Result<Connection, DriverError>
    where
        R: Radio + ?Sized,
    {
        info!(service = %config.service, "scanning for printer");
        let devices = tokio::time::timeout(config.scan_timeout(), radio.scan(&config.service))
            .await
            .map_err(|_| DiscoveryError::Timeout(config.scan_timeout_ms))?
            .map_err(DiscoveryError::Radio)?;

        let device = config
            .selection
            .select(&devices)
            .cloned()
            .ok_or_else(|| DiscoveryError::NoDevice {
                service: config.service.to_string(),
            })?;

        {
            let mut inner = self.shared.lock();
            if self.shared.current_epoch() != attempt {
                return Err(ConnectError::Aborted.into());
            }
            inner.state = ConnectionState::Connecting;
        }

        info!(device = %device, "connecting to printer");
        let link = tokio::time::timeout(config.connect_timeout(), radio.connect(&device))
            .await
            .map_err(|_| ConnectError::Timeout(config.connect_timeout_ms))?
            .map_err(|source| ConnectError::Negotiation {
                device: device.to_string(),
                source,
            })?;

        self.activate(device, link, attempt).await
    }

    async fn activate(
        &self,
        device: DeviceHandle,
        link: Link,
        attempt: u64,
    ) -> Result<Connection, DriverError> {
        let Link {
            channel,
            max_write,
            disconnected,
        } = link;

        let connection = {
            let mut inner = self.shared.lock();
            if self.shared.current_epoch() != attempt {
                None
            } else {
                let connection = Connection {
                    inner: Arc::new(LinkInner {
                        device,
                        channel: channel.clone(),
                        max_write,
                        writer: AsyncMutex::new(()),
                        current_epoch: self.shared.epoch.clone(),
                    }),
                    epoch: attempt,
                };
                let shared: Weak<Shared> = Arc::downgrade(&self.shared);
                inner.watcher = Some(tokio::spawn(async move {
                    // Err means the peer side was dropped: also a disconnect.
                    let _ = disconnected.await;
                    if let Some(shared) = shared.upgrade() {
                        shared.on_peer_disconnect(attempt);
                    }
                }));
                inner.state = ConnectionState::Connected;
                inner.active = Some(connection.clone());
                Some(connection)
            }
        };

        match connection {
            Some(connection) => {
                info!(device = %connection.device(), epoch = attempt, max_write, "printer connected");
                Ok(connection)
            }
            None => {
                channel.close().await;
                Err(ConnectError::Aborted.into())
            }
        }
    }

    /// Drop the link. Idempotent: a second call is a no-op.
    ///
    /// Also aborts a connect attempt that is still discovering or
    /// negotiating; that attempt fails with `ConnectError::Aborted`.
    pub async fn disconnect(&self) {
        let dropped = {
            let mut inner = self.shared.lock();
            if inner.state == ConnectionState::Disconnected {
                return;
            }
            if let Some(watcher) = inner.watcher.take() {
                watcher.abort();
            }
            self.shared.invalidate(&mut inner)
        };

        match dropped {
            Some(connection) => {
                info!(device = %connection.device(), "disconnecting printer");
                connection.channel().close().await;
            }
            None => info!("connect attempt aborted"),
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if let Some(watcher) = inner.watcher.take() {
            watcher.abort();
        }
        if inner.state != ConnectionState::Disconnected {
            self.shared.invalidate(&mut inner);
        }
    }
}
