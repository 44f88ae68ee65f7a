//! # Printer Driver
//!
//! [`Printer`] is the caller-facing surface: one value per physical
//! printer, owned by the caller. Several printers (one per register, say)
//! are just several values.
//!
//! ## Print Jobs
//!
//! A job is a [`Program`]. It is encoded completely before the first byte
//! is sent, so an encoding error never leaves a half-printed receipt. Ops
//! are then written one command per writer call, in order. Jobs on the same
//! printer are serialized by a job lock.
//!
//! On a transport failure the job stops, the link is torn down (its state
//! is unknown) and the error is returned. There is no retry and no
//! rollback: a thermal printer cannot un-print.

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::DriverConfig;
use super::connection::{Connection, ConnectionManager, ConnectionState};
use crate::error::{ChannelError, ConfigError, DriverError, StateError, TransportError};
use crate::ir::Program;
use crate::receipt::{Composer, Receipt};
use crate::transport::{ChunkedWriter, Radio, WriteOutcome};

/// Result of a print job that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    /// Every command was acknowledged.
    Completed { chunks_sent: usize },
    /// Cancelled between chunks. The printer holds whatever the last
    /// acknowledged chunk left it with; the link stays up.
    Cancelled { chunks_sent: usize },
}

/// # Thermal Printer Driver
///
/// ## Example
///
/// ```
/// use struk::printer::{DriverConfig, Printer};
/// use struk::receipt::Receipt;
/// use struk::transport::{DeviceHandle, MemoryRadio, ServiceFilter};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), struk::error::DriverError> {
/// let radio = MemoryRadio::new()
///     .with_device(DeviceHandle::new("66:22:01:02:03:04", "RPP02N"), ServiceFilter::default());
/// let printer = Printer::new(radio, DriverConfig::default())?;
///
/// printer.connect().await?;
/// let receipt = Receipt::builder("INV-1", "Toko").item("Kopi", 18_000, 1).build()?;
/// printer.print_receipt(&receipt).await?;
/// printer.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct Printer<R> {
    radio: R,
    config: DriverConfig,
    manager: ConnectionManager,
    writer: ChunkedWriter,
    job: Mutex<()>,
}

impl<R: Radio> Printer<R> {
    pub fn new(radio: R, config: DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let writer = ChunkedWriter::new(config.chunk_size()?).with_write_timeout(config.write_timeout());
        Ok(Self {
            radio,
            config,
            manager: ConnectionManager::new(),
            writer,
            job: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    /// Discover the printer and open the link.
    pub async fn connect(&self) -> Result<Connection, DriverError> {
        self.manager.connect(&self.radio, &self.config).await
    }

    /// Close the link. Idempotent.
    pub async fn disconnect(&self) {
        self.manager.disconnect().await;
    }

    /// Print a receipt to completion.
    pub async fn print_receipt(&self, receipt: &Receipt) -> Result<(), DriverError> {
        self.print_receipt_cancellable(receipt, &CancellationToken::new())
            .await
            .map(|_| ())
    }

    /// Print a receipt, stopping between chunks once `cancel` fires.
    pub async fn print_receipt_cancellable(
        &self,
        receipt: &Receipt,
        cancel: &CancellationToken,
    ) -> Result<PrintOutcome, DriverError> {
        let program = Composer::new(self.config.profile).compose(receipt);
        info!(receipt = receipt.id(), ops = program.len(), "printing receipt");
        self.print_program(&program, cancel).await
    }

    /// Print an arbitrary program.
    pub async fn print_program(
        &self,
        program: &Program,
        cancel: &CancellationToken,
    ) -> Result<PrintOutcome, DriverError> {
        let commands = program.to_commands()?;

        let _job = self.job.lock().await;
        let connection = self.manager.current()?;

        let mut chunks_sent = 0;
        for command in &commands {
            let outcome = self
                .writer
                .write_cancellable(&connection, command.as_bytes(), cancel)
                .await;
            match outcome {
                Ok(WriteOutcome::Complete { chunks }) => chunks_sent += chunks,
                Ok(WriteOutcome::Cancelled { chunks_sent: n }) => {
                    let chunks_sent = chunks_sent + n;
                    info!(chunks_sent, "print job cancelled");
                    return Ok(PrintOutcome::Cancelled { chunks_sent });
                }
                Err(err) => return Err(self.abort_job(&connection, chunks_sent, err).await),
            }
        }

        Ok(PrintOutcome::Completed { chunks_sent })
    }

    /// Tear down a link that failed mid-job and shape the error.
    ///
    /// A link lost between two commands is reported as `WriteFailed` with
    /// `chunk: 0`, the index within the refused write call; the job-level
    /// count is logged as `chunks_sent`.
    async fn abort_job(&self, connection: &Connection, chunks_sent: usize, err: DriverError) -> DriverError {
        // Once bytes went out, losing the link means the outcome is unknown.
        let err = match err {
            DriverError::State(StateError::NotConnected) if chunks_sent > 0 => TransportError::WriteFailed {
                chunk: 0,
                source: ChannelError::Disconnected,
            }
            .into(),
            other => other,
        };
        warn!(device = %connection.device(), chunks_sent, error = %err, "print job aborted");
        if connection.is_valid() {
            self.manager.disconnect().await;
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RadioError;
    use crate::ir::Op;
    use crate::transport::{Channel, DeviceHandle, Link, MemoryRadio, Radio, ServiceFilter};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// Channel that signals after its first acknowledged write and then
    /// yields, so another task can queue on the writer section.
    struct Signalling {
        inner: Arc<dyn Channel>,
        fired: AtomicBool,
        written: Arc<Notify>,
    }

    #[async_trait]
    impl Channel for Signalling {
        async fn write(&self, chunk: &[u8]) -> Result<(), ChannelError> {
            self.inner.write(chunk).await?;
            if !self.fired.swap(true, Ordering::SeqCst) {
                self.written.notify_one();
                tokio::task::yield_now().await;
            }
            Ok(())
        }

        async fn close(&self) {
            self.inner.close().await;
        }
    }

    struct SignallingRadio {
        inner: MemoryRadio,
        written: Arc<Notify>,
    }

    #[async_trait]
    impl Radio for SignallingRadio {
        async fn scan(&self, service: &ServiceFilter) -> Result<Vec<DeviceHandle>, RadioError> {
            self.inner.scan(service).await
        }

        async fn connect(&self, device: &DeviceHandle) -> Result<Link, RadioError> {
            let link = self.inner.connect(device).await?;
            Ok(Link {
                channel: Arc::new(Signalling {
                    inner: link.channel,
                    fired: AtomicBool::new(false),
                    written: self.written.clone(),
                }),
                ..link
            })
        }
    }

    fn printer() -> Printer<MemoryRadio> {
        let radio = MemoryRadio::new().with_device(DeviceHandle::new("AA", "MPT-II"), ServiceFilter::default());
        Printer::new(radio, DriverConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DriverConfig::default();
        config.set_max_chunk(0);
        assert!(Printer::new(MemoryRadio::new(), config).is_err());
    }

    #[tokio::test]
    async fn test_print_without_connection() {
        let printer = printer();
        let program: Program = [Op::Init].into_iter().collect();
        let err = printer
            .print_program(&program, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::State(StateError::NotConnected)));
    }

    #[tokio::test]
    async fn test_print_program_counts_chunks() {
        let printer = printer();
        printer.connect().await.unwrap();
        // 2 + 45 + 4 bytes at 20 per chunk: 1 + 3 + 1 chunks
        let program: Program = [Op::Init, Op::Raw(vec![0x20; 45]), Op::Cut].into_iter().collect();
        let outcome = printer
            .print_program(&program, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, PrintOutcome::Completed { chunks_sent: 5 });
        assert_eq!(printer.radio().last_channel().unwrap().bytes(), program.to_bytes().unwrap());
    }

    #[tokio::test]
    async fn test_disconnect_between_commands_is_write_failed() {
        let written = Arc::new(Notify::new());
        let radio = SignallingRadio {
            inner: MemoryRadio::new().with_device(DeviceHandle::new("AA", "MPT-II"), ServiceFilter::default()),
            written: written.clone(),
        };
        let printer = Printer::new(radio, DriverConfig::default()).unwrap();
        let connection = printer.connect().await.unwrap();
        let program: Program = [Op::Init, Op::text("A"), Op::Cut].into_iter().collect();

        let cancel = CancellationToken::new();
        let (result, ()) = tokio::join!(printer.print_program(&program, &cancel), async {
            written.notified().await;
            // queued ahead of the next command, so the job sees the
            // disconnect before its next write starts
            let _writer = connection.lock_writer().await;
            printer.disconnect().await;
        });

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            DriverError::Transport(TransportError::WriteFailed {
                chunk: 0,
                source: ChannelError::Disconnected,
            })
        ));
        assert!(err.is_outcome_unknown());
        assert_eq!(printer.radio().inner.last_channel().unwrap().chunks(), vec![vec![0x1B, 0x40]]);
        assert_eq!(printer.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_not_connected_before_any_chunk_is_kept() {
        let printer = printer();
        let connection = printer.connect().await.unwrap();
        printer.disconnect().await;

        let err = printer
            .abort_job(&connection, 0, StateError::NotConnected.into())
            .await;
        assert!(matches!(err, DriverError::State(StateError::NotConnected)));
        assert!(!err.is_outcome_unknown());
    }

    #[tokio::test]
    async fn test_encoding_error_sends_nothing() {
        let printer = printer();
        printer.connect().await.unwrap();
        let program: Program = [Op::Init, Op::qr(vec![0u8; 70_000])].into_iter().collect();
        let err = printer
            .print_program(&program, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Encoding(_)));
        assert!(printer.radio().last_channel().unwrap().chunks().is_empty());
        assert!(printer.is_connected());
    }
}
