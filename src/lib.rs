//! # Struk - Thermal Receipt Printer Driver
//!
//! Struk drives ESC/POS-compatible thermal receipt printers over
//! low-bandwidth wireless links. It provides:
//!
//! - **Protocol implementation**: ESC/POS command builders, including QR
//! - **Transport**: Chunked, acknowledged writes over a radio channel
//! - **Connection management**: Discovery, connect and disconnect with a
//!   guarded state machine
//! - **Receipts**: Validated transaction data laid out for 58mm or 80mm paper
//!
//! ## Quick Start
//!
//! ```no_run
//! use struk::{
//!     printer::{DriverConfig, Printer},
//!     receipt::Receipt,
//!     transport::{DeviceHandle, MemoryRadio, ServiceFilter},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), struk::DriverError> {
//! // Any `Radio` works; the in-memory one stands in for a real stack.
//! let radio = MemoryRadio::new()
//!     .with_device(DeviceHandle::new("66:22:01:02:03:04", "RPP02N"), ServiceFilter::default());
//!
//! let printer = Printer::new(radio, DriverConfig::default())?;
//! printer.connect().await?;
//!
//! let receipt = Receipt::builder("INV-0042", "Warung Kopi")
//!     .item("Es Kopi Susu", 18_000, 2)
//!     .item("Roti Bakar", 15_000, 1)
//!     .footer("Terima kasih")
//!     .build()?;
//!
//! printer.print_receipt(&receipt).await?;
//! printer.disconnect().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders |
//! | [`ir`] | Print program ops and byte codegen |
//! | [`transport`] | Radio/channel seams and the chunked writer |
//! | [`printer`] | Connection manager, configuration and driver |
//! | [`receipt`] | Receipt model and layout |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Generic 58mm and 80mm ESC/POS printers exposing a writable
//! characteristic under service `0x18F0`. Other services can be selected
//! through [`DriverConfig`].

pub mod error;
pub mod ir;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod transport;

pub use error::DriverError;
pub use printer::{DriverConfig, Printer};
pub use receipt::Receipt;
