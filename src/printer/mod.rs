//! # Printer Module
//!
//! Connection lifecycle and the caller-facing driver.
//!
//! ## Modules
//!
//! - [`config`]: Driver configuration and paper profiles
//! - [`connection`]: Connection state machine and link handles
//! - [`driver`]: The [`Printer`] driver and print jobs

pub mod config;
pub mod connection;
pub mod driver;

pub use config::{DriverConfig, PrinterProfile, SelectionPolicy};
pub use connection::{Connection, ConnectionManager, ConnectionState};
pub use driver::{PrintOutcome, Printer};
