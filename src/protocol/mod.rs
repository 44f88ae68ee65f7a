//! # ESC/POS Protocol Implementation
//!
//! Pure, stateless builders mapping one printer instruction to its exact
//! byte sequence. Nothing here performs I/O.
//!
//! ## Module Structure
//!
//! - [`commands`]: init, paper feed, cutter
//! - [`text`]: print mode (bold / double height / double width), alignment, text lines
//! - [`qr`]: QR code store and print frames
//! - [`cp437`]: text encoding
//!
//! ## Usage Example
//!
//! ```
//! use struk::protocol::{commands, qr, text};
//! use struk::protocol::text::{Alignment, TextStyle};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::text("RECEIPT", Some(TextStyle::BOLD), Some(Alignment::Center)));
//! data.extend(qr::payload(b"https://example.com", qr::DEFAULT_MODULE_SIZE)?);
//! data.extend(qr::print());
//! data.extend(commands::feed(3));
//! data.extend(commands::cut());
//! # Ok::<(), struk::error::EncodingError>(())
//! ```

pub mod commands;
pub mod cp437;
pub mod qr;
pub mod text;
