//! # Intermediate Representation (IR)
//!
//! A print job is built as a [`Program`] of logical ops, encoded into
//! [`Command`]s and streamed to the printer one command per write.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌───────────┐     ┌──────────┐
//! │  Composer   │ ──► │     IR      │ ──► │  Codegen  │ ──► │  Writer  │
//! │  (receipt)  │     │  (Vec<Op>)  │     │ (Command) │     │ (chunks) │
//! └─────────────┘     └─────────────┘     └───────────┘     └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use struk::ir::{Op, Program};
//! use struk::protocol::text::{Alignment, TextStyle};
//!
//! let mut program = Program::with_init();
//! program.push(Op::styled("HELLO", TextStyle::BOLD, Alignment::Center));
//! program.push(Op::Feed(3));
//! program.push(Op::Cut);
//!
//! let bytes = program.to_bytes()?;
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! # Ok::<(), struk::error::EncodingError>(())
//! ```

mod codegen;
mod ops;

pub use codegen::Command;
pub use ops::*;
