//! # Code Generation
//!
//! Converts IR ops to ESC/POS bytes.

use super::ops::{Op, Program};
use crate::error::EncodingError;
use crate::protocol::{commands, qr, text};

/// One encoded printer instruction.
///
/// Commands are immutable values; they carry no connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(Vec<u8>);

impl Command {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Command {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Op {
    /// Encode this op. Only QR payloads can fail.
    pub fn encode(&self) -> Result<Command, EncodingError> {
        let bytes = match self {
            Op::Init => commands::init(),
            Op::Cut => commands::cut(),
            Op::Feed(lines) => commands::feed(*lines),
            Op::SetStyle(style) => style.to_bytes(),
            Op::SetAlign(alignment) => text::align(*alignment),
            Op::Text {
                content,
                style,
                align,
            } => text::text(content, *style, *align),
            Op::Raw(bytes) => bytes.clone(),
            Op::QrStore { data, module_size } => qr::payload(data, *module_size)?,
            Op::QrPrint => qr::print(),
        };
        Ok(Command(bytes))
    }
}

impl Program {
    /// Encode every op, in order. Fails on the first op that cannot be
    /// encoded, before anything is sent.
    pub fn to_commands(&self) -> Result<Vec<Command>, EncodingError> {
        self.ops.iter().map(Op::encode).collect()
    }

    /// Encode the whole program as one contiguous byte stream.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::new();
        for op in &self.ops {
            out.extend(op.encode()?.into_bytes());
        }
        Ok(out)
    }
}
