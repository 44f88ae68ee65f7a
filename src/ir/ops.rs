//! # IR Opcodes
//!
//! The intermediate representation of a print job: an ordered sequence of
//! logical printer instructions. Each op encodes to exactly one
//! [`Command`](super::Command), and the print path sends one command per
//! writer call, so op boundaries are also write boundaries.

use crate::protocol::qr::DEFAULT_MODULE_SIZE;
use crate::protocol::text::{Alignment, TextStyle};

/// IR opcodes - one logical printer instruction each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    // ========== Printer Control ==========
    /// Initialize printer (ESC @). Sent once at the start of a job.
    Init,

    /// Feed and full cut.
    Cut,

    /// Print and feed n lines.
    Feed(u8),

    // ========== Style Changes ==========
    /// Set print mode (bold / double height / double width).
    SetStyle(TextStyle),

    /// Set text alignment.
    SetAlign(Alignment),

    // ========== Content ==========
    /// One line of text, optionally prefixed by alignment and style.
    Text {
        content: String,
        style: Option<TextStyle>,
        align: Option<Alignment>,
    },

    /// Raw bytes (direct protocol access).
    Raw(Vec<u8>),

    // ========== QR ==========
    /// Configure the QR symbol and store its payload.
    QrStore { data: Vec<u8>, module_size: u8 },

    /// Print the stored QR symbol.
    QrPrint,
}

impl Op {
    /// Plain text line with no prefixes.
    pub fn text(content: impl Into<String>) -> Self {
        Op::Text {
            content: content.into(),
            style: None,
            align: None,
        }
    }

    /// Text line with an alignment prefix.
    pub fn aligned(content: impl Into<String>, align: Alignment) -> Self {
        Op::Text {
            content: content.into(),
            style: None,
            align: Some(align),
        }
    }

    /// Text line with alignment and style prefixes.
    pub fn styled(content: impl Into<String>, style: TextStyle, align: Alignment) -> Self {
        Op::Text {
            content: content.into(),
            style: Some(style),
            align: Some(align),
        }
    }

    /// QR store op at the default module size.
    pub fn qr(data: impl Into<Vec<u8>>) -> Self {
        Op::QrStore {
            data: data.into(),
            module_size: DEFAULT_MODULE_SIZE,
        }
    }
}

/// A print job as an ordered list of ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Create a program with an initial Init op.
    pub fn with_init() -> Self {
        Self {
            ops: vec![Op::Init],
        }
    }

    /// Add an op to the program.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Add multiple ops to the program.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = Op>) {
        self.ops.extend(ops);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }
}

impl FromIterator<Op> for Program {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_new() {
        assert!(Program::new().is_empty());
    }

    #[test]
    fn test_program_with_init() {
        let program = Program::with_init();
        assert_eq!(program.len(), 1);
        assert_eq!(program.ops[0], Op::Init);
    }

    #[test]
    fn test_program_collect() {
        let program: Program = [Op::Init, Op::text("x"), Op::Cut].into_iter().collect();
        assert_eq!(program.len(), 3);
        assert_eq!(program.ops[2], Op::Cut);
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(
            Op::styled("T", TextStyle::BOLD, Alignment::Left),
            Op::Text {
                content: "T".into(),
                style: Some(TextStyle::BOLD),
                align: Some(Alignment::Left),
            }
        );
        assert_eq!(
            Op::qr("abc"),
            Op::QrStore {
                data: b"abc".to_vec(),
                module_size: 6
            }
        );
    }
}
