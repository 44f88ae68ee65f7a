//! # ESC/POS Text Commands
//!
//! Text styling, alignment and the text line itself.
//!
//! ## Print Mode Byte
//!
//! ESC/POS selects bold and character size with one print-mode byte
//! (`ESC ! n`). Each style is an independent bit, so any combination can
//! be expressed by OR-ing flags:
//!
//! | Bit | Value | Style |
//! |-----|-------|-------|
//! | 3 | 0x08 | Bold (emphasized) |
//! | 4 | 0x10 | Double height |
//! | 5 | 0x20 | Double width |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```

use super::commands::{ESC, LF};
use super::cp437;

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// Sets the alignment for subsequent text lines.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
/// | Decimal | 27 97 n |
///
/// ## Parameters
///
/// - `n = 0`: Left alignment (default)
/// - `n = 1`: Center alignment
/// - `n = 2`: Right alignment
///
/// ## Example
///
/// ```
/// use struk::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// PRINT MODE (STYLE)
// ============================================================================

/// Print mode flags carried by `ESC ! n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub double_height: bool,
    pub double_width: bool,
}

impl TextStyle {
    const BOLD_BIT: u8 = 1 << 3;
    const DOUBLE_HEIGHT_BIT: u8 = 1 << 4;
    const DOUBLE_WIDTH_BIT: u8 = 1 << 5;

    /// All flags cleared.
    pub const NORMAL: Self = Self {
        bold: false,
        double_height: false,
        double_width: false,
    };

    /// Bold only.
    pub const BOLD: Self = Self {
        bold: true,
        double_height: false,
        double_width: false,
    };

    pub const fn new(bold: bool, double_height: bool, double_width: bool) -> Self {
        Self {
            bold,
            double_height,
            double_width,
        }
    }

    /// The print-mode byte for this style.
    pub const fn bits(&self) -> u8 {
        let mut n = 0;
        if self.bold {
            n |= Self::BOLD_BIT;
        }
        if self.double_height {
            n |= Self::DOUBLE_HEIGHT_BIT;
        }
        if self.double_width {
            n |= Self::DOUBLE_WIDTH_BIT;
        }
        n
    }

    /// Encode as a complete `ESC ! n` command.
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![ESC, b'!', self.bits()]
    }
}

/// # Select Print Mode (ESC ! n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC ! n |
/// | Hex     | 1B 21 n |
/// | Decimal | 27 33 n |
///
/// ## Example
///
/// ```
/// use struk::protocol::text::text_style;
///
/// assert_eq!(text_style(false, false, false), vec![0x1B, 0x21, 0x00]);
/// assert_eq!(text_style(true, false, false), vec![0x1B, 0x21, 0x08]);
/// assert_eq!(text_style(true, true, true), vec![0x1B, 0x21, 0x38]);
/// ```
pub fn text_style(bold: bool, double_height: bool, double_width: bool) -> Vec<u8> {
    TextStyle::new(bold, double_height, double_width).to_bytes()
}

// ============================================================================
// TEXT LINE
// ============================================================================

/// Encode one line of text.
///
/// Emits the alignment and style prefixes (when given), the text encoded
/// as code page 437, then `LF`.
///
/// ```
/// use struk::protocol::text::{text, Alignment, TextStyle};
///
/// let line = text("Hi", Some(TextStyle::BOLD), Some(Alignment::Right));
/// assert_eq!(line, vec![0x1B, 0x61, 0x02, 0x1B, 0x21, 0x08, b'H', b'i', 0x0A]);
/// ```
pub fn text(content: &str, style: Option<TextStyle>, alignment: Option<Alignment>) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 7);
    if let Some(alignment) = alignment {
        out.extend(align(alignment));
    }
    if let Some(style) = style {
        out.extend(style.to_bytes());
    }
    out.extend(cp437::encode(content));
    out.push(LF);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_style_constants() {
        assert_eq!(TextStyle::NORMAL.to_bytes(), vec![0x1B, 0x21, 0x00]);
        assert_eq!(TextStyle::BOLD.to_bytes(), vec![0x1B, 0x21, 0x08]);
    }

    #[test]
    fn test_style_is_bit_composition_for_all_combinations() {
        for n in 0u8..8 {
            let bold = n & 1 != 0;
            let dh = n & 2 != 0;
            let dw = n & 4 != 0;
            let expected = (if bold { 1 << 3 } else { 0 })
                | (if dh { 1 << 4 } else { 0 })
                | (if dw { 1 << 5 } else { 0 });
            assert_eq!(
                text_style(bold, dh, dw),
                vec![0x1B, 0x21, expected],
                "bold={bold} dh={dh} dw={dw}"
            );
        }
    }

    #[test]
    fn test_text_plain() {
        assert_eq!(text("AB", None, None), vec![b'A', b'B', LF]);
    }

    #[test]
    fn test_text_empty_is_just_line_feed() {
        assert_eq!(text("", None, None), vec![LF]);
    }

    #[test]
    fn test_text_alignment_precedes_style() {
        let line = text("x", Some(TextStyle::NORMAL), Some(Alignment::Center));
        assert_eq!(line, vec![0x1B, 0x61, 0x01, 0x1B, 0x21, 0x00, b'x', LF]);
    }
}
