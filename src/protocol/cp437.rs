//! # Code Page 437 Encoding
//!
//! Converts Unicode strings to the single-byte code page 437, the power-on
//! character table of ESC/POS printers. ASCII (U+0000-U+007F) passes through
//! unchanged; characters with no code page 437 glyph become `?`.

use tracing::warn;

/// Upper half of code page 437, indexed by `byte - 0x80`.
const UPPER_HALF: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', // 0x80
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', // 0x90
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', // 0xA0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', // 0xB0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', // 0xC0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', // 0xD0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', // 0xE0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}', // 0xF0
];

/// Encode a Unicode string as code page 437 bytes.
pub fn encode(s: &str) -> Vec<u8> {
    s.chars().map(encode_char).collect()
}

fn encode_char(ch: char) -> u8 {
    if ch.is_ascii() {
        return ch as u8;
    }
    match UPPER_HALF.iter().position(|&c| c == ch) {
        Some(index) => 0x80 + index as u8,
        None => {
            warn!(
                character = %ch,
                code_point = ch as u32,
                "no code page 437 glyph, printing '?'"
            );
            b'?'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Rp25.000 x 2"), b"Rp25.000 x 2");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(encode(""), b"");
    }

    #[test]
    fn test_accented_latin() {
        assert_eq!(encode("é"), vec![0x82]);
        assert_eq!(encode("ñ"), vec![0xA4]);
        assert_eq!(encode("Ü"), vec![0x9A]);
    }

    #[test]
    fn test_box_drawing_and_blocks() {
        assert_eq!(encode("─"), vec![0xC4]);
        assert_eq!(encode("═"), vec![0xCD]);
        assert_eq!(encode("█"), vec![0xDB]);
    }

    #[test]
    fn test_table_edges() {
        assert_eq!(encode("Ç"), vec![0x80]);
        assert_eq!(encode("\u{00A0}"), vec![0xFF]);
    }

    #[test]
    fn test_unmapped_char_becomes_question_mark() {
        assert_eq!(encode("★"), vec![b'?']);
        assert_eq!(encode("日本"), vec![b'?', b'?']);
    }

    #[test]
    fn test_mixed_ascii_and_extended() {
        assert_eq!(encode("Café"), vec![0x43, 0x61, 0x66, 0x82]);
    }
}
