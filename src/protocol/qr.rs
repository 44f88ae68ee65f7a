//! # QR Code Commands (GS ( k)
//!
//! ESC/POS prints QR codes in two phases: the symbol is configured and
//! its data stored in the printer's symbol buffer, then a separate command
//! triggers printing of the stored symbol.
//!
//! All frames share the `GS ( k pL pH cn fn ...` envelope, where `pL pH` is
//! the little-endian count of bytes following them and `cn = 0x31` selects
//! the QR symbol family.
//!
//! ```text
//! 1D 28 6B 04 00 31 41 32 00   select model 2
//! 1D 28 6B 03 00 31 43 06      module size 6 dots
//! 1D 28 6B 03 00 31 45 31      error correction
//! 1D 28 6B pL pH 31 50 30 ...  store payload
//! 1D 28 6B 03 00 31 51 30      print stored symbol
//! ```

use super::commands::{GS, u16_le};
use crate::error::EncodingError;

/// Symbol family selector (`cn`) for QR.
const CN_QR: u8 = 0x31;

/// Bytes of the store frame counted by `pL pH` ahead of the payload:
/// `cn`, `fn` and `m`.
pub const STORE_HEADER_LEN: usize = 3;

/// Largest payload whose store frame length still fits in `pL pH`.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize - STORE_HEADER_LEN;

/// Default module size in dots.
pub const DEFAULT_MODULE_SIZE: u8 = 6;

fn frame(fn_code: u8, params: &[u8]) -> Vec<u8> {
    // pL pH count cn + fn + params; params here are at most 2 bytes.
    let len = (params.len() + 2) as u16;
    let mut cmd = vec![GS, b'(', b'k'];
    cmd.extend(u16_le(len));
    cmd.push(CN_QR);
    cmd.push(fn_code);
    cmd.extend_from_slice(params);
    cmd
}

/// Select QR model 2 (function 165).
pub fn select_model() -> Vec<u8> {
    frame(b'A', &[b'2', 0])
}

/// Set the module (cell) size in dots (function 167).
pub fn module_size(dots: u8) -> Vec<u8> {
    frame(b'C', &[dots])
}

/// Set the error-correction level (function 169).
pub fn error_correction() -> Vec<u8> {
    frame(b'E', &[b'1'])
}

/// # Store Symbol Data (function 180)
///
/// `GS ( k pL pH 31 50 30 d1...dk` where `pL + pH * 256 = k + 3`.
///
/// Fails with [`EncodingError::PayloadTooLarge`] when `k + 3` does not fit
/// in 16 bits; the payload is never truncated.
///
/// ```
/// use struk::protocol::qr;
///
/// let cmd = qr::store(b"hi").unwrap();
/// assert_eq!(cmd, vec![0x1D, 0x28, 0x6B, 0x05, 0x00, 0x31, 0x50, 0x30, b'h', b'i']);
/// ```
pub fn store(data: &[u8]) -> Result<Vec<u8>, EncodingError> {
    if data.len() > MAX_PAYLOAD_LEN {
        return Err(EncodingError::PayloadTooLarge {
            len: data.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    let len = (data.len() + STORE_HEADER_LEN) as u16;
    let mut cmd = Vec::with_capacity(data.len() + 8);
    cmd.extend([GS, b'(', b'k']);
    cmd.extend(u16_le(len));
    cmd.extend([CN_QR, b'P', b'0']);
    cmd.extend_from_slice(data);
    Ok(cmd)
}

/// Print the symbol currently stored (function 181).
pub fn print() -> Vec<u8> {
    frame(b'Q', &[b'0'])
}

/// Configure and store a QR payload: model, module size, error correction,
/// then the store frame. Printing is a separate [`print`] command.
pub fn payload(data: &[u8], module: u8) -> Result<Vec<u8>, EncodingError> {
    let store = store(data)?;
    let mut cmd = Vec::with_capacity(store.len() + 25);
    cmd.extend(select_model());
    cmd.extend(module_size(module));
    cmd.extend(error_correction());
    cmd.extend(store);
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_model() {
        assert_eq!(
            select_model(),
            vec![0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]
        );
    }

    #[test]
    fn test_module_size() {
        assert_eq!(
            module_size(DEFAULT_MODULE_SIZE),
            vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, 0x06]
        );
    }

    #[test]
    fn test_error_correction() {
        assert_eq!(
            error_correction(),
            vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 0x31]
        );
    }

    #[test]
    fn test_print() {
        assert_eq!(print(), vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]);
    }

    #[test]
    fn test_store_length_field_crosses_byte_boundary() {
        for len in [0usize, 1, 255, 256] {
            let data = vec![b'x'; len];
            let cmd = store(&data).unwrap();
            let field = cmd[3] as usize | (cmd[4] as usize) << 8;
            assert_eq!(field, len + 3, "payload len {len}");
            assert_eq!(&cmd[5..8], &[0x31, 0x50, 0x30]);
            assert_eq!(&cmd[8..], &data[..]);
        }
    }

    #[test]
    fn test_store_length_field_bytes() {
        // 253 + 3 = 256 -> low byte wraps to 0, high byte 1
        let cmd = store(&[0u8; 253]).unwrap();
        assert_eq!(&cmd[3..5], &[0x00, 0x01]);
    }

    #[test]
    fn test_store_largest_payload_fits() {
        let cmd = store(&vec![0u8; MAX_PAYLOAD_LEN]).unwrap();
        assert_eq!(&cmd[3..5], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_store_rejects_oversized_payload() {
        let err = store(&vec![0u8; MAX_PAYLOAD_LEN + 1]).unwrap_err();
        assert_eq!(
            err,
            EncodingError::PayloadTooLarge {
                len: MAX_PAYLOAD_LEN + 1,
                max: MAX_PAYLOAD_LEN
            }
        );
    }

    #[test]
    fn test_payload_sequence_order() {
        let cmd = payload(b"A", DEFAULT_MODULE_SIZE).unwrap();
        let mut expected = Vec::new();
        expected.extend(select_model());
        expected.extend(module_size(6));
        expected.extend(error_correction());
        expected.extend(store(b"A").unwrap());
        assert_eq!(cmd, expected);
        // print trigger is not part of the payload
        assert!(!cmd.ends_with(&print()));
    }
}
