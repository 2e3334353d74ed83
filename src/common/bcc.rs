// src/common/bcc.rs

use super::error::AnalyzerError;

/// XOR-folds every byte of `data` into a single block-check byte.
///
/// The fold is order independent, so callers may pass the bytes in any order.
#[inline]
pub fn calculate_bcc(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Encodes a single nibble (0..=15) as an uppercase ASCII hex digit.
///
/// `nibble | 0x30` yields `'0'..='9'` directly; values past `'9'` are shifted
/// by 7 into `'A'..='F'`.
#[inline]
pub const fn encode_nibble(nibble: u8) -> u8 {
    let c = (nibble & 0x0F) | 0x30;
    if c > 0x39 {
        c + 7
    } else {
        c
    }
}

/// Encodes a block-check byte as two ASCII characters `[high, low]`.
pub fn encode_bcc_ascii(bcc: u8) -> [u8; 2] {
    [encode_nibble(bcc >> 4), encode_nibble(bcc & 0x0F)]
}

/// Decodes two ASCII hex characters produced by [`encode_bcc_ascii`] back into the byte.
///
/// # Returns
///
/// * `Ok(byte)` for two characters in `'0'..='9' | 'A'..='F'`.
/// * `Err(AnalyzerError::InvalidCharacter)` naming the first offending byte otherwise.
pub fn decode_bcc_ascii(chars: [u8; 2]) -> Result<u8, AnalyzerError> {
    let hi = decode_nibble(chars[0])?;
    let lo = decode_nibble(chars[1])?;
    Ok((hi << 4) | lo)
}

fn decode_nibble(c: u8) -> Result<u8, AnalyzerError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(AnalyzerError::InvalidCharacter(c)),
    }
}

/// Computes the two BCC characters for a framed command.
///
/// `frame` starts with the start marker, which is excluded from the fold.
/// An empty frame folds to zero.
pub fn compute(frame: &[u8]) -> [u8; 2] {
    let payload = frame.get(1..).unwrap_or(&[]);
    encode_bcc_ascii(calculate_bcc(payload))
}
