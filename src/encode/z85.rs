//! Z85 text encoding
//!
//! Every 4 input bytes, read as a big-endian `u32`, become 5 characters of
//! an 85-letter printable alphabet. The *safe* functions require lengths that
//! are exact multiples of 4 (binary) or 5 (text). The *padded* functions take
//! any binary length: they append `pad = 4 - len % 4` bytes (1 to 4, never
//! 0), the last of which is the ASCII digit of `pad`, so the text is
//! self-describing.

use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

const ALPHABET: &[u8; 85] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.-:+=^!/*?&<>()[]{}@%$#";

const INVALID: u8 = 0xFF;

/// Inverse of [`ALPHABET`] for bytes 32..=127, indexed by `byte - 32`.
const DECODE: [u8; 96] = {
    let mut table = [INVALID; 96];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[(ALPHABET[i] - 32) as usize] = i as u8;
        i += 1;
    }
    table
};

/// `ceil(2^38 / 85)`: `(n * DIV_MAGIC) >> 38 == n / 85` for every `u32`.
const DIV_MAGIC: u64 = 3_233_857_729;

#[inline]
fn div85(n: u32) -> u32 {
    ((u64::from(n) * DIV_MAGIC) >> 32 >> 6) as u32
}

fn encode_tuple(input: &[u8], out: &mut String) {
    let mut value = u32::from_be_bytes([input[0], input[1], input[2], input[3]]);
    let mut digits = [0u8; 5];
    for digit in digits.iter_mut().rev() {
        let next = div85(value);
        *digit = ALPHABET[(value - next * 85) as usize];
        value = next;
    }
    // Only ASCII from the alphabet is ever pushed
    out.extend(digits.iter().map(|&d| d as char));
}

fn digit(ch: u8) -> Result<u64> {
    if !(32..128).contains(&ch) {
        return Err(CryptoError::Format);
    }
    match DECODE[(ch - 32) as usize] {
        INVALID => Err(CryptoError::Format),
        value => Ok(u64::from(value)),
    }
}

fn decode_tuple(input: &[u8], out: &mut [u8]) -> Result<()> {
    let mut value = 0u64;
    for &ch in input {
        value = value * 85 + digit(ch)?;
    }
    let value = u32::try_from(value).map_err(|_| CryptoError::Format)?;
    out.copy_from_slice(&value.to_be_bytes());
    Ok(())
}

pub const fn is_safe_z85_bin_size(len: usize) -> bool {
    len % 4 == 0
}

pub const fn is_safe_z85_string_size(len: usize) -> bool {
    len % 5 == 0
}

pub const fn safe_z85_bin_to_string_size(len: usize) -> usize {
    len / 4 * 5
}

pub const fn safe_z85_string_to_bin_size(len: usize) -> usize {
    len / 5 * 4
}

/// Number of padding bytes the padded encoding appends, always 1..=4.
pub const fn z85_pad_size(len: usize) -> usize {
    4 - len % 4
}

/// Text length of the padded encoding of `len` bytes.
pub const fn z85_bin_to_string_size(len: usize) -> usize {
    safe_z85_bin_to_string_size(len + z85_pad_size(len))
}

/// Encode an exact multiple of 4 bytes.
pub fn safe_bin_to_z85(bin: &[u8]) -> Result<String> {
    if !is_safe_z85_bin_size(bin.len()) {
        return Err(CryptoError::size(
            bin.len() + z85_pad_size(bin.len()),
            bin.len(),
        ));
    }
    let mut text = String::with_capacity(safe_z85_bin_to_string_size(bin.len()));
    for tuple in bin.chunks_exact(4) {
        encode_tuple(tuple, &mut text);
    }
    Ok(text)
}

/// Decode into an exactly sized output buffer.
pub fn safe_z85_to_bin_into(text: &str, out: &mut [u8]) -> Result<()> {
    let text = text.as_bytes();
    if !is_safe_z85_string_size(text.len()) {
        return Err(CryptoError::size(
            text.len() + (5 - text.len() % 5),
            text.len(),
        ));
    }
    if out.len() != safe_z85_string_to_bin_size(text.len()) {
        return Err(CryptoError::size(
            safe_z85_string_to_bin_size(text.len()),
            out.len(),
        ));
    }
    for (group, bytes) in text.chunks_exact(5).zip(out.chunks_exact_mut(4)) {
        decode_tuple(group, bytes)?;
    }
    Ok(())
}

/// Decode an exact multiple of 5 characters.
pub fn safe_z85_to_bin(text: &str) -> Result<Vec<u8>> {
    let mut bin = vec![0u8; safe_z85_string_to_bin_size(text.len())];
    safe_z85_to_bin_into(text, &mut bin)?;
    Ok(bin)
}

/// Encode any number of bytes, appending the self-describing pad.
pub fn bin_to_z85(bin: &[u8]) -> String {
    let pad = z85_pad_size(bin.len());
    let mut padded = Zeroizing::new(Vec::with_capacity(bin.len() + pad));
    padded.extend_from_slice(bin);
    padded.resize(bin.len() + pad - 1, 0);
    padded.push(b'0' + pad as u8);

    let mut text = String::with_capacity(z85_bin_to_string_size(bin.len()));
    for tuple in padded.chunks_exact(4) {
        encode_tuple(tuple, &mut text);
    }
    text
}

/// Decode padded text, returning the original bytes.
pub fn z85_to_bin(text: &str) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Err(CryptoError::size(5, 0));
    }
    let mut bin = safe_z85_to_bin(text)?;

    let pad = match bin.last() {
        Some(&last) if (b'1'..=b'4').contains(&last) => usize::from(last - b'0'),
        _ => return Err(CryptoError::Format),
    };
    let data_len = bin.len() - pad;
    if bin[data_len..bin.len() - 1].iter().any(|&b| b != 0) {
        return Err(CryptoError::Format);
    }
    bin.truncate(data_len);
    Ok(bin)
}

/// Decode padded text into an exactly sized output buffer.
pub fn z85_to_bin_into(text: &str, out: &mut [u8]) -> Result<()> {
    let bin = Zeroizing::new(z85_to_bin(text)?);
    if bin.len() != out.len() {
        return Err(CryptoError::size(bin.len(), out.len()));
    }
    out.copy_from_slice(&bin);
    Ok(())
}

/// Encode a fixed-size value, skipping the pad when `S` is a multiple of 4.
pub fn smart_bin_to_z85<const S: usize>(bin: &[u8; S]) -> String {
    if is_safe_z85_bin_size(S) {
        let mut text = String::with_capacity(safe_z85_bin_to_string_size(S));
        for tuple in bin.chunks_exact(4) {
            encode_tuple(tuple, &mut text);
        }
        text
    } else {
        bin_to_z85(bin)
    }
}

/// Counterpart of [`smart_bin_to_z85`].
pub fn smart_z85_to_bin_into<const S: usize>(text: &str, out: &mut [u8; S]) -> Result<()> {
    if is_safe_z85_bin_size(S) {
        safe_z85_to_bin_into(text, out)
    } else {
        z85_to_bin_into(text, out)
    }
}

pub fn smart_z85_to_bin<const S: usize>(text: &str) -> Result<[u8; S]> {
    let mut out = [0u8; S];
    smart_z85_to_bin_into(text, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vector() {
        let bin = [0x86, 0x4F, 0xD2, 0x6F, 0xB5, 0x59, 0xF7, 0x5B];
        assert_eq!(safe_bin_to_z85(&bin).unwrap(), "HelloWorld");
        assert_eq!(safe_z85_to_bin("HelloWorld").unwrap(), bin);
    }

    #[test]
    fn test_div85_matches_division() {
        for n in [0u32, 1, 84, 85, 86, 7224, 7225, 614_124, 52_200_624, u32::MAX - 1, u32::MAX] {
            assert_eq!(div85(n), n / 85, "n = {n}");
        }
    }

    #[test]
    fn test_decode_table_inverts_alphabet() {
        for (i, &ch) in ALPHABET.iter().enumerate() {
            assert_eq!(DECODE[(ch - 32) as usize] as usize, i);
        }
        let valid = DECODE.iter().filter(|&&v| v != INVALID).count();
        assert_eq!(valid, 85);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(safe_bin_to_z85(&[0, 0, 0, 0]).unwrap(), "00000");
        assert_eq!(safe_bin_to_z85(&[0xFF; 4]).unwrap(), "%nSc0");
        assert_eq!(safe_z85_to_bin("%nSc0").unwrap(), [0xFF; 4]);
    }

    #[test]
    fn test_group_above_u32_rejected() {
        // "#####" is 85^5 - 1, beyond 32 bits
        assert!(matches!(safe_z85_to_bin("#####"), Err(CryptoError::Format)));
        assert!(matches!(safe_z85_to_bin("%nSc1"), Err(CryptoError::Format)));
    }

    #[test]
    fn test_safe_sizes_enforced() {
        assert!(matches!(safe_bin_to_z85(&[1, 2, 3]), Err(CryptoError::Size { .. })));
        assert!(matches!(safe_z85_to_bin("Hello"), Ok(_)));
        assert!(matches!(safe_z85_to_bin("Hell"), Err(CryptoError::Size { .. })));

        let mut out = [0u8; 3];
        assert!(matches!(
            safe_z85_to_bin_into("HelloWorld", &mut out),
            Err(CryptoError::Size {
                expected: 8,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_rejects_characters_outside_alphabet() {
        for bad in ["Hell\"", "Hell ", "Hell,", "Hell;", "Hell\\", "Hell_", "Hell`", "Hell|", "Hell~", "Hell\x7f", "Hell\x1f", "Hellé"] {
            let padded = if bad.len() % 5 == 0 { bad.to_string() } else { format!("{bad}0000") };
            assert!(
                matches!(safe_z85_to_bin(&padded), Err(CryptoError::Format | CryptoError::Size { .. })),
                "accepted {bad:?}"
            );
        }
        assert!(matches!(safe_z85_to_bin("Hell\""), Err(CryptoError::Format)));
        assert!(matches!(safe_z85_to_bin("Hell~"), Err(CryptoError::Format)));
    }

    #[test]
    fn test_padded_field_of_twenty_bytes() {
        let field = b"01234567890123456789";
        let text = bin_to_z85(field);
        assert_eq!(text.len(), z85_bin_to_string_size(20));
        assert_eq!(text.len(), 30);
        assert_eq!(z85_to_bin(&text).unwrap(), field);
    }

    #[test]
    fn test_pad_size_is_never_zero() {
        assert_eq!(z85_pad_size(0), 4);
        assert_eq!(z85_pad_size(1), 3);
        assert_eq!(z85_pad_size(3), 1);
        assert_eq!(z85_pad_size(4), 4);
        assert_eq!(bin_to_z85(&[]).len(), 5);
        assert!(z85_to_bin(&bin_to_z85(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_padded_rejects_bad_pad() {
        assert!(matches!(z85_to_bin(""), Err(CryptoError::Size { .. })));
        // Last byte 0x00 is not a pad digit
        let no_pad = safe_bin_to_z85(&[1, 2, 3, 0]).unwrap();
        assert!(matches!(z85_to_bin(&no_pad), Err(CryptoError::Format)));
        // Digit says 5
        let five = safe_bin_to_z85(&[0, 0, 0, b'5']).unwrap();
        assert!(matches!(z85_to_bin(&five), Err(CryptoError::Format)));
        // Non-zero filler before the digit
        let dirty = safe_bin_to_z85(&[9, 7, 0, b'3']).unwrap();
        assert!(matches!(z85_to_bin(&dirty), Err(CryptoError::Format)));
    }

    #[test]
    fn test_padded_into_checks_size() {
        let text = bin_to_z85(b"abcdef");
        let mut exact = [0u8; 6];
        z85_to_bin_into(&text, &mut exact).unwrap();
        assert_eq!(&exact, b"abcdef");

        let mut wrong = [0u8; 8];
        assert!(matches!(
            z85_to_bin_into(&text, &mut wrong),
            Err(CryptoError::Size { .. })
        ));
    }

    #[test]
    fn test_smart_picks_variant() {
        let aligned = [7u8; 32];
        let text = smart_bin_to_z85(&aligned);
        assert_eq!(text.len(), 40);
        assert_eq!(text, safe_bin_to_z85(&aligned).unwrap());
        assert_eq!(smart_z85_to_bin::<32>(&text).unwrap(), aligned);

        let odd = [7u8; 20 + 1];
        let text = smart_bin_to_z85(&odd);
        assert_eq!(text, bin_to_z85(&odd));
        assert_eq!(smart_z85_to_bin::<21>(&text).unwrap(), odd);
    }
}
