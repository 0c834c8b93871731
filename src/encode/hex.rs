//! Hex encoding with optional separator characters

use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

pub fn bin_to_hex(bin: &[u8]) -> String {
    hex::encode(bin)
}

/// Decode hex, skipping any character listed in `ignore` (for example `":"`
/// or `" "`).
pub fn hex_to_bin(text: &str, ignore: &str) -> Result<Vec<u8>> {
    let digits: Zeroizing<String> = if ignore.is_empty() {
        Zeroizing::new(text.to_owned())
    } else {
        Zeroizing::new(text.chars().filter(|c| !ignore.contains(*c)).collect())
    };
    hex::decode(digits.as_bytes()).map_err(|_| CryptoError::Format)
}

/// Decode into an exactly sized buffer.
pub fn hex_to_bin_into(text: &str, ignore: &str, out: &mut [u8]) -> Result<()> {
    let bin = Zeroizing::new(hex_to_bin(text, ignore)?);
    if bin.len() != out.len() {
        return Err(CryptoError::size(out.len(), bin.len()));
    }
    out.copy_from_slice(&bin);
    Ok(())
}
