//! Backend cipher library
//!
//! Implements the capability traits of [`crate::operation`] for every
//! operation marker on top of RustCrypto, dalek, blake3 and argon2. This is
//! the only module that touches those crates; everything above it sees byte
//! slices and [`CryptoError`].

mod aead;
mod auth;
mod boxes;
mod dh;
mod hash;
mod pwhash;
mod sign;
mod stream;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, Result};

/// Fill `buf` from the operating system's random source.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        tracing::error!(error = %e, "system random source failed");
        CryptoError::Init("system random source")
    })
}

/// Copy a slice into a fixed array, reporting a size error on mismatch.
pub(crate) fn to_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::size(N, bytes.len()))
}
