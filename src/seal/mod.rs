//! Sealers and openers
//!
//! A sealer encrypts and an opener decrypts. Each borrows a [`Nonce`] for
//! its lifetime and advances it by one after every successful message, so
//! the two ends stay in step as long as they see the same sequence:
//!
//! ```text
//! sealer: seal(m0) seal(m1) seal(m2)      nonce c‖0, c‖1, c‖2
//! opener: open(x0) open(x1) open(x2)      nonce c‖0, c‖1, c‖2
//! ```
//!
//! A failed open leaves the nonce where it was. An overflowed nonce makes
//! every further call fail with [`CryptoError::Overflow`].
//!
//! [`CryptoError::Overflow`]: crate::error::CryptoError::Overflow

mod aead;
mod boxes;
mod stream;

pub use aead::{AeadOpener, AeadSealer};
pub use boxes::{BoxOpener, BoxSealer, SecretBoxOpener, SecretBoxSealer};
pub use stream::{default_pad_size, set_default_pad_size, Streamer};

use crate::error::{CryptoError, Result};
use crate::nonce::Nonce;
use crate::operation::NonceOp;

/// Run one transform under the current nonce, then advance it.
fn step<O, T>(nonce: &mut Nonce<O>, transform: impl FnOnce(&[u8]) -> Result<T>) -> Result<T>
where
    O: NonceOp,
{
    nonce.ensure_usable()?;
    let output = transform(nonce.as_bytes()).map_err(|e| {
        if matches!(e, CryptoError::Verification) {
            tracing::debug!(operation = %O::OPERATION, "message failed authentication");
        }
        e
    })?;
    nonce.increment()?;
    Ok(output)
}
