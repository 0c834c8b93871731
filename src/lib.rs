//! sealkit - typed cryptographic building blocks over a small set of
//! backend ciphers
//!
//! This crate provides:
//! - An operation registry describing every supported algorithm and its sizes
//! - Guard-paged, page-locked buffers for keys and other secrets
//! - Counter nonces that refuse to wrap around
//! - Z85 and hex codecs
//! - Sealers and openers for box, secret box, AEAD and stream operations,
//!   plus hashes, authenticators, signatures and key agreement
//!
//! Components are generic over a marker type from [`operation::ops`], so a
//! key made for one operation cannot be handed to another.

pub mod auth;
mod backend;
pub mod config;
pub mod dh;
pub mod encode;
pub mod error;
pub mod hash;
pub mod keys;
pub mod memory;
pub mod nonce;
pub mod operation;
pub mod seal;
pub mod sign;

pub use auth::{AuthBuilder, Authenticator};
pub use dh::{DiffieHellman, Role};
pub use error::{CryptoError, Result};
pub use hash::{GenericHashBuilder, Hash, PasswordHash, SizedHash};
pub use keys::{KeyPair, PublicKey, Salt, SecretKey, Seed};
pub use memory::{Access, LockPolicy, SecureBuffer};
pub use nonce::Nonce;
pub use operation::{ops, Operation, OperationTraits};
pub use seal::{
    AeadOpener, AeadSealer, BoxOpener, BoxSealer, SecretBoxOpener, SecretBoxSealer, Streamer,
};
pub use sign::Signature;

/// Check that the system random source and locked memory both work.
///
/// Nothing else needs to be called first; this only surfaces problems early.
///
/// # Errors
/// `Init` if either facility is unavailable.
pub fn init() -> Result<()> {
    let mut probe = zeroize::Zeroizing::new([0u8; 32]);
    backend::fill_random(&mut probe[..])?;

    let buffer = SecureBuffer::allocate(probe.len()).map_err(|e| {
        tracing::error!(error = %e, "secure memory unavailable");
        CryptoError::Init("secure memory")
    })?;
    tracing::debug!(
        locked = buffer.is_locked(),
        policy = ?memory::lock_policy(),
        "sealkit initialized"
    );
    Ok(())
}
