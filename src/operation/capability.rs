//! Capability traits
//!
//! One trait per algorithm family. A marker implements a family trait only
//! when its registry entry has that capability, and the implementations in
//! [`crate::backend`] are the only place backend crates are called. All
//! functions take and return plain byte slices; sizes have already been
//! checked by the typed wrappers that call them.

use super::Op;
use crate::config::PwHashParams;
use crate::error::Result;

/// Operations that take a fixed-size secret key.
pub trait SecretKeyOp: Op {}

/// Operations with a (public, secret) key pair derivable from a seed.
pub trait KeyPairOp: SecretKeyOp {
    /// Fill `public` and `secret` from `seed`.
    fn seed_keypair(seed: &[u8], public: &mut [u8], secret: &mut [u8]) -> Result<()>;
}

/// Operations driven by a nonce.
pub trait NonceOp: SecretKeyOp {}

/// Operations that take a salt.
pub trait SaltOp: Op {}

/// Streaming state for multi-part hashes and authenticators.
pub trait Incremental {
    fn update(&mut self, data: &[u8]);

    /// Write the result into `out`, truncating or extending per the
    /// algorithm.
    fn finalize_into(self, out: &mut [u8]);
}

/// Unkeyed fixed-size digest.
pub trait HashOp: Op {
    fn hash(data: &[u8], out: &mut [u8]);
}

/// Keyed short hash for table lookups.
pub trait ShortHashOp: SecretKeyOp {
    fn short_hash(key: &[u8], data: &[u8], out: &mut [u8]);
}

/// Variable-size hash with an optional key.
pub trait GenericHashOp: SecretKeyOp {
    type Hasher: Incremental;

    fn hasher(key: Option<&[u8]>) -> Result<Self::Hasher>;
}

/// Password-based key derivation into a caller-sized buffer.
pub trait PwHashOp: SaltOp {
    fn derive(password: &[u8], salt: &[u8], params: &PwHashParams, out: &mut [u8]) -> Result<()>;
}

/// Self-describing password hash strings.
pub trait PwHashStrOp: Op {
    fn hash_str(password: &[u8], params: &PwHashParams) -> Result<String>;

    /// `Err(Verification)` unless `password` matches `encoded`.
    fn verify_str(encoded: &str, password: &[u8]) -> Result<()>;
}

/// Message authentication codes.
pub trait AuthOp: SecretKeyOp {
    type Mac: Incremental;

    fn mac(key: &[u8]) -> Result<Self::Mac>;
}

/// Detached signatures.
pub trait SignOp: KeyPairOp {
    fn sign(secret: &[u8], message: &[u8], signature: &mut [u8]) -> Result<()>;

    /// `Err(Verification)` unless the signature is valid.
    fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> Result<()>;

    /// Recover the public half from a secret key.
    fn secret_to_public(secret: &[u8], public: &mut [u8]) -> Result<()>;

    /// Recover the seed a secret key was derived from.
    fn secret_to_seed(secret: &[u8], seed: &mut [u8]) -> Result<()>;
}

/// Raw Diffie-Hellman scalar multiplication.
pub trait DhOp: KeyPairOp {
    fn scalar_mult(secret: &[u8], peer_public: &[u8], out: &mut [u8]) -> Result<()>;
}

/// Public-key authenticated encryption with a precomputed shared key.
pub trait BoxOp: KeyPairOp + NonceOp {
    fn precompute(peer_public: &[u8], secret: &[u8], shared: &mut [u8]) -> Result<()>;

    fn seal(shared: &[u8], nonce: &[u8], message: &[u8]) -> Result<Vec<u8>>;

    /// `Err(Verification)` on any failure.
    fn open(shared: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// Secret-key authenticated encryption.
pub trait SecretBoxOp: NonceOp {
    fn seal(key: &[u8], nonce: &[u8], message: &[u8]) -> Result<Vec<u8>>;

    /// `Err(Verification)` on any failure.
    fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// Keystream generators.
pub trait StreamOp: NonceOp {
    /// Overwrite `out` with keystream starting at block zero.
    fn keystream(key: &[u8], nonce: &[u8], out: &mut [u8]) -> Result<()>;
}

/// Authenticated encryption with associated data.
pub trait AeadOp: NonceOp {
    fn encrypt(key: &[u8], nonce: &[u8], message: &[u8], ad: &[u8]) -> Result<Vec<u8>>;

    /// `Err(Verification)` on any failure.
    fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8], ad: &[u8]) -> Result<Vec<u8>>;
}
