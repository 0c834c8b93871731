//! X25519 scalar multiplication

use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::to_array;
use crate::error::{CryptoError, Result};
use crate::operation::ops::DiffieHellmanX25519;
use crate::operation::{DhOp, KeyPairOp, SecretKeyOp};

/// Public key for a 32-byte X25519 scalar.
pub(super) fn public_from_scalar(scalar: &[u8], public: &mut [u8]) -> Result<()> {
    let secret = StaticSecret::from(*Zeroizing::new(to_array::<32>(scalar)?));
    public.copy_from_slice(PublicKey::from(&secret).as_bytes());
    Ok(())
}

/// Raw shared point; fails for low-order peer keys.
pub(super) fn shared_point(scalar: &[u8], peer_public: &[u8], out: &mut [u8]) -> Result<()> {
    let secret = StaticSecret::from(*Zeroizing::new(to_array::<32>(scalar)?));
    let peer = PublicKey::from(to_array::<32>(peer_public)?);
    let shared = secret.diffie_hellman(&peer);
    if !shared.was_contributory() {
        tracing::debug!("rejected non-contributory X25519 peer key");
        return Err(CryptoError::KeyGen);
    }
    out.copy_from_slice(shared.as_bytes());
    Ok(())
}

impl SecretKeyOp for DiffieHellmanX25519 {}

impl KeyPairOp for DiffieHellmanX25519 {
    fn seed_keypair(seed: &[u8], public: &mut [u8], secret: &mut [u8]) -> Result<()> {
        secret.copy_from_slice(seed);
        public_from_scalar(seed, public)
    }
}

impl DhOp for DiffieHellmanX25519 {
    fn scalar_mult(secret: &[u8], peer_public: &[u8], out: &mut [u8]) -> Result<()> {
        shared_point(secret, peer_public, out)
    }
}
