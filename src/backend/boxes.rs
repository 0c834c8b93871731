//! Curve25519 box and secret box, both sealed with XChaCha20-Poly1305
//!
//! The box shared key is `HChaCha20(X25519(secret, peer), 0^16)`, computed
//! once per sealer/opener.

use chacha20::cipher::consts::U10;
use chacha20::hchacha;
use chacha20poly1305::XChaCha20Poly1305;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use super::aead::{decrypt_with, encrypt_with};
use super::dh::{public_from_scalar, shared_point};
use crate::error::{check_size, Result};
use crate::operation::ops::{BoxCurve25519XChacha20Poly1305, SecretBoxXChacha20Poly1305};
use crate::operation::{BoxOp, KeyPairOp, NonceOp, SecretBoxOp, SecretKeyOp};

impl SecretKeyOp for BoxCurve25519XChacha20Poly1305 {}
impl NonceOp for BoxCurve25519XChacha20Poly1305 {}

impl KeyPairOp for BoxCurve25519XChacha20Poly1305 {
    /// The scalar is the first half of `SHA-512(seed)`.
    fn seed_keypair(seed: &[u8], public: &mut [u8], secret: &mut [u8]) -> Result<()> {
        let mut digest = Zeroizing::new([0u8; 64]);
        digest.copy_from_slice(&Sha512::digest(seed));
        secret.copy_from_slice(&digest[..32]);
        public_from_scalar(&digest[..32], public)
    }
}

impl BoxOp for BoxCurve25519XChacha20Poly1305 {
    fn precompute(peer_public: &[u8], secret: &[u8], shared: &mut [u8]) -> Result<()> {
        check_size(32, shared.len())?;
        let mut point = Zeroizing::new([0u8; 32]);
        shared_point(secret, peer_public, &mut point[..])?;

        let key = chacha20::Key::from_slice(&point[..]);
        shared.copy_from_slice(&hchacha::<U10>(key, &Default::default()));
        Ok(())
    }

    fn seal(shared: &[u8], nonce: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        encrypt_with::<XChaCha20Poly1305>(shared, nonce, message, &[])
    }

    fn open(shared: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt_with::<XChaCha20Poly1305>(shared, nonce, ciphertext, &[])
    }
}

impl SecretKeyOp for SecretBoxXChacha20Poly1305 {}
impl NonceOp for SecretBoxXChacha20Poly1305 {}

impl SecretBoxOp for SecretBoxXChacha20Poly1305 {
    fn seal(key: &[u8], nonce: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        encrypt_with::<XChaCha20Poly1305>(key, nonce, message, &[])
    }

    fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt_with::<XChaCha20Poly1305>(key, nonce, ciphertext, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;

    type B = BoxCurve25519XChacha20Poly1305;

    fn pair(seed: u8) -> ([u8; 32], [u8; 32]) {
        let mut public = [0u8; 32];
        let mut secret = [0u8; 32];
        B::seed_keypair(&[seed; 32], &mut public, &mut secret).unwrap();
        (public, secret)
    }

    #[test]
    fn test_precomputed_keys_agree() {
        let (pa, sa) = pair(1);
        let (pb, sb) = pair(2);
        let mut ab = [0u8; 32];
        let mut ba = [0u8; 32];
        B::precompute(&pb, &sa, &mut ab).unwrap();
        B::precompute(&pa, &sb, &mut ba).unwrap();
        assert_eq!(ab, ba);

        let nonce = [3u8; 24];
        let sealed = <B as BoxOp>::seal(&ab, &nonce, b"to bob").unwrap();
        assert_eq!(<B as BoxOp>::open(&ba, &nonce, &sealed).unwrap(), b"to bob");
    }

    #[test]
    fn test_secret_box_rejects_wrong_key() {
        let nonce = [0u8; 24];
        let sealed = SecretBoxXChacha20Poly1305::seal(&[1u8; 32], &nonce, b"x").unwrap();
        assert!(matches!(
            SecretBoxXChacha20Poly1305::open(&[2u8; 32], &nonce, &sealed),
            Err(CryptoError::Verification)
        ));
    }
}
