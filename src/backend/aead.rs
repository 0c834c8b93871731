//! AES-256-GCM, ChaCha20-Poly1305 (IETF) and XChaCha20-Poly1305
//!
//! All three append a 16-byte tag to the ciphertext.

use aes_gcm::Aes256Gcm;
use chacha20poly1305::aead::generic_array::typenum::Unsigned;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, XChaCha20Poly1305};

use crate::error::{check_size, CryptoError, Result};
use crate::operation::ops::{AeadAes256Gcm, AeadChacha20Poly1305Ietf, AeadXChacha20Poly1305Ietf};
use crate::operation::{AeadOp, NonceOp, SecretKeyOp};

pub(super) fn encrypt_with<A: Aead + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    message: &[u8],
    ad: &[u8],
) -> Result<Vec<u8>> {
    check_size(<A as AeadCore>::NonceSize::USIZE, nonce.len())?;
    let cipher = A::new_from_slice(key).map_err(|_| CryptoError::size(32, key.len()))?;
    cipher
        .encrypt(
            chacha20poly1305::aead::Nonce::<A>::from_slice(nonce),
            Payload { msg: message, aad: ad },
        )
        .map_err(|_| CryptoError::Backend("message too long for cipher"))
}

pub(super) fn decrypt_with<A: Aead + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    ad: &[u8],
) -> Result<Vec<u8>> {
    if nonce.len() != <A as AeadCore>::NonceSize::USIZE {
        return Err(CryptoError::Verification);
    }
    let cipher = A::new_from_slice(key).map_err(|_| CryptoError::Verification)?;
    cipher
        .decrypt(
            chacha20poly1305::aead::Nonce::<A>::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: ad,
            },
        )
        .map_err(|_| CryptoError::Verification)
}

macro_rules! aead_backend {
    ($($op:ty => $cipher:ty),* $(,)?) => {
        $(
            impl SecretKeyOp for $op {}
            impl NonceOp for $op {}

            impl AeadOp for $op {
                fn encrypt(key: &[u8], nonce: &[u8], message: &[u8], ad: &[u8]) -> Result<Vec<u8>> {
                    encrypt_with::<$cipher>(key, nonce, message, ad)
                }

                fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8], ad: &[u8]) -> Result<Vec<u8>> {
                    decrypt_with::<$cipher>(key, nonce, ciphertext, ad)
                }
            }
        )*
    };
}

aead_backend!(
    AeadAes256Gcm => Aes256Gcm,
    AeadChacha20Poly1305Ietf => ChaCha20Poly1305,
    AeadXChacha20Poly1305Ietf => XChaCha20Poly1305,
);
