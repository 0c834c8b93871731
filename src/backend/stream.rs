//! ChaCha20 keystreams: original (8-byte nonce), IETF (12) and XChaCha20 (24)

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{ChaCha20, ChaCha20Legacy, XChaCha20};

use crate::error::{CryptoError, Result};
use crate::operation::ops::{StreamChacha20, StreamChacha20Ietf, StreamXChacha20};
use crate::operation::{NonceOp, SecretKeyOp, StreamOp};

fn keystream_with<C: KeyIvInit + StreamCipher>(key: &[u8], nonce: &[u8], out: &mut [u8]) -> Result<()> {
    let mut cipher = C::new_from_slices(key, nonce).map_err(|_| CryptoError::size(32, key.len()))?;
    out.fill(0);
    cipher
        .try_apply_keystream(out)
        .map_err(|_| CryptoError::Backend("keystream exhausted"))
}

macro_rules! stream_backend {
    ($($op:ty => $cipher:ty),* $(,)?) => {
        $(
            impl SecretKeyOp for $op {}
            impl NonceOp for $op {}

            impl StreamOp for $op {
                fn keystream(key: &[u8], nonce: &[u8], out: &mut [u8]) -> Result<()> {
                    keystream_with::<$cipher>(key, nonce, out)
                }
            }
        )*
    };
}

stream_backend!(
    StreamChacha20 => ChaCha20Legacy,
    StreamChacha20Ietf => ChaCha20,
    StreamXChacha20 => XChaCha20,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc8439_block_one() {
        // RFC 8439 2.4.2 starts at block 1; block 0 is 64 bytes of keystream
        let key: Vec<u8> = (0u8..32).collect();
        let nonce = hex::decode("000000000000004a00000000").unwrap();
        let mut out = [0u8; 128];
        StreamChacha20Ietf::keystream(&key, &nonce, &mut out).unwrap();

        let plaintext = b"Ladies and Gentlemen of the cl";
        let cipher: Vec<u8> = plaintext.iter().zip(&out[64..]).map(|(p, k)| p ^ k).collect();
        assert_eq!(hex::encode(&cipher[..16]), "6e2e359a2568f98041ba0728dd0d6981");
    }

    #[test]
    fn test_nonce_length_per_variant() {
        let key = [0u8; 32];
        let mut out = [0u8; 16];
        assert!(StreamChacha20::keystream(&key, &[0u8; 8], &mut out).is_ok());
        assert!(StreamXChacha20::keystream(&key, &[0u8; 24], &mut out).is_ok());
        assert!(StreamChacha20Ietf::keystream(&key, &[0u8; 8], &mut out).is_err());
    }

    #[test]
    fn test_keystream_overwrites_buffer() {
        let key = [5u8; 32];
        let nonce = [6u8; 24];
        let mut a = [0u8; 40];
        let mut b = [0xAAu8; 40];
        StreamXChacha20::keystream(&key, &nonce, &mut a).unwrap();
        StreamXChacha20::keystream(&key, &nonce, &mut b).unwrap();
        assert_eq!(a, b);
    }
}
