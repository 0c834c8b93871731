//! Ed25519 signatures
//!
//! Secret keys use the 64-byte `seed || public` layout, so the public key
//! and the seed can both be read back out of a secret key.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use super::to_array;
use crate::error::{CryptoError, Result};
use crate::operation::ops::SignEd25519;
use crate::operation::{KeyPairOp, SecretKeyOp, SignOp};

fn signing_key(secret: &[u8]) -> Result<SigningKey> {
    let bytes = Zeroizing::new(to_array::<64>(secret)?);
    // Rejects a public half that does not belong to the seed
    SigningKey::from_keypair_bytes(&bytes).map_err(|_| CryptoError::KeyGen)
}

impl SecretKeyOp for SignEd25519 {}

impl KeyPairOp for SignEd25519 {
    fn seed_keypair(seed: &[u8], public: &mut [u8], secret: &mut [u8]) -> Result<()> {
        let seed = Zeroizing::new(to_array::<32>(seed)?);
        let signing = SigningKey::from_bytes(&seed);
        let pair = Zeroizing::new(signing.to_keypair_bytes());
        secret.copy_from_slice(&pair[..]);
        public.copy_from_slice(signing.verifying_key().as_bytes());
        Ok(())
    }
}

impl SignOp for SignEd25519 {
    fn sign(secret: &[u8], message: &[u8], signature: &mut [u8]) -> Result<()> {
        let key = signing_key(secret)?;
        signature.copy_from_slice(&key.sign(message).to_bytes());
        Ok(())
    }

    fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
        let public = to_array::<32>(public).map_err(|_| CryptoError::Verification)?;
        let signature = to_array::<64>(signature).map_err(|_| CryptoError::Verification)?;
        let key = VerifyingKey::from_bytes(&public).map_err(|_| CryptoError::Verification)?;
        key.verify_strict(message, &Signature::from_bytes(&signature))
            .map_err(|_| CryptoError::Verification)
    }

    fn secret_to_public(secret: &[u8], public: &mut [u8]) -> Result<()> {
        let key = signing_key(secret)?;
        public.copy_from_slice(key.verifying_key().as_bytes());
        Ok(())
    }

    fn secret_to_seed(secret: &[u8], seed: &mut [u8]) -> Result<()> {
        let key = signing_key(secret)?;
        seed.copy_from_slice(key.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032, test 1
    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const SIGNATURE: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
                             5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

    #[test]
    fn test_rfc8032_vector() {
        let seed = hex::decode(SEED).unwrap();
        let mut public = [0u8; 32];
        let mut secret = [0u8; 64];
        SignEd25519::seed_keypair(&seed, &mut public, &mut secret).unwrap();
        assert_eq!(hex::encode(public), PUBLIC);

        let mut signature = [0u8; 64];
        SignEd25519::sign(&secret, b"", &mut signature).unwrap();
        assert_eq!(hex::encode(signature), SIGNATURE);
        SignEd25519::verify(&public, b"", &signature).unwrap();
    }

    #[test]
    fn test_extract_halves() {
        let seed = [4u8; 32];
        let mut public = [0u8; 32];
        let mut secret = [0u8; 64];
        SignEd25519::seed_keypair(&seed, &mut public, &mut secret).unwrap();

        let mut out = [0u8; 32];
        SignEd25519::secret_to_public(&secret, &mut out).unwrap();
        assert_eq!(out, public);
        SignEd25519::secret_to_seed(&secret, &mut out).unwrap();
        assert_eq!(out, seed);
    }

    #[test]
    fn test_mismatched_secret_rejected() {
        let mut secret = [0u8; 64];
        let mut public = [0u8; 32];
        SignEd25519::seed_keypair(&[1u8; 32], &mut public, &mut secret).unwrap();
        secret[40] ^= 1;
        let mut signature = [0u8; 64];
        assert!(matches!(
            SignEd25519::sign(&secret, b"m", &mut signature),
            Err(CryptoError::KeyGen)
        ));
    }
}
