//! Detached and combined-mode signatures

use std::fmt;
use std::marker::PhantomData;

use crate::error::{check_size, CryptoError, Result};
use crate::keys::{PublicKey, SecretKey, Seed};
use crate::memory::{ct_eq, SecureBuffer};
use crate::operation::{Op, SignOp};

pub struct Signature<O> {
    bytes: Vec<u8>,
    _op: PhantomData<fn() -> O>,
}

impl<O: SignOp> Signature<O> {
    pub const SIZE: usize = O::TRAITS.signature_size;

    /// Detached signature over `message`.
    pub fn new(secret: &SecretKey<O>, message: &[u8]) -> Result<Self> {
        let mut bytes = vec![0u8; Self::SIZE];
        O::sign(&secret.expose()?, message, &mut bytes)?;
        Ok(Self {
            bytes,
            _op: PhantomData,
        })
    }

    /// Wrap a received signature; the length must be exact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        check_size(Self::SIZE, bytes.len())?;
        Ok(Self {
            bytes: bytes.to_vec(),
            _op: PhantomData,
        })
    }

    /// Check the signature against `message`; `Verification` on mismatch.
    pub fn verify(&self, public: &PublicKey<O>, message: &[u8]) -> Result<()> {
        O::verify(public.as_bytes(), message, &self.bytes).map_err(|e| {
            tracing::debug!(operation = %O::OPERATION, "signature rejected");
            e
        })
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sign `message` in place, leaving `signature || message`.
    pub fn sign_seal(secret: &SecretKey<O>, message: &mut Vec<u8>) -> Result<()> {
        let mut signed = Self::new(secret, message)?.bytes;
        signed.extend_from_slice(message);
        *message = signed;
        Ok(())
    }

    /// Verify `signature || message` in place and strip the signature.
    ///
    /// On failure `signed` is left untouched.
    pub fn sign_open(public: &PublicKey<O>, signed: &mut Vec<u8>) -> Result<()> {
        if signed.len() < Self::SIZE {
            tracing::debug!(len = signed.len(), "signed message shorter than a signature");
            return Err(CryptoError::Verification);
        }
        let (signature, message) = signed.split_at(Self::SIZE);
        Self::from_slice(signature)?.verify(public, message)?;
        signed.drain(..Self::SIZE);
        Ok(())
    }

    /// Public key belonging to `secret`.
    pub fn extract_public_key(secret: &SecretKey<O>) -> Result<PublicKey<O>> {
        let mut public = vec![0u8; PublicKey::<O>::SIZE];
        O::secret_to_public(&secret.expose()?, &mut public)?;
        PublicKey::from_slice(&public)
    }

    /// Seed `secret` was derived from.
    pub fn extract_seed(secret: &SecretKey<O>) -> Result<Seed<O>> {
        let mut seed = SecureBuffer::allocate(Seed::<O>::SIZE)?;
        O::secret_to_seed(&secret.expose()?, &mut seed.write()?)?;
        Seed::from_buffer(seed)
    }
}

impl<O> Clone for Signature<O> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            _op: PhantomData,
        }
    }
}

impl<O> PartialEq for Signature<O> {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.bytes, &other.bytes)
    }
}

impl<O> Eq for Signature<O> {}

impl<O> AsRef<[u8]> for Signature<O> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<O: Op> fmt::Debug for Signature<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature")
            .field(&O::OPERATION)
            .field(&hex::encode(&self.bytes))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;
    use crate::operation::ops;

    type Sig = Signature<ops::Sign>;

    #[test]
    fn test_detached() {
        let pair = KeyPair::<ops::Sign>::generate().unwrap();
        let signature = Sig::new(pair.secret_key(), b"release v1").unwrap();
        assert_eq!(signature.as_bytes().len(), 64);
        signature.verify(pair.public_key(), b"release v1").unwrap();
        assert!(matches!(
            signature.verify(pair.public_key(), b"release v2"),
            Err(CryptoError::Verification)
        ));
    }

    #[test]
    fn test_wrong_public_key() {
        let pair = KeyPair::<ops::Sign>::generate().unwrap();
        let other = KeyPair::<ops::Sign>::generate().unwrap();
        let signature = Sig::new(pair.secret_key(), b"msg").unwrap();
        assert!(signature.verify(other.public_key(), b"msg").is_err());
    }

    #[test]
    fn test_combined_mode() {
        let pair = KeyPair::<ops::Sign>::generate().unwrap();
        let mut message = b"hello".to_vec();
        Sig::sign_seal(pair.secret_key(), &mut message).unwrap();
        assert_eq!(message.len(), 64 + 5);

        let mut tampered = message.clone();
        tampered[64] ^= 0x20;
        assert!(Sig::sign_open(pair.public_key(), &mut tampered).is_err());
        assert_eq!(tampered.len(), 69);

        Sig::sign_open(pair.public_key(), &mut message).unwrap();
        assert_eq!(message, b"hello");
    }

    #[test]
    fn test_short_signed_message() {
        let pair = KeyPair::<ops::Sign>::generate().unwrap();
        let mut short = vec![0u8; 10];
        assert!(matches!(
            Sig::sign_open(pair.public_key(), &mut short),
            Err(CryptoError::Verification)
        ));
    }

    #[test]
    fn test_extract_public_key_and_seed() {
        let seed = Seed::<ops::Sign>::from_slice(&[11u8; 32]).unwrap();
        let pair = KeyPair::from_seed(&seed).unwrap();
        assert_eq!(&Sig::extract_public_key(pair.secret_key()).unwrap(), pair.public_key());
        assert_eq!(Sig::extract_seed(pair.secret_key()).unwrap(), seed);
    }
}
