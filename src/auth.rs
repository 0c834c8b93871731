//! Message authenticators

use std::fmt;
use std::marker::PhantomData;

use crate::error::{check_size, CryptoError, Result};
use crate::keys::SecretKey;
use crate::memory::ct_eq;
use crate::operation::{AuthOp, Incremental, Op};

/// MAC tag for operation `O`.
pub struct Authenticator<O> {
    bytes: Vec<u8>,
    _op: PhantomData<fn() -> O>,
}

impl<O: AuthOp> Authenticator<O> {
    pub const SIZE: usize = O::TRAITS.authenticator_size;

    /// Authenticate `message` in one call.
    pub fn new(key: &SecretKey<O>, message: &[u8]) -> Result<Self> {
        let mut builder = Self::builder(key)?;
        builder.update(message);
        Ok(builder.finalize())
    }

    /// Start a multi-part computation.
    pub fn builder(key: &SecretKey<O>) -> Result<AuthBuilder<O>> {
        let state = O::mac(&key.expose()?)?;
        Ok(AuthBuilder {
            state,
            _op: PhantomData,
        })
    }

    /// Wrap a received tag.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        check_size(Self::SIZE, bytes.len())?;
        Ok(Self {
            bytes: bytes.to_vec(),
            _op: PhantomData,
        })
    }

    /// Recompute over `message` and compare in constant time.
    pub fn verify(&self, key: &SecretKey<O>, message: &[u8]) -> Result<()> {
        let expected = Self::new(key, message)?;
        if expected == *self {
            Ok(())
        } else {
            tracing::debug!(operation = %O::OPERATION, "authenticator mismatch");
            Err(CryptoError::Verification)
        }
    }

    /// Raw tag bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<O> Clone for Authenticator<O> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            _op: PhantomData,
        }
    }
}

impl<O> PartialEq for Authenticator<O> {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.bytes, &other.bytes)
    }
}

impl<O> Eq for Authenticator<O> {}

impl<O> AsRef<[u8]> for Authenticator<O> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<O: Op> fmt::Debug for Authenticator<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Authenticator")
            .field(&O::OPERATION)
            .field(&hex::encode(&self.bytes))
            .finish()
    }
}

/// Running MAC over a message fed in pieces.
pub struct AuthBuilder<O: AuthOp> {
    state: O::Mac,
    _op: PhantomData<fn() -> O>,
}

impl<O: AuthOp> AuthBuilder<O> {
    /// Feed the next chunk of the message.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(data);
        self
    }

    /// Finish and return the tag.
    pub fn finalize(self) -> Authenticator<O> {
        let mut bytes = vec![0u8; Authenticator::<O>::SIZE];
        self.state.finalize_into(&mut bytes);
        Authenticator {
            bytes,
            _op: PhantomData,
        }
    }

    /// Finish and compare against a received tag.
    pub fn verify(self, expected: &Authenticator<O>) -> Result<()> {
        if self.finalize() == *expected {
            Ok(())
        } else {
            Err(CryptoError::Verification)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ops;

    type Key = SecretKey<ops::Auth>;

    #[test]
    fn test_authenticate_and_verify() {
        let key = Key::generate().unwrap();
        let tag = Authenticator::new(&key, b"abc").unwrap();
        assert_eq!(tag.as_bytes().len(), 32);
        tag.verify(&key, b"abc").unwrap();
        assert!(matches!(tag.verify(&key, b"abd"), Err(CryptoError::Verification)));
    }

    #[test]
    fn test_flipped_tag_rejected() {
        let key = Key::generate().unwrap();
        let tag = Authenticator::new(&key, b"abc").unwrap();
        let mut raw = tag.as_bytes().to_vec();
        raw[0] ^= 1;
        let forged = Authenticator::<ops::Auth>::from_slice(&raw).unwrap();
        assert_ne!(forged, tag);
        assert!(matches!(forged.verify(&key, b"abc"), Err(CryptoError::Verification)));
    }

    #[test]
    fn test_other_key_rejected() {
        let key = Key::generate().unwrap();
        let other = Key::generate().unwrap();
        let tag = Authenticator::new(&key, b"message").unwrap();
        assert!(tag.verify(&other, b"message").is_err());
    }

    #[test]
    fn test_builder_matches_one_shot() {
        let key = SecretKey::<ops::AuthHmacSha512>::generate().unwrap();
        let one_shot = Authenticator::new(&key, b"split message").unwrap();
        assert_eq!(one_shot.as_bytes().len(), 64);

        let mut builder = Authenticator::builder(&key).unwrap();
        builder.update(b"split").update(b" message");
        builder.verify(&one_shot).unwrap();
    }

    #[test]
    fn test_from_slice_size() {
        assert!(matches!(
            Authenticator::<ops::Auth>::from_slice(&[0u8; 31]),
            Err(CryptoError::Size {
                expected: 32,
                actual: 31
            })
        ));
    }
}
