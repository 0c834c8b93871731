//! Diffie-Hellman key agreement
//!
//! The raw X25519 point is never used as a key. Both sides hash it together
//! with the two public keys in a fixed order:
//!
//! ```text
//! secret = BLAKE3-XOF(q || pk_opener || pk_sealer)[..size]
//! ```
//!
//! so each side has to say which [`Role`] it plays. The result lives in
//! locked memory and can be moved into a [`SecretKey`] of another operation.

use std::fmt;
use std::marker::PhantomData;

use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};
use crate::keys::{KeyPair, PublicKey, SecretKey};
use crate::memory::{ReadGuard, SecureBuffer};
use crate::operation::ops::GenericHashBlake3;
use crate::operation::{DhOp, GenericHashOp, Incremental, Op, SecretKeyOp};

/// Which end of the exchange the local key pair is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sealer,
    Opener,
}

/// Derived shared secret.
pub struct DiffieHellman<O> {
    secret: SecureBuffer,
    _op: PhantomData<fn() -> O>,
}

impl<O: DhOp> DiffieHellman<O> {
    pub const DEFAULT_SIZE: usize = O::TRAITS.secret_key_size;
    pub const MIN_SIZE: usize = O::TRAITS.min_shared_secret_size;
    pub const MAX_SIZE: usize = O::TRAITS.shared_secret_size;

    /// Derive a secret of the default size.
    pub fn new(role: Role, own: &KeyPair<O>, peer: &PublicKey<O>) -> Result<Self> {
        Self::new_sized(role, own, peer, Self::DEFAULT_SIZE)
    }

    /// Derive a secret of `size` bytes.
    ///
    /// # Errors
    /// - `Size` if `size` is out of range
    /// - `KeyGen` if `peer` is a low-order point
    pub fn new_sized(role: Role, own: &KeyPair<O>, peer: &PublicKey<O>, size: usize) -> Result<Self> {
        if size < Self::MIN_SIZE || size > Self::MAX_SIZE {
            return Err(CryptoError::size(Self::DEFAULT_SIZE, size));
        }

        let mut point = Zeroizing::new(vec![0u8; O::TRAITS.intermediate_size]);
        O::scalar_mult(&own.secret_key().expose()?, peer.as_bytes(), &mut point)?;

        let (first, second) = match role {
            Role::Sealer => (peer.as_bytes(), own.public_key().as_bytes()),
            Role::Opener => (own.public_key().as_bytes(), peer.as_bytes()),
        };
        let mut hasher = GenericHashBlake3::hasher(None)?;
        hasher.update(&point);
        hasher.update(first);
        hasher.update(second);

        let mut secret = SecureBuffer::allocate(size)?;
        hasher.finalize_into(&mut secret.write()?);
        tracing::trace!(operation = %O::OPERATION, ?role, size, "derived shared secret");
        Ok(Self {
            secret,
            _op: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.secret.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }

    /// Scoped read access to the shared secret.
    pub fn expose(&self) -> Result<ReadGuard<'_>> {
        self.secret.read()
    }

    /// Hand the secret over as a key for operation `K`.
    pub fn into_secret_key<K: SecretKeyOp>(self) -> Result<SecretKey<K>> {
        SecretKey::from_buffer(self.secret)
    }
}

impl<O> PartialEq for DiffieHellman<O> {
    fn eq(&self, other: &Self) -> bool {
        self.secret.ct_eq(&other.secret).unwrap_or(false)
    }
}

impl<O> Eq for DiffieHellman<O> {}

impl<O: Op> fmt::Debug for DiffieHellman<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffieHellman")
            .field("operation", &O::OPERATION)
            .field("len", &self.secret.len())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ops;

    type Dh = DiffieHellman<ops::DiffieHellman>;
    type Pair = KeyPair<ops::DiffieHellman>;

    #[test]
    fn test_sealer_and_opener_agree() {
        let alice = Pair::generate().unwrap();
        let bob = Pair::generate().unwrap();
        let a = Dh::new(Role::Sealer, &alice, bob.public_key()).unwrap();
        let b = Dh::new(Role::Opener, &bob, alice.public_key()).unwrap();
        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_role_on_both_sides_disagrees() {
        let alice = Pair::generate().unwrap();
        let bob = Pair::generate().unwrap();
        let a = Dh::new(Role::Sealer, &alice, bob.public_key()).unwrap();
        let b = Dh::new(Role::Sealer, &bob, alice.public_key()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_size_range() {
        let alice = Pair::generate().unwrap();
        let bob = Pair::generate().unwrap();
        assert_eq!(Dh::new_sized(Role::Sealer, &alice, bob.public_key(), 16).unwrap().len(), 16);
        assert_eq!(Dh::new_sized(Role::Sealer, &alice, bob.public_key(), 64).unwrap().len(), 64);
        assert!(matches!(
            Dh::new_sized(Role::Sealer, &alice, bob.public_key(), 15),
            Err(CryptoError::Size { .. })
        ));
        assert!(Dh::new_sized(Role::Sealer, &alice, bob.public_key(), 65).is_err());
    }

    #[test]
    fn test_low_order_peer_rejected() {
        let alice = Pair::generate().unwrap();
        let zero = PublicKey::<ops::DiffieHellman>::from_slice(&[0u8; 32]).unwrap();
        assert!(matches!(
            Dh::new(Role::Sealer, &alice, &zero),
            Err(CryptoError::KeyGen)
        ));
    }

    #[test]
    fn test_into_secret_key() {
        let alice = Pair::generate().unwrap();
        let bob = Pair::generate().unwrap();
        let a = Dh::new(Role::Sealer, &alice, bob.public_key()).unwrap();
        let b = Dh::new(Role::Opener, &bob, alice.public_key()).unwrap();
        let ka: SecretKey<ops::SecretBox> = a.into_secret_key().unwrap();
        let kb: SecretKey<ops::SecretBox> = b.into_secret_key().unwrap();
        assert_eq!(ka, kb);

        let wide = Dh::new_sized(Role::Sealer, &alice, bob.public_key(), 64).unwrap();
        assert!(wide.into_secret_key::<ops::SecretBox>().is_err());
    }
}
