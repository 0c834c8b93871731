//! Public keys, salts and key pairs

use std::fmt;
use std::marker::PhantomData;

use crate::backend;
use crate::error::{check_size, Result};
use crate::memory::{ct_eq, SecureBuffer};
use crate::operation::{KeyPairOp, Op, SaltOp};

use super::{SecretKey, Seed};

/// Public half of a key pair. Not secret, freely cloneable.
pub struct PublicKey<O> {
    bytes: Vec<u8>,
    _op: PhantomData<fn() -> O>,
}

impl<O: KeyPairOp> PublicKey<O> {
    pub const SIZE: usize = O::TRAITS.public_key_size;

    const CHECK: () = assert!(O::TRAITS.public_key_size > 0, "operation has no public key");

    /// Copy a public key; the length must be exact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let () = Self::CHECK;
        check_size(Self::SIZE, bytes.len())?;
        Ok(Self {
            bytes: bytes.to_vec(),
            _op: PhantomData,
        })
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<O> Clone for PublicKey<O> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            _op: PhantomData,
        }
    }
}

impl<O> AsRef<[u8]> for PublicKey<O> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<O> PartialEq for PublicKey<O> {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.bytes, &other.bytes)
    }
}

impl<O> Eq for PublicKey<O> {}

impl<O: Op> fmt::Debug for PublicKey<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&O::OPERATION)
            .field(&hex::encode(&self.bytes))
            .finish()
    }
}

/// Random salt for password hashing. Not secret.
pub struct Salt<O> {
    bytes: Vec<u8>,
    _op: PhantomData<fn() -> O>,
}

impl<O: SaltOp> Salt<O> {
    pub const SIZE: usize = O::TRAITS.salt_size;

    const CHECK: () = assert!(O::TRAITS.salt_size > 0, "operation has no salt");

    /// Fresh random salt.
    pub fn generate() -> Result<Self> {
        let () = Self::CHECK;
        let mut bytes = vec![0u8; Self::SIZE];
        backend::fill_random(&mut bytes)?;
        Ok(Self {
            bytes,
            _op: PhantomData,
        })
    }

    /// Copy a stored salt; the length must be exact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let () = Self::CHECK;
        check_size(Self::SIZE, bytes.len())?;
        Ok(Self {
            bytes: bytes.to_vec(),
            _op: PhantomData,
        })
    }

    /// Raw salt bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<O> Clone for Salt<O> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            _op: PhantomData,
        }
    }
}

impl<O> PartialEq for Salt<O> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<O: Op> fmt::Debug for Salt<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&hex::encode(&self.bytes)).finish()
    }
}

/// Matching public and secret keys.
#[derive(Debug)]
pub struct KeyPair<O: KeyPairOp> {
    public: PublicKey<O>,
    secret: SecretKey<O>,
}

impl<O: KeyPairOp> KeyPair<O> {
    /// Random key pair.
    pub fn generate() -> Result<Self> {
        let seed = Seed::<O>::generate()?;
        Self::from_seed(&seed)
    }

    /// Deterministic key pair; the same seed always yields the same pair.
    pub fn from_seed(seed: &Seed<O>) -> Result<Self> {
        let mut public = vec![0u8; PublicKey::<O>::SIZE];
        let mut secret = SecureBuffer::allocate(SecretKey::<O>::SIZE)?;
        {
            let seed = seed.expose()?;
            O::seed_keypair(&seed, &mut public, &mut secret.write()?)?;
        }
        Ok(Self {
            public: PublicKey::from_slice(&public)?,
            secret: SecretKey::from_buffer(secret)?,
        })
    }

    /// Pair up existing halves. The halves are not checked against each
    /// other.
    pub fn from_parts(public: PublicKey<O>, secret: SecretKey<O>) -> Self {
        Self { public, secret }
    }

    /// The public half.
    pub fn public_key(&self) -> &PublicKey<O> {
        &self.public
    }

    /// The secret half.
    pub fn secret_key(&self) -> &SecretKey<O> {
        &self.secret
    }

    /// Split into public and secret halves.
    pub fn into_parts(self) -> (PublicKey<O>, SecretKey<O>) {
        (self.public, self.secret)
    }
}
