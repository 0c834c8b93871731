//! Digests, keyed short hashes, sized generic hashes and password hashes
//!
//! - [`Hash`]: fixed-size output (SHA-2 digest or SipHash short hash)
//! - [`SizedHash`]: caller-chosen size within the operation's range
//!   (BLAKE3 generic hash or Argon2id derived key)
//! - [`PasswordHash`]: self-describing Argon2id string for storing and
//!   verifying passwords

use std::fmt;
use std::marker::PhantomData;

use zeroize::{Zeroize, Zeroizing};

use crate::config::PwHashParams;
use crate::error::{check_size, CryptoError, Result};
use crate::keys::{Salt, SecretKey};
use crate::memory::{ct_eq, secure_zero, SecureBuffer};
use crate::operation::{
    GenericHashOp, HashOp, Incremental, Op, PwHashOp, PwHashStrOp, SecretKeyOp, ShortHashOp,
};

/// Fixed-size hash value.
pub struct Hash<O> {
    bytes: Zeroizing<Vec<u8>>,
    _op: PhantomData<fn() -> O>,
}

impl<O: Op> Hash<O> {
    pub const SIZE: usize = O::TRAITS.hash_size;

    const CHECK: () = assert!(O::TRAITS.hash_size > 0, "operation has no hash");

    fn zeroed() -> Self {
        let () = Self::CHECK;
        Self {
            bytes: Zeroizing::new(vec![0u8; Self::SIZE]),
            _op: PhantomData,
        }
    }

    /// Wrap a received digest; the length must be exact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut hash = Self::zeroed();
        check_size(Self::SIZE, bytes.len())?;
        hash.bytes.copy_from_slice(bytes);
        Ok(hash)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero the digest in place.
    pub fn clear(&mut self) {
        secure_zero(&mut self.bytes);
    }

    /// Move the value into a locked secret key and wipe this copy.
    pub fn into_secret_key<K: SecretKeyOp>(self) -> Result<SecretKey<K>> {
        SecretKey::from_buffer(SecureBuffer::from_slice(&self.bytes)?)
    }
}

impl<O: HashOp> Hash<O> {
    /// One-shot digest.
    pub fn digest(data: &[u8]) -> Self {
        let mut hash = Self::zeroed();
        O::hash(data, &mut hash.bytes);
        hash
    }
}

impl<O: ShortHashOp> Hash<O> {
    /// Keyed short hash.
    pub fn keyed(key: &SecretKey<O>, data: &[u8]) -> Result<Self> {
        let mut hash = Self::zeroed();
        O::short_hash(&key.expose()?, data, &mut hash.bytes);
        Ok(hash)
    }
}

/// Hash whose length is chosen at construction.
pub struct SizedHash<O> {
    bytes: Zeroizing<Vec<u8>>,
    _op: PhantomData<fn() -> O>,
}

impl<O: Op> SizedHash<O> {
    pub const MIN_SIZE: usize = O::TRAITS.min_hash_size;
    pub const MAX_SIZE: usize = O::TRAITS.hash_size;

    fn zeroed(size: usize) -> Result<Self> {
        if size < Self::MIN_SIZE || size > Self::MAX_SIZE || size == 0 {
            return Err(CryptoError::size(Self::MAX_SIZE, size));
        }
        Ok(Self {
            bytes: Zeroizing::new(vec![0u8; size]),
            _op: PhantomData,
        })
    }

    /// Wrap a received digest of any allowed size.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut hash = Self::zeroed(bytes.len())?;
        hash.bytes.copy_from_slice(bytes);
        Ok(hash)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Zero the digest in place.
    pub fn clear(&mut self) {
        secure_zero(&mut self.bytes);
    }

    /// Move the value into a locked secret key and wipe this copy.
    pub fn into_secret_key<K: SecretKeyOp>(self) -> Result<SecretKey<K>> {
        SecretKey::from_buffer(SecureBuffer::from_slice(&self.bytes)?)
    }
}

impl<O: GenericHashOp> SizedHash<O> {
    /// Unkeyed hash of `size` bytes.
    pub fn generic(size: usize, data: &[u8]) -> Result<Self> {
        let mut builder = Self::builder(size, None)?;
        builder.update(data);
        Ok(builder.finalize())
    }

    /// Keyed hash of `size` bytes.
    pub fn generic_keyed(size: usize, key: &SecretKey<O>, data: &[u8]) -> Result<Self> {
        let mut builder = Self::builder(size, Some(key))?;
        builder.update(data);
        Ok(builder.finalize())
    }

    /// Multi-part hashing.
    pub fn builder(size: usize, key: Option<&SecretKey<O>>) -> Result<GenericHashBuilder<O>> {
        let output = Self::zeroed(size)?;
        let state = match key {
            Some(key) => O::hasher(Some(&key.expose()?[..]))?,
            None => O::hasher(None)?,
        };
        Ok(GenericHashBuilder { state, output })
    }
}

impl<O: PwHashOp> SizedHash<O> {
    /// Derive `size` bytes from a password, then wipe the password.
    pub fn derive(
        size: usize,
        salt: &Salt<O>,
        password: &mut String,
        params: &PwHashParams,
    ) -> Result<Self> {
        let result = Self::derive_bytes(size, salt, password.as_bytes(), params);
        password.zeroize();
        result
    }

    /// Derive from raw password bytes; the caller wipes them.
    pub fn derive_bytes(
        size: usize,
        salt: &Salt<O>,
        password: &[u8],
        params: &PwHashParams,
    ) -> Result<Self> {
        let mut hash = Self::zeroed(size)?;
        O::derive(password, salt.as_bytes(), params, &mut hash.bytes)?;
        Ok(hash)
    }
}

/// Running generic hash.
pub struct GenericHashBuilder<O: GenericHashOp> {
    state: O::Hasher,
    output: SizedHash<O>,
}

impl<O: GenericHashOp> GenericHashBuilder<O> {
    /// Feed the next chunk of input.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(data);
        self
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> SizedHash<O> {
        let mut output = self.output;
        self.state.finalize_into(&mut output.bytes);
        output
    }
}

macro_rules! hash_common {
    ($name:ident) => {
        impl<O> PartialEq for $name<O> {
            fn eq(&self, other: &Self) -> bool {
                ct_eq(&self.bytes, &other.bytes)
            }
        }

        impl<O> Eq for $name<O> {}

        impl<O> AsRef<[u8]> for $name<O> {
            fn as_ref(&self) -> &[u8] {
                &self.bytes
            }
        }

        impl<O: Op> fmt::Debug for $name<O> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&O::OPERATION)
                    .field(&hex::encode(&self.bytes[..]))
                    .finish()
            }
        }
    };
}

hash_common!(Hash);
hash_common!(SizedHash);

/// Stored password verifier in PHC string format.
pub struct PasswordHash<O> {
    encoded: String,
    _op: PhantomData<fn() -> O>,
}

impl<O: PwHashStrOp> PasswordHash<O> {
    pub const MAX_LEN: usize = O::TRAITS.hash_size;

    /// Hash a new password with a random salt, then wipe the password.
    pub fn new(password: &mut String, params: &PwHashParams) -> Result<Self> {
        let result = O::hash_str(password.as_bytes(), params);
        password.zeroize();
        let encoded = result?;
        if encoded.len() > Self::MAX_LEN {
            return Err(CryptoError::size(Self::MAX_LEN, encoded.len()));
        }
        Ok(Self {
            encoded,
            _op: PhantomData,
        })
    }

    /// Wrap a previously stored string.
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        if encoded.is_empty() || encoded.len() > Self::MAX_LEN {
            return Err(CryptoError::size(Self::MAX_LEN, encoded.len()));
        }
        Ok(Self {
            encoded: encoded.to_string(),
            _op: PhantomData,
        })
    }

    /// Check a candidate password, then wipe it.
    ///
    /// # Errors
    /// `Verification` on mismatch, `Format` if the stored string is not a
    /// valid hash.
    pub fn verify(&self, password: &mut String) -> Result<()> {
        let result = O::verify_str(&self.encoded, password.as_bytes());
        password.zeroize();
        if matches!(result, Err(CryptoError::Verification)) {
            tracing::debug!(operation = %O::OPERATION, "password verification failed");
        }
        result
    }

    /// The PHC string, for storage.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl<O> Clone for PasswordHash<O> {
    fn clone(&self) -> Self {
        Self {
            encoded: self.encoded.clone(),
            _op: PhantomData,
        }
    }
}

impl<O> PartialEq for PasswordHash<O> {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(self.encoded.as_bytes(), other.encoded.as_bytes())
    }
}

impl<O> Eq for PasswordHash<O> {}

impl<O: Op> fmt::Debug for PasswordHash<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordHash").field(&self.encoded).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ops;

    fn light() -> PwHashParams {
        PwHashParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_digest_sizes() {
        assert_eq!(Hash::<ops::HashSha256>::digest(b"abc").as_bytes().len(), 32);
        assert_eq!(Hash::<ops::Hash>::digest(b"abc").as_bytes().len(), 64);
    }

    #[test]
    fn test_digest_equality() {
        let a = Hash::<ops::HashSha256>::digest(b"same");
        let b = Hash::<ops::HashSha256>::digest(b"same");
        let c = Hash::<ops::HashSha256>::digest(b"diff");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(Hash::<ops::HashSha256>::from_slice(a.as_bytes()).unwrap(), a);
    }

    #[test]
    fn test_short_hash() {
        let key = SecretKey::<ops::ShortHash>::generate().unwrap();
        let a = Hash::keyed(&key, b"bucket").unwrap();
        let b = Hash::keyed(&key, b"bucket").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes().len(), 8);
    }

    #[test]
    fn test_generic_size_range() {
        assert!(SizedHash::<ops::GenericHash>::generic(16, b"x").is_ok());
        assert!(SizedHash::<ops::GenericHash>::generic(64, b"x").is_ok());
        assert!(matches!(
            SizedHash::<ops::GenericHash>::generic(15, b"x"),
            Err(CryptoError::Size { .. })
        ));
        assert!(SizedHash::<ops::GenericHash>::generic(65, b"x").is_err());
    }

    #[test]
    fn test_builder_matches_one_shot() {
        let key = SecretKey::<ops::GenericHash>::generate().unwrap();
        let one_shot = SizedHash::generic_keyed(32, &key, b"hello world").unwrap();

        let mut builder = SizedHash::builder(32, Some(&key)).unwrap();
        builder.update(b"hello").update(b" ").update(b"world");
        assert_eq!(builder.finalize(), one_shot);

        assert_ne!(SizedHash::<ops::GenericHash>::generic(32, b"hello world").unwrap(), one_shot);
    }

    #[test]
    fn test_hash_into_secret_key() {
        let hash = SizedHash::<ops::GenericHash>::generic(32, b"key material").unwrap();
        let expected = hash.as_bytes().to_vec();
        let key: SecretKey<ops::SecretBox> = hash.into_secret_key().unwrap();
        assert_eq!(&*key.expose().unwrap(), &expected[..]);

        let short = SizedHash::<ops::GenericHash>::generic(16, b"key material").unwrap();
        assert!(short.into_secret_key::<ops::SecretBox>().is_err());
    }

    #[test]
    fn test_clear() {
        let mut hash = Hash::<ops::HashSha256>::digest(b"abc");
        hash.clear();
        assert_eq!(hash.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_password_derivation_wipes_password() {
        let salt = Salt::<ops::PwHash>::from_slice(&[7u8; 16]).unwrap();
        let mut first = String::from("hunter2 hunter2");
        let mut second = String::from("hunter2 hunter2");
        let a = SizedHash::derive(32, &salt, &mut first, &light()).unwrap();
        let b = SizedHash::derive(32, &salt, &mut second, &light()).unwrap();
        assert!(first.is_empty());
        assert_eq!(a, b);
        assert!(SizedHash::derive_bytes(8, &salt, b"pw", &light()).is_err());
    }

    #[test]
    fn test_password_hash_string() {
        let mut password = String::from("open sesame");
        let stored = PasswordHash::<ops::PwHashStr>::new(&mut password, &light()).unwrap();
        assert!(password.is_empty());

        let restored = PasswordHash::<ops::PwHashStr>::from_encoded(stored.as_str()).unwrap();
        restored.verify(&mut String::from("open sesame")).unwrap();

        let mut wrong = String::from("open barley");
        assert!(matches!(restored.verify(&mut wrong), Err(CryptoError::Verification)));
        assert!(wrong.is_empty());
    }

    #[test]
    fn test_password_hash_equality() {
        let stored = PasswordHash::<ops::PwHashStr>::new(&mut String::from("open sesame"), &light()).unwrap();
        let restored = PasswordHash::<ops::PwHashStr>::from_encoded(stored.as_str()).unwrap();
        assert_eq!(stored, restored);
        assert_eq!(stored.clone(), stored);

        // Fresh salt, so the same password gives a different string
        let salted = PasswordHash::<ops::PwHashStr>::new(&mut String::from("open sesame"), &light()).unwrap();
        assert_ne!(stored, salted);
    }
}
