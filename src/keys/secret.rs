//! Secret keys and seeds held in locked memory

use std::fmt;
use std::marker::PhantomData;

use zeroize::Zeroize;

use crate::backend;
use crate::error::{check_size, Result};
use crate::memory::{Access, ReadGuard, SecureBuffer, WriteGuard};
use crate::operation::{KeyPairOp, Op, SecretKeyOp};

macro_rules! secret_material {
    ($(#[$meta:meta])* $name:ident: $bound:ident, $size:ident, $what:literal) => {
        $(#[$meta])*
        pub struct $name<O> {
            buffer: SecureBuffer,
            _op: PhantomData<fn() -> O>,
        }

        impl<O: $bound> $name<O> {
            pub const SIZE: usize = O::TRAITS.$size;

            const CHECK: () = assert!(O::TRAITS.$size > 0, concat!("operation has no ", $what));

            fn wrap(buffer: SecureBuffer) -> Self {
                Self {
                    buffer,
                    _op: PhantomData,
                }
            }

            /// Fill a fresh locked buffer from the system random source.
            pub fn generate() -> Result<Self> {
                let () = Self::CHECK;
                let mut buffer = SecureBuffer::allocate(Self::SIZE)?;
                backend::fill_random(&mut buffer.write()?)?;
                Ok(Self::wrap(buffer))
            }

            /// Copy raw bytes in. The caller still owns `bytes` and is
            /// responsible for wiping them.
            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let () = Self::CHECK;
                check_size(Self::SIZE, bytes.len())?;
                Ok(Self::wrap(SecureBuffer::from_slice(bytes)?))
            }

            /// Copy raw bytes in and zero the source, whether or not the copy
            /// succeeds.
            pub fn from_mut_slice(bytes: &mut [u8]) -> Result<Self> {
                let result = Self::from_slice(bytes);
                bytes.zeroize();
                result
            }

            /// Take the bytes of a string and wipe the string.
            pub fn from_string(source: &mut String) -> Result<Self> {
                let result = Self::from_slice(source.as_bytes());
                source.zeroize();
                result
            }

            /// Adopt an already locked buffer of the right length.
            pub fn from_buffer(buffer: SecureBuffer) -> Result<Self> {
                let () = Self::CHECK;
                check_size(Self::SIZE, buffer.len())?;
                Ok(Self::wrap(buffer))
            }

            pub fn len(&self) -> usize {
                self.buffer.len()
            }

            pub fn is_empty(&self) -> bool {
                self.buffer.is_empty()
            }

            /// Scoped read access to the raw bytes.
            pub fn expose(&self) -> Result<ReadGuard<'_>> {
                self.buffer.read()
            }

            /// Scoped write access to the raw bytes.
            pub fn expose_mut(&mut self) -> Result<WriteGuard<'_>> {
                self.buffer.write()
            }

            /// Lower or raise resting page protection.
            pub fn set_access(&mut self, access: Access) -> Result<()> {
                self.buffer.set_access(access)
            }

            /// Zero the bytes in place.
            pub fn clear(&mut self) -> Result<()> {
                self.buffer.clear()
            }

            /// Explicit copy into a second locked buffer.
            pub fn try_clone(&self) -> Result<Self> {
                Ok(Self::wrap(self.buffer.try_clone()?))
            }
        }

        impl<O: $bound> PartialEq for $name<O> {
            fn eq(&self, other: &Self) -> bool {
                self.buffer.ct_eq(&other.buffer).unwrap_or(false)
            }
        }

        impl<O: $bound> Eq for $name<O> {}

        impl<O: Op> fmt::Debug for $name<O> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("operation", &O::OPERATION)
                    .field("len", &self.buffer.len())
                    .field("data", &"[REDACTED]")
                    .finish()
            }
        }
    };
}

secret_material!(
    /// Secret key for operation `O`, never copied implicitly.
    SecretKey: SecretKeyOp, secret_key_size, "secret key"
);

secret_material!(
    /// Seed a key pair is derived from.
    Seed: KeyPairOp, seed_size, "seed"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;
    use crate::operation::ops;

    type Key = SecretKey<ops::SecretBox>;

    #[test]
    fn test_generate_has_operation_size() {
        let key = Key::generate().unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(SecretKey::<ops::Sign>::SIZE, 64);
        assert_eq!(SecretKey::<ops::ShortHash>::SIZE, 16);
    }

    #[test]
    fn test_generate_is_random() {
        let a = Key::generate().unwrap();
        let b = Key::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_slice_checks_size() {
        assert!(Key::from_slice(&[7u8; 32]).is_ok());
        assert!(matches!(
            Key::from_slice(&[7u8; 31]),
            Err(CryptoError::Size {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn test_from_mut_slice_wipes_source() {
        let mut raw = [0x42u8; 32];
        let key = Key::from_mut_slice(&mut raw).unwrap();
        assert_eq!(raw, [0u8; 32]);
        assert_eq!(&*key.expose().unwrap(), &[0x42u8; 32]);

        let mut short = [0x42u8; 5];
        assert!(Key::from_mut_slice(&mut short).is_err());
        assert_eq!(short, [0u8; 5]);
    }

    #[test]
    fn test_from_string_wipes_source() {
        let mut text = String::from("0123456789abcdef");
        let key = SecretKey::<ops::ShortHash>::from_string(&mut text).unwrap();
        assert!(text.is_empty());
        assert_eq!(&*key.expose().unwrap(), b"0123456789abcdef");
    }

    #[test]
    fn test_clear_then_compare() {
        let mut key = Key::from_slice(&[1u8; 32]).unwrap();
        key.clear().unwrap();
        assert!(key.expose().unwrap().iter().all(|&b| b == 0));
        assert_eq!(key, Key::from_slice(&[0u8; 32]).unwrap());
    }

    #[test]
    fn test_idle_key_can_be_hidden() {
        let mut key = Key::from_slice(&[9u8; 32]).unwrap();
        key.set_access(Access::None).unwrap();
        assert_eq!(key.expose().unwrap()[0], 9);
        let copy = key.try_clone().unwrap();
        assert_eq!(key, copy);
    }

    #[test]
    fn test_seed_size() {
        let seed = Seed::<ops::Sign>::generate().unwrap();
        assert_eq!(seed.len(), 32);
    }
}
