use std::fmt;

use super::step;
use crate::error::Result;
use crate::keys::{PublicKey, SecretKey};
use crate::memory::SecureBuffer;
use crate::nonce::Nonce;
use crate::operation::{BoxOp, SecretBoxOp};

fn precompute<O: BoxOp>(peer: &PublicKey<O>, own: &SecretKey<O>) -> Result<SecureBuffer> {
    let mut shared = SecureBuffer::allocate(O::TRAITS.intermediate_size)?;
    O::precompute(peer.as_bytes(), &own.expose()?, &mut shared.write()?)?;
    Ok(shared)
}

macro_rules! box_end {
    ($(#[$meta:meta])* $name:ident, $method:ident, $call:ident) => {
        $(#[$meta])*
        pub struct $name<'n, O: BoxOp> {
            shared: SecureBuffer,
            nonce: &'n mut Nonce<O>,
        }

        impl<'n, O: BoxOp> $name<'n, O> {
            /// Precompute the shared key for `own` and `peer`.
            ///
            /// # Errors
            /// `KeyGen` for a low-order peer key, `Overflow` if `nonce` is
            /// already spent.
            pub fn new(peer: &PublicKey<O>, own: &SecretKey<O>, nonce: &'n mut Nonce<O>) -> Result<Self> {
                nonce.ensure_usable()?;
                Ok(Self {
                    shared: precompute(peer, own)?,
                    nonce,
                })
            }

            /// Transform one message and advance the nonce.
            pub fn $method(&mut self, input: &[u8]) -> Result<Vec<u8>> {
                let shared = self.shared.read()?;
                step(&mut *self.nonce, |nonce| O::$call(&shared, nonce, input))
            }

            /// The nonce the next message will use.
            pub fn nonce(&self) -> &Nonce<O> {
                &*self.nonce
            }
        }

        impl<O: BoxOp> fmt::Debug for $name<'_, O> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("operation", &O::OPERATION)
                    .field("nonce", &self.nonce)
                    .finish_non_exhaustive()
            }
        }
    };
}

box_end!(
    /// Public-key encryption towards one peer.
    BoxSealer, seal, seal
);

box_end!(
    /// Public-key decryption of one peer's messages.
    BoxOpener, open, open
);

macro_rules! secret_box_end {
    ($(#[$meta:meta])* $name:ident, $method:ident, $call:ident) => {
        $(#[$meta])*
        pub struct $name<'k, 'n, O: SecretBoxOp> {
            key: &'k SecretKey<O>,
            nonce: &'n mut Nonce<O>,
        }

        impl<'k, 'n, O: SecretBoxOp> $name<'k, 'n, O> {
            /// Bind `key` and `nonce`; fails if the nonce is already spent.
            pub fn new(key: &'k SecretKey<O>, nonce: &'n mut Nonce<O>) -> Result<Self> {
                nonce.ensure_usable()?;
                Ok(Self { key, nonce })
            }

            /// Transform one message and advance the nonce.
            pub fn $method(&mut self, input: &[u8]) -> Result<Vec<u8>> {
                let key = self.key.expose()?;
                step(&mut *self.nonce, |nonce| <O as SecretBoxOp>::$call(&key, nonce, input))
            }

            /// The nonce the next message will use.
            pub fn nonce(&self) -> &Nonce<O> {
                &*self.nonce
            }
        }

        impl<O: SecretBoxOp> fmt::Debug for $name<'_, '_, O> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("operation", &O::OPERATION)
                    .field("nonce", &self.nonce)
                    .finish_non_exhaustive()
            }
        }
    };
}

secret_box_end!(
    /// Secret-key encryption.
    SecretBoxSealer, seal, seal
);

secret_box_end!(SecretBoxOpener, open, open);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;
    use crate::keys::KeyPair;
    use crate::operation::ops;

    type Pair = KeyPair<ops::Box>;

    #[test]
    fn test_box_conversation() {
        let alice = Pair::generate().unwrap();
        let bob = Pair::generate().unwrap();
        let start = Nonce::<ops::Box>::generate_constant().unwrap();
        let mut send = start.clone();
        let mut recv = start.clone();

        let mut sealer = BoxSealer::new(bob.public_key(), alice.secret_key(), &mut send).unwrap();
        let mut opener = BoxOpener::new(alice.public_key(), bob.secret_key(), &mut recv).unwrap();

        for message in [&b"first"[..], b"", b"third message"] {
            let sealed = sealer.seal(message).unwrap();
            assert_eq!(sealed.len(), message.len() + 16);
            assert_eq!(opener.open(&sealed).unwrap(), message);
        }
        assert_eq!(sealer.nonce(), opener.nonce());
        assert_eq!(sealer.nonce().sequential(), &[0, 0, 0, 0, 0, 0, 0, 3]);
    }

    #[test]
    fn test_box_tamper_leaves_nonce() {
        let alice = Pair::generate().unwrap();
        let bob = Pair::generate().unwrap();
        let mut send = Nonce::<ops::Box>::generate().unwrap();
        let mut recv = send.clone();

        let mut sealer = BoxSealer::new(bob.public_key(), alice.secret_key(), &mut send).unwrap();
        let sealed = sealer.seal(b"attack at dawn").unwrap();

        let mut opener = BoxOpener::new(alice.public_key(), bob.secret_key(), &mut recv).unwrap();
        for i in 0..sealed.len() * 8 {
            let mut bad = sealed.clone();
            bad[i / 8] ^= 1 << (i % 8);
            assert!(matches!(opener.open(&bad), Err(CryptoError::Verification)));
        }
        assert_eq!(opener.open(&sealed).unwrap(), b"attack at dawn");
    }

    #[test]
    fn test_box_wrong_recipient() {
        let alice = Pair::generate().unwrap();
        let bob = Pair::generate().unwrap();
        let eve = Pair::generate().unwrap();
        let mut send = Nonce::<ops::Box>::generate().unwrap();
        let mut recv = send.clone();

        let sealed = BoxSealer::new(bob.public_key(), alice.secret_key(), &mut send)
            .unwrap()
            .seal(b"for bob")
            .unwrap();
        let mut opener = BoxOpener::new(alice.public_key(), eve.secret_key(), &mut recv).unwrap();
        assert!(opener.open(&sealed).is_err());
    }

    #[test]
    fn test_secret_box() {
        let key = SecretKey::<ops::SecretBox>::generate().unwrap();
        let mut send = Nonce::<ops::SecretBox>::generate().unwrap();
        let mut recv = send.clone();

        let mut sealer = SecretBoxSealer::new(&key, &mut send).unwrap();
        let mut opener = SecretBoxOpener::new(&key, &mut recv).unwrap();
        let a = sealer.seal(b"same").unwrap();
        let b = sealer.seal(b"same").unwrap();
        assert_ne!(a, b);

        // Out of order: the opener is still at the first nonce
        assert!(opener.open(&b).is_err());
        assert_eq!(opener.open(&a).unwrap(), b"same");
        assert_eq!(opener.open(&b).unwrap(), b"same");
    }

    #[test]
    fn test_spent_nonce_refused() {
        let key = SecretKey::<ops::SecretBox>::generate().unwrap();
        let mut nonce = Nonce::<ops::SecretBox>::from_slice_sized(&[0xFF; 24], 1).unwrap();
        assert!(nonce.increment().is_err());
        assert!(matches!(
            SecretBoxSealer::new(&key, &mut nonce),
            Err(CryptoError::Overflow)
        ));
    }

    #[test]
    fn test_last_nonce_value_overflows() {
        let key = SecretKey::<ops::SecretBox>::generate().unwrap();
        let mut raw = vec![1u8; 23];
        raw.push(0xFE);
        let mut nonce = Nonce::<ops::SecretBox>::from_slice_sized(&raw, 1).unwrap();

        let mut sealer = SecretBoxSealer::new(&key, &mut nonce).unwrap();
        sealer.seal(b"one").unwrap();
        assert!(matches!(sealer.seal(b"two"), Err(CryptoError::Overflow)));
        assert!(matches!(sealer.seal(b"three"), Err(CryptoError::Overflow)));
        assert!(sealer.nonce().is_overflowed());
    }
}
