use std::fmt;

use super::step;
use crate::error::Result;
use crate::keys::SecretKey;
use crate::nonce::Nonce;
use crate::operation::AeadOp;

macro_rules! aead_end {
    (
        $(#[$meta:meta])* $name:ident,
        $method:ident, $method_with:ident, $call:ident
    ) => {
        $(#[$meta])*
        pub struct $name<'k, 'n, O: AeadOp> {
            key: &'k SecretKey<O>,
            nonce: &'n mut Nonce<O>,
        }

        impl<'k, 'n, O: AeadOp> $name<'k, 'n, O> {
            pub const TAG_SIZE: usize = O::TRAITS.aead_tag_size;

            /// Bind `key` and `nonce`; fails if the nonce is already spent.
            pub fn new(key: &'k SecretKey<O>, nonce: &'n mut Nonce<O>) -> Result<Self> {
                nonce.ensure_usable()?;
                Ok(Self { key, nonce })
            }

            /// Same as the `_with` variant with empty associated data.
            pub fn $method(&mut self, input: &[u8]) -> Result<Vec<u8>> {
                self.$method_with(input, &[])
            }

            /// Transform one message with associated data and advance the nonce.
            pub fn $method_with(&mut self, input: &[u8], ad: &[u8]) -> Result<Vec<u8>> {
                let key = self.key.expose()?;
                step(&mut *self.nonce, |nonce| O::$call(&key, nonce, input, ad))
            }

            /// The nonce the next message will use.
            pub fn nonce(&self) -> &Nonce<O> {
                &*self.nonce
            }
        }

        impl<O: AeadOp> fmt::Debug for $name<'_, '_, O> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("operation", &O::OPERATION)
                    .field("nonce", &self.nonce)
                    .finish_non_exhaustive()
            }
        }
    };
}

aead_end!(
    /// AEAD encryption; output is `ciphertext || tag`.
    AeadSealer, seal, seal_with, encrypt
);

aead_end!(
    /// AEAD decryption of `ciphertext || tag`.
    AeadOpener, open, open_with, decrypt
);
