//! Typed key material
//!
//! Secret halves live in [`SecureBuffer`](crate::memory::SecureBuffer)s and
//! are never cloned implicitly; public halves and salts are ordinary heap
//! bytes.

mod public;
mod secret;

pub use public::{KeyPair, PublicKey, Salt};
pub use secret::{SecretKey, Seed};
