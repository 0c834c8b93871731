//! Zero-sized operation markers
//!
//! Each marker names one [`Operation`] at the type level. Generic types such
//! as `Nonce<O>` or `SecretKey<O>` take a marker and read their sizes from
//! `O::TRAITS` at compile time.

use super::{traits, Operation, OperationTraits};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Type-level operation.
pub trait Op: sealed::Sealed + Send + Sync + 'static {
    const OPERATION: Operation;
    const TRAITS: OperationTraits = traits(Self::OPERATION);

    fn is_available() -> bool {
        Self::OPERATION.is_available()
    }
}

macro_rules! operations {
    ($($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("Marker for [`Operation::", stringify!($name), "`].")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $name;

            impl sealed::Sealed for $name {}

            impl Op for $name {
                const OPERATION: Operation = Operation::$name;
            }
        )*
    };
}

operations!(
    HashSha256,
    HashSha512,
    ShortHashSipHash24,
    GenericHashBlake3,
    PwHashArgon2id,
    PwHashStrArgon2id,
    AuthHmacSha256,
    AuthHmacSha512,
    AuthHmacSha512256,
    SignEd25519,
    BoxCurve25519XChacha20Poly1305,
    SecretBoxXChacha20Poly1305,
    StreamChacha20,
    StreamChacha20Ietf,
    StreamXChacha20,
    DiffieHellmanX25519,
    AeadAes256Gcm,
    AeadChacha20Poly1305Ietf,
    AeadXChacha20Poly1305Ietf,
);

// Family defaults
pub type Hash = HashSha512;
pub type ShortHash = ShortHashSipHash24;
pub type GenericHash = GenericHashBlake3;
pub type PwHash = PwHashArgon2id;
pub type PwHashStr = PwHashStrArgon2id;
pub type Auth = AuthHmacSha512256;
pub type Sign = SignEd25519;
pub type Box = BoxCurve25519XChacha20Poly1305;
pub type SecretBox = SecretBoxXChacha20Poly1305;
pub type Stream = StreamXChacha20;
pub type DiffieHellman = DiffieHellmanX25519;
pub type Aead = AeadChacha20Poly1305Ietf;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_registry() {
        assert_eq!(Hash::OPERATION, Operation::HASH);
        assert_eq!(Auth::OPERATION, Operation::AUTH);
        assert_eq!(Stream::OPERATION, Operation::STREAM);
        assert_eq!(Aead::OPERATION, Operation::AEAD);
        assert_eq!(Box::OPERATION, Operation::BOX);
    }

    #[test]
    fn test_marker_traits_come_from_table() {
        assert_eq!(SignEd25519::TRAITS, traits(Operation::SignEd25519));
        assert_eq!(StreamChacha20::TRAITS.nonce_size, 8);
    }
}
