//! Operation registry
//!
//! Every algorithm the crate can drive is one variant of [`Operation`]. Its
//! sizes and capability flags come from a single `const fn` table,
//! [`traits`], which is checked for consistency at compile time. Generic
//! components are parameterized by a zero-sized marker type from [`ops`]
//! and bounded by the capability traits in [`capability`], so pairing a
//! component with an operation that lacks the capability does not compile.

pub mod capability;
pub mod ops;

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

pub use capability::{
    AeadOp, AuthOp, BoxOp, DhOp, GenericHashOp, HashOp, Incremental, KeyPairOp, NonceOp,
    PwHashOp, PwHashStrOp, SaltOp, SecretBoxOp, SecretKeyOp, ShortHashOp, SignOp, StreamOp,
};
pub use ops::Op;

/// Largest nonce of any operation, used to size nonce storage.
pub const MAX_NONCE_SIZE: usize = 24;

/// Smallest constant prefix a nonce may have.
pub const MIN_NONCE_CONSTANT_SIZE: usize = 4;

/// Closed set of supported algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
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
}

impl Operation {
    pub const ALL: [Operation; 19] = [
        Operation::HashSha256,
        Operation::HashSha512,
        Operation::ShortHashSipHash24,
        Operation::GenericHashBlake3,
        Operation::PwHashArgon2id,
        Operation::PwHashStrArgon2id,
        Operation::AuthHmacSha256,
        Operation::AuthHmacSha512,
        Operation::AuthHmacSha512256,
        Operation::SignEd25519,
        Operation::BoxCurve25519XChacha20Poly1305,
        Operation::SecretBoxXChacha20Poly1305,
        Operation::StreamChacha20,
        Operation::StreamChacha20Ietf,
        Operation::StreamXChacha20,
        Operation::DiffieHellmanX25519,
        Operation::AeadAes256Gcm,
        Operation::AeadChacha20Poly1305Ietf,
        Operation::AeadXChacha20Poly1305Ietf,
    ];

    // Family defaults
    pub const HASH: Operation = Operation::HashSha512;
    pub const SHORT_HASH: Operation = Operation::ShortHashSipHash24;
    pub const GENERIC_HASH: Operation = Operation::GenericHashBlake3;
    pub const PW_HASH: Operation = Operation::PwHashArgon2id;
    pub const PW_HASH_STR: Operation = Operation::PwHashStrArgon2id;
    pub const AUTH: Operation = Operation::AuthHmacSha512256;
    pub const SIGN: Operation = Operation::SignEd25519;
    pub const BOX: Operation = Operation::BoxCurve25519XChacha20Poly1305;
    pub const SECRET_BOX: Operation = Operation::SecretBoxXChacha20Poly1305;
    pub const STREAM: Operation = Operation::StreamXChacha20;
    pub const DIFFIE_HELLMAN: Operation = Operation::DiffieHellmanX25519;
    pub const AEAD: Operation = Operation::AeadChacha20Poly1305Ietf;

    /// Sizes and capability flags for this operation.
    pub const fn traits(self) -> OperationTraits {
        traits(self)
    }

    /// Stable lowercase name, used by the CLI and config files.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::HashSha256 => "hash_sha256",
            Operation::HashSha512 => "hash_sha512",
            Operation::ShortHashSipHash24 => "short_hash_sip_hash24",
            Operation::GenericHashBlake3 => "generic_hash_blake3",
            Operation::PwHashArgon2id => "pw_hash_argon2id",
            Operation::PwHashStrArgon2id => "pw_hash_str_argon2id",
            Operation::AuthHmacSha256 => "auth_hmac_sha256",
            Operation::AuthHmacSha512 => "auth_hmac_sha512",
            Operation::AuthHmacSha512256 => "auth_hmac_sha512256",
            Operation::SignEd25519 => "sign_ed25519",
            Operation::BoxCurve25519XChacha20Poly1305 => "box_curve25519_xchacha20_poly1305",
            Operation::SecretBoxXChacha20Poly1305 => "secret_box_xchacha20_poly1305",
            Operation::StreamChacha20 => "stream_chacha20",
            Operation::StreamChacha20Ietf => "stream_chacha20_ietf",
            Operation::StreamXChacha20 => "stream_xchacha20",
            Operation::DiffieHellmanX25519 => "diffie_hellman_x25519",
            Operation::AeadAes256Gcm => "aead_aes256_gcm",
            Operation::AeadChacha20Poly1305Ietf => "aead_chacha20_poly1305_ietf",
            Operation::AeadXChacha20Poly1305Ietf => "aead_xchacha20_poly1305_ietf",
        }
    }

    /// Whether the backend can run this operation at full strength on this
    /// machine.
    ///
    /// Only AES-256-GCM depends on the CPU: without AES and carry-less
    /// multiply instructions the software fallback still works but is not
    /// constant-time on every platform.
    pub fn is_available(self) -> bool {
        match self {
            Operation::AeadAes256Gcm => aes_hardware_available(),
            _ => true,
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn aes_hardware_available() -> bool {
    std::arch::is_x86_feature_detected!("aes") && std::arch::is_x86_feature_detected!("pclmulqdq")
}

#[cfg(target_arch = "aarch64")]
fn aes_hardware_available() -> bool {
    std::arch::is_aarch64_feature_detected!("aes")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn aes_hardware_available() -> bool {
    false
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == wanted)
            .ok_or(CryptoError::Format)
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse()
            .map_err(|_| de::Error::custom(format!("unknown operation `{}`", name)))
    }
}

/// Immutable description of one operation.
///
/// At most one `has_*` flag is set. A size is nonzero exactly when the
/// operation needs that kind of object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationTraits {
    pub has_hash: bool,
    pub has_short_hash: bool,
    pub has_generic_hash: bool,
    pub has_pw_hash: bool,
    pub has_box: bool,
    pub has_secret_box: bool,
    pub has_stream: bool,
    pub has_diffie_hellman: bool,

    pub hash_size: usize,
    pub min_hash_size: usize,
    pub secret_key_size: usize,
    pub min_secret_key_size: usize,
    pub public_key_size: usize,
    pub seed_size: usize,
    pub salt_size: usize,
    pub nonce_size: usize,
    pub nonce_default_sequential_size: usize,
    pub authenticator_size: usize,
    pub signature_size: usize,
    pub aead_tag_size: usize,

    /// Precomputed shared key (box) or raw scalar product (DH).
    pub intermediate_size: usize,
    /// Largest derived Diffie-Hellman secret.
    pub shared_secret_size: usize,
    /// Smallest derived Diffie-Hellman secret.
    pub min_shared_secret_size: usize,
}

const NONE: OperationTraits = OperationTraits {
    has_hash: false,
    has_short_hash: false,
    has_generic_hash: false,
    has_pw_hash: false,
    has_box: false,
    has_secret_box: false,
    has_stream: false,
    has_diffie_hellman: false,
    hash_size: 0,
    min_hash_size: 0,
    secret_key_size: 0,
    min_secret_key_size: 0,
    public_key_size: 0,
    seed_size: 0,
    salt_size: 0,
    nonce_size: 0,
    nonce_default_sequential_size: 0,
    authenticator_size: 0,
    signature_size: 0,
    aead_tag_size: 0,
    intermediate_size: 0,
    shared_secret_size: 0,
    min_shared_secret_size: 0,
};

const fn stream(nonce_size: usize, sequential: usize) -> OperationTraits {
    OperationTraits {
        has_stream: true,
        secret_key_size: 32,
        min_secret_key_size: 32,
        nonce_size,
        nonce_default_sequential_size: sequential,
        ..NONE
    }
}

const fn aead(nonce_size: usize) -> OperationTraits {
    OperationTraits {
        secret_key_size: 32,
        min_secret_key_size: 32,
        nonce_size,
        nonce_default_sequential_size: nonce_size / 2,
        aead_tag_size: 16,
        ..NONE
    }
}

const fn hmac(authenticator_size: usize) -> OperationTraits {
    OperationTraits {
        secret_key_size: 32,
        min_secret_key_size: 32,
        authenticator_size,
        ..NONE
    }
}

/// Registry lookup. Total over [`Operation`].
pub const fn traits(op: Operation) -> OperationTraits {
    match op {
        Operation::HashSha256 => OperationTraits {
            has_hash: true,
            hash_size: 32,
            min_hash_size: 32,
            ..NONE
        },
        Operation::HashSha512 => OperationTraits {
            has_hash: true,
            hash_size: 64,
            min_hash_size: 64,
            ..NONE
        },
        Operation::ShortHashSipHash24 => OperationTraits {
            has_short_hash: true,
            hash_size: 8,
            min_hash_size: 8,
            secret_key_size: 16,
            min_secret_key_size: 16,
            ..NONE
        },
        Operation::GenericHashBlake3 => OperationTraits {
            has_generic_hash: true,
            hash_size: 64,
            min_hash_size: 16,
            secret_key_size: 32,
            min_secret_key_size: 32,
            ..NONE
        },
        Operation::PwHashArgon2id => OperationTraits {
            has_pw_hash: true,
            hash_size: 128,
            min_hash_size: 16,
            salt_size: 16,
            ..NONE
        },
        Operation::PwHashStrArgon2id => OperationTraits {
            has_pw_hash: true,
            hash_size: 128,
            ..NONE
        },
        Operation::AuthHmacSha256 => hmac(32),
        Operation::AuthHmacSha512 => hmac(64),
        Operation::AuthHmacSha512256 => hmac(32),
        Operation::SignEd25519 => OperationTraits {
            secret_key_size: 64,
            min_secret_key_size: 64,
            public_key_size: 32,
            seed_size: 32,
            signature_size: 64,
            ..NONE
        },
        Operation::BoxCurve25519XChacha20Poly1305 => OperationTraits {
            has_box: true,
            secret_key_size: 32,
            min_secret_key_size: 32,
            public_key_size: 32,
            seed_size: 32,
            nonce_size: 24,
            nonce_default_sequential_size: 8,
            aead_tag_size: 16,
            intermediate_size: 32,
            ..NONE
        },
        Operation::SecretBoxXChacha20Poly1305 => OperationTraits {
            has_secret_box: true,
            secret_key_size: 32,
            min_secret_key_size: 32,
            nonce_size: 24,
            nonce_default_sequential_size: 8,
            aead_tag_size: 16,
            ..NONE
        },
        Operation::StreamChacha20 => stream(8, 4),
        Operation::StreamChacha20Ietf => stream(12, 6),
        Operation::StreamXChacha20 => stream(24, 8),
        Operation::DiffieHellmanX25519 => OperationTraits {
            has_diffie_hellman: true,
            secret_key_size: 32,
            min_secret_key_size: 32,
            public_key_size: 32,
            seed_size: 32,
            intermediate_size: 32,
            shared_secret_size: 64,
            min_shared_secret_size: 16,
            ..NONE
        },
        Operation::AeadAes256Gcm => aead(12),
        Operation::AeadChacha20Poly1305Ietf => aead(12),
        Operation::AeadXChacha20Poly1305Ietf => aead(24),
    }
}

const fn check(op: Operation) {
    let t = traits(op);

    let flags = t.has_hash as u8
        + t.has_short_hash as u8
        + t.has_generic_hash as u8
        + t.has_pw_hash as u8
        + t.has_box as u8
        + t.has_secret_box as u8
        + t.has_stream as u8
        + t.has_diffie_hellman as u8;
    assert!(flags <= 1, "more than one capability flag set");

    assert!(t.min_hash_size <= t.hash_size, "minimum hash size above maximum");
    assert!(
        t.min_secret_key_size <= t.secret_key_size,
        "minimum key size above maximum"
    );
    assert!(
        t.min_shared_secret_size <= t.shared_secret_size,
        "minimum shared secret size above maximum"
    );

    if t.nonce_size == 0 {
        assert!(
            t.nonce_default_sequential_size == 0,
            "sequential size without a nonce"
        );
    } else {
        assert!(t.nonce_size <= MAX_NONCE_SIZE, "nonce larger than storage");
        assert!(
            t.nonce_default_sequential_size > 0
                && t.nonce_default_sequential_size < t.nonce_size,
            "sequential size outside the nonce"
        );
        assert!(
            t.nonce_size - t.nonce_default_sequential_size >= MIN_NONCE_CONSTANT_SIZE,
            "constant nonce prefix too short"
        );
        assert!(t.secret_key_size > 0, "nonce without a key");
    }

    if t.has_hash || t.has_short_hash || t.has_generic_hash || t.has_pw_hash {
        assert!(t.hash_size > 0, "hash operation without a hash size");
    }
    if t.has_short_hash {
        assert!(t.secret_key_size > 0, "keyed short hash without a key");
    }
    if t.has_box {
        assert!(
            t.public_key_size > 0 && t.nonce_size > 0 && t.aead_tag_size > 0,
            "box needs keys, nonce and tag"
        );
        assert!(t.intermediate_size > 0, "box without precomputed key");
    }
    if t.has_secret_box || t.has_stream {
        assert!(t.nonce_size > 0, "symmetric cipher without a nonce");
    }
    if t.has_diffie_hellman {
        assert!(
            t.public_key_size > 0 && t.shared_secret_size > 0,
            "Diffie-Hellman needs a public key and output size"
        );
    }
    if t.signature_size > 0 {
        assert!(t.public_key_size > 0, "signature without a public key");
    }
}

const _: () = {
    let mut i = 0;
    while i < Operation::ALL.len() {
        check(Operation::ALL[i]);
        i += 1;
    }
};
