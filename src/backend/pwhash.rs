//! Argon2id: raw key derivation and PHC-format password strings

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::PwHashParams;
use crate::error::{CryptoError, Result};
use crate::operation::ops::{PwHashArgon2id, PwHashStrArgon2id};
use crate::operation::{PwHashOp, PwHashStrOp, SaltOp};

fn argon2id(params: &PwHashParams, output_len: Option<usize>) -> Result<Argon2<'static>> {
    let params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        output_len,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected Argon2 parameters");
        CryptoError::Backend("invalid Argon2 parameters")
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

impl SaltOp for PwHashArgon2id {}

impl PwHashOp for PwHashArgon2id {
    fn derive(password: &[u8], salt: &[u8], params: &PwHashParams, out: &mut [u8]) -> Result<()> {
        argon2id(params, Some(out.len()))?
            .hash_password_into(password, salt, out)
            .map_err(|e| {
                tracing::debug!(error = %e, "Argon2 derivation failed");
                CryptoError::OutOfMemory
            })
    }
}

impl PwHashStrOp for PwHashStrArgon2id {
    fn hash_str(password: &[u8], params: &PwHashParams) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2id(params, None)?
            .hash_password(password, &salt)
            .map_err(|e| {
                tracing::debug!(error = %e, "Argon2 hashing failed");
                CryptoError::OutOfMemory
            })?;
        Ok(hash.to_string())
    }

    fn verify_str(encoded: &str, password: &[u8]) -> Result<()> {
        let parsed = PasswordHash::new(encoded).map_err(|_| CryptoError::Format)?;
        Argon2::default()
            .verify_password(password, &parsed)
            .map_err(|_| CryptoError::Verification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> PwHashParams {
        PwHashParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_derive_deterministic() {
        let salt = [0x42u8; 16];
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        PwHashArgon2id::derive(b"password", &salt, &light(), &mut a).unwrap();
        PwHashArgon2id::derive(b"password", &salt, &light(), &mut b).unwrap();
        assert_eq!(a, b);

        PwHashArgon2id::derive(b"password", &[0x43u8; 16], &light(), &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_string_hash_verifies() {
        let encoded = PwHashStrArgon2id::hash_str(b"correct horse", &light()).unwrap();
        assert!(encoded.starts_with("$argon2id$"));
        PwHashStrArgon2id::verify_str(&encoded, b"correct horse").unwrap();
        assert!(matches!(
            PwHashStrArgon2id::verify_str(&encoded, b"battery staple"),
            Err(CryptoError::Verification)
        ));
        assert!(matches!(
            PwHashStrArgon2id::verify_str("not a hash", b"x"),
            Err(CryptoError::Format)
        ));
    }
}
