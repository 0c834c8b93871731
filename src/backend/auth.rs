//! HMAC-SHA-256, HMAC-SHA-512 and HMAC-SHA-512/256

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use crate::error::{CryptoError, Result};
use crate::operation::ops::{AuthHmacSha256, AuthHmacSha512, AuthHmacSha512256};
use crate::operation::{AuthOp, Incremental, SecretKeyOp};

/// Running MAC; `finalize_into` truncates to the output length, which is
/// how HMAC-SHA-512/256 is produced from HMAC-SHA-512.
pub struct HmacState<M>(M);

impl<M: Mac> Incremental for HmacState<M> {
    fn update(&mut self, data: &[u8]) {
        Mac::update(&mut self.0, data);
    }

    fn finalize_into(self, out: &mut [u8]) {
        let tag = self.0.finalize().into_bytes();
        let len = out.len();
        out.copy_from_slice(&tag[..len]);
    }
}

fn keyed<M: Mac + hmac::digest::KeyInit>(key: &[u8]) -> Result<HmacState<M>> {
    <M as Mac>::new_from_slice(key)
        .map(HmacState)
        .map_err(|_| CryptoError::size(32, key.len()))
}

impl SecretKeyOp for AuthHmacSha256 {}

impl AuthOp for AuthHmacSha256 {
    type Mac = HmacState<Hmac<Sha256>>;

    fn mac(key: &[u8]) -> Result<Self::Mac> {
        keyed(key)
    }
}

impl SecretKeyOp for AuthHmacSha512 {}

impl AuthOp for AuthHmacSha512 {
    type Mac = HmacState<Hmac<Sha512>>;

    fn mac(key: &[u8]) -> Result<Self::Mac> {
        keyed(key)
    }
}

impl SecretKeyOp for AuthHmacSha512256 {}

impl AuthOp for AuthHmacSha512256 {
    type Mac = HmacState<Hmac<Sha512>>;

    fn mac(key: &[u8]) -> Result<Self::Mac> {
        keyed(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4231_case_2() {
        // Key "Jefe" is shorter than our fixed key size, so drive Hmac directly
        let mut state = HmacState(Hmac::<Sha256>::new_from_slice(b"Jefe").unwrap());
        state.update(b"what do ya want ");
        state.update(b"for nothing?");
        let mut out = [0u8; 32];
        state.finalize_into(&mut out);
        assert_eq!(
            hex::encode(out),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sha512256_is_truncated_sha512() {
        let key = [0x0bu8; 32];
        let mut long = [0u8; 64];
        let mut short = [0u8; 32];

        let mut a = AuthHmacSha512::mac(&key).unwrap();
        a.update(b"message");
        a.finalize_into(&mut long);

        let mut b = AuthHmacSha512256::mac(&key).unwrap();
        b.update(b"message");
        b.finalize_into(&mut short);

        assert_eq!(&long[..32], &short);
    }
}
