//! SHA-2 digests, SipHash-2-4 and BLAKE3

use std::hash::Hasher;

use sha2::{Digest, Sha256, Sha512};
use siphasher::sip::SipHasher24;
use zeroize::Zeroizing;

use super::to_array;
use crate::error::Result;
use crate::operation::ops::{GenericHashBlake3, HashSha256, HashSha512, ShortHashSipHash24};
use crate::operation::{GenericHashOp, HashOp, Incremental, SecretKeyOp, ShortHashOp};

impl HashOp for HashSha256 {
    fn hash(data: &[u8], out: &mut [u8]) {
        out.copy_from_slice(&Sha256::digest(data));
    }
}

impl HashOp for HashSha512 {
    fn hash(data: &[u8], out: &mut [u8]) {
        out.copy_from_slice(&Sha512::digest(data));
    }
}

impl SecretKeyOp for ShortHashSipHash24 {}

impl ShortHashOp for ShortHashSipHash24 {
    fn short_hash(key: &[u8], data: &[u8], out: &mut [u8]) {
        let mut k = Zeroizing::new([0u8; 16]);
        k.copy_from_slice(key);
        let mut hasher = SipHasher24::new_with_key(&k);
        hasher.write(data);
        out.copy_from_slice(&hasher.finish().to_le_bytes());
    }
}

/// Incremental BLAKE3, read out through its extendable output.
pub struct Blake3State(blake3::Hasher);

impl Incremental for Blake3State {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize_into(self, out: &mut [u8]) {
        self.0.finalize_xof().fill(out);
    }
}

impl SecretKeyOp for GenericHashBlake3 {}

impl GenericHashOp for GenericHashBlake3 {
    type Hasher = Blake3State;

    fn hasher(key: Option<&[u8]>) -> Result<Blake3State> {
        let hasher = match key {
            Some(key) => {
                let key = Zeroizing::new(to_array::<32>(key)?);
                blake3::Hasher::new_keyed(&key)
            }
            None => blake3::Hasher::new(),
        };
        Ok(Blake3State(hasher))
    }
}
