//! Counter nonces
//!
//! A nonce of `N` bytes is split at `N - S`:
//!
//! ```text
//! [ constant: N - S bytes ][ sequential: S bytes, big-endian counter ]
//! ```
//!
//! Peers agree on the constant part once and then advance the sequential
//! part by one per message. `S` defaults to the operation's
//! `nonce_default_sequential_size`; explicit sizes must keep at least four
//! constant bytes. Running the counter past its maximum poisons the nonce:
//! every later increment, and every sealer or opener using it, fails with
//! [`CryptoError::Overflow`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::backend;
use crate::error::{check_size, CryptoError, Result};
use crate::operation::{NonceOp, MAX_NONCE_SIZE, MIN_NONCE_CONSTANT_SIZE};

pub struct Nonce<O> {
    bytes: [u8; MAX_NONCE_SIZE],
    size: usize,
    sequential: usize,
    overflowed: bool,
    _op: PhantomData<fn() -> O>,
}

impl<O: NonceOp> Nonce<O> {
    pub const SIZE: usize = O::TRAITS.nonce_size;
    pub const DEFAULT_SEQUENTIAL_SIZE: usize = O::TRAITS.nonce_default_sequential_size;

    const CHECK: () = assert!(
        O::TRAITS.nonce_size > 0 && O::TRAITS.nonce_size <= MAX_NONCE_SIZE,
        "operation has no nonce"
    );

    fn blank(sequential: usize) -> Result<Self> {
        let () = Self::CHECK;
        if sequential == 0
            || sequential >= Self::SIZE
            || Self::SIZE - sequential < MIN_NONCE_CONSTANT_SIZE
        {
            return Err(CryptoError::size(Self::DEFAULT_SEQUENTIAL_SIZE, sequential));
        }
        Ok(Self {
            bytes: [0u8; MAX_NONCE_SIZE],
            size: Self::SIZE,
            sequential,
            overflowed: false,
            _op: PhantomData,
        })
    }

    fn constant_len(&self) -> usize {
        self.size - self.sequential
    }

    /// Fully random nonce, default split.
    pub fn generate() -> Result<Self> {
        Self::generate_sized(Self::DEFAULT_SEQUENTIAL_SIZE)
    }

    /// Fully random nonce with `sequential` counter bytes.
    pub fn generate_sized(sequential: usize) -> Result<Self> {
        let mut nonce = Self::blank(sequential)?;
        backend::fill_random(&mut nonce.bytes[..Self::SIZE])?;
        Ok(nonce)
    }

    /// Random constant part, sequential part zero.
    pub fn generate_constant() -> Result<Self> {
        Self::generate_constant_sized(Self::DEFAULT_SEQUENTIAL_SIZE)
    }

    /// Random constant part, `sequential` zero counter bytes.
    pub fn generate_constant_sized(sequential: usize) -> Result<Self> {
        let mut nonce = Self::blank(sequential)?;
        let constant = nonce.constant_len();
        backend::fill_random(&mut nonce.bytes[..constant])?;
        Ok(nonce)
    }

    /// All `N` bytes given explicitly.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_slice_sized(bytes, Self::DEFAULT_SEQUENTIAL_SIZE)
    }

    /// All `N` bytes given explicitly, with `sequential` counter bytes.
    pub fn from_slice_sized(bytes: &[u8], sequential: usize) -> Result<Self> {
        let mut nonce = Self::blank(sequential)?;
        check_size(Self::SIZE, bytes.len())?;
        nonce.bytes[..Self::SIZE].copy_from_slice(bytes);
        Ok(nonce)
    }

    /// Only the constant part given; the counter starts at zero.
    pub fn from_constant(constant: &[u8]) -> Result<Self> {
        Self::from_constant_sized(constant, Self::DEFAULT_SEQUENTIAL_SIZE)
    }

    /// Constant part given, `sequential` zero counter bytes.
    pub fn from_constant_sized(constant: &[u8], sequential: usize) -> Result<Self> {
        let mut nonce = Self::blank(sequential)?;
        check_size(nonce.constant_len(), constant.len())?;
        nonce.bytes[..constant.len()].copy_from_slice(constant);
        Ok(nonce)
    }

    /// The full nonce as passed to the cipher.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.size]
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Length of the counter part in bytes.
    pub fn sequential_size(&self) -> usize {
        self.sequential
    }

    /// Leading bytes that never change.
    pub fn constant(&self) -> &[u8] {
        &self.bytes[..self.constant_len()]
    }

    /// Trailing big-endian counter.
    pub fn sequential(&self) -> &[u8] {
        &self.bytes[self.constant_len()..self.size]
    }

    /// True once the counter has wrapped; the nonce is then unusable.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Whether `steps` increments would all succeed.
    pub(crate) fn has_headroom(&self, steps: u64) -> bool {
        if self.overflowed {
            return false;
        }
        let mut headroom: u64 = 0;
        for &byte in self.sequential() {
            match headroom
                .checked_mul(256)
                .and_then(|h| h.checked_add(u64::from(0xFF - byte)))
            {
                Some(h) => headroom = h,
                None => return true,
            }
        }
        headroom >= steps
    }

    /// Fails once the nonce has overflowed.
    pub(crate) fn ensure_usable(&self) -> Result<()> {
        if self.overflowed {
            Err(CryptoError::Overflow)
        } else {
            Ok(())
        }
    }

    /// Advance the sequential part by one, big-endian with carry.
    ///
    /// # Errors
    /// `Overflow` when the counter wraps, and on every call after that.
    pub fn increment(&mut self) -> Result<()> {
        self.ensure_usable()?;

        let start = self.constant_len();
        let msb = self.bytes[start];
        for byte in self.bytes[start..self.size].iter_mut().rev() {
            let (next, carry) = byte.overflowing_add(1);
            *byte = next;
            if !carry {
                break;
            }
        }

        if self.bytes[start] < msb {
            self.overflowed = true;
            tracing::warn!(operation = %O::OPERATION, "nonce counter overflowed");
            return Err(CryptoError::Overflow);
        }
        Ok(())
    }

    /// Force the low bit of the first constant byte to `flag`.
    ///
    /// Two peers sharing a constant part use opposite flags so their
    /// directions never reuse a nonce.
    pub fn set_flag_bit(&mut self, flag: bool) {
        if (self.bytes[0] & 1 == 1) != flag {
            self.bytes[0] ^= 1;
        }
    }

    /// Current value of the flag bit.
    pub fn flag_bit(&self) -> bool {
        self.bytes[0] & 1 == 1
    }
}

impl<O> Clone for Nonce<O> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes,
            size: self.size,
            sequential: self.sequential,
            overflowed: self.overflowed,
            _op: PhantomData,
        }
    }
}

impl<O> Nonce<O> {
    fn raw(&self) -> &[u8] {
        &self.bytes[..self.size]
    }
}

impl<O> PartialEq for Nonce<O> {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl<O> Eq for Nonce<O> {}

impl<O> PartialOrd for Nonce<O> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<O> Ord for Nonce<O> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw().cmp(other.raw())
    }
}

impl<O> Hash for Nonce<O> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw().hash(state);
    }
}

impl<O> AsRef<[u8]> for Nonce<O> {
    fn as_ref(&self) -> &[u8] {
        self.raw()
    }
}

impl<O> fmt::Debug for Nonce<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let split = self.size - self.sequential;
        f.debug_struct("Nonce")
            .field("constant", &hex::encode(&self.bytes[..split]))
            .field("sequential", &hex::encode(&self.bytes[split..self.size]))
            .field("overflowed", &self.overflowed)
            .finish()
    }
}
