//! Locked memory for secret material
//!
//! A [`SecureBuffer`] lives in its own anonymous mapping:
//!
//! ```text
//! [guard page][ ... data pages, bytes right-aligned ... ][guard page]
//! ```
//!
//! The guard pages are never accessible, the data pages are locked into RAM
//! and kept out of core dumps where the OS allows it, and the buffer is
//! zeroed, unlocked and unmapped on drop. Page protection can be lowered to
//! [`Access::None`] while a secret is idle; [`SecureBuffer::read`] and
//! [`SecureBuffer::write`] return guards that raise it for a scope and put it
//! back afterwards.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as platform;
#[cfg(windows)]
use windows as platform;

use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};

/// Page protection of a secure buffer's data pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    None,
    Read,
    ReadWrite,
}

/// What to do when the OS refuses to lock pages into RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPolicy {
    /// Fail the allocation with a lock error.
    #[default]
    Strict,
    /// Log a warning and keep the unlocked buffer.
    BestEffort,
}

static LOCK_POLICY: AtomicU8 = AtomicU8::new(0);

/// Install the process-wide lock policy.
pub fn set_lock_policy(policy: LockPolicy) {
    let raw = match policy {
        LockPolicy::Strict => 0,
        LockPolicy::BestEffort => 1,
    };
    LOCK_POLICY.store(raw, Ordering::Relaxed);
}

/// The lock policy new allocations follow.
pub fn lock_policy() -> LockPolicy {
    match LOCK_POLICY.load(Ordering::Relaxed) {
        1 => LockPolicy::BestEffort,
        _ => LockPolicy::Strict,
    }
}

/// Constant-time equality of two byte strings.
///
/// Lengths are public: unequal lengths return `false` immediately.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Zero-fill with writes the compiler may not elide.
pub fn secure_zero(data: &mut [u8]) {
    data.zeroize();
}

struct Region {
    base: NonNull<u8>,
    total: usize,
    page: usize,
    data_span: usize,
}

impl Region {
    fn data_pages(&self) -> NonNull<u8> {
        // SAFETY: the first page is the leading guard; data pages follow it.
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(self.page)) }
    }

    fn trailing_guard(&self) -> NonNull<u8> {
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(self.page + self.data_span)) }
    }
}

/// Page-locked, guard-paged heap buffer of a fixed length.
pub struct SecureBuffer {
    region: Region,
    data: NonNull<u8>,
    len: usize,
    access: Cell<Access>,
    readers: Cell<usize>,
    restore: Cell<Access>,
    locked: bool,
}

// The buffer owns its mapping exclusively; moving it between threads is fine.
unsafe impl Send for SecureBuffer {}

impl SecureBuffer {
    /// Allocate `len` zeroed bytes in locked memory with read-write access.
    ///
    /// # Errors
    /// - `OutOfMemory` if the mapping cannot be created
    /// - `Lock` if guard pages cannot be protected, or if the pages cannot be
    ///   locked and the lock policy is [`LockPolicy::Strict`]
    pub fn allocate(len: usize) -> Result<Self> {
        let page = platform::page_size();
        let data_span = len.div_ceil(page).max(1) * page;
        let total = data_span
            .checked_add(2 * page)
            .ok_or(CryptoError::OutOfMemory)?;

        let base = unsafe { platform::map(total) }.map_err(|e| {
            tracing::debug!(len, error = %e, "secure mapping failed");
            CryptoError::OutOfMemory
        })?;

        let region = Region {
            base,
            total,
            page,
            data_span,
        };

        // SAFETY: `data_span >= len`, so the right-aligned start stays inside
        // the data pages.
        let data = unsafe {
            NonNull::new_unchecked(region.data_pages().as_ptr().add(data_span - len))
        };

        let mut buffer = Self {
            region,
            data,
            len,
            access: Cell::new(Access::ReadWrite),
            readers: Cell::new(0),
            restore: Cell::new(Access::ReadWrite),
            locked: false,
        };

        unsafe {
            platform::protect(buffer.region.base, page, Access::None)
                .and_then(|_| platform::protect(buffer.region.trailing_guard(), page, Access::None))
                .map_err(|e| {
                    tracing::debug!(error = %e, "guard page protection failed");
                    CryptoError::Lock("guard pages")
                })?;

            match platform::lock(buffer.region.data_pages(), data_span) {
                Ok(()) => buffer.locked = true,
                Err(e) => match lock_policy() {
                    LockPolicy::Strict => {
                        tracing::debug!(len, error = %e, "page lock refused");
                        return Err(CryptoError::Lock("lock pages"));
                    }
                    LockPolicy::BestEffort => {
                        tracing::warn!(len, error = %e, "page lock refused, keeping unlocked buffer");
                    }
                },
            }

            platform::exclude_from_dumps(buffer.region.data_pages(), data_span);
        }

        tracing::trace!(len, pages = data_span / page, "secure buffer allocated");
        Ok(buffer)
    }

    /// Allocate and copy `bytes` in.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut buffer = Self::allocate(bytes.len())?;
        buffer.write()?.copy_from_slice(bytes);
        Ok(buffer)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the pages are locked into RAM.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Current resting protection of the data pages.
    pub fn access(&self) -> Access {
        self.access.get()
    }

    /// Change page protection of the data pages.
    pub fn set_access(&mut self, access: Access) -> Result<()> {
        self.protect(access)
    }

    fn protect(&self, access: Access) -> Result<()> {
        if self.access.get() == access {
            return Ok(());
        }
        unsafe { platform::protect(self.region.data_pages(), self.region.data_span, access) }
            .map_err(|e| {
                tracing::debug!(?access, error = %e, "page protection change failed");
                CryptoError::Lock("protect pages")
            })?;
        self.access.set(access);
        Ok(())
    }

    /// Scoped read access.
    ///
    /// Raises protection to at least [`Access::Read`] while any guard is
    /// alive and restores the previous level when the last one drops.
    pub fn read(&self) -> Result<ReadGuard<'_>> {
        if self.readers.get() == 0 {
            let previous = self.access.get();
            if previous == Access::None {
                self.protect(Access::Read)?;
            }
            self.restore.set(previous);
        }
        self.readers.set(self.readers.get() + 1);
        Ok(ReadGuard { buffer: self })
    }

    /// Scoped read-write access; restores the previous level on drop.
    pub fn write(&mut self) -> Result<WriteGuard<'_>> {
        let previous = self.access.get();
        self.protect(Access::ReadWrite)?;
        Ok(WriteGuard {
            buffer: self,
            previous,
        })
    }

    /// Zero-fill the contents. Idempotent.
    pub fn clear(&mut self) -> Result<()> {
        self.write()?.zeroize();
        Ok(())
    }

    /// Constant-time comparison of the contents.
    pub fn ct_eq(&self, other: &SecureBuffer) -> Result<bool> {
        let a = self.read()?;
        let b = other.read()?;
        Ok(ct_eq(&a, &b))
    }

    /// Allocate a second locked buffer with the same contents.
    pub fn try_clone(&self) -> Result<Self> {
        let source = self.read()?;
        Self::from_slice(&source)
    }

    /// # Safety
    /// The data pages must currently be readable.
    unsafe fn bytes(&self) -> &[u8] {
        std::slice::from_raw_parts(self.data.as_ptr(), self.len)
    }

    /// # Safety
    /// The data pages must currently be writable and not aliased.
    #[allow(clippy::mut_from_ref)]
    unsafe fn bytes_mut(&self) -> &mut [u8] {
        std::slice::from_raw_parts_mut(self.data.as_ptr(), self.len)
    }

    /// Wipe the whole data span and release the page lock, leaving the
    /// mapping in place.
    fn wipe_and_unlock(&mut self) {
        let region = &self.region;
        unsafe {
            if let Err(e) = platform::protect(region.data_pages(), region.data_span, Access::ReadWrite)
            {
                tracing::error!(error = %e, "cannot make secure buffer writable for wiping");
                return;
            }
            self.access.set(Access::ReadWrite);
            std::slice::from_raw_parts_mut(region.data_pages().as_ptr(), region.data_span)
                .zeroize();
            if self.locked {
                platform::unlock(region.data_pages(), region.data_span);
                self.locked = false;
            }
        }
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.wipe_and_unlock();
        unsafe { platform::unmap(self.region.base, self.region.total) };
    }
}

impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("len", &self.len)
            .field("access", &self.access.get())
            .field("locked", &self.locked)
            .field("data", &"[REDACTED]")
            .finish()
    }
}

/// Shared view of a [`SecureBuffer`].
pub struct ReadGuard<'a> {
    buffer: &'a SecureBuffer,
}

impl Deref for ReadGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: a live read guard keeps the pages readable.
        unsafe { self.buffer.bytes() }
    }
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        let remaining = self.buffer.readers.get() - 1;
        self.buffer.readers.set(remaining);
        if remaining == 0 {
            if let Err(e) = self.buffer.protect(self.buffer.restore.get()) {
                tracing::error!(error = %e, "failed to restore secure buffer protection");
            }
        }
    }
}

/// Exclusive mutable view of a [`SecureBuffer`].
pub struct WriteGuard<'a> {
    buffer: &'a mut SecureBuffer,
    previous: Access,
}

impl Deref for WriteGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { self.buffer.bytes() }
    }
}

impl DerefMut for WriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: the guard holds the only borrow and the pages are writable.
        unsafe { self.buffer.bytes_mut() }
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.buffer.protect(self.previous) {
            tracing::error!(error = %e, "failed to restore secure buffer protection");
        }
    }
}

#[cfg(test)]
impl SecureBuffer {
    /// Run the drop-time wipe but keep the mapping alive, so a test can
    /// inspect what destruction leaves behind. Returns the data pointer,
    /// length and a closure that unmaps the region.
    fn wipe_and_leak(self) -> (NonNull<u8>, usize, impl FnOnce()) {
        let mut this = std::mem::ManuallyDrop::new(self);
        this.wipe_and_unlock();
        let data = this.data;
        let len = this.len;
        let base = this.region.base;
        let total = this.region.total;
        (data, len, move || unsafe { platform::unmap(base, total) })
    }
}
