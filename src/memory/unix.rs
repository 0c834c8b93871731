//! Unix page primitives: mmap/mprotect/mlock

use std::io;
use std::ptr::NonNull;

use super::Access;

pub(super) fn page_size() -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        4096
    } else {
        size as usize
    }
}

/// Map `len` bytes of zeroed, private, read-write memory.
pub(super) unsafe fn map(len: usize) -> io::Result<NonNull<u8>> {
    let ptr = libc::mmap(
        std::ptr::null_mut(),
        len,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
    );
    if ptr == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    NonNull::new(ptr.cast::<u8>()).ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))
}

pub(super) unsafe fn unmap(ptr: NonNull<u8>, len: usize) {
    libc::munmap(ptr.as_ptr().cast(), len);
}

pub(super) unsafe fn protect(ptr: NonNull<u8>, len: usize, access: Access) -> io::Result<()> {
    let prot = match access {
        Access::None => libc::PROT_NONE,
        Access::Read => libc::PROT_READ,
        Access::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
    };
    if libc::mprotect(ptr.as_ptr().cast(), len, prot) == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Pin the pages in RAM so they never reach swap.
pub(super) unsafe fn lock(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    if libc::mlock(ptr.as_ptr() as *const libc::c_void, len) == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

pub(super) unsafe fn unlock(ptr: NonNull<u8>, len: usize) {
    libc::munlock(ptr.as_ptr() as *const libc::c_void, len);
}

/// Keep the pages out of core dumps.
#[cfg(target_os = "linux")]
pub(super) unsafe fn exclude_from_dumps(ptr: NonNull<u8>, len: usize) {
    libc::madvise(ptr.as_ptr().cast(), len, libc::MADV_DONTDUMP);
}

#[cfg(not(target_os = "linux"))]
pub(super) unsafe fn exclude_from_dumps(_ptr: NonNull<u8>, _len: usize) {}
