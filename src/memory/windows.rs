//! Страницы памяти для Windows: VirtualAlloc/VirtualProtect/VirtualLock

use std::io;
use std::ptr::NonNull;

use windows::Win32::System::Memory::{
    VirtualAlloc, VirtualFree, VirtualLock, VirtualProtect, VirtualUnlock, MEM_COMMIT,
    MEM_RELEASE, MEM_RESERVE, PAGE_NOACCESS, PAGE_PROTECTION_FLAGS, PAGE_READONLY,
    PAGE_READWRITE,
};
use windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

use super::Access;

pub(super) fn page_size() -> usize {
    let mut info = SYSTEM_INFO::default();
    unsafe { GetSystemInfo(&mut info) };
    if info.dwPageSize == 0 {
        4096
    } else {
        info.dwPageSize as usize
    }
}

pub(super) unsafe fn map(len: usize) -> io::Result<NonNull<u8>> {
    let ptr = VirtualAlloc(None, len, MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE);
    NonNull::new(ptr.cast::<u8>()).ok_or_else(io::Error::last_os_error)
}

pub(super) unsafe fn unmap(ptr: NonNull<u8>, _len: usize) {
    let _ = VirtualFree(ptr.as_ptr().cast(), 0, MEM_RELEASE);
}

pub(super) unsafe fn protect(ptr: NonNull<u8>, len: usize, access: Access) -> io::Result<()> {
    let flags = match access {
        Access::None => PAGE_NOACCESS,
        Access::Read => PAGE_READONLY,
        Access::ReadWrite => PAGE_READWRITE,
    };
    let mut old = PAGE_PROTECTION_FLAGS::default();
    VirtualProtect(ptr.as_ptr().cast(), len, flags, &mut old)
        .map_err(|e| io::Error::from_raw_os_error(e.code().0))
}

pub(super) unsafe fn lock(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    VirtualLock(ptr.as_ptr().cast(), len).map_err(|e| io::Error::from_raw_os_error(e.code().0))
}

pub(super) unsafe fn unlock(ptr: NonNull<u8>, len: usize) {
    let _ = VirtualUnlock(ptr.as_ptr().cast(), len);
}

// Windows не даёт исключить страницы из дампа на уровне процесса
pub(super) unsafe fn exclude_from_dumps(_ptr: NonNull<u8>, _len: usize) {}
