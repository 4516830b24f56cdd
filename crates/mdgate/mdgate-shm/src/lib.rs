//! Region mapper (§4.3): create/open/close/unlink of a named POSIX shared
//! memory region.
//!
//! This is the only crate that talks to the OS. It knows nothing about the
//! gateway's header/entry layout — callers hand it a byte count and get
//! back a raw mapped pointer plus length; `mdgate-writer`/`mdgate-reader`
//! bind that memory to `mdgate_abi::Header`/`Entry`.

use std::ffi::CString;
use std::fs::File;
use std::os::fd::FromRawFd;

use memmap2::{Mmap, MmapMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShmError {
    #[error("invalid region name {0:?}: must be non-empty and start with '/'")]
    InvalidName(String),

    #[error("symbol_count out of range: {0}")]
    InvalidSymbolCount(u32),

    #[error("platform I/O error (errno {errno}): {source}")]
    PlatformIo {
        errno: i32,
        #[source]
        source: std::io::Error,
    },
}

impl ShmError {
    fn from_errno() -> Self {
        let err = std::io::Error::last_os_error();
        let errno = err.raw_os_error().unwrap_or(-1);
        ShmError::PlatformIo { errno, source: err }
    }
}

fn validate_name(name: &str) -> Result<CString, ShmError> {
    if name.is_empty() || !name.starts_with('/') {
        return Err(ShmError::InvalidName(name.to_string()));
    }
    CString::new(name).map_err(|_| ShmError::InvalidName(name.to_string()))
}

fn shm_open_raw(name: &str, oflag: libc::c_int, mode: libc::mode_t) -> Result<File, ShmError> {
    let c_name = validate_name(name)?;
    let fd = unsafe { libc::shm_open(c_name.as_ptr(), oflag, mode as libc::c_uint) };
    if fd < 0 {
        return Err(ShmError::from_errno());
    }
    // SAFETY: `shm_open` returned a valid, owned file descriptor.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// A writable mapping, owning the region's lifetime while this handle is
/// alive. Dropping it unmaps; it never unlinks (use `unlink` explicitly).
pub struct ShmRegionMut {
    _file: File,
    mmap: MmapMut,
}

impl ShmRegionMut {
    /// `shm_open(O_CREAT|O_RDWR) + ftruncate + mmap`. Fails if the name is
    /// malformed or any syscall fails; the region, if created, is left at
    /// `size_bytes` even on a later mmap failure (matches the C original's
    /// "create then bind" split).
    pub fn create(name: &str, size_bytes: u64) -> Result<Self, ShmError> {
        let file = shm_open_raw(name, libc::O_CREAT | libc::O_RDWR, 0o666)?;
        if unsafe { libc::ftruncate(std::os::fd::AsRawFd::as_raw_fd(&file), size_bytes as libc::off_t) } != 0 {
            return Err(ShmError::from_errno());
        }
        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(|e| ShmError::PlatformIo {
            errno: e.raw_os_error().unwrap_or(-1),
            source: e,
        })?;
        Ok(Self { _file: file, mmap })
    }

    /// Opens a pre-existing region read-write (writer re-attach, §4.3),
    /// discovering its size from the region's own metadata (`fstat`).
    pub fn open_rw(name: &str) -> Result<Self, ShmError> {
        let file = shm_open_raw(name, libc::O_RDWR, 0o666)?;
        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(|e| ShmError::PlatformIo {
            errno: e.raw_os_error().unwrap_or(-1),
            source: e,
        })?;
        Ok(Self { _file: file, mmap })
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.mmap.as_mut_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

/// A read-only mapping, used by readers (§4.5).
pub struct ShmRegion {
    _file: File,
    mmap: Mmap,
}

impl ShmRegion {
    /// Opens an existing region read-only.
    pub fn open_ro(name: &str) -> Result<Self, ShmError> {
        let file = shm_open_raw(name, libc::O_RDONLY, 0o666)?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ShmError::PlatformIo {
            errno: e.raw_os_error().unwrap_or(-1),
            source: e,
        })?;
        Ok(Self { _file: file, mmap })
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.mmap.as_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

/// `shm_unlink(name)`. A no-op is not available on POSIX (unlike the
/// Windows original, §4.3) — unlinking an absent name is still an error,
/// surfaced to the caller as usual.
pub fn unlink(name: &str) -> Result<(), ShmError> {
    let c_name = validate_name(name)?;
    if unsafe { libc::shm_unlink(c_name.as_ptr()) } != 0 {
        return Err(ShmError::from_errno());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("/mdgate_shm_test_{tag}_{}", std::process::id())
    }

    #[test]
    fn create_then_open_rw_round_trips_bytes() {
        let name = unique_name("rw");
        {
            let mut region = ShmRegionMut::create(&name, 4096).unwrap();
            assert_eq!(region.len(), 4096);
            unsafe {
                let p = region.as_mut_ptr();
                *p.add(0) = 0xAB;
                *p.add(4095) = 0xCD;
            }
        }
        {
            let region = ShmRegion::open_ro(&name).unwrap();
            assert_eq!(region.len(), 4096);
            unsafe {
                assert_eq!(*region.as_ptr().add(0), 0xAB);
                assert_eq!(*region.as_ptr().add(4095), 0xCD);
            }
        }
        unlink(&name).unwrap();
    }

    #[test]
    fn name_without_leading_slash_is_rejected() {
        let err = ShmRegionMut::create("no_leading_slash", 4096);
        assert!(matches!(err, Err(ShmError::InvalidName(_))));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = ShmRegionMut::create("", 4096);
        assert!(matches!(err, Err(ShmError::InvalidName(_))));
    }

    #[test]
    fn opening_nonexistent_region_fails() {
        let name = unique_name("missing");
        let err = ShmRegion::open_ro(&name);
        assert!(matches!(err, Err(ShmError::PlatformIo { .. })));
    }

    #[test]
    fn unlink_removes_name_binding() {
        let name = unique_name("unlink");
        ShmRegionMut::create(&name, 4096).unwrap();
        unlink(&name).unwrap();
        let err = ShmRegion::open_ro(&name);
        assert!(matches!(err, Err(ShmError::PlatformIo { .. })));
    }
}
