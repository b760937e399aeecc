//! Device-file backend with a validated descriptor cache.
//!
//! In error-reporting mode the descriptor is opened once and cached together
//! with its `(st_dev, st_ino)` identity. Before every reuse the descriptor is
//! re-stat'ed: if some other part of the process closed it and the number now
//! refers to a different file, the cache entry is forgotten **without closing
//! the descriptor** (it belongs to whoever reused the number) and the device
//! is reopened.
//!
//! Non-reporting mode bypasses the cache entirely and uses a private
//! descriptor per call.

use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::{self, Read};
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use super::{Backend, BackendKind, on_interrupt, os_call};
use crate::error::Error;
use crate::host::Host;
use crate::reader::ReadMode;

/// Default entropy device.
pub const DEFAULT_DEVICE: &str = "/dev/urandom";

const NOT_FOUND: &str = "/dev/urandom (or equivalent) not found";

/// Cached descriptor and the identity it had when it was validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedFd {
    fd: RawFd,
    dev: u64,
    ino: u64,
}

/// Entropy backend reading from a device file such as `/dev/urandom`.
pub struct DeviceFile {
    path: PathBuf,
    // Held only to inspect or publish the entry, never across open/read.
    slot: Mutex<Option<CachedFd>>,
}

impl DeviceFile {
    /// Backend reading [`DEFAULT_DEVICE`].
    pub fn new() -> Self {
        Self::with_path(DEFAULT_DEVICE)
    }

    /// Backend reading an arbitrary path.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            slot: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Descriptor currently held by the cache, if any.
    pub fn cached_fd(&self) -> Option<RawFd> {
        self.lock().map(|c| c.fd)
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedFd>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return a validated descriptor for the device, opening it if needed.
    fn acquire(&self, mode: ReadMode, host: &dyn Host) -> Result<RawFd, Error> {
        let cached = *self.lock();
        if let Some(cached) = cached {
            match identity(cached.fd) {
                Ok(id) if id == (cached.dev, cached.ino) => return Ok(cached.fd),
                _ => {
                    warn!(
                        "descriptor {} no longer refers to {}; reopening",
                        cached.fd,
                        self.path.display()
                    );
                    self.forget(cached);
                }
            }
        }

        let file = self.open(mode, host)?;
        let (dev, ino) = identity(file.as_raw_fd())?;

        let mut slot = self.lock();
        if let Some(winner) = *slot {
            // Another thread published a descriptor while we were opening.
            drop(file);
            return Ok(winner.fd);
        }
        let fd = file.into_raw_fd();
        *slot = Some(CachedFd { fd, dev, ino });
        debug!("cached {} as descriptor {fd}", self.path.display());
        Ok(fd)
    }

    /// Drop `stale` from the cache. The descriptor itself is left open.
    fn forget(&self, stale: CachedFd) {
        let mut slot = self.lock();
        if *slot == Some(stale) {
            *slot = None;
        }
    }

    fn open(&self, mode: ReadMode, host: &dyn Host) -> Result<File, Error> {
        let path = CString::new(self.path.as_os_str().as_bytes())
            .map_err(|_| Error::InvalidArgument("device path contains a NUL byte"))?;
        loop {
            match os_call(mode, host, || open_fd(&path)) {
                Ok(file) => return Ok(file),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => on_interrupt(mode, host)?,
                Err(e) => {
                    return Err(match e.raw_os_error() {
                        Some(libc::ENOENT | libc::ENXIO | libc::ENODEV | libc::EACCES) => {
                            Error::Unsupported(NOT_FOUND)
                        }
                        _ => Error::Io(e),
                    });
                }
            }
        }
    }

    fn read_cached(&self, buf: &mut [u8], mode: ReadMode, host: &dyn Host) -> Result<(), Error> {
        let fd = self.acquire(mode, host)?;
        let mut filled = 0;
        while filled < buf.len() {
            let dest = &mut buf[filled..];
            match os_call(mode, host, || read_fd(fd, dest)) {
                Ok(0) => {
                    return Err(Error::Runtime(format!(
                        "Failed to read {} bytes from {}",
                        buf.len() - filled,
                        self.path.display()
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => on_interrupt(mode, host)?,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    }

    fn read_private(&self, buf: &mut [u8]) -> Result<(), Error> {
        let mut file = loop {
            match File::open(&self.path) {
                Ok(file) => break file,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return Err(Error::Failure),
            }
        };
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::Failure),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return Err(Error::Failure),
            }
        }
        Ok(())
    }
}

impl Default for DeviceFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for DeviceFile {
    fn kind(&self) -> BackendKind {
        BackendKind::DeviceFile
    }

    fn fill(&self, buf: &mut [u8], mode: ReadMode, host: &dyn Host) -> Result<(), Error> {
        if mode.report_errors {
            self.read_cached(buf, mode, host)
        } else {
            self.read_private(buf)
        }
    }

    fn close(&self) {
        if let Some(cached) = self.lock().take() {
            // SAFETY: the descriptor was published by `acquire` from an owned
            // `File` and nothing else in this crate closes it.
            drop(unsafe { OwnedFd::from_raw_fd(cached.fd) });
        }
    }
}

impl Drop for DeviceFile {
    fn drop(&mut self) {
        self.close();
    }
}

/// `(st_dev, st_ino)` of an open descriptor.
fn identity(fd: RawFd) -> io::Result<(u64, u64)> {
    let mut st = MaybeUninit::<libc::stat>::uninit();
    // SAFETY: fstat only writes into the provided stat buffer; an invalid
    // descriptor yields EBADF rather than undefined behavior.
    let ret = unsafe { libc::fstat(fd, st.as_mut_ptr()) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: fstat returned 0, so the buffer is initialized.
    let st = unsafe { st.assume_init() };
    Ok((st.st_dev as u64, st.st_ino as u64))
}

fn open_fd(path: &CStr) -> io::Result<File> {
    // SAFETY: `path` is NUL-terminated and outlives the call.
    let fd = unsafe { libc::open(path.as_ptr(), libc::O_RDONLY | libc::O_CLOEXEC) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` was just returned by open and has no other owner.
    Ok(unsafe { File::from_raw_fd(fd) })
}

fn read_fd(fd: RawFd, dest: &mut [u8]) -> io::Result<usize> {
    // SAFETY: `dest` is a valid writable region of `dest.len()` bytes.
    let n = unsafe { libc::read(fd, dest.as_mut_ptr().cast(), dest.len()) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}
