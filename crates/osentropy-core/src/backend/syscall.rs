//! Kernel `getrandom(2)` backend with a one-shot capability probe.
//!
//! The syscall is tried first while the probe flag says it works. `ENOSYS`
//! (kernel too old) or `EPERM` (blocked by seccomp) clears the flag for the
//! rest of the process lifetime and the call is served from the device file.
//! `EAGAIN` on a non-blocking, non-reporting request means the kernel pool is
//! not seeded yet: that single call falls back without touching the flag.

#![cfg_attr(
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "solaris",
        target_os = "illumos"
    )),
    allow(dead_code)
)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use super::{Backend, BackendKind, DeviceFile, on_interrupt, os_call};
use crate::error::Error;
use crate::host::Host;
use crate::reader::ReadMode;

/// Raw syscall: fill `buf`, non-blocking if the flag is set.
pub(crate) type GetrandomFn = fn(buf: &mut [u8], nonblocking: bool) -> io::Result<usize>;

/// Outcome of one pass through the syscall loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Filled,
    /// Syscall unusable for this call; serve it from the device file.
    Unavailable,
}

/// Entropy backend using the kernel random-bytes syscall.
pub struct KernelSyscall {
    // Monotonic: only ever goes true -> false. Racing readers may issue a few
    // extra failing syscalls before they observe the store.
    works: AtomicBool,
    getrandom: GetrandomFn,
    max_chunk: usize,
    fallback: DeviceFile,
}

impl KernelSyscall {
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "solaris",
        target_os = "illumos"
    ))]
    pub fn new() -> Self {
        Self::with_getrandom(sys_getrandom, MAX_CHUNK, DeviceFile::new())
    }

    pub(crate) fn with_getrandom(
        getrandom: GetrandomFn,
        max_chunk: usize,
        fallback: DeviceFile,
    ) -> Self {
        Self {
            works: AtomicBool::new(true),
            getrandom,
            max_chunk,
            fallback,
        }
    }

    fn try_getrandom(
        &self,
        buf: &mut [u8],
        mode: ReadMode,
        host: &dyn Host,
    ) -> Result<Attempt, Error> {
        if !self.works.load(Ordering::Relaxed) {
            return Ok(Attempt::Unavailable);
        }

        let mut filled = 0;
        while filled < buf.len() {
            let end = buf.len().min(filled + self.max_chunk);
            let dest = &mut buf[filled..end];
            let err = match os_call(mode, host, || (self.getrandom)(dest, !mode.blocking)) {
                Ok(n) => {
                    filled += n;
                    continue;
                }
                Err(e) => e,
            };

            match err.raw_os_error() {
                Some(libc::ENOSYS | libc::EPERM) => {
                    warn!("getrandom() unavailable ({err}); falling back to the device file");
                    self.works.store(false, Ordering::Relaxed);
                    return Ok(Attempt::Unavailable);
                }
                Some(libc::EAGAIN) if !mode.report_errors && !mode.blocking => {
                    debug!("kernel entropy pool not seeded yet; reading the device file");
                    return Ok(Attempt::Unavailable);
                }
                Some(libc::EINTR) => on_interrupt(mode, host)?,
                _ => return Err(Error::Io(err)),
            }
        }
        Ok(Attempt::Filled)
    }
}

impl Backend for KernelSyscall {
    fn kind(&self) -> BackendKind {
        BackendKind::KernelSyscall
    }

    fn fill(&self, buf: &mut [u8], mode: ReadMode, host: &dyn Host) -> Result<(), Error> {
        match self.try_getrandom(buf, mode, host)? {
            Attempt::Filled => Ok(()),
            Attempt::Unavailable => self.fallback.fill(buf, mode, host),
        }
    }

    fn close(&self) {
        self.fallback.close();
    }

    fn syscall_usable(&self) -> Option<bool> {
        Some(self.works.load(Ordering::Relaxed))
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
const MAX_CHUNK: usize = isize::MAX as usize;

// getrandom() on Solaris returns at most 1024 bytes per call.
#[cfg(any(target_os = "solaris", target_os = "illumos"))]
const MAX_CHUNK: usize = 1024;

#[cfg(any(target_os = "linux", target_os = "android"))]
fn sys_getrandom(buf: &mut [u8], nonblocking: bool) -> io::Result<usize> {
    let flags = if nonblocking { libc::GRND_NONBLOCK } else { 0 };
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes. The raw syscall
    // is used so that builds against an old libc still work.
    let n = unsafe { libc::syscall(libc::SYS_getrandom, buf.as_mut_ptr(), buf.len(), flags) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
fn sys_getrandom(buf: &mut [u8], nonblocking: bool) -> io::Result<usize> {
    let flags = if nonblocking { libc::GRND_NONBLOCK } else { 0 };
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
    let n = unsafe { libc::getrandom(buf.as_mut_ptr().cast(), buf.len(), flags) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}
