//! Platform entropy backends.
//!
//! Every backend implements the [`Backend`] trait. Exactly one is chosen per
//! target by [`select`]; there is no runtime fallback between platforms, only
//! within a backend's own failure modes (the kernel syscall backend falls back
//! to the device file).
//!
//! | Target                         | Backend |
//! |--------------------------------|---------|
//! | Windows                        | `CryptoService` (CryptGenRandom) |
//! | macOS, iOS, OpenBSD, FreeBSD   | `GetEntropy` (getentropy) |
//! | Linux, Android, Solaris, illumos | `KernelSyscall` (getrandom) → `DeviceFile` |
//! | other Unix                     | `DeviceFile` (`/dev/urandom`) |

#[cfg(windows)]
mod crypto_service;
#[cfg(unix)]
mod device;
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "openbsd",
    target_os = "freebsd"
))]
mod getentropy;
#[cfg(unix)]
mod syscall;

#[cfg(windows)]
pub use crypto_service::CryptoService;
#[cfg(unix)]
pub use device::{DEFAULT_DEVICE, DeviceFile};
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "openbsd",
    target_os = "freebsd"
))]
pub use getentropy::GetEntropy;
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "solaris",
    target_os = "illumos"
))]
pub use syscall::KernelSyscall;

use crate::error::Error;
use crate::host::{Host, without_lock};
use crate::reader::ReadMode;

/// Strategy used to source bytes from the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Kernel random-bytes syscall (`getrandom(2)`), device file fallback.
    KernelSyscall,
    /// Read from a device file exposing the kernel pool.
    DeviceFile,
    /// OS cryptographic service provider handle.
    CryptoService,
    /// One-shot OS entropy call (`getentropy(3)`).
    OsEntropyCall,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KernelSyscall => write!(f, "kernel_syscall"),
            Self::DeviceFile => write!(f, "device_file"),
            Self::CryptoService => write!(f, "crypto_service"),
            Self::OsEntropyCall => write!(f, "os_entropy_call"),
        }
    }
}

/// Trait that every entropy backend must implement.
pub trait Backend: Send + Sync {
    /// Which strategy this backend uses.
    fn kind(&self) -> BackendKind;

    /// Fill all of `buf` with OS random bytes.
    ///
    /// `buf` is never empty; the reader handles zero-length requests. Errors
    /// carry full detail; the reader collapses them in non-reporting mode.
    fn fill(&self, buf: &mut [u8], mode: ReadMode, host: &dyn Host) -> Result<(), Error>;

    /// Release any cached handle. Must be idempotent.
    fn close(&self) {}

    /// Whether the preferred kernel syscall is still considered usable.
    ///
    /// `None` for backends without a capability probe.
    fn syscall_usable(&self) -> Option<bool> {
        None
    }
}

/// Pick the backend for the current target.
#[cfg(windows)]
pub fn select() -> Box<dyn Backend> {
    Box::new(CryptoService::new())
}

/// Pick the backend for the current target.
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "openbsd",
    target_os = "freebsd"
))]
pub fn select() -> Box<dyn Backend> {
    Box::new(GetEntropy)
}

/// Pick the backend for the current target.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "solaris",
    target_os = "illumos"
))]
pub fn select() -> Box<dyn Backend> {
    Box::new(KernelSyscall::new())
}

/// Pick the backend for the current target.
#[cfg(all(
    unix,
    not(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "openbsd",
        target_os = "freebsd",
        target_os = "linux",
        target_os = "android",
        target_os = "solaris",
        target_os = "illumos"
    ))
))]
pub fn select() -> Box<dyn Backend> {
    Box::new(DeviceFile::new())
}

/// Decide what to do after a read was interrupted by a signal.
///
/// Non-reporting mode never consults the host and always retries.
#[cfg(unix)]
pub(crate) fn on_interrupt(mode: ReadMode, host: &dyn Host) -> Result<(), Error> {
    if mode.report_errors && host.check_signals() {
        return Err(Error::Interrupted);
    }
    Ok(())
}

/// Run an OS call, releasing the host lock only in error-reporting mode.
pub(crate) fn os_call<T>(mode: ReadMode, host: &dyn Host, mut call: impl FnMut() -> T) -> T {
    if mode.report_errors {
        without_lock(host, call)
    } else {
        call()
    }
}
