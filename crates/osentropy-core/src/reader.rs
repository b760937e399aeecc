//! Entropy reader: validates a request and drives the selected backend.

use std::sync::Arc;

use crate::backend::{self, Backend, BackendKind};
use crate::error::Error;
use crate::host::{Host, NoHost};

/// How a read behaves when entropy is not immediately available or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadMode {
    /// Wait for the kernel pool to be seeded.
    pub blocking: bool,
    /// Return detailed errors, consult the host on signals and release the
    /// host lock around OS calls. When clear, only valid during
    /// single-threaded startup or teardown.
    pub report_errors: bool,
}

impl ReadMode {
    /// Cryptographic-grade: block until seeded, report errors.
    pub const URANDOM: Self = Self {
        blocking: true,
        report_errors: true,
    };

    /// Best effort: never block on seeding, report errors.
    pub const NONBLOCK: Self = Self {
        blocking: false,
        report_errors: true,
    };

    /// Early process startup: never block, never raise.
    pub const STARTUP: Self = Self {
        blocking: false,
        report_errors: false,
    };
}

/// Fills buffers from one backend chosen at construction time.
pub struct EntropyReader {
    backend: Box<dyn Backend>,
    host: Arc<dyn Host>,
}

impl EntropyReader {
    /// Reader over the platform backend with no host hooks.
    pub fn new() -> Self {
        Self::with_backend(backend::select())
    }

    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            host: Arc::new(NoHost),
        }
    }

    /// Replace the host hooks.
    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = host;
        self
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// See [`Backend::syscall_usable`].
    pub fn syscall_usable(&self) -> Option<bool> {
        self.backend.syscall_usable()
    }

    /// Fill `buf[..size]` with OS random bytes.
    ///
    /// `size == 0` succeeds without I/O. A negative `size`, or one larger
    /// than `buf`, is an [`Error::InvalidArgument`]. In non-reporting mode
    /// every failure is returned as [`Error::Failure`]. On error the
    /// contents of `buf` are unspecified.
    pub fn read(&self, buf: &mut [u8], size: isize, mode: ReadMode) -> Result<(), Error> {
        let result = self.read_checked(buf, size, mode);
        if mode.report_errors {
            result
        } else {
            result.map_err(|_| Error::Failure)
        }
    }

    /// Fill all of `buf`.
    pub fn fill(&self, buf: &mut [u8], mode: ReadMode) -> Result<(), Error> {
        // Slices never exceed isize::MAX bytes.
        let size = buf.len() as isize;
        self.read(buf, size, mode)
    }

    fn read_checked(&self, buf: &mut [u8], size: isize, mode: ReadMode) -> Result<(), Error> {
        if size < 0 {
            return Err(Error::InvalidArgument("negative argument not allowed"));
        }
        let size = size as usize;
        if size > buf.len() {
            return Err(Error::InvalidArgument("size exceeds buffer length"));
        }
        if size == 0 {
            return Ok(());
        }
        self.backend.fill(&mut buf[..size], mode, self.host.as_ref())
    }

    /// Release cached handles. Safe to call repeatedly.
    pub fn close(&self) {
        self.backend.close();
    }
}

impl Default for EntropyReader {
    fn default() -> Self {
        Self::new()
    }
}
