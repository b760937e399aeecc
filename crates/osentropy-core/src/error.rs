//! Error taxonomy for entropy acquisition.
//!
//! Every fallible operation returns [`Error`]. In error-reporting mode the
//! variant carries as much detail as the OS gave us; in non-reporting mode
//! (early startup) every failure collapses to [`Error::Failure`].

use std::fmt;
use std::io;

/// Discriminant of an [`Error`], convenient for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Negative or out-of-bounds request size.
    InvalidArgument,
    /// No entropy device on this system.
    Unsupported,
    /// Kernel pool not seeded yet for a non-blocking request.
    ///
    /// Handled inside the reader by falling back to the device file; never
    /// returned by the public entry points.
    TransientUnavailable,
    /// The host asked to abort after a signal interrupted a read.
    Interrupted,
    /// Underlying OS error.
    Io,
    /// A logical invariant was violated (e.g. the device hit EOF).
    Runtime,
    /// Malformed seed override or no entropy at all during startup.
    FatalConfiguration,
    /// Failure in non-reporting mode, no detail attached.
    Failure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid_argument"),
            Self::Unsupported => write!(f, "unsupported"),
            Self::TransientUnavailable => write!(f, "transient_unavailable"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Io => write!(f, "io"),
            Self::Runtime => write!(f, "runtime"),
            Self::FatalConfiguration => write!(f, "fatal_configuration"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Error returned by the byte-sourcing entry points and the secret initializer.
#[derive(Debug)]
pub enum Error {
    /// The requested size was negative or larger than the buffer.
    InvalidArgument(&'static str),
    /// The entropy device does not exist or cannot be opened.
    Unsupported(&'static str),
    /// A signal interrupted the read and the host wants to abort.
    Interrupted,
    /// The OS reported an error; the code is preserved.
    Io(io::Error),
    /// A logical invariant was violated.
    Runtime(String),
    /// Startup cannot proceed.
    FatalConfiguration(String),
    /// Non-reporting mode failure.
    Failure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Interrupted => ErrorKind::Interrupted,
            Self::Io(_) => ErrorKind::Io,
            Self::Runtime(_) => ErrorKind::Runtime,
            Self::FatalConfiguration(_) => ErrorKind::FatalConfiguration,
            Self::Failure => ErrorKind::Failure,
        }
    }

    /// OS error code, if the failure came from the OS.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Unsupported(msg) => write!(f, "not implemented: {msg}"),
            Self::Interrupted => write!(f, "interrupted by signal"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Runtime(msg) => write!(f, "{msg}"),
            Self::FatalConfiguration(msg) => write!(f, "{msg}"),
            Self::Failure => write!(f, "failed to get random bytes"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
