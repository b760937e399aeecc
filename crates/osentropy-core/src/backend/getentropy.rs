//! `getentropy(3)` backend for macOS, iOS, OpenBSD and FreeBSD.

use std::io;

use super::{Backend, BackendKind, os_call};
use crate::error::Error;
use crate::host::Host;
use crate::reader::ReadMode;

/// getentropy() refuses requests larger than 256 bytes.
const MAX_CHUNK: usize = 256;

/// Entropy backend using the OS one-shot entropy call.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetEntropy;

impl Backend for GetEntropy {
    fn kind(&self) -> BackendKind {
        BackendKind::OsEntropyCall
    }

    fn fill(&self, buf: &mut [u8], mode: ReadMode, host: &dyn Host) -> Result<(), Error> {
        for chunk in buf.chunks_mut(MAX_CHUNK) {
            os_call(mode, host, || getentropy(chunk))?;
        }
        Ok(())
    }
}

fn getentropy(chunk: &mut [u8]) -> io::Result<()> {
    // SAFETY: `chunk` is writable for `chunk.len()` bytes and at most 256 long.
    let res = unsafe { libc::getentropy(chunk.as_mut_ptr().cast(), chunk.len()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
