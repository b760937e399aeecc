//! Windows CryptoAPI backend.
//!
//! A verify-only provider handle is acquired on first use and kept until
//! [`Backend::close`] releases it.

use std::io;
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use windows_sys::Win32::Security::Cryptography::{
    CRYPT_VERIFYCONTEXT, CryptAcquireContextW, CryptGenRandom, CryptReleaseContext,
    PROV_RSA_FULL,
};

use super::{Backend, BackendKind, os_call};
use crate::error::Error;
use crate::host::Host;
use crate::reader::ReadMode;

/// CryptGenRandom() takes a DWORD length; stay within a signed int like the
/// rest of the Win32 API surface.
const MAX_CHUNK: usize = i32::MAX as usize;

/// Entropy backend using the OS cryptographic service provider.
pub struct CryptoService {
    // 0 means "not acquired".
    provider: Mutex<usize>,
}

impl CryptoService {
    pub fn new() -> Self {
        Self {
            provider: Mutex::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.provider.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn provider(&self) -> Result<usize, Error> {
        let mut handle = self.lock();
        if *handle == 0 {
            let mut prov: usize = 0;
            // SAFETY: `prov` is a valid out pointer; null container/provider
            // names select the default provider.
            let ok = unsafe {
                CryptAcquireContextW(
                    &mut prov,
                    ptr::null(),
                    ptr::null(),
                    PROV_RSA_FULL,
                    CRYPT_VERIFYCONTEXT,
                )
            };
            if ok == 0 {
                return Err(Error::Io(io::Error::last_os_error()));
            }
            *handle = prov;
        }
        Ok(*handle)
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CryptoService {
    fn kind(&self) -> BackendKind {
        BackendKind::CryptoService
    }

    fn fill(&self, buf: &mut [u8], mode: ReadMode, host: &dyn Host) -> Result<(), Error> {
        let prov = self.provider()?;
        for chunk in buf.chunks_mut(MAX_CHUNK) {
            os_call(mode, host, || gen_random(prov, chunk))?;
        }
        Ok(())
    }

    fn close(&self) {
        let prov = std::mem::take(&mut *self.lock());
        if prov != 0 {
            // SAFETY: `prov` came from CryptAcquireContextW and is released once.
            unsafe { CryptReleaseContext(prov, 0) };
        }
    }
}

impl Drop for CryptoService {
    fn drop(&mut self) {
        self.close();
    }
}

fn gen_random(prov: usize, chunk: &mut [u8]) -> io::Result<()> {
    // SAFETY: `chunk` is writable for `chunk.len()` bytes, which fits a DWORD.
    let ok = unsafe { CryptGenRandom(prov, chunk.len() as u32, chunk.as_mut_ptr()) };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
