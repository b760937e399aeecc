//! Process context owning the reader and the hash secret.
//!
//! [`Entropy`] bundles everything that used to be process-wide state: the
//! backend (with its capability flag and descriptor cache) and the secret.
//! Tests and embedders build their own instances; the free functions at the
//! crate root use a lazily created global one.

use std::sync::{Arc, OnceLock};

use log::error;

use crate::backend::{Backend, BackendKind};
use crate::config::HashSeed;
use crate::error::Error;
use crate::host::Host;
use crate::reader::{EntropyReader, ReadMode};
use crate::secret::{HashSecret, SecretCell};

/// Entropy reader plus write-once hash secret.
pub struct Entropy {
    reader: EntropyReader,
    secret: SecretCell,
}

impl Entropy {
    /// Context over the platform backend.
    pub fn new() -> Self {
        Self::from_reader(EntropyReader::new())
    }

    /// Context over a specific backend.
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self::from_reader(EntropyReader::with_backend(backend))
    }

    pub fn from_reader(reader: EntropyReader) -> Self {
        Self {
            reader,
            secret: SecretCell::new(),
        }
    }

    /// Replace the host hooks.
    pub fn with_host(self, host: Arc<dyn Host>) -> Self {
        Self {
            reader: self.reader.with_host(host),
            secret: self.secret,
        }
    }

    pub fn reader(&self) -> &EntropyReader {
        &self.reader
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.reader.backend_kind()
    }

    /// Blocking, error-reporting read of all of `buf`.
    pub fn urandom(&self, buf: &mut [u8]) -> Result<(), Error> {
        self.reader.fill(buf, ReadMode::URANDOM)
    }

    /// Non-blocking, error-reporting read of all of `buf`.
    ///
    /// May return weaker entropy if the kernel pool is not seeded yet.
    pub fn urandom_nonblock(&self, buf: &mut [u8]) -> Result<(), Error> {
        self.reader.fill(buf, ReadMode::NONBLOCK)
    }

    /// Initialize the hash secret from the environment override.
    ///
    /// No-op once initialized; the environment is not read again.
    pub fn init_secret(&self) -> Result<&HashSecret, Error> {
        if let Some(secret) = self.secret.get() {
            return Ok(secret);
        }
        self.init_secret_with(HashSeed::from_env()?)
    }

    /// Initialize the hash secret from an explicit seed.
    pub fn init_secret_with(&self, seed: HashSeed) -> Result<&HashSecret, Error> {
        self.secret.init(seed, &self.reader)
    }

    pub fn secret(&self) -> Option<&HashSecret> {
        self.secret.get()
    }

    /// Release cached descriptors/handles. Safe to call repeatedly.
    ///
    /// Must not race with reads on other threads.
    pub fn close(&self) {
        self.reader.close();
    }
}

impl Default for Entropy {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<Entropy> = OnceLock::new();

/// The process-wide context.
pub fn global() -> &'static Entropy {
    GLOBAL.get_or_init(Entropy::new)
}

/// Fill `buf` from the OS RNG, blocking until the kernel pool is seeded.
pub fn urandom(buf: &mut [u8]) -> Result<(), Error> {
    global().urandom(buf)
}

/// Fill `buf` from the OS RNG without waiting for the kernel pool.
pub fn urandom_nonblock(buf: &mut [u8]) -> Result<(), Error> {
    global().urandom_nonblock(buf)
}

/// Startup hook: initialize the process hash secret.
///
/// Idempotent. Aborts the process if the seed override is malformed or no
/// entropy is available at all.
pub fn init_random() -> &'static HashSecret {
    match try_init_random() {
        Ok(secret) => secret,
        Err(e) => {
            error!("fatal: {e}");
            eprintln!("Fatal error: {e}");
            std::process::abort();
        }
    }
}

/// [`init_random`] without the abort.
pub fn try_init_random() -> Result<&'static HashSecret, Error> {
    global().init_secret()
}

/// The process hash secret, if [`init_random`] has run.
pub fn hash_secret() -> Option<&'static HashSecret> {
    GLOBAL.get().and_then(Entropy::secret)
}

/// Teardown hook: release the cached descriptor or provider handle.
///
/// Safe to call twice, or without a prior [`init_random`].
pub fn fini_random() {
    if let Some(ctx) = GLOBAL.get() {
        ctx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_contexts_are_independent() {
        let a = Entropy::new();
        let b = Entropy::new();
        a.init_secret_with(HashSeed::Fixed(1)).unwrap();
        assert!(b.secret().is_none());
        b.init_secret_with(HashSeed::Fixed(2)).unwrap();
        assert_ne!(a.secret(), b.secret());
    }

    #[test]
    fn test_reinit_is_noop() {
        let ctx = Entropy::new();
        let first = *ctx.init_secret_with(HashSeed::Fixed(0)).unwrap();
        let again = *ctx.init_secret_with(HashSeed::Random).unwrap();
        assert_eq!(first, again);
        assert_eq!(again, HashSecret::ZERO);
    }

    #[test]
    fn test_random_secret_is_randomized() {
        let ctx = Entropy::new();
        let secret = ctx.init_secret_with(HashSeed::Random).unwrap();
        assert!(secret.is_randomized());
    }

    #[test]
    fn test_close_twice() {
        let ctx = Entropy::new();
        let mut buf = [0u8; 16];
        ctx.urandom(&mut buf).unwrap();
        ctx.close();
        ctx.close();
        ctx.urandom(&mut buf).unwrap();
    }

    #[test]
    fn test_global_entry_points() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        urandom(&mut a).unwrap();
        urandom_nonblock(&mut b).unwrap();
        assert_ne!(a, b);
        urandom(&mut []).unwrap();
    }
}
