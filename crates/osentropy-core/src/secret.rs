//! Hash-randomization secret.
//!
//! The secret is 24 bytes. Consumers view it as:
//! - bytes `0..8`, `8..16`: SipHash keys `k0`, `k1` (little-endian);
//! - bytes `16..24`: auxiliary salt for the FNV/DJBX33A suffix and the XML
//!   parser hash salt.
//!
//! It is computed into a local buffer and published at most once, so a failed
//! initialization never leaves a partially written secret behind.

use std::fmt;
use std::sync::OnceLock;

use log::debug;

use crate::config::HashSeed;
use crate::error::Error;
use crate::lcg;
use crate::reader::{EntropyReader, ReadMode};

/// Size of the hash secret in bytes.
pub const SECRET_SIZE: usize = 24;

/// Fixed-size secret mixed into the host's hash functions.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashSecret([u8; SECRET_SIZE]);

impl HashSecret {
    /// All-zero secret: hash randomization disabled.
    pub const ZERO: Self = Self([0; SECRET_SIZE]);

    pub fn from_bytes(bytes: [u8; SECRET_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_SIZE] {
        &self.0
    }

    /// SipHash `(k0, k1)`.
    pub fn siphash_keys(&self) -> (u64, u64) {
        (self.word(0), self.word(1))
    }

    /// Salt shared by the auxiliary hash functions.
    pub fn salt(&self) -> u64 {
        self.word(2)
    }

    /// `false` when the secret is all zero.
    pub fn is_randomized(&self) -> bool {
        *self != Self::ZERO
    }

    fn word(&self, i: usize) -> u64 {
        let mut w = [0u8; 8];
        w.copy_from_slice(&self.0[i * 8..i * 8 + 8]);
        u64::from_le_bytes(w)
    }
}

// Keep the secret out of logs and panic messages.
impl fmt::Debug for HashSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashSecret")
            .field("randomized", &self.is_randomized())
            .finish_non_exhaustive()
    }
}

/// Compute a secret for `seed`.
///
/// `HashSeed::Random` reads the OS in startup mode (non-blocking,
/// non-reporting); any failure there is fatal.
pub fn generate(seed: HashSeed, reader: &EntropyReader) -> Result<HashSecret, Error> {
    let mut bytes = [0u8; SECRET_SIZE];
    match seed {
        HashSeed::Fixed(0) => {}
        HashSeed::Fixed(n) => lcg::fill(n, &mut bytes),
        HashSeed::Random => reader
            .fill(&mut bytes, ReadMode::STARTUP)
            .map_err(|_| {
                Error::FatalConfiguration("failed to get random numbers to initialize".into())
            })?,
    }
    Ok(HashSecret(bytes))
}

/// Write-once holder for the process secret.
///
/// `Uninitialized -> Initialized` is the only transition. Concurrent
/// initializers agree on the value because they share the seed path; the
/// first to publish wins and the rest observe its value.
#[derive(Debug, Default)]
pub struct SecretCell {
    cell: OnceLock<HashSecret>,
}

impl SecretCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<&HashSecret> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Initialize with `seed`; a no-op returning the published secret if
    /// already initialized.
    pub fn init(&self, seed: HashSeed, reader: &EntropyReader) -> Result<&HashSecret, Error> {
        if let Some(secret) = self.cell.get() {
            return Ok(secret);
        }
        let secret = generate(seed, reader)?;
        debug!("hash secret initialized (seed: {seed})");
        Ok(self.cell.get_or_init(|| secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendKind};
    use crate::error::ErrorKind;
    use crate::host::Host;

    struct Broken;

    impl Backend for Broken {
        fn kind(&self) -> BackendKind {
            BackendKind::DeviceFile
        }

        fn fill(&self, _: &mut [u8], _: ReadMode, _: &dyn Host) -> Result<(), Error> {
            Err(Error::Unsupported("/dev/urandom (or equivalent) not found"))
        }
    }

    #[test]
    fn test_zero_seed_zeroes_secret() {
        let secret = generate(HashSeed::Fixed(0), &EntropyReader::new()).unwrap();
        assert_eq!(secret, HashSecret::ZERO);
        assert!(!secret.is_randomized());
    }

    #[test]
    fn test_fixed_seed_matches_lcg() {
        let secret = generate(HashSeed::Fixed(12345), &EntropyReader::new()).unwrap();
        assert_eq!(secret.as_bytes().as_slice(), lcg::bytes(12345, SECRET_SIZE).as_slice());
        assert_eq!(secret.as_bytes()[..4], [0xa0, 0xdc, 0xc3, 0x6d]);
    }

    #[test]
    fn test_fixed_seed_needs_no_entropy() {
        let reader = EntropyReader::with_backend(Box::new(Broken));
        assert!(generate(HashSeed::Fixed(9), &reader).is_ok());
    }

    #[test]
    fn test_no_entropy_is_fatal() {
        let reader = EntropyReader::with_backend(Box::new(Broken));
        let err = generate(HashSeed::Random, &reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
    }

    #[test]
    fn test_cell_is_write_once() {
        let reader = EntropyReader::new();
        let cell = SecretCell::new();
        assert!(cell.get().is_none());
        let first = *cell.init(HashSeed::Fixed(1), &reader).unwrap();
        let second = *cell.init(HashSeed::Fixed(2), &reader).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_bytes()[..4], [0x29, 0x23, 0xbe, 0x84]);
    }

    #[test]
    fn test_failed_init_publishes_nothing() {
        let reader = EntropyReader::with_backend(Box::new(Broken));
        let cell = SecretCell::new();
        assert!(cell.init(HashSeed::Random, &reader).is_err());
        assert!(!cell.is_initialized());
    }

    #[test]
    fn test_views() {
        let mut bytes = [0u8; SECRET_SIZE];
        bytes[0] = 1;
        bytes[8] = 2;
        bytes[16] = 3;
        let secret = HashSecret::from_bytes(bytes);
        assert_eq!(secret.siphash_keys(), (1, 2));
        assert_eq!(secret.salt(), 3);
    }

    #[test]
    fn test_debug_hides_bytes() {
        let secret = HashSecret::from_bytes([0xEE; SECRET_SIZE]);
        let s = format!("{secret:?}");
        assert!(!s.contains("238"));
        assert!(!s.to_lowercase().contains("ee"));
    }
}
