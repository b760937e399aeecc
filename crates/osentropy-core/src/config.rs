//! Hash-seed override.
//!
//! The secret initializer consults a single environment variable:
//!
//! | Value                              | Effect |
//! |------------------------------------|--------|
//! | unset, empty, `random`             | secret from OS entropy |
//! | decimal in `[0, 4294967295]`       | secret from the LCG with that seed (`0` zeroes it) |
//! | anything else                      | fatal configuration error |

use std::ffi::OsStr;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Name of the environment variable holding the hash seed override.
pub const HASH_SEED_ENV: &str = "OSENTROPY_HASHSEED";

/// How the hash secret is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashSeed {
    /// Secret drawn from the OS entropy source.
    #[default]
    Random,
    /// Deterministic secret from the given seed.
    Fixed(u32),
}

impl HashSeed {
    /// Read [`HASH_SEED_ENV`] from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_env_value(std::env::var_os(HASH_SEED_ENV).as_deref())
    }

    /// Interpret a raw environment value (`None` when unset).
    pub fn from_env_value(value: Option<&OsStr>) -> Result<Self, Error> {
        match value {
            None => Ok(Self::Random),
            Some(v) => v.to_str().ok_or_else(invalid)?.parse(),
        }
    }

    /// Whether hashing is randomized under this seed.
    pub fn is_randomized(self) -> bool {
        self != Self::Fixed(0)
    }
}

impl FromStr for HashSeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.is_empty() || s == "random" {
            return Ok(Self::Random);
        }
        // u32::from_str would also accept a leading '+'.
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<u32>().map(Self::Fixed).map_err(|_| invalid())
    }
}

impl fmt::Display for HashSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Fixed(seed) => write!(f, "{seed}"),
        }
    }
}

fn invalid() -> Error {
    Error::FatalConfiguration(format!(
        "{HASH_SEED_ENV} must be \"random\" or an integer in range [0; 4294967295]"
    ))
}
