//! # osentropy-core
//!
//! **Random bytes from whatever the operating system offers.**
//!
//! `osentropy-core` fills buffers from the OS entropy source through one
//! reader, picking the best backend for the target and degrading gracefully
//! when it is absent, blocked by a sandbox, or not seeded yet. It also derives
//! the 24-byte hash-randomization secret, which can be pinned with the
//! `OSENTROPY_HASHSEED` environment variable for reproducible debugging.
//!
//! ## Quick Start
//!
//! ```no_run
//! // Startup: initialize the hash secret (aborts on a malformed override).
//! let secret = osentropy_core::init_random();
//! println!("randomized hashing: {}", secret.is_randomized());
//!
//! // Cryptographic-grade bytes.
//! let mut key = [0u8; 32];
//! osentropy_core::urandom(&mut key).unwrap();
//!
//! // Teardown: release the cached descriptor.
//! osentropy_core::fini_random();
//! ```
//!
//! ## Architecture
//!
//! Secret initializer → (override?) → LCG, else → Entropy reader → backend
//!
//! Backends implement the [`Backend`] trait; exactly one is chosen per target:
//! - **KernelSyscall**: `getrandom(2)` with a one-shot capability probe and a
//!   `/dev/urandom` fallback (Linux, Android, Solaris, illumos).
//! - **OsEntropyCall**: `getentropy(3)` (macOS, iOS, OpenBSD).
//! - **CryptoService**: CryptoAPI provider handle (Windows).
//! - **DeviceFile**: `/dev/urandom` through a validated descriptor cache.
//!
//! Process-wide state lives in an [`Entropy`] context; the free functions use
//! a global instance.

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod lcg;
pub mod quality;
pub mod reader;
pub mod secret;

pub use backend::{Backend, BackendKind};
pub use config::{HASH_SEED_ENV, HashSeed};
pub use context::{
    Entropy, fini_random, global, hash_secret, init_random, try_init_random, urandom,
    urandom_nonblock,
};
pub use error::{Error, ErrorKind};
pub use host::{Host, NoHost};
pub use reader::{EntropyReader, ReadMode};
pub use secret::{HashSecret, SECRET_SIZE};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
