//! Integration tests for osentropy-core.
//!
//! These tests exercise the public surface end to end:
//! entry points → reader → platform backend, and the seed override → secret.

#[cfg(unix)]
use osentropy_core::backend::DeviceFile;
use osentropy_core::{
    Entropy, ErrorKind, HASH_SEED_ENV, HashSecret, SECRET_SIZE, lcg, quality, urandom,
    urandom_nonblock,
};

#[test]
fn urandom_fills_requested_sizes() {
    for size in [0usize, 1, 24, 255, 256, 257, 1024, 65536] {
        let mut buf = vec![0u8; size];
        urandom(&mut buf).unwrap();
        urandom_nonblock(&mut buf).unwrap();
    }
}

#[cfg(unix)]
#[test]
fn negative_size_is_rejected_without_io() {
    use osentropy_core::ReadMode;

    let ctx = Entropy::with_backend(Box::new(DeviceFile::with_path("/nonexistent/urandom")));
    let mut buf = [0u8; 8];
    let err = ctx.reader().read(&mut buf, -1, ReadMode::URANDOM).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(buf, [0u8; 8]);
}

#[test]
fn consecutive_reads_differ() {
    let mut a = [0u8; 64];
    let mut b = [0u8; 64];
    urandom(&mut a).unwrap();
    urandom(&mut b).unwrap();
    assert_ne!(a, b, "two consecutive urandom calls returned identical data");
}

#[test]
fn output_has_high_entropy() {
    let mut buf = vec![0u8; 65536];
    urandom(&mut buf).unwrap();
    let shannon = quality::shannon(&buf);
    assert!(shannon > 7.9, "output entropy too low: {shannon:.3}/8.0");
    assert_eq!(quality::unique_values(&buf), 256);
}

#[cfg(unix)]
#[test]
fn missing_device_is_unsupported() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = Entropy::with_backend(Box::new(DeviceFile::with_path(tmp.path().join("none"))));
    let mut buf = [0u8; 8];
    let err = ctx.urandom(&mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    // Without a device the random secret cannot be produced.
    let err = ctx
        .init_secret_with(osentropy_core::HashSeed::Random)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
    assert!(ctx.secret().is_none());
}

#[cfg(unix)]
#[test]
fn device_backend_serves_secret() {
    use std::io::Write;

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("urandom");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&[0x5C; 64])
        .unwrap();
    let ctx = Entropy::with_backend(Box::new(DeviceFile::with_path(&path)));
    let secret = ctx
        .init_secret_with(osentropy_core::HashSeed::Random)
        .unwrap();
    assert_eq!(secret.as_bytes(), &[0x5C; SECRET_SIZE]);
    ctx.close();
    ctx.close();
}

// Every case that touches the environment lives in this one test so that
// parallel tests never observe a half-set variable.
#[test]
fn seed_override_from_environment() {
    let set = |v: &str| unsafe { std::env::set_var(HASH_SEED_ENV, v) };

    set("0");
    let ctx = Entropy::new();
    assert_eq!(*ctx.init_secret().unwrap(), HashSecret::ZERO);

    set("12345");
    let ctx = Entropy::new();
    assert_eq!(
        ctx.init_secret().unwrap().as_bytes().as_slice(),
        lcg::bytes(12345, SECRET_SIZE).as_slice()
    );

    set("notanumber");
    let ctx = Entropy::new();
    let err = ctx.init_secret().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
    assert!(ctx.secret().is_none());

    set("4294967296");
    assert!(Entropy::new().init_secret().is_err());

    set("random");
    let a = *Entropy::new().init_secret().unwrap();
    let b = *Entropy::new().init_secret().unwrap();
    assert!(a.is_randomized());
    assert_ne!(a, b);

    unsafe { std::env::remove_var(HASH_SEED_ENV) };
    assert!(Entropy::new().init_secret().unwrap().is_randomized());
}
