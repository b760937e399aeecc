//! Basic entropy example.
//!
//! Initializes the hash secret, prints which backend is in use, and reads
//! 32 random bytes.
//!
//! Run: `cargo run --example basic`
//! Reproducible secret: `OSENTROPY_HASHSEED=42 cargo run --example basic`

fn main() {
    env_logger::init();

    let secret = osentropy_core::init_random();
    let ctx = osentropy_core::global();
    println!("Backend:            {}", ctx.backend_kind());
    println!("Randomized hashing: {}", secret.is_randomized());

    let mut bytes = [0u8; 32];
    match osentropy_core::urandom(&mut bytes) {
        Ok(()) => {
            print!("Random bytes (hex): ");
            for b in &bytes {
                print!("{b:02x}");
            }
            println!();
        }
        Err(e) => eprintln!("urandom failed: {e}"),
    }

    osentropy_core::fini_random();
}
