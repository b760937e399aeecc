//! Deterministic fallback generator.
//!
//! Linear congruential generator `x(n+1) = (x(n) * 214013 + 2531011) mod 2^32`;
//! each output byte is bits 16..23 of the next state. Stateless across calls
//! and **not** cryptographically secure: only used when an explicit hash
//! seed is requested.

const MULTIPLIER: u32 = 214_013;
const INCREMENT: u32 = 2_531_011;

/// Fill `buf` from the sequence seeded with `seed`.
pub fn fill(seed: u32, buf: &mut [u8]) {
    let mut x = seed;
    for b in buf.iter_mut() {
        x = x.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        *b = (x >> 16) as u8;
    }
}

/// First `len` bytes of the sequence seeded with `seed`.
pub fn bytes(seed: u32, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    fill(seed, &mut out);
    out
}
