pub mod bytes;
pub mod probe;
pub mod secret;

/// Hex-encode a byte slice.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
