use crate::error::{FolioError, Result};

/// Decode exactly `N` bytes from a hex string, ignoring surrounding whitespace.
pub fn parse_hex_array<const N: usize>(hex_str: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(hex_str.trim())
        .map_err(|e| FolioError::Config(format!("invalid hex: {e}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        FolioError::Config(format!(
            "expected {N} bytes ({} hex chars), got {}",
            N * 2,
            bytes.len()
        ))
    })
}
