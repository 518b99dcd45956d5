//! # Addresses and Hex
//!
//! 20-byte account addresses and the hex conventions used on the wire.
//! Signed messages always embed the EIP-55 checksummed form, so the rendering
//! here must match what client tooling produces byte for byte.

use crate::hashing::keccak256;
use crate::CryptoError;

/// Account address (last 20 bytes of keccak256 of the uncompressed public key).
pub type Address = [u8; 20];

/// Decode hex with or without a `0x` prefix.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    hex::decode(trimmed).map_err(|e| CryptoError::InvalidHex(e.to_string()))
}

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse an address from hex. Case is not validated against the checksum.
pub fn parse_address(input: &str) -> Result<Address, CryptoError> {
    let bytes = decode_hex(input).map_err(|_| CryptoError::InvalidAddress(input.to_string()))?;
    let address: Address = bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidAddress(input.to_string()))?;
    Ok(address)
}

/// Render an address in EIP-55 mixed-case checksum form.
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address);
    let digest = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = digest[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}
