//! Core value types for the environment interface.
//!
//! Addresses and 256-bit quantities are opaque fixed-width byte values.
//! `Bytes32` is held in canonical big-endian order; the wire convention
//! for "plain" 256-bit accessors is reversed-byte (little-endian), so the
//! reversal helpers here are used at the memory-marshaling boundary.

/// 20-byte account address. Copied across the boundary without reordering.
pub type Address = [u8; 20];

/// 32-byte quantity in canonical big-endian order (balances, storage keys
/// and values, block hashes, topics).
pub type Bytes32 = [u8; 32];

/// A zero-valued address.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// A zero-valued 256-bit quantity.
pub const ZERO_BYTES32: Bytes32 = [0u8; 32];

/// One log record emitted by the module.
///
/// Topic count is fixed at creation (at most four) and the data buffer is
/// captured verbatim. The environment's log sequence is append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Raw log payload (may be empty).
    pub data: Vec<u8>,
    /// Topics in the order the module supplied them.
    pub topics: Vec<Bytes32>,
}

/// Returns true if every byte of `value` is zero.
pub fn bytes32_is_zero(value: &Bytes32) -> bool {
    value.iter().all(|b| *b == 0)
}

/// Reverse a 32-byte value between canonical big-endian and the
/// little-endian wire order used by plain 256-bit accessors.
pub fn bytes32_reversed(value: &Bytes32) -> Bytes32 {
    let mut out = *value;
    out.reverse();
    out
}

/// Build a `Bytes32` holding `value` as a big-endian integer.
pub fn bytes32_from_u64(value: u64) -> Bytes32 {
    let mut out = ZERO_BYTES32;
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// The low 128 bits of a big-endian `Bytes32`, in little-endian byte order.
///
/// Balances, call values, and gas prices are observed by the module as
/// 16-byte values in this order.
pub fn bytes32_low_u128_le(value: &Bytes32) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (i, b) in value[16..].iter().enumerate() {
        out[15 - i] = *b;
    }
    out
}

/// Rebuild a big-endian `Bytes32` from a 16-byte little-endian value.
pub fn bytes32_from_u128_le(bytes: &[u8; 16]) -> Bytes32 {
    let mut out = ZERO_BYTES32;
    for (i, b) in bytes.iter().enumerate() {
        out[31 - i] = *b;
    }
    out
}

/// Decode a `0x`-prefixed hex string into bytes.
///
/// Odd-length digit strings are left-padded with a zero nibble, matching
/// the fixture format's `0xde0b6b3a7640000`-style values.
pub fn bytes_from_hex(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Some(Vec::new());
    }
    let padded: String = if digits.len() % 2 == 1 {
        let mut p = String::with_capacity(digits.len() + 1);
        p.push('0');
        p.push_str(digits);
        p
    } else {
        digits.to_string()
    };
    let mut out = Vec::with_capacity(padded.len() / 2);
    for i in (0..padded.len()).step_by(2) {
        let byte = u8::from_str_radix(padded.get(i..i + 2)?, 16).ok()?;
        out.push(byte);
    }
    Some(out)
}

/// Decode a hex string into an `Address`. Must be exactly 20 bytes.
pub fn address_from_hex(s: &str) -> Option<Address> {
    let bytes = bytes_from_hex(s)?;
    if bytes.len() != 20 {
        return None;
    }
    let mut out = ZERO_ADDRESS;
    out.copy_from_slice(&bytes);
    Some(out)
}

/// Decode a hex string into a right-aligned big-endian `Bytes32`.
///
/// Accepts at most 32 bytes of digits; shorter values occupy the low bytes.
pub fn bytes32_from_hex(s: &str) -> Option<Bytes32> {
    let bytes = bytes_from_hex(s)?;
    if bytes.len() > 32 {
        return None;
    }
    let mut out = ZERO_BYTES32;
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Some(out)
}
