//! Bounds-checked access to the module's linear memory.
//!
//! Every accessor validates `offset + len` against the current memory
//! size before touching it and fails with `OutOfBounds` otherwise.
//!
//! Byte-order conventions (verified against fixtures, do not "fix"):
//! - addresses are copied without reordering
//! - 256-bit values read via plain accessors (balance, difficulty,
//!   storage key/value, block hash) are reversed-byte relative to
//!   canonical big-endian and are reversed on the way in and out
//! - the `256`-suffixed call-data accessor and log topics are read
//!   verbatim, without reversal
//! - 128-bit quantities (balance, call value, gas price) are observed
//!   as 16 little-endian bytes

use eei_hostapi::types::{
    bytes32_from_u128_le, bytes32_low_u128_le, bytes32_reversed, Address, Bytes32,
};
use eei_hostapi::EeiError;

fn check_range(mem: &[u8], offset: u32, len: u32) -> Result<usize, EeiError> {
    let start = offset as usize;
    let end = start + len as usize;
    if end > mem.len() {
        return Err(EeiError::OutOfBounds {
            offset: offset as u64,
            len: len as u64,
            size: mem.len(),
        });
    }
    Ok(start)
}

/// Read `len` bytes from module memory at `offset`.
pub fn read_bytes(mem: &[u8], offset: u32, len: u32) -> Result<Vec<u8>, EeiError> {
    let start = check_range(mem, offset, len)?;
    Ok(mem[start..start + len as usize].to_vec())
}

/// Write `data` to module memory at `offset`.
pub fn write_bytes(mem: &mut [u8], offset: u32, data: &[u8]) -> Result<(), EeiError> {
    let start = check_range(mem, offset, data.len() as u32)?;
    mem[start..start + data.len()].copy_from_slice(data);
    Ok(())
}

/// Read a 20-byte address. No reordering.
pub fn read_address(mem: &[u8], offset: u32) -> Result<Address, EeiError> {
    let start = check_range(mem, offset, 20)?;
    let mut out = [0u8; 20];
    out.copy_from_slice(&mem[start..start + 20]);
    Ok(out)
}

/// Write a 20-byte address. No reordering.
pub fn write_address(mem: &mut [u8], offset: u32, addr: &Address) -> Result<(), EeiError> {
    write_bytes(mem, offset, addr)
}

/// Read a 256-bit value via the plain (reversed-byte) convention.
pub fn read_bytes32(mem: &[u8], offset: u32) -> Result<Bytes32, EeiError> {
    Ok(bytes32_reversed(&read_bytes32_raw(mem, offset)?))
}

/// Write a 256-bit value via the plain (reversed-byte) convention.
pub fn write_bytes32(mem: &mut [u8], offset: u32, value: &Bytes32) -> Result<(), EeiError> {
    write_bytes(mem, offset, &bytes32_reversed(value))
}

/// Read 32 bytes verbatim (`callDataCopy256` values, log topics).
pub fn read_bytes32_raw(mem: &[u8], offset: u32) -> Result<Bytes32, EeiError> {
    let start = check_range(mem, offset, 32)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&mem[start..start + 32]);
    Ok(out)
}

/// Read a 128-bit value (16 little-endian bytes) into a canonical
/// big-endian `Bytes32`.
pub fn read_u128(mem: &[u8], offset: u32) -> Result<Bytes32, EeiError> {
    let start = check_range(mem, offset, 16)?;
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&mem[start..start + 16]);
    Ok(bytes32_from_u128_le(&buf))
}

/// Write the low 128 bits of a `Bytes32` as 16 little-endian bytes.
pub fn write_u128(mem: &mut [u8], offset: u32, value: &Bytes32) -> Result<(), EeiError> {
    write_bytes(mem, offset, &bytes32_low_u128_le(value))
}

/// Copy `len` bytes from `src` starting at `src_offset`, zero-padding
/// past the end of `src` (copy-op source semantics).
pub fn padded_slice(src: &[u8], src_offset: u32, len: u32) -> Vec<u8> {
    let mut out = vec![0u8; len as usize];
    let start = (src_offset as usize).min(src.len());
    let end = (start + len as usize).min(src.len());
    out[..end - start].copy_from_slice(&src[start..end]);
    out
}
