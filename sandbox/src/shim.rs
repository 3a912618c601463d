//! 32-bit to 64-bit parameter bridging.
//!
//! The call boundary only carries 32-bit integers, so 64-bit gas
//! quantities arrive as two halves and leave the same way. Each half, if
//! received as a negative 32-bit two's-complement value, is corrected by
//! adding 2^32 before recombination. Exact integer arithmetic throughout:
//! values above 2^53 must survive untouched.

/// Reconstruct an unsigned 64-bit quantity from two 32-bit halves:
/// `high * 2^32 + low`, after two's-complement correction of each half.
pub fn recombine_u64(high: i32, low: i32) -> u64 {
    ((high as u32 as u64) << 32) | (low as u32 as u64)
}

/// Split an unsigned 64-bit quantity into `(high, low)` 32-bit halves.
pub fn split_u64(value: u64) -> (i32, i32) {
    ((value >> 32) as u32 as i32, value as u32 as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recombine_basic() {
        assert_eq!(recombine_u64(0, 0), 0);
        assert_eq!(recombine_u64(0, 1), 1);
        assert_eq!(recombine_u64(1, 0), 1 << 32);
        assert_eq!(recombine_u64(2, 3), (2u64 << 32) | 3);
    }

    #[test]
    fn test_negative_halves_corrected() {
        // -1 as a 32-bit half means 2^32 - 1.
        assert_eq!(recombine_u64(0, -1), u32::MAX as u64);
        assert_eq!(recombine_u64(-1, -1), u64::MAX);
        assert_eq!(recombine_u64(-1, 0), 0xFFFF_FFFF_0000_0000);
    }

    #[test]
    fn test_exact_above_2_pow_53() {
        // Floating-point reconstruction would lose these low bits.
        let value = (1u64 << 53) + 1;
        let (high, low) = split_u64(value);
        assert_eq!(recombine_u64(high, low), value);

        let value = u64::MAX - 1;
        let (high, low) = split_u64(value);
        assert_eq!(recombine_u64(high, low), value);
    }

    #[test]
    fn test_split_recombine_roundtrip() {
        for value in [0u64, 1, u32::MAX as u64, 1 << 32, 1 << 63, u64::MAX] {
            let (high, low) = split_u64(value);
            assert_eq!(recombine_u64(high, low), value);
        }
    }
}
