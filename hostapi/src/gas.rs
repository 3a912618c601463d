//! Gas schedule for the environment interface.
//!
//! Every host function has a fixed base cost; data-length-dependent
//! operations add a per-32-byte-word cost on top. `log` has its own
//! formula. Storage writes and self-destruct additionally credit the
//! refund accumulator, which the caller applies after halt.

/// Base cost for cheap environment accessors (`getAddress`, `getCaller`,
/// block context reads, `getGasLeft`, ...).
pub const G_BASE: u64 = 2;

/// Base cost for copy operations (`callDataCopy`, `callDataCopy256`,
/// `codeCopy`).
pub const G_COPY: u64 = 3;

/// Per-32-byte-word cost added to length-dependent copies.
pub const G_COPY_WORD: u64 = 3;

/// Base cost for `getBalance`.
pub const G_BALANCE: u64 = 20;

/// Base cost for `getExternalCodeSize` and `externalCodeCopy`.
pub const G_EXTCODE: u64 = 20;

/// Base cost for `getBlockHash`.
pub const G_BLOCKHASH: u64 = 20;

/// Base cost for `storageLoad`.
pub const G_SLOAD: u64 = 50;

/// Base cost for `storageStore`.
pub const G_SSTORE: u64 = 5_000;

/// Extra cost when `storageStore` populates a previously-unset slot.
pub const G_SSTORE_SET: u64 = 15_000;

/// Refund credited when `storageStore` clears a previously-set slot.
pub const R_SSTORE_CLEAR: u64 = 15_000;

/// Refund credited by `selfDestruct`.
pub const R_SELFDESTRUCT: u64 = 24_000;

/// Base cost for `create`.
pub const G_CREATE: u64 = 32_000;

/// Base cost for `call`, `callCode`, and `callDelegate`.
pub const G_CALL: u64 = 40;

/// Surcharge for a call transferring nonzero value.
pub const G_CALLVALUE: u64 = 9_000;

/// Gas stipend granted to the callee of a value transfer; netted out of
/// the surcharge (§ the call dispatcher).
pub const G_CALLSTIPEND: u64 = 2_300;

/// Base cost for `log`.
pub const G_LOG: u64 = 375;

/// Per-byte cost of log data.
pub const G_LOGDATA: u64 = 8;

/// Per-topic cost of a log.
pub const G_LOGTOPIC: u64 = 375;

/// Number of 32-byte words covering `len` bytes.
pub fn word_count(len: usize) -> u64 {
    (len as u64).div_ceil(32)
}

/// Cost of a length-dependent copy: `G_COPY + ceil(len/32) * G_COPY_WORD`.
pub fn gas_cost_copy(len: usize) -> u64 {
    G_COPY.saturating_add(word_count(len).saturating_mul(G_COPY_WORD))
}

/// Cost of `externalCodeCopy`: `G_EXTCODE + ceil(len/32) * G_COPY_WORD`.
pub fn gas_cost_extcode_copy(len: usize) -> u64 {
    G_EXTCODE.saturating_add(word_count(len).saturating_mul(G_COPY_WORD))
}

/// Cost of `log`: `G_LOG + G_LOGDATA*len + G_LOGTOPIC*topics`.
pub fn gas_cost_log(data_len: usize, num_topics: u32) -> u64 {
    G_LOG
        .saturating_add(G_LOGDATA.saturating_mul(data_len as u64))
        .saturating_add(G_LOGTOPIC.saturating_mul(num_topics as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(0), 0);
        assert_eq!(word_count(1), 1);
        assert_eq!(word_count(32), 1);
        assert_eq!(word_count(33), 2);
        assert_eq!(word_count(64), 2);
    }

    #[test]
    fn test_gas_cost_copy() {
        assert_eq!(gas_cost_copy(0), 3);
        assert_eq!(gas_cost_copy(32), 3 + 3);
        assert_eq!(gas_cost_copy(33), 3 + 6);
    }

    #[test]
    fn test_gas_cost_extcode_copy() {
        assert_eq!(gas_cost_extcode_copy(0), 20);
        assert_eq!(gas_cost_extcode_copy(64), 20 + 6);
    }

    #[test]
    fn test_gas_cost_log() {
        assert_eq!(gas_cost_log(0, 0), 375);
        assert_eq!(gas_cost_log(10, 0), 375 + 80);
        assert_eq!(gas_cost_log(10, 4), 375 + 80 + 4 * 375);
    }

    #[test]
    fn test_value_surcharge_constants() {
        // The dispatcher nets these to a constant 6700 surcharge.
        assert_eq!(G_CALLVALUE - G_CALLSTIPEND, 6_700);
    }
}
