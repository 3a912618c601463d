//! Configuration for the environment and the wasm runner.
//!
//! `EnvConfig` is the base-default record an `Environment` is built
//! from; callers override individual fields with struct-update syntax:
//!
//! ```
//! use eei_sandbox::EnvConfig;
//!
//! let config = EnvConfig {
//!     gas_left: 200_000,
//!     ..EnvConfig::default()
//! };
//! assert_eq!(config.block_number, 0);
//! ```

use eei_hostapi::types::{Address, Bytes32, ZERO_ADDRESS, ZERO_BYTES32};

/// Inputs for one invocation's execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Address of the executing account.
    pub address: Address,
    /// Transaction originator.
    pub origin: Address,
    /// Immediate caller.
    pub caller: Address,
    /// Value deposited with the call (256-bit, canonical big-endian).
    pub call_value: Bytes32,
    /// Immutable call data.
    pub call_data: Vec<u8>,
    /// Immutable code of the executing account.
    pub code: Vec<u8>,
    /// Gas available to the invocation.
    pub gas_left: u64,
    /// Transaction gas price.
    pub gas_price: u64,
    /// Creation nonce of the executing account, consumed by `create`.
    pub nonce: u64,
    /// Current block number.
    pub block_number: u64,
    /// Current block timestamp.
    pub block_timestamp: u64,
    /// Current block difficulty (256-bit).
    pub block_difficulty: Bytes32,
    /// Current block gas limit.
    pub block_gas_limit: u64,
    /// Current block beneficiary.
    pub coinbase: Address,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            address: ZERO_ADDRESS,
            origin: ZERO_ADDRESS,
            caller: ZERO_ADDRESS,
            call_value: ZERO_BYTES32,
            call_data: Vec::new(),
            code: Vec::new(),
            gas_left: 1_000_000,
            gas_price: 0,
            nonce: 0,
            block_number: 0,
            block_timestamp: 0,
            block_difficulty: ZERO_BYTES32,
            block_gas_limit: 0,
            coinbase: ZERO_ADDRESS,
        }
    }
}

/// Configuration for the wasm sandbox runner.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Maximum linear memory pages (1 page = 64 KiB).
    pub max_memory_pages: u32,

    /// Wasmtime fuel limit (instruction metering).
    /// Prevents infinite loops in pure guest compute.
    pub fuel_limit: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: 256, // 16 MiB
            fuel_limit: 100_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_defaults() {
        let config = EnvConfig::default();
        assert_eq!(config.gas_left, 1_000_000);
        assert_eq!(config.address, ZERO_ADDRESS);
        assert!(config.call_data.is_empty());
        assert_eq!(config.nonce, 0);
    }

    #[test]
    fn test_env_override_merging() {
        let config = EnvConfig {
            block_number: 1000,
            gas_left: 5,
            ..EnvConfig::default()
        };
        assert_eq!(config.block_number, 1000);
        assert_eq!(config.gas_left, 5);
        // Untouched fields keep their defaults.
        assert_eq!(config.block_timestamp, 0);
    }

    #[test]
    fn test_sandbox_defaults() {
        let config = SandboxConfig::default();
        assert_eq!(config.max_memory_pages, 256);
        assert_eq!(config.fuel_limit, 100_000_000);
    }
}
