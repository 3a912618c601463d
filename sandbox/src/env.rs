//! Per-invocation execution context.
//!
//! `Environment` combines the call identity, gas meter, block context,
//! output accumulators, and the external state handle into a single
//! struct exclusively owned by the in-flight call. It is constructed
//! once from an `EnvConfig`, mutated by environment interface
//! operations, and read by the caller after halt.

use std::sync::{Arc, Mutex, MutexGuard};

use eei_hostapi::types::{Address, Bytes32};
use eei_hostapi::{AccountStore, ChainHistory, EeiError, GasMeter, LogEntry};

use crate::config::EnvConfig;

/// Shared handle to the external account store.
///
/// The store outlives the call; storage writes made through it persist
/// after the environment is dropped. Concurrent calls on the same store
/// must be serialized — nested-call isolation is an extension point, not
/// existing behavior.
pub type StateHandle = Arc<Mutex<dyn AccountStore>>;

/// Block metadata visible to the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    pub number: u64,
    pub timestamp: u64,
    pub difficulty: Bytes32,
    pub gas_limit: u64,
    pub coinbase: Address,
}

/// The mutable per-invocation execution context.
pub struct Environment {
    /// Address of the executing account.
    pub address: Address,
    /// Transaction originator.
    pub origin: Address,
    /// Immediate caller.
    pub caller: Address,
    /// Value deposited with the call.
    pub call_value: Bytes32,
    /// Immutable call data.
    pub call_data: Vec<u8>,
    /// Immutable code of the executing account.
    pub code: Vec<u8>,
    /// Transaction gas price.
    pub gas_price: u64,
    /// Creation nonce consumed by `create`.
    pub nonce: u64,
    /// Gas accounting (left + refund accumulator).
    pub gas: GasMeter,
    /// Block metadata.
    pub block: BlockContext,
    /// Append-only log sequence.
    pub logs: Vec<LogEntry>,
    /// Last-write-wins return buffer.
    pub return_value: Vec<u8>,
    /// Self-destruct beneficiary, if the module self-destructed.
    pub self_destruct: Option<Address>,
    /// Handle to the external account store.
    pub state: StateHandle,
    /// Chain-history lookup capability.
    pub history: Arc<dyn ChainHistory>,
}

impl Environment {
    /// Build an environment from a config record and external handles.
    pub fn new(config: EnvConfig, state: StateHandle, history: Arc<dyn ChainHistory>) -> Self {
        Self {
            address: config.address,
            origin: config.origin,
            caller: config.caller,
            call_value: config.call_value,
            call_data: config.call_data,
            code: config.code,
            gas_price: config.gas_price,
            nonce: config.nonce,
            gas: GasMeter::new(config.gas_left),
            block: BlockContext {
                number: config.block_number,
                timestamp: config.block_timestamp,
                difficulty: config.block_difficulty,
                gas_limit: config.block_gas_limit,
                coinbase: config.coinbase,
            },
            logs: Vec::new(),
            return_value: Vec::new(),
            self_destruct: None,
            state,
            history,
        }
    }

    /// Lock the account store, mapping poisoning to a fatal error.
    ///
    /// The `'static` bound on the trait object is the one the handle
    /// actually holds; `MutexGuard` is invariant in its payload, so the
    /// object-lifetime default (the guard's own lifetime) would not
    /// unify with it.
    pub fn state(&self) -> Result<MutexGuard<'_, dyn AccountStore + 'static>, EeiError> {
        self.state
            .lock()
            .map_err(|_| EeiError::Internal("account store lock poisoned".into()))
    }

    /// Append one log entry. The log sequence only grows.
    pub fn add_log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }

    /// Record the return buffer. Last call wins.
    pub fn set_return_value(&mut self, data: Vec<u8>) {
        self.return_value = data;
    }

    /// Mark the account self-destructed with the given beneficiary.
    /// Balance transfer is left to the caller after halt.
    pub fn mark_self_destruct(&mut self, beneficiary: Address) {
        self.self_destruct = Some(beneficiary);
    }

    /// Snapshot the externally-visible outputs after halt.
    pub fn outcome(&self) -> ExecutionOutcome {
        ExecutionOutcome {
            return_value: self.return_value.clone(),
            logs: self.logs.clone(),
            gas_left: self.gas.gas_left(),
            gas_refund: self.gas.refund(),
            self_destruct: self.self_destruct,
        }
    }
}

/// What the caller extracts from an environment after halt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub return_value: Vec<u8>,
    pub logs: Vec<LogEntry>,
    pub gas_left: u64,
    pub gas_refund: u64,
    pub self_destruct: Option<Address>,
}
