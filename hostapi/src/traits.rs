//! Collaborator interfaces consumed by the environment interface.
//!
//! The boundary itself owns no persistent state and no nested execution
//! engine; it talks to these seams. All of them are satisfiable by the
//! stub and in-memory implementations in this crate, and a real engine
//! can be substituted later without changing the boundary's observable
//! behavior.

use crate::error::EeiError;
use crate::types::{Address, Bytes32};

/// Trap-code sentinel for a successful call-family operation.
pub const CALL_SUCCESS: i32 = 1;

/// Trap-code sentinel for a trapped call-family operation.
pub const CALL_TRAPPED: i32 = 0;

/// External account store: `address → {balance, code, storage}`.
///
/// Storage is per-account and sparse: an absent key reads as the zero
/// value. Entries are created on demand by writes and persist beyond the
/// call — the store, not the environment, owns them.
pub trait AccountStore: Send {
    /// Balance of `addr` (zero for unknown accounts).
    fn balance(&self, addr: &Address) -> Bytes32;

    /// Overwrite the balance of `addr`, creating the account if needed.
    fn set_balance(&mut self, addr: &Address, balance: Bytes32);

    /// Code of `addr` (empty for unknown accounts).
    fn code(&self, addr: &Address) -> Vec<u8>;

    /// Overwrite the code of `addr`, creating the account if needed.
    fn set_code(&mut self, addr: &Address, code: Vec<u8>);

    /// Value of a storage slot, `None` if the slot is unset.
    fn storage_get(&self, addr: &Address, key: &Bytes32) -> Option<Bytes32>;

    /// Write a storage slot, creating the account if needed.
    fn storage_set(&mut self, addr: &Address, key: Bytes32, value: Bytes32);

    /// Delete a storage slot (subsequent reads return `None`).
    fn storage_delete(&mut self, addr: &Address, key: &Bytes32);
}

/// Chain-history lookup capability.
pub trait ChainHistory: Send + Sync {
    /// Hash of block `number`. Range checking (the 256-block window)
    /// happens in the boundary before this is consulted.
    fn block_hash(&self, number: u64) -> Bytes32;
}

/// Chain history that knows no blocks. Every lookup yields the zero hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyHistory;

impl ChainHistory for EmptyHistory {
    fn block_hash(&self, _number: u64) -> Bytes32 {
        [0u8; 32]
    }
}

/// Deterministic contract-address derivation from `(creator, nonce)`.
pub trait AddressDeriver: Send {
    fn derive(&self, creator: &Address, nonce: u64) -> Address;
}

/// Default deriver: the first 20 bytes of `blake3(creator || nonce_le)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Deriver;

impl AddressDeriver for Blake3Deriver {
    fn derive(&self, creator: &Address, nonce: u64) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(creator);
        hasher.update(&nonce.to_le_bytes());
        let hash = hasher.finalize();
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash.as_bytes()[..20]);
        out
    }
}

/// Flavor of a nested call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Regular message call into the target's context.
    Call,
    /// Run the target's code in the caller's context.
    CallCode,
    /// Run the target's code with the caller's caller and value.
    Delegate,
}

/// Nested-execution engine consumed by the call dispatcher.
///
/// Returns `(trap_code, output)` where the trap code is
/// [`CALL_SUCCESS`] or [`CALL_TRAPPED`].
pub trait CallEngine: Send {
    fn call(
        &mut self,
        kind: CallKind,
        gas: u64,
        to: &Address,
        value: &Bytes32,
        data: &[u8],
    ) -> Result<(i32, Vec<u8>), EeiError>;
}

/// Stub engine: nested execution is not performed. Every call reports
/// the success sentinel with empty output — an explicit, documented
/// limitation rather than a real error path.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubEngine;

impl CallEngine for StubEngine {
    fn call(
        &mut self,
        _kind: CallKind,
        _gas: u64,
        _to: &Address,
        _value: &Bytes32,
        _data: &[u8],
    ) -> Result<(i32, Vec<u8>), EeiError> {
        Ok((CALL_SUCCESS, Vec::new()))
    }
}

/// Module resumption hook invoked by the ops queue.
///
/// When a queued operation's completion has run, the module is resumed
/// at the callback index it supplied with the host call. With the
/// synchronous collaborators in this crate every operation resolves
/// before its host call returns, so the default hook does nothing; a
/// suspending execution engine supplies a real implementation.
pub trait ModuleResume: Send {
    fn resume(&mut self, callback_index: u32) -> Result<(), EeiError>;
}

/// Resumption hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResume;

impl ModuleResume for NoopResume {
    fn resume(&mut self, _callback_index: u32) -> Result<(), EeiError> {
        Ok(())
    }
}
