//! The environment interface façade — the host-call surface itself.
//!
//! Each operation runs in a fixed order: gas accounting, memory
//! marshaling, then an environment/state read or mutation that either
//! writes back into module memory directly (pure accessors) or goes
//! through the ops queue (anything that conceptually reads external
//! account or chain state). Call-family operations marshal their value
//! argument first because the dispatcher owns their gas math.
//!
//! Queued operations take a trailing callback index; with the
//! synchronous collaborators in `eei-hostapi` every queued operation
//! resolves before its host call returns, but the completion and the
//! module resumption still flow through the queue so the visible-effect
//! order always equals the call-issue order.

use eei_hostapi::gas::{
    gas_cost_copy, gas_cost_extcode_copy, gas_cost_log, G_BALANCE, G_BASE, G_BLOCKHASH, G_COPY,
    G_EXTCODE, G_SLOAD, G_SSTORE, G_SSTORE_SET, R_SELFDESTRUCT, R_SSTORE_CLEAR,
};
use eei_hostapi::traits::NoopResume;
use eei_hostapi::types::{
    bytes32_from_u64, bytes32_is_zero, bytes32_low_u128_le, bytes32_reversed, ZERO_BYTES32,
};
use eei_hostapi::{CallKind, EeiError, LogEntry, ModuleResume};
use wasmtime::StoreLimits;

use crate::dispatch::CallDispatcher;
use crate::env::Environment;
use crate::memory;
use crate::queue::OpsQueue;
use crate::shim;

/// The façade a module's host calls land on.
///
/// Owns the per-invocation environment, the ops queue, and the call
/// dispatcher. One instance per invocation; the wasm runner stores it as
/// the store data and the linker functions call straight into it.
pub struct EnvInterface {
    pub env: Environment,
    ops: OpsQueue,
    dispatcher: CallDispatcher,
    resume: Box<dyn ModuleResume>,
    /// Store resource limits. Defaults to unlimited; the runner
    /// installs the configured memory cap before execution.
    pub(crate) limits: StoreLimits,
}

impl EnvInterface {
    /// Build a façade with the stub call engine and no-op resumption.
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            ops: OpsQueue::new(),
            dispatcher: CallDispatcher::default(),
            resume: Box::new(NoopResume),
            limits: StoreLimits::default(),
        }
    }

    /// Build a façade around explicit collaborators.
    pub fn with_collaborators(
        env: Environment,
        dispatcher: CallDispatcher,
        resume: Box<dyn ModuleResume>,
    ) -> Self {
        Self {
            env,
            ops: OpsQueue::new(),
            dispatcher,
            resume,
            limits: StoreLimits::default(),
        }
    }

    /// Tear down the façade, handing the environment back for
    /// post-halt extraction.
    pub fn into_env(self) -> Environment {
        self.env
    }

    fn drain(&mut self, mem: &mut [u8]) -> Result<(), EeiError> {
        self.ops.drain(&mut self.env, mem, &mut *self.resume)?;
        Ok(())
    }

    // ── Gas accounting primitives ──

    /// `useGas(amountHigh, amountLow)` — debit gas reconstructed from
    /// two 32-bit halves.
    pub fn use_gas(&mut self, amount_high: i32, amount_low: i32) -> Result<(), EeiError> {
        let amount = shim::recombine_u64(amount_high, amount_low);
        self.env.gas.charge(amount)
    }

    /// `getGasLeft() → (high, low)`.
    pub fn get_gas_left(&mut self) -> Result<(i32, i32), EeiError> {
        self.env.gas.charge(G_BASE)?;
        Ok(shim::split_u64(self.env.gas.gas_left()))
    }

    // ── Identity ──

    pub fn get_address(&mut self, mem: &mut [u8], result_offset: u32) -> Result<(), EeiError> {
        self.env.gas.charge(G_BASE)?;
        memory::write_address(mem, result_offset, &self.env.address)
    }

    pub fn get_tx_origin(&mut self, mem: &mut [u8], result_offset: u32) -> Result<(), EeiError> {
        self.env.gas.charge(G_BASE)?;
        memory::write_address(mem, result_offset, &self.env.origin)
    }

    pub fn get_caller(&mut self, mem: &mut [u8], result_offset: u32) -> Result<(), EeiError> {
        self.env.gas.charge(G_BASE)?;
        memory::write_address(mem, result_offset, &self.env.caller)
    }

    pub fn get_call_value(&mut self, mem: &mut [u8], result_offset: u32) -> Result<(), EeiError> {
        self.env.gas.charge(G_BASE)?;
        memory::write_u128(mem, result_offset, &self.env.call_value)
    }

    pub fn get_tx_gas_price(&mut self, mem: &mut [u8], result_offset: u32) -> Result<(), EeiError> {
        self.env.gas.charge(G_BASE)?;
        memory::write_u128(mem, result_offset, &bytes32_from_u64(self.env.gas_price))
    }

    // ── Call data and code ──

    pub fn get_call_data_size(&mut self) -> Result<i32, EeiError> {
        self.env.gas.charge(G_BASE)?;
        Ok(self.env.call_data.len() as i32)
    }

    /// `callDataCopy` — the copied buffer is byte-reversed on the way
    /// out. This is the plain-accessor wire convention; the
    /// `256`-suffixed variant below copies verbatim. Preserved
    /// bit-for-bit against fixtures.
    pub fn call_data_copy(
        &mut self,
        mem: &mut [u8],
        result_offset: u32,
        data_offset: u32,
        length: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(gas_cost_copy(length as usize))?;
        let mut buf = memory::padded_slice(&self.env.call_data, data_offset, length);
        buf.reverse();
        memory::write_bytes(mem, result_offset, &buf)
    }

    /// `callDataCopy256` — copies one 32-byte word without reversal.
    pub fn call_data_copy256(
        &mut self,
        mem: &mut [u8],
        result_offset: u32,
        data_offset: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(G_COPY)?;
        let buf = memory::padded_slice(&self.env.call_data, data_offset, 32);
        memory::write_bytes(mem, result_offset, &buf)
    }

    pub fn get_code_size(&mut self) -> Result<i32, EeiError> {
        self.env.gas.charge(G_BASE)?;
        Ok(self.env.code.len() as i32)
    }

    pub fn code_copy(
        &mut self,
        mem: &mut [u8],
        result_offset: u32,
        code_offset: u32,
        length: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(gas_cost_copy(length as usize))?;
        let buf = memory::padded_slice(&self.env.code, code_offset, length);
        memory::write_bytes(mem, result_offset, &buf)
    }

    // ── External account state (queued) ──

    pub fn get_balance(
        &mut self,
        mem: &mut [u8],
        address_offset: u32,
        result_offset: u32,
        cb_index: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(G_BALANCE)?;
        let addr = memory::read_address(mem, address_offset)?;
        let id = self.ops.push(
            cb_index,
            Box::new(move |_env, mem, result| memory::write_bytes(mem, result_offset, &result)),
        );
        let balance = self.env.state()?.balance(&addr);
        self.ops
            .complete(id, bytes32_low_u128_le(&balance).to_vec())?;
        self.drain(mem)
    }

    pub fn get_external_code_size(
        &mut self,
        mem: &mut [u8],
        address_offset: u32,
        cb_index: u32,
    ) -> Result<i32, EeiError> {
        self.env.gas.charge(G_EXTCODE)?;
        let addr = memory::read_address(mem, address_offset)?;
        let id = self.ops.push(cb_index, Box::new(|_env, _mem, _result| Ok(())));
        let size = self.env.state()?.code(&addr).len();
        self.ops.complete(id, (size as u32).to_le_bytes().to_vec())?;
        self.drain(mem)?;
        Ok(size as i32)
    }

    pub fn external_code_copy(
        &mut self,
        mem: &mut [u8],
        address_offset: u32,
        result_offset: u32,
        code_offset: u32,
        length: u32,
        cb_index: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(gas_cost_extcode_copy(length as usize))?;
        let addr = memory::read_address(mem, address_offset)?;
        let id = self.ops.push(
            cb_index,
            Box::new(move |_env, mem, result| memory::write_bytes(mem, result_offset, &result)),
        );
        let code = self.env.state()?.code(&addr);
        self.ops
            .complete(id, memory::padded_slice(&code, code_offset, length))?;
        self.drain(mem)
    }

    // ── Block context ──

    /// `getBlockHash` — blocks older than 256 or not strictly in the
    /// past yield the zero hash without consulting chain history.
    pub fn get_block_hash(
        &mut self,
        mem: &mut [u8],
        number: i64,
        result_offset: u32,
        cb_index: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(G_BLOCKHASH)?;
        let diff = self.env.block.number as i128 - number as i128;
        if diff > 256 || diff <= 0 {
            return memory::write_bytes(mem, result_offset, &ZERO_BYTES32);
        }
        let id = self.ops.push(
            cb_index,
            Box::new(move |_env, mem, result| memory::write_bytes(mem, result_offset, &result)),
        );
        let hash = self.env.history.block_hash(number as u64);
        self.ops.complete(id, bytes32_reversed(&hash).to_vec())?;
        self.drain(mem)
    }

    pub fn get_block_coinbase(
        &mut self,
        mem: &mut [u8],
        result_offset: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(G_BASE)?;
        let coinbase = self.env.block.coinbase;
        memory::write_address(mem, result_offset, &coinbase)
    }

    pub fn get_block_timestamp(&mut self) -> Result<i64, EeiError> {
        self.env.gas.charge(G_BASE)?;
        Ok(self.env.block.timestamp as i64)
    }

    pub fn get_block_number(&mut self) -> Result<i64, EeiError> {
        self.env.gas.charge(G_BASE)?;
        Ok(self.env.block.number as i64)
    }

    pub fn get_block_difficulty(
        &mut self,
        mem: &mut [u8],
        result_offset: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(G_BASE)?;
        let difficulty = self.env.block.difficulty;
        memory::write_bytes32(mem, result_offset, &difficulty)
    }

    pub fn get_block_gas_limit(&mut self) -> Result<i64, EeiError> {
        self.env.gas.charge(G_BASE)?;
        Ok(self.env.block.gas_limit as i64)
    }

    // ── Logging ──

    /// `log(dataOffset, length, numTopics, topic1..4)` — topic
    /// arguments are memory offsets of 32-byte values, read without
    /// reversal. `numTopics` outside `[0, 4]` is a fatal argument error.
    #[allow(clippy::too_many_arguments)]
    pub fn log(
        &mut self,
        mem: &mut [u8],
        data_offset: u32,
        length: u32,
        num_topics: i32,
        topic1: u32,
        topic2: u32,
        topic3: u32,
        topic4: u32,
    ) -> Result<(), EeiError> {
        if !(0..=4).contains(&num_topics) {
            return Err(EeiError::InvalidArgument(format!(
                "log topic count {num_topics} outside [0, 4]"
            )));
        }
        self.env
            .gas
            .charge(gas_cost_log(length as usize, num_topics as u32))?;
        let data = memory::read_bytes(mem, data_offset, length)?;
        let offsets = [topic1, topic2, topic3, topic4];
        let mut topics = Vec::with_capacity(num_topics as usize);
        for offset in offsets.iter().take(num_topics as usize) {
            topics.push(memory::read_bytes32_raw(mem, *offset)?);
        }
        self.env.add_log(LogEntry { data, topics });
        Ok(())
    }

    // ── Call family ──

    /// `create(valueOffset, codeOffset, length, resultOffset)` — writes
    /// the derived address (or the zero address on failure) at
    /// `resultOffset`. The code is bounds-checked but not deployed.
    pub fn create(
        &mut self,
        mem: &mut [u8],
        value_offset: u32,
        code_offset: u32,
        code_length: u32,
        result_offset: u32,
    ) -> Result<(), EeiError> {
        let value = memory::read_u128(mem, value_offset)?;
        let _code = memory::read_bytes(mem, code_offset, code_length)?;
        let addr = self.dispatcher.create(&mut self.env, &value)?;
        memory::write_address(mem, result_offset, &addr)
    }

    /// `call(gas, addressOffset, valueOffset, dataOffset, dataLength,
    /// cbIndex)` — returns the trap code after the queued completion has
    /// run.
    #[allow(clippy::too_many_arguments)]
    pub fn call(
        &mut self,
        mem: &mut [u8],
        gas: i64,
        address_offset: u32,
        value_offset: u32,
        data_offset: u32,
        data_length: u32,
        cb_index: u32,
    ) -> Result<i32, EeiError> {
        self.queued_call(
            mem,
            CallKind::Call,
            gas,
            address_offset,
            value_offset,
            data_offset,
            data_length,
            cb_index,
        )
    }

    /// `callCode` — as `call`, but the target's code conceptually runs
    /// in the caller's context. Stubbed identically.
    #[allow(clippy::too_many_arguments)]
    pub fn call_code(
        &mut self,
        mem: &mut [u8],
        gas: i64,
        address_offset: u32,
        value_offset: u32,
        data_offset: u32,
        data_length: u32,
        cb_index: u32,
    ) -> Result<i32, EeiError> {
        self.queued_call(
            mem,
            CallKind::CallCode,
            gas,
            address_offset,
            value_offset,
            data_offset,
            data_length,
            cb_index,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn queued_call(
        &mut self,
        mem: &mut [u8],
        kind: CallKind,
        gas: i64,
        address_offset: u32,
        value_offset: u32,
        data_offset: u32,
        data_length: u32,
        cb_index: u32,
    ) -> Result<i32, EeiError> {
        let to = memory::read_address(mem, address_offset)?;
        let value = memory::read_u128(mem, value_offset)?;
        let data = memory::read_bytes(mem, data_offset, data_length)?;
        let (code, output) =
            self.dispatcher
                .call(&mut self.env, kind, gas as u64, &to, &value, &data)?;
        let id = self.ops.push(cb_index, Box::new(|_env, _mem, _result| Ok(())));
        self.ops.complete(id, vec![code as u8])?;
        self.drain(mem)?;
        if !output.is_empty() {
            self.env.set_return_value(output);
        }
        Ok(code)
    }

    /// `callDelegate` — the one call-family operation not routed
    /// through the ops queue: it delegates synchronously and relays the
    /// collaborator's real trap code and output. Charges the 40-gas
    /// base and nothing else, since no value moves.
    pub fn call_delegate(
        &mut self,
        mem: &mut [u8],
        gas: i64,
        address_offset: u32,
        data_offset: u32,
        data_length: u32,
    ) -> Result<i32, EeiError> {
        let to = memory::read_address(mem, address_offset)?;
        let data = memory::read_bytes(mem, data_offset, data_length)?;
        let value = self.env.call_value;
        let (code, output) = self.dispatcher.call(
            &mut self.env,
            CallKind::Delegate,
            gas as u64,
            &to,
            &value,
            &data,
        )?;
        if !output.is_empty() {
            self.env.set_return_value(output);
        }
        Ok(code)
    }

    // ── Storage ──

    /// `storageStore(pathOffset, valueOffset)` — 5000 base. Clearing a
    /// set slot deletes it and credits a 15000 refund; populating an
    /// unset slot costs an extra 15000; overwriting is base cost only.
    pub fn storage_store(
        &mut self,
        mem: &mut [u8],
        path_offset: u32,
        value_offset: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(G_SSTORE)?;
        let key = memory::read_bytes32(mem, path_offset)?;
        let value = memory::read_bytes32(mem, value_offset)?;
        let addr = self.env.address;
        let prev = self.env.state()?.storage_get(&addr, &key);
        if bytes32_is_zero(&value) {
            if prev.is_some() {
                self.env.state()?.storage_delete(&addr, &key);
                self.env.gas.credit_refund(R_SSTORE_CLEAR);
            }
            // Storing zero into an unset slot leaves it unset.
            return Ok(());
        }
        if prev.is_none() {
            self.env.gas.charge(G_SSTORE_SET)?;
        }
        self.env.state()?.storage_set(&addr, key, value);
        Ok(())
    }

    /// `storageLoad(pathOffset, resultOffset)` — 50 gas; an unset slot
    /// reads as the 32-byte zero value.
    pub fn storage_load(
        &mut self,
        mem: &mut [u8],
        path_offset: u32,
        result_offset: u32,
    ) -> Result<(), EeiError> {
        self.env.gas.charge(G_SLOAD)?;
        let key = memory::read_bytes32(mem, path_offset)?;
        let addr = self.env.address;
        let value = self
            .env
            .state()?
            .storage_get(&addr, &key)
            .unwrap_or(ZERO_BYTES32);
        memory::write_bytes32(mem, result_offset, &value)
    }

    // ── Halt family ──

    /// `return(offset, length)` — captures the return buffer when
    /// `length > 0`; last call wins. No gas charge.
    pub fn return_data(
        &mut self,
        mem: &mut [u8],
        data_offset: u32,
        length: u32,
    ) -> Result<(), EeiError> {
        if length > 0 {
            let data = memory::read_bytes(mem, data_offset, length)?;
            self.env.set_return_value(data);
        }
        Ok(())
    }

    /// `selfDestruct(addressOffset)` — flags the environment, records
    /// the beneficiary, and credits a 24000 refund. Balance transfer is
    /// left to the caller after halt. No gas charge.
    pub fn self_destruct(&mut self, mem: &mut [u8], address_offset: u32) -> Result<(), EeiError> {
        let beneficiary = memory::read_address(mem, address_offset)?;
        self.env.mark_self_destruct(beneficiary);
        self.env.gas.credit_refund(R_SELFDESTRUCT);
        Ok(())
    }
}
