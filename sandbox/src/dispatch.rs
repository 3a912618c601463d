//! Call-family semantics: create, call, callCode, callDelegate.
//!
//! The dispatcher owns the value-transfer gas math and the seams to the
//! nested-execution collaborators. Nested execution itself is stubbed
//! (see `eei_hostapi::StubEngine`); a real engine can be substituted
//! without touching the gas or ordering logic here.

use eei_hostapi::gas::{G_CALL, G_CALLSTIPEND, G_CALLVALUE, G_CREATE};
use eei_hostapi::traits::{Blake3Deriver, StubEngine};
use eei_hostapi::types::{bytes32_is_zero, Address, Bytes32, ZERO_ADDRESS};
use eei_hostapi::{AddressDeriver, CallEngine, CallKind, EeiError};

use crate::env::Environment;

/// Dispatches call-family operations to the nested-execution seams.
pub struct CallDispatcher {
    engine: Box<dyn CallEngine>,
    deriver: Box<dyn AddressDeriver>,
}

impl Default for CallDispatcher {
    fn default() -> Self {
        Self {
            engine: Box::new(StubEngine),
            deriver: Box::new(Blake3Deriver),
        }
    }
}

impl CallDispatcher {
    /// Build a dispatcher around explicit collaborators.
    pub fn new(engine: Box<dyn CallEngine>, deriver: Box<dyn AddressDeriver>) -> Self {
        Self { engine, deriver }
    }

    /// Contract creation. Charges 32000.
    ///
    /// If the requested value exceeds the value deposited with the
    /// current call, creation fails and yields the zero address.
    /// Otherwise the new address is derived from `(address, nonce)`.
    /// Code is not deployed or executed — nested execution is stubbed.
    pub fn create(&mut self, env: &mut Environment, value: &Bytes32) -> Result<Address, EeiError> {
        env.gas.charge(G_CREATE)?;
        if value > &env.call_value {
            return Ok(ZERO_ADDRESS);
        }
        Ok(self.deriver.derive(&env.address, env.nonce))
    }

    /// Message call (`Call` / `CallCode` through the queue path,
    /// `Delegate` synchronously). Charges 40 base.
    ///
    /// A nonzero-value call additionally charges
    /// `(9000 − 2300) + forwarded` and then credits `forwarded` back:
    /// the net surcharge is a constant 6700, but the forwarded gas must
    /// be momentarily available or the debit fails.
    pub fn call(
        &mut self,
        env: &mut Environment,
        kind: CallKind,
        gas: u64,
        to: &Address,
        value: &Bytes32,
        data: &[u8],
    ) -> Result<(i32, Vec<u8>), EeiError> {
        env.gas.charge(G_CALL)?;
        if kind != CallKind::Delegate && !bytes32_is_zero(value) {
            env.gas
                .charge((G_CALLVALUE - G_CALLSTIPEND).saturating_add(gas))?;
            env.gas.credit(gas);
        }
        self.engine.call(kind, gas, to, value, data)
    }
}
