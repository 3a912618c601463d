//! Shared test helpers for integration tests.
//!
//! Provides JSON fixture parsing, environment/interface factories, and
//! a sandbox factory used across all integration test files.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use eei_hostapi::mem_store::AccountRecord;
use eei_hostapi::traits::EmptyHistory;
use eei_hostapi::types::{address_from_hex, bytes32_from_hex, bytes_from_hex, ZERO_BYTES32};
use eei_hostapi::MemAccounts;
use eei_sandbox::{EnvConfig, EnvInterface, Environment, Sandbox, SandboxConfig, StateHandle};

/// JSON representation of an invocation fixture.
///
/// Addresses and buffers are hex strings; `state` maps hex addresses to
/// account records. Per-account storage is always initialized empty
/// before a run, whatever the fixture says.
#[derive(Deserialize)]
pub struct Fixture {
    pub caller: String,
    pub address: String,
    pub coinbase: String,
    pub origin: String,
    #[serde(rename = "callData", default)]
    pub call_data: String,
    #[serde(rename = "callValue", default)]
    pub call_value: String,
    #[serde(default)]
    pub state: BTreeMap<String, FixtureAccount>,
}

#[derive(Deserialize)]
pub struct FixtureAccount {
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub storage: BTreeMap<String, String>,
}

/// Build an environment config and a populated account store from a
/// parsed fixture.
pub fn load_fixture(fixture: &Fixture) -> (EnvConfig, StateHandle) {
    let config = EnvConfig {
        caller: address_from_hex(&fixture.caller).expect("fixture caller"),
        address: address_from_hex(&fixture.address).expect("fixture address"),
        coinbase: address_from_hex(&fixture.coinbase).expect("fixture coinbase"),
        origin: address_from_hex(&fixture.origin).expect("fixture origin"),
        call_data: if fixture.call_data.is_empty() {
            Vec::new()
        } else {
            bytes_from_hex(&fixture.call_data).expect("fixture callData")
        },
        call_value: if fixture.call_value.is_empty() {
            ZERO_BYTES32
        } else {
            bytes32_from_hex(&fixture.call_value).expect("fixture callValue")
        },
        ..EnvConfig::default()
    };

    let mut accounts = MemAccounts::new();
    for (addr_hex, account) in &fixture.state {
        let addr = address_from_hex(addr_hex).expect("fixture account address");
        let record = AccountRecord {
            balance: if account.balance.is_empty() {
                ZERO_BYTES32
            } else {
                bytes32_from_hex(&account.balance).expect("fixture balance")
            },
            code: if account.code.is_empty() {
                Vec::new()
            } else {
                bytes_from_hex(&account.code).expect("fixture code")
            },
            // Storage starts empty for every run.
            storage: BTreeMap::new(),
        };
        accounts.insert(addr, record);
    }

    (config, Arc::new(Mutex::new(accounts)))
}

/// An empty in-memory account store behind the shared handle.
pub fn mem_state() -> StateHandle {
    Arc::new(Mutex::new(MemAccounts::new()))
}

/// Interface over an empty store with the given overrides.
pub fn interface(config: EnvConfig) -> EnvInterface {
    interface_with_state(config, mem_state())
}

/// Interface over an explicit store.
pub fn interface_with_state(config: EnvConfig, state: StateHandle) -> EnvInterface {
    EnvInterface::new(Environment::new(config, state, Arc::new(EmptyHistory)))
}

/// Linear-memory stand-in for façade-level tests.
pub fn guest_memory(len: usize) -> Vec<u8> {
    vec![0u8; len]
}

/// Compile a WAT module into a sandbox with default limits.
pub fn sandbox_from_wat(wat: &str) -> Sandbox {
    Sandbox::new(wat.as_bytes(), SandboxConfig::default()).expect("test module should validate")
}
