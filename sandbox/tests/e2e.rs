//! End-to-end tests: WAT guests importing `ethereum` host functions,
//! executed through the sandbox runtime.

mod common;

use std::sync::Arc;

use common::*;
use eei_hostapi::traits::EmptyHistory;
use eei_sandbox::{EnvConfig, SandboxError};

fn run(
    wat: &str,
    config: EnvConfig,
) -> Result<eei_sandbox::ExecutionOutcome, SandboxError> {
    let sandbox = sandbox_from_wat(wat);
    sandbox.run(config, mem_state(), Arc::new(EmptyHistory))
}

#[test]
fn test_call_data_echo_is_reversed() {
    // callDataCopy into memory, then return the copy. The plain copy
    // accessor reverses the buffer on the way in.
    let wat = r#"
        (module
            (import "ethereum" "callDataCopy" (func $callDataCopy (param i32 i32 i32)))
            (import "ethereum" "return" (func $return (param i32 i32)))
            (memory (export "memory") 1)
            (func (export "main")
                i32.const 0   ;; resultOffset
                i32.const 0   ;; dataOffset
                i32.const 4   ;; length
                call $callDataCopy
                i32.const 0
                i32.const 4
                call $return)
        )
    "#;
    let outcome = run(
        wat,
        EnvConfig {
            call_data: vec![1, 2, 3, 4],
            gas_left: 10_000,
            ..EnvConfig::default()
        },
    )
    .unwrap();
    assert_eq!(outcome.return_value, vec![4, 3, 2, 1]);
    // callDataCopy(4 bytes) = 6; return is free.
    assert_eq!(outcome.gas_left, 10_000 - 6);
}

#[test]
fn test_storage_store_persists_into_state() {
    // Key and value preloaded via data segments (wire byte order).
    let wat = r#"
        (module
            (import "ethereum" "storageStore" (func $storageStore (param i32 i32)))
            (memory (export "memory") 1)
            (data (i32.const 0) "\2a")
            (data (i32.const 32) "\07")
            (func (export "main")
                i32.const 0
                i32.const 32
                call $storageStore)
        )
    "#;
    let sandbox = sandbox_from_wat(wat);
    let state = mem_state();
    let address = [0x33u8; 20];
    let outcome = sandbox
        .run(
            EnvConfig {
                address,
                gas_left: 100_000,
                ..EnvConfig::default()
            },
            state.clone(),
            Arc::new(EmptyHistory),
        )
        .unwrap();
    assert_eq!(outcome.gas_left, 100_000 - 20_000);

    // Wire key [0x2a, 0...] is canonical [0..., 0x2a]; likewise the value.
    let mut key = [0u8; 32];
    key[31] = 0x2a;
    let mut value = [0u8; 32];
    value[31] = 0x07;
    let stored = state.lock().unwrap().storage_get(&address, &key);
    assert_eq!(stored, Some(value));
}

#[test]
fn test_log_with_topic() {
    let wat = r#"
        (module
            (import "ethereum" "log" (func $log (param i32 i32 i32 i32 i32 i32 i32)))
            (memory (export "memory") 1)
            (data (i32.const 0) "\de\ad")
            (data (i32.const 32) "\11")
            (func (export "main")
                i32.const 0   ;; dataOffset
                i32.const 2   ;; length
                i32.const 1   ;; numTopics
                i32.const 32  ;; topic1
                i32.const 0
                i32.const 0
                i32.const 0
                call $log)
        )
    "#;
    let outcome = run(
        wat,
        EnvConfig {
            gas_left: 10_000,
            ..EnvConfig::default()
        },
    )
    .unwrap();
    assert_eq!(outcome.logs.len(), 1);
    assert_eq!(outcome.logs[0].data, vec![0xde, 0xad]);
    assert_eq!(outcome.logs[0].topics.len(), 1);
    assert_eq!(outcome.logs[0].topics[0][0], 0x11);
    assert_eq!(outcome.gas_left, 10_000 - (375 + 8 * 2 + 375));
}

#[test]
fn test_self_destruct_outcome() {
    let wat = r#"
        (module
            (import "ethereum" "selfDestruct" (func $selfDestruct (param i32)))
            (memory (export "memory") 1)
            (data (i32.const 0) "\09\09\09\09\09\09\09\09\09\09\09\09\09\09\09\09\09\09\09\09")
            (func (export "main")
                i32.const 0
                call $selfDestruct)
        )
    "#;
    let outcome = run(
        wat,
        EnvConfig {
            gas_left: 10_000,
            ..EnvConfig::default()
        },
    )
    .unwrap();
    assert_eq!(outcome.self_destruct, Some([0x09u8; 20]));
    assert_eq!(outcome.gas_refund, 24_000);
    assert_eq!(outcome.gas_left, 10_000);
}

#[test]
fn test_out_of_gas_keeps_prior_writes() {
    // Store a slot, then burn more gas than remains. The abort must
    // leave the completed write visible in state.
    let wat = r#"
        (module
            (import "ethereum" "storageStore" (func $storageStore (param i32 i32)))
            (import "ethereum" "useGas" (func $useGas (param i32 i32)))
            (memory (export "memory") 1)
            (data (i32.const 0) "\01")
            (data (i32.const 32) "\05")
            (func (export "main")
                i32.const 0
                i32.const 32
                call $storageStore
                i32.const 1   ;; high word: 2^32 gas, far beyond remaining
                i32.const 0
                call $useGas)
        )
    "#;
    let sandbox = sandbox_from_wat(wat);
    let state = mem_state();
    let address = [0x44u8; 20];
    let err = sandbox
        .run(
            EnvConfig {
                address,
                gas_left: 30_000,
                ..EnvConfig::default()
            },
            state.clone(),
            Arc::new(EmptyHistory),
        )
        .unwrap_err();
    assert!(matches!(err, SandboxError::OutOfGas(_)));

    let mut key = [0u8; 32];
    key[31] = 0x01;
    assert!(state.lock().unwrap().storage_get(&address, &key).is_some());
}

#[test]
fn test_nested_call_reports_stub_success() {
    // The call stub always reports trap code 1; the guest stores the
    // code so the outcome is observable.
    let wat = r#"
        (module
            (import "ethereum" "call"
                (func $call (param i64 i32 i32 i32 i32 i32) (result i32)))
            (import "ethereum" "storageStore" (func $storageStore (param i32 i32)))
            (memory (export "memory") 1)
            (func (export "main")
                ;; value slot <- call(gas=5000, addr@64, value@96, data@112 len 0, cb=0)
                i32.const 32
                i64.const 5000
                i32.const 64
                i32.const 96
                i32.const 112
                i32.const 0
                i32.const 0
                call $call
                i32.store
                ;; storageStore(key@0, value@32)
                i32.const 0
                i32.const 32
                call $storageStore)
        )
    "#;
    let sandbox = sandbox_from_wat(wat);
    let state = mem_state();
    let address = [0x55u8; 20];
    let outcome = sandbox
        .run(
            EnvConfig {
                address,
                gas_left: 100_000,
                ..EnvConfig::default()
            },
            state.clone(),
            Arc::new(EmptyHistory),
        )
        .unwrap();
    // Zero value transferred: call base 40 only, plus the new slot.
    assert_eq!(outcome.gas_left, 100_000 - 40 - 20_000);

    // Wire value [1, 0, ..] is canonical [.., 0, 1].
    let mut value = [0u8; 32];
    value[31] = 0x01;
    let stored = state.lock().unwrap().storage_get(&address, &[0u8; 32]);
    assert_eq!(stored, Some(value));
}

#[test]
fn test_block_context_accessors() {
    // Guest returns blockNumber as 8 little-endian bytes.
    let wat = r#"
        (module
            (import "ethereum" "getBlockNumber" (func $getBlockNumber (result i64)))
            (import "ethereum" "return" (func $return (param i32 i32)))
            (memory (export "memory") 1)
            (func (export "main")
                i32.const 0
                call $getBlockNumber
                i64.store
                i32.const 0
                i32.const 8
                call $return)
        )
    "#;
    let outcome = run(
        wat,
        EnvConfig {
            block_number: 0x0102_0304,
            gas_left: 10_000,
            ..EnvConfig::default()
        },
    )
    .unwrap();
    assert_eq!(
        outcome.return_value,
        0x0102_0304u64.to_le_bytes().to_vec()
    );
    assert_eq!(outcome.gas_left, 10_000 - 2);
}

#[test]
fn test_memory_growth_capped_at_configured_pages() {
    // Under the default 256-page cap, growing by 300 pages must fail:
    // memory.grow reports -1 and the module keeps running.
    let wat = r#"
        (module
            (memory (export "memory") 1 1000)
            (func (export "main")
                i32.const 300
                memory.grow
                i32.const -1
                i32.ne
                if
                    unreachable
                end)
        )
    "#;
    let outcome = run(wat, EnvConfig::default()).unwrap();
    assert_eq!(outcome.gas_left, 1_000_000);
}

#[test]
fn test_memory_growth_within_cap_succeeds() {
    let wat = r#"
        (module
            (memory (export "memory") 1 1000)
            (func (export "main")
                i32.const 100
                memory.grow
                i32.const -1
                i32.eq
                if
                    unreachable
                end)
        )
    "#;
    run(wat, EnvConfig::default()).unwrap();
}

#[test]
fn test_rejects_module_without_main() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "run"))
        )
    "#;
    let err = eei_sandbox::Sandbox::new(wat.as_bytes(), Default::default())
        .err()
        .unwrap();
    assert!(matches!(err, SandboxError::ValidationError(_)));
}
