//! Host function registration via Wasmtime linker.
//!
//! Registers the `ethereum` import namespace with the Wasmtime
//! `Linker`. Each function:
//! 1. Extracts memory and the `EnvInterface` from the `Caller`
//! 2. Hands both to the matching façade method
//! 3. Converts any interface error into a trap
//!
//! Unlike an errno-style ABI there is no error code returned to the
//! guest: every interface failure (gas exhaustion, bad pointer, bad
//! argument) aborts the invocation.

use anyhow::{anyhow, Error};
use wasmtime::{Caller, Linker};

use crate::eei::EnvInterface;
use crate::error::SandboxError;

/// Run a façade method against the guest's exported memory.
///
/// `data_and_store_mut` splits the store so the closure gets the linear
/// memory and the interface as disjoint mutable borrows.
fn with_eei<T>(
    caller: &mut Caller<'_, EnvInterface>,
    f: impl FnOnce(&mut EnvInterface, &mut [u8]) -> Result<T, eei_hostapi::EeiError>,
) -> Result<T, Error> {
    let mem = caller
        .get_export("memory")
        .and_then(|e| e.into_memory())
        .ok_or_else(|| anyhow!("module does not export 'memory'"))?;
    let (data, eei) = mem.data_and_store_mut(caller);
    f(eei, data).map_err(Error::new)
}

/// Register every `ethereum` host function with the linker.
pub fn register_host_functions(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    register_gas(linker)?;
    register_identity(linker)?;
    register_call_data(linker)?;
    register_code(linker)?;
    register_external_state(linker)?;
    register_block(linker)?;
    register_log(linker)?;
    register_call_family(linker)?;
    register_storage(linker)?;
    register_halt(linker)?;
    Ok(())
}

// ── Gas ──

fn register_gas(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "useGas",
        |mut caller: Caller<'_, EnvInterface>, high: i32, low: i32| -> Result<(), Error> {
            caller.data_mut().use_gas(high, low).map_err(Error::new)
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getGasLeft",
        |mut caller: Caller<'_, EnvInterface>| -> Result<(i32, i32), Error> {
            caller.data_mut().get_gas_left().map_err(Error::new)
        },
    )?;
    Ok(())
}

// ── Identity ──

fn register_identity(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "getAddress",
        |mut caller: Caller<'_, EnvInterface>, result_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_address(mem, result_offset as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getTxOrigin",
        |mut caller: Caller<'_, EnvInterface>, result_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_tx_origin(mem, result_offset as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getCaller",
        |mut caller: Caller<'_, EnvInterface>, result_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_caller(mem, result_offset as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getCallValue",
        |mut caller: Caller<'_, EnvInterface>, result_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_call_value(mem, result_offset as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getTxGasPrice",
        |mut caller: Caller<'_, EnvInterface>, result_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_tx_gas_price(mem, result_offset as u32)
            })
        },
    )?;
    Ok(())
}

// ── Call data ──

fn register_call_data(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "getCallDataSize",
        |mut caller: Caller<'_, EnvInterface>| -> Result<i32, Error> {
            caller.data_mut().get_call_data_size().map_err(Error::new)
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "callDataCopy",
        |mut caller: Caller<'_, EnvInterface>,
         result_offset: i32,
         data_offset: i32,
         length: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.call_data_copy(mem, result_offset as u32, data_offset as u32, length as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "callDataCopy256",
        |mut caller: Caller<'_, EnvInterface>,
         result_offset: i32,
         data_offset: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.call_data_copy256(mem, result_offset as u32, data_offset as u32)
            })
        },
    )?;
    Ok(())
}

// ── Own code ──

fn register_code(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "getCodeSize",
        |mut caller: Caller<'_, EnvInterface>| -> Result<i32, Error> {
            caller.data_mut().get_code_size().map_err(Error::new)
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "codeCopy",
        |mut caller: Caller<'_, EnvInterface>,
         result_offset: i32,
         code_offset: i32,
         length: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.code_copy(mem, result_offset as u32, code_offset as u32, length as u32)
            })
        },
    )?;
    Ok(())
}

// ── External account state ──

fn register_external_state(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "getBalance",
        |mut caller: Caller<'_, EnvInterface>,
         address_offset: i32,
         result_offset: i32,
         cb_index: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_balance(
                    mem,
                    address_offset as u32,
                    result_offset as u32,
                    cb_index as u32,
                )
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getExternalCodeSize",
        |mut caller: Caller<'_, EnvInterface>,
         address_offset: i32,
         cb_index: i32|
         -> Result<i32, Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_external_code_size(mem, address_offset as u32, cb_index as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "externalCodeCopy",
        |mut caller: Caller<'_, EnvInterface>,
         address_offset: i32,
         result_offset: i32,
         code_offset: i32,
         length: i32,
         cb_index: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.external_code_copy(
                    mem,
                    address_offset as u32,
                    result_offset as u32,
                    code_offset as u32,
                    length as u32,
                    cb_index as u32,
                )
            })
        },
    )?;
    Ok(())
}

// ── Block context ──

fn register_block(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "getBlockHash",
        |mut caller: Caller<'_, EnvInterface>,
         number: i64,
         result_offset: i32,
         cb_index: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_block_hash(mem, number, result_offset as u32, cb_index as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getBlockCoinbase",
        |mut caller: Caller<'_, EnvInterface>, result_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_block_coinbase(mem, result_offset as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getBlockTimestamp",
        |mut caller: Caller<'_, EnvInterface>| -> Result<i64, Error> {
            caller.data_mut().get_block_timestamp().map_err(Error::new)
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getBlockNumber",
        |mut caller: Caller<'_, EnvInterface>| -> Result<i64, Error> {
            caller.data_mut().get_block_number().map_err(Error::new)
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getBlockDifficulty",
        |mut caller: Caller<'_, EnvInterface>, result_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.get_block_difficulty(mem, result_offset as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "getBlockGasLimit",
        |mut caller: Caller<'_, EnvInterface>| -> Result<i64, Error> {
            caller.data_mut().get_block_gas_limit().map_err(Error::new)
        },
    )?;
    Ok(())
}

// ── Logging ──

fn register_log(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "log",
        |mut caller: Caller<'_, EnvInterface>,
         data_offset: i32,
         length: i32,
         num_topics: i32,
         topic1: i32,
         topic2: i32,
         topic3: i32,
         topic4: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.log(
                    mem,
                    data_offset as u32,
                    length as u32,
                    num_topics,
                    topic1 as u32,
                    topic2 as u32,
                    topic3 as u32,
                    topic4 as u32,
                )
            })
        },
    )?;
    Ok(())
}

// ── Call family ──

fn register_call_family(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "create",
        |mut caller: Caller<'_, EnvInterface>,
         value_offset: i32,
         code_offset: i32,
         code_length: i32,
         result_offset: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.create(
                    mem,
                    value_offset as u32,
                    code_offset as u32,
                    code_length as u32,
                    result_offset as u32,
                )
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "call",
        |mut caller: Caller<'_, EnvInterface>,
         gas: i64,
         address_offset: i32,
         value_offset: i32,
         data_offset: i32,
         data_length: i32,
         cb_index: i32|
         -> Result<i32, Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.call(
                    mem,
                    gas,
                    address_offset as u32,
                    value_offset as u32,
                    data_offset as u32,
                    data_length as u32,
                    cb_index as u32,
                )
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "callCode",
        |mut caller: Caller<'_, EnvInterface>,
         gas: i64,
         address_offset: i32,
         value_offset: i32,
         data_offset: i32,
         data_length: i32,
         cb_index: i32|
         -> Result<i32, Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.call_code(
                    mem,
                    gas,
                    address_offset as u32,
                    value_offset as u32,
                    data_offset as u32,
                    data_length as u32,
                    cb_index as u32,
                )
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "callDelegate",
        |mut caller: Caller<'_, EnvInterface>,
         gas: i64,
         address_offset: i32,
         data_offset: i32,
         data_length: i32|
         -> Result<i32, Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.call_delegate(
                    mem,
                    gas,
                    address_offset as u32,
                    data_offset as u32,
                    data_length as u32,
                )
            })
        },
    )?;
    Ok(())
}

// ── Storage ──

fn register_storage(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "storageStore",
        |mut caller: Caller<'_, EnvInterface>,
         path_offset: i32,
         value_offset: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.storage_store(mem, path_offset as u32, value_offset as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "storageLoad",
        |mut caller: Caller<'_, EnvInterface>,
         path_offset: i32,
         result_offset: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.storage_load(mem, path_offset as u32, result_offset as u32)
            })
        },
    )?;
    Ok(())
}

// ── Halt family ──

fn register_halt(linker: &mut Linker<EnvInterface>) -> Result<(), SandboxError> {
    linker.func_wrap(
        "ethereum",
        "return",
        |mut caller: Caller<'_, EnvInterface>,
         data_offset: i32,
         length: i32|
         -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.return_data(mem, data_offset as u32, length as u32)
            })
        },
    )?;
    linker.func_wrap(
        "ethereum",
        "selfDestruct",
        |mut caller: Caller<'_, EnvInterface>, address_offset: i32| -> Result<(), Error> {
            with_eei(&mut caller, |eei, mem| {
                eei.self_destruct(mem, address_offset as u32)
            })
        },
    )?;
    Ok(())
}
