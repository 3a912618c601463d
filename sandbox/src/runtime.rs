//! Sandbox runtime — Wasmtime engine, module loading, and invocation.
//!
//! The `Sandbox` struct is the main entry point. It compiles and
//! validates a WASM module once, then runs invocations by creating a
//! fresh instance per call so no state leaks between runs.

use std::path::Path;
use std::sync::Arc;

use wasmtime::{Config, Engine, Linker, Module, Store, StoreLimitsBuilder};

use eei_hostapi::{ChainHistory, EeiError};

use crate::config::{EnvConfig, SandboxConfig};
use crate::eei::EnvInterface;
use crate::env::{Environment, ExecutionOutcome, StateHandle};
use crate::error::SandboxError;
use crate::linker::register_host_functions;
use crate::validation::validate_module;

/// The deterministic WASM execution sandbox.
///
/// Compiles and validates a module up front; each `run` gets a fresh
/// instance, store, and environment.
pub struct Sandbox {
    engine: Engine,
    module: Module,
    config: SandboxConfig,
}

impl Sandbox {
    /// Create a new sandbox from WASM bytecode (binary or WAT).
    ///
    /// Validates the module's exports and imports before accepting.
    pub fn new(wasm_bytes: &[u8], config: SandboxConfig) -> Result<Self, SandboxError> {
        let engine = create_engine(&config)?;
        let module = Module::new(&engine, wasm_bytes)?;
        validate_module(&module)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    /// Load from a `.wasm` file path.
    pub fn from_file(path: &Path, config: SandboxConfig) -> Result<Self, SandboxError> {
        let engine = create_engine(&config)?;
        let module = Module::from_file(&engine, path)?;
        validate_module(&module)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    /// Run one invocation with the default collaborators.
    ///
    /// Builds the environment from `env_config`, instantiates the
    /// module, calls `main`, and returns the extracted outcome.
    /// Storage effects land in `state` as the module runs; logs,
    /// return value, and refunds are discarded if the module aborts.
    pub fn run(
        &self,
        env_config: EnvConfig,
        state: StateHandle,
        history: Arc<dyn ChainHistory>,
    ) -> Result<ExecutionOutcome, SandboxError> {
        let env = Environment::new(env_config, state, history);
        self.run_with(EnvInterface::new(env))
    }

    /// Run one invocation against a pre-built interface, for callers
    /// that supply their own dispatcher or resume hook.
    pub fn run_with(&self, eei: EnvInterface) -> Result<ExecutionOutcome, SandboxError> {
        let mut store = Store::new(&self.engine, eei);
        store.data_mut().limits = StoreLimitsBuilder::new()
            .memory_size((self.config.max_memory_pages as usize) * 65536)
            .build();
        store.limiter(|eei| &mut eei.limits);
        store.set_fuel(self.config.fuel_limit)?;

        let mut linker = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;

        let instance = linker.instantiate(&mut store, &self.module)?;
        let main = instance.get_typed_func::<(), ()>(&mut store, "main")?;

        let call_result = main.call(&mut store, ());
        let env = store.into_data().into_env();
        match call_result {
            Ok(()) => Ok(env.outcome()),
            Err(err) => Err(classify_trap(err)),
        }
    }
}

/// Create a Wasmtime engine with deterministic configuration.
fn create_engine(config: &SandboxConfig) -> Result<Engine, SandboxError> {
    let mut wasm_config = Config::new();

    // Fuel metering — prevents infinite loops independent of gas
    wasm_config.consume_fuel(true);

    // Determinism enforcement
    wasm_config.wasm_threads(false);
    wasm_config.wasm_simd(false);
    wasm_config.wasm_relaxed_simd(false);
    wasm_config.wasm_multi_memory(false);
    wasm_config.cranelift_nan_canonicalization(true);

    // Compilation layout tuning only. The page cap itself is enforced
    // per store through a `StoreLimits` resource limiter in `run_with`.
    let max_bytes = (config.max_memory_pages as u64) * 65536;
    wasm_config.memory_guaranteed_dense_image_size(max_bytes.min(16 * 1024 * 1024));

    Ok(Engine::new(&wasm_config)?)
}

/// Convert a `main` trap into a `SandboxError`.
///
/// Interface errors travel through the trap as their original
/// `EeiError` and are recovered by downcast; gas exhaustion gets its
/// own variant so callers can tell it from pointer or argument faults.
fn classify_trap(err: anyhow::Error) -> SandboxError {
    if let Some(eei) = err.downcast_ref::<EeiError>() {
        return SandboxError::from(eei.clone());
    }
    if let Some(trap) = err.downcast_ref::<wasmtime::Trap>() {
        if *trap == wasmtime::Trap::OutOfFuel {
            return SandboxError::FuelExhausted;
        }
    }
    SandboxError::GuestTrapped(format!("{err:#}"))
}
