//! `eei-sandbox` — the host-call boundary for a gas-metered wasm module.
//!
//! This crate mediates every interaction a sandboxed module has with the
//! outside world: account balances, calls and contract creation,
//! persistent per-account storage, block metadata, logging, and gas
//! accounting. It enforces:
//!
//! - **Gas metering:** every host function debits a fixed or
//!   length-dependent cost before doing anything else; exhaustion aborts
//!   the invocation fatally
//! - **Bit-exact marshaling:** 64- and 256-bit quantities cross the
//!   32-bit module boundary losslessly, with the wire byte-order
//!   conventions preserved exactly
//! - **Effect ordering:** conceptually asynchronous state queries become
//!   visible in strict host-call-issue order via the ops queue
//! - **Determinism:** no threads, no SIMD, NaN canonicalization, fuel
//!
//! The primary entry points are [`EnvInterface`] for driving the
//! boundary directly and [`Sandbox::run`] for executing a wasm module
//! against it.

pub mod error;
pub mod config;
pub mod memory;
pub mod shim;
pub mod env;
pub mod queue;
pub mod dispatch;
pub mod eei;
pub mod validation;
pub mod linker;
pub mod runtime;

pub use config::{EnvConfig, SandboxConfig};
pub use eei::EnvInterface;
pub use env::{Environment, ExecutionOutcome, StateHandle};
pub use error::SandboxError;
pub use runtime::Sandbox;
