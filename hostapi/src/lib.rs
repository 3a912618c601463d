//! `eei-hostapi` — shared types and collaborator seams for the EEI sandbox.
//!
//! This crate defines everything the host-call boundary needs that is not
//! tied to a wasm runtime:
//!
//! - `types` — `Address`, `Bytes32`, `LogEntry`, hex and byte-order helpers
//! - `ErrorCode` / `EeiError` — the fatal error taxonomy and wire codes
//! - `gas` — the gas schedule constants and cost functions
//! - `GasMeter` — gas debit/credit with fatal-on-exhaustion semantics
//! - `traits` — `AccountStore`, `ChainHistory`, `AddressDeriver`,
//!   `CallEngine`, `ModuleResume` collaborator interfaces
//! - `MemAccounts` — in-memory `AccountStore` for testing
//!
//! The `eei-sandbox` crate builds the wasm-facing boundary on top of these.

pub mod error;
pub mod types;
pub mod gas;
pub mod gas_meter;
pub mod traits;
pub mod mem_store;

// Re-export commonly used types at the crate root.
pub use error::{EeiError, ErrorCode};
pub use gas_meter::GasMeter;
pub use mem_store::MemAccounts;
pub use traits::{AccountStore, AddressDeriver, CallEngine, CallKind, ChainHistory, ModuleResume};
pub use types::{Address, Bytes32, LogEntry};
