//! Sandbox error types.

use eei_hostapi::EeiError;

/// Top-level error type for the sandbox crate.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Wasmtime engine, compilation, or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing exports, bad imports, etc.).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Fatal environment interface error during execution.
    #[error("environment interface error: {0}")]
    Eei(EeiError),

    /// Gas exhausted during execution.
    #[error("out of gas: {0}")]
    OutOfGas(EeiError),

    /// Fuel exhausted during execution.
    #[error("fuel exhausted (instruction limit)")]
    FuelExhausted,

    /// WASM guest trapped for a non-host reason.
    #[error("guest trapped: {0}")]
    GuestTrapped(String),
}

impl From<EeiError> for SandboxError {
    fn from(err: EeiError) -> Self {
        match err {
            EeiError::OutOfGas { .. } => Self::OutOfGas(err),
            _ => Self::Eei(err),
        }
    }
}
