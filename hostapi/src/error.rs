//! Error taxonomy for the environment interface.
//!
//! Every variant is fatal: the boundary has no local recovery or retry.
//! An error surfaces to the execution engine as the terminal outcome of
//! the invocation, with no partial commit of the in-flight write.

use std::fmt;

/// Wire error codes reported to the execution engine.
///
/// `0` = OK, non-zero = fatal abort cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    OutOfGas = 1,
    OutOfBounds = 2,
    InvalidArgument = 3,
    Internal = 4,
}

impl ErrorCode {
    /// Convert from an i32 wire code.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::OutOfGas),
            2 => Some(Self::OutOfBounds),
            3 => Some(Self::InvalidArgument),
            4 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Return the i32 representation of this code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::OutOfGas => write!(f, "ERR_OUT_OF_GAS"),
            Self::OutOfBounds => write!(f, "ERR_OUT_OF_BOUNDS"),
            Self::InvalidArgument => write!(f, "ERR_INVALID_ARGUMENT"),
            Self::Internal => write!(f, "ERR_INTERNAL"),
        }
    }
}

/// Fatal error raised by an environment interface operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EeiError {
    /// A gas debit exceeded the remaining gas. The meter is unchanged.
    #[error("out of gas: needed {needed}, {left} left")]
    OutOfGas { needed: u64, left: u64 },

    /// A memory window exceeded the module's linear memory.
    #[error("memory access out of bounds: offset {offset}, len {len}, memory size {size}")]
    OutOfBounds { offset: u64, len: u64, size: usize },

    /// A host-call argument was outside its allowed range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal boundary failure (state handle, queue bookkeeping).
    #[error("internal error: {0}")]
    Internal(String),
}

impl EeiError {
    /// The wire code reported for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfGas { .. } => ErrorCode::OutOfGas,
            Self::OutOfBounds { .. } => ErrorCode::OutOfBounds,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}
