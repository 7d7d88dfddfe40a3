//! Error types and result definitions for Vesper.
//!
//! `ScriptError` covers every failure a protocol call can surface. Internal
//! control signals (continuation teardown, legacy completion) are not errors
//! and live in the runtime's resume-signal type instead; by the time a
//! `ScriptError` reaches a caller it is a real, user-visible failure.

use crate::position::SourcePosition;
use crate::value::Value;
use thiserror::Error;

/// The unified result type used throughout Vesper.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors surfaced by generator protocol calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// A protocol call arrived while the generator (or one it delegates
    /// into) was executing. Never retried.
    #[error("TypeError: generator already executing")]
    GeneratorExecuting,

    /// A `throw` was forwarded into a delegate that has no throw capability.
    #[error("TypeError: yield* delegate has no throw method")]
    DelegationUnsupported,

    /// Protocol-level type mismatch, e.g. a `yield*` target that is not
    /// iterable.
    #[error("TypeError: {message}")]
    Type {
        /// Error description.
        message: String,
    },

    /// A script-thrown value propagating out of a generator, verbatim.
    #[error("uncaught exception: {value}")]
    Uncaught {
        /// The thrown value, unchanged.
        value: Value,
        /// Last known source location, when one was recorded.
        position: Option<SourcePosition>,
    },

    /// Engine contract violation (should never occur in a correct
    /// continuation implementation).
    #[error("InternalError: {message}")]
    Internal {
        /// Error description.
        message: String,
    },
}

impl ScriptError {
    /// Creates a type error.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    /// Creates an uncaught-exception error with no location.
    #[must_use]
    pub const fn uncaught(value: Value) -> Self {
        Self::Uncaught {
            value,
            position: None,
        }
    }

    /// Creates an uncaught-exception error at a source position.
    #[must_use]
    pub const fn uncaught_at(value: Value, position: SourcePosition) -> Self {
        Self::Uncaught {
            value,
            position: Some(position),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the thrown script value, if this error carries one.
    #[must_use]
    pub const fn thrown_value(&self) -> Option<&Value> {
        match self {
            Self::Uncaught { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the source position attached to this error, if any.
    #[must_use]
    pub const fn position(&self) -> Option<&SourcePosition> {
        match self {
            Self::Uncaught {
                position: Some(pos),
                ..
            } => Some(pos),
            _ => None,
        }
    }

    /// Returns the script-level exception type name.
    #[must_use]
    pub const fn exception_type(&self) -> &'static str {
        match self {
            Self::GeneratorExecuting | Self::DelegationUnsupported | Self::Type { .. } => {
                "TypeError"
            }
            Self::Uncaught { .. } => "Exception",
            Self::Internal { .. } => "InternalError",
        }
    }
}
