//! # Vesper Core
//!
//! Core types for the Vesper scripting runtime.
//!
//! This crate provides the foundational building blocks shared across Vesper
//! components:
//!
//! - **Value System**: compact tagged representation of script values
//! - **Error Handling**: the `ScriptError` taxonomy and result alias
//! - **Source Positions**: line-level locations carried on diagnostics

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod position;
pub mod value;

pub use error::{ScriptError, ScriptResult};
pub use position::SourcePosition;
pub use value::Value;

/// Vesper runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
