//! # Vesper Runtime
//!
//! Execution-layer primitives for the Vesper scripting runtime. The crate
//! currently hosts the generator resumption engine: resumable function
//! activations that suspend at yield points and expose the standard
//! iterator protocol (`next`, `return`, `throw`) with `yield*` delegation.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod generators;
