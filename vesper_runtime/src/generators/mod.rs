//! Generator objects and their resumption engine.
//!
//! A generator couples a resumable activation (a [`Continuation`] plus its
//! opaque [`ActivationState`]) with a four-state machine and drives it
//! through the iterator protocol: `next`, `return` and `throw`, each
//! producing a `{value, done}` [`IterResult`]. `yield*` delegation forwards
//! protocol calls into an inner iterator resolved through an
//! [`IteratorProvider`].
//!
//! Module layout:
//!
//! * [`state`]: the generator state machine.
//! * [`protocol`]: protocol operations and the iterator result shape.
//! * [`continuation`]: the resumable-activation boundary.
//! * [`delegate`]: `yield*` targets and iterator resolution.
//! * [`object`]: the generator object and its handle semantics.
//! * [`resume`]: the resume engine behind the protocol methods.
//! * [`program`]: scripted bodies for embedders and tests.

pub mod continuation;
pub mod delegate;
pub mod object;
pub mod program;
pub mod protocol;
pub mod resume;
pub mod state;

pub use continuation::{ActivationState, Continuation, ResumeOp, ResumeSignal, Resumption};
pub use delegate::{Delegate, DelegateIterator, IteratorProvider, TableIteratorProvider};
pub use object::Generator;
pub use program::{Program, ProgramBuilder, Step};
pub use protocol::{IterResult, ProtocolOp};
pub use state::GeneratorState;
