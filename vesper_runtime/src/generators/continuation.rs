//! The continuation collaborator boundary.
//!
//! A continuation is the opaque resumable activation produced by whatever
//! compiles generator bodies; this engine only knows how to drive it:
//! "resume with an operation and a value". One resume runs the activation to
//! its next suspension or to completion. Completion travels back as a
//! signal, not a return value, mirroring the legacy stop-signal convention
//! of the host runtime this engine models.

use std::any::Any;
use std::fmt;
use vesper_core::{ScriptError, Value};

/// The operation a continuation is resumed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResumeOp {
    /// Deliver a value at the suspension point and keep executing.
    Send,
    /// Raise a value at the suspension point.
    Throw,
    /// Tear the activation down cooperatively, running cleanup code.
    Close,
}

impl ResumeOp {
    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Throw => "throw",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for ResumeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successful resume outcome: the activation suspended.
#[derive(Debug, Clone, PartialEq)]
pub enum Resumption {
    /// Suspended at a plain yield, producing a value. Under an abrupt
    /// resume this is the value the body substituted while closing.
    Yielded(Value),
    /// Suspended at a `yield*`, delegating iteration to the carried target.
    /// Exists only transiently between a resume and the engine handling it.
    Delegated(Value),
}

/// A resume that did not suspend: the activation is gone.
///
/// Only the `Error` variant ever reaches a caller; the other two are
/// absorbed into a terminal `{value, done: true}` result by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeSignal {
    /// The activation was torn down as part of a close, with no
    /// user-visible value.
    Closed,
    /// The body ran to completion; the payload is its return value.
    Finished(Value),
    /// A propagating error, passed through to the caller unchanged.
    Error(ScriptError),
}

/// Opaque saved-activation token.
///
/// Owned by the generator between calls and lent to the continuation for
/// the duration of one resume; the engine never inspects it.
pub struct ActivationState(Box<dyn Any>);

impl ActivationState {
    /// Wraps a continuation-defined state value.
    #[must_use]
    pub fn new<T: Any>(state: T) -> Self {
        Self(Box::new(state))
    }

    /// An empty token for continuations that keep no per-activation state.
    #[must_use]
    pub fn empty() -> Self {
        Self(Box::new(()))
    }

    /// Borrows the state as a concrete type, if it is one.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Mutably borrows the state as a concrete type, if it is one.
    #[must_use]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut()
    }
}

impl fmt::Debug for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActivationState(..)")
    }
}

/// A resumable activation for one generator invocation.
///
/// Implementations run the body from its current suspension point until the
/// next yield, delegation, or completion. They must honor `Close` by running
/// cleanup and then either signalling [`ResumeSignal::Closed`], finishing
/// with a value, or suspending with a substituted value.
pub trait Continuation {
    /// Resumes the activation with `op` and `value`, using and updating the
    /// saved state token.
    fn resume(
        &mut self,
        op: ResumeOp,
        state: &mut ActivationState,
        value: Value,
    ) -> Result<Resumption, ResumeSignal>;
}
