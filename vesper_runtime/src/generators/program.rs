//! Scripted activations.
//!
//! A [`Program`] is a declarative generator body: a flat list of steps plus
//! a policy for thrown and close operations. It implements [`Continuation`]
//! so the engine can be driven without a compiler; embedders and tests
//! build bodies the way the compiler layer otherwise would.
//!
//! The program itself is immutable; the activation cursor lives in the
//! opaque [`ActivationState`] token owned by the generator, so one program
//! can back many independent invocations.

use smallvec::SmallVec;
use std::rc::Rc;
use vesper_core::{ScriptError, SourcePosition, Value};

use super::continuation::{ActivationState, Continuation, ResumeOp, ResumeSignal, Resumption};
use super::delegate::IteratorProvider;
use super::object::Generator;

// ============================================================================
// Program Steps
// ============================================================================

/// One step of a scripted body.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Suspend, yielding a fixed value.
    Yield(Value),
    /// Suspend, yielding the value most recently sent in.
    YieldReceived,
    /// Delegate iteration to the target value (`yield*`).
    Delegate(Value),
    /// Finish with a fixed return value.
    Return(Value),
    /// Finish, returning the value most recently sent in.
    ReturnReceived,
    /// Raise a value from inside the body.
    Raise(Value),
    /// Raise a value carrying a source position.
    RaiseAt(Value, SourcePosition),
}

// ============================================================================
// Body Policies
// ============================================================================

/// How the body reacts to a thrown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThrowBehavior {
    /// No enclosing catch: the value propagates.
    Propagate,
    /// The body catches the value and keeps executing, with the thrown
    /// value as the received value.
    Catch,
}

/// How the body reacts to a close.
#[derive(Debug, Clone, PartialEq)]
enum CloseBehavior {
    /// No cleanup: the activation tears down silently.
    TearDown,
    /// A `finally` substitutes its own return value.
    Substitute(Value),
    /// Cleanup itself raises.
    Raise(Value),
}

// ============================================================================
// Program
// ============================================================================

/// Activation cursor stored in the saved-state token.
#[derive(Debug, Default)]
struct Cursor {
    pc: usize,
    finished: bool,
}

/// An immutable scripted generator body.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    steps: SmallVec<[Step; 8]>,
    on_throw: ThrowBehavior,
    on_close: CloseBehavior,
}

impl Program {
    /// Starts building a program.
    #[must_use]
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    /// Creates a fresh activation token for this (or any) program.
    #[must_use]
    pub fn fresh_activation() -> ActivationState {
        ActivationState::new(Cursor::default())
    }

    /// Spawns a generator over this body with no iterator provider.
    #[must_use]
    pub fn spawn(self) -> Generator {
        Generator::new(Box::new(self), Self::fresh_activation())
    }

    /// Spawns a generator that resolves `yield*` targets through
    /// `provider`.
    #[must_use]
    pub fn spawn_with(self, provider: Rc<dyn IteratorProvider>) -> Generator {
        Generator::with_provider(Box::new(self), Self::fresh_activation(), provider)
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the body has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn step(&self, cursor: &mut Cursor, received: Value) -> Result<Resumption, ResumeSignal> {
        let Some(step) = self.steps.get(cursor.pc) else {
            cursor.finished = true;
            return Err(ResumeSignal::Finished(Value::undefined()));
        };
        cursor.pc += 1;
        match step {
            Step::Yield(v) => Ok(Resumption::Yielded(v.clone())),
            Step::YieldReceived => Ok(Resumption::Yielded(received)),
            Step::Delegate(target) => Ok(Resumption::Delegated(target.clone())),
            Step::Return(v) => {
                cursor.finished = true;
                Err(ResumeSignal::Finished(v.clone()))
            }
            Step::ReturnReceived => {
                cursor.finished = true;
                Err(ResumeSignal::Finished(received))
            }
            Step::Raise(v) => {
                cursor.finished = true;
                Err(ResumeSignal::Error(ScriptError::uncaught(v.clone())))
            }
            Step::RaiseAt(v, pos) => {
                cursor.finished = true;
                Err(ResumeSignal::Error(ScriptError::uncaught_at(
                    v.clone(),
                    pos.clone(),
                )))
            }
        }
    }
}

// ============================================================================
// Continuation Implementation
// ============================================================================

impl Continuation for Program {
    fn resume(
        &mut self,
        op: ResumeOp,
        state: &mut ActivationState,
        value: Value,
    ) -> Result<Resumption, ResumeSignal> {
        let cursor = state.downcast_mut::<Cursor>().ok_or_else(|| {
            ResumeSignal::Error(ScriptError::internal(
                "activation state does not belong to a scripted program",
            ))
        })?;
        if cursor.finished {
            return Err(ResumeSignal::Closed);
        }
        match op {
            ResumeOp::Send => self.step(cursor, value),
            ResumeOp::Throw => match self.on_throw {
                ThrowBehavior::Propagate => {
                    cursor.finished = true;
                    Err(ResumeSignal::Error(ScriptError::uncaught(value)))
                }
                ThrowBehavior::Catch => self.step(cursor, value),
            },
            ResumeOp::Close => {
                cursor.finished = true;
                match &self.on_close {
                    CloseBehavior::TearDown => Err(ResumeSignal::Closed),
                    CloseBehavior::Substitute(v) => Ok(Resumption::Yielded(v.clone())),
                    CloseBehavior::Raise(v) => {
                        Err(ResumeSignal::Error(ScriptError::uncaught(v.clone())))
                    }
                }
            }
        }
    }
}

// ============================================================================
// Program Builder
// ============================================================================

/// Builder collecting the steps of a scripted body.
#[derive(Debug)]
pub struct ProgramBuilder {
    steps: SmallVec<[Step; 8]>,
    on_throw: ThrowBehavior,
    on_close: CloseBehavior,
}

impl ProgramBuilder {
    /// Creates an empty builder. By default a thrown value propagates and a
    /// close tears the activation down silently.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: SmallVec::new(),
            on_throw: ThrowBehavior::Propagate,
            on_close: CloseBehavior::TearDown,
        }
    }

    /// Appends a `yield value` step.
    #[must_use]
    pub fn yields(mut self, value: Value) -> Self {
        self.steps.push(Step::Yield(value));
        self
    }

    /// Appends a step yielding the received value back out.
    #[must_use]
    pub fn yields_received(mut self) -> Self {
        self.steps.push(Step::YieldReceived);
        self
    }

    /// Appends a `yield* target` step.
    #[must_use]
    pub fn delegates(mut self, target: Value) -> Self {
        self.steps.push(Step::Delegate(target));
        self
    }

    /// Appends a `return value` step.
    #[must_use]
    pub fn returns(mut self, value: Value) -> Self {
        self.steps.push(Step::Return(value));
        self
    }

    /// Appends a step returning the received value.
    #[must_use]
    pub fn returns_received(mut self) -> Self {
        self.steps.push(Step::ReturnReceived);
        self
    }

    /// Appends a `throw value` step.
    #[must_use]
    pub fn raises(mut self, value: Value) -> Self {
        self.steps.push(Step::Raise(value));
        self
    }

    /// Appends a `throw value` step at a source position.
    #[must_use]
    pub fn raises_at(mut self, value: Value, position: SourcePosition) -> Self {
        self.steps.push(Step::RaiseAt(value, position));
        self
    }

    /// Models an enclosing `catch`: a thrown value is received by the next
    /// step instead of propagating.
    #[must_use]
    pub fn catches_throws(mut self) -> Self {
        self.on_throw = ThrowBehavior::Catch;
        self
    }

    /// Models a `finally` that substitutes its own value when closed.
    #[must_use]
    pub fn close_substitutes(mut self, value: Value) -> Self {
        self.on_close = CloseBehavior::Substitute(value);
        self
    }

    /// Models cleanup that raises when closed.
    #[must_use]
    pub fn close_raises(mut self, value: Value) -> Self {
        self.on_close = CloseBehavior::Raise(value);
        self
    }

    /// Finalizes the program.
    #[must_use]
    pub fn build(self) -> Program {
        Program {
            steps: self.steps,
            on_throw: self.on_throw,
            on_close: self.on_close,
        }
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
