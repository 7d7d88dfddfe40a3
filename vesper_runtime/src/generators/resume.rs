//! Resume machinery: the state machine behind the protocol methods.
//!
//! Every protocol call takes the activation borrow exactly once, up front.
//! A call that cannot take it is by definition reentrant and fails with
//! `GeneratorExecuting` before touching any state. From there the call
//! either forwards into an active delegate or resumes the local
//! continuation, and the state field is updated around the resume so that
//! the body observes `Executing` while it runs.
//!
//! Two invariants anchor the control flow:
//!
//! * A `return` or a `throw` delivered to the local continuation always
//!   leaves the generator completed, even when the body suspends again
//!   while closing. The suspension value becomes the final value.
//! * Errors only propagate after the state is settled; a caller that
//!   catches one observes a completed generator, never a stuck one.

use vesper_core::{ScriptError, ScriptResult, Value};

use super::continuation::{ResumeOp, ResumeSignal, Resumption};
use super::delegate::Delegate;
use super::object::{Generator, GeneratorInner};
use super::protocol::{IterResult, ProtocolOp};
use super::state::GeneratorState;

// ============================================================================
// Protocol Methods
// ============================================================================

impl Generator {
    /// `next(value)`: resumes the generator, delivering `value` at the
    /// suspension point.
    pub fn next(&self, value: Value) -> ScriptResult<IterResult> {
        self.dispatch(ProtocolOp::Next, value)
    }

    /// `return(value)`: forces completion. The body gets one chance to run
    /// cleanup, and may substitute its own final value.
    pub fn return_value(&self, value: Value) -> ScriptResult<IterResult> {
        self.dispatch(ProtocolOp::Return, value)
    }

    /// `throw(value)`: injects an error at the suspension point.
    pub fn throw_value(&self, value: Value) -> ScriptResult<IterResult> {
        self.dispatch(ProtocolOp::Throw, value)
    }

    /// Dispatches one protocol operation.
    ///
    /// This is the single entry point behind [`Generator::next`],
    /// [`Generator::return_value`] and [`Generator::throw_value`]; embedders
    /// routing script-level method calls can dispatch on [`ProtocolOp`]
    /// directly.
    pub fn dispatch(&self, op: ProtocolOp, value: Value) -> ScriptResult<IterResult> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| ScriptError::GeneratorExecuting)?;
        let inner = &mut *inner;
        match op {
            ProtocolOp::Next => Self::resume_next(inner, value),
            ProtocolOp::Return => Self::resume_abrupt(inner, ResumeOp::Close, value),
            ProtocolOp::Throw => Self::resume_throw(inner, value),
        }
    }
}

// ============================================================================
// Local Resume
// ============================================================================

impl Generator {
    fn resume_next(inner: &mut GeneratorInner, value: Value) -> ScriptResult<IterResult> {
        if inner.delegate.is_some() {
            return Self::forward_next(inner, value);
        }
        Self::resume_local(inner, ResumeOp::Send, value)
    }

    fn resume_throw(inner: &mut GeneratorInner, value: Value) -> ScriptResult<IterResult> {
        if inner.delegate.is_some() {
            return Self::forward_throw(inner, value);
        }
        Self::resume_abrupt(inner, ResumeOp::Throw, value)
    }

    /// Resumes the local continuation with a send or an injected throw.
    ///
    /// Injected throws arrive here only from delegate failures; a
    /// caller-originated `throw` goes through [`Self::resume_abrupt`].
    fn resume_local(
        inner: &mut GeneratorInner,
        op: ResumeOp,
        value: Value,
    ) -> ScriptResult<IterResult> {
        match inner.state {
            GeneratorState::Completed => return Ok(IterResult::exhausted()),
            GeneratorState::Executing => return Err(ScriptError::GeneratorExecuting),
            GeneratorState::SuspendedStart | GeneratorState::SuspendedYield => {}
        }
        inner.state = GeneratorState::Executing;
        let outcome = inner
            .continuation
            .resume(op, &mut inner.saved_state, value.clone());
        match outcome {
            Ok(Resumption::Yielded(v)) => {
                inner.state = GeneratorState::SuspendedYield;
                Ok(IterResult::yielded(v))
            }
            Ok(Resumption::Delegated(target)) => {
                inner.state = GeneratorState::SuspendedYield;
                match Self::open_delegate(inner, &target) {
                    Ok(delegate) => {
                        inner.delegate = Some(delegate);
                        // The call that triggered the delegation is
                        // forwarded into the delegate unchanged.
                        Self::forward_next(inner, value)
                    }
                    Err(err) => {
                        inner.state = GeneratorState::Completed;
                        Self::record_diagnostic(inner, &err);
                        Err(err)
                    }
                }
            }
            Err(ResumeSignal::Closed) => {
                inner.state = GeneratorState::Completed;
                Ok(IterResult::exhausted())
            }
            Err(ResumeSignal::Finished(v)) => {
                inner.state = GeneratorState::Completed;
                Ok(IterResult::done(v))
            }
            Err(ResumeSignal::Error(err)) => {
                inner.state = GeneratorState::Completed;
                Self::record_diagnostic(inner, &err);
                Err(err)
            }
        }
    }
}

// ============================================================================
// Delegation Forwarding
// ============================================================================

impl Generator {
    /// Forwards a `next` into the active delegate.
    fn forward_next(inner: &mut GeneratorInner, value: Value) -> ScriptResult<IterResult> {
        let Some(delegate) = inner.delegate.as_mut() else {
            return Err(ScriptError::internal("forwarding without a delegate"));
        };
        match delegate.next(value) {
            // The delegate is exhausted: its final value resumes the outer
            // body as the value of the yield* expression.
            Ok(res) if res.done => {
                inner.delegate = None;
                Self::resume_local(inner, ResumeOp::Send, res.value)
            }
            Ok(res) => Ok(res),
            Err(err) => {
                inner.delegate = None;
                Self::inject_delegate_failure(inner, err)
            }
        }
    }

    /// Forwards a `throw` into the active delegate.
    ///
    /// A delegate without throw capability cannot absorb the value; the
    /// outer body is closed quietly and the call fails.
    fn forward_throw(inner: &mut GeneratorInner, value: Value) -> ScriptResult<IterResult> {
        let Some(delegate) = inner.delegate.as_mut() else {
            return Err(ScriptError::internal("forwarding without a delegate"));
        };
        if !delegate.supports_throw() {
            inner.delegate = None;
            Self::close_quietly(inner);
            return Err(ScriptError::DelegationUnsupported);
        }
        match delegate.throw(value) {
            Ok(res) if res.done => {
                inner.delegate = None;
                Self::resume_local(inner, ResumeOp::Send, res.value)
            }
            Ok(res) => Ok(res),
            Err(err) => {
                inner.delegate = None;
                Self::inject_delegate_failure(inner, err)
            }
        }
    }

    /// A delegate call failed. A script-level thrown value surfaces inside
    /// the outer body at the yield* site, where a catch can see it; an
    /// engine error tears the outer body down and propagates as-is.
    fn inject_delegate_failure(
        inner: &mut GeneratorInner,
        err: ScriptError,
    ) -> ScriptResult<IterResult> {
        match err {
            ScriptError::Uncaught { value, .. } => {
                Self::resume_local(inner, ResumeOp::Throw, value)
            }
            other => {
                Self::record_diagnostic(inner, &other);
                Self::close_quietly(inner);
                Err(other)
            }
        }
    }

    /// Runs the body's cleanup without surfacing its outcome. Used when the
    /// call already has an error to report.
    fn close_quietly(inner: &mut GeneratorInner) {
        if inner.state.is_suspended() {
            inner.state = GeneratorState::Executing;
            let _ = inner
                .continuation
                .resume(ResumeOp::Close, &mut inner.saved_state, Value::undefined());
        }
        inner.state = GeneratorState::Completed;
    }
}

// ============================================================================
// Abrupt Completion
// ============================================================================

impl Generator {
    /// Handles the abrupt operations: caller-originated `return` (as
    /// `Close`) and `throw`. Whatever the body does in response, the
    /// generator is completed afterwards.
    fn resume_abrupt(
        inner: &mut GeneratorInner,
        op: ResumeOp,
        value: Value,
    ) -> ScriptResult<IterResult> {
        match inner.state {
            GeneratorState::Executing => return Err(ScriptError::GeneratorExecuting),
            // Never started: nothing to clean up, so the body is not
            // resumed at all.
            GeneratorState::SuspendedStart => {
                inner.state = GeneratorState::Completed;
                return match op {
                    ResumeOp::Throw => Err(ScriptError::uncaught(value)),
                    _ => Ok(IterResult::done(value)),
                };
            }
            GeneratorState::Completed => {
                if op == ResumeOp::Throw {
                    // Re-raise with the position saved when the generator
                    // originally completed, if any.
                    return Err(match inner.diagnostic.clone() {
                        Some(pos) => ScriptError::uncaught_at(value, pos),
                        None => ScriptError::uncaught(value),
                    });
                }
                // A close still drives the continuation, so cleanup that
                // intercepts it can substitute a value after completion.
            }
            GeneratorState::SuspendedYield => {}
        }

        // An abrupt completion never resumes the delegate again.
        inner.delegate = None;
        inner.state = GeneratorState::Executing;
        let outcome = inner
            .continuation
            .resume(op, &mut inner.saved_state, value.clone());
        inner.state = GeneratorState::Completed;
        match outcome {
            // The body suspended while closing; its value is taken as the
            // final value and the suspension is not honored.
            Ok(Resumption::Yielded(v)) => Ok(IterResult::done(v)),
            Ok(Resumption::Delegated(_)) => Err(ScriptError::internal(
                "delegation attempted during an abrupt resume",
            )),
            Err(ResumeSignal::Closed) => Ok(IterResult::done(match op {
                ResumeOp::Close => value,
                _ => Value::undefined(),
            })),
            Err(ResumeSignal::Finished(v)) => Ok(IterResult::done(v)),
            Err(ResumeSignal::Error(err)) => {
                Self::record_diagnostic(inner, &err);
                Err(err)
            }
        }
    }
}

// ============================================================================
// Delegate Resolution & Diagnostics
// ============================================================================

impl Generator {
    fn open_delegate(inner: &GeneratorInner, target: &Value) -> ScriptResult<Delegate> {
        match &inner.provider {
            Some(provider) => provider.iterator_for(target),
            None => Err(ScriptError::type_error(
                "yield* is not supported without an iterator provider",
            )),
        }
    }

    fn record_diagnostic(inner: &mut GeneratorInner, err: &ScriptError) {
        if let Some(pos) = err.position() {
            inner.diagnostic = Some(pos.clone());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
