//! Generator object implementation.
//!
//! A [`Generator`] is a cheap-to-clone handle over the per-invocation
//! record: the exclusively-owned continuation, the opaque saved-activation
//! token, the state machine field, the optional delegation target, and the
//! diagnostic position that survives suspension boundaries.
//!
//! The handle is deliberately shared (`Rc<RefCell>`): a generator body can
//! hold a handle to its own generator, and the delegation chain references
//! inner generators by handle. Exclusive access per protocol call is
//! enforced dynamically: a call that cannot take the borrow is by
//! definition reentrant and fails with `GeneratorExecuting` instead of
//! blocking.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use vesper_core::SourcePosition;

use super::continuation::{ActivationState, Continuation};
use super::delegate::{Delegate, IteratorProvider};
use super::state::GeneratorState;

/// Per-invocation generator record.
pub(super) struct GeneratorInner {
    /// Exclusively owned resumable activation; never shared, never cloned.
    pub(super) continuation: Box<dyn Continuation>,
    /// Opaque token lent to the continuation on each resume.
    pub(super) saved_state: ActivationState,
    /// State machine field; also the reentrancy guard.
    pub(super) state: GeneratorState,
    /// Iterator currently receiving forwarded calls, while `yield*` is
    /// active.
    pub(super) delegate: Option<Delegate>,
    /// Last-known source location captured when an error crossed a
    /// suspension boundary.
    pub(super) diagnostic: Option<SourcePosition>,
    /// Resolves delegation targets; absent means `yield*` is a TypeError.
    pub(super) provider: Option<Rc<dyn IteratorProvider>>,
}

/// A resumable function activation implementing the iterator protocol.
///
/// Created when a generator function is invoked; one instance per
/// invocation. Cloning produces another handle to the same activation,
/// which is also what the iterator-capability accessor returns.
#[derive(Clone)]
pub struct Generator {
    pub(super) inner: Rc<RefCell<GeneratorInner>>,
}

impl Generator {
    /// Creates a generator over a continuation and its saved state.
    ///
    /// The resulting generator has no iterator provider: a `yield*` from
    /// its body is a TypeError. Use [`Generator::with_provider`] when the
    /// body delegates.
    #[must_use]
    pub fn new(continuation: Box<dyn Continuation>, saved_state: ActivationState) -> Self {
        Self::build(continuation, saved_state, None)
    }

    /// Creates a generator that resolves `yield*` targets through
    /// `provider`.
    #[must_use]
    pub fn with_provider(
        continuation: Box<dyn Continuation>,
        saved_state: ActivationState,
        provider: Rc<dyn IteratorProvider>,
    ) -> Self {
        Self::build(continuation, saved_state, Some(provider))
    }

    fn build(
        continuation: Box<dyn Continuation>,
        saved_state: ActivationState,
        provider: Option<Rc<dyn IteratorProvider>>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GeneratorInner {
                continuation,
                saved_state,
                state: GeneratorState::SuspendedStart,
                delegate: None,
                diagnostic: None,
                provider,
            })),
        }
    }

    /// Returns the current state.
    ///
    /// Reports `Executing` when the activation is being resumed right now,
    /// including observation from inside the body itself.
    #[must_use]
    pub fn state(&self) -> GeneratorState {
        match self.inner.try_borrow() {
            Ok(inner) => inner.state,
            Err(_) => GeneratorState::Executing,
        }
    }

    /// Returns true if the generator has completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state().is_completed()
    }

    /// Returns true if a `yield*` delegation is active.
    #[must_use]
    pub fn is_delegating(&self) -> bool {
        match self.inner.try_borrow() {
            Ok(inner) => inner.delegate.is_some(),
            Err(_) => false,
        }
    }

    /// Returns the recorded diagnostic position, if an error has crossed a
    /// suspension boundary.
    #[must_use]
    pub fn diagnostic(&self) -> Option<SourcePosition> {
        self.inner.try_borrow().ok()?.diagnostic.clone()
    }

    /// The iterator-capability accessor: a generator is its own iterator.
    #[must_use]
    pub fn iterator(&self) -> Generator {
        self.clone()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Generator");
        match self.inner.try_borrow() {
            Ok(inner) => s
                .field("state", &inner.state)
                .field("delegating", &inner.delegate.is_some())
                .field("diagnostic", &inner.diagnostic)
                .finish(),
            Err(_) => s.field("state", &GeneratorState::Executing).finish(),
        }
    }
}
