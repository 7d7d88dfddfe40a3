//! End-to-end protocol coverage: generators driven through the public
//! surface only, including delegation chains, foreign iterators, abrupt
//! completions, and diagnostic state.

use std::rc::Rc;

use vesper_core::{ScriptError, ScriptResult, SourcePosition, Value};
use vesper_runtime::generators::{
    Delegate, DelegateIterator, GeneratorState, IterResult, Program, ProtocolOp,
    TableIteratorProvider,
};

/// Foreign iterator yielding `0..n`, optionally accepting throws.
struct Range {
    next: i64,
    end: i64,
    throwable: bool,
}

impl Range {
    fn new(end: i64) -> Self {
        Self {
            next: 0,
            end,
            throwable: false,
        }
    }

    fn throwable(end: i64) -> Self {
        Self {
            next: 0,
            end,
            throwable: true,
        }
    }
}

impl DelegateIterator for Range {
    fn next(&mut self, _value: Value) -> ScriptResult<IterResult> {
        if self.next >= self.end {
            return Ok(IterResult::done(Value::undefined()));
        }
        self.next += 1;
        Ok(IterResult::yielded(Value::int(self.next - 1)))
    }

    fn supports_throw(&self) -> bool {
        self.throwable
    }

    fn throw(&mut self, value: Value) -> ScriptResult<IterResult> {
        if !self.throwable {
            return Err(ScriptError::DelegationUnsupported);
        }
        // Stops iterating, surfacing the thrown value as the final value.
        Ok(IterResult::done(value))
    }
}

fn drain(g: &vesper_runtime::generators::Generator) -> Vec<Value> {
    let mut out = Vec::new();
    loop {
        let res = g.next(Value::undefined()).unwrap();
        if res.done {
            return out;
        }
        out.push(res.value);
    }
}

#[test]
fn simple_iteration_protocol() {
    let g = Program::builder()
        .yields(Value::int(1))
        .yields(Value::int(2))
        .yields(Value::int(3))
        .build()
        .spawn();
    assert_eq!(
        drain(&g),
        vec![Value::int(1), Value::int(2), Value::int(3)]
    );
    assert_eq!(g.state(), GeneratorState::Completed);
    // Exhausted forever after.
    assert_eq!(g.next(Value::undefined()).unwrap(), IterResult::exhausted());
}

#[test]
fn done_true_exactly_once_with_return_value() {
    let g = Program::builder()
        .yields(Value::int(1))
        .returns(Value::str("final"))
        .build()
        .spawn();
    let _ = g.next(Value::undefined());
    let completing = g.next(Value::undefined()).unwrap();
    assert_eq!(completing, IterResult::done(Value::str("final")));
    // The return value is delivered only on the completing call.
    assert_eq!(g.next(Value::undefined()).unwrap(), IterResult::exhausted());
}

#[test]
fn iterator_capability_is_identity() {
    let g = Program::builder().yields(Value::int(1)).build().spawn();
    let it = g.iterator();
    let _ = it.next(Value::undefined());
    // Advancing through either handle advances the same activation.
    assert_eq!(g.state(), GeneratorState::SuspendedYield);
}

#[test]
fn dispatch_matches_named_methods() {
    let g = Program::builder()
        .yields(Value::int(1))
        .yields(Value::int(2))
        .build()
        .spawn();
    let _ = g.dispatch(ProtocolOp::Next, Value::undefined());
    assert_eq!(
        g.dispatch(ProtocolOp::Return, Value::int(9)).unwrap(),
        IterResult::done(Value::int(9))
    );
    assert!(g.is_completed());
}

#[test]
fn delegation_to_foreign_iterator() {
    let provider = Rc::new(TableIteratorProvider::new());
    provider.register(1, Delegate::Iterator(Box::new(Range::new(3))));

    let g = Program::builder()
        .delegates(Value::int(1))
        .yields(Value::str("after"))
        .build()
        .spawn_with(provider);

    assert_eq!(
        drain(&g),
        vec![
            Value::int(0),
            Value::int(1),
            Value::int(2),
            Value::str("after")
        ]
    );
}

#[test]
fn consecutive_delegations() {
    let provider = Rc::new(TableIteratorProvider::new());
    provider.register(1, Delegate::Iterator(Box::new(Range::new(2))));
    provider.register(2, Delegate::Iterator(Box::new(Range::new(2))));

    let g = Program::builder()
        .delegates(Value::int(1))
        .delegates(Value::int(2))
        .build()
        .spawn_with(provider);

    assert_eq!(
        drain(&g),
        vec![Value::int(0), Value::int(1), Value::int(0), Value::int(1)]
    );
}

#[test]
fn delegation_chain_three_deep() {
    let provider = Rc::new(TableIteratorProvider::new());

    let innermost = Program::builder()
        .yields(Value::str("deep"))
        .returns(Value::int(30))
        .build()
        .spawn();
    provider.register(3, Delegate::Generator(innermost));

    let middle = Program::builder()
        .delegates(Value::int(3))
        .yields_received()
        .returns(Value::int(20))
        .build()
        .spawn_with(provider.clone());
    provider.register(2, Delegate::Generator(middle));

    let outer = Program::builder()
        .delegates(Value::int(2))
        .yields_received()
        .build()
        .spawn_with(provider.clone());

    // "deep" travels up through both delegation layers.
    assert_eq!(
        outer.next(Value::undefined()).unwrap(),
        IterResult::yielded(Value::str("deep"))
    );
    // The innermost return value (30) resumes the middle body, which yields
    // it; that still travels through the outer delegation.
    assert_eq!(
        outer.next(Value::undefined()).unwrap(),
        IterResult::yielded(Value::int(30))
    );
    // The middle return value (20) resumes the outer body.
    assert_eq!(
        outer.next(Value::undefined()).unwrap(),
        IterResult::yielded(Value::int(20))
    );
    let last = outer.next(Value::undefined()).unwrap();
    assert!(last.done);
}

#[test]
fn throw_into_foreign_iterator_with_capability() {
    let provider = Rc::new(TableIteratorProvider::new());
    provider.register(1, Delegate::Iterator(Box::new(Range::throwable(10))));

    let g = Program::builder()
        .delegates(Value::int(1))
        .yields_received()
        .build()
        .spawn_with(provider);
    let _ = g.next(Value::undefined());
    assert!(g.is_delegating());

    // The iterator finishes in response, so its final value resumes the
    // outer body at the yield* site.
    assert_eq!(
        g.throw_value(Value::str("stop")).unwrap(),
        IterResult::yielded(Value::str("stop"))
    );
    assert!(!g.is_delegating());
}

#[test]
fn throw_into_foreign_iterator_without_capability() {
    let provider = Rc::new(TableIteratorProvider::new());
    provider.register(1, Delegate::Iterator(Box::new(Range::new(10))));

    let g = Program::builder()
        .delegates(Value::int(1))
        .build()
        .spawn_with(provider);
    let _ = g.next(Value::undefined());

    // No throw capability: the outer generator is closed and the call
    // fails with a TypeError.
    let err = g.throw_value(Value::str("stop")).unwrap_err();
    assert_eq!(err, ScriptError::DelegationUnsupported);
    assert_eq!(err.exception_type(), "TypeError");
    assert!(g.is_completed());
}

#[test]
fn return_during_delegation_runs_outer_cleanup() {
    let provider = Rc::new(TableIteratorProvider::new());
    provider.register(1, Delegate::Iterator(Box::new(Range::new(10))));

    let g = Program::builder()
        .delegates(Value::int(1))
        .close_substitutes(Value::str("cleaned"))
        .build()
        .spawn_with(provider);
    let _ = g.next(Value::undefined());
    assert!(g.is_delegating());

    assert_eq!(
        g.return_value(Value::int(1)).unwrap(),
        IterResult::done(Value::str("cleaned"))
    );
    assert!(!g.is_delegating());
    assert!(g.is_completed());
}

#[test]
fn sent_values_echo_through_delegation() {
    let provider = Rc::new(TableIteratorProvider::new());
    let inner = Program::builder()
        .yields(Value::int(0))
        .yields_received()
        .yields_received()
        .build()
        .spawn();
    provider.register(1, Delegate::Generator(inner));

    let g = Program::builder()
        .delegates(Value::int(1))
        .build()
        .spawn_with(provider);
    let _ = g.next(Value::undefined());
    assert_eq!(
        g.next(Value::str("a")).unwrap(),
        IterResult::yielded(Value::str("a"))
    );
    assert_eq!(
        g.next(Value::str("b")).unwrap(),
        IterResult::yielded(Value::str("b"))
    );
}

#[test]
fn throw_on_fresh_generator_completes_without_running_body() {
    let g = Program::builder()
        .yields(Value::str("never observed"))
        .build()
        .spawn();
    assert_eq!(
        g.throw_value(Value::int(13)),
        Err(ScriptError::uncaught(Value::int(13)))
    );
    assert_eq!(g.state(), GeneratorState::Completed);
}

#[test]
fn return_on_fresh_generator_echoes_argument() {
    let g = Program::builder()
        .yields(Value::str("never observed"))
        .build()
        .spawn();
    assert_eq!(
        g.return_value(Value::str("early out")).unwrap(),
        IterResult::done(Value::str("early out"))
    );
    assert_eq!(g.state(), GeneratorState::Completed);
}

#[test]
fn abrupt_ops_always_leave_done_true() {
    // Even a body that catches the throw and suspends again cannot keep a
    // caller-thrown generator alive.
    let g = Program::builder()
        .catches_throws()
        .yields(Value::int(1))
        .yields(Value::int(2))
        .build()
        .spawn();
    let _ = g.next(Value::undefined());
    let res = g.throw_value(Value::str("x")).unwrap();
    assert!(res.done);
    assert!(g.is_completed());
}

#[test]
fn diagnostic_survives_suspension_and_completion() {
    let pos = SourcePosition::with_source(7, "oops()");
    let g = Program::builder()
        .yields(Value::int(1))
        .raises_at(Value::str("dead"), pos.clone())
        .build()
        .spawn();

    assert!(g.diagnostic().is_none());
    let _ = g.next(Value::undefined());
    let err = g.next(Value::undefined()).unwrap_err();
    assert_eq!(err.position(), Some(&pos));
    assert_eq!(g.diagnostic(), Some(pos.clone()));

    // Throwing into the corpse re-raises at the recorded position.
    let late = g.throw_value(Value::str("again")).unwrap_err();
    assert_eq!(late, ScriptError::uncaught_at(Value::str("again"), pos));
}

#[test]
fn close_raising_cleanup_propagates_from_return() {
    let g = Program::builder()
        .yields(Value::int(1))
        .close_raises(Value::str("finally failed"))
        .build()
        .spawn();
    let _ = g.next(Value::undefined());
    assert_eq!(
        g.return_value(Value::int(0)),
        Err(ScriptError::uncaught(Value::str("finally failed")))
    );
    assert!(g.is_completed());
}

#[test]
fn inner_generator_error_can_be_caught_by_outer() {
    let provider = Rc::new(TableIteratorProvider::new());
    let inner = Program::builder()
        .yields(Value::int(1))
        .raises(Value::str("inner"))
        .build()
        .spawn();
    provider.register(1, Delegate::Generator(inner));

    let g = Program::builder()
        .catches_throws()
        .delegates(Value::int(1))
        .yields_received()
        .returns(Value::str("recovered"))
        .build()
        .spawn_with(provider);

    assert_eq!(
        g.next(Value::undefined()).unwrap(),
        IterResult::yielded(Value::int(1))
    );
    // The delegate dies; its thrown value surfaces at the yield* site where
    // the outer catch turns it into a yielded value.
    assert_eq!(
        g.next(Value::undefined()).unwrap(),
        IterResult::yielded(Value::str("inner"))
    );
    assert_eq!(
        g.next(Value::undefined()).unwrap(),
        IterResult::done(Value::str("recovered"))
    );
}

#[test]
fn delegation_target_must_be_iterable() {
    let provider = Rc::new(TableIteratorProvider::new());
    let g = Program::builder()
        .delegates(Value::str("not registered"))
        .build()
        .spawn_with(provider);
    let err = g.next(Value::undefined()).unwrap_err();
    assert_eq!(err.exception_type(), "TypeError");
    assert!(err.to_string().contains("not iterable"));
    assert!(g.is_completed());
}

#[test]
fn states_are_observable_from_outside() {
    let g = Program::builder().yields(Value::int(1)).build().spawn();
    assert_eq!(g.state(), GeneratorState::SuspendedStart);
    assert!(g.state().is_suspended());
    let _ = g.next(Value::undefined());
    assert_eq!(g.state(), GeneratorState::SuspendedYield);
    let _ = g.next(Value::undefined());
    assert_eq!(g.state(), GeneratorState::Completed);
    assert!(!g.state().is_suspended());
}
