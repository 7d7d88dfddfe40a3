//! `yield*` delegation targets.
//!
//! While a generator delegates, protocol calls are forwarded to an inner
//! iterator instead of resuming the local continuation. The inner iterator
//! is either another generator (recursing through the same engine) or a
//! foreign iterator obtained from the object layer. Foreign iterators
//! advertise their throw capability explicitly; forwarding a `throw` into
//! one that lacks it is a propagating error, never silently ignored.

use std::cell::RefCell;
use std::fmt;
use rustc_hash::FxHashMap;
use vesper_core::{ScriptError, ScriptResult, Value};

use super::object::Generator;
use super::protocol::IterResult;

// ============================================================================
// Delegate Iterators
// ============================================================================

/// An iterator that can receive forwarded `next`/`throw` calls during
/// delegation.
///
/// `supports_throw` is consulted before any throw is forwarded; the default
/// implementation advertises no throw capability, and the default `throw`
/// fails accordingly.
pub trait DelegateIterator {
    /// Advances the iterator with a sent value.
    fn next(&mut self, value: Value) -> ScriptResult<IterResult>;

    /// Returns true if this iterator accepts forwarded throws.
    fn supports_throw(&self) -> bool {
        false
    }

    /// Injects a thrown value into the iterator.
    fn throw(&mut self, value: Value) -> ScriptResult<IterResult> {
        let _ = value;
        Err(ScriptError::DelegationUnsupported)
    }
}

// ============================================================================
// Delegation Target
// ============================================================================

/// The target of an active `yield*`.
pub enum Delegate {
    /// Another generator; forwarding recurses through its own engine.
    Generator(Generator),
    /// A non-generator iterable from the object layer.
    Iterator(Box<dyn DelegateIterator>),
}

impl Delegate {
    /// Forwards a `next` call.
    pub fn next(&mut self, value: Value) -> ScriptResult<IterResult> {
        match self {
            Self::Generator(g) => g.next(value),
            Self::Iterator(it) => it.next(value),
        }
    }

    /// Returns true if this delegate accepts forwarded throws. Generators
    /// always do.
    #[must_use]
    pub fn supports_throw(&self) -> bool {
        match self {
            Self::Generator(_) => true,
            Self::Iterator(it) => it.supports_throw(),
        }
    }

    /// Forwards a `throw` call.
    pub fn throw(&mut self, value: Value) -> ScriptResult<IterResult> {
        match self {
            Self::Generator(g) => g.throw_value(value),
            Self::Iterator(it) => it.throw(value),
        }
    }
}

impl fmt::Debug for Delegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generator(_) => f.write_str("Delegate::Generator"),
            Self::Iterator(_) => f.write_str("Delegate::Iterator"),
        }
    }
}

// ============================================================================
// Iterator Resolution
// ============================================================================

/// Resolves a delegation target value to an iterator.
///
/// This is the engine's only view of the object/property system: given the
/// value carried by a delegation marker, produce something with `next` and
/// an optional `throw`. The target may resolve to another generator, in
/// which case delegation recurses through that generator's own protocol
/// methods.
pub trait IteratorProvider {
    /// Obtains an iterator for `target`, or a TypeError if it is not
    /// iterable.
    fn iterator_for(&self, target: &Value) -> ScriptResult<Delegate>;
}

// ============================================================================
// Table Provider
// ============================================================================

/// Table-backed provider for embedders without an object system.
///
/// Delegation targets are integer tags; each registration is consumed by
/// the `yield*` that resolves it, since a [`Delegate`] is exclusively owned
/// once iteration begins.
#[derive(Default)]
pub struct TableIteratorProvider {
    entries: RefCell<FxHashMap<i64, Delegate>>,
}

impl TableIteratorProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the delegate that tag `tag` resolves to.
    pub fn register(&self, tag: i64, delegate: Delegate) {
        self.entries.borrow_mut().insert(tag, delegate);
    }

    /// Returns the number of unresolved registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns true if no registrations remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl IteratorProvider for TableIteratorProvider {
    fn iterator_for(&self, target: &Value) -> ScriptResult<Delegate> {
        let tag = target.as_int().ok_or_else(|| {
            ScriptError::type_error(format!(
                "yield* target of type {} is not iterable",
                target.type_name()
            ))
        })?;
        self.entries
            .borrow_mut()
            .remove(&tag)
            .ok_or_else(|| ScriptError::type_error(format!("yield* target {tag} is not iterable")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts down from `remaining`, yielding each value.
    struct Countdown {
        remaining: i64,
        throwable: bool,
    }

    impl DelegateIterator for Countdown {
        fn next(&mut self, _value: Value) -> ScriptResult<IterResult> {
            if self.remaining == 0 {
                return Ok(IterResult::done(Value::str("lift-off")));
            }
            self.remaining -= 1;
            Ok(IterResult::yielded(Value::int(self.remaining + 1)))
        }

        fn supports_throw(&self) -> bool {
            self.throwable
        }

        fn throw(&mut self, value: Value) -> ScriptResult<IterResult> {
            if !self.throwable {
                return Err(ScriptError::DelegationUnsupported);
            }
            Err(ScriptError::uncaught(value))
        }
    }

    fn countdown(n: i64, throwable: bool) -> Delegate {
        Delegate::Iterator(Box::new(Countdown {
            remaining: n,
            throwable,
        }))
    }

    #[test]
    fn test_foreign_iterator_next() {
        let mut delegate = countdown(2, false);
        assert_eq!(
            delegate.next(Value::undefined()).unwrap(),
            IterResult::yielded(Value::int(2))
        );
        assert_eq!(
            delegate.next(Value::undefined()).unwrap(),
            IterResult::yielded(Value::int(1))
        );
        let last = delegate.next(Value::undefined()).unwrap();
        assert!(last.done);
        assert_eq!(last.value, Value::str("lift-off"));
    }

    #[test]
    fn test_throw_capability_default_absent() {
        let delegate = countdown(1, false);
        assert!(!delegate.supports_throw());
    }

    #[test]
    fn test_throw_without_capability_fails() {
        let mut delegate = countdown(1, false);
        assert_eq!(
            delegate.throw(Value::int(1)),
            Err(ScriptError::DelegationUnsupported)
        );
    }

    #[test]
    fn test_throw_with_capability_propagates() {
        let mut delegate = countdown(1, true);
        assert!(delegate.supports_throw());
        assert_eq!(
            delegate.throw(Value::str("x")),
            Err(ScriptError::uncaught(Value::str("x")))
        );
    }

    #[test]
    fn test_table_provider_resolves_once() {
        let provider = TableIteratorProvider::new();
        provider.register(7, countdown(1, false));
        assert_eq!(provider.len(), 1);

        assert!(provider.iterator_for(&Value::int(7)).is_ok());
        assert!(provider.is_empty());

        // Consumed: a second resolution is a TypeError.
        let err = provider.iterator_for(&Value::int(7)).unwrap_err();
        assert_eq!(err.exception_type(), "TypeError");
    }

    #[test]
    fn test_table_provider_rejects_non_tag_targets() {
        let provider = TableIteratorProvider::new();
        let err = provider.iterator_for(&Value::str("xs")).unwrap_err();
        assert!(err.to_string().contains("not iterable"));
    }

    #[test]
    fn test_delegate_debug() {
        assert_eq!(
            format!("{:?}", countdown(0, false)),
            "Delegate::Iterator"
        );
    }
}
