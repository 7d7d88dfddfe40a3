//! Iterator protocol surface.
//!
//! Callers drive a generator through three operations. Method identity is a
//! closed tagged enum dispatched by the engine, not dynamic lookup; the
//! iterator-capability accessor is separate because it returns the generator
//! itself rather than an iterator result.

use std::fmt;
use vesper_core::Value;

/// A protocol operation requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolOp {
    /// `next(value)`: resume with a sent value.
    Next,
    /// `return(value)`: force completion, giving the body a chance to run
    /// cleanup.
    Return,
    /// `throw(value)`: inject an error at the suspension point.
    Throw,
}

impl ProtocolOp {
    /// Returns the script-level method name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Return => "return",
            Self::Throw => "throw",
        }
    }

    /// Returns true for the abrupt-completion operations.
    #[inline]
    #[must_use]
    pub const fn is_abrupt(self) -> bool {
        matches!(self, Self::Return | Self::Throw)
    }
}

impl fmt::Display for ProtocolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The `{value, done}` result shape produced by every protocol call.
///
/// Constructed fresh on each call and never mutated after being returned.
#[derive(Debug, Clone, PartialEq)]
pub struct IterResult {
    /// The yielded or final value.
    pub value: Value,
    /// True iff the generator completed as a result of this specific call.
    pub done: bool,
}

impl IterResult {
    /// A non-terminal result carrying a yielded value.
    #[inline]
    #[must_use]
    pub const fn yielded(value: Value) -> Self {
        Self { value, done: false }
    }

    /// A terminal result carrying a final value.
    #[inline]
    #[must_use]
    pub const fn done(value: Value) -> Self {
        Self { value, done: true }
    }

    /// A terminal result with no value.
    #[inline]
    #[must_use]
    pub const fn exhausted() -> Self {
        Self {
            value: Value::Undefined,
            done: true,
        }
    }

    /// Returns true if the generator yielded.
    #[inline]
    #[must_use]
    pub const fn is_yielded(&self) -> bool {
        !self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_names() {
        assert_eq!(ProtocolOp::Next.name(), "next");
        assert_eq!(ProtocolOp::Return.name(), "return");
        assert_eq!(ProtocolOp::Throw.name(), "throw");
    }

    #[test]
    fn test_op_is_abrupt() {
        assert!(!ProtocolOp::Next.is_abrupt());
        assert!(ProtocolOp::Return.is_abrupt());
        assert!(ProtocolOp::Throw.is_abrupt());
    }

    #[test]
    fn test_op_display() {
        assert_eq!(ProtocolOp::Throw.to_string(), "throw");
    }

    #[test]
    fn test_yielded_result() {
        let res = IterResult::yielded(Value::int(5));
        assert!(res.is_yielded());
        assert!(!res.done);
        assert_eq!(res.value, Value::int(5));
    }

    #[test]
    fn test_done_result() {
        let res = IterResult::done(Value::str("end"));
        assert!(res.done);
        assert!(!res.is_yielded());
        assert_eq!(res.value, Value::str("end"));
    }

    #[test]
    fn test_exhausted_result() {
        let res = IterResult::exhausted();
        assert!(res.done);
        assert!(res.value.is_undefined());
    }
}
