//! Generator state management.
//!
//! A generator moves through four states. The two suspended states are
//! distinguished because abrupt operations treat a generator that never ran
//! differently from one parked at a yield: `return` on a fresh generator
//! completes it without ever driving the continuation, and `throw` on a
//! fresh generator re-raises immediately.
//!
//! ```text
//! SuspendedStart --next/throw/return--> Executing --yield--> SuspendedYield
//!       |                                   |                     |
//!       +----------- return ---------------+--- complete ---> Completed
//! ```
//!
//! `Executing` doubles as the reentrancy guard: any protocol call that
//! observes it fails immediately rather than queuing.

use std::fmt;

/// Generator execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorState {
    /// Created but never resumed.
    SuspendedStart,
    /// Parked at a yield point (including while delegating).
    SuspendedYield,
    /// Currently running its continuation (reentry check).
    Executing,
    /// Completed or closed; terminal for body execution.
    Completed,
}

impl GeneratorState {
    /// Returns true if the generator can be resumed.
    #[inline]
    #[must_use]
    pub const fn is_suspended(self) -> bool {
        matches!(self, Self::SuspendedStart | Self::SuspendedYield)
    }

    /// Returns true if the generator is finished.
    #[inline]
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if a protocol call must fail with a reentrancy error.
    #[inline]
    #[must_use]
    pub const fn is_executing(self) -> bool {
        matches!(self, Self::Executing)
    }

    /// Returns the conventional name for this state.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SuspendedStart => "suspended-start",
            Self::SuspendedYield => "suspended-yield",
            Self::Executing => "executing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for GeneratorState {
    #[inline]
    fn default() -> Self {
        Self::SuspendedStart
    }
}
