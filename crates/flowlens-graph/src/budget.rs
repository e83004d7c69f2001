//! Global work ceiling for recursive traversals.
//!
//! Depth limits alone do not bound work on dense graphs: enumeration is
//! exponential in branching factor within the depth bound. Every traversal
//! stage therefore spends one unit per node expansion from a [`WorkBudget`]
//! and stops expanding once the budget is gone, keeping what it already found.

/// Counter of node expansions a traversal may still perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkBudget {
    limit: usize,
    used: usize,
    exhausted: bool,
}

impl WorkBudget {
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            used: 0,
            exhausted: false,
        }
    }

    /// Spend one unit. Returns `false` (and latches exhaustion) when none remain.
    pub const fn try_spend(&mut self) -> bool {
        if self.used >= self.limit {
            self.exhausted = true;
            return false;
        }
        self.used += 1;
        true
    }

    /// True once a spend attempt was refused.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }
}
