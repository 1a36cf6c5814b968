use std::cell::{Cell, RefCell};
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChartError, ChartResult};

/// Index of a vertically stacked pane. Index 0 is the default pane and always exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaneIndex(u32);

impl PaneIndex {
    pub const DEFAULT: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-chart pane index bookkeeping.
///
/// Lives next to the chart handle rather than inside the backend so the
/// charting library's own objects are never mutated. Auto-assigned indices
/// start at 1, strictly increase and are never reused.
#[derive(Debug)]
pub struct PaneIndexAllocator {
    next: Cell<u32>,
    claimed: RefCell<IndexSet<PaneIndex>>,
}

impl Default for PaneIndexAllocator {
    fn default() -> Self {
        Self {
            next: Cell::new(1),
            claimed: RefCell::new(IndexSet::new()),
        }
    }
}

impl PaneIndexAllocator {
    /// Returns `explicit` verbatim, otherwise the next auto-assigned index.
    pub fn resolve(&self, explicit: Option<PaneIndex>) -> PaneIndex {
        if let Some(index) = explicit {
            return index;
        }
        let raw = self.next.get();
        self.next.set(raw.saturating_add(1));
        let index = PaneIndex::new(raw);
        debug!(pane = %index, "auto-assigned pane index");
        index
    }

    /// Resolves and claims in one step for a mounting pane declaration.
    ///
    /// The candidate is claimed before the counter moves, so an auto
    /// declaration rejected by a collision leaves the counter where it was.
    pub fn assign(&self, explicit: Option<PaneIndex>) -> ChartResult<PaneIndex> {
        let index = explicit.unwrap_or_else(|| self.peek_next());
        self.claim(index)?;
        if explicit.is_none() {
            self.next.set(index.raw().saturating_add(1));
            debug!(pane = %index, "auto-assigned pane index");
        }
        Ok(index)
    }

    /// Index the next auto-assignment will return.
    #[must_use]
    pub fn peek_next(&self) -> PaneIndex {
        PaneIndex::new(self.next.get())
    }

    /// Records `index` as owned by a live pane declaration.
    pub fn claim(&self, index: PaneIndex) -> ChartResult<()> {
        if !self.claimed.borrow_mut().insert(index) {
            return Err(ChartError::PaneIndexInUse { index });
        }
        Ok(())
    }

    /// Releases a claim. The counter is not rewound.
    pub fn release(&self, index: PaneIndex) -> bool {
        self.claimed.borrow_mut().shift_remove(&index)
    }

    #[must_use]
    pub fn is_claimed(&self, index: PaneIndex) -> bool {
        self.claimed.borrow().contains(&index)
    }
}
