use std::fmt;
use tracing::trace;

/// Per-split lifecycle states.
///
/// `Closed` is terminal and reachable from every other state: graceful
/// exhaustion and failure-triggered teardown share one cleanup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Opening,
    Ready,
    Advancing,
    Exhausted,
    Closed,
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "CREATED",
            LifecycleState::Opening => "OPENING",
            LifecycleState::Ready => "READY",
            LifecycleState::Advancing => "ADVANCING",
            LifecycleState::Exhausted => "EXHAUSTED",
            LifecycleState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State machine guarding one split's lifecycle. Exactly one instance
/// exists per assigned split, owned by the reader driving it.
///
/// The transition into `Closed` happens at most once; `try_close`
/// reports whether the caller performed it. This guard is what makes
/// repeated close requests no-ops.
#[derive(Debug)]
pub struct SplitLifecycle {
    split_id: usize,
    state: LifecycleState,
}

impl SplitLifecycle {
    pub fn new(split_id: usize) -> Self {
        Self {
            split_id,
            state: LifecycleState::Created,
        }
    }

    pub fn split_id(&self) -> usize {
        self.split_id
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn begin_open(&mut self) {
        debug_assert_eq!(self.state, LifecycleState::Created);
        self.set(LifecycleState::Opening);
    }

    pub fn opened(&mut self) {
        debug_assert_eq!(self.state, LifecycleState::Opening);
        self.set(LifecycleState::Ready);
    }

    pub fn begin_advance(&mut self) {
        debug_assert_eq!(self.state, LifecycleState::Ready);
        self.set(LifecycleState::Advancing);
    }

    pub fn advanced(&mut self) {
        debug_assert_eq!(self.state, LifecycleState::Advancing);
        self.set(LifecycleState::Ready);
    }

    pub fn exhausted(&mut self) {
        debug_assert_eq!(self.state, LifecycleState::Advancing);
        self.set(LifecycleState::Exhausted);
    }

    /// Moves to `Closed` from any state. Returns true when this call
    /// performed the transition, false when the split was already
    /// closed.
    pub fn try_close(&mut self) -> bool {
        if self.state == LifecycleState::Closed {
            return false;
        }
        self.set(LifecycleState::Closed);
        true
    }

    fn set(&mut self, next: LifecycleState) {
        trace!(
            split_id = self.split_id,
            from = %self.state,
            to = %next,
            "lifecycle transition"
        );
        self.state = next;
    }
}
