//! Event collector for testing.
//!
//! `EventCollector` accumulates chain events for later inspection and
//! assertion.

use parking_lot::Mutex;

use crate::chain::{ChainKind, ForkIsolation};
use crate::tracer::ChainTracer;
use crate::ChainError;

/// A single observed chain event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// A generation step started.
    NextStart {
        /// Kind of the traced chain.
        kind: ChainKind,
        /// 1-based step number.
        step: u64,
    },
    /// A step's value was committed.
    Committed {
        /// Kind of the traced chain.
        kind: ChainKind,
        /// 1-based step number.
        step: u64,
    },
    /// A step failed.
    GenerationFailed {
        /// Kind of the traced chain.
        kind: ChainKind,
        /// 1-based step number.
        step: u64,
        /// Display form of the error.
        message: String,
    },
    /// The chain was forked.
    Forked {
        /// Kind of the traced chain.
        kind: ChainKind,
        /// What the fork shares with its origin.
        isolation: ForkIsolation,
    },
    /// The chain refused to fork.
    ForkRefused {
        /// Kind of the traced chain.
        kind: ChainKind,
    },
}

/// Tracer that records every event, for tests.
///
/// # Example
///
/// ```ignore
/// use lazy_chain::{ChainEvent, ChainExt, EventCollector, MarkovChain};
/// use std::sync::Arc;
///
/// let collector = Arc::new(EventCollector::new());
/// let mut chain = MarkovChain::from_fn(0, |x: i32| Ok(x + 1)).traced(collector.clone());
/// chain.next().await?;
///
/// assert!(collector.events().iter().any(|e| matches!(e, ChainEvent::Committed { .. })));
/// ```
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Mutex<Vec<ChainEvent>>,
}

impl EventCollector {
    /// Create a new empty event collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get collected events as a vector.
    pub fn events(&self) -> Vec<ChainEvent> {
        self.events.lock().clone()
    }

    /// Clear all collected events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Take collected events, clearing the collector.
    pub fn take(&self) -> Vec<ChainEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Get the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    fn push(&self, event: ChainEvent) {
        self.events.lock().push(event);
    }
}

impl ChainTracer for EventCollector {
    fn on_next_start(&self, kind: ChainKind, step: u64) {
        self.push(ChainEvent::NextStart { kind, step });
    }

    fn on_commit(&self, kind: ChainKind, step: u64) {
        self.push(ChainEvent::Committed { kind, step });
    }

    fn on_generation_failed(&self, kind: ChainKind, step: u64, error: &ChainError) {
        self.push(ChainEvent::GenerationFailed {
            kind,
            step,
            message: error.to_string(),
        });
    }

    fn on_fork(&self, kind: ChainKind, isolation: ForkIsolation) {
        self.push(ChainEvent::Forked { kind, isolation });
    }

    fn on_fork_refused(&self, kind: ChainKind, _error: &ChainError) {
        self.push(ChainEvent::ForkRefused { kind });
    }
}
