//! Tracer trait for observing chain generation.
//!
//! Chains never log on their own. Wrap a chain with
//! [`ChainExt::traced`](crate::ChainExt::traced) to report its steps and
//! forks to a [`ChainTracer`]. The [`NoopTracer`] discards everything.
//!
//! # Example
//!
//! ```ignore
//! use lazy_chain::{ChainExt, ChainKind, ChainTracer, MarkovChain};
//!
//! struct PrintTracer;
//!
//! impl ChainTracer for PrintTracer {
//!     fn on_commit(&self, kind: ChainKind, step: u64) {
//!         println!("{kind} chain committed step {step}");
//!     }
//! }
//!
//! let chain = MarkovChain::from_fn(0, |x: i32| Ok(x + 1)).traced(PrintTracer);
//! ```

use std::sync::Arc;

use crate::chain::{ChainKind, ForkIsolation};
use crate::ChainError;

/// Tracer trait for observing chain execution.
///
/// All methods have default empty implementations, so you only need to
/// override the events you care about. Steps are numbered from 1 per traced
/// handle; a fork continues its parent's numbering.
///
/// Implementations must be `Send + Sync` as chains and their forks may be
/// driven from different threads.
pub trait ChainTracer: Send + Sync + 'static {
    /// Called before a generation step runs.
    #[inline]
    fn on_next_start(&self, _kind: ChainKind, _step: u64) {}

    /// Called after a step's value has been committed.
    #[inline]
    fn on_commit(&self, _kind: ChainKind, _step: u64) {}

    /// Called when a step fails; the cache slot is unchanged.
    #[inline]
    fn on_generation_failed(&self, _kind: ChainKind, _step: u64, _error: &ChainError) {}

    /// Called when a chain has been forked.
    #[inline]
    fn on_fork(&self, _kind: ChainKind, _isolation: ForkIsolation) {}

    /// Called when a chain refused to fork.
    #[inline]
    fn on_fork_refused(&self, _kind: ChainKind, _error: &ChainError) {}
}

/// Zero-cost tracer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl ChainTracer for NoopTracer {}

impl<T: ChainTracer> ChainTracer for Arc<T> {
    #[inline]
    fn on_next_start(&self, kind: ChainKind, step: u64) {
        (**self).on_next_start(kind, step)
    }

    #[inline]
    fn on_commit(&self, kind: ChainKind, step: u64) {
        (**self).on_commit(kind, step)
    }

    #[inline]
    fn on_generation_failed(&self, kind: ChainKind, step: u64, error: &ChainError) {
        (**self).on_generation_failed(kind, step, error)
    }

    #[inline]
    fn on_fork(&self, kind: ChainKind, isolation: ForkIsolation) {
        (**self).on_fork(kind, isolation)
    }

    #[inline]
    fn on_fork_refused(&self, kind: ChainKind, error: &ChainError) {
        (**self).on_fork_refused(kind, error)
    }
}

/// Tracer forwarding chain events to the `tracing` crate.
///
/// Steps and forks are emitted at `TRACE`/`DEBUG`; failures and refused
/// forks at `WARN`.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

#[cfg(feature = "tracing")]
impl ChainTracer for LogTracer {
    fn on_next_start(&self, kind: ChainKind, step: u64) {
        tracing::trace!(%kind, step, "chain step started");
    }

    fn on_commit(&self, kind: ChainKind, step: u64) {
        tracing::debug!(%kind, step, "chain step committed");
    }

    fn on_generation_failed(&self, kind: ChainKind, step: u64, error: &ChainError) {
        tracing::warn!(%kind, step, %error, "chain step failed");
    }

    fn on_fork(&self, kind: ChainKind, isolation: ForkIsolation) {
        tracing::debug!(%kind, ?isolation, "chain forked");
    }

    fn on_fork_refused(&self, kind: ChainKind, error: &ChainError) {
        tracing::warn!(%kind, %error, "chain refused to fork");
    }
}
