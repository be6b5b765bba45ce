//! Self-referential chains: each value is computed from the previous one.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_core::future::BoxFuture;

use crate::chain::{Chain, ChainKind, ForkIsolation};
use crate::slot::{CacheSlot, Observer};
use crate::ChainError;

type MarkovStep<R> = Arc<dyn Fn(R) -> BoxFuture<'static, anyhow::Result<R>> + Send + Sync>;

/// Where a chain's first `peek()` comes from.
pub enum Seed<R> {
    /// A ready value.
    Value(R),
    /// A function evaluated once, on first use.
    Lazy(Arc<dyn Fn() -> anyhow::Result<R> + Send + Sync>),
}

impl<R: Clone> Clone for Seed<R> {
    fn clone(&self) -> Self {
        match self {
            Seed::Value(value) => Seed::Value(value.clone()),
            Seed::Lazy(f) => Seed::Lazy(f.clone()),
        }
    }
}

impl<R: Clone> Seed<R> {
    /// A seed produced by `f` when first needed.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Seed::Lazy(Arc::new(f))
    }

    fn resolve(&self) -> Result<R, ChainError> {
        match self {
            Seed::Value(value) => Ok(value.clone()),
            Seed::Lazy(f) => Ok(f()?),
        }
    }
}

/// A chain whose step maps the previous value to the next one.
///
/// `peek()` before any `next()` reports the seed; each `next()` computes
/// `gen(peek())`, commits the result and returns it. The step always sees
/// exactly the value committed by the call before it.
///
/// `fork()` returns a new chain seeded with the current cached value and
/// sharing the same step, with its own cache slot. Parent and fork evolve
/// independently afterwards.
///
/// # Example
///
/// ```ignore
/// use lazy_chain::{Chain, MarkovChain};
///
/// let mut walk = MarkovChain::from_fn(0.0, |x: f64| Ok(x + jitter()));
/// let mut branch = walk.fork()?;
/// ```
pub struct MarkovChain<R> {
    seed: Seed<R>,
    step: MarkovStep<R>,
    slot: CacheSlot<R>,
}

impl<R: Clone + Send + Sync + 'static> MarkovChain<R> {
    /// Create a chain from a seed value and an asynchronous step.
    pub fn new<F, Fut>(seed: R, step: F) -> Self
    where
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        Self::from_parts(Seed::Value(seed), box_step(step))
    }

    /// Create a chain from a seed value and a synchronous step.
    pub fn from_fn<F>(seed: R, step: F) -> Self
    where
        F: Fn(R) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self::new(seed, move |previous| std::future::ready(step(previous)))
    }

    /// Create a chain whose seed is computed on first use.
    pub fn with_seed<F, Fut>(seed: Seed<R>, step: F) -> Self
    where
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        Self::from_parts(seed, box_step(step))
    }

    fn from_parts(seed: Seed<R>, step: MarkovStep<R>) -> Self {
        let slot = match &seed {
            Seed::Value(value) => CacheSlot::seeded(value.clone()),
            Seed::Lazy(_) => CacheSlot::new(),
        };
        Self { seed, step, slot }
    }

    fn current(&self) -> Result<R, ChainError> {
        self.slot.get_or_try_init(|| self.seed.resolve())
    }
}

fn box_step<R, F, Fut>(step: F) -> MarkovStep<R>
where
    F: Fn(R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    Arc::new(move |previous: R| -> BoxFuture<'static, anyhow::Result<R>> {
        Box::pin(step(previous))
    })
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> Chain for MarkovChain<R> {
    type Item = R;

    fn peek(&self) -> Result<Option<R>, ChainError> {
        self.current().map(Some)
    }

    async fn next(&mut self) -> Result<R, ChainError> {
        let previous = self.current()?;
        let value = (self.step)(previous).await?;
        self.slot.commit(value.clone());
        Ok(value)
    }

    fn fork(&self) -> Result<Self, ChainError> {
        let seed = match self.slot.get() {
            Some(value) => Seed::Value(value),
            None => self.seed.clone(),
        };
        Ok(Self::from_parts(seed, self.step.clone()))
    }

    fn observer(&self) -> Observer<R> {
        Observer::from_slot(&self.slot)
    }

    fn kind(&self) -> ChainKind {
        ChainKind::Markov
    }

    fn fork_isolation(&self) -> ForkIsolation {
        ForkIsolation::Isolated
    }
}

impl<R: fmt::Debug> fmt::Debug for MarkovChain<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkovChain")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
