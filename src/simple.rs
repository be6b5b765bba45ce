//! Chains of independent draws.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_core::future::BoxFuture;
use parking_lot::Mutex;

use crate::chain::{Chain, ChainKind, ForkIsolation};
use crate::error::SourceExhausted;
use crate::slot::{CacheSlot, Observer};
use crate::ChainError;

type SimpleStep<R> = Box<dyn FnMut() -> BoxFuture<'static, anyhow::Result<R>> + Send>;

/// A chain whose step ignores history: every `next()` is a fresh draw.
///
/// `peek()` is unset until the first `next()`.
///
/// # Forking
///
/// `fork()` returns another handle to the same instance: the step and the
/// cache slot are shared, so a value drawn through either handle becomes
/// visible to `peek()` on both. Draws are independent, so no generation
/// order is shared. Consumers that need a private cache must not rely on
/// forking a `SimpleChain` (or a `map` over one) for isolation; see
/// [`ForkIsolation::Shared`].
///
/// # Example
///
/// ```ignore
/// use lazy_chain::{Chain, SimpleChain};
///
/// let mut dice = SimpleChain::from_fn(|| Ok(roll_d6()));
/// let roll = dice.next().await?;
/// assert_eq!(dice.peek()?, Some(roll));
/// ```
pub struct SimpleChain<R> {
    step: Arc<Mutex<SimpleStep<R>>>,
    slot: CacheSlot<R>,
}

impl<R> Clone for SimpleChain<R> {
    fn clone(&self) -> Self {
        Self {
            step: self.step.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<R: Clone + Send + Sync + 'static> SimpleChain<R> {
    /// Create a chain from an asynchronous step.
    pub fn new<F, Fut>(mut step: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        let step: SimpleStep<R> =
            Box::new(move || -> BoxFuture<'static, anyhow::Result<R>> { Box::pin(step()) });
        Self {
            step: Arc::new(Mutex::new(step)),
            slot: CacheSlot::new(),
        }
    }

    /// Create a chain from a synchronous step.
    pub fn from_fn<F>(mut step: F) -> Self
    where
        F: FnMut() -> anyhow::Result<R> + Send + 'static,
    {
        Self::new(move || std::future::ready(step()))
    }

    /// Create a chain that draws successive elements of `iter`.
    ///
    /// Once the iterator runs out, every `next()` fails with
    /// [`ChainError::Exhausted`] and `peek()` keeps the last element.
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = R>,
        I::IntoIter: Send + 'static,
    {
        let mut iter = iter.into_iter();
        Self::from_fn(move || iter.next().ok_or_else(|| SourceExhausted.into()))
    }

    /// Check whether `other` is a handle to the same instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.step, &other.step)
    }
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> Chain for SimpleChain<R> {
    type Item = R;

    fn peek(&self) -> Result<Option<R>, ChainError> {
        Ok(self.slot.get())
    }

    async fn next(&mut self) -> Result<R, ChainError> {
        // The step lock only covers creating the future, never awaiting it.
        let pending = {
            let mut step = self.step.lock();
            (*step)()
        };
        let value = pending.await?;
        self.slot.commit(value.clone());
        Ok(value)
    }

    fn fork(&self) -> Result<Self, ChainError> {
        Ok(self.clone())
    }

    fn observer(&self) -> Observer<R> {
        Observer::from_slot(&self.slot)
    }

    fn kind(&self) -> ChainKind {
        ChainKind::Simple
    }

    fn fork_isolation(&self) -> ForkIsolation {
        ForkIsolation::Shared
    }
}

impl<R: fmt::Debug> fmt::Debug for SimpleChain<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleChain")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
