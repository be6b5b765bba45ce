//! Chains whose generation reads and writes an owned state object.

use std::fmt;

use async_trait::async_trait;
use futures_core::future::BoxFuture;

use crate::chain::{Chain, ChainKind, ForkIsolation};
use crate::slot::{CacheSlot, Observer};
use crate::ChainError;

type StatefulStep<S, R> =
    Box<dyn for<'a> FnMut(&'a mut S, R) -> BoxFuture<'a, anyhow::Result<R>> + Send>;
type StateSeed<S, R> = Box<dyn Fn(&S) -> anyhow::Result<R> + Send>;

/// A chain driven by a mutable state object it exclusively owns.
///
/// The state is moved into the chain at construction and is only touched
/// by the seed function (read-only, on first `peek()`/`next()`) and by the
/// step. `peek()` before any `next()` evaluates the seed against the state;
/// each `next()` evaluates `gen(&mut state, peek())` and commits the result.
///
/// `fork()` always fails with [`ChainError::ForkUnsupported`]: a fork would
/// either share the state with a second evolving chain or need a deep copy
/// of an opaque object, and neither is allowed.
///
/// # Example
///
/// ```ignore
/// use lazy_chain::{Chain, StatefulChain};
///
/// let mut fib = StatefulChain::from_fn(
///     (0u64, 1u64),
///     |&(a, _)| Ok(a),
///     |state, _previous| {
///         *state = (state.1, state.0 + state.1);
///         Ok(state.0)
///     },
/// );
/// assert_eq!(fib.next().await?, 1);
/// ```
pub struct StatefulChain<S, R> {
    state: S,
    seed: StateSeed<S, R>,
    step: StatefulStep<S, R>,
    slot: CacheSlot<R>,
}

impl<S, R> StatefulChain<S, R>
where
    S: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Create a chain from a state, a seed function and an asynchronous step.
    ///
    /// The step borrows the state for the duration of its future:
    ///
    /// ```ignore
    /// let chain = StatefulChain::new(rng, |_| Ok(0.0), |rng, previous| {
    ///     Box::pin(async move { Ok(previous + rng.sample().await?) })
    /// });
    /// ```
    pub fn new<Init, G>(state: S, seed: Init, step: G) -> Self
    where
        Init: Fn(&S) -> anyhow::Result<R> + Send + 'static,
        G: for<'a> FnMut(&'a mut S, R) -> BoxFuture<'a, anyhow::Result<R>> + Send + 'static,
    {
        Self {
            state,
            seed: Box::new(seed),
            step: Box::new(step),
            slot: CacheSlot::new(),
        }
    }

    /// Create a chain from a state, a seed function and a synchronous step.
    pub fn from_fn<Init, G>(state: S, seed: Init, mut step: G) -> Self
    where
        Init: Fn(&S) -> anyhow::Result<R> + Send + 'static,
        G: FnMut(&mut S, R) -> anyhow::Result<R> + Send + 'static,
    {
        Self::new(state, seed, move |state, previous| {
            let result = step(state, previous);
            Box::pin(std::future::ready(result))
        })
    }

    /// Read-only access to the owned state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Give up the chain and take the state back.
    pub fn into_state(self) -> S {
        self.state
    }

    fn current(&self) -> Result<R, ChainError> {
        self.slot
            .get_or_try_init(|| (self.seed)(&self.state).map_err(ChainError::from))
    }
}

#[async_trait]
impl<S, R> Chain for StatefulChain<S, R>
where
    S: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Item = R;

    fn peek(&self) -> Result<Option<R>, ChainError> {
        self.current().map(Some)
    }

    async fn next(&mut self) -> Result<R, ChainError> {
        let previous = self.current()?;
        let value = (self.step)(&mut self.state, previous).await?;
        self.slot.commit(value.clone());
        Ok(value)
    }

    fn fork(&self) -> Result<Self, ChainError> {
        Err(ChainError::ForkUnsupported {
            kind: ChainKind::Stateful,
        })
    }

    fn observer(&self) -> Observer<R> {
        Observer::from_slot(&self.slot)
    }

    fn kind(&self) -> ChainKind {
        ChainKind::Stateful
    }

    fn fork_isolation(&self) -> ForkIsolation {
        ForkIsolation::Refused
    }
}

impl<S: fmt::Debug, R: fmt::Debug> fmt::Debug for StatefulChain<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatefulChain")
            .field("state", &self.state)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_reads_state() {
        let chain = StatefulChain::from_fn(vec![4, 5], |v: &Vec<i32>| Ok(v[0]), |_, x| Ok(x));
        assert_eq!(chain.peek().unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_step_writes_state() {
        let mut chain = StatefulChain::from_fn(
            Vec::<i32>::new(),
            |history| Ok(history.len() as i32),
            |history, previous| {
                history.push(previous);
                Ok(previous + 10)
            },
        );

        assert_eq!(chain.next().await.unwrap(), 10);
        assert_eq!(chain.next().await.unwrap(), 20);
        assert_eq!(chain.state(), &vec![0, 10]);
        assert_eq!(chain.into_state(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_async_step_borrows_state() {
        let mut chain = StatefulChain::new(
            1u32,
            |_| Ok(0u32),
            |calls, previous| {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    *calls += 1;
                    Ok(previous + *calls)
                })
            },
        );

        assert_eq!(chain.next().await.unwrap(), 2);
        assert_eq!(chain.next().await.unwrap(), 5);
        assert_eq!(*chain.state(), 3);
    }

    #[tokio::test]
    async fn test_fork_refused() {
        let mut chain = StatefulChain::from_fn((), |_| Ok(1), |_, x| Ok(x * 2));
        assert!(chain.fork().unwrap_err().is_fork_unsupported());
        chain.next().await.unwrap();
        assert!(chain.fork().unwrap_err().is_fork_unsupported());
        assert_eq!(chain.fork_isolation(), ForkIsolation::Refused);
    }

    #[tokio::test]
    async fn test_failing_seed() {
        let mut chain = StatefulChain::from_fn(
            0u32,
            |_| -> anyhow::Result<i32> { Err(anyhow::anyhow!("state not ready")) },
            |calls, x| {
                *calls += 1;
                Ok(x)
            },
        );

        let peeked = chain.peek().unwrap_err();
        assert!(peeked.to_string().contains("state not ready"));
        assert!(chain.observer().get().is_none());

        let err = chain.next().await.unwrap_err();
        assert_eq!(err.to_string(), peeked.to_string());
        assert!(chain.observer().get().is_none());
        assert_eq!(*chain.state(), 0);
    }

    #[tokio::test]
    async fn test_debug_shows_state_and_slot() {
        let mut chain = StatefulChain::from_fn(vec![1u8], |_| Ok(7), |_, x| Ok(x + 1));
        chain.next().await.unwrap();
        let debug = format!("{chain:?}");
        assert!(debug.starts_with("StatefulChain"));
        assert!(debug.contains("[1]"));
        assert!(debug.contains("Some(8)"));
    }
}
