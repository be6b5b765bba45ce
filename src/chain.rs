//! The generator contract shared by every chain.

use std::fmt;

use async_trait::async_trait;
use futures_core::future::BoxFuture;

use crate::map::Mapped;
use crate::slot::Observer;
use crate::traced::Traced;
use crate::tracer::ChainTracer;
use crate::ChainError;

#[cfg(feature = "stream")]
use crate::stream::{ChainStream, IntoChainStream};

/// The variant a chain belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainKind {
    /// Independent draws, see [`SimpleChain`](crate::SimpleChain).
    Simple,
    /// Next value depends on the previous one, see [`MarkovChain`](crate::MarkovChain).
    Markov,
    /// Generation reads and writes owned state, see [`StatefulChain`](crate::StatefulChain).
    Stateful,
    /// Always the same value, see [`ConstantChain`](crate::ConstantChain).
    Constant,
    /// A transformation over another chain, see [`Mapped`].
    Mapped,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainKind::Simple => "simple",
            ChainKind::Markov => "markov",
            ChainKind::Stateful => "stateful",
            ChainKind::Constant => "constant",
            ChainKind::Mapped => "mapped",
        };
        f.write_str(name)
    }
}

/// What `fork()` hands back for a given chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForkIsolation {
    /// The fork has its own cache slot and evolves independently.
    Isolated,
    /// The fork is another handle to the same instance.
    ///
    /// Draws are independent, so the only thing shared is the most recently
    /// committed value. Consumers that need a private `peek()` must not rely
    /// on `fork()` for isolation.
    Shared,
    /// `fork()` fails with [`ChainError::ForkUnsupported`].
    Refused,
}

/// A lazy, possibly infinite, non-restartable generator of values.
///
/// Every chain keeps the last value it produced in a cache slot:
///
/// - `peek()` reads that value without advancing,
/// - `next()` runs one (possibly suspending) generation step, commits the
///   result and returns it,
/// - `fork()` produces a chain continuing from the current cached value.
///
/// `next()` takes `&mut self`, so a single handle never has two generation
/// steps in flight. Use [`Chain::observer`] to read committed values from
/// other tasks or threads while a step is running.
///
/// # Example
///
/// ```ignore
/// use lazy_chain::{Chain, MarkovChain};
///
/// let mut counter = MarkovChain::from_fn(0, |x: i32| Ok(x + 1));
/// assert_eq!(counter.next().await?, 1);
/// assert_eq!(counter.next().await?, 2);
/// assert_eq!(counter.peek()?, Some(2));
/// ```
#[async_trait]
pub trait Chain: Send {
    /// The type of values produced.
    type Item: Clone + Send + Sync + 'static;

    /// Return the last committed value without advancing.
    ///
    /// Never suspends. Returns `Ok(None)` for chains without a seed that have
    /// not produced anything yet. Seeded chains evaluate a lazy seed at most
    /// once; a failing seed function is the only source of errors here.
    fn peek(&self) -> Result<Option<Self::Item>, ChainError>;

    /// Advance by one step and commit the produced value.
    ///
    /// May suspend while the generation step suspends. On failure the cache
    /// slot keeps its last committed value.
    async fn next(&mut self) -> Result<Self::Item, ChainError>;

    /// Create a chain continuing from the current cached value.
    ///
    /// Never mutates `self`. See [`Chain::fork_isolation`] for whether the
    /// result is an isolated copy or another handle to the same instance.
    fn fork(&self) -> Result<Self, ChainError>
    where
        Self: Sized;

    /// A read-only view of this chain's cache slot.
    fn observer(&self) -> Observer<Self::Item>;

    /// The variant of this chain.
    fn kind(&self) -> ChainKind;

    /// How `fork()` behaves for this chain.
    fn fork_isolation(&self) -> ForkIsolation;
}

/// Combinators available on every [`Chain`].
pub trait ChainExt: Chain {
    /// Transform every value with a pure function.
    ///
    /// `next()` on the result consumes one step of `self`. Mapping does not
    /// fork `self`: mapping a shared-fork chain (such as a `SimpleChain`)
    /// keeps its [`ForkIsolation::Shared`] behavior.
    fn map<U, F>(self, f: F) -> Mapped<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Item) -> U + Send + Sync + 'static,
        U: Clone + Send + Sync + 'static,
    {
        Mapped::new(self, f)
    }

    /// Report generation and fork events to `tracer`.
    fn traced<T>(self, tracer: T) -> Traced<Self, T>
    where
        Self: Sized,
        T: ChainTracer,
    {
        Traced::new(self, tracer)
    }

    /// Collect the next `n` values.
    ///
    /// Stops at the first failure; values generated before it stay committed.
    fn sample(&mut self, n: usize) -> BoxFuture<'_, Result<Vec<Self::Item>, ChainError>>
    where
        Self: Sized,
    {
        Box::pin(async move {
            let mut values = Vec::with_capacity(n);
            for _ in 0..n {
                values.push(self.next().await?);
            }
            Ok(values)
        })
    }

    /// An infinite stream over this chain, borrowing it.
    ///
    /// Dropping the stream hands the chain back with its last committed
    /// value intact, ready to resume.
    #[cfg(feature = "stream")]
    fn stream(&mut self) -> ChainStream<'_, Self::Item>
    where
        Self: Sized,
    {
        ChainStream::new(self)
    }

    /// An infinite stream that takes ownership of this chain.
    ///
    /// The chain can be taken back with
    /// [`IntoChainStream::into_inner`], including after the stream has
    /// ended on an error.
    #[cfg(feature = "stream")]
    fn into_stream(self) -> IntoChainStream<Self>
    where
        Self: Sized + 'static,
    {
        IntoChainStream::new(self)
    }
}

impl<C: Chain + ?Sized> ChainExt for C {}
