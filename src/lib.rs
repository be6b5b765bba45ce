//! Lazy-Chain: forkable, suspension-aware value generators.
//!
//! A [`Chain`] produces a lazy, possibly infinite sequence of values, one
//! `next()` at a time, and remembers the last value it produced in a cache
//! slot readable through `peek()`.
//!
//! # Key Features
//!
//! - **Async steps**: generation steps may suspend (I/O, sampling sources)
//! - **Cache slot**: the last committed value is visible to `peek()` and to
//!   [`Observer`]s on other threads, never partially written
//! - **Forking**: continue a chain from its current value without touching
//!   the original
//! - **No corruption on failure**: a failed step leaves the cache untouched
//!
//! # Chains
//!
//! - [`SimpleChain`] - independent draws; also wraps iterators
//! - [`MarkovChain`] - each value computed from the previous one
//! - [`StatefulChain`] - generation reads and writes an owned state object
//! - [`ConstantChain`] - always the same value
//! - [`Mapped`] - a pure transformation over any chain, via [`ChainExt::map`]
//!
//! # Example
//!
//! ```ignore
//! use lazy_chain::{Chain, ChainExt, MarkovChain};
//!
//! let mut evens = MarkovChain::from_fn(0, |x: i32| Ok(x + 1)).map(|x| x * 2);
//! assert_eq!(evens.next().await?, 2);
//! assert_eq!(evens.peek()?, Some(2));
//!
//! let mut branch = evens.fork()?;
//! assert_eq!(branch.next().await?, 4);
//! assert_eq!(evens.peek()?, Some(2));
//! ```
//!
//! # Observability
//!
//! Chains never log. Wrap one with [`ChainExt::traced`] to report its steps
//! to a [`ChainTracer`]; see the [`tracer`] module.

#![warn(missing_docs)]

mod chain;
mod collector;
mod constant;
mod error;
mod map;
mod markov;
mod simple;
mod slot;
mod stateful;
#[cfg(feature = "stream")]
mod stream;
mod traced;
pub mod tracer;

pub use chain::{Chain, ChainExt, ChainKind, ForkIsolation};
pub use collector::{ChainEvent, EventCollector};
pub use constant::ConstantChain;
pub use error::{ChainError, SourceExhausted};
pub use map::Mapped;
pub use markov::{MarkovChain, Seed};
pub use simple::SimpleChain;
pub use slot::{CacheSlot, Observer};
pub use stateful::StatefulChain;
#[cfg(feature = "stream")]
pub use stream::{ChainStream, IntoChainStream};
pub use traced::Traced;
#[cfg(feature = "tracing")]
pub use tracer::LogTracer;
pub use tracer::{ChainTracer, NoopTracer};
