//! Value transformation over another chain.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::{Chain, ChainKind, ForkIsolation};
use crate::slot::Observer;
use crate::ChainError;

/// A chain applying a pure function to the values of a parent chain.
///
/// Created by [`ChainExt::map`](crate::ChainExt::map).
///
/// - `peek()` is `f(parent.peek())`, or unset when the parent is unset.
/// - `next()` is `f(parent.next())` and consumes one step of the parent.
/// - `fork()` forks the parent and reuses `f`, so forks keep the
///   transformation. Isolation is whatever the parent provides.
pub struct Mapped<C, F> {
    parent: C,
    f: Arc<F>,
}

impl<C, F> Mapped<C, F> {
    pub(crate) fn new(parent: C, f: F) -> Self {
        Self {
            parent,
            f: Arc::new(f),
        }
    }

    /// The wrapped chain.
    pub fn parent(&self) -> &C {
        &self.parent
    }

    /// Unwrap into the parent chain.
    pub fn into_parent(self) -> C {
        self.parent
    }
}

#[async_trait]
impl<C, F, U> Chain for Mapped<C, F>
where
    C: Chain,
    F: Fn(C::Item) -> U + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    type Item = U;

    fn peek(&self) -> Result<Option<U>, ChainError> {
        Ok(self.parent.peek()?.map(|value| (self.f)(value)))
    }

    async fn next(&mut self) -> Result<U, ChainError> {
        let value = self.parent.next().await?;
        Ok((self.f)(value))
    }

    fn fork(&self) -> Result<Self, ChainError> {
        Ok(Self {
            parent: self.parent.fork()?,
            f: self.f.clone(),
        })
    }

    fn observer(&self) -> Observer<U> {
        let f = self.f.clone();
        self.parent.observer().map(move |value| f(value))
    }

    fn kind(&self) -> ChainKind {
        ChainKind::Mapped
    }

    fn fork_isolation(&self) -> ForkIsolation {
        self.parent.fork_isolation()
    }
}

impl<C: fmt::Debug, F> fmt::Debug for Mapped<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapped")
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}
