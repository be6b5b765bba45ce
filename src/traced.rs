//! Chain wrapper reporting to a [`ChainTracer`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::{Chain, ChainKind, ForkIsolation};
use crate::slot::Observer;
use crate::tracer::ChainTracer;
use crate::ChainError;

/// A chain that reports its steps and forks to a tracer.
///
/// Created by [`ChainExt::traced`](crate::ChainExt::traced). Behaves exactly
/// like the wrapped chain; forks are traced by the same tracer.
pub struct Traced<C, T> {
    inner: C,
    tracer: Arc<T>,
    steps: u64,
}

impl<C, T> Traced<C, T> {
    pub(crate) fn new(inner: C, tracer: T) -> Self {
        Self {
            inner,
            tracer: Arc::new(tracer),
            steps: 0,
        }
    }

    /// The wrapped chain.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap into the wrapped chain.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C, T> Chain for Traced<C, T>
where
    C: Chain,
    T: ChainTracer,
{
    type Item = C::Item;

    fn peek(&self) -> Result<Option<C::Item>, ChainError> {
        self.inner.peek()
    }

    async fn next(&mut self) -> Result<C::Item, ChainError> {
        let kind = self.inner.kind();
        let step = self.steps + 1;
        self.tracer.on_next_start(kind, step);
        match self.inner.next().await {
            Ok(value) => {
                self.steps = step;
                self.tracer.on_commit(kind, step);
                Ok(value)
            }
            Err(err) => {
                self.tracer.on_generation_failed(kind, step, &err);
                Err(err)
            }
        }
    }

    fn fork(&self) -> Result<Self, ChainError> {
        let kind = self.inner.kind();
        match self.inner.fork() {
            Ok(inner) => {
                self.tracer.on_fork(kind, inner.fork_isolation());
                Ok(Self {
                    inner,
                    tracer: self.tracer.clone(),
                    steps: self.steps,
                })
            }
            Err(err) => {
                self.tracer.on_fork_refused(kind, &err);
                Err(err)
            }
        }
    }

    fn observer(&self) -> Observer<C::Item> {
        self.inner.observer()
    }

    fn kind(&self) -> ChainKind {
        self.inner.kind()
    }

    fn fork_isolation(&self) -> ForkIsolation {
        self.inner.fork_isolation()
    }
}
