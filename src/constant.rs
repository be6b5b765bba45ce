//! The degenerate chain that always yields one value.

use async_trait::async_trait;

use crate::chain::{Chain, ChainKind, ForkIsolation};
use crate::slot::Observer;
use crate::ChainError;

/// A chain holding one fixed value.
///
/// `peek()` and `next()` both return the value; `next()` neither suspends
/// nor mutates anything. Forks are indistinguishable from the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantChain<R> {
    value: R,
}

impl<R> ConstantChain<R> {
    /// Create a chain that always yields `value`.
    pub fn new(value: R) -> Self {
        Self { value }
    }

    /// The held value.
    pub fn value(&self) -> &R {
        &self.value
    }
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> Chain for ConstantChain<R> {
    type Item = R;

    fn peek(&self) -> Result<Option<R>, ChainError> {
        Ok(Some(self.value.clone()))
    }

    async fn next(&mut self) -> Result<R, ChainError> {
        Ok(self.value.clone())
    }

    fn fork(&self) -> Result<Self, ChainError> {
        Ok(self.clone())
    }

    fn observer(&self) -> Observer<R> {
        Observer::constant(self.value.clone())
    }

    fn kind(&self) -> ChainKind {
        ChainKind::Constant
    }

    fn fork_isolation(&self) -> ForkIsolation {
        ForkIsolation::Shared
    }
}
