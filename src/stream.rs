//! Infinite `Stream` adapters over chains.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_core::future::BoxFuture;
use futures_core::stream::{BoxStream, Stream};

use crate::chain::Chain;
use crate::ChainError;

/// A lazy, infinite stream of a borrowed chain's values.
///
/// Created by [`ChainExt::stream`](crate::ChainExt::stream). Each poll drives
/// one `next()`; nothing is generated until the consumer asks for it.
///
/// The stream only ends after yielding the first error. Stopping early
/// (dropping the stream, even while a step is suspended) commits nothing,
/// so the chain keeps its last committed value and can be resumed.
///
/// Feed it into a push-style sink with `StreamExt::forward`, or bound it
/// with `StreamExt::take`.
pub struct ChainStream<'a, R> {
    inner: BoxStream<'a, Result<R, ChainError>>,
}

impl<'a, R: Send + 'static> ChainStream<'a, R> {
    pub(crate) fn new<C>(chain: &'a mut C) -> Self
    where
        C: Chain<Item = R> + 'a,
    {
        let stream = futures_util::stream::unfold(Some(chain), |chain| async move {
            let chain = chain?;
            match chain.next().await {
                Ok(value) => Some((Ok(value), Some(chain))),
                Err(err) => Some((Err(err), None)),
            }
        });
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl<R> Stream for ChainStream<'_, R> {
    type Item = Result<R, ChainError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<R> fmt::Debug for ChainStream<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStream").finish_non_exhaustive()
    }
}

type PendingStep<C> = BoxFuture<'static, (C, Result<<C as Chain>::Item, ChainError>)>;

/// A lazy, infinite stream that owns its chain.
///
/// Created by [`ChainExt::into_stream`](crate::ChainExt::into_stream). While
/// a step runs, the chain is moved into the step's future and handed back
/// when it completes. Between polls, and after the stream has ended on its
/// first error, [`into_inner`](IntoChainStream::into_inner) returns the
/// chain with its last committed value intact.
pub struct IntoChainStream<C: Chain> {
    chain: Option<C>,
    pending: Option<PendingStep<C>>,
    done: bool,
}

// The chain is only ever moved, never pinned in place.
impl<C: Chain> Unpin for IntoChainStream<C> {}

impl<C: Chain + 'static> IntoChainStream<C> {
    pub(crate) fn new(chain: C) -> Self {
        Self {
            chain: Some(chain),
            pending: None,
            done: false,
        }
    }

    /// Check whether the stream has yielded its error and ended.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Take the chain back.
    ///
    /// Returns `None` only if the stream is dropped while a step is
    /// suspended: the chain went down with the cancelled step.
    pub fn into_inner(self) -> Option<C> {
        self.chain
    }
}

impl<C: Chain + 'static> Stream for IntoChainStream<C> {
    type Item = Result<C::Item, ChainError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        if this.pending.is_none() {
            let Some(mut chain) = this.chain.take() else {
                return Poll::Ready(None);
            };
            this.pending = Some(Box::pin(async move {
                let result = chain.next().await;
                (chain, result)
            }));
        }
        let Some(pending) = this.pending.as_mut() else {
            return Poll::Ready(None);
        };
        let (chain, result) = ready!(pending.as_mut().poll(cx));
        this.pending = None;
        this.chain = Some(chain);
        this.done = result.is_err();
        Poll::Ready(Some(result))
    }
}

impl<C: Chain + fmt::Debug> fmt::Debug for IntoChainStream<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoChainStream")
            .field("chain", &self.chain)
            .field("suspended", &self.pending.is_some())
            .field("done", &self.done)
            .finish()
    }
}
