//! Error types for chain generation.

use std::sync::Arc;

use thiserror::Error;

use crate::chain::ChainKind;

/// Errors surfaced by [`Chain`](crate::Chain) operations.
///
/// User errors raised by seed or step functions are carried as
/// `Arc<anyhow::Error>` so the error stays cheap to clone. Any
/// `anyhow::Error` converts into this type with `?`:
///
/// - an error that already is a `ChainError` (for example from a nested
///   chain's `next()`) is unwrapped as-is,
/// - a [`SourceExhausted`] marker becomes [`ChainError::Exhausted`],
/// - anything else becomes [`ChainError::Generation`].
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// `fork()` was called on a chain whose state cannot be isolated.
    ///
    /// Stateful chains own a mutable state object that must never be shared
    /// between two evolving chains, so they refuse to fork. This signals a
    /// programming error and is never retried.
    #[error("fork unsupported: {kind} chains cannot be isolated")]
    ForkUnsupported {
        /// The kind of chain that refused the fork.
        kind: ChainKind,
    },

    /// The underlying value source has no further elements.
    #[error("value source exhausted")]
    Exhausted,

    /// A user-supplied seed or step function failed.
    ///
    /// The chain's cache slot is left at its last committed value.
    #[error("generation failed: {0}")]
    Generation(Arc<anyhow::Error>),
}

/// Marker error for steps whose value source has run dry.
///
/// Returning this from a step (through `anyhow`) surfaces as
/// [`ChainError::Exhausted`] rather than a generic generation failure.
///
/// ```ignore
/// let chain = SimpleChain::from_fn(move || {
///     queue.pop().ok_or_else(|| SourceExhausted.into())
/// });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value source has no further elements")]
pub struct SourceExhausted;

impl From<anyhow::Error> for ChainError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ChainError>() {
            Ok(chain_err) => return chain_err,
            Err(err) => err,
        };
        if err.is::<SourceExhausted>() {
            ChainError::Exhausted
        } else {
            ChainError::Generation(Arc::new(err))
        }
    }
}

impl From<SourceExhausted> for ChainError {
    fn from(_: SourceExhausted) -> Self {
        ChainError::Exhausted
    }
}

impl ChainError {
    /// Returns the inner user error if this is a `Generation` variant.
    pub fn generation_error(&self) -> Option<&Arc<anyhow::Error>> {
        match self {
            ChainError::Generation(e) => Some(e),
            _ => None,
        }
    }

    /// Attempts to downcast the generation error to a specific type.
    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.generation_error().and_then(|e| e.downcast_ref::<E>())
    }

    /// Returns `true` if this is a `Generation` error wrapping an `E`.
    pub fn is<E: std::error::Error + Send + Sync + 'static>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }

    /// Returns `true` for [`ChainError::ForkUnsupported`].
    pub fn is_fork_unsupported(&self) -> bool {
        matches!(self, ChainError::ForkUnsupported { .. })
    }

    /// Returns `true` for [`ChainError::Exhausted`].
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ChainError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("sensor offline: {0}")]
    struct SensorOffline(u32);

    #[test]
    fn test_anyhow_becomes_generation() {
        let err: ChainError = anyhow::anyhow!("bad draw").into();
        assert!(matches!(err, ChainError::Generation(_)));
        assert!(err.to_string().contains("bad draw"));
    }

    #[test]
    fn test_source_exhausted_becomes_exhausted() {
        let err: ChainError = anyhow::Error::from(SourceExhausted).into();
        assert!(err.is_exhausted());

        let err: ChainError = SourceExhausted.into();
        assert!(err.is_exhausted());
    }

    #[test]
    fn test_nested_chain_error_is_unwrapped() {
        let inner = ChainError::ForkUnsupported {
            kind: ChainKind::Stateful,
        };
        let err: ChainError = anyhow::Error::from(inner).into();
        assert!(err.is_fork_unsupported());
    }

    #[test]
    fn test_downcast_user_error() {
        let err: ChainError = anyhow::Error::from(SensorOffline(7)).into();
        assert!(err.is::<SensorOffline>());
        assert_eq!(err.downcast_ref::<SensorOffline>().unwrap().0, 7);
        assert!(!err.is::<SourceExhausted>());
    }

    #[test]
    fn test_display() {
        let err = ChainError::ForkUnsupported {
            kind: ChainKind::Stateful,
        };
        assert_eq!(
            err.to_string(),
            "fork unsupported: stateful chains cannot be isolated"
        );
        assert_eq!(ChainError::Exhausted.to_string(), "value source exhausted");
    }
}
