//! Single-value cache slot shared between a chain and its observers.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::ChainError;

/// Thread-visible holder for the last value a chain committed.
///
/// Writers perform a single store after a generation step completes, and
/// readers only ever see a fully committed value. Cloning a slot shares it:
/// both clones read and write the same cell.
pub struct CacheSlot<R> {
    value: Arc<RwLock<Option<R>>>,
}

impl<R> Clone for CacheSlot<R> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<R> Default for CacheSlot<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> CacheSlot<R> {
    /// Create an unset slot.
    pub fn new() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a slot already holding `value`.
    pub fn seeded(value: R) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(value))),
        }
    }

    /// Replace the cached value.
    pub fn commit(&self, value: R) {
        *self.value.write() = Some(value);
    }

    /// Check whether a value has been committed.
    pub fn is_set(&self) -> bool {
        self.value.read().is_some()
    }

    /// Check whether two slots are the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<R: Clone> CacheSlot<R> {
    /// Get a copy of the cached value, if any.
    pub fn get(&self) -> Option<R> {
        self.value.read().clone()
    }

    /// Get the cached value, initializing it with `init` when unset.
    ///
    /// `init` runs outside the lock. If another writer commits first, its
    /// value wins and is returned.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<R, ChainError>
    where
        F: FnOnce() -> Result<R, ChainError>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }
        let value = init()?;
        let mut guard = self.value.write();
        Ok(guard.get_or_insert(value).clone())
    }
}

impl<R: fmt::Debug> fmt::Debug for CacheSlot<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheSlot").field(&*self.value.read()).finish()
    }
}

/// Cloneable read-only view of a chain's committed value.
///
/// Observers may be moved to other threads and read concurrently while the
/// owning chain is generating. They never advance the chain and never run
/// seed functions, so a lazily seeded chain reads as unset until its seed
/// has been evaluated by `peek()` or `next()`.
pub struct Observer<R> {
    read: Arc<dyn Fn() -> Option<R> + Send + Sync>,
}

impl<R> Clone for Observer<R> {
    fn clone(&self) -> Self {
        Self {
            read: self.read.clone(),
        }
    }
}

impl<R: Clone + Send + Sync + 'static> Observer<R> {
    /// An observer reading from `slot`.
    pub fn from_slot(slot: &CacheSlot<R>) -> Self {
        let slot = slot.clone();
        Self {
            read: Arc::new(move || slot.get()),
        }
    }

    /// An observer that always reads `value`.
    pub fn constant(value: R) -> Self {
        Self {
            read: Arc::new(move || Some(value.clone())),
        }
    }

    /// Apply `f` to every value read through this observer.
    pub fn map<U, F>(self, f: F) -> Observer<U>
    where
        F: Fn(R) -> U + Send + Sync + 'static,
        U: 'static,
    {
        let read = self.read;
        Observer {
            read: Arc::new(move || read().map(&f)),
        }
    }
}

impl<R> Observer<R> {
    /// Read the last committed value.
    pub fn get(&self) -> Option<R> {
        (self.read)()
    }
}

impl<R> fmt::Debug for Observer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}
