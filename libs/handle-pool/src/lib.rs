//! Bounded async pool of stateful handles.
//!
//! [`Pool`] lends out handles created lazily by a [`HandleFactory`], capped
//! at `max_total` concurrently outstanding handles. When every handle is in
//! use, [`Pool::acquire`] suspends the caller until one is returned — a
//! saturated pool applies backpressure instead of rejecting work. An
//! optional `acquire_timeout` turns that wait into [`PoolError::AcquireTimeout`].
//!
//! Release is RAII: dropping the [`PooledHandle`] guard pushes the handle
//! back onto the idle list and frees its capacity slot. A handle that was
//! never acquired has no guard, so releasing it is unrepresentable.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Builds ready-to-use handles from static configuration.
///
/// The factory is consulted only when `acquire()` finds no idle handle and
/// the pool is below its cap; it performs no per-request work. Handles come
/// back to the pool as-is — there is no passivation hook.
#[async_trait]
pub trait HandleFactory<T: Send>: Send + Sync {
    /// Create one handle.
    ///
    /// # Errors
    ///
    /// Implementation-defined; a failure here surfaces to the acquiring
    /// caller as [`PoolError::CreateFailed`] and the capacity slot is
    /// released again.
    async fn create(&self) -> anyhow::Result<T>;
}

/// Pool sizing and waiting behavior.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Hard cap on concurrently outstanding handles.
    pub max_total: usize,
    /// Deadline for waiting on a free handle. `None` blocks until one is
    /// returned.
    pub acquire_timeout: Option<Duration>,
}

/// Failure modes of [`Pool::acquire`].
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The factory could not produce a handle.
    #[error("failed to create a pooled handle: {0}")]
    CreateFailed(#[from] anyhow::Error),
    /// No handle was returned within the configured deadline.
    #[error("no pooled handle became available within {0:?}")]
    AcquireTimeout(Duration),
    /// The pool was shut down while waiting.
    #[error("pool is closed")]
    Closed,
}

struct PoolInner<T: Send + 'static> {
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<T>>,
    factory: Box<dyn HandleFactory<T>>,
    acquire_timeout: Option<Duration>,
}

/// Bounded pool of reusable handles.
///
/// Cloning is cheap and all clones share the same handles and cap.
pub struct Pool<T: Send + 'static> {
    inner: Arc<PoolInner<T>>,
}

impl<T: Send + 'static> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> Pool<T> {
    /// Create a pool that lazily fills itself through `factory`.
    #[must_use]
    pub fn new(config: PoolConfig, factory: impl HandleFactory<T> + 'static) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                permits: Arc::new(Semaphore::new(config.max_total)),
                idle: Mutex::new(Vec::new()),
                factory: Box::new(factory),
                acquire_timeout: config.acquire_timeout,
            }),
        }
    }

    /// Lease a handle, waiting for capacity if every handle is in use.
    ///
    /// An idle handle is reused when present; otherwise the factory creates
    /// a fresh one. The returned guard gives exclusive access and returns
    /// the handle on drop.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AcquireTimeout`] when a deadline is configured and no
    ///   handle frees up in time
    /// - [`PoolError::CreateFailed`] when the factory fails; the capacity
    ///   slot is released again
    /// - [`PoolError::Closed`] when the pool is shut down
    pub async fn acquire(&self) -> Result<PooledHandle<T>, PoolError> {
        let permits = Arc::clone(&self.inner.permits);
        let permit = match self.inner.acquire_timeout {
            Some(deadline) => tokio::time::timeout(deadline, permits.acquire_owned())
                .await
                .map_err(|_| PoolError::AcquireTimeout(deadline))?,
            None => permits.acquire_owned().await,
        }
        .map_err(|_: AcquireError| PoolError::Closed)?;

        let reused = self.inner.idle.lock().pop();
        let handle = if let Some(handle) = reused {
            handle
        } else {
            tracing::debug!("pool empty below cap, creating a new handle");
            match self.inner.factory.create().await {
                Ok(handle) => handle,
                Err(e) => {
                    // Permit drops here, so the slot is not leaked.
                    drop(permit);
                    return Err(PoolError::CreateFailed(e));
                }
            }
        };

        Ok(PooledHandle {
            handle: Some(handle),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Handles currently sitting idle in the pool.
    #[must_use]
    pub fn idle_len(&self) -> usize {
        self.inner.idle.lock().len()
    }
}

impl<T: Send + 'static> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle_len())
            .field("free_slots", &self.inner.permits.available_permits())
            .finish_non_exhaustive()
    }
}

/// Exclusive lease on a pooled handle.
///
/// Dereferences to the handle. Dropping the guard returns the handle to the
/// pool and frees its capacity slot exactly once, whether the caller
/// finished normally, errored, or panicked.
pub struct PooledHandle<T: Send + 'static> {
    handle: Option<T>,
    pool: Arc<PoolInner<T>>,
    _permit: OwnedSemaphorePermit,
}

impl<T: Send + 'static> Deref for PooledHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // The slot is only emptied by Drop.
        let Some(handle) = &self.handle else {
            unreachable!("pooled handle accessed after drop")
        };
        handle
    }
}

impl<T: Send + 'static> DerefMut for PooledHandle<T> {
    fn deref_mut(&mut self) -> &mut T {
        let Some(handle) = &mut self.handle else {
            unreachable!("pooled handle accessed after drop")
        };
        handle
    }
}

impl<T: Send + 'static> Drop for PooledHandle<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.pool.idle.lock().push(handle);
        }
    }
}
