//! Cancellable work scope.
//!
//! A `WorkScope` is the unit that carries cancellation and an optional deadline
//! down a call tree. Children observe their parent's cancellation and inherit the
//! tighter of the two deadlines. Cancelling a child never affects the parent.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::Extensions;
use futures_util::future::BoxFuture;
use tokio::sync::watch;

/// Request id stored as a scope value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRequestId(pub String);

/// Handle to a cancellable unit of work.
#[derive(Clone)]
pub struct WorkScope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    parent: Option<WorkScope>,
    cancel_tx: watch::Sender<bool>,
    deadline: Option<Instant>,
    values: Extensions,
}

impl WorkScope {
    /// Create a root scope: never cancelled unless `cancel` is called, no deadline.
    pub fn root() -> Self {
        Self::build(None, None, Extensions::new())
    }

    fn build(parent: Option<WorkScope>, deadline: Option<Instant>, values: Extensions) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ScopeInner {
                parent,
                cancel_tx,
                deadline,
                values,
            }),
        }
    }

    /// Derive a child scope that inherits cancellation, deadline and values.
    pub fn child(&self) -> Self {
        Self::build(
            Some(self.clone()),
            self.inner.deadline,
            self.inner.values.clone(),
        )
    }

    /// Derive a child scope whose deadline is the earlier of `deadline` and the parent's.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.inner.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self::build(Some(self.clone()), Some(deadline), self.inner.values.clone())
    }

    /// Derive a child scope that expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child scope carrying `value`, replacing any value of the same type.
    pub fn with_value<T>(&self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut values = self.inner.values.clone();
        values.insert(value);
        Self::build(Some(self.clone()), self.inner.deadline, values)
    }

    /// Look up a value attached to this scope or one of its ancestors.
    pub fn value<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.inner.values.get::<T>()
    }

    /// Request id attached to this scope, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.value::<ScopedRequestId>().map(|id| id.0.as_str())
    }

    /// Deadline of this scope, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Cancel this scope and every scope derived from it.
    pub fn cancel(&self) {
        self.inner.cancel_tx.send_replace(true);
    }

    /// True once this scope or an ancestor is cancelled, or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        if *self.inner.cancel_tx.borrow() {
            return true;
        }
        if self.inner.deadline.is_some_and(|d| Instant::now() >= d) {
            return true;
        }
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.is_cancelled())
    }

    /// Resolve once the scope is cancelled or its deadline passes.
    pub fn cancelled(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let mut rx = self.inner.cancel_tx.subscribe();
            let own = async move {
                // The sender lives as long as `self`, so this only returns on cancel.
                let _ = rx.wait_for(|cancelled| *cancelled).await;
            };
            let parent = async {
                match &self.inner.parent {
                    Some(parent) => parent.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            };
            let expiry = async {
                match self.inner.deadline {
                    Some(deadline) => {
                        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
                    }
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = own => {}
                _ = parent => {}
                _ = expiry => {}
            }
        })
    }

    /// Consume the handle into a guard that cancels the scope when dropped.
    pub fn cancel_on_drop(self) -> CancelOnDrop {
        CancelOnDrop { scope: self }
    }
}

impl Default for WorkScope {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for WorkScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkScope")
            .field("request_id", &self.request_id())
            .field("deadline", &self.inner.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Cancels the wrapped scope when dropped.
#[derive(Debug)]
pub struct CancelOnDrop {
    scope: WorkScope,
}

impl CancelOnDrop {
    /// The guarded scope.
    pub fn scope(&self) -> &WorkScope {
        &self.scope
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
