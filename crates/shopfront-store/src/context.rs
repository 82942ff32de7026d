//! Action runtime types
//!
//! Actions receive an [`ActionContext`], the only capability they have to
//! change state. The caller of `Store::dispatch` receives an
//! [`ActionHandle`] that can be awaited, cancelled or simply dropped.

use crate::error::{Result, StoreError};
use crate::store::Store;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Cooperative cancellation flag shared between an action and its handle
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Capability handed to an action handler
///
/// Exposes the store's read side plus `commit`, which is the only way an
/// action may change state.
pub struct ActionContext<S> {
    store: Store<S>,
    action: String,
    token: CancelToken,
}

impl<S> Clone for ActionContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            action: self.action.clone(),
            token: self.token.clone(),
        }
    }
}

impl<S: Send + Sync + 'static> ActionContext<S> {
    pub(crate) fn new(store: Store<S>, action: String, token: CancelToken) -> Self {
        Self {
            store,
            action,
            token,
        }
    }

    /// Name of the action this context was created for
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Commit a mutation on the owning store
    pub fn commit<P: Any + fmt::Debug>(&self, mutation: &str, payload: P) -> Result<()> {
        self.store.commit(mutation, payload)
    }

    /// Read a getter on the owning store
    pub fn getter<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        self.store.getter(name)
    }

    /// Dispatch another action. The nested action gets its own handle and
    /// is not cancelled together with this one.
    pub fn dispatch<P: Any + Send>(&self, action: &str, payload: P) -> Result<ActionHandle> {
        self.store.dispatch(action, payload)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.store.with_state(f)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the caller has cancelled this action
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl<S: Clone + Send + Sync + 'static> ActionContext<S> {
    /// Snapshot of the current state
    pub fn state(&self) -> S {
        self.store.state()
    }
}

/// Handle to a dispatched action
///
/// Dropping the handle detaches the action; it keeps running.
pub struct ActionHandle {
    name: String,
    token: CancelToken,
    task: JoinHandle<Result<()>>,
}

impl ActionHandle {
    pub(crate) fn new(name: String, token: CancelToken, task: JoinHandle<Result<()>>) -> Self {
        Self { name, token, task }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the action to stop. Best effort: an action that has already
    /// committed, or that never checks its context, is unaffected.
    pub fn cancel(&self) {
        log::debug!("Cancelling action: {}", self.name);
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the action to complete and return its outcome
    pub async fn join(self) -> Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Action {} did not complete: {}", self.name, e);
                Err(StoreError::ActionAborted { name: self.name })
            }
        }
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("name", &self.name)
            .field("token", &self.token)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
