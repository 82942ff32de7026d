use crate::context::{ActionContext, ActionHandle, CancelToken};
use crate::error::{Result, StoreError};
use crate::middleware::{Commit, Middleware};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

/// BoxFuture type alias for action handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type GetterFn<S> = Box<dyn Fn(&S) -> Arc<dyn Any + Send + Sync> + Send + Sync>;
type MutationFn<S> = Box<dyn Fn(&mut S, &dyn Any) -> Result<()> + Send + Sync>;
type ActionFn<S> = Box<
    dyn Fn(ActionContext<S>, Box<dyn Any + Send>) -> Result<BoxFuture<'static, anyhow::Result<()>>>
        + Send
        + Sync,
>;
type Subscriber<S> = Box<dyn Fn(&Commit<'_>, &S) + Send + Sync>;

struct Mutation<S> {
    payload: TypeId,
    payload_name: &'static str,
    apply: MutationFn<S>,
}

/// Store - single owner of shared state
///
/// The store follows the centralized state pattern:
/// - Getters derive read-only values from state
/// - Mutations are the only way state changes, and they are synchronous
/// - Actions may suspend, and change state only by committing mutations
///
/// `Store` is a cheap handle; clones share the same state.
///
/// ```rust,ignore
/// let store = Store::builder(Counter::default())
///     .getter("doubled", |s: &Counter| s.value * 2)
///     .mutation("add", |s: &mut Counter, n: &i64| s.value += n)
///     .build()?;
///
/// store.commit("add", 2_i64)?;
/// assert_eq!(store.getter::<i64>("doubled")?, 4);
/// ```
pub struct Store<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    state: RwLock<S>,
    revision: AtomicU64,
    getters: HashMap<String, GetterFn<S>>,
    mutations: HashMap<String, Mutation<S>>,
    actions: HashMap<String, ActionFn<S>>,
    // Held for the whole commit, so it also serializes commits
    middleware: Mutex<Vec<Box<dyn Middleware<S>>>>,
    subscribers: RwLock<Vec<Subscriber<S>>>,
    getter_cache: Mutex<HashMap<String, (u64, Arc<dyn Any + Send + Sync>)>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Send + Sync + 'static> Store<S> {
    /// Start building a store around its initial state
    pub fn builder(initial_state: S) -> StoreBuilder<S> {
        StoreBuilder::new(initial_state)
    }

    /// Number of mutations applied so far
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    /// Read state without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = read(&self.inner.state);
        f(&*state)
    }

    /// Evaluate a registered getter against the current state
    ///
    /// Results are cached per getter and reused until the next mutation.
    pub fn getter<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        let compute = self
            .inner
            .getters
            .get(name)
            .ok_or_else(|| StoreError::UnknownGetter(name.to_string()))?;

        let value = {
            let state = read(&self.inner.state);
            // Revisions only move under the write lock
            let revision = self.revision();
            let mut cache = lock(&self.inner.getter_cache);
            match cache.get(name) {
                Some((cached_at, value)) if *cached_at == revision => Arc::clone(value),
                _ => {
                    log::trace!("Computing getter {} at revision {}", name, revision);
                    let value = compute(&*state);
                    cache.insert(name.to_string(), (revision, Arc::clone(&value)));
                    value
                }
            }
        };

        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| StoreError::GetterType {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Apply a registered mutation synchronously
    ///
    /// Fails before touching state if the mutation is unknown or the payload
    /// has the wrong type. A commit consumed by middleware returns `Ok`.
    ///
    /// A handler that panics is not rolled back: whatever it wrote before
    /// unwinding stays in the state, and the revision still advances so
    /// getters are recomputed against it.
    pub fn commit<P: Any + fmt::Debug>(&self, mutation: &str, payload: P) -> Result<()> {
        let handler = self.inner.mutations.get(mutation).ok_or_else(|| {
            log::error!("Unknown mutation: {}", mutation);
            StoreError::UnknownMutation(mutation.to_string())
        })?;

        if handler.payload != TypeId::of::<P>() {
            return Err(StoreError::PayloadType {
                name: mutation.to_string(),
                expected: handler.payload_name,
            });
        }

        let commit = Commit {
            mutation,
            payload: &payload,
        };

        let mut middleware = lock(&self.inner.middleware);
        {
            let state = read(&self.inner.state);
            for mw in middleware.iter_mut() {
                if !mw.handle(&commit, &state) {
                    log::debug!("Commit consumed by middleware: {:?}", commit);
                    return Ok(());
                }
            }
        }

        {
            let mut state = write(&self.inner.state);
            let _unwind = UnwindGuard {
                revision: &self.inner.revision,
            };
            (handler.apply)(&mut *state, &payload)?;
            self.inner.revision.fetch_add(1, Ordering::SeqCst);
        }

        let state = read(&self.inner.state);
        for subscriber in read(&self.inner.subscribers).iter() {
            subscriber(&commit, &*state);
        }
        drop(middleware);

        Ok(())
    }

    /// Run a registered action on the tokio runtime
    ///
    /// Must be called from within a tokio runtime. Unknown actions, mistyped
    /// payloads and a missing runtime fail here, before anything is spawned.
    pub fn dispatch<P: Any + Send>(&self, action: &str, payload: P) -> Result<ActionHandle> {
        let handler = self.inner.actions.get(action).ok_or_else(|| {
            log::error!("Unknown action: {}", action);
            StoreError::UnknownAction(action.to_string())
        })?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            log::error!("Action {} dispatched outside a tokio runtime", action);
            StoreError::NoRuntime {
                name: action.to_string(),
            }
        })?;

        let token = CancelToken::new();
        let context = ActionContext::new(self.clone(), action.to_string(), token.clone());
        let future = handler(context, Box::new(payload))?;

        log::debug!("Dispatching action: {}", action);
        let name = action.to_string();
        let task = runtime.spawn(async move {
            let result = future.await;
            result.map_err(|source| {
                log::warn!("Action {} failed: {:#}", name, source);
                StoreError::ActionFailed { name, source }
            })
        });

        Ok(ActionHandle::new(action.to_string(), token, task))
    }

    /// Observe every applied mutation together with the resulting state
    ///
    /// Subscribers run inside the commit and must not commit to this store.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&Commit<'_>, &S) + Send + Sync + 'static,
    {
        write(&self.inner.subscribers).push(Box::new(callback));
    }
}

impl<S: Clone + Send + Sync + 'static> Store<S> {
    /// Snapshot of the current state
    pub fn state(&self) -> S {
        read(&self.inner.state).clone()
    }
}

/// Collects getters, mutations, actions and middleware for a new store
pub struct StoreBuilder<S> {
    state: S,
    getters: Vec<(String, GetterFn<S>)>,
    mutations: Vec<(String, Mutation<S>)>,
    actions: Vec<(String, ActionFn<S>)>,
    middleware: Vec<Box<dyn Middleware<S>>>,
}

impl<S: Send + Sync + 'static> StoreBuilder<S> {
    pub fn new(initial_state: S) -> Self {
        Self {
            state: initial_state,
            getters: Vec::new(),
            mutations: Vec::new(),
            actions: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Register a derived value
    pub fn getter<T, F>(mut self, name: &str, derive: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let compute: GetterFn<S> = Box::new(move |state: &S| {
            let value: Arc<dyn Any + Send + Sync> = Arc::new(derive(state));
            value
        });
        self.getters.push((name.to_string(), compute));
        self
    }

    /// Register a synchronous state change
    pub fn mutation<P, F>(mut self, name: &str, handler: F) -> Self
    where
        P: Any,
        F: Fn(&mut S, &P) + Send + Sync + 'static,
    {
        let mutation_name = name.to_string();
        let apply: MutationFn<S> = Box::new(
            move |state: &mut S, payload: &dyn Any| -> Result<()> {
                let payload =
                    payload
                        .downcast_ref::<P>()
                        .ok_or_else(|| StoreError::PayloadType {
                            name: mutation_name.clone(),
                            expected: type_name::<P>(),
                        })?;
                handler(state, payload);
                Ok(())
            },
        );
        self.mutations.push((
            name.to_string(),
            Mutation {
                payload: TypeId::of::<P>(),
                payload_name: type_name::<P>(),
                apply,
            },
        ));
        self
    }

    /// Register an asynchronous operation
    pub fn action<P, F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        P: Any + Send,
        F: Fn(ActionContext<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let action_name = name.to_string();
        let run: ActionFn<S> = Box::new(
            move |context: ActionContext<S>,
                  payload: Box<dyn Any + Send>|
                  -> Result<BoxFuture<'static, anyhow::Result<()>>> {
                let payload = payload
                    .downcast::<P>()
                    .map_err(|_| StoreError::PayloadType {
                        name: action_name.clone(),
                        expected: type_name::<P>(),
                    })?;
                let future: BoxFuture<'static, anyhow::Result<()>> =
                    Box::pin(handler(context, *payload));
                Ok(future)
            },
        );
        self.actions.push((name.to_string(), run));
        self
    }

    /// Add middleware. Middleware is called in the order it was added.
    pub fn middleware<M: Middleware<S> + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Validate names and create the store
    pub fn build(self) -> Result<Store<S>> {
        let getters = index("getter", self.getters)?;
        let mutations = index("mutation", self.mutations)?;
        let actions = index("action", self.actions)?;

        log::debug!(
            "Store built with {} getters, {} mutations, {} actions",
            getters.len(),
            mutations.len(),
            actions.len()
        );

        Ok(Store {
            inner: Arc::new(Inner {
                state: RwLock::new(self.state),
                revision: AtomicU64::new(0),
                getters,
                mutations,
                actions,
                middleware: Mutex::new(self.middleware),
                subscribers: RwLock::new(Vec::new()),
                getter_cache: Mutex::new(HashMap::new()),
            }),
        })
    }
}

fn index<V>(kind: &'static str, entries: Vec<(String, V)>) -> Result<HashMap<String, V>> {
    let mut map = HashMap::with_capacity(entries.len());
    for (name, value) in entries {
        if map.contains_key(&name) {
            return Err(StoreError::DuplicateName { kind, name });
        }
        map.insert(name, value);
    }
    Ok(map)
}

/// Bumps the revision if a mutation handler unwinds.
///
/// A panicking handler may have changed part of the state in place. The
/// store keeps serving that state, so cached getters must not outlive it.
struct UnwindGuard<'a> {
    revision: &'a AtomicU64,
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            log::error!("Mutation panicked, state may be partially applied");
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// A panicking handler leaves the lock poisoned. The state is whatever the
// handler had written before it unwound; keep serving it rather than
// poisoning every later reader.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
