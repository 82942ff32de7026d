//! Observable state store
//!
//! This crate provides:
//! - `Store`: single owner of a state value, shared by cheap clones
//! - Getters: cached read-only derivations of state
//! - Mutations: named synchronous state changes
//! - Actions: named async operations that change state through mutations
//! - Middleware and subscriptions around every commit

pub mod context;
pub mod error;
pub mod middleware;
pub mod store;

pub use context::{ActionContext, ActionHandle, CancelToken};
pub use error::{Result, StoreError};
pub use middleware::{Commit, LoggingMiddleware, Middleware};
pub use store::{BoxFuture, Store, StoreBuilder};
