//! Commit middleware
//!
//! Middleware sits between `Store::commit` and the mutation handler:
//!
//! ```text
//! commit → Middleware Chain → Mutation → State → Subscribers
//! ```
//!
//! Each middleware can inspect the commit and the state it is about to be
//! applied to, and can consume the commit so the mutation never runs.

use std::fmt;

/// A single request to run a named mutation
#[derive(Clone, Copy)]
pub struct Commit<'a> {
    pub mutation: &'a str,
    pub payload: &'a dyn fmt::Debug,
}

impl fmt::Debug for Commit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.mutation, self.payload)
    }
}

/// Middleware trait - intercepts commits before they reach the mutation
///
/// Middleware is called in the order it was added to the store. It runs
/// while the store holds its middleware lock, so it must not commit to the
/// same store.
pub trait Middleware<S>: Send {
    /// Handle a commit
    ///
    /// - `commit`: the mutation name and payload
    /// - `state`: state before the mutation (read-only)
    ///
    /// Returns `true` to continue the chain, `false` to consume the commit
    fn handle(&mut self, commit: &Commit<'_>, state: &S) -> bool;
}

/// LoggingMiddleware - logs every commit passing through
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Middleware<S> for LoggingMiddleware {
    fn handle(&mut self, commit: &Commit<'_>, _state: &S) -> bool {
        log::debug!("Commit: {:?}", commit);
        true
    }
}
