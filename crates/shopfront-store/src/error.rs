use thiserror::Error;

/// Errors returned by the store.
///
/// The `Unknown*` variants are programmer errors: the caller named an
/// operation that was never registered. They are reported before any state
/// is touched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown getter: {0}")]
    UnknownGetter(String),

    #[error("unknown mutation: {0}")]
    UnknownMutation(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Two handlers of the same kind were registered under one name.
    #[error("duplicate {kind} registered: {name}")]
    DuplicateName { kind: &'static str, name: String },

    /// The payload passed to a mutation or action has the wrong type.
    #[error("{name} expects a payload of type {expected}")]
    PayloadType { name: String, expected: &'static str },

    /// A getter was read back as a type other than the one it produces.
    #[error("getter {name} does not produce {expected}")]
    GetterType { name: String, expected: &'static str },

    /// `dispatch` was called with no tokio runtime to run the action on.
    #[error("action {name} needs a tokio runtime")]
    NoRuntime { name: String },

    /// The action's future resolved with an error.
    #[error("action {name} failed: {source}")]
    ActionFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The action's task panicked or was aborted before completing.
    #[error("action {name} did not run to completion")]
    ActionAborted { name: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
