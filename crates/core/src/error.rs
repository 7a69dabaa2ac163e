//! Unified error surface for every `millrace-*` crate.
//!
//! Mirrors the "one error enum per workspace" shape: every crate in this
//! workspace returns [`Error`]/[`Result`], and adapter- or store-originated
//! failures are boxed into a variant rather than translated, so the caller
//! always sees the adapter's own message.

use std::fmt;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The single error type returned by every public operation in this crate
/// family.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A criteria/attribute input did not satisfy the shape rules in the
    /// normalizer (e.g. `sort` was neither a map nor an `"attr asc|desc"`
    /// string).
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// `define` was called for a collection name that is already registered.
    #[error("collection already exists: {0}")]
    CollectionAlreadyExists(String),

    /// An operation referenced a collection that has not been defined.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// The underlying adapter does not implement a method its capability
    /// flags claimed to support, or did not implement a required method at
    /// all.
    #[error("adapter does not implement required method `{0}`")]
    AdapterMethodMissing(&'static str),

    /// A capability-gated adapter method was invoked but the adapter's
    /// `capabilities()` did not advertise support for it.
    #[error("adapter does not support `{0}`")]
    Unsupported(&'static str),

    /// `find` matched more than one record when the caller asked for at
    /// most one.
    #[error("expected at most one record in `{collection}`, found {count}")]
    TooManyRecords {
        /// Name of the collection that was queried.
        collection: String,
        /// Number of matching records actually found.
        count: usize,
    },

    /// An error surfaced by the adapter itself, passed through unchanged.
    #[error("adapter error: {0}")]
    Adapter(String),

    /// An error surfaced while reading or writing the reserved lock
    /// ("transaction") collection.
    #[error("lock store error: {0}")]
    LockStore(String),

    /// A lock request timed out before it reached the head of its queue.
    #[error("timed out waiting for lock `{0}`")]
    LockTimeout(String),

    /// Configuration could not be parsed or written.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors that indicate a caller mistake (bad input), as
    /// opposed to an adapter- or storage-originated failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::InvalidCriteria(_) | Error::CollectionNotFound(_))
    }

    /// True for errors that reflect a violated uniqueness/cardinality
    /// constraint rather than a transient failure.
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Error::CollectionAlreadyExists(_) | Error::TooManyRecords { .. }
        )
    }

    /// True for errors that originated inside the adapter rather than in
    /// this crate's own validation.
    pub fn is_adapter_error(&self) -> bool {
        matches!(self, Error::Adapter(_))
    }

    /// True for errors raised by the lock manager or the lock store.
    pub fn is_lock_error(&self) -> bool {
        matches!(self, Error::LockStore(_) | Error::LockTimeout(_))
    }

    /// Construct an [`Error::Adapter`] from any displayable adapter failure.
    pub fn adapter(message: impl fmt::Display) -> Self {
        Error::Adapter(message.to_string())
    }

    /// Construct an [`Error::LockStore`] from any displayable failure.
    pub fn lock_store(message: impl fmt::Display) -> Self {
        Error::LockStore(message.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidCriteria(err.to_string())
    }
}
