//! Shared lock-entry type and the `LockStore` contract the concurrency
//! crate's `LockManager` drives.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single row in the reserved lock collection.
///
/// `id` is adapter-assigned and monotonically increasing — it, not
/// insertion order as observed by any particular caller, is what defines
/// FIFO queue position. Two lock entries are equal iff every field is
/// equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockEntry {
    /// Unique identifier for this specific lock request, generated by the
    /// requester.
    pub uuid: Uuid,
    /// The lock name being requested.
    pub name: String,
    /// Adapter-assigned monotonic id, defining FIFO order within `name`.
    pub id: u64,
}

/// The storage contract the lock manager needs: enqueue a request, list
/// the current queue for a name, and dequeue (release) a specific entry.
///
/// Implemented directly against an [`Adapter`](crate::adapter::Adapter) in
/// `millrace-concurrency`, bypassing any Facade — the lock manager only
/// ever needs CRUD against one reserved collection, never schema
/// management or the rest of the Facade surface.
pub trait LockStore: Send + Sync {
    /// Insert a new queue entry for `name`, returning it with its
    /// adapter-assigned `id` populated.
    fn enqueue(&self, name: &str, uuid: Uuid) -> Result<LockEntry>;

    /// Return every currently-queued entry for `name`, ordered by `id`
    /// ascending (oldest request first).
    fn queue(&self, name: &str) -> Result<Vec<LockEntry>>;

    /// Remove the entry with the given `uuid`, releasing its position in
    /// the queue. A no-op if no such entry exists.
    fn release(&self, uuid: Uuid) -> Result<()>;
}
