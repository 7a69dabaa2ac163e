//! FIFO named mutual exclusion, implemented on top of an adapter's own
//! CRUD rather than any native database lock: requests are rows in a
//! reserved collection, ordered by adapter-assigned monotonic id, polled
//! for ownership, and released by deletion.

pub mod adapter_store;
pub mod manager;

pub use adapter_store::{AdapterLockStore, RESERVED_COLLECTION};
pub use manager::LockManager;
