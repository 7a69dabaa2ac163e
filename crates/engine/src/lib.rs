//! The Adapter Facade: upgrades a partially-implemented storage
//! [`Adapter`](millrace_core::Adapter) into a full collection API —
//! DDL (define/describe/alter/drop), DQL (create/find/update/destroy/
//! count), and lock-manager-backed compound operations
//! (findOrCreate/createEach/findOrCreateEach) — plus the sync strategies
//! that reconcile a collection's schema when a Facade is opened.

pub mod config;
pub mod facade;
pub mod sync;

pub use facade::AdapterFacade;
pub use sync::{AlterSync, DropSync, SafeSync, SyncStrategy};
