//! # Millrace
//!
//! An Adapter Facade and a distributed-safe Lock Manager for pluggable
//! storage backends.
//!
//! A storage backend implements [`Adapter`] — as little as `define`,
//! `describe`, `drop_collection`, `create`, `find`, `update`, and
//! `destroy` — and [`AdapterFacade`] fills in the rest: schema alteration
//! when the adapter doesn't implement `alter` natively, record counting
//! when it doesn't implement `count`, and the compound operations
//! (`find_or_create`, `create_each`, `find_or_create_each`) built on top of
//! a FIFO named [`LockManager`] that itself runs entirely through the
//! adapter's own CRUD — no adapter-specific locking primitive required.
//!
//! # Quick Start
//!
//! ```
//! use millrace::{AdapterFacade, AttributeInput, AttributeType, FacadeConfig, MemoryAdapter};
//! use millrace::Value;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! fn main() -> millrace::Result<()> {
//!     let adapter = Arc::new(MemoryAdapter::new());
//!     let facade = AdapterFacade::new(adapter, FacadeConfig::default())?;
//!
//!     let mut attributes = BTreeMap::new();
//!     attributes.insert("name".to_string(), AttributeInput::Shorthand(AttributeType::Text));
//!     facade.define("users", &attributes)?;
//!
//!     let mut record = millrace::Record::new();
//!     record.insert("name".to_string(), Value::from("ada"));
//!     let created = facade.create("users", record)?;
//!     assert_eq!(created.get("name"), Some(&Value::from("ada")));
//!
//!     Ok(())
//! }
//! ```

pub use millrace_core::{
    Adapter, AdapterCapabilities, Attribute, AttributeType, CollectionName, Criterion,
    CriteriaInput, Error, FacadeConfig, IdScalar, LockEntry, LockStore, Operator, Predicate,
    Record, Result, SortDirection, SortEntry, SortInput, Value, WhereClause, WhereInput,
};
pub use millrace_concurrency::{AdapterLockStore, LockManager};
pub use millrace_engine::{AdapterFacade, AlterSync, DropSync, SafeSync, SyncStrategy};
pub use millrace_memory::MemoryAdapter;
pub use millrace_primitives::{augment, diff_attributes, normalize, AttributeInput, SchemaDiff};
