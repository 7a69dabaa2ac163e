//! Shared types, traits, and the unified error surface for every
//! `millrace-*` crate: the `Adapter` contract a storage backend implements,
//! the `Value`/`Record`/`Attribute`/`Criterion` data model, and the
//! `LockStore` contract the lock manager drives.

pub mod adapter;
pub mod attribute;
pub mod config;
pub mod criteria;
pub mod error;
pub mod lock;
pub mod value;

pub use adapter::{Adapter, AdapterCapabilities};
pub use attribute::{Attribute, AttributeType, CollectionName};
pub use config::FacadeConfig;
pub use criteria::{
    Criterion, CriteriaInput, IdScalar, Operator, Predicate, RawCriteria, SortDirection,
    SortEntry, SortInput, WhereClause, WhereInput,
};
pub use error::{Error, Result};
pub use lock::{LockEntry, LockStore};
pub use value::{now_millis, Record, Value};
