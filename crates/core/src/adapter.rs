//! The `Adapter` trait: the contract a storage backend implements, and the
//! contract the Facade upgrades into a full collection API.

use crate::attribute::Attribute;
use crate::criteria::Criterion;
use crate::error::{Error, Result};
use crate::value::Record;

/// Bool flags an adapter returns once, at construction, describing which
/// optional methods it actually implements.
///
/// The Facade reads these flags a single time (in `AdapterFacade::new`) and
/// memoizes the dispatch decision, rather than probing for method presence
/// on every call — the statically-typed equivalent of checking
/// `typeof adapter.alter === 'function'`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterCapabilities {
    /// Adapter implements `alter` natively (otherwise the Facade falls
    /// back to its own add-then-remove diff algorithm).
    pub alter: bool,
    /// Adapter implements `add_attribute`/`remove_attribute` natively.
    pub schema_migration: bool,
    /// Adapter implements `create_each` natively (otherwise the Facade
    /// falls back to sequential `create` calls).
    pub create_each: bool,
    /// Adapter implements `find_or_create`/`find_or_create_each` natively
    /// (otherwise the Facade builds them out of `find`/`create` under a
    /// lock).
    pub find_or_create: bool,
    /// Adapter implements `count` natively (otherwise the Facade falls
    /// back to `find(criteria).len()`).
    pub count: bool,
    /// Adapter supports association joins. Always `false` in this crate;
    /// reserved for a future adapter generation (joins are out of scope).
    pub join: bool,
}

/// The contract a pluggable storage backend implements.
///
/// Every method has a default body so a minimal adapter can implement only
/// `identity`/`capabilities`/`create`/`find`/`update`/`destroy` and still be
/// usable; methods gated by an `AdapterCapabilities` flag return
/// [`Error::Unsupported`] by default rather than panicking, so the Facade
/// can detect "not implemented" without downcasting.
pub trait Adapter: Send + Sync {
    /// Stable identifier for this adapter instance, used in log messages
    /// and error context.
    fn identity(&self) -> &str {
        "adapter"
    }

    /// Capability flags this adapter advertises. Consulted exactly once by
    /// the Facade at construction time.
    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::default()
    }

    /// Register a new collection's schema. Must fail with
    /// [`Error::CollectionAlreadyExists`] if the name is already defined.
    fn define(&self, collection: &str, attributes: &[Attribute]) -> Result<()>;

    /// Return the currently-registered attributes for a collection, or
    /// `None` if it does not exist.
    fn describe(&self, collection: &str) -> Result<Option<Vec<Attribute>>>;

    /// Remove a collection and all of its records.
    fn drop_collection(&self, collection: &str) -> Result<()>;

    /// Replace a collection's schema in a single adapter-native operation.
    /// Only called when `capabilities().alter` is `true`; the Facade
    /// otherwise synthesizes this from `add_attribute`/`remove_attribute`.
    fn alter(&self, collection: &str, attributes: &[Attribute]) -> Result<()> {
        let _ = (collection, attributes);
        Err(Error::Unsupported("alter"))
    }

    /// Add a single attribute to an existing collection's schema.
    fn add_attribute(&self, collection: &str, attribute: &Attribute) -> Result<()> {
        let _ = (collection, attribute);
        Err(Error::Unsupported("add_attribute"))
    }

    /// Remove a single attribute from an existing collection's schema.
    fn remove_attribute(&self, collection: &str, attribute_name: &str) -> Result<()> {
        let _ = (collection, attribute_name);
        Err(Error::Unsupported("remove_attribute"))
    }

    /// Insert one record and return it as stored (including any
    /// adapter-assigned fields such as a primary key).
    fn create(&self, collection: &str, record: Record) -> Result<Record>;

    /// Insert multiple records in one call. Only called when
    /// `capabilities().create_each` is `true`.
    fn create_each(&self, collection: &str, records: Vec<Record>) -> Result<Vec<Record>> {
        let _ = (collection, records);
        Err(Error::Unsupported("create_each"))
    }

    /// Return every record matching `criteria`.
    fn find(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>>;

    /// Apply `changes` to every record matching `criteria`, returning the
    /// updated records.
    fn update(&self, collection: &str, criteria: &Criterion, changes: Record) -> Result<Vec<Record>>;

    /// Delete every record matching `criteria`, returning the deleted
    /// records.
    fn destroy(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>>;

    /// Count records matching `criteria`. Only called when
    /// `capabilities().count` is `true`; the Facade otherwise falls back to
    /// `find(criteria)?.len()`.
    fn count(&self, collection: &str, criteria: &Criterion) -> Result<usize> {
        let _ = (collection, criteria);
        Err(Error::Unsupported("count"))
    }

    /// Find the single record matching `criteria`, or create `new_record`
    /// if none matches, as one adapter-native atomic operation. Only
    /// called when `capabilities().find_or_create` is `true`; the Facade
    /// otherwise builds this out of `find`/`create` under a lock.
    ///
    /// Returns the record alongside whether it was newly created.
    fn find_or_create(
        &self,
        collection: &str,
        criteria: &Criterion,
        new_record: Record,
    ) -> Result<(Record, bool)> {
        let _ = (collection, criteria, new_record);
        Err(Error::Unsupported("find_or_create"))
    }

    /// The batch form of `find_or_create`, matching each candidate on
    /// `search_keys`. Only called when `capabilities().find_or_create` is
    /// `true`.
    fn find_or_create_each(
        &self,
        collection: &str,
        search_keys: &[String],
        candidates: Vec<Record>,
    ) -> Result<Vec<Record>> {
        let _ = (collection, search_keys, candidates);
        Err(Error::Unsupported("find_or_create_each"))
    }

    /// Resolve an association join. Only called when `capabilities().join`
    /// is `true`. Always unsupported in this crate; reserved for a future
    /// adapter generation (joins are out of scope).
    fn join(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
        let _ = (collection, criteria);
        Err(Error::Unsupported("join"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl Adapter for Minimal {
        fn define(&self, _collection: &str, _attributes: &[Attribute]) -> Result<()> {
            Ok(())
        }
        fn describe(&self, _collection: &str) -> Result<Option<Vec<Attribute>>> {
            Ok(None)
        }
        fn drop_collection(&self, _collection: &str) -> Result<()> {
            Ok(())
        }
        fn create(&self, _collection: &str, record: Record) -> Result<Record> {
            Ok(record)
        }
        fn find(&self, _collection: &str, _criteria: &Criterion) -> Result<Vec<Record>> {
            Ok(Vec::new())
        }
        fn update(&self, _collection: &str, _criteria: &Criterion, _changes: Record) -> Result<Vec<Record>> {
            Ok(Vec::new())
        }
        fn destroy(&self, _collection: &str, _criteria: &Criterion) -> Result<Vec<Record>> {
            Ok(Vec::new())
        }
    }

    fn accept_dyn_adapter(_a: &dyn Adapter) {}

    #[test]
    fn adapter_trait_is_object_safe() {
        let minimal = Minimal;
        accept_dyn_adapter(&minimal);
    }

    #[test]
    fn unimplemented_optional_methods_report_unsupported() {
        let minimal = Minimal;
        let criteria = Criterion::default();
        assert!(matches!(
            minimal.alter("x", &[]),
            Err(Error::Unsupported("alter"))
        ));
        assert!(matches!(
            minimal.count("x", &criteria),
            Err(Error::Unsupported("count"))
        ));
        assert!(matches!(
            minimal.find_or_create("x", &criteria, Record::new()),
            Err(Error::Unsupported("find_or_create"))
        ));
        assert!(matches!(
            minimal.find_or_create_each("x", &[], Vec::new()),
            Err(Error::Unsupported("find_or_create_each"))
        ));
        assert!(matches!(
            minimal.join("x", &criteria),
            Err(Error::Unsupported("join"))
        ));
    }

    #[test]
    fn default_capabilities_are_all_false() {
        let minimal = Minimal;
        assert_eq!(minimal.capabilities(), AdapterCapabilities::default());
        assert!(!minimal.capabilities().alter);
    }
}
