//! The Adapter Facade: fills in default DDL/DQL/compound-operation
//! behavior on top of a partially-implemented [`Adapter`].

use millrace_core::{
    now_millis, Adapter, AdapterCapabilities, Attribute, Criterion, Error, FacadeConfig, Operator,
    Predicate, Record, Result, Value, WhereClause,
};
use millrace_concurrency::{AdapterLockStore, LockManager};
use millrace_primitives::{augment, diff_attributes, AttributeInput};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Upgrades a partial [`Adapter`] into a full collection API: schema
/// management (DDL), record queries (DQL), and lock-manager-backed
/// compound operations, all dispatched according to the capability flags
/// the adapter reported once at construction.
pub struct AdapterFacade<A: Adapter> {
    adapter: Arc<A>,
    capabilities: AdapterCapabilities,
    config: FacadeConfig,
    lock_manager: LockManager<AdapterLockStore<A>>,
}

impl<A: Adapter + 'static> AdapterFacade<A> {
    /// Wrap `adapter`, reading its capability flags once and provisioning
    /// the reserved lock collection the compound operations run under.
    pub fn new(adapter: Arc<A>, config: FacadeConfig) -> Result<Self> {
        let capabilities = adapter.capabilities();
        let lock_store = Arc::new(AdapterLockStore::new(adapter.clone())?);
        let lock_manager =
            LockManager::new(lock_store).with_warning_timer(config.transaction_warning_timer);
        Ok(AdapterFacade {
            adapter,
            capabilities,
            config,
            lock_manager,
        })
    }

    /// The wrapped adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    // ------------------------------------------------------------------
    // DDL
    // ------------------------------------------------------------------

    /// Register a new collection, expanding `attributes` through the
    /// augmenter (adding an implicit primary key and configured timestamp
    /// attributes) before handing the final schema to the adapter.
    pub fn define(&self, collection: &str, attributes: &BTreeMap<String, AttributeInput>) -> Result<()> {
        let expanded = augment(attributes, &self.config);
        self.adapter.define(collection, &expanded)
    }

    /// Return a collection's current attribute list, or `None` if it has
    /// not been defined.
    pub fn describe(&self, collection: &str) -> Result<Option<Vec<Attribute>>> {
        self.adapter.describe(collection)
    }

    /// Remove a collection and all of its records.
    pub fn drop_collection(&self, collection: &str) -> Result<()> {
        self.adapter.drop_collection(collection)
    }

    /// Change a collection's schema to match `attributes`.
    ///
    /// If the adapter implements `alter` natively, it is called directly.
    /// Otherwise the Facade computes the attribute-level diff and applies
    /// it itself: every addition runs concurrently, then (only once every
    /// addition has succeeded) every removal runs concurrently — so a
    /// rename never leaves a window with neither the old nor new
    /// attribute present.
    pub fn alter(&self, collection: &str, attributes: &BTreeMap<String, AttributeInput>) -> Result<()> {
        let desired = augment(attributes, &self.config);

        if self.capabilities.alter {
            return self.adapter.alter(collection, &desired);
        }
        if !self.capabilities.schema_migration {
            // Neither `alter` nor `add_attribute`/`remove_attribute` — the
            // safe default is a no-op rather than surfacing `Unsupported`.
            return Ok(());
        }

        let existing = self
            .adapter
            .describe(collection)?
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        let diff = diff_attributes(&existing, &desired);
        if diff.is_empty() {
            return Ok(());
        }

        std::thread::scope(|scope| -> Result<()> {
            let handles: Vec<_> = diff
                .to_add
                .iter()
                .map(|attribute| {
                    scope.spawn(|| self.adapter.add_attribute(collection, attribute))
                })
                .collect();
            for handle in handles {
                handle
                    .join()
                    .map_err(|_| Error::adapter("add_attribute panicked"))??;
            }
            Ok(())
        })?;

        std::thread::scope(|scope| -> Result<()> {
            let handles: Vec<_> = diff
                .to_remove
                .iter()
                .map(|name| scope.spawn(|| self.adapter.remove_attribute(collection, name)))
                .collect();
            for handle in handles {
                handle
                    .join()
                    .map_err(|_| Error::adapter("remove_attribute panicked"))??;
            }
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // DQL
    // ------------------------------------------------------------------

    /// Insert one record, stamping `created_at`/`updated_at` per config.
    pub fn create(&self, collection: &str, record: Record) -> Result<Record> {
        self.adapter.create(collection, self.stamp_new(record))
    }

    /// Return every record matching `criteria`.
    pub fn find_all(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
        self.adapter.find(collection, criteria)
    }

    /// Return at most one record matching `criteria`.
    ///
    /// `Ok(None)` if nothing matches, `Ok(Some(record))` if exactly one
    /// record matches, and [`Error::TooManyRecords`] if more than one
    /// does.
    pub fn find(&self, collection: &str, criteria: &Criterion) -> Result<Option<Record>> {
        let mut records = self.find_all(collection, criteria)?;
        match records.len() {
            0 => Ok(None),
            1 => Ok(Some(records.pop().unwrap())),
            count => Err(Error::TooManyRecords {
                collection: collection.to_string(),
                count,
            }),
        }
    }

    /// Count records matching `criteria`, using the adapter's native
    /// `count` if it implements one, otherwise `find_all(..).len()`.
    pub fn count(&self, collection: &str, criteria: &Criterion) -> Result<usize> {
        if self.capabilities.count {
            self.adapter.count(collection, criteria)
        } else {
            Ok(self.find_all(collection, criteria)?.len())
        }
    }

    /// Update every record matching `criteria`, stamping `updated_at` per
    /// config.
    pub fn update(&self, collection: &str, criteria: &Criterion, changes: Record) -> Result<Vec<Record>> {
        self.adapter
            .update(collection, criteria, self.stamp_updated(changes))
    }

    /// Delete every record matching `criteria`.
    pub fn destroy(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
        self.adapter.destroy(collection, criteria)
    }

    // ------------------------------------------------------------------
    // Compound operations
    // ------------------------------------------------------------------

    /// Find the single record matching `criteria`, or create `new_record`
    /// if none matches, all under one named lock so concurrent callers
    /// racing on the same criteria can't both create a duplicate.
    ///
    /// Uses the adapter's native `find_or_create` if it implements one,
    /// otherwise builds it out of `find`/`create` under the lock.
    ///
    /// Returns the record alongside whether it was newly created.
    pub fn find_or_create(
        &self,
        collection: &str,
        criteria: &Criterion,
        new_record: Record,
    ) -> Result<(Record, bool)> {
        let name = format!("{collection}.waterline.default.create.findOrCreate");
        let stamped = self.stamp_new(new_record);
        self.lock_manager.transaction(&name, || -> Result<(Record, bool)> {
            if self.capabilities.find_or_create {
                return self.adapter.find_or_create(collection, criteria, stamped);
            }
            let existing = self.adapter.find(collection, criteria)?;
            match existing.len() {
                0 => {
                    let created = self.adapter.create(collection, stamped)?;
                    Ok((created, true))
                }
                1 => Ok((existing.into_iter().next().unwrap(), false)),
                count => Err(Error::TooManyRecords {
                    collection: collection.to_string(),
                    count,
                }),
            }
        })?
    }

    /// Insert every record in `records`, under one named lock.
    ///
    /// Uses the adapter's native `create_each` if it implements one,
    /// otherwise creates records sequentially.
    pub fn create_each(&self, collection: &str, records: Vec<Record>) -> Result<Vec<Record>> {
        let name = format!("{collection}.waterline.default.createEach");
        let stamped: Vec<Record> = records.into_iter().map(|r| self.stamp_new(r)).collect();
        self.lock_manager.transaction(&name, || -> Result<Vec<Record>> {
            if self.capabilities.create_each {
                self.adapter.create_each(collection, stamped)
            } else {
                stamped
                    .into_iter()
                    .map(|r| self.adapter.create(collection, r))
                    .collect()
            }
        })?
    }

    /// For each record in `candidates`, find an existing record matching
    /// on `search_keys` or create it, all under one named lock.
    ///
    /// Uses the adapter's native `find_or_create_each` if it implements
    /// one, otherwise resolves each candidate sequentially.
    pub fn find_or_create_each(
        &self,
        collection: &str,
        search_keys: &[String],
        candidates: Vec<Record>,
    ) -> Result<Vec<Record>> {
        let name = format!("{collection}.waterline.default.findOrCreateEach");
        let stamped: Vec<Record> = candidates.into_iter().map(|r| self.stamp_new(r)).collect();
        self.lock_manager.transaction(&name, || -> Result<Vec<Record>> {
            if self.capabilities.find_or_create {
                return self.adapter.find_or_create_each(collection, search_keys, stamped);
            }
            let mut results = Vec::with_capacity(stamped.len());
            for candidate in stamped {
                let criteria = search_criteria(search_keys, &candidate);
                let existing = self.adapter.find(collection, &criteria)?;
                let record = match existing.len() {
                    0 => self.adapter.create(collection, candidate)?,
                    1 => existing.into_iter().next().unwrap(),
                    count => {
                        return Err(Error::TooManyRecords {
                            collection: collection.to_string(),
                            count,
                        })
                    }
                };
                results.push(record);
            }
            Ok(results)
        })?
    }

    fn stamp_new(&self, mut record: Record) -> Record {
        let now = now_millis();
        if self.config.created_at {
            record.insert("created_at".to_string(), Value::Int(now));
        }
        if self.config.updated_at {
            record.insert("updated_at".to_string(), Value::Int(now));
        }
        record
    }

    fn stamp_updated(&self, mut record: Record) -> Record {
        if self.config.updated_at {
            record.insert("updated_at".to_string(), Value::Int(now_millis()));
        }
        record
    }
}

fn search_criteria(search_keys: &[String], candidate: &Record) -> Criterion {
    let predicates: Vec<WhereClause> = search_keys
        .iter()
        .map(|key| {
            let value = candidate.get(key).cloned().unwrap_or(Value::Null);
            WhereClause::Predicate(Predicate {
                attribute: key.clone(),
                operator: Operator::Eq(value),
            })
        })
        .collect();
    let where_clause = match predicates.len() {
        0 => WhereClause::MatchAll,
        1 => predicates.into_iter().next().unwrap(),
        _ => WhereClause::And(predicates),
    };
    Criterion {
        where_clause,
        ..Criterion::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millrace_core::AttributeType;
    use millrace_memory::MemoryAdapter;

    /// Wraps a [`MemoryAdapter`] but advertises `alter: false,
    /// schema_migration: true`, so the Facade is forced onto the
    /// add-then-remove diff fallback instead of the native `alter` path.
    struct FallbackAlterAdapter(MemoryAdapter);

    impl Adapter for FallbackAlterAdapter {
        fn capabilities(&self) -> AdapterCapabilities {
            AdapterCapabilities {
                alter: false,
                schema_migration: true,
                ..self.0.capabilities()
            }
        }
        fn define(&self, collection: &str, attributes: &[Attribute]) -> Result<()> {
            self.0.define(collection, attributes)
        }
        fn describe(&self, collection: &str) -> Result<Option<Vec<Attribute>>> {
            self.0.describe(collection)
        }
        fn drop_collection(&self, collection: &str) -> Result<()> {
            self.0.drop_collection(collection)
        }
        fn add_attribute(&self, collection: &str, attribute: &Attribute) -> Result<()> {
            self.0.add_attribute(collection, attribute)
        }
        fn remove_attribute(&self, collection: &str, attribute_name: &str) -> Result<()> {
            self.0.remove_attribute(collection, attribute_name)
        }
        fn create(&self, collection: &str, record: Record) -> Result<Record> {
            self.0.create(collection, record)
        }
        fn find(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
            self.0.find(collection, criteria)
        }
        fn update(&self, collection: &str, criteria: &Criterion, changes: Record) -> Result<Vec<Record>> {
            self.0.update(collection, criteria, changes)
        }
        fn destroy(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
            self.0.destroy(collection, criteria)
        }
    }

    /// Wraps a [`MemoryAdapter`] but advertises neither `alter` nor
    /// `schema_migration`, pinning the Facade's no-op branch.
    struct NoSchemaMigrationAdapter(MemoryAdapter);

    impl Adapter for NoSchemaMigrationAdapter {
        fn capabilities(&self) -> AdapterCapabilities {
            AdapterCapabilities {
                alter: false,
                schema_migration: false,
                ..self.0.capabilities()
            }
        }
        fn define(&self, collection: &str, attributes: &[Attribute]) -> Result<()> {
            self.0.define(collection, attributes)
        }
        fn describe(&self, collection: &str) -> Result<Option<Vec<Attribute>>> {
            self.0.describe(collection)
        }
        fn drop_collection(&self, collection: &str) -> Result<()> {
            self.0.drop_collection(collection)
        }
        fn create(&self, collection: &str, record: Record) -> Result<Record> {
            self.0.create(collection, record)
        }
        fn find(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
            self.0.find(collection, criteria)
        }
        fn update(&self, collection: &str, criteria: &Criterion, changes: Record) -> Result<Vec<Record>> {
            self.0.update(collection, criteria, changes)
        }
        fn destroy(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
            self.0.destroy(collection, criteria)
        }
    }

    fn facade() -> AdapterFacade<MemoryAdapter> {
        let adapter = Arc::new(MemoryAdapter::new());
        AdapterFacade::new(adapter, FacadeConfig::default()).unwrap()
    }

    fn attrs() -> BTreeMap<String, AttributeInput> {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), AttributeInput::Shorthand(AttributeType::Text));
        map
    }

    #[test]
    fn define_augments_schema_with_timestamps_and_primary_key() {
        let facade = facade();
        facade.define("users", &attrs()).unwrap();
        let described = facade.describe("users").unwrap().unwrap();
        assert!(described.iter().any(|a| a.name == "id" && a.primary_key));
        assert!(described.iter().any(|a| a.name == "created_at"));
        assert!(described.iter().any(|a| a.name == "updated_at"));
    }

    #[test]
    fn create_stamps_timestamps() {
        let facade = facade();
        facade.define("users", &attrs()).unwrap();
        let mut record = Record::new();
        record.insert("name".into(), Value::from("ada"));
        let created = facade.create("users", record).unwrap();
        assert!(matches!(created.get("created_at"), Some(Value::Int(_))));
        assert!(matches!(created.get("updated_at"), Some(Value::Int(_))));
    }

    #[test]
    fn find_returns_none_one_or_error_by_cardinality() {
        let facade = facade();
        facade.define("users", &attrs()).unwrap();

        let none = facade.find("users", &Criterion::default()).unwrap();
        assert!(none.is_none());

        let mut r = Record::new();
        r.insert("name".into(), Value::from("ada"));
        facade.create("users", r).unwrap();
        let one = facade.find("users", &Criterion::default()).unwrap();
        assert!(one.is_some());

        let mut r2 = Record::new();
        r2.insert("name".into(), Value::from("grace"));
        facade.create("users", r2).unwrap();
        let err = facade.find("users", &Criterion::default()).unwrap_err();
        assert!(matches!(err, Error::TooManyRecords { count: 2, .. }));
    }

    #[test]
    fn alter_fallback_adds_and_removes_attributes() {
        let adapter = Arc::new(FallbackAlterAdapter(MemoryAdapter::new()));
        let facade = AdapterFacade::new(adapter, FacadeConfig::default()).unwrap();
        facade.define("users", &attrs()).unwrap();

        let mut desired = BTreeMap::new();
        desired.insert("email".to_string(), AttributeInput::Shorthand(AttributeType::Text));
        facade.alter("users", &desired).unwrap();

        let described = facade.describe("users").unwrap().unwrap();
        assert!(described.iter().any(|a| a.name == "email"));
        assert!(described.iter().all(|a| a.name != "name"));
    }

    #[test]
    fn alter_is_a_no_op_when_adapter_has_neither_capability() {
        let adapter = Arc::new(NoSchemaMigrationAdapter(MemoryAdapter::new()));
        let facade = AdapterFacade::new(adapter, FacadeConfig::default()).unwrap();
        facade.define("users", &attrs()).unwrap();

        let mut desired = BTreeMap::new();
        desired.insert("email".to_string(), AttributeInput::Shorthand(AttributeType::Text));
        facade.alter("users", &desired).unwrap();

        let described = facade.describe("users").unwrap().unwrap();
        assert!(described.iter().all(|a| a.name != "email"));
        assert!(described.iter().any(|a| a.name == "name"));
    }

    #[test]
    fn find_or_create_only_creates_once_for_concurrent_matching_criteria() {
        let facade = Arc::new(facade());
        facade.define("users", &attrs()).unwrap();

        let criteria = Criterion {
            where_clause: WhereClause::Predicate(Predicate {
                attribute: "name".into(),
                operator: Operator::Eq(Value::from("ada")),
            }),
            ..Criterion::default()
        };

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let facade = facade.clone();
                let criteria = criteria.clone();
                std::thread::spawn(move || {
                    let mut record = Record::new();
                    record.insert("name".into(), Value::from("ada"));
                    facade.find_or_create("users", &criteria, record).unwrap()
                })
            })
            .collect();

        let results: Vec<(Record, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let created_count = results.iter().filter(|(_, created)| *created).count();
        assert_eq!(created_count, 1);

        let all = facade.find_all("users", &Criterion::default()).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn create_each_inserts_every_record() {
        let facade = facade();
        facade.define("users", &attrs()).unwrap();
        let mut r1 = Record::new();
        r1.insert("name".into(), Value::from("ada"));
        let mut r2 = Record::new();
        r2.insert("name".into(), Value::from("grace"));
        let created = facade.create_each("users", vec![r1, r2]).unwrap();
        assert_eq!(created.len(), 2);
    }

    #[test]
    fn find_or_create_each_reuses_existing_and_creates_missing() {
        let facade = facade();
        facade.define("users", &attrs()).unwrap();
        let mut existing = Record::new();
        existing.insert("name".into(), Value::from("ada"));
        facade.create("users", existing).unwrap();

        let mut candidate_existing = Record::new();
        candidate_existing.insert("name".into(), Value::from("ada"));
        let mut candidate_new = Record::new();
        candidate_new.insert("name".into(), Value::from("grace"));

        let results = facade
            .find_or_create_each(
                "users",
                &["name".to_string()],
                vec![candidate_existing, candidate_new],
            )
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(facade.count("users", &Criterion::default()).unwrap(), 2);
    }
}
