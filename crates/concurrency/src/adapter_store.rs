//! Implements [`LockStore`] directly against an [`Adapter`]'s own CRUD, in
//! a reserved collection — bypassing the Facade entirely, since the lock
//! manager only ever needs insert/scan/delete against one collection, never
//! schema management or the rest of the Facade surface.

use millrace_core::{
    Adapter, Attribute, AttributeType, Criterion, Error, LockEntry, LockStore, Operator,
    Predicate, Record, Result, SortDirection, SortEntry, Value, WhereClause,
};
use std::sync::Arc;
use uuid::Uuid;

/// Name of the collection lock rows are stored in. Prefixed with an
/// underscore so it can't collide with a caller-defined collection name,
/// matching the "reserved transaction collection" of the spec this
/// implements.
pub const RESERVED_COLLECTION: &str = "_millrace_locks";

const NAME_ATTR: &str = "name";
const UUID_ATTR: &str = "lock_uuid";

/// A [`LockStore`] backed by rows in [`RESERVED_COLLECTION`] of the wrapped
/// adapter.
pub struct AdapterLockStore<A: Adapter> {
    adapter: Arc<A>,
}

impl<A: Adapter> AdapterLockStore<A> {
    /// Wrap `adapter`, defining the reserved lock collection if it isn't
    /// already registered.
    pub fn new(adapter: Arc<A>) -> Result<Self> {
        if adapter.describe(RESERVED_COLLECTION)?.is_none() {
            let attributes = vec![
                Attribute::plain(NAME_ATTR, AttributeType::Text),
                Attribute::plain(UUID_ATTR, AttributeType::Text),
            ];
            adapter.define(RESERVED_COLLECTION, &attributes)?;
        }
        Ok(AdapterLockStore { adapter })
    }
}

fn record_id(record: &Record) -> Result<u64> {
    match record.get("id") {
        Some(Value::Int(i)) if *i >= 0 => Ok(*i as u64),
        other => Err(Error::lock_store(format!(
            "adapter did not assign a numeric id to lock row: {other:?}"
        ))),
    }
}

impl<A: Adapter> LockStore for AdapterLockStore<A> {
    fn enqueue(&self, name: &str, uuid: Uuid) -> Result<LockEntry> {
        let mut record = Record::new();
        record.insert(NAME_ATTR.to_string(), Value::Text(name.to_string()));
        record.insert(UUID_ATTR.to_string(), Value::Text(uuid.to_string()));
        let created = self
            .adapter
            .create(RESERVED_COLLECTION, record)
            .map_err(|e| Error::lock_store(e))?;
        Ok(LockEntry {
            uuid,
            name: name.to_string(),
            id: record_id(&created)?,
        })
    }

    fn queue(&self, name: &str) -> Result<Vec<LockEntry>> {
        let criteria = Criterion {
            where_clause: WhereClause::Predicate(Predicate {
                attribute: NAME_ATTR.to_string(),
                operator: Operator::Eq(Value::Text(name.to_string())),
            }),
            sort: vec![SortEntry {
                attribute: "id".to_string(),
                direction: SortDirection::Asc,
            }],
            ..Criterion::default()
        };
        let records = self
            .adapter
            .find(RESERVED_COLLECTION, &criteria)
            .map_err(|e| Error::lock_store(e))?;
        records
            .into_iter()
            .map(|record| {
                let uuid_str = match record.get(UUID_ATTR) {
                    Some(Value::Text(s)) => s.clone(),
                    other => {
                        return Err(Error::lock_store(format!(
                            "lock row missing uuid: {other:?}"
                        )))
                    }
                };
                let uuid = Uuid::parse_str(&uuid_str)
                    .map_err(|e| Error::lock_store(format!("malformed lock uuid: {e}")))?;
                Ok(LockEntry {
                    uuid,
                    name: name.to_string(),
                    id: record_id(&record)?,
                })
            })
            .collect()
    }

    fn release(&self, uuid: Uuid) -> Result<()> {
        let criteria = Criterion {
            where_clause: WhereClause::Predicate(Predicate {
                attribute: UUID_ATTR.to_string(),
                operator: Operator::Eq(Value::Text(uuid.to_string())),
            }),
            ..Criterion::default()
        };
        self.adapter
            .destroy(RESERVED_COLLECTION, &criteria)
            .map_err(|e| Error::lock_store(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millrace_memory::MemoryAdapter;

    #[test]
    fn enqueue_assigns_ids_in_creation_order() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = AdapterLockStore::new(adapter).unwrap();
        let first = store.enqueue("inventory", Uuid::new_v4()).unwrap();
        let second = store.enqueue("inventory", Uuid::new_v4()).unwrap();
        assert!(first.id < second.id);
    }

    #[test]
    fn queue_returns_only_matching_name_in_id_order() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = AdapterLockStore::new(adapter).unwrap();
        store.enqueue("inventory", Uuid::new_v4()).unwrap();
        store.enqueue("shipping", Uuid::new_v4()).unwrap();
        let third = store.enqueue("inventory", Uuid::new_v4()).unwrap();

        let queue = store.queue("inventory").unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[1].uuid, third.uuid);
    }

    #[test]
    fn release_removes_only_the_named_entry() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = AdapterLockStore::new(adapter).unwrap();
        let first = store.enqueue("inventory", Uuid::new_v4()).unwrap();
        store.enqueue("inventory", Uuid::new_v4()).unwrap();

        store.release(first.uuid).unwrap();
        let queue = store.queue("inventory").unwrap();
        assert_eq!(queue.len(), 1);
        assert_ne!(queue[0].uuid, first.uuid);
    }
}
