//! A reference, zero-configuration in-memory [`Adapter`] implementation.
//!
//! Used by the other crates' test suites and doctests, and as a template
//! for anyone bringing up a new adapter: every optional capability is
//! implemented here except `find_or_create`/`find_or_create_each`, which
//! are left to the Facade's lock-manager-backed fallback so that code path
//! gets exercised end to end in tests.

use millrace_core::{
    Adapter, AdapterCapabilities, Attribute, Criterion, Error, Operator, Record, Result, Value,
    WhereClause,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;

struct Collection {
    attributes: Vec<Attribute>,
    rows: BTreeMap<u64, Record>,
    next_id: u64,
}

impl Collection {
    fn new(attributes: Vec<Attribute>) -> Self {
        Collection {
            attributes,
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// An in-memory [`Adapter`], backed by a single mutex-guarded map of
/// collections. Not persistent; intended for tests and documentation
/// examples, not production use.
pub struct MemoryAdapter {
    collections: Mutex<BTreeMap<String, Collection>>,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        MemoryAdapter {
            collections: Mutex::new(BTreeMap::new()),
        }
    }
}

impl MemoryAdapter {
    /// Construct an empty adapter.
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(record: &Record, clause: &WhereClause) -> bool {
    match clause {
        WhereClause::MatchAll => true,
        WhereClause::Predicate(p) => {
            let actual = record.get(&p.attribute).unwrap_or(&Value::Null);
            match &p.operator {
                Operator::Eq(v) => actual == v,
                Operator::Ne(v) => actual != v,
                Operator::Lt(v) => compare(actual, v) == Some(std::cmp::Ordering::Less),
                Operator::Lte(v) => {
                    matches!(
                        compare(actual, v),
                        Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
                    )
                }
                Operator::Gt(v) => compare(actual, v) == Some(std::cmp::Ordering::Greater),
                Operator::Gte(v) => {
                    matches!(
                        compare(actual, v),
                        Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
                    )
                }
                Operator::In(vs) => vs.contains(actual),
                Operator::Nin(vs) => !vs.contains(actual),
                Operator::Contains(s) => text_of(actual).map_or(false, |t| t.contains(s.as_str())),
                Operator::StartsWith(s) => {
                    text_of(actual).map_or(false, |t| t.starts_with(s.as_str()))
                }
                Operator::EndsWith(s) => {
                    text_of(actual).map_or(false, |t| t.ends_with(s.as_str()))
                }
            }
        }
        WhereClause::And(clauses) => clauses.iter().all(|c| matches(record, c)),
        WhereClause::Or(clauses) => clauses.iter().any(|c| matches(record, c)),
        WhereClause::Not(inner) => !matches(record, inner),
    }
}

fn text_of(v: &Value) -> Option<&str> {
    match v {
        Value::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Text(x), Value::Text(y)) => x.partial_cmp(y),
        _ => None,
    }
}

fn apply_criteria(mut rows: Vec<Record>, criteria: &Criterion) -> Vec<Record> {
    rows.retain(|r| matches(r, &criteria.where_clause));
    for entry in criteria.sort.iter().rev() {
        rows.sort_by(|a, b| {
            let av = a.get(&entry.attribute).unwrap_or(&Value::Null);
            let bv = b.get(&entry.attribute).unwrap_or(&Value::Null);
            let ord = compare(av, bv).unwrap_or(std::cmp::Ordering::Equal);
            match entry.direction {
                millrace_core::SortDirection::Asc => ord,
                millrace_core::SortDirection::Desc => ord.reverse(),
            }
        });
    }
    let skip = criteria.skip.max(0) as usize;
    let rows: Vec<Record> = rows.into_iter().skip(skip).collect();
    match criteria.limit {
        Some(limit) if limit >= 0 => rows.into_iter().take(limit as usize).collect(),
        _ => rows,
    }
}

impl Adapter for MemoryAdapter {
    fn identity(&self) -> &str {
        "memory"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities {
            alter: true,
            schema_migration: true,
            create_each: true,
            find_or_create: false,
            count: true,
            join: false,
        }
    }

    fn define(&self, collection: &str, attributes: &[Attribute]) -> Result<()> {
        let mut collections = self.collections.lock();
        if collections.contains_key(collection) {
            return Err(Error::CollectionAlreadyExists(collection.to_string()));
        }
        collections.insert(collection.to_string(), Collection::new(attributes.to_vec()));
        Ok(())
    }

    fn describe(&self, collection: &str) -> Result<Option<Vec<Attribute>>> {
        let collections = self.collections.lock();
        Ok(collections.get(collection).map(|c| c.attributes.clone()))
    }

    fn drop_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.lock();
        collections.remove(collection);
        Ok(())
    }

    fn alter(&self, collection: &str, attributes: &[Attribute]) -> Result<()> {
        let mut collections = self.collections.lock();
        let existing = collections
            .get_mut(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        existing.attributes = attributes.to_vec();
        Ok(())
    }

    fn add_attribute(&self, collection: &str, attribute: &Attribute) -> Result<()> {
        let mut collections = self.collections.lock();
        let existing = collections
            .get_mut(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        existing.attributes.push(attribute.clone());
        Ok(())
    }

    fn remove_attribute(&self, collection: &str, attribute_name: &str) -> Result<()> {
        let mut collections = self.collections.lock();
        let existing = collections
            .get_mut(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        existing.attributes.retain(|a| a.name != attribute_name);
        Ok(())
    }

    fn create(&self, collection: &str, mut record: Record) -> Result<Record> {
        let mut collections = self.collections.lock();
        let existing = collections
            .get_mut(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        let id = existing.next_id;
        existing.next_id += 1;
        record.insert("id".to_string(), Value::Int(id as i64));
        existing.rows.insert(id, record.clone());
        Ok(record)
    }

    fn create_each(&self, collection: &str, records: Vec<Record>) -> Result<Vec<Record>> {
        records
            .into_iter()
            .map(|r| self.create(collection, r))
            .collect()
    }

    fn find(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
        let collections = self.collections.lock();
        let existing = collections
            .get(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        let rows: Vec<Record> = existing.rows.values().cloned().collect();
        Ok(apply_criteria(rows, criteria))
    }

    fn update(&self, collection: &str, criteria: &Criterion, changes: Record) -> Result<Vec<Record>> {
        let mut collections = self.collections.lock();
        let existing = collections
            .get_mut(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        let matching_ids: Vec<u64> = existing
            .rows
            .iter()
            .filter(|(_, r)| matches(r, &criteria.where_clause))
            .map(|(id, _)| *id)
            .collect();
        let mut updated = Vec::new();
        for id in matching_ids {
            if let Some(row) = existing.rows.get_mut(&id) {
                for (k, v) in changes.iter() {
                    row.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    fn destroy(&self, collection: &str, criteria: &Criterion) -> Result<Vec<Record>> {
        let mut collections = self.collections.lock();
        let existing = collections
            .get_mut(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        let matching_ids: Vec<u64> = existing
            .rows
            .iter()
            .filter(|(_, r)| matches(r, &criteria.where_clause))
            .map(|(id, _)| *id)
            .collect();
        let mut removed = Vec::new();
        for id in matching_ids {
            if let Some(row) = existing.rows.remove(&id) {
                removed.push(row);
            }
        }
        Ok(removed)
    }

    fn count(&self, collection: &str, criteria: &Criterion) -> Result<usize> {
        Ok(self.find(collection, criteria)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millrace_core::AttributeType;

    fn attrs() -> Vec<Attribute> {
        vec![
            Attribute::plain("id", AttributeType::Integer),
            Attribute::plain("name", AttributeType::Text),
        ]
    }

    #[test]
    fn define_then_describe_round_trips_schema() {
        let adapter = MemoryAdapter::new();
        adapter.define("users", &attrs()).unwrap();
        let described = adapter.describe("users").unwrap().unwrap();
        assert_eq!(described, attrs());
    }

    #[test]
    fn define_twice_errors() {
        let adapter = MemoryAdapter::new();
        adapter.define("users", &attrs()).unwrap();
        assert!(matches!(
            adapter.define("users", &attrs()),
            Err(Error::CollectionAlreadyExists(_))
        ));
    }

    #[test]
    fn create_assigns_monotonic_ids() {
        let adapter = MemoryAdapter::new();
        adapter.define("users", &attrs()).unwrap();
        let mut r1 = Record::new();
        r1.insert("name".into(), Value::from("ada"));
        let created1 = adapter.create("users", r1).unwrap();
        let mut r2 = Record::new();
        r2.insert("name".into(), Value::from("grace"));
        let created2 = adapter.create("users", r2).unwrap();
        assert_eq!(created1.get("id"), Some(&Value::Int(1)));
        assert_eq!(created2.get("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn find_filters_by_equality() {
        let adapter = MemoryAdapter::new();
        adapter.define("users", &attrs()).unwrap();
        let mut r1 = Record::new();
        r1.insert("name".into(), Value::from("ada"));
        adapter.create("users", r1).unwrap();
        let mut r2 = Record::new();
        r2.insert("name".into(), Value::from("grace"));
        adapter.create("users", r2).unwrap();

        let criteria = Criterion {
            where_clause: WhereClause::Predicate(millrace_core::Predicate {
                attribute: "name".into(),
                operator: Operator::Eq(Value::from("grace")),
            }),
            ..Criterion::default()
        };
        let found = adapter.find("users", &criteria).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("name"), Some(&Value::from("grace")));
    }

    #[test]
    fn destroy_removes_matching_records_only() {
        let adapter = MemoryAdapter::new();
        adapter.define("users", &attrs()).unwrap();
        let mut r1 = Record::new();
        r1.insert("name".into(), Value::from("ada"));
        adapter.create("users", r1).unwrap();
        let mut r2 = Record::new();
        r2.insert("name".into(), Value::from("grace"));
        adapter.create("users", r2).unwrap();

        let criteria = Criterion {
            where_clause: WhereClause::Predicate(millrace_core::Predicate {
                attribute: "name".into(),
                operator: Operator::Eq(Value::from("ada")),
            }),
            ..Criterion::default()
        };
        let destroyed = adapter.destroy("users", &criteria).unwrap();
        assert_eq!(destroyed.len(), 1);
        assert_eq!(adapter.find("users", &Criterion::default()).unwrap().len(), 1);
    }

    #[test]
    fn operations_on_undefined_collection_error() {
        let adapter = MemoryAdapter::new();
        assert!(matches!(
            adapter.find("ghost", &Criterion::default()),
            Err(Error::CollectionNotFound(_))
        ));
    }
}
