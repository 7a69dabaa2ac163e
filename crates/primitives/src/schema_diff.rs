//! Computes the attribute-level diff an `alter` falls back to when the
//! adapter doesn't implement `alter` natively.

use millrace_core::Attribute;
use std::collections::BTreeMap;

/// The attributes an `alter` fallback must add and remove to get from an
/// existing schema to a desired one.
///
/// Per the add-then-remove ordering rule: `to_add` is always applied in
/// full before any of `to_remove` runs, so a rename (same semantic
/// attribute under two different representations) never leaves a window
/// where the collection has neither the old nor the new column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDiff {
    /// Attributes to add, new or changed relative to the existing schema.
    pub to_add: Vec<Attribute>,
    /// Names of attributes to remove: gone entirely, or changed (removed
    /// after being re-added with their new definition).
    pub to_remove: Vec<String>,
}

impl SchemaDiff {
    /// True if applying this diff would not change the schema at all.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the [`SchemaDiff`] to go from `existing` to `desired`.
///
/// A pure function: attributes present in `desired` but not `existing` (by
/// name) are added; attributes present in `existing` but not `desired` are
/// removed; attributes present in both but with a different definition are
/// both added (the new definition) and removed (the old one), since an
/// adapter's `add_attribute` only has one way to express "this attribute
/// now means something else" — replace it.
pub fn diff_attributes(existing: &[Attribute], desired: &[Attribute]) -> SchemaDiff {
    let existing_by_name: BTreeMap<&str, &Attribute> =
        existing.iter().map(|a| (a.name.as_str(), a)).collect();
    let desired_by_name: BTreeMap<&str, &Attribute> =
        desired.iter().map(|a| (a.name.as_str(), a)).collect();

    let mut to_add = Vec::new();
    let mut to_remove = Vec::new();

    for (name, desired_attr) in &desired_by_name {
        match existing_by_name.get(name) {
            None => to_add.push((*desired_attr).clone()),
            Some(existing_attr) => {
                if existing_attr != desired_attr {
                    to_add.push((*desired_attr).clone());
                    to_remove.push(name.to_string());
                }
            }
        }
    }

    for name in existing_by_name.keys() {
        if !desired_by_name.contains_key(name) {
            to_remove.push(name.to_string());
        }
    }

    SchemaDiff { to_add, to_remove }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millrace_core::AttributeType;

    #[test]
    fn identical_schemas_produce_empty_diff() {
        let schema = vec![Attribute::plain("name", AttributeType::Text)];
        let diff = diff_attributes(&schema, &schema);
        assert!(diff.is_empty());
    }

    #[test]
    fn new_attribute_is_added_only() {
        let existing = vec![Attribute::plain("name", AttributeType::Text)];
        let desired = vec![
            Attribute::plain("name", AttributeType::Text),
            Attribute::plain("age", AttributeType::Integer),
        ];
        let diff = diff_attributes(&existing, &desired);
        assert_eq!(diff.to_add, vec![Attribute::plain("age", AttributeType::Integer)]);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn dropped_attribute_is_removed_only() {
        let existing = vec![
            Attribute::plain("name", AttributeType::Text),
            Attribute::plain("age", AttributeType::Integer),
        ];
        let desired = vec![Attribute::plain("name", AttributeType::Text)];
        let diff = diff_attributes(&existing, &desired);
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove, vec!["age".to_string()]);
    }

    #[test]
    fn changed_attribute_is_added_and_removed() {
        let existing = vec![Attribute::plain("age", AttributeType::Integer)];
        let mut changed = Attribute::plain("age", AttributeType::Float);
        changed.required = true;
        let desired = vec![changed.clone()];
        let diff = diff_attributes(&existing, &desired);
        assert_eq!(diff.to_add, vec![changed]);
        assert_eq!(diff.to_remove, vec!["age".to_string()]);
    }
}
