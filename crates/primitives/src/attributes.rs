//! Expands the polymorphic attribute-input shorthand into fully-specified
//! [`Attribute`]s, and adds the implicit primary key / timestamp
//! attributes an `AdapterFacade` stamps on every record.

use millrace_core::{Attribute, AttributeType, FacadeConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry's value in the polymorphic attribute-definitions map passed to
/// `define`: either the bare-type shorthand (`"name": "string"`) or a full
/// descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeInput {
    /// `"name": "string"` shorthand — a plain, non-unique, non-required
    /// attribute of the given type.
    Shorthand(AttributeType),
    /// A fully-specified descriptor.
    Full {
        /// Semantic type of the attribute.
        #[serde(rename = "type")]
        attr_type: AttributeType,
        /// Whether values must be unique.
        #[serde(default)]
        unique: bool,
        /// Whether the attribute is required.
        #[serde(default)]
        required: bool,
        /// Whether this attribute is (part of) the primary key.
        #[serde(rename = "primaryKey", default)]
        primary_key: bool,
    },
}

const DEFAULT_PRIMARY_KEY: &str = "id";

/// Expand a polymorphic attribute-definitions map into the list of
/// [`Attribute`]s a collection's schema is made of.
///
/// If no attribute in `inputs` is marked `primary_key` and none is named
/// `"id"`, an auto-incrementing integer `id` primary key is prepended —
/// the typed equivalent of an ORM auto-assigning a primary key when the
/// caller doesn't define one. If `config.created_at`/`config.updated_at`
/// are set, the corresponding timestamp attributes are appended.
pub fn augment(inputs: &BTreeMap<String, AttributeInput>, config: &FacadeConfig) -> Vec<Attribute> {
    let mut attributes: Vec<Attribute> = Vec::with_capacity(inputs.len() + 3);

    let has_primary_key = inputs.values().any(|input| match input {
        AttributeInput::Shorthand(_) => false,
        AttributeInput::Full { primary_key, .. } => *primary_key,
    }) || inputs.contains_key(DEFAULT_PRIMARY_KEY);

    if !has_primary_key {
        let mut pk = Attribute::plain(DEFAULT_PRIMARY_KEY, AttributeType::Integer);
        pk.unique = true;
        pk.primary_key = true;
        attributes.push(pk);
    }

    for (name, input) in inputs {
        attributes.push(expand_one(name, input));
    }

    if config.created_at {
        attributes.push(Attribute::plain("created_at", AttributeType::Integer));
    }
    if config.updated_at {
        attributes.push(Attribute::plain("updated_at", AttributeType::Integer));
    }

    attributes
}

fn expand_one(name: &str, input: &AttributeInput) -> Attribute {
    match input {
        AttributeInput::Shorthand(attr_type) => Attribute::plain(name, *attr_type),
        AttributeInput::Full {
            attr_type,
            unique,
            required,
            primary_key,
        } => Attribute {
            name: name.to_string(),
            attr_type: *attr_type,
            unique: *unique,
            required: *required,
            primary_key: *primary_key,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, AttributeInput)]) -> BTreeMap<String, AttributeInput> {
        pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn shorthand_expands_to_plain_attribute() {
        let map = inputs(&[("name", AttributeInput::Shorthand(AttributeType::Text))]);
        let config = FacadeConfig {
            created_at: false,
            updated_at: false,
            ..FacadeConfig::default()
        };
        let attrs = augment(&map, &config);
        let name_attr = attrs.iter().find(|a| a.name == "name").unwrap();
        assert_eq!(name_attr.attr_type, AttributeType::Text);
        assert!(!name_attr.unique);
        assert!(!name_attr.required);
    }

    #[test]
    fn auto_primary_key_added_when_absent() {
        let map = inputs(&[("name", AttributeInput::Shorthand(AttributeType::Text))]);
        let config = FacadeConfig {
            created_at: false,
            updated_at: false,
            ..FacadeConfig::default()
        };
        let attrs = augment(&map, &config);
        let pk = attrs.iter().find(|a| a.name == "id").unwrap();
        assert!(pk.primary_key);
        assert!(pk.unique);
    }

    #[test]
    fn explicit_primary_key_is_not_duplicated() {
        let map = inputs(&[(
            "uuid",
            AttributeInput::Full {
                attr_type: AttributeType::Text,
                unique: true,
                required: true,
                primary_key: true,
            },
        )]);
        let config = FacadeConfig {
            created_at: false,
            updated_at: false,
            ..FacadeConfig::default()
        };
        let attrs = augment(&map, &config);
        assert!(attrs.iter().filter(|a| a.primary_key).count() == 1);
        assert!(attrs.iter().all(|a| a.name != "id"));
    }

    #[test]
    fn timestamp_attributes_added_per_config() {
        let map = inputs(&[]);
        let config = FacadeConfig::default();
        let attrs = augment(&map, &config);
        assert!(attrs.iter().any(|a| a.name == "created_at"));
        assert!(attrs.iter().any(|a| a.name == "updated_at"));
    }
}
