//! Canonical and polymorphic criteria shapes.
//!
//! [`Criterion`] is the single internal representation every query runs on.
//! [`CriteriaInput`] is the small sum type at the public boundary that the
//! normalizer (`millrace-primitives`) accepts and collapses down to a
//! `Criterion` — the typed translation of the original "criteria can be a
//! number, a string, or an object" polymorphism.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sort direction for a single sort entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// One `attribute, direction` pair in a sort specification. Multiple
/// entries are applied in order, matching a multi-column `ORDER BY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortEntry {
    /// Attribute to sort by.
    pub attribute: String,
    /// Direction to sort in.
    pub direction: SortDirection,
}

/// A comparison operator usable in a [`Predicate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// Exact equality.
    Eq(Value),
    /// Inequality.
    Ne(Value),
    /// Less than.
    Lt(Value),
    /// Less than or equal.
    Lte(Value),
    /// Greater than.
    Gt(Value),
    /// Greater than or equal.
    Gte(Value),
    /// Value is one of the given set.
    In(Vec<Value>),
    /// Value is none of the given set.
    Nin(Vec<Value>),
    /// Text attribute contains the given substring.
    Contains(String),
    /// Text attribute starts with the given prefix.
    StartsWith(String),
    /// Text attribute ends with the given suffix.
    EndsWith(String),
}

/// A single `attribute OP value` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Attribute the comparison applies to.
    pub attribute: String,
    /// The comparison itself.
    pub operator: Operator,
}

/// A boolean tree of predicates, the canonical form of the `where` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WhereClause {
    /// Always matches every record.
    MatchAll,
    /// A single attribute comparison.
    Predicate(Predicate),
    /// All of the nested clauses must match.
    And(Vec<WhereClause>),
    /// At least one of the nested clauses must match.
    Or(Vec<WhereClause>),
    /// The nested clause must not match.
    Not(Box<WhereClause>),
}

/// The canonical, fully-normalized query criteria every Facade DQL method
/// operates on internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Filter predicate tree.
    pub where_clause: WhereClause,
    /// Maximum number of records to return. `None` means unbounded.
    pub limit: Option<i64>,
    /// Number of matching records to skip before collecting results.
    pub skip: i64,
    /// Sort order, applied left to right.
    pub sort: Vec<SortEntry>,
}

impl Default for Criterion {
    fn default() -> Self {
        Criterion {
            where_clause: WhereClause::MatchAll,
            limit: None,
            skip: 0,
            sort: Vec::new(),
        }
    }
}

/// A scalar primary-key value accepted where a bare id is permitted in
/// place of a full criteria object: a positive finite number or a numeric
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdScalar {
    /// A numeric id.
    Number(f64),
    /// A numeric id spelled as a string.
    Text(String),
}

/// Accepted shapes for a `sort`/`order` input before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortInput {
    /// `"attribute asc"` / `"attribute desc"` shorthand.
    Shorthand(String),
    /// A list of `{ attribute: direction }` single-entry maps, applied in
    /// list order.
    List(Vec<BTreeMap<String, String>>),
}

/// Accepted shapes for a `where` input before normalization: either an
/// implicit equality map (`{attr: value}`) or an explicit combinator map
/// keyed by `and`/`or`/`not`/an operator name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhereInput {
    /// `{ attribute: value, ... }`, each entry an implicit equality, ANDed
    /// together, unless the value is itself an operator map.
    Map(BTreeMap<String, serde_json::Value>),
}

/// The full, polymorphic criteria object shape (as opposed to the bare-id
/// shorthand) before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCriteria {
    /// Filter, in its raw polymorphic shape.
    #[serde(rename = "where")]
    pub where_: Option<WhereInput>,
    /// Maximum number of records.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub skip: Option<i64>,
    /// Alias for `skip`, accepted by some callers.
    pub offset: Option<i64>,
    /// `order`-keyed sort input, a synonym of `sort` at the input boundary.
    pub order: Option<SortInput>,
    /// `sort`-keyed sort input.
    pub sort: Option<SortInput>,
}

/// The polymorphic criteria input accepted at the public boundary, the
/// typed equivalent of "criteria can be omitted, a bare id, or a full
/// criteria object".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriteriaInput {
    /// No criteria given at all — matches everything.
    None,
    /// A bare primary-key scalar, shorthand for `{ where: { id: <id> } }`.
    Id(IdScalar),
    /// A fully-specified criteria object.
    Raw(RawCriteria),
}

impl Default for CriteriaInput {
    fn default() -> Self {
        CriteriaInput::None
    }
}
