//! Normalizes the polymorphic [`CriteriaInput`] boundary shape down to the
//! canonical [`Criterion`] every Facade DQL method runs on.

use millrace_core::{
    CriteriaInput, Criterion, Error, IdScalar, Operator, Predicate, RawCriteria, Result,
    SortDirection, SortEntry, SortInput, Value, WhereClause, WhereInput,
};
use std::collections::BTreeMap;

const OPERATOR_KEYS: &[&str] = &[
    "eq",
    "ne",
    "lt",
    "lte",
    "gt",
    "gte",
    "in",
    "nin",
    "contains",
    "startsWith",
    "endsWith",
];

/// Primary key attribute name assumed when a bare id scalar is given in
/// place of a full criteria object.
const PRIMARY_KEY: &str = "id";

/// Normalize a polymorphic criteria input into the canonical [`Criterion`].
///
/// This is a pure function: same input always produces the same output,
/// and running it twice on its own output (after round-tripping through
/// [`RawCriteria`]) is a no-op — the idempotence property exercised in this
/// module's proptest suite.
pub fn normalize(input: CriteriaInput) -> Result<Criterion> {
    match input {
        CriteriaInput::None => Ok(Criterion::default()),
        CriteriaInput::Id(scalar) => Ok(Criterion {
            where_clause: WhereClause::Predicate(Predicate {
                attribute: PRIMARY_KEY.to_string(),
                operator: Operator::Eq(id_scalar_to_value(scalar)),
            }),
            ..Criterion::default()
        }),
        CriteriaInput::Raw(raw) => normalize_raw(raw),
    }
}

fn id_scalar_to_value(scalar: IdScalar) -> Value {
    match scalar {
        IdScalar::Number(n) => Value::Int(n as i64),
        IdScalar::Text(s) => s
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Text(s)),
    }
}

fn normalize_raw(raw: RawCriteria) -> Result<Criterion> {
    let where_clause = match raw.where_ {
        Some(WhereInput::Map(map)) => parse_where_map(&map)?,
        None => WhereClause::MatchAll,
    };

    // `order` and `sort` are accepted as synonyms for the same canonical
    // field; `sort` wins if both are somehow present.
    let sort_input = raw.sort.or(raw.order);
    let sort = match sort_input {
        Some(input) => parse_sort(input)?,
        None => Vec::new(),
    };

    let skip = raw.skip.or(raw.offset).unwrap_or(0);

    Ok(Criterion {
        where_clause,
        limit: raw.limit,
        skip,
        sort,
    })
}

fn parse_where_map(map: &BTreeMap<String, serde_json::Value>) -> Result<WhereClause> {
    let mut clauses = Vec::new();
    for (key, value) in map {
        match key.as_str() {
            "and" => {
                let items = value.as_array().ok_or_else(|| {
                    Error::InvalidCriteria("`and` must be an array of where clauses".into())
                })?;
                let mut nested = Vec::new();
                for item in items {
                    let m = json_object_to_map(item)?;
                    nested.push(parse_where_map(&m)?);
                }
                clauses.push(WhereClause::And(nested));
            }
            "or" => {
                let items = value.as_array().ok_or_else(|| {
                    Error::InvalidCriteria("`or` must be an array of where clauses".into())
                })?;
                let mut nested = Vec::new();
                for item in items {
                    let m = json_object_to_map(item)?;
                    nested.push(parse_where_map(&m)?);
                }
                clauses.push(WhereClause::Or(nested));
            }
            "not" => {
                let m = json_object_to_map(value)?;
                clauses.push(WhereClause::Not(Box::new(parse_where_map(&m)?)));
            }
            attribute => {
                clauses.push(parse_attribute_clause(attribute, value)?);
            }
        }
    }
    Ok(match clauses.len() {
        0 => WhereClause::MatchAll,
        1 => clauses.into_iter().next().unwrap(),
        _ => WhereClause::And(clauses),
    })
}

fn json_object_to_map(
    value: &serde_json::Value,
) -> Result<BTreeMap<String, serde_json::Value>> {
    value
        .as_object()
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .ok_or_else(|| Error::InvalidCriteria("expected a where-clause object".into()))
}

fn parse_attribute_clause(attribute: &str, value: &serde_json::Value) -> Result<WhereClause> {
    if let serde_json::Value::Object(obj) = value {
        if obj.len() == 1 {
            let (op_key, op_value) = obj.iter().next().unwrap();
            if OPERATOR_KEYS.contains(&op_key.as_str()) {
                let operator = build_operator(op_key, op_value)?;
                return Ok(WhereClause::Predicate(Predicate {
                    attribute: attribute.to_string(),
                    operator,
                }));
            }
        }
    }
    // Not a recognized single-key operator object: treat the whole JSON
    // value as an exact-equality match (covers plain scalars and, for a
    // Json attribute, an object with more than one key or an unrecognized
    // single key).
    Ok(WhereClause::Predicate(Predicate {
        attribute: attribute.to_string(),
        operator: Operator::Eq(json_to_value(value)?),
    }))
}

fn build_operator(op_key: &str, op_value: &serde_json::Value) -> Result<Operator> {
    Ok(match op_key {
        "eq" => Operator::Eq(json_to_value(op_value)?),
        "ne" => Operator::Ne(json_to_value(op_value)?),
        "lt" => Operator::Lt(json_to_value(op_value)?),
        "lte" => Operator::Lte(json_to_value(op_value)?),
        "gt" => Operator::Gt(json_to_value(op_value)?),
        "gte" => Operator::Gte(json_to_value(op_value)?),
        "in" => Operator::In(json_array_to_values(op_value)?),
        "nin" => Operator::Nin(json_array_to_values(op_value)?),
        "contains" => Operator::Contains(json_to_string(op_value)?),
        "startsWith" => Operator::StartsWith(json_to_string(op_value)?),
        "endsWith" => Operator::EndsWith(json_to_string(op_value)?),
        other => {
            return Err(Error::InvalidCriteria(format!(
                "unrecognized operator `{other}`"
            )))
        }
    })
}

fn json_array_to_values(value: &serde_json::Value) -> Result<Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::InvalidCriteria("expected an array".into()))?
        .iter()
        .map(json_to_value)
        .collect()
}

fn json_to_string(value: &serde_json::Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidCriteria("expected a string".into()))
}

fn json_to_value(value: &serde_json::Value) -> Result<Value> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                return Err(Error::InvalidCriteria("unsupported numeric value".into()));
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(arr) => {
            Value::Array(arr.iter().map(json_to_value).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(obj) => {
            let mut map = std::collections::BTreeMap::new();
            for (k, v) in obj {
                map.insert(k.clone(), json_to_value(v)?);
            }
            Value::Map(map)
        }
    })
}

fn parse_sort(input: SortInput) -> Result<Vec<SortEntry>> {
    match input {
        SortInput::Shorthand(s) => {
            let mut parts = s.split_whitespace();
            let attribute = parts
                .next()
                .ok_or_else(|| Error::InvalidCriteria("empty sort string".into()))?
                .to_string();
            let direction = match parts.next() {
                None | Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                Some(other) => {
                    return Err(Error::InvalidCriteria(format!(
                        "unrecognized sort direction `{other}`"
                    )))
                }
            };
            if parts.next().is_some() {
                return Err(Error::InvalidCriteria(format!(
                    "malformed sort string `{s}`"
                )));
            }
            Ok(vec![SortEntry {
                attribute,
                direction,
            }])
        }
        SortInput::List(entries) => entries
            .into_iter()
            .map(|entry| {
                if entry.len() != 1 {
                    return Err(Error::InvalidCriteria(
                        "each sort list entry must have exactly one attribute".into(),
                    ));
                }
                let (attribute, direction) = entry.into_iter().next().unwrap();
                let direction = match direction.as_str() {
                    "asc" => SortDirection::Asc,
                    "desc" => SortDirection::Desc,
                    other => {
                        return Err(Error::InvalidCriteria(format!(
                            "unrecognized sort direction `{other}`"
                        )))
                    }
                };
                Ok(SortEntry {
                    attribute,
                    direction,
                })
            })
            .collect(),
    }
}
