//! Stable names under which the data of a marker is fetched.

use super::reference_marker::ReferenceConstraints;
use crate::{
    error::Result,
    tree_parameters::{FieldName, Filter, UniqueWhere},
};
use content_value::ContentValue;
use query_structure::{Condition, FieldWhere, UniqueWhereValue};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::Display;

const HASH_LENGTH: usize = 16;

pub fn field_placeholder(field_name: &str) -> FieldName {
    field_name.to_owned()
}

pub fn connection_placeholder(field_name: &str) -> FieldName {
    field_name.to_owned()
}

/// `field_name` itself for an unconstrained reference, `<field_name>_<hash>` otherwise.
pub fn reference_placeholder(field_name: &str, constraints: &ReferenceConstraints) -> Result<String> {
    if constraints.filter.is_none() && constraints.reduced_by.is_none() {
        return Ok(field_name.to_owned());
    }

    Ok(format!("{field_name}_{}", hash_reference_constraints(constraints)?))
}

pub fn marker_tree_placeholder(identifier: impl Display) -> String {
    format!("root_{identifier}")
}

/// SHA-256 over the key-sorted, type-tagged JSON of the filter and the reduction, hex encoded
/// and truncated.
pub fn hash_reference_constraints(constraints: &ReferenceConstraints) -> Result<String> {
    let mut hashed = Map::new();
    hashed.insert(
        "filter".to_owned(),
        constraints.filter.as_ref().map_or(Value::Null, tagged_filter),
    );
    hashed.insert(
        "reducedBy".to_owned(),
        constraints.reduced_by.as_ref().map_or(Value::Null, tagged_unique_where),
    );

    let canonical = serde_json::to_vec(&canonicalize(Value::Object(hashed)))?;
    let mut digest = hex::encode(Sha256::digest(&canonical));
    digest.truncate(HASH_LENGTH);

    Ok(digest)
}

fn tagged_filter(filter: &Filter) -> Value {
    let mut object = Map::new();

    if !filter.and.is_empty() {
        object.insert("and".to_owned(), filter.and.iter().map(tagged_filter).collect());
    }

    if !filter.or.is_empty() {
        object.insert("or".to_owned(), filter.or.iter().map(tagged_filter).collect());
    }

    if let Some(not) = &filter.not {
        object.insert("not".to_owned(), tagged_filter(not));
    }

    for (name, field_where) in &filter.fields {
        let tagged = match field_where {
            FieldWhere::Condition(condition) => tagged_condition(condition),
            FieldWhere::Relation(nested) => tagged_filter(nested),
        };

        object.insert(name.clone(), tagged);
    }

    Value::Object(object)
}

fn tagged_condition(condition: &Condition) -> Value {
    let operand = match condition {
        Condition::And(conditions) | Condition::Or(conditions) => conditions.iter().map(tagged_condition).collect(),
        Condition::Not(condition) => tagged_condition(condition),
        Condition::Equals(value)
        | Condition::NotEquals(value)
        | Condition::LessThan(value)
        | Condition::LessThanOrEquals(value)
        | Condition::GreaterThan(value)
        | Condition::GreaterThanOrEquals(value) => value.to_tagged_json(),
        Condition::In(values) | Condition::NotIn(values) => values.iter().map(ContentValue::to_tagged_json).collect(),
        Condition::IsNull(flag) | Condition::Null(flag) => Value::Bool(*flag),
        Condition::Never | Condition::Always => Value::Bool(true),
    };

    let mut object = Map::new();
    object.insert(condition.operator().to_owned(), operand);

    Value::Object(object)
}

fn tagged_unique_where(unique_where: &UniqueWhere) -> Value {
    unique_where
        .iter()
        .map(|(field, value)| {
            let tagged = match value {
                UniqueWhereValue::Value(value) => value.to_tagged_json(),
                UniqueWhereValue::Relation(nested) => tagged_unique_where(nested),
            };

            (field.clone(), tagged)
        })
        .collect::<Map<_, _>>()
        .into()
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<_> = object.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_parameters::ExpectedEntityCount;
    use serde_json::json;

    #[test]
    fn canonical_form_ignores_key_order() {
        let a = canonicalize(json!({ "b": 1, "a": { "d": 2, "c": 3 } }));
        let b = canonicalize(json!({ "a": { "c": 3, "d": 2 }, "b": 1 }));

        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn unconstrained_references_keep_the_field_name() {
        let constraints = ReferenceConstraints {
            expected_count: ExpectedEntityCount::PossiblyMany,
            filter: None,
            reduced_by: None,
        };

        assert_eq!(reference_placeholder("authors", &constraints).unwrap(), "authors");
        assert_eq!(marker_tree_placeholder(7), "root_7");
    }
}
