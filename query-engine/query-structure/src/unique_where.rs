use crate::{Condition, Entity, Field, InputError, Schema, Where};
use content_value::ContentValue;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Addresses at most one row: field path segments mapped to literal values, e.g.
/// `{ author: { id: 1 }, slug: 'intro' }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueWhere(BTreeMap<String, UniqueWhereValue>);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniqueWhereValue {
    Value(ContentValue),
    Relation(UniqueWhere),
}

impl UniqueWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field convenience, typically `UniqueWhere::by("id", primary)`.
    pub fn by(field: impl Into<String>, value: impl Into<ContentValue>) -> Self {
        Self::new().with(field, value)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<ContentValue>) -> Self {
        self.0.insert(field.into(), UniqueWhereValue::Value(value.into()));
        self
    }

    pub fn with_relation(mut self, field: impl Into<String>, nested: UniqueWhere) -> Self {
        self.0.insert(field.into(), UniqueWhereValue::Relation(nested));
        self
    }

    /// Assigns `value` at a dotted `path`, creating intermediate relation nodes.
    ///
    /// Assigning an already present leaf, or descending into a segment that holds a scalar, is an
    /// error.
    pub fn assign(&mut self, path: &[String], value: ContentValue) -> Result<(), InputError> {
        let Some((leaf, relations)) = path.split_last() else {
            return Ok(());
        };

        let mut node = self;

        for (depth, relation) in relations.iter().enumerate() {
            let entry = node
                .0
                .entry(relation.clone())
                .or_insert_with(|| UniqueWhereValue::Relation(UniqueWhere::new()));

            node = match entry {
                UniqueWhereValue::Relation(nested) => nested,
                UniqueWhereValue::Value(_) => {
                    return Err(InputError::ScalarRelationConflict(path[..=depth].join(".")));
                }
            };
        }

        if node.0.contains_key(leaf) {
            return Err(InputError::DuplicateUniqueField(path.join(".")));
        }

        node.0.insert(leaf.clone(), UniqueWhereValue::Value(value));

        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&UniqueWhereValue> {
        self.0.get(field)
    }

    pub fn value(&self, field: &str) -> Option<&ContentValue> {
        match self.0.get(field) {
            Some(UniqueWhereValue::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UniqueWhereValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Equality filter matching the addressed row.
    pub fn to_where(&self) -> Where {
        let operands = self
            .0
            .iter()
            .map(|(field, value)| match value {
                UniqueWhereValue::Value(value) => Where::field(field.clone(), Condition::Equals(value.clone())),
                UniqueWhereValue::Relation(nested) => Where::relation(field.clone(), nested.to_where()),
            })
            .collect::<Vec<_>>();

        let mut combined = Where::default();

        for operand in operands {
            combined.fields.extend(operand.fields);
        }

        combined
    }

    pub fn from_json(schema: &Schema, entity: &Entity, value: &serde_json::Value) -> Result<UniqueWhere, InputError> {
        let object = value
            .as_object()
            .ok_or_else(|| InputError::malformed(&entity.name, "expected a unique where object"))?;

        let mut result = UniqueWhere::new();

        for (field_name, argument) in object {
            let value = match entity.field(field_name)? {
                Field::Column(_) => UniqueWhereValue::Value(ContentValue::try_from(argument.clone())?),
                Field::Relation(relation) => {
                    let target = schema.target_entity(relation)?;
                    UniqueWhereValue::Relation(UniqueWhere::from_json(schema, target, argument)?)
                }
            };

            result.0.insert(field_name.clone(), value);
        }

        Ok(result)
    }
}

impl Serialize for UniqueWhere {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (field, value) in &self.0 {
            match value {
                UniqueWhereValue::Value(value) => map.serialize_entry(field, value)?,
                UniqueWhereValue::Relation(nested) => map.serialize_entry(field, nested)?,
            }
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_owned).collect()
    }

    #[test]
    fn assignments_build_nested_objects() {
        let mut unique = UniqueWhere::new();
        unique.assign(&path("author.slug"), "john".into()).unwrap();
        unique.assign(&path("author.locale"), ContentValue::literal("en")).unwrap();
        unique.assign(&path("id"), ContentValue::Int(1)).unwrap();

        assert_eq!(
            serde_json::to_value(&unique).unwrap(),
            json!({ "author": { "locale": "en", "slug": "john" }, "id": 1 })
        );
    }

    #[test]
    fn duplicate_leaf_is_rejected() {
        let mut unique = UniqueWhere::new();
        unique.assign(&path("a.b"), ContentValue::Int(1)).unwrap();

        let err = unique.assign(&path("a.b"), ContentValue::Int(2)).unwrap_err();

        assert_eq!(err.to_string(), "Duplicate 'a.b' field");
    }

    #[test]
    fn scalar_and_relation_on_one_path_are_rejected() {
        let mut unique = UniqueWhere::new();
        unique.assign(&path("a.b"), ContentValue::Int(1)).unwrap();

        let err = unique.assign(&path("a.b.c"), ContentValue::Int(2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed expression: cannot simultaneously treat the 'a.b' field as a scalar as well as a relation."
        );

        let err = unique.assign(&path("a"), ContentValue::Int(2)).unwrap_err();
        assert_eq!(err, InputError::DuplicateUniqueField("a".to_owned()));
    }

    #[test]
    fn to_where_uses_equality() {
        let unique = UniqueWhere::by("id", ContentValue::Int(1)).with_relation("author", UniqueWhere::by("slug", "x"));

        assert_eq!(
            serde_json::to_value(unique.to_where()).unwrap(),
            json!({ "author": { "slug": { "eq": "x" } }, "id": { "eq": 1 } })
        );
    }
}
