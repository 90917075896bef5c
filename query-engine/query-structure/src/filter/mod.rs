mod condition;

pub use condition::Condition;

use crate::{Entity, Field, InputError, Schema};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// A boolean expression over the fields of an entity. All parts are AND-ed together.
///
/// ```text
/// { and: [..], or: [..], not: {..}, age: { gt: 20 }, author: { name: { eq: 'John' } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Where {
    pub and: Vec<Where>,
    pub or: Vec<Where>,
    pub not: Option<Box<Where>>,
    pub fields: BTreeMap<String, FieldWhere>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldWhere {
    /// A column condition.
    Condition(Condition),
    /// A filter on the entity a relation points to.
    Relation(Where),
}

impl Where {
    pub fn field(name: impl Into<String>, condition: Condition) -> Where {
        let mut fields = BTreeMap::new();
        fields.insert(name.into(), FieldWhere::Condition(condition));

        Where {
            fields,
            ..Default::default()
        }
    }

    pub fn relation(name: impl Into<String>, nested: Where) -> Where {
        let mut fields = BTreeMap::new();
        fields.insert(name.into(), FieldWhere::Relation(nested));

        Where {
            fields,
            ..Default::default()
        }
    }

    /// A field condition addressed by a dotted path: every segment but the last is a relation.
    pub fn path(path: &[String], condition: Condition) -> Where {
        match path.split_last() {
            None => Where::default(),
            Some((last, relations)) => relations
                .iter()
                .rev()
                .fold(Where::field(last.clone(), condition), |nested, relation| {
                    Where::relation(relation.clone(), nested)
                }),
        }
    }

    pub fn and(operands: Vec<Where>) -> Where {
        Where {
            and: operands,
            ..Default::default()
        }
    }

    pub fn or(operands: Vec<Where>) -> Where {
        Where {
            or: operands,
            ..Default::default()
        }
    }

    pub fn not(operand: Where) -> Where {
        Where {
            not: Some(Box::new(operand)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty() && self.not.is_none() && self.fields.is_empty()
    }

    /// Conjunction of two filters, skipping empty operands.
    pub fn and_with(self, other: Where) -> Where {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => other,
            (_, true) => self,
            _ => Where::and(vec![self, other]),
        }
    }

    /// Builds a filter from its object form, resolving each key against `entity`.
    pub fn from_json(schema: &Schema, entity: &Entity, value: &serde_json::Value) -> Result<Where, InputError> {
        let object = value
            .as_object()
            .ok_or_else(|| InputError::malformed(&entity.name, "expected a where object"))?;

        let mut result = Where::default();

        for (key, argument) in object {
            match key.as_str() {
                "and" | "or" => {
                    let operands = argument
                        .as_array()
                        .ok_or_else(|| InputError::malformed(key.as_str(), "expected a list"))?
                        .iter()
                        .map(|operand| Where::from_json(schema, entity, operand))
                        .collect::<Result<Vec<_>, _>>()?;

                    if key == "and" {
                        result.and = operands;
                    } else {
                        result.or = operands;
                    }
                }
                "not" => result.not = Some(Box::new(Where::from_json(schema, entity, argument)?)),
                field_name => {
                    let field_where = match entity.field(field_name)? {
                        Field::Column(_) => FieldWhere::Condition(Condition::from_json(argument)?),
                        Field::Relation(relation) => {
                            let target = schema.target_entity(relation)?;
                            FieldWhere::Relation(Where::from_json(schema, target, argument)?)
                        }
                    };

                    result.fields.insert(field_name.to_owned(), field_where);
                }
            }
        }

        Ok(result)
    }
}

impl Serialize for Where {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        if !self.and.is_empty() {
            map.serialize_entry("and", &self.and)?;
        }

        if !self.or.is_empty() {
            map.serialize_entry("or", &self.or)?;
        }

        if let Some(not) = &self.not {
            map.serialize_entry("not", not)?;
        }

        for (name, field_where) in &self.fields {
            match field_where {
                FieldWhere::Condition(condition) => map.serialize_entry(name, condition)?,
                FieldWhere::Relation(nested) => map.serialize_entry(name, nested)?,
            }
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnType, SchemaBuilder};
    use content_value::ContentValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn dotted_paths_nest_relations() {
        let filter = Where::path(
            &["author".to_owned(), "son".to_owned(), "age".to_owned()],
            Condition::LessThan(ContentValue::Int(1)),
        );

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "author": { "son": { "age": { "lt": 1 } } } })
        );
    }

    #[test]
    fn json_filters_follow_relations() {
        let schema = SchemaBuilder::default()
            .entity("Author", |e| e.column("name", ColumnType::String))
            .entity("Post", |e| e.column("title", ColumnType::String).many_has_one("author", "Author", |r| r))
            .build()
            .unwrap();
        let post = schema.entity("Post").unwrap();
        let input = json!({ "or": [{ "title": { "eq": "a" } }, { "author": { "name": { "isNull": true } } }] });

        let filter = Where::from_json(&schema, post, &input).unwrap();

        assert_eq!(
            filter,
            Where::or(vec![
                Where::field("title", Condition::Equals("a".into())),
                Where::relation("author", Where::field("name", Condition::IsNull(true))),
            ])
        );
    }

    #[test]
    fn empty_operands_are_dropped_from_conjunctions() {
        let filter = Where::default().and_with(Where::field("a", Condition::Never));

        assert_eq!(filter, Where::field("a", Condition::Never));
    }
}
