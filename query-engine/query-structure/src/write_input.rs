use crate::{Entity, Field, InputError, Schema, UniqueWhere};
use content_value::ContentValue;
use indexmap::IndexMap;
use std::fmt;

/// Data for one row of a create or update mutation, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataInput {
    fields: IndexMap<String, FieldInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    /// A column value. On an owning has-one relation, an already verified primary key of the target.
    Value(ContentValue),
    HasOne(HasOneInput),
    HasMany(Vec<HasManyItem>),
}

/// Nested mutation on a relation resolving to at most one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum HasOneInput {
    Connect(UniqueWhere),
    Create(DataInput),
    Update(DataInput),
    Upsert { create: DataInput, update: DataInput },
    Disconnect,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HasManyItem {
    pub alias: Option<String>,
    pub input: HasManyInput,
}

/// Nested mutation on one element of a to-many relation.
#[derive(Debug, Clone, PartialEq)]
pub enum HasManyInput {
    Connect(UniqueWhere),
    Create(DataInput),
    Update { by: UniqueWhere, data: DataInput },
    Upsert { by: UniqueWhere, update: DataInput, create: DataInput },
    Disconnect(UniqueWhere),
    Delete(UniqueWhere),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperation {
    Connect,
    Create,
    Update,
    Upsert,
    Disconnect,
    Delete,
}

impl fmt::Display for MutationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationOperation::Connect => "connect",
            MutationOperation::Create => "create",
            MutationOperation::Update => "update",
            MutationOperation::Upsert => "upsert",
            MutationOperation::Disconnect => "disconnect",
            MutationOperation::Delete => "delete",
        };

        f.write_str(name)
    }
}

impl HasOneInput {
    pub fn operation(&self) -> MutationOperation {
        match self {
            HasOneInput::Connect(_) => MutationOperation::Connect,
            HasOneInput::Create(_) => MutationOperation::Create,
            HasOneInput::Update(_) => MutationOperation::Update,
            HasOneInput::Upsert { .. } => MutationOperation::Upsert,
            HasOneInput::Disconnect => MutationOperation::Disconnect,
            HasOneInput::Delete => MutationOperation::Delete,
        }
    }
}

impl HasManyInput {
    pub fn operation(&self) -> MutationOperation {
        match self {
            HasManyInput::Connect(_) => MutationOperation::Connect,
            HasManyInput::Create(_) => MutationOperation::Create,
            HasManyInput::Update { .. } => MutationOperation::Update,
            HasManyInput::Upsert { .. } => MutationOperation::Upsert,
            HasManyInput::Disconnect(_) => MutationOperation::Disconnect,
            HasManyInput::Delete(_) => MutationOperation::Delete,
        }
    }
}

impl HasManyItem {
    pub fn new(input: HasManyInput) -> Self {
        HasManyItem { alias: None, input }
    }

    pub fn aliased(alias: impl Into<String>, input: HasManyInput) -> Self {
        HasManyItem {
            alias: Some(alias.into()),
            input,
        }
    }
}

impl DataInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<ContentValue>) -> Self {
        self.fields.insert(field.into(), FieldInput::Value(value.into()));
        self
    }

    pub fn with_one(mut self, field: impl Into<String>, input: HasOneInput) -> Self {
        self.fields.insert(field.into(), FieldInput::HasOne(input));
        self
    }

    pub fn with_many(mut self, field: impl Into<String>, items: Vec<HasManyItem>) -> Self {
        self.fields.insert(field.into(), FieldInput::HasMany(items));
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldInput> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldInput)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Decodes the GraphQL input object of a create or update mutation.
    pub fn from_json(schema: &Schema, entity: &Entity, value: &serde_json::Value) -> Result<DataInput, InputError> {
        let object = value
            .as_object()
            .ok_or_else(|| InputError::malformed(&entity.name, "expected a data object"))?;

        let mut data = DataInput::new();

        for (field_name, argument) in object {
            let input = match entity.field(field_name)? {
                Field::Column(_) => FieldInput::Value(ContentValue::try_from(argument.clone())?),
                Field::Relation(relation) => {
                    let target = schema.target_entity(relation)?;

                    if relation.kind().is_has_one() {
                        FieldInput::HasOne(has_one_from_json(schema, target, field_name, argument)?)
                    } else {
                        FieldInput::HasMany(has_many_from_json(schema, target, field_name, argument)?)
                    }
                }
            };

            data.fields.insert(field_name.clone(), input);
        }

        Ok(data)
    }
}

impl FromIterator<(String, FieldInput)> for DataInput {
    fn from_iter<T: IntoIterator<Item = (String, FieldInput)>>(iter: T) -> Self {
        DataInput {
            fields: iter.into_iter().collect(),
        }
    }
}

fn single_operation<'a>(
    path: &str,
    value: &'a serde_json::Value,
) -> Result<(&'a str, &'a serde_json::Value, Option<String>), InputError> {
    let object = value
        .as_object()
        .ok_or_else(|| InputError::malformed(path, "expected a relation input object"))?;

    let alias = object.get("alias").and_then(|a| a.as_str()).map(str::to_owned);
    let mut operations = object.iter().filter(|(key, _)| key.as_str() != "alias");

    let (operation, argument) = operations
        .next()
        .ok_or_else(|| InputError::malformed(path, "expected exactly one operation"))?;

    if operations.next().is_some() {
        return Err(InputError::malformed(path, "expected exactly one operation"));
    }

    Ok((operation.as_str(), argument, alias))
}

fn member<'a>(path: &str, value: &'a serde_json::Value, key: &str) -> Result<&'a serde_json::Value, InputError> {
    value
        .get(key)
        .ok_or_else(|| InputError::malformed(path, format!("missing `{key}`")))
}

fn has_one_from_json(
    schema: &Schema,
    target: &Entity,
    path: &str,
    value: &serde_json::Value,
) -> Result<HasOneInput, InputError> {
    let (operation, argument, _) = single_operation(path, value)?;

    let input = match operation {
        "connect" => HasOneInput::Connect(UniqueWhere::from_json(schema, target, argument)?),
        "create" => HasOneInput::Create(DataInput::from_json(schema, target, argument)?),
        "update" => HasOneInput::Update(DataInput::from_json(schema, target, argument)?),
        "upsert" => HasOneInput::Upsert {
            create: DataInput::from_json(schema, target, member(path, argument, "create")?)?,
            update: DataInput::from_json(schema, target, member(path, argument, "update")?)?,
        },
        "disconnect" => HasOneInput::Disconnect,
        "delete" => HasOneInput::Delete,
        other => return Err(InputError::malformed(path, format!("unknown operation `{other}`"))),
    };

    Ok(input)
}

fn has_many_from_json(
    schema: &Schema,
    target: &Entity,
    path: &str,
    value: &serde_json::Value,
) -> Result<Vec<HasManyItem>, InputError> {
    let items = value
        .as_array()
        .ok_or_else(|| InputError::malformed(path, "expected a list of relation inputs"))?;

    items
        .iter()
        .map(|item| {
            let (operation, argument, alias) = single_operation(path, item)?;
            let unique = |key: &str| UniqueWhere::from_json(schema, target, member(path, argument, key)?);
            let data = |key: &str| DataInput::from_json(schema, target, member(path, argument, key)?);

            let input = match operation {
                "connect" => HasManyInput::Connect(UniqueWhere::from_json(schema, target, argument)?),
                "create" => HasManyInput::Create(DataInput::from_json(schema, target, argument)?),
                "update" => HasManyInput::Update {
                    by: unique("by")?,
                    data: data("data")?,
                },
                "upsert" => HasManyInput::Upsert {
                    by: unique("by")?,
                    update: data("update")?,
                    create: data("create")?,
                },
                "disconnect" => HasManyInput::Disconnect(UniqueWhere::from_json(schema, target, argument)?),
                "delete" => HasManyInput::Delete(UniqueWhere::from_json(schema, target, argument)?),
                other => return Err(InputError::malformed(path, format!("unknown operation `{other}`"))),
            };

            Ok(HasManyItem { alias, input })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnType, SchemaBuilder};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_inputs_are_decoded_per_relation_kind() {
        let schema = SchemaBuilder::default()
            .entity("Author", |e| e.column("name", ColumnType::String).one_has_many("posts", "Post", "author"))
            .entity("Post", |e| {
                e.column("title", ColumnType::String)
                    .many_has_one("author", "Author", |r| r.inversed_by("posts"))
            })
            .build()
            .unwrap();
        let author = schema.entity("Author").unwrap();

        let input = json!({
            "name": "John",
            "posts": [
                { "create": { "title": "Hello" }, "alias": "first" },
                { "update": { "by": { "id": 1 }, "data": { "title": "World" } } }
            ]
        });

        let data = DataInput::from_json(&schema, author, &input).unwrap();

        let expected = DataInput::new().with_value("name", "John").with_many(
            "posts",
            vec![
                HasManyItem::aliased("first", HasManyInput::Create(DataInput::new().with_value("title", "Hello"))),
                HasManyItem::new(HasManyInput::Update {
                    by: UniqueWhere::by("id", ContentValue::Int(1)),
                    data: DataInput::new().with_value("title", "World"),
                }),
            ],
        );

        assert_eq!(data, expected);
    }

    #[test]
    fn two_operations_on_one_relation_are_rejected() {
        let schema = SchemaBuilder::default()
            .entity("Author", |e| e.column("name", ColumnType::String))
            .entity("Post", |e| e.many_has_one("author", "Author", |r| r))
            .build()
            .unwrap();
        let post = schema.entity("Post").unwrap();

        let err = DataInput::from_json(&schema, post, &json!({ "author": { "connect": { "id": 1 }, "delete": true } }))
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid input at `author`: expected exactly one operation");
    }
}
