mod builder;
mod error;
mod field;
mod filter;
mod model;
mod order_by;
mod relation;
mod unique_where;
mod write_input;

pub use builder::{EntityBuilder, RelationBuilder, SchemaBuilder};
pub use error::{DomainError, InputError};
pub use field::{Column, ColumnType, Field};
pub use filter::{Condition, FieldWhere, Where};
pub use model::{Entity, Schema, UniqueConstraint};
pub use order_by::{OrderBy, OrderByField, SortOrder};
pub use relation::{JoiningColumn, JoiningTable, OnDelete, Relation, RelationDefinition, RelationKind};
pub use unique_where::{UniqueWhere, UniqueWhereValue};
pub use write_input::{DataInput, FieldInput, HasManyInput, HasManyItem, HasOneInput, MutationOperation};

pub use content_value::ContentValue;
