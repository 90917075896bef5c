use super::{EntityName, FieldName, Filter, OrderBy, UniqueWhere};
use content_value::ContentValue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HasOneRelation {
    pub field: FieldName,
    pub filter: Option<Filter>,
    pub reduced_by: Option<UniqueWhere>,
    pub connect_to: Option<UniqueWhere>,
    pub is_nonbearing: bool,
}

impl HasOneRelation {
    pub fn new(field: impl Into<FieldName>) -> Self {
        HasOneRelation {
            field: field.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HasManyRelation {
    pub field: FieldName,
    pub filter: Option<Filter>,
    pub connect_to: Option<UniqueWhere>,
    pub is_nonbearing: bool,
    pub order_by: Option<OrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedEntityList {
    pub entity_name: EntityName,
    pub filter: Option<Filter>,
    pub has_one_relation_path: Vec<HasOneRelation>,
    pub order_by: Option<OrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub connect_to: Option<UniqueWhere>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedFieldList {
    pub entity_name: EntityName,
    pub filter: Option<Filter>,
    pub has_one_relation_path: Vec<HasOneRelation>,
    pub field: FieldName,
    pub order_by: Option<OrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedSingleEntity {
    pub entity_name: EntityName,
    pub unique_where: UniqueWhere,
    pub filter: Option<Filter>,
    pub has_one_relation_path: Vec<HasOneRelation>,
    pub connect_to: Option<UniqueWhere>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnconstrainedQualifiedEntityList {
    pub entity_name: EntityName,
    pub has_one_relation_path: Vec<HasOneRelation>,
    pub connect_to: Option<UniqueWhere>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativeSingleEntity {
    pub has_one_relation_path: Vec<HasOneRelation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativeSingleField {
    pub has_one_relation_path: Vec<HasOneRelation>,
    pub field: FieldName,
    pub is_nonbearing: bool,
    pub default_value: Option<ContentValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativeEntityList {
    pub has_one_relation_path: Vec<HasOneRelation>,
    pub has_many_relation: HasManyRelation,
}
