use super::{EntityName, FieldName, Filter, OrderBy, Sugared, UniqueWhere};
use content_value::ContentValue;

pub type SugaredFilter = Sugared<Filter>;
pub type SugaredUniqueWhere = Sugared<UniqueWhere>;
pub type SugaredOrderBy = Sugared<OrderBy>;

/// A default for a field, either given directly or read from the environment by name.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Value(ContentValue),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableHasOneRelation {
    pub field: FieldName,
    pub filter: Option<SugaredFilter>,
    pub reduced_by: Option<SugaredUniqueWhere>,
}

impl SugarableHasOneRelation {
    pub fn new(field: impl Into<FieldName>) -> Self {
        SugarableHasOneRelation {
            field: field.into(),
            filter: None,
            reduced_by: None,
        }
    }
}

/// Options the grammar cannot express. They only ever apply to the last relation of a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnsugarableHasOneRelation {
    pub connect_to: Option<SugaredUniqueWhere>,
    pub is_nonbearing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableHasManyRelation {
    pub field: FieldName,
    pub filter: Option<SugaredFilter>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnsugarableEntityList {
    pub order_by: Option<SugaredOrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub connect_to: Option<SugaredUniqueWhere>,
    pub is_nonbearing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableQualifiedEntityList {
    pub entity_name: EntityName,
    pub filter: Option<SugaredFilter>,
    pub has_one_relation_path: Vec<SugarableHasOneRelation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugaredQualifiedEntityList {
    pub entities: Sugared<SugarableQualifiedEntityList>,
    pub parameters: UnsugarableEntityList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableQualifiedFieldList {
    pub entity_name: EntityName,
    pub filter: Option<SugaredFilter>,
    pub has_one_relation_path: Vec<SugarableHasOneRelation>,
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugaredQualifiedFieldList {
    pub fields: Sugared<SugarableQualifiedFieldList>,
    pub parameters: UnsugarableEntityList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableQualifiedSingleEntity {
    pub entity_name: EntityName,
    pub unique_where: SugaredUniqueWhere,
    pub filter: Option<SugaredFilter>,
    pub has_one_relation_path: Vec<SugarableHasOneRelation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugaredQualifiedSingleEntity {
    pub entity: Sugared<SugarableQualifiedSingleEntity>,
    pub connect_to: Option<SugaredUniqueWhere>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableUnconstrainedQualifiedEntityList {
    pub entity_name: EntityName,
    pub has_one_relation_path: Vec<SugarableHasOneRelation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugaredUnconstrainedQualifiedEntityList {
    pub entities: Sugared<SugarableUnconstrainedQualifiedEntityList>,
    pub connect_to: Option<SugaredUniqueWhere>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugaredRelativeSingleEntity {
    pub field: Sugared<Vec<SugarableHasOneRelation>>,
    pub parameters: UnsugarableHasOneRelation,
}

impl From<&str> for SugaredRelativeSingleEntity {
    fn from(expression: &str) -> Self {
        SugaredRelativeSingleEntity {
            field: expression.into(),
            parameters: UnsugarableHasOneRelation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableRelativeSingleField {
    pub has_one_relation_path: Vec<SugarableHasOneRelation>,
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugaredRelativeSingleField {
    pub field: Sugared<SugarableRelativeSingleField>,
    pub is_nonbearing: bool,
    pub default_value: Option<DefaultValue>,
}

impl From<&str> for SugaredRelativeSingleField {
    fn from(expression: &str) -> Self {
        SugaredRelativeSingleField {
            field: expression.into(),
            is_nonbearing: false,
            default_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugarableRelativeEntityList {
    pub has_one_relation_path: Vec<SugarableHasOneRelation>,
    pub has_many_relation: SugarableHasManyRelation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugaredRelativeEntityList {
    pub field: Sugared<SugarableRelativeEntityList>,
    pub parameters: UnsugarableEntityList,
}

impl From<&str> for SugaredRelativeEntityList {
    fn from(expression: &str) -> Self {
        SugaredRelativeEntityList {
            field: expression.into(),
            parameters: UnsugarableEntityList::default(),
        }
    }
}
