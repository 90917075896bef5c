use super::{EntityName, FieldName, Filter, UniqueWhere};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredHasOneRelation {
    pub field: FieldName,
    pub filter: Option<Filter>,
    pub reduced_by: Option<UniqueWhere>,
}

impl DesugaredHasOneRelation {
    pub fn new(field: impl Into<FieldName>) -> Self {
        DesugaredHasOneRelation {
            field: field.into(),
            filter: None,
            reduced_by: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredHasManyRelation {
    pub field: FieldName,
    pub filter: Option<Filter>,
}

/// E.g. `Author[age < 123].son.sisters(name = 'Jane')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredQualifiedEntityList {
    pub entity_name: EntityName,
    pub filter: Option<Filter>,
    pub has_one_relation_path: Vec<DesugaredHasOneRelation>,
}

/// E.g. `Author[age < 123].son.sister.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredQualifiedFieldList {
    pub entity_name: EntityName,
    pub filter: Option<Filter>,
    pub has_one_relation_path: Vec<DesugaredHasOneRelation>,
    pub field: FieldName,
}

/// E.g. `Author(id = 123).son.sister`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredQualifiedSingleEntity {
    pub entity_name: EntityName,
    pub unique_where: UniqueWhere,
    pub filter: Option<Filter>,
    pub has_one_relation_path: Vec<DesugaredHasOneRelation>,
}

/// E.g. `Author.son.sister`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredUnconstrainedQualifiedEntityList {
    pub entity_name: EntityName,
    pub has_one_relation_path: Vec<DesugaredHasOneRelation>,
}

/// E.g. `localesByLocale(locale.slug = en)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredRelativeSingleEntity {
    pub has_one_relation_path: Vec<DesugaredHasOneRelation>,
}

/// E.g. `authors(id = 123).person.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredRelativeSingleField {
    pub has_one_relation_path: Vec<DesugaredHasOneRelation>,
    pub field: FieldName,
}

/// E.g. `genres(slug = 'sciFi').authors[age < 123]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesugaredRelativeEntityList {
    pub has_one_relation_path: Vec<DesugaredHasOneRelation>,
    pub has_many_relation: DesugaredHasManyRelation,
}
