use serde::{Deserialize, Serialize};
use std::fmt;

/// A relation field. The physical link lives on exactly one side: the owning has-one side carries
/// a joining column, the owning many-to-many side names the junction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub name: String,
    pub target: String,
    #[serde(flatten)]
    pub definition: RelationDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RelationDefinition {
    #[serde(rename_all = "camelCase")]
    ManyHasOne {
        joining_column: JoiningColumn,
        nullable: bool,
        #[serde(default)]
        inversed_by: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    OneHasMany { owned_by: String },
    #[serde(rename_all = "camelCase")]
    OneHasOneOwning {
        joining_column: JoiningColumn,
        nullable: bool,
        #[serde(default)]
        inversed_by: Option<String>,
        #[serde(default)]
        orphan_removal: bool,
    },
    #[serde(rename_all = "camelCase")]
    OneHasOneInverse { owned_by: String, nullable: bool },
    #[serde(rename_all = "camelCase")]
    ManyHasManyOwning {
        joining_table: JoiningTable,
        #[serde(default)]
        inversed_by: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ManyHasManyInverse { owned_by: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoiningColumn {
    pub column_name: String,
    #[serde(default)]
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoiningTable {
    pub table_name: String,
    /// Column pointing at the owning entity.
    pub joining_column: JoiningColumn,
    /// Column pointing at the target entity.
    pub inverse_joining_column: JoiningColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnDelete {
    #[default]
    Restrict,
    Cascade,
    SetNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    ManyHasOne,
    OneHasMany,
    OneHasOneOwning,
    OneHasOneInverse,
    ManyHasManyOwning,
    ManyHasManyInverse,
}

impl RelationKind {
    /// Whether the relation resolves to at most one entity.
    pub fn is_has_one(self) -> bool {
        matches!(
            self,
            RelationKind::ManyHasOne | RelationKind::OneHasOneOwning | RelationKind::OneHasOneInverse
        )
    }

    /// Whether the foreign key is a column of the entity declaring the relation.
    pub fn has_joining_column(self) -> bool {
        matches!(self, RelationKind::ManyHasOne | RelationKind::OneHasOneOwning)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationKind::ManyHasOne => "manyHasOne",
            RelationKind::OneHasMany => "oneHasMany",
            RelationKind::OneHasOneOwning => "oneHasOneOwning",
            RelationKind::OneHasOneInverse => "oneHasOneInverse",
            RelationKind::ManyHasManyOwning => "manyHasManyOwning",
            RelationKind::ManyHasManyInverse => "manyHasManyInverse",
        };

        f.write_str(name)
    }
}

impl Relation {
    pub fn kind(&self) -> RelationKind {
        match &self.definition {
            RelationDefinition::ManyHasOne { .. } => RelationKind::ManyHasOne,
            RelationDefinition::OneHasMany { .. } => RelationKind::OneHasMany,
            RelationDefinition::OneHasOneOwning { .. } => RelationKind::OneHasOneOwning,
            RelationDefinition::OneHasOneInverse { .. } => RelationKind::OneHasOneInverse,
            RelationDefinition::ManyHasManyOwning { .. } => RelationKind::ManyHasManyOwning,
            RelationDefinition::ManyHasManyInverse { .. } => RelationKind::ManyHasManyInverse,
        }
    }

    pub fn joining_column(&self) -> Option<&JoiningColumn> {
        match &self.definition {
            RelationDefinition::ManyHasOne { joining_column, .. }
            | RelationDefinition::OneHasOneOwning { joining_column, .. } => Some(joining_column),
            _ => None,
        }
    }

    pub fn joining_table(&self) -> Option<&JoiningTable> {
        match &self.definition {
            RelationDefinition::ManyHasManyOwning { joining_table, .. } => Some(joining_table),
            _ => None,
        }
    }

    /// Nullability of the relation. To-many relations are always nullable.
    pub fn is_nullable(&self) -> bool {
        match &self.definition {
            RelationDefinition::ManyHasOne { nullable, .. }
            | RelationDefinition::OneHasOneOwning { nullable, .. }
            | RelationDefinition::OneHasOneInverse { nullable, .. } => *nullable,
            _ => true,
        }
    }

    pub fn orphan_removal(&self) -> bool {
        matches!(
            self.definition,
            RelationDefinition::OneHasOneOwning { orphan_removal: true, .. }
        )
    }

    /// Name of the paired relation on the target entity, if the relation is bidirectional.
    pub fn paired_relation(&self) -> Option<&str> {
        match &self.definition {
            RelationDefinition::ManyHasOne { inversed_by, .. }
            | RelationDefinition::OneHasOneOwning { inversed_by, .. }
            | RelationDefinition::ManyHasManyOwning { inversed_by, .. } => inversed_by.as_deref(),
            RelationDefinition::OneHasMany { owned_by }
            | RelationDefinition::OneHasOneInverse { owned_by, .. }
            | RelationDefinition::ManyHasManyInverse { owned_by } => Some(owned_by),
        }
    }

    pub fn is_owning(&self) -> bool {
        matches!(
            self.kind(),
            RelationKind::ManyHasOne | RelationKind::OneHasOneOwning | RelationKind::ManyHasManyOwning
        )
    }
}
