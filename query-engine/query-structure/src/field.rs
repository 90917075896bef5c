use crate::Relation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Field {
    Column(Column),
    Relation(Relation),
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Column(c) => &c.name,
            Field::Relation(r) => &r.name,
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Field::Column(c) => Some(c),
            Field::Relation(_) => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Field::Relation(r) => Some(r),
            Field::Column(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub column_name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Uuid,
    String,
    Int,
    Double,
    Bool,
    DateTime,
    Json,
    Enum,
}
