//! The outcome of every individual write a mutation performs.
//!
//! A nested mutation produces one flat list of results. Each result carries the path from the
//! root input to the input that caused it, so clients can pinpoint a failing nested operation:
//! `[{ field: "posts" }, { index: 1, alias: "second" }, { field: "author" }]`.

use content_value::ContentValue;
use indexmap::IndexMap;
use query_structure::{Entity, Relation, UniqueWhere};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

pub type MutationResultList = Vec<MutationResult>;

/// Column values written by a create or update, keyed by field name.
pub type RowValues = IndexMap<String, ContentValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field {
        field: String,
    },
    Index {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field { field: name.into() }
    }

    pub fn index(index: usize, alias: Option<String>) -> Self {
        PathSegment::Index { index, alias }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field { field } => f.write_str(field),
            PathSegment::Index { index, alias: Some(alias) } => write!(f, "{index}({alias})"),
            PathSegment::Index { index, alias: None } => write!(f, "{index}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationResultType {
    Ok,
    NothingToDo,
    NotFoundError,
    ConstraintViolationError,
    NoResultError,
    InputError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModificationType {
    Create,
    Update,
    Delete,
    JunctionUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NothingToDoReason {
    NoData,
    EmptyRelation,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintType {
    NotNull,
    UniqueKey,
    ForeignKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputErrorKind {
    NonUniqueWhere,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationResultKind {
    CreateOk {
        entity: String,
        primary: ContentValue,
        values: RowValues,
    },
    UpdateOk {
        entity: String,
        primary: ContentValue,
        values: RowValues,
    },
    DeleteOk {
        entity: String,
        primary: ContentValue,
    },
    JunctionUpdateOk {
        entity: String,
        relation: String,
        owner: ContentValue,
        inversed: ContentValue,
    },
    NotFound {
        unique_where: UniqueWhere,
    },
    NothingToDo {
        reason: NothingToDoReason,
    },
    ConstraintViolation {
        constraint: ConstraintType,
    },
    NoResult,
    InputError {
        kind: InputErrorKind,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    pub path: Vec<PathSegment>,
    pub kind: MutationResultKind,
}

impl MutationResult {
    pub fn new(kind: MutationResultKind) -> Self {
        MutationResult { path: Vec::new(), kind }
    }

    pub fn create_ok(entity: &Entity, primary: ContentValue, values: RowValues) -> Self {
        Self::new(MutationResultKind::CreateOk {
            entity: entity.name.clone(),
            primary,
            values,
        })
    }

    pub fn update_ok(entity: &Entity, primary: ContentValue, values: RowValues) -> Self {
        Self::new(MutationResultKind::UpdateOk {
            entity: entity.name.clone(),
            primary,
            values,
        })
    }

    pub fn delete_ok(entity: &Entity, primary: ContentValue) -> Self {
        Self::new(MutationResultKind::DeleteOk {
            entity: entity.name.clone(),
            primary,
        })
    }

    pub fn junction_update_ok(entity: &Entity, relation: &Relation, owner: ContentValue, inversed: ContentValue) -> Self {
        Self::new(MutationResultKind::JunctionUpdateOk {
            entity: entity.name.clone(),
            relation: relation.name.clone(),
            owner,
            inversed,
        })
    }

    pub fn not_found(unique_where: UniqueWhere) -> Self {
        Self::new(MutationResultKind::NotFound { unique_where })
    }

    pub fn nothing_to_do(reason: NothingToDoReason) -> Self {
        Self::new(MutationResultKind::NothingToDo { reason })
    }

    pub fn constraint_violation(constraint: ConstraintType) -> Self {
        Self::new(MutationResultKind::ConstraintViolation { constraint })
    }

    pub fn no_result() -> Self {
        Self::new(MutationResultKind::NoResult)
    }

    pub fn input_error(kind: InputErrorKind, message: Option<String>) -> Self {
        Self::new(MutationResultKind::InputError { kind, message })
    }

    pub fn result_type(&self) -> MutationResultType {
        match &self.kind {
            MutationResultKind::CreateOk { .. }
            | MutationResultKind::UpdateOk { .. }
            | MutationResultKind::DeleteOk { .. }
            | MutationResultKind::JunctionUpdateOk { .. } => MutationResultType::Ok,
            MutationResultKind::NotFound { .. } => MutationResultType::NotFoundError,
            MutationResultKind::NothingToDo { .. } => MutationResultType::NothingToDo,
            MutationResultKind::ConstraintViolation { .. } => MutationResultType::ConstraintViolationError,
            MutationResultKind::NoResult => MutationResultType::NoResultError,
            MutationResultKind::InputError { .. } => MutationResultType::InputError,
        }
    }

    /// Set only for successful writes.
    pub fn modification_type(&self) -> Option<ModificationType> {
        match &self.kind {
            MutationResultKind::CreateOk { .. } => Some(ModificationType::Create),
            MutationResultKind::UpdateOk { .. } => Some(ModificationType::Update),
            MutationResultKind::DeleteOk { .. } => Some(ModificationType::Delete),
            MutationResultKind::JunctionUpdateOk { .. } => Some(ModificationType::JunctionUpdate),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result_type() == MutationResultType::Ok
    }

    /// Anything but `ok` and `nothingToDo` fails the mutation.
    pub fn is_error(&self) -> bool {
        !matches!(
            self.result_type(),
            MutationResultType::Ok | MutationResultType::NothingToDo
        )
    }

    /// Human readable description of a failed result.
    pub fn message(&self) -> Option<String> {
        match &self.kind {
            MutationResultKind::NotFound { unique_where } => Some(format!(
                "Entity not found or access denied for {}",
                serde_json::to_string(unique_where).unwrap_or_default()
            )),
            MutationResultKind::ConstraintViolation { constraint } => Some(match constraint {
                ConstraintType::NotNull => "Not null constraint violation".to_owned(),
                ConstraintType::UniqueKey => "Unique constraint violation".to_owned(),
                ConstraintType::ForeignKey => "Foreign key constraint violation".to_owned(),
            }),
            MutationResultKind::NoResult => Some("Mutation failed, operation denied by ACL rules".to_owned()),
            MutationResultKind::InputError { message, .. } => {
                Some(message.clone().unwrap_or_else(|| "Invalid input".to_owned()))
            }
            _ => None,
        }
    }

    pub fn with_path_prefix(mut self, prefix: &[PathSegment]) -> Self {
        if !prefix.is_empty() {
            self.path.splice(0..0, prefix.iter().cloned());
        }

        self
    }
}

impl Serialize for MutationResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("result", &self.result_type())?;
        map.serialize_entry("path", &self.path)?;

        if let Some(modification) = self.modification_type() {
            map.serialize_entry("type", &modification)?;
        }

        match &self.kind {
            MutationResultKind::CreateOk { entity, primary, values }
            | MutationResultKind::UpdateOk { entity, primary, values } => {
                map.serialize_entry("entity", entity)?;
                map.serialize_entry("primary", primary)?;
                map.serialize_entry("values", values)?;
            }
            MutationResultKind::DeleteOk { entity, primary } => {
                map.serialize_entry("entity", entity)?;
                map.serialize_entry("primary", primary)?;
            }
            MutationResultKind::JunctionUpdateOk {
                entity,
                relation,
                owner,
                inversed,
            } => {
                map.serialize_entry("entity", entity)?;
                map.serialize_entry("relation", relation)?;
                map.serialize_entry("owner", owner)?;
                map.serialize_entry("inversed", inversed)?;
            }
            MutationResultKind::NotFound { unique_where } => map.serialize_entry("where", unique_where)?,
            MutationResultKind::NothingToDo { reason } => map.serialize_entry("reason", reason)?,
            MutationResultKind::ConstraintViolation { constraint } => map.serialize_entry("constraint", constraint)?,
            MutationResultKind::NoResult => {}
            MutationResultKind::InputError { kind, .. } => map.serialize_entry("kind", kind)?,
        }

        if let Some(message) = self.message() {
            map.serialize_entry("message", &message)?;
        }

        map.end()
    }
}

/// Puts `path` in front of the path of every result.
pub fn prepend_path(path: &[PathSegment], results: MutationResultList) -> MutationResultList {
    results.into_iter().map(|r| r.with_path_prefix(path)).collect()
}

/// The primary key of the row a nested create inserted. The create result always comes first.
pub fn insert_primary(results: &[MutationResult]) -> Option<&ContentValue> {
    match results.first().map(|r| &r.kind) {
        Some(MutationResultKind::CreateOk { primary, .. }) => Some(primary),
        _ => None,
    }
}

pub fn update_primary(results: &[MutationResult]) -> Option<&ContentValue> {
    match results.first().map(|r| &r.kind) {
        Some(MutationResultKind::UpdateOk { primary, .. }) => Some(primary),
        _ => None,
    }
}

/// Results of concurrently issued operations, flattened one or two levels deep.
pub trait IntoResultList {
    fn into_result_list(self) -> MutationResultList;
}

impl IntoResultList for MutationResultList {
    fn into_result_list(self) -> MutationResultList {
        self
    }
}

impl IntoResultList for Vec<MutationResultList> {
    fn into_result_list(self) -> MutationResultList {
        self.into_iter().flatten().collect()
    }
}

impl IntoResultList for Option<MutationResultList> {
    fn into_result_list(self) -> MutationResultList {
        self.unwrap_or_default()
    }
}
