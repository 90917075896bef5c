use content_value::ConversionFailure;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Entity `{name}` not found")]
    EntityNotFound { name: String },

    #[error("Field `{field}` on entity `{entity}` not found")]
    FieldNotFound { entity: String, field: String },

    #[error("Field `{field}` on entity `{entity}` is not a column")]
    NotAColumn { entity: String, field: String },

    #[error("Field `{field}` on entity `{entity}` is not a relation")]
    NotARelation { entity: String, field: String },

    #[error("Relation `{entity}.{relation}` is invalid: {reason}")]
    InvalidRelation {
        entity: String,
        relation: String,
        reason: String,
    },

    #[error("Unique constraint on `{entity}` refers to unknown field `{field}`")]
    InvalidUniqueConstraint { entity: String, field: String },
}

impl DomainError {
    pub fn invalid_relation(entity: &str, relation: &str, reason: impl Into<String>) -> Self {
        DomainError::InvalidRelation {
            entity: entity.to_owned(),
            relation: relation.to_owned(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("Only single field is allowed. If you want to combine multiple conditions, use \"and\" or \"or\"")]
    MultipleConditionOperators,

    #[error("Unknown condition operator `{0}`")]
    UnknownConditionOperator(String),

    #[error("Duplicate '{0}' field")]
    DuplicateUniqueField(String),

    #[error(
        "Malformed expression: cannot simultaneously treat the '{0}' field as a scalar as well as a relation."
    )]
    ScalarRelationConflict(String),

    #[error("Invalid input at `{path}`: {message}")]
    Malformed { path: String, message: String },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Conversion(#[from] ConversionFailure),
}

impl InputError {
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        InputError::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}
