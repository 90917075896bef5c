use query_structure::{DomainError, InputError, MutationOperation, RelationKind};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error in connector: {}", _0)]
    ConnectorError(quaint::error::Error),

    #[error("Error in domain logic: {}", _0)]
    DomainError(DomainError),

    #[error("{}", _0)]
    InputError(InputError),

    #[error("Unique where on `{entity}` does not cover a unique key: {fields}")]
    NonUniqueWhere { entity: String, fields: String },

    #[error("The row does not exist or the operation was denied")]
    NoResult,

    #[error("Operation `{operation}` is not supported on {kind} relation `{entity}.{relation}` {context}")]
    UnsupportedOperation {
        entity: String,
        relation: String,
        kind: RelationKind,
        operation: MutationOperation,
        context: &'static str,
    },

    #[error("{}", _0)]
    ConfigurationError(String),
}

// Serializes as its message, which is all a client gets to see of a fatal error.
impl Serialize for CoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl CoreError {
    pub fn non_unique_where<'a>(entity: &str, fields: impl IntoIterator<Item = &'a str>) -> Self {
        CoreError::NonUniqueWhere {
            entity: entity.to_owned(),
            fields: fields.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::ConnectorError(err) => err.is_closed(),
            _ => false,
        }
    }
}

impl From<quaint::error::Error> for CoreError {
    fn from(e: quaint::error::Error) -> CoreError {
        CoreError::ConnectorError(e)
    }
}

impl From<DomainError> for CoreError {
    fn from(e: DomainError) -> CoreError {
        CoreError::DomainError(e)
    }
}

impl From<InputError> for CoreError {
    fn from(e: InputError) -> CoreError {
        CoreError::InputError(e)
    }
}
