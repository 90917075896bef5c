use crate::error::{DatabaseConstraint, Error, ErrorKind};

/// The fields of a PostgreSQL error response the classification needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostgresError {
    /// The SQLSTATE code, e.g. `23505`.
    pub code: String,
    pub message: String,
    pub severity: String,
    pub detail: Option<String>,
    pub column: Option<String>,
    pub constraint: Option<String>,
    pub table: Option<String>,
}

impl std::fmt::Display for PostgresError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;

        if let Some(detail) = &self.detail {
            write!(f, "\nDETAIL: {detail}")?;
        }

        Ok(())
    }
}

impl std::error::Error for PostgresError {}

impl From<PostgresError> for Error {
    fn from(value: PostgresError) -> Self {
        let kind = match value.code.as_str() {
            "23505" => ErrorKind::UniqueConstraintViolation {
                constraint: constraint_of(&value),
            },
            "23502" => ErrorKind::NullConstraintViolation {
                constraint: value
                    .column
                    .as_ref()
                    .map(|column| DatabaseConstraint::fields(Some(column)))
                    .unwrap_or(DatabaseConstraint::CannotParse),
            },
            "23503" => ErrorKind::ForeignKeyConstraintViolation {
                constraint: value
                    .constraint
                    .clone()
                    .map(DatabaseConstraint::Index)
                    .unwrap_or(DatabaseConstraint::ForeignKey),
            },
            "40P01" | "40001" | "25P02" => ErrorKind::TransactionAlreadyClosed(value.message.clone()),
            "57P01" | "08006" | "08003" => ErrorKind::ConnectionClosed,
            _ => ErrorKind::QueryError(Box::new(value.clone())),
        };

        let mut builder = Error::builder(kind);
        builder.set_original_code(value.code);
        builder.set_original_message(value.message);

        builder.build()
    }
}

/// The violated unique constraint, preferring the columns listed in the detail
/// (`Key (email)=(a@b.c) already exists.`) over the index name.
fn constraint_of(error: &PostgresError) -> DatabaseConstraint {
    let fields = error.detail.as_deref().and_then(|detail| {
        let start = detail.find("Key (")? + "Key (".len();
        let end = start + detail[start..].find(')')?;

        Some(detail[start..end].split(", ").map(str::to_owned).collect::<Vec<_>>())
    });

    match (fields, &error.constraint) {
        (Some(fields), _) => DatabaseConstraint::Fields(fields),
        (None, Some(index)) => DatabaseConstraint::Index(index.clone()),
        (None, None) => DatabaseConstraint::CannotParse,
    }
}
