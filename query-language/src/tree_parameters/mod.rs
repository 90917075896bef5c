//! Parameter trees describing which entities and fields a data binding addresses.
//!
//! `Desugared*` trees are what the parser produces, the unprefixed trees are the fully resolved
//! form handed to the data layer and `Sugared*` trees are the public input shape accepting either
//! expressions or structured values.

mod desugared;
mod resolved;
mod sugared;

pub use desugared::*;
pub use resolved::*;
pub use sugared::*;

pub use query_structure::{OrderBy, OrderByField, SortOrder, UniqueWhere, Where as Filter};

pub type EntityName = String;
pub type FieldName = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpectedEntityCount {
    UpToOne,
    PossiblyMany,
}

/// Either an expression in the query language or the structure it would parse into.
#[derive(Debug, Clone, PartialEq)]
pub enum Sugared<T> {
    Expression(String),
    Structured(T),
}

impl<T> From<&str> for Sugared<T> {
    fn from(expression: &str) -> Self {
        Sugared::Expression(expression.to_owned())
    }
}

impl<T> From<String> for Sugared<T> {
    fn from(expression: String) -> Self {
        Sugared::Expression(expression)
    }
}
