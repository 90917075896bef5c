//! The query language addressing entities and fields of a content schema, e.g.
//! `Author[age > 20].son.name`, together with the parameter trees it desugars into.

pub mod desugar;
pub mod environment;
pub mod error;
pub mod lexer;
pub mod markers;
pub mod parser;
pub mod tree_parameters;

pub use environment::Environment;
pub use error::{EnvironmentError, QueryLanguageError, Result};
pub use parser::{parse, EntryPoint, ParsedExpression};
