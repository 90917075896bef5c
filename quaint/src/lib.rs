//! A small SQL abstraction: an AST for the statements the content API issues, a PostgreSQL
//! visitor turning it into parameterized SQL, and the connection traits the executors run on.
//!
//! ```
//! # use quaint::{ast::*, visitor::{Postgres, Visitor}};
//! # fn main() -> Result<(), quaint::error::Error> {
//! let query = Select::from_table("author").column("id").so_that(Column::from("name").equals("John"));
//! let (sql, params) = Postgres::build(query)?;
//!
//! assert_eq!(r#"SELECT "id" FROM "author" WHERE "name" = $1"#, sql);
//! assert_eq!(vec![Value::from("John")], params);
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod connector;
pub mod error;
pub mod visitor;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::connector::{DefaultTransaction, IsolationLevel, Queryable, ResultRow, ResultSet};
}

pub type Result<T> = std::result::Result<T, error::Error>;
