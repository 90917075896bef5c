//! A set of abstractions for database connections.
//!
//! Provides the [Queryable](trait.Queryable.html) trait the executors run
//! their statements on, a transaction wrapper and the owned result set.
//! The driver itself lives outside of this crate: an embedder implements
//! `Queryable` over its connection and converts driver errors through
//! [PostgresError](struct.PostgresError.html).

mod postgres;
mod queryable;
mod result_set;
mod transaction;

pub use self::result_set::*;
pub use postgres::PostgresError;
pub use queryable::*;
pub use transaction::*;
