//! PostgreSQL implementation of the row mapper.

mod client;
mod condition_builder;
mod delete_executor;
mod field_values;
mod insert_builder;
mod mapper;
mod unique_where_expander;
mod update_builder;
mod where_builder;

pub use client::SqlClient;
pub use condition_builder::build_condition;
pub use delete_executor::DeleteExecutor;
pub use field_values::{FieldValue, FieldValues, Resolved, ResolvedValues};
pub use insert_builder::{InsertBuilder, InsertOutcome};
pub use mapper::SqlMapper;
pub use unique_where_expander::expand_unique_where;
pub use update_builder::{UpdateBuilder, UpdateOutcome};
pub use where_builder::WhereBuilder;
