//! An abstract syntax tree for SQL queries.
//!
//! The ast module handles everything related to building abstract SQL queries
//! without going into database-level specifics. Everything related to the
//! actual query building is in the [visitor](../visitor/index.html) module.

#[macro_use]
mod macros;

mod column;
mod compare;
mod conditions;
mod conjunctive;
mod delete;
mod expression;
mod insert;
mod ordering;
mod query;
mod row;
mod select;
mod table;
mod update;

pub use column::Column;
pub use compare::{Comparable, Compare};
pub use conditions::ConditionTree;
pub use conjunctive::Conjunctive;
pub use delete::Delete;
pub use expression::{Expression, ExpressionKind};
pub use insert::{Insert, OnConflict, SingleRowInsert};
pub use ordering::{IntoOrderDefinition, Order, OrderDefinition, Orderable, Ordering};
pub use query::Query;
pub use row::Row;
pub use select::Select;
pub use table::Table;
pub use update::Update;

pub use content_value::ContentValue as Value;
