//! Execution of nested content mutations on PostgreSQL.
//!
//! A mutation arrives as a tree of relation inputs. The input processors turn every node into
//! calls on a [`Mapper`]; the [`SqlMapper`](sql::SqlMapper) turns those into SQL. Everything a
//! client can act on comes back as a [`MutationResult`] with the path of the input it belongs
//! to, and only unexpected failures surface as a [`CoreError`].

pub mod acl;
pub mod collect;
pub mod error;
pub mod input_processing;
pub mod mapper;
pub mod resolver;
pub mod result;
pub mod settings;
pub mod sql;

pub use acl::{AclOperation, AllowAll, PredicateFactory};
pub use collect::{collect_results, convert_error};
pub use error::CoreError;
pub use mapper::Mapper;
pub use resolver::{MutationError, MutationErrorType, MutationResolver, MutationResponse, MutationTransaction};
pub use result::*;
pub use settings::MutationSettings;

pub type CoreResult<T> = Result<T, CoreError>;
