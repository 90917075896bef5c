//! Row level restrictions applied to every statement a mutation issues.

use query_structure::{Entity, Where};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclOperation {
    Read,
    Create,
    Update,
    Delete,
}

impl fmt::Display for AclOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AclOperation::Read => "read",
            AclOperation::Create => "create",
            AclOperation::Update => "update",
            AclOperation::Delete => "delete",
        };

        f.write_str(name)
    }
}

/// Produces the filter a row has to satisfy for `operation` to touch `fields` of it.
///
/// The returned filter is AND-ed into the statement; an empty filter allows everything.
pub trait PredicateFactory: Send + Sync {
    fn create(&self, entity: &Entity, operation: AclOperation, fields: &[&str]) -> Where;
}

/// No restrictions at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PredicateFactory for AllowAll {
    fn create(&self, _: &Entity, _: AclOperation, _: &[&str]) -> Where {
        Where::default()
    }
}

impl<F> PredicateFactory for F
where
    F: Fn(&Entity, AclOperation, &[&str]) -> Where + Send + Sync,
{
    fn create(&self, entity: &Entity, operation: AclOperation, fields: &[&str]) -> Where {
        self(entity, operation, fields)
    }
}
