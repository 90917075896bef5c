//! Nested relation inputs of create and update mutations.
//!
//! Every combination of relation kind and operation is handled by one arm of a single match in
//! [`CreateInputProcessor`] or [`UpdateInputProcessor`]. Processors only talk to the database
//! through a [`Mapper`](crate::mapper::Mapper).

mod create;
mod update;

pub use create::CreateInputProcessor;
pub use update::UpdateInputProcessor;

use crate::{
    collect::convert_error,
    error::CoreError,
    mapper::Mapper,
    result::{insert_primary, prepend_path, ConstraintType, MutationResult, MutationResultList, PathSegment},
    sql::{FieldValue, Resolved},
    CoreResult,
};
use content_value::ContentValue;
use futures::future::{ready, BoxFuture, FutureExt};
use query_structure::{
    DataInput, DomainError, Entity, HasOneInput, MutationOperation, Relation, RelationKind, Schema, UniqueWhere,
};
use std::future::Future;

/// A relation of the row being written, with both of its sides resolved.
#[derive(Debug, Clone, Copy)]
pub struct RelationContext<'a> {
    pub entity: &'a Entity,
    pub relation: &'a Relation,
    pub target_entity: &'a Entity,
    pub target_relation: Option<&'a Relation>,
}

impl<'a> RelationContext<'a> {
    pub fn new(schema: &'a Schema, entity: &'a Entity, relation: &'a Relation) -> CoreResult<Self> {
        Ok(RelationContext {
            entity,
            relation,
            target_entity: schema.target_entity(relation)?,
            target_relation: schema.target_relation(relation)?,
        })
    }

    pub fn kind(&self) -> RelationKind {
        self.relation.kind()
    }

    /// The relation on the target side. Inverse relations always have one.
    fn paired(&self) -> CoreResult<&'a Relation> {
        self.target_relation.ok_or_else(|| {
            DomainError::invalid_relation(&self.entity.name, &self.relation.name, "missing paired relation").into()
        })
    }

    fn unsupported(&self, operation: MutationOperation, context: &'static str) -> CoreError {
        CoreError::UnsupportedOperation {
            entity: self.entity.name.clone(),
            relation: self.relation.name.clone(),
            kind: self.kind(),
            operation,
            context,
        }
    }

    fn has_one_path(&self) -> Vec<PathSegment> {
        vec![PathSegment::field(&self.relation.name)]
    }

    fn has_many_path(&self, index: usize, alias: Option<&String>) -> Vec<PathSegment> {
        vec![
            PathSegment::field(&self.relation.name),
            PathSegment::index(index, alias.cloned()),
        ]
    }
}

/// What a processor asks the mapper to do for one relation input.
pub enum Step<'a> {
    /// An operation of its own, run concurrently with its siblings.
    Run(BoxFuture<'a, CoreResult<MutationResultList>>),
    /// A value for the joining column of the row being written.
    Column(FieldValue<'a>),
}

pub(crate) fn by_primary(entity: &Entity, primary: &ContentValue) -> UniqueWhere {
    UniqueWhere::by(entity.primary.clone(), primary.clone())
}

/// Runs `operation`, reporting its results and classifiable failure under `path`.
pub(crate) fn under_path<'a, F>(path: Vec<PathSegment>, operation: F) -> BoxFuture<'a, CoreResult<MutationResultList>>
where
    F: Future<Output = CoreResult<MutationResultList>> + Send + 'a,
{
    async move {
        match operation.await {
            Ok(results) => Ok(prepend_path(&path, results)),
            Err(err) => match convert_error(&err) {
                Some(result) => Ok(vec![result.with_path_prefix(&path)]),
                None => Err(err),
            },
        }
    }
    .boxed()
}

/// Like [`under_path`] for a deferred column value. The continuation of the resolved value
/// reports under the same path.
pub(crate) fn resolve_under_path<'a, F>(path: Vec<PathSegment>, resolver: F) -> FieldValue<'a>
where
    F: Future<Output = CoreResult<Resolved<'a>>> + Send + 'a,
{
    let resolver = async move {
        match resolver.await {
            Ok(resolved) => Ok(Resolved {
                value: resolved.value,
                results: prepend_path(&path, resolved.results),
                after_execute: resolved.after_execute.map(|after| under_path(path, after)),
            }),
            Err(err) => match convert_error(&err) {
                Some(result) => Ok(Resolved::skip(vec![result.with_path_prefix(&path)])),
                None => Err(err),
            },
        }
    };

    FieldValue::Deferred(resolver.boxed())
}

/// The primary key of the row `by` points at, for the joining column of an owning relation.
///
/// A one-to-one target claimed by another row is disconnected from it first. Reconnecting the
/// row that already owns the target (`row`) leaves the column alone.
pub(crate) fn connect_owning<'a>(
    mapper: &'a dyn Mapper,
    ctx: RelationContext<'a>,
    by: &'a UniqueWhere,
    row: Option<ContentValue>,
) -> FieldValue<'a> {
    resolve_under_path(ctx.has_one_path(), async move {
        let Some(target) = mapper.get_primary_value(ctx.target_entity, by).await? else {
            return Ok(Resolved::skip(vec![MutationResult::not_found(by.clone())]));
        };

        if ctx.kind() != RelationKind::OneHasOneOwning {
            return Ok(Resolved::value(target));
        }

        let claimed_by = UniqueWhere::new().with_relation(&ctx.relation.name, by_primary(ctx.target_entity, &target));

        let results = match mapper.get_primary_value(ctx.entity, &claimed_by).await? {
            Some(owner) if Some(&owner) == row.as_ref() => return Ok(Resolved::default()),
            Some(owner) => {
                let disconnect = DataInput::new().with_one(&ctx.relation.name, HasOneInput::Disconnect);
                mapper.update(ctx.entity, &by_primary(ctx.entity, &owner), &disconnect).await?
            }
            None => Vec::new(),
        };

        Ok(Resolved {
            value: Some(target),
            results,
            after_execute: None,
        })
    })
}

/// Inserts the target of an owning relation and hands its primary key to the joining column.
pub(crate) fn create_owning<'a>(mapper: &'a dyn Mapper, ctx: RelationContext<'a>, data: &'a DataInput) -> FieldValue<'a> {
    resolve_under_path(ctx.has_one_path(), async move {
        let results = mapper.insert(ctx.target_entity, data).await?;

        Ok(Resolved {
            value: insert_primary(&results).cloned(),
            results,
            after_execute: None,
        })
    })
}

/// A not null violation reported without touching the database.
pub(crate) fn not_null<'a>(path: Vec<PathSegment>) -> Step<'a> {
    let result = MutationResult::constraint_violation(ConstraintType::NotNull);
    Step::Run(under_path(path, ready(Ok(vec![result]))))
}

/// Results of an upsert's update attempt, or `None` when the row to update does not exist.
pub(crate) fn found(results: MutationResultList) -> Option<MutationResultList> {
    use crate::result::MutationResultKind;

    match results.first().map(|r| &r.kind) {
        Some(MutationResultKind::NotFound { .. }) => None,
        _ => Some(results),
    }
}
