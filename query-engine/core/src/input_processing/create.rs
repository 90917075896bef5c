use super::{by_primary, connect_owning, create_owning, under_path, RelationContext, UpdateInputProcessor};
use crate::{
    mapper::Mapper,
    result::{ConstraintType, MutationResult, MutationResultList},
    sql::FieldValue,
    CoreResult,
};
use content_value::ContentValue;
use futures::future::{BoxFuture, FutureExt};
use query_structure::{DataInput, HasManyInput, HasManyItem, HasOneInput, RelationKind, UniqueWhere};

/// Relation inputs of a row being inserted.
///
/// Owning has-one relations feed the joining column of the insert. Everything else needs the
/// primary key of the new row and runs after the insert.
pub struct CreateInputProcessor<'a> {
    mapper: &'a dyn Mapper,
}

impl<'a> CreateInputProcessor<'a> {
    pub fn new(mapper: &'a dyn Mapper) -> Self {
        CreateInputProcessor { mapper }
    }

    pub fn column(&self, ctx: RelationContext<'a>, input: &'a HasOneInput) -> CoreResult<FieldValue<'a>> {
        match (ctx.kind(), input) {
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Connect(by)) => {
                Ok(connect_owning(self.mapper, ctx, by, None))
            }
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Create(data)) => {
                Ok(create_owning(self.mapper, ctx, data))
            }
            (_, input) => Err(ctx.unsupported(input.operation(), "when creating a row")),
        }
    }

    pub fn has_one(
        &self,
        ctx: RelationContext<'a>,
        input: &'a HasOneInput,
        primary: &ContentValue,
    ) -> CoreResult<BoxFuture<'a, CoreResult<MutationResultList>>> {
        let mapper = self.mapper;
        let primary = primary.clone();

        let operation = match (ctx.kind(), input) {
            (RelationKind::OneHasOneInverse, HasOneInput::Connect(by)) => {
                async move { connect_inverse(mapper, ctx, by, primary).await }.boxed()
            }
            (RelationKind::OneHasOneInverse, HasOneInput::Create(data)) => {
                let target_relation = ctx.paired()?;
                let data = data.clone().with_value(&target_relation.name, primary);

                async move { mapper.insert(ctx.target_entity, &data).await }.boxed()
            }
            (_, input) => return Err(ctx.unsupported(input.operation(), "when creating a row")),
        };

        Ok(under_path(ctx.has_one_path(), operation))
    }

    /// Only connect and create make sense for a row that did not exist before. They behave
    /// exactly like on an existing row.
    pub fn has_many(
        &self,
        ctx: RelationContext<'a>,
        items: &'a [HasManyItem],
        primary: &ContentValue,
    ) -> CoreResult<Vec<BoxFuture<'a, CoreResult<MutationResultList>>>> {
        if let Some(item) = items
            .iter()
            .find(|item| !matches!(item.input, HasManyInput::Connect(_) | HasManyInput::Create(_)))
        {
            return Err(ctx.unsupported(item.input.operation(), "when creating a row"));
        }

        UpdateInputProcessor::new(self.mapper, primary.clone()).has_many(ctx, items)
    }
}

/// Points the owning row `by` at the new row. The row it pointed at before loses its
/// counterpart: it is deleted when the relation removes orphans, otherwise a required inverse
/// side is a not null violation.
async fn connect_inverse(
    mapper: &dyn Mapper,
    ctx: RelationContext<'_>,
    by: &UniqueWhere,
    primary: ContentValue,
) -> CoreResult<MutationResultList> {
    let target_relation = ctx.paired()?;

    let Some(owner) = mapper.get_primary_value(ctx.target_entity, by).await? else {
        return Ok(vec![MutationResult::not_found(by.clone())]);
    };

    let owner = by_primary(ctx.target_entity, &owner);
    let previous = mapper.select_field(ctx.target_entity, &owner, &target_relation.name).await?;
    let orphan_removal = target_relation.orphan_removal();

    if previous.is_some() && !orphan_removal && !ctx.relation.is_nullable() {
        return Ok(vec![MutationResult::constraint_violation(ConstraintType::NotNull)]);
    }

    let connect = DataInput::new().with_value(&target_relation.name, primary);
    let mut results = mapper.update(ctx.target_entity, &owner, &connect).await?;

    if let Some(orphan) = previous.filter(|_| orphan_removal) {
        tracing::debug!(entity = %ctx.entity.name, relation = %ctx.relation.name, "removing orphaned row");
        results.extend(mapper.delete(ctx.entity, &by_primary(ctx.entity, &orphan)).await?);
    }

    Ok(results)
}
