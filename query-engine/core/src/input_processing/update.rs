use super::{
    by_primary, connect_owning, create_owning, found, not_null, resolve_under_path, under_path, RelationContext, Step,
};
use crate::{
    mapper::Mapper,
    result::{insert_primary, MutationResult, MutationResultKind, MutationResultList, NothingToDoReason},
    sql::{FieldValue, Resolved},
    CoreResult,
};
use content_value::ContentValue;
use futures::future::{BoxFuture, FutureExt};
use query_structure::{DataInput, HasManyInput, HasManyItem, HasOneInput, Relation, RelationKind, UniqueWhere};

/// Relation inputs of an existing row, identified by its primary key.
pub struct UpdateInputProcessor<'a> {
    mapper: &'a dyn Mapper,
    primary: ContentValue,
}

impl<'a> UpdateInputProcessor<'a> {
    pub fn new(mapper: &'a dyn Mapper, primary: ContentValue) -> Self {
        UpdateInputProcessor { mapper, primary }
    }

    pub fn has_one(&self, ctx: RelationContext<'a>, input: &'a HasOneInput) -> CoreResult<Step<'a>> {
        let mapper = self.mapper;
        let primary = self.primary.clone();
        let path = ctx.has_one_path();

        let step = match (ctx.kind(), input) {
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Connect(by)) => {
                Step::Column(connect_owning(mapper, ctx, by, Some(primary)))
            }
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Create(data)) => {
                Step::Column(create_owning(mapper, ctx, data))
            }
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Update(data)) => {
                Step::Run(under_path(path, async move {
                    let this = by_primary(ctx.entity, &primary);

                    match mapper.select_field(ctx.entity, &this, &ctx.relation.name).await? {
                        Some(target) => mapper.update(ctx.target_entity, &by_primary(ctx.target_entity, &target), data).await,
                        None => Ok(vec![MutationResult::nothing_to_do(NothingToDoReason::EmptyRelation)]),
                    }
                }))
            }
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Upsert { create, update }) => {
                Step::Column(resolve_under_path(path, async move {
                    let this = by_primary(ctx.entity, &primary);

                    match mapper.select_field(ctx.entity, &this, &ctx.relation.name).await? {
                        Some(target) => {
                            let by = by_primary(ctx.target_entity, &target);
                            Ok(Resolved::skip(mapper.update(ctx.target_entity, &by, update).await?))
                        }
                        None => {
                            let results = mapper.insert(ctx.target_entity, create).await?;

                            Ok(Resolved {
                                value: insert_primary(&results).cloned(),
                                results,
                                after_execute: None,
                            })
                        }
                    }
                }))
            }
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Delete) => {
                if !ctx.relation.is_nullable() {
                    return Ok(not_null(path));
                }

                Step::Column(resolve_under_path(path, async move {
                    let this = by_primary(ctx.entity, &primary);

                    let Some(target) = mapper.select_field(ctx.entity, &this, &ctx.relation.name).await? else {
                        return Ok(Resolved {
                            value: Some(ContentValue::Null),
                            results: vec![MutationResult::nothing_to_do(NothingToDoReason::EmptyRelation)],
                            after_execute: None,
                        });
                    };

                    // Runs once the row no longer references the target.
                    let delete = async move { mapper.delete(ctx.target_entity, &by_primary(ctx.target_entity, &target)).await };

                    Ok(Resolved {
                        value: Some(ContentValue::Null),
                        results: Vec::new(),
                        after_execute: Some(delete.boxed()),
                    })
                }))
            }
            (RelationKind::ManyHasOne | RelationKind::OneHasOneOwning, HasOneInput::Disconnect) => {
                if !ctx.relation.is_nullable() {
                    return Ok(not_null(path));
                }

                Step::Column(FieldValue::Value(ContentValue::Null))
            }
            (RelationKind::OneHasOneInverse, input) => Step::Run(under_path(path, self.one_has_one_inverse(ctx, input)?)),
            (_, input) => return Err(ctx.unsupported(input.operation(), "as a has-one input")),
        };

        Ok(step)
    }

    pub fn has_many(
        &self,
        ctx: RelationContext<'a>,
        items: &'a [HasManyItem],
    ) -> CoreResult<Vec<BoxFuture<'a, CoreResult<MutationResultList>>>> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let operation = match ctx.kind() {
                    RelationKind::OneHasMany => self.one_has_many(ctx, &item.input)?,
                    RelationKind::ManyHasManyOwning | RelationKind::ManyHasManyInverse => {
                        self.many_has_many(ctx, &item.input)
                    }
                    _ => return Err(ctx.unsupported(item.input.operation(), "as a has-many input")),
                };

                Ok(under_path(ctx.has_many_path(index, item.alias.as_ref()), operation))
            })
            .collect()
    }

    /// The inverse side lives on the other table, so every operation is an update of the target
    /// row pointing at this one.
    fn one_has_one_inverse(
        &self,
        ctx: RelationContext<'a>,
        input: &'a HasOneInput,
    ) -> CoreResult<BoxFuture<'a, CoreResult<MutationResultList>>> {
        let mapper = self.mapper;
        let target_relation = ctx.paired()?;
        let pointing_here = self.pointing_here(ctx, target_relation, UniqueWhere::new());
        let link = self.link(target_relation);

        let operation = match input {
            HasOneInput::Connect(by) => {
                let connect = DataInput::new().with_one(
                    &target_relation.name,
                    HasOneInput::Connect(by_primary(ctx.entity, &self.primary)),
                );

                async move { mapper.update(ctx.target_entity, by, &connect).await }.boxed()
            }
            HasOneInput::Create(data) => async move {
                let disconnect = DataInput::new().with_one(&target_relation.name, HasOneInput::Disconnect);
                let mut results: MutationResultList = mapper
                    .update(ctx.target_entity, &pointing_here, &disconnect)
                    .await?
                    .into_iter()
                    .filter(|result| !matches!(result.kind, MutationResultKind::NotFound { .. }))
                    .collect();

                results.extend(mapper.insert(ctx.target_entity, &link(data)).await?);

                Ok(results)
            }
            .boxed(),
            HasOneInput::Update(data) => async move { mapper.update(ctx.target_entity, &pointing_here, data).await }.boxed(),
            HasOneInput::Upsert { create, update } => async move {
                match found(mapper.update(ctx.target_entity, &pointing_here, update).await?) {
                    Some(results) => Ok(results),
                    None => mapper.insert(ctx.target_entity, &link(create)).await,
                }
            }
            .boxed(),
            HasOneInput::Delete => async move { mapper.delete(ctx.target_entity, &pointing_here).await }.boxed(),
            HasOneInput::Disconnect => async move {
                let disconnect = DataInput::new().with_one(&target_relation.name, HasOneInput::Disconnect);
                mapper.update(ctx.target_entity, &pointing_here, &disconnect).await
            }
            .boxed(),
        };

        Ok(operation)
    }

    fn one_has_many(
        &self,
        ctx: RelationContext<'a>,
        input: &'a HasManyInput,
    ) -> CoreResult<BoxFuture<'a, CoreResult<MutationResultList>>> {
        let mapper = self.mapper;
        let target_relation = ctx.paired()?;
        let link = self.link(target_relation);

        let operation = match input {
            HasManyInput::Connect(by) => {
                let connect = link(&DataInput::new());
                async move { mapper.update(ctx.target_entity, by, &connect).await }.boxed()
            }
            HasManyInput::Create(data) => async move { mapper.insert(ctx.target_entity, &link(data)).await }.boxed(),
            HasManyInput::Update { by, data } => {
                let by = self.pointing_here(ctx, target_relation, by.clone());
                async move { mapper.update(ctx.target_entity, &by, data).await }.boxed()
            }
            HasManyInput::Upsert { by, update, create } => {
                let by = self.pointing_here(ctx, target_relation, by.clone());

                async move {
                    match found(mapper.update(ctx.target_entity, &by, update).await?) {
                        Some(results) => Ok(results),
                        None => mapper.insert(ctx.target_entity, &link(create)).await,
                    }
                }
                .boxed()
            }
            HasManyInput::Delete(by) => {
                let by = self.pointing_here(ctx, target_relation, by.clone());
                async move { mapper.delete(ctx.target_entity, &by).await }.boxed()
            }
            HasManyInput::Disconnect(by) => {
                let by = self.pointing_here(ctx, target_relation, by.clone());
                let disconnect = DataInput::new().with_one(&target_relation.name, HasOneInput::Disconnect);

                async move { mapper.update(ctx.target_entity, &by, &disconnect).await }.boxed()
            }
        };

        Ok(operation)
    }

    fn many_has_many(
        &self,
        ctx: RelationContext<'a>,
        input: &'a HasManyInput,
    ) -> BoxFuture<'a, CoreResult<MutationResultList>> {
        let mapper = self.mapper;
        let junction = Junction {
            mapper,
            ctx,
            primary: self.primary.clone(),
        };

        match input {
            HasManyInput::Connect(by) => async move {
                match mapper.get_primary_value(ctx.target_entity, by).await? {
                    Some(target) => junction.connect(&target).await,
                    None => Ok(vec![MutationResult::not_found(by.clone())]),
                }
            }
            .boxed(),
            HasManyInput::Create(data) => async move { junction.insert_and_connect(data).await }.boxed(),
            HasManyInput::Update { by, data } => async move {
                let Some(target) = mapper.get_primary_value(ctx.target_entity, by).await? else {
                    return Ok(vec![MutationResult::not_found(by.clone())]);
                };

                let mut results = mapper.update(ctx.target_entity, &by_primary(ctx.target_entity, &target), data).await?;
                results.extend(junction.connect(&target).await?);

                Ok(results)
            }
            .boxed(),
            HasManyInput::Upsert { by, update, create } => async move {
                let Some(target) = mapper.get_primary_value(ctx.target_entity, by).await? else {
                    return junction.insert_and_connect(create).await;
                };

                let mut results = mapper
                    .update(ctx.target_entity, &by_primary(ctx.target_entity, &target), update)
                    .await?;
                results.extend(junction.connect(&target).await?);

                Ok(results)
            }
            .boxed(),
            HasManyInput::Delete(by) => async move { mapper.delete(ctx.target_entity, by).await }.boxed(),
            HasManyInput::Disconnect(by) => async move {
                match mapper.get_primary_value(ctx.target_entity, by).await? {
                    Some(target) => junction.disconnect(&target).await,
                    None => Ok(vec![MutationResult::not_found(by.clone())]),
                }
            }
            .boxed(),
        }
    }

    /// `by`, restricted to target rows whose `target_relation` points at this row.
    fn pointing_here(&self, ctx: RelationContext<'a>, target_relation: &Relation, by: UniqueWhere) -> UniqueWhere {
        by.with_relation(&target_relation.name, by_primary(ctx.entity, &self.primary))
    }

    /// Adds the link to this row to data of a target row.
    fn link(&self, target_relation: &'a Relation) -> impl Fn(&DataInput) -> DataInput + Send + Sync + 'a {
        let primary = self.primary.clone();
        move |data: &DataInput| data.clone().with_value(&target_relation.name, primary.clone())
    }
}

/// Junction rows between this row and targets of a many-to-many relation, written from the
/// owning side whichever side the input came from.
struct Junction<'a> {
    mapper: &'a dyn Mapper,
    ctx: RelationContext<'a>,
    primary: ContentValue,
}

impl Junction<'_> {
    async fn connect(&self, target: &ContentValue) -> CoreResult<MutationResultList> {
        match self.ctx.kind() {
            RelationKind::ManyHasManyOwning => {
                self.mapper
                    .connect_junction(self.ctx.entity, self.ctx.relation, &self.primary, target)
                    .await
            }
            _ => {
                let owning = self.ctx.paired()?;
                self.mapper
                    .connect_junction(self.ctx.target_entity, owning, target, &self.primary)
                    .await
            }
        }
    }

    async fn disconnect(&self, target: &ContentValue) -> CoreResult<MutationResultList> {
        match self.ctx.kind() {
            RelationKind::ManyHasManyOwning => {
                self.mapper
                    .disconnect_junction(self.ctx.entity, self.ctx.relation, &self.primary, target)
                    .await
            }
            _ => {
                let owning = self.ctx.paired()?;
                self.mapper
                    .disconnect_junction(self.ctx.target_entity, owning, target, &self.primary)
                    .await
            }
        }
    }

    async fn insert_and_connect(&self, data: &DataInput) -> CoreResult<MutationResultList> {
        let mut results = self.mapper.insert(self.ctx.target_entity, data).await?;

        if let Some(target) = insert_primary(&results).cloned() {
            results.extend(self.connect(&target).await?);
        }

        Ok(results)
    }
}
