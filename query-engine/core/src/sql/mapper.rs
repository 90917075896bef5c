use super::{
    client::SqlClient,
    delete_executor::DeleteExecutor,
    field_values::FieldValue,
    insert_builder::InsertBuilder,
    unique_where_expander::expand_unique_where,
    update_builder::UpdateBuilder,
    where_builder::WhereBuilder,
};
use crate::{
    acl::{AclOperation, PredicateFactory},
    collect::{classified, collect_results},
    input_processing::{by_primary, CreateInputProcessor, RelationContext, Step, UpdateInputProcessor},
    mapper::Mapper,
    result::{MutationResult, MutationResultList, NothingToDoReason},
    settings::MutationSettings,
    CoreResult,
};
use async_trait::async_trait;
use content_value::ContentValue;
use futures::future::BoxFuture;
use quaint::ast::{Column, Comparable, Conjunctive, Delete, Insert, OnConflict, Select};
use query_structure::{
    ColumnType, DataInput, DomainError, Entity, FieldInput, HasManyItem, HasOneInput, Relation, Schema, UniqueWhere,
    Where,
};
use uuid::Uuid;

/// [`Mapper`] writing to PostgreSQL through one connection, usually the one of the surrounding
/// [`MutationTransaction`](crate::MutationTransaction).
pub struct SqlMapper<'a> {
    schema: &'a Schema,
    client: SqlClient<'a>,
    predicates: &'a dyn PredicateFactory,
    settings: &'a MutationSettings,
}

/// A relation input that can only run once the primary key of the new row is known.
enum AfterInsert<'a> {
    HasOne(RelationContext<'a>, &'a HasOneInput),
    HasMany(RelationContext<'a>, &'a [HasManyItem]),
}

impl<'a> SqlMapper<'a> {
    pub fn new(
        schema: &'a Schema,
        client: SqlClient<'a>,
        predicates: &'a dyn PredicateFactory,
        settings: &'a MutationSettings,
    ) -> Self {
        SqlMapper {
            schema,
            client,
            predicates,
            settings,
        }
    }

    fn where_builder(&self) -> WhereBuilder<'a> {
        WhereBuilder::new(self.schema)
    }

    /// Reads a single column of the row matching `filter`, as allowed by the read predicate.
    async fn select_column(&self, entity: &Entity, filter: Where, field: &str) -> CoreResult<Option<ContentValue>> {
        let predicate = self.predicates.create(entity, AclOperation::Read, &[field]);
        let condition = self.where_builder().build(entity, &filter.and_with(predicate))?;

        let query = Select::from_table(entity.table_name.clone())
            .column(Column::new(entity.column_name_of(field)?.to_owned()))
            .so_that(condition)
            .limit(1);

        let value = match self.client.query(query.into()).await?.into_iter().next() {
            Some(row) => row.into_single()?,
            None => return Ok(None),
        };

        Ok(Some(value).filter(|value| *value != ContentValue::Null))
    }

    fn junction_columns<'r>(
        &self,
        owner: &Entity,
        relation: &'r Relation,
    ) -> CoreResult<(&'r str, &'r str, &'r str)> {
        let junction = relation
            .joining_table()
            .ok_or_else(|| DomainError::invalid_relation(&owner.name, &relation.name, "missing junction table"))?;

        Ok((
            &junction.table_name,
            &junction.joining_column.column_name,
            &junction.inverse_joining_column.column_name,
        ))
    }
}

#[async_trait]
impl Mapper for SqlMapper<'_> {
    #[tracing::instrument(skip(self, entity, data), fields(entity = %entity.name))]
    async fn insert(&self, entity: &Entity, data: &DataInput) -> CoreResult<MutationResultList> {
        let processor = CreateInputProcessor::new(self);
        let mut builder = InsertBuilder::new(entity);
        let mut after_insert = Vec::new();

        for (field, input) in data.iter() {
            match input {
                FieldInput::Value(value) => builder.add_field_value(field.clone(), FieldValue::Value(value.clone())),
                FieldInput::HasOne(input) => {
                    let ctx = RelationContext::new(self.schema, entity, entity.relation(field)?)?;

                    if ctx.kind().has_joining_column() {
                        builder.add_field_value(field.clone(), processor.column(ctx, input)?);
                    } else {
                        after_insert.push(AfterInsert::HasOne(ctx, input));
                    }
                }
                FieldInput::HasMany(items) => {
                    let ctx = RelationContext::new(self.schema, entity, entity.relation(field)?)?;
                    after_insert.push(AfterInsert::HasMany(ctx, items));
                }
            }
        }

        if !builder.has_field(&entity.primary) && entity.primary_column_def()?.column_type == ColumnType::Uuid {
            builder.add_field_value(entity.primary.clone(), FieldValue::Value(ContentValue::Uuid(Uuid::new_v4())));
        }

        let outcome = match builder.execute(&self.client).await {
            Ok(outcome) => outcome,
            Err(err) => return classified(err),
        };

        let Some(primary) = outcome.primary else {
            let mut results = vec![MutationResult::no_result()];
            results.extend(outcome.results);
            return Ok(results);
        };

        let mut operations: Vec<BoxFuture<'_, CoreResult<MutationResultList>>> = Vec::new();

        for pending in after_insert {
            match pending {
                AfterInsert::HasOne(ctx, input) => operations.push(processor.has_one(ctx, input, &primary)?),
                AfterInsert::HasMany(ctx, items) => operations.extend(processor.has_many(ctx, items, &primary)?),
            }
        }

        let mut results = vec![MutationResult::create_ok(entity, primary, outcome.values)];
        results.extend(outcome.results);
        results.extend(collect_results(operations).await?);

        Ok(results)
    }

    #[tracing::instrument(skip(self, entity, by, data), fields(entity = %entity.name))]
    async fn update(&self, entity: &Entity, by: &UniqueWhere, data: &DataInput) -> CoreResult<MutationResultList> {
        let filter = match expand_unique_where(entity, by) {
            Ok(filter) => filter,
            Err(err) => return classified(err),
        };

        let Some(primary) = self.select_column(entity, filter, &entity.primary).await? else {
            return Ok(vec![MutationResult::not_found(by.clone())]);
        };

        if data.is_empty() {
            return Ok(vec![MutationResult::nothing_to_do(NothingToDoReason::NoData)]);
        }

        let processor = UpdateInputProcessor::new(self, primary.clone());
        let mut builder = UpdateBuilder::new(entity);
        let mut operations = Vec::new();

        for (field, input) in data.iter() {
            match input {
                FieldInput::Value(value) => builder.add_field_value(field.clone(), FieldValue::Value(value.clone())),
                FieldInput::HasOne(input) => {
                    let ctx = RelationContext::new(self.schema, entity, entity.relation(field)?)?;

                    match processor.has_one(ctx, input)? {
                        Step::Column(value) => builder.add_field_value(field.clone(), value),
                        Step::Run(operation) => operations.push(operation),
                    }
                }
                FieldInput::HasMany(items) => {
                    let ctx = RelationContext::new(self.schema, entity, entity.relation(field)?)?;
                    operations.extend(processor.has_many(ctx, items)?);
                }
            }
        }

        let predicate = self.predicates.create(entity, AclOperation::Update, &builder.field_names());
        let condition = self
            .where_builder()
            .build(entity, &by_primary(entity, &primary).to_where().and_with(predicate))?;

        let (outcome, related) = futures::join!(builder.execute(&self.client, condition), collect_results(operations));

        let mut results = match outcome {
            Ok(outcome) if outcome.executed && outcome.affected_rows == 0 => {
                let mut results = vec![MutationResult::no_result()];
                results.extend(outcome.results);
                results
            }
            Ok(outcome) => {
                let mut results = vec![MutationResult::update_ok(entity, primary, outcome.values)];
                results.extend(outcome.results);
                results
            }
            Err(err) => classified(err)?,
        };

        results.extend(related?);

        Ok(results)
    }

    #[tracing::instrument(skip(self, entity, by), fields(entity = %entity.name))]
    async fn delete(&self, entity: &Entity, by: &UniqueWhere) -> CoreResult<MutationResultList> {
        let filter = match expand_unique_where(entity, by) {
            Ok(filter) => filter,
            Err(err) => return classified(err),
        };

        let executor = DeleteExecutor::new(self.schema, self.client, self.predicates, self.settings.defer_constraints);

        match executor.execute(entity, &filter).await {
            Ok(deleted) => Ok(deleted
                .into_iter()
                .map(|primary| MutationResult::delete_ok(entity, primary))
                .collect()),
            Err(err) => classified(err),
        }
    }

    async fn select_field(&self, entity: &Entity, by: &UniqueWhere, field: &str) -> CoreResult<Option<ContentValue>> {
        let filter = expand_unique_where(entity, by)?;
        self.select_column(entity, filter, field).await
    }

    async fn get_primary_value(&self, entity: &Entity, by: &UniqueWhere) -> CoreResult<Option<ContentValue>> {
        self.select_field(entity, by, &entity.primary).await
    }

    async fn connect_junction(
        &self,
        owner: &Entity,
        relation: &Relation,
        owner_primary: &ContentValue,
        inversed_primary: &ContentValue,
    ) -> CoreResult<MutationResultList> {
        let (table, owner_column, inversed_column) = self.junction_columns(owner, relation)?;

        let insert = Insert::single_into(table.to_owned())
            .value(Column::new(owner_column.to_owned()), owner_primary.clone())
            .value(Column::new(inversed_column.to_owned()), inversed_primary.clone())
            .build()
            .on_conflict(OnConflict::DoNothing);

        let result = match self.client.execute(insert.into()).await? {
            0 => MutationResult::nothing_to_do(NothingToDoReason::AlreadyExists),
            _ => MutationResult::junction_update_ok(owner, relation, owner_primary.clone(), inversed_primary.clone()),
        };

        Ok(vec![result])
    }

    async fn disconnect_junction(
        &self,
        owner: &Entity,
        relation: &Relation,
        owner_primary: &ContentValue,
        inversed_primary: &ContentValue,
    ) -> CoreResult<MutationResultList> {
        let (table, owner_column, inversed_column) = self.junction_columns(owner, relation)?;

        let delete = Delete::from_table(table.to_owned()).so_that(
            Column::new(owner_column.to_owned())
                .equals(owner_primary.clone())
                .and(Column::new(inversed_column.to_owned()).equals(inversed_primary.clone())),
        );

        let result = match self.client.execute(delete.into()).await? {
            0 => MutationResult::nothing_to_do(NothingToDoReason::EmptyRelation),
            _ => MutationResult::junction_update_ok(owner, relation, owner_primary.clone(), inversed_primary.clone()),
        };

        Ok(vec![result])
    }
}
