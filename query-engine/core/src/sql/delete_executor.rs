use super::{client::SqlClient, where_builder::WhereBuilder};
use crate::{
    acl::{AclOperation, PredicateFactory},
    error::CoreError,
    CoreResult,
};
use content_value::ContentValue;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use quaint::ast::{Column, Delete, Update};
use query_structure::{Condition, DomainError, Entity, OnDelete, Relation, Schema, Where};

const DEFER_CONSTRAINTS: &str = "SET CONSTRAINTS ALL DEFERRED";
const IMMEDIATE_CONSTRAINTS: &str = "SET CONSTRAINTS ALL IMMEDIATE";

/// Deletes rows and walks the relations pointing at them according to their `on delete`
/// behavior: cascade deletes the owning rows recursively, set null clears their joining column
/// and restrict leaves them for the deferred constraint check to reject.
pub struct DeleteExecutor<'a> {
    schema: &'a Schema,
    client: SqlClient<'a>,
    predicates: &'a dyn PredicateFactory,
    defer_constraints: bool,
}

impl<'a> DeleteExecutor<'a> {
    pub fn new(
        schema: &'a Schema,
        client: SqlClient<'a>,
        predicates: &'a dyn PredicateFactory,
        defer_constraints: bool,
    ) -> Self {
        DeleteExecutor {
            schema,
            client,
            predicates,
            defer_constraints,
        }
    }

    /// Deletes the rows of `entity` matching `filter` and returns their primary keys. Deleting
    /// nothing is a [`CoreError::NoResult`].
    #[tracing::instrument(skip(self, entity, filter), fields(entity = %entity.name))]
    pub async fn execute(&self, entity: &Entity, filter: &Where) -> CoreResult<Vec<ContentValue>> {
        if self.defer_constraints {
            self.client.raw_cmd(DEFER_CONSTRAINTS).await?;
        }

        let deleted = self.delete(entity, filter.clone()).await?;

        if deleted.is_empty() {
            return Err(CoreError::NoResult);
        }

        self.execute_cascade(entity, &deleted).await?;

        if self.defer_constraints {
            self.client.raw_cmd(IMMEDIATE_CONSTRAINTS).await?;
        }

        Ok(deleted)
    }

    fn execute_cascade<'b>(&'b self, entity: &'b Entity, primaries: &'b [ContentValue]) -> BoxFuture<'b, CoreResult<()>> {
        async move {
            let branches = self
                .schema
                .owning_relations_to(&entity.name)
                .into_iter()
                .map(|(owning_entity, relation)| self.visit_relation(entity, owning_entity, relation, primaries));

            try_join_all(branches).await?;

            Ok(())
        }
        .boxed()
    }

    async fn visit_relation(
        &self,
        entity: &Entity,
        owning_entity: &'a Entity,
        relation: &'a Relation,
        primaries: &[ContentValue],
    ) -> CoreResult<()> {
        let on_delete = relation
            .joining_column()
            .map(|jc| jc.on_delete)
            .ok_or_else(|| DomainError::invalid_relation(&owning_entity.name, &relation.name, "missing joining column"))?;

        let pointing_here = Where::relation(
            relation.name.clone(),
            Where::field(entity.primary.clone(), Condition::In(primaries.to_vec())),
        );

        match on_delete {
            OnDelete::Restrict => Ok(()),
            OnDelete::Cascade => {
                let deleted = self.delete(owning_entity, pointing_here).await?;

                if deleted.is_empty() {
                    return Ok(());
                }

                self.execute_cascade(owning_entity, &deleted).await
            }
            OnDelete::SetNull => self.set_null(owning_entity, relation, pointing_here).await,
        }
    }

    async fn delete(&self, entity: &Entity, filter: Where) -> CoreResult<Vec<ContentValue>> {
        let predicate = self.predicates.create(entity, AclOperation::Delete, &[]);
        let condition = WhereBuilder::new(self.schema).build(entity, &filter.and_with(predicate))?;

        let query = Delete::from_table(entity.table_name.clone())
            .so_that(condition)
            .returning(vec![Column::new(entity.primary_column.clone())]);

        let rows = self.client.query(query.into()).await?;

        Ok(rows.column_values(&entity.primary_column)?)
    }

    async fn set_null(&self, entity: &Entity, relation: &Relation, filter: Where) -> CoreResult<()> {
        let predicate = self.predicates.create(entity, AclOperation::Update, &[&relation.name]);
        let condition = WhereBuilder::new(self.schema).build(entity, &filter.and_with(predicate))?;

        let query = Update::table(entity.table_name.clone())
            .set(Column::new(entity.column_name_of(&relation.name)?.to_owned()), ContentValue::Null)
            .so_that(condition);

        let updated = self.client.execute(query.into()).await?;
        tracing::debug!(entity = %entity.name, relation = %relation.name, updated, "cleared references of deleted rows");

        Ok(())
    }
}

