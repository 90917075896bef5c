use super::{
    client::SqlClient,
    field_values::{FieldValue, FieldValues},
};
use crate::{
    result::{MutationResultList, RowValues},
    CoreResult,
};
use quaint::ast::{Column, ConditionTree, Update};
use query_structure::Entity;

/// Collects the new values of an existing row. The statement is emitted once every deferred
/// value resolved, and skipped when nothing is left to set.
pub struct UpdateBuilder<'a> {
    entity: &'a Entity,
    values: FieldValues<'a>,
}

pub struct UpdateOutcome {
    /// Whether a statement was issued at all.
    pub executed: bool,
    pub affected_rows: u64,
    pub values: RowValues,
    pub results: MutationResultList,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(entity: &'a Entity) -> Self {
        UpdateBuilder {
            entity,
            values: FieldValues::default(),
        }
    }

    pub fn add_field_value(&mut self, field: impl Into<String>, value: FieldValue<'a>) {
        self.values.add(field, value);
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.values.field_names()
    }

    #[tracing::instrument(skip_all, fields(entity = %self.entity.name))]
    pub async fn execute(self, client: &SqlClient<'_>, condition: ConditionTree<'static>) -> CoreResult<UpdateOutcome> {
        let resolved = self.values.resolve().await?;
        let mut update = Update::table(self.entity.table_name.clone());

        for (field, value) in &resolved.values {
            let column = Column::new(self.entity.column_name_of(field)?.to_owned());
            update = update.set(column, value.clone());
        }

        let (executed, affected_rows) = match update.is_empty() {
            true => (false, 0),
            false => (true, client.execute(update.so_that(condition).into()).await?),
        };

        let values = resolved.values.clone();

        Ok(UpdateOutcome {
            executed,
            affected_rows,
            values,
            results: resolved.finish().await?,
        })
    }
}
