use super::{
    client::SqlClient,
    field_values::{FieldValue, FieldValues},
};
use crate::{
    result::{MutationResultList, RowValues},
    CoreResult,
};
use content_value::ContentValue;
use quaint::ast::{Column, Insert};
use query_structure::Entity;

/// Collects the values of a new row and inserts it once every deferred value resolved.
pub struct InsertBuilder<'a> {
    entity: &'a Entity,
    values: FieldValues<'a>,
}

pub struct InsertOutcome {
    /// Primary key returned by the database, `None` if no row was inserted.
    pub primary: Option<ContentValue>,
    pub values: RowValues,
    /// Results of the writes the deferred values performed.
    pub results: MutationResultList,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(entity: &'a Entity) -> Self {
        InsertBuilder {
            entity,
            values: FieldValues::default(),
        }
    }

    pub fn add_field_value(&mut self, field: impl Into<String>, value: FieldValue<'a>) {
        self.values.add(field, value);
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains(field)
    }

    #[tracing::instrument(skip_all, fields(entity = %self.entity.name))]
    pub async fn execute(self, client: &SqlClient<'_>) -> CoreResult<InsertOutcome> {
        let resolved = self.values.resolve().await?;
        let mut insert = Insert::single_into(self.entity.table_name.clone());

        for (field, value) in &resolved.values {
            let column = Column::new(self.entity.column_name_of(field)?.to_owned());
            insert = insert.value(column, value.clone());
        }

        let query = insert
            .build()
            .returning(vec![Column::new(self.entity.primary_column.clone())]);

        let rows = client.query(query.into()).await?;
        let primary = rows.into_iter().next().and_then(|row| row.into_single().ok());
        let values = resolved.values.clone();

        Ok(InsertOutcome {
            primary,
            values,
            results: resolved.finish().await?,
        })
    }
}
