//! Top-level create, update and delete mutations.

use crate::{
    acl::PredicateFactory,
    mapper::Mapper,
    result::{ConstraintType, InputErrorKind, MutationResult, MutationResultKind, MutationResultList, PathSegment},
    settings::MutationSettings,
    sql::{SqlClient, SqlMapper},
    CoreResult,
};
use quaint::connector::{DefaultTransaction, Queryable};
use query_structure::{DataInput, Schema, UniqueWhere};
use serde::Serialize;

/// Outcome of one top-level mutation as handed to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationResponse {
    /// `true` when every result is `ok` or `nothingToDo`.
    pub ok: bool,
    pub errors: Vec<MutationError>,
    #[serde(skip)]
    pub results: MutationResultList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationError {
    #[serde(rename = "type")]
    pub error_type: MutationErrorType,
    pub message: Option<String>,
    pub path: Vec<PathSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MutationErrorType {
    NotNullConstraintViolation,
    UniqueConstraintViolation,
    ForeignKeyConstraintViolation,
    NotFoundOrDenied,
    NonUniqueWhereInput,
}

impl MutationResponse {
    pub fn from_results(results: MutationResultList) -> Self {
        let errors: Vec<_> = results.iter().filter_map(MutationError::from_result).collect();

        MutationResponse {
            ok: errors.is_empty(),
            errors,
            results,
        }
    }
}

impl MutationError {
    fn from_result(result: &MutationResult) -> Option<Self> {
        let error_type = match &result.kind {
            MutationResultKind::NotFound { .. } | MutationResultKind::NoResult => MutationErrorType::NotFoundOrDenied,
            MutationResultKind::ConstraintViolation { constraint } => match constraint {
                ConstraintType::NotNull => MutationErrorType::NotNullConstraintViolation,
                ConstraintType::UniqueKey => MutationErrorType::UniqueConstraintViolation,
                ConstraintType::ForeignKey => MutationErrorType::ForeignKeyConstraintViolation,
            },
            MutationResultKind::InputError {
                kind: InputErrorKind::NonUniqueWhere,
                ..
            } => MutationErrorType::NonUniqueWhereInput,
            _ => return None,
        };

        Some(MutationError {
            error_type,
            message: result.message(),
            path: result.path.clone(),
        })
    }
}

/// A transaction around one top-level mutation. Only a response without errors is committed.
pub struct MutationTransaction<'a> {
    tx: DefaultTransaction<'a>,
}

impl<'a> MutationTransaction<'a> {
    #[tracing::instrument(skip_all, fields(isolation_level = %settings.isolation_level))]
    pub async fn begin(db: &'a dyn Queryable, settings: &MutationSettings) -> CoreResult<Self> {
        let tx = DefaultTransaction::new(db, Some(settings.isolation_level)).await?;

        Ok(MutationTransaction { tx })
    }

    pub fn queryable(&self) -> &dyn Queryable {
        self.tx.as_queryable()
    }

    pub async fn finish(self, outcome: CoreResult<MutationResponse>) -> CoreResult<MutationResponse> {
        match outcome {
            Ok(response) if response.ok => {
                self.tx.commit().await?;
                Ok(response)
            }
            Ok(response) => {
                tracing::debug!(errors = response.errors.len(), "rolling back a failed mutation");
                self.tx.rollback().await?;
                Ok(response)
            }
            Err(err) => {
                if let Err(rollback) = self.tx.rollback().await {
                    tracing::error!(error = %rollback, "Rollback after a fatal mutation error failed");
                }

                Err(err)
            }
        }
    }
}

/// Runs mutations given as GraphQL input objects, each one in a transaction of its own.
pub struct MutationResolver<'a> {
    schema: &'a Schema,
    predicates: &'a dyn PredicateFactory,
    settings: MutationSettings,
}

impl<'a> MutationResolver<'a> {
    pub fn new(schema: &'a Schema, predicates: &'a dyn PredicateFactory, settings: MutationSettings) -> Self {
        MutationResolver {
            schema,
            predicates,
            settings,
        }
    }

    pub fn settings(&self) -> &MutationSettings {
        &self.settings
    }

    #[tracing::instrument(skip(self, db, data))]
    pub async fn create(&self, db: &dyn Queryable, entity: &str, data: &serde_json::Value) -> CoreResult<MutationResponse> {
        let entity = self.schema.entity(entity)?;
        let data = DataInput::from_json(self.schema, entity, data)?;

        let tx = MutationTransaction::begin(db, &self.settings).await?;
        let outcome = self.mapper(&tx).insert(entity, &data).await;

        tx.finish(outcome.map(MutationResponse::from_results)).await
    }

    #[tracing::instrument(skip(self, db, by, data))]
    pub async fn update(
        &self,
        db: &dyn Queryable,
        entity: &str,
        by: &serde_json::Value,
        data: &serde_json::Value,
    ) -> CoreResult<MutationResponse> {
        let entity = self.schema.entity(entity)?;
        let by = UniqueWhere::from_json(self.schema, entity, by)?;
        let data = DataInput::from_json(self.schema, entity, data)?;

        let tx = MutationTransaction::begin(db, &self.settings).await?;
        let outcome = self.mapper(&tx).update(entity, &by, &data).await;

        tx.finish(outcome.map(MutationResponse::from_results)).await
    }

    #[tracing::instrument(skip(self, db, by))]
    pub async fn delete(&self, db: &dyn Queryable, entity: &str, by: &serde_json::Value) -> CoreResult<MutationResponse> {
        let entity = self.schema.entity(entity)?;
        let by = UniqueWhere::from_json(self.schema, entity, by)?;

        let tx = MutationTransaction::begin(db, &self.settings).await?;
        let outcome = self.mapper(&tx).delete(entity, &by).await;

        tx.finish(outcome.map(MutationResponse::from_results)).await
    }

    fn mapper<'m>(&'m self, tx: &'m MutationTransaction<'_>) -> SqlMapper<'m> {
        let client = SqlClient::new(tx.queryable(), self.settings.log_queries);
        SqlMapper::new(self.schema, client, self.predicates, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::NothingToDoReason;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nothing_to_do_does_not_fail_the_response() {
        let response = MutationResponse::from_results(vec![MutationResult::nothing_to_do(NothingToDoReason::NoData)]);

        assert!(response.ok);
        assert!(response.errors.is_empty());
    }

    #[test]
    fn errors_keep_their_path() {
        let results = vec![
            MutationResult::nothing_to_do(NothingToDoReason::EmptyRelation),
            MutationResult::not_found(UniqueWhere::by("id", 5)).with_path_prefix(&[
                PathSegment::field("posts"),
                PathSegment::index(1, Some("second".to_owned())),
            ]),
        ];

        let response = MutationResponse::from_results(results);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "ok": false,
                "errors": [{
                    "type": "NotFoundOrDenied",
                    "message": "Entity not found or access denied for {\"id\":5}",
                    "path": [{ "field": "posts" }, { "index": 1, "alias": "second" }]
                }]
            })
        );
    }
}
