use crate::{
    error::CoreError,
    result::{ConstraintType, InputErrorKind, IntoResultList, MutationResult, MutationResultList},
    CoreResult,
};
use futures::future::join_all;
use quaint::error::ErrorKind;
use std::future::Future;

/// Maps an error a client can act on to a result. Everything else stays fatal.
pub fn convert_error(err: &CoreError) -> Option<MutationResult> {
    match err {
        CoreError::ConnectorError(err) => match err.kind() {
            ErrorKind::UniqueConstraintViolation { .. } => {
                Some(MutationResult::constraint_violation(ConstraintType::UniqueKey))
            }
            ErrorKind::NullConstraintViolation { .. } => {
                Some(MutationResult::constraint_violation(ConstraintType::NotNull))
            }
            ErrorKind::ForeignKeyConstraintViolation { .. } => {
                Some(MutationResult::constraint_violation(ConstraintType::ForeignKey))
            }
            _ => None,
        },
        CoreError::NoResult => Some(MutationResult::no_result()),
        CoreError::NonUniqueWhere { .. } => Some(MutationResult::input_error(
            InputErrorKind::NonUniqueWhere,
            Some(err.to_string()),
        )),
        _ => None,
    }
}

/// The classified form of `err` as the only result, or `err` itself when it is fatal.
pub fn classified(err: CoreError) -> CoreResult<MutationResultList> {
    match convert_error(&err) {
        Some(result) => Ok(vec![result]),
        None => Err(err),
    }
}

/// Splits outcomes into successes and classified failures, keeping their order. The first
/// unclassifiable error is returned, later ones are only logged.
pub(crate) fn classify<T>(outcomes: Vec<CoreResult<T>>) -> CoreResult<Vec<Result<T, MutationResult>>> {
    let mut classified = Vec::with_capacity(outcomes.len());
    let mut fatal = None;

    for outcome in outcomes {
        match outcome {
            Ok(value) => classified.push(Ok(value)),
            Err(err) => match convert_error(&err) {
                Some(result) => classified.push(Err(result)),
                None if fatal.is_none() => fatal = Some(err),
                None => tracing::error!(error = %err, "Unclassified error in a concurrent mutation"),
            },
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(classified),
    }
}

/// Awaits sibling operations together and flattens their results in input order.
pub async fn collect_results<I, F, R>(operations: I) -> CoreResult<MutationResultList>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = CoreResult<R>>,
    R: IntoResultList,
{
    let outcomes = join_all(operations).await;
    let mut results = Vec::new();

    for outcome in classify(outcomes)? {
        match outcome {
            Ok(list) => results.extend(list.into_result_list()),
            Err(result) => results.push(result),
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{MutationResultType, NothingToDoReason};
    use futures::future::{ready, BoxFuture, FutureExt};
    use pretty_assertions::assert_eq;
    use quaint::{error::DatabaseConstraint, error::Error};
    use tracing_test::traced_test;

    fn unique_violation() -> CoreError {
        let kind = ErrorKind::UniqueConstraintViolation {
            constraint: DatabaseConstraint::Index("post_slug_key".into()),
        };

        CoreError::ConnectorError(Error::builder(kind).build())
    }

    fn operation(outcome: CoreResult<MutationResultList>) -> BoxFuture<'static, CoreResult<MutationResultList>> {
        ready(outcome).boxed()
    }

    #[tokio::test]
    async fn classifiable_errors_become_results() {
        let results = collect_results(vec![
            operation(Ok(vec![MutationResult::nothing_to_do(NothingToDoReason::NoData)])),
            operation(Err(unique_violation())),
            operation(Err(CoreError::NoResult)),
        ])
        .await
        .unwrap();

        let types = results.iter().map(MutationResult::result_type).collect::<Vec<_>>();

        assert_eq!(
            types,
            vec![
                MutationResultType::NothingToDo,
                MutationResultType::ConstraintViolationError,
                MutationResultType::NoResultError,
            ]
        );
    }

    #[tokio::test]
    async fn nested_lists_are_flattened() {
        let nested = ready(Ok::<_, CoreError>(vec![
            vec![MutationResult::no_result()],
            vec![MutationResult::no_result(), MutationResult::no_result()],
        ]));

        let results = collect_results(vec![nested]).await.unwrap();

        assert_eq!(results.len(), 3);
    }

    #[traced_test]
    #[tokio::test]
    async fn the_first_fatal_error_wins_and_the_rest_are_logged() {
        let err = collect_results(vec![
            operation(Err(CoreError::ConfigurationError("first".into()))),
            operation(Ok(vec![])),
            operation(Err(CoreError::ConfigurationError("second".into()))),
        ])
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "first");
        assert!(logs_contain("Unclassified error in a concurrent mutation"));
        assert!(logs_contain("second"));
    }

    #[test]
    fn non_unique_where_is_an_input_error() {
        let result = convert_error(&CoreError::non_unique_where("Post", ["title"])).unwrap();

        assert_eq!(result.result_type(), MutationResultType::InputError);
        assert_eq!(
            result.message().unwrap(),
            "Unique where on `Post` does not cover a unique key: title"
        );
    }
}
