use crate::{
    collect::{classify, collect_results},
    result::{MutationResultList, RowValues},
    CoreResult,
};
use content_value::ContentValue;
use futures::future::{join_all, BoxFuture};

/// A value of the row being written. Deferred values depend on other writes and are only
/// known once those finished.
pub enum FieldValue<'a> {
    Value(ContentValue),
    Deferred(BoxFuture<'a, CoreResult<Resolved<'a>>>),
}

/// What a deferred value turned out to be.
#[derive(Default)]
pub struct Resolved<'a> {
    /// `None` leaves the column out of the statement.
    pub value: Option<ContentValue>,
    /// Results of the writes performed while resolving.
    pub results: MutationResultList,
    /// Runs after the statement of the row was executed.
    pub after_execute: Option<BoxFuture<'a, CoreResult<MutationResultList>>>,
}

impl<'a> Resolved<'a> {
    pub fn value(value: ContentValue) -> Self {
        Resolved {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn skip(results: MutationResultList) -> Self {
        Resolved {
            results,
            ..Default::default()
        }
    }
}

/// Values collected for one statement, kept in input order.
#[derive(Default)]
pub struct FieldValues<'a> {
    entries: Vec<(String, FieldValue<'a>)>,
}

pub struct ResolvedValues<'a> {
    pub values: RowValues,
    pub results: MutationResultList,
    after_execute: Vec<BoxFuture<'a, CoreResult<MutationResultList>>>,
}

impl<'a> FieldValues<'a> {
    pub fn add(&mut self, field: impl Into<String>, value: FieldValue<'a>) {
        self.entries.push((field.into(), value));
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Awaits every deferred value together. A resolver failing with a classifiable error
    /// reports it as a result and leaves its column out.
    pub async fn resolve(self) -> CoreResult<ResolvedValues<'a>> {
        let mut slots = Vec::with_capacity(self.entries.len());
        let mut pending = Vec::new();

        for (index, (field, value)) in self.entries.into_iter().enumerate() {
            match value {
                FieldValue::Value(value) => slots.push((field, Some(value))),
                FieldValue::Deferred(resolver) => {
                    slots.push((field, None));
                    pending.push(async move { (index, resolver.await) });
                }
            }
        }

        let (indexes, outcomes): (Vec<_>, Vec<_>) = join_all(pending).await.into_iter().unzip();
        let mut results = Vec::new();
        let mut after_execute = Vec::new();

        for (index, outcome) in indexes.into_iter().zip(classify(outcomes)?) {
            match outcome {
                Ok(resolved) => {
                    slots[index].1 = resolved.value;
                    results.extend(resolved.results);
                    after_execute.extend(resolved.after_execute);
                }
                Err(result) => results.push(result),
            }
        }

        let values = slots
            .into_iter()
            .filter_map(|(field, value)| value.map(|value| (field, value)))
            .collect();

        Ok(ResolvedValues {
            values,
            results,
            after_execute,
        })
    }
}

impl ResolvedValues<'_> {
    /// Runs the continuations registered by the resolvers and returns every result.
    pub async fn finish(self) -> CoreResult<MutationResultList> {
        let mut results = self.results;
        results.extend(collect_results(self.after_execute).await?);

        Ok(results)
    }
}
