use crate::error::EnvironmentError;
use content_value::ContentValue;
use std::{collections::BTreeMap, sync::Arc};

/// Immutable lookup context for `$variable` references.
///
/// Holds plain names and dimensions (named lists of values, e.g. the selected locales). Deriving
/// a child with [`Environment::with_names`] or [`Environment::with_dimensions`] never affects the
/// parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    names: Arc<BTreeMap<String, ContentValue>>,
    dimensions: Arc<BTreeMap<String, Vec<ContentValue>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create<N, D, K, L>(names: N, dimensions: D) -> Self
    where
        N: IntoIterator<Item = (K, ContentValue)>,
        D: IntoIterator<Item = (L, Vec<ContentValue>)>,
        K: Into<String>,
        L: Into<String>,
    {
        Environment {
            names: Arc::new(names.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            dimensions: Arc::new(dimensions.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    pub fn with_names<N, K>(&self, names: N) -> Self
    where
        N: IntoIterator<Item = (K, ContentValue)>,
        K: Into<String>,
    {
        let mut merged = (*self.names).clone();
        merged.extend(names.into_iter().map(|(k, v)| (k.into(), v)));

        Environment {
            names: Arc::new(merged),
            dimensions: Arc::clone(&self.dimensions),
        }
    }

    pub fn with_dimensions<D, K>(&self, dimensions: D) -> Self
    where
        D: IntoIterator<Item = (K, Vec<ContentValue>)>,
        K: Into<String>,
    {
        let mut merged = (*self.dimensions).clone();
        merged.extend(dimensions.into_iter().map(|(k, v)| (k.into(), v)));

        Environment {
            names: Arc::clone(&self.names),
            dimensions: Arc::new(merged),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn get_value(&self, name: &str) -> Result<&ContentValue, EnvironmentError> {
        self.names
            .get(name)
            .ok_or_else(|| EnvironmentError::UndefinedVariable(name.to_owned()))
    }

    pub fn get_value_or_none(&self, name: &str) -> Option<&ContentValue> {
        self.names.get(name)
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn get_dimension(&self, name: &str) -> Result<&[ContentValue], EnvironmentError> {
        self.dimensions
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| EnvironmentError::UndefinedDimension(name.to_owned()))
    }

    pub fn get_all_names(&self) -> &BTreeMap<String, ContentValue> {
        &self.names
    }

    /// Resolves a `$name` reference: a plain name wins, otherwise a dimension holding exactly one
    /// value is unwrapped.
    pub fn resolve_variable(&self, name: &str) -> Result<&ContentValue, EnvironmentError> {
        if let Some(value) = self.names.get(name) {
            return Ok(value);
        }

        match self.dimensions.get(name).map(Vec::as_slice) {
            Some([single]) => Ok(single),
            Some(values) => Err(EnvironmentError::AmbiguousDimension {
                name: name.to_owned(),
                count: values.len(),
            }),
            None => Err(EnvironmentError::UndefinedVariable(name.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn children_do_not_leak_into_parents() {
        let parent = Environment::create([("a", ContentValue::Int(1))], [("locale", vec!["en".into()])]);
        let child = parent.with_names([("b", ContentValue::Int(2))]);

        assert!(child.has_name("a"));
        assert!(child.has_name("b"));
        assert!(!parent.has_name("b"));
        assert!(child.has_dimension("locale"));
    }

    #[test]
    fn single_valued_dimensions_resolve_to_their_value() {
        let env = Environment::new().with_dimensions([("locale", vec![ContentValue::from("cs")])]);

        assert_eq!(env.resolve_variable("locale").unwrap(), &ContentValue::from("cs"));
    }

    #[test]
    fn multi_valued_dimensions_are_ambiguous() {
        let env = Environment::new().with_dimensions([("locale", vec!["cs".into(), "en".into()])]);

        let err = env.resolve_variable("locale").unwrap_err();

        assert_eq!(
            err,
            EnvironmentError::AmbiguousDimension {
                name: "locale".to_owned(),
                count: 2
            }
        );
    }

    #[test]
    fn undefined_variables_are_reported() {
        let err = Environment::new().resolve_variable("nope").unwrap_err();

        assert_eq!(err.to_string(), "Undefined variable $nope.");
    }
}
