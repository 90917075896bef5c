use crate::InputError;
use content_value::ContentValue;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A condition on a single column. Every node carries exactly one operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Equals(ContentValue),
    NotEquals(ContentValue),
    LessThan(ContentValue),
    LessThanOrEquals(ContentValue),
    GreaterThan(ContentValue),
    GreaterThanOrEquals(ContentValue),
    In(Vec<ContentValue>),
    NotIn(Vec<ContentValue>),
    IsNull(bool),
    /// Legacy spelling of `IsNull`, produced by `= null` / `!= null` in the query language.
    Null(bool),
    Never,
    Always,
}

impl Condition {
    pub fn operator(&self) -> &'static str {
        match self {
            Condition::And(_) => "and",
            Condition::Or(_) => "or",
            Condition::Not(_) => "not",
            Condition::Equals(_) => "eq",
            Condition::NotEquals(_) => "notEq",
            Condition::LessThan(_) => "lt",
            Condition::LessThanOrEquals(_) => "lte",
            Condition::GreaterThan(_) => "gt",
            Condition::GreaterThanOrEquals(_) => "gte",
            Condition::In(_) => "in",
            Condition::NotIn(_) => "notIn",
            Condition::IsNull(_) => "isNull",
            Condition::Null(_) => "null",
            Condition::Never => "never",
            Condition::Always => "always",
        }
    }

    /// Builds a condition from its object form, e.g. `{"gt": 20}`.
    /// An empty object imposes no restriction.
    pub fn from_json(value: &serde_json::Value) -> Result<Condition, InputError> {
        let object = value
            .as_object()
            .ok_or_else(|| InputError::malformed("condition", "expected an object"))?;

        let mut entries = object.iter();

        let Some((operator, argument)) = entries.next() else {
            return Ok(Condition::Always);
        };

        if entries.next().is_some() {
            return Err(InputError::MultipleConditionOperators);
        }

        let value = || ContentValue::try_from(argument.clone()).map_err(InputError::from);
        let list = || match argument {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| ContentValue::try_from(item.clone()).map_err(InputError::from))
                .collect::<Result<Vec<_>, _>>(),
            _ => Err(InputError::malformed(operator.as_str(), "expected a list of values")),
        };
        let flag = || {
            argument
                .as_bool()
                .ok_or_else(|| InputError::malformed(operator.as_str(), "expected a boolean"))
        };
        let nested = || match argument {
            serde_json::Value::Array(items) => items.iter().map(Condition::from_json).collect::<Result<Vec<_>, _>>(),
            _ => Err(InputError::malformed(operator.as_str(), "expected a list of conditions")),
        };

        let condition = match operator.as_str() {
            "and" => Condition::And(nested()?),
            "or" => Condition::Or(nested()?),
            "not" => Condition::Not(Box::new(Condition::from_json(argument)?)),
            "eq" => Condition::Equals(value()?),
            "notEq" => Condition::NotEquals(value()?),
            "lt" => Condition::LessThan(value()?),
            "lte" => Condition::LessThanOrEquals(value()?),
            "gt" => Condition::GreaterThan(value()?),
            "gte" => Condition::GreaterThanOrEquals(value()?),
            "in" => Condition::In(list()?),
            "notIn" => Condition::NotIn(list()?),
            "isNull" => Condition::IsNull(flag()?),
            "null" => Condition::Null(flag()?),
            "never" => Condition::Never,
            "always" => Condition::Always,
            other => return Err(InputError::UnknownConditionOperator(other.to_owned())),
        };

        Ok(condition)
    }
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        let operator = self.operator();

        match self {
            Condition::And(conditions) | Condition::Or(conditions) => map.serialize_entry(operator, conditions)?,
            Condition::Not(condition) => map.serialize_entry(operator, condition)?,
            Condition::Equals(v)
            | Condition::NotEquals(v)
            | Condition::LessThan(v)
            | Condition::LessThanOrEquals(v)
            | Condition::GreaterThan(v)
            | Condition::GreaterThanOrEquals(v) => map.serialize_entry(operator, v)?,
            Condition::In(values) | Condition::NotIn(values) => map.serialize_entry(operator, values)?,
            Condition::IsNull(flag) | Condition::Null(flag) => map.serialize_entry(operator, flag)?,
            Condition::Never | Condition::Always => map.serialize_entry(operator, &true)?,
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn two_operators_on_one_condition_are_rejected() {
        let err = Condition::from_json(&json!({ "gt": 1, "lt": 5 })).unwrap_err();

        assert_eq!(err, InputError::MultipleConditionOperators);
    }

    #[test]
    fn nested_conditions_are_built_recursively() {
        let condition = Condition::from_json(&json!({ "or": [{ "lt": 1 }, { "not": { "in": [5, 6] } }] })).unwrap();

        assert_eq!(
            condition,
            Condition::Or(vec![
                Condition::LessThan(ContentValue::Int(1)),
                Condition::Not(Box::new(Condition::In(vec![ContentValue::Int(5), ContentValue::Int(6)]))),
            ])
        );
    }

    #[test]
    fn empty_condition_imposes_nothing() {
        assert_eq!(Condition::from_json(&json!({})).unwrap(), Condition::Always);
    }

    #[test]
    fn unknown_operators_are_reported() {
        let err = Condition::from_json(&json!({ "like": "a%" })).unwrap_err();

        assert_eq!(err.to_string(), "Unknown condition operator `like`");
    }
}
