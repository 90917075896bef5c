mod error;

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::{fmt, str::FromStr};
use uuid::Uuid;

pub use error::ConversionFailure;
pub type ContentValueResult<T> = std::result::Result<T, ConversionFailure>;
pub type ContentListValue = Vec<ContentValue>;

/// A scalar flowing through queries, filters and mutation inputs.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ContentValue {
    String(String),
    Boolean(bool),
    Int(i64),
    Uuid(Uuid),
    Float(BigDecimal),
    /// A bare word passed through verbatim, e.g. an enum member or an order direction.
    Literal(String),
    List(ContentListValue),
    Null,
}

impl ContentValue {
    pub fn literal(value: impl Into<String>) -> ContentValue {
        ContentValue::Literal(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ContentValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContentValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            ContentValue::Literal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ContentValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ContentValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, ContentValue::Int(_) | ContentValue::Float(_))
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            ContentValue::String(s) | ContentValue::Literal(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<ContentListValue> {
        match self {
            ContentValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn new_float(float: f64) -> ContentValueResult<ContentValue> {
        ContentValue::try_from(float)
    }

    /// Parses a numeric source literal. Integral values become `Int`, everything else `Float`.
    pub fn parse_number(image: &str) -> ContentValueResult<ContentValue> {
        if let Ok(int) = image.parse::<i64>() {
            return Ok(ContentValue::Int(int));
        }

        BigDecimal::from_str(image)
            .map(ContentValue::Float)
            .map_err(|_| ConversionFailure::new("number literal", "ContentValue::Float"))
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ContentValue::String(_) => "string",
            ContentValue::Boolean(_) => "boolean",
            ContentValue::Int(_) => "int",
            ContentValue::Uuid(_) => "uuid",
            ContentValue::Float(_) => "float",
            ContentValue::Literal(_) => "literal",
            ContentValue::List(_) => "list",
            ContentValue::Null => "null",
        }
    }

    /// JSON that keeps every variant apart: literals, uuids and floats are wrapped in a
    /// single-key object named after their type, floats keep their exact decimal digits.
    pub fn to_tagged_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};

        match self {
            ContentValue::String(s) => Value::String(s.clone()),
            ContentValue::Boolean(b) => Value::Bool(*b),
            ContentValue::Int(i) => json!(i),
            ContentValue::Uuid(u) => json!({ "uuid": u.to_string() }),
            ContentValue::Float(d) => json!({ "float": d.normalized().to_string() }),
            ContentValue::Literal(s) => json!({ "literal": s }),
            ContentValue::List(values) => Value::Array(values.iter().map(ContentValue::to_tagged_json).collect()),
            ContentValue::Null => Value::Null,
        }
    }
}

impl Serialize for ContentValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ContentValue::String(s) | ContentValue::Literal(s) => serializer.serialize_str(s),
            ContentValue::Boolean(b) => serializer.serialize_bool(*b),
            ContentValue::Int(i) => serializer.serialize_i64(*i),
            ContentValue::Uuid(u) => serializer.collect_str(u),
            ContentValue::Float(d) => match d.to_f64() {
                Some(f) => serializer.serialize_f64(f),
                None => serializer.collect_str(d),
            },
            ContentValue::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;

                for value in values {
                    seq.serialize_element(value)?;
                }

                seq.end()
            }
            ContentValue::Null => serializer.serialize_none(),
        }
    }
}

impl TryFrom<serde_json::Value> for ContentValue {
    type Error = ConversionFailure;

    fn try_from(v: serde_json::Value) -> ContentValueResult<Self> {
        match v {
            serde_json::Value::String(s) => Ok(ContentValue::String(s)),
            serde_json::Value::Array(v) => {
                let vals: ContentValueResult<Vec<ContentValue>> = v.into_iter().map(ContentValue::try_from).collect();
                Ok(ContentValue::List(vals?))
            }
            serde_json::Value::Null => Ok(ContentValue::Null),
            serde_json::Value::Bool(b) => Ok(ContentValue::Boolean(b)),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(int) => Ok(ContentValue::Int(int)),
                None => ContentValue::parse_number(&num.to_string()),
            },
            serde_json::Value::Object(_) => Err(ConversionFailure::new("JSON object", "ContentValue")),
        }
    }
}

impl From<ContentValue> for serde_json::Value {
    fn from(value: ContentValue) -> Self {
        match value {
            ContentValue::String(s) | ContentValue::Literal(s) => serde_json::Value::String(s),
            ContentValue::Boolean(b) => serde_json::Value::Bool(b),
            ContentValue::Int(i) => serde_json::Value::from(i),
            ContentValue::Uuid(u) => serde_json::Value::String(u.to_string()),
            ContentValue::Float(d) => d
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(d.to_string())),
            ContentValue::List(values) => serde_json::Value::Array(values.into_iter().map(Into::into).collect()),
            ContentValue::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for ContentValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContentValue::String(x) => write!(f, "'{x}'"),
            ContentValue::Literal(x) => x.fmt(f),
            ContentValue::Float(x) => x.fmt(f),
            ContentValue::Boolean(x) => x.fmt(f),
            ContentValue::Int(x) => x.fmt(f),
            ContentValue::Uuid(x) => x.fmt(f),
            ContentValue::Null => "null".fmt(f),
            ContentValue::List(values) => {
                let joined = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                write!(f, "[{joined}]")
            }
        }
    }
}

impl From<&str> for ContentValue {
    fn from(s: &str) -> Self {
        ContentValue::from(s.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(s: String) -> Self {
        ContentValue::String(s)
    }
}

impl TryFrom<f64> for ContentValue {
    type Error = ConversionFailure;

    fn try_from(f: f64) -> ContentValueResult<ContentValue> {
        BigDecimal::from_f64(f)
            .map(ContentValue::Float)
            .ok_or_else(|| ConversionFailure::new("f64", "Decimal"))
    }
}

impl From<bool> for ContentValue {
    fn from(b: bool) -> Self {
        ContentValue::Boolean(b)
    }
}

impl From<i32> for ContentValue {
    fn from(i: i32) -> Self {
        ContentValue::Int(i64::from(i))
    }
}

impl From<i64> for ContentValue {
    fn from(i: i64) -> Self {
        ContentValue::Int(i)
    }
}

impl From<Uuid> for ContentValue {
    fn from(s: Uuid) -> Self {
        ContentValue::Uuid(s)
    }
}

impl From<ContentListValue> for ContentValue {
    fn from(s: ContentListValue) -> Self {
        ContentValue::List(s)
    }
}

impl<T> From<Option<T>> for ContentValue
where
    T: Into<ContentValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ContentValue::Null)
    }
}

impl TryFrom<ContentValue> for i64 {
    type Error = ConversionFailure;

    fn try_from(value: ContentValue) -> ContentValueResult<i64> {
        match value {
            ContentValue::Int(i) => Ok(i),
            _ => Err(ConversionFailure::new("ContentValue", "i64")),
        }
    }
}

impl TryFrom<ContentValue> for String {
    type Error = ConversionFailure;

    fn try_from(value: ContentValue) -> ContentValueResult<String> {
        match value {
            ContentValue::String(s) => Ok(s),
            _ => Err(ConversionFailure::new("ContentValue", "String")),
        }
    }
}
