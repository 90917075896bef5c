use super::*;
use std::borrow::Cow;

/// An expression that can be positioned in a query. Can be a single value or a
/// column, a row, a sub-select or a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression<'a> {
    pub(crate) kind: ExpressionKind<'a>,
    pub(crate) alias: Option<Cow<'a, str>>,
}

impl<'a> Expression<'a> {
    pub fn kind(&self) -> &ExpressionKind<'a> {
        &self.kind
    }

    pub fn into_kind(self) -> ExpressionKind<'a> {
        self.kind
    }

    /// Gives the expression an alias, e.g. `"author"."id" AS "author_id"`.
    pub fn alias<S>(mut self, alias: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        self.alias = Some(alias.into());
        self
    }

    /// A raw SQL fragment, written to the query as-is.
    pub fn raw<S>(sql: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        Expression {
            kind: ExpressionKind::Raw(sql.into()),
            alias: None,
        }
    }

    /// `*`, or `"table".*` when qualified.
    pub fn asterisk(table: Option<Table<'a>>) -> Self {
        Expression {
            kind: ExpressionKind::Asterisk(table.map(Box::new)),
            alias: None,
        }
    }

    /// The `DEFAULT` keyword.
    pub fn default_value() -> Self {
        Expression {
            kind: ExpressionKind::Default,
            alias: None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match &self.kind {
            ExpressionKind::Parameterized(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_row(&self) -> bool {
        matches!(self.kind, ExpressionKind::Row(_))
    }
}

/// An expression we can compare and use in database queries.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind<'a> {
    /// A value written as a placeholder, sent to the database as a parameter.
    Parameterized(Value),
    /// A user-provided SQL fragment.
    Raw(Cow<'a, str>),
    Column(Box<Column<'a>>),
    /// A tuple of expressions, e.g. `($1,$2)`.
    Row(Row<'a>),
    /// A nested `SELECT`.
    Selection(Box<Select<'a>>),
    ConditionTree(ConditionTree<'a>),
    Compare(Compare<'a>),
    Asterisk(Option<Box<Table<'a>>>),
    Default,
}

impl<'a> From<Value> for Expression<'a> {
    fn from(value: Value) -> Self {
        Expression {
            kind: ExpressionKind::Parameterized(value),
            alias: None,
        }
    }
}

impl<'a> From<Select<'a>> for Expression<'a> {
    fn from(select: Select<'a>) -> Self {
        Expression {
            kind: ExpressionKind::Selection(Box::new(select)),
            alias: None,
        }
    }
}

macro_rules! parameterized {
    ($($kind:ty),*) => {
        $(
            impl<'a> From<$kind> for Expression<'a> {
                fn from(that: $kind) -> Self {
                    Expression::from(Value::from(that))
                }
            }
        )*
    };
}

parameterized!(&str, String, bool, i32, i64);

expression!(Row, Row);
expression!(ConditionTree, ConditionTree);
expression!(Compare, Compare);
