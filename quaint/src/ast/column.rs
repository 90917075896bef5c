use super::{Expression, ExpressionKind, Table};
use std::borrow::Cow;

/// A column definition, optionally qualified by its table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Column<'a> {
    pub name: Cow<'a, str>,
    pub(crate) table: Option<Table<'a>>,
    pub(crate) alias: Option<Cow<'a, str>>,
}

impl<'a> Column<'a> {
    pub fn new<S>(name: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        Column {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Qualifies the column with a table, e.g. `"author"."id"`.
    pub fn table<T>(mut self, table: T) -> Self
    where
        T: Into<Table<'a>>,
    {
        self.table = Some(table.into());
        self
    }

    pub fn alias<S>(mut self, alias: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        self.alias = Some(alias.into());
        self
    }
}

impl<'a> From<Column<'a>> for Expression<'a> {
    fn from(col: Column<'a>) -> Self {
        Expression {
            kind: ExpressionKind::Column(Box::new(col)),
            alias: None,
        }
    }
}

impl<'a> From<&'a str> for Column<'a> {
    fn from(s: &'a str) -> Self {
        Column::new(s)
    }
}

impl From<String> for Column<'_> {
    fn from(s: String) -> Self {
        Column::new(s)
    }
}

impl<'a> From<&'a String> for Column<'a> {
    fn from(s: &'a String) -> Self {
        Column::new(s.as_str())
    }
}

/// `(table, column)`
impl<'a, T, C> From<(T, C)> for Column<'a>
where
    T: Into<Table<'a>>,
    C: Into<Cow<'a, str>>,
{
    fn from(t: (T, C)) -> Column<'a> {
        Column::new(t.1).table(t.0)
    }
}
