use std::borrow::Cow;

/// A database table, optionally aliased.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table<'a> {
    pub name: Cow<'a, str>,
    pub(crate) alias: Option<Cow<'a, str>>,
}

impl<'a> Table<'a> {
    pub fn new<S>(name: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        Table {
            name: name.into(),
            alias: None,
        }
    }

    pub fn alias<S>(mut self, alias: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        self.alias = Some(alias.into());
        self
    }

    /// The name the table is referenced by in the rest of the query.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl<'a> From<&'a str> for Table<'a> {
    fn from(s: &'a str) -> Table<'a> {
        Table::new(s)
    }
}

impl<'a> From<&'a String> for Table<'a> {
    fn from(s: &'a String) -> Table<'a> {
        Table::new(s.as_str())
    }
}

impl From<String> for Table<'_> {
    fn from(s: String) -> Self {
        Table::new(s)
    }
}
