use super::*;
use std::borrow::Cow;

/// A database query
#[derive(Debug, Clone, PartialEq)]
pub enum Query<'a> {
    Select(Box<Select<'a>>),
    Insert(Box<Insert<'a>>),
    Update(Box<Update<'a>>),
    Delete(Box<Delete<'a>>),
    Raw(Cow<'a, str>),
}

impl<'a> From<&'a str> for Query<'a> {
    fn from(sql: &'a str) -> Self {
        Query::Raw(Cow::Borrowed(sql))
    }
}

impl From<String> for Query<'_> {
    fn from(sql: String) -> Self {
        Query::Raw(Cow::Owned(sql))
    }
}

impl Query<'_> {
    pub fn is_select(&self) -> bool {
        matches!(self, Query::Select(_))
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Query::Insert(_) | Query::Update(_) | Query::Delete(_))
    }
}
