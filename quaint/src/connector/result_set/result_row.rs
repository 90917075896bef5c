use crate::{
    ast::Value,
    error::{Error, ErrorKind},
};
use std::sync::Arc;

/// An owned row of a `ResultSet`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) values: Vec<Value>,
}

impl IntoIterator for ResultRow {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// A borrowed row of a `ResultSet`, addressable by position or column name.
#[derive(Debug, PartialEq)]
pub struct ResultRowRef<'a> {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) values: &'a Vec<Value>,
}

impl ResultRow {
    pub fn at(&self, i: usize) -> Option<&Value> {
        self.values.get(i)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().position(|c| c == name).map(|idx| &self.values[idx])
    }

    pub fn as_ref(&self) -> ResultRowRef<'_> {
        ResultRowRef {
            columns: Arc::clone(&self.columns),
            values: &self.values,
        }
    }

    /// The value of the only selected column.
    pub fn into_single(self) -> crate::Result<Value> {
        match self.into_iter().next() {
            Some(val) => Ok(val),
            None => Err(Error::builder(ErrorKind::NotFound).build()),
        }
    }
}

impl<'a> ResultRowRef<'a> {
    pub fn at(&self, i: usize) -> Option<&'a Value> {
        self.values.get(i)
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.columns.iter().position(|c| c == name).map(|idx| &self.values[idx])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
