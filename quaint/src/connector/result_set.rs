mod result_row;

pub use result_row::*;

use crate::{
    ast::Value,
    error::{Error, ErrorKind},
};
use std::sync::Arc;

/// Encapsulates a set of results and their respective column names.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultSet {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) rows: Vec<Vec<Value>>,
    pub(crate) affected_rows: Option<u64>,
}

impl ResultSet {
    /// Creates a new instance, bound to the given column names and result rows.
    pub fn new(names: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: Arc::new(names),
            rows,
            affected_rows: None,
        }
    }

    /// The number of rows a write statement touched, when the driver reports it separately.
    pub fn with_affected_rows(mut self, affected_rows: u64) -> Self {
        self.affected_rows = Some(affected_rows);
        self
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows.unwrap_or(self.rows.len() as u64)
    }

    /// Returns the first row of the result set, or `None` if the set is empty.
    pub fn first(&self) -> Option<ResultRowRef<'_>> {
        self.get(0)
    }

    /// Returns a reference to a row in a given position.
    pub fn get(&self, index: usize) -> Option<ResultRowRef<'_>> {
        self.rows.get(index).map(|row| ResultRowRef {
            columns: Arc::clone(&self.columns),
            values: row,
        })
    }

    /// Takes the first row if existing, otherwise returns error.
    pub fn into_single(self) -> crate::Result<ResultRow> {
        match self.into_iter().next() {
            Some(row) => Ok(row),
            None => Err(Error::builder(ErrorKind::NotFound).build()),
        }
    }

    pub fn columns(&self) -> &Vec<String> {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The values of one column across all rows.
    pub fn column_values(&self, name: &str) -> crate::Result<Vec<Value>> {
        let index = self.columns.iter().position(|c| c == name).ok_or_else(|| {
            Error::builder(ErrorKind::ColumnNotFound {
                column: name.to_owned().into(),
            })
            .build()
        })?;

        Ok(self.rows.iter().filter_map(|row| row.get(index).cloned()).collect())
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultRow;
    type IntoIter = ResultSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        ResultSetIterator {
            columns: self.columns,
            internal_iterator: self.rows.into_iter(),
        }
    }
}

/// Thin iterator for ResultSet rows.
/// Might become lazy one day.
pub struct ResultSetIterator {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) internal_iterator: std::vec::IntoIter<Vec<Value>>,
}

impl Iterator for ResultSetIterator {
    type Item = ResultRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.internal_iterator.next().map(|row| ResultRow {
            columns: Arc::clone(&self.columns),
            values: row,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rows_are_addressable_by_name_and_position() {
        let set = ResultSet::new(
            vec!["id".to_owned(), "name".to_owned()],
            vec![vec![Value::from(1), Value::from("Musti")], vec![Value::from(2), Value::from("Naukio")]],
        );

        let first = set.first().unwrap();

        assert_eq!(Some(&Value::from(1)), first.at(0));
        assert_eq!(Some(&Value::from("Musti")), first.get("name"));
        assert_eq!(vec![Value::from(1), Value::from(2)], set.column_values("id").unwrap());
        assert_eq!(2, set.affected_rows());
    }

    #[test]
    fn empty_sets_have_no_single_row() {
        let err = ResultSet::new(vec!["id".to_owned()], Vec::new()).into_single().unwrap_err();

        assert!(matches!(err.kind(), ErrorKind::NotFound));
    }
}
