use super::*;

/// For modeling comparison expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Compare<'a> {
    /// `left = right`
    Equals(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left <> right`
    NotEquals(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left < right`
    LessThan(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left <= right`
    LessThanOrEquals(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left > right`
    GreaterThan(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left >= right`
    GreaterThanOrEquals(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left IN (..)`
    In(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left NOT IN (..)`
    NotIn(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `value IS NULL`
    Null(Box<Expression<'a>>),
    /// `value IS NOT NULL`
    NotNull(Box<Expression<'a>>),
}

/// An item that can be compared against other values in the database.
pub trait Comparable<'a>: Sized {
    fn into_comparable(self) -> Expression<'a>;

    /// Tests if both sides are the same value.
    fn equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::Equals(Box::new(self.into_comparable()), Box::new(comparison.into()))
    }

    /// Tests if both sides are not the same value.
    fn not_equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::NotEquals(Box::new(self.into_comparable()), Box::new(comparison.into()))
    }

    fn less_than<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::LessThan(Box::new(self.into_comparable()), Box::new(comparison.into()))
    }

    fn less_than_or_equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::LessThanOrEquals(Box::new(self.into_comparable()), Box::new(comparison.into()))
    }

    fn greater_than<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::GreaterThan(Box::new(self.into_comparable()), Box::new(comparison.into()))
    }

    fn greater_than_or_equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::GreaterThanOrEquals(Box::new(self.into_comparable()), Box::new(comparison.into()))
    }

    /// Tests if the left side is included in the right side collection or selection.
    ///
    /// ```rust
    /// # use quaint::{ast::*, visitor::{Visitor, Postgres}};
    /// # fn main() -> Result<(), quaint::error::Error> {
    /// let query = Select::from_table("users").so_that("id".in_selection(vec![1, 2]));
    /// let (sql, params) = Postgres::build(query)?;
    ///
    /// assert_eq!(r#"SELECT * FROM "users" WHERE "id" IN ($1,$2)"#, sql);
    /// assert_eq!(vec![Value::from(1), Value::from(2)], params);
    /// # Ok(())
    /// # }
    /// ```
    fn in_selection<T>(self, selection: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::In(Box::new(self.into_comparable()), Box::new(selection.into()))
    }

    fn not_in_selection<T>(self, selection: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        Compare::NotIn(Box::new(self.into_comparable()), Box::new(selection.into()))
    }

    fn is_null(self) -> Compare<'a> {
        Compare::Null(Box::new(self.into_comparable()))
    }

    fn is_not_null(self) -> Compare<'a> {
        Compare::NotNull(Box::new(self.into_comparable()))
    }
}

impl<'a> Comparable<'a> for Expression<'a> {
    fn into_comparable(self) -> Expression<'a> {
        self
    }
}

impl<'a> Comparable<'a> for Column<'a> {
    fn into_comparable(self) -> Expression<'a> {
        self.into()
    }
}

impl<'a> Comparable<'a> for &'a str {
    fn into_comparable(self) -> Expression<'a> {
        Column::from(self).into()
    }
}

impl<'a> Comparable<'a> for (&'a str, &'a str) {
    fn into_comparable(self) -> Expression<'a> {
        Column::from(self).into()
    }
}
