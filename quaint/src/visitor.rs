//! Visitors for reading an abstract SQL syntax tree, generating the query and
//! gathering parameters in the right order.
//!
//! The visitor is the only place where SQL text is produced: builders in the
//! [ast](../ast/index.html) module never write strings themselves.

mod postgres;

pub use self::postgres::Postgres;

use crate::ast::*;
use std::fmt;

pub type Result = crate::Result<()>;

/// A function travelling through the query AST, building the final query string
/// and gathering parameters sent to the database together with the query.
pub trait Visitor<'a> {
    /// Opening backtick character to surround identifiers, such as column and table names.
    const C_BACKTICK_OPEN: &'static str;
    /// Closing backtick character to surround identifiers, such as column and table names.
    const C_BACKTICK_CLOSE: &'static str;

    /// Convert the given `Query` to an SQL string and a vector of parameters.
    /// When certain parameters are replaced with the `C_PARAM` character in the
    /// query, the vector should contain the parameter value in the right position.
    fn build<Q>(query: Q) -> crate::Result<(String, Vec<Value>)>
    where
        Q: Into<Query<'a>>;

    /// Write to the query.
    fn write<D: fmt::Display>(&mut self, s: D) -> Result;

    /// Pushes a parameter, to be substituted by the placeholder written next.
    fn add_parameter(&mut self, value: Value);

    /// The placeholder of the last added parameter.
    fn parameter_substitution(&mut self) -> Result;

    /// What to use to substitute a parameter in the query.
    fn visit_limit_and_offset(&mut self, limit: Option<u64>, offset: Option<u64>) -> Result;

    /// A visit to a value we parameterize
    fn visit_parameterized(&mut self, value: Value) -> Result {
        self.add_parameter(value);
        self.parameter_substitution()
    }

    /// The `INSERT` statement
    fn visit_insert(&mut self, insert: Insert<'a>) -> Result;

    /// The `RETURNING` clause of a write statement.
    fn visit_returning(&mut self, returning: Option<Vec<Column<'a>>>) -> Result;

    fn surround_with<F>(&mut self, begin: &str, end: &str, f: F) -> Result
    where
        F: FnOnce(&mut Self) -> Result,
    {
        self.write(begin)?;
        f(self)?;
        self.write(end)
    }

    /// Writes an identifier, escaping the closing backtick inside of it.
    fn surround_with_backticks(&mut self, part: &str) -> Result {
        let escaped = part.replace(Self::C_BACKTICK_CLOSE, &Self::C_BACKTICK_CLOSE.repeat(2));
        self.surround_with(Self::C_BACKTICK_OPEN, Self::C_BACKTICK_CLOSE, |s| s.write(escaped))
    }

    fn delimited_identifiers(&mut self, parts: &[&str]) -> Result {
        let len = parts.len();

        for (i, part) in parts.iter().enumerate() {
            self.surround_with_backticks(part)?;

            if i < (len - 1) {
                self.write(".")?;
            }
        }

        Ok(())
    }

    /// A walk through a complete `Query` statement
    fn visit_query(&mut self, query: Query<'a>) -> Result {
        match query {
            Query::Select(select) => self.visit_select(*select),
            Query::Insert(insert) => self.visit_insert(*insert),
            Query::Update(update) => self.visit_update(*update),
            Query::Delete(delete) => self.visit_delete(*delete),
            Query::Raw(string) => self.write(string),
        }
    }

    /// A walk through a `SELECT` statement
    fn visit_select(&mut self, select: Select<'a>) -> Result {
        self.write("SELECT ")?;

        if select.columns.is_empty() {
            self.write("*")?;
        } else {
            let len = select.columns.len();

            for (i, value) in select.columns.into_iter().enumerate() {
                self.visit_expression(value)?;

                if i < (len - 1) {
                    self.write(", ")?;
                }
            }
        }

        if !select.tables.is_empty() {
            self.write(" FROM ")?;

            let len = select.tables.len();

            for (i, table) in select.tables.into_iter().enumerate() {
                self.visit_table(table, true)?;

                if i < (len - 1) {
                    self.write(", ")?;
                }
            }
        }

        if let Some(conditions) = select.conditions {
            self.write(" WHERE ")?;
            self.visit_conditions(conditions)?;
        }

        if !select.ordering.is_empty() {
            self.write(" ORDER BY ")?;
            self.visit_ordering(select.ordering)?;
        }

        self.visit_limit_and_offset(select.limit, select.offset)
    }

    /// A walk through an `UPDATE` statement
    fn visit_update(&mut self, update: Update<'a>) -> Result {
        self.write("UPDATE ")?;
        self.visit_table(update.table, true)?;
        self.write(" SET ")?;

        let len = update.columns.len();

        for (i, (key, value)) in update.columns.into_iter().zip(update.values).enumerate() {
            self.delimited_identifiers(&[&*key.name])?;
            self.write(" = ")?;
            self.visit_expression(value)?;

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        if let Some(conditions) = update.conditions {
            self.write(" WHERE ")?;
            self.visit_conditions(conditions)?;
        }

        self.visit_returning(update.returning)
    }

    /// A walk through a `DELETE` statement
    fn visit_delete(&mut self, delete: Delete<'a>) -> Result {
        self.write("DELETE FROM ")?;
        self.visit_table(delete.table, true)?;

        if let Some(conditions) = delete.conditions {
            self.write(" WHERE ")?;
            self.visit_conditions(conditions)?;
        }

        self.visit_returning(delete.returning)
    }

    /// A walk through a sub-select
    fn visit_sub_selection(&mut self, query: Select<'a>) -> Result {
        self.visit_select(query)
    }

    /// A walk through the expression tree
    fn visit_expression(&mut self, value: Expression<'a>) -> Result {
        match value.kind {
            ExpressionKind::Parameterized(val) => self.visit_parameterized(val)?,
            ExpressionKind::Raw(sql) => self.write(sql)?,
            ExpressionKind::Column(column) => self.visit_column(*column)?,
            ExpressionKind::Row(row) => self.visit_row(row)?,
            ExpressionKind::Selection(selection) => {
                self.surround_with("(", ")", |s| s.visit_sub_selection(*selection))?
            }
            ExpressionKind::ConditionTree(tree) => self.visit_conditions(tree)?,
            ExpressionKind::Compare(compare) => self.visit_compare(compare)?,
            ExpressionKind::Asterisk(table) => match table {
                Some(table) => {
                    self.visit_table(*table, false)?;
                    self.write(".*")?
                }
                None => self.write("*")?,
            },
            ExpressionKind::Default => self.write("DEFAULT")?,
        }

        if let Some(alias) = value.alias {
            self.write(" AS ")?;
            self.delimited_identifiers(&[&*alias])?;
        }

        Ok(())
    }

    /// A database table identifier. Aliased tables are referenced by their alias outside of the
    /// `FROM` clause.
    fn visit_table(&mut self, table: Table<'a>, include_alias: bool) -> Result {
        if include_alias {
            self.delimited_identifiers(&[&*table.name])?;

            if let Some(alias) = table.alias {
                self.write(" AS ")?;
                self.delimited_identifiers(&[&*alias])?;
            }

            Ok(())
        } else {
            self.delimited_identifiers(&[table.reference_name()])
        }
    }

    /// A database column identifier
    fn visit_column(&mut self, column: Column<'a>) -> Result {
        match column.table {
            Some(table) => {
                self.visit_table(table, false)?;
                self.write(".")?;
                self.delimited_identifiers(&[&*column.name])?;
            }
            None => self.delimited_identifiers(&[&*column.name])?,
        }

        if let Some(alias) = column.alias {
            self.write(" AS ")?;
            self.delimited_identifiers(&[&*alias])?;
        }

        Ok(())
    }

    /// A row of data used as an expression
    fn visit_row(&mut self, row: Row<'a>) -> Result {
        self.surround_with("(", ")", |s| {
            let len = row.values.len();

            for (i, value) in row.values.into_iter().enumerate() {
                s.visit_expression(value)?;

                if i < (len - 1) {
                    s.write(",")?;
                }
            }

            Ok(())
        })
    }

    /// A walk through the query conditions
    fn visit_conditions(&mut self, tree: ConditionTree<'a>) -> Result {
        match tree {
            ConditionTree::And(expressions) => self.visit_conjunction(expressions, " AND ", "1=1"),
            ConditionTree::Or(expressions) => self.visit_conjunction(expressions, " OR ", "1=0"),
            ConditionTree::Not(expression) => {
                self.write("NOT ")?;
                self.surround_with("(", ")", |s| s.visit_expression(*expression))
            }
            ConditionTree::Single(expression) => self.visit_expression(*expression),
            ConditionTree::NoCondition => self.write("1=1"),
            ConditionTree::NegativeCondition => self.write("1=0"),
        }
    }

    /// Operands joined by `AND` or `OR`; an empty conjunction becomes its neutral element.
    fn visit_conjunction(&mut self, expressions: Vec<Expression<'a>>, separator: &str, empty: &str) -> Result {
        if expressions.is_empty() {
            return self.write(empty);
        }

        self.surround_with("(", ")", |s| {
            let len = expressions.len();

            for (i, expr) in expressions.into_iter().enumerate() {
                s.visit_expression(expr)?;

                if i < (len - 1) {
                    s.write(separator)?;
                }
            }

            Ok(())
        })
    }

    /// A comparison expression. An `IN` against an empty row is never true, a
    /// `NOT IN` against one always is.
    fn visit_compare(&mut self, compare: Compare<'a>) -> Result {
        match compare {
            Compare::Equals(left, right) => self.visit_binary(*left, " = ", *right),
            Compare::NotEquals(left, right) => self.visit_binary(*left, " <> ", *right),
            Compare::LessThan(left, right) => self.visit_binary(*left, " < ", *right),
            Compare::LessThanOrEquals(left, right) => self.visit_binary(*left, " <= ", *right),
            Compare::GreaterThan(left, right) => self.visit_binary(*left, " > ", *right),
            Compare::GreaterThanOrEquals(left, right) => self.visit_binary(*left, " >= ", *right),
            Compare::In(_, right) if is_empty_row(&right) => self.write("1=0"),
            Compare::In(left, right) => self.visit_binary(*left, " IN ", *right),
            Compare::NotIn(_, right) if is_empty_row(&right) => self.write("1=1"),
            Compare::NotIn(left, right) => self.visit_binary(*left, " NOT IN ", *right),
            Compare::Null(column) => {
                self.visit_expression(*column)?;
                self.write(" IS NULL")
            }
            Compare::NotNull(column) => {
                self.visit_expression(*column)?;
                self.write(" IS NOT NULL")
            }
        }
    }

    fn visit_binary(&mut self, left: Expression<'a>, operator: &str, right: Expression<'a>) -> Result {
        self.visit_expression(left)?;
        self.write(operator)?;
        self.visit_expression(right)
    }

    /// A visit in the `ORDER BY` section of the query
    fn visit_ordering(&mut self, ordering: Ordering<'a>) -> Result {
        let len = ordering.0.len();

        for (i, (value, ordering)) in ordering.0.into_iter().enumerate() {
            let direction = match ordering {
                Some(Order::Asc) => " ASC",
                Some(Order::Desc) => " DESC",
                None => "",
            };

            self.visit_expression(value)?;
            self.write(direction)?;

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        Ok(())
    }
}

fn is_empty_row(expression: &Expression<'_>) -> bool {
    matches!(expression.kind(), ExpressionKind::Row(row) if row.is_empty())
}
