use crate::{ast::*, visitor, visitor::Visitor};
use std::fmt::{self, Write};

/// A visitor to generate queries for the PostgreSQL database.
///
/// The returned parameter values implement the `ToSql` trait from postgres and
/// can be used directly with the database.
pub struct Postgres {
    query: String,
    parameters: Vec<Value>,
}

impl<'a> Visitor<'a> for Postgres {
    const C_BACKTICK_OPEN: &'static str = "\"";
    const C_BACKTICK_CLOSE: &'static str = "\"";

    fn build<Q>(query: Q) -> crate::Result<(String, Vec<Value>)>
    where
        Q: Into<Query<'a>>,
    {
        let mut postgres = Postgres {
            query: String::with_capacity(4096),
            parameters: Vec::with_capacity(128),
        };

        Postgres::visit_query(&mut postgres, query.into())?;

        Ok((postgres.query, postgres.parameters))
    }

    fn write<D: fmt::Display>(&mut self, s: D) -> visitor::Result {
        write!(&mut self.query, "{s}")?;
        Ok(())
    }

    fn add_parameter(&mut self, value: Value) {
        self.parameters.push(value);
    }

    fn parameter_substitution(&mut self) -> visitor::Result {
        self.write("$")?;
        self.write(self.parameters.len())
    }

    fn visit_limit_and_offset(&mut self, limit: Option<u64>, offset: Option<u64>) -> visitor::Result {
        if let Some(limit) = limit {
            self.write(format!(" LIMIT {limit}"))?;
        }

        if let Some(offset) = offset {
            self.write(format!(" OFFSET {offset}"))?;
        }

        Ok(())
    }

    fn visit_insert(&mut self, insert: Insert<'a>) -> visitor::Result {
        self.write("INSERT INTO ")?;
        self.visit_table(insert.table, true)?;

        if insert.columns.is_empty() {
            self.write(" DEFAULT VALUES")?;
        } else {
            let columns = insert.columns.len();

            self.write(" (")?;
            for (i, c) in insert.columns.into_iter().enumerate() {
                self.delimited_identifiers(&[&*c.name])?;

                if i < (columns - 1) {
                    self.write(",")?;
                }
            }
            self.write(")")?;

            self.write(" VALUES ")?;
            self.visit_row(insert.values)?;
        }

        if let Some(OnConflict::DoNothing) = insert.on_conflict {
            self.write(" ON CONFLICT DO NOTHING")?;
        }

        self.visit_returning(insert.returning)
    }

    fn visit_returning(&mut self, returning: Option<Vec<Column<'a>>>) -> visitor::Result {
        let Some(returning) = returning.filter(|columns| !columns.is_empty()) else {
            return Ok(());
        };

        let values_len = returning.len();
        self.write(" RETURNING ")?;

        for (i, column) in returning.into_iter().enumerate() {
            self.visit_column(column)?;

            if i < (values_len - 1) {
                self.write(", ")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, visitor::*};
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    #[test]
    fn select_with_nested_conditions() {
        let conditions = "age"
            .greater_than(20)
            .and(ConditionTree::or("name".equals("John"), ("author", "name").is_null()));

        let query = Select::from_table(Table::from("author").alias("a"))
            .column(Column::from("id").table(Table::from("author").alias("a")))
            .so_that(conditions)
            .order_by("name".descend())
            .limit(10)
            .offset(20);

        let (sql, params) = Postgres::build(query).unwrap();

        expect![[r#"SELECT "a"."id" FROM "author" AS "a" WHERE ("age" > $1 AND ("name" = $2 OR "author"."name" IS NULL)) ORDER BY "name" DESC LIMIT 10 OFFSET 20"#]]
            .assert_eq(&sql);
        assert_eq!(vec![Value::from(20), Value::from("John")], params);
    }

    #[test]
    fn empty_in_selections_short_circuit() {
        let never = Select::from_table("post").so_that("id".in_selection(Vec::<Value>::new()));
        let always = Select::from_table("post").so_that("id".not_in_selection(Vec::<Value>::new()));

        let (never, _) = Postgres::build(never).unwrap();
        let (always, _) = Postgres::build(always).unwrap();

        expect![[r#"SELECT * FROM "post" WHERE 1=0"#]].assert_eq(&never);
        expect![[r#"SELECT * FROM "post" WHERE 1=1"#]].assert_eq(&always);
    }

    #[test]
    fn sub_selections_are_parenthesized() {
        let owners = Select::from_table("post").column("author_id").so_that("id".equals(1));
        let query = Update::table("author")
            .set("name", Value::Null)
            .so_that("id".in_selection(owners))
            .returning(vec!["id"]);

        let (sql, params) = Postgres::build(query).unwrap();

        expect![[r#"UPDATE "author" SET "name" = $1 WHERE "id" IN (SELECT "author_id" FROM "post" WHERE "id" = $2) RETURNING "id""#]]
            .assert_eq(&sql);
        assert_eq!(vec![Value::Null, Value::from(1)], params);
    }

    #[test]
    fn identifiers_are_escaped() {
        let (sql, _) = Postgres::build(Select::from_table(r#"weird"table"#)).unwrap();

        assert_eq!(r#"SELECT * FROM "weird""table""#, sql);
    }

    #[test]
    fn negated_conditions() {
        let query = Delete::from_table("post").so_that("title".equals("a").not());
        let (sql, _) = Postgres::build(query).unwrap();

        expect![[r#"DELETE FROM "post" WHERE NOT ("title" = $1)"#]].assert_eq(&sql);
    }

    #[test]
    fn insert_with_several_values() {
        let query = Insert::single_into("post")
            .value("title", "Hello")
            .value("author_id", 1)
            .build()
            .on_conflict(OnConflict::DoNothing)
            .returning(vec!["id"]);

        let (sql, params) = Postgres::build(query).unwrap();

        expect![[r#"INSERT INTO "post" ("title","author_id") VALUES ($1,$2) ON CONFLICT DO NOTHING RETURNING "id""#]]
            .assert_eq(&sql);
        assert_eq!(2, params.len());
    }

    #[test]
    fn raw_commands_pass_through() {
        let (sql, params) = Postgres::build("SET CONSTRAINTS ALL DEFERRED").unwrap();

        assert_eq!("SET CONSTRAINTS ALL DEFERRED", sql);
        assert!(params.is_empty());
    }
}
