use crate::CoreResult;
use quaint::{
    ast::Query,
    connector::{Queryable, ResultSet},
    visitor::{Postgres, Visitor},
};

/// Renders queries for PostgreSQL and runs them on the mutation's connection.
#[derive(Clone, Copy)]
pub struct SqlClient<'a> {
    db: &'a dyn Queryable,
    log_queries: bool,
}

impl<'a> SqlClient<'a> {
    pub fn new(db: &'a dyn Queryable, log_queries: bool) -> Self {
        SqlClient { db, log_queries }
    }

    pub async fn query(&self, query: Query<'_>) -> CoreResult<ResultSet> {
        let (sql, params) = Postgres::build(query)?;
        self.log(&sql, &params);

        Ok(self.db.query_raw(&sql, &params).await?)
    }

    /// Runs a write and returns the number of affected rows.
    pub async fn execute(&self, query: Query<'_>) -> CoreResult<u64> {
        let (sql, params) = Postgres::build(query)?;
        self.log(&sql, &params);

        Ok(self.db.execute_raw(&sql, &params).await?)
    }

    pub async fn raw_cmd(&self, cmd: &str) -> CoreResult<()> {
        self.log(cmd, &[]);

        Ok(self.db.raw_cmd(cmd).await?)
    }

    fn log(&self, sql: &str, params: &[quaint::ast::Value]) {
        if self.log_queries {
            tracing::debug!(query = %sql, params = ?params, "executing SQL");
        }
    }
}
