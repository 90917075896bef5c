use super::*;
use crate::{
    ast::*,
    error::{Error, ErrorKind},
};
use async_trait::async_trait;
use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

/// A transaction on top of a borrowed connection. The isolation level is set
/// right after `BEGIN`, as PostgreSQL requires.
///
/// A transaction that is neither committed nor rolled back leaves the
/// connection inside the open transaction; the caller owns that decision.
pub struct DefaultTransaction<'a> {
    pub inner: &'a dyn Queryable,
    closed: AtomicBool,
}

impl<'a> DefaultTransaction<'a> {
    pub async fn new(inner: &'a dyn Queryable, isolation: Option<IsolationLevel>) -> crate::Result<DefaultTransaction<'a>> {
        let this = Self {
            inner,
            closed: AtomicBool::new(false),
        };

        inner.raw_cmd(inner.begin_statement()).await?;

        if let Some(isolation) = isolation {
            inner.set_tx_isolation_level(isolation).await?;
        }

        Ok(this)
    }

    /// Commit the changes to the database and consume the transaction.
    pub async fn commit(&self) -> crate::Result<()> {
        self.close("COMMIT")?;
        self.inner.raw_cmd("COMMIT").await
    }

    /// Rolls back the changes to the database.
    pub async fn rollback(&self) -> crate::Result<()> {
        self.close("ROLLBACK")?;
        self.inner.raw_cmd("ROLLBACK").await
    }

    fn close(&self, statement: &str) -> crate::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            let kind = ErrorKind::TransactionAlreadyClosed(format!("Cannot {statement} a finished transaction."));
            return Err(Error::builder(kind).build());
        }

        Ok(())
    }

    pub fn as_queryable(&self) -> &dyn Queryable {
        self
    }
}

#[async_trait]
impl Queryable for DefaultTransaction<'_> {
    async fn query(&self, q: Query<'_>) -> crate::Result<ResultSet> {
        self.inner.query(q).await
    }

    async fn query_raw(&self, sql: &str, params: &[Value]) -> crate::Result<ResultSet> {
        self.inner.query_raw(sql, params).await
    }

    async fn execute(&self, q: Query<'_>) -> crate::Result<u64> {
        self.inner.execute(q).await
    }

    async fn execute_raw(&self, sql: &str, params: &[Value]) -> crate::Result<u64> {
        self.inner.execute_raw(sql, params).await
    }

    async fn raw_cmd(&self, cmd: &str) -> crate::Result<()> {
        self.inner.raw_cmd(cmd).await
    }

    async fn set_tx_isolation_level(&self, isolation_level: IsolationLevel) -> crate::Result<()> {
        self.inner.set_tx_isolation_level(isolation_level).await
    }
}

/// Controls the locking and row versioning behavior of connections or transactions.
/// The levels correspond to the ANSI standard isolation levels, as described in the
/// [Postgres documentation].
///
/// [Postgres documentation]: https://www.postgresql.org/docs/current/sql-set-transaction.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    #[default]
    RepeatableRead,
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadUncommitted => write!(f, "READ UNCOMMITTED"),
            Self::ReadCommitted => write!(f, "READ COMMITTED"),
            Self::RepeatableRead => write!(f, "REPEATABLE READ"),
            Self::Serializable => write!(f, "SERIALIZABLE"),
        }
    }
}

impl FromStr for IsolationLevel {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "read uncommitted" | "readuncommitted" => Ok(Self::ReadUncommitted),
            "read committed" | "readcommitted" => Ok(Self::ReadCommitted),
            "repeatable read" | "repeatableread" => Ok(Self::RepeatableRead),
            "serializable" => Ok(Self::Serializable),
            _ => {
                let kind = ErrorKind::conversion(format!("Invalid isolation level `{s}`"));
                Err(Error::builder(kind).build())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        statements: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn statements(&self) -> Vec<String> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Queryable for Recorder {
        async fn query_raw(&self, sql: &str, _: &[Value]) -> crate::Result<ResultSet> {
            self.statements.lock().unwrap().push(sql.to_owned());
            Ok(ResultSet::default())
        }

        async fn execute_raw(&self, sql: &str, _: &[Value]) -> crate::Result<u64> {
            self.statements.lock().unwrap().push(sql.to_owned());
            Ok(0)
        }

        async fn raw_cmd(&self, cmd: &str) -> crate::Result<()> {
            self.statements.lock().unwrap().push(cmd.to_owned());
            Ok(())
        }
    }

    #[tokio::test]
    async fn isolation_is_set_after_begin() {
        let conn = Recorder::default();

        let tx = DefaultTransaction::new(&conn, Some(IsolationLevel::RepeatableRead)).await.unwrap();
        tx.delete(Delete::from_table("post").so_that("id".equals(1))).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            conn.statements(),
            vec![
                "BEGIN",
                "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
                r#"DELETE FROM "post" WHERE "id" = $1"#,
                "COMMIT",
            ]
        );
    }

    #[tokio::test]
    async fn a_finished_transaction_cannot_be_closed_again() {
        let conn = Recorder::default();

        let tx = DefaultTransaction::new(&conn, None).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(tx.commit().await.is_err());
        assert_eq!(conn.statements(), vec!["BEGIN", "ROLLBACK"]);
    }

    #[test]
    fn isolation_levels_parse_from_configuration() {
        assert_eq!(IsolationLevel::from_str("repeatable read").unwrap(), IsolationLevel::RepeatableRead);
        assert_eq!(IsolationLevel::from_str("SERIALIZABLE").unwrap(), IsolationLevel::Serializable);
        assert!(IsolationLevel::from_str("snapshot").is_err());
    }
}
