#![allow(dead_code)]

use async_trait::async_trait;
use quaint::{
    ast::Value,
    connector::{Queryable, ResultSet},
    error::{DatabaseConstraint, Error, ErrorKind},
};
use query_core::{sql::SqlClient, sql::SqlMapper, AllowAll, MutationSettings};
use query_structure::{ColumnType, OnDelete, Schema, SchemaBuilder};
use std::{collections::VecDeque, sync::Mutex};
use uuid::Uuid;

pub enum Response {
    Rows(ResultSet),
    Affected(u64),
    Fail(Error),
}

impl Response {
    /// A single row with the given `id`.
    pub fn id(value: impl Into<Value>) -> Self {
        Response::Rows(ResultSet::new(vec!["id".to_owned()], vec![vec![value.into()]]))
    }

    /// A single row with one column of any name.
    pub fn value(column: &str, value: impl Into<Value>) -> Self {
        Response::Rows(ResultSet::new(vec![column.to_owned()], vec![vec![value.into()]]))
    }

    pub fn ids(values: Vec<Value>) -> Self {
        Response::Rows(ResultSet::new(
            vec!["id".to_owned()],
            values.into_iter().map(|value| vec![value]).collect(),
        ))
    }

    pub fn empty() -> Self {
        Response::Rows(ResultSet::new(vec!["id".to_owned()], Vec::new()))
    }

    pub fn unique_violation(index: &str) -> Self {
        let kind = ErrorKind::UniqueConstraintViolation {
            constraint: DatabaseConstraint::Index(index.to_owned()),
        };

        Response::Fail(Error::builder(kind).build())
    }

    pub fn foreign_key_violation() -> Self {
        let kind = ErrorKind::ForeignKeyConstraintViolation {
            constraint: DatabaseConstraint::ForeignKey,
        };

        Response::Fail(Error::builder(kind).build())
    }
}

/// Records every statement and answers with scripted responses, matched by SQL prefix in the
/// order they were scripted. Unscripted queries return no rows, unscripted writes affect one row.
#[derive(Default)]
pub struct TestDb {
    statements: Mutex<Vec<(String, Vec<Value>)>>,
    responses: Mutex<Vec<(String, VecDeque<Response>)>>,
}

impl TestDb {
    pub fn respond(&self, prefix: &str, response: Response) -> &Self {
        let mut responses = self.responses.lock().unwrap();

        match responses.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, queue)) => queue.push_back(response),
            None => responses.push((prefix.to_owned(), VecDeque::from([response]))),
        }

        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn params(&self, index: usize) -> Vec<Value> {
        self.statements.lock().unwrap()[index].1.clone()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Option<Response> {
        self.statements.lock().unwrap().push((sql.to_owned(), params.to_vec()));

        self.responses
            .lock()
            .unwrap()
            .iter_mut()
            .find(|(prefix, queue)| sql.starts_with(prefix.as_str()) && !queue.is_empty())
            .and_then(|(_, queue)| queue.pop_front())
    }
}

#[async_trait]
impl Queryable for TestDb {
    async fn query_raw(&self, sql: &str, params: &[Value]) -> quaint::Result<ResultSet> {
        match self.record(sql, params) {
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Fail(err)) => Err(err),
            Some(Response::Affected(_)) | None => Ok(ResultSet::new(vec!["id".to_owned()], Vec::new())),
        }
    }

    async fn execute_raw(&self, sql: &str, params: &[Value]) -> quaint::Result<u64> {
        match self.record(sql, params) {
            Some(Response::Affected(count)) => Ok(count),
            Some(Response::Rows(rows)) => Ok(rows.len() as u64),
            Some(Response::Fail(err)) => Err(err),
            None => Ok(1),
        }
    }

    async fn raw_cmd(&self, cmd: &str) -> quaint::Result<()> {
        match self.record(cmd, &[]) {
            Some(Response::Fail(err)) => Err(err),
            _ => Ok(()),
        }
    }
}

/// Authors write posts, have an optional profile and may leave comments that block their
/// deletion. Posts are tagged, and their comments go away with them.
pub fn blog_schema() -> Schema {
    SchemaBuilder::default()
        .entity("Author", |e| {
            e.required_column("name", ColumnType::String)
                .one_has_many("posts", "Post", "author")
                .one_has_one_inverse("profile", "Profile", "author", |r| r)
        })
        .entity("Post", |e| {
            e.column("title", ColumnType::String)
                .unique(&["title"])
                .many_has_one("author", "Author", |r| {
                    r.inversed_by("posts").not_null().on_delete(OnDelete::Cascade)
                })
                .many_has_many("tags", "Tag", |r| r.inversed_by("posts"))
        })
        .entity("Profile", |e| {
            e.column("bio", ColumnType::String)
                .one_has_one("author", "Author", |r| r.inversed_by("profile").on_delete(OnDelete::SetNull))
        })
        .entity("Tag", |e| {
            e.column("label", ColumnType::String)
                .unique(&["label"])
                .many_has_many_inverse("posts", "Post", "tags")
        })
        .entity("Comment", |e| {
            e.column("text", ColumnType::String)
                .many_has_one("author", "Author", |r| r)
                .many_has_one("post", "Post", |r| r.on_delete(OnDelete::Cascade))
        })
        .build()
        .unwrap()
}

pub fn mapper<'a>(schema: &'a Schema, db: &'a TestDb, settings: &'a MutationSettings) -> SqlMapper<'a> {
    SqlMapper::new(schema, SqlClient::new(db, false), &AllowAll, settings)
}

pub fn uuid(n: u128) -> Value {
    Value::Uuid(Uuid::from_u128(n))
}
