mod common;

use common::{blog_schema, uuid, Response, TestDb};
use pretty_assertions::assert_eq;
use query_core::{AllowAll, MutationErrorType, MutationResolver, MutationSettings};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn successful_mutations_are_committed() {
    let schema = blog_schema();
    let resolver = MutationResolver::new(&schema, &AllowAll, MutationSettings::default());
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "author""#, Response::id(uuid(1)));

    let response = resolver
        .update(&db, "Author", &json!({ "id": Uuid::from_u128(1).to_string() }), &json!({ "name": "Jane" }))
        .await
        .unwrap();

    assert!(response.ok);
    assert_eq!(
        db.statements(),
        vec![
            "BEGIN",
            "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            r#"SELECT "id" FROM "author" WHERE "id" = $1 LIMIT 1"#,
            r#"UPDATE "author" SET "name" = $1 WHERE "id" = $2"#,
            "COMMIT",
        ]
    );
}

#[tokio::test]
async fn failed_mutations_are_rolled_back() {
    let schema = blog_schema();
    let resolver = MutationResolver::new(&schema, &AllowAll, MutationSettings::default());
    let db = TestDb::default();

    db.respond(r#"INSERT INTO "tag""#, Response::unique_violation("tag_label_key"));

    let response = resolver.create(&db, "Tag", &json!({ "label": "rust" })).await.unwrap();

    assert!(!response.ok);
    assert_eq!(response.errors[0].error_type, MutationErrorType::UniqueConstraintViolation);
    assert_eq!(db.statements().last().map(String::as_str), Some("ROLLBACK"));
}

#[tokio::test]
async fn missing_rows_roll_back_with_a_not_found_error() {
    let schema = blog_schema();
    let resolver = MutationResolver::new(&schema, &AllowAll, MutationSettings::default());
    let db = TestDb::default();

    let response = resolver
        .delete(&db, "Post", &json!({ "title": "Gone" }))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "ok": false,
            "errors": [{
                "type": "NotFoundOrDenied",
                "message": "Mutation failed, operation denied by ACL rules",
                "path": []
            }]
        })
    );
    assert_eq!(db.statements().last().map(String::as_str), Some("ROLLBACK"));
}

#[tokio::test]
async fn the_isolation_level_follows_the_settings() {
    let schema = blog_schema();
    let settings = MutationSettings::from_lookup(|name| {
        (name == "CONTENT_ISOLATION_LEVEL").then(|| "serializable".to_owned())
    })
    .unwrap();
    let resolver = MutationResolver::new(&schema, &AllowAll, settings);
    let db = TestDb::default();

    db.respond(r#"INSERT INTO "tag""#, Response::id(uuid(5)));

    let response = resolver.create(&db, "Tag", &json!({ "label": "rust" })).await.unwrap();

    assert!(response.ok);
    assert_eq!(db.statements()[1], "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE");
    assert_eq!(db.statements().last().map(String::as_str), Some("COMMIT"));
}

#[tokio::test]
async fn unknown_entities_are_fatal() {
    let schema = blog_schema();
    let resolver = MutationResolver::new(&schema, &AllowAll, MutationSettings::default());
    let db = TestDb::default();

    assert!(resolver.create(&db, "Nope", &json!({})).await.is_err());
    assert!(db.statements().is_empty());
}
