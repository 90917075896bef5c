mod common;

use common::{blog_schema, mapper, uuid, Response, TestDb};
use pretty_assertions::assert_eq;
use query_core::{
    insert_primary, update_primary, ConstraintType, Mapper, MutationResultKind, MutationSettings, NothingToDoReason,
    PathSegment,
};
use query_structure::{DataInput, HasManyInput, HasManyItem, HasOneInput, UniqueWhere};

#[tokio::test]
async fn create_with_a_connected_author_selects_it_before_inserting() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "author""#, Response::id(uuid(1)))
        .respond(r#"INSERT INTO "post""#, Response::id(uuid(2)));

    let data = DataInput::new()
        .with_value("title", "Hello")
        .with_one("author", HasOneInput::Connect(UniqueWhere::by("id", uuid(1))));

    let results = mapper(&schema, &db, &settings)
        .insert(schema.entity("Post").unwrap(), &data)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(insert_primary(&results), Some(&uuid(2)));
    assert_eq!(
        db.statements(),
        vec![
            r#"SELECT "id" FROM "author" WHERE "id" = $1 LIMIT 1"#,
            r#"INSERT INTO "post" ("title","author_id","id") VALUES ($1,$2,$3) RETURNING "id""#,
        ]
    );
    assert_eq!(db.params(1)[..2].to_vec(), vec!["Hello".into(), uuid(1)]);
}

#[tokio::test]
async fn connecting_a_missing_row_is_reported_under_the_relation() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"INSERT INTO "comment""#, Response::id(uuid(2)));

    let data = DataInput::new()
        .with_value("text", "First!")
        .with_one("author", HasOneInput::Connect(UniqueWhere::by("id", uuid(1))));

    let results = mapper(&schema, &db, &settings)
        .insert(schema.entity("Comment").unwrap(), &data)
        .await
        .unwrap();

    assert_eq!(insert_primary(&results), Some(&uuid(2)));
    assert_eq!(
        results[1].kind,
        MutationResultKind::NotFound {
            unique_where: UniqueWhere::by("id", uuid(1))
        }
    );
    assert_eq!(results[1].path, vec![PathSegment::field("author")]);
    assert_eq!(
        db.statements()[1],
        r#"INSERT INTO "comment" ("text","id") VALUES ($1,$2) RETURNING "id""#
    );
}

#[tokio::test]
async fn reconnecting_the_current_owner_leaves_the_row_alone() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "profile""#, Response::id(uuid(10)))
        .respond(r#"SELECT "id" FROM "author""#, Response::id(uuid(1)))
        .respond(r#"SELECT "id" FROM "profile""#, Response::id(uuid(10)));

    let data = DataInput::new().with_one("author", HasOneInput::Connect(UniqueWhere::by("id", uuid(1))));

    let results = mapper(&schema, &db, &settings)
        .update(schema.entity("Profile").unwrap(), &UniqueWhere::by("id", uuid(10)), &data)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(update_primary(&results), Some(&uuid(10)));
    assert_eq!(
        db.statements(),
        vec![
            r#"SELECT "id" FROM "profile" WHERE "id" = $1 LIMIT 1"#,
            r#"SELECT "id" FROM "author" WHERE "id" = $1 LIMIT 1"#,
            r#"SELECT "id" FROM "profile" WHERE "author_id" = $1 LIMIT 1"#,
        ]
    );
}

#[tokio::test]
async fn connecting_a_claimed_author_disconnects_the_previous_profile() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "profile""#, Response::id(uuid(10)))
        .respond(r#"SELECT "id" FROM "author""#, Response::id(uuid(1)))
        .respond(r#"SELECT "id" FROM "profile""#, Response::id(uuid(11)))
        .respond(r#"SELECT "id" FROM "profile""#, Response::id(uuid(11)));

    let data = DataInput::new().with_one("author", HasOneInput::Connect(UniqueWhere::by("id", uuid(1))));

    let results = mapper(&schema, &db, &settings)
        .update(schema.entity("Profile").unwrap(), &UniqueWhere::by("id", uuid(10)), &data)
        .await
        .unwrap();

    assert_eq!(
        db.statements(),
        vec![
            r#"SELECT "id" FROM "profile" WHERE "id" = $1 LIMIT 1"#,
            r#"SELECT "id" FROM "author" WHERE "id" = $1 LIMIT 1"#,
            r#"SELECT "id" FROM "profile" WHERE "author_id" = $1 LIMIT 1"#,
            r#"SELECT "id" FROM "profile" WHERE "id" = $1 LIMIT 1"#,
            r#"UPDATE "profile" SET "author_id" = $1 WHERE "id" = $2"#,
            r#"UPDATE "profile" SET "author_id" = $1 WHERE "id" = $2"#,
        ]
    );
    assert_eq!(db.params(4), vec![query_structure::ContentValue::Null, uuid(11)]);
    assert_eq!(db.params(5), vec![uuid(1), uuid(10)]);

    assert_eq!(update_primary(&results), Some(&uuid(10)));
    assert_eq!(update_primary(&results[1..]), Some(&uuid(11)));
    assert_eq!(results[1].path, vec![PathSegment::field("author")]);
}

#[tokio::test]
async fn disconnecting_a_required_relation_is_a_not_null_violation() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "post""#, Response::id(uuid(2)));

    let data = DataInput::new().with_one("author", HasOneInput::Disconnect);

    let results = mapper(&schema, &db, &settings)
        .update(schema.entity("Post").unwrap(), &UniqueWhere::by("id", uuid(2)), &data)
        .await
        .unwrap();

    assert_eq!(
        results[1].kind,
        MutationResultKind::ConstraintViolation {
            constraint: ConstraintType::NotNull
        }
    );
    assert_eq!(results[1].path, vec![PathSegment::field("author")]);
    assert_eq!(db.statements(), vec![r#"SELECT "id" FROM "post" WHERE "id" = $1 LIMIT 1"#]);
}

#[tokio::test]
async fn nested_creates_are_reported_with_their_alias() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "author""#, Response::id(uuid(1)))
        .respond(r#"INSERT INTO "post""#, Response::id(uuid(2)));

    let post = DataInput::new().with_value("title", "Hello");
    let data = DataInput::new().with_many("posts", vec![HasManyItem::aliased("first", HasManyInput::Create(post))]);

    let results = mapper(&schema, &db, &settings)
        .update(schema.entity("Author").unwrap(), &UniqueWhere::by("id", uuid(1)), &data)
        .await
        .unwrap();

    assert_eq!(update_primary(&results), Some(&uuid(1)));
    assert_eq!(insert_primary(&results[1..]), Some(&uuid(2)));
    assert_eq!(
        results[1].path,
        vec![
            PathSegment::field("posts"),
            PathSegment::index(0, Some("first".to_owned()))
        ]
    );
    assert_eq!(
        db.statements()[1],
        r#"INSERT INTO "post" ("title","author_id","id") VALUES ($1,$2,$3) RETURNING "id""#
    );
    assert_eq!(db.params(1)[1], uuid(1));
}

#[tokio::test]
async fn inverse_many_to_many_connects_write_the_owning_junction_columns() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "tag""#, Response::id(uuid(5)))
        .respond(r#"SELECT "id" FROM "post""#, Response::id(uuid(2)))
        .respond(r#"SELECT "id" FROM "post""#, Response::id(uuid(3)))
        .respond(r#"INSERT INTO "post_tags""#, Response::Affected(1))
        .respond(r#"INSERT INTO "post_tags""#, Response::Affected(0));

    let data = DataInput::new().with_many(
        "posts",
        vec![
            HasManyItem::new(HasManyInput::Connect(UniqueWhere::by("id", uuid(2)))),
            HasManyItem::new(HasManyInput::Connect(UniqueWhere::by("id", uuid(3)))),
        ],
    );

    let results = mapper(&schema, &db, &settings)
        .update(schema.entity("Tag").unwrap(), &UniqueWhere::by("id", uuid(5)), &data)
        .await
        .unwrap();

    assert_eq!(
        results[1].kind,
        MutationResultKind::JunctionUpdateOk {
            entity: "Post".to_owned(),
            relation: "tags".to_owned(),
            owner: uuid(2),
            inversed: uuid(5),
        }
    );
    assert_eq!(
        results[2].kind,
        MutationResultKind::NothingToDo {
            reason: NothingToDoReason::AlreadyExists
        }
    );
    assert_eq!(
        results[2].path,
        vec![PathSegment::field("posts"), PathSegment::index(1, None)]
    );

    let statements = db.statements();
    assert_eq!(
        statements[2],
        r#"INSERT INTO "post_tags" ("post_id","tag_id") VALUES ($1,$2) ON CONFLICT DO NOTHING"#
    );
    assert_eq!(db.params(2), vec![uuid(2), uuid(5)]);
}

#[tokio::test]
async fn disconnecting_an_unlinked_tag_has_nothing_to_do() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"SELECT "id" FROM "post""#, Response::id(uuid(2)))
        .respond(r#"SELECT "id" FROM "tag""#, Response::id(uuid(5)))
        .respond(r#"DELETE FROM "post_tags""#, Response::Affected(0));

    let data = DataInput::new().with_many(
        "tags",
        vec![HasManyItem::new(HasManyInput::Disconnect(UniqueWhere::by("label", "rust")))],
    );

    let results = mapper(&schema, &db, &settings)
        .update(schema.entity("Post").unwrap(), &UniqueWhere::by("id", uuid(2)), &data)
        .await
        .unwrap();

    assert_eq!(
        results[1].kind,
        MutationResultKind::NothingToDo {
            reason: NothingToDoReason::EmptyRelation
        }
    );
    assert_eq!(
        db.statements(),
        vec![
            r#"SELECT "id" FROM "post" WHERE "id" = $1 LIMIT 1"#,
            r#"SELECT "id" FROM "tag" WHERE "label" = $1 LIMIT 1"#,
            r#"DELETE FROM "post_tags" WHERE ("post_id" = $1 AND "tag_id" = $2)"#,
        ]
    );
}

#[tokio::test]
async fn unique_violations_become_results() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    db.respond(r#"INSERT INTO "tag""#, Response::unique_violation("tag_label_key"));

    let data = DataInput::new().with_value("label", "rust");

    let results = mapper(&schema, &db, &settings)
        .insert(schema.entity("Tag").unwrap(), &data)
        .await
        .unwrap();

    assert_eq!(
        results,
        vec![query_core::MutationResult::constraint_violation(ConstraintType::UniqueKey)]
    );
}

#[tokio::test]
async fn updating_a_missing_row_is_not_found() {
    let schema = blog_schema();
    let settings = MutationSettings::default();
    let db = TestDb::default();

    let by = UniqueWhere::by("title", "Nope");
    let data = DataInput::new().with_value("title", "Hello");

    let results = mapper(&schema, &db, &settings)
        .update(schema.entity("Post").unwrap(), &by, &data)
        .await
        .unwrap();

    assert_eq!(results, vec![query_core::MutationResult::not_found(by)]);
    assert_eq!(db.statements(), vec![r#"SELECT "id" FROM "post" WHERE "title" = $1 LIMIT 1"#]);
}
