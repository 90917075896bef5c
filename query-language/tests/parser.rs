use content_value::ContentValue;
use expect_test::expect;
use pretty_assertions::assert_eq;
use query_language::{parser::*, tree_parameters::*, Environment, EntryPoint, ParsedExpression};
use query_structure::Condition;

fn empty() -> Environment {
    Environment::new()
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

#[test]
fn variables_do_not_confuse_maximal_munch() {
    let environment = Environment::create(
        [
            ("a", ContentValue::Int(123)),
            ("ab", ContentValue::Int(456)),
            ("fieldVariable", ContentValue::from("fieldVariableName")),
            ("literal", ContentValue::literal("literal")),
            ("x", ContentValue::from("x")),
        ],
        Vec::<(String, Vec<ContentValue>)>::new(),
    );

    let parsed = parse_relative_single_field(
        "a(a=$a).$fieldVariable(ab=$ab, literalColumn=$literal).x(x=$x).foo",
        &environment,
    )
    .unwrap();

    let expected = DesugaredRelativeSingleField {
        has_one_relation_path: vec![
            DesugaredHasOneRelation {
                reduced_by: Some(UniqueWhere::by("a", ContentValue::Int(123))),
                ..DesugaredHasOneRelation::new("a")
            },
            DesugaredHasOneRelation {
                reduced_by: Some(
                    UniqueWhere::by("ab", ContentValue::Int(456)).with("literalColumn", ContentValue::literal("literal")),
                ),
                ..DesugaredHasOneRelation::new("fieldVariableName")
            },
            DesugaredHasOneRelation {
                reduced_by: Some(UniqueWhere::by("x", "x")),
                ..DesugaredHasOneRelation::new("x")
            },
        ],
        field: "foo".to_owned(),
    };

    assert_eq!(parsed, expected);
}

#[test]
fn plain_qualified_field_list() {
    let parsed = parse_qualified_field_list("Author.name", &empty()).unwrap();

    assert_eq!(
        parsed,
        DesugaredQualifiedFieldList {
            entity_name: "Author".to_owned(),
            filter: None,
            has_one_relation_path: vec![],
            field: "name".to_owned(),
        }
    );
}

#[test]
fn filtered_qualified_field_list() {
    let parsed = parse("Author[age > 20].son.name", EntryPoint::QualifiedFieldList, &empty()).unwrap();

    assert_eq!(
        parsed,
        ParsedExpression::QualifiedFieldList(DesugaredQualifiedFieldList {
            entity_name: "Author".to_owned(),
            filter: Some(Filter::field("age", Condition::GreaterThan(ContentValue::Int(20)))),
            has_one_relation_path: vec![DesugaredHasOneRelation::new("son")],
            field: "name".to_owned(),
        })
    );
}

#[test]
fn parsing_is_deterministic() {
    let environment = Environment::create([("slug", ContentValue::from("sciFi"))], Vec::<(String, Vec<_>)>::new());
    let input = "genres(slug = $slug).authors[age < 123][name != null]";

    assert_eq!(
        parse_relative_entity_list(input, &environment).unwrap(),
        parse_relative_entity_list(input, &environment).unwrap()
    );
}

#[test]
fn relative_entity_list_moves_the_last_filter_to_the_has_many_relation() {
    let parsed = parse_relative_entity_list("genres(slug = 'sciFi').authors[age < 123][name != null]", &empty()).unwrap();

    assert_eq!(
        parsed,
        DesugaredRelativeEntityList {
            has_one_relation_path: vec![DesugaredHasOneRelation {
                reduced_by: Some(UniqueWhere::by("slug", "sciFi")),
                ..DesugaredHasOneRelation::new("genres")
            }],
            has_many_relation: DesugaredHasManyRelation {
                field: "authors".to_owned(),
                filter: Some(Filter::and(vec![
                    Filter::field("age", Condition::LessThan(ContentValue::Int(123))),
                    Filter::field("name", Condition::Null(false)),
                ])),
            },
        }
    );
}

#[test]
fn qualified_single_entity_with_a_relation_path() {
    let parsed = parse_qualified_single_entity("Author(id = 123).son.sister", &empty()).unwrap();

    assert_eq!(
        parsed,
        DesugaredQualifiedSingleEntity {
            entity_name: "Author".to_owned(),
            unique_where: UniqueWhere::by("id", ContentValue::Int(123)),
            filter: None,
            has_one_relation_path: vec![DesugaredHasOneRelation::new("son"), DesugaredHasOneRelation::new("sister")],
        }
    );
}

#[test]
fn unconstrained_list_may_stop_at_the_entity() {
    let parsed = parse_unconstrained_qualified_entity_list("Author", &empty()).unwrap();

    assert_eq!(parsed.entity_name, "Author");
    assert!(parsed.has_one_relation_path.is_empty());
}

#[test]
fn entity_names_may_come_from_variables() {
    let environment = Environment::create([("entity", ContentValue::from("Article"))], Vec::<(String, Vec<_>)>::new());

    let parsed = parse_qualified_entity_list("$entity[published = true].category", &environment).unwrap();

    assert_eq!(parsed.entity_name, "Article");
    assert_eq!(
        parsed.filter,
        Some(Filter::field("published", Condition::Equals(ContentValue::Boolean(true))))
    );
}

#[test]
fn nested_filter_paths_and_literals() {
    let parsed = parse_filter("[author.son.status = DRAFT or not author.age >= 1.5]", &empty()).unwrap();

    assert_eq!(
        parsed,
        Filter::or(vec![
            Filter::path(
                &path(&["author", "son", "status"]),
                Condition::Equals(ContentValue::literal("DRAFT"))
            ),
            Filter::not(Filter::path(
                &path(&["author", "age"]),
                Condition::GreaterThanOrEquals(ContentValue::parse_number("1.5").unwrap())
            )),
        ])
    );
}

#[test]
fn order_by_defaults_to_ascending() {
    let parsed = parse_order_by("items.order, items.content.name desc", &empty()).unwrap();

    assert_eq!(
        parsed,
        vec![
            OrderByField::new(path(&["items", "order"]), SortOrder::Ascending),
            OrderByField::new(path(&["items", "content", "name"]), SortOrder::Descending),
        ]
    );
}

#[test]
fn single_valued_dimensions_are_unwrapped() {
    let environment = Environment::new().with_dimensions([("locale", vec![ContentValue::from("en")])]);

    let parsed = parse_unique_where("(locale.code = $locale)", &environment).unwrap();

    assert_eq!(
        parsed,
        UniqueWhere::new().with_relation("locale", UniqueWhere::by("code", "en"))
    );
}

#[test]
fn null_only_supports_equality() {
    let err = parse_filter("[age < null]", &empty()).unwrap_err();

    expect!["The null keyword as a right hand operand can only be tested for (in)equality."].assert_eq(&err.to_string());
}

#[test]
fn duplicate_unique_fields_are_rejected() {
    let err = parse_unique_where("(author.id = 1, author.id = 2)", &empty()).unwrap_err();

    expect!["Duplicate 'author.id' field"].assert_eq(&err.to_string());
}

#[test]
fn scalar_and_relation_on_one_unique_path_are_rejected() {
    let err = parse_unique_where("(author = 1, author.id = 2)", &empty()).unwrap_err();

    expect!["Malformed expression: cannot simultaneously treat the 'author' field as a scalar as well as a relation."]
        .assert_eq(&err.to_string());
}

#[test]
fn unknown_order_directions_are_rejected() {
    let err = parse_order_by("name up", &empty()).unwrap_err();

    expect!["The only valid order directions are `asc` and `desc`."].assert_eq(&err.to_string());
}

#[test]
fn the_last_field_cannot_be_filtered() {
    let err = parse_relative_single_field("author.name[length > 3]", &empty()).unwrap_err();

    expect![[r#"Cannot parse 'author.name[length > 3]': the last field 'name' is being reduced or filtered, which, grammatically, makes it a relation but a single field is expected."#]]
        .assert_eq(&err.to_string());
}

#[test]
fn undefined_variables_fail() {
    let err = parse_filter("[age = $age]", &empty()).unwrap_err();

    expect!["Undefined variable $age."].assert_eq(&err.to_string());
}

#[test]
fn multi_valued_dimensions_fail_with_guidance() {
    let environment = Environment::new().with_dimensions([("locale", vec!["en".into(), "cs".into()])]);

    let err = parse_unique_where("(code = $locale)", &environment).unwrap_err();

    expect![[r#"The variable $locale resolved to a dimension which exists but contains 2 values. It has to contain exactly one. Perhaps you forgot to set the 'maxItems' prop of your DimensionsSwitcher?"#]]
        .assert_eq(&err.to_string());
}

#[test]
fn variables_must_have_the_right_shape() {
    let environment = Environment::create(
        [
            ("field", ContentValue::from("Not a field")),
            ("entity", ContentValue::from("author")),
            ("flag", ContentValue::Boolean(true)),
        ],
        Vec::<(String, Vec<_>)>::new(),
    );

    let err = parse_relative_single_entity("$field", &environment).unwrap_err();
    expect!["The value $field is not a valid field identifier."].assert_eq(&err.to_string());

    let err = parse_unconstrained_qualified_entity_list("$entity", &environment).unwrap_err();
    expect!["The value of the variable $entity is not a valid entity identifier."].assert_eq(&err.to_string());

    let err = parse_unique_where("(id = $flag)", &environment).unwrap_err();
    expect!["A variable can resolve to a literal, string or a number, not boolean"].assert_eq(&err.to_string());
}

#[test]
fn lexical_errors_are_reported_together() {
    let err = parse_filter("[a # 1 ~ 2]", &empty()).unwrap_err();

    expect![[r#"
        Failed to tokenize '[a # 1 ~ 2]'.

        unexpected character(s) '#' at offset 3, skipped 1 character(s).
        unexpected character(s) '~' at offset 7, skipped 1 character(s)."#]]
    .assert_eq(&err.to_string());
}
