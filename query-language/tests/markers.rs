use content_value::ContentValue;
use pretty_assertions::assert_eq;
use query_language::{
    markers::{placeholder, EntityFields, FieldMarker, Marker, MarkerTreeRoot, ReferenceMarker, ReferencePreferences, TreeId},
    parser::{parse_filter, parse_unique_where},
    tree_parameters::{ExpectedEntityCount, Filter, UniqueWhere},
    Environment,
};

fn filter(input: &str) -> Filter {
    parse_filter(input, &Environment::new()).unwrap()
}

fn unique(input: &str) -> UniqueWhere {
    parse_unique_where(input, &Environment::new()).unwrap()
}

fn reference(field: &str, filter: Option<Filter>, reduced_by: Option<UniqueWhere>) -> ReferenceMarker {
    ReferenceMarker::new(
        field,
        ExpectedEntityCount::PossiblyMany,
        EntityFields::new(),
        filter,
        reduced_by,
        None,
    )
    .unwrap()
}

fn only_placeholder(marker: &ReferenceMarker) -> &str {
    assert_eq!(marker.references.len(), 1);
    marker.references.keys().next().unwrap()
}

#[test]
fn unconstrained_references_use_the_field_name() {
    let marker = reference("authors", None, None);

    assert_eq!(only_placeholder(&marker), "authors");
}

#[test]
fn equal_constraints_share_a_placeholder() {
    let a = reference("authors", Some(filter("[age > 20]")), None);
    let b = reference("authors", Some(filter("[age > 20]")), None);

    assert_eq!(only_placeholder(&a), only_placeholder(&b));
    assert!(only_placeholder(&a).starts_with("authors_"));
}

#[test]
fn different_constraints_get_different_placeholders() {
    let a = reference("authors", Some(filter("[age > 20]")), None);
    let b = reference("authors", Some(filter("[age > 21]")), None);
    let c = reference("authors", None, Some(unique("(slug = 'a')")));

    assert_ne!(only_placeholder(&a), only_placeholder(&b));
    assert_ne!(only_placeholder(&a), only_placeholder(&c));
}

#[test]
fn literals_and_strings_of_the_same_text_get_different_placeholders() {
    let string = reference("posts", Some(filter("[status = 'DRAFT']")), None);
    let literal = reference("posts", Some(filter("[status = DRAFT]")), None);

    assert_ne!(only_placeholder(&string), only_placeholder(&literal));

    let string = reference("posts", None, Some(unique("(slug = 'DRAFT')")));
    let literal = reference("posts", None, Some(unique("(slug = DRAFT)")));

    assert_ne!(only_placeholder(&string), only_placeholder(&literal));
}

#[test]
fn placeholders_do_not_depend_on_key_order() {
    let a = reference("localesByLocale", None, Some(unique("(locale.slug = 'en', locale.region = 'us')")));
    let b = reference("localesByLocale", None, Some(unique("(locale.region = 'us', locale.slug = 'en')")));

    assert_eq!(only_placeholder(&a), only_placeholder(&b));
}

#[test]
fn merging_collapses_identical_references() {
    let fields = EntityFields::new().with(Marker::Field(FieldMarker::new("name"))).unwrap();
    let a = ReferenceMarker::new(
        "authors",
        ExpectedEntityCount::PossiblyMany,
        fields,
        Some(filter("[age > 20]")),
        None,
        None,
    )
    .unwrap();

    let other_fields = EntityFields::new().with(Marker::Field(FieldMarker::new("age"))).unwrap();
    let b = ReferenceMarker::new(
        "authors",
        ExpectedEntityCount::PossiblyMany,
        other_fields,
        Some(filter("[age > 20]")),
        None,
        Some(ReferencePreferences { initial_entity_count: 3 }),
    )
    .unwrap();

    let merged = a.merge(b).unwrap();
    let reference = merged.references.values().next().unwrap();

    assert_eq!(merged.references.len(), 1);
    assert_eq!(reference.fields.len(), 2);
    assert_eq!(reference.preferences.initial_entity_count, 3);
}

#[test]
fn references_prefer_one_entity_by_default() {
    let to_one = ReferenceMarker::new("author", ExpectedEntityCount::UpToOne, EntityFields::new(), None, None, None).unwrap();
    let to_many = reference("authors", None, None);

    for marker in [to_one, to_many] {
        let reference = marker.references.values().next().unwrap();
        assert_eq!(reference.preferences, ReferencePreferences::default());
        assert_eq!(reference.preferences.initial_entity_count, 1);
    }
}

#[test]
fn invalid_preferences_are_rejected() {
    let err = ReferenceMarker::new(
        "author",
        ExpectedEntityCount::UpToOne,
        EntityFields::new(),
        None,
        None,
        Some(ReferencePreferences { initial_entity_count: 2 }),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "A ToOne reference cannot prefer more than one entity!");

    let err = ReferenceMarker::new(
        "authors",
        ExpectedEntityCount::PossiblyMany,
        EntityFields::new(),
        None,
        None,
        Some(ReferencePreferences { initial_entity_count: -1 }),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The preferred 'initialEntityCount' for a relation must be a non-negative integer!"
    );
}

#[test]
fn reductions_need_exactly_one_field() {
    let err = ReferenceMarker::new(
        "authors",
        ExpectedEntityCount::UpToOne,
        EntityFields::new(),
        None,
        Some(UniqueWhere::by("slug", "a").with("locale", ContentValue::literal("en"))),
        None,
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "A hasMany relation can only be reduced to a hasOne by exactly one field."
    );
}

#[test]
fn tree_roots_prefer_the_subtree_identifier() {
    let mut root = MarkerTreeRoot::new(TreeId(4), EntityFields::new());
    assert_eq!(root.placeholder_name(), "root_4");

    root.subtree_identifier = Some("sidebar".to_owned());
    assert_eq!(root.placeholder_name(), "root_sidebar");
    assert_eq!(placeholder::field_placeholder("name"), "name");
}
