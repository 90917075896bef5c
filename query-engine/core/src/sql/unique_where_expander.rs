use crate::{error::CoreError, CoreResult};
use query_structure::{Entity, UniqueWhere, Where};
use std::collections::HashSet;

/// Turns a unique where into a filter after checking it covers the primary key or one of the
/// unique keys of the entity. Extra fields narrow the match further.
pub fn expand_unique_where(entity: &Entity, by: &UniqueWhere) -> CoreResult<Where> {
    let given: HashSet<&str> = by.keys().collect();
    let is_unique = entity
        .unique_keys()
        .iter()
        .any(|key| key.iter().all(|field| given.contains(field)));

    if !is_unique {
        return Err(CoreError::non_unique_where(&entity.name, by.keys()));
    }

    Ok(by.to_where())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use query_structure::{ColumnType, Condition, SchemaBuilder};

    fn schema() -> query_structure::Schema {
        SchemaBuilder::default()
            .entity("Author", |e| e.column("name", ColumnType::String))
            .entity("Post", |e| {
                e.column("slug", ColumnType::String)
                    .column("locale", ColumnType::String)
                    .column("title", ColumnType::String)
                    .unique(&["slug", "locale"])
            })
            .entity("Profile", |e| e.one_has_one("author", "Author", |r| r))
            .build()
            .unwrap()
    }

    #[test]
    fn composite_keys_need_every_field() {
        let schema = schema();
        let post = schema.entity("Post").unwrap();

        let partial = UniqueWhere::by("slug", "intro");
        let err = expand_unique_where(post, &partial).unwrap_err();
        assert_eq!(err.to_string(), "Unique where on `Post` does not cover a unique key: slug");

        let full = partial.with("locale", "en").with("title", "Intro");
        let filter = expand_unique_where(post, &full).unwrap();
        assert_eq!(filter.fields.len(), 3);
    }

    #[test]
    fn owning_one_to_one_relations_identify_a_row() {
        let schema = schema();
        let profile = schema.entity("Profile").unwrap();
        let by = UniqueWhere::new().with_relation("author", UniqueWhere::by("id", 1));

        let filter = expand_unique_where(profile, &by).unwrap();

        assert_eq!(
            filter,
            Where::relation("author", Where::field("id", Condition::Equals(1.into())))
        );
    }
}
