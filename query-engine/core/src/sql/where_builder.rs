use super::condition_builder::build_condition;
use crate::CoreResult;
use quaint::ast::{Column, Comparable, ConditionTree, Expression, Select};
use query_structure::{Condition, DomainError, Entity, FieldWhere, Relation, RelationKind, Schema, Where};

/// Translates a [`Where`] into a condition on the table of an entity.
///
/// Relation filters become `IN` sub-selections on the side holding the foreign key. A filter on
/// nothing but the target's primary key of an owning relation is applied to the joining column
/// directly.
#[derive(Clone, Copy)]
pub struct WhereBuilder<'a> {
    schema: &'a Schema,
}

impl<'a> WhereBuilder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        WhereBuilder { schema }
    }

    pub fn build(&self, entity: &Entity, filter: &Where) -> CoreResult<ConditionTree<'static>> {
        let mut parts = Vec::new();

        if !filter.and.is_empty() {
            parts.push(ConditionTree::And(self.operands(entity, &filter.and)?));
        }

        if !filter.or.is_empty() {
            parts.push(ConditionTree::Or(self.operands(entity, &filter.or)?));
        }

        if let Some(not) = &filter.not {
            parts.push(ConditionTree::not(self.build(entity, not)?));
        }

        for (field, field_where) in &filter.fields {
            let condition = match field_where {
                FieldWhere::Condition(condition) => build_condition(column(entity.column_name_of(field)?), condition),
                FieldWhere::Relation(nested) => self.relation(entity, entity.relation(field)?, nested)?,
            };

            parts.push(condition);
        }

        Ok(match parts.len() {
            0 => ConditionTree::NoCondition,
            1 => parts.remove(0),
            _ => ConditionTree::And(parts.into_iter().map(Expression::from).collect()),
        })
    }

    fn operands(&self, entity: &Entity, filters: &[Where]) -> CoreResult<Vec<Expression<'static>>> {
        filters
            .iter()
            .map(|filter| self.build(entity, filter).map(Expression::from))
            .collect()
    }

    fn relation(&self, entity: &Entity, relation: &Relation, nested: &Where) -> CoreResult<ConditionTree<'static>> {
        let target = self.schema.target_entity(relation)?;

        let condition = match relation.kind() {
            RelationKind::ManyHasOne | RelationKind::OneHasOneOwning => {
                let joining_column = column(entity.column_name_of(&relation.name)?);

                if let Some(condition) = primary_only(target, nested) {
                    return Ok(build_condition(joining_column, condition));
                }

                joining_column.in_selection(self.primaries(target, nested)?)
            }
            RelationKind::OneHasMany | RelationKind::OneHasOneInverse => {
                let owning = self.owning_side(entity, relation)?;
                let owners = Select::from_table(target.table_name.clone())
                    .column(column(target.column_name_of(&owning.name)?))
                    .so_that(self.build(target, nested)?);

                column(&entity.primary_column).in_selection(owners)
            }
            RelationKind::ManyHasManyOwning | RelationKind::ManyHasManyInverse => {
                let (owning, is_owner) = match relation.kind() {
                    RelationKind::ManyHasManyOwning => (relation, true),
                    _ => (self.owning_side(entity, relation)?, false),
                };

                let junction = owning.joining_table().ok_or_else(|| {
                    DomainError::invalid_relation(&entity.name, &relation.name, "missing junction table")
                })?;

                let (this_side, other_side) = match is_owner {
                    true => (&junction.joining_column, &junction.inverse_joining_column),
                    false => (&junction.inverse_joining_column, &junction.joining_column),
                };

                let linked = Select::from_table(junction.table_name.clone())
                    .column(column(&this_side.column_name))
                    .so_that(column(&other_side.column_name).in_selection(self.primaries(target, nested)?));

                column(&entity.primary_column).in_selection(linked)
            }
        };

        Ok(condition.into())
    }

    fn primaries(&self, target: &Entity, nested: &Where) -> CoreResult<Select<'static>> {
        Ok(Select::from_table(target.table_name.clone())
            .column(column(&target.primary_column))
            .so_that(self.build(target, nested)?))
    }

    fn owning_side(&self, entity: &Entity, relation: &Relation) -> CoreResult<&'a Relation> {
        self.schema
            .target_relation(relation)?
            .ok_or_else(|| DomainError::invalid_relation(&entity.name, &relation.name, "missing owning side").into())
    }
}

fn column(name: &str) -> Column<'static> {
    Column::new(name.to_owned())
}

/// The condition of a filter that constrains the primary key of `target` and nothing else.
fn primary_only<'w>(target: &Entity, filter: &'w Where) -> Option<&'w Condition> {
    if !filter.and.is_empty() || !filter.or.is_empty() || filter.not.is_some() || filter.fields.len() != 1 {
        return None;
    }

    match filter.fields.get(&target.primary) {
        Some(FieldWhere::Condition(condition)) => Some(condition),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_value::ContentValue;
    use expect_test::{expect, Expect};
    use quaint::visitor::{Postgres, Visitor};
    use query_structure::{ColumnType, SchemaBuilder};

    fn schema() -> Schema {
        SchemaBuilder::default()
            .entity("Author", |e| {
                e.column("name", ColumnType::String)
                    .one_has_many("posts", "Post", "author")
                    .one_has_one_inverse("profile", "Profile", "author", |r| r)
            })
            .entity("Post", |e| {
                e.column("title", ColumnType::String)
                    .many_has_one("author", "Author", |r| r.inversed_by("posts"))
                    .many_has_many("tags", "Tag", |r| r.inversed_by("posts"))
            })
            .entity("Profile", |e| e.one_has_one("author", "Author", |r| r.inversed_by("profile")))
            .entity("Tag", |e| e.column("label", ColumnType::String).many_has_many_inverse("posts", "Post", "tags"))
            .build()
            .unwrap()
    }

    fn check(entity: &str, filter: Where, expected: Expect) {
        let schema = schema();
        let entity = schema.entity(entity).unwrap();
        let condition = WhereBuilder::new(&schema).build(entity, &filter).unwrap();
        let (sql, _) = Postgres::build(Select::from_table(entity.table_name.clone()).so_that(condition)).unwrap();

        expected.assert_eq(&sql);
    }

    fn title(value: &str) -> Where {
        Where::field("title", Condition::Equals(value.into()))
    }

    #[test]
    fn logical_operators_combine_with_fields() {
        let filter = Where {
            or: vec![title("a"), title("b")],
            not: Some(Box::new(Where::field("title", Condition::IsNull(true)))),
            ..title("c")
        };

        check(
            "Post",
            filter,
            expect![[r#"SELECT * FROM "post" WHERE (("title" = $1 OR "title" = $2) AND NOT ("title" IS NULL) AND "title" = $3)"#]],
        );
    }

    #[test]
    fn primary_filters_on_owning_relations_use_the_joining_column() {
        let filter = Where::relation("author", Where::field("id", Condition::In(vec![ContentValue::Int(1)])));

        check("Post", filter, expect![[r#"SELECT * FROM "post" WHERE "author_id" IN ($1)"#]]);
    }

    #[test]
    fn other_owning_relation_filters_select_the_target() {
        let filter = Where::relation("author", Where::field("name", Condition::Equals("John".into())));

        check(
            "Post",
            filter,
            expect![[r#"SELECT * FROM "post" WHERE "author_id" IN (SELECT "id" FROM "author" WHERE "name" = $1)"#]],
        );
    }

    #[test]
    fn inverse_relations_select_the_owning_column() {
        check(
            "Author",
            Where::relation("posts", title("Hello")),
            expect![[r#"SELECT * FROM "author" WHERE "id" IN (SELECT "author_id" FROM "post" WHERE "title" = $1)"#]],
        );
    }

    #[test]
    fn many_to_many_relations_go_through_the_junction_table() {
        let label = Where::field("label", Condition::Equals("rust".into()));

        check(
            "Post",
            Where::relation("tags", label),
            expect![[r#"SELECT * FROM "post" WHERE "id" IN (SELECT "post_id" FROM "post_tags" WHERE "tag_id" IN (SELECT "id" FROM "tag" WHERE "label" = $1))"#]],
        );

        check(
            "Tag",
            Where::relation("posts", title("Hello")),
            expect![[r#"SELECT * FROM "tag" WHERE "id" IN (SELECT "tag_id" FROM "post_tags" WHERE "post_id" IN (SELECT "id" FROM "post" WHERE "title" = $1))"#]],
        );
    }

    #[test]
    fn an_empty_filter_matches_everything() {
        check("Post", Where::default(), expect![[r#"SELECT * FROM "post" WHERE 1=1"#]]);
    }
}
