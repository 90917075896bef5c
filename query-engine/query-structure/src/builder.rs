use crate::{
    Column, ColumnType, DomainError, Entity, Field, JoiningColumn, JoiningTable, OnDelete, Relation, RelationDefinition,
    Schema, UniqueConstraint,
};
use heck::ToSnakeCase;
use indexmap::IndexMap;

/// Fluent construction of a [`Schema`], mostly for tests and embedders.
///
/// Naming conventions: tables are the snake-cased entity name, joining columns are
/// `<relation>_id`, junction tables are `<owner>_<relation>` with one `<entity>_id` column per side.
///
/// ```
/// # use query_structure::*;
/// let schema = SchemaBuilder::default()
///     .entity("Author", |e| e.column("name", ColumnType::String).one_has_many("posts", "Post", "author"))
///     .entity("Post", |e| e.many_has_one("author", "Author", |r| r.inversed_by("posts").on_delete(OnDelete::Cascade)))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.entity("Post").unwrap().column_name_of("author").unwrap(), "author_id");
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: IndexMap<String, Entity>,
}

impl SchemaBuilder {
    pub fn entity(mut self, name: &str, configure: impl FnOnce(EntityBuilder) -> EntityBuilder) -> Self {
        let entity = configure(EntityBuilder::new(name)).build();
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn build(self) -> Result<Schema, DomainError> {
        let schema = Schema {
            entities: self.entities,
        };

        schema.validate()?;

        Ok(schema)
    }
}

#[derive(Debug)]
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    fn new(name: &str) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(
            "id".to_owned(),
            Field::Column(Column {
                name: "id".to_owned(),
                column_name: "id".to_owned(),
                column_type: ColumnType::Uuid,
                nullable: false,
            }),
        );

        EntityBuilder {
            entity: Entity {
                name: name.to_owned(),
                primary: "id".to_owned(),
                primary_column: "id".to_owned(),
                table_name: name.to_snake_case(),
                fields,
                unique: Vec::new(),
            },
        }
    }

    pub fn table_name(mut self, table_name: &str) -> Self {
        self.entity.table_name = table_name.to_owned();
        self
    }

    /// A nullable column named after the field.
    pub fn column(self, name: &str, column_type: ColumnType) -> Self {
        self.add_column(name, column_type, true)
    }

    pub fn required_column(self, name: &str, column_type: ColumnType) -> Self {
        self.add_column(name, column_type, false)
    }

    pub fn unique(mut self, fields: &[&str]) -> Self {
        self.entity.unique.push(UniqueConstraint {
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
        });
        self
    }

    pub fn many_has_one(self, name: &str, target: &str, configure: impl FnOnce(RelationBuilder) -> RelationBuilder) -> Self {
        let options = configure(RelationBuilder::default());
        let definition = RelationDefinition::ManyHasOne {
            joining_column: options.joining_column(name),
            nullable: options.nullable,
            inversed_by: options.inversed_by,
        };

        self.add_relation(name, target, definition)
    }

    pub fn one_has_many(self, name: &str, target: &str, owned_by: &str) -> Self {
        let definition = RelationDefinition::OneHasMany {
            owned_by: owned_by.to_owned(),
        };

        self.add_relation(name, target, definition)
    }

    /// The owning side of a one-to-one relation.
    pub fn one_has_one(self, name: &str, target: &str, configure: impl FnOnce(RelationBuilder) -> RelationBuilder) -> Self {
        let options = configure(RelationBuilder::default());
        let definition = RelationDefinition::OneHasOneOwning {
            joining_column: options.joining_column(name),
            nullable: options.nullable,
            inversed_by: options.inversed_by,
            orphan_removal: options.orphan_removal,
        };

        self.add_relation(name, target, definition)
    }

    pub fn one_has_one_inverse(
        self,
        name: &str,
        target: &str,
        owned_by: &str,
        configure: impl FnOnce(RelationBuilder) -> RelationBuilder,
    ) -> Self {
        let options = configure(RelationBuilder::default());
        let definition = RelationDefinition::OneHasOneInverse {
            owned_by: owned_by.to_owned(),
            nullable: options.nullable,
        };

        self.add_relation(name, target, definition)
    }

    pub fn many_has_many(self, name: &str, target: &str, configure: impl FnOnce(RelationBuilder) -> RelationBuilder) -> Self {
        let options = configure(RelationBuilder::default());
        let owner = self.entity.name.to_snake_case();
        let mut inverse = target.to_snake_case();

        if inverse == owner {
            inverse = name.to_snake_case();
        }

        let definition = RelationDefinition::ManyHasManyOwning {
            joining_table: JoiningTable {
                table_name: format!("{}_{}", owner, name.to_snake_case()),
                joining_column: JoiningColumn {
                    column_name: format!("{owner}_id"),
                    on_delete: OnDelete::Cascade,
                },
                inverse_joining_column: JoiningColumn {
                    column_name: format!("{inverse}_id"),
                    on_delete: OnDelete::Cascade,
                },
            },
            inversed_by: options.inversed_by,
        };

        self.add_relation(name, target, definition)
    }

    pub fn many_has_many_inverse(self, name: &str, target: &str, owned_by: &str) -> Self {
        let definition = RelationDefinition::ManyHasManyInverse {
            owned_by: owned_by.to_owned(),
        };

        self.add_relation(name, target, definition)
    }

    fn add_column(mut self, name: &str, column_type: ColumnType, nullable: bool) -> Self {
        let column = Column {
            name: name.to_owned(),
            column_name: name.to_snake_case(),
            column_type,
            nullable,
        };

        self.entity.fields.insert(name.to_owned(), Field::Column(column));
        self
    }

    fn add_relation(mut self, name: &str, target: &str, definition: RelationDefinition) -> Self {
        let relation = Relation {
            name: name.to_owned(),
            target: target.to_owned(),
            definition,
        };

        self.entity.fields.insert(name.to_owned(), Field::Relation(relation));
        self
    }

    fn build(self) -> Entity {
        self.entity
    }
}

/// Options shared by the relation constructors of [`EntityBuilder`]. Options that do not apply
/// to a relation kind are ignored.
#[derive(Debug, Clone)]
pub struct RelationBuilder {
    nullable: bool,
    on_delete: OnDelete,
    inversed_by: Option<String>,
    orphan_removal: bool,
    joining_column: Option<String>,
}

impl Default for RelationBuilder {
    fn default() -> Self {
        RelationBuilder {
            nullable: true,
            on_delete: OnDelete::Restrict,
            inversed_by: None,
            orphan_removal: false,
            joining_column: None,
        }
    }
}

impl RelationBuilder {
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn on_delete(mut self, on_delete: OnDelete) -> Self {
        self.on_delete = on_delete;
        self
    }

    pub fn inversed_by(mut self, relation: &str) -> Self {
        self.inversed_by = Some(relation.to_owned());
        self
    }

    pub fn orphan_removal(mut self) -> Self {
        self.orphan_removal = true;
        self
    }

    pub fn joining_column_name(mut self, column_name: &str) -> Self {
        self.joining_column = Some(column_name.to_owned());
        self
    }

    fn joining_column(&self, relation: &str) -> JoiningColumn {
        JoiningColumn {
            column_name: self
                .joining_column
                .clone()
                .unwrap_or_else(|| format!("{}_id", relation.to_snake_case())),
            on_delete: self.on_delete,
        }
    }
}
