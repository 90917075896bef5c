use crate::{Column, DomainError, Field, Relation, RelationKind};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The read-only content model consulted by the mutation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub entities: IndexMap<String, Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub primary: String,
    pub primary_column: String,
    pub table_name: String,
    pub fields: IndexMap<String, Field>,
    #[serde(default)]
    pub unique: Vec<UniqueConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueConstraint {
    pub fields: Vec<String>,
}

impl Schema {
    pub fn from_json(json: &str) -> Result<Schema, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn entity(&self, name: &str) -> Result<&Entity, DomainError> {
        self.entities
            .get(name)
            .ok_or_else(|| DomainError::EntityNotFound { name: name.to_owned() })
    }

    pub fn target_entity(&self, relation: &Relation) -> Result<&Entity, DomainError> {
        self.entity(&relation.target)
    }

    /// The relation on the target entity that is paired with `relation`, if any.
    pub fn target_relation(&self, relation: &Relation) -> Result<Option<&Relation>, DomainError> {
        let target = self.target_entity(relation)?;

        match relation.paired_relation() {
            Some(name) => target.relation(name).map(Some),
            None => Ok(None),
        }
    }

    /// Every relation that holds a foreign key pointing at `entity_name`, together with the
    /// entity declaring it. These are the relations a delete of `entity_name` has to visit.
    pub fn owning_relations_to(&self, entity_name: &str) -> Vec<(&Entity, &Relation)> {
        self.entities
            .values()
            .flat_map(|entity| entity.relations().map(move |relation| (entity, relation)))
            .filter(|(_, relation)| relation.kind().has_joining_column() && relation.target == entity_name)
            .collect()
    }

    /// Checks relation pairing and unique constraints.
    pub fn validate(&self) -> Result<(), DomainError> {
        for entity in self.entities.values() {
            for constraint in &entity.unique {
                if let Some(field) = constraint.fields.iter().find(|f| !entity.fields.contains_key(*f)) {
                    return Err(DomainError::InvalidUniqueConstraint {
                        entity: entity.name.clone(),
                        field: field.clone(),
                    });
                }
            }

            for relation in entity.relations() {
                self.validate_relation(entity, relation)?;
            }
        }

        Ok(())
    }

    fn validate_relation(&self, entity: &Entity, relation: &Relation) -> Result<(), DomainError> {
        let target = self
            .entity(&relation.target)
            .map_err(|_| DomainError::invalid_relation(&entity.name, &relation.name, "unknown target entity"))?;

        let Some(paired_name) = relation.paired_relation() else {
            return Ok(());
        };

        let paired = target.relation(paired_name).map_err(|_| {
            DomainError::invalid_relation(
                &entity.name,
                &relation.name,
                format!("`{}.{}` does not exist", target.name, paired_name),
            )
        })?;

        let expected = match relation.kind() {
            RelationKind::ManyHasOne => RelationKind::OneHasMany,
            RelationKind::OneHasMany => RelationKind::ManyHasOne,
            RelationKind::OneHasOneOwning => RelationKind::OneHasOneInverse,
            RelationKind::OneHasOneInverse => RelationKind::OneHasOneOwning,
            RelationKind::ManyHasManyOwning => RelationKind::ManyHasManyInverse,
            RelationKind::ManyHasManyInverse => RelationKind::ManyHasManyOwning,
        };

        if paired.kind() != expected || paired.target != entity.name {
            return Err(DomainError::invalid_relation(
                &entity.name,
                &relation.name,
                format!("`{}.{}` must be a {} relation targeting `{}`", target.name, paired_name, expected, entity.name),
            ));
        }

        if paired.paired_relation().is_some_and(|name| name != relation.name) {
            return Err(DomainError::invalid_relation(
                &entity.name,
                &relation.name,
                format!("`{}.{}` is paired with a different relation", target.name, paired_name),
            ));
        }

        Ok(())
    }
}

impl Entity {
    pub fn field(&self, name: &str) -> Result<&Field, DomainError> {
        self.fields.get(name).ok_or_else(|| DomainError::FieldNotFound {
            entity: self.name.clone(),
            field: name.to_owned(),
        })
    }

    pub fn column(&self, name: &str) -> Result<&Column, DomainError> {
        self.field(name)?.as_column().ok_or_else(|| DomainError::NotAColumn {
            entity: self.name.clone(),
            field: name.to_owned(),
        })
    }

    pub fn relation(&self, name: &str) -> Result<&Relation, DomainError> {
        self.field(name)?.as_relation().ok_or_else(|| DomainError::NotARelation {
            entity: self.name.clone(),
            field: name.to_owned(),
        })
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.fields.values().filter_map(Field::as_relation)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.fields.values().filter_map(Field::as_column)
    }

    pub fn primary_column_def(&self) -> Result<&Column, DomainError> {
        self.column(&self.primary)
    }

    /// The database column backing a field: the column itself or the joining column of an
    /// owning has-one relation.
    pub fn column_name_of(&self, field: &str) -> Result<&str, DomainError> {
        match self.field(field)? {
            Field::Column(column) => Ok(&column.column_name),
            Field::Relation(relation) => relation
                .joining_column()
                .map(|jc| jc.column_name.as_str())
                .ok_or_else(|| DomainError::NotAColumn {
                    entity: self.name.clone(),
                    field: field.to_owned(),
                }),
        }
    }

    /// Field sets that identify at most one row: the primary key, declared unique constraints and
    /// every owning one-to-one relation.
    pub fn unique_keys(&self) -> Vec<Vec<&str>> {
        let primary = std::iter::once(vec![self.primary.as_str()]);
        let declared = self
            .unique
            .iter()
            .map(|constraint| constraint.fields.iter().map(String::as_str).collect_vec());
        let one_has_one = self
            .relations()
            .filter(|r| r.kind() == RelationKind::OneHasOneOwning)
            .map(|r| vec![r.name.as_str()]);

        primary.chain(declared).chain(one_has_one).collect()
    }
}
