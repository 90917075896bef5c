use super::{placeholder, EntityFields};
use crate::{
    error::{QueryLanguageError, Result},
    tree_parameters::{ExpectedEntityCount, FieldName, Filter, UniqueWhere},
};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceConstraints {
    pub expected_count: ExpectedEntityCount,
    pub filter: Option<Filter>,
    pub reduced_by: Option<UniqueWhere>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePreferences {
    pub initial_entity_count: i64,
}

/// One entity is fetched up front, whatever the expected count.
impl Default for ReferencePreferences {
    fn default() -> Self {
        ReferencePreferences { initial_entity_count: 1 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub constraints: ReferenceConstraints,
    pub placeholder_name: String,
    pub fields: EntityFields,
    pub preferences: ReferencePreferences,
}

/// A relation field together with every distinct way it is requested, keyed by placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMarker {
    pub field_name: FieldName,
    pub references: IndexMap<String, Reference>,
}

impl ReferenceMarker {
    pub fn new(
        field_name: impl Into<FieldName>,
        expected_count: ExpectedEntityCount,
        fields: EntityFields,
        filter: Option<Filter>,
        reduced_by: Option<UniqueWhere>,
        preferences: Option<ReferencePreferences>,
    ) -> Result<Self> {
        let field_name = field_name.into();
        let constraints = ReferenceConstraints {
            expected_count,
            filter,
            reduced_by,
        };

        let preferences = preferences.unwrap_or_default();

        if preferences.initial_entity_count < 0 {
            return Err(QueryLanguageError::Binding(
                "The preferred 'initialEntityCount' for a relation must be a non-negative integer!".to_owned(),
            ));
        }

        if expected_count == ExpectedEntityCount::UpToOne && preferences.initial_entity_count > 1 {
            return Err(QueryLanguageError::Binding(
                "A ToOne reference cannot prefer more than one entity!".to_owned(),
            ));
        }

        let placeholder_name = placeholder::reference_placeholder(&field_name, &constraints)?;

        let mut references = IndexMap::new();
        references.insert(
            placeholder_name.clone(),
            Reference {
                constraints,
                placeholder_name,
                fields,
                preferences,
            },
        );

        Self::from_references(field_name, references)
    }

    pub fn from_references(field_name: impl Into<FieldName>, references: IndexMap<String, Reference>) -> Result<Self> {
        let reduced_by_many_fields = references
            .values()
            .filter_map(|reference| reference.constraints.reduced_by.as_ref())
            .any(|reduced_by| reduced_by.len() != 1);

        if reduced_by_many_fields {
            return Err(QueryLanguageError::Binding(
                "A hasMany relation can only be reduced to a hasOne by exactly one field.".to_owned(),
            ));
        }

        Ok(ReferenceMarker {
            field_name: field_name.into(),
            references,
        })
    }

    pub fn placeholder_name(&self) -> &str {
        &self.field_name
    }

    /// Combines two markers of the same field. References sharing a placeholder merge their
    /// subtrees and keep the larger preferred entity count.
    pub fn merge(mut self, other: ReferenceMarker) -> Result<Self> {
        if self.field_name != other.field_name {
            return Err(QueryLanguageError::Binding(format!(
                "Cannot merge references to '{}' and '{}'.",
                self.field_name, other.field_name
            )));
        }

        for (placeholder_name, incoming) in other.references {
            match self.references.get_mut(&placeholder_name) {
                None => {
                    self.references.insert(placeholder_name, incoming);
                }
                Some(existing) => {
                    let fields = std::mem::take(&mut existing.fields);
                    existing.fields = fields.merge(incoming.fields)?;

                    let count = &mut existing.preferences.initial_entity_count;
                    *count = (*count).max(incoming.preferences.initial_entity_count);
                }
            }
        }

        Ok(self)
    }
}
