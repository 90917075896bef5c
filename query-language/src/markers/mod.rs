//! Markers describe which fields and relations a subtree of bindings needs.
//!
//! Markers are stored under their placeholder, so two requests for the same relation with equal
//! constraints end up as one fetch.

pub mod placeholder;

mod reference_marker;

pub use reference_marker::{Reference, ReferenceConstraints, ReferenceMarker, ReferencePreferences};

use crate::{
    error::{QueryLanguageError, Result},
    tree_parameters::{FieldName, UniqueWhere},
};
use content_value::ContentValue;
use indexmap::{map::Entry, IndexMap};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMarker {
    pub field_name: FieldName,
    pub default_value: Option<ContentValue>,
    pub is_nonbearing: bool,
}

impl FieldMarker {
    pub fn new(field_name: impl Into<FieldName>) -> Self {
        FieldMarker {
            field_name: field_name.into(),
            default_value: None,
            is_nonbearing: false,
        }
    }

    pub fn placeholder_name(&self) -> String {
        placeholder::field_placeholder(&self.field_name)
    }
}

/// A has-one relation connected to a fixed target.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionMarker {
    pub field_name: FieldName,
    pub target: UniqueWhere,
    pub is_nonbearing: bool,
}

impl ConnectionMarker {
    pub fn placeholder_name(&self) -> String {
        placeholder::connection_placeholder(&self.field_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Field(FieldMarker),
    Reference(ReferenceMarker),
    Connection(ConnectionMarker),
}

impl Marker {
    pub fn placeholder_name(&self) -> String {
        match self {
            Marker::Field(marker) => marker.placeholder_name(),
            Marker::Reference(marker) => marker.placeholder_name().to_owned(),
            Marker::Connection(marker) => marker.placeholder_name(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Marker::Field(_) => "field",
            Marker::Reference(_) => "reference",
            Marker::Connection(_) => "connection",
        }
    }

    fn merge(self, other: Marker) -> Result<Marker> {
        match (self, other) {
            (Marker::Field(mut existing), Marker::Field(incoming)) => {
                existing.is_nonbearing &= incoming.is_nonbearing;
                existing.default_value = existing.default_value.or(incoming.default_value);

                Ok(Marker::Field(existing))
            }
            (Marker::Reference(existing), Marker::Reference(incoming)) => {
                Ok(Marker::Reference(existing.merge(incoming)?))
            }
            (Marker::Connection(existing), Marker::Connection(incoming)) if existing.target == incoming.target => {
                Ok(Marker::Connection(ConnectionMarker {
                    is_nonbearing: existing.is_nonbearing && incoming.is_nonbearing,
                    ..existing
                }))
            }
            (Marker::Connection(existing), Marker::Connection(_)) => Err(QueryLanguageError::Binding(format!(
                "The relation '{}' is connected to two different entities.",
                existing.field_name
            ))),
            (existing, incoming) => Err(QueryLanguageError::Binding(format!(
                "Cannot use '{}' both as a {} and as a {}.",
                existing.placeholder_name(),
                existing.kind(),
                incoming.kind()
            ))),
        }
    }
}

/// Markers of one entity keyed by placeholder, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFields(IndexMap<String, Marker>);

impl EntityFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker, merging it with one already present under the same placeholder.
    pub fn insert(&mut self, marker: Marker) -> Result<()> {
        match self.0.entry(marker.placeholder_name()) {
            Entry::Vacant(entry) => {
                entry.insert(marker);
            }
            Entry::Occupied(mut entry) => {
                let merged = entry.get().clone().merge(marker)?;
                entry.insert(merged);
            }
        }

        Ok(())
    }

    pub fn with(mut self, marker: Marker) -> Result<Self> {
        self.insert(marker)?;
        Ok(self)
    }

    pub fn merge(mut self, other: EntityFields) -> Result<Self> {
        for (_, marker) in other.0 {
            self.insert(marker)?;
        }

        Ok(self)
    }

    pub fn get(&self, placeholder_name: &str) -> Option<&Marker> {
        self.0.get(placeholder_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Marker)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(pub u64);

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The top of a marker tree. A named subtree is addressed by its identifier instead of its id.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerTreeRoot {
    pub id: TreeId,
    pub subtree_identifier: Option<String>,
    pub fields: EntityFields,
}

impl MarkerTreeRoot {
    pub fn new(id: TreeId, fields: EntityFields) -> Self {
        MarkerTreeRoot {
            id,
            subtree_identifier: None,
            fields,
        }
    }

    pub fn placeholder_name(&self) -> String {
        match &self.subtree_identifier {
            Some(identifier) => placeholder::marker_tree_placeholder(identifier),
            None => placeholder::marker_tree_placeholder(self.id),
        }
    }
}
