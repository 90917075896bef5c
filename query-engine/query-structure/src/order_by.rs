use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(literal: &str) -> Option<SortOrder> {
        match literal {
            "asc" => Some(SortOrder::Ascending),
            "desc" => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("asc"),
            SortOrder::Descending => f.write_str("desc"),
        }
    }
}

/// One ordering criterion. `path` hops over has-one relations and ends with a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderByField {
    pub path: Vec<String>,
    pub sort_order: SortOrder,
}

impl OrderByField {
    pub fn new(path: Vec<String>, sort_order: SortOrder) -> Self {
        OrderByField { path, sort_order }
    }
}

/// Serializes as the nested object form, e.g. `{ author: { name: 'desc' } }`.
impl Serialize for OrderByField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.path.split_first() {
            None => serializer.collect_str(&self.sort_order),
            Some((head, rest)) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(head, &OrderByField::new(rest.to_vec(), self.sort_order))?;
                map.end()
            }
        }
    }
}

pub type OrderBy = Vec<OrderByField>;
