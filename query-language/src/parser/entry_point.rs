use crate::tree_parameters::*;
use std::fmt;

/// The grammar rule a parse starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    QualifiedEntityList,
    QualifiedFieldList,
    QualifiedSingleEntity,
    UnconstrainedQualifiedEntityList,
    RelativeSingleField,
    RelativeSingleEntity,
    RelativeEntityList,
    UniqueWhere,
    Filter,
    OrderBy,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryPoint::QualifiedEntityList => "qualifiedEntityList",
            EntryPoint::QualifiedFieldList => "qualifiedFieldList",
            EntryPoint::QualifiedSingleEntity => "qualifiedSingleEntity",
            EntryPoint::UnconstrainedQualifiedEntityList => "unconstrainedQualifiedEntityList",
            EntryPoint::RelativeSingleField => "relativeSingleField",
            EntryPoint::RelativeSingleEntity => "relativeSingleEntity",
            EntryPoint::RelativeEntityList => "relativeEntityList",
            EntryPoint::UniqueWhere => "uniqueWhere",
            EntryPoint::Filter => "filter",
            EntryPoint::OrderBy => "orderBy",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedExpression {
    QualifiedEntityList(DesugaredQualifiedEntityList),
    QualifiedFieldList(DesugaredQualifiedFieldList),
    QualifiedSingleEntity(DesugaredQualifiedSingleEntity),
    UnconstrainedQualifiedEntityList(DesugaredUnconstrainedQualifiedEntityList),
    RelativeSingleField(DesugaredRelativeSingleField),
    RelativeSingleEntity(DesugaredRelativeSingleEntity),
    RelativeEntityList(DesugaredRelativeEntityList),
    UniqueWhere(UniqueWhere),
    Filter(Filter),
    OrderBy(OrderBy),
}

impl ParsedExpression {
    pub fn entry_point(&self) -> EntryPoint {
        match self {
            ParsedExpression::QualifiedEntityList(_) => EntryPoint::QualifiedEntityList,
            ParsedExpression::QualifiedFieldList(_) => EntryPoint::QualifiedFieldList,
            ParsedExpression::QualifiedSingleEntity(_) => EntryPoint::QualifiedSingleEntity,
            ParsedExpression::UnconstrainedQualifiedEntityList(_) => EntryPoint::UnconstrainedQualifiedEntityList,
            ParsedExpression::RelativeSingleField(_) => EntryPoint::RelativeSingleField,
            ParsedExpression::RelativeSingleEntity(_) => EntryPoint::RelativeSingleEntity,
            ParsedExpression::RelativeEntityList(_) => EntryPoint::RelativeEntityList,
            ParsedExpression::UniqueWhere(_) => EntryPoint::UniqueWhere,
            ParsedExpression::Filter(_) => EntryPoint::Filter,
            ParsedExpression::OrderBy(_) => EntryPoint::OrderBy,
        }
    }
}
