//! Turns the sugared parameter shapes into fully resolved trees.
//!
//! Expressions go through the parser, structured values are taken as they are. Options the
//! grammar cannot express (`connect_to`, `is_nonbearing`, ordering and paging) are merged in
//! afterwards and only ever land on the last node of a relation path.

use crate::{environment::Environment, error::Result, parser, tree_parameters::*};

fn desugar_primitive<T: Clone>(
    input: &Sugared<T>,
    environment: &Environment,
    parse: fn(&str, &Environment) -> Result<T>,
) -> Result<T> {
    match input {
        Sugared::Expression(expression) => parse(expression, environment),
        Sugared::Structured(value) => Ok(value.clone()),
    }
}

fn desugar_optional<T: Clone>(
    input: Option<&Sugared<T>>,
    environment: &Environment,
    parse: fn(&str, &Environment) -> Result<T>,
) -> Result<Option<T>> {
    input.map(|input| desugar_primitive(input, environment, parse)).transpose()
}

pub fn desugar_unique_where(input: &SugaredUniqueWhere, environment: &Environment) -> Result<UniqueWhere> {
    desugar_primitive(input, environment, parser::parse_unique_where)
}

pub fn desugar_filter(input: &SugaredFilter, environment: &Environment) -> Result<Filter> {
    desugar_primitive(input, environment, parser::parse_filter)
}

pub fn desugar_order_by(input: &SugaredOrderBy, environment: &Environment) -> Result<OrderBy> {
    desugar_primitive(input, environment, parser::parse_order_by)
}

fn desugar_has_one_relation(
    sugarable: &SugarableHasOneRelation,
    unsugarable: &UnsugarableHasOneRelation,
    environment: &Environment,
) -> Result<HasOneRelation> {
    Ok(HasOneRelation {
        field: sugarable.field.clone(),
        filter: desugar_optional(sugarable.filter.as_ref(), environment, parser::parse_filter)?,
        reduced_by: desugar_optional(sugarable.reduced_by.as_ref(), environment, parser::parse_unique_where)?,
        connect_to: desugar_optional(unsugarable.connect_to.as_ref(), environment, parser::parse_unique_where)?,
        is_nonbearing: unsugarable.is_nonbearing,
    })
}

/// Desugars a structured path. Only the last node receives `last_relation`.
fn desugar_has_one_relation_path(
    path: &[SugarableHasOneRelation],
    last_relation: &UnsugarableHasOneRelation,
    environment: &Environment,
) -> Result<Vec<HasOneRelation>> {
    let interior = UnsugarableHasOneRelation::default();
    let last_index = path.len().saturating_sub(1);

    path.iter()
        .enumerate()
        .map(|(index, node)| {
            let unsugarable = if index == last_index { last_relation } else { &interior };
            desugar_has_one_relation(node, unsugarable, environment)
        })
        .collect()
}

/// Lifts a parsed path. Only the last node receives `last_relation`.
fn augment_has_one_relation_path(
    path: Vec<DesugaredHasOneRelation>,
    last_relation: &UnsugarableHasOneRelation,
    environment: &Environment,
) -> Result<Vec<HasOneRelation>> {
    let last_index = path.len().saturating_sub(1);
    let mut augmented = Vec::with_capacity(path.len());

    for (index, node) in path.into_iter().enumerate() {
        let mut relation = HasOneRelation {
            field: node.field,
            filter: node.filter,
            reduced_by: node.reduced_by,
            ..Default::default()
        };

        if index == last_index {
            relation.connect_to =
                desugar_optional(last_relation.connect_to.as_ref(), environment, parser::parse_unique_where)?;
            relation.is_nonbearing = last_relation.is_nonbearing;
        }

        augmented.push(relation);
    }

    Ok(augmented)
}

fn no_overrides() -> UnsugarableHasOneRelation {
    UnsugarableHasOneRelation::default()
}

fn desugar_has_many_relation(
    field: FieldName,
    filter: Option<Filter>,
    parameters: &UnsugarableEntityList,
    environment: &Environment,
) -> Result<HasManyRelation> {
    Ok(HasManyRelation {
        field,
        filter,
        connect_to: desugar_optional(parameters.connect_to.as_ref(), environment, parser::parse_unique_where)?,
        is_nonbearing: parameters.is_nonbearing,
        order_by: desugar_optional(parameters.order_by.as_ref(), environment, parser::parse_order_by)?,
        offset: parameters.offset,
        limit: parameters.limit,
    })
}

pub fn desugar_qualified_entity_list(
    input: &SugaredQualifiedEntityList,
    environment: &Environment,
) -> Result<QualifiedEntityList> {
    let (entity_name, filter, has_one_relation_path) = match &input.entities {
        Sugared::Expression(expression) => {
            let parsed = parser::parse_qualified_entity_list(expression, environment)?;
            let path = augment_has_one_relation_path(parsed.has_one_relation_path, &no_overrides(), environment)?;

            (parsed.entity_name, parsed.filter, path)
        }
        Sugared::Structured(entities) => (
            entities.entity_name.clone(),
            desugar_optional(entities.filter.as_ref(), environment, parser::parse_filter)?,
            desugar_has_one_relation_path(&entities.has_one_relation_path, &no_overrides(), environment)?,
        ),
    };

    let parameters = &input.parameters;

    Ok(QualifiedEntityList {
        entity_name,
        filter,
        has_one_relation_path,
        order_by: desugar_optional(parameters.order_by.as_ref(), environment, parser::parse_order_by)?,
        offset: parameters.offset,
        limit: parameters.limit,
        connect_to: desugar_optional(parameters.connect_to.as_ref(), environment, parser::parse_unique_where)?,
    })
}

pub fn desugar_qualified_field_list(
    input: &SugaredQualifiedFieldList,
    environment: &Environment,
) -> Result<QualifiedFieldList> {
    let (entity_name, filter, has_one_relation_path, field) = match &input.fields {
        Sugared::Expression(expression) => {
            let parsed = parser::parse_qualified_field_list(expression, environment)?;
            let path = augment_has_one_relation_path(parsed.has_one_relation_path, &no_overrides(), environment)?;

            (parsed.entity_name, parsed.filter, path, parsed.field)
        }
        Sugared::Structured(fields) => (
            fields.entity_name.clone(),
            desugar_optional(fields.filter.as_ref(), environment, parser::parse_filter)?,
            desugar_has_one_relation_path(&fields.has_one_relation_path, &no_overrides(), environment)?,
            fields.field.clone(),
        ),
    };

    let parameters = &input.parameters;

    Ok(QualifiedFieldList {
        entity_name,
        filter,
        has_one_relation_path,
        field,
        order_by: desugar_optional(parameters.order_by.as_ref(), environment, parser::parse_order_by)?,
        offset: parameters.offset,
        limit: parameters.limit,
    })
}

pub fn desugar_qualified_single_entity(
    input: &SugaredQualifiedSingleEntity,
    environment: &Environment,
) -> Result<QualifiedSingleEntity> {
    let (entity_name, unique_where, filter, has_one_relation_path) = match &input.entity {
        Sugared::Expression(expression) => {
            let parsed = parser::parse_qualified_single_entity(expression, environment)?;
            let path = augment_has_one_relation_path(parsed.has_one_relation_path, &no_overrides(), environment)?;

            (parsed.entity_name, parsed.unique_where, parsed.filter, path)
        }
        Sugared::Structured(entity) => (
            entity.entity_name.clone(),
            desugar_unique_where(&entity.unique_where, environment)?,
            desugar_optional(entity.filter.as_ref(), environment, parser::parse_filter)?,
            desugar_has_one_relation_path(&entity.has_one_relation_path, &no_overrides(), environment)?,
        ),
    };

    Ok(QualifiedSingleEntity {
        entity_name,
        unique_where,
        filter,
        has_one_relation_path,
        connect_to: desugar_optional(input.connect_to.as_ref(), environment, parser::parse_unique_where)?,
    })
}

pub fn desugar_unconstrained_qualified_entity_list(
    input: &SugaredUnconstrainedQualifiedEntityList,
    environment: &Environment,
) -> Result<UnconstrainedQualifiedEntityList> {
    let (entity_name, has_one_relation_path) = match &input.entities {
        Sugared::Expression(expression) => {
            let parsed = parser::parse_unconstrained_qualified_entity_list(expression, environment)?;
            let path = augment_has_one_relation_path(parsed.has_one_relation_path, &no_overrides(), environment)?;

            (parsed.entity_name, path)
        }
        Sugared::Structured(entities) => (
            entities.entity_name.clone(),
            desugar_has_one_relation_path(&entities.has_one_relation_path, &no_overrides(), environment)?,
        ),
    };

    Ok(UnconstrainedQualifiedEntityList {
        entity_name,
        has_one_relation_path,
        connect_to: desugar_optional(input.connect_to.as_ref(), environment, parser::parse_unique_where)?,
    })
}

pub fn desugar_relative_single_entity(
    input: &SugaredRelativeSingleEntity,
    environment: &Environment,
) -> Result<RelativeSingleEntity> {
    let has_one_relation_path = match &input.field {
        Sugared::Expression(expression) => {
            let parsed = parser::parse_relative_single_entity(expression, environment)?;
            augment_has_one_relation_path(parsed.has_one_relation_path, &input.parameters, environment)?
        }
        Sugared::Structured(path) => desugar_has_one_relation_path(path, &input.parameters, environment)?,
    };

    Ok(RelativeSingleEntity { has_one_relation_path })
}

pub fn desugar_relative_single_field(
    input: &SugaredRelativeSingleField,
    environment: &Environment,
) -> Result<RelativeSingleField> {
    let (has_one_relation_path, field) = match &input.field {
        Sugared::Expression(expression) => {
            let parsed = parser::parse_relative_single_field(expression, environment)?;
            let path = augment_has_one_relation_path(parsed.has_one_relation_path, &no_overrides(), environment)?;

            (path, parsed.field)
        }
        Sugared::Structured(field) => (
            desugar_has_one_relation_path(&field.has_one_relation_path, &no_overrides(), environment)?,
            field.field.clone(),
        ),
    };

    let default_value = match &input.default_value {
        None => None,
        Some(DefaultValue::Value(value)) => Some(value.clone()),
        Some(DefaultValue::Variable(name)) => Some(environment.resolve_variable(name)?.clone()),
    };

    Ok(RelativeSingleField {
        has_one_relation_path,
        field,
        is_nonbearing: input.is_nonbearing,
        default_value,
    })
}

pub fn desugar_relative_entity_list(
    input: &SugaredRelativeEntityList,
    environment: &Environment,
) -> Result<RelativeEntityList> {
    let (has_one_relation_path, field, filter) = match &input.field {
        Sugared::Expression(expression) => {
            let parsed = parser::parse_relative_entity_list(expression, environment)?;
            let path = augment_has_one_relation_path(parsed.has_one_relation_path, &no_overrides(), environment)?;

            (path, parsed.has_many_relation.field, parsed.has_many_relation.filter)
        }
        Sugared::Structured(field) => (
            desugar_has_one_relation_path(&field.has_one_relation_path, &no_overrides(), environment)?,
            field.has_many_relation.field.clone(),
            desugar_optional(field.has_many_relation.filter.as_ref(), environment, parser::parse_filter)?,
        ),
    };

    Ok(RelativeEntityList {
        has_one_relation_path,
        has_many_relation: desugar_has_many_relation(field, filter, &input.parameters, environment)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_value::ContentValue;
    use pretty_assertions::assert_eq;
    use query_structure::Condition;

    #[test]
    fn expressions_and_structures_are_interchangeable() {
        let environment = Environment::new();

        let from_expression =
            desugar_relative_single_field(&"authors(id = 123).person.name".into(), &environment).unwrap();

        let structured = SugaredRelativeSingleField {
            field: Sugared::Structured(SugarableRelativeSingleField {
                has_one_relation_path: vec![
                    SugarableHasOneRelation {
                        reduced_by: Some("(id = 123)".into()),
                        ..SugarableHasOneRelation::new("authors")
                    },
                    SugarableHasOneRelation::new("person"),
                ],
                field: "name".to_owned(),
            }),
            is_nonbearing: false,
            default_value: None,
        };

        assert_eq!(
            from_expression,
            desugar_relative_single_field(&structured, &environment).unwrap()
        );
    }

    #[test]
    fn overrides_apply_to_the_last_relation_only() {
        let input = SugaredRelativeSingleEntity {
            field: "author.mother".into(),
            parameters: UnsugarableHasOneRelation {
                connect_to: Some(Sugared::Structured(UniqueWhere::by("id", ContentValue::Int(1)))),
                is_nonbearing: true,
            },
        };

        let path = desugar_relative_single_entity(&input, &Environment::new())
            .unwrap()
            .has_one_relation_path;

        assert_eq!(path[0], HasOneRelation::new("author"));
        assert_eq!(
            path[1],
            HasOneRelation {
                connect_to: Some(UniqueWhere::by("id", ContentValue::Int(1))),
                is_nonbearing: true,
                ..HasOneRelation::new("mother")
            }
        );
    }

    #[test]
    fn has_many_options_land_on_the_has_many_relation() {
        let input = SugaredRelativeEntityList {
            field: "genres(slug = 'sciFi').authors[age < 123]".into(),
            parameters: UnsugarableEntityList {
                order_by: Some("name desc".into()),
                limit: Some(10),
                ..Default::default()
            },
        };

        let list = desugar_relative_entity_list(&input, &Environment::new()).unwrap();

        assert_eq!(list.has_one_relation_path.len(), 1);
        assert_eq!(
            list.has_many_relation,
            HasManyRelation {
                field: "authors".to_owned(),
                filter: Some(Filter::field("age", Condition::LessThan(ContentValue::Int(123)))),
                order_by: Some(vec![OrderByField::new(vec!["name".to_owned()], SortOrder::Descending)]),
                limit: Some(10),
                ..Default::default()
            }
        );
    }

    #[test]
    fn default_values_are_read_from_the_environment() {
        let environment = Environment::new().with_dimensions([("locale", vec![ContentValue::from("en")])]);

        let field = desugar_relative_single_field(
            &SugaredRelativeSingleField {
                default_value: Some(DefaultValue::Variable("locale".to_owned())),
                ..SugaredRelativeSingleField::from("locale")
            },
            &environment,
        )
        .unwrap();

        assert_eq!(field.default_value, Some(ContentValue::from("en")));
    }
}
