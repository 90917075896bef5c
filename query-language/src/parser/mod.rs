//! Recursive-descent parser for the query language.
//!
//! Every call tokenizes its input and builds a fresh [`Parser`], so nothing is shared between
//! parses. Variables are resolved against the [`Environment`] while parsing.

mod entry_point;

pub use entry_point::{EntryPoint, ParsedExpression};

use crate::{
    environment::Environment,
    error::{QueryLanguageError, Result},
    lexer::{self, Token, TokenKind},
    tree_parameters::*,
};
use content_value::ContentValue;
use query_structure::{Condition, InputError};

pub fn parse(input: &str, entry_point: EntryPoint, environment: &Environment) -> Result<ParsedExpression> {
    let expression = match entry_point {
        EntryPoint::QualifiedEntityList => {
            ParsedExpression::QualifiedEntityList(parse_qualified_entity_list(input, environment)?)
        }
        EntryPoint::QualifiedFieldList => {
            ParsedExpression::QualifiedFieldList(parse_qualified_field_list(input, environment)?)
        }
        EntryPoint::QualifiedSingleEntity => {
            ParsedExpression::QualifiedSingleEntity(parse_qualified_single_entity(input, environment)?)
        }
        EntryPoint::UnconstrainedQualifiedEntityList => ParsedExpression::UnconstrainedQualifiedEntityList(
            parse_unconstrained_qualified_entity_list(input, environment)?,
        ),
        EntryPoint::RelativeSingleField => {
            ParsedExpression::RelativeSingleField(parse_relative_single_field(input, environment)?)
        }
        EntryPoint::RelativeSingleEntity => {
            ParsedExpression::RelativeSingleEntity(parse_relative_single_entity(input, environment)?)
        }
        EntryPoint::RelativeEntityList => {
            ParsedExpression::RelativeEntityList(parse_relative_entity_list(input, environment)?)
        }
        EntryPoint::UniqueWhere => ParsedExpression::UniqueWhere(parse_unique_where(input, environment)?),
        EntryPoint::Filter => ParsedExpression::Filter(parse_filter(input, environment)?),
        EntryPoint::OrderBy => ParsedExpression::OrderBy(parse_order_by(input, environment)?),
    };

    Ok(expression)
}

/// E.g. `Author[age < 123].son.sister`.
pub fn parse_qualified_entity_list(input: &str, environment: &Environment) -> Result<DesugaredQualifiedEntityList> {
    Parser::run(input, environment, Parser::qualified_entity_list)
}

/// E.g. `Author[age < 123].son.sister.name`.
pub fn parse_qualified_field_list(input: &str, environment: &Environment) -> Result<DesugaredQualifiedFieldList> {
    Parser::run(input, environment, Parser::qualified_field_list)
}

/// E.g. `Author(id = 123).son.sister`.
pub fn parse_qualified_single_entity(input: &str, environment: &Environment) -> Result<DesugaredQualifiedSingleEntity> {
    Parser::run(input, environment, Parser::qualified_single_entity)
}

/// E.g. `Author.son.sister`.
pub fn parse_unconstrained_qualified_entity_list(
    input: &str,
    environment: &Environment,
) -> Result<DesugaredUnconstrainedQualifiedEntityList> {
    Parser::run(input, environment, Parser::unconstrained_qualified_entity_list)
}

/// E.g. `authors(id = 123).person.name`.
pub fn parse_relative_single_field(input: &str, environment: &Environment) -> Result<DesugaredRelativeSingleField> {
    Parser::run(input, environment, Parser::relative_single_field)
}

/// E.g. `localesByLocale(locale.slug = en)`.
pub fn parse_relative_single_entity(input: &str, environment: &Environment) -> Result<DesugaredRelativeSingleEntity> {
    Parser::run(input, environment, Parser::relative_single_entity)
}

/// E.g. `genres(slug = 'sciFi').authors[age < 123]`.
pub fn parse_relative_entity_list(input: &str, environment: &Environment) -> Result<DesugaredRelativeEntityList> {
    Parser::run(input, environment, Parser::relative_entity_list)
}

/// E.g. `(author.mother.id = 123)`.
pub fn parse_unique_where(input: &str, environment: &Environment) -> Result<UniqueWhere> {
    Parser::run(input, environment, Parser::unique_where)
}

/// E.g. `[author.son.age < 123]`.
pub fn parse_filter(input: &str, environment: &Environment) -> Result<Filter> {
    Parser::run(input, environment, Parser::non_unique_where)
}

/// E.g. `items.order asc, items.content.name asc`.
pub fn parse_order_by(input: &str, environment: &Environment) -> Result<OrderBy> {
    Parser::run(input, environment, Parser::order_by)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    position: usize,
    environment: &'a Environment,
}

impl<'a> Parser<'a> {
    #[tracing::instrument(level = "trace", skip(environment, rule))]
    fn run<T>(input: &'a str, environment: &'a Environment, rule: fn(&mut Parser<'a>) -> Result<T>) -> Result<T> {
        let lexed = lexer::tokenize(input);

        if !lexed.errors.is_empty() {
            return Err(QueryLanguageError::Lexical {
                input: input.to_owned(),
                errors: lexed.errors.iter().map(ToString::to_string).collect(),
            });
        }

        let mut parser = Parser {
            input,
            tokens: lexed.tokens,
            position: 0,
            environment,
        };

        let result = rule(&mut parser)?;

        match parser.peek() {
            None => Ok(result),
            Some(token) => Err(parser.syntax_error(format!(
                "Redundant input, expecting the end of the input but found '{}' at offset {}.",
                token.image, token.span.start
            ))),
        }
    }

    fn qualified_entity_list(&mut self) -> Result<DesugaredQualifiedEntityList> {
        let entity_name = self.entity_identifier()?;
        let filter = self.optional_non_unique_where()?;
        let mut has_one_relation_path = Vec::new();

        while self.eat(TokenKind::Dot) {
            has_one_relation_path.push(self.has_one_relation()?);
        }

        Ok(DesugaredQualifiedEntityList {
            entity_name,
            filter,
            has_one_relation_path,
        })
    }

    fn qualified_field_list(&mut self) -> Result<DesugaredQualifiedFieldList> {
        let entity_name = self.entity_identifier()?;
        let filter = self.optional_non_unique_where()?;

        self.expect(TokenKind::Dot)?;

        let DesugaredRelativeSingleField {
            has_one_relation_path,
            field,
        } = self.relative_single_field()?;

        Ok(DesugaredQualifiedFieldList {
            entity_name,
            filter,
            has_one_relation_path,
            field,
        })
    }

    fn qualified_single_entity(&mut self) -> Result<DesugaredQualifiedSingleEntity> {
        let entity_name = self.entity_identifier()?;
        let unique_where = self.unique_where()?;
        let filter = self.optional_non_unique_where()?;
        let has_one_relation_path = self.optional_relation_path()?;

        Ok(DesugaredQualifiedSingleEntity {
            entity_name,
            unique_where,
            filter,
            has_one_relation_path,
        })
    }

    fn unconstrained_qualified_entity_list(&mut self) -> Result<DesugaredUnconstrainedQualifiedEntityList> {
        let entity_name = self.entity_identifier()?;
        let has_one_relation_path = self.optional_relation_path()?;

        Ok(DesugaredUnconstrainedQualifiedEntityList {
            entity_name,
            has_one_relation_path,
        })
    }

    /// `('.' relativeSingleEntity)?`
    fn optional_relation_path(&mut self) -> Result<Vec<DesugaredHasOneRelation>> {
        if self.eat(TokenKind::Dot) {
            Ok(self.relative_single_entity()?.has_one_relation_path)
        } else {
            Ok(Vec::new())
        }
    }

    fn relative_single_entity(&mut self) -> Result<DesugaredRelativeSingleEntity> {
        let mut has_one_relation_path = vec![self.has_one_relation()?];

        while self.eat(TokenKind::Dot) {
            has_one_relation_path.push(self.has_one_relation()?);
        }

        Ok(DesugaredRelativeSingleEntity { has_one_relation_path })
    }

    fn relative_single_field(&mut self) -> Result<DesugaredRelativeSingleField> {
        let (has_one_relation_path, last) = self.path_with_last()?;

        if last.reduced_by.is_some() || last.filter.is_some() {
            return Err(QueryLanguageError::Binding(format!(
                "Cannot parse '{}': the last field '{}' is being reduced or filtered, which, grammatically, makes it \
                 a relation but a single field is expected.",
                self.input, last.field
            )));
        }

        Ok(DesugaredRelativeSingleField {
            has_one_relation_path,
            field: last.field,
        })
    }

    fn relative_entity_list(&mut self) -> Result<DesugaredRelativeEntityList> {
        let (has_one_relation_path, last) = self.path_with_last()?;

        if last.reduced_by.is_some() {
            return Err(QueryLanguageError::Binding(format!(
                "Cannot parse '{}': the last field '{}' is being reduced, which, grammatically, makes it a has-one \
                 relation but a has-many relation is expected.",
                self.input, last.field
            )));
        }

        Ok(DesugaredRelativeEntityList {
            has_one_relation_path,
            has_many_relation: DesugaredHasManyRelation {
                field: last.field,
                filter: last.filter,
            },
        })
    }

    fn path_with_last(&mut self) -> Result<(Vec<DesugaredHasOneRelation>, DesugaredHasOneRelation)> {
        let mut path = self.relative_single_entity()?.has_one_relation_path;

        match path.pop() {
            Some(last) => Ok((path, last)),
            None => Err(self.expected("a field name")),
        }
    }

    fn has_one_relation(&mut self) -> Result<DesugaredHasOneRelation> {
        let field = self.field_identifier()?;

        let reduced_by = match self.at(TokenKind::LeftParenthesis) {
            true => Some(self.unique_where()?),
            false => None,
        };

        let filter = self.optional_non_unique_where()?;

        Ok(DesugaredHasOneRelation {
            field,
            filter,
            reduced_by,
        })
    }

    fn optional_non_unique_where(&mut self) -> Result<Option<Filter>> {
        match self.at(TokenKind::LeftBracket) {
            true => Ok(Some(self.non_unique_where()?)),
            false => Ok(None),
        }
    }

    /// One or more bracketed clauses, implicitly AND-ed.
    fn non_unique_where(&mut self) -> Result<Filter> {
        let mut clauses = Vec::new();

        loop {
            self.expect(TokenKind::LeftBracket)?;
            clauses.push(self.disjunction()?);
            self.expect(TokenKind::RightBracket)?;

            if !self.at(TokenKind::LeftBracket) {
                break;
            }
        }

        Ok(combine(clauses, Filter::and))
    }

    fn disjunction(&mut self) -> Result<Filter> {
        let mut operands = vec![self.conjunction()?];

        while self.eat(TokenKind::Or) {
            operands.push(self.conjunction()?);
        }

        Ok(combine(operands, Filter::or))
    }

    fn conjunction(&mut self) -> Result<Filter> {
        let mut operands = vec![self.negation()?];

        while self.eat(TokenKind::And) {
            operands.push(self.negation()?);
        }

        Ok(combine(operands, Filter::and))
    }

    fn negation(&mut self) -> Result<Filter> {
        if self.eat(TokenKind::Not) {
            Ok(Filter::not(self.field_where()?))
        } else {
            self.field_where()
        }
    }

    fn field_where(&mut self) -> Result<Filter> {
        let path = self.field_path()?;
        let condition = self.condition()?;

        Ok(Filter::path(&path, condition))
    }

    fn condition(&mut self) -> Result<Condition> {
        let operator = self.next_kind();

        let build: fn(ContentValue) -> Condition = match operator {
            Some(TokenKind::Equals) => Condition::Equals,
            Some(TokenKind::NotEquals) => Condition::NotEquals,
            Some(TokenKind::LowerThan) => Condition::LessThan,
            Some(TokenKind::LowerEqual) => Condition::LessThanOrEquals,
            Some(TokenKind::GreaterThan) => Condition::GreaterThan,
            Some(TokenKind::GreaterEqual) => Condition::GreaterThanOrEquals,
            _ => return Err(self.expected("a comparison operator")),
        };

        self.position += 1;

        match self.column_value()? {
            Some(value) => Ok(build(value)),
            None => match operator {
                Some(TokenKind::Equals) => Ok(Condition::Null(true)),
                Some(TokenKind::NotEquals) => Ok(Condition::Null(false)),
                _ => Err(QueryLanguageError::Binding(
                    "The null keyword as a right hand operand can only be tested for (in)equality.".to_owned(),
                )),
            },
        }
    }

    /// A primary value or a boolean. `None` stands for `null`.
    fn column_value(&mut self) -> Result<Option<ContentValue>> {
        let value = match self.next_kind() {
            Some(TokenKind::Null) => None,
            Some(TokenKind::True) => Some(ContentValue::Boolean(true)),
            Some(TokenKind::False) => Some(ContentValue::Boolean(false)),
            _ => return self.primary_value().map(Some),
        };

        self.position += 1;

        Ok(value)
    }

    fn unique_where(&mut self) -> Result<UniqueWhere> {
        let mut unique_where = UniqueWhere::new();

        self.expect(TokenKind::LeftParenthesis)?;

        loop {
            let path = self.field_path()?;
            self.expect(TokenKind::Equals)?;
            let value = self.primary_value()?;

            unique_where.assign(&path, value)?;

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightParenthesis)?;

        Ok(unique_where)
    }

    fn order_by(&mut self) -> Result<OrderBy> {
        let mut order_by = Vec::new();

        loop {
            let path = self.field_path()?;

            let sort_order = match self.at(TokenKind::Identifier) {
                true => {
                    let direction = self.expect(TokenKind::Identifier)?;

                    SortOrder::parse(direction).ok_or_else(|| {
                        QueryLanguageError::Binding("The only valid order directions are `asc` and `desc`.".to_owned())
                    })?
                }
                false => SortOrder::Ascending,
            };

            order_by.push(OrderByField::new(path, sort_order));

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        Ok(order_by)
    }

    /// `fieldIdentifier ('.' fieldIdentifier)*`
    fn field_path(&mut self) -> Result<Vec<FieldName>> {
        let mut path = vec![self.field_identifier()?];

        while self.eat(TokenKind::Dot) {
            path.push(self.field_identifier()?);
        }

        Ok(path)
    }

    fn primary_value(&mut self) -> Result<ContentValue> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.expected("a string, a number or a literal"));
        };

        let value = match token.kind {
            TokenKind::StringLiteral => ContentValue::String(lexer::unescape_string(token.image)),
            TokenKind::NumberLiteral => ContentValue::parse_number(token.image).map_err(InputError::from)?,
            TokenKind::Identifier | TokenKind::EntityIdentifier => ContentValue::literal(token.image),
            TokenKind::DollarSign => {
                let value = self.variable()?;

                return match value {
                    ContentValue::String(_) | ContentValue::Int(_) | ContentValue::Float(_) | ContentValue::Literal(_) => {
                        Ok(value)
                    }
                    other => Err(QueryLanguageError::Binding(format!(
                        "A variable can resolve to a literal, string or a number, not {}",
                        other.type_name()
                    ))),
                };
            }
            _ => return Err(self.expected("a string, a number or a literal")),
        };

        self.position += 1;

        Ok(value)
    }

    fn field_identifier(&mut self) -> Result<FieldName> {
        if !self.at(TokenKind::DollarSign) {
            return self.expect(TokenKind::Identifier).map(str::to_owned);
        }

        let name = self.variable_name()?;

        match self.resolve(name)? {
            ContentValue::String(value) if lexer::is_identifier(&value) => Ok(value),
            _ => Err(QueryLanguageError::Binding(format!(
                "The value ${name} is not a valid field identifier."
            ))),
        }
    }

    fn entity_identifier(&mut self) -> Result<EntityName> {
        if !self.at(TokenKind::DollarSign) {
            return self.expect(TokenKind::EntityIdentifier).map(str::to_owned);
        }

        let name = self.variable_name()?;

        match self.resolve(name)? {
            ContentValue::String(value) if lexer::is_entity_identifier(&value) => Ok(value),
            _ => Err(QueryLanguageError::Binding(format!(
                "The value of the variable ${name} is not a valid entity identifier."
            ))),
        }
    }

    fn variable(&mut self) -> Result<ContentValue> {
        let name = self.variable_name()?;
        self.resolve(name)
    }

    /// `'$' identifier`
    fn variable_name(&mut self) -> Result<&'a str> {
        self.expect(TokenKind::DollarSign)?;

        match self.at(TokenKind::EntityIdentifier) {
            true => self.expect(TokenKind::EntityIdentifier),
            false => self.expect(TokenKind::Identifier),
        }
    }

    fn resolve(&self, name: &str) -> Result<ContentValue> {
        Ok(self.environment.resolve_variable(name)?.clone())
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    fn next_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.next_kind() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        let matches = self.at(kind);

        if matches {
            self.position += 1;
        }

        matches
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'a str> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let image = token.image;
                self.position += 1;
                Ok(image)
            }
            _ => Err(self.expected(&kind.to_string())),
        }
    }

    fn expected(&self, what: &str) -> QueryLanguageError {
        let message = match self.peek() {
            Some(token) => format!(
                "Expecting {what} but found '{}' at offset {}.",
                token.image, token.span.start
            ),
            None => format!("Expecting {what} but reached the end of the input."),
        };

        self.syntax_error(message)
    }

    fn syntax_error(&self, message: String) -> QueryLanguageError {
        QueryLanguageError::Syntax {
            input: self.input.to_owned(),
            errors: vec![message],
        }
    }
}

fn combine(mut operands: Vec<Filter>, join: fn(Vec<Filter>) -> Filter) -> Filter {
    match operands.len() {
        1 => operands.remove(0),
        _ => join(operands),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env() -> Environment {
        Environment::new()
    }

    #[test]
    fn redundant_tokens_are_rejected() {
        let err = parse_relative_single_entity("author)", &env()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to parse 'author)'.\n\nRedundant input, expecting the end of the input but found ')' at offset 6."
        );
    }

    #[test]
    fn missing_tokens_report_the_end_of_input() {
        let err = parse_filter("[age >", &env()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to parse '[age >'.\n\nExpecting a string, a number or a literal but reached the end of the input."
        );
    }

    #[test]
    fn lexical_errors_stop_before_parsing() {
        let err = parse_filter("[age # 1]", &env()).unwrap_err();

        assert!(matches!(err, QueryLanguageError::Lexical { .. }));
    }

    #[test]
    fn clauses_nest_as_or_of_ands() {
        let filter = parse_filter("[a = 1 and b = 2 or not c = 3]", &env()).unwrap();

        let expected = Filter::or(vec![
            Filter::and(vec![
                Filter::field("a", Condition::Equals(ContentValue::Int(1))),
                Filter::field("b", Condition::Equals(ContentValue::Int(2))),
            ]),
            Filter::not(Filter::field("c", Condition::Equals(ContentValue::Int(3)))),
        ]);

        assert_eq!(filter, expected);
    }
}
