//! Tokenizer for the query language.
//!
//! Every token class is matched greedily (maximal munch), so `order` is a single identifier and
//! never the keyword `or` followed by `der`. Whitespace separates tokens and is otherwise ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use std::{fmt, ops::Range};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-zA-Z0-9_]*$").unwrap());
static ENTITY_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9_]*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Starts with a lowercase letter or an underscore, e.g. `author`.
    Identifier,
    /// Starts with an uppercase letter, e.g. `Author`.
    EntityIdentifier,
    DollarSign,
    Dot,
    Comma,
    LeftParenthesis,
    RightParenthesis,
    LeftBracket,
    RightBracket,
    Equals,
    NotEquals,
    LowerThan,
    LowerEqual,
    GreaterThan,
    GreaterEqual,
    And,
    Or,
    Not,
    Null,
    True,
    False,
    StringLiteral,
    NumberLiteral,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "an identifier",
            TokenKind::EntityIdentifier => "an entity identifier",
            TokenKind::DollarSign => "'$'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::LeftParenthesis => "'('",
            TokenKind::RightParenthesis => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Equals => "'='",
            TokenKind::NotEquals => "'!='",
            TokenKind::LowerThan => "'<'",
            TokenKind::LowerEqual => "'<='",
            TokenKind::GreaterThan => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::Null => "'null'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::StringLiteral => "a string",
            TokenKind::NumberLiteral => "a number",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub image: &'a str,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexingError {
    pub offset: usize,
    pub unexpected: String,
}

impl fmt::Display for LexingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected character(s) '{}' at offset {}, skipped {} character(s).",
            self.unexpected,
            self.offset,
            self.unexpected.chars().count()
        )
    }
}

#[derive(Debug, Default)]
pub struct LexingResult<'a> {
    pub tokens: Vec<Token<'a>>,
    pub errors: Vec<LexingError>,
}

pub fn tokenize(input: &str) -> LexingResult<'_> {
    Lexer::new(input).run()
}

/// Whether `candidate` has the shape of an identifier token.
pub fn is_identifier(candidate: &str) -> bool {
    IDENTIFIER.is_match(candidate) && word_kind(candidate) == TokenKind::Identifier
}

/// Whether `candidate` has the shape of an entity identifier token.
pub fn is_entity_identifier(candidate: &str) -> bool {
    ENTITY_IDENTIFIER.is_match(candidate)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    input: &'a str,
    position: usize,
    result: LexingResult<'a>,
    unmatched_from: Option<usize>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            result: LexingResult::default(),
            unmatched_from: None,
        }
    }

    fn run(mut self) -> LexingResult<'a> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.flush_unmatched();
                self.position += c.len_utf8();
                continue;
            }

            match self.match_token(c) {
                Some((kind, length)) => {
                    self.flush_unmatched();
                    self.push(kind, length);
                }
                None => {
                    self.unmatched_from.get_or_insert(self.position);

                    // An unterminated string swallows the rest of the input.
                    self.position = match c {
                        '\'' => self.input.len(),
                        _ => self.position + c.len_utf8(),
                    };
                }
            }
        }

        self.flush_unmatched();
        self.result
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push(&mut self, kind: TokenKind, length: usize) {
        let span = self.position..self.position + length;

        self.result.tokens.push(Token {
            kind,
            image: &self.input[span.clone()],
            span,
        });

        self.position += length;
    }

    fn flush_unmatched(&mut self) {
        if let Some(start) = self.unmatched_from.take() {
            self.result.errors.push(LexingError {
                offset: start,
                unexpected: self.input[start..self.position].to_owned(),
            });
        }
    }

    fn match_token(&self, c: char) -> Option<(TokenKind, usize)> {
        let rest = self.rest();
        let next = rest[c.len_utf8()..].chars().next();

        let single = |kind| Some((kind, 1));

        match c {
            '$' => single(TokenKind::DollarSign),
            '.' => single(TokenKind::Dot),
            ',' => single(TokenKind::Comma),
            '(' => single(TokenKind::LeftParenthesis),
            ')' => single(TokenKind::RightParenthesis),
            '[' => single(TokenKind::LeftBracket),
            ']' => single(TokenKind::RightBracket),
            '=' => single(TokenKind::Equals),
            '!' if next == Some('=') => Some((TokenKind::NotEquals, 2)),
            '<' if next == Some('=') => Some((TokenKind::LowerEqual, 2)),
            '<' => single(TokenKind::LowerThan),
            '>' if next == Some('=') => Some((TokenKind::GreaterEqual, 2)),
            '>' => single(TokenKind::GreaterThan),
            '\'' => string_length(rest).map(|length| (TokenKind::StringLiteral, length)),
            '-' if next.is_some_and(|n| n.is_ascii_digit()) => Some((TokenKind::NumberLiteral, number_length(rest))),
            c if c.is_ascii_digit() => Some((TokenKind::NumberLiteral, number_length(rest))),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let length = rest.find(|c: char| !is_identifier_char(c)).unwrap_or(rest.len());
                Some((word_kind(&rest[..length]), length))
            }
            _ => None,
        }
    }
}

fn word_kind(word: &str) -> TokenKind {
    match word {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "null" => TokenKind::Null,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        w if w.starts_with(|c: char| c.is_ascii_uppercase()) => TokenKind::EntityIdentifier,
        _ => TokenKind::Identifier,
    }
}

/// Length of a single-quoted string literal at the start of `rest`, if it is terminated.
fn string_length(rest: &str) -> Option<usize> {
    let mut escaped = false;

    for (index, c) in rest.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '\'' => return Some(index + 1),
            _ => (),
        }
    }

    None
}

/// Length of `-?\d+(\.\d+)?([eE][+-]?\d+)?` at the start of `rest`.
fn number_length(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let digits_from = |start: usize| start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = if bytes.first() == Some(&b'-') { 1 } else { 0 };
    end = digits_from(end);

    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = digits_from(end + 1);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));

        if bytes.get(end + 1 + sign).is_some_and(u8::is_ascii_digit) {
            end = digits_from(end + 1 + sign);
        }
    }

    end
}

/// Resolves the escape sequences of a string literal image, quotes included.
pub fn unescape_string(image: &str) -> String {
    let inner = image
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(image);

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('v') => result.push('\u{b}'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_do_not_split_longer_identifiers() {
        assert_eq!(
            kinds("order or nothing notes"),
            vec![TokenKind::Identifier, TokenKind::Or, TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn identifier_case_decides_the_token_kind() {
        assert_eq!(
            kinds("Author._son"),
            vec![TokenKind::EntityIdentifier, TokenKind::Dot, TokenKind::Identifier]
        );
    }

    #[test]
    fn comparison_operators_prefer_the_longest_match() {
        assert_eq!(
            kinds("a <= 1 and b != 2 or c>=-3.5e2"),
            vec![
                TokenKind::Identifier,
                TokenKind::LowerEqual,
                TokenKind::NumberLiteral,
                TokenKind::And,
                TokenKind::Identifier,
                TokenKind::NotEquals,
                TokenKind::NumberLiteral,
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::GreaterEqual,
                TokenKind::NumberLiteral,
            ]
        );

        assert_eq!(tokenize("c>=-3.5e2").tokens[2].image, "-3.5e2");
    }

    #[test]
    fn strings_may_contain_escaped_quotes() {
        let result = tokenize(r"name = 'it\'s'");

        assert!(result.errors.is_empty());
        assert_eq!(result.tokens[2].image, r"'it\'s'");
        assert_eq!(unescape_string(result.tokens[2].image), "it's");
    }

    #[test]
    fn unmatched_sequences_are_collected() {
        let result = tokenize("a # b ~~ c");

        assert_eq!(
            result.errors,
            vec![
                LexingError {
                    offset: 2,
                    unexpected: "#".to_owned()
                },
                LexingError {
                    offset: 6,
                    unexpected: "~~".to_owned()
                },
            ]
        );
        assert_eq!(kinds("a # b ~~ c").len(), 3);
    }

    #[test]
    fn unterminated_strings_are_errors() {
        let result = tokenize("a = 'abc");

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].unexpected, "'abc");
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert!(is_identifier("author_2"));
        assert!(!is_identifier("null"));
        assert!(!is_identifier("Author"));
        assert!(is_entity_identifier("Author"));
    }

    #[test]
    fn escape_sequences_are_resolved() {
        assert_eq!(unescape_string(r"'a\tb\nc\\d'"), "a\tb\nc\\d");
    }
}
