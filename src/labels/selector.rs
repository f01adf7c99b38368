// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Label selector parsing and matching
//!
//! Implements the Kubernetes label selector grammar:
//!
//! ```text
//! selector    = requirement ("," requirement)*
//! requirement = "!" key
//!             | key
//!             | key ("=" | "==" | "!=" | ">" | "<") value
//!             | key ("in" | "notin") "(" value ("," value)* ")"
//! ```
//!
//! Whitespace between tokens is ignored. Requirements are ANDed together.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::Labels;
use super::validation::{validate_label_key, validate_label_value};

/// Errors produced while building or parsing a selector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("unable to parse requirement: found '{found}', expected: {expected} (at position {position})")]
    Syntax {
        found: String,
        expected: String,
        position: usize,
    },

    #[error("invalid label key \"{key}\": {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid label value \"{value}\": {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("{0}")]
    InvalidRequirement(String),

    #[error("\"{0}\" is not a valid label selector operator")]
    UnsupportedOperator(String),
}

/// Selector operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    DoubleEquals,
    NotEquals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
    GreaterThan,
    LessThan,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::DoubleEquals => "==",
            Operator::NotEquals => "!=",
            Operator::In => "in",
            Operator::NotIn => "notin",
            Operator::Exists => "exists",
            Operator::DoesNotExist => "!",
            Operator::GreaterThan => "gt",
            Operator::LessThan => "lt",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `key op values` term of a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

impl Requirement {
    /// Build a validated requirement
    ///
    /// `In`/`NotIn` need at least one value, the equality operators exactly
    /// one, `Exists`/`DoesNotExist` none, and `>`/`<` a single integer.
    pub fn new<I, S>(key: &str, operator: Operator, values: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(reason) = validate_label_key(key).into_iter().next() {
            return Err(SelectorError::InvalidKey {
                key: key.to_string(),
                reason,
            });
        }

        let values: Vec<String> = values.into_iter().map(Into::into).collect();

        match operator {
            Operator::In | Operator::NotIn => {
                if values.is_empty() {
                    return Err(SelectorError::InvalidRequirement(
                        "for 'in', 'notin' operators, values set can't be empty".to_string(),
                    ));
                }
            }
            Operator::Equals | Operator::DoubleEquals | Operator::NotEquals => {
                if values.len() != 1 {
                    return Err(SelectorError::InvalidRequirement(
                        "exact-match compatibility requires one single value".to_string(),
                    ));
                }
            }
            Operator::Exists | Operator::DoesNotExist => {
                if !values.is_empty() {
                    return Err(SelectorError::InvalidRequirement(
                        "values set must be empty for exists and does not exist".to_string(),
                    ));
                }
            }
            Operator::GreaterThan | Operator::LessThan => {
                if values.len() != 1 {
                    return Err(SelectorError::InvalidRequirement(
                        "for 'Gt', 'Lt' operators, exactly one value is required".to_string(),
                    ));
                }
                if values[0].parse::<i64>().is_err() {
                    return Err(SelectorError::InvalidRequirement(format!(
                        "for 'Gt', 'Lt' operators, the value must be an integer, got \"{}\"",
                        values[0]
                    )));
                }
            }
        }

        for value in &values {
            if let Some(reason) = validate_label_value(value).into_iter().next() {
                return Err(SelectorError::InvalidValue {
                    value: value.clone(),
                    reason,
                });
            }
        }

        Ok(Self {
            key: key.to_string(),
            operator,
            values: values.into_iter().collect(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    /// Check whether a label set satisfies this requirement
    pub fn matches<L: Labels + ?Sized>(&self, labels: &L) -> bool {
        match self.operator {
            Operator::In | Operator::Equals | Operator::DoubleEquals => labels
                .get(&self.key)
                .is_some_and(|v| self.values.contains(v)),
            Operator::NotIn | Operator::NotEquals => labels
                .get(&self.key)
                .is_none_or(|v| !self.values.contains(v)),
            Operator::Exists => labels.has(&self.key),
            Operator::DoesNotExist => !labels.has(&self.key),
            Operator::GreaterThan | Operator::LessThan => {
                let Some(actual) = labels.get(&self.key).and_then(|v| v.parse::<i64>().ok())
                else {
                    return false;
                };
                // Validated at construction
                let Some(expected) = self.values.iter().next().and_then(|v| v.parse::<i64>().ok())
                else {
                    return false;
                };
                if self.operator == Operator::GreaterThan {
                    actual > expected
                } else {
                    actual < expected
                }
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = || self.values.iter().next().map(String::as_str).unwrap_or("");
        match self.operator {
            Operator::DoesNotExist => write!(f, "!{}", self.key),
            Operator::Exists => f.write_str(&self.key),
            Operator::Equals => write!(f, "{}={}", self.key, first()),
            Operator::DoubleEquals => write!(f, "{}=={}", self.key, first()),
            Operator::NotEquals => write!(f, "{}!={}", self.key, first()),
            Operator::GreaterThan => write!(f, "{}>{}", self.key, first()),
            Operator::LessThan => write!(f, "{}<{}", self.key, first()),
            Operator::In | Operator::NotIn => {
                let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
                write!(f, "{} {} ({})", self.key, self.operator, values.join(","))
            }
        }
    }
}

/// A conjunction of requirements over a label set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    requirements: Vec<Requirement>,
    nothing: bool,
}

impl Selector {
    /// Selector that matches every label set
    pub fn everything() -> Self {
        Self::default()
    }

    /// Selector that matches no label set
    pub fn nothing() -> Self {
        Self {
            requirements: Vec::new(),
            nothing: true,
        }
    }

    /// Parse a selector string such as `app=web,tier in (frontend,edge),!canary`
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let tokens = lex(input)?;
        Parser { tokens, pos: 0 }.parse()
    }

    /// Build a selector requiring every `key=value` pair of the given set
    pub fn from_set<'a, I>(set: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut selector = Self::everything();
        for (key, value) in set {
            selector.add(Requirement::new(key, Operator::Equals, [value.as_str()])?);
        }
        Ok(selector)
    }

    /// Add a requirement, keeping requirements ordered by key
    pub fn add(&mut self, requirement: Requirement) -> &mut Self {
        self.requirements.push(requirement);
        self.requirements.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// True for the selector that matches everything
    pub fn is_everything(&self) -> bool {
        !self.nothing && self.requirements.is_empty()
    }

    pub fn matches<L: Labels + ?Sized>(&self, labels: &L) -> bool {
        !self.nothing && self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Identifier(String),
    Comma,
    OpenParen,
    CloseParen,
    Equals,
    DoubleEquals,
    NotEquals,
    Bang,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Identifier(s) => s.as_str(),
            Token::Comma => ",",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Equals => "=",
            Token::DoubleEquals => "==",
            Token::NotEquals => "!=",
            Token::Bang => "!",
            Token::In => "in",
            Token::NotIn => "notin",
            Token::GreaterThan => ">",
            Token::LessThan => "<",
            Token::End => "end of string",
        };
        f.write_str(s)
    }
}

fn is_special(c: char) -> bool {
    matches!(c, '=' | '!' | '(' | ')' | ',' | '<' | '>')
}

/// Split a selector string into tokens paired with their byte offsets
fn lex(input: &str) -> Result<Vec<(Token, usize)>, SelectorError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if is_special(c) {
            chars.next();
            let next_is_eq = matches!(chars.peek(), Some(&(_, '=')));
            let token = match c {
                '=' if next_is_eq => {
                    chars.next();
                    Token::DoubleEquals
                }
                '=' => Token::Equals,
                '!' if next_is_eq => {
                    chars.next();
                    Token::NotEquals
                }
                '!' => Token::Bang,
                '(' => Token::OpenParen,
                ')' => Token::CloseParen,
                ',' => Token::Comma,
                '<' => Token::LessThan,
                '>' => Token::GreaterThan,
                other => {
                    return Err(SelectorError::Syntax {
                        found: other.to_string(),
                        expected: "a valid token".to_string(),
                        position: pos,
                    });
                }
            };
            tokens.push((token, pos));
            continue;
        }

        let mut ident = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() || is_special(c) {
                break;
            }
            ident.push(c);
            chars.next();
        }
        let token = match ident.as_str() {
            "in" => Token::In,
            "notin" => Token::NotIn,
            _ => Token::Identifier(ident),
        };
        tokens.push((token, pos));
    }

    tokens.push((Token::End, input.len()));
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|(t, _)| t)
            .unwrap_or(&Token::End)
    }

    fn next(&mut self) -> (Token, usize) {
        let item = self
            .tokens
            .get(self.pos)
            .cloned()
            .unwrap_or((Token::End, usize::MAX));
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        item
    }

    fn syntax_error(found: &Token, position: usize, expected: &str) -> SelectorError {
        SelectorError::Syntax {
            found: found.to_string(),
            expected: expected.to_string(),
            position,
        }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        let mut selector = Selector::everything();
        if *self.peek() == Token::End {
            return Ok(selector);
        }

        loop {
            let requirement = self.parse_requirement()?;
            selector.add(requirement);

            match self.next() {
                (Token::End, _) => return Ok(selector),
                (Token::Comma, _) => {
                    if *self.peek() == Token::End {
                        let (token, pos) = self.next();
                        return Err(Self::syntax_error(&token, pos, "identifier"));
                    }
                }
                (token, pos) => return Err(Self::syntax_error(&token, pos, "',' or end of string")),
            }
        }
    }

    fn parse_requirement(&mut self) -> Result<Requirement, SelectorError> {
        let negated = if *self.peek() == Token::Bang {
            self.next();
            true
        } else {
            false
        };

        let key = match self.next() {
            (Token::Identifier(key), _) => key,
            (token, pos) => return Err(Self::syntax_error(&token, pos, "identifier")),
        };

        if negated {
            return Requirement::new(&key, Operator::DoesNotExist, Vec::<String>::new());
        }

        if matches!(self.peek(), Token::End | Token::Comma) {
            return Requirement::new(&key, Operator::Exists, Vec::<String>::new());
        }

        let operator = match self.next() {
            (Token::Equals, _) => Operator::Equals,
            (Token::DoubleEquals, _) => Operator::DoubleEquals,
            (Token::NotEquals, _) => Operator::NotEquals,
            (Token::GreaterThan, _) => Operator::GreaterThan,
            (Token::LessThan, _) => Operator::LessThan,
            (Token::In, _) => Operator::In,
            (Token::NotIn, _) => Operator::NotIn,
            (token, pos) => {
                return Err(Self::syntax_error(
                    &token,
                    pos,
                    "'=', '!=', '==', 'in', 'notin', '>' or '<'",
                ));
            }
        };

        let values = match operator {
            Operator::In | Operator::NotIn => self.parse_value_set()?,
            _ => vec![self.parse_exact_value()?],
        };

        Requirement::new(&key, operator, values)
    }

    fn parse_exact_value(&mut self) -> Result<String, SelectorError> {
        if matches!(self.peek(), Token::End | Token::Comma) {
            return Ok(String::new());
        }
        match self.next() {
            (Token::Identifier(value), _) => Ok(value),
            (token, pos) => Err(Self::syntax_error(&token, pos, "identifier")),
        }
    }

    /// Parse `( v1, v2, ... )`; a missing value between separators is the empty string
    fn parse_value_set(&mut self) -> Result<Vec<String>, SelectorError> {
        match self.next() {
            (Token::OpenParen, _) => {}
            (token, pos) => return Err(Self::syntax_error(&token, pos, "'('")),
        }

        let mut values = Vec::new();
        let mut expecting_value = true;
        loop {
            let (token, pos) = self.next();
            match (token, expecting_value) {
                (Token::Identifier(value), true) => {
                    values.push(value);
                    expecting_value = false;
                }
                (Token::Comma, true) => values.push(String::new()),
                (Token::Comma, false) => expecting_value = true,
                (Token::CloseParen, true) => {
                    values.push(String::new());
                    return Ok(values);
                }
                (Token::CloseParen, false) => return Ok(values),
                (token, true) => {
                    return Err(Self::syntax_error(&token, pos, "identifier or ')'"));
                }
                (token, false) => return Err(Self::syntax_error(&token, pos, "',' or ')'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = Selector::parse("").unwrap();
        assert!(selector.is_everything());
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("app", "web")])));

        let selector = Selector::parse("   ").unwrap();
        assert!(selector.is_everything());
    }

    #[test]
    fn test_nothing_matches_nothing() {
        let selector = Selector::nothing();
        assert!(!selector.is_everything());
        assert!(!selector.matches(&labels(&[])));
        assert!(!selector.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn test_equality() {
        let selector = Selector::parse("app=web").unwrap();
        assert!(selector.matches(&labels(&[("app", "web")])));
        assert!(!selector.matches(&labels(&[("app", "db")])));
        assert!(!selector.matches(&labels(&[])));

        let selector = Selector::parse("app==web").unwrap();
        assert!(selector.matches(&labels(&[("app", "web"), ("tier", "x")])));
    }

    #[test]
    fn test_not_equals_matches_missing_key() {
        let selector = Selector::parse("env!=prod").unwrap();
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("env", "dev")])));
        assert!(!selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn test_set_based() {
        let selector = Selector::parse("env in (prod, staging)").unwrap();
        assert!(selector.matches(&labels(&[("env", "prod")])));
        assert!(selector.matches(&labels(&[("env", "staging")])));
        assert!(!selector.matches(&labels(&[("env", "dev")])));
        assert!(!selector.matches(&labels(&[])));

        let selector = Selector::parse("env notin (prod,staging)").unwrap();
        assert!(selector.matches(&labels(&[("env", "dev")])));
        assert!(selector.matches(&labels(&[])));
        assert!(!selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn test_exists_and_does_not_exist() {
        let selector = Selector::parse("canary").unwrap();
        assert!(selector.matches(&labels(&[("canary", "")])));
        assert!(!selector.matches(&labels(&[])));

        let selector = Selector::parse("!canary").unwrap();
        assert!(!selector.matches(&labels(&[("canary", "true")])));
        assert!(selector.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn test_numeric_comparison() {
        let selector = Selector::parse("replicas>2").unwrap();
        assert!(selector.matches(&labels(&[("replicas", "3")])));
        assert!(!selector.matches(&labels(&[("replicas", "2")])));
        assert!(!selector.matches(&labels(&[("replicas", "many")])));
        assert!(!selector.matches(&labels(&[])));

        let selector = Selector::parse("replicas<2").unwrap();
        assert!(selector.matches(&labels(&[("replicas", "1")])));
        assert!(!selector.matches(&labels(&[("replicas", "10")])));

        assert!(Selector::parse("replicas>two").is_err());
    }

    #[test]
    fn test_conjunction() {
        let selector = Selector::parse("app=web,env in (prod),!canary").unwrap();
        assert!(selector.matches(&labels(&[("app", "web"), ("env", "prod")])));
        assert!(!selector.matches(&labels(&[
            ("app", "web"),
            ("env", "prod"),
            ("canary", "true")
        ])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("env", "dev")])));
    }

    #[test]
    fn test_empty_values() {
        let selector = Selector::parse("app=").unwrap();
        assert!(selector.matches(&labels(&[("app", "")])));
        assert!(!selector.matches(&labels(&[("app", "web")])));

        let selector = Selector::parse("app in ()").unwrap();
        assert_eq!(selector.requirements()[0].values().len(), 1);
        assert!(selector.matches(&labels(&[("app", "")])));

        let selector = Selector::parse("app in (web,)").unwrap();
        assert_eq!(selector.requirements()[0].values().len(), 2);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(Selector::parse("app=web,").is_err());
        assert!(Selector::parse(",app").is_err());
        assert!(Selector::parse("app web").is_err());
        assert!(Selector::parse("app in web").is_err());
        assert!(Selector::parse("app in (web").is_err());
        assert!(Selector::parse("app in (a b)").is_err());
        assert!(Selector::parse("!app=web").is_err());
        assert!(Selector::parse("=web").is_err());
        assert!(Selector::parse("app=(web)").is_err());
    }

    #[test]
    fn test_syntax_error_position() {
        let err = Selector::parse("app=web tier").unwrap_err();
        assert_eq!(
            err,
            SelectorError::Syntax {
                found: "tier".to_string(),
                expected: "',' or end of string".to_string(),
                position: 8,
            }
        );
    }

    #[test]
    fn test_invalid_key_and_value() {
        assert!(matches!(
            Selector::parse("-app=web"),
            Err(SelectorError::InvalidKey { .. })
        ));
        assert!(matches!(
            Selector::parse("app=-web"),
            Err(SelectorError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_keyword_as_key_is_rejected() {
        assert!(Selector::parse("in=x").is_err());
    }

    #[test]
    fn test_display_is_canonical() {
        let selector = Selector::parse("z=1, a in (c,b),  !m, k, n!=2, q>5, r<6, s==t").unwrap();
        assert_eq!(
            selector.to_string(),
            "a in (b,c),k,!m,n!=2,q>5,r<6,s==t,z=1"
        );

        let reparsed = Selector::parse(&selector.to_string()).unwrap();
        assert_eq!(reparsed, selector);
    }

    #[test]
    fn test_from_set() {
        let set = labels(&[("app", "web"), ("env", "prod")]);
        let selector = Selector::from_set(&set).unwrap();
        assert_eq!(selector.to_string(), "app=web,env=prod");
        assert!(selector.matches(&set));
        assert!(!selector.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn test_requirement_validation() {
        assert!(Requirement::new("app", Operator::In, Vec::<String>::new()).is_err());
        assert!(Requirement::new("app", Operator::Equals, ["a", "b"]).is_err());
        assert!(Requirement::new("app", Operator::Exists, ["a"]).is_err());
        assert!(Requirement::new("app", Operator::GreaterThan, ["1.5"]).is_err());
        // Gt/Lt values are still label values, so a leading '-' is rejected
        assert!(Requirement::new("app", Operator::GreaterThan, ["-3"]).is_err());
        assert!(Requirement::new("app", Operator::GreaterThan, ["3"]).is_ok());
        assert!(Requirement::new("app", Operator::NotIn, ["a", "b"]).is_ok());
    }

    #[test]
    fn test_from_str() {
        let selector: Selector = "app=web".parse().unwrap();
        assert_eq!(selector.requirements().len(), 1);
        assert_eq!(selector.requirements()[0].key(), "app");
        assert_eq!(selector.requirements()[0].operator(), Operator::Equals);
    }
}
