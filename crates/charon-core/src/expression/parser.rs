//! Path expression parser
//!
//! Splits expressions on separators that sit outside `{...}` groups, so tokens may
//! themselves contain dots, pipes and nested tokens.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::ast::{Namespace, Parameter, PathExpression, Segment, Token};
use crate::error::{Error, Result};

/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';
/// Separator between a property name and its parameters
pub const PARAMETER_SEPARATOR: char = '|';

/// Parser for path expressions
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Parse the full input as a path expression
    pub fn parse(&self) -> Result<PathExpression> {
        let input = self.input.trim();
        if input.is_empty() {
            return Err(Error::expression(self.input, "empty expression"));
        }

        let segments = split_balanced(input, PATH_SEPARATOR)
            .map_err(|message| Error::expression(self.input, message))?
            .into_iter()
            .map(|raw| self.parse_segment(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(PathExpression {
            source: input.to_string(),
            segments,
        })
    }

    /// Parse the full input as a single `{...}` token
    pub fn parse_token(&self) -> Result<Token> {
        let raw = self.input.trim();
        match self.parse_parameter(raw)? {
            Parameter::Token(token) => Ok(token),
            Parameter::Literal(_) => Err(Error::expression(self.input, "expected a {namespace.attribute} token")),
        }
    }

    fn parse_segment(&self, raw: &str) -> Result<Segment> {
        let mut parts = split_balanced(raw, PARAMETER_SEPARATOR)
            .map_err(|message| Error::expression(self.input, message))?
            .into_iter();

        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(Error::expression(self.input, "empty path segment"));
        }
        if name.starts_with('{') {
            return Err(Error::expression(self.input, "a segment must start with a property name"));
        }

        let parameters = parts
            .map(|part| self.parse_parameter(part))
            .collect::<Result<Vec<_>>>()?;

        Ok(Segment {
            name: name.to_string(),
            parameters,
        })
    }

    fn parse_parameter(&self, raw: &str) -> Result<Parameter> {
        let raw = raw.trim();
        if !raw.starts_with('{') {
            return Ok(Parameter::Literal(raw.to_string()));
        }
        if !raw.ends_with('}') || raw.len() < 2 {
            return Err(Error::expression(self.input, format!("unterminated token '{}'", raw)));
        }

        let inner = &raw[1..raw.len() - 1];
        let (inner, optional) = match inner.strip_suffix('?') {
            Some(stripped) => (stripped, true),
            None => (inner, false),
        };

        let mut path = split_balanced(inner, PATH_SEPARATOR)
            .map_err(|message| Error::expression(self.input, message))?
            .into_iter();

        let namespace_name = path.next().unwrap_or_default().trim();
        let namespace = Namespace::from_name(namespace_name).ok_or_else(|| {
            Error::expression(
                self.input,
                format!("unknown namespace '{}' in token '{}'", namespace_name, raw),
            )
        })?;

        let attribute_path = path
            .next()
            .ok_or_else(|| Error::expression(self.input, format!("token '{}' names no attribute", raw)))?;
        let mut attribute_parts = split_balanced(attribute_path, PARAMETER_SEPARATOR)
            .map_err(|message| Error::expression(self.input, message))?
            .into_iter();
        let attribute = attribute_parts.next().unwrap_or_default().trim();
        if attribute.is_empty() {
            return Err(Error::expression(self.input, format!("token '{}' names no attribute", raw)));
        }
        let arguments = attribute_parts
            .map(|part| self.parse_parameter(part))
            .collect::<Result<Vec<_>>>()?;

        let descent = path.map(|name| name.trim().to_string()).collect();

        Ok(Parameter::Token(Token {
            namespace,
            attribute: attribute.to_string(),
            arguments,
            descent,
            optional,
            source: inner.to_string(),
        }))
    }
}

/// Split `input` on `separator`, ignoring separators nested inside braces
///
/// Fails on unbalanced braces.
pub fn split_balanced(input: &str, separator: char) -> std::result::Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, ch) in input.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unexpected '}}' at position {}", index))?;
            }
            c if c == separator && depth == 0 => {
                parts.push(&input[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(format!("unbalanced '{{' in '{}'", input));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_path() {
        assert_eq!(split_balanced("a.b.c", '.').unwrap(), vec!["a", "b", "c"]);
        assert_eq!(split_balanced("name", '.').unwrap(), vec!["name"]);
    }

    #[test]
    fn test_split_keeps_braced_groups() {
        let parts = split_balanced("owner|{context.x.y}.name", '.').unwrap();
        assert_eq!(parts, vec!["owner|{context.x.y}", "name"]);

        let nested = split_balanced("a|{model.b|{context.c}}.d", '.').unwrap();
        assert_eq!(nested, vec!["a|{model.b|{context.c}}", "d"]);
    }

    #[test]
    fn test_split_rejects_unbalanced() {
        assert!(split_balanced("a.{b", '.').is_err());
        assert!(split_balanced("a}.b", '.').is_err());
    }

    #[test]
    fn test_parse_simple_path() {
        let expr = Parser::new("category.name").parse().unwrap();
        assert_eq!(expr.segments.len(), 2);
        assert_eq!(expr.segments[0].name, "category");
        assert_eq!(expr.segments[1].name, "name");
        assert!(expr.simple_name().is_none());
        assert_eq!(Parser::new("id").parse().unwrap().simple_name(), Some("id"));
    }

    #[test]
    fn test_parse_parameters_and_tokens() {
        let expr = Parser::new("price|eur|{context.rate?}").parse().unwrap();
        let segment = &expr.segments[0];
        assert_eq!(segment.name, "price");
        assert_eq!(segment.parameters[0], Parameter::Literal("eur".to_string()));
        match &segment.parameters[1] {
            Parameter::Token(token) => {
                assert_eq!(token.namespace, Namespace::Context);
                assert_eq!(token.attribute, "rate");
                assert!(token.optional);
                assert_eq!(token.source, "context.rate");
            }
            other => panic!("expected token, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_token_with_descent_and_arguments() {
        let token = Parser::new("{model.owner|{context.lang}.address.city}").parse_token().unwrap();
        assert_eq!(token.namespace, Namespace::Model);
        assert_eq!(token.attribute, "owner");
        assert_eq!(token.descent, vec!["address", "city"]);
        assert_eq!(token.arguments.len(), 1);
        assert!(!token.optional);
    }

    #[test]
    fn test_unknown_namespace_is_rejected() {
        let err = Parser::new("items|{session.user}").parse().unwrap_err();
        assert!(matches!(err, Error::InvalidExpression { .. }));
        assert!(err.to_string().contains("unknown namespace"));
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(Parser::new("").parse().is_err());
        assert!(Parser::new("a..b").parse().is_err());
        assert!(Parser::new("{model.id}").parse().is_err());
        assert!(Parser::new("{context}").parse_token().is_err());
    }
}
