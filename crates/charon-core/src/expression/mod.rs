//! Path expressions
//!
//! Fields name their entity property with a small expression language:
//!
//! - `a.b.c` walks nested properties
//! - `name|p1|p2` passes parameters to the reader of `name`
//! - `{model.attr}`, `{context.attr}`, `{parent.attr}` are tokens resolved at runtime,
//!   optionally followed by `.descent` steps and marked optional with a trailing `?`
//!
//! URL templates reuse the token syntax: `/pets/{model.id}`.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod parser;
pub mod resolver;
pub mod template;

pub use ast::{Namespace, Parameter, PathExpression, Segment, Token};
pub use parser::{split_balanced, Parser};
pub use resolver::ExpressionResolver;
pub use template::{TemplatePart, UrlTemplate};

use crate::error::Result;

/// Parse a path expression
pub fn parse_path(input: &str) -> Result<PathExpression> {
    Parser::new(input).parse()
}

/// Parse a single `{namespace.attribute}` token
pub fn parse_token(input: &str) -> Result<Token> {
    Parser::new(input).parse_token()
}
