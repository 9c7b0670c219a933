//! Abstract syntax tree for path expressions
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A parsed path expression such as `owner.name|{context.lang}`
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    /// Original source text
    pub source: String,
    /// Segments, separated by `.` outside braces
    pub segments: Vec<Segment>,
}

/// One step of a path: a property name plus its `|`-separated parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

/// A segment or token parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Literal text passed as-is
    Literal(String),
    /// `{namespace.attribute...}` reference resolved at runtime
    Token(Token),
}

/// Reference to a value in one of the resolution namespaces
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub namespace: Namespace,
    /// Attribute read from the namespace root
    pub attribute: String,
    /// Parameters passed to the attribute reader
    pub arguments: Vec<Parameter>,
    /// Further attributes read from the resolved value, in order
    pub descent: Vec<String>,
    /// Marked with a trailing `?`: a null value is acceptable
    pub optional: bool,
    /// Token text without braces and optional marker, e.g. `context.lang`
    pub source: String,
}

/// Root a token resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The entity currently being resolved
    Model,
    /// A named context parameter
    Context,
    /// The nearest ancestor entity
    Parent,
}

impl Namespace {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "model" => Some(Namespace::Model),
            "context" => Some(Namespace::Context),
            "parent" => Some(Namespace::Parent),
            _ => None,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Model => write!(f, "model"),
            Namespace::Context => write!(f, "context"),
            Namespace::Parent => write!(f, "parent"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}{}}}", self.source, if self.optional { "?" } else { "" })
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PathExpression {
    /// The property name when the expression is a single parameterless segment
    pub fn simple_name(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [segment] if segment.parameters.is_empty() => Some(&segment.name),
            _ => None,
        }
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }
}
