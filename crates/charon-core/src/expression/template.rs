//! URL templates with embedded tokens

use super::ast::Token;
use super::parser::Parser;
use crate::error::{Error, Result};

/// A URL such as `/pets/{model.id}/photos`
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTemplate {
    pub source: String,
    pub parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Token(Token),
}

impl UrlTemplate {
    /// Parse `input`, treating every balanced `{...}` group as a token
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut text_start = 0;
        let mut token_start = None;
        let mut depth = 0usize;

        for (index, ch) in input.char_indices() {
            match ch {
                '{' => {
                    if depth == 0 {
                        if index > text_start {
                            parts.push(TemplatePart::Text(input[text_start..index].to_string()));
                        }
                        token_start = Some(index);
                    }
                    depth += 1;
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let start = token_start.take().unwrap_or(index);
                        let token = Parser::new(&input[start..=index]).parse_token()?;
                        parts.push(TemplatePart::Token(token));
                        text_start = index + 1;
                    }
                }
                _ => {}
            }
        }

        if depth != 0 {
            return Err(Error::expression(input, "unterminated token in url template"));
        }
        if text_start < input.len() {
            parts.push(TemplatePart::Text(input[text_start..].to_string()));
        }

        Ok(Self {
            source: input.to_string(),
            parts,
        })
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Token(token) => Some(token),
            TemplatePart::Text(_) => None,
        })
    }
}
