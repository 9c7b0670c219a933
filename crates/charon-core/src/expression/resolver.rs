//! Evaluation of path expressions against entities
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::ast::{Namespace, Parameter, PathExpression, Segment, Token};
use super::template::{TemplatePart, UrlTemplate};
use crate::context::Context;
use crate::entity::{read_property, EntityRef, PropertyValue};
use crate::error::{Error, Result};

/// Resolves expressions for one entity within one context
///
/// `parent` is the nearest ancestor entity of the entity being resolved, used by the
/// `parent` namespace.
pub struct ExpressionResolver<'a> {
    context: &'a Context,
    parent: Option<EntityRef>,
}

impl<'a> ExpressionResolver<'a> {
    pub fn new(context: &'a Context, parent: Option<EntityRef>) -> Self {
        Self { context, parent }
    }

    /// Walk `expression` from `target`
    ///
    /// Each segment is read from the value the previous segment produced; a null
    /// intermediate value ends the walk with null. `field` names the owning field in
    /// error messages.
    pub fn resolve_path(
        &self,
        target: &PropertyValue,
        expression: &PathExpression,
        field: Option<&str>,
    ) -> Result<PropertyValue> {
        self.resolve_segments(target, &expression.segments, field)
    }

    /// Resolve every segment but the last, returning the value the last segment
    /// should be read from or written to
    pub fn resolve_owner(
        &self,
        target: &PropertyValue,
        expression: &PathExpression,
        field: Option<&str>,
    ) -> Result<PropertyValue> {
        match expression.segments.split_last() {
            Some((_, init)) => self.resolve_segments(target, init, field),
            None => Ok(target.clone()),
        }
    }

    fn resolve_segments(
        &self,
        target: &PropertyValue,
        segments: &[Segment],
        field: Option<&str>,
    ) -> Result<PropertyValue> {
        let mut current = target.clone();
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 && !current.is_truthy() {
                return Ok(PropertyValue::Null);
            }
            let parameters = self.resolve_parameters(&segment.parameters, &current, field)?;
            current = read_property(&current, &segment.name, &parameters);
        }
        Ok(current)
    }

    /// Resolve segment parameters. Literals pass through; a required token that
    /// resolves to null fails with [`Error::VariableNotFoundInContext`].
    pub fn resolve_parameters(
        &self,
        parameters: &[Parameter],
        target: &PropertyValue,
        field: Option<&str>,
    ) -> Result<Vec<PropertyValue>> {
        parameters
            .iter()
            .map(|parameter| match parameter {
                Parameter::Literal(text) => Ok(PropertyValue::string(text.clone())),
                Parameter::Token(token) => {
                    let value = self.resolve_token(token, target)?;
                    if value.is_null() && !token.optional {
                        return Err(Error::VariableNotFoundInContext {
                            field: field.map(str::to_string),
                            parameter: token.source.clone(),
                        });
                    }
                    Ok(value)
                }
            })
            .collect()
    }

    /// Resolve a single token. Never fails for a null value; descent into null
    /// yields null.
    pub fn resolve_token(&self, token: &Token, target: &PropertyValue) -> Result<PropertyValue> {
        let arguments = self.resolve_parameters(&token.arguments, target, None)?;

        let root = match token.namespace {
            Namespace::Model => read_property(target, &token.attribute, &arguments),
            Namespace::Context => self.context.parameter(&token.attribute, target.as_entity()),
            Namespace::Parent => match &self.parent {
                Some(parent) => read_property(&PropertyValue::Entity(parent.clone()), &token.attribute, &arguments),
                None => PropertyValue::Null,
            },
        };

        let mut value = root;
        for name in &token.descent {
            if value.is_null() {
                return Ok(PropertyValue::Null);
            }
            value = read_property(&value, name, &[]);
        }
        Ok(value)
    }

    /// Substitute every token of `template`; text outside tokens is kept verbatim
    pub fn render_template(&self, template: &UrlTemplate, target: &PropertyValue) -> Result<String> {
        let mut output = String::with_capacity(template.source.len());
        for part in &template.parts {
            match part {
                TemplatePart::Text(text) => output.push_str(text),
                TemplatePart::Token(token) => {
                    output.push_str(&self.resolve_token(token, target)?.to_display_string());
                }
            }
        }
        Ok(output)
    }
}
