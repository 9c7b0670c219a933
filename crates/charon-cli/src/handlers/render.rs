//! Render command handler

use super::utils::{build_context, definition, load_registry, read_document, schema_paths, transformer_config};
use crate::cli::RenderArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use charon_core::{Action, CountProcessor, DynamicEntity, ResourceTransformer};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Handle the render command
#[instrument(skip_all, fields(definition = %args.schema.definition, entity = %args.entity.display()))]
pub fn handle_render(args: RenderArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let action = args.action.map(Action::from).unwrap_or(config.transform.read_action);
    if !action.is_read() {
        return Err(Error::invalid_args(format!("cannot render for write action '{}'", action)));
    }

    let registry = load_registry(&schema_paths(&args.schema, config)?)?;
    let definition = definition(&registry, &args.schema.definition)?;
    let document = read_document(&args.entity)?;

    let mut context = build_context(action, &args.schema)?
        .with_fields(args.fields.iter().cloned())
        .with_expand(args.expand.iter().cloned());
    if args.count {
        context = context.with_processor(Arc::new(CountProcessor));
    }

    let transformer = ResourceTransformer::with_config(registry.clone(), transformer_config(&args.schema, config)?);
    tracing::info!(action = %action, "rendering entity document");

    let rendered = match &document {
        Value::Array(items) => {
            let entities = items
                .iter()
                .map(|item| DynamicEntity::hydrate(&definition, item, &registry))
                .collect::<charon_core::Result<Vec<_>>>()?;
            output.info(&format!("Rendering {} {} entities", entities.len(), definition.name()))?;
            transformer.to_resources(&definition, &entities, &context)?.to_json()
        }
        _ => {
            let entity = DynamicEntity::hydrate(&definition, &document, &registry)?;
            transformer.to_resource(&definition, &entity, &context)?.to_json()
        }
    };

    output.data(&rendered)
}
