//! Parse command handler

use super::utils::{build_context, definition, load_registry, read_document, schema_paths, transformer_config};
use crate::cli::ParseArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use charon_core::{Action, DynamicEntity, DynamicEntityFactory, Registry, ResourceTransformer};
use serde_json::Value;
use std::path::Path;
use tracing::instrument;

/// Handle the parse command
#[instrument(skip_all, fields(definition = %args.schema.definition, payload = %args.payload.display()))]
pub fn handle_parse(args: ParseArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let action = args.action.map(Action::from).unwrap_or(config.transform.write_action);
    if !action.is_write() {
        return Err(Error::invalid_args(format!("cannot parse for read action '{}'", action)));
    }
    if action == Action::Edit && args.existing.is_none() {
        output.warning("editing without --existing applies the payload to a new entity")?;
    }

    let registry = load_registry(&schema_paths(&args.schema, config)?)?;
    let definition = definition(&registry, &args.schema.definition)?;
    let payload = read_document(&args.payload)?;

    let factory = DynamicEntityFactory::new();
    if let Some(path) = &args.known {
        store_known_entities(&factory, &registry, path)?;
    }
    let existing = match &args.existing {
        Some(path) => Some(DynamicEntity::hydrate(&definition, &read_document(path)?, &registry)?),
        None => None,
    };

    let context = build_context(action, &args.schema)?;
    let transformer = ResourceTransformer::with_config(registry.clone(), transformer_config(&args.schema, config)?);
    tracing::info!(action = %action, existing = existing.is_some(), "applying payload");

    let resource = transformer.from_array(&definition, &payload, &context)?;
    let entity = transformer.to_entity(&resource, &definition, &factory, &context, existing)?;

    output.data(&DynamicEntity::to_json(&entity))
}

/// Make the entities of a `{"Definition": [entity, ...]}` document linkable by identifier
fn store_known_entities(factory: &DynamicEntityFactory, registry: &Registry, path: &Path) -> Result<()> {
    let known = match read_document(path)? {
        Value::Object(map) => map,
        _ => {
            return Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "an object of definition names to entity lists".to_string(),
            })
        }
    };

    for (name, entities) in &known {
        let definition = super::utils::definition(registry, name)?;
        let entities = match entities {
            Value::Array(entities) => entities.as_slice(),
            single => std::slice::from_ref(single),
        };
        for document in entities {
            factory.store(DynamicEntity::hydrate(&definition, document, registry)?);
        }
        tracing::debug!(definition = %name, stored = factory.stored(definition.entity_type()), "stored known entities");
    }
    Ok(())
}
