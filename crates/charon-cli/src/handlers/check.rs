//! Check command handler

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use charon_core::{Action, Registry};
use charon_schemas::{DefinitionLoader, LoaderError};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
struct DefinitionSummary {
    name: String,
    entity: String,
    document: String,
    fields: Vec<FieldSummary>,
}

#[derive(Debug, Serialize)]
struct FieldSummary {
    name: String,
    display: String,
    actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relationship: Option<String>,
}

/// Handle the check command
///
/// Documents are checked together, so relationships may cross files. Every
/// definition is then built once to surface errors that only show at compile time.
#[instrument(skip_all, fields(files = args.files.len()))]
pub fn handle_check(args: CheckArgs, output: &mut OutputWriter) -> Result<()> {
    let mut loader = DefinitionLoader::new()?;
    let loaded = match loader.load_all(&args.files, None) {
        Ok(loaded) => loaded,
        Err(err @ LoaderError::InvalidDocument { .. }) => {
            if !output.is_human() {
                output.violations(err.violations())?;
            }
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    let registry = Registry::new();
    loader.load_into(&args.files, &registry)?;

    let mut summaries = Vec::new();
    for entry in &loaded {
        for name in entry.document.names() {
            let definition = registry.definition(name)?;
            let fields = definition
                .fields()
                .iter()
                .map(|field| FieldSummary {
                    name: field.name().to_string(),
                    display: field.display_name().to_string(),
                    actions: field.actions().collect(),
                    relationship: field.relationship().map(|r| format!("{} ({})", r.definition(), r.cardinality())),
                })
                .collect();
            summaries.push(DefinitionSummary {
                name: definition.name().to_string(),
                entity: definition.entity_type().to_string(),
                document: entry.path.display().to_string(),
                fields,
            });
        }
    }

    if !output.is_human() {
        return output.data(&summaries);
    }

    output.success(&format!(
        "✓ {} definition(s) in {} document(s) are valid",
        summaries.len(),
        loaded.len()
    ))?;
    output.table(
        &["Definition", "Entity", "Fields", "Document"],
        summaries
            .iter()
            .map(|s| vec![s.name.clone(), s.entity.clone(), s.fields.len().to_string(), s.document.clone()])
            .collect(),
    )?;

    if args.fields {
        for summary in &summaries {
            output.section(&summary.name)?;
            output.table(
                &["Field", "Display", "Actions", "Relationship"],
                summary
                    .fields
                    .iter()
                    .map(|f| {
                        vec![
                            f.name.clone(),
                            f.display.clone(),
                            f.actions.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(","),
                            f.relationship.clone().unwrap_or_default(),
                        ]
                    })
                    .collect(),
            )?;
        }
    }
    Ok(())
}
