//! `reclaim resolve` command implementation

use super::CliContext;
use crate::CliResult;
use crate::output::{OutputFormat, table, to_json};
use reclaim_kernel::workload::WorkloadKind;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Resolution {
    name: String,
    /// Model the name resolves to in the loaded catalog.
    model: Option<String>,
    /// Every catalog type whose pattern occurs in the name.
    candidates: Vec<String>,
}

/// Execute the `reclaim resolve` command
pub fn run(context: &CliContext, names: &[String], format: OutputFormat) -> CliResult<String> {
    let resolutions: Vec<Resolution> = names
        .iter()
        .map(|name| Resolution {
            name: name.clone(),
            model: context
                .catalog
                .resolve(name)
                .map(|entry| entry.kind.model_name().to_string()),
            candidates: WorkloadKind::matches(name)
                .into_iter()
                .filter(|kind| context.catalog.get(*kind).is_some())
                .map(|kind| kind.model_name().to_string())
                .collect(),
        })
        .collect();

    if format == OutputFormat::Json {
        return to_json(&resolutions);
    }

    let mut table = table(&["Name", "Model", "Candidates"]);
    for r in &resolutions {
        table.add_row(vec![
            r.name.clone(),
            r.model.clone().unwrap_or_else(|| "-".to_string()),
            r.candidates.join(", "),
        ]);
    }
    Ok(table.to_string())
}
