//! `reclaim catalog` command implementation

use super::CliContext;
use crate::CliResult;
use crate::output::{OutputFormat, table, to_json};

/// Execute the `reclaim catalog` command
pub fn run(context: &CliContext, format: OutputFormat) -> CliResult<String> {
    let catalog = &context.catalog;
    if format == OutputFormat::Json {
        return to_json(&catalog.to_document());
    }

    let mut table = table(&[
        "Kind",
        "Pattern",
        "coe_cpu",
        "coe_mem",
        "c",
        "Cores max",
        "Executors",
        "Executor shape",
        "Min reduced",
    ]);
    for entry in catalog.entries() {
        let model = entry.to_model();
        table.add_row(vec![
            model.name.clone(),
            entry.kind.pattern().to_string(),
            format!("{:e}", model.coe_cpu),
            format!("{:e}", model.coe_mem),
            format!("{:.6}", model.intercept),
            model.cores_max.to_string(),
            model.overall_executors().to_string(),
            format!("{}c / {} MB", model.per_executor_cores, model.per_executor_memory),
            model.min_reduced_executors.to_string(),
        ]);
    }

    Ok(format!(
        "Catalog '{}' (version {})\n{}",
        catalog.profile(),
        catalog.version().unwrap_or("unversioned"),
        table
    ))
}
