use error_stack::{Report, ResultExt};
use reclaim_foundation::PerformanceModelRegistry;
use reclaim_kernel::config::{ReclaimConfig, load_catalog, load_config};
use reclaim_kernel::error::{ReclaimError, ReclaimResult};
use reclaim_kernel::reduction::ExecutorRounding;
use reclaim_kernel::workload::WorkloadKind;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn registry_from(path: &Path) -> ReclaimResult<PerformanceModelRegistry> {
    let catalog = load_catalog(path)
        .map_err(ReclaimError::from)
        .map_err(Report::new)
        .attach(format!("loading catalog {}", path.display()))?;
    Ok(PerformanceModelRegistry::new(catalog))
}

#[test]
fn external_catalog_drives_registration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.json");
    fs::write(
        &path,
        r#"{
  "profile": "site",
  "version": "2024.03",
  "workloads": [
    {"kind": "naive-bayes", "coe_cpu": -0.07, "coe_mem": 0.0002, "c": -0.04,
     "cores_max": 90, "per_executor_cores": 9, "per_executor_memory": 2622,
     "min_reduced_executors": 2}
  ]
}"#,
    )
    .unwrap();

    let registry = registry_from(&path).unwrap();
    let model = registry.register("NaiveBayes-1").unwrap();
    assert_eq!(model.overall_executors(), 10);
    assert_eq!(model.lower_bound_reduced_cores(), 18);
    assert_eq!(model.intercept, -0.04);
    assert!(registry.register("SVM-1").is_none());
}

#[test]
fn broken_catalog_report_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "profile = \"broken\"\nworkloads = []\n").unwrap();

    let report = registry_from(&path).unwrap_err();
    let rendered = format!("{report:?}");
    assert!(rendered.contains("broken.toml"));
    assert!(matches!(report.current_context(), ReclaimError::Config(_)));
}

#[test]
fn config_selects_profile_and_policy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reclaim.toml");
    fs::write(
        &path,
        r#"
profile = "huge-inputs"

[policy]
executor_rounding = "floor"
"#,
    )
    .unwrap();

    let config: ReclaimConfig = load_config(&path).unwrap();
    assert_eq!(config.policy.executor_rounding, ExecutorRounding::Floor);

    let catalog = config.load_catalog().unwrap();
    assert_eq!(catalog.len(), 4);
    assert!(catalog.get(WorkloadKind::WordCount).is_none());
}
