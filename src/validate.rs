use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::cli::RunConfig;
use crate::compare::{compare_files, CompareOptions};
use crate::error::Result;
use crate::launcher::{command_line, launch};
use crate::plugin::OutputCategory;
use crate::workspace::{RunKind, RunWorkspace};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    Identical,
    Mismatched { count: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResult {
    pub category: OutputCategory,
    pub outcome: CategoryOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub results: Vec<CategoryResult>,
}

impl ValidationSummary {
    pub fn all_identical(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.outcome == CategoryOutcome::Identical)
    }

    pub fn total_mismatches(&self) -> usize {
        self.results
            .iter()
            .map(|r| match r.outcome {
                CategoryOutcome::Mismatched { count } => count,
                _ => 0,
            })
            .sum()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Compares reference against new output for each category.
///
/// A failing category is recorded and the remaining ones are still compared.
pub fn compare_categories(
    workspace: &RunWorkspace,
    categories: &[OutputCategory],
    opts: &CompareOptions,
) -> ValidationSummary {
    let mut summary = ValidationSummary::default();

    for &category in categories {
        let reference = workspace.output_path(RunKind::Reference, category);
        let candidate = workspace.output_path(RunKind::New, category);

        let outcome = match compare_files(&reference, &candidate, opts) {
            Ok(c) if c.is_identical() => CategoryOutcome::Identical,
            Ok(c) => {
                for m in c.mismatches.iter().take(20) {
                    log::warn!("{category}: {m}");
                }
                CategoryOutcome::Mismatched { count: c.count() }
            }
            Err(err) => {
                log::error!("{category}: {err}");
                CategoryOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        summary.results.push(CategoryResult { category, outcome });
    }

    summary
}

fn execute(
    workspace: &RunWorkspace,
    kind: RunKind,
    binary: &Path,
    config: &RunConfig,
) -> Result<()> {
    let binary_name = binary.file_name().unwrap_or_default().to_string_lossy();
    let cfg_name = config.cfg.file_name().unwrap_or_default().to_string_lossy();
    let cmd = command_line(&config.launch, &binary_name, &cfg_name, config.iterations);

    launch(&workspace.run_dir(kind), &cmd)?;
    workspace.collect_outputs(kind, &config.categories, &config.filter)
}

/// Stages, runs and compares both builds.
pub fn run_validation(config: &RunConfig) -> Result<ValidationSummary> {
    let workspace = RunWorkspace::new(&config.work_dir);
    workspace.prepare(config)?;

    execute(&workspace, RunKind::New, &config.new_binary, config)?;
    if let Some(old) = &config.old_binary {
        execute(&workspace, RunKind::Reference, old, config)?;
    }

    let summary = compare_categories(&workspace, &config.categories, &config.compare);
    if let Some(path) = &config.json_report {
        summary.write_json(path)?;
    }
    Ok(summary)
}
