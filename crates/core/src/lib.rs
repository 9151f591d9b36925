pub mod catalog;
pub mod checks;
pub mod config;
pub mod discovery;
pub mod policy;
pub mod report;
pub mod types;

use std::path::Path;

use anyhow::Context;

use crate::{
    catalog::ActionCatalog,
    checks::run_checks,
    policy::{Policy, DEFAULT_SIZE_MAX},
    report::Report,
};

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Measure the policy in its compact serialization.
    pub minimize: bool,
    pub size_max: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            minimize: false,
            size_max: DEFAULT_SIZE_MAX,
        }
    }
}

/// Analyzes one policy document given as JSON text.
///
/// Only unparseable input is an error; every finding about the policy
/// itself ends up as a diagnostic in the returned report.
pub fn analyze_str(
    raw: &str,
    filename: &str,
    catalog: &ActionCatalog,
    opts: &AnalyzeOptions,
) -> anyhow::Result<Report> {
    let policy = Policy::from_json(raw, filename, opts.minimize, opts.size_max)?;
    let mut report = Report::new(policy);
    run_checks(&mut report, catalog);
    Ok(report)
}

pub fn analyze_file(
    path: &Path,
    catalog: &ActionCatalog,
    opts: &AnalyzeOptions,
) -> anyhow::Result<Report> {
    log::info!("check file {}", path.display());
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    analyze_str(&raw, &path.display().to_string(), catalog, opts)
        .with_context(|| format!("failed to analyze {}", path.display()))
}
