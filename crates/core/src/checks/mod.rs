pub mod actions;
pub mod limits;
pub mod recommendations;
pub mod schema;

use crate::{catalog::ActionCatalog, report::Report};

pub use actions::{ActionClassifier, Classification};

/// Runs every checker against `report` in a fixed order:
/// schema, limits, actions, recommendations.
pub fn run_checks(report: &mut Report, catalog: &ActionCatalog) {
    log::debug!("run checks for {}", report.policy().file());
    schema::check(report);
    limits::check(report);
    ActionClassifier::new(catalog).check(report);
    recommendations::check(report);
}
