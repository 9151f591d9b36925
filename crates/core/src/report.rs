use serde::{Deserialize, Serialize};

use crate::{
    policy::{Policy, PERCENT_PRECISION},
    types::{render_diagnostic, Code, Diagnostic},
};

/// Collects the diagnostics of one policy analysis.
///
/// Checkers only append; nothing is removed or reordered once recorded.
#[derive(Debug, Clone)]
pub struct Report {
    policy: Policy,
    pub(crate) actions_actual: Vec<String>,
    pub(crate) actions_explicit: Vec<String>,
    pub(crate) actions_wildcard: Vec<String>,
    pub(crate) actions_info: Vec<String>,
    pub(crate) actions_warning: Vec<String>,
    pub(crate) actions_error: Vec<String>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    infos: Vec<Diagnostic>,
    recommendations: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub actions: usize,
    pub notactions: usize,
    pub actual: usize,
    pub explicit: usize,
    pub wildcard: usize,
    pub info: usize,
    pub warning: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub recommendations: usize,
    pub infos: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    pub fn absorb(&mut self, other: &Summary) {
        self.recommendations += other.recommendations;
        self.infos += other.infos;
        self.warnings += other.warnings;
        self.errors += other.errors;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Details {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infos: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<Diagnostic>,
}

/// Serializable result for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub file: String,
    pub size: usize,
    pub size_maximum: usize,
    pub percent: String,
    pub actions: ActionCounts,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

/// Totals over several analyzed files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files: Vec<String>,
    pub summary: Summary,
}

impl RunSummary {
    pub fn from_views<'a>(views: impl IntoIterator<Item = &'a ReportView>) -> Self {
        let mut run = RunSummary::default();
        for view in views {
            run.files.push(view.file.clone());
            run.summary.absorb(&view.summary);
        }
        run
    }
}

impl Report {
    pub fn new(policy: Policy) -> Self {
        log::debug!("initialize report for {}", policy.file());
        Self {
            policy,
            actions_actual: vec![],
            actions_explicit: vec![],
            actions_wildcard: vec![],
            actions_info: vec![],
            actions_warning: vec![],
            actions_error: vec![],
            errors: vec![],
            warnings: vec![],
            infos: vec![],
            recommendations: vec![],
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn add_error(&mut self, code: Code, details: &[(&str, String)]) {
        let d = render_diagnostic(code, details);
        log::error!("{}: {}", self.policy.file(), d);
        self.errors.push(d);
    }

    pub fn add_warning(&mut self, code: Code, details: &[(&str, String)]) {
        let d = render_diagnostic(code, details);
        log::warn!("{}: {}", self.policy.file(), d);
        self.warnings.push(d);
    }

    pub fn add_info(&mut self, code: Code, details: &[(&str, String)]) {
        let d = render_diagnostic(code, details);
        log::info!("{}: {}", self.policy.file(), d);
        self.infos.push(d);
    }

    pub fn add_recommendation(&mut self, code: Code, details: &[(&str, String)]) {
        let d = render_diagnostic(code, details);
        log::info!("{}: {}", self.policy.file(), d);
        self.recommendations.push(d);
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn infos(&self) -> &[Diagnostic] {
        &self.infos
    }

    pub fn recommendations(&self) -> &[Diagnostic] {
        &self.recommendations
    }

    pub fn actions_explicit(&self) -> &[String] {
        &self.actions_explicit
    }

    pub fn actions_wildcard(&self) -> &[String] {
        &self.actions_wildcard
    }

    pub fn actions_warning(&self) -> &[String] {
        &self.actions_warning
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> ReportView {
        let p = &self.policy;
        ReportView {
            file: p.file().to_string(),
            size: p.size(),
            size_maximum: p.size_max(),
            percent: format!("{:.*}%", PERCENT_PRECISION as usize, p.percent()),
            actions: ActionCounts {
                actions: p.actions().len(),
                notactions: p.not_actions().len(),
                actual: self.actions_actual.len(),
                explicit: self.actions_explicit.len(),
                wildcard: self.actions_wildcard.len(),
                info: self.actions_info.len(),
                warning: self.actions_warning.len(),
                error: self.actions_error.len(),
            },
            summary: Summary {
                recommendations: self.recommendations.len(),
                infos: self.infos.len(),
                warnings: self.warnings.len(),
                errors: self.errors.len(),
            },
            details: None,
        }
    }

    pub fn detailed(&self) -> ReportView {
        let mut view = self.summary();
        view.details = Some(Details {
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            infos: self.infos.clone(),
            recommendations: self.recommendations.clone(),
        });
        view
    }
}
