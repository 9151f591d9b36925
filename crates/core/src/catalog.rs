use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;

const EMBEDDED_ACTIONS: &str = include_str!("../data/aws_actions.txt");

/// Known `service:Operation` action names.
///
/// Iteration follows load order, which decides the order of near-miss
/// warnings, so catalog files are kept sorted.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<String>,
    lookup: HashSet<String>,
}

impl ActionCatalog {
    /// The catalog shipped with the crate.
    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED_ACTIONS)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read action catalog {}", path.display()))?;
        let catalog = Self::from_lines(&contents);
        log::debug!(
            "loaded {} actions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// One action per line. Blank lines are skipped and repeated lines keep
    /// their first position.
    pub fn from_lines(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, action: &str) -> bool {
        self.lookup.contains(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<String> for ActionCatalog {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut catalog = ActionCatalog::default();
        for action in iter {
            if catalog.lookup.insert(action.clone()) {
                catalog.actions.push(action);
            }
        }
        catalog
    }
}
