use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "scplint.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Settings read from `scplint.toml`. Command-line flags take precedence.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub size_max: Option<usize>,
    pub minimize: Option<bool>,
    pub detailed: Option<bool>,
    pub recursive: Option<bool>,
    pub output: Option<OutputFormat>,
    pub actions_file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        if config.size_max == Some(0) {
            anyhow::bail!("{}: size_max must be greater than zero", path.display());
        }
        Ok(config)
    }

    pub fn discover() -> Option<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Config::load(path).ok()
        } else {
            None
        }
    }
}
