//! Settings - YAML configuration with file discovery

use crate::core::{Convention, LayoutMetrics, SortMode, ViewFilter, Zoom};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = "flowtask.yml";
const DATA_DIR: &str = ".flowtask";
const DATA_FILE: &str = "tasks.json";

/// User settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Task file location; `~/` expands to the home directory
    pub data_file: Option<PathBuf>,
    pub convention: Convention,
    pub zoom: f64,
    pub sort: SortMode,
    pub view: ViewFilter,
    /// Base card and spacing dimensions at zoom 1.0
    pub metrics: LayoutMetrics,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: None,
            convention: Convention::default(),
            zoom: Zoom::default().value(),
            sort: SortMode::default(),
            view: ViewFilter::default(),
            metrics: LayoutMetrics::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        if let Some(field) = settings.metrics.invalid_field() {
            anyhow::bail!(
                "{}: metrics.{} is out of range (card sizes must be positive, gaps not negative)",
                path.display(),
                field
            );
        }
        Ok(settings)
    }

    /// Discover and load settings.
    /// Priority:
    /// 1. `explicit` (must exist)
    /// 2. ./flowtask.yml
    /// 3. <config dir>/flowtask/config.yml
    /// 4. Built-in defaults
    pub fn auto_load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in Self::candidates() {
            if candidate.exists() {
                log::info!("Using settings from {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("flowtask").join("config.yml"));
        }
        paths
    }

    /// Zoom factor, clamped to the supported range
    pub fn initial_zoom(&self) -> Zoom {
        Zoom::new(self.zoom)
    }

    /// Task file to use: `cli` override, then `data_file`, then the default
    pub fn data_path(&self, cli: Option<&Path>) -> Result<PathBuf> {
        match cli.or(self.data_file.as_deref()) {
            Some(path) => Ok(expand_home(path)),
            None => default_data_path(),
        }
    }
}

/// `~/.flowtask/tasks.json`
pub fn default_data_path() -> Result<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        anyhow::bail!("Cannot locate the home directory; pass --data <FILE>");
    };
    Ok(home.join(DATA_DIR).join(DATA_FILE))
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
