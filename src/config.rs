//! Configuration management with YAML support

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

/// Event database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Recording schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: i64,
}

/// External classification agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_command")]
    pub command: String,

    #[serde(default = "default_classifier_model")]
    pub model: String,
}

/// Screenshot capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    #[serde(default = "default_max_files")]
    pub max_files: usize,

    #[serde(default)]
    pub save_images: bool,

    #[serde(default)]
    pub format: CaptureFormat,
}

/// Output encoding for resized captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    #[default]
    Jpeg,
    Png,
}

impl CaptureFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            CaptureFormat::Jpeg => "jpg",
            CaptureFormat::Png => "png",
        }
    }

    /// Format name as understood by `sips -s format`
    pub fn sips_name(&self) -> &'static str {
        match self {
            CaptureFormat::Jpeg => "jpeg",
            CaptureFormat::Png => "png",
        }
    }
}

/// A user-defined classification label. The category *name* is denormalized
/// into events at write time; renaming a category never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub examples: Vec<String>,

    #[serde(default)]
    pub color: String,
}

/// Validation failures; any of these is fatal at startup, before the
/// pipeline ever runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("storage.path is required")]
    MissingStoragePath,

    #[error("classifier.model is required")]
    MissingModel,

    #[error("categories must contain at least one entry")]
    NoCategories,

    #[error("image.max_width must be between 100 and 4096, got: {0}")]
    InvalidMaxWidth(u32),

    #[error("category id and name are required")]
    UnnamedCategory,

    #[error("duplicate category id: {0}")]
    DuplicateCategoryId(String),
}

// Default value functions
fn default_storage_path() -> String {
    "vigil.db".to_string()
}

fn default_interval_minutes() -> i64 {
    10
}

fn default_classifier_command() -> String {
    "copilot".to_string()
}

fn default_classifier_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_width() -> u32 {
    1280
}

fn default_max_files() -> usize {
    100
}

fn default_categories() -> Vec<CategoryConfig> {
    let category = |id: &str, name: &str, description: &str, examples: &[&str], color: &str| {
        CategoryConfig {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            examples: examples.iter().map(|e| e.to_string()).collect(),
            color: color.to_string(),
        }
    };

    vec![
        category(
            "work",
            "Work",
            "Editors, terminals, documents and other focused work",
            &["VS Code", "terminal", "spreadsheet"],
            "#4c78a8",
        ),
        category(
            "communication",
            "Communication",
            "Mail, chat and video calls",
            &["Slack", "Mail", "Zoom"],
            "#72b7b2",
        ),
        category(
            "browsing",
            "Browsing",
            "General web browsing and reading",
            &["news site", "documentation", "search results"],
            "#f58518",
        ),
        category(
            "entertainment",
            "Entertainment",
            "Video, music and games",
            &["YouTube", "Netflix", "game"],
            "#e45756",
        ),
    ]
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            command: default_classifier_command(),
            model: default_classifier_model(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_files: default_max_files(),
            save_images: false,
            format: CaptureFormat::Jpeg,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            scheduler: SchedulerConfig::default(),
            classifier: ClassifierConfig::default(),
            image: ImageConfig::default(),
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, creating it with defaults on
    /// first use.
    pub fn load(path: &str) -> Result<Self> {
        let resolved = resolve_config_path(path);

        if !resolved.exists() {
            let config = Config::default();
            config.write(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&resolved)
            .with_context(|| format!("read config {}", resolved.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parse config {}", resolved.display()))?;
        Ok(config)
    }

    /// Serialize the configuration to its YAML file, creating parent
    /// directories as needed.
    pub fn write(&self, path: &str) -> Result<()> {
        let resolved = resolve_config_path(path);
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&resolved, content)
            .with_context(|| format!("write config {}", resolved.display()))?;
        Ok(())
    }

    /// Check invariants the rest of the system assumes: the pipeline never
    /// runs against an invalid configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.path.is_empty() {
            return Err(ConfigError::MissingStoragePath);
        }
        if self.classifier.model.is_empty() {
            return Err(ConfigError::MissingModel);
        }
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if self.image.max_width < 100 || self.image.max_width > 4096 {
            return Err(ConfigError::InvalidMaxWidth(self.image.max_width));
        }

        let mut seen = std::collections::HashSet::new();
        for category in &self.categories {
            if category.id.is_empty() || category.name.is_empty() {
                return Err(ConfigError::UnnamedCategory);
            }
            if !seen.insert(category.id.as_str()) {
                return Err(ConfigError::DuplicateCategoryId(category.id.clone()));
            }
        }

        Ok(())
    }

    /// Database path with `~` expanded; bare relative paths land under the
    /// data directory.
    pub fn storage_path(&self) -> Result<PathBuf> {
        resolve_data_path(&self.storage.path)
    }
}

/// Per-user data directory (`~/.vigil`)
pub fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".vigil"))
}

pub fn resolve_config_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

fn resolve_data_path(raw: &str) -> Result<PathBuf> {
    if raw.starts_with('~') {
        return Ok(PathBuf::from(shellexpand::tilde(raw).to_string()));
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    Ok(data_dir()?.join(raw))
}
