//! Content configuration module.
//!
//! Handles loading, validating, and layering the settings the content client
//! and image pipeline are built from. Configuration is resolved once at
//! process start; the resulting [`ContentConfig`] is immutable.
//!
//! ## Layers
//!
//! Later layers override earlier ones key by key:
//!
//! ```text
//! stock defaults            (ContentConfig::default)
//!   └── config.toml         (in --config-dir, optional)
//!         └── environment   (CMS_* variables, .env honoured)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional except project_id - defaults shown below
//!
//! project_id = ""              # CMS project identifier (required)
//! dataset = "production"       # Dataset to read from
//! api_version = "2024-01-01"   # Dated API version
//! use_cdn = true               # Read through the CDN (faster, may be stale)
//! # api_host = "https://..."   # Override the query API base URL
//! # request_timeout_secs = 30  # Bound each request (default: unbounded)
//!
//! [images]
//! cdn_host = "https://cdn.sanity.io"
//! ```
//!
//! ## Environment
//!
//! | Variable | Key |
//! |----------|-----|
//! | `CMS_PROJECT_ID` | `project_id` |
//! | `CMS_DATASET` | `dataset` |
//! | `CMS_API_VERSION` | `api_version` |
//! | `CMS_USE_CDN` | `use_cdn` (`true`/`false`/`1`/`0`) |
//! | `CMS_API_HOST` | `api_host` |
//! | `CMS_CDN_HOST` | `images.cdn_host` |
//!
//! Unknown keys are rejected to catch typos early. There is deliberately no
//! token key: the site only ever reads published content.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Content configuration loaded from `config.toml` and the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// CMS project identifier. Selects the API and CDN hosts.
    pub project_id: String,
    /// Dataset within the project (e.g. `production`, `staging`).
    pub dataset: String,
    /// Dated API version, `YYYY-MM-DD`, or `1` / `X` for legacy endpoints.
    pub api_version: String,
    /// Read through the API CDN. Trades freshness for latency.
    pub use_cdn: bool,
    /// Override for the query API base URL (tests, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
    /// Per-request timeout. Absent means a fetch may stay pending indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Image asset pipeline settings.
    pub images: ImagesConfig,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            api_host: None,
            request_timeout_secs: None,
            images: ImagesConfig::default(),
        }
    }
}

/// Image asset pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Base URL of the image CDN.
    pub cdn_host: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            cdn_host: "https://cdn.sanity.io".to_string(),
        }
    }
}

impl ContentConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.is_empty() {
            return Err(ConfigError::Validation(
                "project_id must be set (config.toml or CMS_PROJECT_ID)".into(),
            ));
        }
        if !is_identifier(&self.project_id) {
            return Err(ConfigError::Validation(
                "project_id may only contain a-z, 0-9 and dashes".into(),
            ));
        }
        if !is_identifier(&self.dataset.replace('_', "-")) {
            return Err(ConfigError::Validation(
                "dataset may only contain a-z, 0-9, dashes and underscores".into(),
            ));
        }
        if !is_api_version(&self.api_version) {
            return Err(ConfigError::Validation(
                "api_version must be YYYY-MM-DD, 1 or X".into(),
            ));
        }
        if let Some(host) = &self.api_host
            && !is_http_url(host)
        {
            return Err(ConfigError::Validation(
                "api_host must start with http:// or https://".into(),
            ));
        }
        if !is_http_url(&self.images.cdn_host) {
            return Err(ConfigError::Validation(
                "images.cdn_host must start with http:// or https://".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Base URL of the query API, honouring `api_host` and `use_cdn`.
    pub fn api_base_url(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None if self.use_cdn => format!("https://{}.apicdn.sanity.io", self.project_id),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }

    /// Full URL of the dataset's query endpoint.
    pub fn query_endpoint(&self) -> String {
        let version = self.api_version.trim_start_matches('v');
        format!(
            "{}/v{}/data/query/{}",
            self.api_base_url(),
            version,
            self.dataset
        )
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_api_version(v: &str) -> bool {
    let v = v.trim_start_matches('v');
    if v == "1" || v == "X" {
        return true;
    }
    let parts: Vec<&str> = v.split('-').collect();
    matches!(parts.as_slice(), [y, m, d]
        if y.len() == 4 && m.len() == 2 && d.len() == 2
            && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())))
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ContentConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Build a TOML overlay from `CMS_*` environment variables.
///
/// Takes the variables as an iterator so tests need not touch the process
/// environment. Empty values are skipped, so a blank line in a template
/// `.env` leaves the file value in place. Returns `Ok(None)` when no
/// relevant variable is set.
pub fn env_overlay<I>(vars: I) -> Result<Option<toml::Value>, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut root = toml::Table::new();
    let mut images = toml::Table::new();

    for (name, value) in vars {
        if value.trim().is_empty() {
            continue;
        }
        match name.as_str() {
            "CMS_PROJECT_ID" => {
                root.insert("project_id".into(), toml::Value::String(value));
            }
            "CMS_DATASET" => {
                root.insert("dataset".into(), toml::Value::String(value));
            }
            "CMS_API_VERSION" => {
                root.insert("api_version".into(), toml::Value::String(value));
            }
            "CMS_USE_CDN" => {
                root.insert("use_cdn".into(), toml::Value::Boolean(parse_bool(&name, &value)?));
            }
            "CMS_API_HOST" => {
                root.insert("api_host".into(), toml::Value::String(value));
            }
            "CMS_CDN_HOST" => {
                images.insert("cdn_host".into(), toml::Value::String(value));
            }
            _ => {}
        }
    }

    if !images.is_empty() {
        root.insert("images".into(), toml::Value::Table(images));
    }
    if root.is_empty() {
        Ok(None)
    } else {
        Ok(Some(toml::Value::Table(root)))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Validation(format!(
            "{name} must be a boolean, got '{value}'"
        ))),
    }
}

/// Merge optional overlays onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<ContentConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .flatten()
        .fold(base, merge_toml);
    let config: ContentConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory plus the process
/// environment.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<ContentConfig, ConfigError> {
    let base = stock_defaults_value();
    let file = load_raw_config(dir)?;
    let env = env_overlay(std::env::vars())?;
    resolve_config(base, [file, env])
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Clinic Content Configuration
# ============================
# All settings are optional except project_id. Remove or comment out any
# you don't need. Values shown below are the defaults.
#
# Every key can also be set through the environment (CMS_PROJECT_ID,
# CMS_DATASET, CMS_API_VERSION, CMS_USE_CDN, CMS_API_HOST, CMS_CDN_HOST).
# Environment values win over this file. A .env file is read if present.
#
# Unknown keys will cause an error.

# CMS project identifier.
project_id = ""

# Dataset to read published documents from.
dataset = "production"

# Dated API version (YYYY-MM-DD). Pin it; behaviour can change between dates.
api_version = "2024-01-01"

# Read through the API CDN. Responses may lag edits by a few seconds.
use_cdn = true

# Override the query API base URL, e.g. for a proxy.
# api_host = "https://example.api.sanity.io"

# Bound each request. Without it a slow request stays loading until it ends.
# request_timeout_secs = 30

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# Base URL of the image CDN serving transformed assets.
cdn_host = "https://cdn.sanity.io"
"##
}
