//! Application configuration layered from defaults, an optional TOML file and
//! the process environment.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default upstream catalog endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";
/// Largest page the upstream catalog is asked for in a single request.
pub const MAX_PAGE_SIZE: u32 = 20;
/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "chimix";

const CONFIG_FILE: &str = "config.toml";
const PLACEHOLDER_KEY: &str = "demo_key";
const ENV_PREFIX: &str = "CHIMIX";
const RAWG_KEY_VAR: &str = "RAWG_API_KEY";

const DEFAULT_CONFIG: &str = r#"# chimix configuration
#
# Leave api_key unset to browse the bundled demo catalog.
# api_key = "your-rawg-api-key"
base_url = "https://api.rawg.io/api"
page_size = 20
request_timeout_secs = 10
enrichment_delay_ms = 100
"#;

/// Runtime configuration for the catalog client and frontends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog API credential. `None` selects demo mode.
    pub api_key: Option<String>,
    /// Base URL of the catalog API, without a trailing slash.
    pub base_url: String,
    /// Games requested per page.
    pub page_size: u32,
    /// Per-request timeout for upstream calls.
    pub request_timeout_secs: u64,
    /// Delay between staggered detail fetches for popular listings.
    pub enrichment_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            request_timeout_secs: 10,
            enrichment_delay_ms: 100,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path().as_deref())
    }

    /// Load configuration using `path` as the optional file layer.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let mut config: AppConfig = builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("failed to parse configuration")?;

        config.api_key = resolve_key(config.api_key.take(), env::var(RAWG_KEY_VAR).ok());
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        self.api_key = sanitize_key(self.api_key.take());
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
    }

    /// Whether a usable credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Credential prefix safe to show in logs.
    pub fn masked_key(&self) -> String {
        match self.api_key.as_deref() {
            Some(key) => format!("{}...", key.chars().take(8).collect::<String>()),
            None => "None".to_string(),
        }
    }
}

fn sanitize_key(key: Option<String>) -> Option<String> {
    key.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != PLACEHOLDER_KEY)
}

/// The configured key when usable, otherwise the conventional fallback variable.
fn resolve_key(configured: Option<String>, fallback: Option<String>) -> Option<String> {
    sanitize_key(configured).or_else(|| sanitize_key(fallback))
}

/// Default location of the configuration file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Write the commented default configuration when no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    if let Some(path) = config_path() {
        ensure_default_config_at(&path)?;
    }
    Ok(())
}

/// Write the default configuration to `path` unless it already exists.
/// Returns `true` when a file was created.
pub fn ensure_default_config_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn placeholder_and_blank_keys_select_demo_mode() {
        assert_eq!(sanitize_key(None), None);
        assert_eq!(sanitize_key(Some("   ".to_string())), None);
        assert_eq!(sanitize_key(Some("demo_key".to_string())), None);
        assert_eq!(
            sanitize_key(Some(" abc123 ".to_string())).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn blank_configured_key_defers_to_fallback() {
        let fallback = Some("rawg-env-key".to_string());
        assert_eq!(
            resolve_key(Some(String::new()), fallback.clone()).as_deref(),
            Some("rawg-env-key")
        );
        assert_eq!(
            resolve_key(Some("demo_key".to_string()), fallback.clone()).as_deref(),
            Some("rawg-env-key")
        );
        assert_eq!(
            resolve_key(Some("file-key".to_string()), fallback).as_deref(),
            Some("file-key")
        );
        assert_eq!(resolve_key(Some("  ".to_string()), None), None);
    }

    #[test]
    fn default_file_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("chimix").join("config.toml");

        assert!(ensure_default_config_at(&path)?);
        assert!(!ensure_default_config_at(&path)?);

        let config = AppConfig::load_from(Some(&path))?;
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.enrichment_delay_ms, 100);
        Ok(())
    }

    #[test]
    fn file_values_are_normalized() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_key = \"0123456789abcdef\"\nbase_url = \"https://example.test/api/\"\npage_size = 40\n",
        )?;

        let config = AppConfig::load_from(Some(&path))?;
        assert!(config.has_api_key());
        assert_eq!(config.masked_key(), "01234567...");
        assert_eq!(config.base_url, "https://example.test/api");
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        Ok(())
    }
}
