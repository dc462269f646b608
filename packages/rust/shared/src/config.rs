//! Application configuration for wpmigrate.
//!
//! User config lives at `~/.wpmigrate/wpmigrate.toml`.
//! CLI flags and environment variables override config file values, which
//! override defaults. The destination write token is only ever read from the
//! environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MigrateError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wpmigrate.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wpmigrate";

/// Largest page size the source API accepts.
const MAX_PER_PAGE: u32 = 100;

// ---------------------------------------------------------------------------
// Config structs (matching wpmigrate.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source content API settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Destination content store settings.
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Migration behaviour.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the WordPress site (without `/wp-json`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Items requested per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://alldigitalrewards.com".into()
}
fn default_per_page() -> u32 {
    MAX_PER_PAGE
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[destination]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Content store project identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Dataset name inside the project.
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Dated API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Name of the env var holding the write token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Override for the API host, e.g. `http://localhost:3333`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Use the CDN host for reads.
    #[serde(default)]
    pub use_cdn: bool,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: default_dataset(),
            api_version: default_api_version(),
            token_env: default_token_env(),
            api_host: None,
            use_cdn: false,
        }
    }
}

fn default_dataset() -> String {
    "production".into()
}
fn default_api_version() -> String {
    "2024-01-01".into()
}
fn default_token_env() -> String {
    "SANITY_TOKEN".into()
}

/// `[migration]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// What to do when a collection page fails to load.
    #[serde(default)]
    pub on_fetch_error: FetchErrorPolicy,

    /// Classification applied to every migrated page.
    #[serde(default = "default_page_type")]
    pub page_type: String,

    /// Author name used when a post has no embedded author.
    #[serde(default = "default_unknown_author")]
    pub unknown_author: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            on_fetch_error: FetchErrorPolicy::default(),
            page_type: default_page_type(),
            unknown_author: default_unknown_author(),
        }
    }
}

fn default_page_type() -> String {
    "company".into()
}
fn default_unknown_author() -> String {
    "Unknown".into()
}

/// Behaviour when fetching a collection page fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchErrorPolicy {
    /// Keep the pages fetched so far, skip the rest, and warn.
    #[default]
    Truncate,
    /// Fail the whole migration.
    Abort,
}

impl std::fmt::Display for FetchErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncate => f.write_str("truncate"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

impl std::str::FromStr for FetchErrorPolicy {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "truncate" => Ok(Self::Truncate),
            "abort" => Ok(Self::Abort),
            other => Err(MigrateError::config(format!(
                "unknown fetch error policy '{other}': expected 'truncate' or 'abort'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime settings (merged from config + CLI flags + env)
// ---------------------------------------------------------------------------

/// Values supplied on the command line or through environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub wordpress_url: Option<String>,
    pub project_id: Option<String>,
    pub dataset: Option<String>,
    pub per_page: Option<u32>,
    pub on_fetch_error: Option<FetchErrorPolicy>,
}

/// Resolved source API settings.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_url: Url,
    pub per_page: u32,
    pub timeout: Duration,
}

/// Resolved destination settings.
#[derive(Debug, Clone)]
pub struct DestinationSettings {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub api_host: Option<String>,
    pub use_cdn: bool,
    /// Write token; optional for read-only use.
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Everything a migration run needs, validated up front.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub source: SourceSettings,
    pub destination: DestinationSettings,
    pub on_fetch_error: FetchErrorPolicy,
    pub page_type: String,
    pub unknown_author: String,
}

impl SourceSettings {
    pub fn resolve(config: &AppConfig, overrides: &Overrides) -> Result<Self> {
        let raw_url = overrides
            .wordpress_url
            .as_deref()
            .unwrap_or(&config.source.base_url);
        let base_url = Url::parse(raw_url.trim_end_matches('/'))
            .map_err(|e| MigrateError::config(format!("invalid source URL '{raw_url}': {e}")))?;

        let per_page = overrides.per_page.unwrap_or(config.source.per_page);
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(MigrateError::config(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {per_page}"
            )));
        }

        Ok(Self {
            base_url,
            per_page,
            timeout: Duration::from_secs(config.source.timeout_secs),
        })
    }
}

impl DestinationSettings {
    /// Resolve destination settings. Fails if no project identifier is set.
    pub fn resolve(config: &AppConfig, overrides: &Overrides, token: Option<String>) -> Result<Self> {
        let project_id = overrides
            .project_id
            .clone()
            .or_else(|| config.destination.project_id.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                MigrateError::config(
                    "missing destination project id. Set SANITY_PROJECT_ID or destination.project_id",
                )
            })?;

        Ok(Self {
            project_id,
            dataset: overrides
                .dataset
                .clone()
                .unwrap_or_else(|| config.destination.dataset.clone()),
            api_version: config.destination.api_version.clone(),
            api_host: config.destination.api_host.clone(),
            use_cdn: config.destination.use_cdn,
            token,
            timeout: Duration::from_secs(config.source.timeout_secs),
        })
    }
}

impl MigrationSettings {
    /// Merge config, overrides and the write token. Both the project id and
    /// the token are required; nothing is contacted before this succeeds.
    pub fn resolve(config: &AppConfig, overrides: &Overrides, token: Option<String>) -> Result<Self> {
        let destination = DestinationSettings::resolve(config, overrides, token)?;
        if destination.token.is_none() {
            return Err(MigrateError::config(format!(
                "missing destination write token. Set the {} environment variable",
                config.destination.token_env
            )));
        }

        Ok(Self {
            source: SourceSettings::resolve(config, overrides)?,
            destination,
            on_fetch_error: overrides
                .on_fetch_error
                .unwrap_or(config.migration.on_fetch_error),
            page_type: config.migration.page_type.clone(),
            unknown_author: config.migration.unknown_author.clone(),
        })
    }
}

/// Read the write token from the env var named in `[destination].token_env`.
pub fn read_token(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.destination.token_env) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wpmigrate/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MigrateError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wpmigrate/wpmigrate.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MigrateError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MigrateError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MigrateError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MigrateError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_project(id: &str) -> Overrides {
        Overrides {
            project_id: Some(id.into()),
            ..Overrides::default()
        }
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("per_page = 100"));
        assert!(toml_str.contains("SANITY_TOKEN"));
        assert!(toml_str.contains("on_fetch_error = \"truncate\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.destination.dataset, "production");
        assert_eq!(parsed.migration.page_type, "company");
        assert_eq!(parsed.migration.on_fetch_error, FetchErrorPolicy::Truncate);
    }

    #[test]
    fn partial_config_file() {
        let toml_str = r#"
[source]
base_url = "https://blog.example.com"

[destination]
project_id = "abc123"

[migration]
on_fetch_error = "abort"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.per_page, 100);
        assert_eq!(config.destination.project_id.as_deref(), Some("abc123"));
        assert_eq!(config.migration.on_fetch_error, FetchErrorPolicy::Abort);
        assert_eq!(config.migration.unknown_author, "Unknown");
    }

    #[test]
    fn missing_project_id_is_config_error() {
        let err = MigrationSettings::resolve(
            &AppConfig::default(),
            &Overrides::default(),
            Some("token".into()),
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::Config { .. }));
        assert!(err.to_string().contains("project id"));
    }

    #[test]
    fn missing_token_is_config_error() {
        let err = MigrationSettings::resolve(&AppConfig::default(), &with_project("p1"), None)
            .unwrap_err();
        assert!(err.to_string().contains("SANITY_TOKEN"));
    }

    #[test]
    fn destination_settings_allow_missing_token() {
        let settings =
            DestinationSettings::resolve(&AppConfig::default(), &with_project("p1"), None)
                .expect("resolve");
        assert_eq!(settings.project_id, "p1");
        assert!(settings.token.is_none());
    }

    #[test]
    fn overrides_win_over_file() {
        let mut config = AppConfig::default();
        config.destination.project_id = Some("from-file".into());
        config.destination.dataset = "staging".into();

        let overrides = Overrides {
            wordpress_url: Some("https://wp.example.com/".into()),
            project_id: Some("from-env".into()),
            dataset: None,
            per_page: Some(25),
            on_fetch_error: Some(FetchErrorPolicy::Abort),
        };
        let settings =
            MigrationSettings::resolve(&config, &overrides, Some("t".into())).expect("resolve");

        assert_eq!(settings.destination.project_id, "from-env");
        assert_eq!(settings.destination.dataset, "staging");
        assert_eq!(settings.source.base_url.as_str(), "https://wp.example.com/");
        assert_eq!(settings.source.per_page, 25);
        assert_eq!(settings.on_fetch_error, FetchErrorPolicy::Abort);
    }

    #[test]
    fn per_page_out_of_range() {
        let overrides = Overrides {
            per_page: Some(500),
            ..with_project("p1")
        };
        let err = MigrationSettings::resolve(&AppConfig::default(), &overrides, Some("t".into()))
            .unwrap_err();
        assert!(err.to_string().contains("per_page"));
    }

    #[test]
    fn fetch_error_policy_parsing() {
        assert_eq!("abort".parse::<FetchErrorPolicy>().unwrap(), FetchErrorPolicy::Abort);
        assert_eq!(FetchErrorPolicy::Truncate.to_string(), "truncate");
        assert!("retry".parse::<FetchErrorPolicy>().is_err());
    }

    #[test]
    fn token_read_from_named_env_var() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.destination.token_env = "WPM_TEST_NONEXISTENT_TOKEN_12345".into();
        assert!(read_token(&config).is_none());
    }
}
