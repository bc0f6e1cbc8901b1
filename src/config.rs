use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use tracing::{debug, warn};

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "phonebook";
const BASE_URL_ENV: &str = "PHONEBOOK_BASE_URL";

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the configuration was read from; `None` when running on defaults
    pub config_path: Option<PathBuf>,
    pub base_url: String,
    /// Overrides the token published by the map page
    pub csrf_token: Option<String>,
    pub timeout: Duration,
    pub directory: DirectoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            base_url: "http://localhost:5050".to_string(),
            csrf_token: None,
            timeout: Duration::from_secs(10),
            directory: DirectoryConfig::default(),
        }
    }
}

// =============================================================================
// Contact directory markup
// =============================================================================

/// Markup conventions of the phonebook listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// `id` of the element holding the contact cards
    pub container_id: String,
    /// CSS selector of a single contact card inside the container
    pub card_selector: String,
    /// Class list of the column each visible card is wrapped in
    pub column_class: String,
    /// Label printed before the number of visible contacts
    pub counter_label: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            container_id: "contacts-cards-container".to_string(),
            card_selector: ".contact-card".to_string(),
            column_class: "col-md-6 col-lg-4 mb-4".to_string(),
            counter_label: "Найдено контактов".to_string(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load the configuration from `explicit` or the default location.
///
/// An explicitly requested file must exist; the default file is optional
/// and its absence means built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            let path = expand_tilde(path);
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            Some(path)
        }
        None => {
            let path = config_path()?;
            path.exists().then_some(path)
        }
    };

    let mut config = match path {
        Some(path) => load_from(&path)?,
        None => {
            debug!("no configuration file, using defaults");
            Config::default()
        }
    };

    if let Ok(url) = env::var(BASE_URL_ENV) {
        let url = url.trim();
        if !url.is_empty() {
            config.base_url = url.trim_end_matches('/').to_string();
        }
    }
    validate_base_url(&config.base_url)?;

    Ok(config)
}

pub fn load_from(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    let mut config = parse(&raw)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    config.config_path = Some(path.to_path_buf());
    Ok(config)
}

pub fn parse(raw: &str) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw).context("failed to parse configuration as TOML")?;

    warn_unknown_keys(&value);

    let file: ConfigFile = value
        .try_into()
        .context("failed to deserialize configuration")?;

    if file.timeout_secs == 0 {
        bail!("`timeout_secs` must be greater than zero");
    }

    let base_url = file.base_url.trim().trim_end_matches('/').to_string();
    validate_base_url(&base_url)?;

    let csrf_token = file
        .csrf_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    Ok(Config {
        config_path: None,
        base_url,
        csrf_token,
        timeout: Duration::from_secs(file.timeout_secs),
        directory: file.directory.into(),
    })
}

fn validate_base_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("`base_url` must start with http:// or https://, got `{}`", url);
    }
    Ok(())
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known = HashSet::from(["base_url", "csrf_token", "timeout_secs", "directory"]);
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            warn!("unknown configuration key `{}`", key);
        }
    }

    if let Some(directory) = table.get("directory").and_then(|v| v.as_table()) {
        let known = HashSet::from(["container_id", "card_selector", "column_class", "counter_label"]);
        for key in directory.keys() {
            if !known.contains(key.as_str()) {
                warn!("unknown directory entry `{}`", key);
            }
        }
    }
}

// =============================================================================
// File representation
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: String,
    csrf_token: Option<String>,
    timeout_secs: u64,
    directory: DirectoryFile,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = Config::default();
        Self {
            base_url: defaults.base_url,
            csrf_token: None,
            timeout_secs: defaults.timeout.as_secs(),
            directory: DirectoryFile::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DirectoryFile {
    container_id: Option<String>,
    card_selector: Option<String>,
    column_class: Option<String>,
    counter_label: Option<String>,
}

impl From<DirectoryFile> for DirectoryConfig {
    fn from(file: DirectoryFile) -> Self {
        let defaults = DirectoryConfig::default();
        let pick = |value: Option<String>, fallback: String| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };
        Self {
            container_id: pick(file.container_id, defaults.container_id),
            card_selector: pick(file.card_selector, defaults.card_selector),
            column_class: pick(file.column_class, defaults.column_class),
            counter_label: pick(file.counter_label, defaults.counter_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("").unwrap();
        let defaults = Config::default();
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.timeout, defaults.timeout);
        assert_eq!(config.directory, defaults.directory);
        assert!(config.csrf_token.is_none());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
base_url = "https://phonebook.example.org/"
csrf_token = " token "
timeout_secs = 3

[directory]
container_id = "cards"
counter_label = "Found"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://phonebook.example.org");
        assert_eq!(config.csrf_token.as_deref(), Some("token"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.directory.container_id, "cards");
        assert_eq!(config.directory.counter_label, "Found");
        assert_eq!(config.directory.card_selector, ".contact-card");
    }

    #[test]
    fn test_blank_csrf_token_is_ignored() {
        let config = parse("csrf_token = \"   \"").unwrap();
        assert!(config.csrf_token.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse("timeout_secs = 0").is_err());
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        assert!(parse("base_url = \"ftp://example.org\"").is_err());
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let config = parse("colour = \"red\"\n[directory]\nfoo = 1\n").unwrap();
        assert_eq!(config.directory, DirectoryConfig::default());
    }

    #[test]
    fn test_load_from_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = 7\n").unwrap();
        let config = load_from(&path).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
