//! Application configuration for bibledata.
//!
//! User config lives at `~/.bibledata/bibledata.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BibleDataError, Result};
use crate::types::TranslationTarget;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "bibledata.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".bibledata";

// ---------------------------------------------------------------------------
// Config structs (matching bibledata.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote chapter API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where downloaded chapters are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Translations fetched by `download`, in order.
    #[serde(default = "default_translations")]
    pub translations: Vec<TranslationTarget>,

    /// Local dataset converted by `copy`.
    #[serde(default)]
    pub copy: CopySourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            output: OutputConfig::default(),
            translations: default_translations(),
            copy: CopySourceConfig::default(),
        }
    }
}

fn default_translations() -> Vec<TranslationTarget> {
    vec![
        TranslationTarget::new("BSB", "bsb"),
        TranslationTarget::new("ENGWEBP", "engwebp"),
    ]
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; chapters live at `{base_url}/{translation}/{book}/{chapter}.json`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed pause after every request, in milliseconds.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

fn default_base_url() -> String {
    "https://bible.helloao.org/api".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    100
}
fn default_user_agent() -> String {
    concat!("bibledata/", env!("CARGO_PKG_VERSION")).into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root of the bundled data tree (`{dir}/{folder}/{BOOK}/{n}.json`).
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "livingdevotional/Resources/BibleData".into()
}

/// `[copy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopySourceConfig {
    /// Directory of per-book subdirectories holding `{chapter}.json` files.
    #[serde(default = "default_copy_source")]
    pub source_dir: String,

    /// Output folder name for the converted translation.
    #[serde(default = "default_copy_folder")]
    pub folder: String,

    /// Bundle directories tried in order; the first existing one wins,
    /// otherwise the first entry is created.
    #[serde(default = "default_bundle_candidates")]
    pub bundle_candidates: Vec<String>,
}

impl Default for CopySourceConfig {
    fn default() -> Self {
        Self {
            source_dir: default_copy_source(),
            folder: default_copy_folder(),
            bundle_candidates: default_bundle_candidates(),
        }
    }
}

fn default_copy_source() -> String {
    "bible_api/cmn_cu1".into()
}
fn default_copy_folder() -> String {
    "cu1".into()
}
fn default_bundle_candidates() -> Vec<String> {
    vec![
        "../BibleData.bundle".into(),
        "BibleData.bundle".into(),
        "livingdevotional/Resources/BibleData.bundle".into(),
        "livingdevotional/BibleData.bundle".into(),
    ]
}

impl AppConfig {
    /// Check values that would otherwise fail late, mid-run.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url).map_err(|e| {
            BibleDataError::config(format!("invalid api.base_url '{}': {e}", self.api.base_url))
        })?;

        if self.api.timeout_secs == 0 {
            return Err(BibleDataError::config("api.timeout_secs must be positive"));
        }

        for t in &self.translations {
            if t.api_id.trim().is_empty() || t.folder.trim().is_empty() {
                return Err(BibleDataError::config(format!(
                    "translation entry {t:?} needs both api_id and folder"
                )));
            }
        }

        if self.copy.folder.trim().is_empty() {
            return Err(BibleDataError::config("copy.folder must not be empty"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bibledata/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BibleDataError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bibledata/bibledata.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| BibleDataError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BibleDataError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write a default config file to `path` (or the default location),
/// creating parent directories. Returns the path written.
pub fn init_config(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| BibleDataError::io(dir, e))?;
        }
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BibleDataError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BibleDataError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("bible.helloao.org"));
        assert!(toml_str.contains("engwebp"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.api.timeout_secs, 30);
        assert_eq!(parsed.api.request_delay_ms, 100);
        assert_eq!(parsed.translations.len(), 2);
        assert_eq!(parsed.copy.folder, "cu1");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[api]
request_delay_ms = 0

[[translations]]
api_id = "cmn_cuv"
folder = "cuv"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.request_delay(), Duration::ZERO);
        assert_eq!(config.api.base_url, "https://bible.helloao.org/api");
        assert_eq!(config.translations, vec![TranslationTarget::new("cmn_cuv", "cuv")]);
        assert_eq!(config.output.dir, "livingdevotional/Resources/BibleData");
        assert_eq!(config.copy.bundle_candidates.len(), 4);
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "not a url".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid api.base_url"));
    }

    #[test]
    fn validate_rejects_empty_folder() {
        let mut config = AppConfig::default();
        config.translations.push(TranslationTarget::new("KJV", ""));
        assert!(config.validate().is_err());

        assert!(AppConfig::default().validate().is_ok());
    }
}
