//! Configuration management for deckgen
//!
//! This module provides hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. Supports TOML configuration files with `[deck]`,
//! `[collaborator]`, and `[export]` sections.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use deckgen_utils::error::{ConfigError, DeckError};

/// Default environment variable holding the provider API key
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default REST endpoint of the Gemini API family
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default artifact name for exported decks
pub const DEFAULT_OUTPUT_NAME: &str = "presentation.pdf";

/// Configuration for deckgen operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that searches for
/// `deckgen.toml` upward from the current directory, stopping at repository
/// root markers, and applies built-in defaults for unspecified values.
///
/// # Source Attribution
///
/// Each configuration value tracks its source (`cli`, `config`, or `default`)
/// for debugging and status display.
///
/// # Configuration File Format
///
/// ```toml
/// [deck]
/// outline = "deck.toml"
///
/// [collaborator]
/// provider = "gemini"
/// model = "gemini-2.5-flash"
/// image_model = "imagen-4.0-generate-001"
/// api_key_env = "GEMINI_API_KEY"
/// timeout_seconds = 120
/// concurrency = 4
///
/// [export]
/// output = "presentation.pdf"
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Deck outline location.
    pub deck: DeckSection,
    /// Collaborator provider configuration.
    pub collaborator: CollaboratorSection,
    /// Export artifact configuration.
    pub export: ExportSection,
    /// Source attribution for each setting (for status display).
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[deck]` section of deckgen.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeckSection {
    /// Path of the outline file, relative to the working directory.
    pub outline: Option<String>,
}

impl Default for DeckSection {
    fn default() -> Self {
        Self {
            outline: Some("deck.toml".to_string()),
        }
    }
}

/// `[collaborator]` section of deckgen.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollaboratorSection {
    /// Provider name: "gemini" or "static".
    pub provider: Option<String>,
    /// Text generation model.
    pub model: Option<String>,
    /// Image generation model.
    pub image_model: Option<String>,
    /// Environment variable the API key is read from.
    pub api_key_env: Option<String>,
    /// REST endpoint base, overridable for testing against a local server.
    pub base_url: Option<String>,
    /// Per-call timeout in seconds.
    pub timeout_seconds: Option<u64>,
    /// Maximum number of slides generated concurrently during `build`.
    pub concurrency: Option<usize>,
}

impl Default for CollaboratorSection {
    fn default() -> Self {
        Self {
            provider: Some("gemini".to_string()),
            model: Some("gemini-2.5-flash".to_string()),
            image_model: Some("imagen-4.0-generate-001".to_string()),
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout_seconds: Some(120),
            concurrency: Some(4),
        }
    }
}

/// `[export]` section of deckgen.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportSection {
    /// Artifact path the PDF is written to.
    pub output: Option<String>,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output: Some(DEFAULT_OUTPUT_NAME.to_string()),
        }
    }
}

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::ConfigFile(path) => write!(f, "config file ({})", path.display()),
            Self::Defaults => write!(f, "defaults"),
        }
    }
}

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    deck: Option<DeckSection>,
    collaborator: Option<CollaboratorSection>,
    export: Option<ExportSection>,
}

/// CLI arguments for configuration override
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub outline: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub image_model: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub concurrency: Option<usize>,
    pub output: Option<String>,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deck: DeckSection::default(),
            collaborator: CollaboratorSection::default(),
            export: ExportSection::default(),
            source_attribution: HashMap::new(),
        }
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global
    /// state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut source_attribution = HashMap::new();

        // Start with built-in defaults
        let mut deck = DeckSection::default();
        let mut collaborator = CollaboratorSection::default();
        let mut export = ExportSection::default();

        for key in [
            "outline",
            "provider",
            "model",
            "image_model",
            "api_key_env",
            "base_url",
            "timeout_seconds",
            "concurrency",
            "output",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Defaults);
        }

        // Discover and load config file (if not explicitly provided)
        let config_path = if let Some(explicit_path) = &cli_args.config_path {
            Some(explicit_path.clone())
        } else {
            Self::discover_config_file_from(start_dir)?
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;

            let config_source = ConfigSource::ConfigFile(path.clone());

            if let Some(file_deck) = file_config.deck
                && file_deck.outline.is_some()
            {
                deck.outline = file_deck.outline;
                source_attribution.insert("outline".to_string(), config_source.clone());
            }

            if let Some(file_collab) = file_config.collaborator {
                if file_collab.provider.is_some() {
                    collaborator.provider = file_collab.provider;
                    source_attribution.insert("provider".to_string(), config_source.clone());
                }
                if file_collab.model.is_some() {
                    collaborator.model = file_collab.model;
                    source_attribution.insert("model".to_string(), config_source.clone());
                }
                if file_collab.image_model.is_some() {
                    collaborator.image_model = file_collab.image_model;
                    source_attribution.insert("image_model".to_string(), config_source.clone());
                }
                if file_collab.api_key_env.is_some() {
                    collaborator.api_key_env = file_collab.api_key_env;
                    source_attribution.insert("api_key_env".to_string(), config_source.clone());
                }
                if file_collab.base_url.is_some() {
                    collaborator.base_url = file_collab.base_url;
                    source_attribution.insert("base_url".to_string(), config_source.clone());
                }
                if file_collab.timeout_seconds.is_some() {
                    collaborator.timeout_seconds = file_collab.timeout_seconds;
                    source_attribution.insert("timeout_seconds".to_string(), config_source.clone());
                }
                if file_collab.concurrency.is_some() {
                    collaborator.concurrency = file_collab.concurrency;
                    source_attribution.insert("concurrency".to_string(), config_source.clone());
                }
            }

            if let Some(file_export) = file_config.export
                && file_export.output.is_some()
            {
                export.output = file_export.output;
                source_attribution.insert("output".to_string(), config_source);
            }
        }

        // Environment override sits between file and CLI
        if let Ok(env_provider) = env::var("DECKGEN_PROVIDER")
            && !env_provider.is_empty()
        {
            collaborator.provider = Some(env_provider);
            source_attribution.insert("provider".to_string(), ConfigSource::Cli);
        }

        // Apply CLI overrides (highest priority)
        if let Some(outline) = &cli_args.outline {
            deck.outline = Some(outline.clone());
            source_attribution.insert("outline".to_string(), ConfigSource::Cli);
        }
        if let Some(provider) = &cli_args.provider {
            collaborator.provider = Some(provider.clone());
            source_attribution.insert("provider".to_string(), ConfigSource::Cli);
        }
        if let Some(model) = &cli_args.model {
            collaborator.model = Some(model.clone());
            source_attribution.insert("model".to_string(), ConfigSource::Cli);
        }
        if let Some(image_model) = &cli_args.image_model {
            collaborator.image_model = Some(image_model.clone());
            source_attribution.insert("image_model".to_string(), ConfigSource::Cli);
        }
        if let Some(api_key_env) = &cli_args.api_key_env {
            collaborator.api_key_env = Some(api_key_env.clone());
            source_attribution.insert("api_key_env".to_string(), ConfigSource::Cli);
        }
        if let Some(base_url) = &cli_args.base_url {
            collaborator.base_url = Some(base_url.clone());
            source_attribution.insert("base_url".to_string(), ConfigSource::Cli);
        }
        if let Some(timeout_seconds) = cli_args.timeout_seconds {
            collaborator.timeout_seconds = Some(timeout_seconds);
            source_attribution.insert("timeout_seconds".to_string(), ConfigSource::Cli);
        }
        if let Some(concurrency) = cli_args.concurrency {
            collaborator.concurrency = Some(concurrency);
            source_attribution.insert("concurrency".to_string(), ConfigSource::Cli);
        }
        if let Some(output) = &cli_args.output {
            export.output = Some(output.clone());
            source_attribution.insert("output".to_string(), ConfigSource::Cli);
        }

        // --dry-run swaps in the offline collaborator
        if cli_args.dry_run {
            collaborator.provider = Some("static".to_string());
            source_attribution.insert("provider".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            deck,
            collaborator,
            export,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `deckgen.toml`, stopping at
    /// repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join("deckgen.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if current_dir.parent().is_none() {
                break;
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                // Stop at repository root if no config found
                break;
            }

            current_dir = current_dir.parent().expect("checked above").to_path_buf();
        }

        Ok(None)
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: TomlConfig = toml::from_str(&content).with_context(|| {
                    format!("Failed to parse TOML config file: {}", path.display())
                })?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Missing config file is OK - all defaults apply
                Ok(TomlConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), DeckError> {
        let provider = self.provider();
        if provider != "gemini" && provider != "static" {
            return Err(DeckError::Config(ConfigError::InvalidValue {
                key: "provider".to_string(),
                value: format!("unknown provider '{provider}' (expected gemini or static)"),
            }));
        }

        if let Some(timeout) = self.collaborator.timeout_seconds {
            if timeout == 0 {
                return Err(DeckError::Config(ConfigError::InvalidValue {
                    key: "timeout_seconds".to_string(),
                    value: "must be greater than 0".to_string(),
                }));
            }
            if timeout > 3600 {
                return Err(DeckError::Config(ConfigError::InvalidValue {
                    key: "timeout_seconds".to_string(),
                    value: "exceeds maximum limit of 3600".to_string(),
                }));
            }
        }

        if let Some(concurrency) = self.collaborator.concurrency {
            if concurrency == 0 {
                return Err(DeckError::Config(ConfigError::InvalidValue {
                    key: "concurrency".to_string(),
                    value: "must be greater than 0".to_string(),
                }));
            }
            if concurrency > 16 {
                return Err(DeckError::Config(ConfigError::InvalidValue {
                    key: "concurrency".to_string(),
                    value: "exceeds maximum limit of 16".to_string(),
                }));
            }
        }

        if matches!(self.export.output.as_deref(), Some("")) {
            return Err(DeckError::Config(ConfigError::InvalidValue {
                key: "output".to_string(),
                value: "must not be empty".to_string(),
            }));
        }

        Ok(())
    }

    /// Collaborator provider name, defaulting to "gemini".
    #[must_use]
    pub fn provider(&self) -> &str {
        self.collaborator.provider.as_deref().unwrap_or("gemini")
    }

    /// Text model name.
    #[must_use]
    pub fn model(&self) -> &str {
        self.collaborator
            .model
            .as_deref()
            .unwrap_or("gemini-2.5-flash")
    }

    /// Image model name.
    #[must_use]
    pub fn image_model(&self) -> &str {
        self.collaborator
            .image_model
            .as_deref()
            .unwrap_or("imagen-4.0-generate-001")
    }

    /// Environment variable holding the API key.
    #[must_use]
    pub fn api_key_env(&self) -> &str {
        self.collaborator
            .api_key_env
            .as_deref()
            .unwrap_or(DEFAULT_API_KEY_ENV)
    }

    /// REST endpoint base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.collaborator
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Per-call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator.timeout_seconds.unwrap_or(120))
    }

    /// Concurrent slide generation limit for batch builds.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.collaborator.concurrency.unwrap_or(4)
    }

    /// Outline file path.
    #[must_use]
    pub fn outline_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.deck.outline.as_deref().unwrap_or("deck.toml"))
    }

    /// Export artifact path.
    #[must_use]
    pub fn output_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.export.output.as_deref().unwrap_or(DEFAULT_OUTPUT_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("deckgen.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_when_no_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();

        assert_eq!(config.provider(), "gemini");
        assert_eq!(config.model(), "gemini-2.5-flash");
        assert_eq!(config.image_model(), "imagen-4.0-generate-001");
        assert_eq!(config.api_key_env(), "GEMINI_API_KEY");
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.concurrency(), 4);
        assert_eq!(config.output_path(), Utf8PathBuf::from("presentation.pdf"));
        assert_eq!(
            config.source_attribution.get("provider"),
            Some(&ConfigSource::Defaults)
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[deck]
outline = "slides/outline.toml"

[collaborator]
model = "gemini-2.5-pro"
timeout_seconds = 30

[export]
output = "deck.pdf"
"#,
        );

        let config = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();
        assert_eq!(config.model(), "gemini-2.5-pro");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.outline_path(), Utf8PathBuf::from("slides/outline.toml"));
        assert_eq!(config.output_path(), Utf8PathBuf::from("deck.pdf"));
        // Untouched values keep defaults
        assert_eq!(config.provider(), "gemini");
        assert_eq!(
            config.source_attribution.get("model"),
            Some(&ConfigSource::ConfigFile(path))
        );
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"
[collaborator]
model = "gemini-2.5-pro"
"#,
        );

        let cli = CliArgs {
            model: Some("gemini-2.5-flash-lite".to_string()),
            output: Some("final.pdf".to_string()),
            ..CliArgs::default()
        };
        let config = Config::discover_from(temp.path(), &cli).unwrap();
        assert_eq!(config.model(), "gemini-2.5-flash-lite");
        assert_eq!(config.output_path(), Utf8PathBuf::from("final.pdf"));
        assert_eq!(
            config.source_attribution.get("model"),
            Some(&ConfigSource::Cli)
        );
    }

    #[test]
    fn test_discovery_walks_upward() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[collaborator]\nmodel = \"from-parent\"\n");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();
        assert_eq!(config.model(), "from-parent");
    }

    #[test]
    fn test_discovery_stops_at_repo_root() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[collaborator]\nmodel = \"outside\"\n");
        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        // The marker directory has no config, so discovery finds nothing
        let config = Config::discover_from(&repo, &CliArgs::default()).unwrap();
        assert_eq!(config.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_dry_run_forces_static_provider() {
        let temp = TempDir::new().unwrap();
        let cli = CliArgs {
            dry_run: true,
            ..CliArgs::default()
        };
        let config = Config::discover_from(temp.path(), &cli).unwrap();
        assert_eq!(config.provider(), "static");
    }

    #[test]
    fn test_invalid_provider_rejected() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[collaborator]\nprovider = \"watercolor\"\n");

        let err = Config::discover_from(temp.path(), &CliArgs::default()).unwrap_err();
        assert!(err.to_string().contains("provider"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[collaborator]\ntimeout_seconds = 0\n");

        assert!(Config::discover_from(temp.path(), &CliArgs::default()).is_err());
    }

    #[test]
    fn test_concurrency_bounds() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[collaborator]\nconcurrency = 64\n");
        assert!(Config::discover_from(temp.path(), &CliArgs::default()).is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[collaborator\nprovider = gemini");
        assert!(Config::discover_from(temp.path(), &CliArgs::default()).is_err());
    }

    #[test]
    #[serial]
    fn test_env_provider_override() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[collaborator]\nprovider = \"gemini\"\n");

        unsafe { env::set_var("DECKGEN_PROVIDER", "static") };
        let config = Config::discover_from(temp.path(), &CliArgs::default());
        unsafe { env::remove_var("DECKGEN_PROVIDER") };

        assert_eq!(config.unwrap().provider(), "static");
    }

    #[test]
    #[serial]
    fn test_cli_beats_env_provider() {
        let temp = TempDir::new().unwrap();

        unsafe { env::set_var("DECKGEN_PROVIDER", "static") };
        let cli = CliArgs {
            provider: Some("gemini".to_string()),
            ..CliArgs::default()
        };
        let config = Config::discover_from(temp.path(), &cli);
        unsafe { env::remove_var("DECKGEN_PROVIDER") };

        assert_eq!(config.unwrap().provider(), "gemini");
    }
}
