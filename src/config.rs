use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for the onboarding tool
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// Where business snapshots live
    pub storage: StorageConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per business under `data_dir`
    #[default]
    Json,
    /// Process memory only; suits tests and embedding, not separate CLI runs
    Memory,
}

impl StorageBackend {
    /// Whether businesses outlive the process that wrote them
    pub fn is_persistent(self) -> bool {
        matches!(self, StorageBackend::Json)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Json => "json",
            StorageBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Data directory for commands that must see earlier runs' businesses
    pub fn persistent_dir(&self) -> Result<&Path> {
        if !self.backend.is_persistent() {
            anyhow::bail!(
                "storage.backend = \"{}\" keeps businesses in process memory only; \
                 use the json backend to run store commands from the CLI",
                self.backend.as_str()
            );
        }
        Ok(&self.data_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: PathBuf::from(".onboarding/businesses"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive, e.g. `info` or `onboarding_workflow=debug`
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl OnboardingConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (onboarding.toml, .onboarding-rc)
    /// 3. Environment variables (prefixed with ONBOARDING_, nested keys joined by `__`)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`OnboardingConfig::load`] with config files looked up in `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_file = dir.join("onboarding.toml");
        if toml_file.exists() {
            builder = builder.add_source(File::from(toml_file));
        }

        let rc_file = dir.join(".onboarding-rc");
        if rc_file.exists() {
            builder = builder.add_source(File::from(rc_file).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("ONBOARDING")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<OnboardingConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = OnboardingConfig::load_env_file();
        OnboardingConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static OnboardingConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<&'static OnboardingConfig> {
    let config = config()?;
    tracing::debug!(backend = ?config.storage.backend, "Configuration loaded");
    Ok(config)
}
