//! Configuration management infrastructure.
//!
//! Signing preferences live in a TOML file under the user's config
//! directory. The values seed parameter resolution (digest defaults) and
//! file-based jobs (level, container), and can be exported to TOML, JSON
//! or YAML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::constants::DOCUMENT_TEXT_ENCODING;
use crate::domain::crypto::DigestAlgorithm;
use crate::domain::parameters::{AsicContainer, SignatureLevel};
use crate::infra::error::{SigningError, SigningResult};
use crate::services::parameters::ResolverDefaults;

/// Application configuration with all signing preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfiguration {
    /// Digest algorithm used when a request names none
    pub default_digest_algorithm: DigestDefaults,

    /// Baseline level for file-based jobs
    pub default_level: String,

    /// ASiC container for file-based non-PDF jobs
    pub default_container: String,

    /// Text encoding of rendered previews
    pub preview_encoding: String,

    /// Preferred preview width in pixels, 0 when unspecified
    pub visualization_width: u32,
}

/// Per-family digest algorithm defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestDefaults {
    pub xades: String,
    pub cades: String,
    pub pades: String,
}

impl Default for SignerConfiguration {
    fn default() -> Self {
        Self {
            default_digest_algorithm: DigestDefaults::default(),
            default_level: SignatureLevel::BaselineB.as_str().to_string(),
            default_container: "asic-e".to_string(),
            preview_encoding: DOCUMENT_TEXT_ENCODING.to_string(),
            visualization_width: 0,
        }
    }
}

impl Default for DigestDefaults {
    fn default() -> Self {
        let sha256 = DigestAlgorithm::Sha256.as_str().to_string();
        Self {
            xades: sha256.clone(),
            cades: sha256.clone(),
            pades: sha256,
        }
    }
}

impl SignerConfiguration {
    /// Digest defaults handed to parameter resolution.
    pub fn resolver_defaults(&self) -> SigningResult<ResolverDefaults> {
        let digest = &self.default_digest_algorithm;
        Ok(ResolverDefaults {
            xades_digest: parse_digest(&digest.xades)?,
            cades_digest: parse_digest(&digest.cades)?,
            pades_digest: parse_digest(&digest.pades)?,
        })
    }

    pub fn level(&self) -> SigningResult<SignatureLevel> {
        self.default_level.parse().map_err(|_| {
            SigningError::ConfigurationError(format!(
                "Invalid signature level: {}",
                self.default_level
            ))
        })
    }

    pub fn container(&self) -> SigningResult<AsicContainer> {
        self.default_container.parse().map_err(|_| {
            SigningError::ConfigurationError(format!(
                "Invalid container: {}",
                self.default_container
            ))
        })
    }

    /// Check every value, reporting the first invalid one.
    pub fn validate(&self) -> SigningResult<()> {
        self.resolver_defaults()?;
        self.level()?;
        self.container()?;

        if !matches!(
            self.preview_encoding.to_ascii_uppercase().as_str(),
            "UTF-8" | "UTF8"
        ) {
            return Err(SigningError::ConfigurationError(format!(
                "Unsupported preview encoding: {}",
                self.preview_encoding
            )));
        }

        Ok(())
    }
}

fn parse_digest(value: &str) -> SigningResult<DigestAlgorithm> {
    value.parse::<DigestAlgorithm>().map_err(|_| {
        SigningError::ConfigurationError(format!("Invalid digest algorithm: {value}"))
    })
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> SigningResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> SigningResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("document-signer").join("config.toml"))
        } else {
            Ok(PathBuf::from("document-signer-config.toml"))
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> SigningResult<SignerConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = SignerConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> SigningResult<SignerConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: SignerConfiguration = toml::from_str(&content).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &SignerConfiguration) -> SigningResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SigningError::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> SigningResult<()> {
        let mut config = self.load_or_create_default()?;

        match key {
            "default_digest_algorithm.xades" => {
                config.default_digest_algorithm.xades = parse_digest(value)?.as_str().to_string();
            }
            "default_digest_algorithm.cades" => {
                config.default_digest_algorithm.cades = parse_digest(value)?.as_str().to_string();
            }
            "default_digest_algorithm.pades" => {
                config.default_digest_algorithm.pades = parse_digest(value)?.as_str().to_string();
            }
            "default_level" => config.default_level = value.to_string(),
            "default_container" => config.default_container = value.to_string(),
            "preview_encoding" => config.preview_encoding = value.to_string(),
            "visualization_width" => {
                config.visualization_width = value.parse().map_err(|_| {
                    SigningError::ConfigurationError(format!("Invalid width: {value}"))
                })?;
            }
            _ => {
                return Err(SigningError::ConfigurationError(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        config.validate()?;
        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> SigningResult<String> {
        let config = self.load_or_create_default()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("JSON export failed: {e}"))),
            ExportFormat::Yaml => serde_yaml::to_string(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("YAML export failed: {e}"))),
        }
    }

    /// Import configuration from a string
    pub fn import_config(&self, content: &str, format: ExportFormat) -> SigningResult<()> {
        let config: SignerConfiguration = match format {
            ExportFormat::Toml => toml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("TOML import failed: {e}"))
            })?,
            ExportFormat::Json => serde_json::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("JSON import failed: {e}"))
            })?,
            ExportFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("YAML import failed: {e}"))
            })?,
        };

        config.validate()?;
        self.save(&config)
    }
}

/// Configuration export/import formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Toml,
    Json,
    Yaml,
}
