//! # Config Loader
//!
//! Loads the tracker stream configuration.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `StreamConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("tracker.toml")).unwrap();
//! println!("Streaming to {}:{}", config.sender.host, config.sender.port);
//! ```

mod parser;
mod validator;

pub use contracts::{ReceiverConfig, SenderConfig, StreamConfig};
pub use parser::ConfigFormat;
pub use validator::{validate_receiver, validate_sender};

use contracts::TrackerError;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Format is detected from the extension (.toml / .json).
    ///
    /// # Errors
    /// `Configuration` on read failure, unsupported format, parse failure
    /// or a rule violation.
    pub fn load_from_path(path: &Path) -> Result<StreamConfig, TrackerError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<StreamConfig, TrackerError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(config: &StreamConfig) -> Result<String, TrackerError> {
        toml::to_string_pretty(config)
            .map_err(|e| TrackerError::configuration(format!("TOML serialize error: {e}")))
    }

    /// Serialize to JSON string
    pub fn to_json(config: &StreamConfig) -> Result<String, TrackerError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| TrackerError::configuration(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, TrackerError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            TrackerError::configuration("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            TrackerError::configuration(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, TrackerError> {
        std::fs::read_to_string(path).map_err(|e| TrackerError::Configuration {
            message: format!("cannot read {}", path.display()),
            source: Some(Box::new(e)),
        })
    }
}
