//! Probe settings and configuration management.
//!
//! Settings drive the command line tool: which simulated host to collect
//! from, how to render the result and what request context to attach. The
//! fingerprint engine itself takes no configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::host::HostProfile;

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Settings for one run of the probe.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables (`FP_PROBE_*`)
/// 4. CLI arguments
///
/// # Example
///
/// ```rust
/// use fingerprint_probe::config::ProbeSettings;
/// use fingerprint_probe::host::HostProfile;
///
/// let settings = ProbeSettings::default()
///     .with_profile(HostProfile::MacSafari)
///     .with_seed("visitor-17");
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Host profile the simulated environment describes.
    #[serde(default)]
    pub profile: HostProfile,

    /// Seed for the simulated host. Random host when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,

    /// Previously saved record to re-analyze instead of collecting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[serde(default)]
    pub pretty: bool,

    /// Wrap the record in an analysis request body.
    #[serde(default)]
    pub envelope: bool,

    /// Print a device review instead of the record.
    #[serde(default)]
    pub review: bool,

    /// User id for the request envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Email for the request envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Client IP address for the request envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            profile: HostProfile::default(),
            seed: None,
            input: None,
            pretty: false,
            envelope: false,
            review: false,
            user_id: None,
            email: None,
            ip_address: None,
        }
    }
}

impl ProbeSettings {
    /// Creates a new ProbeSettings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match file_extension(path).as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file, format chosen by extension.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match file_extension(path).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Applies environment variable overrides to current settings.
    ///
    /// Unparseable values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("FP_PROBE_PROFILE") {
            if let Ok(profile) = val.parse() {
                self.profile = profile;
            }
        }

        if let Ok(val) = env::var("FP_PROBE_SEED") {
            self.seed = Some(val);
        }

        if let Ok(val) = env::var("FP_PROBE_INPUT") {
            self.input = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("FP_PROBE_PRETTY") {
            self.pretty = parse_flag(&val);
        }

        if let Ok(val) = env::var("FP_PROBE_ENVELOPE") {
            self.envelope = parse_flag(&val);
        }

        if let Ok(val) = env::var("FP_PROBE_REVIEW") {
            self.review = parse_flag(&val);
        }

        if let Ok(val) = env::var("FP_PROBE_USER_ID") {
            self.user_id = Some(val);
        }

        if let Ok(val) = env::var("FP_PROBE_EMAIL") {
            self.email = Some(val);
        }

        if let Ok(val) = env::var("FP_PROBE_IP_ADDRESS") {
            self.ip_address = Some(val);
        }
    }

    /// Merges current settings with environment variable overrides.
    pub fn merge_with_env(mut self) -> Self {
        self.apply_env_overrides();
        self
    }

    /// Merges settings with CLI arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fingerprint_probe::config::{CliArgs, ProbeSettings};
    ///
    /// let args = CliArgs {
    ///     pretty: Some(true),
    ///     seed: Some("abc".to_string()),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = ProbeSettings::default().merge_with_args(&args);
    /// assert!(settings.pretty);
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(profile) = args.profile {
            self.profile = profile;
        }
        if let Some(ref seed) = args.seed {
            self.seed = Some(seed.clone());
        }
        if let Some(ref input) = args.input {
            self.input = Some(input.clone());
        }
        if let Some(pretty) = args.pretty {
            self.pretty = pretty;
        }
        if let Some(envelope) = args.envelope {
            self.envelope = envelope;
        }
        if let Some(review) = args.review {
            self.review = review;
        }
        if let Some(ref user_id) = args.user_id {
            self.user_id = Some(user_id.clone());
        }
        if let Some(ref email) = args.email {
            self.email = Some(email.clone());
        }
        if let Some(ref ip) = args.ip_address {
            self.ip_address = Some(ip.clone());
        }

        self
    }

    /// Validates all settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.envelope && self.review {
            return Err(ConfigError::ValidationError(
                "Envelope and review output cannot be combined".to_string(),
            ));
        }

        if let Some(ref seed) = self.seed {
            if seed.is_empty() {
                return Err(ConfigError::ValidationError(
                    "Seed cannot be empty".to_string(),
                ));
            }
        }

        if let Some(ref ip) = self.ip_address {
            if ip.parse::<std::net::IpAddr>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid IP address: {}",
                    ip
                )));
            }
        }

        if let Some(ref email) = self.email {
            if !email.contains('@') {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid email address: {}",
                    email
                )));
            }
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(ConfigError::ValidationError(format!(
                    "Input record does not exist: {}",
                    input.display()
                )));
            }
        }

        Ok(())
    }

    // Builder-style methods for convenient configuration

    /// Sets the host profile.
    pub fn with_profile(mut self, profile: HostProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the host seed.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Sets the record to re-analyze.
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Enables or disables pretty output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Enables or disables the request envelope.
    pub fn with_envelope(mut self, envelope: bool) -> Self {
        self.envelope = envelope;
        self
    }

    /// Enables or disables review output.
    pub fn with_review(mut self, review: bool) -> Self {
        self.review = review;
        self
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

/// CLI argument structure for parsing command line options.
///
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Host profile.
    pub profile: Option<HostProfile>,
    /// Host seed.
    pub seed: Option<String>,
    /// Record to re-analyze.
    pub input: Option<PathBuf>,
    /// Pretty output.
    pub pretty: Option<bool>,
    /// Request envelope output.
    pub envelope: Option<bool>,
    /// Review output.
    pub review: Option<bool>,
    /// Envelope user id.
    pub user_id: Option<String>,
    /// Envelope email.
    pub email: Option<String>,
    /// Envelope IP address.
    pub ip_address: Option<String>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain:
    /// defaults, file (if specified), environment, then these arguments.
    pub fn load_settings(&self) -> Result<ProbeSettings, ConfigError> {
        let mut settings = if let Some(ref config_file) = self.config_file {
            ProbeSettings::from_file(config_file)?
        } else {
            ProbeSettings::default()
        };

        settings = settings.merge_with_env();
        settings = settings.merge_with_args(self);
        settings.validate()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.profile, HostProfile::WindowsChrome);
        assert!(settings.seed.is_none());
        assert!(!settings.pretty);
        assert!(!settings.envelope);
        assert!(!settings.review);
    }

    #[test]
    fn test_builder_methods() {
        let settings = ProbeSettings::default()
            .with_profile(HostProfile::AndroidChrome)
            .with_seed("s-1")
            .with_pretty(true)
            .with_envelope(true);

        assert_eq!(settings.profile, HostProfile::AndroidChrome);
        assert_eq!(settings.seed, Some("s-1".to_string()));
        assert!(settings.pretty);
        assert!(settings.envelope);
    }

    #[test]
    fn test_validation_rejects_envelope_with_review() {
        let settings = ProbeSettings::default()
            .with_envelope(true)
            .with_review(true);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_ip() {
        let mut settings = ProbeSettings::default();
        settings.ip_address = Some("not-an-ip".to_string());
        assert!(settings.validate().is_err());

        settings.ip_address = Some("203.0.113.7".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_missing_input() {
        let settings = ProbeSettings::default().with_input("/nonexistent/record.json");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_args_merge() {
        let args = CliArgs {
            profile: Some(HostProfile::MacFirefox),
            review: Some(true),
            ..Default::default()
        };

        let settings = ProbeSettings::default().merge_with_args(&args);

        assert_eq!(settings.profile, HostProfile::MacFirefox);
        assert!(settings.review);
        assert!(!settings.pretty); // Unchanged
    }

    #[test]
    fn test_toml_serialization() {
        let settings = ProbeSettings::default()
            .with_profile(HostProfile::IphoneSafari)
            .with_seed("toml");
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        assert!(toml_str.contains("iphone-safari"));

        let parsed: ProbeSettings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.profile, HostProfile::IphoneSafari);
        assert_eq!(parsed.seed, settings.seed);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.json");

        let settings = ProbeSettings::default()
            .with_profile(HostProfile::LinuxFirefox)
            .with_pretty(true);
        settings.to_file(&path).unwrap();

        let loaded = ProbeSettings::from_file(&path).unwrap();
        assert_eq!(loaded.profile, HostProfile::LinuxFirefox);
        assert!(loaded.pretty);
    }

    #[test]
    fn test_unsupported_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.yaml");
        std::fs::write(&path, "profile: mac-chrome").unwrap();

        assert!(matches!(
            ProbeSettings::from_file(&path),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }
}
