//! Configuration module for fingerprint-probe.
//!
//! This module provides configuration management for the command line tool,
//! including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides (`FP_PROBE_*`)
//! - CLI argument merging
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use fingerprint_probe::config::ProbeSettings;
//!
//! // Load from a specific file
//! let settings = ProbeSettings::from_file("probe.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{CliArgs, ConfigError, ProbeSettings};
