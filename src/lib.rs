//! # Fingerprint Probe
//!
//! Device fingerprint collection and consistency analysis.
//!
//! Fingerprint Probe gathers environment, rendering and hardware signals from
//! a host, normalizes them into a [`FingerprintRecord`], flags suspicious
//! combinations of signals and derives a stable identity digest. The result is
//! one best-effort signal for a fraud-risk pipeline. It is not a
//! cryptographically strong identifier.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fingerprint_probe::{
//!     fingerprint::Collector,
//!     host::{HostProfile, SimulatedEnvironment},
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let env = SimulatedEnvironment::from_profile(HostProfile::MacChrome, Some("visitor-1"));
//!     let record = Collector::new(env).collect_all().await;
//!
//!     println!("hash: {:?}", record.hash);
//!     println!("tags: {:?}", record.inconsistencies);
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`fingerprint`]: Record model, collector, analyzer, hasher, review
//! - [`host`]: Environment provider traits and the simulated host
//! - [`config`]: Settings for the command line tool
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Fingerprint Probe                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐    ┌───────────┐    ┌──────────┐            │
//! │  │  Collector  │───▶│ Analyzer  │───▶│  Hasher  │──▶ record  │
//! │  └──────┬──────┘    └───────────┘    └──────────┘            │
//! │         │                                                    │
//! │  ┌──────┴────────────────┐                                   │
//! │  │  EnvironmentProvider  │  (live host, simulated host, ...) │
//! │  └───────────────────────┘                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Fingerprint record, collection, consistency analysis and hashing.
pub mod fingerprint;

/// Host environment abstraction and the simulated host.
pub mod host;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Fingerprint types
pub use fingerprint::{
    hash_record, hash_str, AnalysisRequest, Collector, ConsistencyAnalyzer, DeviceReview,
    FingerprintRecord, Probe, ReviewReport, WireFingerprint,
};

// Host types
pub use host::{
    EnvironmentProvider, HostError, HostProfile, SimulatedEnvironment,
};

// Config types
pub use config::{CliArgs, ConfigError, ProbeSettings};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use fingerprint_probe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{CliArgs, ProbeSettings};
    pub use crate::fingerprint::{Collector, FingerprintRecord, Probe};
    pub use crate::host::{EnvironmentProvider, HostProfile, SimulatedEnvironment};
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
