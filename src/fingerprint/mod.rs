//! Fingerprint collection and consistency analysis.
//!
//! One collection pass runs three pieces in sequence:
//!
//! 1. [`Collector`] gathers identity, geometry, capability, rendering and
//!    audio signals from an injected environment into a [`FingerprintRecord`].
//! 2. [`ConsistencyAnalyzer`] appends heuristic inconsistency tags.
//! 3. [`hash_record`] derives the identity digest from the non-volatile part
//!    of the record.
//!
//! # Modules
//!
//! - `record` - The record data model and the [`Probe`] outcome type
//! - `collector` - Fault-isolated collection from an `EnvironmentProvider`
//! - `analyzer` - Heuristic consistency rules
//! - `hasher` - The rolling string hash and record canonicalization
//! - `review` - Receiving-side review of a finished record
//! - `envelope` - The analysis API request body
//! - `wire` - The flat record form the analysis API reads

pub mod analyzer;
pub mod collector;
pub mod envelope;
pub mod hasher;
pub mod record;
pub mod review;
pub mod wire;

pub use analyzer::ConsistencyAnalyzer;
pub use collector::{Collector, AUDIO_SETTLE_DELAY};
pub use envelope::AnalysisRequest;
pub use hasher::{canonical_form, hash_record, hash_str};
pub use record::{
    AudioFingerprint, Capabilities, FingerprintRecord, Geometry, Identity, MimeTypeEntry,
    PluginEntry, Probe, RenderedFingerprint, ScreenMetrics, Temporal, WebGlInfo, WindowMetrics,
};
pub use review::{DeviceReview, ReviewReport};
pub use wire::WireFingerprint;

/// Re-runs analysis and hashing over a record obtained elsewhere, such as one
/// imported from JSON.
///
/// Previous tags and hash are discarded first, so the result matches what a
/// live collection of the same host would have produced.
pub fn reanalyze(record: &mut FingerprintRecord) {
    record.inconsistencies.clear();
    record.hash = None;
    ConsistencyAnalyzer::new().analyze(record);
    record.hash = Some(hash_record(record));
}
