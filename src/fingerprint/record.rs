//! Fingerprint record data model.
//!
//! A [`FingerprintRecord`] is the single aggregate produced by one collection
//! pass. Every capability that can be missing or broken on a host is wrapped in
//! a [`Probe`], so consumers never have to guess whether an empty field means
//! "not supported" or "failed while collecting".
//!
//! The record serializes to camelCase JSON, which is also the format saved
//! records are imported from. The analysis API receives the flattened
//! [`WireFingerprint`](crate::fingerprint::wire::WireFingerprint) instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one capability step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Probe<T> {
    /// The host exposes the capability and the step produced data.
    Supported(T),
    /// The host does not expose the capability at all.
    Unsupported,
    /// The capability exists but a call against it failed.
    Failed {
        /// Description of the underlying host failure.
        error: String,
    },
}

impl<T> Probe<T> {
    /// Builds a failed probe from any displayable error.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Probe::Failed {
            error: error.to_string(),
        }
    }

    /// Whether the capability was proven to exist.
    pub fn is_supported(&self) -> bool {
        matches!(self, Probe::Supported(_))
    }

    /// Returns the collected data when supported.
    pub fn data(&self) -> Option<&T> {
        match self {
            Probe::Supported(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the error text of a failed probe.
    pub fn error(&self) -> Option<&str> {
        match self {
            Probe::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl<T> Default for Probe<T> {
    fn default() -> Self {
        Probe::Unsupported
    }
}

/// Identity and locale signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_agent: String,
    pub language: String,
    /// Accepted languages in preference order. `None` when the host does not
    /// expose the list at all, which is itself a signal.
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    pub platform: String,
    #[serde(default)]
    pub do_not_track: Option<String>,
}

/// Timezone signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Temporal {
    /// Offset from UTC in minutes, with the browser sign convention
    /// (positive west of UTC).
    pub offset: i32,
    pub timezone: String,
    /// Live clock at collection time. Volatile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<DateTime<Utc>>,
}

/// Physical screen metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenMetrics {
    pub width: u32,
    pub height: u32,
    pub avail_width: u32,
    pub avail_height: u32,
    pub color_depth: u32,
    pub pixel_ratio: f64,
}

/// Browser window metrics. Volatile: they change whenever the user resizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMetrics {
    pub inner_width: u32,
    pub inner_height: u32,
    pub outer_width: u32,
    pub outer_height: u32,
}

/// Screen and window geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub screen: ScreenMetrics,
    #[serde(default)]
    pub window: WindowMetrics,
}

/// Capability flags and hardware hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub cookies_enabled: bool,
    pub local_storage: bool,
    pub session_storage: bool,
    pub indexed_db: bool,
    pub add_behavior: bool,
    pub open_database: bool,
    #[serde(default)]
    pub cpu_class: Option<String>,
    #[serde(default)]
    pub hardware_concurrency: Option<u32>,
    /// Approximate device memory in GB.
    #[serde(default)]
    pub device_memory: Option<f64>,
    pub max_touch_points: u32,
    pub touch_support: bool,
    /// Automation marker (`navigator.webdriver`).
    #[serde(default)]
    pub webdriver: Option<bool>,
}

/// One entry of the plugin inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginEntry {
    pub name: String,
    pub description: String,
    pub filename: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Number of mime types the plugin registers.
    pub length: u32,
}

impl PluginEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            filename: filename.into(),
            version: None,
            length: 0,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }
}

/// One entry of the mime type inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MimeTypeEntry {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub description: String,
    pub suffixes: String,
}

impl MimeTypeEntry {
    pub fn new(
        mime_type: impl Into<String>,
        description: impl Into<String>,
        suffixes: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            description: description.into(),
            suffixes: suffixes.into(),
        }
    }
}

/// Result of rendering a scene on an offscreen surface.
///
/// A supported renderer either yields a hash or, when serializing the bitmap
/// failed after the context was obtained, the error text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedFingerprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Static WebGL identity parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebGlInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language_version: String,
    pub antialias: bool,
    pub extensions: Vec<String>,
}

/// Audio rendering digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFingerprint {
    /// Sum of all frequency bin magnitudes, in lowercase hex.
    pub digest: String,
}

/// Complete fingerprint of one host, built fresh by every collection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintRecord {
    pub identity: Identity,
    pub temporal: Temporal,
    pub geometry: Geometry,
    pub capabilities: Capabilities,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    #[serde(default)]
    pub mime_types: Vec<MimeTypeEntry>,
    #[serde(default)]
    pub canvas: Probe<RenderedFingerprint>,
    #[serde(default)]
    pub webgl_fingerprint: Probe<RenderedFingerprint>,
    #[serde(default)]
    pub webgl_info: Probe<WebGlInfo>,
    #[serde(default)]
    pub audio: Probe<AudioFingerprint>,
    /// Heuristic tags in first-detected order. Not deduplicated.
    #[serde(default)]
    pub inconsistencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl FingerprintRecord {
    /// Whether the analyzer recorded the given tag at least once.
    pub fn has_inconsistency(&self, tag: &str) -> bool {
        self.inconsistencies.iter().any(|t| t == tag)
    }

    /// Canvas hash, when the 2-D render produced one.
    pub fn canvas_hash(&self) -> Option<&str> {
        self.canvas.data().and_then(|c| c.hash.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_support_flags() {
        let supported: Probe<AudioFingerprint> = Probe::Supported(AudioFingerprint {
            digest: "ff".to_string(),
        });
        assert!(supported.is_supported());
        assert_eq!(supported.data().map(|a| a.digest.as_str()), Some("ff"));

        let failed: Probe<AudioFingerprint> = Probe::failed("context lost");
        assert!(!failed.is_supported());
        assert_eq!(failed.error(), Some("context lost"));

        assert!(!Probe::<AudioFingerprint>::default().is_supported());
    }

    #[test]
    fn test_probe_wire_shape() {
        let probe: Probe<RenderedFingerprint> = Probe::Supported(RenderedFingerprint {
            hash: Some("1a2b".to_string()),
            error: None,
        });
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["status"], "supported");
        assert_eq!(json["hash"], "1a2b");

        let failed: Probe<RenderedFingerprint> = Probe::failed("boom");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_missing_sections_default_to_unsupported() {
        let json = r#"{
            "identity": {"userAgent": "UA", "language": "en-US", "platform": "Win32"},
            "temporal": {"offset": 0, "timezone": "UTC"},
            "geometry": {"screen": {"width": 1920, "height": 1080, "availWidth": 1920,
                "availHeight": 1040, "colorDepth": 24, "pixelRatio": 1.0}},
            "capabilities": {"cookiesEnabled": true, "localStorage": true,
                "sessionStorage": true, "indexedDb": true, "addBehavior": false,
                "openDatabase": false, "maxTouchPoints": 0, "touchSupport": false}
        }"#;
        let record: FingerprintRecord = serde_json::from_str(json).unwrap();
        assert!(record.identity.languages.is_none());
        assert!(!record.audio.is_supported());
        assert!(record.plugins.is_empty());
        assert!(record.hash.is_none());
    }

    #[test]
    fn test_mime_type_field_name() {
        let entry = MimeTypeEntry::new("application/pdf", "Portable Document Format", "pdf");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "application/pdf");
    }
}
