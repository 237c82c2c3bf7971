//! Wire form of a fingerprint record.
//!
//! The analysis endpoint reads a flat object: identity keys at the top level,
//! `screen` and `timezone` blocks, hardware hints under `features`, and one
//! `supported` flag per rendering or audio section instead of a tagged status.
//! [`WireFingerprint`] is that object, built from a [`FingerprintRecord`].
//!
//! ```rust
//! use fingerprint_probe::fingerprint::{FingerprintRecord, WireFingerprint};
//!
//! let wire = WireFingerprint::from(&FingerprintRecord::default());
//! assert!(!wire.canvas_supported);
//! assert!(!wire.webgl.supported);
//! ```

use serde::{Deserialize, Serialize};

use crate::fingerprint::record::{
    FingerprintRecord, MimeTypeEntry, PluginEntry, Probe, RenderedFingerprint, ScreenMetrics,
    WindowMetrics,
};

/// Flat fingerprint object sent as `device_fingerprint`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFingerprint {
    pub user_agent: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_track: Option<String>,
    pub timezone: WireTimezone,
    pub screen: ScreenMetrics,
    #[serde(default)]
    pub window: WindowMetrics,
    pub cookies_enabled: bool,
    pub local_storage: bool,
    pub session_storage: bool,
    #[serde(rename = "indexedDB")]
    pub indexed_db: bool,
    pub add_behavior: bool,
    pub open_database: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_class: Option<String>,
    pub webdriver: bool,
    pub features: WireFeatures,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    #[serde(default)]
    pub mime_types: Vec<MimeTypeEntry>,
    pub canvas_supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_error: Option<String>,
    pub webgl_fingerprint: WireRender,
    pub webgl: WireWebGl,
    pub audio: WireAudio,
    #[serde(default)]
    pub inconsistencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTimezone {
    pub offset: i32,
    pub name: String,
}

/// Hardware hints grouped the way the endpoint reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_concurrency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_memory: Option<f64>,
    pub max_touch_points: u32,
    pub touch_support: bool,
}

/// A rendered surface hash with its support flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRender {
    pub supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// WebGL identity parameters with their support flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWebGl {
    pub supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading_language_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antialias: Option<bool>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAudio {
    pub supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Probe<RenderedFingerprint>> for WireRender {
    fn from(probe: &Probe<RenderedFingerprint>) -> Self {
        match probe {
            Probe::Supported(rendered) => Self {
                supported: true,
                hash: rendered.hash.clone(),
                error: rendered.error.clone(),
            },
            Probe::Unsupported => Self::default(),
            Probe::Failed { error } => Self {
                supported: false,
                hash: None,
                error: Some(error.clone()),
            },
        }
    }
}

impl From<&FingerprintRecord> for WireFingerprint {
    fn from(record: &FingerprintRecord) -> Self {
        let canvas = WireRender::from(&record.canvas);
        let caps = &record.capabilities;

        let webgl = match record.webgl_info {
            Probe::Supported(ref info) => WireWebGl {
                supported: true,
                vendor: Some(info.vendor.clone()),
                renderer: Some(info.renderer.clone()),
                version: Some(info.version.clone()),
                shading_language_version: Some(info.shading_language_version.clone()),
                antialias: Some(info.antialias),
                extensions: info.extensions.clone(),
                error: None,
            },
            Probe::Unsupported => WireWebGl::default(),
            Probe::Failed { ref error } => WireWebGl {
                error: Some(error.clone()),
                ..Default::default()
            },
        };

        let audio = match record.audio {
            Probe::Supported(ref audio) => WireAudio {
                supported: true,
                fingerprint: Some(audio.digest.clone()),
                error: None,
            },
            Probe::Unsupported => WireAudio::default(),
            Probe::Failed { ref error } => WireAudio {
                supported: false,
                fingerprint: None,
                error: Some(error.clone()),
            },
        };

        Self {
            user_agent: record.identity.user_agent.clone(),
            language: record.identity.language.clone(),
            languages: record.identity.languages.clone(),
            platform: record.identity.platform.clone(),
            do_not_track: record.identity.do_not_track.clone(),
            timezone: WireTimezone {
                offset: record.temporal.offset,
                name: record.temporal.timezone.clone(),
            },
            screen: record.geometry.screen.clone(),
            window: record.geometry.window.clone(),
            cookies_enabled: caps.cookies_enabled,
            local_storage: caps.local_storage,
            session_storage: caps.session_storage,
            indexed_db: caps.indexed_db,
            add_behavior: caps.add_behavior,
            open_database: caps.open_database,
            cpu_class: caps.cpu_class.clone(),
            webdriver: caps.webdriver == Some(true),
            features: WireFeatures {
                hardware_concurrency: caps.hardware_concurrency,
                device_memory: caps.device_memory,
                max_touch_points: caps.max_touch_points,
                touch_support: caps.touch_support,
            },
            plugins: record.plugins.clone(),
            mime_types: record.mime_types.clone(),
            canvas_supported: canvas.supported,
            canvas_hash: canvas.hash,
            canvas_error: canvas.error,
            webgl_fingerprint: WireRender::from(&record.webgl_fingerprint),
            webgl,
            audio,
            inconsistencies: record.inconsistencies.clone(),
            hash: record.hash.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::record::{AudioFingerprint, WebGlInfo};

    #[test]
    fn test_supported_sections_carry_flags() {
        let mut record = FingerprintRecord::default();
        record.canvas = Probe::Supported(RenderedFingerprint {
            hash: Some("-1c2d".to_string()),
            error: None,
        });
        record.webgl_info = Probe::Supported(WebGlInfo {
            vendor: "Intel Inc.".to_string(),
            renderer: "Intel Iris OpenGL Engine".to_string(),
            ..Default::default()
        });
        record.audio = Probe::Supported(AudioFingerprint {
            digest: "7c1f".to_string(),
        });

        let json = serde_json::to_value(WireFingerprint::from(&record)).unwrap();

        assert_eq!(json["canvasSupported"], true);
        assert_eq!(json["canvasHash"], "-1c2d");
        assert_eq!(json["webgl"]["supported"], true);
        assert_eq!(json["webgl"]["renderer"], "Intel Iris OpenGL Engine");
        assert_eq!(json["audio"]["supported"], true);
        assert_eq!(json["audio"]["fingerprint"], "7c1f");
    }

    #[test]
    fn test_failed_sections_keep_error_text() {
        let mut record = FingerprintRecord::default();
        record.canvas = Probe::failed("context lost");
        record.audio = Probe::failed("no output device");

        let json = serde_json::to_value(WireFingerprint::from(&record)).unwrap();

        assert_eq!(json["canvasSupported"], false);
        assert!(json.get("canvasHash").is_none());
        assert_eq!(json["canvasError"], "context lost");
        assert_eq!(json["webgl"]["supported"], false);
        assert_eq!(json["audio"]["error"], "no output device");
    }

    #[test]
    fn test_unset_webdriver_is_false() {
        let wire = WireFingerprint::from(&FingerprintRecord::default());
        assert!(!wire.webdriver);
        assert_eq!(wire.features.hardware_concurrency, None);
    }
}
