//! Device review.
//!
//! A second opinion over a finished record, as applied by the receiving side
//! of the analysis pipeline. It folds the analyzer's tags into three broader
//! issues (automation, spoofing, tampering) and estimates how much the
//! fingerprint can be trusted as an identity key. It does not score risk.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::fingerprint::analyzer::{
    AUTOMATION_DETECTED, BROWSER_PLUGIN_MISMATCH, MISSING_AUDIO_SUPPORT,
    MISSING_GRAPHICS_SUPPORT, UA_PLATFORM_MISMATCH,
};
use crate::fingerprint::record::FingerprintRecord;

pub const BROWSER_SPOOFING: &str = "browser_spoofing";
pub const FINGERPRINT_TAMPERING: &str = "fingerprint_tampering";

const MIN_CONFIDENCE: f64 = 0.1;
const DESKTOP_GPU_MARKERS: &[&str] = &["nvidia", "amd", "intel hd graphics"];

/// Outcome of reviewing one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Identity key of the device: the record hash, or a fallback digest
    /// over its most stable fields.
    pub device_id: String,
    /// Reported inconsistencies followed by review findings.
    pub issues: Vec<String>,
    /// How reliable the fingerprint is as an identity key, 0.1 to 1.0.
    pub confidence_score: f64,
}

/// Reviews finished fingerprint records.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceReview;

impl DeviceReview {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, record: &FingerprintRecord) -> ReviewReport {
        let device_id = match record.hash {
            Some(ref hash) if !hash.is_empty() => hash.clone(),
            _ => {
                debug!("Record carries no hash, deriving device id from stable fields");
                stable_device_id(record)
            }
        };

        let mut issues = record.inconsistencies.clone();
        if automation_signs(record) {
            issues.push(AUTOMATION_DETECTED.to_string());
        }
        if browser_spoofing(record) {
            issues.push(BROWSER_SPOOFING.to_string());
        }
        if fingerprint_tampering(record) {
            issues.push(FINGERPRINT_TAMPERING.to_string());
        }

        ReviewReport {
            device_id,
            issues,
            confidence_score: confidence_score(record),
        }
    }
}

/// SHA-256 over the fields least likely to drift between visits, rendered as
/// lowercase hex. Fields the record lacks are left out of the digest input.
pub fn stable_device_id(record: &FingerprintRecord) -> String {
    let mut stable = Map::new();
    stable.insert("userAgent".to_string(), json!(record.identity.user_agent));
    stable.insert("screen".to_string(), json!(record.geometry.screen));
    stable.insert("language".to_string(), json!(record.identity.language));
    stable.insert("timezone".to_string(), json!(record.temporal.offset));
    if let Some(info) = record.webgl_info.data() {
        stable.insert(
            "webgl".to_string(),
            json!({ "vendor": info.vendor, "renderer": info.renderer }),
        );
    }
    if let Some(hash) = record.canvas_hash() {
        stable.insert("canvasHash".to_string(), json!(hash));
    }

    let mut hasher = Sha256::new();
    hasher.update(Value::Object(stable).to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

fn automation_signs(record: &FingerprintRecord) -> bool {
    let tagged = [AUTOMATION_DETECTED, MISSING_GRAPHICS_SUPPORT, MISSING_AUDIO_SUPPORT]
        .iter()
        .any(|tag| record.has_inconsistency(tag));
    let webdriver = record.capabilities.webdriver == Some(true);
    let zero_cores = record.capabilities.hardware_concurrency == Some(0);
    let pluginless_chrome = record.plugins.is_empty()
        && record.identity.user_agent.to_lowercase().contains("chrome");

    tagged || webdriver || zero_cores || pluginless_chrome
}

fn browser_spoofing(record: &FingerprintRecord) -> bool {
    if [UA_PLATFORM_MISMATCH, BROWSER_PLUGIN_MISMATCH]
        .iter()
        .any(|tag| record.has_inconsistency(tag))
    {
        return true;
    }

    let Some(webgl) = record.webgl_info.data() else {
        return false;
    };
    let ua = record.identity.user_agent.to_lowercase();

    // Legacy Internet Explorer never shipped WebGL.
    if ua.contains("trident") || ua.contains("msie") {
        return true;
    }

    let renderer = webgl.renderer.to_lowercase();
    let mobile = ua.contains("mobile") || ua.contains("android");
    mobile && DESKTOP_GPU_MARKERS.iter().any(|gpu| renderer.contains(gpu))
}

fn fingerprint_tampering(record: &FingerprintRecord) -> bool {
    let ua = record.identity.user_agent.to_lowercase();
    let legacy_ie = ua.contains("msie") && ua.contains("trident");
    if !record.canvas.is_supported() && !legacy_ie {
        return true;
    }

    let screen = &record.geometry.screen;
    screen.width == 1024 && screen.height == 768
}

fn confidence_score(record: &FingerprintRecord) -> f64 {
    let mut deductions = Vec::new();
    if record.canvas_hash().is_none() {
        deductions.push(0.2);
    }
    if !record.webgl_info.is_supported() {
        deductions.push(0.2);
    }
    if !record.audio.is_supported() {
        deductions.push(0.1);
    }
    if !record.inconsistencies.is_empty() {
        deductions.push(0.3);
    }

    let score = deductions.iter().fold(1.0, |score, d| score * (1.0 - d));
    let rounded = (score * 100.0_f64).round() / 100.0;
    rounded.max(MIN_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::record::{
        AudioFingerprint, PluginEntry, Probe, RenderedFingerprint, WebGlInfo,
    };

    fn clean_record() -> FingerprintRecord {
        let mut record = FingerprintRecord::default();
        record.identity.user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string();
        record.geometry.screen.width = 1920;
        record.geometry.screen.height = 1080;
        record.plugins = vec![PluginEntry::new("PDF Viewer", "", "internal-pdf-viewer")];
        record.capabilities.hardware_concurrency = Some(8);
        record.canvas = Probe::Supported(RenderedFingerprint {
            hash: Some("5e918d2".to_string()),
            error: None,
        });
        record.webgl_info = Probe::Supported(WebGlInfo {
            vendor: "Google Inc. (NVIDIA)".to_string(),
            renderer: "ANGLE (NVIDIA, NVIDIA GeForce RTX 3060 Direct3D11 vs_5_0 ps_5_0, D3D11)"
                .to_string(),
            ..Default::default()
        });
        record.audio = Probe::Supported(AudioFingerprint {
            digest: "f00".to_string(),
        });
        record.hash = Some("-1f2e3d".to_string());
        record
    }

    #[test]
    fn test_clean_record_full_confidence() {
        let report = DeviceReview::new().assess(&clean_record());
        assert_eq!(report.device_id, "-1f2e3d");
        assert!(report.issues.is_empty());
        assert_eq!(report.confidence_score, 1.0);
    }

    #[test]
    fn test_fallback_device_id_is_stable() {
        let mut record = clean_record();
        record.hash = None;
        let first = DeviceReview::new().assess(&record).device_id;

        record.geometry.window.inner_width = 777;
        let second = DeviceReview::new().assess(&record).device_id;
        assert_eq!(first, second);
        assert_eq!(first, stable_device_id(&record));
    }

    #[test]
    fn test_fallback_device_id_is_sha256_hex() {
        let mut record = clean_record();
        record.hash = None;
        let id = DeviceReview::new().assess(&record).device_id;

        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fallback_device_id_omits_missing_fields() {
        let mut record = clean_record();
        record.canvas = Probe::Unsupported;
        record.webgl_info = Probe::failed("context lost");

        let expected = json!({
            "userAgent": record.identity.user_agent,
            "screen": record.geometry.screen,
            "language": record.identity.language,
            "timezone": record.temporal.offset,
        });
        let mut hasher = Sha256::new();
        hasher.update(expected.to_string().as_bytes());

        assert_eq!(stable_device_id(&record), format!("{:x}", hasher.finalize()));
    }

    #[test]
    fn test_pluginless_chrome_is_automation() {
        let mut record = clean_record();
        record.plugins.clear();
        let report = DeviceReview::new().assess(&record);
        assert_eq!(report.issues, vec![AUTOMATION_DETECTED.to_string()]);
    }

    #[test]
    fn test_mobile_ua_with_desktop_gpu_is_spoofing() {
        let mut record = clean_record();
        record.identity.user_agent =
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36".to_string();
        let report = DeviceReview::new().assess(&record);
        assert!(report.issues.contains(&BROWSER_SPOOFING.to_string()));
    }

    #[test]
    fn test_common_spoofed_resolution_is_tampering() {
        let mut record = clean_record();
        record.geometry.screen.width = 1024;
        record.geometry.screen.height = 768;
        let report = DeviceReview::new().assess(&record);
        assert_eq!(report.issues, vec![FINGERPRINT_TAMPERING.to_string()]);
    }

    #[test]
    fn test_confidence_deductions_multiply() {
        let mut record = clean_record();
        record.audio = Probe::Unsupported;
        record.inconsistencies.push(MISSING_AUDIO_SUPPORT.to_string());
        // 0.9 * 0.7
        assert_eq!(DeviceReview::new().assess(&record).confidence_score, 0.63);

        record.canvas = Probe::Unsupported;
        record.webgl_info = Probe::Unsupported;
        // 0.8 * 0.8 * 0.9 * 0.7 = 0.4032
        assert_eq!(DeviceReview::new().assess(&record).confidence_score, 0.4);
    }
}
