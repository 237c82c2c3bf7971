//! Integration tests for the consistency analyzer and device review
//!
//! Each case starts from a hand-built consistent record and breaks exactly one
//! signal.

use fingerprint_probe::fingerprint::analyzer::{
    AUTOMATION_DETECTED, BROWSER_PLUGIN_MISMATCH, MISSING_AUDIO_SUPPORT, MISSING_GRAPHICS_SUPPORT,
    MOBILE_MISMATCH, UA_PLATFORM_MISMATCH, UNREALISTIC_HARDWARE,
};
use fingerprint_probe::fingerprint::{
    reanalyze, AudioFingerprint, Capabilities, ConsistencyAnalyzer, DeviceReview,
    FingerprintRecord, Geometry, Identity, PluginEntry, Probe, RenderedFingerprint, ScreenMetrics,
    WebGlInfo,
};

const WINDOWS_CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn rendered(hash: &str) -> Probe<RenderedFingerprint> {
    Probe::Supported(RenderedFingerprint {
        hash: Some(hash.to_string()),
        error: None,
    })
}

/// A desktop Chrome on Windows with every signal in agreement.
fn normal_record() -> FingerprintRecord {
    FingerprintRecord {
        identity: Identity {
            user_agent: WINDOWS_CHROME_UA.to_string(),
            language: "en-US".to_string(),
            languages: Some(vec!["en-US".to_string(), "en".to_string()]),
            platform: "Win32".to_string(),
            do_not_track: None,
        },
        geometry: Geometry {
            screen: ScreenMetrics {
                width: 1920,
                height: 1080,
                avail_width: 1920,
                avail_height: 1040,
                color_depth: 24,
                pixel_ratio: 1.0,
            },
            ..Default::default()
        },
        capabilities: Capabilities {
            cookies_enabled: true,
            local_storage: true,
            session_storage: true,
            indexed_db: true,
            hardware_concurrency: Some(8),
            device_memory: Some(8.0),
            webdriver: Some(false),
            ..Default::default()
        },
        plugins: vec![PluginEntry::new(
            "Chrome PDF Viewer",
            "Portable Document Format",
            "internal-pdf-viewer",
        )
        .with_length(2)],
        canvas: rendered("-3f2a11c"),
        webgl_fingerprint: rendered("51be0d2"),
        webgl_info: Probe::Supported(WebGlInfo {
            vendor: "Google Inc. (Intel)".to_string(),
            renderer: "ANGLE (Intel, Intel(R) UHD Graphics 630 Direct3D11 vs_5_0 ps_5_0, D3D11)"
                .to_string(),
            version: "WebGL 1.0 (OpenGL ES 2.0 Chromium)".to_string(),
            shading_language_version: "WebGL GLSL ES 1.0 (OpenGL ES GLSL ES 1.0 Chromium)"
                .to_string(),
            antialias: true,
            extensions: vec!["WEBGL_debug_renderer_info".to_string()],
        }),
        audio: Probe::Supported(AudioFingerprint {
            digest: "7c1f".to_string(),
        }),
        ..Default::default()
    }
}

fn tags(record: &FingerprintRecord) -> Vec<&'static str> {
    ConsistencyAnalyzer::new().detect(record)
}

// ============================================================================
// Analyzer Rule Tests
// ============================================================================

#[test]
fn test_normal_record_is_clean() {
    let mut record = normal_record();
    ConsistencyAnalyzer::new().analyze(&mut record);
    assert!(record.inconsistencies.is_empty(), "{:?}", record.inconsistencies);
}

#[test]
fn test_windows_ua_on_mac_platform() {
    let mut record = normal_record();
    record.identity.platform = "MacIntel".to_string();
    assert_eq!(tags(&record), vec![UA_PLATFORM_MISMATCH]);
}

#[test]
fn test_mobile_ua_on_desktop_screen() {
    let mut record = normal_record();
    record.identity.user_agent = WINDOWS_CHROME_UA.replace("Safari", "Mobile Safari");
    assert_eq!(tags(&record), vec![MOBILE_MISMATCH]);
}

#[test]
fn test_absurd_core_count() {
    let mut record = normal_record();
    record.capabilities.hardware_concurrency = Some(128);
    assert_eq!(tags(&record), vec![UNREALISTIC_HARDWARE]);
}

#[test]
fn test_webdriver_marker() {
    let mut record = normal_record();
    record.capabilities.webdriver = Some(true);
    assert_eq!(tags(&record), vec![AUTOMATION_DETECTED]);
}

#[test]
fn test_missing_language_list() {
    let mut record = normal_record();
    record.identity.languages = None;
    assert_eq!(tags(&record), vec![AUTOMATION_DETECTED]);
}

#[test]
fn test_both_renderers_unsupported() {
    let mut record = normal_record();
    record.canvas = Probe::Unsupported;
    record.webgl_fingerprint = Probe::failed("context lost");
    assert_eq!(tags(&record), vec![MISSING_GRAPHICS_SUPPORT]);
}

#[test]
fn test_failed_audio() {
    let mut record = normal_record();
    record.audio = Probe::failed("no output device");
    assert_eq!(tags(&record), vec![MISSING_AUDIO_SUPPORT]);
}

#[test]
fn test_firefox_plugin_under_chrome_ua() {
    let mut record = normal_record();
    record
        .plugins
        .push(PluginEntry::new("Mozilla Default Plug-in", "", "npnul32.dll"));
    assert_eq!(tags(&record), vec![BROWSER_PLUGIN_MISMATCH]);
}

#[test]
fn test_tags_are_ordered_and_not_deduplicated() {
    let mut record = normal_record();
    // Claims Windows and Android while reporting an iPhone platform.
    record.identity.user_agent =
        "Mozilla/5.0 (Windows NT 10.0; Android 14) Chrome/120.0.0.0".to_string();
    record.identity.platform = "iPhone".to_string();
    record.capabilities.hardware_concurrency = Some(64);
    record.audio = Probe::Unsupported;

    assert_eq!(
        tags(&record),
        vec![
            UA_PLATFORM_MISMATCH,
            UA_PLATFORM_MISMATCH,
            MOBILE_MISMATCH,
            UNREALISTIC_HARDWARE,
            MISSING_AUDIO_SUPPORT,
        ]
    );
}

// ============================================================================
// Reanalysis and Review Tests
// ============================================================================

#[test]
fn test_reanalyze_replaces_stale_state() {
    let mut record = normal_record();
    record.inconsistencies = vec![MOBILE_MISMATCH.to_string()];
    record.hash = Some("stale".to_string());

    reanalyze(&mut record);

    assert!(record.inconsistencies.is_empty());
    assert_ne!(record.hash.as_deref(), Some("stale"));

    let first_hash = record.hash.clone();
    reanalyze(&mut record);
    assert_eq!(record.hash, first_hash);
}

#[test]
fn test_review_of_clean_record() {
    let mut record = normal_record();
    reanalyze(&mut record);

    let report = DeviceReview::new().assess(&record);

    assert!(report.issues.is_empty());
    assert_eq!(report.device_id, record.hash.clone().unwrap_or_default());
    assert!((report.confidence_score - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_review_of_automated_record() {
    let mut record = normal_record();
    record.capabilities.webdriver = Some(true);
    reanalyze(&mut record);

    let report = DeviceReview::new().assess(&record);

    assert!(report.issues.iter().any(|i| i == AUTOMATION_DETECTED));
    assert!(report.confidence_score < 1.0);
    assert!(report.confidence_score >= 0.1);
}
