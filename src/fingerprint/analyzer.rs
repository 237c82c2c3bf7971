//! Consistency analysis.
//!
//! Each rule inspects a completed [`FingerprintRecord`] and may append a tag
//! to `inconsistencies`. Rules are independent and never remove a tag that is
//! already present. Tags are kept in first-detected order and are not
//! deduplicated: a user agent that contradicts the platform for two OS
//! families yields `ua_platform_mismatch` twice.
//!
//! These are heuristics. Legitimate but unusual hosts trigger them, and a
//! carefully spoofed host can pass all of them.

use tracing::debug;

use crate::fingerprint::record::FingerprintRecord;

pub const UA_PLATFORM_MISMATCH: &str = "ua_platform_mismatch";
pub const MOBILE_MISMATCH: &str = "mobile_mismatch";
pub const BROWSER_PLUGIN_MISMATCH: &str = "browser_plugin_mismatch";
pub const UNREALISTIC_HARDWARE: &str = "unrealistic_hardware";
pub const AUTOMATION_DETECTED: &str = "automation_detected";
pub const MISSING_GRAPHICS_SUPPORT: &str = "missing_graphics_support";
pub const MISSING_AUDIO_SUPPORT: &str = "missing_audio_support";

/// Screens narrower than this are treated as mobile sized.
const MOBILE_MAX_WIDTH: u32 = 800;
/// Screens shorter than this are treated as mobile sized.
const MOBILE_MAX_HEIGHT: u32 = 600;
/// Highest plausible logical core count.
const MAX_REALISTIC_CORES: u32 = 32;
/// Highest plausible reported device memory, in GB.
const MAX_REALISTIC_MEMORY_GB: f64 = 32.0;

const MOBILE_UA_MARKERS: &[&str] = &["mobile", "android", "iphone", "ipod", "ipad"];

/// OS family claimed by the user agent, and the platform substrings that
/// corroborate it. Any one corroborating substring is enough.
const PLATFORM_FAMILIES: &[(&str, &[&str])] = &[
    ("windows", &["win"]),
    ("macintosh", &["mac"]),
    ("linux", &["linux"]),
    ("android", &["linux", "arm"]),
];

/// Runs the full battery of consistency rules over a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyAnalyzer;

impl ConsistencyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Appends every detected tag to `record.inconsistencies`.
    pub fn analyze(&self, record: &mut FingerprintRecord) {
        let tags = self.detect(record);
        if !tags.is_empty() {
            debug!(?tags, "consistency rules flagged record");
        }
        record
            .inconsistencies
            .extend(tags.into_iter().map(str::to_string));
    }

    /// Evaluates all rules without touching the record.
    pub fn detect(&self, record: &FingerprintRecord) -> Vec<&'static str> {
        let mut tags = Vec::new();
        let ua = record.identity.user_agent.to_lowercase();

        check_ua_platform(&ua, &record.identity.platform, &mut tags);
        check_mobile(&ua, record, &mut tags);
        check_browser_plugins(&ua, record, &mut tags);
        check_hardware(record, &mut tags);
        check_automation(record, &mut tags);
        check_graphics(record, &mut tags);
        check_audio(record, &mut tags);

        tags
    }
}

fn check_ua_platform(ua: &str, platform: &str, tags: &mut Vec<&'static str>) {
    let platform = platform.to_lowercase();
    for (family, markers) in PLATFORM_FAMILIES {
        if ua.contains(family) && !markers.iter().any(|m| platform.contains(m)) {
            tags.push(UA_PLATFORM_MISMATCH);
        }
    }
}

fn check_mobile(ua: &str, record: &FingerprintRecord, tags: &mut Vec<&'static str>) {
    let claims_mobile = MOBILE_UA_MARKERS.iter().any(|m| ua.contains(m));
    let screen = &record.geometry.screen;
    let small_screen = screen.width < MOBILE_MAX_WIDTH || screen.height < MOBILE_MAX_HEIGHT;

    if claims_mobile != small_screen {
        tags.push(MOBILE_MISMATCH);
    }
}

fn check_browser_plugins(ua: &str, record: &FingerprintRecord, tags: &mut Vec<&'static str>) {
    let names: Vec<String> = record
        .plugins
        .iter()
        .map(|p| p.name.to_lowercase())
        .collect();

    if ua.contains("chrome") && any_named(&names, &["firefox", "mozilla"]) {
        tags.push(BROWSER_PLUGIN_MISMATCH);
    }
    if ua.contains("firefox") && any_named(&names, &["chrome", "google"]) {
        tags.push(BROWSER_PLUGIN_MISMATCH);
    }
}

fn any_named(names: &[String], needles: &[&str]) -> bool {
    names
        .iter()
        .any(|name| needles.iter().any(|n| name.contains(n)))
}

fn check_hardware(record: &FingerprintRecord, tags: &mut Vec<&'static str>) {
    let caps = &record.capabilities;
    let too_many_cores = caps
        .hardware_concurrency
        .is_some_and(|cores| cores > MAX_REALISTIC_CORES);
    let too_much_memory = caps
        .device_memory
        .is_some_and(|gb| gb > MAX_REALISTIC_MEMORY_GB);

    if too_many_cores || too_much_memory {
        tags.push(UNREALISTIC_HARDWARE);
    }
}

fn check_automation(record: &FingerprintRecord, tags: &mut Vec<&'static str>) {
    let webdriver = record.capabilities.webdriver == Some(true);
    let no_languages = record
        .identity
        .languages
        .as_ref()
        .map_or(true, |langs| langs.is_empty());

    if webdriver || no_languages {
        tags.push(AUTOMATION_DETECTED);
    }
}

fn check_graphics(record: &FingerprintRecord, tags: &mut Vec<&'static str>) {
    if !record.canvas.is_supported() && !record.webgl_fingerprint.is_supported() {
        tags.push(MISSING_GRAPHICS_SUPPORT);
    }
}

fn check_audio(record: &FingerprintRecord, tags: &mut Vec<&'static str>) {
    if !record.audio.is_supported() {
        tags.push(MISSING_AUDIO_SUPPORT);
    }
}
