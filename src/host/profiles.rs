//! Host profiles for the simulated environment.
//!
//! Each [`HostProfile`] describes a realistic browser/OS combination: the
//! user agents it ships, its platform string, plugin and mime inventories,
//! plausible screens, hardware and GPUs. The simulated environment picks
//! concrete values from these tables with a seeded RNG, so the same profile and
//! seed always describe the same host.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::fingerprint::record::{MimeTypeEntry, PluginEntry};

/// Predefined browser/OS combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostProfile {
    /// Windows 10/11 with Chrome (most common)
    WindowsChrome,
    WindowsFirefox,
    WindowsEdge,
    MacChrome,
    MacSafari,
    MacFirefox,
    LinuxChrome,
    LinuxFirefox,
    AndroidChrome,
    IphoneSafari,
    /// Headless Chrome driven by automation tooling
    HeadlessChrome,
}

impl Default for HostProfile {
    fn default() -> Self {
        Self::WindowsChrome
    }
}

impl std::fmt::Display for HostProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HostProfile::WindowsChrome => "windows-chrome",
            HostProfile::WindowsFirefox => "windows-firefox",
            HostProfile::WindowsEdge => "windows-edge",
            HostProfile::MacChrome => "mac-chrome",
            HostProfile::MacSafari => "mac-safari",
            HostProfile::MacFirefox => "mac-firefox",
            HostProfile::LinuxChrome => "linux-chrome",
            HostProfile::LinuxFirefox => "linux-firefox",
            HostProfile::AndroidChrome => "android-chrome",
            HostProfile::IphoneSafari => "iphone-safari",
            HostProfile::HeadlessChrome => "headless-chrome",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for HostProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostProfile::all()
            .into_iter()
            .find(|p| p.to_string() == s.to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Unknown host profile: {}. Valid profiles are: {}",
                    s,
                    HostProfile::all()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Browser engine family of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    Chromium,
    Gecko,
    WebKit,
}

impl HostProfile {
    /// Every profile, including the automation one.
    pub fn all() -> Vec<HostProfile> {
        vec![
            HostProfile::WindowsChrome,
            HostProfile::WindowsFirefox,
            HostProfile::WindowsEdge,
            HostProfile::MacChrome,
            HostProfile::MacSafari,
            HostProfile::MacFirefox,
            HostProfile::LinuxChrome,
            HostProfile::LinuxFirefox,
            HostProfile::AndroidChrome,
            HostProfile::IphoneSafari,
            HostProfile::HeadlessChrome,
        ]
    }

    /// Profiles describing ordinary, non-automated hosts.
    pub fn all_genuine() -> Vec<HostProfile> {
        Self::all()
            .into_iter()
            .filter(|p| !p.is_automated())
            .collect()
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, HostProfile::AndroidChrome | HostProfile::IphoneSafari)
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, HostProfile::HeadlessChrome)
    }

    pub fn engine(&self) -> EngineFamily {
        match self {
            HostProfile::WindowsFirefox | HostProfile::MacFirefox | HostProfile::LinuxFirefox => {
                EngineFamily::Gecko
            }
            HostProfile::MacSafari | HostProfile::IphoneSafari => EngineFamily::WebKit,
            _ => EngineFamily::Chromium,
        }
    }

    /// `navigator.platform` for this profile
    pub fn platform(&self) -> &'static str {
        match self {
            HostProfile::WindowsChrome
            | HostProfile::WindowsFirefox
            | HostProfile::WindowsEdge => "Win32",
            HostProfile::MacChrome | HostProfile::MacSafari | HostProfile::MacFirefox => {
                "MacIntel"
            }
            HostProfile::LinuxChrome | HostProfile::LinuxFirefox | HostProfile::HeadlessChrome => {
                "Linux x86_64"
            }
            HostProfile::AndroidChrome => "Linux armv8l",
            HostProfile::IphoneSafari => "iPhone",
        }
    }

    /// Known user agents for this profile.
    pub fn user_agents(&self) -> &'static [&'static str] {
        USER_AGENTS
            .iter()
            .find(|(profile, _)| profile == self)
            .map(|(_, agents)| agents.as_slice())
            .unwrap_or(&[])
    }

    /// Accepted-language sets a host of this profile may report.
    pub fn language_sets(&self) -> Vec<Vec<&'static str>> {
        match self {
            HostProfile::WindowsChrome
            | HostProfile::WindowsFirefox
            | HostProfile::WindowsEdge => vec![
                vec!["en-US", "en"],
                vec!["en-US", "en", "es"],
                vec!["en-GB", "en"],
            ],
            HostProfile::MacChrome | HostProfile::MacSafari | HostProfile::MacFirefox => vec![
                vec!["en-US", "en"],
                vec!["en-US", "en", "fr"],
                vec!["en-GB", "en"],
            ],
            HostProfile::LinuxChrome | HostProfile::LinuxFirefox => vec![
                vec!["en-US", "en"],
                vec!["en-US", "en", "de"],
                vec!["en-GB", "en"],
            ],
            HostProfile::AndroidChrome | HostProfile::IphoneSafari => {
                vec![vec!["en-US"], vec!["en-US", "es-US"]]
            }
            // Headless builds commonly report no accepted languages.
            HostProfile::HeadlessChrome => vec![vec![]],
        }
    }

    /// Plausible (width, height, pixel ratio) screens.
    pub fn screens(&self) -> &'static [(u32, u32, f64)] {
        match self {
            HostProfile::AndroidChrome => &[(412, 915, 2.625), (360, 800, 3.0), (384, 854, 2.8125)],
            HostProfile::IphoneSafari => &[(390, 844, 3.0), (393, 852, 3.0), (375, 667, 2.0)],
            HostProfile::MacChrome | HostProfile::MacSafari | HostProfile::MacFirefox => &[
                (1440, 900, 2.0),
                (1512, 982, 2.0),
                (1728, 1117, 2.0),
                (2560, 1440, 1.0),
            ],
            HostProfile::HeadlessChrome => &[(800, 600, 1.0)],
            _ => &[
                (1920, 1080, 1.0),
                (2560, 1440, 1.0),
                (1366, 768, 1.0),
                (1536, 864, 1.25),
                (1680, 1050, 1.0),
                (3840, 2160, 1.5),
            ],
        }
    }

    /// Height lost to taskbars, docks and system bars.
    pub fn reserved_height(&self) -> u32 {
        match self {
            HostProfile::MacChrome | HostProfile::MacSafari | HostProfile::MacFirefox => 25,
            HostProfile::AndroidChrome | HostProfile::IphoneSafari | HostProfile::HeadlessChrome => 0,
            _ => 40,
        }
    }

    /// Plausible logical core counts.
    pub fn core_counts(&self) -> &'static [u32] {
        if self.is_mobile() {
            &[6, 8]
        } else {
            &[4, 8, 12, 16]
        }
    }

    /// Plausible `navigator.deviceMemory` values. Empty when the engine does
    /// not expose the property.
    pub fn memory_sizes(&self) -> &'static [f64] {
        match self.engine() {
            EngineFamily::Chromium => &[4.0, 8.0],
            EngineFamily::Gecko | EngineFamily::WebKit => &[],
        }
    }

    pub fn max_touch_points(&self) -> u32 {
        if self.is_mobile() {
            5
        } else {
            0
        }
    }

    /// GPUs a host of this profile may report.
    pub fn gpus(&self) -> &'static [GpuProfile] {
        match self {
            HostProfile::MacChrome | HostProfile::MacSafari | HostProfile::MacFirefox => {
                &[GpuProfile::AppleM1, GpuProfile::AppleM2, GpuProfile::IntelIrisPlus]
            }
            HostProfile::IphoneSafari => &[GpuProfile::AppleGpu],
            HostProfile::AndroidChrome => &[GpuProfile::Adreno740, GpuProfile::MaliG710],
            HostProfile::HeadlessChrome => &[GpuProfile::SwiftShader],
            HostProfile::LinuxChrome | HostProfile::LinuxFirefox => {
                &[GpuProfile::MesaIntelUhd630, GpuProfile::NvidiaGtx1660Linux]
            }
            _ => &[
                GpuProfile::NvidiaGtx1660,
                GpuProfile::NvidiaRtx3060,
                GpuProfile::AmdRx6700Xt,
                GpuProfile::IntelUhd630,
                GpuProfile::IntelIrisXe,
            ],
        }
    }

    /// `WEBGL_debug_renderer_info` is exposed by every engine here except
    /// Firefox builds with resist-fingerprinting defaults.
    pub fn exposes_debug_renderer_info(&self) -> bool {
        self.engine() != EngineFamily::Gecko
    }

    /// Plugin inventory of this profile.
    pub fn plugins(&self) -> Vec<PluginEntry> {
        match self {
            HostProfile::WindowsChrome
            | HostProfile::MacChrome
            | HostProfile::LinuxChrome
            | HostProfile::WindowsEdge => [
                "PDF Viewer",
                "Chrome PDF Viewer",
                "Chromium PDF Viewer",
                "Microsoft Edge PDF Viewer",
                "WebKit built-in PDF",
            ]
            .iter()
            .map(|name| {
                PluginEntry::new(*name, "Portable Document Format", "internal-pdf-viewer")
                    .with_length(2)
            })
            .collect(),
            HostProfile::MacSafari => vec![PluginEntry::new(
                "WebKit built-in PDF",
                "Portable Document Format",
                "WebKitPDFPlugin",
            )
            .with_length(1)],
            // Firefox, mobile browsers and headless builds expose no plugins.
            _ => Vec::new(),
        }
    }

    /// Mime type inventory of this profile.
    pub fn mime_types(&self) -> Vec<MimeTypeEntry> {
        match self.engine() {
            EngineFamily::Chromium if !self.is_mobile() && !self.is_automated() => vec![
                MimeTypeEntry::new("application/pdf", "Portable Document Format", "pdf"),
                MimeTypeEntry::new("text/pdf", "Portable Document Format", "pdf"),
            ],
            EngineFamily::WebKit if !self.is_mobile() => vec![MimeTypeEntry::new(
                "application/pdf",
                "Portable Document Format",
                "pdf",
            )],
            _ => Vec::new(),
        }
    }

    /// WebGL version strings (version, shading language version).
    pub fn webgl_versions(&self) -> (&'static str, &'static str) {
        match self.engine() {
            EngineFamily::Chromium => (
                "WebGL 1.0 (OpenGL ES 2.0 Chromium)",
                "WebGL GLSL ES 1.0 (OpenGL ES GLSL ES 1.0 Chromium)",
            ),
            EngineFamily::Gecko | EngineFamily::WebKit => ("WebGL 1.0", "WebGL GLSL ES 1.0"),
        }
    }
}

/// Timezones a simulated host may sit in, with browser-convention offsets.
pub const TIMEZONES: &[(&str, i32)] = &[
    ("America/New_York", 300),
    ("America/Chicago", 360),
    ("America/Denver", 420),
    ("America/Los_Angeles", 480),
    ("Europe/London", 0),
    ("Europe/Paris", -60),
    ("Europe/Berlin", -60),
    ("Asia/Tokyo", -540),
    ("Asia/Shanghai", -480),
    ("Australia/Sydney", -600),
];

/// Standard WebGL extensions most desktop drivers expose.
pub const WEBGL_EXTENSIONS: &[&str] = &[
    "ANGLE_instanced_arrays",
    "EXT_blend_minmax",
    "EXT_color_buffer_half_float",
    "EXT_float_blend",
    "EXT_texture_filter_anisotropic",
    "OES_element_index_uint",
    "OES_standard_derivatives",
    "OES_texture_float",
    "OES_vertex_array_object",
    "WEBGL_compressed_texture_s3tc",
    "WEBGL_depth_texture",
    "WEBGL_lose_context",
];

/// GPU identities reported through `WEBGL_debug_renderer_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuProfile {
    NvidiaGtx1660,
    NvidiaRtx3060,
    AmdRx6700Xt,
    IntelUhd630,
    IntelIrisXe,
    IntelIrisPlus,
    MesaIntelUhd630,
    NvidiaGtx1660Linux,
    AppleM1,
    AppleM2,
    AppleGpu,
    Adreno740,
    MaliG710,
    SwiftShader,
}

impl GpuProfile {
    /// Unmasked vendor string
    pub fn vendor(&self) -> &'static str {
        match self {
            GpuProfile::NvidiaGtx1660 | GpuProfile::NvidiaRtx3060 => "Google Inc. (NVIDIA)",
            GpuProfile::AmdRx6700Xt => "Google Inc. (AMD)",
            GpuProfile::IntelUhd630 | GpuProfile::IntelIrisXe => "Google Inc. (Intel)",
            GpuProfile::IntelIrisPlus => "Intel Inc.",
            GpuProfile::MesaIntelUhd630 => "Intel",
            GpuProfile::NvidiaGtx1660Linux => "NVIDIA Corporation",
            GpuProfile::AppleM1 | GpuProfile::AppleM2 | GpuProfile::AppleGpu => "Apple Inc.",
            GpuProfile::Adreno740 => "Qualcomm",
            GpuProfile::MaliG710 => "ARM",
            GpuProfile::SwiftShader => "Google Inc. (Google)",
        }
    }

    /// Unmasked renderer string
    pub fn renderer(&self) -> &'static str {
        match self {
            GpuProfile::NvidiaGtx1660 => {
                "ANGLE (NVIDIA, NVIDIA GeForce GTX 1660 SUPER Direct3D11 vs_5_0 ps_5_0, D3D11)"
            }
            GpuProfile::NvidiaRtx3060 => {
                "ANGLE (NVIDIA, NVIDIA GeForce RTX 3060 Direct3D11 vs_5_0 ps_5_0, D3D11)"
            }
            GpuProfile::AmdRx6700Xt => {
                "ANGLE (AMD, AMD Radeon RX 6700 XT Direct3D11 vs_5_0 ps_5_0, D3D11)"
            }
            GpuProfile::IntelUhd630 => {
                "ANGLE (Intel, Intel(R) UHD Graphics 630 Direct3D11 vs_5_0 ps_5_0, D3D11)"
            }
            GpuProfile::IntelIrisXe => {
                "ANGLE (Intel, Intel(R) Iris(R) Xe Graphics Direct3D11 vs_5_0 ps_5_0, D3D11)"
            }
            GpuProfile::IntelIrisPlus => "Intel(R) Iris(TM) Plus Graphics OpenGL Engine",
            GpuProfile::MesaIntelUhd630 => "Mesa Intel(R) UHD Graphics 630 (CFL GT2)",
            GpuProfile::NvidiaGtx1660Linux => "NVIDIA GeForce GTX 1660 SUPER/PCIe/SSE2",
            GpuProfile::AppleM1 => "Apple M1",
            GpuProfile::AppleM2 => "Apple M2",
            GpuProfile::AppleGpu => "Apple GPU",
            GpuProfile::Adreno740 => "Adreno (TM) 740",
            GpuProfile::MaliG710 => "Mali-G710 MC10",
            GpuProfile::SwiftShader => {
                "ANGLE (Google, Vulkan 1.1.0 (SwiftShader Device (Subzero) (0x0000C0DE)), SwiftShader driver)"
            }
        }
    }
}

static USER_AGENTS: Lazy<Vec<(HostProfile, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (HostProfile::WindowsChrome, vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        ]),
        (HostProfile::WindowsFirefox, vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
        ]),
        (HostProfile::WindowsEdge, vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36 Edg/121.0.0.0",
        ]),
        (HostProfile::MacChrome, vec![
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
        ]),
        (HostProfile::MacSafari, vec![
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
        ]),
        (HostProfile::MacFirefox, vec![
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
        ]),
        (HostProfile::LinuxChrome, vec![
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
        ]),
        (HostProfile::LinuxFirefox, vec![
            "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
            "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0",
        ]),
        (HostProfile::AndroidChrome, vec![
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
            "Mozilla/5.0 (Linux; Android 13; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Mobile Safari/537.36",
        ]),
        (HostProfile::IphoneSafari, vec![
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
        ]),
        (HostProfile::HeadlessChrome, vec![
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) HeadlessChrome/120.0.0.0 Safari/537.36",
        ]),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_profile_has_user_agents_and_gpus() {
        for profile in HostProfile::all() {
            assert!(!profile.user_agents().is_empty(), "{} has no user agents", profile);
            assert!(!profile.gpus().is_empty(), "{} has no GPUs", profile);
            assert!(!profile.screens().is_empty(), "{} has no screens", profile);
        }
    }

    #[test]
    fn test_profile_name_round_trip() {
        for profile in HostProfile::all() {
            assert_eq!(profile.to_string().parse::<HostProfile>(), Ok(profile));
        }
        assert!("netscape".parse::<HostProfile>().is_err());
    }

    #[test]
    fn test_mobile_profiles_have_small_screens() {
        for profile in HostProfile::all().into_iter().filter(HostProfile::is_mobile) {
            for (width, height, _) in profile.screens() {
                assert!(*width < 800 || *height < 600);
            }
        }
    }

    #[test]
    fn test_firefox_exposes_no_chrome_plugins() {
        assert!(HostProfile::WindowsFirefox.plugins().is_empty());
        assert_eq!(HostProfile::WindowsChrome.plugins().len(), 5);
    }
}
