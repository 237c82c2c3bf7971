//! Simulated host environment.
//!
//! [`SimulatedEnvironment`] implements [`EnvironmentProvider`] without a real
//! browser. It describes one concrete host chosen from a [`HostProfile`] and a
//! seed, renders offscreen surfaces into deterministic data URLs and runs a
//! fake audio graph whose lifecycle can be observed from the outside.
//!
//! Builder toggles break individual capabilities so that fault isolation in
//! the collector can be exercised:
//!
//! ```rust
//! use fingerprint_probe::host::{HostProfile, SimulatedEnvironment};
//!
//! let env = SimulatedEnvironment::from_profile(HostProfile::LinuxFirefox, Some("qa"))
//!     .without_webgl()
//!     .with_mime_type_failure();
//! assert_eq!(env.profile(), HostProfile::LinuxFirefox);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::fingerprint::record::{MimeTypeEntry, PluginEntry, ScreenMetrics, WindowMetrics};
use crate::host::profiles::{GpuProfile, HostProfile, TIMEZONES, WEBGL_EXTENSIONS};
use crate::host::provider::{
    AudioGraph, CompressorSettings, Context2d, EnvironmentProvider, GlParameter, HostError,
    NavigatorInfo, OffscreenSurface, TimezoneInfo, WebGlContext,
};

const DEBUG_RENDERER_INFO: &str = "WEBGL_debug_renderer_info";

/// How the simulated audio subsystem behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioMode {
    /// Audio API present and working.
    Available,
    /// No audio API on the host.
    Absent,
    /// Opening a context fails.
    FailOnOpen(String),
    /// Wiring the graph fails.
    FailOnBuild(String),
    /// Reading the analyser fails.
    FailOnRead(String),
}

/// Observable lifecycle counters of the simulated audio graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioLifecycle {
    pub opened: u32,
    pub started: u32,
    pub stopped: u32,
    pub closed: u32,
}

impl AudioLifecycle {
    /// No context is left open.
    pub fn is_released(&self) -> bool {
        self.opened == self.closed
    }
}

/// A host described entirely in memory.
#[derive(Debug, Clone)]
pub struct SimulatedEnvironment {
    profile: HostProfile,
    navigator: NavigatorInfo,
    screen: ScreenMetrics,
    window: WindowMetrics,
    timezone: TimezoneInfo,
    plugins: Vec<PluginEntry>,
    mime_types: Vec<MimeTypeEntry>,
    gpu: GpuProfile,
    /// Per-host rasterization quirk mixed into every rendered bitmap.
    raster_quirk: u8,
    /// Per-host audio stack quirk shaping the analyser output.
    audio_quirk: u8,
    canvas_2d: bool,
    webgl: bool,
    debug_renderer_info: bool,
    surface_failure: Option<String>,
    serialization_failure: Option<String>,
    mime_type_failure: bool,
    audio: AudioMode,
    lifecycle: Arc<Mutex<AudioLifecycle>>,
}

impl SimulatedEnvironment {
    /// Describes a host of the given profile. The same profile and seed always
    /// describe the same host; without a seed a random host is chosen.
    pub fn from_profile(profile: HostProfile, seed: Option<&str>) -> Self {
        let seed = match seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                seed.hash(&mut hasher);
                hasher.finish()
            }
            None => rand::random(),
        };
        let mut rng = StdRng::seed_from_u64(seed);

        let user_agent = pick(&mut rng, profile.user_agents()).unwrap_or_default();
        let languages: Vec<String> = profile
            .language_sets()
            .choose(&mut rng)
            .map(|set| set.iter().map(|l| l.to_string()).collect())
            .unwrap_or_default();
        let language = languages
            .first()
            .cloned()
            .unwrap_or_else(|| "en-US".to_string());
        let (width, height, pixel_ratio) = profile
            .screens()
            .choose(&mut rng)
            .copied()
            .unwrap_or((1920, 1080, 1.0));
        let (tz_name, tz_offset) = TIMEZONES.choose(&mut rng).copied().unwrap_or(("UTC", 0));
        let gpu = profile
            .gpus()
            .choose(&mut rng)
            .copied()
            .unwrap_or(GpuProfile::SwiftShader);

        let avail_height = height.saturating_sub(profile.reserved_height());
        let screen = ScreenMetrics {
            width,
            height,
            avail_width: width,
            avail_height,
            color_depth: 24,
            pixel_ratio,
        };
        let window = WindowMetrics {
            inner_width: width,
            inner_height: avail_height.saturating_sub(rng.gen_range(60..120)),
            outer_width: width,
            outer_height: avail_height,
        };

        let navigator = NavigatorInfo {
            user_agent: user_agent.to_string(),
            language,
            languages: Some(languages),
            platform: profile.platform().to_string(),
            do_not_track: if rng.gen_ratio(1, 3) {
                Some("1".to_string())
            } else {
                None
            },
            cookies_enabled: true,
            local_storage: true,
            session_storage: true,
            indexed_db: true,
            add_behavior: false,
            open_database: false,
            cpu_class: None,
            hardware_concurrency: pick(&mut rng, profile.core_counts()),
            device_memory: pick(&mut rng, profile.memory_sizes()),
            max_touch_points: profile.max_touch_points(),
            touch_support: profile.is_mobile(),
            webdriver: Some(profile.is_automated()),
        };

        Self {
            profile,
            navigator,
            screen,
            window,
            timezone: TimezoneInfo {
                offset: tz_offset,
                name: tz_name.to_string(),
            },
            plugins: profile.plugins(),
            mime_types: profile.mime_types(),
            gpu,
            raster_quirk: rng.gen(),
            audio_quirk: rng.gen(),
            canvas_2d: true,
            webgl: true,
            debug_renderer_info: profile.exposes_debug_renderer_info(),
            surface_failure: None,
            serialization_failure: None,
            mime_type_failure: false,
            audio: AudioMode::Available,
            lifecycle: Arc::new(Mutex::new(AudioLifecycle::default())),
        }
    }

    pub fn profile(&self) -> HostProfile {
        self.profile
    }

    pub fn gpu(&self) -> GpuProfile {
        self.gpu
    }

    /// Shared handle to the audio lifecycle counters.
    pub fn audio_lifecycle(&self) -> Arc<Mutex<AudioLifecycle>> {
        Arc::clone(&self.lifecycle)
    }

    /// Adjust navigator values in place.
    pub fn with_navigator(mut self, update: impl FnOnce(&mut NavigatorInfo)) -> Self {
        update(&mut self.navigator);
        self
    }

    pub fn with_screen(mut self, width: u32, height: u32) -> Self {
        self.screen.width = width;
        self.screen.height = height;
        self.screen.avail_width = width;
        self.screen.avail_height = height.saturating_sub(self.profile.reserved_height());
        self
    }

    pub fn with_window(mut self, window: WindowMetrics) -> Self {
        self.window = window;
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<PluginEntry>) -> Self {
        self.plugins = plugins;
        self
    }

    /// 2-D contexts are never handed out.
    pub fn without_canvas_2d(mut self) -> Self {
        self.canvas_2d = false;
        self
    }

    /// WebGL contexts are never handed out.
    pub fn without_webgl(mut self) -> Self {
        self.webgl = false;
        self
    }

    pub fn without_debug_renderer_info(mut self) -> Self {
        self.debug_renderer_info = false;
        self
    }

    /// Surface allocation fails outright.
    pub fn with_surface_failure(mut self, message: impl Into<String>) -> Self {
        self.surface_failure = Some(message.into());
        self
    }

    /// Surfaces render but cannot be serialized.
    pub fn with_serialization_failure(mut self, message: impl Into<String>) -> Self {
        self.serialization_failure = Some(message.into());
        self
    }

    pub fn with_mime_type_failure(mut self) -> Self {
        self.mime_type_failure = true;
        self
    }

    pub fn with_audio(mut self, mode: AudioMode) -> Self {
        self.audio = mode;
        self
    }

    pub fn without_audio(self) -> Self {
        self.with_audio(AudioMode::Absent)
    }

    fn raster_signature(&self) -> String {
        format!("{}|{:02x}", self.gpu.renderer(), self.raster_quirk)
    }
}

fn pick<T: Copy>(rng: &mut StdRng, values: &[T]) -> Option<T> {
    values.choose(rng).copied()
}

#[async_trait]
impl EnvironmentProvider for SimulatedEnvironment {
    fn navigator(&self) -> NavigatorInfo {
        self.navigator.clone()
    }

    fn screen(&self) -> ScreenMetrics {
        self.screen.clone()
    }

    fn window(&self) -> WindowMetrics {
        self.window.clone()
    }

    fn timezone(&self) -> TimezoneInfo {
        self.timezone.clone()
    }

    fn plugins(&self) -> Vec<PluginEntry> {
        self.plugins.clone()
    }

    fn mime_types(&self) -> Result<Vec<MimeTypeEntry>, HostError> {
        if self.mime_type_failure {
            return Err(HostError::Enumeration("mime types".to_string()));
        }
        Ok(self.mime_types.clone())
    }

    fn create_surface(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn OffscreenSurface>, HostError> {
        if let Some(ref message) = self.surface_failure {
            return Err(HostError::SurfaceCreation(message.clone()));
        }

        let (version, shading) = self.profile.webgl_versions();
        let mut extensions: Vec<String> = WEBGL_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        if self.debug_renderer_info {
            extensions.push(DEBUG_RENDERER_INFO.to_string());
        }

        Ok(Box::new(SimulatedSurface {
            width,
            height,
            signature: self.raster_signature(),
            active: None,
            canvas_2d: self.canvas_2d,
            webgl: self.webgl,
            serialization_failure: self.serialization_failure.clone(),
            ctx_2d: SimulatedContext2d::default(),
            ctx_webgl: SimulatedWebGl {
                ops: Vec::new(),
                gpu: self.gpu,
                version,
                shading_language_version: shading,
                extensions,
                debug_renderer_info: self.debug_renderer_info,
                antialias: !self.profile.is_automated(),
            },
        }))
    }

    async fn open_audio(&self) -> Result<Option<Box<dyn AudioGraph>>, HostError> {
        match self.audio {
            AudioMode::Absent => return Ok(None),
            AudioMode::FailOnOpen(ref message) => return Err(HostError::Audio(message.clone())),
            _ => {}
        }

        self.lifecycle.lock().opened += 1;
        Ok(Some(Box::new(SimulatedAudioGraph {
            mode: self.audio.clone(),
            quirk: self.audio_quirk,
            lifecycle: Arc::clone(&self.lifecycle),
            bins: 0,
            running: false,
            closed: false,
        })))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextKind {
    TwoD,
    WebGl,
}

struct SimulatedSurface {
    width: u32,
    height: u32,
    signature: String,
    active: Option<ContextKind>,
    canvas_2d: bool,
    webgl: bool,
    serialization_failure: Option<String>,
    ctx_2d: SimulatedContext2d,
    ctx_webgl: SimulatedWebGl,
}

impl OffscreenSurface for SimulatedSurface {
    fn context_2d(&mut self) -> Option<&mut dyn Context2d> {
        if !self.canvas_2d || self.active == Some(ContextKind::WebGl) {
            return None;
        }
        self.active = Some(ContextKind::TwoD);
        Some(&mut self.ctx_2d)
    }

    fn context_webgl(&mut self) -> Option<&mut dyn WebGlContext> {
        if !self.webgl || self.active == Some(ContextKind::TwoD) {
            return None;
        }
        self.active = Some(ContextKind::WebGl);
        Some(&mut self.ctx_webgl)
    }

    fn to_data_url(&self) -> Result<String, HostError> {
        if let Some(ref message) = self.serialization_failure {
            return Err(HostError::Serialization(message.clone()));
        }

        let ops = match self.active {
            Some(ContextKind::TwoD) => self.ctx_2d.ops.join(";"),
            Some(ContextKind::WebGl) => self.ctx_webgl.ops.join(";"),
            None => String::new(),
        };
        let bitmap = format!("{}x{}|{}|{}", self.width, self.height, self.signature, ops);
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(bitmap)))
    }
}

#[derive(Default)]
struct SimulatedContext2d {
    ops: Vec<String>,
}

impl Context2d for SimulatedContext2d {
    fn set_text_baseline(&mut self, baseline: &str) {
        self.ops.push(format!("baseline={}", baseline));
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(format!("font={}", font));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ops.push(format!("fill={}", style));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(format!("rect({},{},{},{})", x, y, width, height));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.ops.push(format!("text({},{},{})", text, x, y));
    }
}

struct SimulatedWebGl {
    ops: Vec<String>,
    gpu: GpuProfile,
    version: &'static str,
    shading_language_version: &'static str,
    extensions: Vec<String>,
    debug_renderer_info: bool,
    antialias: bool,
}

impl WebGlContext for SimulatedWebGl {
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.ops
            .push(format!("clearColor({},{},{},{})", red, green, blue, alpha));
    }

    fn clear(&mut self) {
        self.ops.push("clear(COLOR_BUFFER_BIT)".to_string());
    }

    fn parameter(&self, parameter: GlParameter) -> Result<String, HostError> {
        let value = match parameter {
            GlParameter::Vendor => "WebKit",
            GlParameter::Renderer => "WebKit WebGL",
            GlParameter::Version => self.version,
            GlParameter::ShadingLanguageVersion => self.shading_language_version,
            GlParameter::UnmaskedVendor if self.debug_renderer_info => self.gpu.vendor(),
            GlParameter::UnmaskedRenderer if self.debug_renderer_info => self.gpu.renderer(),
            _ => return Err(HostError::Parameter(parameter.to_string())),
        };
        Ok(value.to_string())
    }

    fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e == name)
    }

    fn supported_extensions(&self) -> Vec<String> {
        self.extensions.clone()
    }

    fn antialias(&self) -> bool {
        self.antialias
    }
}

struct SimulatedAudioGraph {
    mode: AudioMode,
    quirk: u8,
    lifecycle: Arc<Mutex<AudioLifecycle>>,
    bins: u32,
    running: bool,
    closed: bool,
}

impl AudioGraph for SimulatedAudioGraph {
    fn build(&mut self, compressor: CompressorSettings, fft_size: u32) -> Result<(), HostError> {
        if let AudioMode::FailOnBuild(ref message) = self.mode {
            return Err(HostError::Audio(message.clone()));
        }
        // The compressor's gain reduction shifts every bin slightly.
        let reduction = (compressor.ratio - compressor.threshold / compressor.knee).round() as u8;
        self.quirk = self.quirk.wrapping_add(reduction);
        self.bins = fft_size / 2;
        Ok(())
    }

    fn start(&mut self) -> Result<(), HostError> {
        self.running = true;
        self.lifecycle.lock().started += 1;
        Ok(())
    }

    fn frequency_data(&mut self) -> Result<Vec<u8>, HostError> {
        if let AudioMode::FailOnRead(ref message) = self.mode {
            return Err(HostError::Audio(message.clone()));
        }
        // A 440 Hz triangle wave peaks in the low bins and decays upwards.
        Ok((0..self.bins)
            .map(|bin| {
                let falloff = 255u32.saturating_sub(bin / 2);
                (falloff as u8).wrapping_add(self.quirk % 7)
            })
            .collect())
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.lifecycle.lock().stopped += 1;
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.lifecycle.lock().closed += 1;
        }
    }
}
