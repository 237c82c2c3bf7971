//! Fingerprint collection.
//!
//! The [`Collector`] reads every signal category from an injected
//! [`EnvironmentProvider`] and assembles a fresh [`FingerprintRecord`]. Each
//! sub-step is fault isolated: a host failure becomes data on the record
//! (`Unsupported`, `Failed`, or an empty inventory) and never stops the other
//! steps.
//!
//! The pass is linear. The audio step is the only suspension point: it starts
//! the audio graph and waits [`AUDIO_SETTLE_DELAY`] for the compressor to reach
//! steady state before reading the analyser.
//!
//! # Example
//!
//! ```rust,no_run
//! use fingerprint_probe::fingerprint::Collector;
//! use fingerprint_probe::host::{HostProfile, SimulatedEnvironment};
//!
//! # async fn run() {
//! let env = SimulatedEnvironment::from_profile(HostProfile::WindowsChrome, Some("seed"));
//! let record = Collector::new(env).collect_all().await;
//! println!("{:?} {:?}", record.hash, record.inconsistencies);
//! # }
//! ```

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::fingerprint::analyzer::ConsistencyAnalyzer;
use crate::fingerprint::hasher::{hash_record, hash_str};
use crate::fingerprint::record::{
    AudioFingerprint, Capabilities, FingerprintRecord, Geometry, Identity, Probe,
    RenderedFingerprint, Temporal, WebGlInfo,
};
use crate::host::provider::{
    AudioGraph, CompressorSettings, EnvironmentProvider, GlParameter, HostError,
};

/// Time the audio graph runs before its output is read.
pub const AUDIO_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Analyser FFT size. Yields `FFT_SIZE / 2` frequency bins.
pub const FFT_SIZE: u32 = 1024;

pub const CANVAS_WIDTH: u32 = 220;
pub const CANVAS_HEIGHT: u32 = 30;
pub const WEBGL_SURFACE_SIZE: u32 = 50;

const CANVAS_TEXT: &str = "Browser fingerprint, 1.0";
const CANVAS_GLYPH_TEXT: &str = "Cwm fjordbank glyphs vext quiz \u{1F603}";
const DEBUG_RENDERER_INFO: &str = "WEBGL_debug_renderer_info";

/// Collects fingerprint records from one environment.
#[derive(Debug, Clone)]
pub struct Collector<E> {
    env: E,
    analyzer: ConsistencyAnalyzer,
}

impl<E: EnvironmentProvider> Collector<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            analyzer: ConsistencyAnalyzer::new(),
        }
    }

    /// Borrow the underlying environment.
    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Runs a full collection pass: every sub-collector, then the analyzer,
    /// then the hasher.
    ///
    /// Never fails. Missing or broken capabilities are encoded on the record.
    pub async fn collect_all(&self) -> FingerprintRecord {
        let mut record = FingerprintRecord::default();

        self.collect_basic_info(&mut record);
        self.collect_browser_capabilities(&mut record);
        self.collect_canvas_fingerprint(&mut record);
        self.collect_webgl_info(&mut record);
        self.collect_audio_fingerprint(&mut record).await;

        self.analyzer.analyze(&mut record);
        let hash = hash_record(&record);
        record.hash = Some(hash);

        info!(
            hash = record.hash.as_deref().unwrap_or_default(),
            inconsistencies = record.inconsistencies.len(),
            "Fingerprint collected"
        );

        record
    }

    /// Identity, timezone and geometry. No failure path.
    pub fn collect_basic_info(&self, record: &mut FingerprintRecord) {
        let nav = self.env.navigator();
        let tz = self.env.timezone();

        record.identity = Identity {
            user_agent: nav.user_agent,
            language: nav.language,
            languages: nav.languages,
            platform: nav.platform,
            do_not_track: nav.do_not_track,
        };
        record.temporal = Temporal {
            offset: tz.offset,
            timezone: tz.name,
            current_time: Some(Utc::now()),
        };
        record.geometry = Geometry {
            screen: self.env.screen(),
            window: self.env.window(),
        };
    }

    /// Capability flags plus plugin and mime type inventories.
    pub fn collect_browser_capabilities(&self, record: &mut FingerprintRecord) {
        let nav = self.env.navigator();

        record.capabilities = Capabilities {
            cookies_enabled: nav.cookies_enabled,
            local_storage: nav.local_storage,
            session_storage: nav.session_storage,
            indexed_db: nav.indexed_db,
            add_behavior: nav.add_behavior,
            open_database: nav.open_database,
            cpu_class: nav.cpu_class,
            hardware_concurrency: nav.hardware_concurrency,
            device_memory: nav.device_memory,
            max_touch_points: nav.max_touch_points,
            touch_support: nav.touch_support,
            webdriver: nav.webdriver,
        };
        record.plugins = self.env.plugins();
        record.mime_types = self.env.mime_types().unwrap_or_else(|e| {
            debug!("Mime type enumeration failed, recording none: {}", e);
            Vec::new()
        });
    }

    /// 2-D canvas render hash, followed by the WebGL render hash.
    pub fn collect_canvas_fingerprint(&self, record: &mut FingerprintRecord) {
        record.canvas = self.render_canvas();
        debug!(supported = record.canvas.is_supported(), "Canvas fingerprint");

        self.collect_webgl_fingerprint(record);
    }

    /// WebGL render hash on its own surface.
    pub fn collect_webgl_fingerprint(&self, record: &mut FingerprintRecord) {
        record.webgl_fingerprint = self.render_webgl();
        debug!(
            supported = record.webgl_fingerprint.is_supported(),
            "WebGL fingerprint"
        );
    }

    /// Static WebGL identity parameters. Nothing is rendered.
    pub fn collect_webgl_info(&self, record: &mut FingerprintRecord) {
        record.webgl_info = self.read_webgl_info();
        if let Some(error) = record.webgl_info.error() {
            warn!("WebGL info unavailable: {}", error);
        }
    }

    /// Audio rendering digest. Suspends for [`AUDIO_SETTLE_DELAY`].
    pub async fn collect_audio_fingerprint(&self, record: &mut FingerprintRecord) {
        record.audio = match self.render_audio().await {
            Ok(Some(digest)) => Probe::Supported(AudioFingerprint { digest }),
            Ok(None) => Probe::Unsupported,
            Err(e) => {
                warn!("Audio fingerprint failed: {}", e);
                Probe::failed(e)
            }
        };
    }

    fn render_canvas(&self) -> Probe<RenderedFingerprint> {
        let mut surface = match self.env.create_surface(CANVAS_WIDTH, CANVAS_HEIGHT) {
            Ok(surface) => surface,
            Err(e) => return Probe::failed(e),
        };

        let Some(ctx) = surface.context_2d() else {
            return Probe::Unsupported;
        };

        ctx.set_text_baseline("top");
        ctx.set_fill_style("#ffffff");
        ctx.fill_rect(0.0, 0.0, f64::from(CANVAS_WIDTH), f64::from(CANVAS_HEIGHT));

        ctx.set_font("14px 'Arial'");
        ctx.set_fill_style("#f60");
        ctx.fill_text(CANVAS_TEXT, 2.0, 2.0);

        ctx.set_font("16px 'Times New Roman'");
        ctx.set_fill_style("rgba(102, 204, 0, 0.7)");
        ctx.fill_text(CANVAS_GLYPH_TEXT, 4.0, 14.0);

        Probe::Supported(hash_surface(surface.to_data_url()))
    }

    fn render_webgl(&self) -> Probe<RenderedFingerprint> {
        let mut surface = match self
            .env
            .create_surface(WEBGL_SURFACE_SIZE, WEBGL_SURFACE_SIZE)
        {
            Ok(surface) => surface,
            Err(e) => return Probe::failed(e),
        };

        let Some(gl) = surface.context_webgl() else {
            return Probe::Unsupported;
        };

        gl.clear_color(0.2, 0.4, 0.6, 1.0);
        gl.clear();

        Probe::Supported(hash_surface(surface.to_data_url()))
    }

    fn read_webgl_info(&self) -> Probe<WebGlInfo> {
        let mut surface = match self.env.create_surface(1, 1) {
            Ok(surface) => surface,
            Err(e) => return Probe::failed(e),
        };

        let Some(gl) = surface.context_webgl() else {
            return Probe::Unsupported;
        };

        match read_gl_parameters(&*gl) {
            Ok(info) => Probe::Supported(info),
            Err(e) => Probe::failed(e),
        }
    }

    async fn render_audio(&self) -> Result<Option<String>, HostError> {
        let Some(graph) = self.env.open_audio().await? else {
            return Ok(None);
        };

        // Dropping the guard stops and closes the graph on every exit path,
        // including when this future is dropped during the settle delay.
        let mut graph = EngagedAudio::new(graph);
        graph.build(CompressorSettings::default(), FFT_SIZE)?;
        graph.start()?;

        tokio::time::sleep(AUDIO_SETTLE_DELAY).await;

        let bins = graph.frequency_data()?;
        let sum: u64 = bins.iter().map(|&b| u64::from(b)).sum();
        Ok(Some(format!("{:x}", sum)))
    }
}

fn hash_surface(data_url: Result<String, HostError>) -> RenderedFingerprint {
    match data_url {
        Ok(url) => RenderedFingerprint {
            hash: Some(hash_str(&url)),
            error: None,
        },
        Err(e) => RenderedFingerprint {
            hash: None,
            error: Some(e.to_string()),
        },
    }
}

fn read_gl_parameters(gl: &dyn crate::host::provider::WebGlContext) -> Result<WebGlInfo, HostError> {
    let (vendor, renderer) = if gl.has_extension(DEBUG_RENDERER_INFO) {
        (
            gl.parameter(GlParameter::UnmaskedVendor)?,
            gl.parameter(GlParameter::UnmaskedRenderer)?,
        )
    } else {
        (
            gl.parameter(GlParameter::Vendor)?,
            gl.parameter(GlParameter::Renderer)?,
        )
    };

    Ok(WebGlInfo {
        vendor,
        renderer,
        version: gl.parameter(GlParameter::Version)?,
        shading_language_version: gl.parameter(GlParameter::ShadingLanguageVersion)?,
        antialias: gl.antialias(),
        extensions: gl.supported_extensions(),
    })
}

/// Audio graph that is stopped and closed when dropped.
struct EngagedAudio {
    graph: Box<dyn AudioGraph>,
}

impl EngagedAudio {
    fn new(graph: Box<dyn AudioGraph>) -> Self {
        Self { graph }
    }
}

impl std::ops::Deref for EngagedAudio {
    type Target = dyn AudioGraph;

    fn deref(&self) -> &Self::Target {
        &*self.graph
    }
}

impl std::ops::DerefMut for EngagedAudio {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.graph
    }
}

impl Drop for EngagedAudio {
    fn drop(&mut self) {
        self.graph.stop();
        self.graph.close();
        debug!("Audio graph released");
    }
}
