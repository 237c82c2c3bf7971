//! Environment provider traits.
//!
//! The collector never touches a real browser directly. Everything it reads
//! comes through an [`EnvironmentProvider`], which lets the same engine run
//! against a live host bridge, a recorded host, or the
//! [`SimulatedEnvironment`](crate::host::SimulatedEnvironment) used by the CLI
//! and the tests.
//!
//! Fallible calls return [`HostError`]. The collector converts every one of
//! them into data on the record; none of them escape a collection pass.

use async_trait::async_trait;
use thiserror::Error;

use crate::fingerprint::record::{MimeTypeEntry, PluginEntry, ScreenMetrics, WindowMetrics};

/// Failure reported by a host API that exists but could not serve a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A drawing surface could not be allocated.
    #[error("Failed to create drawing surface: {0}")]
    SurfaceCreation(String),

    /// A rendered bitmap could not be serialized.
    #[error("Failed to serialize surface: {0}")]
    Serialization(String),

    /// A context parameter could not be read.
    #[error("Failed to read parameter {0}")]
    Parameter(String),

    /// Plugin or mime type enumeration failed.
    #[error("Failed to enumerate {0}")]
    Enumeration(String),

    /// The audio subsystem rejected a call.
    #[error("Audio error: {0}")]
    Audio(String),
}

/// Navigator-level identity and capability values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigatorInfo {
    pub user_agent: String,
    pub language: String,
    pub languages: Option<Vec<String>>,
    pub platform: String,
    pub do_not_track: Option<String>,
    pub cookies_enabled: bool,
    pub local_storage: bool,
    pub session_storage: bool,
    pub indexed_db: bool,
    pub add_behavior: bool,
    pub open_database: bool,
    pub cpu_class: Option<String>,
    pub hardware_concurrency: Option<u32>,
    pub device_memory: Option<f64>,
    pub max_touch_points: u32,
    pub touch_support: bool,
    pub webdriver: Option<bool>,
}

/// Resolved timezone of the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimezoneInfo {
    /// Minutes, positive west of UTC.
    pub offset: i32,
    pub name: String,
}

/// Parameters readable from a WebGL context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlParameter {
    Vendor,
    Renderer,
    Version,
    ShadingLanguageVersion,
    /// `UNMASKED_VENDOR_WEBGL`, requires `WEBGL_debug_renderer_info`.
    UnmaskedVendor,
    /// `UNMASKED_RENDERER_WEBGL`, requires `WEBGL_debug_renderer_info`.
    UnmaskedRenderer,
}

impl std::fmt::Display for GlParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GlParameter::Vendor => "VENDOR",
            GlParameter::Renderer => "RENDERER",
            GlParameter::Version => "VERSION",
            GlParameter::ShadingLanguageVersion => "SHADING_LANGUAGE_VERSION",
            GlParameter::UnmaskedVendor => "UNMASKED_VENDOR_WEBGL",
            GlParameter::UnmaskedRenderer => "UNMASKED_RENDERER_WEBGL",
        };
        f.write_str(name)
    }
}

/// 2-D drawing context of an offscreen surface.
pub trait Context2d {
    fn set_text_baseline(&mut self, baseline: &str);
    fn set_font(&mut self, font: &str);
    fn set_fill_style(&mut self, style: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

/// 3-D (WebGL) context of an offscreen surface.
pub trait WebGlContext {
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32);
    /// Clears the color buffer.
    fn clear(&mut self);
    fn parameter(&self, parameter: GlParameter) -> Result<String, HostError>;
    fn has_extension(&self, name: &str) -> bool;
    fn supported_extensions(&self) -> Vec<String>;
    /// `antialias` from the context creation attributes.
    fn antialias(&self) -> bool;
}

/// A non-displayed rendering target.
///
/// A surface hands out at most one kind of context, just like an HTML canvas:
/// once a 2-D context was obtained, asking for WebGL returns `None`.
pub trait OffscreenSurface {
    fn context_2d(&mut self) -> Option<&mut dyn Context2d>;
    fn context_webgl(&mut self) -> Option<&mut dyn WebGlContext>;
    /// Serializes the current bitmap as a data URL.
    fn to_data_url(&self) -> Result<String, HostError>;
}

/// Fixed dynamics-compressor parameters of the audio fingerprint graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold: f32,
    pub knee: f32,
    pub ratio: f32,
    pub attack: f32,
    pub release: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold: -50.0,
            knee: 40.0,
            ratio: 12.0,
            attack: 0.0,
            release: 0.25,
        }
    }
}

/// An audio context able to host the oscillator, compressor, analyser chain.
pub trait AudioGraph: Send {
    /// Wires oscillator → compressor → analyser → destination.
    fn build(&mut self, compressor: CompressorSettings, fft_size: u32) -> Result<(), HostError>;
    fn start(&mut self) -> Result<(), HostError>;
    /// Byte frequency data of the analyser, one entry per bin.
    fn frequency_data(&mut self) -> Result<Vec<u8>, HostError>;
    fn stop(&mut self);
    /// Releases the context. Must be safe to call after a failed `build`.
    fn close(&mut self);
}

/// Source of every signal the collector reads.
#[async_trait]
pub trait EnvironmentProvider: Send + Sync {
    fn navigator(&self) -> NavigatorInfo;
    fn screen(&self) -> ScreenMetrics;
    fn window(&self) -> WindowMetrics;
    fn timezone(&self) -> TimezoneInfo;
    fn plugins(&self) -> Vec<PluginEntry>;
    fn mime_types(&self) -> Result<Vec<MimeTypeEntry>, HostError>;

    /// Allocates a fresh offscreen surface scoped to the caller.
    fn create_surface(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn OffscreenSurface>, HostError>;

    /// Opens an audio context. `Ok(None)` means the host has no audio API.
    async fn open_audio(&self) -> Result<Option<Box<dyn AudioGraph>>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressor_defaults() {
        let settings = CompressorSettings::default();
        assert_eq!(settings.threshold, -50.0);
        assert_eq!(settings.knee, 40.0);
        assert_eq!(settings.ratio, 12.0);
        assert_eq!(settings.attack, 0.0);
        assert_eq!(settings.release, 0.25);
    }

    #[test]
    fn test_host_error_messages() {
        let err = HostError::Parameter(GlParameter::UnmaskedRenderer.to_string());
        assert_eq!(err.to_string(), "Failed to read parameter UNMASKED_RENDERER_WEBGL");
    }
}
