//! Host environment abstraction.
//!
//! The collector reads every signal through the [`EnvironmentProvider`] trait.
//! This module defines that trait and its companion traits for drawing
//! surfaces and audio graphs, plus an in-memory implementation driven by
//! realistic host profiles.
//!
//! # Modules
//!
//! - `provider` - Traits the collector depends on, and [`HostError`]
//! - `profiles` - Browser/OS host profiles and GPU identities
//! - `simulated` - [`SimulatedEnvironment`], a seeded in-memory host

pub mod profiles;
pub mod provider;
pub mod simulated;

pub use profiles::{EngineFamily, GpuProfile, HostProfile};
pub use provider::{
    AudioGraph, CompressorSettings, Context2d, EnvironmentProvider, GlParameter, HostError,
    NavigatorInfo, OffscreenSurface, TimezoneInfo, WebGlContext,
};
pub use simulated::{AudioLifecycle, AudioMode, SimulatedEnvironment};
