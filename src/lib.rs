//! skald - unified text-to-speech facade
//!
//! One "speak text, return audio" contract over interchangeable synthesis
//! backends: an external-process neural synthesizer (edge-tts) and the
//! host's native speech API. Backend selection is platform-aware with
//! automatic fallback; voice catalogs and synthesized audio are cached for
//! the life of the process.

pub mod cache;
pub mod config;
pub mod error;
pub mod platform;
pub mod player;
pub mod resource;
pub mod service;
pub mod speech;
pub mod voice;

pub use error::{Result, TtsError};
pub use service::{ServiceState, TtsService, DEFAULT_FORMAT};
pub use speech::{EngineFactory, EngineType, PlatformStrategy, Processor, ProcessorFactory, SynthesisOutcome};
pub use voice::{Gender, SynthesisParams, Voice, VoiceQuality};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "skald";
