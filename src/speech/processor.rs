//! Backend processor capability
//!
//! A `Processor` is one concrete synthesis implementation. The facade owns
//! exactly one at a time as a `Box<dyn Processor>`; backend quirks (process
//! exit-code semantics, direct-playback mode) stay local to each impl.

use crate::voice::{SynthesisParams, Voice};
use crate::{Result, TtsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed enumeration of synthesis backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineType {
    /// External-process neural synthesizer (`edge-tts` CLI)
    CommandLine,
    /// In-process platform speech API (`tts` crate bindings)
    Native,
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::CommandLine => write!(f, "command-line"),
            EngineType::Native => write!(f, "native"),
        }
    }
}

impl FromStr for EngineType {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "command-line" | "commandline" | "edge-tts" => Ok(EngineType::CommandLine),
            "native" | "system" => Ok(EngineType::Native),
            other => Err(TtsError::EngineUnavailable(format!(
                "unknown engine '{}'; expected 'command-line' or 'native'",
                other
            ))),
        }
    }
}

/// Result of one synthesis call.
///
/// Backends that cannot render audio to bytes speak immediately instead;
/// that is a distinct variant, not a sentinel byte buffer, so callers
/// branch on the tag rather than on buffer-size heuristics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Real encoded audio in the requested format
    Audio(Vec<u8>),
    /// The backend already played the utterance; there are no bytes
    PlayedDirectly,
}

impl SynthesisOutcome {
    pub fn is_audio(&self) -> bool {
        matches!(self, SynthesisOutcome::Audio(_))
    }

    /// The audio bytes, if this outcome carries any.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            SynthesisOutcome::Audio(bytes) => Some(bytes),
            SynthesisOutcome::PlayedDirectly => None,
        }
    }
}

/// Synthesis backend capability
///
/// All backends implement this. Methods take `&mut self` because each
/// implementation owns real resources (a native engine handle, cached
/// subprocess parameters) that calls may touch.
pub trait Processor: Send {
    /// Which engine this processor implements
    fn engine_type(&self) -> EngineType;

    /// Stable engine name used as the voice-catalog cache key
    fn name(&self) -> &str;

    /// List the voices this backend can currently synthesize
    fn list_voices(&mut self) -> Result<Vec<Voice>>;

    /// Synthesize `text` with `voice_id` into `format`
    fn synthesize(&mut self, text: &str, voice_id: &str, format: &str)
        -> Result<SynthesisOutcome>;

    /// Apply rate/pitch/volume to subsequent synthesis calls
    fn set_params(&mut self, params: &SynthesisParams) -> Result<()>;

    /// Stop any in-flight speech this backend controls
    fn stop(&mut self) -> Result<()>;
}
