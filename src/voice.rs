//! Voice catalog value types and voice-id parsing
//!
//! Voice ids follow the `<lang>-<REGION>-<Name><Quality>` convention, e.g.
//! `zh-CN-XiaoxiaoNeural`. The id is both an output (from listing) and an
//! input (to synthesis) and must round-trip unchanged.

use crate::{Result, TtsError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches a well-formed voice id: language, region, then a name segment.
/// Voices with sub-locale segments (e.g. `zh-CN-liaoning-XiaobeiNeural`)
/// also match; the name is always the last segment.
static VOICE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}-[A-Za-z0-9]{2,}(-[A-Za-z0-9]+)+$").unwrap());

/// Languages the command-line backend is known to render intelligibly.
/// Listing output is filtered to these so callers never see voices that
/// produce garbled audio.
pub static SUPPORTED_LANGUAGES: &[&str] = &[
    "zh", "en", "ja", "ko", "fr", "de", "es", "it", "ru", "pt", "ar", "hi",
];

/// Voice gender as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Parse the gender column of a voice listing. Anything unrecognized
    /// maps to `Unknown` rather than failing the line.
    pub fn from_keyword(word: &str) -> Self {
        match word.to_ascii_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// Voice quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceQuality {
    Standard,
    Neural,
}

/// A synthesizable voice exposed by a backend
///
/// Identity is `id`; the remaining fields are derived from it and from the
/// listing output. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Backend-specific identifier, e.g. `zh-CN-XiaoxiaoNeural`
    pub id: String,
    /// Human-readable name with quality suffix stripped, e.g. `Xiaoxiao`
    pub display_name: String,
    /// BCP-47-ish locale, first two segments of the id, e.g. `zh-CN`
    pub language_code: String,
    pub gender: Gender,
    pub quality: VoiceQuality,
}

impl Voice {
    /// Build a `Voice` from a well-formed id and a gender keyword.
    ///
    /// Fails with `VoiceParseError` if the id does not follow the
    /// `<lang>-<REGION>-<Name>` shape.
    pub fn from_id(id: &str, gender: Gender) -> Result<Self> {
        if !VOICE_ID_RE.is_match(id) {
            return Err(TtsError::VoiceParseError(format!(
                "voice id '{}' does not match <lang>-<REGION>-<Name>",
                id
            )));
        }

        let segments: Vec<&str> = id.split('-').collect();
        let language_code = format!("{}-{}", segments[0], segments[1]);

        // Name is the last segment; quality is encoded as its suffix.
        let name_segment = segments[segments.len() - 1];
        let (display_name, quality) = if let Some(base) = name_segment.strip_suffix("Neural") {
            (base, VoiceQuality::Neural)
        } else if let Some(base) = name_segment.strip_suffix("Standard") {
            (base, VoiceQuality::Standard)
        } else {
            (name_segment, VoiceQuality::Standard)
        };

        Ok(Voice {
            id: id.to_string(),
            display_name: display_name.to_string(),
            language_code,
            gender,
            quality,
        })
    }

    /// Whether this is a neural (model-based) voice.
    pub fn is_neural(&self) -> bool {
        self.quality == VoiceQuality::Neural
    }

    /// Bare language part of the locale, e.g. `zh` for `zh-CN`.
    pub fn language(&self) -> &str {
        self.language_code
            .split('-')
            .next()
            .unwrap_or(&self.language_code)
    }

    /// Whether this voice's language is on the supported-language list.
    pub fn is_supported_language(&self) -> bool {
        SUPPORTED_LANGUAGES.contains(&self.language())
    }
}

/// Per-call synthesis parameters
///
/// Owned by the caller and passed per call; backends never retain these as
/// hidden global state. Values outside the documented bounds are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// Speech rate multiplier, 0.5 to 2.0
    pub rate: f32,
    /// Pitch multiplier, 0.5 to 2.0
    pub pitch: f32,
    /// Volume, 0.0 to 1.0
    pub volume: f32,
}

impl SynthesisParams {
    pub fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            rate: rate.clamp(0.5, 2.0),
            pitch: pitch.clamp(0.5, 2.0),
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}
