//! In-process backend using the platform speech API
//!
//! Built on the `tts` crate, which binds Speech Dispatcher on Linux,
//! AVFoundation on macOS/iOS, and WinRT on Windows. None of those bindings
//! expose a render-to-file surface, so this backend always operates in
//! direct-playback mode: synthesize speaks immediately and returns
//! [`SynthesisOutcome::PlayedDirectly`].

use crate::platform::PlatformClass;
use crate::speech::{EngineType, Processor, SynthesisOutcome};
use crate::voice::{Gender, SynthesisParams, Voice, VoiceQuality};
use crate::{Result, TtsError};
use log::{debug, warn};
use tts::Tts as TtsCrate;

/// Engine name, also the voice-catalog cache key for this backend.
pub const ENGINE_NAME: &str = "native";

/// Locales whose voices constrained runtimes advertise but cannot render.
/// Requests for these fail with `PlatformNotSupported` rather than a
/// misleading not-found.
static DENIED_LOCALES: &[&str] = &["ar-SA", "hi-IN", "th-TH"];

/// Native platform speech backend
pub struct NativeProcessor {
    /// The tts crate's engine handle
    tts: TtsCrate,

    /// Host class; gates the constrained-runtime locale deny-list
    class: PlatformClass,
}

impl NativeProcessor {
    /// Create the backend, initializing the platform speech engine.
    pub fn new(class: PlatformClass) -> Result<Self> {
        debug!("Initializing native speech backend");

        let tts = TtsCrate::default().map_err(|e| {
            TtsError::EngineUnavailable(format!(
                "native speech API failed to initialize: {}. On Linux install it with: sudo apt install speech-dispatcher",
                e
            ))
        })?;

        Ok(Self { tts, class })
    }

    /// Whether a locale is deny-listed on this host class.
    fn is_denied(class: PlatformClass, locale: &str) -> bool {
        class != PlatformClass::Desktop && DENIED_LOCALES.contains(&locale)
    }

    /// Locale part of a requested voice id: first two hyphen segments, or
    /// the whole string when it has no region.
    fn locale_of(voice_id: &str) -> String {
        let mut segments = voice_id.split('-');
        match (segments.next(), segments.next()) {
            (Some(lang), Some(region)) => format!("{}-{}", lang, region),
            _ => voice_id.to_string(),
        }
    }

    /// Pick a native voice for the requested id: exact match first, then
    /// locale prefix, then bare language.
    fn select_voice(voices: &[tts::Voice], requested: &str) -> Option<usize> {
        if let Some(i) = voices.iter().position(|v| v.id() == requested) {
            return Some(i);
        }

        let locale = Self::locale_of(requested);
        if let Some(i) = voices.iter().position(|v| {
            let lang = v.language().to_string();
            lang == locale || v.id().starts_with(&locale)
        }) {
            return Some(i);
        }

        let bare = locale.split('-').next().unwrap_or(&locale).to_string();
        voices
            .iter()
            .position(|v| v.language().to_string().starts_with(&bare))
    }

    /// Map a 0.5–2.0 factor onto the engine's min/normal/max scale.
    /// Factors below 1.0 interpolate normal→min, above 1.0 normal→max;
    /// a plain multiply breaks on engines whose normal is zero.
    fn scale_factor(factor: f32, min: f32, normal: f32, max: f32) -> f32 {
        if factor >= 1.0 {
            normal + (max - normal) * (factor - 1.0).min(1.0)
        } else {
            min + (normal - min) * ((factor - 0.5) / 0.5).max(0.0)
        }
    }

    fn to_voice(v: &tts::Voice) -> Voice {
        let gender = match v.gender() {
            Some(tts::Gender::Male) => Gender::Male,
            Some(tts::Gender::Female) => Gender::Female,
            None => Gender::Unknown,
        };

        // Native voice ids follow each platform's own convention; parse
        // ours where it matches and fall back to the raw fields elsewhere.
        Voice::from_id(&v.id(), gender).unwrap_or_else(|_| {
            let name = v.name();
            let quality = if name.contains("Neural") {
                VoiceQuality::Neural
            } else {
                VoiceQuality::Standard
            };
            Voice {
                id: v.id(),
                display_name: name,
                language_code: v.language().to_string(),
                gender,
                quality,
            }
        })
    }

    /// Not-found hint naming voices in the same language, when any exist.
    fn not_found_hint(voices: &[tts::Voice], requested: &str) -> String {
        let bare = Self::locale_of(requested)
            .split('-')
            .next()
            .unwrap_or_default()
            .to_string();
        let nearby: Vec<String> = voices
            .iter()
            .filter(|v| v.language().to_string().starts_with(&bare))
            .take(5)
            .map(|v| v.id())
            .collect();

        if nearby.is_empty() {
            let sample: Vec<String> = voices.iter().take(5).map(|v| v.id()).collect();
            format!("Available voices include: {}", sample.join(", "))
        } else {
            format!("Nearby voices: {}", nearby.join(", "))
        }
    }
}

impl Processor for NativeProcessor {
    fn engine_type(&self) -> EngineType {
        EngineType::Native
    }

    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn list_voices(&mut self) -> Result<Vec<Voice>> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| TtsError::VoiceListFailed(format!("native voice listing: {}", e)))?;

        debug!("Native engine reports {} voices", voices.len());
        Ok(voices.iter().map(Self::to_voice).collect())
    }

    fn synthesize(
        &mut self,
        text: &str,
        voice_id: &str,
        _format: &str,
    ) -> Result<SynthesisOutcome> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }
        if voice_id.trim().is_empty() {
            return Err(TtsError::EmptyVoiceName);
        }

        let locale = Self::locale_of(voice_id);
        if Self::is_denied(self.class, &locale) {
            return Err(TtsError::PlatformNotSupported(locale));
        }

        let voices = self
            .tts
            .voices()
            .map_err(|e| TtsError::SynthesisFailed(format!("native voice lookup: {}", e)))?;

        let index = Self::select_voice(&voices, voice_id).ok_or_else(|| TtsError::VoiceNotFound {
            voice: voice_id.to_string(),
            hint: Self::not_found_hint(&voices, voice_id),
        })?;

        self.tts
            .set_voice(&voices[index])
            .map_err(|e| TtsError::SynthesisFailed(format!("selecting voice: {}", e)))?;

        debug!(
            "Speaking directly with native voice '{}' (requested '{}')",
            voices[index].id(),
            voice_id
        );
        self.tts
            .speak(text, true)
            .map_err(|e| TtsError::SynthesisFailed(format!("native speak: {}", e)))?;

        Ok(SynthesisOutcome::PlayedDirectly)
    }

    fn set_params(&mut self, params: &SynthesisParams) -> Result<()> {
        let features = self.tts.supported_features();

        if features.rate {
            let rate = Self::scale_factor(
                params.rate,
                self.tts.min_rate(),
                self.tts.normal_rate(),
                self.tts.max_rate(),
            );
            self.tts
                .set_rate(rate)
                .map_err(|e| TtsError::SynthesisFailed(format!("setting rate: {}", e)))?;
        } else {
            warn!("Rate control not supported on this platform");
        }

        if features.pitch {
            let pitch = Self::scale_factor(
                params.pitch,
                self.tts.min_pitch(),
                self.tts.normal_pitch(),
                self.tts.max_pitch(),
            );
            self.tts
                .set_pitch(pitch)
                .map_err(|e| TtsError::SynthesisFailed(format!("setting pitch: {}", e)))?;
        } else {
            warn!("Pitch control not supported on this platform");
        }

        if features.volume {
            let min = self.tts.min_volume();
            let max = self.tts.max_volume();
            let volume = min + (max - min) * params.volume;
            self.tts
                .set_volume(volume)
                .map_err(|e| TtsError::SynthesisFailed(format!("setting volume: {}", e)))?;
        } else {
            warn!("Volume control not supported on this platform");
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Stopping native speech");
        self.tts
            .stop()
            .map_err(|e| TtsError::SynthesisFailed(format!("native stop: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_of() {
        assert_eq!(NativeProcessor::locale_of("zh-CN-XiaoxiaoNeural"), "zh-CN");
        assert_eq!(NativeProcessor::locale_of("en-US-AriaNeural"), "en-US");
        assert_eq!(NativeProcessor::locale_of("en"), "en");
    }

    #[test]
    fn test_deny_list_is_desktop_exempt() {
        assert!(!NativeProcessor::is_denied(PlatformClass::Desktop, "ar-SA"));
        assert!(NativeProcessor::is_denied(PlatformClass::Mobile, "ar-SA"));
        assert!(NativeProcessor::is_denied(PlatformClass::Browser, "th-TH"));
        assert!(!NativeProcessor::is_denied(PlatformClass::Mobile, "en-US"));
    }

    #[test]
    fn test_scale_factor_endpoints() {
        // speechd-style scale where normal sits at zero
        assert_eq!(NativeProcessor::scale_factor(1.0, -100.0, 0.0, 100.0), 0.0);
        assert_eq!(NativeProcessor::scale_factor(2.0, -100.0, 0.0, 100.0), 100.0);
        assert_eq!(
            NativeProcessor::scale_factor(0.5, -100.0, 0.0, 100.0),
            -100.0
        );
    }

    #[test]
    fn test_scale_factor_midpoints() {
        let up = NativeProcessor::scale_factor(1.5, 0.0, 1.0, 3.0);
        assert!((up - 2.0).abs() < 1e-6);
        let down = NativeProcessor::scale_factor(0.75, 0.0, 1.0, 3.0);
        assert!((down - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_create_native_backend() {
        // May fail on hosts without a speech engine; both outcomes are fine
        match NativeProcessor::new(PlatformClass::detect()) {
            Ok(_) => println!("native backend initialized"),
            Err(e) => println!("native backend unavailable: {}", e),
        }
    }
}
