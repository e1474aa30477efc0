//! Error types for skald
//!
//! The error vocabulary is closed and stable across backend swaps: callers
//! branch on the variant (or its [`TtsError::code`] string) without having
//! to inspect backend-specific message text.

use std::io;
use thiserror::Error;

/// Main error type for skald
///
/// Every variant carries a message that tells the user what to do about it,
/// not just what went wrong. Backend output (stderr, raw listings) is
/// preserved inside the message for diagnosis.
#[derive(Error, Debug)]
pub enum TtsError {
    /// Text to synthesize was empty. Never reaches a backend.
    #[error("Text to synthesize is empty; supply a non-empty string")]
    EmptyText,

    /// Voice name was empty. Never reaches a backend.
    #[error("Voice name is empty; pick one from get_voices()")]
    EmptyVoiceName,

    /// The backend ran but its voice listing was unusable. Carries stderr.
    #[error("Listing voices failed: {0}")]
    VoiceListFailed(String),

    /// Voice listing output could not be parsed.
    #[error("Could not parse voice listing: {0}")]
    VoiceParseError(String),

    /// The backend ran but produced no usable audio. Retryable.
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    /// The backend reported success but wrote no audio data.
    #[error("Synthesis reported success but wrote no audio to {0}")]
    OutputFileNotCreated(String),

    /// The requested voice is not served by the active backend.
    #[error("Voice '{voice}' not found. {hint}")]
    VoiceNotFound { voice: String, hint: String },

    /// The requested locale is known to be unsupported on this runtime.
    #[error("Locale '{0}' is not supported by the native engine on this platform; try switch_engine(EngineType::CommandLine)")]
    PlatformNotSupported(String),

    /// No audio player could be resolved on PATH.
    #[error("No audio player found (tried: {tried}). Install one, e.g.: sudo apt install mpv")]
    NoPlayerFound { tried: String },

    /// No backend could be activated during initialization.
    #[error("TTS initialization failed: {0}")]
    InitializationFailed(String),

    /// The requested engine (and any permitted fallback) is unavailable.
    #[error("No usable TTS engine: {0}")]
    EngineUnavailable(String),

    /// Programmer error: service used before initialize().
    #[error("TTS service is not initialized; call initialize() first")]
    NotInitialized,

    /// dispose() completed but some cleanup steps failed.
    #[error("Cleanup finished with failures: {0}")]
    DisposePartialFailure(String),

    /// Local I/O failure outside any backend exchange.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TtsError {
    /// Stable machine-readable code for this error kind.
    ///
    /// These strings are part of the public contract and do not change when
    /// the active backend changes.
    pub fn code(&self) -> &'static str {
        match self {
            TtsError::EmptyText => "EMPTY_TEXT",
            TtsError::EmptyVoiceName => "EMPTY_VOICE_NAME",
            TtsError::VoiceListFailed(_) => "VOICE_LIST_FAILED",
            TtsError::VoiceParseError(_) => "VOICE_PARSE_ERROR",
            TtsError::SynthesisFailed(_) => "SYNTHESIS_FAILED",
            TtsError::OutputFileNotCreated(_) => "OUTPUT_FILE_NOT_CREATED",
            TtsError::VoiceNotFound { .. } => "VOICE_NOT_FOUND",
            TtsError::PlatformNotSupported(_) => "PLATFORM_NOT_SUPPORTED",
            TtsError::NoPlayerFound { .. } => "NO_PLAYER_FOUND",
            TtsError::InitializationFailed(_) => "INITIALIZATION_FAILED",
            TtsError::EngineUnavailable(_) => "ENGINE_UNAVAILABLE",
            TtsError::NotInitialized => "NOT_INITIALIZED",
            TtsError::DisposePartialFailure(_) => "DISPOSE_PARTIAL_FAILURE",
            TtsError::Io(_) => "IO",
        }
    }

    /// Whether the caller can reasonably retry the same call unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TtsError::SynthesisFailed(_) | TtsError::OutputFileNotCreated(_) | TtsError::Io(_)
        )
    }
}

/// Result type alias for skald operations
pub type Result<T> = std::result::Result<T, TtsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(TtsError::EmptyText.code(), "EMPTY_TEXT");
        assert_eq!(
            TtsError::SynthesisFailed("x".into()).code(),
            "SYNTHESIS_FAILED"
        );
        assert_eq!(TtsError::NotInitialized.code(), "NOT_INITIALIZED");
        assert_eq!(
            TtsError::NoPlayerFound {
                tried: "mpv".into()
            }
            .code(),
            "NO_PLAYER_FOUND"
        );
    }

    #[test]
    fn test_messages_are_actionable() {
        let e = TtsError::NoPlayerFound {
            tried: "mpv, ffplay".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("mpv, ffplay"));
        assert!(msg.contains("Install"));

        let e = TtsError::VoiceNotFound {
            voice: "zz-ZZ-Nobody".into(),
            hint: "Nearby voices: zh-CN-XiaoxiaoNeural".into(),
        };
        assert!(e.to_string().contains("zh-CN-XiaoxiaoNeural"));
    }

    #[test]
    fn test_retryable() {
        assert!(TtsError::SynthesisFailed("transient".into()).is_retryable());
        assert!(!TtsError::EmptyText.is_retryable());
        assert!(!TtsError::NotInitialized.is_retryable());
    }
}
