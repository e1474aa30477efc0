//! TTS service facade
//!
//! Owns the active processor, the audio player, and the cache, and exposes
//! the one public contract callers see: initialize, list voices,
//! synthesize, speak, switch engine, stop, dispose.
//!
//! All operations take `&mut self`, so a `switch_engine` or `dispose` can
//! never interleave with an in-flight synthesis call against the processor
//! being replaced: in-flight calls drain first, by construction.

use crate::cache::CacheManager;
use crate::player::{AudioPlayer, PlayerLauncher};
use crate::speech::{EngineFactory, EngineType, ProcessorFactory, SynthesisOutcome};
use crate::voice::{SynthesisParams, Voice};
use crate::{Result, TtsError};
use log::{debug, info, warn};
use std::sync::Arc;

/// Audio format used when the caller does not specify one.
pub const DEFAULT_FORMAT: &str = "mp3";

/// Facade lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Initializing,
    Ready,
    Switching,
    Disposed,
}

/// Text-to-speech service facade
pub struct TtsService {
    factory: Box<dyn ProcessorFactory>,
    player: Box<dyn AudioPlayer>,
    cache: Arc<CacheManager>,
    processor: Option<Box<dyn crate::speech::Processor>>,
    state: ServiceState,
}

impl TtsService {
    /// Service wired for the running host.
    pub fn new() -> Self {
        Self::with_parts(
            Box::new(EngineFactory::default()),
            Box::new(PlayerLauncher::new()),
            Arc::new(CacheManager::new()),
        )
    }

    /// Service with explicit collaborators (tests pass mocks; embedders
    /// can share one cache across services).
    pub fn with_parts(
        factory: Box<dyn ProcessorFactory>,
        player: Box<dyn AudioPlayer>,
        cache: Arc<CacheManager>,
    ) -> Self {
        Self {
            factory,
            player,
            cache,
            processor: None,
            state: ServiceState::Uninitialized,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Engine of the active processor, if one is active.
    pub fn active_engine(&self) -> Option<EngineType> {
        self.processor.as_ref().map(|p| p.engine_type())
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Activate a processor, walking the platform fallback order when
    /// `auto_fallback` permits.
    ///
    /// On failure the service returns to `Uninitialized`:
    /// `EngineUnavailable` when no engine could be activated, otherwise
    /// `InitializationFailed`.
    pub fn initialize(
        &mut self,
        preferred: Option<EngineType>,
        auto_fallback: bool,
    ) -> Result<()> {
        match self.state {
            ServiceState::Disposed => Err(TtsError::InitializationFailed(
                "service has been disposed; construct a new one".into(),
            )),
            ServiceState::Ready => {
                debug!("initialize() called on a ready service; keeping current engine");
                Ok(())
            }
            _ => {
                self.state = ServiceState::Initializing;
                match self.factory.create(preferred, auto_fallback) {
                    Ok(processor) => {
                        info!("TTS service ready with {} engine", processor.engine_type());
                        self.processor = Some(processor);
                        self.state = ServiceState::Ready;
                        Ok(())
                    }
                    Err(e) => {
                        self.state = ServiceState::Uninitialized;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Voice catalog of the active engine, cache-first.
    pub fn get_voices(&mut self) -> Result<Vec<Voice>> {
        let processor = match (&self.state, self.processor.as_mut()) {
            (ServiceState::Ready, Some(p)) => p,
            _ => return Err(TtsError::NotInitialized),
        };

        let engine = processor.name().to_string();
        if let Some(voices) = self.cache.get_voices(&engine) {
            debug!("Voice catalog for '{}' served from cache", engine);
            return Ok(voices);
        }

        let voices = processor.list_voices()?;
        self.cache.put_voices(&engine, voices.clone());
        Ok(voices)
    }

    /// Synthesize text, cache-first. Only real audio outcomes are cached;
    /// direct playback produces no bytes to store.
    pub fn synthesize_text(
        &mut self,
        text: &str,
        voice_id: &str,
        format: &str,
    ) -> Result<SynthesisOutcome> {
        let processor = match (&self.state, self.processor.as_mut()) {
            (ServiceState::Ready, Some(p)) => p,
            _ => return Err(TtsError::NotInitialized),
        };

        if let Some(bytes) = self.cache.get_audio(text, voice_id, format) {
            debug!("Audio for voice '{}' served from cache", voice_id);
            return Ok(SynthesisOutcome::Audio(bytes));
        }

        let outcome = processor.synthesize(text, voice_id, format)?;
        if let SynthesisOutcome::Audio(ref bytes) = outcome {
            self.cache.put_audio(text, voice_id, format, bytes.clone());
        }
        Ok(outcome)
    }

    /// Synthesize and play: audio bytes go to the external player; a
    /// direct-playback outcome already made sound and needs nothing more.
    pub fn speak_text(&mut self, text: &str, voice_id: &str) -> Result<()> {
        match self.synthesize_text(text, voice_id, DEFAULT_FORMAT)? {
            SynthesisOutcome::Audio(bytes) => self.player.play_bytes(&bytes, DEFAULT_FORMAT),
            SynthesisOutcome::PlayedDirectly => Ok(()),
        }
    }

    /// Apply rate/pitch/volume to the active processor.
    pub fn set_params(&mut self, params: &SynthesisParams) -> Result<()> {
        match (&self.state, self.processor.as_mut()) {
            (ServiceState::Ready, Some(p)) => p.set_params(params),
            _ => Err(TtsError::NotInitialized),
        }
    }

    /// Replace the active engine.
    ///
    /// The new processor is built first; the old one is stopped and
    /// dropped only once the new one exists. If construction fails the
    /// prior engine stays active and the error is returned.
    pub fn switch_engine(&mut self, new_type: EngineType) -> Result<()> {
        if self.state != ServiceState::Ready {
            return Err(TtsError::NotInitialized);
        }
        if self.active_engine() == Some(new_type) {
            debug!("switch_engine: {} already active", new_type);
            return Ok(());
        }

        self.state = ServiceState::Switching;
        match self.factory.create(Some(new_type), false) {
            Ok(new_processor) => {
                if let Some(mut old) = self.processor.take() {
                    if let Err(e) = old.stop() {
                        warn!("Stopping outgoing {} engine failed: {}", old.name(), e);
                    }
                }
                info!("Switched to {} engine", new_type);
                self.processor = Some(new_processor);
                self.state = ServiceState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("Engine switch to {} failed, keeping current engine", new_type);
                self.state = ServiceState::Ready;
                Err(e)
            }
        }
    }

    /// Block until any playback started by `speak_text` has finished.
    pub fn wait_for_playback(&mut self) -> Result<()> {
        self.player.wait()
    }

    /// Stop playback and the active processor's speech.
    pub fn stop(&mut self) -> Result<()> {
        let player_result = self.player.stop();
        if let Some(processor) = self.processor.as_mut() {
            processor.stop()?;
        }
        player_result
    }

    /// Release everything, best-effort.
    ///
    /// Every cleanup step runs regardless of earlier failures; failures
    /// are collected into a single `DisposePartialFailure`. Calling
    /// dispose twice is a no-op.
    pub fn dispose(&mut self) -> Result<()> {
        if self.state == ServiceState::Disposed {
            debug!("dispose() called on a disposed service");
            return Ok(());
        }

        let mut failures = Vec::new();

        if let Err(e) = self.player.stop() {
            failures.push(format!("stopping playback: {}", e));
        }
        if let Err(e) = self.player.dispose() {
            failures.push(format!("disposing audio player: {}", e));
        }
        if let Some(mut processor) = self.processor.take() {
            if let Err(e) = processor.stop() {
                failures.push(format!("stopping {} engine: {}", processor.name(), e));
            }
        }

        self.state = ServiceState::Disposed;

        if failures.is_empty() {
            Ok(())
        } else {
            let summary = failures.join("; ");
            warn!("Dispose finished with failures: {}", summary);
            Err(TtsError::DisposePartialFailure(summary))
        }
    }
}

impl Default for TtsService {
    fn default() -> Self {
        Self::new()
    }
}
