//! Integration tests for the TTS service facade
//!
//! Driven entirely through mock collaborators so they are deterministic on
//! any host: a mock factory hands out instrumented processors and a mock
//! player records what the facade asked of it.

use skald::cache::CacheManager;
use skald::platform::PlatformClass;
use skald::player::AudioPlayer;
use skald::speech::{
    EngineType, PlatformStrategy, Processor, ProcessorFactory, SynthesisOutcome,
};
use skald::voice::{Gender, SynthesisParams, Voice};
use skald::{Result, ServiceState, TtsError, TtsService};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared instrumentation counters for one mock processor.
#[derive(Default)]
struct Counters {
    list_calls: AtomicUsize,
    synth_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

struct MockProcessor {
    engine: EngineType,
    engine_name: &'static str,
    voices: Vec<Voice>,
    counters: Arc<Counters>,
    /// When set, synthesize fails with this text as backend stderr
    synth_stderr: Option<String>,
    /// When set, stop fails
    stop_fails: bool,
    /// When true, synthesize reports direct playback instead of bytes
    direct_playback: bool,
}

impl MockProcessor {
    fn new(engine: EngineType, engine_name: &'static str, counters: Arc<Counters>) -> Self {
        let voices = match engine {
            EngineType::CommandLine => vec![
                Voice::from_id("en-US-AriaNeural", Gender::Female).unwrap(),
                Voice::from_id("zh-CN-XiaoxiaoNeural", Gender::Female).unwrap(),
            ],
            EngineType::Native => vec![Voice::from_id("en-GB-LibbyNeural", Gender::Female).unwrap()],
        };
        Self {
            engine,
            engine_name,
            voices,
            counters,
            synth_stderr: None,
            stop_fails: false,
            direct_playback: false,
        }
    }
}

impl Processor for MockProcessor {
    fn engine_type(&self) -> EngineType {
        self.engine
    }

    fn name(&self) -> &str {
        self.engine_name
    }

    fn list_voices(&mut self) -> Result<Vec<Voice>> {
        self.counters.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.voices.clone())
    }

    fn synthesize(
        &mut self,
        text: &str,
        voice_id: &str,
        format: &str,
    ) -> Result<SynthesisOutcome> {
        self.counters.synth_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref stderr) = self.synth_stderr {
            return Err(TtsError::SynthesisFailed(format!(
                "edge-tts exited with 1: {}",
                stderr
            )));
        }
        if self.direct_playback {
            return Ok(SynthesisOutcome::PlayedDirectly);
        }
        Ok(SynthesisOutcome::Audio(
            format!("{}|{}|{}", text, voice_id, format).into_bytes(),
        ))
    }

    fn set_params(&mut self, _params: &SynthesisParams) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.counters.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.stop_fails {
            return Err(TtsError::SynthesisFailed("engine refused to stop".into()));
        }
        Ok(())
    }
}

type Build = Box<dyn Fn(EngineType) -> Result<Box<dyn Processor>> + Send>;

struct MockFactory {
    strategy: PlatformStrategy,
    build: Build,
}

impl MockFactory {
    fn new(build: Build) -> Self {
        Self {
            strategy: PlatformStrategy::new(PlatformClass::Desktop),
            build,
        }
    }

    fn with_strategy(strategy: PlatformStrategy, build: Build) -> Self {
        Self { strategy, build }
    }
}

impl ProcessorFactory for MockFactory {
    fn create(
        &self,
        preferred: Option<EngineType>,
        auto_fallback: bool,
    ) -> Result<Box<dyn Processor>> {
        let preferred = preferred.unwrap_or_else(|| self.strategy.preferred_engine());

        let mut candidates = vec![preferred];
        if auto_fallback {
            for engine in self.strategy.fallback_order() {
                if engine != preferred {
                    candidates.push(engine);
                }
            }
        }

        let mut tried = Vec::new();
        for engine in candidates {
            if !self.strategy.is_supported(engine) {
                tried.push(format!("{} (not supported on this platform)", engine));
                continue;
            }
            match (self.build)(engine) {
                Ok(p) => return Ok(p),
                Err(e) => tried.push(format!("{} ({})", engine, e)),
            }
        }

        Err(TtsError::EngineUnavailable(tried.join("; ")))
    }

    fn strategy(&self) -> &PlatformStrategy {
        &self.strategy
    }
}

#[derive(Default)]
struct PlayerCalls {
    plays: AtomicUsize,
    stops: AtomicUsize,
    disposes: AtomicUsize,
}

struct MockPlayer {
    calls: Arc<PlayerCalls>,
    stop_fails: bool,
}

impl AudioPlayer for MockPlayer {
    fn play_bytes(&mut self, _bytes: &[u8], _format: &str) -> Result<()> {
        self.calls.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn play_file(&mut self, _path: &Path) -> Result<()> {
        self.calls.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.calls.stops.fetch_add(1, Ordering::SeqCst);
        if self.stop_fails {
            return Err(TtsError::SynthesisFailed("player stuck".into()));
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.calls.disposes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Fixture {
    service: TtsService,
    counters: Arc<Counters>,
    player_calls: Arc<PlayerCalls>,
}

/// Service wired with one mock processor per engine sharing `counters`,
/// tweaked by `configure` after construction.
fn fixture(configure: impl Fn(&mut MockProcessor) + Send + 'static) -> Fixture {
    let counters = Arc::new(Counters::default());
    let player_calls = Arc::new(PlayerCalls::default());

    let build_counters = Arc::clone(&counters);
    let build: Build = Box::new(move |engine| {
        let name = match engine {
            EngineType::CommandLine => "edge-tts",
            EngineType::Native => "native",
        };
        let mut processor = MockProcessor::new(engine, name, Arc::clone(&build_counters));
        configure(&mut processor);
        Ok(Box::new(processor))
    });

    let service = TtsService::with_parts(
        Box::new(MockFactory::new(build)),
        Box::new(MockPlayer {
            calls: Arc::clone(&player_calls),
            stop_fails: false,
        }),
        Arc::new(CacheManager::new()),
    );

    Fixture {
        service,
        counters,
        player_calls,
    }
}

#[test]
fn test_second_synthesis_is_served_from_cache() {
    let mut fx = fixture(|_| {});
    fx.service.initialize(Some(EngineType::CommandLine), false).unwrap();

    let first = fx
        .service
        .synthesize_text("hello", "en-US-AriaNeural", "mp3")
        .unwrap();
    let second = fx
        .service
        .synthesize_text("hello", "en-US-AriaNeural", "mp3")
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fx.counters.synth_calls.load(Ordering::SeqCst), 1);

    // A different cache key reaches the backend again
    fx.service
        .synthesize_text("hello", "en-US-AriaNeural", "wav")
        .unwrap();
    assert_eq!(fx.counters.synth_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_voice_catalog_cached_per_engine() {
    let mut fx = fixture(|_| {});
    fx.service.initialize(Some(EngineType::CommandLine), false).unwrap();

    let first = fx.service.get_voices().unwrap();
    let again = fx.service.get_voices().unwrap();
    assert_eq!(first, again);
    assert_eq!(fx.counters.list_calls.load(Ordering::SeqCst), 1);
    assert!(first.iter().any(|v| v.id == "en-US-AriaNeural"));

    // Switching engines must not serve the old catalog
    fx.service.switch_engine(EngineType::Native).unwrap();
    let native_voices = fx.service.get_voices().unwrap();
    assert_eq!(native_voices.len(), 1);
    assert_eq!(native_voices[0].id, "en-GB-LibbyNeural");
    assert_eq!(fx.counters.list_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_synthesis_failure_carries_backend_stderr() {
    let mut fx = fixture(|p| {
        p.synth_stderr = Some("model not found".into());
    });
    fx.service.initialize(Some(EngineType::CommandLine), false).unwrap();

    let err = fx
        .service
        .synthesize_text("hi", "bad-voice", "mp3")
        .unwrap_err();
    assert_eq!(err.code(), "SYNTHESIS_FAILED");
    assert!(err.to_string().contains("model not found"));
}

#[test]
fn test_initialize_unsupported_engine_without_fallback() {
    // Browser-class platform supports only the native engine
    let build: Build = Box::new(|engine| {
        Ok(Box::new(MockProcessor::new(
            engine,
            "native",
            Arc::new(Counters::default()),
        )))
    });
    let factory = MockFactory::with_strategy(
        PlatformStrategy::new(PlatformClass::Browser),
        build,
    );
    let mut service = TtsService::with_parts(
        Box::new(factory),
        Box::new(MockPlayer {
            calls: Arc::new(PlayerCalls::default()),
            stop_fails: false,
        }),
        Arc::new(CacheManager::new()),
    );

    let err = service
        .initialize(Some(EngineType::CommandLine), false)
        .unwrap_err();
    assert_eq!(err.code(), "ENGINE_UNAVAILABLE");
    assert_eq!(service.state(), ServiceState::Uninitialized);
}

#[test]
fn test_failed_switch_keeps_prior_engine() {
    let counters = Arc::new(Counters::default());
    let build_counters = Arc::clone(&counters);
    let build: Build = Box::new(move |engine| match engine {
        EngineType::CommandLine => Ok(Box::new(MockProcessor::new(
            engine,
            "edge-tts",
            Arc::clone(&build_counters),
        ))),
        EngineType::Native => Err(TtsError::EngineUnavailable(
            "native speech API failed to initialize".into(),
        )),
    });

    let mut service = TtsService::with_parts(
        Box::new(MockFactory::new(build)),
        Box::new(MockPlayer {
            calls: Arc::new(PlayerCalls::default()),
            stop_fails: false,
        }),
        Arc::new(CacheManager::new()),
    );

    service.initialize(Some(EngineType::CommandLine), false).unwrap();
    let err = service.switch_engine(EngineType::Native).unwrap_err();
    assert_eq!(err.code(), "ENGINE_UNAVAILABLE");

    // Prior engine still active and functional
    assert_eq!(service.state(), ServiceState::Ready);
    assert_eq!(service.active_engine(), Some(EngineType::CommandLine));
    assert!(service
        .synthesize_text("still works", "en-US-AriaNeural", "mp3")
        .is_ok());
}

#[test]
fn test_speak_routes_audio_to_player() {
    let mut fx = fixture(|_| {});
    fx.service.initialize(Some(EngineType::CommandLine), false).unwrap();

    fx.service.speak_text("hello", "en-US-AriaNeural").unwrap();
    assert_eq!(fx.player_calls.plays.load(Ordering::SeqCst), 1);
}

#[test]
fn test_direct_playback_skips_player() {
    let mut fx = fixture(|p| {
        p.direct_playback = true;
    });
    fx.service.initialize(Some(EngineType::Native), false).unwrap();

    fx.service.speak_text("hello", "en-GB-LibbyNeural").unwrap();
    assert_eq!(fx.player_calls.plays.load(Ordering::SeqCst), 0);

    // Nothing was cached: the outcome carried no bytes
    assert_eq!(fx.service.cache().stats().audio_entries, 0);
}

#[test]
fn test_dispose_is_idempotent() {
    let mut fx = fixture(|_| {});
    fx.service.initialize(Some(EngineType::CommandLine), false).unwrap();

    assert!(fx.service.dispose().is_ok());
    assert_eq!(fx.service.state(), ServiceState::Disposed);
    let stops_after_first = fx.player_calls.stops.load(Ordering::SeqCst);

    // Second dispose raises no error and touches nothing
    assert!(fx.service.dispose().is_ok());
    assert_eq!(fx.player_calls.stops.load(Ordering::SeqCst), stops_after_first);
}

#[test]
fn test_dispose_aggregates_partial_failures() {
    let mut fx = fixture(|p| {
        p.stop_fails = true;
    });
    fx.service.initialize(Some(EngineType::CommandLine), false).unwrap();

    let err = fx.service.dispose().unwrap_err();
    assert_eq!(err.code(), "DISPOSE_PARTIAL_FAILURE");
    assert!(err.to_string().contains("engine"));

    // The failing engine stop did not prevent the player cleanup steps
    assert_eq!(fx.player_calls.stops.load(Ordering::SeqCst), 1);
    assert_eq!(fx.player_calls.disposes.load(Ordering::SeqCst), 1);
    assert_eq!(fx.counters.stop_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fx.service.state(), ServiceState::Disposed);
}

#[test]
fn test_dispose_player_failure_still_stops_engine() {
    let counters = Arc::new(Counters::default());
    let player_calls = Arc::new(PlayerCalls::default());
    let build_counters = Arc::clone(&counters);
    let build: Build = Box::new(move |engine| {
        Ok(Box::new(MockProcessor::new(
            engine,
            "edge-tts",
            Arc::clone(&build_counters),
        )))
    });

    let mut service = TtsService::with_parts(
        Box::new(MockFactory::new(build)),
        Box::new(MockPlayer {
            calls: Arc::clone(&player_calls),
            stop_fails: true,
        }),
        Arc::new(CacheManager::new()),
    );
    service.initialize(Some(EngineType::CommandLine), false).unwrap();

    let err = service.dispose().unwrap_err();
    assert_eq!(err.code(), "DISPOSE_PARTIAL_FAILURE");
    assert!(err.to_string().contains("playback"));

    // Engine cleanup still ran despite the player failure
    assert_eq!(counters.stop_calls.load(Ordering::SeqCst), 1);
}
