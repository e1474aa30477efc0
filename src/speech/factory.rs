//! Engine construction and fallback
//!
//! The factory turns the platform strategy's fixed preference order into a
//! live processor: probe, instantiate, fall through to the next candidate,
//! and aggregate an actionable error when everything fails.

use crate::platform::resolve_on_path;
use crate::speech::backends::{CommandLineProcessor, NativeProcessor};
use crate::speech::{EngineType, PlatformStrategy, Processor};
use crate::{Result, TtsError};
use log::info;

/// Seam for processor construction so the facade can be driven by mocks.
pub trait ProcessorFactory: Send {
    /// Build a processor for `preferred` (or the platform's preferred
    /// engine when `None`), walking the fallback order when permitted.
    fn create(
        &self,
        preferred: Option<EngineType>,
        auto_fallback: bool,
    ) -> Result<Box<dyn Processor>>;

    fn strategy(&self) -> &PlatformStrategy;
}

/// Constructs processors according to a [`PlatformStrategy`].
pub struct EngineFactory {
    strategy: PlatformStrategy,
}

impl EngineFactory {
    pub fn new(strategy: PlatformStrategy) -> Self {
        Self { strategy }
    }

    /// Lightweight availability probe.
    ///
    /// The command-line engine is available when its binary resolves on
    /// PATH (resolution only, no subprocess — a failed probe cannot leak a
    /// handle); the native engine when the platform speech API initializes.
    pub fn is_engine_available(&self, engine: EngineType) -> bool {
        if !self.strategy.is_supported(engine) {
            return false;
        }
        match engine {
            EngineType::CommandLine => {
                let config = self.strategy.engine_config(engine);
                let binary = config
                    .get("binary")
                    .map(String::as_str)
                    .unwrap_or("edge-tts");
                resolve_on_path(binary).is_some()
            }
            EngineType::Native => NativeProcessor::new(self.strategy.platform_class()).is_ok(),
        }
    }

    fn instantiate(&self, engine: EngineType) -> Result<Box<dyn Processor>> {
        match engine {
            EngineType::CommandLine => {
                let config = self.strategy.engine_config(engine);
                let binary = config
                    .get("binary")
                    .map(String::as_str)
                    .unwrap_or("edge-tts");
                Ok(Box::new(CommandLineProcessor::new(binary)?))
            }
            EngineType::Native => Ok(Box::new(NativeProcessor::new(
                self.strategy.platform_class(),
            )?)),
        }
    }
}

impl Default for EngineFactory {
    fn default() -> Self {
        Self::new(PlatformStrategy::current())
    }
}

impl ProcessorFactory for EngineFactory {
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
                info!("Engine {} is not supported on this platform", engine);
                tried.push(format!("{} (not supported on this platform)", engine));
                continue;
            }

            match self.instantiate(engine) {
                Ok(processor) => {
                    info!("Initialized {} engine", engine);
                    return Ok(processor);
                }
                Err(e) => {
                    info!("Engine {} unavailable: {}", engine, e);
                    tried.push(format!("{} ({})", engine, e));
                }
            }
        }

        Err(TtsError::EngineUnavailable(format!(
            "no synthesis engine could be initialized. Tried: {}",
            tried.join("; ")
        )))
    }

    fn strategy(&self) -> &PlatformStrategy {
        &self.strategy
    }
}
