//! Platform → engine mapping
//!
//! A pure function of platform facts: no probing, no I/O. Desktop hosts
//! prefer the command-line backend for its neural voice quality and fall
//! back to the native API; mobile and browser-class hosts can only use the
//! native API.

use crate::platform::PlatformClass;
use crate::speech::EngineType;
use std::collections::HashMap;

/// Fixed engine-selection policy for one platform class.
#[derive(Debug, Clone, Copy)]
pub struct PlatformStrategy {
    class: PlatformClass,
}

impl PlatformStrategy {
    /// Strategy for an explicit platform class (tests drive tables here).
    pub fn new(class: PlatformClass) -> Self {
        Self { class }
    }

    /// Strategy for the running host.
    pub fn current() -> Self {
        Self::new(PlatformClass::detect())
    }

    pub fn platform_class(&self) -> PlatformClass {
        self.class
    }

    /// The engine to try first on this platform.
    pub fn preferred_engine(&self) -> EngineType {
        match self.class {
            PlatformClass::Desktop => EngineType::CommandLine,
            PlatformClass::Mobile | PlatformClass::Browser => EngineType::Native,
        }
    }

    /// All supported engines, preferred first.
    pub fn fallback_order(&self) -> Vec<EngineType> {
        match self.class {
            PlatformClass::Desktop => vec![EngineType::CommandLine, EngineType::Native],
            PlatformClass::Mobile | PlatformClass::Browser => vec![EngineType::Native],
        }
    }

    pub fn is_supported(&self, engine: EngineType) -> bool {
        self.fallback_order().contains(&engine)
    }

    /// Static per-engine configuration defaults.
    pub fn engine_config(&self, engine: EngineType) -> HashMap<&'static str, String> {
        let mut config = HashMap::new();
        match engine {
            EngineType::CommandLine => {
                config.insert("binary", "edge-tts".to_string());
                config.insert("default_voice", "en-US-AriaNeural".to_string());
                config.insert("default_format", "mp3".to_string());
            }
            EngineType::Native => {
                config.insert("playback", "direct".to_string());
                config.insert("default_format", "wav".to_string());
            }
        }
        config
    }
}

impl Default for PlatformStrategy {
    fn default() -> Self {
        Self::current()
    }
}
