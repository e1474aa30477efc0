//! Configuration management
//!
//! Settings live in `~/.skald.cfg` (INI format). The library never reads
//! this implicitly — only the CLI and embedders that opt in do — so
//! library behavior stays a pure function of its arguments.

use crate::speech::EngineType;
use crate::voice::SynthesisParams;
use crate::{Result, TtsError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Application configuration
///
/// Sections: `[engine]` (preferred, auto_fallback), `[speech]` (voice,
/// rate, pitch, volume, format), `[player]` (preferred).
pub struct Config {
    ini: Ini,
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it with
    /// defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load from an explicit path (tests point this at a temp dir).
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path).map_err(|e| {
                TtsError::InitializationFailed(format!(
                    "config file {} is invalid: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            info!("Config file not found, creating default at {:?}", path);
            let default = Self::default_config();
            default.write_to_file(&path).map_err(|e| {
                TtsError::InitializationFailed(format!(
                    "could not write default config to {}: {}",
                    path.display(),
                    e
                ))
            })?;
            default
        };

        Ok(Self { ini, path })
    }

    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini.write_to_file(&self.path).map_err(|e| {
            TtsError::InitializationFailed(format!(
                "could not save config to {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Config file location (`~/.skald.cfg`)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skald.cfg")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("engine"))
            .set("preferred", "command-line")
            .set("auto_fallback", "true");

        ini.with_section(Some("speech"))
            .set("voice", "en-US-AriaNeural")
            .set("format", "mp3")
            .set("rate", "1.0")
            .set("pitch", "1.0")
            .set("volume", "1.0");

        ini.with_section(Some("player")).set("preferred", "");

        ini
    }

    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini.section(Some(section))?.get(key)
    }

    fn get_f32(&self, section: &str, key: &str, default: f32) -> f32 {
        self.get(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Preferred engine, if the config names a valid one.
    pub fn preferred_engine(&self) -> Option<EngineType> {
        self.get("engine", "preferred")?.parse().ok()
    }

    pub fn auto_fallback(&self) -> bool {
        self.get("engine", "auto_fallback")
            .map(|v| v != "false")
            .unwrap_or(true)
    }

    pub fn default_voice(&self) -> String {
        self.get("speech", "voice")
            .unwrap_or("en-US-AriaNeural")
            .to_string()
    }

    pub fn default_format(&self) -> String {
        self.get("speech", "format").unwrap_or("mp3").to_string()
    }

    pub fn params(&self) -> SynthesisParams {
        SynthesisParams::new(
            self.get_f32("speech", "rate", 1.0),
            self.get_f32("speech", "pitch", 1.0),
            self.get_f32("speech", "volume", 1.0),
        )
    }

    /// Preferred audio player, if configured non-empty.
    pub fn preferred_player(&self) -> Option<String> {
        self.get("player", "preferred")
            .filter(|v| !v.is_empty())
            .map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("skald.cfg")).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults_created_on_first_load() {
        let (_dir, config) = temp_config();
        assert!(config.path().exists());
        assert_eq!(config.preferred_engine(), Some(EngineType::CommandLine));
        assert!(config.auto_fallback());
        assert_eq!(config.default_voice(), "en-US-AriaNeural");
        assert_eq!(config.default_format(), "mp3");
        assert!(config.preferred_player().is_none());
    }

    #[test]
    fn test_default_params() {
        let (_dir, config) = temp_config();
        let params = config.params();
        assert_eq!(params.rate, 1.0);
        assert_eq!(params.pitch, 1.0);
        assert_eq!(params.volume, 1.0);
    }

    #[test]
    fn test_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skald.cfg");

        let mut first = Config::load_from(path.clone()).unwrap();
        first
            .ini
            .with_section(Some("speech"))
            .set("rate", "1.5")
            .set("voice", "zh-CN-XiaoxiaoNeural");
        first.ini.with_section(Some("player")).set("preferred", "mpv");
        first.save().unwrap();

        let second = Config::load_from(path).unwrap();
        assert_eq!(second.params().rate, 1.5);
        assert_eq!(second.default_voice(), "zh-CN-XiaoxiaoNeural");
        assert_eq!(second.preferred_player(), Some("mpv".to_string()));
    }

    #[test]
    fn test_invalid_engine_name_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skald.cfg");

        let mut config = Config::load_from(path).unwrap();
        config
            .ini
            .with_section(Some("engine"))
            .set("preferred", "nonsense");
        assert!(config.preferred_engine().is_none());
    }
}
