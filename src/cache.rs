//! Process-lifetime cache for voice catalogs and synthesized audio
//!
//! Pure key-value semantics: no eviction, no TTL. The service is scoped to
//! one running process and synthesis output is deterministic for identical
//! input, so a same-key write race is last-writer-wins and harmless.
//! Construct an instance explicitly and share it via `Arc` — there is no
//! global singleton, so tests get a fresh cache each.

use crate::voice::Voice;
use log::debug;
use std::collections::HashMap;
use std::sync::RwLock;

/// Audio cache key: the full tuple that determines synthesis output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AudioKey {
    text: String,
    voice_id: String,
    format: String,
}

/// Counts exposed for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub voice_catalogs: usize,
    pub audio_entries: usize,
    pub audio_bytes: usize,
}

/// Cache from engine name → voice catalog and (text, voice, format) → audio.
///
/// Readers and writers to distinct keys never block each other's
/// correctness; the interior `RwLock` keeps concurrent access safe.
pub struct CacheManager {
    voices: RwLock<HashMap<String, Vec<Voice>>>,
    audio: RwLock<HashMap<AudioKey, Vec<u8>>>,
}

impl CacheManager {
    pub fn new() -> Self {
        Self {
            voices: RwLock::new(HashMap::new()),
            audio: RwLock::new(HashMap::new()),
        }
    }

    /// Cached voice catalog for an engine, if one was stored.
    pub fn get_voices(&self, engine: &str) -> Option<Vec<Voice>> {
        self.voices.read().ok()?.get(engine).cloned()
    }

    pub fn put_voices(&self, engine: &str, voices: Vec<Voice>) {
        debug!("Caching {} voices for engine '{}'", voices.len(), engine);
        if let Ok(mut map) = self.voices.write() {
            map.insert(engine.to_string(), voices);
        }
    }

    /// Cached audio for a (text, voice, format) tuple, if present.
    pub fn get_audio(&self, text: &str, voice_id: &str, format: &str) -> Option<Vec<u8>> {
        let key = AudioKey {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            format: format.to_string(),
        };
        self.audio.read().ok()?.get(&key).cloned()
    }

    pub fn put_audio(&self, text: &str, voice_id: &str, format: &str, bytes: Vec<u8>) {
        debug!(
            "Caching {} bytes of {} audio for voice '{}'",
            bytes.len(),
            format,
            voice_id
        );
        let key = AudioKey {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            format: format.to_string(),
        };
        if let Ok(mut map) = self.audio.write() {
            map.insert(key, bytes);
        }
    }

    /// Drop all cached catalogs and audio.
    pub fn clear(&self) {
        if let Ok(mut map) = self.voices.write() {
            map.clear();
        }
        if let Ok(mut map) = self.audio.write() {
            map.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let voice_catalogs = self.voices.read().map(|m| m.len()).unwrap_or(0);
        let (audio_entries, audio_bytes) = self
            .audio
            .read()
            .map(|m| (m.len(), m.values().map(Vec::len).sum()))
            .unwrap_or((0, 0));
        CacheStats {
            voice_catalogs,
            audio_entries,
            audio_bytes,
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}
