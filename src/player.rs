//! External audio player discovery and invocation
//!
//! Synthesized audio is handed to whatever command-line player the host
//! has installed. Candidates are probed in priority order by PATH
//! resolvability and launched with just enough flags to play one file to
//! completion and exit — no GUI, no loop.

use crate::platform::resolve_on_path;
use crate::{Result, TtsError};
use log::{debug, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tempfile::NamedTempFile;

/// Known players, in priority order, with their play-one-file flags.
static CANDIDATES: &[(&str, &[&str])] = &[
    ("mpv", &["--no-video", "--really-quiet"]),
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mpg123", &["-q"]),
    ("afplay", &[]),
    ("paplay", &[]),
    ("aplay", &["-q"]),
];

/// Playback capability consumed by the service facade.
pub trait AudioPlayer: Send {
    /// Play raw audio bytes in the given format.
    fn play_bytes(&mut self, bytes: &[u8], format: &str) -> Result<()>;

    /// Play an audio file from disk.
    fn play_file(&mut self, path: &Path) -> Result<()>;

    /// Block until current playback finishes on its own. No-op when
    /// nothing is playing.
    fn wait(&mut self) -> Result<()>;

    /// Terminate current playback. Idempotent; tolerates a player that
    /// already exited.
    fn stop(&mut self) -> Result<()>;

    /// Release everything the player holds (running process, temp media).
    fn dispose(&mut self) -> Result<()>;
}

/// A playback in progress: the spawned player and, for byte playback, the
/// temp file that must outlive it.
struct Playing {
    child: Child,
    _media: Option<NamedTempFile>,
}

/// Discovers and launches an OS audio player.
pub struct PlayerLauncher {
    /// PATH probe; injectable so candidate search is unit-testable
    resolver: Box<dyn Fn(&str) -> Option<PathBuf> + Send>,

    /// Player name to try before the built-in priority order
    preferred: Option<String>,

    playing: Option<Playing>,
}

impl PlayerLauncher {
    pub fn new() -> Self {
        Self::with_resolver(Box::new(|name| resolve_on_path(name)))
    }

    /// Build with a custom PATH resolver (tests inject a fake here).
    pub fn with_resolver(resolver: Box<dyn Fn(&str) -> Option<PathBuf> + Send>) -> Self {
        Self {
            resolver,
            preferred: None,
            playing: None,
        }
    }

    /// Try this player name first, ahead of the built-in order.
    pub fn prefer(&mut self, name: &str) {
        self.preferred = Some(name.to_string());
    }

    /// First resolvable candidate, with its argument conventions.
    fn find_player(&self) -> Result<(PathBuf, &'static [&'static str])> {
        if let Some(ref name) = self.preferred {
            if let Some(path) = (self.resolver)(name) {
                let args = CANDIDATES
                    .iter()
                    .find(|&&(candidate, _)| candidate == name)
                    .map(|&(_, args)| args)
                    .unwrap_or(&[]);
                return Ok((path, args));
            }
            warn!("Preferred player '{}' not found on PATH", name);
        }

        for &(name, args) in CANDIDATES {
            if let Some(path) = (self.resolver)(name) {
                debug!("Using audio player {:?}", path);
                return Ok((path, args));
            }
        }

        let tried: Vec<&str> = CANDIDATES.iter().map(|&(name, _)| name).collect();
        Err(TtsError::NoPlayerFound {
            tried: tried.join(", "),
        })
    }

    fn spawn(&mut self, path: &Path, media: Option<NamedTempFile>) -> Result<()> {
        // One playback at a time; a new play call supersedes the old one
        self.stop()?;

        let (player, args) = self.find_player()?;
        debug!("Launching {:?} for {:?}", player, path);

        let child = Command::new(&player)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(TtsError::Io)?;

        self.playing = Some(Playing {
            child,
            _media: media,
        });
        Ok(())
    }
}

impl Default for PlayerLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer for PlayerLauncher {
    fn play_bytes(&mut self, bytes: &[u8], format: &str) -> Result<()> {
        // The file has to outlive the player process, so it is owned by
        // the launcher rather than a with_temp_file scope.
        let mut media = tempfile::Builder::new()
            .prefix("skald-play-")
            .suffix(&format!(".{}", format))
            .tempfile()?;
        media.write_all(bytes)?;
        media.flush()?;

        let path = media.path().to_path_buf();
        self.spawn(&path, Some(media))
    }

    fn play_file(&mut self, path: &Path) -> Result<()> {
        self.spawn(path, None)
    }

    fn wait(&mut self) -> Result<()> {
        if let Some(mut playing) = self.playing.take() {
            debug!("Waiting for audio player to finish");
            playing.child.wait()?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(mut playing) = self.playing.take() {
            debug!("Stopping audio player");
            match playing.child.kill() {
                Ok(()) => {
                    let _ = playing.child.wait(); // reap, no zombie
                }
                Err(e) => {
                    // Already exited on its own
                    debug!("Player process was already gone: {}", e);
                    let _ = playing.child.wait();
                }
            }
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        // Stopping drops the Playing entry, which releases the temp media
        self.stop()
    }
}

impl Drop for PlayerLauncher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
