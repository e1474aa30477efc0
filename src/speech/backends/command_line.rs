//! External-process backend using the edge-tts CLI
//!
//! edge-tts is invoked once per operation: `--list-voices` for the catalog,
//! `--voice <id> --text <text> --write-media <path>` for synthesis. Exit
//! code and stderr are the only failure-signalling channels the tool
//! defines; stdout carries the voice listing.

use crate::platform::resolve_on_path;
use crate::resource::with_temp_file;
use crate::speech::{EngineType, Processor, SynthesisOutcome};
use crate::voice::{Gender, SynthesisParams, Voice};
use crate::{Result, TtsError};
use log::{debug, warn};
use std::fs;
use std::process::Command;

/// Engine name, also the voice-catalog cache key for this backend.
pub const ENGINE_NAME: &str = "edge-tts";

/// External-process synthesis backend
///
/// Stateless per invocation: each call spawns one short-lived process and
/// waits for it to exit. The only retained state is the resolved binary
/// path and the caller's synthesis parameters.
pub struct CommandLineProcessor {
    /// Resolved path to the edge-tts binary
    tool: String,

    /// Parameters applied to subsequent synthesize calls
    params: SynthesisParams,
}

impl CommandLineProcessor {
    /// Create the backend, resolving the tool on PATH.
    ///
    /// `binary` is the tool name from the engine config map (normally
    /// `edge-tts`).
    pub fn new(binary: &str) -> Result<Self> {
        let tool = resolve_on_path(binary).ok_or_else(|| {
            TtsError::EngineUnavailable(format!(
                "'{}' not found on PATH. Install with: pip install edge-tts",
                binary
            ))
        })?;
        debug!("Found {} at {:?}", binary, tool);

        Ok(Self {
            tool: tool.to_string_lossy().into_owned(),
            params: SynthesisParams::default(),
        })
    }

    /// Parse `--list-voices` output into voices.
    ///
    /// The format is tabular: first column the voice id, second the gender.
    /// Header and separator lines are skipped; malformed lines are dropped
    /// silently; voices outside the supported-language list are filtered.
    fn parse_listing(output: &str) -> Vec<Voice> {
        let mut voices = Vec::new();

        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("Name") || line.starts_with('-') {
                continue;
            }

            let mut columns = line.split_whitespace();
            let (Some(id), Some(gender_word)) = (columns.next(), columns.next()) else {
                continue;
            };

            let gender = Gender::from_keyword(gender_word);
            match Voice::from_id(id, gender) {
                Ok(voice) if voice.is_supported_language() => voices.push(voice),
                Ok(_) => {}
                Err(e) => debug!("Skipping unparseable listing line '{}': {}", line, e),
            }
        }

        voices
    }

    /// Rate factor → edge-tts `--rate` argument, e.g. 1.25 → `+25%`.
    fn rate_arg(rate: f32) -> String {
        format!("{:+.0}%", (rate - 1.0) * 100.0)
    }

    /// Volume 0.0–1.0 → edge-tts `--volume` argument, e.g. 0.8 → `-20%`.
    fn volume_arg(volume: f32) -> String {
        format!("{:+.0}%", (volume - 1.0) * 100.0)
    }

    /// Pitch factor → edge-tts `--pitch` argument, e.g. 1.1 → `+10Hz`.
    fn pitch_arg(pitch: f32) -> String {
        format!("{:+.0}Hz", (pitch - 1.0) * 100.0)
    }

    fn run_tool(&self, args: &[&str]) -> std::io::Result<std::process::Output> {
        debug!("Running {} {:?}", self.tool, args);
        Command::new(&self.tool).args(args).output()
    }
}

impl Processor for CommandLineProcessor {
    fn engine_type(&self) -> EngineType {
        EngineType::CommandLine
    }

    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn list_voices(&mut self) -> Result<Vec<Voice>> {
        let output = self.run_tool(&["--list-voices"]).map_err(|e| {
            TtsError::VoiceListFailed(format!("failed to run {}: {}", self.tool, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TtsError::VoiceListFailed(format!(
                "{} exited with {}: {}",
                self.tool,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let voices = Self::parse_listing(&stdout);
        if voices.is_empty() && !stdout.trim().is_empty() {
            // Tool produced output but nothing we recognize: surface a
            // sample so the format drift is diagnosable.
            let sample: String = stdout.lines().take(3).collect::<Vec<_>>().join(" | ");
            return Err(TtsError::VoiceParseError(format!(
                "no voices recognized in listing; first lines: {}",
                sample
            )));
        }

        debug!("Parsed {} voices from listing", voices.len());
        Ok(voices)
    }

    fn synthesize(
        &mut self,
        text: &str,
        voice_id: &str,
        format: &str,
    ) -> Result<SynthesisOutcome> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }
        if voice_id.trim().is_empty() {
            return Err(TtsError::EmptyVoiceName);
        }

        let rate = Self::rate_arg(self.params.rate);
        let volume = Self::volume_arg(self.params.volume);
        let pitch = Self::pitch_arg(self.params.pitch);

        with_temp_file("skald-", &format!(".{}", format), |path| {
            let path_arg = path.to_string_lossy();
            let output = self
                .run_tool(&[
                    "--voice",
                    voice_id,
                    "--text",
                    text,
                    &format!("--rate={}", rate),
                    &format!("--volume={}", volume),
                    &format!("--pitch={}", pitch),
                    "--write-media",
                    &path_arg,
                ])
                .map_err(|e| {
                    TtsError::SynthesisFailed(format!("failed to run {}: {}", self.tool, e))
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(TtsError::SynthesisFailed(format!(
                    "{} exited with {}: {}",
                    self.tool,
                    output.status,
                    stderr.trim()
                )));
            }

            // The temp scope pre-creates the output file, so a zero-length
            // file is the "tool wrote nothing" signal.
            let len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            if len == 0 {
                return Err(TtsError::OutputFileNotCreated(
                    path.to_string_lossy().into_owned(),
                ));
            }

            let bytes = fs::read(path)?;
            debug!("Synthesized {} bytes of {} audio", bytes.len(), format);
            Ok(SynthesisOutcome::Audio(bytes))
        })
    }

    fn set_params(&mut self, params: &SynthesisParams) -> Result<()> {
        debug!("Setting synthesis params: {:?}", params);
        self.params = *params;
        Ok(())
    }

    /// No-op: synthesis is a single process invocation that has already
    /// exited by the time bytes are returned, so there is nothing in
    /// flight to cancel.
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}
