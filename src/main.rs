//! skald command-line interface
//!
//! Thin driver over the library facade:
//! - `skald list-voices [--json] [--engine E]`
//! - `skald speak <text> [--voice V] [--engine E] [--out FILE] ...`

use anyhow::{bail, Context, Result};
use log::{error, info};
use skald::cache::CacheManager;
use skald::config::Config;
use skald::player::PlayerLauncher;
use skald::speech::EngineFactory;
use skald::{EngineType, SynthesisOutcome, SynthesisParams, TtsService};
use std::process;
use std::sync::Arc;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    // Initialize logger
    if debug_mode {
        // Debug mode: write to skald.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("skald.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open skald.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }
        info!("skald {} starting (debug mode)", skald::VERSION);
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run(args) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn usage() -> ! {
    eprintln!("Usage: skald <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list-voices [--json] [--engine <engine>]");
    eprintln!("  speak <text> [--voice <id>] [--engine <engine>] [--out <file>]");
    eprintln!("              [--rate <0.5-2.0>] [--pitch <0.5-2.0>] [--volume <0.0-1.0>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --engine       'command-line' or 'native'");
    eprintln!("  --no-fallback  fail instead of falling back to another engine");
    eprintln!("  --debug, -d    verbose logging to skald.log");
    process::exit(2);
}

/// Value of `--flag <value>`, if present.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn build_service(config: &Config) -> TtsService {
    let mut player = PlayerLauncher::new();
    if let Some(name) = config.preferred_player() {
        player.prefer(&name);
    }
    TtsService::with_parts(
        Box::new(EngineFactory::default()),
        Box::new(player),
        Arc::new(CacheManager::new()),
    )
}

fn run(args: Vec<String>) -> Result<()> {
    let command = match args.first() {
        Some(c) if !c.starts_with('-') => c.clone(),
        _ => usage(),
    };

    let config = Config::load().context("loading configuration")?;

    let engine: Option<EngineType> = match flag_value(&args, "--engine") {
        Some(name) => Some(name.parse()?),
        None => config.preferred_engine(),
    };
    let auto_fallback = if args.iter().any(|a| a == "--no-fallback") {
        false
    } else {
        config.auto_fallback()
    };

    let mut service = build_service(&config);
    service
        .initialize(engine, auto_fallback)
        .context("initializing TTS service")?;

    let result = match command.as_str() {
        "list-voices" => list_voices(&mut service, &args),
        "speak" => speak(&mut service, &config, &args),
        _ => usage(),
    };

    // Best-effort cleanup; partial failures are logged, not fatal
    if let Err(e) = service.dispose() {
        info!("{}", e);
    }

    result
}

fn list_voices(service: &mut TtsService, args: &[String]) -> Result<()> {
    let voices = service.get_voices().context("listing voices")?;

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&voices)?);
        return Ok(());
    }

    println!(
        "{} voices available via {} engine:",
        voices.len(),
        service.active_engine().map(|e| e.to_string()).unwrap_or_default()
    );
    for voice in &voices {
        println!(
            "  {:<40} {:<8} {:?} ({:?})",
            voice.id, voice.language_code, voice.gender, voice.quality
        );
    }
    Ok(())
}

fn speak(service: &mut TtsService, config: &Config, args: &[String]) -> Result<()> {
    let text = match args.get(1) {
        Some(t) if !t.starts_with('-') => t.clone(),
        _ => bail!("speak requires a text argument"),
    };

    let voice = flag_value(args, "--voice").unwrap_or_else(|| config.default_voice());

    let defaults = config.params();
    let params = SynthesisParams::new(
        flag_value(args, "--rate")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate),
        flag_value(args, "--pitch")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.pitch),
        flag_value(args, "--volume")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.volume),
    );
    service.set_params(&params).context("applying speech parameters")?;

    if let Some(out) = flag_value(args, "--out") {
        let format = match out.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_string(),
            _ => config.default_format(),
        };
        match service.synthesize_text(&text, &voice, &format)? {
            SynthesisOutcome::Audio(bytes) => {
                std::fs::write(&out, &bytes).with_context(|| format!("writing {}", out))?;
                println!("Wrote {} bytes to {}", bytes.len(), out);
            }
            SynthesisOutcome::PlayedDirectly => {
                println!("The native engine played the audio directly; no bytes to write.");
            }
        }
        return Ok(());
    }

    service.speak_text(&text, &voice).context("speaking")?;
    // Let the spawned player finish before cleanup kills it
    service.wait_for_playback().context("waiting for playback")?;
    Ok(())
}
