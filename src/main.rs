use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use dictofon::cli::{Cli, Commands, ConfigAction};
use dictofon::codec::FfmpegCodec;
use dictofon::config::Config;
use dictofon::diagnostics::check_dependencies;
use dictofon::pipeline::sink::{FileSink, StdoutSink, TranscriptSink};
use dictofon::pipeline::{PipelineRunner, StderrMeter};
use dictofon::{create_transcriber, defaults};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Transcribe {
            input,
            output,
            backend,
            model,
            language,
            strategy,
            chunk_length,
        } => {
            let config =
                apply_overrides(config, backend, model, language, strategy, chunk_length)?;
            run_transcribe(config, &input, output, cli.quiet, cli.verbose)?;
        }
        Commands::Check => {
            if !check_dependencies(&config) {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            handle_config_command(action, &config, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dictofon", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/dictofon/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?
    } else {
        Config::load_or_default(&Config::default_path())
    };

    Ok(config.with_env_overrides())
}

/// Fold per-run CLI overrides into the loaded configuration.
fn apply_overrides(
    mut config: Config,
    backend: Option<String>,
    model: Option<String>,
    language: Option<String>,
    strategy: Option<String>,
    chunk_length: Option<u64>,
) -> Result<Config> {
    if let Some(backend) = backend {
        config.stt.backend = backend.parse()?;
    }
    if let Some(model) = model {
        config.stt.model = model;
    }
    if let Some(language) = language {
        config.stt.language = language;
    }
    if let Some(strategy) = strategy {
        config.segmentation.strategy = strategy.parse()?;
    }
    if let Some(chunk_length) = chunk_length {
        config.segmentation.chunk_length_secs = chunk_length;
    }
    Ok(config)
}

/// Run the transcription pipeline over one input file.
fn run_transcribe(
    config: Config,
    input: &Path,
    output: Option<PathBuf>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    config.validate()?;

    if !input.exists() {
        anyhow::bail!("input file not found: {}", input.display());
    }
    warn_unsupported_extension(input, quiet);

    let transcriber = create_transcriber(&config)
        .context("failed to initialize the transcription backend")?;
    let codec = FfmpegCodec::system(&config.codec);
    let runner = PipelineRunner::new(
        codec,
        transcriber,
        config.segmentation.clone(),
        config.stt.backend,
    )
    .with_observer(Arc::new(StderrMeter::new(quiet, verbose)));

    let report = runner
        .run(input)
        .with_context(|| format!("transcription of {} failed", input.display()))?;

    if !quiet && verbose >= 1 {
        eprintln!(
            "dictofon: {} segments, {} failed, {} silent",
            report.segments_total, report.segments_failed, report.segments_no_speech
        );
    }

    match output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(defaults::TRANSCRIPT_FILE)
            } else {
                path
            };
            FileSink::new(path.clone())
                .write(&report.transcript)
                .with_context(|| format!("failed to write transcript to {}", path.display()))?;
            if !quiet {
                eprintln!("dictofon: transcript written to {}", path.display());
            }
        }
        None => {
            StdoutSink.write(&report.transcript)?;
        }
    }

    Ok(())
}

/// Warn about file extensions the pipeline is not known to handle.
///
/// ffmpeg may still decode them, so this is advisory only.
fn warn_unsupported_extension(input: &Path, quiet: bool) {
    if quiet {
        return;
    }
    let known = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .map(|e| defaults::SUPPORTED_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false);
    if !known {
        eprintln!(
            "dictofon: warning: expected one of {}, trying anyway",
            defaults::SUPPORTED_EXTENSIONS.join(", ")
        );
    }
}

/// Handle configuration inspection commands.
fn handle_config_command(
    action: ConfigAction,
    config: &Config,
    custom_path: Option<&Path>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
