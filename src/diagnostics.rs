//! System diagnostics and dependency checking.
//!
//! Verifies that the external codec tools are installed, which transcription
//! backends this build carries, and whether the configured backend can
//! actually run (model present, endpoint configured).

use crate::config::{Backend, Config};
use crate::defaults;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Check if a command exists and is executable.
fn check_command(command: &str) -> CheckResult {
    match Command::new(command).arg("-version").output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but -version failed", command)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

fn report(label: &str, result: CheckResult, install_hint: &str) -> bool {
    print!("{}: ", label);
    match result {
        CheckResult::Ok => {
            println!("✓ OK");
            true
        }
        CheckResult::NotFound => {
            println!("✗ NOT FOUND ({})", install_hint);
            false
        }
        CheckResult::Warning(msg) => {
            println!("⚠ WARNING: {}", msg);
            false
        }
    }
}

/// Run all dependency checks and print results.
///
/// Returns `false` if anything required for the configured backend is
/// missing, so the caller can exit non-zero.
pub fn check_dependencies(config: &Config) -> bool {
    println!("Checking dictofon dependencies...\n");
    let mut all_ok = true;

    // ffmpeg/ffprobe (note: ffmpeg uses -version, not --version)
    all_ok &= report(
        "ffmpeg (decode/resample)",
        check_command(&config.codec.ffmpeg),
        "install ffmpeg",
    );
    all_ok &= report(
        "ffprobe (duration probe)",
        check_command(&config.codec.ffprobe),
        "install ffmpeg",
    );

    println!(
        "\ncompiled backends: {}",
        defaults::compiled_backends().join(", ")
    );

    print!("configured backend '{}': ", config.stt.backend);
    match config.stt.backend {
        Backend::Whisper => {
            if !cfg!(feature = "whisper") {
                println!("✗ not in this build (rebuild with --features whisper)");
                all_ok = false;
            }
            #[cfg(feature = "whisper")]
            {
                if crate::stt::whisper::model_installed(&config.stt.model, &config.stt.model_dir)
                {
                    println!(
                        "✓ model '{}' present in {}",
                        config.stt.model,
                        config.stt.model_dir.display()
                    );
                } else {
                    println!(
                        "✗ model '{}' not found in {}",
                        config.stt.model,
                        config.stt.model_dir.display()
                    );
                    all_ok = false;
                }
            }
        }
        Backend::Vosk => {
            if !cfg!(feature = "vosk") {
                println!("✗ not in this build (rebuild with --features vosk)");
                all_ok = false;
            }
            #[cfg(feature = "vosk")]
            {
                let model_dir = config.stt.model_dir.join(&config.stt.model);
                if model_dir.is_dir() {
                    println!("✓ model directory {} present", model_dir.display());
                } else {
                    println!("✗ model directory {} not found", model_dir.display());
                    all_ok = false;
                }
            }
        }
        Backend::Remote => {
            if !cfg!(feature = "remote") {
                println!("✗ not in this build (rebuild with --features remote)");
                all_ok = false;
            }
            #[cfg(feature = "remote")]
            {
                if config.remote.endpoint.is_empty() {
                    println!("✗ no endpoint configured (set remote.endpoint)");
                    all_ok = false;
                } else if std::env::var(&config.remote.api_key_env)
                    .map(|k| !k.is_empty())
                    .unwrap_or(false)
                {
                    println!("✓ endpoint configured, {} set", config.remote.api_key_env);
                } else {
                    println!(
                        "✓ endpoint configured ({} not set — anonymous requests)",
                        config.remote.api_key_env
                    );
                }
            }
        }
    }

    println!();
    if all_ok {
        println!("All checks passed.");
    } else {
        println!("Some checks failed — see above.");
    }
    all_ok
}
