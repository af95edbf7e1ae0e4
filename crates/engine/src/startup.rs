//! Preflight checks run once before any prompt is shown.
//!
//! - Encoder and probe programs resolve on the search path
//! - The encoder was built with libx265

use episodic_config::Config;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Encoder name as listed by `ffmpeg -encoders`
const REQUIRED_ENCODER: &str = "libx265";

/// Error types for startup checks
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Encoder '{program}' not found; is it installed and in PATH? ({source})")]
    EncoderNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("Probe '{program}' not found; is MediaInfo installed and in PATH? ({source})")]
    ProbeNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("Encoder does not support {0}")]
    MissingEncoderSupport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// External programs resolved for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub encoder: PathBuf,
    pub probe: PathBuf,
}

/// Resolve the encoder program to an absolute path.
pub fn locate_encoder(program: &str) -> Result<PathBuf, StartupError> {
    which::which(program).map_err(|source| StartupError::EncoderNotFound {
        program: program.to_string(),
        source,
    })
}

/// Resolve the probe program to an absolute path.
pub fn locate_probe(program: &str) -> Result<PathBuf, StartupError> {
    which::which(program).map_err(|source| StartupError::ProbeNotFound {
        program: program.to_string(),
        source,
    })
}

/// True when `-encoders` output lists `name` as an encoder.
///
/// Lines look like ` V....D libx265              libx265 H.265 / HEVC`.
pub fn encoders_include(listing: &str, name: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|encoder| encoder == name)
}

/// Check that the encoder at `encoder` can produce HEVC through libx265.
pub fn check_x265_support(encoder: &Path) -> Result<(), StartupError> {
    let output = Command::new(encoder)
        .arg("-hide_banner")
        .arg("-encoders")
        .output()?;

    if !output.status.success() {
        return Err(StartupError::MissingEncoderSupport(format!(
            "{} (-encoders exited with {})",
            REQUIRED_ENCODER, output.status
        )));
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    if !encoders_include(&listing, REQUIRED_ENCODER) {
        return Err(StartupError::MissingEncoderSupport(REQUIRED_ENCODER.to_string()));
    }

    Ok(())
}

/// Run all startup checks in order
///
/// 1. Encoder on PATH
/// 2. Probe on PATH
/// 3. libx265 support
pub fn run_startup_checks(cfg: &Config) -> Result<Toolchain, StartupError> {
    let encoder = locate_encoder(&cfg.encoder.program)?;
    let probe = locate_probe(&cfg.probe.program)?;
    debug!(encoder = %encoder.display(), probe = %probe.display(), "resolved toolchain");

    check_x265_support(&encoder)?;

    Ok(Toolchain { encoder, probe })
}
