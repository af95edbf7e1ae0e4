//! Probe module for reading per-stream metadata from a container.
//!
//! The catalog consumes only [`ProbeReport`]: per stream kind, an ordered list of
//! raw streams whose fields are free text. [`MediaInfoProbe`] fills that contract
//! by running the MediaInfo CLI in JSON mode.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Field names of the probe contract.
pub mod fields {
    pub const FORMAT: &str = "Format";
    pub const LANGUAGE: &str = "Language";
    pub const CHANNELS: &str = "Channel(s)";
    /// Milliseconds, numeric string.
    pub const DURATION: &str = "Duration";
    /// Bits per second, numeric string.
    pub const BIT_RATE: &str = "BitRate";
    pub const SOURCE_MEDIUM: &str = "OriginalSourceMedium";
    pub const WIDTH: &str = "Width";
    pub const HEIGHT: &str = "Height";
    pub const TITLE: &str = "Title";
    pub const CODEC_INFO: &str = "CodecID/Info";
}

/// Error type for probe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe tool ran but reported failure.
    #[error("mediainfo failed: {0}")]
    ProbeFailed(String),

    /// Failed to parse the probe tool's output.
    #[error("Failed to parse mediainfo output: {0}")]
    ParseError(String),

    /// IO error during probe.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Elementary stream kinds the catalog tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
    Text,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Text => write!(f, "text"),
        }
    }
}

/// One stream's raw key/value metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStream {
    fields: BTreeMap<String, String>,
}

impl RawStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Returns the field value, or the empty string when absent.
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Raw probe output for one container, streams in probe-reported order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub video: Vec<RawStream>,
    pub audio: Vec<RawStream>,
    pub text: Vec<RawStream>,
}

impl ProbeReport {
    pub fn streams(&self, kind: StreamKind) -> &[RawStream] {
        match kind {
            StreamKind::Video => &self.video,
            StreamKind::Audio => &self.audio,
            StreamKind::Text => &self.text,
        }
    }

    /// Number of streams the probe reported for `kind`.
    pub fn count(&self, kind: StreamKind) -> usize {
        self.streams(kind).len()
    }
}

/// Source of raw stream metadata for a container path.
pub trait Probe {
    fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError>;
}

/// Probe backed by the `mediainfo` command-line tool.
#[derive(Debug, Clone)]
pub struct MediaInfoProbe {
    program: PathBuf,
}

impl MediaInfoProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Probe for MediaInfoProbe {
    /// Runs `mediainfo --Output=JSON <path>` and parses the JSON output.
    fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError> {
        debug!(program = %self.program.display(), path = %path.display(), "probing container");

        let output = Command::new(&self.program)
            .arg("--Output=JSON")
            .arg(path)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::ProbeFailed(format!(
                "mediainfo exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_mediainfo_output(&stdout)
    }
}

/// Raw MediaInfo JSON structures for parsing.
mod mediainfo_json {
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize)]
    pub struct MediaInfoOutput {
        pub media: Option<Media>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Media {
        #[serde(default)]
        pub track: Vec<Track>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Track {
        #[serde(rename = "@type")]
        pub kind: String,
        #[serde(flatten)]
        pub fields: BTreeMap<String, serde_json::Value>,
    }
}

/// Parses MediaInfo JSON output into a [`ProbeReport`].
///
/// JSON keys are mapped onto the contract names: `Channels` becomes
/// `Channel(s)`, `CodecID_Info` becomes `CodecID/Info`, and `Duration` is
/// converted from seconds to whole milliseconds. Non-string values are dropped.
pub fn parse_mediainfo_output(json_str: &str) -> Result<ProbeReport, ProbeError> {
    let parsed: mediainfo_json::MediaInfoOutput =
        serde_json::from_str(json_str).map_err(|e| ProbeError::ParseError(e.to_string()))?;

    let media = parsed.media.ok_or_else(|| {
        ProbeError::ParseError("Missing media section in mediainfo output".to_string())
    })?;

    let mut report = ProbeReport::default();

    for track in media.track {
        let bucket = match track.kind.as_str() {
            "Video" => &mut report.video,
            "Audio" => &mut report.audio,
            "Text" => &mut report.text,
            _ => continue,
        };

        let mut stream = RawStream::new();
        for (key, value) in track.fields {
            let Some(text) = value.as_str() else {
                continue;
            };
            let (key, text) = match key.as_str() {
                "Channels" => (fields::CHANNELS, text.to_string()),
                "CodecID_Info" => (fields::CODEC_INFO, text.to_string()),
                "Duration" => (fields::DURATION, seconds_to_millis(text)),
                other => (other, text.to_string()),
            };
            stream = stream.with(key, text);
        }
        bucket.push(stream);
    }

    debug!(
        video = report.video.len(),
        audio = report.audio.len(),
        text = report.text.len(),
        "parsed mediainfo output"
    );

    Ok(report)
}

/// MediaInfo's JSON mode reports seconds; the contract wants milliseconds.
/// Unparsable values pass through untouched so the catalog can reject them.
fn seconds_to_millis(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => format!("{}", (secs * 1000.0).round() as u64),
        _ => raw.to_string(),
    }
}
