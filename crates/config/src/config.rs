//! Core configuration structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Encoder invocation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncoderConfig {
    /// Encoder program name or path, resolved on PATH once per run
    #[serde(default = "default_encoder_program")]
    pub program: String,
    /// Treat `nonstandard_exit_code` as success
    #[serde(default)]
    pub ignore_nonstandard_exit: bool,
    /// Nonzero exit code that may be accepted as success, 176 by default.
    /// It is believed to be ffmpeg's "patch welcome" status.
    #[serde(default = "default_nonstandard_exit_code")]
    pub nonstandard_exit_code: i32,
    /// Force colored log output from the encoder
    #[serde(default = "default_force_color")]
    pub force_color: bool,
}

fn default_encoder_program() -> String {
    "ffmpeg".to_string()
}

fn default_nonstandard_exit_code() -> i32 {
    176
}

fn default_force_color() -> bool {
    true
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: default_encoder_program(),
            ignore_nonstandard_exit: false,
            nonstandard_exit_code: default_nonstandard_exit_code(),
            force_color: default_force_color(),
        }
    }
}

/// Probe tool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// MediaInfo CLI program name or path
    #[serde(default = "default_probe_program")]
    pub program: String,
}

fn default_probe_program() -> String {
    "mediainfo".to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: default_probe_program(),
        }
    }
}

/// Batch-mode settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Source file suffixes picked up from the input directory (case-sensitive)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Number of leading entries dropped from the sorted listing
    #[serde(default)]
    pub skip_count: usize,
    /// Extension of produced episodes, without the dot
    #[serde(default = "default_container")]
    pub container: String,
}

fn default_extensions() -> Vec<String> {
    vec![".mkv".to_string(), ".VOB".to_string()]
}

fn default_container() -> String {
    "mp4".to_string()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_count: 0,
            container: default_container(),
        }
    }
}

/// Test encode window settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestEncodeConfig {
    /// Length of the test clip in seconds
    #[serde(default = "default_clip_secs")]
    pub clip_secs: u32,
    /// Seek position of the test clip (ffmpeg time syntax)
    #[serde(default = "default_seek")]
    pub seek: String,
    /// Sources at or below this duration are never offered a test encode
    #[serde(default = "default_min_source_secs")]
    pub min_source_secs: u64,
}

fn default_clip_secs() -> u32 {
    60
}

fn default_seek() -> String {
    "00:05:00".to_string()
}

fn default_min_source_secs() -> u64 {
    300
}

impl Default for TestEncodeConfig {
    fn default() -> Self {
        Self {
            clip_secs: default_clip_secs(),
            seek: default_seek(),
            min_source_secs: default_min_source_secs(),
        }
    }
}

/// Audio re-encode bitrates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    #[serde(default = "default_audio_bitrate")]
    pub opus_bitrate: String,
    #[serde(default = "default_audio_bitrate")]
    pub aac_bitrate: String,
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            opus_bitrate: default_audio_bitrate(),
            aac_bitrate: default_audio_bitrate(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub test_encode: TestEncodeConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Parses the file and handles missing optional fields with defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - EPISODIC_ENCODER -> encoder.program
    /// - EPISODIC_PROBE -> probe.program
    /// - EPISODIC_IGNORE_NONSTANDARD_EXIT -> encoder.ignore_nonstandard_exit
    /// - EPISODIC_SKIP_COUNT -> batch.skip_count
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("EPISODIC_ENCODER") {
            if !val.trim().is_empty() {
                self.encoder.program = val;
            }
        }

        if let Ok(val) = env::var("EPISODIC_PROBE") {
            if !val.trim().is_empty() {
                self.probe.program = val;
            }
        }

        if let Ok(val) = env::var("EPISODIC_IGNORE_NONSTANDARD_EXIT") {
            // Accept "true", "1", "yes" as true; "false", "0", "no" as false
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.encoder.ignore_nonstandard_exit = true,
                "false" | "0" | "no" => self.encoder.ignore_nonstandard_exit = false,
                _ => {} // Invalid value, keep existing
            }
        }

        if let Ok(val) = env::var("EPISODIC_SKIP_COUNT") {
            if let Ok(skip) = val.parse::<usize>() {
                self.batch.skip_count = skip;
            }
        }
    }

    /// Load configuration from file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    ///
    /// Parse errors in an existing file are still reported.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }
}
