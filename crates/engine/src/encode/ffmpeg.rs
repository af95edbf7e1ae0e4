//! ffmpeg/libx265 invocation builder
//!
//! Compiles an [`EncodeConfig`] into encoder arguments. The first full pass of
//! a run freezes the compiled arguments; every later file reuses them with only
//! its own input and output paths substituted.

use crate::resolve::{AudioCodec, AudioMode, EncodeConfig, SubtitleCodec};
use episodic_config::Config;
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

/// Video codec every encode uses
const VIDEO_CODEC: &str = "libx265";

/// Which kind of encode an invocation is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePass {
    /// Short clip from the middle of the source
    Test,
    /// Whole file
    Full,
}

/// Run-wide values that shape the arguments but are not operator answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSettings {
    pub clip_secs: u32,
    pub seek: String,
    pub opus_bitrate: String,
    pub aac_bitrate: String,
}

impl InvocationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            clip_secs: config.test_encode.clip_secs,
            seek: config.test_encode.seek.clone(),
            opus_bitrate: config.audio.opus_bitrate.clone(),
            aac_bitrate: config.audio.aac_bitrate.clone(),
        }
    }

    fn bitrate(&self, codec: AudioCodec) -> &str {
        match codec {
            AudioCodec::Opus => &self.opus_bitrate,
            AudioCodec::Aac => &self.aac_bitrate,
        }
    }
}

impl Default for InvocationSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// One compiled argument. Filters that embed the input path stay symbolic.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgToken {
    Lit(String),
    SubtitleFilter { stream_index: usize },
}

impl ArgToken {
    fn lit(value: impl Into<String>) -> Self {
        ArgToken::Lit(value.into())
    }

    fn render(&self, input: &Path) -> OsString {
        match self {
            ArgToken::Lit(value) => OsString::from(value),
            ArgToken::SubtitleFilter { stream_index } => OsString::from(format!(
                "subtitles={}:stream_index={}",
                escape_filter_path(&input.to_string_lossy()),
                stream_index
            )),
        }
    }
}

/// Escape a path for use inside a filter description.
///
/// Space, `"`, `[`, `]`, `(`, `)`, `:` and `\` get a backslash prefix; `'`
/// becomes `\\\'`.
pub fn escape_filter_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '\'' => escaped.push_str("\\\\\\'"),
            ' ' | '"' | '[' | ']' | '(' | ')' | ':' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Run-scoped cache of compiled encoder arguments.
#[derive(Debug, Clone, Default)]
pub struct ArgumentCache {
    settings: InvocationSettings,
    frozen: Option<Vec<ArgToken>>,
}

impl ArgumentCache {
    pub fn new(settings: InvocationSettings) -> Self {
        Self {
            settings,
            frozen: None,
        }
    }

    /// True once a full pass has compiled the run's arguments.
    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Full encoder argv for one file: `-y -i <input> <settings...> <output>`.
    ///
    /// A full pass compiles and freezes on first use and reuses the frozen
    /// arguments afterwards, even if `config` differs. Test passes always
    /// compile fresh and never freeze.
    pub fn invocation(
        &mut self,
        config: &EncodeConfig,
        pass: EncodePass,
        input: &Path,
        output: &Path,
    ) -> Vec<OsString> {
        let settings = &self.settings;
        let fresh;
        let tokens: &[ArgToken] = match pass {
            EncodePass::Test => {
                fresh = compile(settings, config, pass);
                &fresh
            }
            EncodePass::Full => self.frozen.get_or_insert_with(|| {
                debug!("freezing encoder arguments for this run");
                compile(settings, config, pass)
            }),
        };

        let mut argv = Vec::with_capacity(tokens.len() + 4);
        argv.push(OsString::from("-y"));
        argv.push(OsString::from("-i"));
        argv.push(input.as_os_str().to_owned());
        argv.extend(tokens.iter().map(|token| token.render(input)));
        argv.push(output.as_os_str().to_owned());
        argv
    }
}

fn compile(settings: &InvocationSettings, config: &EncodeConfig, pass: EncodePass) -> Vec<ArgToken> {
    let mut tokens = Vec::new();

    if pass == EncodePass::Test {
        tokens.push(ArgToken::lit("-t"));
        tokens.push(ArgToken::lit(settings.clip_secs.to_string()));
        tokens.push(ArgToken::lit("-ss"));
        tokens.push(ArgToken::lit(settings.seek.as_str()));
    }

    tokens.push(ArgToken::lit("-c:v"));
    tokens.push(ArgToken::lit(VIDEO_CODEC));

    if let Some(tuning) = &config.video.tuning {
        tokens.push(ArgToken::lit("-x265-params"));
        tokens.push(ArgToken::lit(tuning.as_str()));
    }

    tokens.push(ArgToken::lit("-crf"));
    tokens.push(ArgToken::lit(config.video.crf.to_string()));
    tokens.push(ArgToken::lit("-preset"));
    tokens.push(ArgToken::lit(config.video.preset.as_str()));

    match config.subtitles {
        Some(burn_in) if burn_in.codec == SubtitleCodec::Ass => {
            tokens.push(ArgToken::lit("-vf"));
            tokens.push(ArgToken::SubtitleFilter {
                stream_index: burn_in.index,
            });
            tokens.push(ArgToken::lit("-map"));
            tokens.push(ArgToken::lit("0:v:0"));
        }
        Some(burn_in) => {
            tokens.push(ArgToken::lit("-filter_complex"));
            tokens.push(ArgToken::lit(format!("[0:v][0:s:{}]overlay[v]", burn_in.index)));
            tokens.push(ArgToken::lit("-map"));
            tokens.push(ArgToken::lit("[v]"));
        }
        None => {}
    }

    match config.audio.mode {
        AudioMode::Copy => {
            tokens.push(ArgToken::lit("-c:a"));
            tokens.push(ArgToken::lit("copy"));
        }
        AudioMode::Encode { codec, downmix } => {
            tokens.push(ArgToken::lit("-c:a"));
            tokens.push(ArgToken::lit(codec.encoder_name()));
            tokens.push(ArgToken::lit("-b:a"));
            tokens.push(ArgToken::lit(settings.bitrate(codec)));
            if downmix {
                tokens.push(ArgToken::lit("-ac"));
                tokens.push(ArgToken::lit("2"));
            }
        }
    }

    tokens.push(ArgToken::lit("-map"));
    tokens.push(ArgToken::lit(format!("0:a:{}", config.audio.index)));

    if config.subtitles.is_none() {
        tokens.push(ArgToken::lit("-map"));
        tokens.push(ArgToken::lit("0:v:0"));
    }

    tokens
}
