//! Option resolver: turns a stream catalog plus operator answers into an
//! immutable [`EncodeConfig`].
//!
//! Questions are asked in a fixed order and later questions depend on earlier
//! answers (no codec question after "copy", no downmix question for stereo
//! sources or copied audio). Numeric answers that are malformed or out of range
//! are re-asked; every other failure aborts resolution without a partial result.

use crate::catalog::{StreamCatalog, StreamRecord};
use crate::probe::StreamKind;
use crate::prompt::{choose, confirm, Prompt, PromptError, Question};
use console::style;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Highest CRF libx265 accepts; the range is inclusive.
pub const MAX_CRF: u8 = 51;

/// Duration (seconds) above which a test encode is offered.
pub const DEFAULT_TEST_THRESHOLD_SECS: u64 = 300;

/// Length of the test clip, in seconds.
pub const DEFAULT_TEST_CLIP_SECS: u32 = 60;

/// x265 tuning strings offered in the extended options menu, with the CRF band
/// each one is meant for.
pub const TUNING_PRESETS: [(&str, &str); 7] = [
    ("limit-sao:bframes=8:psy-rd=1:aq-mode=3", "19"),
    ("bframes=8:psy-rd=1:aq-mode=3", "20-23"),
    ("bframes=8:psy-rd=1:aq-mode=3:aq-strength=0.8:deblock=1,1", "19-22"),
    ("limit-sao:bframes=8:psy-rd=1.5:psy-rdoq=2:aq-mode=3", "18-20"),
    ("bframes=8:psy-rd=1:psy-rdoq=1:aq-mode=3:qcomp=0.8", "19-22"),
    ("no-sao:bframes=8:psy-rd=1.5:psy-rdoq=3:aq-mode=3:ref=6", "16-18"),
    (
        "no-sao:no-strong-intra-smoothing:bframes=8:psy-rd=2:psy-rdoq=2:aq-mode=3:deblock=-1,-1:ref=6",
        "14",
    ),
];

/// Encoder speed/quality presets, fastest first.
pub const ENCODER_PRESETS: [&str; 10] = [
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

/// Error type for option resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The chosen label is not one of the offered streams
    #[error("The {kind} track '{label}' was not found")]
    TrackNotFound { kind: StreamKind, label: String },

    /// Only ASS and PGS subtitles can be burned in
    #[error("Currently unsupported subtitle format \"{0}\"")]
    UnsupportedSubtitleFormat(String),

    /// The chosen audio codec is not one of the offered codecs
    #[error("Unknown audio codec '{0}'")]
    UnknownAudioCodec(String),

    /// The chosen preset is not one of the offered presets
    #[error("Unknown encoder preset '{0}'")]
    UnknownPreset(String),

    /// The operator could not be asked
    #[error("Prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// Audio codecs offered when the track is re-encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Opus,
    Aac,
}

impl AudioCodec {
    pub const ALL: [AudioCodec; 2] = [AudioCodec::Opus, AudioCodec::Aac];

    /// ffmpeg encoder name
    pub fn encoder_name(&self) -> &'static str {
        match self {
            AudioCodec::Opus => "libopus",
            AudioCodec::Aac => "aac",
        }
    }

    pub fn from_encoder_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|codec| codec.encoder_name() == name)
    }
}

/// What happens to the selected audio track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    /// Stream copied verbatim
    Copy,
    /// Re-encoded, optionally downmixed to stereo
    Encode { codec: AudioCodec, downmix: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSelection {
    /// Audio stream index within the audio kind
    pub index: usize,
    pub mode: AudioMode,
}

/// Subtitle formats that can be burned in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleCodec {
    /// Text subtitles, rendered with the `subtitles` filter
    Ass,
    /// Bitmap subtitles, composited with the `overlay` filter
    Pgs,
}

impl SubtitleCodec {
    /// Map a probe-reported format name; only exact `ASS` and `PGS` are supported.
    pub fn from_format(format: &str) -> Option<Self> {
        match format {
            "ASS" => Some(SubtitleCodec::Ass),
            "PGS" => Some(SubtitleCodec::Pgs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtitleBurnIn {
    /// Text stream index within the text kind
    pub index: usize,
    pub codec: SubtitleCodec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoParams {
    pub crf: u8,
    pub preset: String,
    /// Extra `-x265-params` value
    pub tuning: Option<String>,
}

/// Encode settings shared by every file of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeConfig {
    pub audio: AudioSelection,
    pub subtitles: Option<SubtitleBurnIn>,
    pub video: VideoParams,
    /// Encode a short clip first and ask before continuing
    pub test_encode: bool,
    /// Episode number given to the first file of a batch
    pub start_episode: u64,
}

impl EncodeConfig {
    /// Whether audio is downmixed to stereo; always false when copying.
    pub fn downmix(&self) -> bool {
        matches!(self.audio.mode, AudioMode::Encode { downmix: true, .. })
    }
}

/// Walks a catalog and asks the operator for everything an encode needs.
pub struct OptionResolver<'a> {
    catalog: &'a StreamCatalog,
    test_threshold_secs: u64,
    test_clip_secs: u32,
    start_episode: u64,
}

impl<'a> OptionResolver<'a> {
    pub fn new(catalog: &'a StreamCatalog) -> Self {
        Self {
            catalog,
            test_threshold_secs: DEFAULT_TEST_THRESHOLD_SECS,
            test_clip_secs: DEFAULT_TEST_CLIP_SECS,
            start_episode: 1,
        }
    }

    /// Sources longer than `secs` are offered a test encode.
    pub fn test_threshold_secs(mut self, secs: u64) -> Self {
        self.test_threshold_secs = secs;
        self
    }

    /// Clip length named in the test-encode question.
    pub fn test_clip_secs(mut self, secs: u32) -> Self {
        self.test_clip_secs = secs;
        self
    }

    /// Episode offset carried into the resulting config.
    pub fn starting_at(mut self, episode: u64) -> Self {
        self.start_episode = episode;
        self
    }

    /// Ask the full question sequence and build the config.
    pub fn resolve<P: Prompt + ?Sized>(&self, prompt: &mut P) -> Result<EncodeConfig, ResolveError> {
        let (audio_record, audio) = self.resolve_audio(prompt)?;
        debug!(index = audio_record.index, mode = ?audio.mode, "audio resolved");

        let subtitles = self.resolve_subtitles(prompt)?;

        let primary = self.catalog.primary_video();
        if primary.is_some_and(|video| video.bluray) {
            info!(
                "This might be a Blu-ray track. It can be harder to determine which \
                 subtitle track is right to use, so it may be worth doing a test run."
            );
        }

        let tuning = resolve_tuning(prompt)?;
        let crf = resolve_crf(prompt)?;

        let long_enough = primary
            .and_then(StreamRecord::duration_secs)
            .is_some_and(|secs| secs > self.test_threshold_secs);
        let test_encode = long_enough
            && confirm(
                prompt,
                "should_test",
                &format!(
                    "Would you like to perform a {} second test encode?",
                    self.test_clip_secs
                ),
            )?;

        let preset = choose(
            prompt,
            "preset",
            "Please choose an encoding preset:",
            ENCODER_PRESETS.iter().map(|p| p.to_string()).collect(),
        )?;
        if !ENCODER_PRESETS.contains(&preset.as_str()) {
            return Err(ResolveError::UnknownPreset(preset));
        }

        Ok(EncodeConfig {
            audio,
            subtitles,
            video: VideoParams { crf, preset, tuning },
            test_encode,
            start_episode: self.start_episode,
        })
    }

    fn select<P: Prompt + ?Sized>(
        &self,
        prompt: &mut P,
        kind: StreamKind,
        id: &'static str,
        message: &str,
    ) -> Result<&'a StreamRecord, ResolveError> {
        let labels = self.catalog.labels(kind);
        let answer = choose(prompt, id, message, labels)?;
        let record = self
            .catalog
            .lookup(kind, &answer)
            .ok_or(ResolveError::TrackNotFound { kind, label: answer })?;
        info!("Will use {} stream {}", kind, record.index);
        Ok(record)
    }

    fn resolve_audio<P: Prompt + ?Sized>(
        &self,
        prompt: &mut P,
    ) -> Result<(&'a StreamRecord, AudioSelection), ResolveError> {
        let record = self.select(prompt, StreamKind::Audio, "audio", "Which audio stream?")?;

        if confirm(prompt, "should_copy", "Would you like to copy this audio track?")? {
            let selection = AudioSelection {
                index: record.index,
                mode: AudioMode::Copy,
            };
            return Ok((record, selection));
        }

        let answer = choose(
            prompt,
            "audio_codec",
            "Which codec should we use?",
            AudioCodec::ALL
                .iter()
                .map(|codec| codec.encoder_name().to_string())
                .collect(),
        )?;
        let codec =
            AudioCodec::from_encoder_name(&answer).ok_or(ResolveError::UnknownAudioCodec(answer))?;

        let downmix = if record.channels().is_some_and(|channels| channels > 2) {
            info!("Detected audio has more than two channels");
            confirm(
                prompt,
                "should_downmix",
                "The audio stream has more than two channels, would you like to downmix?",
            )?
        } else {
            false
        };

        let selection = AudioSelection {
            index: record.index,
            mode: AudioMode::Encode { codec, downmix },
        };
        Ok((record, selection))
    }

    fn resolve_subtitles<P: Prompt + ?Sized>(
        &self,
        prompt: &mut P,
    ) -> Result<Option<SubtitleBurnIn>, ResolveError> {
        if self.catalog.streams(StreamKind::Text).is_empty() {
            return Ok(None);
        }
        if !confirm(prompt, "use_text", "Would you like to encode subtitles?")? {
            return Ok(None);
        }

        let record = self.select(prompt, StreamKind::Text, "text", "Which text stream?")?;
        let codec = SubtitleCodec::from_format(&record.format)
            .ok_or_else(|| ResolveError::UnsupportedSubtitleFormat(record.format.clone()))?;

        Ok(Some(SubtitleBurnIn {
            index: record.index,
            codec,
        }))
    }
}

/// Optional extended x265 tuning; re-asks until the choice is in `1..=7`.
fn resolve_tuning<P: Prompt + ?Sized>(prompt: &mut P) -> Result<Option<String>, ResolveError> {
    if !confirm(prompt, "should_use_opts", "Would you like to specify x265 opts?")? {
        return Ok(None);
    }

    let question = Question::integer("opts", "Please choose an option [1-7]");
    loop {
        info!("Here are the available options for x265-opts:");
        print_tuning_menu();

        let answer = prompt.ask(&question)?;
        match answer.trim().parse::<usize>() {
            Ok(choice) if (1..=TUNING_PRESETS.len()).contains(&choice) => {
                info!("Using option {}", choice);
                return Ok(Some(TUNING_PRESETS[choice - 1].0.to_string()));
            }
            _ => warn!(answer = %answer, "Please choose one of the listed options."),
        }
    }
}

/// Re-asks until the answer is a whole number in `0..=MAX_CRF`. Never clamps.
fn resolve_crf<P: Prompt + ?Sized>(prompt: &mut P) -> Result<u8, ResolveError> {
    let question = Question::integer("crf", format!("Please enter a crf value: [0-{}]", MAX_CRF));
    loop {
        let answer = prompt.ask(&question)?;
        match answer.trim().parse::<u64>() {
            Ok(crf) if crf <= MAX_CRF as u64 => return Ok(crf as u8),
            _ => warn!(answer = %answer, "Please enter a valid CRF value."),
        }
    }
}

fn print_tuning_menu() {
    let groups: [(&str, &[usize]); 6] = [
        ("Settings to rule them all:", &[0, 1]),
        ("Flat, slow anime (slice of life, everything is well lit):", &[2]),
        ("Some dark scene, some battle scene (shonen, historical, etc.):", &[3]),
        ("  (motion + fancy & detailed FX)", &[4]),
        (
            "Movie-tier dark scene, complex grain/detail, and BDs with dynamic-grain injected debanding:",
            &[5],
        ),
        ("I have infinite storage, a supercomputer, and I want details:", &[6]),
    ];

    println!();
    for (heading, entries) in groups {
        println!("{}", style(heading).bold());
        for &entry in entries {
            let (tuning, crf) = TUNING_PRESETS[entry];
            println!("    {}. {} [crf = {}]", entry + 1, tuning, crf);
        }
        println!();
    }
}
