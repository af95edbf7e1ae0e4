//! Stream catalog built from raw probe output.
//!
//! Each stream kind keeps its own ordered sequence of [`StreamRecord`]s, in
//! probe-reported order. Missing text fields are normalized to [`UNKNOWN`] and
//! missing numeric fields to `None`, so formatting never emits blank cells.

use crate::probe::{fields, ProbeReport, RawStream, StreamKind};
use thiserror::Error;
use tracing::{debug, info};

/// Placeholder shown for any field the probe did not report.
pub const UNKNOWN: &str = "-";

/// Value of `OriginalSourceMedium` for Blu-ray sourced streams.
const BLURAY_MEDIUM: &str = "Blu-ray";

/// Error type for catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No audio stream, so no valid configuration can be derived.
    #[error("No audio streams found, there is nothing to encode")]
    EmptyCatalog,

    /// No video stream, so there is nothing to do.
    #[error("No video stream found, there is nothing to do")]
    NoVideo,

    /// A numeric field was present but could not be parsed.
    #[error("{kind} stream {index}: invalid {field} value '{value}'")]
    InvalidNumber {
        kind: StreamKind,
        index: usize,
        field: &'static str,
        value: String,
    },
}

/// Kind-specific stream properties.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDetails {
    Video {
        width: Option<u32>,
        height: Option<u32>,
        duration_secs: Option<u64>,
        bitrate_kbps: Option<u64>,
    },
    Audio {
        channels: Option<u32>,
        duration_secs: Option<u64>,
        bitrate_kbps: Option<u64>,
    },
    /// Subtitle streams carry nothing beyond their format name.
    Text,
}

/// One elementary stream as the resolver sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    /// Position within its kind, 0-based.
    pub index: usize,
    pub format: String,
    pub language: String,
    pub info: String,
    pub bluray: bool,
    pub details: StreamDetails,
}

impl StreamRecord {
    pub fn kind(&self) -> StreamKind {
        match self.details {
            StreamDetails::Video { .. } => StreamKind::Video,
            StreamDetails::Audio { .. } => StreamKind::Audio,
            StreamDetails::Text => StreamKind::Text,
        }
    }

    /// Channel count for audio streams.
    pub fn channels(&self) -> Option<u32> {
        match self.details {
            StreamDetails::Audio { channels, .. } => channels,
            _ => None,
        }
    }

    pub fn duration_secs(&self) -> Option<u64> {
        match self.details {
            StreamDetails::Video { duration_secs, .. }
            | StreamDetails::Audio { duration_secs, .. } => duration_secs,
            StreamDetails::Text => None,
        }
    }

    pub fn bitrate_kbps(&self) -> Option<u64> {
        match self.details {
            StreamDetails::Video { bitrate_kbps, .. }
            | StreamDetails::Audio { bitrate_kbps, .. } => bitrate_kbps,
            StreamDetails::Text => None,
        }
    }

    /// Menu label: `"<1-based index>. <format> / <language>[ / <info>]"`.
    pub fn label(&self) -> String {
        let mut label = format!("{}. {} / {}", self.index + 1, self.format, self.language);
        if self.info != UNKNOWN {
            label.push_str(" / ");
            label.push_str(&self.info);
        }
        label
    }

    /// Multi-line summary for debug output.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "{} #{}: format={} language={} info={} bluray={}",
            self.kind(),
            self.index,
            self.format,
            self.language,
            self.info,
            if self.bluray { "yes" } else { "no" }
        );
        match &self.details {
            StreamDetails::Video { width, height, .. } => {
                out.push_str(&format!(
                    " dimensions={}x{}",
                    display_opt(*width),
                    display_opt(*height)
                ));
            }
            StreamDetails::Audio { channels, .. } => {
                out.push_str(&format!(" channels={}", display_opt(*channels)));
            }
            StreamDetails::Text => {}
        }
        if self.kind() != StreamKind::Text {
            out.push_str(&format!(
                " duration={} bitrate={}",
                self.duration_secs()
                    .map(format_duration)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                self.bitrate_kbps()
                    .map(|kbps| format!("{}kb/s", kbps))
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            ));
        }
        out
    }
}

/// Ordered per-kind stream records for one probed container.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamCatalog {
    video: Vec<StreamRecord>,
    audio: Vec<StreamRecord>,
    text: Vec<StreamRecord>,
}

impl StreamCatalog {
    /// Build the catalog from raw probe output.
    ///
    /// Fails when there is no audio stream ([`CatalogError::EmptyCatalog`]), no
    /// video stream, or a present numeric field cannot be parsed.
    pub fn build(report: &ProbeReport) -> Result<Self, CatalogError> {
        info!("Parsing video information");
        let video = build_kind(report, StreamKind::Video)?;
        info!("Parsing audio information");
        let audio = build_kind(report, StreamKind::Audio)?;
        info!("Parsing text information");
        let text = build_kind(report, StreamKind::Text)?;

        if video.is_empty() {
            return Err(CatalogError::NoVideo);
        }
        if audio.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        for record in video.iter().chain(&audio).chain(&text) {
            debug!("{}", record.describe());
        }

        Ok(Self { video, audio, text })
    }

    pub fn streams(&self, kind: StreamKind) -> &[StreamRecord] {
        match kind {
            StreamKind::Video => &self.video,
            StreamKind::Audio => &self.audio,
            StreamKind::Text => &self.text,
        }
    }

    /// The first video stream; encodes always map video stream 0.
    pub fn primary_video(&self) -> Option<&StreamRecord> {
        self.video.first()
    }

    /// Menu labels for every stream of `kind`, in catalog order.
    pub fn labels(&self, kind: StreamKind) -> Vec<String> {
        self.streams(kind).iter().map(StreamRecord::label).collect()
    }

    /// Find the stream whose label is exactly `label`.
    pub fn lookup(&self, kind: StreamKind, label: &str) -> Option<&StreamRecord> {
        self.streams(kind).iter().find(|record| record.label() == label)
    }
}

fn build_kind(report: &ProbeReport, kind: StreamKind) -> Result<Vec<StreamRecord>, CatalogError> {
    report
        .streams(kind)
        .iter()
        .enumerate()
        .map(|(index, raw)| build_record(kind, index, raw))
        .collect()
}

fn build_record(kind: StreamKind, index: usize, raw: &RawStream) -> Result<StreamRecord, CatalogError> {
    let number = |field: &'static str| -> Result<Option<f64>, CatalogError> {
        parse_number(raw.field(field)).map_err(|value| CatalogError::InvalidNumber {
            kind,
            index,
            field,
            value,
        })
    };

    let duration_secs = number(fields::DURATION)?.map(|ms| (ms / 1000.0) as u64);
    let bitrate_kbps = number(fields::BIT_RATE)?.map(|bps| (bps / 1000.0) as u64);

    let details = match kind {
        StreamKind::Video => StreamDetails::Video {
            width: number(fields::WIDTH)?.map(|w| w as u32),
            height: number(fields::HEIGHT)?.map(|h| h as u32),
            duration_secs,
            bitrate_kbps,
        },
        StreamKind::Audio => StreamDetails::Audio {
            channels: number(fields::CHANNELS)?.map(|c| c as u32),
            duration_secs,
            bitrate_kbps,
        },
        StreamKind::Text => StreamDetails::Text,
    };

    let info = match raw.field(fields::TITLE).trim() {
        "" => raw.field(fields::CODEC_INFO),
        title => title,
    };

    Ok(StreamRecord {
        index,
        format: normalize(raw.field(fields::FORMAT)),
        language: normalize(raw.field(fields::LANGUAGE)),
        info: normalize(info),
        bluray: raw.field(fields::SOURCE_MEDIUM).trim() == BLURAY_MEDIUM,
        details,
    })
}

fn normalize(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Empty means unknown; anything else must be a non-negative number.
///
/// Some containers report alternatives such as `"8 / 6"` for channel layouts;
/// the first value wins.
fn parse_number(raw: &str) -> Result<Option<f64>, String> {
    let first = raw.split('/').next().unwrap_or("").trim();
    if first.is_empty() {
        return Ok(None);
    }
    match first.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(raw.to_string()),
    }
}

fn display_opt(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Formats seconds as `"<m> minutes and <s> seconds"`.
pub fn format_duration(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    if minutes > 0 {
        format!("{} minutes and {} seconds", minutes, seconds)
    } else {
        format!("{} seconds", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn video() -> RawStream {
        RawStream::new()
            .with(fields::FORMAT, "AVC")
            .with(fields::WIDTH, "1920")
            .with(fields::HEIGHT, "1080")
            .with(fields::DURATION, "1420544")
            .with(fields::BIT_RATE, "24500000")
            .with(fields::SOURCE_MEDIUM, "Blu-ray")
    }

    fn audio(format: &str, lang: &str, channels: &str) -> RawStream {
        RawStream::new()
            .with(fields::FORMAT, format)
            .with(fields::LANGUAGE, lang)
            .with(fields::CHANNELS, channels)
            .with(fields::DURATION, "1420500")
            .with(fields::BIT_RATE, "192000")
    }

    fn report() -> ProbeReport {
        ProbeReport {
            video: vec![video()],
            audio: vec![audio("FLAC", "ja", "6"), audio("AAC", "en", "2")],
            text: vec![
                RawStream::new()
                    .with(fields::FORMAT, "ASS")
                    .with(fields::LANGUAGE, "en")
                    .with(fields::TITLE, "Signs & Songs"),
                RawStream::new().with(fields::FORMAT, "PGS"),
            ],
        }
    }

    #[test]
    fn test_build_preserves_probe_order() {
        let catalog = StreamCatalog::build(&report()).unwrap();

        assert_eq!(catalog.streams(StreamKind::Video).len(), 1);
        assert_eq!(catalog.streams(StreamKind::Audio).len(), 2);
        assert_eq!(catalog.streams(StreamKind::Text).len(), 2);
        assert_eq!(catalog.streams(StreamKind::Audio)[0].format, "FLAC");
        assert_eq!(catalog.streams(StreamKind::Audio)[1].index, 1);
    }

    #[test]
    fn test_build_parses_numeric_fields() {
        let catalog = StreamCatalog::build(&report()).unwrap();
        let primary = catalog.primary_video().unwrap();

        assert_eq!(primary.duration_secs(), Some(1420));
        assert_eq!(primary.bitrate_kbps(), Some(24500));
        assert!(primary.bluray);
        assert_eq!(
            primary.details,
            StreamDetails::Video {
                width: Some(1920),
                height: Some(1080),
                duration_secs: Some(1420),
                bitrate_kbps: Some(24500),
            }
        );
        assert_eq!(catalog.streams(StreamKind::Audio)[0].channels(), Some(6));
    }

    #[test]
    fn test_missing_fields_are_normalized() {
        let catalog = StreamCatalog::build(&report()).unwrap();
        let pgs = &catalog.streams(StreamKind::Text)[1];

        assert_eq!(pgs.language, UNKNOWN);
        assert_eq!(pgs.info, UNKNOWN);
        assert!(!pgs.bluray);

        let bare = ProbeReport {
            video: vec![RawStream::new()],
            audio: vec![RawStream::new()],
            text: vec![],
        };
        let catalog = StreamCatalog::build(&bare).unwrap();
        let audio = &catalog.streams(StreamKind::Audio)[0];
        assert_eq!(audio.format, UNKNOWN);
        assert_eq!(audio.channels(), None);
        assert_eq!(audio.duration_secs(), None);
    }

    #[test]
    fn test_empty_audio_is_rejected() {
        let mut report = report();
        report.audio.clear();

        let result = StreamCatalog::build(&report);
        assert!(matches!(result, Err(CatalogError::EmptyCatalog)));
    }

    #[test]
    fn test_missing_video_is_rejected() {
        let mut report = report();
        report.video.clear();

        let result = StreamCatalog::build(&report);
        assert!(matches!(result, Err(CatalogError::NoVideo)));
    }

    #[test]
    fn test_unparsable_number_is_rejected() {
        let mut report = report();
        report.audio[1] = audio("AAC", "en", "stereo");

        match StreamCatalog::build(&report) {
            Err(CatalogError::InvalidNumber { kind, index, field, value }) => {
                assert_eq!(kind, StreamKind::Audio);
                assert_eq!(index, 1);
                assert_eq!(field, fields::CHANNELS);
                assert_eq!(value, "stereo");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_alternatives_take_first() {
        let mut report = report();
        report.audio[0] = audio("DTS", "en", "8 / 6");

        let catalog = StreamCatalog::build(&report).unwrap();
        assert_eq!(catalog.streams(StreamKind::Audio)[0].channels(), Some(8));
    }

    #[test]
    fn test_labels_and_lookup() {
        let catalog = StreamCatalog::build(&report()).unwrap();

        assert_eq!(
            catalog.labels(StreamKind::Audio),
            vec!["1. FLAC / ja", "2. AAC / en"]
        );
        assert_eq!(
            catalog.labels(StreamKind::Text),
            vec!["1. ASS / en / Signs & Songs", "2. PGS / -"]
        );

        let found = catalog.lookup(StreamKind::Audio, "2. AAC / en").unwrap();
        assert_eq!(found.index, 1);
        assert!(catalog.lookup(StreamKind::Audio, "3. AAC / en").is_none());
    }

    #[test]
    fn test_info_falls_back_to_codec_info() {
        let mut report = report();
        report.text[1] = RawStream::new()
            .with(fields::FORMAT, "PGS")
            .with(fields::CODEC_INFO, "Picture based subtitle format");

        let catalog = StreamCatalog::build(&report).unwrap();
        assert_eq!(
            catalog.streams(StreamKind::Text)[1].info,
            "Picture based subtitle format"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45 seconds");
        assert_eq!(format_duration(1420), "23 minutes and 40 seconds");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Sequence lengths follow the reported counts and labels stay unique.
        #[test]
        fn prop_catalog_matches_reported_counts(
            audio_count in 1usize..8,
            text_count in 0usize..8,
            format in "[A-Z]{2,5}",
        ) {
            let report = ProbeReport {
                video: vec![video()],
                audio: (0..audio_count).map(|_| audio(&format, "en", "2")).collect(),
                text: (0..text_count)
                    .map(|_| RawStream::new().with(fields::FORMAT, format.as_str()))
                    .collect(),
            };

            let catalog = StreamCatalog::build(&report).unwrap();
            prop_assert_eq!(catalog.streams(StreamKind::Audio).len(), audio_count);
            prop_assert_eq!(catalog.streams(StreamKind::Text).len(), text_count);

            let labels = catalog.labels(StreamKind::Audio);
            for (position, label) in labels.iter().enumerate() {
                let record = catalog.lookup(StreamKind::Audio, label).unwrap();
                prop_assert_eq!(record.index, position);
            }
        }
    }
}
