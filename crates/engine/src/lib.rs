//! Episodic
//!
//! Interactive batch transcoder: probes a season of episodes, asks the operator
//! once for the encode settings, and runs the encoder over every file with
//! identical parameters.

pub mod batch;
pub mod catalog;
pub mod encode;
pub mod manifest;
pub mod probe;
pub mod prompt;
pub mod resolve;
pub mod runner;
pub mod scan;
pub mod startup;

pub use episodic_config as config;
pub use episodic_config::Config;
pub use batch::{BatchError, Invocation, RunContext, RunOutcome};
pub use catalog::{CatalogError, StreamCatalog, StreamDetails, StreamRecord};
pub use encode::{escape_filter_path, ArgumentCache, EncodePass, InvocationSettings};
pub use manifest::{episode_width, FileManifest};
pub use probe::{MediaInfoProbe, Probe, ProbeError, ProbeReport, RawStream, StreamKind};
pub use prompt::{Prompt, PromptError, Question, QuestionKind, TerminalPrompt};
pub use resolve::{
    AudioCodec, AudioMode, AudioSelection, EncodeConfig, OptionResolver, ResolveError,
    SubtitleBurnIn, SubtitleCodec, VideoParams,
};
pub use runner::{classify, Execute, ExitPolicy, ProcessRunner, RunnerError, Termination};
pub use scan::{list_sources, ScanError};
pub use startup::{run_startup_checks, StartupError, Toolchain};
