//! Batch pipeline: single-file and whole-season runs.
//!
//! A [`RunContext`] owns everything scoped to one run: configuration, the
//! probe, the encoder executor and the argument cache. Files are encoded one
//! at a time and the first failure aborts the run.

use crate::catalog::{CatalogError, StreamCatalog};
use crate::encode::{ArgumentCache, EncodePass, InvocationSettings};
use crate::manifest::FileManifest;
use crate::probe::{Probe, ProbeError};
use crate::prompt::{ask_number, confirm, Prompt, PromptError};
use crate::resolve::{EncodeConfig, OptionResolver, ResolveError};
use crate::runner::{Execute, RunnerError};
use crate::scan::{list_sources, ScanError};
use crate::startup::StartupError;
use console::style;
use episodic_config::{Config, ConfigError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error type for pipeline runs
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Startup check failed
    #[error("Startup check failed: {0}")]
    Startup(#[from] StartupError),

    /// The operator did not accept the listing-order assumption
    #[error("File ordering not confirmed, nothing was encoded")]
    OrderDeclined,

    /// The operator refused to clean an existing output directory
    #[error("Output directory {} was not cleaned, aborting", .0.display())]
    CleanupDeclined(PathBuf),

    #[error("Will not overwrite existing file {}", .0.display())]
    SameInputOutput(PathBuf),

    /// The batch output directory is, or contains, the source directory
    #[error("Output directory {} would overwrite the source files", .0.display())]
    OutputHoldsSources(PathBuf),

    #[error("File \"{}\" does not exist", .0.display())]
    InputMissing(PathBuf),

    #[error("You must specify a valid output file, {} is a directory", .0.display())]
    OutputIsDirectory(PathBuf),

    /// Creating or cleaning the output directory failed
    #[error("Failed to prepare output directory {}: {source}", .dir.display())]
    OutputDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The encoder failed on a file; the rest of the run is abandoned
    #[error("Failed to transcode {}: {source}", .file.display())]
    Encode {
        file: PathBuf,
        #[source]
        source: RunnerError,
    },

    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Scan(#[from] ScanError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// What the two command-line paths mean
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Single { input: PathBuf, output: PathBuf },
    Batch { input_dir: PathBuf, output_dir: PathBuf },
}

impl Invocation {
    /// Batch mode when `input` is a directory and `output` is not an existing
    /// file; single-file mode otherwise.
    pub fn detect(input: &Path, output: &Path) -> Self {
        if input.is_dir() && !output.is_file() {
            Invocation::Batch {
                input_dir: input.to_path_buf(),
                output_dir: output.to_path_buf(),
            }
        } else {
            Invocation::Single {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
            }
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every file was encoded
    Completed,
    /// The operator stopped after reviewing the test encode
    StoppedAfterTest,
}

/// State scoped to a single run
pub struct RunContext<P, E> {
    config: Config,
    probe: P,
    executor: E,
    cache: ArgumentCache,
}

impl<P: Probe, E: Execute> RunContext<P, E> {
    pub fn new(config: Config, probe: P, executor: E) -> Self {
        let cache = ArgumentCache::new(InvocationSettings::from_config(&config));
        Self {
            config,
            probe,
            executor,
            cache,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn cache(&self) -> &ArgumentCache {
        &self.cache
    }

    pub fn run<Q: Prompt + ?Sized>(
        &mut self,
        invocation: &Invocation,
        prompt: &mut Q,
    ) -> Result<RunOutcome, BatchError> {
        let outcome = match invocation {
            Invocation::Single { input, output } => self.run_single(input, output, prompt)?,
            Invocation::Batch {
                input_dir,
                output_dir,
            } => self.run_batch(input_dir, output_dir, prompt)?,
        };
        info!("All done !");
        Ok(outcome)
    }

    fn run_single<Q: Prompt + ?Sized>(
        &mut self,
        input: &Path,
        output: &Path,
        prompt: &mut Q,
    ) -> Result<RunOutcome, BatchError> {
        validate_single(input, output)?;
        info!(
            "Working in single file mode using \"{}\" -> \"{}\"",
            input.display(),
            output.display()
        );

        let config = self.resolve(input, 1, prompt)?;
        let pass = if config.test_encode {
            EncodePass::Test
        } else {
            EncodePass::Full
        };
        self.encode(&config, pass, input, output)?;
        Ok(RunOutcome::Completed)
    }

    fn run_batch<Q: Prompt + ?Sized>(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
        prompt: &mut Q,
    ) -> Result<RunOutcome, BatchError> {
        validate_batch(input_dir, output_dir)?;
        info!("Working in batch mode");
        print_order_notice(&self.config.batch.extensions);
        if !confirm(prompt, "batch_check", "Is this acceptable?")? {
            return Err(BatchError::OrderDeclined);
        }

        let files = list_sources(
            input_dir,
            &self.config.batch.extensions,
            self.config.batch.skip_count,
        )?;

        let season = ask_number(
            prompt,
            "season_c",
            "What season is this? Please enter a number:",
            "Please enter a valid season number.",
        )?;
        let start = if confirm(
            prompt,
            "should_start_at",
            "Do you want to start from a specific episode?",
        )? {
            ask_number(
                prompt,
                "start_at",
                "Please enter a starting point:",
                "Please enter a valid episode number.",
            )?
        } else {
            1
        };

        let first = input_dir.join(&files[0]);
        debug!(file = %first.display(), "probing first file of the batch");
        let config = self.resolve(&first, start, prompt)?;

        let manifest = FileManifest::new(input_dir, files, season, config.start_episode);
        info!(
            "Season {} has {} files, starting at episode {}",
            manifest.season(),
            manifest.episode_count(),
            manifest.start_episode()
        );
        prepare_output_dir(output_dir, prompt)?;

        let container = self.config.batch.container.clone();

        if config.test_encode {
            let output = manifest.output_path(output_dir, 0, &container);
            info!("Completing a test encode of {}", output.display());
            self.encode(&config, EncodePass::Test, &first, &output)?;

            if !confirm(
                prompt,
                "should_continue",
                "Processing has finished. Should we continue with the batch?",
            )? {
                return Ok(RunOutcome::StoppedAfterTest);
            }
        }

        let config = EncodeConfig {
            test_encode: false,
            ..config
        };

        for (input, output) in manifest.jobs(output_dir, &container) {
            debug!("now transcoding {} -> {}", input.display(), output.display());
            self.encode(&config, EncodePass::Full, &input, &output)?;
        }

        Ok(RunOutcome::Completed)
    }

    /// Probe `input`, build its catalog, and ask the operator for the run's settings.
    fn resolve<Q: Prompt + ?Sized>(
        &self,
        input: &Path,
        start_episode: u64,
        prompt: &mut Q,
    ) -> Result<EncodeConfig, BatchError> {
        let report = self.probe.probe(input)?;
        let catalog = StreamCatalog::build(&report)?;
        let config = OptionResolver::new(&catalog)
            .test_threshold_secs(self.config.test_encode.min_source_secs)
            .test_clip_secs(self.config.test_encode.clip_secs)
            .starting_at(start_episode)
            .resolve(prompt)?;
        debug!(?config, "resolved encode configuration");
        Ok(config)
    }

    fn encode(
        &mut self,
        config: &EncodeConfig,
        pass: EncodePass,
        input: &Path,
        output: &Path,
    ) -> Result<(), BatchError> {
        let argv = self.cache.invocation(config, pass, input, output);
        self.executor
            .execute(&argv)
            .map_err(|source| BatchError::Encode {
                file: input.to_path_buf(),
                source,
            })
    }
}

fn validate_single(input: &Path, output: &Path) -> Result<(), BatchError> {
    let same = input == output
        || matches!(
            (input.canonicalize(), output.canonicalize()),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        return Err(BatchError::SameInputOutput(output.to_path_buf()));
    }
    if !input.is_file() {
        return Err(BatchError::InputMissing(input.to_path_buf()));
    }
    if output.is_dir() {
        return Err(BatchError::OutputIsDirectory(output.to_path_buf()));
    }
    Ok(())
}

/// The output directory is wiped on consent, so it must not be the source
/// directory or any of its ancestors.
fn validate_batch(input_dir: &Path, output_dir: &Path) -> Result<(), BatchError> {
    let holds_sources = input_dir == output_dir
        || matches!(
            (input_dir.canonicalize(), output_dir.canonicalize()),
            (Ok(input), Ok(output)) if input.starts_with(&output)
        );
    if holds_sources {
        return Err(BatchError::OutputHoldsSources(output_dir.to_path_buf()));
    }
    Ok(())
}

/// Create `dir`, or with the operator's consent wipe and recreate it.
fn prepare_output_dir<Q: Prompt + ?Sized>(dir: &Path, prompt: &mut Q) -> Result<(), BatchError> {
    let io_err = |source: io::Error| BatchError::OutputDir {
        dir: dir.to_path_buf(),
        source,
    };

    if dir.is_dir() {
        warn!(
            "Potentially destructive action ahead, {} before continuing.",
            style("READ CAREFULLY").red()
        );
        println!();
        println!("Note: the encoder WILL overwrite files with duplicate names.");
        println!("If you need them remove them now or exit.");
        println!();

        if !confirm(
            prompt,
            "should_remove",
            "The directory already exists, should we clean it?",
        )? {
            return Err(BatchError::CleanupDeclined(dir.to_path_buf()));
        }
        fs::remove_dir_all(dir).map_err(io_err)?;
    }

    fs::create_dir_all(dir).map_err(io_err)
}

fn print_order_notice(extensions: &[String]) {
    println!();
    println!(
        "This program assumes every target in this directory ends with {}",
        style(extensions.join(" or ")).bold()
    );
    println!("and the targets are named such that lexicographical sorting will order them correctly,");
    println!("if this is not the case exit now.");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{fields, ProbeReport, RawStream};
    use crate::prompt::testing::ScriptedPrompt;
    use crate::prompt::{NO, YES};
    use crate::runner::testing::RecordingExecutor;
    use std::cell::RefCell;
    use std::fs::File;
    use tempfile::TempDir;

    /// Probe that returns the same report for every path.
    struct FakeProbe {
        duration_ms: &'static str,
        probed: RefCell<Vec<PathBuf>>,
    }

    impl FakeProbe {
        fn new(duration_ms: &'static str) -> Self {
            Self {
                duration_ms,
                probed: RefCell::new(Vec::new()),
            }
        }
    }

    impl Probe for FakeProbe {
        fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError> {
            self.probed.borrow_mut().push(path.to_path_buf());
            Ok(ProbeReport {
                video: vec![RawStream::new()
                    .with(fields::FORMAT, "AVC")
                    .with(fields::DURATION, self.duration_ms)],
                audio: vec![RawStream::new()
                    .with(fields::FORMAT, "FLAC")
                    .with(fields::LANGUAGE, "ja")
                    .with(fields::CHANNELS, "2")],
                text: vec![],
            })
        }
    }

    fn season_dir(names: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        fs::create_dir(&input).unwrap();
        for name in names {
            File::create(input.join(name)).unwrap();
        }
        temp_dir
    }

    fn context(
        duration_ms: &'static str,
        executor: RecordingExecutor,
    ) -> RunContext<FakeProbe, RecordingExecutor> {
        RunContext::new(Config::default(), FakeProbe::new(duration_ms), executor)
    }

    /// Answers for a short source: no start offset, copy audio, no tuning.
    fn batch_answers() -> Vec<&'static str> {
        vec![YES, "1", NO, "1. FLAC / ja", YES, NO, "20", "slow"]
    }

    fn last_arg(ctx: &RunContext<FakeProbe, RecordingExecutor>, call: usize) -> String {
        ctx.executor().call_strings(call).last().unwrap().clone()
    }

    #[test]
    fn test_batch_numbers_episodes_in_listing_order() {
        let temp_dir = season_dir(&["c.mkv", "a.mkv", "b.mkv", "notes.txt"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        let mut ctx = context("60000", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new(batch_answers());

        let outcome = ctx
            .run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
        assert!(output.is_dir());
        assert_eq!(ctx.executor().calls.len(), 3);
        for (call, (name, episode)) in [("a", "01"), ("b", "02"), ("c", "03")].iter().enumerate() {
            let argv = ctx.executor().call_strings(call);
            assert_eq!(argv[2], input.join(format!("{}.mkv", name)).to_string_lossy());
            assert_eq!(
                last_arg(&ctx, call),
                output.join(format!("S01E{}.mp4", episode)).to_string_lossy()
            );
        }
        assert_eq!(ctx.probe.probed.borrow().as_slice(), &[input.join("a.mkv")]);
        assert_eq!(prompt.remaining(), 0);
    }

    #[test]
    fn test_batch_start_offset() {
        let temp_dir = season_dir(&["a.mkv", "b.mkv", "c.mkv"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        let mut ctx = context("60000", RecordingExecutor::default());
        let mut prompt =
            ScriptedPrompt::new([YES, "2", YES, "5", "1. FLAC / ja", YES, NO, "20", "slow"]);

        ctx.run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        assert_eq!(last_arg(&ctx, 0), output.join("S02E05.mp4").to_string_lossy());
        assert_eq!(last_arg(&ctx, 2), output.join("S02E07.mp4").to_string_lossy());
    }

    #[test]
    fn test_batch_aborts_on_first_failure() {
        let temp_dir = season_dir(&["a.mkv", "b.mkv", "c.mkv"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        let mut ctx = context("60000", RecordingExecutor::failing_on(1, 1));
        let mut prompt = ScriptedPrompt::new(batch_answers());

        let result = ctx.run(&Invocation::detect(&input, &output), &mut prompt);

        match result {
            Err(BatchError::Encode { file, source }) => {
                assert_eq!(file, input.join("b.mkv"));
                assert!(matches!(source, RunnerError::NonZeroExit(1)));
            }
            other => panic!("expected Encode error, got {:?}", other),
        }
        assert_eq!(ctx.executor().calls.len(), 2);
    }

    #[test]
    fn test_batch_declined_order_encodes_nothing() {
        let temp_dir = season_dir(&["a.mkv"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        let mut ctx = context("60000", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new([NO]);

        let result = ctx.run(&Invocation::detect(&input, &output), &mut prompt);

        assert!(matches!(result, Err(BatchError::OrderDeclined)));
        assert!(ctx.executor().calls.is_empty());
        assert!(ctx.probe.probed.borrow().is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn test_existing_output_cleaned_on_consent() {
        let temp_dir = season_dir(&["a.mkv"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        fs::create_dir(&output).unwrap();
        File::create(output.join("stale.mp4")).unwrap();

        let mut ctx = context("60000", RecordingExecutor::default());
        let mut answers = batch_answers();
        answers.push(YES);
        let mut prompt = ScriptedPrompt::new(answers);

        ctx.run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        assert!(output.is_dir());
        assert!(!output.join("stale.mp4").exists());
        assert!(prompt.asked_ids().contains(&"should_remove"));
        assert_eq!(ctx.executor().calls.len(), 1);
    }

    #[test]
    fn test_existing_output_cleanup_declined_aborts() {
        let temp_dir = season_dir(&["a.mkv"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        fs::create_dir(&output).unwrap();
        File::create(output.join("keep.mp4")).unwrap();

        let mut ctx = context("60000", RecordingExecutor::default());
        let mut answers = batch_answers();
        answers.push(NO);
        let mut prompt = ScriptedPrompt::new(answers);

        let result = ctx.run(&Invocation::detect(&input, &output), &mut prompt);

        assert!(matches!(result, Err(BatchError::CleanupDeclined(_))));
        assert!(output.join("keep.mp4").exists());
        assert!(ctx.executor().calls.is_empty());
    }

    #[test]
    fn test_declining_after_test_encode_stops_successfully() {
        let temp_dir = season_dir(&["a.mkv", "b.mkv"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        let mut ctx = context("1420544", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new([
            YES, "1", NO, "1. FLAC / ja", YES, NO, "20", YES, "slow", NO,
        ]);

        let outcome = ctx
            .run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        assert_eq!(outcome, RunOutcome::StoppedAfterTest);
        assert_eq!(ctx.executor().calls.len(), 1);
        let argv = ctx.executor().call_strings(0);
        assert!(argv.windows(2).any(|pair| pair == ["-t", "60"]));
        assert_eq!(last_arg(&ctx, 0), output.join("S01E01.mp4").to_string_lossy());
        assert!(!ctx.cache().is_frozen());
    }

    #[test]
    fn test_accepted_test_encode_runs_full_batch() {
        let temp_dir = season_dir(&["a.mkv", "b.mkv"]);
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        let mut ctx = context("1420544", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new([
            YES, "1", NO, "1. FLAC / ja", YES, NO, "20", YES, "slow", YES,
        ]);

        ctx.run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        let calls = &ctx.executor().calls;
        assert_eq!(calls.len(), 3);
        assert!(ctx.cache().is_frozen());

        let first = ctx.executor().call_strings(1);
        let second = ctx.executor().call_strings(2);
        assert!(!first.contains(&"-t".to_string()));
        let last = first.len() - 1;
        assert_eq!(first[3..last], second[3..last]);
        assert_eq!(last_arg(&ctx, 1), output.join("S01E01.mp4").to_string_lossy());
        assert_eq!(last_arg(&ctx, 2), output.join("S01E02.mp4").to_string_lossy());
    }

    #[test]
    fn test_single_same_input_and_output_never_spawns() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("ep.mkv");
        File::create(&file).unwrap();
        let mut ctx = context("60000", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());

        let result = ctx.run(&Invocation::detect(&file, &file), &mut prompt);

        assert!(matches!(result, Err(BatchError::SameInputOutput(_))));
        assert!(ctx.executor().calls.is_empty());
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn test_batch_output_holding_sources_is_rejected() {
        let temp_dir = season_dir(&["a.mkv", "b.mkv"]);
        let input = temp_dir.path().join("in");

        for output in [input.clone(), temp_dir.path().to_path_buf(), input.join("..")] {
            let mut ctx = context("60000", RecordingExecutor::default());
            let mut answers = batch_answers();
            answers.push(YES);
            let mut prompt = ScriptedPrompt::new(answers);

            let result = ctx.run(&Invocation::detect(&input, &output), &mut prompt);

            assert!(matches!(result, Err(BatchError::OutputHoldsSources(_))));
            assert!(prompt.asked.is_empty());
            assert!(ctx.executor().calls.is_empty());
            assert!(input.join("a.mkv").exists());
            assert!(input.join("b.mkv").exists());
        }
    }

    #[test]
    fn test_batch_output_inside_sources_is_allowed() {
        let temp_dir = season_dir(&["a.mkv"]);
        let input = temp_dir.path().join("in");
        let output = input.join("encoded");
        let mut ctx = context("60000", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new(batch_answers());

        ctx.run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        assert!(output.is_dir());
        assert!(input.join("a.mkv").exists());
        assert_eq!(last_arg(&ctx, 0), output.join("S01E01.mp4").to_string_lossy());
    }

    #[test]
    fn test_single_validation_errors() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("ep.mkv");
        let mut ctx = context("60000", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());

        let result = ctx.run(
            &Invocation::detect(&input, &temp_dir.path().join("out.mp4")),
            &mut prompt,
        );
        assert!(matches!(result, Err(BatchError::InputMissing(_))));

        File::create(&input).unwrap();
        let result = ctx.run(&Invocation::detect(&input, temp_dir.path()), &mut prompt);
        assert!(matches!(result, Err(BatchError::OutputIsDirectory(_))));
    }

    #[test]
    fn test_single_file_encode() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("ep.mkv");
        let output = temp_dir.path().join("ep.mp4");
        File::create(&input).unwrap();
        let mut ctx = context("60000", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new(["1. FLAC / ja", YES, NO, "20", "slow"]);

        let outcome = ctx
            .run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(ctx.executor().calls.len(), 1);
        let argv = ctx.executor().call_strings(0);
        assert_eq!(argv[..3], ["-y", "-i", &*input.to_string_lossy()]);
        assert_eq!(last_arg(&ctx, 0), output.to_string_lossy());
    }

    #[test]
    fn test_single_file_test_encode_only_clips() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("ep.mkv");
        let output = temp_dir.path().join("ep.mp4");
        File::create(&input).unwrap();
        let mut ctx = context("1420544", RecordingExecutor::default());
        let mut prompt = ScriptedPrompt::new(["1. FLAC / ja", YES, NO, "20", YES, "slow"]);

        ctx.run(&Invocation::detect(&input, &output), &mut prompt)
            .unwrap();

        assert_eq!(ctx.executor().calls.len(), 1);
        assert!(ctx.executor().call_strings(0).contains(&"-ss".to_string()));
    }

    #[test]
    fn test_invocation_detect() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("season");
        fs::create_dir(&dir).unwrap();
        let file = temp_dir.path().join("ep.mkv");
        File::create(&file).unwrap();
        let missing = temp_dir.path().join("out");

        assert!(matches!(
            Invocation::detect(&dir, &missing),
            Invocation::Batch { .. }
        ));
        // an existing directory as output is still batch mode
        assert!(matches!(
            Invocation::detect(&dir, temp_dir.path()),
            Invocation::Batch { .. }
        ));
        assert!(matches!(
            Invocation::detect(&dir, &file),
            Invocation::Single { .. }
        ));
        assert!(matches!(
            Invocation::detect(&file, &missing),
            Invocation::Single { .. }
        ));
    }
}
