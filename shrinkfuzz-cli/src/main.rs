//! `shrinkfuzz` — drives an external program with the shrinkfuzz-core
//! shrinker engine: classify by subprocess exit code and output hash,
//! persist the corpus to disk, shrink forever.
//!
//! Grounded on `original_source/src/shrinkfuzz/__main__.py`'s `main`
//! command: same argument shape, same corpus directory layout, same
//! bootstrap order (classify initial input, classify the empty-string
//! baseline, reclassify any leftover seeds, then run).

mod corpus_observer;
mod subprocess_classifier;

use anyhow::{Context, Result};
use clap::Parser;
use corpus_observer::FileCorpusObserver;
use shrinkfuzz_core::{DebugSink, Shrinker};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use subprocess_classifier::SubprocessClassifier;

/// Coverage-free, behavior-partitioning fuzzer based on shrinking.
#[derive(Parser)]
#[command(name = "shrinkfuzz")]
#[command(about = "Shrink a corpus of inputs toward the smallest witness for each observed behavior")]
#[command(version)]
struct Cli {
    /// Shell command to run; reads `input` and may write `output`.
    command: String,

    /// Path the candidate input is written to before each run.
    input: PathBuf,

    /// Path the program under test may write its output to.
    output: PathBuf,

    /// Directory the corpus (seeds, exemplars, crashes, ...) is persisted under.
    #[arg(long, default_value = "corpus")]
    corpus: PathBuf,

    /// Time out subprocesses after this many seconds. `<= 0` disables the timeout.
    #[arg(long, default_value_t = 5.0)]
    timeout: f64,

    /// Emit verbose debug output while shrinking.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

/// Switches between the no-op and stderr debug sinks at runtime, since the
/// flag is only known once argument parsing has happened.
enum Sink {
    Quiet,
    Verbose,
}

impl DebugSink for Sink {
    fn event(&mut self, message: &str) {
        if matches!(self, Sink::Verbose) {
            eprintln!("{message}");
        }
    }
}

const SUBDIRS: &[&str] = &["crashes", "unstable", "timeouts", "seeds", "exemplars", "gallery"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    for subdir in SUBDIRS {
        fs::create_dir_all(cli.corpus.join(subdir))
            .with_context(|| format!("failed to create corpus/{subdir}"))?;
    }

    let initial = fs::read(&cli.input)
        .with_context(|| format!("failed to read initial input file {}", cli.input.display()))?;

    let initial_snapshot = cli.corpus.join(format!("initial-{}", cli.input.display()));
    if !initial_snapshot.exists() {
        fs::write(&initial_snapshot, &initial).context("failed to snapshot initial input")?;
    }

    let timeout = (cli.timeout > 0.0).then(|| Duration::from_secs_f64(cli.timeout));
    let classifier = SubprocessClassifier::new(
        cli.command.clone(),
        cli.input.clone(),
        cli.output.clone(),
        timeout,
        &cli.corpus,
    );
    let observer = FileCorpusObserver::new(&cli.corpus, cli.input.clone());
    let sink = if cli.debug { Sink::Verbose } else { Sink::Quiet };

    let mut shrinker =
        Shrinker::with_observer_and_sink([initial], classifier, observer, sink);

    if !shrinker.seen(b"") {
        shrinker.classify(b"");
    }

    let seeds_dir = cli.corpus.join("seeds");
    for entry in fs::read_dir(&seeds_dir).context("failed to list existing seeds")? {
        let entry = entry.context("failed to read seeds directory entry")?;
        let path = entry.path();
        let Ok(contents) = fs::read(&path) else {
            continue;
        };
        if !shrinker.seen(&contents) {
            let _ = fs::remove_file(&path);
            shrinker.classify(&contents);
        }
    }

    shrinker.run();

    Ok(())
}
