//! Drives an external program as the classifier: writes the candidate to
//! the configured input file, runs `command` under a shell, waits (with an
//! optional timeout enforced by sending SIGINT then SIGKILL to the whole
//! process group), and turns the exit status plus any output file into a
//! label set.
//!
//! Grounded on the original Python driver's `classify` closure
//! (`original_source/src/shrinkfuzz/__main__.py`): return code becomes
//! `return-<code>`, the output file's content hash becomes
//! `output-<hash-or-None>`, crashes and timeouts are recorded to disk, and
//! first-seen output contents are copied into a gallery directory.

use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use sha1::{Digest, Sha1};
use shrinkfuzz_core::Classifier;
use std::collections::HashSet;
use std::fs;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn sha1_hex8(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest[..4].iter().map(|b| format!("{b:02x}")).collect()
}

/// Runs `command` (via `sh -c`) against the configured input/output files.
pub struct SubprocessClassifier {
    command: String,
    input_path: PathBuf,
    output_path: PathBuf,
    timeout: Option<Duration>,
    crashes_dir: PathBuf,
    timeouts_dir: PathBuf,
    gallery_dir: PathBuf,
    seen_output_hashes: HashSet<String>,
    first_call: bool,
}

impl SubprocessClassifier {
    pub fn new(
        command: String,
        input_path: PathBuf,
        output_path: PathBuf,
        timeout: Option<Duration>,
        corpus_dir: &Path,
    ) -> Self {
        Self {
            command,
            input_path,
            output_path,
            timeout,
            crashes_dir: corpus_dir.join("crashes"),
            timeouts_dir: corpus_dir.join("timeouts"),
            gallery_dir: corpus_dir.join("gallery"),
            seen_output_hashes: HashSet::new(),
            first_call: true,
        }
    }

    fn record(&self, dir: &Path, s: &[u8]) -> Result<()> {
        fs::write(dir.join(hashed_name(s, &self.input_path)), s)
            .with_context(|| format!("failed to record witness under {}", dir.display()))
    }

    /// Waits for `child` to exit, enforcing `self.timeout` by sending
    /// SIGINT then (after a grace period) SIGKILL to the child's whole
    /// process group. Returns `None` on timeout.
    fn wait_with_timeout(
        &self,
        child: &mut std::process::Child,
    ) -> Result<Option<std::process::ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return Ok(Some(child.wait().context("failed to wait for classifier subprocess")?));
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait().context("failed to poll classifier subprocess")? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                self.interrupt_wait_and_kill(child)?;
                return Ok(None);
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    /// Mirrors `interrupt_wait_and_kill` from the original: SIGINT to the
    /// process group, wait up to one second, then SIGKILL.
    fn interrupt_wait_and_kill(&self, child: &mut std::process::Child) -> Result<()> {
        // A negative pid targets the whole process group (the child was
        // spawned with `process_group(0)`, making it its own group leader).
        let group = Pid::from_raw(-(child.id() as i32));
        if kill(group, Signal::SIGINT).is_err() {
            // Process group is already gone.
            return Ok(());
        }
        for _ in 0..10 {
            if child.try_wait().ok().flatten().is_some() {
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        let _ = kill(group, Signal::SIGKILL);
        let _ = child.wait();
        Ok(())
    }
}

/// `name-input` — the same de-duplicating scheme the original uses so that
/// several concurrent fuzzing sessions against different input files don't
/// collide in a shared corpus directory.
fn name_for(n: &str, input_path: &Path) -> String {
    format!("{n}-{}", input_path.display())
}

fn hashed_name(s: &[u8], input_path: &Path) -> String {
    name_for(&sha1_hex8(s), input_path)
}

impl Classifier for SubprocessClassifier {
    fn classify(&mut self, input: &[u8]) -> HashSet<String> {
        self.run(input).unwrap_or_else(|err| {
            eprintln!("classifier error: {err:#}");
            HashSet::new()
        })
    }
}

impl SubprocessClassifier {
    fn run(&mut self, input: &[u8]) -> Result<HashSet<String>> {
        let _ = fs::remove_file(&self.output_path);
        fs::write(&self.input_path, input).context("failed to write candidate input file")?;

        let stdio = || {
            if self.first_call {
                Stdio::inherit()
            } else {
                Stdio::null()
            }
        };

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(stdio())
            .stdout(stdio())
            .stderr(stdio())
            .process_group(0)
            .spawn()
            .context("failed to spawn classifier subprocess")?;
        self.first_call = false;

        let Some(status) = self.wait_with_timeout(&mut child)? else {
            self.record(&self.timeouts_dir.clone(), input)?;
            return Ok(HashSet::new());
        };

        let mut results = HashSet::new();

        let code = match status.signal() {
            Some(sig) => -sig,
            None => status.code().unwrap_or(-1),
        };
        if code < 0 {
            self.record(&self.crashes_dir.clone(), input)?;
        }
        results.insert(format!("return-{code}"));

        let output_hash = match fs::read(&self.output_path) {
            Ok(contents) => {
                let hash = sha1_hex8(&contents);
                if self.seen_output_hashes.insert(hash.clone()) {
                    let basename = self
                        .output_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let gallery_file = self.gallery_dir.join(format!("{hash}-{basename}"));
                    fs::copy(&self.output_path, &gallery_file)
                        .context("failed to copy output into gallery")?;
                }
                Some(hash)
            }
            Err(_) => None,
        };
        results.insert(format!(
            "output-{}",
            output_hash.as_deref().unwrap_or("None")
        ));

        Ok(results)
    }
}
