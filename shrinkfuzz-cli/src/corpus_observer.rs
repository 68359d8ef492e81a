//! Persists the corpus to disk: one file per live witness under `seeds/`,
//! one hardlink per label under `exemplars/`, one file per dropped witness
//! under `unstable/`. Grounded on the original driver's `added`/`removed`/
//! `best_changed`/`unstable_callback` closures
//! (`original_source/src/shrinkfuzz/__main__.py`).

use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use shrinkfuzz_core::ShrinkObserver;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn sha1_hex8(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest[..4].iter().map(|b| format!("{b:02x}")).collect()
}

fn name_for(n: &str, input_path: &Path) -> String {
    format!("{n}-{}", input_path.display())
}

fn hashed_name(s: &[u8], input_path: &Path) -> String {
    name_for(&sha1_hex8(s), input_path)
}

pub struct FileCorpusObserver {
    input_path: PathBuf,
    seeds_dir: PathBuf,
    exemplars_dir: PathBuf,
    unstable_dir: PathBuf,
}

impl FileCorpusObserver {
    pub fn new(corpus_dir: &Path, input_path: PathBuf) -> Self {
        Self {
            input_path,
            seeds_dir: corpus_dir.join("seeds"),
            exemplars_dir: corpus_dir.join("exemplars"),
            unstable_dir: corpus_dir.join("unstable"),
        }
    }

    pub fn seed_path(&self, s: &[u8]) -> PathBuf {
        self.seeds_dir.join(hashed_name(s, &self.input_path))
    }

    fn link_exemplar(&self, label: &str, seed_path: &Path) -> Result<()> {
        let target = self.exemplars_dir.join(name_for(label, &self.input_path));
        let _ = fs::remove_file(&target);
        // A hardlink keeps the exemplar directory free of duplicate bytes on
        // disk; fall back to a copy across filesystem boundaries where
        // hardlinking isn't possible (a deliberate robustness improvement
        // over the original's bare `os.link`).
        if fs::hard_link(seed_path, &target).is_err() {
            fs::copy(seed_path, &target)
                .with_context(|| format!("failed to materialize exemplar for {label:?}"))?;
        }
        Ok(())
    }
}

impl ShrinkObserver for FileCorpusObserver {
    fn on_add(&mut self, s: &[u8]) {
        if let Err(err) = fs::write(self.seed_path(s), s) {
            eprintln!("failed to persist corpus witness: {err:#}");
        }
    }

    fn on_remove(&mut self, s: &[u8]) {
        let path = self.seed_path(s);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                eprintln!("failed to remove evicted witness {}: {err:#}", path.display());
            }
        }
    }

    fn on_change(&mut self, labels: &HashSet<String>, s: &[u8]) {
        let seed_path = self.seed_path(s);
        for label in labels {
            if let Err(err) = self.link_exemplar(label, &seed_path) {
                eprintln!("{err:#}");
            }
        }
    }

    fn on_unstable(&mut self, s: &[u8]) {
        let path = self.unstable_dir.join(hashed_name(s, &self.input_path));
        if let Err(err) = fs::write(path, s) {
            eprintln!("failed to record unstable witness: {err:#}");
        }
    }
}
