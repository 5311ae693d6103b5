//! Build, merge and publish a master index.
//!
//! A run moves through three stages, each producing a named artifact:
//!
//! 1. [`BuildPlan`] walks the roots into a builder and seals it as a
//!    [`SealedShard`]. In reset mode the shard *is* the master.
//! 2. [`SealedShard::merge`] combines an incremental shard with the old
//!    master into a [`MergeOutput`].
//! 3. [`MergeOutput::publish`] removes the shard and renames the merge
//!    output onto the master. This rename is the only step that changes
//!    what lives at the master path.

use crate::index::backend::{IndexBackend, ShardBuilder};
use crate::index::lock::IndexLock;
use crate::index::roots::{resolve_recorded_roots, resolve_roots};
use crate::index::types::{Artifacts, BuildMode, ShardSummary};
use crate::index::walk::{walk, WalkStats};
use crate::utils::app_data::IndexerConfig;
use crate::utils::progress::{ProgressBar, ProgressStyle};
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Totals for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub walk: WalkStats,
    /// Admitted files the builder could not read
    pub unreadable: usize,
    pub shard: ShardSummary,
}

/// What a run did to the master index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Reset with no paths: the master was deleted
    Wiped,
    Published {
        mode: BuildMode,
        roots: Vec<PathBuf>,
        stats: BuildStats,
    },
}

/// Stage 1: where and from what the shard is built
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub mode: BuildMode,
    pub artifacts: Artifacts,
    pub roots: Vec<PathBuf>,
}

impl BuildPlan {
    /// Pick reset or incremental mode for `master`
    pub fn new(master: &Path, roots: Vec<PathBuf>, reset: bool) -> Self {
        let mode = if reset || !master.exists() {
            BuildMode::Reset
        } else {
            BuildMode::Incremental
        };
        Self {
            mode,
            artifacts: Artifacts::for_master(master),
            roots,
        }
    }

    /// Path the builder writes to
    pub fn target(&self) -> &Path {
        match self.mode {
            BuildMode::Reset => &self.artifacts.master,
            BuildMode::Incremental => &self.artifacts.shard,
        }
    }

    /// Walk every root into a new builder and seal it
    pub fn build<B: IndexBackend>(
        self,
        backend: &B,
        config: &IndexerConfig,
    ) -> Result<(SealedShard, BuildStats)> {
        let target = self.target().to_path_buf();
        let mut builder = backend
            .create(&target)
            .with_context(|| format!("Failed to create index {}", target.display()))?;
        builder.set_verbose(config.verbose);
        builder.add_roots(&self.roots);

        let filter = config.admission_filter();
        let spinner = walk_spinner(config);
        let mut stats = BuildStats::default();

        for root in &self.roots {
            info!("index {}", root.display());
            let walked = walk(root, &filter, |path| {
                if let Err(e) = builder.add_file(path) {
                    warn!("{:#}", e);
                    stats.unreadable += 1;
                }
                if let Some(pb) = &spinner {
                    pb.inc(1);
                }
            });
            stats.walk.files += walked.files;
            stats.walk.errors += walked.errors;
        }

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        info!("flush index");
        stats.shard = builder
            .flush()
            .with_context(|| format!("Failed to write index {}", target.display()))?;

        Ok((
            SealedShard {
                mode: self.mode,
                artifacts: self.artifacts,
            },
            stats,
        ))
    }
}

/// A flushed index at the plan's target path
#[derive(Debug)]
pub struct SealedShard {
    mode: BuildMode,
    artifacts: Artifacts,
}

impl SealedShard {
    /// Stage 2. `None` in reset mode, where sealing already published.
    pub fn merge<B: IndexBackend>(self, backend: &B) -> Result<Option<MergeOutput>> {
        if self.mode == BuildMode::Reset {
            return Ok(None);
        }

        let Artifacts {
            master,
            shard,
            merged,
        } = &self.artifacts;
        info!("merge {} {}", master.display(), shard.display());
        backend.merge(merged, master, shard).with_context(|| {
            format!("Failed to merge {} into {}", shard.display(), master.display())
        })?;

        Ok(Some(MergeOutput {
            artifacts: self.artifacts,
        }))
    }
}

/// Stage 3 input: merged index waiting to replace the master
#[derive(Debug)]
pub struct MergeOutput {
    artifacts: Artifacts,
}

impl MergeOutput {
    /// Drop the shard and atomically move the merge output onto the master
    pub fn publish(self) -> Result<()> {
        let Artifacts {
            master,
            shard,
            merged,
        } = &self.artifacts;

        fs::remove_file(shard)
            .with_context(|| format!("Failed to remove shard {}", shard.display()))?;
        fs::rename(merged, master).with_context(|| {
            format!("Failed to publish {} as {}", merged.display(), master.display())
        })?;
        Ok(())
    }
}

/// Runs the whole update for one master index under its lock
pub struct IndexPipeline<'a, B: IndexBackend> {
    backend: &'a B,
    config: &'a IndexerConfig,
}

impl<'a, B: IndexBackend> IndexPipeline<'a, B> {
    pub fn new(backend: &'a B, config: &'a IndexerConfig) -> Self {
        Self { backend, config }
    }

    /// Update `master` from `inputs`.
    ///
    /// A reset that ends up with no resolved roots wipes the master. With
    /// no inputs, anything else re-indexes the roots the master records.
    pub fn run<P: AsRef<Path>>(&self, master: &Path, inputs: &[P]) -> Result<Outcome> {
        let _lock = IndexLock::acquire(master)?;

        if self.config.reset && inputs.is_empty() {
            wipe(master)?;
            return Ok(Outcome::Wiped);
        }

        let roots = if inputs.is_empty() {
            let recorded = self.recorded_roots(master)?;
            resolve_recorded_roots(&recorded)
        } else {
            resolve_roots(inputs)
        };

        if self.config.reset && roots.is_empty() {
            wipe(master)?;
            return Ok(Outcome::Wiped);
        }

        let plan = BuildPlan::new(master, roots, self.config.reset);
        let mode = plan.mode;
        let roots = plan.roots.clone();

        let (shard, stats) = plan.build(self.backend, self.config)?;
        if let Some(output) = shard.merge(self.backend)? {
            output.publish()?;
        }

        info!(
            "done: {} files indexed, {} skipped, {} unreadable",
            stats.shard.files,
            stats.shard.skipped,
            stats.unreadable + stats.walk.errors
        );
        Ok(Outcome::Published { mode, roots, stats })
    }

    fn recorded_roots(&self, master: &Path) -> Result<Vec<PathBuf>> {
        if !master.exists() {
            return Ok(Vec::new());
        }
        self.backend
            .roots(master)
            .with_context(|| format!("Failed to read roots from {}", master.display()))
    }
}

fn wipe(master: &Path) -> Result<()> {
    info!("remove {}", master.display());
    match fs::remove_file(master) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", master.display())),
    }
}

fn walk_spinner(config: &IndexerConfig) -> Option<ProgressBar> {
    if !config.show_progress {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {pos} files {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}
