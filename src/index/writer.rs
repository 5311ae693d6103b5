use crate::index::backend::ShardBuilder;
use crate::index::types::*;
use crate::utils::{delta_encode, index_content, write_bytes, write_u32_le};
use anyhow::{Context, Result};
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Fully materialized index contents, ready to be written
#[derive(Debug, Default)]
pub struct IndexData {
    pub roots: Vec<PathBuf>,
    /// Sorted; a file's id is its position here
    pub names: Vec<PathBuf>,
    pub postings: BTreeMap<Trigram, RoaringBitmap>,
}

impl IndexData {
    /// Write to `path` through a sibling temp file and a rename, so readers
    /// see either the previous file or the complete new one.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

        {
            let mut out = BufWriter::new(&mut tmp);
            self.encode(&mut out)?;
            out.flush()?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write index {}", path.display()))?;
        Ok(())
    }

    fn encode<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(INDEX_MAGIC)?;

        write_u32_le(out, self.roots.len() as u32)?;
        for root in &self.roots {
            write_bytes(out, root.to_string_lossy().as_bytes())?;
        }

        write_u32_le(out, self.names.len() as u32)?;
        for name in &self.names {
            write_bytes(out, name.to_string_lossy().as_bytes())?;
        }

        write_u32_le(out, self.postings.len() as u32)?;
        let mut encoded = Vec::new();
        for (&trigram, ids) in &self.postings {
            encoded.clear();
            delta_encode(ids.iter(), &mut encoded);

            write_u32_le(out, trigram)?;
            write_u32_le(out, ids.len() as u32)?;
            write_bytes(out, &encoded)?;
        }

        out.write_all(INDEX_TRAILER)
    }
}

/// Builds a new index file from individually added source files
pub struct IndexWriter {
    path: PathBuf,
    max_file_size: u64,
    verbose: bool,
    roots: Vec<PathBuf>,
    /// Latest trigram set per file; re-adding a path replaces it
    files: FxHashMap<PathBuf, Vec<Trigram>>,
    skipped: usize,
}

impl IndexWriter {
    pub fn new(path: &Path, max_file_size: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            max_file_size,
            verbose: false,
            roots: Vec::new(),
            files: FxHashMap::default(),
            skipped: 0,
        }
    }

    fn into_data(self) -> (IndexData, usize) {
        let mut files: Vec<_> = self.files.into_iter().collect();
        files.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut postings: BTreeMap<Trigram, RoaringBitmap> = BTreeMap::new();
        let mut names = Vec::with_capacity(files.len());
        for (id, (name, trigrams)) in files.into_iter().enumerate() {
            for trigram in trigrams {
                postings.entry(trigram).or_default().insert(id as FileId);
            }
            names.push(name);
        }

        let mut roots = self.roots;
        roots.sort();
        roots.dedup();

        (
            IndexData {
                roots,
                names,
                postings,
            },
            self.skipped,
        )
    }
}

impl ShardBuilder for IndexWriter {
    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    fn add_roots(&mut self, roots: &[PathBuf]) {
        self.roots.extend_from_slice(roots);
    }

    fn add_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read(path).with_context(|| format!("{}", path.display()))?;

        match index_content(&content, self.max_file_size) {
            Ok(trigrams) => {
                self.files.insert(path.to_path_buf(), trigrams);
            }
            Err(reason) => {
                self.skipped += 1;
                if self.verbose {
                    info!("{}: skipped, {}", path.display(), reason);
                } else {
                    debug!("{}: skipped, {}", path.display(), reason);
                }
            }
        }
        Ok(())
    }

    fn flush(self) -> Result<ShardSummary> {
        let path = self.path.clone();
        let (data, skipped) = self.into_data();
        data.write_to(&path)?;

        Ok(ShardSummary {
            files: data.names.len(),
            skipped,
            trigrams: data.postings.len(),
        })
    }
}
