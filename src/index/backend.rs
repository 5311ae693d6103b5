//! The narrow surface through which the pipeline drives an index store.
//!
//! The build pipeline never touches index bytes itself: it creates a
//! builder, feeds it admitted files, seals it, and asks the store to merge
//! two sealed indexes into a third. [`TrigramStore`] is the store shipped
//! with this crate; tests substitute recording fakes.

use crate::index::merge::merge_indexes;
use crate::index::reader::IndexReader;
use crate::index::types::{ShardSummary, DEFAULT_MAX_FILE_SIZE};
use crate::index::writer::IndexWriter;
use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading an index file
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{path}: not an index file")]
    BadMagic { path: PathBuf },

    #[error("{path}: index file is truncated or corrupt")]
    Corrupt { path: PathBuf },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An index under construction. Sealing consumes it.
pub trait ShardBuilder {
    /// Log every skipped file instead of only counting it
    fn set_verbose(&mut self, verbose: bool);

    /// Record the roots this index covers
    fn add_roots(&mut self, roots: &[PathBuf]);

    /// Append one admitted file. An error here concerns that file only.
    fn add_file(&mut self, path: &Path) -> Result<()>;

    /// Write the index to its target path
    fn flush(self) -> Result<ShardSummary>;
}

/// Factory and merge operations of an index store
pub trait IndexBackend {
    type Builder: ShardBuilder;

    /// Roots recorded in an existing index
    fn roots(&self, index: &Path) -> Result<Vec<PathBuf>>;

    /// Start a new index that will be written to `path` on flush
    fn create(&self, path: &Path) -> Result<Self::Builder>;

    /// Combine `old_master` and `new_shard` into `dst`. Entries under the
    /// shard's roots come from the shard; all others from the old master.
    fn merge(&self, dst: &Path, old_master: &Path, new_shard: &Path) -> Result<()>;
}

/// The trigram index store
#[derive(Debug, Clone)]
pub struct TrigramStore {
    max_file_size: u64,
}

impl TrigramStore {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl Default for TrigramStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl IndexBackend for TrigramStore {
    type Builder = IndexWriter;

    fn roots(&self, index: &Path) -> Result<Vec<PathBuf>> {
        Ok(IndexReader::open(index)?.roots().to_vec())
    }

    fn create(&self, path: &Path) -> Result<IndexWriter> {
        Ok(IndexWriter::new(path, self.max_file_size))
    }

    fn merge(&self, dst: &Path, old_master: &Path, new_shard: &Path) -> Result<()> {
        merge_indexes(dst, old_master, new_shard)
    }
}
