use std::path::PathBuf;

/// A trigram is a 3-byte sequence stored as u32 (only lower 24 bits used)
pub type Trigram = u32;

/// Position of a file in an index's sorted name list
pub type FileId = u32;

/// Leading magic of every index file
pub const INDEX_MAGIC: &[u8; 8] = b"csindex1";

/// Trailing magic, written last so truncated files are detectable
pub const INDEX_TRAILER: &[u8; 8] = b"csindex!";

/// File name of the master index when none is given explicitly
pub const DEFAULT_INDEX_NAME: &str = ".csearchindex";

/// Default upper bound on the size of an indexed file (1 GiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1 << 30;

/// Counters reported when a shard is sealed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShardSummary {
    pub files: usize,
    pub skipped: usize,
    pub trigrams: usize,
}

/// Which artifact the build stage writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Build straight at the master location; sealing publishes
    Reset,
    /// Build a shard beside the master and merge it in
    Incremental,
}

/// Temporary artifacts derived from a master index path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub master: PathBuf,
    pub shard: PathBuf,
    pub merged: PathBuf,
}

impl Artifacts {
    pub fn for_master(master: impl Into<PathBuf>) -> Self {
        let master = master.into();
        let shard = with_suffix(&master, "~");
        let merged = with_suffix(&master, "~~");
        Self {
            master,
            shard,
            merged,
        }
    }
}

/// Append `suffix` to the final component of `path`
pub fn with_suffix(path: &std::path::Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Convert 3 bytes to a trigram
#[inline]
pub fn bytes_to_trigram(b0: u8, b1: u8, b2: u8) -> Trigram {
    ((b0 as u32) << 16) | ((b1 as u32) << 8) | (b2 as u32)
}

/// Convert a 3-byte string to a trigram
#[inline]
pub fn trigram_of(s: &[u8; 3]) -> Trigram {
    bytes_to_trigram(s[0], s[1], s[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_artifacts_are_siblings_of_master() {
        let a = Artifacts::for_master("/work/.csearchindex");
        assert_eq!(a.shard, Path::new("/work/.csearchindex~"));
        assert_eq!(a.merged, Path::new("/work/.csearchindex~~"));
        assert_eq!(a.shard.parent(), a.master.parent());
    }

    #[test]
    fn test_trigram_packing() {
        assert_eq!(trigram_of(b"abc"), 0x616263);
    }
}
