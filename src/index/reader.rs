use crate::index::backend::IndexError;
use crate::index::types::*;
use crate::utils::{delta_decode, read_bytes_at, read_u32_at};
use memmap2::Mmap;
use roaring::RoaringBitmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Trigram dictionary entry; postings live in the mapped file
struct TrigramDictEntry {
    trigram: Trigram,
    offset: usize,
    length: usize,
}

/// Memory-mapped reader over a sealed index file
pub struct IndexReader {
    data: Mmap,
    roots: Vec<PathBuf>,
    names: Vec<PathBuf>,
    dict: Vec<TrigramDictEntry>,
}

impl IndexReader {
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let io_err = |source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len() as usize;
        if len < INDEX_MAGIC.len() + INDEX_TRAILER.len() {
            return Err(IndexError::Corrupt {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: index files are only ever replaced by rename, never
        // rewritten in place, so the mapping stays valid.
        let data = unsafe { Mmap::map(&file) }.map_err(io_err)?;

        if !data.starts_with(INDEX_MAGIC) {
            return Err(IndexError::BadMagic {
                path: path.to_path_buf(),
            });
        }
        if !data.ends_with(INDEX_TRAILER) {
            return Err(IndexError::Corrupt {
                path: path.to_path_buf(),
            });
        }

        let (roots, names, dict) = parse(&data).ok_or_else(|| IndexError::Corrupt {
            path: path.to_path_buf(),
        })?;

        Ok(Self {
            data,
            roots,
            names,
            dict,
        })
    }

    /// Roots the index was built from
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Indexed files, sorted; position is the file id
    pub fn names(&self) -> &[PathBuf] {
        &self.names
    }

    pub fn name(&self, id: FileId) -> Option<&Path> {
        self.names.get(id as usize).map(PathBuf::as_path)
    }

    pub fn file_count(&self) -> usize {
        self.names.len()
    }

    /// Files containing `trigram`
    pub fn postings(&self, trigram: Trigram) -> RoaringBitmap {
        self.dict
            .binary_search_by_key(&trigram, |e| e.trigram)
            .map(|i| self.decode(&self.dict[i]))
            .unwrap_or_default()
    }

    /// Every trigram with its posting list, ascending by trigram
    pub fn iter_postings(&self) -> impl Iterator<Item = (Trigram, RoaringBitmap)> + '_ {
        self.dict.iter().map(|e| (e.trigram, self.decode(e)))
    }

    fn decode(&self, entry: &TrigramDictEntry) -> RoaringBitmap {
        delta_decode(&self.data[entry.offset..entry.offset + entry.length])
            .into_iter()
            .collect()
    }
}

type Parsed = (Vec<PathBuf>, Vec<PathBuf>, Vec<TrigramDictEntry>);

fn parse(data: &[u8]) -> Option<Parsed> {
    let end = data.len() - INDEX_TRAILER.len();
    let body = &data[..end];
    let mut pos = INDEX_MAGIC.len();

    let read_paths = |pos: &mut usize| -> Option<Vec<PathBuf>> {
        let count = read_u32_at(body, pos)?;
        (0..count)
            .map(|_| {
                let bytes = read_bytes_at(body, pos)?;
                Some(PathBuf::from(String::from_utf8_lossy(bytes).into_owned()))
            })
            .collect()
    };

    let roots = read_paths(&mut pos)?;
    let names = read_paths(&mut pos)?;

    // Each dictionary entry takes at least 12 bytes
    let gram_count = read_u32_at(body, &mut pos)?;
    let mut dict = Vec::with_capacity((gram_count as usize).min(body.len() / 12));
    for _ in 0..gram_count {
        let trigram = read_u32_at(body, &mut pos)?;
        let _doc_freq = read_u32_at(body, &mut pos)?;
        let length = read_u32_at(body, &mut pos)? as usize;
        let offset = pos;
        body.get(offset..offset.checked_add(length)?)?;
        pos += length;

        dict.push(TrigramDictEntry {
            trigram,
            offset,
            length,
        });
    }

    (pos == end).then_some((roots, names, dict))
}
