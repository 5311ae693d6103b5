use crate::index::reader::IndexReader;
use crate::index::types::FileId;
use crate::index::writer::IndexData;
use anyhow::{Context, Result};
use roaring::RoaringBitmap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a merged file entry came from
#[derive(Debug, Clone, Copy)]
enum Source {
    Old(FileId),
    New(FileId),
}

fn under_any(path: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| path.starts_with(root))
}

/// Merge `new_shard` into `old_master`, writing the result to `dst`.
///
/// Files of the old index lying under any root of the new shard were
/// revisited this run: they are dropped in favour of what the shard holds.
/// Everything else carries over untouched. The result covers the union of
/// both root sets.
pub fn merge_indexes(dst: &Path, old_master: &Path, new_shard: &Path) -> Result<()> {
    let old = IndexReader::open(old_master).context("Failed to open old index")?;
    let new = IndexReader::open(new_shard).context("Failed to open new shard")?;

    let mut entries: Vec<(&Path, Source)> =
        Vec::with_capacity(old.file_count() + new.file_count());
    let mut dropped = 0usize;
    for (id, name) in old.names().iter().enumerate() {
        if under_any(name, new.roots()) {
            dropped += 1;
        } else {
            entries.push((name, Source::Old(id as FileId)));
        }
    }
    for (id, name) in new.names().iter().enumerate() {
        entries.push((name, Source::New(id as FileId)));
    }

    // Stable sort keeps old before new for equal paths; dedup keeps the last
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let mut deduped: Vec<(&Path, Source)> = Vec::with_capacity(entries.len());
    for entry in entries {
        match deduped.last_mut() {
            Some(last) if last.0 == entry.0 => *last = entry,
            _ => deduped.push(entry),
        }
    }

    let mut old_map: Vec<Option<FileId>> = vec![None; old.file_count()];
    let mut new_map: Vec<Option<FileId>> = vec![None; new.file_count()];
    let mut names = Vec::with_capacity(deduped.len());
    for (merged_id, (name, source)) in deduped.into_iter().enumerate() {
        let merged_id = merged_id as FileId;
        match source {
            Source::Old(id) => old_map[id as usize] = Some(merged_id),
            Source::New(id) => new_map[id as usize] = Some(merged_id),
        }
        names.push(name.to_path_buf());
    }

    let mut postings: BTreeMap<_, RoaringBitmap> = BTreeMap::new();
    for (reader, map) in [(&old, &old_map), (&new, &new_map)] {
        for (trigram, ids) in reader.iter_postings() {
            let remapped: RoaringBitmap = ids
                .iter()
                .filter_map(|id| map.get(id as usize).copied().flatten())
                .collect();
            if !remapped.is_empty() {
                *postings.entry(trigram).or_default() |= remapped;
            }
        }
    }

    let mut roots: Vec<PathBuf> = old.roots().iter().chain(new.roots()).cloned().collect();
    roots.sort();
    roots.dedup();

    debug!(
        "merge: {} old files replaced, {} files total",
        dropped,
        names.len()
    );

    IndexData {
        roots,
        names,
        postings,
    }
    .write_to(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{bytes_to_trigram, Trigram};

    fn gram(s: &str) -> Trigram {
        let b = s.as_bytes();
        bytes_to_trigram(b[0], b[1], b[2])
    }

    fn index(roots: &[&str], files: &[(&str, Vec<&str>)]) -> IndexData {
        let mut data = IndexData {
            roots: roots.iter().map(PathBuf::from).collect(),
            ..Default::default()
        };
        for (id, (name, grams)) in files.iter().enumerate() {
            data.names.push(PathBuf::from(name));
            for g in grams {
                data.postings.entry(gram(g)).or_default().insert(id as u32);
            }
        }
        data
    }

    fn files_with(reader: &IndexReader, g: &str) -> Vec<PathBuf> {
        reader
            .postings(gram(g))
            .iter()
            .filter_map(|id| reader.name(id).map(Path::to_path_buf))
            .collect()
    }

    #[test]
    fn test_merge_replaces_revisited_and_keeps_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old");
        let new = dir.path().join("new");
        let out = dir.path().join("out");

        index(
            &["/a", "/b"],
            &[
                ("/a/one.c", vec!["old"]),
                ("/a/gone.c", vec!["old"]),
                ("/b/two.c", vec!["old", "two"]),
            ],
        )
        .write_to(&old)
        .unwrap();
        index(&["/a"], &[("/a/one.c", vec!["new"]), ("/a/zzz.c", vec!["new"])])
            .write_to(&new)
            .unwrap();

        merge_indexes(&out, &old, &new).unwrap();
        let merged = IndexReader::open(&out).unwrap();

        assert_eq!(merged.roots(), &[PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(
            merged.names(),
            &[
                PathBuf::from("/a/one.c"),
                PathBuf::from("/a/zzz.c"),
                PathBuf::from("/b/two.c"),
            ]
        );
        assert_eq!(files_with(&merged, "old"), vec![PathBuf::from("/b/two.c")]);
        assert_eq!(
            files_with(&merged, "new"),
            vec![PathBuf::from("/a/one.c"), PathBuf::from("/a/zzz.c")]
        );
        assert_eq!(files_with(&merged, "two"), vec![PathBuf::from("/b/two.c")]);
    }

    #[test]
    fn test_root_prefix_is_component_wise() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old");
        let new = dir.path().join("new");
        let out = dir.path().join("out");

        index(&["/src-extra"], &[("/src-extra/x.c", vec!["xxx"])])
            .write_to(&old)
            .unwrap();
        index(&["/src"], &[("/src/y.c", vec!["yyy"])])
            .write_to(&new)
            .unwrap();

        merge_indexes(&out, &old, &new).unwrap();
        let merged = IndexReader::open(&out).unwrap();
        assert_eq!(merged.file_count(), 2);
        assert_eq!(files_with(&merged, "xxx"), vec![PathBuf::from("/src-extra/x.c")]);
    }

    #[test]
    fn test_merge_fails_on_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_indexes(
            &dir.path().join("out"),
            &dir.path().join("old"),
            &dir.path().join("new"),
        );
        assert!(err.is_err());
        assert!(!dir.path().join("out").exists());
    }
}
