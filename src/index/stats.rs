use crate::index::backend::IndexBackend;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Print the roots recorded in `index`, one per line
pub fn list_roots<B: IndexBackend, W: Write>(backend: &B, index: &Path, out: &mut W) -> Result<()> {
    let roots = backend
        .roots(index)
        .with_context(|| format!("Failed to open index {}", index.display()))?;

    for root in roots {
        writeln!(out, "{}", root.display())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::backend::TrigramStore;
    use crate::index::writer::IndexData;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_list_roots_prints_each_root() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index");
        IndexData {
            roots: vec![PathBuf::from("/a"), PathBuf::from("/b/c")],
            ..Default::default()
        }
        .write_to(&path)
        .unwrap();

        let mut out = Vec::new();
        list_roots(&TrigramStore::default(), &path, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "/a\n/b/c\n");
    }

    #[test]
    fn test_list_roots_missing_index() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        assert!(list_roots(&TrigramStore::default(), &dir.path().join("none"), &mut out).is_err());
    }
}
