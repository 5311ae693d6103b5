use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Resolve user-supplied roots to canonical absolute paths.
///
/// An input that cannot be resolved is logged and dropped; the rest are
/// returned sorted and de-duplicated so the index sees files in a stable
/// order.
pub fn resolve_roots<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    let roots = inputs
        .iter()
        .map(|input| {
            let input = input.as_ref();
            match fs::canonicalize(input) {
                Ok(path) => path,
                Err(e) => {
                    warn!("{}: {}", input.display(), e);
                    PathBuf::new()
                }
            }
        })
        .collect();
    sorted_without_sentinels(roots)
}

/// Resolve roots recorded in an existing index.
///
/// A recorded root that has since vanished stays in the set as its
/// absolute path, so the next merge drops the entries filed under it.
pub fn resolve_recorded_roots<P: AsRef<Path>>(recorded: &[P]) -> Vec<PathBuf> {
    let roots = recorded
        .iter()
        .map(|root| {
            let root = root.as_ref();
            match fs::canonicalize(root) {
                Ok(path) => path,
                Err(e) if e.kind() == io::ErrorKind::NotFound => match std::path::absolute(root) {
                    Ok(path) => {
                        debug!("{}: root no longer exists", root.display());
                        normalize_lexically(&path)
                    }
                    Err(e) => {
                        warn!("{}: {}", root.display(), e);
                        PathBuf::new()
                    }
                },
                Err(e) => {
                    warn!("{}: {}", root.display(), e);
                    PathBuf::new()
                }
            }
        })
        .collect();
    sorted_without_sentinels(roots)
}

/// Drop `.` components and fold `..` into its parent without touching disk
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn sorted_without_sentinels(mut roots: Vec<PathBuf>) -> Vec<PathBuf> {
    roots.sort();

    // Sentinels sort first
    let resolved = roots
        .iter()
        .position(|p| !p.as_os_str().is_empty())
        .unwrap_or(roots.len());
    roots.drain(..resolved);
    roots.dedup();
    roots
}
