//! Depth-first traversal of one root, pruned by the admission filter.

use crate::index::filter::{AdmissionFilter, Scope};
use ignore::WalkBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Counters for a single root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Regular files handed to the callback
    pub files: usize,
    /// Entries that could not be read
    pub errors: usize,
}

fn scope_of(is_dir: bool) -> Scope {
    if is_dir { Scope::Directory } else { Scope::File }
}

/// Walk `root`, calling `on_file` for every admitted regular file.
///
/// Skipped directories are pruned, so nothing beneath them is visited.
/// Unreadable entries are logged and the walk carries on with their
/// siblings.
pub fn walk<F>(root: &Path, filter: &AdmissionFilter, mut on_file: F) -> WalkStats
where
    F: FnMut(&Path),
{
    let mut stats = WalkStats::default();

    // The root goes through the same rules as every other element
    let root_meta = match fs::symlink_metadata(root) {
        Ok(meta) => meta,
        Err(e) => {
            warn!("{}: {}", root.display(), e);
            stats.errors += 1;
            return stats;
        }
    };
    if let Some(name) = root.file_name() {
        let scope = scope_of(root_meta.is_dir());
        if !filter.decide(&name.to_string_lossy(), scope).is_keep() {
            debug!("skip root {}", root.display());
            return stats;
        }
    }

    let entry_filter = filter.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            entry_filter
                .decide(&entry.file_name().to_string_lossy(), scope_of(is_dir))
                .is_keep()
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("walk error: {}", e);
                stats.errors += 1;
                continue;
            }
        };

        // Plain files only: no symlinks, devices, pipes or sockets
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            stats.files += 1;
            on_file(entry.path());
        }
    }

    stats
}
