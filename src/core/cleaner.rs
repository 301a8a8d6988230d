//! Library clean-up: flattening title directories, pruning leftovers and
//! filing trailers.

use crate::core::executor::FileOp;
use crate::core::scanner::{is_ignored, prune_candidates, scan_roots, ScanOptions};
use crate::models::config::Config;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Library roots plus the download directories.
fn media_roots(config: &Config) -> Vec<PathBuf> {
    let mut roots = config.library_roots();
    for dir in &config.unsorted_media_dirs {
        if !roots.contains(dir) {
            roots.push(dir.clone());
        }
    }
    roots
}

/// Pull files nested below a title directory up into it.
///
/// Season folders, extras and ignored paths keep their layout. Name clashes
/// are settled by the mover.
pub fn flatten_operations(config: &Config) -> Vec<FileOp> {
    let mut ops = Vec::new();
    for root in media_roots(config).iter().filter(|r| r.is_dir()) {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot flatten {:?}: {}", root, e);
                continue;
            }
        };
        let mut title_dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        title_dirs.sort();

        for title_dir in title_dirs {
            let Ok(relative) = title_dir.strip_prefix(root) else {
                continue;
            };
            if is_ignored(relative, false) {
                continue;
            }

            for entry in WalkDir::new(&title_dir)
                .min_depth(2)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                let in_season = format!("/{}", relative.to_string_lossy().to_lowercase())
                    .contains("/season");
                if in_season || is_ignored(relative, false) {
                    continue;
                }
                ops.push(FileOp::Move {
                    from: entry.path().to_path_buf(),
                    to: title_dir.join(entry.file_name()),
                });
            }
        }
    }
    ops
}

/// Soft-delete operations for small top-level leftovers in every media root.
pub fn prune_operations(config: &Config) -> Vec<FileOp> {
    let mut ops = Vec::new();
    for root in media_roots(config).iter().filter(|r| r.is_dir()) {
        match prune_candidates(root, config.min_file_size) {
            Ok(candidates) => {
                for (path, size) in candidates {
                    tracing::info!("Pruning {:?} ({} bytes)", path, size);
                    ops.push(FileOp::SoftDelete { path });
                }
            }
            Err(e) => tracing::warn!("Cannot prune {:?}: {}", root, e),
        }
    }
    ops
}

/// Move loose trailers into a `trailers` directory beside their title.
pub fn trailer_operations(config: &Config) -> Vec<FileOp> {
    let roots = config.library_roots();
    let scan = scan_roots(
        &roots,
        &ScanOptions {
            min_size: 0,
            include_extras: true,
        },
    );

    scan.trailers
        .into_iter()
        .filter_map(|trailer| {
            let Some(title_dir) = title_dir_of(&trailer.path, &roots) else {
                tracing::debug!("Trailer {:?} is not inside a title directory", trailer.path);
                return None;
            };
            Some(FileOp::Move {
                to: title_dir.join("trailers").join(&trailer.filename),
                from: trailer.path,
            })
        })
        .collect()
}

/// The directory directly below the library root that contains `path`.
fn title_dir_of(path: &Path, roots: &[PathBuf]) -> Option<PathBuf> {
    let root = roots.iter().find(|r| path.starts_with(r))?;
    let first = path.strip_prefix(root).ok()?.components().next()?;
    let title_dir = root.join(first);
    // A trailer sitting directly in the root has no title directory.
    (title_dir != path).then_some(title_dir)
}
