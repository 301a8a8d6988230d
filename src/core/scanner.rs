//! Directory scanner module.
//!
//! Walks library and download directories for video files. Entries that
//! disappear while the walk is running are skipped silently.

use crate::models::media::VideoFile;
use crate::utils::fs::{ensure_directory, is_video_file, path_size};
use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Path fragments that mark non-media content.
const IGNORED_FRAGMENTS: &[&str] = &[
    "@eadir", "plex", "trailer", "/subs", ".subs", ".meta", ".nfo", ".smbdelete",
];

/// Scan options.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Smaller video files are skipped.
    pub min_size: u64,
    /// Descend into `extras` directories.
    pub include_extras: bool,
}

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Video files, sorted by path.
    pub videos: Vec<VideoFile>,
    /// Trailers that are not yet inside a `trailers` directory.
    pub trailers: Vec<VideoFile>,
    /// Total files scanned.
    pub total_files_scanned: usize,
    /// Total directories scanned.
    pub total_dirs_scanned: usize,
}

/// Whether a path below a scan root should be ignored.
///
/// `relative` is matched with a leading `/` so that a top-level `subs`
/// directory is caught as well.
pub fn is_ignored(relative: &Path, include_extras: bool) -> bool {
    let lower = format!("/{}", relative.to_string_lossy().to_lowercase());
    if IGNORED_FRAGMENTS.iter().any(|f| lower.contains(f)) {
        return true;
    }
    !include_extras && lower.contains("/extras")
}

/// Trailer outside of a `trailers` directory.
pub fn is_loose_trailer(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let in_trailers_dir = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case("trailers"))
        .unwrap_or(false);
    name.contains("trailer") && !in_trailers_dir
}

/// Create a VideoFile from a path.
fn create_video_file(path: &Path) -> Result<VideoFile> {
    let metadata = std::fs::metadata(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(VideoFile {
        path: path.to_path_buf(),
        filename,
        size: metadata.len(),
    })
}

/// Scan a directory for video files.
pub fn scan_directory(path: &Path, options: &ScanOptions) -> Result<ScanResult> {
    ensure_directory(path)?;

    let mut result = ScanResult::default();

    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();

        if entry.file_type().is_dir() {
            result.total_dirs_scanned += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        result.total_files_scanned += 1;

        if !is_video_file(entry_path) {
            continue;
        }

        let relative = entry_path.strip_prefix(path).unwrap_or(entry_path);
        let trailer = is_loose_trailer(entry_path);
        let ignored = if trailer {
            relative
                .parent()
                .map(|dir| is_ignored(dir, true))
                .unwrap_or(false)
        } else {
            is_ignored(relative, options.include_extras)
        };
        if ignored {
            tracing::trace!("Ignoring {:?}", entry_path);
            continue;
        }

        let video = match create_video_file(entry_path) {
            Ok(video) => video,
            Err(e) => {
                // Removed between listing and stat.
                tracing::debug!("Skipping vanished entry {:?}: {}", entry_path, e);
                continue;
            }
        };

        if trailer {
            result.trailers.push(video);
        } else if video.size >= options.min_size {
            result.videos.push(video);
        }
    }

    result.videos.sort_by(|a, b| a.path.cmp(&b.path));
    result.trailers.sort_by(|a, b| a.path.cmp(&b.path));

    tracing::info!(
        "Scanned {} files in {} directories under {:?}: {} videos, {} trailers",
        result.total_files_scanned,
        result.total_dirs_scanned,
        path,
        result.videos.len(),
        result.trailers.len()
    );

    Ok(result)
}

/// Scan several roots, skipping (and logging) the ones that do not exist.
pub fn scan_roots(roots: &[PathBuf], options: &ScanOptions) -> ScanResult {
    let mut combined = ScanResult::default();
    for root in roots {
        match scan_directory(root, options) {
            Ok(result) => {
                combined.videos.extend(result.videos);
                combined.trailers.extend(result.trailers);
                combined.total_files_scanned += result.total_files_scanned;
                combined.total_dirs_scanned += result.total_dirs_scanned;
            }
            Err(e) => tracing::warn!("Skipping {:?}: {}", root, e),
        }
    }
    combined
}

/// Immediate children of `root` smaller than `min_size`, smallest first.
///
/// Directories are measured by the total size of the files below them.
pub fn prune_candidates(root: &Path, min_size: u64) -> Result<Vec<(PathBuf, u64)>> {
    ensure_directory(root)?;

    let mut candidates: Vec<(PathBuf, u64)> = std::fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            name != "@eadir" && !name.starts_with('.')
        })
        .map(|p| {
            let size = path_size(&p);
            (p, size)
        })
        .filter(|(_, size)| *size < min_size)
        .collect();

    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(candidates)
}
