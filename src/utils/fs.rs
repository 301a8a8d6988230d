//! File system utilities.

use crate::models::config::Config;
use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported video file extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "m4v", "ts", "m2ts", "flv", "webm", "mpg", "mpeg", "vob",
    "divx", "3gp", "rmvb", "asf",
];

/// Synology metadata directories are never touched.
const SYNOLOGY_METADATA_DIR: &str = "@eadir";

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check if a file is a video file based on extension.
pub fn is_video_file(path: &Path) -> bool {
    get_extension(path)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Turn a release file name into one that is safe on every filesystem:
/// drops a leading `[site]`/`www.site.tld` tag, `:` and `\`.
pub fn clean_path(name: &str) -> String {
    let stripped = crate::core::parser::strip_site_prefix(name);
    let without: String = stripped.chars().filter(|c| *c != ':' && *c != '\\').collect();
    let cleaned = sanitize_filename::sanitize(without.trim());
    if cleaned.is_empty() {
        sanitize_filename::sanitize(name)
    } else {
        cleaned
    }
}

/// Files next to `video` that share its stem (subtitles, nfo, artwork).
pub fn find_sidecars(video: &Path) -> Vec<PathBuf> {
    let (Some(dir), Some(stem)) = (video.parent(), video.file_stem()) else {
        return Vec::new();
    };
    let prefix = format!("{}.", stem.to_string_lossy());

    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut sidecars: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p != video && !is_video_file(p))
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with(&prefix))
                .unwrap_or(false)
        })
        .collect();
    sidecars.sort();
    sidecars
}

/// `path`, then `name_1.ext`, `name_2.ext`, ... beside it.
fn candidate_paths(path: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().to_string());

    std::iter::once(path.to_path_buf()).chain((1..).map(move |n| {
        let name = match &ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        path.with_file_name(name)
    }))
}

/// Next free `name_N.ext` beside `path`.
pub fn unique_path(path: &Path) -> PathBuf {
    candidate_paths(path)
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Total size of a file, or of every file below a directory.
pub fn path_size(path: &Path) -> u64 {
    if path.is_file() {
        return path.metadata().map(|m| m.len()).unwrap_or(0);
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Filesystem side effects used by the sort, dedupe and clean passes.
pub trait Mover: Send + Sync {
    /// Move `src` to `dst` and return where it actually landed.
    fn move_path(&self, src: &Path, dst: &Path) -> Result<PathBuf>;

    /// Move `src` into the deleted-media directory.
    fn soft_delete(&self, src: &Path) -> Result<PathBuf>;
}

/// [`Mover`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FsMover {
    protected: Vec<PathBuf>,
    media_roots: Vec<PathBuf>,
    deleted_media_dir: PathBuf,
    dry_run: bool,
}

impl FsMover {
    pub fn new(config: &Config) -> Self {
        let mut media_roots = config.library_roots();
        for dir in &config.unsorted_media_dirs {
            if !media_roots.contains(dir) {
                media_roots.push(dir.clone());
            }
        }
        let mut protected = config.protected_dirs();
        protected.extend(config.unsorted_media_dirs.iter().cloned());

        Self {
            protected,
            media_roots,
            deleted_media_dir: config.deleted_media_dir.clone(),
            dry_run: config.dry_run,
        }
    }

    fn is_protected(&self, path: &Path) -> bool {
        self.protected.iter().any(|p| p == path)
    }

    /// Where `src` goes when soft-deleted: its path relative to the media
    /// root it lives under, mirrored below the deleted-media directory.
    pub fn deleted_location(&self, src: &Path) -> PathBuf {
        let relative = self
            .media_roots
            .iter()
            .filter(|root| src.starts_with(root))
            .max_by_key(|root| root.components().count())
            .and_then(|root| src.strip_prefix(root).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| src.file_name().map(PathBuf::from))
            .unwrap_or_default();
        self.deleted_media_dir.join(relative)
    }
}

impl Mover for FsMover {
    fn move_path(&self, src: &Path, dst: &Path) -> Result<PathBuf> {
        if src == dst {
            return Ok(dst.to_path_buf());
        }
        if self.is_protected(dst) || self.is_protected(src) {
            return Err(Error::ProtectedPath {
                src: src.display().to_string(),
                dst: dst.display().to_string(),
            });
        }
        if src
            .to_string_lossy()
            .to_lowercase()
            .contains(SYNOLOGY_METADATA_DIR)
        {
            tracing::debug!("Skipping metadata path {:?}", src);
            return Ok(src.to_path_buf());
        }
        if !src.exists() {
            return Err(Error::PathNotFound(src.display().to_string()));
        }

        if self.dry_run {
            let target = unique_path(dst);
            tracing::info!("[DRY RUN] Move {:?} -> {:?}", src, target);
            return Ok(target);
        }

        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        let target = move_to_free_path(src, dst)?;
        if target != dst {
            tracing::info!("{:?} exists, used {:?}", dst, target);
        }
        tracing::info!("Moved {:?} -> {:?}", src, target);
        Ok(target)
    }

    fn soft_delete(&self, src: &Path) -> Result<PathBuf> {
        let target = self.deleted_location(src);
        tracing::info!("Soft-deleting {:?}", src);
        self.move_path(src, &target)
    }
}

/// Move `from` to the first free name among `dst`, `dst_1`, ...
///
/// Each candidate is claimed with an operation that fails when the name is
/// taken, so concurrent moves into the same directory never replace each
/// other.
fn move_to_free_path(from: &Path, dst: &Path) -> Result<PathBuf> {
    let is_dir = from.is_dir();
    for candidate in candidate_paths(dst) {
        let claimed = if is_dir {
            claim_dir(from, &candidate)
        } else {
            claim_file(from, &candidate)
        };
        match claimed {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(Error::other(format!("no free name for {}", dst.display())))
}

/// Hard-link then unlink; across filesystems, reserve the name and copy.
fn claim_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => return fs::remove_file(from),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
        Err(e) => tracing::debug!("Hard link {:?} -> {:?} failed ({}), copying", from, to, e),
    }

    OpenOptions::new().write(true).create_new(true).open(to)?;
    if let Err(e) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    fs::remove_file(from)
}

/// Reserve `to` as an empty directory, then rename onto it or copy the tree.
fn claim_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir(to)?;
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    for entry in WalkDir::new(from) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    fs::remove_dir_all(from)
}
