//! Moves classified downloads into the library.
//!
//! A video inside its own release folder takes the whole folder along
//! (subtitle directories, featurettes, artwork). A video lying loose in a
//! download root only takes its same-stem sidecars.

use crate::core::executor::FileOp;
use crate::models::media::ClassificationRecord;
use crate::utils::fs::{clean_path, find_sidecars};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Operations that file each record at its destination.
///
/// `roots` are the download directories; files directly inside one are
/// treated as loose.
pub fn sort_operations(records: &[ClassificationRecord], roots: &[PathBuf]) -> Vec<FileOp> {
    let folders = release_folders(records, roots);
    let mut claimed: HashSet<&Path> = HashSet::new();
    let mut ops = Vec::new();

    for record in records {
        let (Some(dir), Some(dest)) = (&record.destination_dir, &record.destination_path) else {
            continue;
        };
        if *dest == record.source_path {
            continue;
        }

        let folder = record
            .source_path
            .parent()
            .filter(|p| folders.get(p).is_some_and(Option::is_some));
        match folder {
            Some(folder) => {
                if claimed.insert(folder) {
                    ops.extend(folder_operations(folder, dir));
                }
            }
            None => {
                ops.push(FileOp::Move {
                    from: record.source_path.clone(),
                    to: dest.clone(),
                });
                ops.extend(sidecar_operations(&record.source_path, dir));
            }
        }
    }
    ops
}

/// Release folders and their single destination. A folder whose videos
/// go to different places maps to `None` and is handled file by file.
fn release_folders<'a>(
    records: &'a [ClassificationRecord],
    roots: &[PathBuf],
) -> HashMap<&'a Path, Option<&'a Path>> {
    let mut folders: HashMap<&Path, Option<&Path>> = HashMap::new();
    for record in records {
        let (Some(parent), Some(dir)) = (
            record.source_path.parent(),
            record.destination_dir.as_deref(),
        ) else {
            continue;
        };
        if roots.iter().any(|r| r == parent) || parent == dir || dir.starts_with(parent) {
            continue;
        }
        folders
            .entry(parent)
            .and_modify(|known| {
                if *known != Some(dir) {
                    *known = None;
                }
            })
            .or_insert(Some(dir));
    }
    folders
}

/// Move every entry of `folder` into `dir`.
fn folder_operations(folder: &Path, dir: &Path) -> Vec<FileOp> {
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(folder) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            tracing::warn!("Cannot read release folder {:?}: {}", folder, e);
            return Vec::new();
        }
    };
    entries.sort();

    entries
        .into_iter()
        .filter_map(|from| {
            let name = clean_path(&from.file_name()?.to_string_lossy());
            Some(FileOp::Move {
                to: dir.join(name),
                from,
            })
        })
        .collect()
}

fn sidecar_operations(video: &Path, dir: &Path) -> Vec<FileOp> {
    find_sidecars(video)
        .into_iter()
        .filter_map(|sidecar| {
            let name = clean_path(&sidecar.file_name()?.to_string_lossy());
            Some(FileOp::Move {
                to: dir.join(name),
                from: sidecar,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(video: &Path, dest_dir: &Path) -> ClassificationRecord {
        let mut record = ClassificationRecord::new("Heat", video);
        let name = video.file_name().unwrap().to_string_lossy().to_string();
        record.destination_path = Some(dest_dir.join(name));
        record.destination_dir = Some(dest_dir.to_path_buf());
        record
    }

    #[test]
    fn test_loose_file_moves_with_sidecars() {
        let dir = tempfile::TempDir::new().unwrap();
        let video = dir.path().join("Heat.1995.1080p.mkv");
        fs::write(&video, "v").unwrap();
        fs::write(dir.path().join("Heat.1995.1080p.en.srt"), "s").unwrap();
        fs::write(dir.path().join("Other.srt"), "o").unwrap();

        let dest_dir = PathBuf::from("/movies/Heat (1995)");
        let ops = sort_operations(&[record(&video, &dest_dir)], &[dir.path().to_path_buf()]);

        assert_eq!(
            ops,
            vec![
                FileOp::Move {
                    from: video.clone(),
                    to: dest_dir.join("Heat.1995.1080p.mkv"),
                },
                FileOp::Move {
                    from: dir.path().join("Heat.1995.1080p.en.srt"),
                    to: dest_dir.join("Heat.1995.1080p.en.srt"),
                },
            ]
        );
    }

    #[test]
    fn test_release_folder_moves_whole() {
        let root = tempfile::TempDir::new().unwrap();
        let folder = root.path().join("Heat.1995.1080p");
        let video = folder.join("Heat.1995.1080p.mkv");
        fs::create_dir_all(folder.join("Subs")).unwrap();
        fs::write(&video, "v").unwrap();
        fs::write(folder.join("Subs/English.srt"), "s").unwrap();
        fs::write(folder.join("heat.nfo"), "n").unwrap();

        let dest_dir = PathBuf::from("/movies/Heat (1995)");
        let ops = sort_operations(&[record(&video, &dest_dir)], &[root.path().to_path_buf()]);

        assert_eq!(
            ops,
            vec![
                FileOp::Move {
                    from: video.clone(),
                    to: dest_dir.join("Heat.1995.1080p.mkv"),
                },
                FileOp::Move {
                    from: folder.join("Subs"),
                    to: dest_dir.join("Subs"),
                },
                FileOp::Move {
                    from: folder.join("heat.nfo"),
                    to: dest_dir.join("heat.nfo"),
                },
            ]
        );
    }

    #[test]
    fn test_shared_folder_with_different_titles_moves_per_file() {
        let root = tempfile::TempDir::new().unwrap();
        let folder = root.path().join("Collection");
        fs::create_dir_all(&folder).unwrap();
        let heat = folder.join("Heat.1995.mkv");
        let alien = folder.join("Alien.1979.mkv");
        fs::write(&heat, "h").unwrap();
        fs::write(&alien, "a").unwrap();

        let records = [
            record(&heat, Path::new("/movies/Heat (1995)")),
            record(&alien, Path::new("/movies/Alien (1979)")),
        ];
        let ops = sort_operations(&records, &[root.path().to_path_buf()]);

        assert_eq!(
            ops,
            vec![
                FileOp::Move {
                    from: heat,
                    to: PathBuf::from("/movies/Heat (1995)/Heat.1995.mkv"),
                },
                FileOp::Move {
                    from: alien,
                    to: PathBuf::from("/movies/Alien (1979)/Alien.1979.mkv"),
                },
            ]
        );
    }

    #[test]
    fn test_record_already_in_place_is_skipped() {
        let mut record = ClassificationRecord::new("Heat", "/movies/Heat (1995)/heat.mkv");
        record.destination_dir = Some(PathBuf::from("/movies/Heat (1995)"));
        record.destination_path = Some(PathBuf::from("/movies/Heat (1995)/heat.mkv"));
        assert!(sort_operations(&[record], &[]).is_empty());
    }
}
