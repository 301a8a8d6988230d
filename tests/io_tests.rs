//! Integration tests for file I/O operations.
//!
//! Tests cover:
//! - Plan save/load
//! - Mover behaviour (collisions, protection, dry run, soft delete)
//! - Executing a dedupe plan end to end

use media_housekeeper::core::cleaner::flatten_operations;
use media_housekeeper::core::dedupe::{load_plan, resolve_duplicates, save_plan};
use media_housekeeper::core::executor::{Executor, FileOp};
use media_housekeeper::models::config::{Config, MediaDirs};
use media_housekeeper::models::media::{ClassificationRecord, MediaKind};
use media_housekeeper::models::plan::{Disposition, GroupPlan, Plan, PlanAction, UnclassifiedItem};
use media_housekeeper::utils::fs::{FsMover, Mover};
use media_housekeeper::Error;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn library(root: &Path) -> Config {
    let config = Config::with_media_dirs(
        MediaDirs {
            movies: root.join("movies"),
            series: root.join("series"),
            documentaries: root.join("documentaries"),
            unsorted: root.join("downloads"),
        },
        root.join("deleted"),
    );
    for dir in config.media_dirs.all() {
        fs::create_dir_all(dir).unwrap();
    }
    config
}

fn touch(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// ========== PLAN I/O TESTS ==========

#[test]
fn test_save_and_load_plan() {
    let mut plan = Plan::new();
    plan.groups.push(GroupPlan {
        title: "Heat".to_string(),
        year: Some(1995),
        kind: MediaKind::Movie,
        season: None,
        episode: None,
        actions: vec![PlanAction {
            source: PathBuf::from("/movies/Heat (1995)/heat.mkv"),
            rank: 30,
            disposition: Disposition::Keep,
            target: None,
        }],
    });
    plan.unclassified.push(UnclassifiedItem {
        source: PathBuf::from("/downloads/x.mkv"),
        reason: "No title".to_string(),
    });

    let temp_dir = TempDir::new().unwrap();
    let plan_path = temp_dir.path().join("plans").join("plan.json");

    save_plan(&plan, &plan_path).unwrap();
    assert!(plan_path.exists());

    let loaded = load_plan(&plan_path).unwrap();
    assert_eq!(loaded.plan_id, plan.plan_id);
    assert_eq!(loaded.groups[0].actions, plan.groups[0].actions);
    assert_eq!(loaded.unclassified.len(), 1);
}

#[test]
fn test_plan_json_uses_lowercase_dispositions() {
    let mut plan = Plan::new();
    plan.groups.push(GroupPlan {
        title: "Heat".to_string(),
        year: None,
        kind: MediaKind::Movie,
        season: None,
        episode: None,
        actions: vec![PlanAction {
            source: PathBuf::from("/a.mkv"),
            rank: 0,
            disposition: Disposition::Demote,
            target: Some(PathBuf::from("/extras/a.mkv")),
        }],
    });

    let json = serde_json::to_string(&plan).unwrap();
    assert!(json.contains("\"disposition\":\"demote\""));
    assert!(json.contains("\"kind\":\"movie\""));
}

#[test]
fn test_load_plan_rejects_unknown_version() {
    let temp_dir = TempDir::new().unwrap();
    let plan_path = temp_dir.path().join("plan.json");

    let mut plan = Plan::new();
    plan.version = "9.9".to_string();
    save_plan(&plan, &plan_path).unwrap();

    assert!(matches!(load_plan(&plan_path), Err(Error::InvalidPlanFile(_))));
}

// ========== MOVER TESTS ==========

#[test]
fn test_move_creates_parents() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let mover = FsMover::new(&config);

    let src = temp_dir.path().join("downloads/heat.mkv");
    touch(&src, "video");
    let dst = temp_dir.path().join("movies/Heat (1995)/heat.mkv");

    let landed = mover.move_path(&src, &dst).unwrap();
    assert_eq!(landed, dst);
    assert!(!src.exists());
    assert_eq!(fs::read_to_string(&dst).unwrap(), "video");
}

#[test]
fn test_move_renames_on_collision() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let mover = FsMover::new(&config);

    let src = temp_dir.path().join("downloads/heat.mkv");
    let dst = temp_dir.path().join("movies/Heat/heat.mkv");
    touch(&src, "new");
    touch(&dst, "old");

    let landed = mover.move_path(&src, &dst).unwrap();
    assert_eq!(landed, temp_dir.path().join("movies/Heat/heat_1.mkv"));
    assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
    assert_eq!(fs::read_to_string(&landed).unwrap(), "new");
}

#[test]
fn test_directory_move_renames_on_collision() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let mover = FsMover::new(&config);

    let src = temp_dir.path().join("downloads/Heat/Subs");
    touch(&src.join("English.srt"), "new");
    let dst = temp_dir.path().join("movies/Heat/Subs");
    touch(&dst.join("English.srt"), "old");

    let landed = mover.move_path(&src, &dst).unwrap();
    assert_eq!(landed, temp_dir.path().join("movies/Heat/Subs_1"));
    assert_eq!(fs::read_to_string(dst.join("English.srt")).unwrap(), "old");
    assert_eq!(fs::read_to_string(landed.join("English.srt")).unwrap(), "new");
    assert!(!src.exists());
}

#[test]
fn test_move_to_same_path_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let mover = FsMover::new(&config);

    let path = temp_dir.path().join("movies/Heat/heat.mkv");
    touch(&path, "video");

    assert_eq!(mover.move_path(&path, &path).unwrap(), path);
    assert!(path.exists());
}

#[test]
fn test_move_onto_library_root_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let mover = FsMover::new(&config);

    let src = temp_dir.path().join("downloads/Heat");
    fs::create_dir_all(&src).unwrap();

    let result = mover.move_path(&src, &config.media_dirs.movies);
    assert!(matches!(result, Err(Error::ProtectedPath { .. })));
    assert!(src.exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = library(temp_dir.path());
    config.dry_run = true;
    let mover = FsMover::new(&config);

    let src = temp_dir.path().join("downloads/heat.mkv");
    touch(&src, "video");
    let dst = temp_dir.path().join("movies/Heat/heat.mkv");

    assert_eq!(mover.move_path(&src, &dst).unwrap(), dst);
    assert!(src.exists());
    assert!(!dst.exists());
}

#[test]
fn test_synology_metadata_is_never_moved() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let mover = FsMover::new(&config);

    let src = temp_dir.path().join("movies/Heat/@eaDir/heat.mkv");
    touch(&src, "meta");

    let landed = mover
        .move_path(&src, &temp_dir.path().join("movies/Heat/heat.mkv"))
        .unwrap();
    assert_eq!(landed, src);
    assert!(src.exists());
}

#[test]
fn test_soft_delete_mirrors_library_layout() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let mover = FsMover::new(&config);

    let src = temp_dir.path().join("movies/Heat (1995)/heat.480p.mkv");
    touch(&src, "video");

    let landed = mover.soft_delete(&src).unwrap();
    assert_eq!(
        landed,
        temp_dir.path().join("deleted/Heat (1995)/heat.480p.mkv")
    );
    assert!(!src.exists());
    assert!(landed.exists());
}

// ========== EXECUTOR TESTS ==========

#[tokio::test]
async fn test_execute_dedupe_plan() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let title_dir = temp_dir.path().join("movies/Heat (1995)");

    let files = [
        ("heat.2160p.mkv", 40),
        ("heat.1080p.mkv", 30),
        ("heat.mkv", 0),
        ("heat.720p.mkv", -50),
    ];
    let records: Vec<ClassificationRecord> = files
        .iter()
        .map(|(name, rank)| {
            let path = title_dir.join(name);
            touch(&path, name);
            let mut record = ClassificationRecord::new("Heat", path);
            record.kind = MediaKind::Movie;
            record.year = Some(1995);
            record.rank = *rank;
            record.destination_dir = Some(title_dir.clone());
            record
        })
        .collect();

    let plan = resolve_duplicates(&records);
    let executor = Executor::new(Arc::new(FsMover::new(&config)), 4);
    let report = executor.execute(&plan).await;

    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.moved, 2);
    assert_eq!(report.deleted, 1);

    assert!(title_dir.join("heat.2160p.mkv").exists());
    assert!(title_dir.join("extras/heat.1080p.mkv").exists());
    assert!(title_dir.join("extras/heat.mkv").exists());
    assert!(temp_dir
        .path()
        .join("deleted/Heat (1995)/heat.720p.mkv")
        .exists());
}

#[tokio::test]
async fn test_failed_operation_does_not_stop_others() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let src = temp_dir.path().join("downloads/a.mkv");
    touch(&src, "a");

    let executor = Executor::new(Arc::new(FsMover::new(&config)), 2);
    let report = executor
        .run(vec![
            FileOp::Move {
                from: temp_dir.path().join("downloads/missing.mkv"),
                to: temp_dir.path().join("movies/A/missing.mkv"),
            },
            FileOp::Move {
                from: src,
                to: temp_dir.path().join("movies/A/a.mkv"),
            },
        ])
        .await;

    assert_eq!(report.moved, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(temp_dir.path().join("movies/A/a.mkv").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_moves_to_one_target_keep_every_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let extras = temp_dir.path().join("movies/Heat (1995)/extras");
    let executor = Executor::new(Arc::new(FsMover::new(&config)), 10);

    for round in 0..10 {
        let ops: Vec<FileOp> = (0..10)
            .map(|i| {
                let from = temp_dir
                    .path()
                    .join(format!("downloads/round{}/copy{}/movie.mkv", round, i));
                touch(&from, &format!("{}-{}", round, i));
                FileOp::Move {
                    from,
                    to: extras.join("movie.mkv"),
                }
            })
            .collect();

        let report = executor.run(ops).await;
        assert!(report.is_success(), "{:?}", report.errors);
        assert_eq!(report.moved, 10);
    }

    let mut contents: Vec<String> = fs::read_dir(&extras)
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    contents.sort();
    contents.dedup();
    assert_eq!(contents.len(), 100);
}

// ========== CLEAN TESTS ==========

#[tokio::test]
async fn test_flatten_pulls_nested_files_into_title_dir() {
    let temp_dir = TempDir::new().unwrap();
    let config = library(temp_dir.path());
    let root = temp_dir.path();
    let title_dir = root.join("movies/Heat (1995)");

    touch(&title_dir.join("heat.mkv"), "main");
    touch(&title_dir.join("CD1/part.mkv"), "one");
    touch(&title_dir.join("CD2/part.mkv"), "two");
    touch(&title_dir.join("extras/heat.720p.mkv"), "extra");
    touch(&title_dir.join("Subs/English.srt"), "subs");
    touch(&root.join("movies/@eaDir/Heat/thumb.jpg"), "meta");
    touch(&root.join("series/Show/Season 1/show.s01e01.mkv"), "ep");

    let ops = flatten_operations(&config);
    assert_eq!(
        ops,
        vec![
            FileOp::Move {
                from: title_dir.join("CD1/part.mkv"),
                to: title_dir.join("part.mkv"),
            },
            FileOp::Move {
                from: title_dir.join("CD2/part.mkv"),
                to: title_dir.join("part.mkv"),
            },
        ]
    );

    let executor = Executor::new(Arc::new(FsMover::new(&config)), 4);
    let report = executor.run(ops).await;
    assert!(report.is_success(), "{:?}", report.errors);

    let mut flattened = vec![
        fs::read_to_string(title_dir.join("part.mkv")).unwrap(),
        fs::read_to_string(title_dir.join("part_1.mkv")).unwrap(),
    ];
    flattened.sort();
    assert_eq!(flattened, vec!["one", "two"]);
    assert!(title_dir.join("extras/heat.720p.mkv").exists());
    assert!(root.join("series/Show/Season 1/show.s01e01.mkv").exists());
}
