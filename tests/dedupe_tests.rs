//! Integration tests for duplicate resolution.
//!
//! Tests cover:
//! - Keep/demote/delete assignment by rank
//! - Group sizes from one to eight
//! - Stability of equal ranks
//! - Series grouping by episode

use media_housekeeper::core::dedupe::resolve_duplicates;
use media_housekeeper::models::media::{ClassificationRecord, MediaKind};
use media_housekeeper::models::plan::Disposition;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn movie(title: &str, file: &str, rank: i32) -> ClassificationRecord {
    let mut record = ClassificationRecord::new(title, format!("/downloads/{}", file));
    record.kind = MediaKind::Movie;
    record.year = Some(2010);
    record.rank = rank;
    record.destination_dir = Some(PathBuf::from(format!("/movies/{} (2010)", title)));
    record
}

fn episode(title: &str, file: &str, season: u32, episode: u32, rank: i32) -> ClassificationRecord {
    let mut record = movie(title, file, rank);
    record.kind = MediaKind::Series;
    record.season = Some(season);
    record.episode = Some(episode);
    record
}

#[test]
fn test_five_copies() {
    let records = vec![
        movie("Inception", "a.mkv", -50),
        movie("Inception", "b.mkv", 80),
        movie("Inception", "c.mkv", 130),
        movie("Inception", "d.mkv", -50),
        movie("Inception", "e.mkv", 80),
    ];

    let plan = resolve_duplicates(&records);
    assert_eq!(plan.groups.len(), 1);

    let actions = &plan.groups[0].actions;
    let summary: Vec<(String, i32, Disposition)> = actions
        .iter()
        .map(|a| {
            (
                a.source.file_name().unwrap().to_string_lossy().to_string(),
                a.rank,
                a.disposition,
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("c.mkv".to_string(), 130, Disposition::Keep),
            ("b.mkv".to_string(), 80, Disposition::Demote),
            ("e.mkv".to_string(), 80, Disposition::Demote),
            ("a.mkv".to_string(), -50, Disposition::Delete),
            ("d.mkv".to_string(), -50, Disposition::Delete),
        ]
    );

    assert_eq!(actions[0].target, None);
    assert_eq!(
        actions[1].target,
        Some(PathBuf::from("/movies/Inception (2010)/extras/b.mkv"))
    );
    assert_eq!(actions[3].target, None);
}

#[test]
fn test_single_file_is_kept() {
    let plan = resolve_duplicates(&[movie("Heat", "heat.mkv", -50)]);

    assert_eq!(plan.groups.len(), 1);
    assert_eq!(plan.groups[0].actions.len(), 1);
    assert_eq!(plan.groups[0].actions[0].disposition, Disposition::Keep);
    assert_eq!(plan.duplicate_groups().count(), 0);
}

#[test]
fn test_counts_for_every_group_size() {
    for n in 1..=8usize {
        let records: Vec<_> = (0..n)
            .map(|i| movie("Alien", &format!("{}.mkv", i), (i as i32 * 37) % 11))
            .collect();
        let plan = resolve_duplicates(&records);

        assert_eq!(plan.count(Disposition::Keep), 1, "n = {}", n);
        assert_eq!(plan.count(Disposition::Demote), (n - 1).min(2), "n = {}", n);
        assert_eq!(plan.count(Disposition::Delete), n.saturating_sub(3), "n = {}", n);
    }
}

#[test]
fn test_ties_keep_discovery_order() {
    let records = vec![
        movie("Heat", "first.mkv", 30),
        movie("Heat", "second.mkv", 30),
        movie("Heat", "third.mkv", 30),
        movie("Heat", "fourth.mkv", 30),
    ];
    let plan = resolve_duplicates(&records);

    let order: Vec<_> = plan.groups[0]
        .actions
        .iter()
        .map(|a| a.source.clone())
        .collect();
    let expected: Vec<_> = records.iter().map(|r| r.source_path.clone()).collect();
    assert_eq!(order, expected);
    assert_eq!(plan.groups[0].actions[0].disposition, Disposition::Keep);
}

#[test]
fn test_groups_follow_discovery_order() {
    let records = vec![
        movie("Heat", "heat.mkv", 0),
        movie("Alien", "alien.mkv", 0),
        movie("Heat", "heat2.mkv", 10),
    ];
    let plan = resolve_duplicates(&records);

    let titles: Vec<_> = plan.groups.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, vec!["Heat", "Alien"]);
    assert_eq!(plan.groups[0].actions[0].source, PathBuf::from("/downloads/heat2.mkv"));
}

#[test]
fn test_episodes_are_grouped_separately() {
    let records = vec![
        episode("Show", "s01e01.720p.mkv", 1, 1, -50),
        episode("Show", "s01e01.1080p.mkv", 1, 1, 30),
        episode("Show", "s01e02.mkv", 1, 2, 0),
    ];
    let plan = resolve_duplicates(&records);

    assert_eq!(plan.groups.len(), 2);
    assert_eq!(plan.groups[0].label(), "Show (2010) S01E01");
    assert_eq!(plan.groups[0].actions.len(), 2);
    assert_eq!(plan.groups[1].actions.len(), 1);
}

#[test]
fn test_different_years_are_different_titles() {
    let mut remake = movie("Dune", "dune2021.mkv", 0);
    remake.year = Some(2021);
    let plan = resolve_duplicates(&[movie("Dune", "dune.mkv", 0), remake]);
    assert_eq!(plan.groups.len(), 2);
}
