//! Classification record builder.
//!
//! Combines the parser, normalizer, ranker and metadata resolver into one
//! [`ClassificationRecord`] per video file and picks its canonical location.

use crate::core::normalizer::normalize;
use crate::core::parser::FilenameParser;
use crate::core::ranker::rank;
use crate::core::resolver::MetadataResolver;
use crate::models::config::Config;
use crate::models::media::{CatalogMatch, ClassificationRecord, MediaKind, Quality};
use crate::models::plan::UnclassifiedItem;
use crate::utils::fs::clean_path;
use crate::{Error, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory names that never carry a title.
const GENERIC_DIRS: &[&str] = &["extras", "trailers", "subs", "sample", "samples", "featurettes"];

/// Builds classification records.
pub struct Classifier {
    config: Arc<Config>,
    parser: FilenameParser,
    resolver: Arc<MetadataResolver>,
}

/// Result of a batch run, in discovery order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<ClassificationRecord>,
    pub failures: Vec<UnclassifiedItem>,
    /// Files skipped because their title is excluded.
    pub excluded: Vec<PathBuf>,
}

impl Classifier {
    pub fn new(config: Arc<Config>, resolver: Arc<MetadataResolver>) -> Self {
        let parser = FilenameParser::new(config.sport_prefixes.clone());
        Self {
            config,
            parser,
            resolver,
        }
    }

    /// Classify a single file.
    pub async fn classify(&self, path: &Path) -> Result<ClassificationRecord> {
        let tokens = self.parser.parse_path(path);

        let (raw_title, dir_year) = match &tokens.title {
            Some(title) => (title.clone(), None),
            None => self
                .title_from_directory(path)
                .ok_or_else(|| Error::NoTitle(path.display().to_string()))?,
        };

        let normalized = normalize(&raw_title, &tokens);
        if normalized.title.is_empty() {
            return Err(Error::NoTitle(path.display().to_string()));
        }

        let quality = Quality::from(&tokens);
        let mut record = ClassificationRecord::new(normalized.title, path);
        record.year = normalized.year.or(dir_year);
        record.season = normalized.season;
        record.episode = normalized.episode;
        record.sport_event = tokens.sport_event;
        record.rank = rank(&quality);
        record.kind = if record.sport_event || record.season.is_some() {
            MediaKind::Series
        } else if quality.resolution.is_some() || quality.label.is_some() {
            MediaKind::Movie
        } else {
            MediaKind::Unsorted
        };
        record.quality = quality;

        if !record.sport_event {
            if let Some(found) = self.resolver.resolve(&record.title, record.year).await {
                merge_catalog(&mut record, found);
            }
        }

        let dir = self.base_dir(&record).join(clean_path(&title_dir_name(&record)));
        record.destination_path = Some(dir.join(clean_path(&record.filename())));
        record.destination_dir = Some(dir);

        tracing::debug!(
            "Classified {:?} as {} {} (rank {})",
            path,
            record.kind,
            record.display_title(),
            record.rank
        );
        Ok(record)
    }

    /// Classify many files on a bounded width.
    ///
    /// Returns only after every file has been processed; output keeps the
    /// input order and one failure never affects the others.
    pub async fn classify_all(
        &self,
        paths: &[PathBuf],
        excluded_titles: &HashSet<String>,
    ) -> BatchOutcome {
        let excluded_titles: HashSet<String> =
            excluded_titles.iter().map(|t| t.to_lowercase()).collect();

        let results: Vec<(PathBuf, Result<ClassificationRecord>)> = stream::iter(paths)
            .map(|path| async move { (path.clone(), self.classify(path).await) })
            .buffered(self.config.concurrency.classify.max(1))
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (path, result) in results {
            match result {
                Ok(record) if excluded_titles.contains(&record.title.to_lowercase()) => {
                    tracing::info!("Skipping excluded title {}", record.title);
                    outcome.excluded.push(path);
                }
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    tracing::warn!("Could not classify {:?}: {}", path, e);
                    outcome.failures.push(UnclassifiedItem {
                        source: path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        outcome
    }

    /// Library root a record belongs under.
    fn base_dir(&self, record: &ClassificationRecord) -> PathBuf {
        let dirs = &self.config.media_dirs;
        match record.kind {
            MediaKind::Series => dirs.series.clone(),
            MediaKind::Unsorted => dirs.unsorted.clone(),
            MediaKind::Movie => {
                if record.genres.iter().any(|g| g.contains("documentary")) {
                    return dirs.documentaries.clone();
                }
                self.config
                    .language_dir(&record.languages)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dirs.movies.clone())
            }
        }
    }

    /// Title (and year) from the nearest meaningful ancestor directory.
    fn title_from_directory(&self, path: &Path) -> Option<(String, Option<u16>)> {
        let roots = self.config.library_roots();
        for dir in path.ancestors().skip(1) {
            if roots.iter().any(|r| r == dir) || self.config.unsorted_media_dirs.iter().any(|r| r == dir) {
                return None;
            }
            let name = dir.file_name()?.to_string_lossy().to_string();
            let lower = name.to_lowercase();
            if GENERIC_DIRS.contains(&lower.as_str()) || lower.starts_with("season") {
                continue;
            }

            let tokens = self.parser.parse(&name);
            let title = tokens.title.unwrap_or(name);
            return Some((title, tokens.year));
        }
        None
    }
}

/// Catalog values replace parsed ones field by field; genres and languages
/// are merged.
fn merge_catalog(record: &mut ClassificationRecord, found: CatalogMatch) {
    if let Some(title) = found.title.filter(|t| !t.trim().is_empty()) {
        record.title = title;
    }
    if found.year.is_some() {
        record.year = found.year;
    }
    if let Some(kind) = found.kind {
        record.kind = kind;
    }
    record
        .genres
        .extend(found.genres.into_iter().map(|g| g.to_lowercase()));
    record
        .languages
        .extend(found.languages.into_iter().map(|l| l.to_lowercase()));
}

fn title_dir_name(record: &ClassificationRecord) -> String {
    match record.year {
        Some(year) => format!("{} ({})", record.title, year),
        None => record.title.clone(),
    }
}
