//! Duplicate resolution.
//!
//! Records describing the same movie or episode form a group. Within a group
//! the best-ranked file is kept, the next two are demoted to an `extras`
//! directory and everything else is soft-deleted.

use crate::models::media::{ClassificationRecord, MediaKind};
use crate::models::plan::{Disposition, GroupPlan, Plan, PlanAction, PLAN_VERSION};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the directory demoted copies live in.
pub const EXTRAS_DIR: &str = "extras";

/// Positions 2..=KEEP_AS_EXTRAS are demoted rather than deleted.
const KEEP_AS_EXTRAS: usize = 3;

/// Identity of a logical title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub title: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl GroupKey {
    pub fn of(record: &ClassificationRecord) -> Self {
        let is_series = record.kind == MediaKind::Series;
        Self {
            title: record.title.clone(),
            year: record.year,
            season: if is_series { record.season } else { None },
            episode: if is_series { record.episode } else { None },
        }
    }
}

/// Group records and decide what happens to each file.
pub fn resolve_duplicates(records: &[ClassificationRecord]) -> Plan {
    let mut order: Vec<GroupKey> = Vec::new();
    let mut groups: HashMap<GroupKey, Vec<&ClassificationRecord>> = HashMap::new();
    for record in records {
        let key = GroupKey::of(record);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let mut plan = Plan::new();
    for key in order {
        let Some(mut members) = groups.remove(&key) else {
            continue;
        };
        // Stable: equal ranks keep discovery order.
        members.sort_by(|a, b| b.rank.cmp(&a.rank));

        let kind = members[0].kind;
        let actions = members
            .iter()
            .enumerate()
            .map(|(i, record)| decide(i + 1, record))
            .collect();

        plan.groups.push(GroupPlan {
            title: key.title,
            year: key.year,
            kind,
            season: key.season,
            episode: key.episode,
            actions,
        });
    }

    tracing::info!(
        "Resolved {} groups: {} keep, {} demote, {} delete",
        plan.groups.len(),
        plan.count(Disposition::Keep),
        plan.count(Disposition::Demote),
        plan.count(Disposition::Delete)
    );
    plan
}

/// Decision for the file at 1-based `position` of its sorted group.
fn decide(position: usize, record: &ClassificationRecord) -> PlanAction {
    let source = record.source_path.clone();
    let in_extras = source
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case(EXTRAS_DIR))
        .unwrap_or(false);
    let filename = record.filename();

    let (disposition, target) = match position {
        1 => {
            let target = if in_extras {
                record
                    .destination_dir
                    .as_ref()
                    .map(|dir| dir.join(&filename))
                    .filter(|t| *t != source)
            } else {
                None
            };
            (Disposition::Keep, target)
        }
        p if p <= KEEP_AS_EXTRAS => {
            let target = record
                .destination_dir
                .clone()
                .or_else(|| source.parent().map(Path::to_path_buf))
                .map(|dir| dir.join(EXTRAS_DIR).join(&filename))
                .filter(|t| *t != source);
            (Disposition::Demote, target)
        }
        _ => (Disposition::Delete, None),
    };

    PlanAction {
        source,
        rank: record.rank,
        disposition,
        target,
    }
}

/// Save a plan as pretty JSON.
pub fn save_plan(plan: &Plan, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    tracing::info!("Plan saved to {:?}", path);
    Ok(())
}

/// Load a plan from a JSON file.
pub fn load_plan(path: &Path) -> Result<Plan> {
    let content = fs::read_to_string(path)?;
    let plan: Plan = serde_json::from_str(&content)
        .map_err(|e| Error::InvalidPlanFile(format!("{}: {}", path.display(), e)))?;
    if plan.version != PLAN_VERSION {
        return Err(Error::InvalidPlanFile(format!(
            "{}: unsupported version {}",
            path.display(),
            plan.version
        )));
    }
    Ok(plan)
}

/// Default plan output path inside `dir`.
pub fn default_plan_path(dir: &Path) -> PathBuf {
    dir.join(format!("dedupe_plan_{}.json", Utc::now().format("%Y%m%d_%H%M%S")))
}
