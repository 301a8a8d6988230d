//! Plan executor module.
//!
//! Applies file operations through a [`Mover`]:
//! - move: relocate a file (keep promotions, demotions, sort moves)
//! - soft delete: move into the deleted-media directory
//!
//! Operations are independent and run concurrently on a bounded width.

use crate::models::plan::{Disposition, Plan};
use crate::utils::fs::Mover;
use crate::{Error, Result};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

/// A single filesystem operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    Move { from: PathBuf, to: PathBuf },
    SoftDelete { path: PathBuf },
}

impl FileOp {
    pub fn source(&self) -> &PathBuf {
        match self {
            FileOp::Move { from, .. } => from,
            FileOp::SoftDelete { path } => path,
        }
    }
}

/// Counts from one execution.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Files left where they are.
    pub unchanged: usize,
    pub moved: usize,
    pub deleted: usize,
    /// `(source, error)` for every failed operation.
    pub errors: Vec<(PathBuf, String)>,
}

impl ExecutionReport {
    /// Check if every operation succeeded.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Print summary.
    pub fn print_summary(&self) {
        println!("{}", "[Execution Summary]".bold().green());
        println!("  {} {}", "Unchanged:".bold(), self.unchanged);
        println!("  {} {}", "Moved:".bold(), self.moved);
        println!("  {} {}", "Soft-deleted:".bold(), self.deleted);
        println!("  {} {}", "Failed:".bold(), self.errors.len());

        if !self.errors.is_empty() {
            println!();
            println!("{}", "[Errors]".bold().red());
            for (path, error) in &self.errors {
                println!("  - {}: {}", path.display(), error);
            }
        }
    }
}

/// Plan executor.
pub struct Executor {
    mover: Arc<dyn Mover>,
    width: usize,
}

impl Executor {
    pub fn new(mover: Arc<dyn Mover>, width: usize) -> Self {
        Self {
            mover,
            width: width.max(1),
        }
    }

    /// Turn a dedupe plan into file operations.
    pub fn plan_operations(plan: &Plan) -> (Vec<FileOp>, usize) {
        let mut ops = Vec::new();
        let mut unchanged = 0;
        for action in plan.actions() {
            match (action.disposition, &action.target) {
                (Disposition::Delete, _) => ops.push(FileOp::SoftDelete {
                    path: action.source.clone(),
                }),
                (_, Some(target)) => ops.push(FileOp::Move {
                    from: action.source.clone(),
                    to: target.clone(),
                }),
                (_, None) => unchanged += 1,
            }
        }
        (ops, unchanged)
    }

    /// Execute a dedupe plan.
    pub async fn execute(&self, plan: &Plan) -> ExecutionReport {
        let (ops, unchanged) = Self::plan_operations(plan);
        tracing::info!(
            "Executing plan {} ({} operations, {} files unchanged)",
            plan.plan_id,
            ops.len(),
            unchanged
        );
        let mut report = self.run(ops).await;
        report.unchanged += unchanged;
        report
    }

    /// Run operations concurrently and collect the outcome.
    pub async fn run(&self, ops: Vec<FileOp>) -> ExecutionReport {
        let pb = ProgressBar::new(ops.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        let results: Vec<(FileOp, Result<PathBuf>)> = stream::iter(ops)
            .map(|op| {
                let mover = self.mover.clone();
                async move {
                    let task_op = op.clone();
                    let result = tokio::task::spawn_blocking(move || match &task_op {
                        FileOp::Move { from, to } => mover.move_path(from, to),
                        FileOp::SoftDelete { path } => mover.soft_delete(path),
                    })
                    .await
                    .map_err(|e| Error::other(format!("file task failed: {}", e)))
                    .and_then(|r| r);
                    (op, result)
                }
            })
            .buffer_unordered(self.width)
            .inspect(|(op, _)| {
                pb.set_message(
                    op.source()
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string(),
                );
                pb.inc(1);
            })
            .collect()
            .await;

        pb.finish_and_clear();

        let mut report = ExecutionReport::default();
        for (op, result) in results {
            match (op, result) {
                (FileOp::Move { .. }, Ok(_)) => report.moved += 1,
                (FileOp::SoftDelete { .. }, Ok(_)) => report.deleted += 1,
                (op, Err(e)) => {
                    tracing::error!("Operation failed: {} - {}", op.source().display(), e);
                    report.errors.push((op.source().clone(), e.to_string()));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::{GroupPlan, PlanAction};
    use crate::models::media::MediaKind;

    fn action(source: &str, disposition: Disposition, target: Option<&str>) -> PlanAction {
        PlanAction {
            source: PathBuf::from(source),
            rank: 0,
            disposition,
            target: target.map(PathBuf::from),
        }
    }

    #[test]
    fn test_plan_operations() {
        let mut plan = Plan::new();
        plan.groups.push(GroupPlan {
            title: "Heat".to_string(),
            year: Some(1995),
            kind: MediaKind::Movie,
            season: None,
            episode: None,
            actions: vec![
                action("/m/a.mkv", Disposition::Keep, None),
                action("/m/b.mkv", Disposition::Demote, Some("/m/extras/b.mkv")),
                action("/m/extras/c.mkv", Disposition::Demote, None),
                action("/m/d.mkv", Disposition::Delete, None),
            ],
        });

        let (ops, unchanged) = Executor::plan_operations(&plan);
        assert_eq!(unchanged, 2);
        assert_eq!(
            ops,
            vec![
                FileOp::Move {
                    from: PathBuf::from("/m/b.mkv"),
                    to: PathBuf::from("/m/extras/b.mkv"),
                },
                FileOp::SoftDelete {
                    path: PathBuf::from("/m/d.mkv"),
                },
            ]
        );
    }
}
