use std::path::Path;

use colored::Colorize;
use serde_json::json;

use crate::error::{Result, TodoError};
use crate::model::DEFAULT_OWNER;
use crate::output::Format;
use crate::store::index::IndexIssue;
use crate::store::repo::Repo;

fn category(issue: &IndexIssue) -> &'static str {
    match issue {
        IndexIssue::MissingDueEntry { .. }
        | IndexIssue::StrayDueEntry { .. }
        | IndexIssue::DanglingDueEntry { .. } => "due_index",
        IndexIssue::MissingPending { .. }
        | IndexIssue::StrayPending { .. }
        | IndexIssue::DanglingPending { .. } => "pending_index",
        IndexIssue::CorruptRecord { .. } => "records",
    }
}

/// Audit records against both indexes. Fails with `IndexCorrupt` when any
/// issue is found so the exit status reflects store health.
pub fn run(db_path: &Path, format: Format) -> Result<()> {
    let repo = Repo::open(db_path)?;
    let issues = repo.tasks().verify(DEFAULT_OWNER)?;
    let location = repo
        .db()
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".into());

    match format {
        Format::Json => {
            let rows: Vec<_> = issues
                .iter()
                .map(|issue| {
                    json!({
                        "category": category(issue),
                        "level": "error",
                        "message": issue.to_string(),
                    })
                })
                .collect();
            println!(
                "{}",
                json!({ "db": location, "ok": issues.is_empty(), "issues": rows })
            );
        }
        Format::Pretty => {
            if issues.is_empty() {
                println!("[{}] store: indexes match records in {location}", " ok ".green());
            }
            for issue in &issues {
                println!("[{}] {}: {issue}", " ERR".red().bold(), category(issue));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(TodoError::IndexCorrupt(format!(
            "{} issue(s) found; run `todo reindex` to rebuild",
            issues.len()
        )))
    }
}
