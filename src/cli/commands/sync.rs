//! Sync command implementation.
//!
//! Plans the whole collection, prints one report line per note, and —
//! unless the caller opted out — asks for confirmation before writing the
//! `New`/`Update` subset. Individual write failures are reported but do not
//! change the exit status; only configuration and enumeration errors are
//! fatal here.

use colored::{ColoredString, Colorize};
use dialoguer::Confirm;

use super::prompt_error;
use crate::config::{self, Config};
use crate::error::Result;
use crate::sync::{SyncEngine, SyncPlan, SyncStatus};

/// Execute the sync command.
pub fn execute(all: bool, yes: bool, dry_run: bool, json: bool) -> Result<()> {
    let config = config::load()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, all, yes, dry_run, json))
}

async fn run(config: Config, all: bool, yes: bool, dry_run: bool, json: bool) -> Result<()> {
    let engine = SyncEngine::open(config).await?;
    let plan = engine.plan().await?;

    if json {
        return run_json(&engine, &plan, yes, dry_run).await;
    }

    for report in &plan.notes {
        match &report.outcome {
            Ok(entry) if all || entry.status.is_actionable() => {
                println!("{} {}", paint(entry.status), entry.post.filename);
            }
            Ok(_) => {}
            Err(e) => println!("{} {}: {e}", "ERROR".red().bold(), report.source.display()),
        }
    }
    for warning in &plan.warnings {
        println!(
            "{} {} notes render to '{}'; their note ids were appended to keep the files distinct",
            "WARNING".yellow().bold(),
            warning.sources.len(),
            warning.filename
        );
    }

    let actionable = plan.actionable();
    if actionable.is_empty() {
        println!("Nothing to sync.");
        return Ok(());
    }

    if dry_run {
        println!(
            "{} post(s) would be written to {}",
            actionable.len(),
            engine.posts_dir().display()
        );
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Write {} post(s) to {}?",
                actionable.len(),
                engine.posts_dir().display()
            ))
            .default(false)
            .interact()
            .map_err(prompt_error)?;
        if !confirmed {
            println!("Canceled.");
            return Ok(());
        }
    }

    let results = engine.apply(&actionable).await;
    let mut failed = 0;
    for report in &results {
        match &report.result {
            Ok(()) => println!("{} {}", "SYNCED".green().bold(), report.filename),
            Err(e) => {
                failed += 1;
                println!("{} {}: {e}", "FAILED".red().bold(), report.filename);
            }
        }
    }
    if failed > 0 {
        println!("{failed} of {} writes failed.", results.len());
    } else {
        println!(
            "Wrote {} post(s) to {}",
            results.len(),
            engine.posts_dir().display()
        );
    }
    Ok(())
}

/// Machine-readable variant: the full plan as one JSON document.
///
/// There is no interactive prompt in JSON mode; writes happen only with
/// `--yes` (and never with `--dry-run`).
async fn run_json(engine: &SyncEngine, plan: &SyncPlan, yes: bool, dry_run: bool) -> Result<()> {
    let notes: Vec<serde_json::Value> = plan
        .notes
        .iter()
        .map(|report| match &report.outcome {
            Ok(entry) => serde_json::json!({
                "source": report.source.display().to_string(),
                "filename": entry.post.filename,
                "status": entry.status,
                "target": entry.target.display().to_string(),
            }),
            Err(e) => serde_json::json!({
                "source": report.source.display().to_string(),
                "error": { "code": e.code(), "message": e.to_string() },
            }),
        })
        .collect();

    let mut output = serde_json::json!({
        "posts_dir": engine.posts_dir().display().to_string(),
        "notes": notes,
        "warnings": plan.warnings,
    });

    if yes && !dry_run {
        let results = engine.apply(&plan.actionable()).await;
        output["writes"] = results
            .iter()
            .map(|report| {
                serde_json::json!({
                    "filename": report.filename,
                    "target": report.target.display().to_string(),
                    "ok": report.result.is_ok(),
                    "error": report.result.as_ref().err().map(ToString::to_string),
                })
            })
            .collect::<Vec<_>>()
            .into();
    }

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn paint(status: SyncStatus) -> ColoredString {
    let s = status.as_str();
    match status {
        SyncStatus::New => s.green(),
        SyncStatus::Update => s.cyan(),
        SyncStatus::Stable => s.blue(),
        SyncStatus::Skip => s.yellow(),
    }
    .bold()
}
