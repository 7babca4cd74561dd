//! CLI run management: listing stored runs, expiring stale reviews and
//! failing stalled runs.

use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use lexiflow_types::workflow::{WorkflowRun, WorkflowRunStatus};

use super::workflow::styled_status;
use crate::state::AppState;

#[derive(Subcommand, Debug)]
pub enum RunsCommand {
    /// List runs, newest first
    List {
        /// Only show runs in this status (e.g. SUSPENDED)
        #[arg(long)]
        status: Option<String>,

        /// Maximum number of runs to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Fail suspended runs that waited too long for a review, and RUNNING
    /// runs that stopped making progress
    Sweep {
        /// Age threshold in hours since the run last changed
        #[arg(long)]
        older_than_hours: u64,
    },
}

pub async fn handle_runs_command(action: RunsCommand, state: &AppState, json: bool) -> Result<()> {
    match action {
        RunsCommand::List { status, limit } => list_runs(state, status.as_deref(), limit, json).await,
        RunsCommand::Sweep { older_than_hours } => sweep(state, older_than_hours, json).await,
    }
}

pub fn parse_status(raw: Option<&str>) -> Result<Option<WorkflowRunStatus>> {
    raw.map(|s| s.parse::<WorkflowRunStatus>().map_err(|e| anyhow!(e)))
        .transpose()
}

async fn list_runs(state: &AppState, status: Option<&str>, limit: u32, json: bool) -> Result<()> {
    let status = parse_status(status)?;
    let runs = state.engine.list_runs(status, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!();
        println!("  {}", style("No runs found.").dim());
        println!();
        return Ok(());
    }

    println!();
    println!("{}", runs_table(&runs));
    println!();
    println!("  {} run(s)", runs.len());
    println!();
    Ok(())
}

fn runs_table(runs: &[WorkflowRun]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Run ID").fg(Color::Cyan),
            Cell::new("Workflow"),
            Cell::new("Status"),
            Cell::new("Step"),
            Cell::new("Owner"),
            Cell::new("Updated"),
        ]);

    for run in runs {
        table.add_row(vec![
            Cell::new(run.id),
            Cell::new(&run.workflow_name),
            Cell::new(styled_status(run.status)),
            Cell::new(run.current_step.as_deref().unwrap_or("-")),
            Cell::new(&run.owner_id),
            Cell::new(run.updated_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    table
}

async fn sweep(state: &AppState, older_than_hours: u64, json: bool) -> Result<()> {
    let threshold = Duration::from_secs(older_than_hours.saturating_mul(3600));
    let expired = state.engine.expire_suspended(threshold).await?;
    let stalled = state.engine.fail_stalled().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "expired": expired,
                "stalled": stalled,
            }))?
        );
        return Ok(());
    }

    println!();
    if expired.is_empty() && stalled.is_empty() {
        println!("  {}", style("Nothing to sweep.").dim());
    } else {
        for id in &expired {
            println!("  {} {}", style("expired").yellow(), id);
        }
        for id in &stalled {
            println!("  {} {}", style("stalled").red(), id);
        }
        println!();
        println!(
            "  {} run(s) expired, {} stalled run(s) failed",
            expired.len(),
            stalled.len()
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(
            parse_status(Some("suspended")).unwrap(),
            Some(WorkflowRunStatus::Suspended)
        );
        assert!(parse_status(Some("paused")).is_err());
    }

    #[test]
    fn test_runs_table_has_row_per_run() {
        let mut run = WorkflowRun::new("vocabulary", serde_json::json!({}), "cli");
        run.current_step = Some("generate".into());
        let other = WorkflowRun::new("reading", serde_json::json!({}), "web");

        let rendered = runs_table(&[run.clone(), other]).to_string();
        assert!(rendered.contains(&run.id.to_string()));
        assert!(rendered.contains("generate"));
        assert!(rendered.contains("web"));
    }
}
