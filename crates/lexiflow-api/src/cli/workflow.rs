//! CLI workflow subcommands: trigger, status, resume and the workflow list.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::{Value, json};
use uuid::Uuid;

use lexiflow_types::workflow::{WorkflowRun, WorkflowRunStatus};

use crate::http::response::{RunResponse, WorkflowSummary};
use crate::state::AppState;

/// Arguments of `lexiflow trigger`.
pub struct TriggerArgs {
    pub workflow: String,
    pub reading_text: String,
    pub level: String,
    pub language: String,
    pub max_items: u32,
    pub source_reading_ids: Vec<String>,
    pub owner: String,
}

/// Reviewer decision flags of `lexiflow resume`.
pub struct ResumeArgs {
    pub approve: bool,
    pub reject: bool,
    pub cancel: bool,
    pub feedback: Option<String>,
    pub data: Option<String>,
}

/// Text from `--text`, or the contents of `--file`.
pub async fn read_source(text: Option<String>, file: Option<&Path>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => bail!("Provide --text or --file"),
    }
}

/// Build the trigger input object the engine validates.
pub fn trigger_input(args: &TriggerArgs) -> Value {
    json!({
        "readingText": args.reading_text,
        "targetLevel": args.level.to_uppercase(),
        "targetLanguage": args.language,
        "maxItems": args.max_items,
        "sourceReadingIds": args.source_reading_ids,
    })
}

/// Translate decision flags into `resumeData`.
pub fn resume_data(args: &ResumeArgs) -> Result<Value> {
    if let Some(raw) = &args.data {
        return serde_json::from_str(raw).context("Invalid JSON in --data");
    }
    if args.cancel {
        return Ok(json!({ "cancel": true }));
    }
    if !args.approve && !args.reject {
        bail!("Choose one of --approve, --reject, --cancel or --data");
    }

    let mut data = json!({ "approved": args.approve });
    if let Some(feedback) = &args.feedback {
        data["userFeedback"] = Value::String(feedback.clone());
    }
    Ok(data)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn handle_trigger(state: &AppState, args: TriggerArgs, json: bool) -> Result<()> {
    if !state.generation_ready {
        bail!(
            "Content generation is not configured. Set {} and retry.",
            lexiflow_infra::config::API_KEY_ENV
        );
    }

    let input = trigger_input(&args);
    let run = Arc::clone(&state.engine)
        .trigger_detached(args.workflow.clone(), input, args.owner)
        .await
        .with_context(|| format!("Failed to trigger workflow '{}'", args.workflow))?;

    print_run(&run, json)
}

pub async fn handle_status(state: &AppState, run_id: Uuid, json: bool) -> Result<()> {
    let run = state.engine.status(run_id).await?;
    print_run(&run, json)
}

pub async fn handle_resume(
    state: &AppState,
    run_id: Uuid,
    args: ResumeArgs,
    json: bool,
) -> Result<()> {
    let data = resume_data(&args)?;
    let run = Arc::clone(&state.engine)
        .resume_detached(run_id, data)
        .await
        .with_context(|| format!("Failed to resume run {run_id}"))?;
    print_run(&run, json)
}

pub fn handle_workflows(state: &AppState, json: bool) -> Result<()> {
    let summaries: Vec<WorkflowSummary> = state
        .engine
        .registry()
        .iter()
        .map(WorkflowSummary::from)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Description"),
            Cell::new("Steps"),
        ]);
    for s in &summaries {
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(&s.description),
            Cell::new(s.steps.join(" -> ")),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub fn styled_status(status: WorkflowRunStatus) -> String {
    let label = status.to_string();
    match status {
        WorkflowRunStatus::Success => style(label).green().to_string(),
        WorkflowRunStatus::Failed => style(label).red().to_string(),
        WorkflowRunStatus::Suspended => style(label).yellow().to_string(),
        WorkflowRunStatus::Running | WorkflowRunStatus::Pending => {
            style(label).blue().to_string()
        }
    }
}

fn print_run(run: &WorkflowRun, json: bool) -> Result<()> {
    let response = RunResponse::from(run);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Run {} ({})",
        style("*").green().bold(),
        style(run.id).cyan(),
        run.workflow_name
    );
    println!("  Status: {}", styled_status(run.status));
    if let Some(step) = &run.current_step {
        println!("  Step:   {step}");
    }
    if let Some(err) = &run.error_info {
        println!(
            "  Error:  {} {}",
            style(format!("{:?}", err.category)).red(),
            err.message
        );
    }
    if let Some(data) = &response.data {
        println!();
        for line in serde_json::to_string_pretty(data)?.lines() {
            println!("  {line}");
        }
    }
    if run.status == WorkflowRunStatus::Suspended {
        println!();
        println!(
            "  Review: {}",
            style(format!("lexiflow resume {} --approve | --reject [--feedback ..] | --cancel", run.id)).dim()
        );
    }
    println!();
    Ok(())
}
