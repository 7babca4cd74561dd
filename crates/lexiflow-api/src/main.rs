//! Lexiflow CLI and REST API entry point.
//!
//! Binary name: `lexiflow`
//!
//! Parses CLI arguments, initializes tracing, the run database and the
//! workflow engine, then dispatches to a command handler or starts the
//! REST API server.

mod cli;
mod http;
mod state;

use anyhow::anyhow;
use clap::Parser;
use clap_complete::generate;

use cli::workflow::{ResumeArgs, TriggerArgs};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    lexiflow_observe::init_tracing(cli.otel, cli.log_level())
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;

    lexiflow_observe::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that don't need app state
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "lexiflow", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Analyze {
            text,
            file,
            language,
            max_candidates,
            words,
        } => {
            let text = cli::workflow::read_source(text, file.as_deref()).await?;
            return cli::analyze::handle_analyze(text, language, max_candidates, words, cli.json)
                .await;
        }
        _ => {}
    }

    let state = AppState::init(cli.data_dir).await?;

    match cli.command {
        Commands::Trigger {
            workflow,
            text,
            file,
            level,
            language,
            max_items,
            source_reading_ids,
            owner,
        } => {
            let reading_text = cli::workflow::read_source(text, file.as_deref()).await?;
            let args = TriggerArgs {
                workflow,
                reading_text,
                level,
                language,
                max_items,
                source_reading_ids,
                owner,
            };
            cli::workflow::handle_trigger(&state, args, cli.json).await?;
        }

        Commands::Status { run_id } => {
            cli::workflow::handle_status(&state, run_id, cli.json).await?;
        }

        Commands::Resume {
            run_id,
            approve,
            reject,
            cancel,
            feedback,
            data,
        } => {
            let args = ResumeArgs {
                approve,
                reject,
                cancel,
                feedback,
                data,
            };
            cli::workflow::handle_resume(&state, run_id, args, cli.json).await?;
        }

        Commands::Workflows => {
            cli::workflow::handle_workflows(&state, cli.json)?;
        }

        Commands::Runs { action } => {
            cli::runs::handle_runs_command(action, &state, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !state.generation_ready {
                println!(
                    "  {} {} is not set; workflow triggers will return 503",
                    console::style("!").yellow().bold(),
                    lexiflow_infra::config::API_KEY_ENV
                );
            }
            println!(
                "  {} Lexiflow API listening on {}",
                console::style("*").green().bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } | Commands::Analyze { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
