use crate::agent::{
    InferenceSettings, Orchestrator, StdinLines, TurnOutcome, gather_system_context,
    render_catalogue, run_session,
};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::dispatch::{Dispatcher, ProcessRunner};
use crate::mcp::McpServer;
use crate::memory::ConversationMemory;
use crate::providers::create_provider;
use crate::security::CliConfirmationBroker;
use crate::ui;
use anyhow::Result;
use clap::CommandFactory;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

fn build_dispatcher(config: &Config) -> Dispatcher {
    Dispatcher::new(
        Arc::new(ProcessRunner::new(config.dispatch.max_output_bytes)),
        config.dispatch.settings(),
    )
}

async fn build_orchestrator(cli: &Cli, config: &Config) -> Result<Orchestrator> {
    let provider = create_provider(&config.provider)?;
    let dispatcher = build_dispatcher(config);

    let system_context = gather_system_context(
        &ProcessRunner::default(),
        config.agent.system_context_script.as_deref(),
        Duration::from_secs(config.agent.system_context_timeout_secs),
    )
    .await;

    let inference = InferenceSettings {
        model: cli
            .model
            .clone()
            .unwrap_or_else(|| config.provider.model.clone()),
        temperature: config.provider.temperature,
        timeout: Duration::from_secs(config.provider.timeout_secs),
    };
    tracing::info!(provider = provider.name(), model = %inference.model, "agent ready");

    Ok(Orchestrator::new(
        Arc::from(provider),
        dispatcher,
        Arc::new(CliConfirmationBroker::new()),
        ConversationMemory::new(
            config.agent.history_window,
            config.agent.result_summary_chars,
        ),
        inference,
    )
    .with_system_context(system_context)
    .with_auto_approve(cli.yes || config.agent.auto_approve))
}

/// Usage on stderr and a failing exit when there is nothing to do.
/// Decided from the command line alone, before any config is read or written.
pub fn usage_exit(cli: &Cli) -> Option<ExitCode> {
    if cli.has_work() {
        return None;
    }
    eprintln!("{}", Cli::command().render_help());
    Some(ExitCode::FAILURE)
}

/// Run whatever the command line asked for.
pub async fn dispatch(cli: Cli, config: Config) -> Result<ExitCode> {
    match cli.command {
        Some(Commands::Serve { yes }) => {
            let server = McpServer::new(build_dispatcher(&config), yes || config.serve.auto_approve);
            server.run().await?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Tools { json }) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&crate::mcp::tools::get_tools())?
                );
            } else {
                print!("{}", render_catalogue());
            }
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    if let Some(code) = usage_exit(&cli) {
        return Ok(code);
    }
    let request = cli.request_text();

    let mut orchestrator = build_orchestrator(&cli, &config).await?;

    if cli.interactive {
        let mut stdout = std::io::stdout();
        run_session(&mut orchestrator, &mut StdinLines, &mut stdout).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(request) = request else {
        return Ok(ExitCode::FAILURE);
    };
    let mut stdout = std::io::stdout();
    ui::thinking(&mut stdout)?;
    let outcome = orchestrator.process_turn(&request).await;
    ui::render_outcome(&mut stdout, &outcome)?;

    Ok(match outcome {
        TurnOutcome::InferenceFailed { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
