use timelog_sync::api::{HttpApi, TimelogApi};
use timelog_sync::commands::{self, Command, CommandParser};
use timelog_sync::config::Config;
use timelog_sync::display::{self, StatusDisplay, TerminalDisplay};
use timelog_sync::error::SyncError;
use timelog_sync::export;
use timelog_sync::host::{self, InputLines, PageHost, TerminalHost};
use timelog_sync::messages::{self, PageEvent};
use timelog_sync::models::{Notification, StatsSummary};
use timelog_sync::services::connectivity::socket_address;
use timelog_sync::services::{ConnectivityMonitor, StatusSync, StatusSyncHandle, SyncCore};

use anyhow::Result;
use std::sync::Arc;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout is the status display
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting timelog status sync");

    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    run_app(config).await
}

enum SessionEnd {
    Reload,
    Quit,
}

/// Everything a session needs that outlives any single session.
struct Shared {
    config: Config,
    api: Arc<dyn TimelogApi>,
    display: Arc<dyn StatusDisplay>,
    host: Arc<dyn PageHost>,
    events: broadcast::Sender<PageEvent>,
    input: InputLines,
    parser: CommandParser,
}

async fn run_app(config: Config) -> Result<()> {
    let api: Arc<dyn TimelogApi> = Arc::new(HttpApi::new(&config.server_url)?);
    let display: Arc<dyn StatusDisplay> = Arc::new(TerminalDisplay);
    let input = host::spawn_stdin_reader();
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let host: Arc<dyn PageHost> = Arc::new(TerminalHost::new(input.clone(), reload_tx));

    // Page event bus; each session's agent subscribes for its own lifetime
    let (events, _) = broadcast::channel(16);

    match socket_address(&config.server_url) {
        Some(address) => {
            let monitor =
                ConnectivityMonitor::new(address, config.connectivity_check(), events.clone());
            tokio::spawn(monitor.run());
        }
        None => tracing::warn!(
            "Cannot derive a socket address from {}, connectivity monitoring disabled",
            config.server_url
        ),
    }

    let shared = Shared {
        config,
        api,
        display,
        host,
        events,
        input,
        parser: CommandParser::new()?,
    };

    // Registered once so an interrupt during a long action is not lost
    let mut interrupt = signal(SignalKind::interrupt())?;

    println!("{}", commands::HELP);

    loop {
        let core = SyncCore::new(
            shared.api.clone(),
            shared.display.clone(),
            shared.host.clone(),
            shared.config.reload_delay(),
        );
        let (agent, agent_task) =
            StatusSync::spawn(core, &shared.events, shared.config.poll_interval());

        let outcome = run_session(&shared, &agent, &mut reload_rx, &mut interrupt).await;

        if shared.events.send(PageEvent::Unload).is_err() {
            tracing::debug!("Status sync already stopped");
        }
        if let Err(e) = agent_task.await {
            tracing::error!("Status sync task failed: {}", e);
        }

        match outcome {
            SessionEnd::Reload => tracing::info!("Starting new session"),
            SessionEnd::Quit => break,
        }
    }

    tracing::info!("Timelog status sync shutdown complete");
    Ok(())
}

async fn next_line(input: &InputLines) -> Option<String> {
    input.lock().await.recv().await
}

async fn run_session(
    shared: &Shared,
    agent: &StatusSyncHandle,
    reload_rx: &mut mpsc::UnboundedReceiver<()>,
    interrupt: &mut Signal,
) -> SessionEnd {
    // After stdin closes the session keeps polling until Ctrl+C
    let mut input_open = true;

    loop {
        tracing::debug!("Session loop: waiting for input");
        let line = tokio::select! {
            Some(_) = reload_rx.recv() => return SessionEnd::Reload,
            line = next_line(&shared.input), if input_open => line,
            _ = interrupt.recv() => {
                tracing::info!("Received Ctrl+C, shutting down");
                return SessionEnd::Quit;
            }
        };

        let Some(line) = line else {
            tracing::info!("stdin closed, running in the background");
            input_open = false;
            continue;
        };

        match shared.parser.parse(&line) {
            None => {}
            Some(Command::Quit) => return SessionEnd::Quit,
            Some(command) => {
                tokio::select! {
                    _ = handle_command(shared, agent, command) => {}
                    _ = interrupt.recv() => {
                        tracing::info!("Received Ctrl+C during a command, shutting down");
                        return SessionEnd::Quit;
                    }
                }
            }
        }
    }
}

fn log_action_failure(action: &str, error: &SyncError) {
    if error.is_validation() {
        tracing::debug!("{} rejected before sending: {}", action, error);
    } else {
        tracing::warn!("{} failed: {}", action, error);
    }
}

async fn handle_command(shared: &Shared, agent: &StatusSyncHandle, command: Command) {
    tracing::debug!("handle_command: {:?}", command);

    // Action failures were already shown as toasts by the agent
    match command {
        Command::Status => {
            if let Ok(None) = agent.refresh().await {
                tracing::debug!("Status refresh failed, keeping previous badge");
            }
        }

        Command::Start { name, category } => {
            if let Err(e) = agent.start_task(name, category).await {
                log_action_failure("start", &e);
            }
        }

        Command::Stop => {
            if let Err(e) = agent.stop_task().await {
                log_action_failure("stop", &e);
            }
        }

        Command::Stats { days } => {
            let days = days.unwrap_or(shared.config.default_stats_days);
            match agent.stats_data(days).await {
                Ok(payload) => match StatsSummary::from_value(&payload) {
                    Ok(summary) => println!("{}", display::stats_report(&summary)),
                    Err(e) => {
                        tracing::warn!("Unrecognised stats payload: {}", e);
                        println!("{}", payload);
                    }
                },
                Err(e) => log_action_failure("stats", &e),
            }
        }

        Command::Clear => {
            if let Err(e) = agent.clear_all_data().await {
                log_action_failure("clear", &e);
            }
        }

        Command::Export { path, format } => {
            let Ok(contents) = agent.export_data(format).await else {
                return;
            };
            match export::write_export(&path, &contents) {
                Ok(()) => shared.display.show_toast(&Notification::success(format!(
                    "已导出到 {}",
                    path.display()
                ))),
                Err(e) => {
                    messages::publish_error(
                        &shared.events,
                        format!("export to {:?} failed: {:#}", path, e),
                    );
                }
            }
        }

        Command::Help => println!("{}", commands::HELP),

        Command::Unknown(line) => shared.display.show_toast(&Notification::info(format!(
            "未知命令: {}，输入 help 查看帮助",
            line
        ))),

        Command::Quit => {}
    }
}
