//! `heatsync` binary.

use std::sync::Arc;

use clap::Parser;
use heatsync_app::{LaneInput, LaneRuntime, StarterInput, StarterRuntime};
use heatsync_client::{HttpStore, TriggerSupervisor};
use heatsync_console::{Cli, ConsoleError, Role, TerminalDriver};
use heatsync_core::{LaneSession, SystemEnv};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), ConsoleError> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let store = Arc::new(HttpStore::new(cli.store_url.clone())?);

    // Subscribe before spawning so the first connect is seen.
    let supervisor = cli.trigger_config().map(|config| TriggerSupervisor::new(config, SystemEnv));
    let triggers = supervisor.as_ref().map(TriggerSupervisor::subscribe);
    let trigger = supervisor.map(TriggerSupervisor::spawn);

    let outcome = match &cli.role {
        Role::Lane(args) => {
            let (lane, initial) = args.target()?;
            info!(%lane, store = store.endpoint(), "starting lane page");
            let session = LaneSession::new(lane, initial);
            let mut runtime = LaneRuntime::new(
                session,
                store,
                TerminalDriver::<LaneInput>::new(),
                SystemEnv,
                cli.lane_config(),
            );
            if let Some(triggers) = triggers {
                runtime = runtime.with_triggers(triggers);
            }
            runtime.run().await
        },
        Role::Starter(args) => {
            info!(store = store.endpoint(), "starting starter console");
            let config = args.starter_config(cli.poll_interval());
            let driver = TerminalDriver::<StarterInput>::new();
            let mut runtime = StarterRuntime::new(store, driver, config);
            if let Some(triggers) = triggers {
                runtime = runtime.with_triggers(triggers);
            }
            runtime.run().await
        },
    };

    if let Some(trigger) = trigger {
        trigger.shutdown();
    }
    outcome.map_err(ConsoleError::from)
}
