//! ofwd-replay - drives the forwarding relay with a scripted scenario.
//!
//! Builds in-memory host and topology stores from the scenario, starts the
//! relay against a local packet service and injects every scenario frame.
//! Payloads go to the configured endpoint, or to stdout with `--dry-run`.

use anyhow::Context;
use clap::Parser;
use ofwd_agent::delivery::{self, DeliveryClient};
use ofwd_agent::{
    AgentConfig, DeliveryPayload, ForwardingRelay, OutsourcedForwardingApp, Scenario,
};
use ofwd_packet::{LocalCoreService, LocalPacketService};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Replay intercepted first packets through the outsourced forwarding relay
#[derive(Parser, Debug)]
#[command(name = "ofwd-replay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Agent configuration file (TOML); defaults apply when omitted
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Scenario file (TOML) describing devices, links, hosts and frames
    #[arg(short = 's', long)]
    scenario: PathBuf,

    /// Print payloads to stdout instead of POSTing them
    #[arg(long)]
    dry_run: bool,
}

/// Writes each payload to stdout, separated by a blank line.
struct StdoutDelivery;

impl DeliveryClient for StdoutDelivery {
    fn deliver(&self, payload: &DeliveryPayload) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{payload}\n") {
            error!(error = %e, "Failed to write payload");
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    config.validate()?;

    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;

    let delivery: Arc<dyn DeliveryClient> = if args.dry_run {
        Arc::new(StdoutDelivery)
    } else {
        delivery::from_config(&config.delivery)?
    };

    let relay = Arc::new(ForwardingRelay::new(
        Arc::new(scenario.hosts()?),
        Arc::new(scenario.topology()?),
        delivery,
    ));

    let packet_service = Arc::new(LocalPacketService::new());
    let app = OutsourcedForwardingApp::new(
        config.application.clone(),
        packet_service.clone(),
        Arc::new(LocalCoreService::new()),
        relay,
    );
    app.activate()?;

    let packets = scenario.packets()?;
    let total = packets.len();
    let intercepted = packets
        .into_iter()
        .filter_map(|packet| packet_service.dispatch(packet))
        .count();

    app.deactivate();
    info!(total, intercepted, "Replay complete");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        eprintln!("ofwd-replay: {e:#}");
        return ExitCode::FAILURE;
    }

    info!("--- Starting ofwd-replay ---");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("ofwd-replay failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
