//! bedomen-replay: run the trapdoor automaton against a scripted host.
//!
//! Config resolution, first match wins:
//!   --config / BEDOMEN_CONFIG   YAML automaton config
//!   `config:` block of the scenario
//!   --preset                    built-in variant (default: in-loop)
//!
//! Notifications are printed to stdout; diagnostics go to stderr and are
//! filtered with RUST_LOG (default: info,bedomen_core=debug).

mod replay;
mod scenario;
mod sim;

use anyhow::{Context, Result};
use bedomen_core::AutomatonConfig;
use clap::{Parser, ValueEnum};
use scenario::Scenario;
use sim::ChatEcho;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Permissive opens, 15 s polled confirmation
    InLoop,
    /// Prior-closed opens only, 3 s polled confirmation, marker-file logging
    StrictPolled,
    /// Hold use for 1.9 s without polling
    BlindHold,
}

impl Preset {
    fn config(self) -> AutomatonConfig {
        match self {
            Preset::InLoop => AutomatonConfig::default(),
            Preset::StrictPolled => AutomatonConfig::strict_polled(),
            Preset::BlindHold => AutomatonConfig::blind_hold(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "bedomen-replay", version, about = "Replay a trapdoor scenario through the auto-drink automaton")]
struct Args {
    /// Scenario file (YAML)
    scenario: PathBuf,

    /// Automaton config file (YAML)
    #[arg(long, env = "BEDOMEN_CONFIG")]
    config: Option<PathBuf>,

    /// Built-in config used when no file provides one
    #[arg(long, value_enum, default_value_t = Preset::InLoop)]
    preset: Preset,

    /// Keep listening this long after the last scripted step (ms)
    #[arg(long, default_value_t = 2_000)]
    linger_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bedomen_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let scenario = Scenario::from_file(&args.scenario)?;
    let config = match (&args.config, &scenario.config) {
        (Some(path), _) => AutomatonConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        (None, Some(embedded)) => embedded.clone(),
        (None, None) => args.preset.config(),
    };
    tracing::info!(
        scenario = %args.scenario.display(),
        trigger_distance = config.trigger_distance,
        cooldown_ms = config.cooldown_ms,
        "Config loaded"
    );

    let (stop, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping");
            let _ = stop.send(true);
        }
    });

    let summary = replay::replay(
        scenario,
        config,
        Arc::new(ChatEcho),
        shutdown,
        Duration::from_millis(args.linger_ms),
    )
    .await?;

    println!(
        "drinks: {}, bottles left: {}, auto-drink {}, logging {}",
        summary.drinks,
        summary.bottles_left,
        if summary.enabled { "on" } else { "off" },
        if summary.logging_enabled { "on" } else { "off" },
    );
    Ok(())
}
