//! cue-remote entry point.
//!
//! ```text
//! cue-remote                     Drive the configured template from stdin
//! cue-remote --config <path>     Use a custom config TOML
//! cue-remote --url <endpoint>    Override the transport endpoint
//! cue-remote --gen-config        Print the default config and exit
//! cue-remote --init              Write the default config to --config and exit
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cue_core::CommandSink;
use cue_remote::config::{LoggingConfig, RemoteConfig};
use cue_remote::console;
use cue_remote::templates::build_template;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cue-remote", about = "Broadcast template console host")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "cue-remote.toml")]
    config: PathBuf,

    /// Endpoint for the configured transport (overrides config).
    /// Example: ws://192.168.5.5:9001
    #[arg(short, long)]
    url: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    /// Write the default configuration to the --config path and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(logging: &LoggingConfig) -> std::io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.file.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&logging.file)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&RemoteConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    if cli.init {
        RemoteConfig::write_default(&cli.config)?;
        println!("Wrote {}", cli.config.display());
        return Ok(());
    }

    let mut config = RemoteConfig::load(&cli.config);
    if let Some(url) = cli.url {
        config.channel.set_endpoint(url);
    }

    init_tracing(&config.logging)?;

    info!("cue-remote v{}", env!("CARGO_PKG_VERSION"));
    info!(
        transport = ?config.channel.transport,
        endpoint = config.channel.endpoint(),
        drain_order = ?config.channel.drain_order,
        "command transport"
    );
    info!(
        template = ?config.template.kind,
        renames = config.renames.len(),
        "template"
    );

    let sink = config.channel.build_sink();
    let mut template = build_template(config.template.kind, config.renames, Arc::clone(&sink));

    let stdin = BufReader::new(tokio::io::stdin());
    let interrupted = tokio::select! {
        result = console::run(stdin, template.as_mut(), sink.as_ref()) => {
            result?;
            false
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            true
        }
    };

    let close_timeout = config.channel.close_timeout();
    if tokio::time::timeout(close_timeout, sink.close()).await.is_err() {
        warn!(timeout = ?close_timeout, "command transport did not settle in time");
    }
    match sink.pending_count() {
        0 => info!("session ended"),
        pending => warn!(pending, "session ended with undelivered commands"),
    }

    if interrupted {
        // The blocking stdin read would keep the runtime from shutting down.
        std::process::exit(0);
    }
    Ok(())
}
