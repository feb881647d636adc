use std::path::PathBuf;

use anyhow::Context;
use checkin_server::ServerConfig;
use checkin_telemetry::{LogFormat, TelemetryConfig};
use clap::{Parser, ValueEnum};
use tracing::Level;

/// Live check-in server: tracks streaming clients and a shared status record.
#[derive(Debug, Parser)]
#[command(name = "checkin", version)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8081)]
    port: u16,

    /// Disconnect clients that send nothing for this many seconds.
    #[arg(long, default_value_t = 60)]
    keepalive_secs: u64,

    /// Landing page served at `/`.
    #[arg(long, default_value = "static/index.html")]
    index: PathBuf,

    /// Default log level (RUST_LOG takes precedence).
    #[arg(long, default_value = "info")]
    log_level: Level,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    log_format: Format,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

impl From<Format> for LogFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => LogFormat::Json,
            Format::Pretty => LogFormat::Pretty,
        }
    }
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            keepalive_interval_secs: self.keepalive_secs,
            index_path: self.index.clone(),
            ..ServerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    checkin_telemetry::init_telemetry(&TelemetryConfig {
        log_level: cli.log_level,
        format: cli.log_format.into(),
        ..TelemetryConfig::default()
    });

    let handle = checkin_server::start(cli.server_config())
        .await
        .context("failed to start server")?;

    tracing::info!(addr = %handle.addr(), "check-in server ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;

    tracing::info!("shutting down");
    handle.shutdown();
    handle.join().await;
    Ok(())
}
