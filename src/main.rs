use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use psnet::{config, logging, server, Registry};

#[derive(Debug, Parser)]
#[command(name = "psnet")]
#[command(about = "Simulated network connections with piecewise bandwidth")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Address to listen on, overriding the config file
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Time dilation factor, overriding the config file
    #[arg(long)]
    time_dilation: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    let mut cfg = config::read_config(&cli.config)?;
    cfg.apply_overrides(cli.listen, cli.time_dilation);

    let registry = Arc::new(Registry::new(cfg.clock()?));
    tracing::info!(
        time_dilation = registry.clock().dilation(),
        "starting psnet"
    );
    server::serve(cfg.listen, registry).await
}
