use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "machinv", about = "Machine inventory ingestion service")]
struct Cli {
    /// Config file (TOML). Defaults to $XDG_CONFIG_HOME/machinv/config.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding `[server] bind`.
    #[arg(long)]
    bind: Option<String>,

    /// Source mapping file (JSON), overriding `[mappings] path`.
    #[arg(long)]
    mappings: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut config = machinv::Config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(mappings) = cli.mappings {
        config.mappings.path = mappings;
    }

    let app = machinv::in_memory_app(&config)?;
    let listener = TcpListener::bind(&config.server.bind).await?;
    machinv_server::serve(listener, app).await
}
