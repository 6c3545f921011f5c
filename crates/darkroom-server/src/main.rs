use anyhow::Context;
use clap::Parser;
use darkroom_server::{telemetry, Args, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())
        .with_context(|| format!("failed to load config from {:?}", args.config))?;
    config.apply_args(&args);

    telemetry::init_logging(config.log_json);
    tracing::info!(
        host = %config.host,
        port = config.port,
        origins = ?config.cors_origins,
        "starting darkroom server"
    );

    let handle = darkroom_server::start(config)
        .await
        .context("failed to start server")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;

    tracing::info!(connections = handle.registry.len(), "shutting down");
    handle.shutdown().await;
    Ok(())
}
