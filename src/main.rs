//! Main entry point for CLI command to start the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use entity_gateway::Configuration;
use entity_gateway::Executor;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Options for the gateway
#[derive(Parser, Debug)]
#[command(
    name = "entity-gateway",
    about = "GraphQL gateway over a REST entity lookup service"
)]
struct Opt {
    /// Log level (off|error|warn|info|debug|trace).
    #[arg(long = "log", default_value = "info", env = "ENTITY_GATEWAY_LOG")]
    env_filter: String,

    /// Socket address to listen on.
    #[arg(long, env = "ENTITY_GATEWAY_LISTEN")]
    listen: Option<SocketAddr>,

    /// Base URL of the upstream entity lookup API.
    #[arg(long, env = "ENTITY_GATEWAY_UPSTREAM_URL")]
    upstream_url: Option<Url>,
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(rt_main())
}

async fn rt_main() -> Result<()> {
    let opt = Opt::parse();

    let env_filter = std::env::var("RUST_LOG").ok().unwrap_or(opt.env_filter);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&env_filter).context("could not parse log")?)
        .init();

    let configuration = Configuration::builder()
        .and_listen(opt.listen)
        .and_upstream_url(opt.upstream_url)
        .build();
    let listen = configuration.listen;

    let executor = Arc::new(Executor::new(&configuration)?);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("could not bind to {listen}"))?;
    tracing::info!("GraphQL endpoint exposed at http://{listen}/graphql");
    tracing::info!(
        "Test with: curl -g 'http://{listen}/graphql?query={{entity(id:1){{name}}}}'"
    );

    axum::serve(listener, entity_gateway::app(executor))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "could not install the ctrl-c handler");
    }
}
