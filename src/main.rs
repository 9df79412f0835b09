use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crm_api::config::AppConfig;
use crm_api::provider::supabase::SupabaseClient;
use crm_api::provider::IdentityProvider;
use crm_api::services::report_bootstrap_failures;
use crm_api::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "crm-api", version, about = "Customer, contract and account API")]
struct Args {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, SUPABASE_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crm_api=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting CRM API in {:?} mode", config.environment);

    let client = Arc::new(SupabaseClient::new(&config.provider).context("failed to build provider client")?);
    match client.ping().await {
        Ok(()) => tracing::info!(url = %config.provider.url, "identity provider reachable"),
        Err(e) => tracing::warn!(url = %config.provider.url, error = %e, "identity provider not reachable at startup"),
    }

    let bind_addr = config.bind_addr();
    let (state, failures) = AppState::new(config, client.clone(), client);
    tokio::spawn(report_bootstrap_failures(failures));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("CRM API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
