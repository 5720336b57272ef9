use anyhow::Context;
use clap::Parser; // for cli
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use omnichat_gateway::cache::ResponseCache;
use omnichat_gateway::config::Args;
use omnichat_gateway::providers::{Credentials, HttpBackend, ProviderId};
use omnichat_gateway::router::ProviderRouter;
use omnichat_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // local development keeps API keys in .env
    dotenv::dotenv().ok();

    // parse cli arguments
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("warn,omnichat_gateway={}", args.log_level)))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if !args.default_provider.is_implemented() {
        anyhow::bail!(
            "default provider '{}' has no adapter and cannot serve fallback requests",
            args.default_provider
        );
    }

    let credentials = Credentials::from_env();
    for p in ProviderId::ALL {
        if credentials.has(p) {
            tracing::info!(provider = %p, implemented = p.is_implemented(), "API key configured");
        }
    }

    let backend = Arc::new(HttpBackend::new(reqwest::Client::new()));
    let router = ProviderRouter::new(
        credentials,
        backend,
        args.default_provider,
        args.unsupported_provider,
    );
    if router.is_simulating() {
        tracing::warn!("no provider API keys found, every chat request will be simulated");
    }

    // creating shared state
    let state = Arc::new(AppState::new(
        ResponseCache::new(args.cache_ttl(), args.cache_capacity),
        router,
    ));

    let app = omnichat_gateway::app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Gateway running on http://localhost:{}", args.port);
    tracing::info!(
        "Cache TTL: {} seconds, sweep above {} entries",
        args.cache_ttl,
        args.cache_capacity
    );
    tracing::info!(
        "Default provider: {}, unsupported providers: {:?}",
        args.default_provider,
        args.unsupported_provider
    );

    axum::serve(listener, app).await?;
    Ok(())
}
