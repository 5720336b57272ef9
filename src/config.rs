use clap::Parser;
use std::time::Duration;

use crate::providers::ProviderId;
use crate::router::UnsupportedProviderPolicy;

// CLI argument structure. Provider API keys come from the environment
// (GROQ_API_KEY, OPENAI_API_KEY, ...), optionally via a .env file.
#[derive(Parser, Debug, Clone)]
#[command(name = "omnichat-gateway")]
#[command(about = "Multi-provider chat gateway with response caching")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Cache TTL in seconds
    #[arg(short, long, default_value_t = 3600)]
    pub cache_ttl: u64,

    // Entry count past which expired entries are swept
    #[arg(long, default_value_t = 1000)]
    pub cache_capacity: usize,

    // Provider that serves requests for providers without an adapter
    #[arg(short, long, default_value = "groq")]
    pub default_provider: ProviderId,

    // fallback: role-play on the default provider, reject: refuse with 422
    #[arg(long, value_enum, default_value_t = UnsupportedProviderPolicy::Fallback)]
    pub unsupported_provider: UnsupportedProviderPolicy,

    // Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}
