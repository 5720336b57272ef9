use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("omnichat_requests_total", "Total number of chat requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("omnichat_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("omnichat_cache_misses_total", "Total cache misses").unwrap();
    pub static ref PROVIDER_ERRORS: Counter =
        register_counter!("omnichat_provider_errors_total", "Chat responses that carried provider error text").unwrap();
    pub static ref SIMULATED_RESPONSES: Counter =
        register_counter!("omnichat_simulated_responses_total", "Responses generated in simulation mode").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "omnichat_request_latency_seconds",
        "Chat request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("omnichat_cache_size", "Current number of items in cache").unwrap();
}
