mod catalog;
mod chat;
mod health;
mod metrics;

pub use catalog::{models_handler, personas_handler, providers_handler};
pub use chat::{
    CACHE_HEADER, CACHE_KEY_HEADER, ERROR_HEADER, MODE_HEADER, MODEL_HEADER, PROVIDER_HEADER,
    REQUESTED_PROVIDER_HEADER, SIMULATION_HEADER, chat_handler,
};
pub use health::health_handler;
pub use metrics::metrics_handler;
