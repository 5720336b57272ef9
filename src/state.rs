use crate::cache::ResponseCache;
use crate::router::ProviderRouter;
// app's shared state

pub struct AppState {
    pub cache: ResponseCache,   // prompt tail hash -> full response text
    pub router: ProviderRouter, // credentials + backend live in here
}

impl AppState {
    pub fn new(cache: ResponseCache, router: ProviderRouter) -> Self {
        Self { cache, router }
    }
}
