use crate::config::Config;
use crate::prompts::PromptFacade;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub prompts: PromptFacade,
    pub config: Config,
}
