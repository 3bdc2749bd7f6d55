use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::session::SessionState;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable completion transport. Default: ChatSdkClient. Swap via
    /// LLM_TRANSPORT env.
    pub llm: Arc<dyn CompletionClient>,
    /// The single "last result" slot. The mutex is held across the whole
    /// analyze/optimize action so concurrent requests queue, never race.
    pub session: Arc<Mutex<SessionState>>,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn CompletionClient>) -> Self {
        Self {
            config,
            llm,
            session: Arc::new(Mutex::new(SessionState::default())),
        }
    }
}
