// Application state shared across all modules

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::callback::OAuthCallback;
use crate::auth::repository::{SessionRepository, UserRepository};
use crate::auth::state_store::StateStore;
use crate::services::oauth::OAuthProvider;
use crate::services::OpenAIService;

/// OAuth providers registered at startup, keyed by provider name
pub type ProviderRegistry = HashMap<String, Arc<dyn OAuthProvider>>;

/// Application state containing the services and repositories the
/// handlers work through
#[derive(Clone)]
pub struct AppState {
    pub providers: ProviderRegistry,
    pub state_store: Arc<dyn StateStore>,
    pub oauth_callback: Arc<OAuthCallback>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub openai_service: Arc<OpenAIService>,
}
