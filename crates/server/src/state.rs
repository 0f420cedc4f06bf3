use std::sync::Arc;

use darkroom_core::{
    Authenticator, Config, SanitizedConfig, TaskOrchestrator, TokenSigner, UserStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    signer: Option<Arc<TokenSigner>>,
    users: Arc<dyn UserStore>,
    orchestrator: Arc<TaskOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        signer: Option<Arc<TokenSigner>>,
        users: Arc<dyn UserStore>,
        orchestrator: Arc<TaskOrchestrator>,
    ) -> Self {
        Self {
            config,
            authenticator,
            signer,
            users,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// Token signer, present only when auth method is "token".
    pub fn signer(&self) -> Option<&Arc<TokenSigner>> {
        self.signer.as_ref()
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn orchestrator(&self) -> &TaskOrchestrator {
        self.orchestrator.as_ref()
    }
}
