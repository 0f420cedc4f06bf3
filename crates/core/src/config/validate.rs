use super::{
    types::{AuthMethod, Config, ObjectStoreBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Token auth has a non-empty secret
/// - HTTP object store backend has its http section
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if matches!(config.auth.method, AuthMethod::Token) {
        match &config.auth.secret {
            Some(secret) if !secret.is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "auth.secret must be set when using token auth method".to_string(),
                ))
            }
        }
    }

    if config.object_store.backend == ObjectStoreBackend::Http && config.object_store.http.is_none()
    {
        return Err(ConfigError::ValidationError(
            "object_store.http must be set when backend = \"http\"".to_string(),
        ));
    }

    Ok(())
}
