mod none;
mod password;
mod token;
mod traits;
mod types;

pub use none::*;
pub use password::{hash_password, verify_password};
pub use token::*;
pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::store::UserStore;

/// Factory function to create authenticator from config
pub fn create_authenticator(
    config: &AuthConfig,
    users: Arc<dyn UserStore>,
) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::Token => {
            let secret = config.secret.clone().ok_or_else(|| {
                AuthError::ConfigurationError(
                    "secret must be set when using token auth method".to_string(),
                )
            })?;
            let signer = Arc::new(TokenSigner::new(secret, config.token_ttl_minutes));
            Ok(Box::new(TokenAuthenticator::new(signer, users)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMethod;
    use crate::store::SqliteUserStore;

    fn users() -> Arc<dyn UserStore> {
        Arc::new(SqliteUserStore::in_memory().unwrap())
    }

    #[test]
    fn test_create_authenticator_none() {
        let config = AuthConfig {
            method: AuthMethod::None,
            secret: None,
            token_ttl_minutes: 60,
        };
        let auth = create_authenticator(&config, users()).unwrap();
        assert_eq!(auth.method_name(), "none");
    }

    #[test]
    fn test_create_authenticator_token() {
        let config = AuthConfig {
            method: AuthMethod::Token,
            secret: Some("secret-key".to_string()),
            token_ttl_minutes: 60,
        };
        let auth = create_authenticator(&config, users()).unwrap();
        assert_eq!(auth.method_name(), "token");
    }

    #[test]
    fn test_create_authenticator_token_missing_secret() {
        let config = AuthConfig {
            method: AuthMethod::Token,
            secret: None,
            token_ttl_minutes: 60,
        };
        let result = create_authenticator(&config, users());
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }
}
