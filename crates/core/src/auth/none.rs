use async_trait::async_trait;

use crate::auth::traits::{AuthError, Authenticator};
use crate::auth::types::{AuthRequest, Identity};

/// Authenticator that accepts every request as an anonymous identity.
/// Intended for local development only.
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoneAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}
