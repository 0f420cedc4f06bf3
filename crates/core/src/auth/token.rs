//! Bearer-token authentication backed by signed JWTs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::traits::{AuthError, Authenticator};
use crate::auth::types::{AuthRequest, Identity};
use crate::store::UserStore;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Issues and verifies signed tokens carrying the user's email as subject.
pub struct TokenSigner {
    secret: String,
    ttl_minutes: u32,
}

impl TokenSigner {
    pub fn new(secret: String, ttl_minutes: u32) -> Self {
        Self {
            secret,
            ttl_minutes,
        }
    }

    /// Issue a token for the given email, expiring after the configured TTL.
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        let exp = Utc::now() + chrono::Duration::minutes(self.ttl_minutes as i64);
        let claims = Claims {
            sub: email.to_string(),
            exp: exp.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::ConfigurationError(format!("failed to sign token: {e}")))
    }

    /// Verify a token and return the email it was issued for.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AuthError::InvalidCredentials("token expired".to_string())
            }
            _ => AuthError::InvalidCredentials("invalid token".to_string()),
        })?;
        Ok(data.claims.sub)
    }
}

/// Authenticates requests by validating a bearer token and resolving the
/// subject against the user store.
pub struct TokenAuthenticator {
    signer: Arc<TokenSigner>,
    users: Arc<dyn UserStore>,
}

impl TokenAuthenticator {
    pub fn new(signer: Arc<TokenSigner>, users: Arc<dyn UserStore>) -> Self {
        Self { signer, users }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let token = request.bearer_token().ok_or(AuthError::NotAuthenticated)?;
        let email = self.signer.verify(token)?;
        let user = self
            .users
            .get_by_email(&email)
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?
            .ok_or_else(|| AuthError::InvalidCredentials("unknown user".to_string()))?;
        Ok(Identity {
            user_id: user.id,
            email: user.email,
            method: "token".to_string(),
        })
    }

    fn method_name(&self) -> &'static str {
        "token"
    }
}
