use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names lowercased by the transport layer.
    pub headers: HashMap<String, String>,
}

impl AuthRequest {
    pub fn from_headers(headers: HashMap<String, String>) -> Self {
        Self { headers }
    }

    /// Token from `Authorization: Bearer <token>`, if present.
    pub fn bearer_token(&self) -> Option<&str> {
        let header = self.headers.get("authorization")?;
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
    }
}

/// Verified caller identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            email: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }
}
