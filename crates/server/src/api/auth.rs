//! Registration and login endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use darkroom_core::{auth, NewUser, StoreError};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn error_response(status: StatusCode, detail: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            detail: detail.to_string(),
        }),
    )
}

/// Create a new user account. A duplicate email is a 400.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), (StatusCode, Json<ErrorResponse>)> {
    let password_hash = auth::hash_password(&request.password);

    let user = state
        .users()
        .create(NewUser {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash,
        })
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                error_response(StatusCode::BAD_REQUEST, "Email already registered")
            }
            _ => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create user",
            ),
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

/// Exchange email and password for a bearer access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    let signer = state.signer().ok_or_else(|| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Token auth is not configured",
        )
    })?;

    let user = state
        .users()
        .get_by_email(&request.email)
        .map_err(|_| {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to look up user")
        })?
        .ok_or_else(|| {
            warn!(email = %request.email, "login for unknown email");
            error_response(StatusCode::UNAUTHORIZED, "Incorrect email or password")
        })?;

    if !auth::verify_password(&request.password, &user.password_hash) {
        warn!(email = %request.email, "login with wrong password");
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Incorrect email or password",
        ));
    }

    let access_token = signer.issue(&user.email).map_err(|_| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to issue token")
    })?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
